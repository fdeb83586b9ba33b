//! Cross-crate integration tests for the Agora workspace.
//!
//! See `tests/` for the end-to-end flows; this library is intentionally
//! empty.
