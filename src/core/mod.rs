//! Scoring engine, history and event emission.

/// Per-match event emitter and pending buffer.
pub mod emitter;
/// Pure scoring transitions and match completion.
pub mod engine;
/// Core boundary errors.
pub mod error;
/// Bounded snapshot history for single-step undo.
pub mod history;
/// Synchronous command surface for one match.
pub mod session;
