pub mod sqlite;

use thiserror::Error;

use crate::{
    event::StoredEvent,
    score::MatchResult,
    types::{EventSeq, MatchId},
};

/// Failures from the persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistError {
    /// SQLite driver error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Payload (de)serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Anything else, including queue and worker failures.
    #[error("{0}")]
    Message(String),
}

/// Result alias for sink operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Write-only destination for emitted events and final results.
pub trait EventSink: Send {
    /// Appends events in order and returns the highest sequence now durable.
    fn append_events(&mut self, events: &[StoredEvent]) -> PersistResult<EventSeq>;
    /// Records the final match update.
    fn record_result(&mut self, match_id: &MatchId, result: &MatchResult) -> PersistResult<()>;
    /// Forces buffered writes to storage.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}
