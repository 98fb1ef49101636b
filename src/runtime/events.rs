//! Runtime event stream payloads.

use crate::types::{EventSeq, Slot};

/// Events broadcast from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRuntimeEvent {
    /// A point was applied to the live state.
    PointAwarded {
        /// Point winner.
        slot: Slot,
        /// The point closed a game.
        game_won: bool,
        /// The point closed a set.
        set_won: bool,
    },
    /// One undo step was applied.
    UndoApplied,
    /// The match was finalized.
    MatchFinalized {
        /// Winning slot.
        winner: Slot,
    },
    /// Persistence has reached at least this event sequence.
    DurableUpTo {
        /// Highest sequence known durable.
        seq: EventSeq,
    },
    /// Delivery to the persistence collaborator failed; live state is unaffected.
    EmitFailed {
        /// Failure description.
        reason: String,
    },
}
