use thiserror::Error;

use crate::types::PlayerId;

/// Requests rejected at the engine boundary.
///
/// A rejected request leaves the match untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The player is not bound to either slot of this match.
    #[error("player {0} is not part of this match")]
    UnknownPlayer(PlayerId),
    /// Both slots were given the same player.
    #[error("player {0} cannot occupy both slots")]
    SamePlayer(PlayerId),
    /// The match has already been finalized.
    #[error("match is already finalized")]
    MatchFinished,
    /// Finalization requires at least one completed set.
    #[error("no completed sets recorded")]
    NoSetsRecorded,
    /// Both slots took the same number of sets.
    #[error("sets are tied at {sets_each} each")]
    SetsTied {
        /// Sets taken by each slot.
        sets_each: usize,
    },
}
