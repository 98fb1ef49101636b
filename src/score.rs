//! Score model: the full state of one match in progress and its final result.

use serde::{Deserialize, Serialize};

use crate::types::{PerSlot, PlayerId, Slot};

/// Complete scoring state of a match.
///
/// Each completed set is stored as one [`PerSlot`] pair, so the sequences
/// returned by [`ScoreState::sets_won`] for both slots always have equal length
/// and stay index-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    /// Final game tally of every completed set, oldest first.
    pub sets: Vec<PerSlot<u32>>,
    /// Games won in the current set.
    pub games: PerSlot<u32>,
    /// Points won in the current game.
    pub points: PerSlot<u32>,
    /// One-based index of the set in progress.
    pub current_set: u32,
    /// Both sides have at least three points and are level or one apart.
    pub deuce: bool,
    /// Slot one point ahead while in deuce.
    pub advantage: Option<Slot>,
    /// Slot currently serving.
    pub serving: Slot,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreState {
    /// Initial state: no points, games or sets; slot A serves set 1.
    pub fn new() -> Self {
        Self {
            sets: Vec::new(),
            games: PerSlot::default(),
            points: PerSlot::default(),
            current_set: 1,
            deuce: false,
            advantage: None,
            serving: Slot::SlotA,
        }
    }

    /// Per-set game counts for `slot`, one entry per completed set.
    pub fn sets_won(&self, slot: Slot) -> Vec<u32> {
        self.sets.iter().map(|set| set[slot]).collect()
    }

    /// Number of completed sets in which `slot` won more games than its opponent.
    pub fn sets_taken(&self, slot: Slot) -> usize {
        self.sets
            .iter()
            .filter(|set| set[slot] > set[slot.opponent()])
            .count()
    }

    /// Renders both tally sequences, e.g. `"6-3 vs 4-6"`.
    pub fn score_string(&self) -> String {
        let join = |slot: Slot| {
            self.sets_won(slot)
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("-")
        };
        format!("{} vs {}", join(Slot::SlotA), join(Slot::SlotB))
    }
}

/// Lifecycle status reported with a final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Officially declared over.
    Completed,
}

impl MatchStatus {
    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Completed => "completed",
        }
    }
}

/// Final match update handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Always [`MatchStatus::Completed`] once produced.
    pub status: MatchStatus,
    /// Winning slot.
    pub winner: Slot,
    /// Player bound to the winning slot.
    pub winner_id: PlayerId,
    /// Per-set tallies, see [`ScoreState::score_string`].
    pub score: String,
}
