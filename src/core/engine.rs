use crate::{
    score::ScoreState,
    types::{PerSlot, PointKind, Slot},
};

use super::error::MatchError;

/// Points needed to take a game, with a two-point margin.
pub const POINTS_TO_WIN_GAME: u32 = 4;
/// Games needed to take a set, with a two-game margin.
pub const GAMES_TO_WIN_SET: u32 = 6;
/// Reaching this many games takes the set outright.
///
/// Stands in for a tiebreak game; there is no point-level tiebreak.
pub const TIEBREAK_SET_GAMES: u32 = 7;

/// One consequence of a point, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    /// `by` took the game.
    GameWon {
        /// Game winner.
        by: Slot,
    },
    /// `by` took set number `set`.
    SetWon {
        /// Set winner.
        by: Slot,
        /// One-based index of the completed set.
        set: u32,
    },
    /// The point itself; always last.
    Point {
        /// Point winner.
        by: Slot,
        /// Point classification.
        kind: PointKind,
    },
}

/// Result of [`award_point`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Post-transition state.
    pub state: ScoreState,
    /// Game and set completions followed by the point.
    pub changes: Vec<ScoreChange>,
}

impl Transition {
    /// True when the point closed a game.
    pub fn game_won(&self) -> bool {
        self.changes
            .iter()
            .any(|c| matches!(c, ScoreChange::GameWon { .. }))
    }

    /// True when the point closed a set.
    pub fn set_won(&self) -> bool {
        self.changes
            .iter()
            .any(|c| matches!(c, ScoreChange::SetWon { .. }))
    }
}

/// Awards one point to `slot` and resolves game, set and deuce rules.
///
/// Set completion is only evaluated after a game completion in the same call,
/// so points always reset together with the game increment and games reset
/// together with the set-index increment.
pub fn award_point(state: &ScoreState, slot: Slot, kind: PointKind) -> Transition {
    let opponent = slot.opponent();
    let mut next = state.clone();
    let mut changes = Vec::with_capacity(3);

    next.points[slot] += 1;
    let won = next.points[slot];
    let lost = next.points[opponent];

    if won >= POINTS_TO_WIN_GAME && won >= lost + 2 {
        next.games[slot] += 1;
        next.points = PerSlot::default();
        next.deuce = false;
        next.advantage = None;
        next.serving = next.serving.opponent();
        changes.push(ScoreChange::GameWon { by: slot });

        let games = next.games[slot];
        let other = next.games[opponent];
        if (games >= GAMES_TO_WIN_SET && games >= other + 2) || games == TIEBREAK_SET_GAMES {
            next.sets.push(next.games);
            next.games = PerSlot::default();
            let set = next.current_set;
            next.current_set += 1;
            changes.push(ScoreChange::SetWon { by: slot, set });
        }
    } else if won >= 3 && lost >= 3 {
        if won == lost {
            next.deuce = true;
            next.advantage = None;
        } else if won == lost + 1 {
            next.deuce = true;
            next.advantage = Some(slot);
        }
    }

    changes.push(ScoreChange::Point { by: slot, kind });
    Transition {
        state: next,
        changes,
    }
}

/// Decides the winner of a completed match.
///
/// Sets are compared pairwise by index; the winner is the slot that took
/// strictly more of them.
pub fn finalize_match(state: &ScoreState) -> Result<(Slot, String), MatchError> {
    if state.sets.is_empty() {
        return Err(MatchError::NoSetsRecorded);
    }

    let a = state.sets_taken(Slot::SlotA);
    let b = state.sets_taken(Slot::SlotB);
    let winner = match a.cmp(&b) {
        std::cmp::Ordering::Greater => Slot::SlotA,
        std::cmp::Ordering::Less => Slot::SlotB,
        std::cmp::Ordering::Equal => return Err(MatchError::SetsTied { sets_each: a }),
    };

    Ok((winner, state.score_string()))
}
