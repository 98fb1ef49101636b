//! Point labels and the scoreboard view model.

use serde::Serialize;

use crate::{
    directory::PlayerDirectory,
    score::ScoreState,
    types::{PerSlot, PlayerId, Slot},
};

/// Conventional label for `slot`'s point count.
///
/// Outside deuce: 0, 15, 30, 40. Counts above three cannot be displayed in a
/// valid state and clamp to "40". In deuce the slot holding advantage reads
/// "AD" and every other case reads "40".
pub fn format_points(
    points: u32,
    deuce: bool,
    advantage: Option<Slot>,
    slot: Slot,
) -> &'static str {
    if deuce {
        return if advantage == Some(slot) { "AD" } else { "40" };
    }

    match points {
        0 => "0",
        1 => "15",
        2 => "30",
        _ => "40",
    }
}

/// Label for `slot` taken straight from a [`ScoreState`].
pub fn point_label(state: &ScoreState, slot: Slot) -> &'static str {
    format_points(state.points[slot], state.deuce, state.advantage, slot)
}

/// One scoreboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreboardRow {
    /// Directory display name, or the raw id when unknown.
    pub name: String,
    /// Directory rating, when known.
    pub rating: Option<u32>,
    /// Games taken in each completed set.
    pub sets: Vec<u32>,
    /// Games in the current set.
    pub games: u32,
    /// Current point label.
    pub points: &'static str,
    /// True for the serving slot.
    pub serving: bool,
}

/// Rendered score for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    /// Set currently being played.
    pub current_set: u32,
    /// Row per slot.
    pub rows: PerSlot<ScoreboardRow>,
    /// "Deuce" or "Advantage <name>" while in deuce.
    pub status: Option<String>,
}

impl Scoreboard {
    /// Builds the view, looking up names in `directory`.
    pub fn build(
        state: &ScoreState,
        players: &PerSlot<PlayerId>,
        directory: &dyn PlayerDirectory,
    ) -> Self {
        let rows = players.clone().map(|slot, id| {
            let profile = directory.get_player(&id);
            ScoreboardRow {
                name: profile
                    .as_ref()
                    .map(|p| p.display_name.clone())
                    .unwrap_or_else(|| id.to_string()),
                rating: profile.map(|p| p.rating),
                sets: state.sets_won(slot),
                games: state.games[slot],
                points: point_label(state, slot),
                serving: state.serving == slot,
            }
        });

        let status = state.deuce.then(|| match state.advantage {
            Some(slot) => format!("Advantage {}", rows[slot].name),
            None => "Deuce".to_string(),
        });

        Self {
            current_set: state.current_set,
            rows,
            status,
        }
    }
}
