//! Read-only player directory used for presentation.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::types::PlayerId;

/// Display data for one competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Name shown on the scoreboard.
    pub display_name: String,
    /// Current rating.
    pub rating: u32,
}

/// Lookup of player display data by opaque id.
///
/// Never consulted by scoring transitions.
pub trait PlayerDirectory: Send + Sync {
    /// Returns the profile for `id`, if known.
    fn get_player(&self, id: &PlayerId) -> Option<PlayerProfile>;
}

/// Directory backed by an in-memory map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    players: HashMap<PlayerId, PlayerProfile>,
}

impl InMemoryDirectory {
    /// Empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a profile.
    pub fn insert(&mut self, id: PlayerId, profile: PlayerProfile) -> Option<PlayerProfile> {
        self.players.insert(id, profile)
    }

    /// Number of known players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when no players are known.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl PlayerDirectory for InMemoryDirectory {
    fn get_player(&self, id: &PlayerId) -> Option<PlayerProfile> {
        self.players.get(id).cloned()
    }
}

impl FromIterator<(PlayerId, PlayerProfile)> for InMemoryDirectory {
    fn from_iter<I: IntoIterator<Item = (PlayerId, PlayerProfile)>>(iter: I) -> Self {
        Self {
            players: iter.into_iter().collect(),
        }
    }
}
