//! Match event model and persistence wrappers.

use serde::{Deserialize, Serialize};

use crate::{
    score::ScoreState,
    types::{EventSeq, MatchId, PlayerId},
};

/// Version number for serialized [`StoredEventEnvelope`] payloads.
pub const EVENT_FORMAT_VERSION: u16 = 1;

/// Closed set of event kinds handed to the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Scoring began.
    MatchStart,
    /// A point was scored.
    Point,
    /// A game was completed.
    GameWon,
    /// A set was completed.
    SetWon,
    /// The match was declared over.
    MatchEnd,
}

impl EventKind {
    /// Stable kebab-case label, also used as the journal `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::MatchStart => "match-start",
            EventKind::Point => "point",
            EventKind::GameWon => "game-won",
            EventKind::SetWon => "set-won",
            EventKind::MatchEnd => "match-end",
        }
    }

    /// True for events that close a game, a set or the match.
    pub fn is_milestone(self) -> bool {
        matches!(
            self,
            EventKind::GameWon | EventKind::SetWon | EventKind::MatchEnd
        )
    }
}

/// Append-only record of one scoring occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// What happened.
    pub kind: EventKind,
    /// Player responsible for the event.
    pub player_id: PlayerId,
    /// Human-readable description.
    pub description: String,
    /// Full score at emission time.
    pub snapshot: ScoreState,
    /// Free-form metadata such as the point classification.
    pub metadata: serde_json::Value,
}

/// Journal row metadata plus event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Match the event belongs to.
    pub match_id: MatchId,
    /// Monotonic per-match sequence.
    pub seq: EventSeq,
    /// Emission timestamp in milliseconds.
    pub ts_ms: u64,
    /// Event body.
    pub event: MatchEvent,
}

/// Versioned wrapper for stable on-disk payload decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEventEnvelope {
    /// Payload format version.
    pub format_version: u16,
    /// Wrapped event.
    pub stored: StoredEvent,
}

impl StoredEventEnvelope {
    /// Constructs an envelope using [`EVENT_FORMAT_VERSION`].
    pub fn new(stored: StoredEvent) -> Self {
        Self {
            format_version: EVENT_FORMAT_VERSION,
            stored,
        }
    }
}
