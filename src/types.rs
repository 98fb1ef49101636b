//! Shared primitive IDs, player slots and point classifications.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Monotonic per-match event sequence number.
pub type EventSeq = u64;

/// Opaque player identifier supplied by the player directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrowed view of the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Opaque match identifier used to key journal rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl MatchId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrowed view of the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two fixed competitor roles in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// First competitor; serves first.
    SlotA,
    /// Second competitor.
    SlotB,
}

impl Slot {
    /// Both slots in display order.
    pub const BOTH: [Slot; 2] = [Slot::SlotA, Slot::SlotB];

    /// The other slot.
    pub fn opponent(self) -> Self {
        match self {
            Slot::SlotA => Slot::SlotB,
            Slot::SlotB => Slot::SlotA,
        }
    }

    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::SlotA => "slot_a",
            Slot::SlotB => "slot_b",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held once per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PerSlot<T> {
    /// Value for [`Slot::SlotA`].
    pub a: T,
    /// Value for [`Slot::SlotB`].
    pub b: T,
}

impl<T> PerSlot<T> {
    /// Builds a pair from both values.
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    /// Maps both values, keeping slot order.
    pub fn map<U>(self, mut f: impl FnMut(Slot, T) -> U) -> PerSlot<U> {
        PerSlot {
            a: f(Slot::SlotA, self.a),
            b: f(Slot::SlotB, self.b),
        }
    }

    /// Borrows both values.
    pub fn as_ref(&self) -> PerSlot<&T> {
        PerSlot {
            a: &self.a,
            b: &self.b,
        }
    }
}

impl<T> Index<Slot> for PerSlot<T> {
    type Output = T;

    fn index(&self, slot: Slot) -> &T {
        match slot {
            Slot::SlotA => &self.a,
            Slot::SlotB => &self.b,
        }
    }
}

impl<T> IndexMut<Slot> for PerSlot<T> {
    fn index_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::SlotA => &mut self.a,
            Slot::SlotB => &mut self.b,
        }
    }
}

/// Classification tag attached to a scored point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointKind {
    /// Ordinary rally point.
    #[default]
    Normal,
    /// Service ace.
    Ace,
    /// Server double-faulted.
    DoubleFault,
    /// Clean winning shot.
    Winner,
    /// Opponent made an unforced error.
    UnforcedError,
}

impl PointKind {
    /// Every classification, in declaration order.
    pub const ALL: [PointKind; 5] = [
        PointKind::Normal,
        PointKind::Ace,
        PointKind::DoubleFault,
        PointKind::Winner,
        PointKind::UnforcedError,
    ];

    /// Stable kebab-case tag stored in event metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            PointKind::Normal => "normal",
            PointKind::Ace => "ace",
            PointKind::DoubleFault => "double-fault",
            PointKind::Winner => "winner",
            PointKind::UnforcedError => "unforced-error",
        }
    }

    /// Human-readable description used on point events.
    pub fn description(self) -> &'static str {
        match self {
            PointKind::Normal => "Point won",
            PointKind::Ace => "Service ace",
            PointKind::DoubleFault => "Double fault",
            PointKind::Winner => "Winner shot",
            PointKind::UnforcedError => "Unforced error by opponent",
        }
    }
}
