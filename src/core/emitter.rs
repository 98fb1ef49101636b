use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    event::{EventKind, MatchEvent, StoredEvent},
    score::ScoreState,
    types::{EventSeq, MatchId, PlayerId},
};

/// Turns transitions into sequenced, timestamped events.
///
/// Emitted events wait in a pending buffer until the owner drains them
/// towards the persistence collaborator; nothing is ever read back.
#[derive(Debug)]
pub struct EventEmitter {
    match_id: MatchId,
    next_seq: EventSeq,
    pending: Vec<StoredEvent>,
}

impl EventEmitter {
    pub fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            next_seq: 1,
            pending: Vec::new(),
        }
    }

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    pub fn emit(
        &mut self,
        kind: EventKind,
        player_id: &PlayerId,
        description: impl Into<String>,
        snapshot: &ScoreState,
        metadata: serde_json::Value,
    ) -> EventSeq {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.pending.push(StoredEvent {
            match_id: self.match_id.clone(),
            seq,
            ts_ms: now_ms(),
            event: MatchEvent {
                kind,
                player_id: player_id.clone(),
                description: description.into(),
                snapshot: snapshot.clone(),
                metadata,
            },
        });
        seq
    }

    pub fn drain_pending(&mut self) -> Vec<StoredEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Sequence of the most recently emitted event, or 0.
    pub fn latest_seq(&self) -> EventSeq {
        self.next_seq.saturating_sub(1)
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
