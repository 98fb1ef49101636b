use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::{
    event::{EventKind, StoredEvent},
    format::point_label,
    score::{MatchResult, MatchStatus, ScoreState},
    types::{EventSeq, MatchId, PerSlot, PlayerId, PointKind, Slot},
};

use super::{
    emitter::EventEmitter,
    engine::{self, ScoreChange},
    error::MatchError,
    history::{HISTORY_CAPACITY, HistoryManager},
};

/// Post-point state plus what the point completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointOutcome {
    pub state: Arc<ScoreState>,
    pub game_won: bool,
    pub set_won: bool,
}

/// Live state, undo history and event emitter for one match.
///
/// Every command either fully applies or is rejected without side effects.
#[derive(Debug)]
pub struct MatchSession {
    players: PerSlot<PlayerId>,
    state: Arc<ScoreState>,
    history: HistoryManager,
    emitter: EventEmitter,
    result: Option<MatchResult>,
    pending_result: Option<MatchResult>,
}

impl MatchSession {
    /// Starts a match with the default history capacity and emits `match-start`.
    pub fn start(
        match_id: MatchId,
        player1: PlayerId,
        player2: PlayerId,
    ) -> Result<Self, MatchError> {
        Self::start_with_capacity(match_id, player1, player2, HISTORY_CAPACITY)
    }

    pub fn start_with_capacity(
        match_id: MatchId,
        player1: PlayerId,
        player2: PlayerId,
        history_capacity: usize,
    ) -> Result<Self, MatchError> {
        if player1 == player2 {
            return Err(MatchError::SamePlayer(player1));
        }

        let mut session = Self {
            players: PerSlot::new(player1, player2),
            state: Arc::new(ScoreState::new()),
            history: HistoryManager::with_capacity(history_capacity),
            emitter: EventEmitter::new(match_id),
            result: None,
            pending_result: None,
        };

        let starter = session.players.a.clone();
        session.emitter.emit(
            EventKind::MatchStart,
            &starter,
            "Match has begun",
            &session.state,
            json!({}),
        );
        info!(
            match_id = %session.emitter.match_id(),
            player_a = %session.players.a,
            player_b = %session.players.b,
            "match started"
        );
        Ok(session)
    }

    pub fn match_id(&self) -> &MatchId {
        self.emitter.match_id()
    }

    pub fn players(&self) -> &PerSlot<PlayerId> {
        &self.players
    }

    pub fn player_id(&self, slot: Slot) -> &PlayerId {
        &self.players[slot]
    }

    /// Slot bound to `player`, if any.
    pub fn slot_of(&self, player: &PlayerId) -> Option<Slot> {
        Slot::BOTH.into_iter().find(|slot| &self.players[*slot] == player)
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    /// Shared handle to the current state.
    pub fn snapshot(&self) -> Arc<ScoreState> {
        Arc::clone(&self.state)
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    pub fn format_points(&self, slot: Slot) -> &'static str {
        point_label(&self.state, slot)
    }

    /// Checkpoints, transitions and emits game, set and point events in that order.
    pub fn award_point(
        &mut self,
        slot: Slot,
        kind: PointKind,
    ) -> Result<Arc<ScoreState>, MatchError> {
        self.score_point(slot, kind).map(|outcome| outcome.state)
    }

    /// Same as [`MatchSession::award_point`], also reporting completed games and sets.
    pub fn score_point(&mut self, slot: Slot, kind: PointKind) -> Result<PointOutcome, MatchError> {
        if self.is_finished() {
            return Err(MatchError::MatchFinished);
        }

        let player = self.players[slot].clone();
        self.history
            .checkpoint(Arc::clone(&self.state), format!("Point awarded to {player}"));

        let transition = engine::award_point(&self.state, slot, kind);
        let (game_won, set_won) = (transition.game_won(), transition.set_won());
        let next = Arc::new(transition.state);

        for change in &transition.changes {
            match *change {
                ScoreChange::GameWon { by } => {
                    let by_id = &self.players[by];
                    self.emitter.emit(
                        EventKind::GameWon,
                        by_id,
                        format!("Game won by {by_id}"),
                        &next,
                        json!({ "point_kind": kind.as_str() }),
                    );
                }
                ScoreChange::SetWon { by, set } => {
                    let by_id = &self.players[by];
                    self.emitter.emit(
                        EventKind::SetWon,
                        by_id,
                        format!("Set {set} won by {by_id}"),
                        &next,
                        json!({ "point_kind": kind.as_str(), "set": set }),
                    );
                }
                ScoreChange::Point { by, kind } => {
                    self.emitter.emit(
                        EventKind::Point,
                        &self.players[by],
                        kind.description(),
                        &next,
                        json!({ "point_kind": kind.as_str() }),
                    );
                }
            }
        }

        debug!(
            match_id = %self.emitter.match_id(),
            slot = %slot,
            point_kind = kind.as_str(),
            game_won,
            set_won,
            "point awarded"
        );

        self.state = next;
        Ok(PointOutcome {
            state: Arc::clone(&self.state),
            game_won,
            set_won,
        })
    }

    /// Same as [`MatchSession::award_point`], resolving the slot from a player id.
    pub fn award_point_to(
        &mut self,
        player: &PlayerId,
        kind: PointKind,
    ) -> Result<Arc<ScoreState>, MatchError> {
        let slot = self
            .slot_of(player)
            .ok_or_else(|| MatchError::UnknownPlayer(player.clone()))?;
        self.award_point(slot, kind)
    }

    /// Restores the state preceding the most recent point.
    ///
    /// Already-emitted events are not retracted.
    pub fn undo(&mut self) -> Option<Arc<ScoreState>> {
        let entry = self.history.undo()?;
        debug!(
            match_id = %self.emitter.match_id(),
            action = %entry.action,
            "undo applied"
        );
        self.state = entry.state;
        Some(Arc::clone(&self.state))
    }

    /// Declares the match over, emits `match-end` and queues the final result.
    pub fn finalize(&mut self) -> Result<MatchResult, MatchError> {
        if self.is_finished() {
            return Err(MatchError::MatchFinished);
        }

        let (winner, score) = engine::finalize_match(&self.state)?;
        let result = MatchResult {
            status: MatchStatus::Completed,
            winner,
            winner_id: self.players[winner].clone(),
            score,
        };

        self.emitter.emit(
            EventKind::MatchEnd,
            &result.winner_id,
            format!("Match completed. Final score: {}", result.score),
            &self.state,
            json!({ "winner": result.winner_id.as_str(), "score": result.score }),
        );
        self.history.clear();
        info!(
            match_id = %self.emitter.match_id(),
            winner = %result.winner_id,
            score = %result.score,
            "match finalized"
        );

        self.result = Some(result.clone());
        self.pending_result = Some(result.clone());
        Ok(result)
    }

    pub fn drain_pending_events(&mut self) -> Vec<StoredEvent> {
        self.emitter.drain_pending()
    }

    /// Final result not yet handed to the persistence collaborator.
    pub fn take_pending_result(&mut self) -> Option<MatchResult> {
        self.pending_result.take()
    }

    pub fn latest_event_seq(&self) -> EventSeq {
        self.emitter.latest_seq()
    }
}
