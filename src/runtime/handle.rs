use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot},
    time::{Duration, Instant},
};
use tracing::{debug, warn};

use crate::{
    core::{
        error::MatchError,
        history::HISTORY_CAPACITY,
        session::{MatchSession, PointOutcome},
    },
    event::StoredEvent,
    persist::{EventSink, PersistError},
    score::{MatchResult, ScoreState},
    types::{EventSeq, MatchId, PlayerId, PointKind, Slot},
};

use super::events::MatchRuntimeEvent;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("runtime channel closed")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub history_capacity: usize,
    pub batch_max_events: usize,
    pub batch_max_latency_ms: u64,
    pub persist_queue_bound: usize,
    pub flush_on_game: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            batch_max_events: 32,
            batch_max_latency_ms: 75,
            persist_queue_bound: 64,
            flush_on_game: true,
        }
    }
}

/// A locally applied command plus any emission warning.
///
/// A warning never means the command failed: the live state has advanced and
/// only delivery to the persistence collaborator is in doubt.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub emit_warning: Option<PersistError>,
}

pub struct MatchHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<MatchRuntimeEvent>,
}

impl Clone for MatchHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    AwardPoint {
        slot: Slot,
        kind: PointKind,
        resp: oneshot::Sender<Result<Applied<Arc<ScoreState>>, RuntimeError>>,
    },
    AwardPointTo {
        player: PlayerId,
        kind: PointKind,
        resp: oneshot::Sender<Result<Applied<Arc<ScoreState>>, RuntimeError>>,
    },
    Undo {
        resp: oneshot::Sender<Option<Arc<ScoreState>>>,
    },
    CanUndo {
        resp: oneshot::Sender<bool>,
    },
    Score {
        resp: oneshot::Sender<Arc<ScoreState>>,
    },
    FormatPoints {
        slot: Slot,
        resp: oneshot::Sender<&'static str>,
    },
    Finalize {
        resp: oneshot::Sender<Result<Applied<MatchResult>, RuntimeError>>,
    },
    Flush {
        resp: oneshot::Sender<Result<EventSeq, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

enum PersistMsg {
    Event(StoredEvent),
    Result {
        match_id: MatchId,
        result: MatchResult,
    },
    Flush {
        resp: oneshot::Sender<Result<EventSeq, PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Starts a session sized by `config` and spawns its runtime.
pub fn start_match(
    match_id: MatchId,
    player1: PlayerId,
    player2: PlayerId,
    sink: Option<Box<dyn EventSink>>,
    config: RuntimeConfig,
) -> Result<MatchHandle, RuntimeError> {
    let capacity = config.history_capacity;
    let session = MatchSession::start_with_capacity(match_id, player1, player2, capacity)?;
    Ok(spawn_match(session, sink, config))
}

pub fn spawn_match(
    session: MatchSession,
    sink: Option<Box<dyn EventSink>>,
    config: RuntimeConfig,
) -> MatchHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<MatchRuntimeEvent>(1024);

    let (persist_tx_opt, mut durable_rx) = if let Some(sink) = sink {
        let bound = config.persist_queue_bound.max(1);
        let (persist_tx, persist_rx) = mpsc::channel::<PersistMsg>(bound);
        let (durable_tx, durable_rx) = mpsc::unbounded_channel();
        spawn_persistence_worker(sink, persist_rx, durable_tx, config.clone());
        (Some(persist_tx), Some(durable_rx))
    } else {
        (None, None)
    };

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut session = session;
        let _ = forward_pending(&mut session, &events_tx_loop, persist_tx_opt.as_ref());

        loop {
            let mut worker_gone = false;
            if let Some(rx) = durable_rx.as_mut() {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break; };
                        let done = handle_command(
                            cmd,
                            &mut session,
                            &events_tx_loop,
                            persist_tx_opt.as_ref(),
                        ).await;

                        if done {
                            break;
                        }
                    }
                    durable = rx.recv() => {
                        match durable {
                            Some(Ok(seq)) => {
                                let _ = events_tx_loop.send(MatchRuntimeEvent::DurableUpTo { seq });
                            }
                            Some(Err(err)) => {
                                warn!(
                                    match_id = %session.match_id(),
                                    error = %err,
                                    "event persistence failed"
                                );
                                let _ = events_tx_loop.send(MatchRuntimeEvent::EmitFailed {
                                    reason: err.to_string(),
                                });
                            }
                            None => worker_gone = true,
                        }
                    }
                }
            } else {
                let Some(cmd) = cmd_rx.recv().await else { break; };
                let done = handle_command(
                    cmd,
                    &mut session,
                    &events_tx_loop,
                    persist_tx_opt.as_ref(),
                ).await;
                if done {
                    break;
                }
            }
            if worker_gone {
                durable_rx = None;
            }
        }
    });

    MatchHandle { cmd_tx, events_tx }
}

impl MatchHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<MatchRuntimeEvent> {
        self.events_tx.subscribe()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn award_point(
        &self,
        slot: Slot,
        kind: PointKind,
    ) -> Result<Applied<Arc<ScoreState>>, RuntimeError> {
        self.request(|resp| Command::AwardPoint { slot, kind, resp }).await?
    }

    pub async fn award_point_to(
        &self,
        player: impl Into<PlayerId>,
        kind: PointKind,
    ) -> Result<Applied<Arc<ScoreState>>, RuntimeError> {
        let player = player.into();
        self.request(|resp| Command::AwardPointTo { player, kind, resp })
            .await?
    }

    /// Returns `None` when there is nothing to undo.
    pub async fn undo(&self) -> Result<Option<Arc<ScoreState>>, RuntimeError> {
        self.request(|resp| Command::Undo { resp }).await
    }

    pub async fn can_undo(&self) -> Result<bool, RuntimeError> {
        self.request(|resp| Command::CanUndo { resp }).await
    }

    pub async fn score(&self) -> Result<Arc<ScoreState>, RuntimeError> {
        self.request(|resp| Command::Score { resp }).await
    }

    pub async fn format_points(&self, slot: Slot) -> Result<&'static str, RuntimeError> {
        self.request(|resp| Command::FormatPoints { slot, resp })
            .await
    }

    pub async fn finalize(&self) -> Result<Applied<MatchResult>, RuntimeError> {
        self.request(|resp| Command::Finalize { resp }).await?
    }

    pub async fn flush(&self) -> Result<EventSeq, RuntimeError> {
        self.request(|resp| Command::Flush { resp }).await?
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await?
    }
}

async fn handle_command(
    cmd: Command,
    session: &mut MatchSession,
    events_tx: &broadcast::Sender<MatchRuntimeEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) -> bool {
    match cmd {
        Command::AwardPoint { slot, kind, resp } => {
            let res = session.score_point(slot, kind).map_err(RuntimeError::from);
            let _ = resp.send(after_point(res, slot, session, events_tx, persist_tx));
        }
        Command::AwardPointTo { player, kind, resp } => {
            let res = match session.slot_of(&player) {
                Some(slot) => {
                    let res = session.score_point(slot, kind).map_err(RuntimeError::from);
                    after_point(res, slot, session, events_tx, persist_tx)
                }
                None => Err(RuntimeError::Match(MatchError::UnknownPlayer(player))),
            };
            let _ = resp.send(res);
        }
        Command::Undo { resp } => {
            let res = session.undo();
            if res.is_some() {
                let _ = events_tx.send(MatchRuntimeEvent::UndoApplied);
            }
            let _ = resp.send(res);
        }
        Command::CanUndo { resp } => {
            let _ = resp.send(session.can_undo());
        }
        Command::Score { resp } => {
            let _ = resp.send(session.snapshot());
        }
        Command::FormatPoints { slot, resp } => {
            let _ = resp.send(session.format_points(slot));
        }
        Command::Finalize { resp } => {
            let res = session
                .finalize()
                .map_err(RuntimeError::from)
                .map(|result| {
                    let emit_warning = forward_pending(session, events_tx, persist_tx);
                    let _ = events_tx.send(MatchRuntimeEvent::MatchFinalized {
                        winner: result.winner,
                    });
                    Applied {
                        value: result,
                        emit_warning,
                    }
                });
            let _ = resp.send(res);
        }
        Command::Flush { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (flush_tx, flush_rx) = oneshot::channel();
                if tx.send(PersistMsg::Flush { resp: flush_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    flush_rx
                        .await
                        .map_err(|_| RuntimeError::ChannelClosed)
                        .and_then(|r| r.map_err(RuntimeError::from))
                }
            } else {
                Ok(session.latest_event_seq())
            };
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (done_tx, done_rx) = oneshot::channel();
                if tx.send(PersistMsg::Shutdown { resp: done_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    done_rx.await.map_err(|_| RuntimeError::ChannelClosed)
                }
            } else {
                Ok(())
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

fn after_point(
    res: Result<PointOutcome, RuntimeError>,
    slot: Slot,
    session: &mut MatchSession,
    events_tx: &broadcast::Sender<MatchRuntimeEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) -> Result<Applied<Arc<ScoreState>>, RuntimeError> {
    let PointOutcome {
        state,
        game_won,
        set_won,
    } = res?;
    let emit_warning = forward_pending(session, events_tx, persist_tx);

    let _ = events_tx.send(MatchRuntimeEvent::PointAwarded {
        slot,
        game_won,
        set_won,
    });

    Ok(Applied {
        value: state,
        emit_warning,
    })
}

/// Hands pending events and any final result to the persistence worker.
///
/// Returns the first delivery failure; later events are still attempted.
fn forward_pending(
    session: &mut MatchSession,
    events_tx: &broadcast::Sender<MatchRuntimeEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) -> Option<PersistError> {
    let events = session.drain_pending_events();
    let result = session.take_pending_result();

    let Some(tx) = persist_tx else {
        if let Some(last) = events.last() {
            let _ = events_tx.send(MatchRuntimeEvent::DurableUpTo { seq: last.seq });
        }
        return None;
    };

    let mut warning = None;
    for stored in events {
        let seq = stored.seq;
        if let Err(err) = enqueue_persist(tx, PersistMsg::Event(stored)) {
            warn!(match_id = %session.match_id(), seq, error = %err, "event emission failed");
            warning.get_or_insert(err);
        }
    }

    if let Some(result) = result {
        let msg = PersistMsg::Result {
            match_id: session.match_id().clone(),
            result,
        };
        if let Err(err) = enqueue_persist(tx, msg) {
            warn!(match_id = %session.match_id(), error = %err, "result emission failed");
            warning.get_or_insert(err);
        }
    }

    if let Some(err) = &warning {
        let _ = events_tx.send(MatchRuntimeEvent::EmitFailed {
            reason: err.to_string(),
        });
    }
    warning
}

/// Contiguous durable prefix of the journal.
///
/// A dropped batch pins the mark below its first sequence for good, even when
/// later batches are stored.
#[derive(Debug, Default)]
struct Durability {
    high: EventSeq,
    gap_from: Option<EventSeq>,
}

impl Durability {
    fn stored(&mut self, seq: EventSeq) {
        self.high = self.high.max(seq);
    }

    fn lost(&mut self, first: EventSeq) {
        self.gap_from = Some(self.gap_from.map_or(first, |gap| gap.min(first)));
    }

    fn mark(&self) -> EventSeq {
        match self.gap_from {
            Some(first) => self.high.min(first.saturating_sub(1)),
            None => self.high,
        }
    }
}

type DurableTx = mpsc::UnboundedSender<Result<EventSeq, PersistError>>;

/// Worker-side batch buffer in front of the sink.
struct BatchWriter {
    sink: Arc<Mutex<Box<dyn EventSink>>>,
    buf: Vec<StoredEvent>,
    durability: Durability,
    durable_tx: DurableTx,
}

impl BatchWriter {
    /// Appends the buffered batch. A failed batch is dropped and recorded as a gap.
    async fn flush(&mut self, call_flush: bool) -> Result<(), PersistError> {
        if self.buf.is_empty() {
            if call_flush {
                let sink_ref = Arc::clone(&self.sink);
                tokio::task::spawn_blocking(move || {
                    let mut sink = sink_ref.blocking_lock();
                    sink.flush()
                })
                .await
                .map_err(|e| PersistError::Message(format!("join error: {e}")))??;
            }
            return Ok(());
        }

        let events = std::mem::take(&mut self.buf);
        let count = events.len();
        let (first, last) = match (events.first(), events.last()) {
            (Some(first), Some(last)) => (first.seq, last.seq),
            _ => return Ok(()),
        };
        let sink_ref = Arc::clone(&self.sink);
        let append_res = tokio::task::spawn_blocking(move || {
            let mut sink = sink_ref.blocking_lock();
            let seq = sink.append_events(&events)?;
            if call_flush {
                sink.flush()?;
            }
            Ok::<_, PersistError>(seq)
        })
        .await
        .map_err(|e| PersistError::Message(format!("join error: {e}")));

        match append_res.and_then(|inner| inner) {
            Ok(seq) => {
                self.durability.stored(seq);
                let durable = self.durability.mark();
                debug!(count, durable, "event batch persisted");
                let _ = self.durable_tx.send(Ok(durable));
                Ok(())
            }
            Err(err) => {
                self.durability.lost(first);
                self.report(format!("append of seqs {first}..={last} failed: {err}"));
                Err(err)
            }
        }
    }

    async fn record_result(&mut self, match_id: MatchId, result: MatchResult) {
        if self.flush(true).await.is_err() {
            self.report(format!(
                "final result for {match_id} not recorded: preceding events were not persisted"
            ));
            return;
        }

        let sink_ref = Arc::clone(&self.sink);
        let result_id = match_id.clone();
        let recorded = tokio::task::spawn_blocking(move || {
            let mut sink = sink_ref.blocking_lock();
            sink.record_result(&result_id, &result)?;
            sink.flush()
        })
        .await
        .map_err(|e| PersistError::Message(format!("join error: {e}")))
        .and_then(|inner| inner);
        if let Err(err) = recorded {
            self.report(format!("record result for {match_id} failed: {err}"));
        }
    }

    fn report(&self, reason: String) {
        let _ = self.durable_tx.send(Err(PersistError::Message(reason)));
    }
}

fn spawn_persistence_worker(
    sink: Box<dyn EventSink>,
    mut rx: mpsc::Receiver<PersistMsg>,
    durable_tx: DurableTx,
    config: RuntimeConfig,
) {
    let mut writer = BatchWriter {
        sink: Arc::new(Mutex::new(sink)),
        buf: Vec::new(),
        durability: Durability::default(),
        durable_tx,
    };
    tokio::spawn(async move {
        let latency = Duration::from_millis(config.batch_max_latency_ms);
        let mut deadline = Instant::now() + latency;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = writer.flush(true).await;
                        break;
                    };

                    match msg {
                        PersistMsg::Event(stored) => {
                            let milestone = stored.event.kind.is_milestone();
                            writer.buf.push(stored);

                            let full = writer.buf.len() >= config.batch_max_events;
                            if full || (config.flush_on_game && milestone) {
                                let _ = writer.flush(true).await;
                                deadline = Instant::now() + latency;
                            }
                        }
                        PersistMsg::Result { match_id, result } => {
                            writer.record_result(match_id, result).await;
                            deadline = Instant::now() + latency;
                        }
                        PersistMsg::Flush { resp } => {
                            let result = writer.flush(true).await;
                            let _ = resp.send(result.map(|_| writer.durability.mark()));
                            deadline = Instant::now() + latency;
                        }
                        PersistMsg::Shutdown { resp } => {
                            let _ = writer.flush(true).await;
                            let _ = resp.send(());
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline), if !writer.buf.is_empty() => {
                    let _ = writer.flush(false).await;
                    deadline = Instant::now() + latency;
                }
            }
        }
    });
}

fn enqueue_persist(tx: &mpsc::Sender<PersistMsg>, msg: PersistMsg) -> Result<(), PersistError> {
    tx.try_send(msg)
        .map_err(|err| PersistError::Message(format!("persist queue error: {err}")))
}
