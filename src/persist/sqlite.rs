//! SQLite-backed append-only match event journal.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    core::emitter::now_ms,
    event::{EVENT_FORMAT_VERSION, StoredEvent, StoredEventEnvelope},
    score::MatchResult,
    types::{EventSeq, MatchId},
};

use super::{EventSink, PersistResult};

/// SQLite implementation of [`crate::persist::EventSink`].
pub struct SqliteEventSink {
    conn: Connection,
}

impl SqliteEventSink {
    /// Opens or creates a SQLite-backed sink at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite sink.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Loads every event of `match_id` in sequence order.
    pub fn load_events(&self, match_id: &MatchId) -> PersistResult<Vec<StoredEvent>> {
        self.load_events_after(match_id, 0)
    }

    /// Loads events of `match_id` strictly after `seq`.
    pub fn load_events_after(
        &self,
        match_id: &MatchId,
        seq: EventSeq,
    ) -> PersistResult<Vec<StoredEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT seq, ts_ms, payload FROM events WHERE match_id = ?1 AND seq > ?2 ORDER BY seq ASC",
        )?;

        let rows = stmt.query_map(params![match_id.as_str(), seq as i64], |row| {
            let seq: i64 = row.get(0)?;
            let ts_ms: i64 = row.get(1)?;
            let payload: Vec<u8> = row.get(2)?;
            let mut stored = decode_event_payload(&payload).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(
                    payload.len(),
                    rusqlite::types::Type::Blob,
                    Box::new(std::io::Error::other(err)),
                )
            })?;
            stored.seq = seq as EventSeq;
            stored.ts_ms = ts_ms as u64;
            Ok(stored)
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Highest sequence journaled for `match_id`, or 0.
    pub fn latest_seq(&self, match_id: &MatchId) -> PersistResult<EventSeq> {
        let seq: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(seq) FROM events WHERE match_id = ?1",
                params![match_id.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        Ok(seq.unwrap_or(0) as EventSeq)
    }

    /// Final result recorded for `match_id`, if any.
    pub fn load_result(&self, match_id: &MatchId) -> PersistResult<Option<MatchResult>> {
        let payload: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT payload FROM results WHERE match_id = ?1",
                params![match_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&payload)?))
    }
}

impl EventSink for SqliteEventSink {
    fn append_events(&mut self, events: &[StoredEvent]) -> PersistResult<EventSeq> {
        let Some(last) = events.last() else {
            return Ok(0);
        };
        let last_seq = last.seq;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO events(match_id, seq, ts_ms, kind, player_id, payload) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for stored in events {
                let payload = serde_json::to_vec(&StoredEventEnvelope::new(stored.clone()))?;
                stmt.execute(params![
                    stored.match_id.as_str(),
                    stored.seq as i64,
                    stored.ts_ms as i64,
                    stored.event.kind.as_str(),
                    stored.event.player_id.as_str(),
                    payload,
                ])?;
            }
        }
        tx.commit()?;

        Ok(last_seq)
    }

    fn record_result(&mut self, match_id: &MatchId, result: &MatchResult) -> PersistResult<()> {
        let payload = serde_json::to_vec(result)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO results(match_id, ts_ms, status, winner_id, score, payload) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                match_id.as_str(),
                now_ms() as i64,
                result.status.as_str(),
                result.winner_id.as_str(),
                result.score,
                payload,
            ],
        )?;
        Ok(())
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}

fn decode_event_payload(payload: &[u8]) -> Result<StoredEvent, String> {
    let envelope = serde_json::from_slice::<StoredEventEnvelope>(payload)
        .map_err(|e| format!("event payload decode failed: {e}"))?;
    if envelope.format_version != EVENT_FORMAT_VERSION {
        return Err(format!(
            "unsupported event format version: {}",
            envelope.format_version
        ));
    }
    Ok(envelope.stored)
}
