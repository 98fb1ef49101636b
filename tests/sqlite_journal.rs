use tempfile::TempDir;

use matchscore::{
    core::session::MatchSession,
    event::EventKind,
    persist::{EventSink, sqlite::SqliteEventSink},
    score::MatchStatus,
    types::{MatchId, PlayerId, PointKind, Slot},
};

fn session(id: &str) -> MatchSession {
    MatchSession::start(MatchId::new(id), PlayerId::new("p1"), PlayerId::new("p2")).expect("start")
}

#[test]
fn sqlite_journal_round_trips_events_in_order() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("events.db");

    let mut s = session("m-1");
    let mut sink = SqliteEventSink::open(&db_path).expect("open sqlite");

    for _ in 0..4 {
        s.award_point(Slot::SlotA, PointKind::Winner).expect("point");
    }
    s.award_point(Slot::SlotB, PointKind::DoubleFault).expect("point");
    s.undo().expect("undo");

    let events = s.drain_pending_events();
    let last = sink.append_events(&events).expect("append");
    assert_eq!(last, s.latest_event_seq());
    drop(sink);

    let reopened = SqliteEventSink::open(&db_path).expect("reopen");
    let loaded = reopened.load_events(s.match_id()).expect("load");
    assert_eq!(loaded, events);
    assert_eq!(reopened.latest_seq(s.match_id()).expect("latest"), last);

    let kinds: Vec<_> = loaded.iter().map(|e| e.event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::MatchStart,
            EventKind::Point,
            EventKind::Point,
            EventKind::Point,
            EventKind::GameWon,
            EventKind::Point,
            EventKind::Point,
        ]
    );

    let tail = reopened.load_events_after(s.match_id(), 5).expect("tail");
    assert_eq!(tail.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![6, 7]);
}

#[test]
fn journals_are_kept_per_match_and_results_recorded() {
    let mut sink = SqliteEventSink::open_in_memory().expect("open");
    let mut first = session("m-1");
    let mut second = session("m-2");

    for _ in 0..24 {
        first.award_point(Slot::SlotA, PointKind::Normal).expect("point");
    }
    second.award_point(Slot::SlotB, PointKind::Ace).expect("point");

    let result = first.finalize().expect("finalize");
    sink.append_events(&first.drain_pending_events()).expect("append first");
    sink.append_events(&second.drain_pending_events()).expect("append second");
    sink.record_result(first.match_id(), &result).expect("result");

    assert_eq!(sink.load_events(second.match_id()).expect("second").len(), 2);
    assert_eq!(sink.latest_seq(&MatchId::new("unknown")).expect("latest"), 0);

    let stored = sink.load_result(first.match_id()).expect("load").expect("result");
    assert_eq!(stored.status, MatchStatus::Completed);
    assert_eq!(stored.winner_id, PlayerId::new("p1"));
    assert_eq!(stored.score, "6 vs 0");
    assert_eq!(sink.load_result(second.match_id()).expect("load"), None);
}
