use matchscore::{
    core::{
        engine::{ScoreChange, award_point, finalize_match},
        error::MatchError,
        session::MatchSession,
    },
    event::EventKind,
    score::ScoreState,
    types::{MatchId, PerSlot, PlayerId, PointKind, Slot},
};

fn session() -> MatchSession {
    MatchSession::start(MatchId::new("m-1"), PlayerId::new("alice"), PlayerId::new("bob"))
        .expect("start")
}

fn play(state: &ScoreState, slot: Slot, n: usize) -> ScoreState {
    (0..n).fold(state.clone(), |s, _| award_point(&s, slot, PointKind::Normal).state)
}

fn win_games(state: &ScoreState, slot: Slot, n: usize) -> ScoreState {
    (0..n).fold(state.clone(), |s, _| play(&s, slot, 4))
}

#[test]
fn four_straight_points_take_the_game_and_flip_serve() {
    let start = ScoreState::new();
    let mut state = start.clone();
    for _ in 0..3 {
        state = award_point(&state, Slot::SlotA, PointKind::Normal).state;
    }
    let t = award_point(&state, Slot::SlotA, PointKind::Ace);

    assert_eq!(t.state.games, PerSlot::new(1, 0));
    assert_eq!(t.state.points, PerSlot::new(0, 0));
    assert_eq!(t.state.serving, start.serving.opponent());
    assert_eq!(
        t.changes,
        vec![
            ScoreChange::GameWon { by: Slot::SlotA },
            ScoreChange::Point { by: Slot::SlotA, kind: PointKind::Ace },
        ]
    );
}

#[test]
fn deuce_advantage_and_back_to_deuce() {
    let mut state = play(&ScoreState::new(), Slot::SlotA, 3);
    state = play(&state, Slot::SlotB, 3);
    assert!(state.deuce);
    assert_eq!(state.advantage, None);

    state = award_point(&state, Slot::SlotA, PointKind::Normal).state;
    assert!(state.deuce);
    assert_eq!(state.advantage, Some(Slot::SlotA));

    let t = award_point(&state, Slot::SlotB, PointKind::Normal);
    assert!(t.state.deuce);
    assert_eq!(t.state.advantage, None);
    assert_eq!(t.state.games, PerSlot::new(0, 0));
    assert!(!t.game_won());
}

#[test]
fn advantage_converted_wins_the_game() {
    let mut state = play(&ScoreState::new(), Slot::SlotA, 3);
    state = play(&state, Slot::SlotB, 3);
    state = play(&state, Slot::SlotB, 1);
    assert_eq!(state.advantage, Some(Slot::SlotB));

    let t = award_point(&state, Slot::SlotB, PointKind::Winner);
    assert!(t.game_won());
    assert_eq!(t.state.games, PerSlot::new(0, 1));
    assert!(!t.state.deuce);
    assert_eq!(t.state.advantage, None);
}

#[test]
fn six_four_completes_the_set() {
    let mut state = win_games(&ScoreState::new(), Slot::SlotA, 4);
    state = win_games(&state, Slot::SlotB, 4);
    state = win_games(&state, Slot::SlotA, 1);
    assert_eq!(state.games, PerSlot::new(5, 4));
    assert!(state.sets.is_empty());

    let state = win_games(&state, Slot::SlotA, 1);
    assert_eq!(state.sets_won(Slot::SlotA), vec![6]);
    assert_eq!(state.sets_won(Slot::SlotB), vec![4]);
    assert_eq!(state.games, PerSlot::new(0, 0));
    assert_eq!(state.current_set, 2);
}

#[test]
fn six_five_does_not_complete_but_seven_five_and_seven_six_do() {
    let mut state = win_games(&ScoreState::new(), Slot::SlotA, 5);
    state = win_games(&state, Slot::SlotB, 5);
    state = win_games(&state, Slot::SlotA, 1);
    assert_eq!(state.games, PerSlot::new(6, 5));
    assert!(state.sets.is_empty());

    let seven_five = win_games(&state, Slot::SlotA, 1);
    assert_eq!(seven_five.sets, vec![PerSlot::new(7, 5)]);

    let six_all = win_games(&state, Slot::SlotB, 1);
    assert_eq!(six_all.games, PerSlot::new(6, 6));
    let seven_six = win_games(&six_all, Slot::SlotB, 1);
    assert_eq!(seven_six.sets, vec![PerSlot::new(6, 7)]);
    assert_eq!(seven_six.current_set, 2);
}

#[test]
fn score_point_reports_completed_game_and_set() {
    let mut s = session();
    for _ in 0..3 {
        let outcome = s.score_point(Slot::SlotA, PointKind::Normal).expect("point");
        assert!(!outcome.game_won && !outcome.set_won);
    }
    let game = s.score_point(Slot::SlotA, PointKind::Normal).expect("game point");
    assert!(game.game_won && !game.set_won);
    assert_eq!(game.state.games.a, 1);

    for _ in 0..19 {
        s.score_point(Slot::SlotA, PointKind::Normal).expect("point");
    }
    let set = s.score_point(Slot::SlotA, PointKind::Normal).expect("set point");
    assert!(set.game_won && set.set_won);
    assert_eq!(set.state.sets, vec![PerSlot::new(6, 0)]);
    assert_eq!(&*set.state, s.state());
}

#[test]
fn set_point_emits_game_then_set_then_point() {
    let mut s = session();
    for _ in 0..5 {
        for _ in 0..4 {
            s.award_point(Slot::SlotA, PointKind::Normal).expect("point");
        }
    }
    for _ in 0..3 {
        s.award_point(Slot::SlotA, PointKind::Normal).expect("point");
    }
    let before = s.latest_event_seq();
    s.drain_pending_events();

    let after = s.award_point(Slot::SlotA, PointKind::Ace).expect("set point");
    let events = s.drain_pending_events();

    let kinds: Vec<_> = events.iter().map(|e| e.event.kind).collect();
    assert_eq!(kinds, vec![EventKind::GameWon, EventKind::SetWon, EventKind::Point]);
    assert_eq!(
        events.iter().map(|e| e.seq).collect::<Vec<_>>(),
        vec![before + 1, before + 2, before + 3]
    );
    for e in &events {
        assert_eq!(&e.event.snapshot, after.as_ref());
        assert_eq!(e.event.player_id, PlayerId::new("alice"));
    }
    assert_eq!(events[1].event.description, "Set 1 won by alice");
    assert_eq!(events[2].event.description, "Service ace");
    assert_eq!(events[2].event.metadata["point_kind"], "ace");
}

#[test]
fn start_emits_match_start_for_slot_a() {
    let mut s = session();
    let events = s.drain_pending_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].seq, 1);
    assert_eq!(events[0].event.kind, EventKind::MatchStart);
    assert_eq!(events[0].event.player_id, PlayerId::new("alice"));
    assert_eq!(events[0].event.snapshot, ScoreState::new());
}

#[test]
fn same_player_in_both_slots_is_rejected() {
    let err = MatchSession::start(MatchId::new("m"), PlayerId::new("x"), PlayerId::new("x"))
        .expect_err("same player");
    assert_eq!(err, MatchError::SamePlayer(PlayerId::new("x")));
}

#[test]
fn unknown_player_is_rejected_without_side_effects() {
    let mut s = session();
    s.drain_pending_events();
    let err = s
        .award_point_to(&PlayerId::new("carol"), PointKind::Normal)
        .expect_err("unknown");
    assert_eq!(err, MatchError::UnknownPlayer(PlayerId::new("carol")));
    assert_eq!(s.state(), &ScoreState::new());
    assert!(!s.can_undo());
    assert!(s.drain_pending_events().is_empty());

    s.award_point_to(&PlayerId::new("bob"), PointKind::Normal)
        .expect("known player");
    assert_eq!(s.state().points, PerSlot::new(0, 1));
}

#[test]
fn finalize_picks_pairwise_set_winner() {
    let mut state = ScoreState::new();
    state.sets = vec![PerSlot::new(6, 3), PerSlot::new(4, 6), PerSlot::new(7, 5)];
    let (winner, score) = finalize_match(&state).expect("finalize");
    assert_eq!(winner, Slot::SlotA);
    assert_eq!(score, "6-4-7 vs 3-6-5");
}

#[test]
fn finalize_rejects_empty_and_tied_matches() {
    assert_eq!(finalize_match(&ScoreState::new()), Err(MatchError::NoSetsRecorded));

    let mut state = ScoreState::new();
    state.sets = vec![PerSlot::new(6, 3), PerSlot::new(4, 6)];
    assert_eq!(finalize_match(&state), Err(MatchError::SetsTied { sets_each: 1 }));
}

#[test]
fn finalized_session_emits_match_end_and_locks() {
    let mut s = session();
    for _ in 0..24 {
        s.award_point(Slot::SlotB, PointKind::Normal).expect("point");
    }
    s.drain_pending_events();

    let result = s.finalize().expect("finalize");
    assert_eq!(result.winner, Slot::SlotB);
    assert_eq!(result.winner_id, PlayerId::new("bob"));
    assert_eq!(result.score, "0 vs 6");

    let events = s.drain_pending_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.kind, EventKind::MatchEnd);
    assert_eq!(events[0].event.description, "Match completed. Final score: 0 vs 6");
    assert_eq!(events[0].event.metadata["winner"], "bob");
    assert_eq!(s.take_pending_result(), Some(result));
    assert_eq!(s.take_pending_result(), None);

    assert!(!s.can_undo());
    assert_eq!(s.award_point(Slot::SlotA, PointKind::Normal), Err(MatchError::MatchFinished));
    assert_eq!(s.finalize(), Err(MatchError::MatchFinished));
}
