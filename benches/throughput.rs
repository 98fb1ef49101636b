use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use matchscore::{
    core::{engine::award_point, history::HistoryManager, session::MatchSession},
    score::ScoreState,
    types::{MatchId, PlayerId, PointKind, Slot},
};

fn rally_slot(i: u64) -> Slot {
    if (i * 7 + i / 3) % 5 < 3 {
        Slot::SlotA
    } else {
        Slot::SlotB
    }
}

fn bench_engine(c: &mut Criterion) {
    c.bench_function("engine_award_10k", |b| {
        b.iter(|| {
            let mut state = ScoreState::new();
            for i in 0..10_000u64 {
                state = award_point(&state, rally_slot(i), PointKind::Normal).state;
            }
            state
        });
    });
}

fn bench_session(c: &mut Criterion) {
    c.bench_function("session_award_10k", |b| {
        b.iter(|| {
            let mut session =
                MatchSession::start(MatchId::new("bench"), PlayerId::new("a"), PlayerId::new("b"))
                    .expect("start");
            for i in 0..10_000u64 {
                let _ = session
                    .award_point(rally_slot(i), PointKind::Winner)
                    .expect("point");
                if i % 64 == 0 {
                    let _ = session.drain_pending_events();
                }
            }
        });
    });
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_checkpoint");
    let state = std::sync::Arc::new(ScoreState::new());

    for cap in [10usize, 50usize, 500usize] {
        group.bench_with_input(BenchmarkId::from_parameter(cap), &cap, |b, &cap| {
            b.iter(|| {
                let mut history = HistoryManager::with_capacity(cap);
                for _ in 0..5_000 {
                    history.checkpoint(std::sync::Arc::clone(&state), "bench");
                }
                history.len()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engine, bench_session, bench_history);
criterion_main!(benches);
