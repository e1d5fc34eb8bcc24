// Criterion benchmarks for Lume Swipe

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lume_swipe::core::{truncate_payload, EngineOptions, SwipeEngine};
use lume_swipe::models::{DecisionKind, Direction, MatchPair, NotificationKind, SwipeCommand};
use lume_swipe::services::MemoryStore;
use std::sync::Arc;
use uuid::Uuid;

fn like(actor_id: Uuid, target_id: Uuid) -> SwipeCommand {
    SwipeCommand {
        actor_id,
        target_id,
        kind: DecisionKind::Person,
        direction: Direction::Right,
    }
}

fn bench_truncate_payload(c: &mut Criterion) {
    let limit = NotificationKind::ChatMessage.payload_limit();
    let short = "see you at eight".to_string();
    let long: String = "héllo wörld ".repeat(100);

    c.bench_function("truncate_short_message", |b| {
        b.iter(|| truncate_payload(black_box(&short), black_box(limit)))
    });

    c.bench_function("truncate_long_message", |b| {
        b.iter(|| truncate_payload(black_box(&long), black_box(limit)))
    });
}

fn bench_pair_canonicalization(c: &mut Criterion) {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    c.bench_function("match_pair_lock_key", |bench| {
        bench.iter(|| MatchPair::new(black_box(b), black_box(a)).lock_key())
    });
}

fn bench_swipe(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("swipe");

    for pair_count in [10, 100, 500].iter() {
        group.bench_with_input(
            BenchmarkId::new("mutual_likes", pair_count),
            pair_count,
            |b, &pair_count| {
                b.iter(|| {
                    runtime.block_on(async {
                        let engine = SwipeEngine::new(
                            Arc::new(MemoryStore::new()),
                            EngineOptions::default(),
                        );

                        for _ in 0..pair_count {
                            let first = Uuid::new_v4();
                            let second = Uuid::new_v4();
                            engine.swipe(like(first, second)).await.unwrap();
                            black_box(engine.swipe(like(second, first)).await.unwrap());
                        }
                    })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_truncate_payload,
    bench_pair_canonicalization,
    bench_swipe
);

criterion_main!(benches);
