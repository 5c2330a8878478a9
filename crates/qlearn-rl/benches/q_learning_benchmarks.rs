//! Q-Learning Benchmarks
//!
//! Benchmarks for the hot paths of tabular Q-Learning:
//! - Greedy and epsilon-greedy action selection
//! - Single value update
//! - Full episodes and short training runs on FrozenLake
//!
//! ## Performance Targets
//! - Action selection: < 100ns per call on a 64x4 table
//! - Update: < 100ns per call
//! - 4x4 FrozenLake episode: < 10µs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use qlearn_core::RenderMode;
use qlearn_env::{make, FrozenLakeOptions, FROZEN_LAKE, FROZEN_LAKE_8X8};
use qlearn_rl::{AgentConfig, QLearningAgent, QTable};

fn lake(id: &str) -> qlearn_env::TimeLimit<qlearn_env::FrozenLake> {
    make(id, &FrozenLakeOptions::default(), RenderMode::None).unwrap()
}

fn bench_action_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("action_selection");

    let mut table = QTable::new(64, 4);
    for s in 0..64 {
        table.set(s, s % 4, s as f64 * 0.01).unwrap();
    }
    let mut agent =
        QLearningAgent::with_table(lake(FROZEN_LAKE_8X8), AgentConfig::default(), table).unwrap();

    group.bench_function("greedy", |b| {
        b.iter(|| agent.greedy(black_box(37)).unwrap());
    });

    group.bench_function("eps_greedy", |b| {
        b.iter(|| agent.eps_greedy(black_box(37)).unwrap());
    });

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut agent = QLearningAgent::new(lake(FROZEN_LAKE_8X8), AgentConfig::default()).unwrap();

    c.bench_function("update", |b| {
        b.iter(|| {
            agent
                .update(black_box(10), black_box(2), black_box(1.0), black_box(11))
                .unwrap()
        });
    });
}

fn bench_episodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("episode");

    for id in [FROZEN_LAKE, FROZEN_LAKE_8X8] {
        let mut agent = QLearningAgent::new(lake(id), AgentConfig::default())
            .unwrap()
            .with_log_interval(0);
        group.bench_with_input(BenchmarkId::new("run_episode", id), &id, |b, _| {
            b.iter(|| agent.run_episode().unwrap());
        });
    }

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");
    group.sample_size(20);

    for episodes in [100usize, 1000] {
        group.throughput(Throughput::Elements(episodes as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(episodes),
            &episodes,
            |b, &episodes| {
                b.iter(|| {
                    let mut agent = QLearningAgent::new(lake(FROZEN_LAKE), AgentConfig::default())
                        .unwrap()
                        .with_log_interval(0);
                    agent.train(episodes).unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_action_selection,
    bench_update,
    bench_episodes,
    bench_training
);
criterion_main!(benches);
