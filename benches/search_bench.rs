//! 搜索性能基准
//!
//! 走法生成、静态评估、走法排序和固定深度搜索。

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shogi_ai::test_positions;
use shogi_ai::{AIConfig, Board, Evaluator, FuzzyProfile, MoveOrderer, ShogiAI};

fn bench_legal_moves(c: &mut Criterion) {
    let board = Board::from_sfen(test_positions::MID_1).unwrap();

    c.bench_function("legal_moves_mid_1", |b| {
        b.iter(|| black_box(board.get_legal_moves().len()))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let board = Board::from_sfen(test_positions::MID_1).unwrap();
    let evaluator = Evaluator::new(FuzzyProfile::balanced());

    c.bench_function("evaluate_mid_1", |b| {
        b.iter(|| black_box(evaluator.evaluate(&board)))
    });
}

fn bench_order_moves(c: &mut Criterion) {
    let mut board = Board::from_sfen(test_positions::MID_1).unwrap();
    let moves = board.get_legal_moves();
    let mut orderer = MoveOrderer::new(Some(1));

    c.bench_function("order_moves_mid_1", |b| {
        b.iter(|| black_box(orderer.order(&mut board, &moves).len()))
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for depth in [1u32, 2] {
        group.bench_function(format!("startpos_depth_{}", depth), |b| {
            b.iter(|| {
                let mut board = Board::startpos();
                let config = AIConfig {
                    depth,
                    seed: Some(7),
                    time_limit: None,
                    ..AIConfig::default()
                };
                let mut ai = ShogiAI::new(config, FuzzyProfile::default());
                black_box(ai.get_best_move(&mut board))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_legal_moves,
    bench_evaluate,
    bench_order_moves,
    bench_search,
);
criterion_main!(benches);
