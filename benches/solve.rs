use criterion::*;

use connect4_solver::bitboard::BitBoard;
use connect4_solver::solver::Solver;
use connect4_solver::WIDTH;

/// Builds a legal alignment-free position by cycling through the columns,
/// skipping full columns and moves that would win
fn deep_position(plies: usize) -> BitBoard {
    let mut board = BitBoard::new();
    for i in 0..plies {
        for offset in 0..WIDTH {
            let column = (i + offset) % WIDTH;
            if board.playable(column) && !board.is_winning_move(column) {
                board.play_column(column);
                break;
            }
        }
    }
    board
}

fn criterion_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(20);

    for plies in [32, 28, 24] {
        let board = deep_position(plies);
        let mut solver = Solver::new();

        group.bench_with_input(BenchmarkId::from_parameter(plies), &board, |b, board| {
            b.iter(|| {
                solver.reset();
                black_box(solver.solve(board, false))
            })
        });
    }

    group.finish();
}

criterion_group!(solve, criterion_solve);
criterion_main!(solve);
