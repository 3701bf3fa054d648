//! Line-oriented solver frontend
//!
//! Reads one move sequence per line from standard input and prints the
//! sequence followed by its score (or one score per column with
//! `--analyze`). Illegal lines produce an empty output line and a logged
//! diagnostic naming the failing ply.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use connect4_solver::bitboard::BitBoard;
use connect4_solver::solver::Solver;
use connect4_solver::{HEIGHT, WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Only determine who wins: scores are reported as -1, 0 or 1
    #[arg(short, long)]
    weak: bool,

    /// Report a score for every column instead of one for the position
    #[arg(short, long)]
    analyze: bool,

    /// Opening book file
    #[arg(short, long)]
    book: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );
    let args = Args::parse();

    let mut solver = Solver::new();
    let book_path = args
        .book
        .unwrap_or_else(|| PathBuf::from(format!("{}x{}.book", WIDTH, HEIGHT)));
    if let Err(err) = solver.load_book(&book_path) {
        log::warn!(
            "no opening book, continuing without: {:#}",
            err
        );
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (i, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        match BitBoard::from_moves(&line) {
            Err(err) => {
                log::error!("line {}: {} \"{}\"", i + 1, err, line);
                writeln!(out)?;
            }
            Ok(board) => {
                solver.reset();
                let start = Instant::now();

                write!(out, "{}", line)?;
                if args.analyze {
                    for score in solver.analyze(&board, args.weak) {
                        write!(out, " {}", score)?;
                    }
                } else {
                    write!(out, " {}", solver.solve(&board, args.weak))?;
                }
                writeln!(out)?;

                log::debug!(
                    "line {}: {} nodes in {}us",
                    i + 1,
                    solver.node_count(),
                    start.elapsed().as_micros()
                );
            }
        }
        out.flush()?;
    }
    Ok(())
}
