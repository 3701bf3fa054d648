//! Offline opening book tooling
//!
//! `explore` enumerates every reachable position up to a depth, one move
//! sequence per line, skipping positions already seen under horizontal
//! mirroring. Piping those sequences through the solver and back into
//! `build` produces the binary book file the solver loads at startup:
//!
//! ```sh
//! bookgen explore --depth 14 > positions
//! c4solver < positions > scored
//! bookgen build --depth 14 < scored
//! ```

use std::collections::HashSet;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use connect4_solver::bitboard::BitBoard;
use connect4_solver::opening_book::{BookTable, OpeningBook};
use connect4_solver::solver::{MAX_SCORE, MIN_SCORE};
use connect4_solver::transposition_table::{PartialKey, TranspositionTable};
use connect4_solver::{HEIGHT, WIDTH};

const LOG2_3: f64 = 1.584_962_500_72;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every unique position up to a depth, one move sequence per line
    Explore {
        /// Maximum number of moves in the printed positions
        #[arg(long, default_value_t = 14)]
        depth: usize,
    },
    /// Read "sequence score" lines from stdin and write a book file
    Build {
        /// Maximum number of moves of the stored positions
        #[arg(long, default_value_t = 14)]
        depth: usize,

        /// log2 of the book table size
        #[arg(long, default_value_t = 23)]
        log_size: u8,

        /// Output file (defaults to WxH.book)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );
    let args = Args::parse();

    match args.command {
        Command::Explore { depth } => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let mut visited = HashSet::new();
            explore(
                &BitBoard::new(),
                &mut String::with_capacity(depth),
                depth,
                &mut visited,
                &mut out,
            )?;
            out.flush()?;
            log::info!("explored {} unique positions", visited.len());
        }
        Command::Build {
            depth,
            log_size,
            out,
        } => {
            let out = out.unwrap_or_else(|| PathBuf::from(format!("{}x{}.book", WIDTH, HEIGHT)));

            // a depth-d book key uses (d + WIDTH - 1) base-3 digits; whatever
            // the table index does not pin down must fit the stored key
            let key_bits = ((depth + WIDTH - 1) as f64 * LOG2_3) as usize + 1;
            let partial_key_bits = key_bits.saturating_sub(log_size as usize);
            let book = match partial_key_bits {
                0..=8 => build_book::<u8>(depth, log_size)?,
                9..=16 => build_book::<u16>(depth, log_size)?,
                17..=32 => build_book::<u32>(depth, log_size)?,
                _ => bail!(
                    "depth {} needs {} partial key bits, more than any book layout holds",
                    depth,
                    partial_key_bits
                ),
            };

            book.save(&out)?;
            log::info!("wrote opening book {}", out.display());
        }
    }
    Ok(())
}

/// Prints each position reachable within `depth` moves exactly once
fn explore(
    board: &BitBoard,
    sequence: &mut String,
    depth: usize,
    visited: &mut HashSet<u64>,
    out: &mut impl Write,
) -> Result<()> {
    // mirrored duplicates share a key and are pruned here
    if !visited.insert(board.key3()) {
        return Ok(());
    }

    writeln!(out, "{}", sequence)?;
    if board.num_moves() >= depth {
        return Ok(());
    }

    for column in 0..WIDTH {
        if board.playable(column) && !board.is_winning_move(column) {
            let mut child = *board;
            child.play_column(column);
            sequence.push((b'1' + column as u8) as char);
            explore(&child, sequence, depth, visited, out)?;
            sequence.pop();
        }
    }
    Ok(())
}

/// Collects scored positions from stdin into a book table
///
/// Input lines hold a move sequence, a space and the position's exact
/// score; reading stops at EOF or an empty line. Malformed lines are
/// logged and skipped
fn build_book<K: PartialKey>(depth: usize, log_size: u8) -> Result<OpeningBook>
where
    BookTable: From<TranspositionTable<K>>,
{
    let mut table: TranspositionTable<K> = TranspositionTable::new(log_size);
    let stdin = io::stdin();

    let mut count: u64 = 0;
    for line in stdin.lock().lines() {
        let line = line.context("reading scored positions")?;
        if line.is_empty() {
            break;
        }

        match parse_scored_position(&line) {
            Some((board, score)) => {
                table.put(board.key3(), (score - MIN_SCORE + 1) as u8);
            }
            None => {
                log::warn!("invalid line (line ignored): {}", line);
                continue;
            }
        }

        count += 1;
        if count % 1_000_000 == 0 {
            log::info!("{} positions stored", count);
        }
    }

    log::info!("stored {} scored positions", count);
    Ok(OpeningBook::from_table(depth, table))
}

fn parse_scored_position(line: &str) -> Option<(BitBoard, i32)> {
    let (sequence, score) = line.split_once(' ')?;
    let score: i32 = score.trim().parse().ok()?;
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return None;
    }
    let board = BitBoard::from_moves(sequence).ok()?;
    Some((board, score))
}
