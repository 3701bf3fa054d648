//! A read-only table of exact scores for shallow positions
//!
//! Books are generated offline (see the `bookgen` binary) by exhaustively
//! solving every position up to a fixed depth, and persisted in a single
//! binary file. Positions are indexed by their mirror-symmetric base-3 key,
//! so a position and its horizontal reflection share one entry.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;

use crate::bitboard::BitBoard;
use crate::transposition_table::{PartialKey, TranspositionTable};
use crate::{HEIGHT, WIDTH};

/// A book table with its partial-key width erased
///
/// Book files store truncated keys in 1, 2 or 4 bytes depending on the
/// depth and table size they were generated with; the variant is picked
/// from the file header at load time
pub enum BookTable {
    Narrow(TranspositionTable<u8>),
    Medium(TranspositionTable<u16>),
    Wide(TranspositionTable<u32>),
}

impl BookTable {
    fn get(&self, key: u64) -> u8 {
        match self {
            BookTable::Narrow(table) => table.get(key),
            BookTable::Medium(table) => table.get(key),
            BookTable::Wide(table) => table.get(key),
        }
    }
}

impl From<TranspositionTable<u8>> for BookTable {
    fn from(table: TranspositionTable<u8>) -> Self {
        BookTable::Narrow(table)
    }
}
impl From<TranspositionTable<u16>> for BookTable {
    fn from(table: TranspositionTable<u16>) -> Self {
        BookTable::Medium(table)
    }
}
impl From<TranspositionTable<u32>> for BookTable {
    fn from(table: TranspositionTable<u32>) -> Self {
        BookTable::Wide(table)
    }
}

/// Exact scores for all positions up to a generation-time depth
///
/// # Notes
/// An `OpeningBook` starts empty and stays empty if loading fails, in which
/// case every lookup reports a miss and the search simply runs deeper.
/// Stored values are scores biased by `-MIN_SCORE + 1` so that 0 never
/// collides with the table's empty-slot marker
///
/// # File format
/// Little-endian binary, in order:
/// - 1 byte: board width
/// - 1 byte: board height
/// - 1 byte: max stored position depth
/// - 1 byte: partial key width in bytes (1, 2 or 4)
/// - 1 byte: value width in bytes (must be 1)
/// - 1 byte: log2 of the table size; the slot count is the smallest prime
///   above 2^log_size
/// - slot count * key width bytes: partial keys
/// - slot count bytes: values
pub struct OpeningBook {
    // present only after a successful load
    data: Option<(usize, BookTable)>,
}

impl OpeningBook {
    /// Creates an empty book; every lookup misses until a file is loaded
    pub fn new() -> Self {
        Self { data: None }
    }

    /// Creates a loaded book from a generated table
    pub fn from_table(depth: usize, table: impl Into<BookTable>) -> Self {
        Self {
            data: Some((depth, table.into())),
        }
    }

    /// Returns the biased score stored for a position, or 0 when the
    /// position is deeper than the book or absent from it
    pub fn get(&self, board: &BitBoard) -> u8 {
        match &self.data {
            Some((depth, table)) if board.num_moves() <= *depth => table.get(board.key3()),
            _ => 0,
        }
    }

    /// Replaces the book contents from a file
    ///
    /// Returns `Err` on a missing file, a header describing a different
    /// board or table layout, or a truncated byte stream. The book is left
    /// empty in every failure case
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.data = None;
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let mut header = [0; 6];
        reader.read_exact(&mut header).context("reading header")?;
        let [width, height, depth, partial_key_bytes, value_bytes, log_size] = header;

        if width as usize != WIDTH {
            bail!("invalid width (found: {width}, expected: {WIDTH})");
        }
        if height as usize != HEIGHT {
            bail!("invalid height (found: {height}, expected: {HEIGHT})");
        }
        if depth as usize > WIDTH * HEIGHT {
            bail!("invalid depth (found: {depth})");
        }
        if value_bytes != 1 {
            bail!("invalid value size (found: {value_bytes}, expected: 1)");
        }
        if !(21..=27).contains(&log_size) {
            bail!("unsupported table size (found log2: {log_size})");
        }

        let table = match partial_key_bytes {
            1 => BookTable::Narrow(read_table(&mut reader, log_size)?),
            2 => BookTable::Medium(read_table(&mut reader, log_size)?),
            4 => BookTable::Wide(read_table(&mut reader, log_size)?),
            _ => bail!("invalid internal key size (found: {partial_key_bytes} bytes)"),
        };

        self.data = Some((depth as usize, table));
        info!(
            "loaded opening book {} holding positions up to {} moves",
            path.display(),
            depth
        );
        Ok(())
    }

    /// Writes the book to a file in the format accepted by [`OpeningBook::load`]
    ///
    /// [`OpeningBook::load`]: #method.load
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let (depth, table) = self.data.as_ref().context("no book data to save")?;
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        match table {
            BookTable::Narrow(table) => write_table(&mut writer, *depth, table)?,
            BookTable::Medium(table) => write_table(&mut writer, *depth, table)?,
            BookTable::Wide(table) => write_table(&mut writer, *depth, table)?,
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self::new()
    }
}

fn read_table<K: PartialKey, R: Read>(reader: &mut R, log_size: u8) -> Result<TranspositionTable<K>> {
    let mut table = TranspositionTable::new(log_size);
    let (partial_keys, values) = table.arrays_mut();

    let mut buffer = vec![0; partial_keys.len() * K::BYTES];
    reader.read_exact(&mut buffer).context("reading key array")?;
    for (slot, bytes) in partial_keys.iter_mut().zip(buffer.chunks_exact(K::BYTES)) {
        *slot = K::read_le(bytes);
    }

    reader.read_exact(values).context("reading value array")?;
    Ok(table)
}

fn write_table<K: PartialKey, W: Write>(
    writer: &mut W,
    depth: usize,
    table: &TranspositionTable<K>,
) -> Result<()> {
    // the capacity is the next prime above 2^log_size, so the log is recoverable
    let log_size = table.capacity().ilog2() as u8;
    writer.write_all(&[
        WIDTH as u8,
        HEIGHT as u8,
        depth as u8,
        K::BYTES as u8,
        1,
        log_size,
    ])?;

    let (partial_keys, values) = table.arrays();
    let mut buffer = [0; 8];
    for key in partial_keys {
        key.write_le(&mut buffer[..K::BYTES]);
        writer.write_all(&buffer[..K::BYTES])?;
    }
    writer.write_all(values)?;
    Ok(())
}
