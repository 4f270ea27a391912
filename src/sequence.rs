//! This module implements the sequence buffer that the search operates on. A sequence of block size
//! `n` has `n² + 1` positions: a single leading symbol at position 0, followed by `n` blocks of `n`
//! symbols each (block `b` covers positions `b * n + 1 ..= (b + 1) * n`).
//!
//! All access is bounds-checked and reported through `SequenceError`, so that a bad index computed
//! by the search turns into an error value rather than a panic.

use std::fmt::Write;
use std::ops::Range;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_derive::Serialize;

use crate::types::{Position, Symbol};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("block size must be at least 2, got {0}")]
    InvalidBlockSize(usize),

    #[error("position {position} is outside of a sequence of length {len}")]
    PositionOutOfRange { position: Position, len: usize },

    #[error("range {start}..{end} is outside of a sequence of length {len}")]
    RangeOutOfBounds { start: Position, end: Position, len: usize },

    #[error("symbol {symbol} is outside of the alphabet 1..={block_size}")]
    SymbolOutOfRange { symbol: Symbol, block_size: usize },

    #[error("expected {expected} symbols, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// A fixed-length sequence of symbols in `1..=n`, sized exactly `n² + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Sequence {
    block_size: usize,
    symbols: Vec<Symbol>,
}

impl Sequence {
    /// The number of positions in a sequence with the given block size.
    #[must_use]
    pub fn len_for_block_size(block_size: usize) -> usize {
        block_size * block_size + 1
    }

    /// Create a sequence with every position set to symbol 1.
    pub fn new(block_size: usize) -> Result<Sequence, SequenceError> {
        if block_size < 2 {
            return Err(SequenceError::InvalidBlockSize(block_size));
        }

        Ok(Sequence {
            block_size,
            symbols: vec![1; Sequence::len_for_block_size(block_size)],
        })
    }

    /// Build a sequence from explicit symbols, checking the length and the alphabet.
    pub fn from_symbols(block_size: usize, symbols: Vec<Symbol>) -> Result<Sequence, SequenceError> {
        if block_size < 2 {
            return Err(SequenceError::InvalidBlockSize(block_size));
        }

        let expected = Sequence::len_for_block_size(block_size);
        if symbols.len() != expected {
            return Err(SequenceError::InvalidLength {
                expected,
                actual: symbols.len(),
            });
        }

        if let Some(&symbol) = symbols
            .iter()
            .find(|&&symbol| !(1..=block_size).contains(&symbol))
        {
            return Err(SequenceError::SymbolOutOfRange { symbol, block_size });
        }

        Ok(Sequence { block_size, symbols })
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The last position of the sequence, `n²`.
    #[must_use]
    pub fn last_position(&self) -> Position {
        self.symbols.len() - 1
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Iterate over the `n` blocks, skipping the leading symbol.
    pub fn blocks(&self) -> impl Iterator<Item = &[Symbol]> {
        self.symbols[1..].chunks(self.block_size)
    }

    /// Iterate over every consecutive pair `(seq[k], seq[k + 1])`.
    pub fn pairs(&self) -> impl Iterator<Item = (Symbol, Symbol)> + '_ {
        self.symbols.windows(2).map(|window| (window[0], window[1]))
    }

    fn check_position(&self, position: Position) -> Result<(), SequenceError> {
        if position >= self.symbols.len() {
            return Err(SequenceError::PositionOutOfRange {
                position,
                len: self.symbols.len(),
            });
        }
        Ok(())
    }

    fn check_symbol(&self, symbol: Symbol) -> Result<(), SequenceError> {
        if !(1..=self.block_size).contains(&symbol) {
            return Err(SequenceError::SymbolOutOfRange {
                symbol,
                block_size: self.block_size,
            });
        }
        Ok(())
    }

    pub fn get(&self, position: Position) -> Result<Symbol, SequenceError> {
        self.check_position(position)?;
        Ok(self.symbols[position])
    }

    pub fn set(&mut self, position: Position, symbol: Symbol) -> Result<(), SequenceError> {
        self.check_position(position)?;
        self.check_symbol(symbol)?;
        self.symbols[position] = symbol;
        Ok(())
    }

    /// Bump the symbol at `position` by one, failing if it's already `n`.
    pub fn increment(&mut self, position: Position) -> Result<Symbol, SequenceError> {
        let next = self.get(position)? + 1;
        self.set(position, next)?;
        Ok(next)
    }

    /// Borrow a range of positions.
    pub fn window(&self, range: Range<Position>) -> Result<&[Symbol], SequenceError> {
        if range.start > range.end || range.end > self.symbols.len() {
            return Err(SequenceError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.symbols.len(),
            });
        }
        Ok(&self.symbols[range])
    }

    /// The first position of the block containing `position`. Position 0 isn't part of any block.
    pub fn block_start(&self, position: Position) -> Result<Position, SequenceError> {
        self.check_position(position)?;
        if position == 0 {
            return Err(SequenceError::PositionOutOfRange {
                position,
                len: self.symbols.len(),
            });
        }
        Ok((position - 1) / self.block_size * self.block_size + 1)
    }

    /// Where `position` sits within its block, 0 being the block head.
    pub fn block_offset(&self, position: Position) -> Result<usize, SequenceError> {
        Ok(position - self.block_start(position)?)
    }
}

/// Render a sequence as a grid: the leading symbol on its own line, then one block per line, each
/// symbol right-aligned in a field of width 3.
#[must_use]
pub fn render_grid(sequence: &Sequence) -> String {
    let mut rendered = String::new();
    let _ = writeln!(rendered, "{:>3}", sequence.symbols[0]);
    for block in sequence.blocks() {
        for symbol in block {
            let _ = write!(rendered, "{symbol:>3}");
        }
        rendered.push('\n');
    }
    rendered
}

/// Render a sequence on a single line, with every symbol followed by a comma.
#[must_use]
pub fn render_line(sequence: &Sequence) -> String {
    sequence
        .symbols
        .iter()
        .map(|symbol| format!("{symbol},"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_block_sequence() -> Sequence {
        Sequence::from_symbols(2, vec![1, 1, 2, 2, 1]).unwrap()
    }

    #[test]
    fn test_new_sequence_has_exact_length() {
        for n in 2..=20 {
            let sequence = Sequence::new(n).unwrap();
            assert_eq!(sequence.len(), n * n + 1);
            assert!(sequence.symbols().iter().all(|&symbol| symbol == 1));
        }
    }

    #[test]
    fn test_degenerate_block_sizes_are_rejected() {
        assert_eq!(Sequence::new(0), Err(SequenceError::InvalidBlockSize(0)));
        assert_eq!(Sequence::new(1), Err(SequenceError::InvalidBlockSize(1)));
    }

    #[test]
    fn test_from_symbols_checks_length_and_alphabet() {
        assert_eq!(
            Sequence::from_symbols(2, vec![1, 1, 2, 2]),
            Err(SequenceError::InvalidLength {
                expected: 5,
                actual: 4
            })
        );
        assert_eq!(
            Sequence::from_symbols(2, vec![1, 1, 2, 3, 1]),
            Err(SequenceError::SymbolOutOfRange {
                symbol: 3,
                block_size: 2
            })
        );
        assert_eq!(
            Sequence::from_symbols(2, vec![1, 0, 2, 2, 1]),
            Err(SequenceError::SymbolOutOfRange {
                symbol: 0,
                block_size: 2
            })
        );
    }

    #[test]
    fn test_access_is_bounds_checked() {
        let mut sequence = two_block_sequence();

        assert_eq!(sequence.get(4), Ok(1));
        assert_eq!(
            sequence.get(5),
            Err(SequenceError::PositionOutOfRange { position: 5, len: 5 })
        );
        assert!(sequence.set(5, 1).is_err());
        assert!(sequence.set(4, 3).is_err());
        assert!(sequence.window(3..6).is_err());
        assert_eq!(sequence.window(1..3), Ok(&[1, 2][..]));
    }

    #[test]
    fn test_increment_stops_at_block_size() {
        let mut sequence = two_block_sequence();

        assert_eq!(sequence.increment(4), Ok(2));
        assert_eq!(
            sequence.increment(4),
            Err(SequenceError::SymbolOutOfRange {
                symbol: 3,
                block_size: 2
            })
        );
        assert_eq!(sequence.get(4), Ok(2));
    }

    #[test]
    fn test_block_geometry() {
        let sequence = Sequence::new(4).unwrap();

        assert!(sequence.block_start(0).is_err());
        assert_eq!(sequence.block_start(1), Ok(1));
        assert_eq!(sequence.block_start(4), Ok(1));
        assert_eq!(sequence.block_start(5), Ok(5));
        assert_eq!(sequence.block_start(16), Ok(13));
        assert_eq!(sequence.block_offset(5), Ok(0));
        assert_eq!(sequence.block_offset(7), Ok(2));
        assert_eq!(sequence.block_offset(16), Ok(3));
        assert!(sequence.block_start(17).is_err());
    }

    #[test]
    fn test_blocks_and_pairs() {
        let sequence = two_block_sequence();

        let blocks: Vec<&[Symbol]> = sequence.blocks().collect();
        assert_eq!(blocks, vec![&[1, 2][..], &[2, 1][..]]);

        let pairs: Vec<_> = sequence.pairs().collect();
        assert_eq!(pairs, vec![(1, 1), (1, 2), (2, 2), (2, 1)]);
    }

    #[test]
    fn test_render_grid() {
        assert_eq!(render_grid(&two_block_sequence()), "  1\n  1  2\n  2  1\n");
    }

    #[test]
    fn test_render_line() {
        assert_eq!(render_line(&two_block_sequence()), "1,1,2,2,1,");
    }
}
