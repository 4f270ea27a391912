//! Produces the values that seed a search attempt: the fixed prefix, the deterministic values that
//! positions are reset to after a backjump, and the random values that start each attempt.

use rand::prelude::*;

use crate::sequence::{Sequence, SequenceError};
use crate::types::{Position, Symbol};
use crate::CHECK_INVARIANTS;

/// Hands out initial values for a sequence of a given block size. Random values are drawn from a
/// generator that is re-seeded on every call, with the seed advancing by one each time, so that
/// consecutive attempts never share a seed within a run.
#[derive(Debug, Clone)]
pub struct Initializer {
    block_size: usize,
    seed: u64,
}

impl Initializer {
    #[must_use]
    pub fn new(block_size: usize, seed: u64) -> Initializer {
        Initializer { block_size, seed }
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The most recently used seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The first position the search is allowed to change, `n + 2`.
    #[must_use]
    pub fn first_free_position(&self) -> Position {
        self.block_size + 2
    }

    /// The value at `position` if it belongs to the fixed prefix: a leading 1, the identity
    /// permutation as the first block, and `n` as the head of the second block.
    #[must_use]
    pub fn fixed_value(&self, position: Position) -> Option<Symbol> {
        let n = self.block_size;
        match position {
            0 => Some(1),
            _ if position <= n => Some(position),
            _ if position == n + 1 => Some(n),
            _ => None,
        }
    }

    /// The value a position is reset to when the search backs up past it. The tail (the last
    /// position of the second-to-last block and everything but the final position of the last
    /// block) starts at 2, which cuts down on dead ends late in the sequence.
    #[must_use]
    pub fn initial_value(&self, position: Position) -> Symbol {
        let n = self.block_size;
        if let Some(value) = self.fixed_value(position) {
            return value;
        }
        if position >= n * n - n && position != n * n {
            return 2;
        }
        1
    }

    /// A uniformly random value for `position`, or its fixed value if it has one. The second
    /// free position never gets `n`: that choice makes the attempt fail immediately.
    pub fn random_value(&mut self, position: Position) -> Symbol {
        if let Some(value) = self.fixed_value(position) {
            return value;
        }

        self.seed = self.seed.wrapping_add(1);
        let mut rng = SmallRng::seed_from_u64(self.seed);

        let n = self.block_size;
        if position == n + 2 {
            rng.gen_range(1..n)
        } else {
            rng.gen_range(1..=n)
        }
    }

    /// Overwrite every position of `sequence` with a fresh random value.
    pub fn randomize(&mut self, sequence: &mut Sequence) -> Result<(), SequenceError> {
        for position in 0..sequence.len() {
            let value = self.random_value(position);
            sequence.set(position, value)?;
        }

        if CHECK_INVARIANTS {
            for position in 0..self.first_free_position() {
                if sequence.get(position)? != self.initial_value(position) {
                    panic!("Fixed prefix broken after randomizing position {position}");
                }
            }
        }

        Ok(())
    }
}
