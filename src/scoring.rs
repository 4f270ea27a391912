//! Balance metrics for a completed sequence. A sequence is well balanced when every symbol occupies
//! every within-block slot exactly once across the `n` blocks.

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::sequence::Sequence;

/// `counts[s * n + p]` is the number of blocks in which symbol `s + 1` sits at slot `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMatrix {
    block_size: usize,
    counts: Vec<u32>,
}

impl FrequencyMatrix {
    #[must_use]
    pub fn from_sequence(sequence: &Sequence) -> FrequencyMatrix {
        let n = sequence.block_size();
        let mut counts = vec![0; n * n];

        for block in sequence.blocks() {
            for (slot, &symbol) in block.iter().enumerate() {
                counts[(symbol - 1) * n + slot] += 1;
            }
        }

        FrequencyMatrix {
            block_size: n,
            counts,
        }
    }

    /// How often symbol `symbol_index + 1` occupies `slot`.
    #[must_use]
    pub fn get(&self, symbol_index: usize, slot: usize) -> u32 {
        self.counts[symbol_index * self.block_size + slot]
    }

    /// Each symbol's counts, in slot order.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.counts.chunks(self.block_size)
    }

    /// The sum of squared deviations from one occurrence per slot.
    #[must_use]
    pub fn criterion_a(&self) -> i64 {
        self.counts
            .iter()
            .map(|&count| {
                let deviation = i64::from(count) - 1;
                deviation * deviation
            })
            .sum()
    }

    /// For each symbol, the slot-weighted sum of deviations (squared), summed over symbols. This
    /// picks up symbols that lean towards the start or end of their blocks.
    #[must_use]
    pub fn criterion_b(&self) -> i64 {
        self.rows()
            .map(|row| {
                let weighted: i64 = row
                    .iter()
                    .enumerate()
                    .map(|(slot, &count)| (slot as i64 + 1) * (i64::from(count) - 1))
                    .sum();
                weighted * weighted
            })
            .sum()
    }
}

/// Both balance metrics; lower is better, and zero means perfectly balanced.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scores {
    pub criterion_a: i64,
    pub criterion_b: i64,
}

#[must_use]
pub fn score(sequence: &Sequence) -> Scores {
    let matrix = FrequencyMatrix::from_sequence(sequence);
    Scores {
        criterion_a: matrix.criterion_a(),
        criterion_b: matrix.criterion_b(),
    }
}
