//! The three uniqueness rules that a partial sequence has to satisfy while the search extends it.
//! Taken together they guarantee that a sequence which reaches its last position contains every
//! ordered pair exactly once:
//!
//! - Within a block, no symbol repeats. Since every block is then a permutation, a self-pair
//!   `(x, x)` can only occur across a block boundary.
//!
//! - No pair of consecutive symbols inside the blocks repeats anything that came before.
//!
//! - A block head always repeats its predecessor, so each boundary realizes one self-pair. Two
//!   boundaries may not realize the same one.
//!
//! All checks are pure and scan the already-constructed prefix of the sequence.

use crate::sequence::{Sequence, SequenceError};
use crate::types::{Position, Symbol};

/// Which rule a trial value broke.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Violation {
    /// The symbol already occurs earlier in its block.
    BlockRepeat,
    /// The pair formed with the previous symbol already occurs earlier in the sequence.
    PairRepeat,
    /// The self-pair closing the previous block was already used at another block boundary.
    BlockHeadRepeat,
}

/// Does `symbol` already occur in `sequence[block_start..position]`?
pub fn violates_block_uniqueness(
    sequence: &Sequence,
    symbol: Symbol,
    block_start: Position,
    position: Position,
) -> Result<bool, SequenceError> {
    Ok(sequence
        .window(block_start..position)?
        .contains(&symbol))
}

/// Does the pair `(previous, symbol)` already occur among the pairs starting before `scan_limit`?
/// The search passes the start of the current block, which covers everything up to and including
/// the pair that enters the block.
pub fn violates_pair_uniqueness(
    sequence: &Sequence,
    symbol: Symbol,
    previous: Symbol,
    scan_limit: Position,
) -> Result<bool, SequenceError> {
    Ok(sequence
        .window(0..scan_limit + 1)?
        .windows(2)
        .any(|pair| pair[0] == previous && pair[1] == symbol))
}

/// Would mirroring `sequence[head - 1]` into the block head at `head` reuse a self-pair? Every
/// block head before the previous one already mirrors its own predecessor, so it's enough to
/// compare against those heads. (The previous block's head can't match, since the symbol before
/// `head` is in the same block as it.)
pub fn violates_block_head_uniqueness(
    sequence: &Sequence,
    head: Position,
) -> Result<bool, SequenceError> {
    let block_size = sequence.block_size();
    let Some(closing_position) = head.checked_sub(1) else {
        return Err(SequenceError::PositionOutOfRange {
            position: head,
            len: sequence.len(),
        });
    };
    let closing = sequence.get(closing_position)?;
    let earlier_block_count = (closing_position / block_size).saturating_sub(1);

    for block_index in 0..earlier_block_count {
        if sequence.get(block_index * block_size + 1)? == closing {
            return Ok(true);
        }
    }

    Ok(false)
}
