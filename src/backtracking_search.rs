//! This module implements the constructive search for Type I sequences. The search walks a single
//! cursor over the free part of the sequence (everything after the fixed prefix), trying values in
//! increasing order and checking each one against the rules in `constraints.rs`.
//!
//! When a position runs out of values, we don't simply step back one position: depending on which
//! rule failed and where the cursor sits within its block, the positions immediately behind it are
//! known to have no slack left, so we jump straight to the nearest one that does (see
//! `jump_distances`). Everything between the jump target and the old cursor goes back to its
//! initial value.
//!
//! Each attempt starts from a random assignment. An attempt is abandoned and re-randomized when it
//! runs past its deadline, when it reaches a state that provably can't be completed, or when a
//! backjump would reach into the fixed prefix. A completed sequence is never reused as the starting
//! point for the next one; the whole sequence is re-randomized instead.

use std::fmt;
use std::mem;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::constraints::{
    violates_block_head_uniqueness, violates_block_uniqueness, violates_pair_uniqueness,
    Violation,
};
use crate::initializer::Initializer;
use crate::sequence::{Sequence, SequenceError};
use crate::types::Position;
use crate::{DEFAULT_BLOCK_SIZE, DEFAULT_TIMEOUT_SECS, LOG_SEARCH_PROCESS, MAX_BLOCK_SIZE};

/// How many states should we process between checks of the attempt's deadline?
pub const INTERRUPT_FREQUENCY: usize = 1024;

/// Block sizes for which no sequence satisfies the block structure (found by exhaustive search).
pub const UNSOLVABLE_BLOCK_SIZES: [usize; 3] = [3, 4, 5];

/// Parameters for a search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// The block size `n`; sequences have `n² + 1` positions.
    pub block_size: usize,

    /// How long a single attempt may run before it's abandoned. `None` means attempts only end by
    /// succeeding or hitting a dead end.
    pub timeout: Option<Duration>,

    /// The starting seed for random initialization. It advances with every random draw.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("block size must be at least 2, got {0}")]
    BlockSizeTooSmall(usize),

    #[error("block size must be at most {max}, got {actual}")]
    BlockSizeTooLarge { actual: usize, max: usize },

    #[error("no Type I sequence with the required block structure exists for block size {0}")]
    NoSolution(usize),
}

impl SearchConfig {
    /// Check the parameters before any search starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size < 2 {
            return Err(ConfigError::BlockSizeTooSmall(self.block_size));
        }
        if self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockSizeTooLarge {
                actual: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if UNSOLVABLE_BLOCK_SIZES.contains(&self.block_size) {
            return Err(ConfigError::NoSolution(self.block_size));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("search touched an invalid position or symbol: {0}")]
    Sequence(#[from] SequenceError),
}

/// Why an attempt was thrown away.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum RestartReason {
    /// The attempt ran past its deadline.
    Timeout,
    /// The second free position reached `n`, from which no completion exists.
    DeadFixedPoint,
    /// A backjump reached into the fixed prefix.
    CursorUnderflow,
    /// None of the backjump candidates had a value left to try.
    Exhausted,
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            RestartReason::Timeout => "not found before the deadline",
            RestartReason::DeadFixedPoint => "second free position is equal to n",
            RestartReason::CursorUnderflow => "fixed elements reached",
            RestartReason::Exhausted => "no backjump target left",
        };
        write!(f, "{description}")
    }
}

/// Stats about the search for one sequence, counted from the previous success (or the start of
/// the session).
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: usize,
    pub repairs: usize,
    pub backjumps: usize,
    pub restarts: usize,
    pub elapsed: Duration,
}

/// A completed sequence, along with the stats from finding it.
#[derive(Debug, Clone)]
pub struct FoundSequence {
    pub sequence: Sequence,
    pub statistics: Statistics,
}

/// The outcome of a single iteration of the search.
#[derive(Debug, Clone)]
pub enum SearchStep {
    /// The value at the cursor was accepted and the cursor moved forward.
    Advanced,
    /// The value at the cursor was rejected and bumped in place.
    Repaired,
    /// The cursor jumped back to a position with slack.
    Backjumped { from: Position, to: Position },
    /// The attempt was abandoned and the sequence re-randomized.
    Restarted(RestartReason),
    /// The sequence is complete. The session has already moved on to a fresh attempt.
    Found(FoundSequence),
}

/// How far back might the nearest position with slack be, given the rule that failed and the
/// cursor's offset within its block (0 for the block head)? Candidates are in the order they
/// should be tried; a candidate is usable if the value there is still below `n`.
///
/// - A repeated symbol at the second element or later: if the previous value can't be bumped, the
///   one before it always can. At the third element, though, the block looks like `m n n`, where
///   the head `m` mirrors the end of the previous block and that end has no alternatives, so we
///   need to reach the second-to-last element of the previous block (4 back) or the one before it.
///
/// - A repeated pair at the third element or later: the previous value is always below `n`, since
///   otherwise the symbol check would have failed first. At the second element, the block looks
///   like `m n`, and we have to reach back into the previous block as above (3 or 4 back).
///
/// - A repeated self-pair at a block head: the head itself has no alternatives, and neither does
///   the element closing the previous block unless we change what comes before it.
#[must_use]
pub fn jump_distances(violation: Violation, block_offset: usize) -> &'static [usize] {
    match (violation, block_offset) {
        (Violation::BlockRepeat, 2) => &[1, 4, 5],
        (Violation::BlockRepeat, _) => &[1, 2],
        (Violation::PairRepeat, 1) => &[3, 4],
        (Violation::PairRepeat, _) => &[1],
        (Violation::BlockHeadRepeat, _) => &[2, 3],
    }
}

/// Where a backjump lands.
enum JumpTarget {
    Position(Position),
    Abandon(RestartReason),
}

/// The complete state of a search: the sequence under construction, the cursor into it, and the
/// source of random initial values.
#[derive(Debug)]
pub struct SearchSession {
    config: SearchConfig,
    initializer: Initializer,
    sequence: Sequence,
    cursor: Position,
    attempt_start: Instant,
    attempt_states: usize,
    search_start: Instant,
    statistics: Statistics,
    found_count: usize,
}

impl SearchSession {
    /// Validate the config and set up the first randomized attempt.
    pub fn new(config: SearchConfig) -> Result<SearchSession, SearchError> {
        config.validate()?;

        let mut initializer = Initializer::new(config.block_size, config.seed);
        let mut sequence = Sequence::new(config.block_size)?;
        initializer.randomize(&mut sequence)?;
        let cursor = initializer.first_free_position();
        let now = Instant::now();

        Ok(SearchSession {
            config,
            initializer,
            sequence,
            cursor,
            attempt_start: now,
            attempt_states: 0,
            search_start: now,
            statistics: Statistics::default(),
            found_count: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// The sequence as it currently stands, partially constructed.
    #[must_use]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// How many sequences this session has produced so far.
    #[must_use]
    pub fn found_count(&self) -> usize {
        self.found_count
    }

    /// Run the search until it completes a sequence.
    pub fn next_sequence(&mut self) -> Result<FoundSequence, SearchError> {
        loop {
            if let SearchStep::Found(found) = self.step()? {
                return Ok(found);
            }
        }
    }

    /// Run one iteration of the search.
    pub fn step(&mut self) -> Result<SearchStep, SearchError> {
        let block_size = self.config.block_size;
        let first_free = self.initializer.first_free_position();

        if self.attempt_states % INTERRUPT_FREQUENCY == 0 {
            if let Some(timeout) = self.config.timeout {
                if self.attempt_start.elapsed() >= timeout {
                    return self.restart(RestartReason::Timeout);
                }
            }
        }

        if self.sequence.get(first_free)? == block_size {
            return self.restart(RestartReason::DeadFixedPoint);
        }

        if self.cursor < first_free {
            return self.restart(RestartReason::CursorUnderflow);
        }

        self.attempt_states += 1;
        self.statistics.states += 1;

        if self.cursor == self.sequence.len() {
            return self.finish_sequence();
        }

        let position = self.cursor;
        let block_offset = self.sequence.block_offset(position)?;

        let violation = if block_offset == 0 {
            // A block head always repeats the symbol before it, as long as that self-pair hasn't
            // been used at another boundary.
            if !violates_block_head_uniqueness(&self.sequence, position)? {
                let closing = self.sequence.get(position - 1)?;
                self.sequence.set(position, closing)?;
                self.cursor += 1;
                return Ok(SearchStep::Advanced);
            }
            Violation::BlockHeadRepeat
        } else {
            let block_start = position - block_offset;
            let symbol = self.sequence.get(position)?;
            let previous = self.sequence.get(position - 1)?;

            let violation =
                if violates_block_uniqueness(&self.sequence, symbol, block_start, position)? {
                    Violation::BlockRepeat
                } else if violates_pair_uniqueness(&self.sequence, symbol, previous, block_start)? {
                    Violation::PairRepeat
                } else {
                    self.cursor += 1;
                    return Ok(SearchStep::Advanced);
                };

            // Try the next value here before backing up.
            if symbol < block_size {
                self.sequence.increment(position)?;
                self.statistics.repairs += 1;
                return Ok(SearchStep::Repaired);
            }
            violation
        };

        self.backjump(violation, block_offset)
    }

    fn choose_jump_target(
        &self,
        violation: Violation,
        block_offset: usize,
    ) -> Result<JumpTarget, SequenceError> {
        let first_free = self.initializer.first_free_position();

        for &distance in jump_distances(violation, block_offset) {
            match self.cursor.checked_sub(distance) {
                Some(target) if target >= first_free => {
                    if self.sequence.get(target)? < self.config.block_size {
                        return Ok(JumpTarget::Position(target));
                    }
                }
                _ => return Ok(JumpTarget::Abandon(RestartReason::CursorUnderflow)),
            }
        }

        Ok(JumpTarget::Abandon(RestartReason::Exhausted))
    }

    fn backjump(
        &mut self,
        violation: Violation,
        block_offset: usize,
    ) -> Result<SearchStep, SearchError> {
        let from = self.cursor;
        let to = match self.choose_jump_target(violation, block_offset)? {
            JumpTarget::Position(to) => to,
            JumpTarget::Abandon(reason) => return self.restart(reason),
        };

        self.sequence.increment(to)?;
        for position in to + 1..=from {
            self.sequence
                .set(position, self.initializer.initial_value(position))?;
        }
        self.cursor = to;
        self.statistics.backjumps += 1;

        if LOG_SEARCH_PROCESS {
            trace!(?violation, block_offset, from, to, "Backjumped");
        }

        Ok(SearchStep::Backjumped { from, to })
    }

    /// Throw away the current attempt and start a fresh random one.
    fn restart(&mut self, reason: RestartReason) -> Result<SearchStep, SearchError> {
        info!(
            %reason,
            states = self.attempt_states,
            seed = self.initializer.seed(),
            "Reinitializing search attempt"
        );
        self.statistics.restarts += 1;
        self.reset_attempt()?;
        Ok(SearchStep::Restarted(reason))
    }

    fn reset_attempt(&mut self) -> Result<(), SequenceError> {
        self.initializer.randomize(&mut self.sequence)?;
        self.cursor = self.initializer.first_free_position();
        self.attempt_states = 0;
        self.attempt_start = Instant::now();
        Ok(())
    }

    fn finish_sequence(&mut self) -> Result<SearchStep, SearchError> {
        let sequence = self.sequence.clone();
        let mut statistics = mem::take(&mut self.statistics);
        statistics.elapsed = self.search_start.elapsed();
        self.found_count += 1;

        info!(number = self.found_count, "Found sequence");
        debug!(
            states = statistics.states,
            repairs = statistics.repairs,
            backjumps = statistics.backjumps,
            restarts = statistics.restarts,
            elapsed = ?statistics.elapsed,
            "Search statistics"
        );

        // The next search starts from scratch rather than from the sequence we just found, so
        // that consecutive sequences aren't close to each other.
        self.reset_attempt()?;
        self.search_start = Instant::now();

        Ok(SearchStep::Found(FoundSequence {
            sequence,
            statistics,
        }))
    }
}

impl Iterator for SearchSession {
    type Item = Result<FoundSequence, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_sequence())
    }
}
