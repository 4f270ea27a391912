//! Independent check that a completed sequence contains every ordered pair exactly once. The search
//! enforces this incrementally; here we rebuild the pair occurrences from scratch.

use smallvec::SmallVec;
use std::fmt;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::sequence::Sequence;
use crate::types::SymbolPair;

/// The outcome of validating a sequence: every pair that occurred more than once (one entry per
/// extra occurrence, in order of appearance) and every pair that never occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationReport {
    pub duplicates: SmallVec<[SymbolPair; 4]>,
    pub missing: SmallVec<[SymbolPair; 4]>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.duplicates.is_empty() && self.missing.is_empty()
    }

    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.is_positive() {
            "positive"
        } else {
            "negative"
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (first, second) in &self.duplicates {
            writeln!(f, "Pair showed earlier: {first}--{second}")?;
        }
        for (first, second) in &self.missing {
            writeln!(f, "Pair not found: {first}--{second}")?;
        }
        write!(f, "Confirmation status: {}", self.status())
    }
}

/// Count every consecutive pair of `sequence` and report repeats and gaps.
#[must_use]
pub fn validate(sequence: &Sequence) -> ValidationReport {
    let n = sequence.block_size();
    let mut seen = vec![false; n * n];
    let mut duplicates = SmallVec::new();

    for (first, second) in sequence.pairs() {
        let pair_index = (first - 1) * n + (second - 1);
        if seen[pair_index] {
            duplicates.push((first, second));
        } else {
            seen[pair_index] = true;
        }
    }

    let missing = seen
        .iter()
        .enumerate()
        .filter(|&(_, &hit)| !hit)
        .map(|(pair_index, _)| (pair_index / n + 1, pair_index % n + 1))
        .collect();

    ValidationReport {
        duplicates,
        missing,
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use crate::sequence::Sequence;
    use crate::validation::{validate, ValidationReport};

    #[test]
    fn test_report_deserialization() {
        let report: ValidationReport =
            serde_json::from_str("{\"duplicates\":[[2,2]],\"missing\":[[2,1]]}").unwrap();

        let sequence = Sequence::from_symbols(2, vec![1, 1, 2, 2, 2]).unwrap();
        assert_eq!(report, validate(&sequence));
    }
}
