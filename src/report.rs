//! Drives a search session and writes out each sequence it finds, along with its validation status
//! and balance scores.

use std::io::{self, Write};
use thiserror::Error;
use tracing::info;

use crate::backtracking_search::{FoundSequence, SearchError, SearchSession};
use crate::scoring::{score, Scores};
use crate::sequence::{render_grid, render_line};
use crate::validation::{validate, ValidationReport};

/// How a sequence is laid out.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum OutputFormat {
    /// The leading symbol on one line, then one block per line.
    #[default]
    Grid,
    /// All symbols on one line, each followed by a comma.
    Line,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Write a single line per sequence: the sequence itself when the line format was asked for
    /// explicitly, otherwise just the two scores. A sequence that fails validation still gets its
    /// offending pairs listed.
    pub quiet: bool,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("sequence #{number} failed validation:\n{report}")]
    InvariantBreach {
        number: usize,
        report: ValidationReport,
    },
}

/// Write everything we report about one sequence.
pub fn write_report<W: Write>(
    out: &mut W,
    config: &OutputConfig,
    number: usize,
    found: &FoundSequence,
    validation: &ValidationReport,
    scores: &Scores,
) -> io::Result<()> {
    if config.quiet {
        if config.format == OutputFormat::Line {
            writeln!(out, "{}", render_line(&found.sequence))?;
        } else {
            writeln!(out, "{},{}", scores.criterion_a, scores.criterion_b)?;
        }
        // Offending pairs are always shown, whatever the format.
        if !validation.is_positive() {
            writeln!(out, "{validation}")?;
        }
        return Ok(());
    }

    writeln!(
        out,
        "counter = {}, Sequence #{number}:",
        found.statistics.states
    )?;
    match config.format {
        OutputFormat::Grid => write!(out, "{}", render_grid(&found.sequence))?,
        OutputFormat::Line => writeln!(out, "{}", render_line(&found.sequence))?,
    }
    writeln!(out)?;
    writeln!(out, "{validation}")?;
    writeln!(out, "Criterion A: {}", scores.criterion_a)?;
    writeln!(out, "Criterion B: {}", scores.criterion_b)?;
    writeln!(out)?;
    Ok(())
}

/// Keep finding sequences and writing them to `out`, stopping after `limit` of them if a limit is
/// given. Returns how many were written. A sequence that fails validation is written out with its
/// offending pairs and then ends the run with an error.
pub fn generate<W: Write>(
    session: &mut SearchSession,
    config: &OutputConfig,
    limit: Option<usize>,
    out: &mut W,
) -> Result<usize, GenerateError> {
    let mut written = 0;

    while limit.map_or(true, |limit| written < limit) {
        let found = session.next_sequence()?;
        written += 1;

        let validation = validate(&found.sequence);
        let scores = score(&found.sequence);
        write_report(out, config, written, &found, &validation, &scores)?;
        out.flush()?;

        if !validation.is_positive() {
            return Err(GenerateError::InvariantBreach {
                number: written,
                report: validation,
            });
        }
    }

    if let Some(limit) = limit {
        info!("Reached stated number of sequences ({limit}), exiting.");
    }
    info!("Total # of sequences: {written}");

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtracking_search::{SearchConfig, Statistics};
    use crate::sequence::Sequence;

    fn session(block_size: usize, seed: u64) -> SearchSession {
        SearchSession::new(SearchConfig {
            block_size,
            seed,
            ..Default::default()
        })
        .unwrap()
    }

    fn found(symbols: &[usize]) -> FoundSequence {
        FoundSequence {
            sequence: Sequence::from_symbols(2, symbols.to_vec()).unwrap(),
            statistics: Statistics {
                states: 3,
                ..Default::default()
            },
        }
    }

    fn render(config: OutputConfig, found: &FoundSequence) -> String {
        let validation = validate(&found.sequence);
        let scores = score(&found.sequence);
        let mut out = vec![];
        write_report(&mut out, &config, 1, found, &validation, &scores).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_full_report_in_grid_format() {
        let output = render(OutputConfig::default(), &found(&[1, 1, 2, 2, 1]));

        assert_eq!(
            output,
            "counter = 3, Sequence #1:\n  1\n  1  2\n  2  1\n\nConfirmation status: positive\nCriterion A: 0\nCriterion B: 0\n\n"
        );
    }

    #[test]
    fn test_full_report_in_line_format() {
        let config = OutputConfig {
            format: OutputFormat::Line,
            quiet: false,
        };
        let output = render(config, &found(&[1, 1, 2, 2, 1]));

        assert!(output.starts_with("counter = 3, Sequence #1:\n1,1,2,2,1,\n\n"));
    }

    #[test]
    fn test_report_lists_offending_pairs() {
        let output = render(OutputConfig::default(), &found(&[1, 1, 2, 2, 2]));

        assert!(output.contains("Pair showed earlier: 2--2\nPair not found: 2--1\n"));
        assert!(output.contains("Confirmation status: negative\n"));
    }

    #[test]
    fn test_quiet_reports() {
        let scores_only = OutputConfig {
            format: OutputFormat::Grid,
            quiet: true,
        };
        assert_eq!(render(scores_only, &found(&[1, 1, 2, 2, 1])), "0,0\n");

        let sequence_only = OutputConfig {
            format: OutputFormat::Line,
            quiet: true,
        };
        assert_eq!(
            render(sequence_only, &found(&[1, 1, 2, 2, 1])),
            "1,1,2,2,1,\n"
        );
    }

    #[test]
    fn test_quiet_reports_still_list_offending_pairs() {
        let broken = found(&[1, 1, 2, 2, 2]);

        for format in [OutputFormat::Grid, OutputFormat::Line] {
            let output = render(
                OutputConfig {
                    format,
                    quiet: true,
                },
                &broken,
            );

            assert!(output.contains("Pair showed earlier: 2--2\n"));
            assert!(output.contains("Pair not found: 2--1\n"));
            assert!(output.ends_with("Confirmation status: negative\n"));
        }
    }

    #[test]
    fn test_invariant_breach_error_carries_offending_pairs() {
        let sequence = Sequence::from_symbols(2, vec![1, 1, 2, 2, 2]).unwrap();
        let err = GenerateError::InvariantBreach {
            number: 3,
            report: validate(&sequence),
        };

        assert_eq!(
            err.to_string(),
            "sequence #3 failed validation:\nPair showed earlier: 2--2\nPair not found: 2--1\nConfirmation status: negative"
        );
    }

    #[test]
    fn test_generate_stops_at_limit() {
        let mut session = session(6, 9);
        let config = OutputConfig {
            format: OutputFormat::Line,
            quiet: true,
        };
        let mut out = vec![];

        let written = generate(&mut session, &config, Some(5), &mut out).unwrap();

        assert_eq!(written, 5);
        assert_eq!(session.found_count(), 5);

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        for line in lines {
            let symbols: Vec<usize> = line
                .trim_end_matches(',')
                .split(',')
                .map(|symbol| symbol.parse().unwrap())
                .collect();
            let sequence = Sequence::from_symbols(6, symbols).unwrap();
            assert!(validate(&sequence).is_positive());
        }
    }

    #[test]
    fn test_generate_with_zero_limit_writes_nothing() {
        let mut session = session(6, 9);
        let mut out = vec![];

        let written = generate(&mut session, &OutputConfig::default(), Some(0), &mut out).unwrap();

        assert_eq!(written, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_generate_full_reports() {
        let mut session = session(7, 1);
        let mut out = vec![];

        generate(&mut session, &OutputConfig::default(), Some(2), &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Sequence #1:"));
        assert!(output.contains("Sequence #2:"));
        assert_eq!(output.matches("Confirmation status: positive").count(), 2);
        assert_eq!(output.matches("Criterion A: ").count(), 2);
    }
}
