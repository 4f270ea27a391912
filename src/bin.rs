use clap::error::ErrorKind;
use clap::Parser;
use std::fmt::{Debug, Formatter};
use std::io;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use type1seq::backtracking_search::{SearchConfig, SearchSession};
use type1seq::report::{generate, GenerateError, OutputConfig, OutputFormat};
use type1seq::{DEFAULT_BLOCK_SIZE, DEFAULT_TIMEOUT_SECS};

/// type1seqgen: Systematic search for Type I sequences, in which every ordered pair of symbols
/// occurs exactly once
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of terms (block size); sequences have length n² + 1
    #[arg(short = 'n', long = "length", default_value_t = DEFAULT_BLOCK_SIZE)]
    length: usize,

    /// Stop after this many sequences have been found [default: keep going]
    #[arg(short, long, default_value_t = 0)]
    total: usize,

    /// Print terms on one line instead of a square matrix
    #[arg(short, long)]
    line: bool,

    /// Minimal output format: one line per sequence with no status text
    #[arg(short, long)]
    quiet: bool,

    /// Seconds before an unsuccessful attempt is re-randomized (0 to never give up)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Seed for random initialization [default: the current time]
    #[arg(long)]
    seed: Option<u64>,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            let _ = err.print();
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.quiet { Level::ERROR } else { Level::INFO })
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error(format!("Couldn't install logger: {err}")))?;

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    });

    let config = SearchConfig {
        block_size: args.length,
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        seed,
    };

    let mut session = SearchSession::new(config).map_err(|err| Error(err.to_string()))?;

    let output_config = OutputConfig {
        format: if args.line {
            OutputFormat::Line
        } else {
            OutputFormat::Grid
        },
        quiet: args.quiet,
    };

    info!(block_size = args.length, seed, "Starting search");

    let limit = (args.total > 0).then_some(args.total);
    let stdout = io::stdout();
    match generate(&mut session, &output_config, limit, &mut stdout.lock()) {
        Ok(_) => Ok(()),
        Err(GenerateError::InvariantBreach { number, report }) => Err(Error(format!(
            "Sequence #{number} doesn't contain every pair exactly once:\n{report}"
        ))),
        Err(err) => Err(Error(err.to_string())),
    }
}
