pub mod backtracking_search;
pub mod constraints;
pub mod initializer;
pub mod report;
pub mod scoring;
pub mod sequence;
pub mod types;
pub mod validation;

pub const LOG_SEARCH_PROCESS: bool = cfg!(feature = "log_search_process");
pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The block size used when none is given.
pub const DEFAULT_BLOCK_SIZE: usize = 17;

/// The largest block size we accept. Symbols are small integers and the pair scans are quadratic
/// in the sequence length, so anything bigger is out of reach anyway.
pub const MAX_BLOCK_SIZE: usize = 255;

/// The default wall-clock budget for a single search attempt, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;
