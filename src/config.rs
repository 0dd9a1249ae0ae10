/// Extension of the export files picked up from the source directory
pub const SOURCE_EXTENSION: &str = "bcp";

/// File name prefix selecting the tab-separated SIR tokenizer
pub const SIR_PREFIX: &str = "sir_data";

/// Progress update interval (tick every N records)
pub const PROGRESS_INTERVAL: u64 = 100;

/// CSV writers are flushed every N rows
pub const CSV_FLUSH_INTERVAL: u64 = 10_000;

/// Buffer size for reading export files
pub const READ_BUFFER_SIZE: usize = 128 * 1024;

/// Buffer size for CSV and Turtle writers
pub const WRITE_BUFFER_SIZE: usize = 128 * 1024;

/// Upper bound on the chunks one charitable objective may be split into
pub const MAX_OBJECTIVE_CHUNKS: usize = 1_000;

/// Suffix of the in-progress file that is renamed into place on success
pub const TMP_SUFFIX: &str = "tmp";

/// Base of the UK reference data day identifiers
pub const DAY_IRI_BASE: &str = "http://reference.data.gov.uk/id/day/";
