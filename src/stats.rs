use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected while converting a source directory
#[derive(Debug, Default)]
pub struct ConversionStats {
    pub files_converted: AtomicU64,
    pub files_skipped: AtomicU64,
    pub files_missing: AtomicU64,
    pub records_read: AtomicU64,
    pub statements_written: AtomicU64,
    pub rows_written: AtomicU64,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_converted(&self) {
        self.files_converted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_missing(&self) {
        self.files_missing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records(&self, count: u64) {
        self.records_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_statements(&self, count: u64) {
        self.statements_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_rows(&self, count: u64) {
        self.rows_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn converted(&self) -> u64 {
        self.files_converted.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.files_skipped.load(Ordering::Relaxed)
    }

    pub fn missing(&self) -> u64 {
        self.files_missing.load(Ordering::Relaxed)
    }

    pub fn records(&self) -> u64 {
        self.records_read.load(Ordering::Relaxed)
    }

    pub fn statements(&self) -> u64 {
        self.statements_written.load(Ordering::Relaxed)
    }

    pub fn rows(&self) -> u64 {
        self.rows_written.load(Ordering::Relaxed)
    }

    /// Prints the end-of-run summary to stdout
    pub fn print_summary(&self, elapsed_secs: f64) {
        println!();
        println!("=== Summary ===");
        println!("Conversion time:    {:.2}s", elapsed_secs);
        println!();
        println!("Files converted:    {}", self.converted());
        println!("Files skipped:      {}", self.skipped());
        println!("Tables missing:     {}", self.missing());
        println!("Records read:       {}", self.records());
        println!("Statements written: {}", self.statements());
        println!("CSV rows written:   {}", self.rows());
    }
}
