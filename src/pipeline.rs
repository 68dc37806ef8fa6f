//! Ingestion pipeline turns a line-delimited byte stream into a distinct
//! address count.
//!
//! Every line goes through the same steps:
//! 1. Acquire: read the next line. End of stream finalizes the run, a read
//!    failure or an oversized line aborts it.
//! 2. Parse: trim surrounding whitespace and parse dotted-decimal IPv4.
//!    Malformed lines are counted as rejected and skipped.
//! 3. Insert: set the presence bit of the address.
//!
//! After the source is exhausted the presence bits are counted once.
use std::fmt::{Display, Formatter};
use std::io::BufRead;

use tracing::{debug, trace};

use crate::address::parse_address;
use crate::address_set::AddressSet;
use crate::error::Result;
use crate::lines::LineReader;
use crate::progress::{Progress, Silent};

/// Default ceiling for a single line, newline excluded
pub const DEFAULT_MAX_LINE_LEN: usize = 10 * 1024 * 1024;
/// Default initial capacity of the line buffer
pub const DEFAULT_LINE_CAPACITY: usize = 4 * 1024;

/// Ingestion settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Longest accepted line in bytes; longer lines abort the run
    pub max_line_len: usize,
    /// Initial line buffer capacity in bytes
    pub initial_line_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            initial_line_capacity: DEFAULT_LINE_CAPACITY,
        }
    }
}

/// Per-line outcome counters of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStatistics {
    /// Lines parsed into an address and inserted
    pub accepted_lines: u64,
    /// Lines which failed to parse
    pub rejected_lines: u64,
}

impl RunStatistics {
    /// Return total number of lines seen
    pub fn lines(&self) -> u64 {
        self.accepted_lines + self.rejected_lines
    }
}

/// Final outcome of a successful run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Number of distinct addresses
    pub distinct: u64,
    /// Lines parsed into an address and inserted
    pub accepted_lines: u64,
    /// Lines which failed to parse
    pub rejected_lines: u64,
    /// Bytes consumed from the source
    pub bytes_read: u64,
}

impl RunReport {
    /// Return rejection notice, if any line was skipped
    pub fn rejection_notice(&self) -> Option<String> {
        (self.rejected_lines > 0).then(|| format!("skipped {} malformed lines", self.rejected_lines))
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "distinct addresses: {}", self.distinct)
    }
}

/// Single-pass distinct address counter.
///
/// `ingest` may be called for several sources; all of them feed one set.
/// `finish` counts the presence bits and consumes the pipeline.
#[derive(Debug)]
pub struct IngestionPipeline {
    config: IngestConfig,
    set: AddressSet,
    stats: RunStatistics,
    bytes_read: u64,
}

impl IngestionPipeline {
    /// Create new `IngestionPipeline`, allocating the presence bitmap
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            set: AddressSet::new(),
            stats: RunStatistics::default(),
            bytes_read: 0,
        }
    }

    /// Return counters accumulated so far
    pub fn stats(&self) -> RunStatistics {
        self.stats
    }

    /// Read `reader` to the end, inserting every valid address.
    ///
    /// On error the lines read before the failure remain inserted and counted,
    /// together with their bytes.
    pub fn ingest<R, P>(&mut self, reader: R, progress: &mut P) -> Result<()>
    where
        R: BufRead,
        P: Progress + ?Sized,
    {
        let mut lines = LineReader::new(
            reader,
            self.config.initial_line_capacity,
            self.config.max_line_len,
        );
        let mut consumed = 0;

        let result = loop {
            let line = match lines.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };
            match parse_address(line) {
                Ok(key) => {
                    self.set.insert(key);
                    self.stats.accepted_lines += 1;
                }
                Err(e) => {
                    self.stats.rejected_lines += 1;
                    trace!(line = lines.lines_read(), error = %e, "skipping malformed line");
                }
            }

            let total = lines.bytes_read();
            progress.advance(total - consumed);
            consumed = total;
        };

        // lines counted before a failure stay accounted for in `bytes_read`
        self.bytes_read += lines.bytes_read();
        progress.finish();
        result
    }

    /// Count distinct addresses and produce the final report
    pub fn finish(self) -> RunReport {
        let report = RunReport {
            distinct: self.set.count(),
            accepted_lines: self.stats.accepted_lines,
            rejected_lines: self.stats.rejected_lines,
            bytes_read: self.bytes_read,
        };

        debug!(
            distinct = report.distinct,
            accepted = report.accepted_lines,
            rejected = report.rejected_lines,
            bytes = report.bytes_read,
            "count complete"
        );

        report
    }

    /// Ingest `reader` and produce the final report
    pub fn run<R, P>(mut self, reader: R, progress: &mut P) -> Result<RunReport>
    where
        R: BufRead,
        P: Progress + ?Sized,
    {
        self.ingest(reader, progress)?;
        Ok(self.finish())
    }
}

/// Count distinct addresses of `reader` with default settings and no progress reporting
pub fn count_distinct<R: BufRead>(reader: R) -> Result<RunReport> {
    IngestionPipeline::new(IngestConfig::default()).run(reader, &mut Silent)
}
