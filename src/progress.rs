//! Progress reporting side channel for long scans.
//!
//! Progress sinks observe how many bytes were consumed. They never influence
//! the result of a run.
use std::time::{Duration, Instant};

use enum_dispatch::enum_dispatch;
use tracing::{debug, info};

/// Progress sinks supported by the ingestion pipeline
#[derive(Debug)]
#[enum_dispatch]
pub enum ProgressSink {
    Silent(Silent),
    Log(LogProgress),
}

/// Progress trait which must be implemented by all progress sinks.
#[enum_dispatch(ProgressSink)]
pub trait Progress {
    /// Record that `bytes` more bytes of the source were consumed
    fn advance(&mut self, bytes: u64);
    /// Record that the source was fully consumed
    fn finish(&mut self);
}

/// Sink which discards all progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {
    #[inline]
    fn advance(&mut self, _bytes: u64) {}

    #[inline]
    fn finish(&mut self) {}
}

/// Bytes consumed between two reads of the clock
pub const CLOCK_CHECK_STEP: u64 = 1 << 20;

/// Sink which periodically logs consumed bytes through `tracing`.
///
/// The clock is only consulted every [`CLOCK_CHECK_STEP`] bytes, so a report
/// is emitted at most once per step and once per interval.
#[derive(Debug)]
pub struct LogProgress {
    total: Option<u64>,
    consumed: u64,
    next_check: u64,
    reports: u64,
    interval: Duration,
    last_report: Instant,
}

impl LogProgress {
    /// Create new `LogProgress` reporting at most once per `interval`.
    ///
    /// `total` is the advertised size of the source, if known.
    pub fn new(total: Option<u64>, interval: Duration) -> Self {
        Self {
            total,
            consumed: 0,
            next_check: CLOCK_CHECK_STEP,
            reports: 0,
            interval,
            last_report: Instant::now(),
        }
    }

    /// Return number of bytes consumed so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Return number of progress reports emitted so far
    pub fn reports(&self) -> u64 {
        self.reports
    }

    /// Return consumed share of the advertised total in percent
    pub fn percent(&self) -> Option<f64> {
        self.total
            .filter(|&total| total > 0)
            .map(|total| (self.consumed as f64 * 100.0 / total as f64).min(100.0))
    }

    fn report(&mut self) {
        self.reports += 1;
        match (self.total, self.percent()) {
            (Some(total), Some(percent)) => info!(
                consumed = self.consumed,
                total,
                percent = (percent * 10.0).round() / 10.0,
                "scanning"
            ),
            _ => info!(consumed = self.consumed, "scanning"),
        }
    }
}

impl Progress for LogProgress {
    #[inline]
    fn advance(&mut self, bytes: u64) {
        self.consumed += bytes;
        if self.consumed < self.next_check {
            return;
        }
        self.next_check = self.consumed + CLOCK_CHECK_STEP;
        if self.last_report.elapsed() >= self.interval {
            self.last_report = Instant::now();
            self.report();
        }
    }

    fn finish(&mut self) {
        debug!(consumed = self.consumed, "scan finished");
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some(200), 50 => Some(25.0); "quarter")]
    #[test_case(Some(100), 100 => Some(100.0); "complete")]
    #[test_case(Some(100), 150 => Some(100.0); "capped when total understated")]
    #[test_case(Some(0), 10 => None; "zero total")]
    #[test_case(None, 10 => None; "unknown total")]
    fn test_percent(total: Option<u64>, consumed: u64) -> Option<f64> {
        let mut progress = LogProgress::new(total, Duration::from_secs(3600));
        progress.advance(consumed);
        progress.percent()
    }

    #[test]
    fn test_dispatch() {
        let mut sink = ProgressSink::from(LogProgress::new(None, Duration::ZERO));
        sink.advance(3);
        sink.advance(4);
        sink.finish();
        match sink {
            ProgressSink::Log(log) => assert_eq!(log.consumed(), 7),
            ProgressSink::Silent(_) => unreachable!(),
        }

        let mut sink = ProgressSink::from(Silent);
        sink.advance(1);
        sink.finish();
    }

    #[test]
    fn test_clock_checked_per_step() {
        let mut progress = LogProgress::new(None, Duration::ZERO);
        for _ in 0..1000 {
            progress.advance(16);
        }
        assert_eq!(progress.reports(), 0);

        progress.advance(CLOCK_CHECK_STEP);
        assert_eq!(progress.reports(), 1);
        progress.advance(CLOCK_CHECK_STEP - 1);
        assert_eq!(progress.reports(), 1);
        progress.advance(1);
        assert_eq!(progress.reports(), 2);
    }

    #[test]
    fn test_interval_still_applies() {
        let total = 4 * CLOCK_CHECK_STEP;
        let mut progress = LogProgress::new(Some(total), Duration::from_secs(3600));
        progress.advance(total);
        assert_eq!(progress.reports(), 0);
        assert_eq!(progress.percent(), Some(100.0));
    }
}
