//! Newline-delimited record reader with a bounded per-line buffer.
use std::io::{BufRead, Read};

use crate::error::{Error, Result};

/// Reads `\n` delimited lines from a [`BufRead`] into one reusable buffer.
///
/// A single line may hold at most `max_len` bytes, not counting the newline.
/// Longer lines fail with [`Error::LineTooLong`] instead of being truncated.
/// The last line of the stream does not need a trailing newline.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    max_len: usize,
    lines_read: u64,
    bytes_read: u64,
}

impl<R: BufRead> LineReader<R> {
    /// Create new `LineReader` with an initial buffer of `capacity` bytes
    pub fn new(inner: R, capacity: usize, max_len: usize) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(capacity.min(max_len.saturating_add(1))),
            max_len,
            lines_read: 0,
            bytes_read: 0,
        }
    }

    /// Return next line without its newline, or `None` once the stream is exhausted
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        self.buf.clear();
        // one extra byte makes room for the newline of a line of exactly `max_len` bytes
        let limit = (self.max_len as u64).saturating_add(1);
        let n = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| Error::Read {
                line: self.lines_read,
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        } else if self.buf.len() > self.max_len {
            return Err(Error::LineTooLong {
                line: self.lines_read + 1,
                limit: self.max_len,
            });
        }

        self.lines_read += 1;
        self.bytes_read += n as u64;
        Ok(Some(self.buf.as_slice()))
    }

    /// Return number of lines returned so far
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Return number of bytes consumed so far, newlines included
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}
