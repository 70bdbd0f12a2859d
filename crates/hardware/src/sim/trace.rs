//! Memory Trace Reader.
//!
//! This module reads the access traces fed to the simulator. It performs:
//! 1. **Record parsing:** `<code> <hex-address>` per line, where code `0` is a data
//!    read, `1` a data write, and `2` an instruction fetch.
//! 2. **Filtering:** Blank lines and `#` comments are skipped.
//! 3. **Streaming:** Records are yielded lazily from any `BufRead`, so traces of
//!    arbitrary length never sit in memory.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::common::{AccessType, SimError, TraceError};

/// One trace event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Access type.
    pub access: AccessType,
    /// Byte address.
    pub addr: u64,
}

/// Parses one trace line.
///
/// Returns `Ok(None)` for blank and comment lines.
///
/// # Arguments
///
/// * `line` - 1-based line number, used in error messages
/// * `text` - The line contents
pub fn parse_record(line: usize, text: &str) -> Result<Option<TraceRecord>, TraceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut fields = trimmed.split_whitespace();
    let (Some(code), Some(addr), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(TraceError::MalformedLine {
            line,
            text: trimmed.to_string(),
        });
    };

    let access = code
        .parse::<u8>()
        .ok()
        .and_then(AccessType::from_code)
        .ok_or_else(|| TraceError::UnknownAccessCode {
            line,
            code: code.to_string(),
        })?;

    let digits = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    let addr = u64::from_str_radix(digits, 16).map_err(|_| TraceError::BadAddress {
        line,
        text: addr.to_string(),
    })?;

    Ok(Some(TraceRecord { access, addr }))
}

/// Streaming iterator over the records of a trace.
#[derive(Debug)]
pub struct TraceReader<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl TraceReader<BufReader<File>> {
    /// Opens a trace file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Number of lines consumed so far.
    pub const fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            match parse_record(self.line, &text) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
