//! On-disk append log for evaluation records.
//!
//! One JSON object per line, written in sequence order and flushed per
//! append so an interrupted run loses at most the line being written.
//! Reading tolerates a truncated or garbled final line (the interrupted
//! tail); corruption anywhere earlier is a hard error.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::table::{EvalRecord, Outcome};

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("log record {line} is corrupt: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("log record {line} has sequence index {got}, expected {expected}")]
    OutOfOrder {
        line: usize,
        expected: u64,
        got: u64,
    },

    #[error("record {seq} has non-finite robustness {robustness} and cannot be persisted")]
    NonFinite { seq: u64, robustness: f64 },

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Appends records to a log file, one line each.
pub struct LogWriter {
    out: BufWriter<File>,
}

impl LogWriter {
    /// Create (or truncate) a log at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let file = File::create(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Open an existing log for appending.
    pub fn append_to(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Append one record and flush.
    ///
    /// Non-finite robustness is rejected: serde_json writes it as `null`,
    /// which would not parse back as a float, so the record would be
    /// dropped or read as corruption on replay.
    pub fn append(&mut self, record: &EvalRecord) -> Result<(), LogError> {
        if let Outcome::Scored { robustness, .. } = record.outcome {
            if !robustness.is_finite() {
                return Err(LogError::NonFinite {
                    seq: record.seq,
                    robustness,
                });
            }
        }
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Replay a log in strict append order.
///
/// Sequence indices must be contiguous from 0. A final line with no
/// trailing newline, or a final line that fails to parse, is treated as an
/// interrupted tail and ignored.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<EvalRecord>, LogError> {
    let mut raw = String::new();
    File::open(path)?.read_to_string(&mut raw)?;

    // Only lines terminated by '\n' are complete; anything after the last
    // newline is an interrupted tail.
    let complete = match raw.rfind('\n') {
        Some(idx) => &raw[..idx],
        None => return Ok(Vec::new()),
    };

    let lines: Vec<&str> = complete
        .split('\n')
        .filter(|l| !l.trim().is_empty())
        .collect();
    let mut records = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let record: EvalRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            // A garbled last complete line is also an interrupted tail
            // (e.g. the process died mid-write but after the newline of the
            // previous record was flushed).
            Err(_) if i == lines.len() - 1 => break,
            Err(e) => {
                return Err(LogError::Corrupt {
                    line: i,
                    reason: e.to_string(),
                })
            }
        };
        if record.seq != i as u64 {
            return Err(LogError::OutOfOrder {
                line: i,
                expected: i as u64,
                got: record.seq,
            });
        }
        records.push(record);
    }
    Ok(records)
}
