//! FASTA codec.
//!
//! Decoding turns lines into `(header, sequence)` records, concatenating
//! sequence lines; encoding re-wraps sequences at a fixed width.

use crate::diagnostics::{Decoded, Encoded};
use crate::error::{PrepError, Result};

/// Default width of sequence lines written by the encoder.
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// One FASTA entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Header without the leading `>`.
    pub header: String,
    /// All sequence lines of the entry, concatenated.
    pub sequence: String,
}

impl FastaRecord {
    pub fn new(header: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            sequence: sequence.into(),
        }
    }
}

/// FASTA codec configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastaCodec {
    line_width: usize,
}

impl Default for FastaCodec {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl FastaCodec {
    /// Codec wrapping sequences at `line_width` characters.
    pub fn with_line_width(line_width: usize) -> Result<Self> {
        if line_width == 0 {
            return Err(PrepError::InvalidArgument(
                "FASTA line width must be at least 1".to_string(),
            ));
        }
        Ok(Self { line_width })
    }

    /// Parse FASTA lines.
    ///
    /// Lines before the first header are discarded with a warning.
    pub fn decode<S: AsRef<str>>(&self, lines: &[S]) -> Decoded<FastaRecord> {
        let mut out = Decoded::default();
        let mut current: Option<FastaRecord> = None;

        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if let Some(header) = line.strip_prefix('>') {
                if let Some(done) = current.take() {
                    out.items.push(done);
                }
                current = Some(FastaRecord::new(header, String::new()));
            } else if let Some(record) = current.as_mut() {
                record.sequence.push_str(line);
            } else {
                out.diagnostics
                    .warn_at(i + 1, format!("line is not a header: {}", line));
            }
        }
        if let Some(done) = current {
            out.items.push(done);
        }

        out.diagnostics.info(format!(
            "Parsed FASTA: {} entries ({} warnings)",
            out.items.len(),
            out.diagnostics.warning_count()
        ));
        out
    }

    /// Serialize records, wrapping each sequence at the configured width.
    ///
    /// An empty sequence yields only the header line.
    pub fn encode(&self, records: &[FastaRecord]) -> Encoded {
        let mut out = Encoded {
            units_in: records.len(),
            units_out: records.len(),
            ..Default::default()
        };

        for record in records {
            out.lines.push(format!(">{}", record.header));
            let mut chunk = String::with_capacity(self.line_width);
            let mut n = 0;
            for c in record.sequence.chars() {
                chunk.push(c);
                n += 1;
                if n == self.line_width {
                    out.lines.push(std::mem::take(&mut chunk));
                    n = 0;
                }
            }
            if n > 0 {
                out.lines.push(chunk);
            }
        }

        out.diagnostics.info(format!(
            "Unparsed FASTA: {} entries ==> {} lines",
            records.len(),
            out.lines.len()
        ));
        out
    }
}

/// Decode with the default codec.
pub fn parse_fasta<S: AsRef<str>>(lines: &[S]) -> Decoded<FastaRecord> {
    FastaCodec::default().decode(lines)
}

/// Encode with the default 80-column width.
pub fn unparse_fasta(records: &[FastaRecord]) -> Encoded {
    FastaCodec::default().encode(records)
}
