//! Line source and sink.
//!
//! Every codec in this crate works on fully materialized line vectors.
//! This module turns files (or any reader) into such vectors and writes
//! them back.

use crate::error::Result;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Buffered line reader over any readable source.
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    buffer: String,
    strip_ws: bool,
}

impl LineReader<File> {
    /// Open a file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: String::with_capacity(1024),
            strip_ws: false,
        }
    }

    /// Trim leading and trailing whitespace from every line.
    pub fn strip_whitespace(mut self, strip: bool) -> Self {
        self.strip_ws = strip;
        self
    }

    /// Read the next line without its terminator.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        let bytes_read = self.reader.read_line(&mut self.buffer)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        let line = if self.strip_ws {
            self.buffer.trim()
        } else {
            self.buffer.trim_end_matches(['\n', '\r'])
        };
        Ok(Some(line.to_string()))
    }

    /// Read every remaining line.
    pub fn read_all(mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            lines.push(line);
        }
        Ok(lines)
    }
}

/// Load all lines of a file. With `strip_ws`, each line is trimmed.
pub fn read_lines<P: AsRef<Path>>(path: P, strip_ws: bool) -> Result<Vec<String>> {
    LineReader::from_path(path)?
        .strip_whitespace(strip_ws)
        .read_all()
}

/// Split in-memory text into lines (useful for testing).
pub fn parse_lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}

/// Write lines, each followed by `\n`.
pub fn write_lines<W: Write, S: AsRef<str>>(writer: &mut W, lines: &[S]) -> io::Result<()> {
    for line in lines {
        writer.write_all(line.as_ref().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Save lines to a file, creating or truncating it.
pub fn save_lines<P: AsRef<Path>, S: AsRef<str>>(path: P, lines: &[S]) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_lines(&mut out, lines)?;
    out.flush()?;
    Ok(())
}
