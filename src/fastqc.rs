//! FastQC summary matrix.
//!
//! Collects the per-module PASS/WARN/FAIL verdicts from each sample's
//! FastQC `summary.txt` and renders one line per sample under a
//! staircase header naming the modules.

use crate::error::{PrepError, Result};
use crate::lines::read_lines;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// FastQC modules in report order.
pub const FASTQC_MODULES: [&str; 11] = [
    "Basic Statistics",
    "Per base sequence quality",
    "Per sequence quality scores",
    "Per base sequence content",
    "Per base GC content",
    "Per sequence GC content",
    "Per base N content",
    "Sequence Length Distribution",
    "Sequence Duplication Levels",
    "Overrepresented sequences",
    "Kmer Content",
];

/// Verdict of one FastQC module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastqcStatus {
    Pass,
    Warn,
    Fail,
}

impl FastqcStatus {
    pub fn mark(&self) -> char {
        match self {
            FastqcStatus::Pass => '+',
            FastqcStatus::Warn => '?',
            FastqcStatus::Fail => '-',
        }
    }
}

impl FromStr for FastqcStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(FastqcStatus::Pass),
            "WARN" => Ok(FastqcStatus::Warn),
            "FAIL" => Ok(FastqcStatus::Fail),
            other => Err(format!("unknown FastQC status '{}'", other)),
        }
    }
}

impl fmt::Display for FastqcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mark())
    }
}

/// Location of a sample's `summary.txt` inside the FastQC output folder.
///
/// Paired-end runs are named after the trimmed `val_<n>` files, where
/// `<n>` is the last character of the base file name (`..._R1` -> `1`).
pub fn summary_path<P: AsRef<Path>>(fastqc_dir: P, basename: &str, paired: bool) -> PathBuf {
    let suffix = if paired {
        let read = basename.chars().last().map(String::from).unwrap_or_default();
        format!("val_{}.fq_fastqc", read)
    } else {
        "trimmed.fq_fastqc".to_string()
    };
    fastqc_dir
        .as_ref()
        .join(format!("{}_{}", basename, suffix))
        .join("summary.txt")
}

/// Parse `status<TAB>module<TAB>file` lines. Blank lines are skipped.
pub fn parse_summary<S: AsRef<str>>(lines: &[S]) -> Result<Vec<FastqcStatus>> {
    let mut statuses = Vec::with_capacity(FASTQC_MODULES.len());
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let status = line.split('\t').next().unwrap_or("").trim();
        let status = status.parse().map_err(|message| PrepError::Parse {
            line: i + 1,
            message,
        })?;
        statuses.push(status);
    }
    Ok(statuses)
}

/// Read and parse one sample's summary.
pub fn load_summary(fastqc_dir: &Path, basename: &str, paired: bool) -> Result<Vec<FastqcStatus>> {
    parse_summary(&read_lines(summary_path(fastqc_dir, basename, paired), false)?)
}

/// Column width for the sample-name column.
pub fn name_width<S: AsRef<str>>(basenames: &[S]) -> usize {
    basenames
        .iter()
        .map(|b| b.as_ref().chars().count())
        .max()
        .unwrap_or(0)
        + 2
}

/// Staircase header: one line per module, each indented by one more
/// `| ` than the last, closed by a line of bars.
pub fn header_lines(width: usize) -> Vec<String> {
    let pad = " ".repeat(width);
    let mut lines = Vec::with_capacity(FASTQC_MODULES.len() + 1);
    for (i, module) in FASTQC_MODULES.iter().enumerate() {
        lines.push(format!("{} {}{}", pad, "| ".repeat(i), module));
    }
    let closing = "| ".repeat(FASTQC_MODULES.len());
    lines.push(format!("{} {}", pad, closing.trim_end()));
    lines
}

/// One matrix row: the sample name followed by a mark per module.
pub fn render_row(basename: &str, statuses: &[FastqcStatus], width: usize) -> String {
    let mut line = format!("{:<width$}", basename, width = width);
    for status in statuses {
        line.push(' ');
        line.push(status.mark());
    }
    line
}

/// Header plus one row per sample.
pub fn summarize<S: AsRef<str>>(
    fastqc_dir: &Path,
    basenames: &[S],
    paired: bool,
) -> Result<Vec<String>> {
    let width = name_width(basenames);
    let mut lines = header_lines(width);
    for basename in basenames {
        let basename = basename.as_ref();
        let statuses = load_summary(fastqc_dir, basename, paired)?;
        lines.push(render_row(basename, &statuses, width));
    }
    Ok(lines)
}
