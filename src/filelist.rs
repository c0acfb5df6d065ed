//! File-list consolidation.
//!
//! A file list is a table describing sequencing files: one mandatory
//! `file` column plus free-form parameter columns (cell type, treatment,
//! batch, read tag, ...). Consolidation turns the loosely written table
//! into uniform rows:
//!
//! 1. empty cells inherit the value of the row above ("fill-down"),
//! 2. the `Read` column, if present, decides single- vs paired-end,
//! 3. all files must share one primary and one compression extension,
//! 4. each row gains `SampleName`, `Basefilename` and `Affyfilename`.
//!
//! Any inconsistency is fatal: the artifacts written from a file list
//! would otherwise be silently wrong.

use crate::diagnostics::Diagnostics;
use crate::error::{PrepError, Result};
use crate::table::{check_colnames, format_table, Row, Table};
use std::collections::BTreeSet;

/// Columns every file list must declare.
pub const MANDATORY_PARNAMES: [&str; 1] = [FILE_COL];

/// Columns excluded from sample names.
pub const SPECIAL_PARNAMES: [&str; 3] = [BATCH_COL, READ_COL, FILE_COL];

/// Recognized compression extensions.
pub const ZIP_EXTENSIONS: [&str; 1] = [".gz"];

pub const FILE_COL: &str = "file";
pub const READ_COL: &str = "Read";
pub const BATCH_COL: &str = "Batch";

pub const SAMPLE_NAME_COL: &str = "SampleName";
pub const BASE_FILENAME_COL: &str = "Basefilename";
pub const AFFY_FILENAME_COL: &str = "Affyfilename";

/// Columns added by consolidation; a file list may not declare them.
pub const DERIVED_PARNAMES: [&str; 3] = [SAMPLE_NAME_COL, BASE_FILENAME_COL, AFFY_FILENAME_COL];

/// Width cap used when dumping the consolidated table.
const DUMP_MAX_WIDTH: usize = 50;

/// Sequencing layout derived from the `Read` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadLayout {
    /// No `Read` column declared.
    #[default]
    Unspecified,
    /// Only `R1` present.
    SingleEnd,
    /// Both `R1` and `R2` present.
    PairedEnd,
}

impl ReadLayout {
    /// Shell flag: `"T"`, `"F"`, or empty when unspecified.
    pub fn flag(&self) -> &'static str {
        match self {
            ReadLayout::Unspecified => "",
            ReadLayout::SingleEnd => "F",
            ReadLayout::PairedEnd => "T",
        }
    }
}

#[inline]
fn has_whitespace(s: &str) -> bool {
    s.chars().any(char::is_whitespace)
}

/// Reject parameter names that contain whitespace or collide with a
/// derived column.
pub fn check_parnames<S: AsRef<str>>(parnames: &[S]) -> Result<()> {
    for name in parnames {
        let name = name.as_ref();
        if has_whitespace(name) {
            return Err(PrepError::validation(format!(
                "spaces in parameter name: \"{}\"",
                name
            )));
        }
        if DERIVED_PARNAMES.contains(&name) {
            return Err(PrepError::validation(format!(
                "reserved parameter name: \"{}\" is derived from the other columns",
                name
            )));
        }
    }
    Ok(())
}

fn check_value(parname: &str, value: &str) -> Result<()> {
    if has_whitespace(value) {
        return Err(PrepError::validation(format!(
            "value in column \"{}\" contains spaces: \"{}\"",
            parname, value
        )));
    }
    Ok(())
}

/// Fill empty cells from the previous row.
///
/// Row 1 must have a value for every parameter. Values are trimmed and
/// may not contain whitespace. Running this twice is a no-op.
pub fn fill_omissions<S: AsRef<str>>(parnames: &[S], rows: &mut [Row]) -> Result<()> {
    let Some((first, rest)) = rows.split_first_mut() else {
        return Err(PrepError::validation("no file is described in input"));
    };

    for parname in parnames {
        let parname = parname.as_ref();
        let value = first.get(parname).map(|v| v.trim()).unwrap_or("").to_string();
        check_value(parname, &value)?;
        if value.is_empty() {
            return Err(PrepError::validation(format!(
                "no value for parameter {} in row 1 of input",
                parname
            )));
        }
        first.insert(parname.to_string(), value);
    }

    let mut prev: &Row = first;
    for row in rest.iter_mut() {
        for parname in parnames {
            let parname = parname.as_ref();
            let mut value = row.get(parname).map(|v| v.trim()).unwrap_or("").to_string();
            if value.is_empty() {
                value = prev.get(parname).cloned().unwrap_or_default();
            }
            check_value(parname, &value)?;
            row.insert(parname.to_string(), value);
        }
        prev = row;
    }
    Ok(())
}

/// Derive the read layout from the `Read` column, if declared.
///
/// The distinct values must be exactly `{R1}` or `{R1, R2}`.
pub fn read_layout<S: AsRef<str>>(parnames: &[S], rows: &[Row]) -> Result<ReadLayout> {
    if !parnames.iter().any(|p| p.as_ref() == READ_COL) {
        return Ok(ReadLayout::Unspecified);
    }
    let reads: BTreeSet<&str> = rows
        .iter()
        .map(|r| r.get(READ_COL).map(String::as_str).unwrap_or(""))
        .collect();
    let found: Vec<&str> = reads.iter().copied().collect();
    match found.as_slice() {
        ["R1"] => Ok(ReadLayout::SingleEnd),
        ["R1", "R2"] => Ok(ReadLayout::PairedEnd),
        _ => Err(PrepError::validation(format!(
            "'Read' must be 'R1' or 'R2' (found: {})",
            found.join(", ")
        ))),
    }
}

/// Split off the last extension of a file name, dot included.
///
/// Leading dots of the final path component do not start an extension,
/// so `.bashrc` has none.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let name_start = filename.rfind('/').map_or(0, |i| i + 1);
    let name = &filename[name_start..];
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => {
            let at = name_start + dot;
            (&filename[..at], &filename[at..])
        }
        _ => (filename, ""),
    }
}

/// Primary and compression extension of one file name.
///
/// `a.fastq.gz` gives `(".fastq", ".gz")`, `a.fastq` gives `(".fastq", "")`.
pub fn file_extensions(filename: &str) -> (&str, &str) {
    let (base, ext) = split_extension(filename);
    if ZIP_EXTENSIONS.contains(&ext) {
        (split_extension(base).1, ext)
    } else {
        (ext, "")
    }
}

fn quoted_list(set: &BTreeSet<&str>) -> String {
    set.iter()
        .map(|e| format!("'{}'", e))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Infer the extensions shared by every `file` value.
///
/// Returns `(primary, secondary)`. Files disagreeing on either is an
/// error. The outcome does not depend on row order.
pub fn infer_extensions(rows: &[Row]) -> Result<(String, String)> {
    let mut primary: BTreeSet<&str> = BTreeSet::new();
    let mut secondary: BTreeSet<&str> = BTreeSet::new();
    for row in rows {
        let file = row.get(FILE_COL).map(String::as_str).unwrap_or("");
        let (pri, sec) = file_extensions(file);
        primary.insert(pri);
        secondary.insert(sec);
    }

    if primary.len() > 1 {
        return Err(PrepError::validation(format!(
            "multiple primary extensions found: {}",
            quoted_list(&primary)
        )));
    }
    if secondary.len() > 1 {
        return Err(PrepError::validation(format!(
            "multiple secondary extensions found: {}",
            quoted_list(&secondary)
        )));
    }
    let first = |set: &BTreeSet<&str>| set.iter().next().map(|s| s.to_string()).unwrap_or_default();
    Ok((first(&primary), first(&secondary)))
}

fn join_values(row: &Row, names: &[&str]) -> String {
    names
        .iter()
        .map(|n| row.get(*n).map(String::as_str).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("_")
}

/// Add `SampleName`, `Basefilename` and `Affyfilename` to every row.
///
/// Returns the distinct sample names and base file names in first-seen
/// order.
pub fn add_basenames<S: AsRef<str>>(
    parnames: &[S],
    rows: &mut [Row],
    primary_ext: &str,
    secondary_ext: &str,
) -> (Vec<String>, Vec<String>) {
    let base_parnames: Vec<&str> = parnames
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| !SPECIAL_PARNAMES.contains(p))
        .collect();
    let mut file_parnames = base_parnames.clone();
    if parnames.iter().any(|p| p.as_ref() == READ_COL) {
        file_parnames.push(READ_COL);
    }

    let mut sample_names: Vec<String> = Vec::new();
    let mut base_filenames: Vec<String> = Vec::new();
    for row in rows.iter_mut() {
        let sample = join_values(row, &base_parnames);
        let base = join_values(row, &file_parnames);
        let affy = format!("{}{}{}", sample, primary_ext, secondary_ext);

        if !sample_names.contains(&sample) {
            sample_names.push(sample.clone());
        }
        if !base_filenames.contains(&base) {
            base_filenames.push(base.clone());
        }
        row.insert(SAMPLE_NAME_COL.to_string(), sample);
        row.insert(BASE_FILENAME_COL.to_string(), base);
        row.insert(AFFY_FILENAME_COL.to_string(), affy);
    }
    (sample_names, base_filenames)
}

/// A validated, consolidated file list.
#[derive(Debug, Clone)]
pub struct FileList {
    /// Declared parameter names, in header order.
    pub parnames: Vec<String>,
    /// Consolidated rows, including the derived columns.
    pub rows: Vec<Row>,
    pub layout: ReadLayout,
    /// Like `.fastq` or `.CEL`.
    pub primary_ext: String,
    /// `.gz` or empty.
    pub secondary_ext: String,
    /// Distinct `SampleName` values, first-seen order.
    pub sample_names: Vec<String>,
    /// Distinct `Basefilename` values, first-seen order.
    pub base_filenames: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl FileList {
    /// Validate and consolidate a loaded table.
    ///
    /// `source` only labels messages.
    pub fn consolidate(table: Table, source: &str) -> Result<Self> {
        let Table {
            colnames: parnames,
            mut rows,
        } = table;
        let mut diagnostics = Diagnostics::new();

        if !check_colnames(Some(&MANDATORY_PARNAMES[..]), &parnames, source, &mut diagnostics) {
            return Err(PrepError::invalid_columns(source, &diagnostics));
        }
        check_parnames(&parnames)?;
        fill_omissions(&parnames, &mut rows)?;

        let layout = read_layout(&parnames, &rows)?;
        let (primary_ext, secondary_ext) = infer_extensions(&rows)?;
        let (sample_names, base_filenames) =
            add_basenames(&parnames, &mut rows, &primary_ext, &secondary_ext);

        diagnostics.info(format!(
            "File list {}: {} files, {} samples, {} base files, extensions '{}' + '{}'",
            source,
            rows.len(),
            sample_names.len(),
            base_filenames.len(),
            primary_ext,
            secondary_ext
        ));
        diagnostics.detail("Using file list:");
        for line in format_table(&rows, &parnames, DUMP_MAX_WIDTH) {
            diagnostics.detail(line);
        }

        Ok(Self {
            parnames,
            rows,
            layout,
            primary_ext,
            secondary_ext,
            sample_names,
            base_filenames,
            diagnostics,
        })
    }

    /// Number of source files (rows).
    pub fn nr_source_files(&self) -> usize {
        self.rows.len()
    }

    /// `file` values that make up one base file name, in row order.
    pub fn source_files(&self, base_filename: &str) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.get(BASE_FILENAME_COL).map(String::as_str) == Some(base_filename))
            .filter_map(|r| r.get(FILE_COL).map(String::as_str))
            .collect()
    }

    /// True if some base file name is built from more than one file.
    pub fn needs_concatenation(&self) -> bool {
        self.base_filenames
            .iter()
            .any(|b| self.source_files(b).len() > 1)
    }
}
