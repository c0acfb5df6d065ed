//! Artifacts written from a consolidated file list.
//!
//! - `scripts/g_filelist.sh`: shell variables sourced by later pipeline
//!   steps (always written)
//! - `processedData/SampleDescription.csv`: one row per sample (`sd`)
//! - `processedData/AffySampleDescription.csv`: fixed-width table for
//!   `simpleaffy::read.affy` (`affy`)

use crate::config::Context;
use crate::error::{PrepError, Result};
use crate::filelist::{FileList, AFFY_FILENAME_COL, FILE_COL, READ_COL, SAMPLE_NAME_COL};
use crate::lines::save_lines;
use crate::table::{save_tab_delimited, Row};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where the shell-variable file goes, relative to the project.
pub const FILELIST_SCRIPT_PATH: &str = "scripts/g_filelist.sh";

/// `BFN_TO_FNS` entries wrap once a line reaches this many characters.
const BFN_LINE_WRAP: usize = 100;

const BANNER_WIDTH: usize = 64;

/// Parameters that do not describe a sample.
const NON_SAMPLE_PARNAMES: [&str; 2] = [READ_COL, FILE_COL];

/// Optional outputs selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Sample description sheet.
    SampleDescription,
    /// Affymetrix sample description.
    AffySampleDescription,
}

impl OutputFormat {
    /// Output path relative to the project directory.
    pub fn relative_path(&self) -> &'static str {
        match self {
            OutputFormat::SampleDescription => "processedData/SampleDescription.csv",
            OutputFormat::AffySampleDescription => "processedData/AffySampleDescription.csv",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::SampleDescription => "sd",
            OutputFormat::AffySampleDescription => "affy",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sd" => Ok(OutputFormat::SampleDescription),
            "affy" => Ok(OutputFormat::AffySampleDescription),
            other => Err(PrepError::InvalidArgument(format!(
                "invalid output format: {} (expected sd or affy)",
                other
            ))),
        }
    }
}

fn sample_parnames(list: &FileList) -> Vec<&str> {
    list.parnames
        .iter()
        .map(String::as_str)
        .filter(|p| !NON_SAMPLE_PARNAMES.contains(p))
        .collect()
}

/// `[basename]="file1 file2 ..."` entry of the `BFN_TO_FNS` array,
/// wrapped with backslash continuations.
fn bfn_entry(base_filename: &str, files: &[&str]) -> Vec<String> {
    let first_prefix = format!("    [{}]=\"", base_filename);
    let next_prefix = " ".repeat(first_prefix.chars().count());

    let mut lines: Vec<String> = Vec::new();
    let mut current = first_prefix;
    for file in files {
        current.push_str(file);
        current.push(' ');
        if current.chars().count() >= BFN_LINE_WRAP {
            current.push('\\');
            lines.push(std::mem::replace(&mut current, next_prefix.clone()));
        }
    }
    if current.trim().is_empty() {
        if let Some(mut last) = lines.pop() {
            last.pop();
            current = last;
        }
    }
    // Replace the trailing space with the closing quote.
    current.pop();
    current.push('"');
    lines.push(current);
    lines
}

/// Lines of the shell-variable file describing `list`.
///
/// `date` is stamped into the banner.
pub fn filelist_script(list: &FileList, date: &str) -> Vec<String> {
    let mut num = itoa::Buffer::new();
    let flag = |b: bool| if b { "T" } else { "F" };
    let banner = "#".repeat(BANNER_WIDTH);

    let mut lines = vec![
        banner.clone(),
        format!(
            "{:<width$}##",
            format!("##  Automatically generated by seqprep on {}", date),
            width = BANNER_WIDTH - 2
        ),
        format!("##{}##", "-".repeat(BANNER_WIDTH - 4)),
        format!(
            "{:<width$}##",
            "##  This file should be sourced by other scripts.",
            width = BANNER_WIDTH - 2
        ),
        banner,
        String::new(),
        format!("NEEDS_CONCATENATION=\"{}\"", flag(list.needs_concatenation())),
        format!("IS_PAIRED_END=\"{}\"", list.layout.flag()),
        format!("PRIMARY_EXT=\"{}\"", list.primary_ext),
        format!("SECONDARY_EXT=\"{}\"", list.secondary_ext),
        format!("NR_SAMPLES=\"{}\"", num.format(list.sample_names.len())),
        format!("NR_FILES=\"{}\"", num.format(list.base_filenames.len())),
        format!("NR_SOURCE_FILES=\"{}\"", num.format(list.nr_source_files())),
        String::new(),
    ];

    for (var, names) in [
        ("SAMPLENAMES", &list.sample_names),
        ("BASE_FILENAMES", &list.base_filenames),
    ] {
        lines.push(format!("{}=\"\\", var));
        let body = names.join(" \\\n");
        let mut body_lines: Vec<String> = body.split('\n').map(str::to_string).collect();
        if let Some(last) = body_lines.last_mut() {
            last.push('"');
        }
        lines.extend(body_lines);
        lines.push(String::new());
    }

    lines.push("declare -A BFN_TO_FNS=(".to_string());
    for bfn in &list.base_filenames {
        lines.extend(bfn_entry(bfn, &list.source_files(bfn)));
    }
    lines.push(")".to_string());
    lines.push(String::new());

    lines.extend(
        [
            "# Convert base-filename to a list of original filenames.",
            "# Usage:  getOrigFiles  base-filename",
            "# Result: prints to stdout space-separated list of filenames",
            "getOrigFiles () {",
            "    echo \"${BFN_TO_FNS[$1]}\"",
            "}",
        ]
        .map(str::to_string),
    );
    lines
}

/// Columns and de-duplicated rows of the sample description sheet.
pub fn sample_description(list: &FileList) -> (Vec<String>, Vec<Row>) {
    let mut colnames = vec![SAMPLE_NAME_COL.to_string()];
    colnames.extend(sample_parnames(list).into_iter().map(str::to_string));

    let mut rows: Vec<Row> = Vec::new();
    for row in &list.rows {
        let sl_row: Row = colnames
            .iter()
            .map(|c| (c.clone(), row.get(c).cloned().unwrap_or_default()))
            .collect();
        if !rows.contains(&sl_row) {
            rows.push(sl_row);
        }
    }
    (colnames, rows)
}

/// Left-aligned fixed-width Affymetrix sample description.
///
/// The first header cell is blank; the first column holds `Affyfilename`.
pub fn affy_sample_description(list: &FileList) -> Vec<String> {
    let parnames = sample_parnames(list);
    let mut header: Vec<&str> = vec![""];
    header.extend(parnames.iter().copied());
    let mut columns: Vec<&str> = vec![AFFY_FILENAME_COL];
    columns.extend(parnames.iter().copied());

    let widths: Vec<usize> = columns
        .iter()
        .map(|c| {
            list.rows
                .iter()
                .map(|r| r.get(*c).map_or(0, |v| v.chars().count()))
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = vec![render(&header[..])];
    for row in &list.rows {
        let cells: Vec<&str> = columns
            .iter()
            .map(|c| row.get(*c).map(String::as_str).unwrap_or(""))
            .collect();
        lines.push(render(&cells[..]));
    }
    lines
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the shell-variable file and every requested output under the
/// project directory. Returns the paths written, in order.
pub fn write_outputs(
    ctx: &Context,
    list: &FileList,
    formats: &[OutputFormat],
    date: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(formats.len() + 1);

    let script = ctx.project_dir.join(FILELIST_SCRIPT_PATH);
    ensure_parent(&script)?;
    save_lines(&script, &filelist_script(list, date))?;
    written.push(script);

    for format in formats {
        let path = ctx.project_dir.join(format.relative_path());
        ensure_parent(&path)?;
        match format {
            OutputFormat::SampleDescription => {
                let (colnames, rows) = sample_description(list);
                save_tab_delimited(&path, &colnames, &rows)?;
            }
            OutputFormat::AffySampleDescription => {
                save_lines(&path, &affy_sample_description(list))?;
            }
        }
        written.push(path);
    }
    Ok(written)
}
