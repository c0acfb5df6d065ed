//! Column tables: validation, loading and writing.
//!
//! A [`Table`] is an ordered list of column names plus rows mapping
//! column name to string value. Two text layouts are understood:
//!
//! - `.txt`: whitespace-aligned columns with a header row; each data row
//!   is cut at the character offsets where header names start
//! - `.csv` / `.tsv`: tab-delimited with a header row
//!
//! Spreadsheet workbooks are not supported.

use crate::diagnostics::Diagnostics;
use crate::error::{PrepError, Result};
use crate::lines::read_lines;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// One table row: column name to value.
pub type Row = FxHashMap<String, String>;

/// Column names plus rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub colnames: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(colnames: Vec<String>, rows: Vec<Row>) -> Self {
        Self { colnames, rows }
    }

    /// Build a table from string slices (useful for testing).
    pub fn from_strs(colnames: &[&str], rows: &[&[&str]]) -> Self {
        let colnames: Vec<String> = colnames.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| {
                colnames
                    .iter()
                    .zip(values.iter())
                    .map(|(c, v)| (c.clone(), v.to_string()))
                    .collect()
            })
            .collect();
        Self { colnames, rows }
    }
}

/// Check column names.
///
/// Warns (through `diags`) when `actual` repeats a name, and when a name
/// from `required` is missing from `actual`. Returns `true` only if
/// neither happened. `source` names the table in the messages.
pub fn check_colnames<S: AsRef<str>>(
    required: Option<&[&str]>,
    actual: &[S],
    source: &str,
    diags: &mut Diagnostics,
) -> bool {
    let mut is_ok = true;

    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    let mut order: Vec<&str> = Vec::new();
    for name in actual {
        let name = name.as_ref();
        let n = counts.entry(name).or_insert(0);
        if *n == 0 {
            order.push(name);
        }
        *n += 1;
    }
    let repeated: Vec<&str> = order.into_iter().filter(|n| counts[n] > 1).collect();
    if !repeated.is_empty() {
        diags.warn(format!(
            "Repeated column names (file {}): {}",
            source,
            repeated.join(", ")
        ));
        is_ok = false;
    }

    let missing: Vec<&str> = required
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|r| !counts.contains_key(r))
        .collect();
    if !missing.is_empty() {
        diags.warn(format!(
            "Required column names are absent (file {}): {}",
            source,
            missing.join(", ")
        ));
        is_ok = false;
    }

    is_ok
}

/// Start offsets (in chars) of whitespace-separated header cells.
fn split_positions(header: &[char]) -> Vec<(usize, usize)> {
    let mut starts = Vec::new();
    let mut waiting_for_word = true;
    for (i, &c) in header.iter().enumerate() {
        if waiting_for_word {
            if c != ' ' {
                starts.push(i);
                waiting_for_word = false;
            }
        } else if c == ' ' {
            waiting_for_word = true;
        }
    }
    let mut spans = Vec::with_capacity(starts.len());
    for (k, &s) in starts.iter().enumerate() {
        let e = starts.get(k + 1).copied().unwrap_or(usize::MAX);
        spans.push((s, e));
    }
    spans
}

fn slice_chars(line: &[char], (start, end): (usize, usize)) -> String {
    if start >= line.len() {
        return String::new();
    }
    let end = end.min(line.len());
    line[start..end].iter().collect::<String>().trim().to_string()
}

/// Parse a whitespace-aligned table.
///
/// Text after `#` is ignored and blank lines are skipped. The first
/// remaining line is the header.
pub fn parse_aligned<S: AsRef<str>>(lines: &[S]) -> Table {
    let mut table = Table::default();
    let mut spans: Option<Vec<(usize, usize)>> = None;

    for line in lines {
        let line = line.as_ref();
        let pure = line.split('#').next().unwrap_or("").trim_end();
        if pure.is_empty() {
            continue;
        }
        let chars: Vec<char> = pure.chars().collect();
        match &spans {
            None => {
                let s = split_positions(&chars);
                table.colnames = s.iter().map(|&span| slice_chars(&chars, span)).collect();
                spans = Some(s);
            }
            Some(s) => {
                let row: Row = table
                    .colnames
                    .iter()
                    .zip(s.iter())
                    .map(|(name, &span)| (name.clone(), slice_chars(&chars, span)))
                    .collect();
                table.rows.push(row);
            }
        }
    }
    table
}

/// Parse a tab-delimited table with a header row.
///
/// Short rows are padded with empty cells; every cell is trimmed.
pub fn parse_tab_delimited<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let colnames: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Row = colnames
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), record.get(i).unwrap_or("").trim().to_string()))
            .collect();
        rows.push(row);
    }
    Ok(Table::new(colnames, rows))
}

/// Load a table, choosing the layout from the file extension.
///
/// Column names are checked against `required`. For tab-delimited input
/// a failed check is an error; for aligned input the warnings are left
/// in `diags` for the caller to judge.
pub fn load_table<P: AsRef<Path>>(
    path: P,
    required: Option<&[&str]>,
    diags: &mut Diagnostics,
) -> Result<Table> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    diags.info(format!("Loading {}...", source));
    let table = match ext.as_str() {
        "txt" => {
            let table = parse_aligned(&read_lines(path, false)?);
            check_colnames(required, &table.colnames, &source, diags);
            table
        }
        "csv" | "tsv" => {
            let table = parse_tab_delimited(File::open(path)?)?;
            let mut checks = Diagnostics::new();
            let ok = check_colnames(required, &table.colnames, &source, &mut checks);
            let err = (!ok).then(|| PrepError::invalid_columns(&source, &checks));
            diags.extend(checks);
            if let Some(err) = err {
                return Err(err);
            }
            table
        }
        "xls" | "xlsx" => {
            return Err(PrepError::Unsupported(format!(
                "spreadsheet input is not supported, export {} as tab-delimited text",
                source
            )))
        }
        other => {
            return Err(PrepError::Unsupported(format!(
                "unknown input file format: .{}",
                other
            )))
        }
    };
    diags.info(format!(
        "Done, {} columns and {} rows.",
        table.colnames.len(),
        table.rows.len()
    ));
    Ok(table)
}

/// Write rows as tab-delimited text.
///
/// `prefix` lines are written first, then the header (if requested),
/// then one line per row in `colnames` order. Missing values are empty.
pub fn write_tab_delimited<W: Write, S: AsRef<str>>(
    mut writer: W,
    colnames: &[S],
    rows: &[Row],
    prefix: &[&str],
    header: bool,
) -> Result<()> {
    for line in prefix {
        writeln!(writer, "{}", line)?;
    }
    if header {
        let names: Vec<&str> = colnames.iter().map(|c| c.as_ref()).collect();
        writeln!(writer, "{}", names.join("\t"))?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);
    for row in rows {
        wtr.write_record(
            colnames
                .iter()
                .map(|c| row.get(c.as_ref()).map(String::as_str).unwrap_or("")),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save rows to a tab-delimited file with a header row.
pub fn save_tab_delimited<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    colnames: &[S],
    rows: &[Row],
) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_tab_delimited(&mut out, colnames, rows, &[], true)?;
    out.flush()?;
    Ok(())
}

/// Render rows as right-aligned fixed-width text for verbose dumps.
///
/// Column width is the longest of name and values, capped at
/// `max_width`; longer cells are cut.
pub fn format_table<S: AsRef<str>>(rows: &[Row], colnames: &[S], max_width: usize) -> Vec<String> {
    let widths: Vec<usize> = colnames
        .iter()
        .map(|c| {
            let c = c.as_ref();
            rows.iter()
                .map(|r| r.get(c).map_or(0, |v| v.chars().count()))
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
                .min(max_width)
        })
        .collect();

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, &w)| {
                let cut: String = cell.chars().take(max_width).collect();
                format!("{:>width$}", cut, width = w)
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render(colnames.iter().map(|c| c.as_ref()).collect()));
    for row in rows {
        lines.push(render(
            colnames
                .iter()
                .map(|c| row.get(c.as_ref()).map(String::as_str).unwrap_or(""))
                .collect(),
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_duplicate_columns_reported() {
        let mut diags = Diagnostics::new();
        let ok = check_colnames(None, &["a", "b", "a"], "t.csv", &mut diags);
        assert!(!ok);
        assert_eq!(diags.warning_count(), 1);
        let msg = &diags.warnings().next().unwrap().message;
        assert!(msg.contains("Repeated column names"));
        assert!(msg.ends_with(": a"));
    }

    #[test]
    fn test_every_duplicate_listed_once() {
        let mut diags = Diagnostics::new();
        check_colnames(None, &["x", "y", "x", "y", "x"], "t", &mut diags);
        assert!(diags.warnings().next().unwrap().message.ends_with(": x, y"));
    }

    #[test]
    fn test_missing_required() {
        let mut diags = Diagnostics::new();
        let ok = check_colnames(Some(&["file", "Read"][..]), &["file", "Cell"], "t", &mut diags);
        assert!(!ok);
        assert!(diags.warnings().next().unwrap().message.ends_with(": Read"));
    }

    #[test]
    fn test_both_problems_two_warnings() {
        let mut diags = Diagnostics::new();
        let ok = check_colnames(Some(&["file"][..]), &["a", "a"], "t", &mut diags);
        assert!(!ok);
        assert_eq!(diags.warning_count(), 2);
    }

    #[test]
    fn test_valid_columns() {
        let mut diags = Diagnostics::new();
        assert!(check_colnames(Some(&["file"][..]), &["file", "Cell"], "t", &mut diags));
        assert!(check_colnames(None, &["file"], "t", &mut diags));
        assert!(check_colnames(Some(&[][..]), &["file"], "t", &mut diags));
        assert_eq!(diags.warning_count(), 0);
    }

    #[test]
    fn test_parse_aligned() {
        let lines = [
            "# sample sheet",
            "Cell     Treatment  Read  file",
            "HeLa     ctrl       R1    a_1.fastq.gz   # first",
            "                    R2    a_2.fastq.gz",
            "",
            "MCF7     drug       R1    b_1.fastq.gz",
        ];
        let table = parse_aligned(&lines);
        assert_eq!(table.colnames, vec!["Cell", "Treatment", "Read", "file"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0]["file"], "a_1.fastq.gz");
        assert_eq!(table.rows[1]["Cell"], "");
        assert_eq!(table.rows[1]["Read"], "R2");
        assert_eq!(table.rows[2]["Treatment"], "drug");
    }

    #[test]
    fn test_parse_aligned_short_row() {
        let table = parse_aligned(&["A    B    C", "x"]);
        assert_eq!(table.rows[0]["A"], "x");
        assert_eq!(table.rows[0]["B"], "");
        assert_eq!(table.rows[0]["C"], "");
    }

    #[test]
    fn test_parse_tab_delimited() {
        let text = "Cell\tfile\nHeLa\ta.fastq\n\tb.fastq\nx\n";
        let table = parse_tab_delimited(text.as_bytes()).unwrap();
        assert_eq!(table.colnames, vec!["Cell", "file"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1]["Cell"], "");
        assert_eq!(table.rows[2]["file"], "");
    }

    #[test]
    fn test_load_csv_with_duplicates_is_fatal() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "file\tfile\na\tb\n").unwrap();
        file.flush().unwrap();

        let mut diags = Diagnostics::new();
        let result = load_table(file.path(), Some(&["file"][..]), &mut diags);
        match result {
            Err(PrepError::Validation(msg)) => assert!(msg.ends_with(": file"), "{}", msg),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn test_load_txt_is_advisory() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "Cell  Cell").unwrap();
        writeln!(file, "a     b").unwrap();
        file.flush().unwrap();

        let mut diags = Diagnostics::new();
        let table = load_table(file.path(), None, &mut diags).unwrap();
        assert_eq!(table.colnames.len(), 2);
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn test_load_unknown_extension() {
        let mut diags = Diagnostics::new();
        let result = load_table("sheet.xlsx", None, &mut diags);
        assert!(matches!(result, Err(PrepError::Unsupported(_))));
        let result = load_table("sheet.json", None, &mut diags);
        assert!(matches!(result, Err(PrepError::Unsupported(_))));
    }

    #[test]
    fn test_write_tab_delimited() {
        let table = Table::from_strs(&["a", "b"], &[&["1", "2"], &["3"]]);
        let mut buf = Vec::new();
        write_tab_delimited(&mut buf, &table.colnames, &table.rows, &["# generated"], true)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "# generated\na\tb\n1\t2\n3\t\n");
    }

    #[test]
    fn test_format_table() {
        let table = Table::from_strs(&["name", "n"], &[&["alpha", "1"], &["b", "22"]]);
        let lines = format_table(&table.rows, &table.colnames, 3);
        assert_eq!(lines, vec!["nam   n", "alp   1", "  b  22"]);
    }
}
