//! End-to-end tests for the seqprep binary.
//!
//! Tests cover:
//! 1. filelist: shell-variable file and sample descriptions in a project dir
//! 2. fasta / gff normalization through files and stdin
//! 3. fqcsumm matrix rendering
//! 4. Error exit codes

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::{NamedTempFile, TempDir};

/// Helper to create a temporary input file.
fn create_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

/// Helper to run seqprep and return output.
fn run_seqprep(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seqprep"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("PROJDIR")
        .env_remove("VERBOSITY_LEVEL")
        .env_remove("BASE_FILENAMES")
        .env_remove("IS_PAIRED_END")
        .output()
        .expect("Failed to run seqprep")
}

/// Helper to run seqprep with extra environment variables set.
fn run_seqprep_env(args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seqprep"))
        .args(args)
        .env_remove("RUST_LOG")
        .envs(vars.iter().copied())
        .output()
        .expect("Failed to run seqprep")
}

/// Helper to run seqprep with `input` piped to stdin.
fn run_seqprep_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_seqprep"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn seqprep");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Aligned file list: Cell, Treat, Read, file columns at fixed offsets.
fn aligned_filelist(rows: &[[&str; 4]]) -> String {
    let mut text = format!("{:<7}{:<7}{:<6}{}\n", "Cell", "Treat", "Read", "file");
    for r in rows {
        text.push_str(&format!("{:<7}{:<7}{:<6}{}\n", r[0], r[1], r[2], r[3]));
    }
    text
}

fn write_project_filelist(project: &Path, name: &str, content: &str) {
    let scripts = project.join("scripts");
    fs::create_dir_all(&scripts).unwrap();
    fs::write(scripts.join(name), content).unwrap();
}

// =============================================================================
// filelist
// =============================================================================

#[test]
fn test_filelist_paired_end_outputs() {
    let project = TempDir::new().unwrap();
    let content = aligned_filelist(&[
        ["HeLa", "ctrl", "R1", "HeLa_ctrl_1.fastq.gz"],
        ["", "", "R2", "HeLa_ctrl_2.fastq.gz"],
        ["K562", "ctrl", "R1", "K562_1.fastq.gz"],
        ["", "", "R2", "K562_2.fastq.gz"],
    ]);
    write_project_filelist(project.path(), "files.txt", &content);

    let project_dir = project.path().to_str().unwrap();
    let output = run_seqprep(&["--project-dir", project_dir, "filelist", "files.txt", "sd"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let script = fs::read_to_string(project.path().join("scripts/g_filelist.sh")).unwrap();
    for expected in [
        "NEEDS_CONCATENATION=\"F\"",
        "IS_PAIRED_END=\"T\"",
        "PRIMARY_EXT=\".fastq\"",
        "SECONDARY_EXT=\".gz\"",
        "NR_SAMPLES=\"2\"",
        "NR_FILES=\"4\"",
        "NR_SOURCE_FILES=\"4\"",
        "    [HeLa_ctrl_R1]=\"HeLa_ctrl_1.fastq.gz\"",
    ] {
        assert!(script.lines().any(|l| l == expected), "missing {expected}");
    }
    assert!(script.contains("getOrigFiles () {"));

    let sd = fs::read_to_string(project.path().join("processedData/SampleDescription.csv")).unwrap();
    assert_eq!(
        sd,
        "SampleName\tCell\tTreat\nHeLa_ctrl\tHeLa\tctrl\nK562_ctrl\tK562\tctrl\n"
    );
    assert!(!project
        .path()
        .join("processedData/AffySampleDescription.csv")
        .exists());
}

#[test]
fn test_filelist_tab_delimited_affy() {
    let project = TempDir::new().unwrap();
    write_project_filelist(
        project.path(),
        "files.csv",
        "Cell\tfile\nHeLa\tHeLa.CEL\nK562\tK562.CEL\n",
    );

    let project_dir = project.path().to_str().unwrap();
    let output = run_seqprep(&["--project-dir", project_dir, "filelist", "files.csv", "affy"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let affy =
        fs::read_to_string(project.path().join("processedData/AffySampleDescription.csv")).unwrap();
    let lines: Vec<&str> = affy.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("HeLa.CEL"));

    let script = fs::read_to_string(project.path().join("scripts/g_filelist.sh")).unwrap();
    assert!(script.lines().any(|l| l == "IS_PAIRED_END=\"\""));
    assert!(script.lines().any(|l| l == "SECONDARY_EXT=\"\""));
}

#[test]
fn test_filelist_mixed_compression_fails() {
    let project = TempDir::new().unwrap();
    write_project_filelist(
        project.path(),
        "files.csv",
        "Cell\tfile\nHeLa\tHeLa.fastq.gz\nK562\tK562.fastq\n",
    );

    let project_dir = project.path().to_str().unwrap();
    let output = run_seqprep(&["--project-dir", project_dir, "filelist", "files.csv"]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: "));
    assert!(!project.path().join("scripts/g_filelist.sh").exists());
}

#[test]
fn test_filelist_missing_file_column_fails() {
    let project = TempDir::new().unwrap();
    write_project_filelist(project.path(), "files.csv", "Cell\tfilename\nHeLa\ta.fq\n");

    let project_dir = project.path().to_str().unwrap();
    let output = run_seqprep(&["--project-dir", project_dir, "filelist", "files.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("file"));
}

#[test]
fn test_filelist_invalid_format_fails() {
    let project = TempDir::new().unwrap();
    write_project_filelist(project.path(), "files.csv", "file\na.fq\n");

    let project_dir = project.path().to_str().unwrap();
    let output = run_seqprep(&["--project-dir", project_dir, "filelist", "files.csv", "xlsx"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid output format"));
}

#[test]
fn test_filelist_excel_unsupported() {
    let project = TempDir::new().unwrap();
    write_project_filelist(project.path(), "files.xlsx", "");

    let project_dir = project.path().to_str().unwrap();
    let output = run_seqprep(&["--project-dir", project_dir, "filelist", "files.xlsx"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("not supported"));
}

// =============================================================================
// fasta
// =============================================================================

#[test]
fn test_fasta_rewrap_file_to_file() {
    let input = create_file(">seq1 desc\nACGTAC\nGT\n>seq2\nTTTT\n");
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("out.fa");

    let output = run_seqprep(&[
        "fasta",
        "-i",
        input.path().to_str().unwrap(),
        "-o",
        out_path.to_str().unwrap(),
        "--width",
        "3",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let written = fs::read_to_string(&out_path).unwrap();
    assert_eq!(written, ">seq1 desc\nACG\nTAC\nGT\n>seq2\nTTT\nT\n");
}

#[test]
fn test_fasta_stdin_warns_on_leading_garbage() {
    let output = run_seqprep_stdin(&["fasta"], "junk\n>s\nAC\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), ">s\nAC\n");
    assert!(stderr(&output).contains("not a header"));
}

#[test]
fn test_fasta_zero_width_fails() {
    let input = create_file(">s\nAC\n");
    let output = run_seqprep(&["fasta", "-i", input.path().to_str().unwrap(), "-w", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: "));
}

#[test]
fn test_fasta_missing_input_fails() {
    let output = run_seqprep(&["fasta", "-i", "/nonexistent/in.fa"]);
    assert_eq!(output.status.code(), Some(1));
}

// =============================================================================
// gff
// =============================================================================

#[test]
fn test_gff_normalization() {
    let content = "##gff-version 3\n\
        chr1\t.\tgene\t1\t100\t.\t+\t.\tID=g1\n\
        chr1\t.\tmRNA\t1\t100\t.\t+\t.\tID=t1;Parent=g1\n\
        chr1\t.\texon\t1\t50\t.\t+\t.\tParent=t1\n\
        chr1\t.\tgene\t200\t300\t.\t-\t.\tID=g2\n\
        chr1\t.\tgene\t400\t500\t.\t+\t.\tID=g3\n\
        chr1\t.\tmRNA\t400\t500\t.\t+\t.\tID=t3;Parent=g3\n";
    let input = create_file(content);

    let output = run_seqprep(&["gff", "-i", input.path().to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let expected = "chr1\t.\tgene\t1\t100\t.\t+\t.\tID=g1\n\
        chr1\t.\tmRNA\t1\t100\t.\t+\t.\tID=t1;Parent=g1\n\
        chr1\t.\texon\t1\t50\t.\t+\t.\tParent=t1\n\
        \n\
        chr1\t.\tgene\t400\t500\t.\t+\t.\tID=g3\n\
        chr1\t.\tmRNA\t400\t500\t.\t+\t.\tID=t3;Parent=g3\n";
    assert_eq!(stdout(&output), expected);
    assert!(stderr(&output).contains("ID=g2"));
}

#[test]
fn test_gff_shared_gene_line_from_stdin() {
    let content = "chr1\t.\tgene\t1\t100\t.\t+\t.\tID=g1\n\
        chr1\t.\tmRNA\t1\t100\t.\t+\t.\tID=t1\n\
        chr1\t.\tmRNA\t1\t90\t.\t+\t.\tID=t2\n";
    let output = run_seqprep_stdin(&["gff", "-i", "-"], content);
    assert!(output.status.success());

    let out = stdout(&output);
    assert_eq!(out.lines().filter(|l| l.contains("\tgene\t")).count(), 1);
    assert_eq!(out.lines().count(), 3);
}

// =============================================================================
// fqcsumm
// =============================================================================

#[test]
fn test_fqcsumm_paired() {
    let dir = TempDir::new().unwrap();
    for (name, statuses) in [("S_R1", ["PASS", "WARN"]), ("S_R2", ["FAIL", "PASS"])] {
        let report = dir.path().join(format!("{}_val_{}.fq_fastqc", name, &name[3..]));
        fs::create_dir_all(&report).unwrap();
        let summary = format!(
            "{}\tBasic Statistics\tx.fq\n{}\tPer base sequence quality\tx.fq\n",
            statuses[0], statuses[1]
        );
        fs::write(report.join("summary.txt"), summary).unwrap();
    }

    let output = run_seqprep(&[
        "fqcsumm",
        "--basenames",
        "S_R1 S_R2",
        "--fastqc-dir",
        dir.path().to_str().unwrap(),
        "--paired",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 14);
    assert_eq!(lines[0], "       Basic Statistics");
    assert_eq!(lines[12], "S_R1   + ?");
    assert_eq!(lines[13], "S_R2   - +");
}

#[test]
fn test_fqcsumm_requires_basenames() {
    let dir = TempDir::new().unwrap();
    let output = run_seqprep(&["fqcsumm", "--fastqc-dir", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("BASE_FILENAMES"));
}

#[test]
fn test_fqcsumm_flag_overrides_env_layout() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("S_trimmed.fq_fastqc");
    fs::create_dir_all(&report).unwrap();
    fs::write(report.join("summary.txt"), "WARN\tBasic Statistics\tx.fq\n").unwrap();
    let fastqc_dir = dir.path().to_str().unwrap();
    let vars = [("BASE_FILENAMES", "S"), ("IS_PAIRED_END", "T")];

    // The environment alone selects the paired-end layout, which is absent.
    let output = run_seqprep_env(&["fqcsumm", "--fastqc-dir", fastqc_dir], &vars);
    assert_eq!(output.status.code(), Some(1));

    let output = run_seqprep_env(&["fqcsumm", "--fastqc-dir", fastqc_dir, "--paired=false"], &vars);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).lines().last(), Some("S   ?"));
}
