//! seqprep: sample-sheet and annotation text normalization
//!
//! Usage: seqprep [-v...] <COMMAND> [OPTIONS]

use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use seqprep::config::Context;
use seqprep::diagnostics::{Diagnostics, Encoded};
use seqprep::error::{PrepError, Result};
use seqprep::fasta::{FastaCodec, DEFAULT_LINE_WIDTH};
use seqprep::fastqc;
use seqprep::filelist::{FileList, MANDATORY_PARNAMES};
use seqprep::gff::GffGeneCodec;
use seqprep::lines::{read_lines, save_lines, write_lines, LineReader};
use seqprep::table::load_table;
use seqprep::writers::{write_outputs, OutputFormat};

/// Log target for diagnostics forwarded from the library.
const LOG_TARGET: &str = "seqprep";

/// Directory, relative to the project, holding file-list inputs.
const SCRIPTS_DIR: &str = "scripts";

/// Environment fallbacks for `fqcsumm`.
const BASE_FILENAMES_ENV: &str = "BASE_FILENAMES";
const IS_PAIRED_END_ENV: &str = "IS_PAIRED_END";

#[derive(Parser)]
#[command(name = "seqprep")]
#[command(version)]
#[command(about = "seqprep: sample-sheet consolidation and FASTA/GFF3 normalization", long_about = None)]
struct Cli {
    /// Increase verbosity (-v progress, -vv details). Defaults to $VERBOSITY_LEVEL
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Project root. Defaults to $PROJDIR, then the current directory
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a file list and write the shell-variable file and sample descriptions
    Filelist {
        /// File list (.txt aligned or .csv/.tsv tab-delimited), looked up under <project>/scripts/
        input: PathBuf,

        /// Extra outputs: sd (SampleDescription.csv), affy (AffySampleDescription.csv)
        formats: Vec<String>,
    },

    /// Normalize a FASTA file, re-wrapping sequences
    Fasta {
        /// Input FASTA file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sequence line width
        #[arg(short, long, default_value_t = DEFAULT_LINE_WIDTH)]
        width: usize,
    },

    /// Normalize a GFF3 file into gene/mRNA blocks
    Gff {
        /// Input GFF3 file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile FastQC summaries into one PASS/WARN/FAIL matrix
    Fqcsumm {
        /// Space-separated base file names. Defaults to $BASE_FILENAMES
        #[arg(short, long)]
        basenames: Option<String>,

        /// Folder holding the FastQC output directories
        #[arg(short = 'd', long)]
        fastqc_dir: PathBuf,

        /// Summaries come from paired-end trimming (--paired=false forces
        /// single-end). Defaults to $IS_PAIRED_END == T
        #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
        paired: Option<bool>,
    },
}

fn main() {
    let cli = Cli::parse();

    let verbosity = (cli.verbose > 0).then_some(cli.verbose);
    let ctx = Context::from_env(cli.project_dir, verbosity);

    // RUST_LOG takes precedence over the verbosity-derived default
    env_logger::Builder::from_env(Env::default().default_filter_or(ctx.log_filter().to_string()))
        .format_timestamp(None)
        .init();
    debug!("{:?}", ctx);

    let result = match cli.command {
        Commands::Filelist { input, formats } => run_filelist(&ctx, &input, &formats),

        Commands::Fasta {
            input,
            output,
            width,
        } => run_fasta(&ctx, input, output, width),

        Commands::Gff { input, output } => run_gff(&ctx, input, output),

        Commands::Fqcsumm {
            basenames,
            fastqc_dir,
            paired,
        } => run_fqcsumm(&ctx, basenames, fastqc_dir, paired),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// File lists live under `<project>/scripts/` unless given as an
/// absolute or `./` path.
fn filelist_path(ctx: &Context, input: &Path) -> PathBuf {
    if input.is_absolute() || input.starts_with(".") {
        ctx.resolve_path(input)
    } else {
        ctx.resolve_path(Path::new(SCRIPTS_DIR).join(input))
    }
}

fn read_input(ctx: &Context, input: Option<PathBuf>, strip_ws: bool) -> Result<Vec<String>> {
    match input {
        Some(path) if path.to_string_lossy() != "-" => read_lines(ctx.resolve_path(&path), strip_ws),
        _ => {
            let stdin = io::stdin();
            LineReader::new(stdin.lock())
                .strip_whitespace(strip_ws)
                .read_all()
        }
    }
}

fn write_output(ctx: &Context, output: Option<PathBuf>, encoded: &Encoded) -> Result<()> {
    match output {
        Some(path) => save_lines(ctx.resolve_path(&path), &encoded.lines),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_lines(&mut handle, &encoded.lines)?;
            Ok(())
        }
    }
}

fn report(diagnostics: &Diagnostics, what: &str) {
    diagnostics.emit(LOG_TARGET);
    if diagnostics.has_warnings() {
        info!("{}: {} warnings", what, diagnostics.warning_count());
    }
}

fn run_filelist(ctx: &Context, input: &Path, formats: &[String]) -> Result<()> {
    info!("=== Parsing description of input files");
    let formats = formats
        .iter()
        .map(|f| f.parse::<OutputFormat>())
        .collect::<Result<Vec<_>>>()?;

    let path = filelist_path(ctx, input);
    info!("Execution parameters:");
    info!("    Input file:        {}", path.display());
    info!(
        "    Output formats:    {}",
        formats.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
    );

    let mut diags = Diagnostics::new();
    let loaded = load_table(&path, Some(&MANDATORY_PARNAMES[..]), &mut diags);
    report(&diags, "file list");
    let table = loaded?;

    let list = FileList::consolidate(table, &path.display().to_string())?;
    report(&list.diagnostics, "file list");

    let date = Local::now().format("%Y-%m-%d %H:%M").to_string();
    for written in write_outputs(ctx, &list, &formats, &date)? {
        info!("Written {}", written.display());
    }
    Ok(())
}

fn run_fasta(
    ctx: &Context,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    width: usize,
) -> Result<()> {
    let codec = FastaCodec::with_line_width(width)?;
    let lines = read_input(ctx, input, true)?;

    let decoded = codec.decode(&lines);
    report(&decoded.diagnostics, "FASTA input");

    let encoded = codec.encode(&decoded.items);
    report(&encoded.diagnostics, "FASTA output");
    write_output(ctx, output, &encoded)
}

fn run_gff(ctx: &Context, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let codec = GffGeneCodec::new();
    let lines = read_input(ctx, input, false)?;

    let decoded = codec.decode(&lines);
    report(&decoded.diagnostics, "GFF input");

    let encoded = codec.encode(&decoded.items);
    report(&encoded.diagnostics, "GFF output");
    info!(
        "{} gene groups written as {} gene blocks",
        encoded.units_in, encoded.units_out
    );
    write_output(ctx, output, &encoded)
}

fn run_fqcsumm(
    ctx: &Context,
    basenames: Option<String>,
    fastqc_dir: PathBuf,
    paired: Option<bool>,
) -> Result<()> {
    let basenames = basenames
        .or_else(|| env::var(BASE_FILENAMES_ENV).ok())
        .unwrap_or_default();
    let basenames: Vec<&str> = basenames.split_whitespace().collect();
    if basenames.is_empty() {
        return Err(PrepError::InvalidArgument(format!(
            "no base file names given (use --basenames or ${})",
            BASE_FILENAMES_ENV
        )));
    }
    let paired = paired.unwrap_or_else(|| env::var(IS_PAIRED_END_ENV).is_ok_and(|v| v == "T"));

    let fastqc_dir = ctx.resolve_path(&fastqc_dir);
    info!(
        "Summarizing {} FastQC reports in {}",
        basenames.len(),
        fastqc_dir.display()
    );
    let lines = fastqc::summarize(&fastqc_dir, &basenames, paired)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_lines(&mut handle, &lines)?;
    Ok(())
}
