//! seqprep: sample-sheet and annotation text normalization
//!
//! This library validates the text inputs of a sequencing pipeline and
//! re-emits them in normalized form.
//!
//! # Features
//!
//! - **FASTA / GFF3**: line-oriented codecs that recover from malformed
//!   input and report what they skipped
//! - **File lists**: validation and consolidation of sample sheets into
//!   base file names, sample names and shell variables
//! - **No hidden state**: every operation takes an explicit [`Context`]
//!   and returns its [`Diagnostics`] instead of printing
//!
//! # Example
//!
//! ```rust,no_run
//! use seqprep::{fasta, lines};
//!
//! let input = lines::read_lines("genome.fa", true).unwrap();
//! let decoded = fasta::parse_fasta(&input);
//! let encoded = fasta::unparse_fasta(&decoded.items);
//! lines::save_lines("genome.norm.fa", &encoded.lines).unwrap();
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fasta;
pub mod fastqc;
pub mod filelist;
pub mod gff;
pub mod lines;
pub mod table;
pub mod writers;

// Re-export commonly used types
pub use config::Context;
pub use diagnostics::{Decoded, Diagnostic, Diagnostics, Encoded};
pub use error::{PrepError, Result};
pub use fasta::{FastaCodec, FastaRecord};
pub use filelist::{FileList, ReadLayout};
pub use gff::{GeneGroup, GffGeneCodec, GffRecord};
pub use table::{Row, Table};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Context;
    pub use crate::diagnostics::{Decoded, Diagnostics, Encoded};
    pub use crate::error::{PrepError, Result};
    pub use crate::fasta::{parse_fasta, unparse_fasta, FastaCodec, FastaRecord};
    pub use crate::filelist::{FileList, ReadLayout};
    pub use crate::gff::{parse_gff_genes, unparse_gff_genes, GeneGroup, GffGeneCodec, GffRecord};
    pub use crate::lines::{read_lines, save_lines, LineReader};
    pub use crate::table::{load_table, Row, Table};
    pub use crate::writers::{write_outputs, OutputFormat};
}
