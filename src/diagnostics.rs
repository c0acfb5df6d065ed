//! Leveled diagnostics returned by core operations.
//!
//! Codecs and validators never print. They append [`Diagnostic`] entries
//! to a [`Diagnostics`] list that is handed back with their result; the
//! caller decides what to show, usually by forwarding everything to the
//! `log` facade with [`Diagnostics::emit`].

use log::Level;
use std::fmt;

/// A single human-readable message produced while processing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    /// 1-based input line the message refers to, if any.
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Ordered list of diagnostics with a running warning count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    warnings: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning. Warnings are counted.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, None, message.into());
    }

    /// Record a warning tied to a 1-based input line.
    pub fn warn_at(&mut self, line: usize, message: impl Into<String>) {
        self.push(Level::Warn, Some(line), message.into());
    }

    /// Record an informational note (not counted as a warning).
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, None, message.into());
    }

    /// Record a detail line, shown only at high verbosity.
    pub fn detail(&mut self, message: impl Into<String>) {
        self.push(Level::Debug, None, message.into());
    }

    fn push(&mut self, level: Level, line: Option<usize>, message: String) {
        if level == Level::Warn {
            self.warnings += 1;
        }
        self.entries.push(Diagnostic {
            level,
            line,
            message,
        });
    }

    /// Append all entries of `other`, keeping order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings += other.warnings;
        self.entries.extend(other.entries);
    }

    /// Number of warnings recorded.
    #[inline]
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Iterate over warning entries only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.level == Level::Warn)
    }

    /// Forward every entry to the `log` facade, tagged with `target`.
    pub fn emit(&self, target: &str) {
        for d in &self.entries {
            log::log!(target: target, d.level, "{}", d);
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Records recovered by a decoder, with the warnings raised on the way.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    pub diagnostics: Diagnostics,
}

// Manual impl: a derive would require `T: Default`.
impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }
}

impl<T> Decoded<T> {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.warning_count()
    }
}

/// Lines produced by an encoder, with bookkeeping for reporting.
#[derive(Debug, Clone, Default)]
pub struct Encoded {
    pub lines: Vec<String>,
    /// Number of input units (records or gene groups).
    pub units_in: usize,
    /// Number of output blocks (records, or distinct gene blocks for GFF).
    pub units_out: usize,
    pub diagnostics: Diagnostics,
}

impl Encoded {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.warning_count()
    }
}
