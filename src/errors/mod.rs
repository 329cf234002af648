use std::fmt;

use thiserror::Error;

/// One source-level problem, reported against a 1-based line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}: {}", self.line, self.message)
    }
}

/// Collects diagnostics in the order they were discovered.
///
/// The `Display` impl renders the full report: one line per diagnostic,
/// followed by the total count. An empty collector renders nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(line, message);
        log::trace!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return Ok(());
        }
        for diagnostic in &self.entries {
            writeln!(f, "{}", diagnostic)?;
        }
        let count = self.entries.len();
        if count == 1 {
            writeln!(f, "1 error")
        } else {
            writeln!(f, "{} errors", count)
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

/// Failure to add a symbol to a scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("symbol '{0}' was already defined")]
    AlreadyDefined(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_uses_singular_for_one_error() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.error(1, "unknown identifier 'x'");
        assert_eq!(
            diagnostics.report(),
            "error: 1: unknown identifier 'x'\n1 error\n"
        );
    }

    #[test]
    fn report_counts_in_plural() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.error(2, "a");
        diagnostics.error(3, "b");
        assert_eq!(diagnostics.report(), "error: 2: a\nerror: 3: b\n2 errors\n");
    }

    #[test]
    fn clean_run_has_no_report() {
        assert_eq!(Diagnostics::new().report(), "");
    }
}
