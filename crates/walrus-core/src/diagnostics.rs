//! Renderer-neutral diagnostic records.
//!
//! Errors from every phase are converted into [`Diagnostic`] values so the
//! command line can print them as text or serialize them as JSON.

use std::fmt;

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity of the diagnostic
    pub severity: DiagnosticSeverity,
    /// Error code (e.g., "E101")
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Source file path
    pub file: String,
    /// Source span
    pub span: Span,
    /// The source line the span starts on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Suggestions for fixing the problem
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(DiagnosticSeverity::Error, code.into(), message.into())
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(DiagnosticSeverity::Warning, code.into(), message.into())
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {}:{}:{}",
            self.severity,
            self.code,
            self.message,
            self.file,
            self.span.start.line,
            self.span.start.column
        )
    }
}

/// Builder for constructing diagnostics.
pub struct DiagnosticBuilder {
    severity: DiagnosticSeverity,
    code: String,
    message: String,
    file: Option<String>,
    span: Option<Span>,
    context: Option<String>,
    hints: Vec<String>,
}

impl DiagnosticBuilder {
    pub fn new(severity: DiagnosticSeverity, code: String, message: String) -> Self {
        Self {
            severity,
            code,
            message,
            file: None,
            span: None,
            context: None,
            hints: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach the source line the span starts on, if it exists.
    pub fn with_context_from(mut self, lines: &[String]) -> Self {
        if let Some(span) = self.span {
            if let Some(line) = span.start.line.checked_sub(1).and_then(|i| lines.get(i)) {
                self.context = Some(line.clone());
            }
        }
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints.extend(hints.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic {
            severity: self.severity,
            code: self.code,
            message: self.message,
            file: self.file.unwrap_or_default(),
            span: self.span.unwrap_or_default(),
            context: self.context,
            hints: self.hints,
        }
    }
}

/// Collection of diagnostics.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

/// JSON output format for diagnostics.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticsOutput {
    pub version: String,
    pub status: String,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub summary: DiagnosticsSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticsSummary {
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl DiagnosticsOutput {
    pub fn from_diagnostics(diagnostics: &Diagnostics) -> Self {
        let errors: Vec<_> = diagnostics.errors().cloned().collect();
        let warnings: Vec<_> = diagnostics.warnings().cloned().collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            status: if errors.is_empty() { "ok" } else { "error" }.to_string(),
            summary: DiagnosticsSummary {
                total_errors: errors.len(),
                total_warnings: warnings.len(),
            },
            errors,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    fn span_on_line(line: usize) -> Span {
        Span::new(Position::new(line, 3, 10), Position::new(line, 4, 11))
    }

    #[test]
    fn test_context_from_lines() {
        let lines = vec!["let a := 1;".to_string(), "a = true;".to_string()];
        let diag = Diagnostic::error("E201", "mismatch")
            .with_span(span_on_line(2))
            .with_context_from(&lines)
            .build();
        assert_eq!(diag.context.as_deref(), Some("a = true;"));
    }

    #[test]
    fn test_context_out_of_range_is_ignored() {
        let diag = Diagnostic::error("E201", "mismatch")
            .with_span(span_on_line(9))
            .with_context_from(&[])
            .build();
        assert!(diag.context.is_none());
    }

    #[test]
    fn test_output_summary() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("W001", "unknown type").build());
        diagnostics.push(Diagnostic::error("E101", "unexpected token").build());

        let output = DiagnosticsOutput::from_diagnostics(&diagnostics);
        assert_eq!(output.status, "error");
        assert_eq!(output.summary.total_errors, 1);
        assert_eq!(output.summary.total_warnings, 1);
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::error("E203", "division by zero is forbidden")
            .with_file("main.wal")
            .with_span(span_on_line(4))
            .build();
        insta::assert_snapshot!(diag.to_string(), @"error[E203]: division by zero is forbidden at main.wal:4:3");
    }
}
