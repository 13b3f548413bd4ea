//! Error types for every phase of the pipeline.

use std::fmt;

use miette::LabeledSpan;
use thiserror::Error;

use crate::diagnostics::Diagnostic;
use crate::span::Span;

/// An error raised while splitting source text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character `{character}` on line {line}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        span: Span,
    },

    #[error("block comment is never closed")]
    UnterminatedComment { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. } | LexError::UnterminatedComment { span } => {
                *span
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LexError::UnexpectedCharacter { .. } => "E001",
            LexError::UnterminatedComment { .. } => "E002",
        }
    }

    fn hints(&self) -> Vec<String> {
        match self {
            LexError::UnexpectedCharacter { .. } => Vec::new(),
            LexError::UnterminatedComment { .. } => vec!["add `*/` to close the comment".into()],
        }
    }
}

/// An error raised while building the syntax tree.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub code: &'static str,
    pub message: String,
    pub span: Span,
    pub hints: Vec<String>,
}

impl ParseError {
    pub fn new(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

/// An error raised while evaluating a program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("`{name}` is not declared")]
    Undeclared { name: String, span: Span },

    #[error("`{name}` is already declared in this scope")]
    AlreadyDeclared { name: String, span: Span },

    #[error("cannot reassign constant `{name}`")]
    ConstantReassignment { name: String, span: Span },

    #[error("{message}")]
    TypeMismatch { message: String, span: Span },

    #[error("division by zero is forbidden")]
    DivisionByZero { span: Span },

    #[error("{message}")]
    InvalidAssignment { message: String, span: Span },

    #[error("`{name}` is not a function")]
    NotCallable { name: String, span: Span },

    #[error("`{name}` expects {expected} argument{}, found {found}", plural(.expected))]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("struct `{name}` is not declared")]
    UnknownStruct { name: String, span: Span },

    #[error("struct `{struct_name}` has no property `{property}`")]
    UnknownProperty {
        struct_name: String,
        property: String,
        span: Span,
    },

    #[error("property `{property}` of `{struct_name}` is readonly")]
    ReadonlyProperty {
        struct_name: String,
        property: String,
        span: Span,
    },

    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: i128, len: usize, span: Span },

    #[error("integer overflow in `{operator}`")]
    Overflow { operator: String, span: Span },

    #[error("function `{name}` must return a value of type `{expected}`")]
    MissingReturn {
        name: String,
        expected: String,
        span: Span,
    },

    #[error("range of {len} elements exceeds the limit of {limit}")]
    RangeTooLarge { len: u128, limit: usize, span: Span },

    #[error("call depth exceeded the limit of {limit}")]
    CallDepthExceeded { limit: usize, span: Span },

    #[error("scope of `{name}` is no longer alive")]
    StaleScope { name: String, span: Span },

    #[error("{name}: {message}")]
    Builtin {
        name: String,
        message: String,
        span: Span,
    },
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 {
        ""
    } else {
        "s"
    }
}

impl RuntimeError {
    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        RuntimeError::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            RuntimeError::Undeclared { span, .. }
            | RuntimeError::AlreadyDeclared { span, .. }
            | RuntimeError::ConstantReassignment { span, .. }
            | RuntimeError::TypeMismatch { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::InvalidAssignment { span, .. }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::UnknownStruct { span, .. }
            | RuntimeError::UnknownProperty { span, .. }
            | RuntimeError::ReadonlyProperty { span, .. }
            | RuntimeError::IndexOutOfBounds { span, .. }
            | RuntimeError::Overflow { span, .. }
            | RuntimeError::MissingReturn { span, .. }
            | RuntimeError::RangeTooLarge { span, .. }
            | RuntimeError::CallDepthExceeded { span, .. }
            | RuntimeError::StaleScope { span, .. }
            | RuntimeError::Builtin { span, .. } => *span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::Undeclared { .. } => "E201",
            RuntimeError::AlreadyDeclared { .. } => "E202",
            RuntimeError::ConstantReassignment { .. } => "E203",
            RuntimeError::TypeMismatch { .. } => "E204",
            RuntimeError::DivisionByZero { .. } => "E205",
            RuntimeError::InvalidAssignment { .. } => "E206",
            RuntimeError::NotCallable { .. } => "E207",
            RuntimeError::ArityMismatch { .. } => "E208",
            RuntimeError::UnknownStruct { .. } => "E209",
            RuntimeError::UnknownProperty { .. } => "E210",
            RuntimeError::ReadonlyProperty { .. } => "E211",
            RuntimeError::IndexOutOfBounds { .. } => "E212",
            RuntimeError::Overflow { .. } => "E213",
            RuntimeError::MissingReturn { .. } => "E214",
            RuntimeError::CallDepthExceeded { .. } => "E215",
            RuntimeError::StaleScope { .. } => "E216",
            RuntimeError::Builtin { .. } => "E217",
            RuntimeError::RangeTooLarge { .. } => "E218",
        }
    }

    fn hints(&self) -> Vec<String> {
        match self {
            RuntimeError::Undeclared { name, .. } => {
                vec![format!("declare it first with `let {} := ...;`", name)]
            }
            RuntimeError::ConstantReassignment { name, .. } => {
                vec![format!("declare `{}` with `let` to make it mutable", name)]
            }
            RuntimeError::MissingReturn { .. } => {
                vec!["add a `ret` statement to every path through the body".into()]
            }
            RuntimeError::ReadonlyProperty { .. } => {
                vec!["readonly properties can only be set in a struct literal".into()]
            }
            RuntimeError::CallDepthExceeded { .. } => {
                vec!["raise `interpreter.max_call_depth` in walrus.toml (at most 1024)".into()]
            }
            RuntimeError::RangeTooLarge { .. } => {
                vec!["iterate with a `for` loop instead of building the range".into()]
            }
            _ => Vec::new(),
        }
    }
}

/// Any error produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::Lex(e) => e.span(),
            Error::Parse(e) => e.span,
            Error::Runtime(e) => e.span(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Lex(e) => e.code(),
            Error::Parse(e) => e.code,
            Error::Runtime(e) => e.code(),
        }
    }

    pub fn hints(&self) -> Vec<String> {
        match self {
            Error::Lex(e) => e.hints(),
            Error::Parse(e) => e.hints.clone(),
            Error::Runtime(e) => e.hints(),
        }
    }

    /// Convert into a diagnostic record, attaching the offending source line.
    pub fn to_diagnostic(&self, file: &str, lines: &[String]) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string())
            .with_file(file)
            .with_span(self.span())
            .with_context_from(lines)
            .with_hints(self.hints())
            .build()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

struct Hints(Vec<String>);

impl fmt::Display for Hints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\n"))
    }
}

impl miette::Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(Error::code(self)))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let hints = self.hints();
        if hints.is_empty() {
            None
        } else {
            Some(Box::new(Hints(hints)))
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span();
        let label = LabeledSpan::at(span.start.offset..span.end.offset, "here");
        Some(Box::new(std::iter::once(label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    fn span() -> Span {
        Span::new(Position::new(2, 5, 14), Position::new(2, 6, 15))
    }

    #[test]
    fn test_runtime_diagnostic() {
        let lines = vec!["const y := 1;".to_string(), "y = 2;".to_string()];
        let err = Error::from(RuntimeError::ConstantReassignment {
            name: "y".into(),
            span: span(),
        });
        let diag = err.to_diagnostic("main.wal", &lines);
        assert_eq!(diag.code, "E203");
        assert_eq!(diag.message, "cannot reassign constant `y`");
        assert_eq!(diag.context.as_deref(), Some("y = 2;"));
        assert_eq!(diag.hints.len(), 1);
    }

    #[test]
    fn test_arity_message() {
        let err = RuntimeError::ArityMismatch {
            name: "add".into(),
            expected: 1,
            found: 3,
            span: span(),
        };
        insta::assert_snapshot!(err.to_string(), @"`add` expects 1 argument, found 3");
    }

    #[test]
    fn test_miette_labels() {
        use miette::Diagnostic as _;

        let err = Error::from(ParseError::new("E101", "unexpected token", span()));
        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 14);
        assert_eq!(labels[0].len(), 1);
        assert!(err.help().is_none());
    }
}
