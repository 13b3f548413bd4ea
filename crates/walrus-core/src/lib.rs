//! Walrus Core Library
//!
//! This crate provides the core functionality for the walrus language,
//! including lexing, parsing and evaluation.

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod numeric;
pub mod parser;
pub mod span;
pub mod stdlib;
pub mod token;
pub mod value;

pub use ast::Program;
pub use config::{Config, ConfigError};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics, DiagnosticsOutput};
pub use error::{Error, LexError, ParseError, Result, RuntimeError};
pub use interpreter::Interpreter;
pub use lexer::{tokenize, Lexer, Tokenized};
pub use parser::{ParseOutput, Parser};
pub use span::{Position, Span};
pub use token::{Token, TokenKind};
pub use value::Value;
