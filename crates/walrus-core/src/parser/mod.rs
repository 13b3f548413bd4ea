//! Parser for the walrus language.
//!
//! Expressions are parsed with a Pratt parser driven by the tables in
//! [`lookups`]; statements dispatch on their leading token; type
//! annotations use their own table.

mod expr;
mod lookups;
mod stmt;
mod types;

#[cfg(test)]
mod tests;

use std::path::Path;

use crate::ast::{Expr, Identifier, Program, Stmt, Type};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ParseError;
use crate::span::Span;
use crate::token::{Token, TokenKind};

pub use lookups::BindingPower;
use lookups::{Lookups, TypeLookups};

pub type PResult<T> = Result<T, ParseError>;

/// A parsed program together with the warnings produced on the way.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub program: Program,
    pub warnings: Diagnostics,
}

/// Parser for the walrus language.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    lookups: Lookups,
    type_lookups: TypeLookups,
    warnings: Diagnostics,
    file_path: String,
    block_depth: usize,
}

impl Parser {
    /// `tokens` must end with [`TokenKind::Eof`], as the lexer guarantees.
    pub fn new(tokens: Vec<Token>, file_path: impl Into<String>) -> Self {
        Self {
            tokens,
            pos: 0,
            lookups: Lookups::new(),
            type_lookups: TypeLookups::new(),
            warnings: Diagnostics::new(),
            file_path: file_path.into(),
            block_depth: 0,
        }
    }

    /// Parse the entire program.
    pub fn parse(mut self) -> PResult<ParseOutput> {
        let start_span = self.current_span();
        let mut imports = Vec::new();
        let mut contents = Vec::new();
        let mut declared_module: Option<Identifier> = None;

        while !self.is_at_end() {
            if self.at_module_declaration() {
                let name = self.parse_module_declaration()?;
                if let Some(previous) = &declared_module {
                    return Err(ParseError::new(
                        "E117",
                        format!("module name is already declared as `{}`", previous.name),
                        name.span,
                    ));
                }
                declared_module = Some(name);
                continue;
            }

            match self.parse_statement()? {
                Stmt::Import(import) => imports.push(import),
                stmt => contents.push(stmt),
            }
        }

        let end_span = self.previous_span();
        let module_name = match declared_module {
            Some(name) => name.name,
            None => Path::new(&self.file_path)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        tracing::debug!(
            module = %module_name,
            statements = contents.len(),
            imports = imports.len(),
            "parsed program"
        );

        Ok(ParseOutput {
            program: Program {
                module_name,
                imports,
                contents,
                span: start_span.merge(&end_span),
            },
            warnings: self.warnings,
        })
    }

    /// `module <name>;` at the top level. `module` stays usable as a name
    /// everywhere else.
    fn at_module_declaration(&self) -> bool {
        self.check(TokenKind::Identifier)
            && self.current().text == "module"
            && self.peek_kind(1) == TokenKind::Identifier
            && self.peek_kind(2) == TokenKind::Semicolon
    }

    fn parse_module_declaration(&mut self) -> PResult<Identifier> {
        self.advance();
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(name)
    }

    /// Parse one statement using the statement table, falling back to an
    /// expression statement.
    pub(crate) fn parse_statement(&mut self) -> PResult<Stmt> {
        if let Some(handler) = self.lookups.stmt_handler(self.current_kind()) {
            return handler(self);
        }

        let expression = self.parse_expression(BindingPower::Default)?;
        self.expect(TokenKind::Semicolon)?;
        let span = expression.span().merge(&self.previous_span());
        Ok(Stmt::Expression { expression, span })
    }

    /// Parse an expression whose operators bind tighter than `bp`.
    pub(crate) fn parse_expression(&mut self, bp: BindingPower) -> PResult<Expr> {
        let kind = self.current_kind();
        let nud = self.lookups.nud_handler(kind).ok_or_else(|| {
            self.error_at_current("E102", format!("expected an expression, found {}", kind))
        })?;
        let mut left = nud(self)?;

        while self.lookups.binding_power(self.current_kind()) > bp {
            let kind = self.current_kind();
            let led = self.lookups.led_handler(kind).ok_or_else(|| {
                self.error_at_current("E103", format!("{} cannot follow an expression", kind))
            })?;
            let led_bp = self.lookups.binding_power(kind);
            left = led(self, left, led_bp)?;
        }

        Ok(left)
    }

    /// Parse a type annotation.
    pub(crate) fn parse_type(&mut self, bp: BindingPower) -> PResult<Type> {
        let kind = self.current_kind();
        let nud = self.type_lookups.nud_handler(kind).ok_or_else(|| {
            self.error_at_current("E116", format!("expected a type, found {}", kind))
        })?;
        let mut left = nud(self)?;

        while self.type_lookups.binding_power(self.current_kind()) > bp {
            let kind = self.current_kind();
            let led = self.type_lookups.led_handler(kind).ok_or_else(|| {
                self.error_at_current("E116", format!("{} cannot follow a type", kind))
            })?;
            let led_bp = self.type_lookups.binding_power(kind);
            left = led(self, left, led_bp)?;
        }

        Ok(left)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn current(&self) -> &Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    /// Kind of the token `offset` places ahead of the current one.
    fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.current_kind();
            Err(self.error_at_current("E101", format!("expected {}, found {}", kind, found)))
        }
    }

    fn expect_identifier(&mut self) -> PResult<Identifier> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Identifier::new(token.text, token.span))
    }

    fn error_at_current(&self, code: &'static str, message: impl Into<String>) -> ParseError {
        ParseError::new(code, message, self.current_span())
    }

    fn warn(&mut self, code: &str, message: impl Into<String>, span: Span) {
        self.warnings.push(
            Diagnostic::warning(code, message)
                .with_file(&self.file_path)
                .with_span(span)
                .build(),
        );
    }
}
