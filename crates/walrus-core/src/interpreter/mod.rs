//! Tree-walking interpreter for the walrus language.

mod expr;
mod ops;
mod stmt;


use std::io::Write;

use crate::ast::Program;
use crate::config::{Config, MAX_CALL_DEPTH_LIMIT};
use crate::diagnostics::Diagnostics;
use crate::environment::{Environment, ScopeError, ScopeId};
use crate::error::{Error, RuntimeError};
use crate::lexer;
use crate::parser::Parser;
use crate::span::Span;
use crate::stdlib::{Builtin, BuiltinRegistry};
use crate::value::Value;

pub(crate) type RResult<T> = Result<T, RuntimeError>;

/// How a statement finished.
#[derive(Debug)]
pub(crate) enum Flow {
    Normal(Value),
    /// A `ret` statement is unwinding to the enclosing call
    Return(Value),
}

/// The walrus interpreter.
pub struct Interpreter {
    env: Environment,
    builtins: BuiltinRegistry,
    output: Box<dyn Write>,
    max_call_depth: usize,
    call_depth: usize,
}

impl Interpreter {
    /// Create an interpreter with the default configuration, printing to stdout.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let mut builtins = BuiltinRegistry::with_defaults();
        for name in &config.builtins.disabled {
            if builtins.remove(name).is_none() {
                tracing::warn!(builtin = %name, "cannot disable unknown built-in");
            }
        }

        Self {
            env: Environment::new(),
            builtins,
            output: Box::new(std::io::stdout()),
            max_call_depth: config.interpreter.max_call_depth.clamp(1, MAX_CALL_DEPTH_LIMIT),
            call_depth: 0,
        }
    }

    /// Redirect program output.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    /// Register an additional built-in. Replaces one with the same name.
    pub fn register_builtin(&mut self, builtin: Box<dyn Builtin>) {
        self.builtins.register(builtin);
    }

    /// Lex and parse a walrus file.
    pub fn validate(&mut self, source: &str, file_path: &str) -> (Option<Program>, Diagnostics) {
        let tokenized = match lexer::tokenize(source) {
            Ok(tokenized) => tokenized,
            Err(e) => {
                let lines = source_lines(source);
                return (None, Error::from(e).to_diagnostic(file_path, &lines).into());
            }
        };

        match Parser::new(tokenized.tokens, file_path).parse() {
            Ok(output) => {
                let mut diagnostics = Diagnostics::new();
                for mut warning in output.warnings {
                    if warning.context.is_none() {
                        warning.context = warning
                            .span
                            .start
                            .line
                            .checked_sub(1)
                            .and_then(|i| tokenized.lines.get(i))
                            .cloned();
                    }
                    diagnostics.push(warning);
                }
                (Some(output.program), diagnostics)
            }
            Err(e) => {
                let diagnostic = Error::from(e).to_diagnostic(file_path, &tokenized.lines);
                (None, diagnostic.into())
            }
        }
    }

    /// Execute a parsed program in the root scope.
    ///
    /// The result is the value of the last top-level statement, or the value
    /// of a top-level `ret`.
    pub fn run(&mut self, program: &Program) -> RResult<Value> {
        for import in &program.imports {
            tracing::debug!(path = %import.path.value, "imports are not resolved; skipping");
        }
        tracing::debug!(
            module = %program.module_name,
            statements = program.contents.len(),
            "running program"
        );

        let root = self.env.root();
        let result = self.exec_statements(&program.contents, root);

        if let Err(e) = self.output.flush() {
            tracing::warn!(error = %e, "failed to flush program output");
        }

        match result? {
            Flow::Normal(value) | Flow::Return(value) => Ok(value),
        }
    }

    /// Validate and run `source`, collecting every problem as a diagnostic.
    pub fn run_source(&mut self, source: &str, file_path: &str) -> (Option<Value>, Diagnostics) {
        let (program, mut diagnostics) = self.validate(source, file_path);
        let Some(program) = program else {
            return (None, diagnostics);
        };

        match self.run(&program) {
            Ok(value) => (Some(value), diagnostics),
            Err(e) => {
                let lines = source_lines(source);
                diagnostics.push(Error::from(e).to_diagnostic(file_path, &lines));
                (None, diagnostics)
            }
        }
    }

    /// Lex, parse and run `source`, stopping at the first error.
    pub fn evaluate_source(&mut self, source: &str) -> Result<Value, Error> {
        let tokenized = lexer::tokenize(source)?;
        let output = Parser::new(tokenized.tokens, "<input>").parse()?;
        Ok(self.run(&output.program)?)
    }

    /// Run `body` in a fresh child scope of `parent`, popping it afterwards
    /// whether or not `body` succeeded.
    fn with_scope<T>(
        &mut self,
        parent: ScopeId,
        span: Span,
        body: impl FnOnce(&mut Self, ScopeId) -> RResult<T>,
    ) -> RResult<T> {
        let scope = self.env.push_scope(parent);
        let result = body(self, scope);
        let popped = self.env.pop_scope(scope);
        let value = result?;
        popped.map_err(|e| scope_error(e, "<block>", span))?;
        Ok(value)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn source_lines(source: &str) -> Vec<String> {
    source.lines().map(str::to_string).collect()
}

/// Attach a name and position to an environment error.
pub(crate) fn scope_error(err: ScopeError, name: &str, span: Span) -> RuntimeError {
    match err {
        ScopeError::NotDeclared(name) => RuntimeError::Undeclared { name, span },
        ScopeError::AlreadyDeclared(name) => RuntimeError::AlreadyDeclared { name, span },
        ScopeError::Constant(name) => RuntimeError::ConstantReassignment { name, span },
        ScopeError::Stale | ScopeError::OutOfOrder => RuntimeError::StaleScope {
            name: name.to_string(),
            span,
        },
    }
}
