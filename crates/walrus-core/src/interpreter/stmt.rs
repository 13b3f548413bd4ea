//! Statement execution.

use std::rc::Rc;

use super::{scope_error, Flow, Interpreter, RResult};
use crate::ast::*;
use crate::environment::ScopeId;
use crate::error::RuntimeError;
use crate::value::{FunctionValue, Value};

impl Interpreter {
    /// Execute statements in order. The value is that of the last one.
    pub(super) fn exec_statements(&mut self, statements: &[Stmt], scope: ScopeId) -> RResult<Flow> {
        let mut last = Value::Null;
        for stmt in statements {
            match self.exec_stmt(stmt, scope)? {
                Flow::Normal(value) => last = value,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: ScopeId) -> RResult<Flow> {
        tracing::trace!(line = stmt.span().start.line, "execute statement");
        match stmt {
            Stmt::Expression { expression, .. } => Ok(Flow::Normal(self.eval_expr(expression, scope)?)),
            Stmt::Block(block) => self.exec_block(block, scope),
            Stmt::VariableDecl(decl) => self.exec_variable_decl(decl, scope),
            Stmt::FunctionDecl(decl) => self.exec_function_decl(decl, scope),
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Void,
                };
                Ok(Flow::Return(value))
            }
            Stmt::If(stmt) => self.exec_if(stmt, scope),
            Stmt::StructDecl(decl) => {
                self.env
                    .declare_struct(scope, Rc::new(decl.clone()))
                    .map_err(|e| scope_error(e, &decl.name.name, decl.name.span))?;
                Ok(Flow::Normal(Value::Null))
            }
            Stmt::While { condition, body, .. } => self.exec_while(condition, body, scope),
            Stmt::For(stmt) => self.exec_for(stmt, scope),
            Stmt::Foreach(stmt) => self.exec_foreach(stmt, scope),
            Stmt::Import(import) => {
                tracing::debug!(path = %import.path.value, "imports are not resolved; skipping");
                Ok(Flow::Normal(Value::Null))
            }
        }
    }

    pub(super) fn exec_block(&mut self, block: &Block, scope: ScopeId) -> RResult<Flow> {
        self.with_scope(scope, block.span, |this, inner| {
            this.exec_statements(&block.statements, inner)
        })
    }

    fn exec_variable_decl(&mut self, decl: &VariableDecl, scope: ScopeId) -> RResult<Flow> {
        let value = match (&decl.value, &decl.ty) {
            (Some(expr), Some(ty)) => self
                .eval_expr(expr, scope)?
                .conform_to(ty)
                .map_err(|message| RuntimeError::type_mismatch(message, expr.span()))?,
            (Some(expr), None) => self.eval_expr(expr, scope)?,
            (None, Some(ty)) => Value::default_for(ty),
            (None, None) => Value::Null,
        };

        self.env
            .declare(scope, &decl.name.name, value.clone(), decl.constant)
            .map_err(|e| scope_error(e, &decl.name.name, decl.name.span))?;
        Ok(Flow::Normal(value))
    }

    fn exec_function_decl(&mut self, decl: &FunctionDecl, scope: ScopeId) -> RResult<Flow> {
        let function = Value::Function(Rc::new(FunctionValue {
            decl: Rc::new(decl.clone()),
            closure: scope,
        }));
        self.env
            .declare(scope, &decl.name.name, function.clone(), true)
            .map_err(|e| scope_error(e, &decl.name.name, decl.name.span))?;
        Ok(Flow::Normal(function))
    }

    fn exec_if(&mut self, stmt: &IfStmt, scope: ScopeId) -> RResult<Flow> {
        if self.eval_expr(&stmt.condition, scope)?.is_truthy() {
            return self.exec_block(&stmt.consequent, scope);
        }

        match &stmt.alternate {
            Alternate::None => Ok(Flow::Normal(Value::Null)),
            Alternate::ElseIf(next) => self.exec_if(next, scope),
            Alternate::Else(block) => self.exec_block(block, scope),
        }
    }

    fn exec_while(&mut self, condition: &Expr, body: &Block, scope: ScopeId) -> RResult<Flow> {
        while self.eval_expr(condition, scope)?.is_truthy() {
            if let flow @ Flow::Return(_) = self.exec_block(body, scope)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal(Value::Null))
    }

    /// The loop variable lives in a scope around the whole loop; the body
    /// gets a fresh scope each iteration.
    fn exec_for(&mut self, stmt: &ForStmt, scope: ScopeId) -> RResult<Flow> {
        self.with_scope(scope, stmt.span, |this, outer| {
            let init = this.eval_expr(&stmt.init, outer)?;
            this.env
                .declare(outer, &stmt.variable.name, init, false)
                .map_err(|e| scope_error(e, &stmt.variable.name, stmt.variable.span))?;

            while this.eval_expr(&stmt.condition, outer)?.is_truthy() {
                if let flow @ Flow::Return(_) = this.exec_block(&stmt.body, outer)? {
                    return Ok(flow);
                }
                this.eval_expr(&stmt.post, outer)?;
            }
            Ok(Flow::Normal(Value::Null))
        })
    }

    fn exec_foreach(&mut self, stmt: &ForeachStmt, scope: ScopeId) -> RResult<Flow> {
        let items = match self.eval_expr(&stmt.iterable, scope)? {
            Value::Array(items) => items,
            Value::String(s) => s.chars().map(Value::Character).collect(),
            other => {
                return Err(RuntimeError::type_mismatch(
                    format!("cannot iterate over `{}`", other.type_name()),
                    stmt.iterable.span(),
                ))
            }
        };

        for (i, item) in items.into_iter().enumerate() {
            let flow = self.with_scope(scope, stmt.body.span, |this, inner| {
                this.env
                    .declare(inner, &stmt.value.name, item, false)
                    .map_err(|e| scope_error(e, &stmt.value.name, stmt.value.span))?;
                if let Some(index) = &stmt.index {
                    this.env
                        .declare(inner, &index.name, Value::int(i as i128), false)
                        .map_err(|e| scope_error(e, &index.name, index.span))?;
                }
                this.exec_statements(&stmt.body.statements, inner)
            })?;

            if let Flow::Return(_) = flow {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal(Value::Null))
    }
}
