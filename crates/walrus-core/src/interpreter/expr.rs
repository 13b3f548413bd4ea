//! Expression evaluation.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::{ops, scope_error, Flow, Interpreter, RResult};
use crate::ast::*;
use crate::environment::{ScopeError, ScopeId};
use crate::error::RuntimeError;
use crate::span::{Span, Spanned};
use crate::value::{FunctionValue, StructInstance, Value};

impl Interpreter {
    pub(super) fn eval_expr(&mut self, expr: &Expr, scope: ScopeId) -> RResult<Value> {
        match expr {
            Expr::Identifier(id) => self.lookup(id, scope),
            Expr::Number(literal) => Ok(match literal.value {
                Number::Integer(value) => Value::Integer {
                    value,
                    bits: literal.bits,
                    signed: true,
                },
                Number::Float(value) => Value::Float {
                    value,
                    bits: literal.bits,
                },
            }),
            Expr::String(s) => Ok(Value::String(s.value.clone())),
            Expr::Character(c) => Ok(Value::Character(c.value)),
            Expr::Boolean(b) => Ok(Value::Boolean(b.value)),
            Expr::Null(_) => Ok(Value::Null),
            Expr::Unary {
                operator, operand, ..
            } => self.eval_unary(operator, operand, scope),
            Expr::Binary {
                operator,
                left,
                right,
                ..
            } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                ops::binary(operator.value, left, right, operator.span)
            }
            Expr::Assignment {
                target,
                operator,
                value,
                ..
            } => self.eval_assignment(target, operator, value, scope),
            Expr::Call {
                callee,
                arguments,
                span,
            } => self.eval_call(callee, arguments, *span, scope),
            Expr::StructLiteral { name, fields, .. } => self.eval_struct_literal(name, fields, scope),
            Expr::PropertyAccess {
                object, property, ..
            } => {
                let object = self.eval_expr(object, scope)?;
                read_property(&object, property)
            }
            Expr::Array { elements, .. } => elements
                .iter()
                .map(|element| self.eval_expr(element, scope))
                .collect::<RResult<Vec<_>>>()
                .map(Value::Array),
            Expr::Index { array, index, .. } => self.eval_index(array, index, scope),
        }
    }

    /// Read a variable. Unbound names fall back to the built-in registry.
    fn lookup(&self, id: &Identifier, scope: ScopeId) -> RResult<Value> {
        match self.env.get(scope, &id.name) {
            Ok(value) => Ok(value.clone()),
            Err(ScopeError::NotDeclared(_)) if self.builtins.has(&id.name) => {
                Ok(Value::Native(id.name.clone()))
            }
            Err(e) => Err(scope_error(e, &id.name, id.span)),
        }
    }

    fn eval_unary(
        &mut self,
        operator: &Spanned<UnaryOp>,
        operand: &Expr,
        scope: ScopeId,
    ) -> RResult<Value> {
        let value = self.eval_expr(operand, scope)?;
        let result = ops::unary(operator.value, value, operator.span)?;

        match (operator.value, operand) {
            (UnaryOp::Increment | UnaryOp::Decrement, Expr::Identifier(id)) => {
                self.assign_variable(id, result, operator.span, scope)
            }
            _ => Ok(result),
        }
    }

    fn eval_assignment(
        &mut self,
        target: &Expr,
        operator: &Spanned<AssignOp>,
        value: &Expr,
        scope: ScopeId,
    ) -> RResult<Value> {
        let rhs = self.eval_expr(value, scope)?;

        match target {
            Expr::Identifier(id) => {
                let new = match operator.value.binary() {
                    Some(op) => {
                        let old = self
                            .env
                            .get(scope, &id.name)
                            .map_err(|e| scope_error(e, &id.name, value.span()))?
                            .clone();
                        ops::binary(op, old, rhs, operator.span)?
                    }
                    None => rhs,
                };
                self.assign_variable(id, new, value.span(), scope)
            }
            Expr::PropertyAccess { .. } => {
                let mut path = Vec::new();
                let root = property_path(target, &mut path).ok_or_else(|| {
                    RuntimeError::InvalidAssignment {
                        message: "only properties of variables can be assigned".into(),
                        span: target.span(),
                    }
                })?;

                let mut object = self
                    .env
                    .get(scope, &root.name)
                    .map_err(|e| scope_error(e, &root.name, value.span()))?
                    .clone();
                let result = set_property(&mut object, &path, operator, rhs, value.span())?;
                self.env
                    .assign(scope, &root.name, object)
                    .map_err(|e| scope_error(e, &root.name, root.span))?;
                Ok(result)
            }
            other => Err(RuntimeError::InvalidAssignment {
                message: format!("cannot assign to `{}`", other),
                span: other.span(),
            }),
        }
    }

    /// Store `value` in an existing variable, keeping its type tag.
    ///
    /// `span` is reported when the variable does not exist.
    fn assign_variable(
        &mut self,
        id: &Identifier,
        value: Value,
        span: Span,
        scope: ScopeId,
    ) -> RResult<Value> {
        let old = self
            .env
            .get(scope, &id.name)
            .map_err(|e| scope_error(e, &id.name, span))?;
        if self
            .env
            .is_constant(scope, &id.name)
            .map_err(|e| scope_error(e, &id.name, span))?
        {
            return Err(RuntimeError::ConstantReassignment {
                name: id.name.clone(),
                span: id.span,
            });
        }

        let new = old
            .retag_assignment(value)
            .map_err(|message| RuntimeError::type_mismatch(message, span))?;
        self.env
            .assign(scope, &id.name, new.clone())
            .map_err(|e| scope_error(e, &id.name, id.span))?;
        Ok(new)
    }

    fn eval_call(
        &mut self,
        callee: &Identifier,
        arguments: &[Expr],
        span: Span,
        scope: ScopeId,
    ) -> RResult<Value> {
        let target = self.lookup(callee, scope)?;
        let args = arguments
            .iter()
            .map(|arg| self.eval_expr(arg, scope))
            .collect::<RResult<Vec<_>>>()?;

        match target {
            Value::Function(function) => self.call_function(&function, args, span),
            Value::Native(name) => self.call_builtin(&name, args, span),
            _ => Err(RuntimeError::NotCallable {
                name: callee.name.clone(),
                span: callee.span,
            }),
        }
    }

    fn call_function(&mut self, function: &FunctionValue, args: Vec<Value>, span: Span) -> RResult<Value> {
        let decl = Rc::clone(&function.decl);
        let name = function.name().to_string();

        if args.len() != decl.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name,
                expected: decl.params.len(),
                found: args.len(),
                span,
            });
        }
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
                span,
            });
        }
        if !self.env.is_alive(function.closure) {
            return Err(RuntimeError::StaleScope { name, span });
        }

        self.call_depth += 1;
        let result = self.with_scope(function.closure, span, |this, frame| {
            for (param, arg) in decl.params.iter().zip(args) {
                let arg = arg.conform_to(&param.ty).map_err(|message| {
                    RuntimeError::type_mismatch(
                        format!("argument `{}` of `{}`: {}", param.name.name, name, message),
                        span,
                    )
                })?;
                this.env
                    .declare(frame, &param.name.name, arg, false)
                    .map_err(|e| scope_error(e, &param.name.name, param.name.span))?;
            }
            this.exec_statements(&decl.body.statements, frame)
        });
        self.call_depth -= 1;

        match (result?, &decl.return_type) {
            (Flow::Return(value), ty) => value.conform_to(ty).map_err(|message| {
                RuntimeError::type_mismatch(format!("`{}` returned a bad value: {}", name, message), span)
            }),
            (Flow::Normal(_), Type::Void) => Ok(Value::Void),
            (Flow::Normal(_), Type::Null) => Ok(Value::Null),
            (Flow::Normal(_), ty) => Err(RuntimeError::MissingReturn {
                name,
                expected: ty.to_string(),
                span,
            }),
        }
    }

    fn call_builtin(&mut self, name: &str, args: Vec<Value>, span: Span) -> RResult<Value> {
        let Some(builtin) = self.builtins.get(name) else {
            return Err(RuntimeError::Undeclared {
                name: name.to_string(),
                span,
            });
        };

        if let Some(expected) = builtin.arity() {
            if expected != args.len() {
                return Err(RuntimeError::ArityMismatch {
                    name: name.to_string(),
                    expected,
                    found: args.len(),
                    span,
                });
            }
        }

        tracing::trace!(builtin = name, args = args.len(), "call built-in");
        builtin
            .call(&args, &mut *self.output)
            .map_err(|e| RuntimeError::Builtin {
                name: name.to_string(),
                message: e.message,
                span,
            })
    }

    fn eval_struct_literal(
        &mut self,
        name: &Identifier,
        inits: &[FieldInit],
        scope: ScopeId,
    ) -> RResult<Value> {
        let decl = self
            .env
            .resolve_struct(scope, &name.name)
            .map_err(|e| match e {
                ScopeError::NotDeclared(_) => RuntimeError::UnknownStruct {
                    name: name.name.clone(),
                    span: name.span,
                },
                other => scope_error(other, &name.name, name.span),
            })?;

        let mut fields: BTreeMap<String, Value> = decl
            .properties
            .iter()
            .filter(|property| !property.is_static)
            .map(|property| (property.name.name.clone(), Value::default_for(&property.ty)))
            .collect();

        for init in inits {
            let property = decl.property(&init.name.name).ok_or_else(|| RuntimeError::UnknownProperty {
                struct_name: name.name.clone(),
                property: init.name.name.clone(),
                span: init.name.span,
            })?;
            if property.is_static {
                return Err(RuntimeError::InvalidAssignment {
                    message: format!(
                        "static property `{}` of `{}` cannot be set on an instance",
                        property.name.name, name.name
                    ),
                    span: init.name.span,
                });
            }

            let value = self
                .eval_expr(&init.value, scope)?
                .conform_to(&property.ty)
                .map_err(|message| RuntimeError::type_mismatch(message, init.value.span()))?;
            fields.insert(init.name.name.clone(), value);
        }

        Ok(Value::Struct(StructInstance { decl, fields }))
    }

    fn eval_index(&mut self, array: &Identifier, index: &Expr, scope: ScopeId) -> RResult<Value> {
        let collection = self.lookup(array, scope)?;
        let position = match self.eval_expr(index, scope)? {
            Value::Integer { value, .. } => value,
            other => {
                return Err(RuntimeError::type_mismatch(
                    format!("index must be an integer, found `{}`", other.type_name()),
                    index.span(),
                ))
            }
        };

        let out_of_bounds = |len: usize| RuntimeError::IndexOutOfBounds {
            index: position,
            len,
            span: index.span(),
        };

        match collection {
            Value::Array(items) => usize::try_from(position)
                .ok()
                .and_then(|i| items.get(i).cloned())
                .ok_or_else(|| out_of_bounds(items.len())),
            Value::String(s) => usize::try_from(position)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(Value::Character)
                .ok_or_else(|| out_of_bounds(s.chars().count())),
            other => Err(RuntimeError::type_mismatch(
                format!("cannot index into `{}`", other.type_name()),
                array.span,
            )),
        }
    }
}

fn read_property(object: &Value, property: &Identifier) -> RResult<Value> {
    let Value::Struct(instance) = object else {
        return Err(RuntimeError::type_mismatch(
            format!(
                "cannot read property `{}` of `{}`",
                property.name,
                object.type_name()
            ),
            property.span,
        ));
    };

    instance
        .fields
        .get(&property.name)
        .cloned()
        .ok_or_else(|| RuntimeError::UnknownProperty {
            struct_name: instance.name().to_string(),
            property: property.name.clone(),
            span: property.span,
        })
}

/// Split `a.b.c` into the root variable `a` and the path `[b, c]`.
fn property_path<'e>(expr: &'e Expr, path: &mut Vec<&'e Identifier>) -> Option<&'e Identifier> {
    match expr {
        Expr::Identifier(id) => Some(id),
        Expr::PropertyAccess {
            object, property, ..
        } => {
            let root = property_path(object, path)?;
            path.push(property);
            Some(root)
        }
        _ => None,
    }
}

/// Assign through a property path inside `object`, returning the stored value.
fn set_property(
    object: &mut Value,
    path: &[&Identifier],
    operator: &Spanned<AssignOp>,
    rhs: Value,
    span: Span,
) -> RResult<Value> {
    let type_name = object.type_name();
    let (Value::Struct(instance), Some((property, rest))) = (object, path.split_first()) else {
        return Err(RuntimeError::InvalidAssignment {
            message: format!("cannot set a property on `{}`", type_name),
            span,
        });
    };

    let decl = Rc::clone(&instance.decl);
    let struct_name = decl.name.name.clone();
    let unknown = || RuntimeError::UnknownProperty {
        struct_name: struct_name.clone(),
        property: property.name.clone(),
        span: property.span,
    };
    let property_decl = decl.property(&property.name).ok_or_else(unknown)?;
    let field = instance.fields.get_mut(&property.name).ok_or_else(unknown)?;

    if !rest.is_empty() {
        return set_property(field, rest, operator, rhs, span);
    }
    if property_decl.readonly {
        return Err(RuntimeError::ReadonlyProperty {
            struct_name,
            property: property.name.clone(),
            span: property.span,
        });
    }

    let new = match operator.value.binary() {
        Some(op) => ops::binary(op, field.clone(), rhs, operator.span)?,
        None => rhs,
    };
    let new = new
        .conform_to(&property_decl.ty)
        .map_err(|message| RuntimeError::type_mismatch(message, span))?;
    *field = new.clone();
    Ok(new)
}
