//! Lexical scopes, stored in an arena and addressed by [`ScopeId`].
//!
//! Scopes are created and destroyed in LIFO order. A handle records the
//! generation of the slot it was issued for, so a handle that outlives its
//! scope is detected instead of silently reading a newer scope.

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::StructDecl;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("`{0}` is not declared")]
    NotDeclared(String),

    #[error("`{0}` is already declared in this scope")]
    AlreadyDeclared(String),

    #[error("cannot reassign constant `{0}`")]
    Constant(String),

    #[error("scope is no longer alive")]
    Stale,

    #[error("scopes must be popped in reverse order of creation")]
    OutOfOrder,
}

/// Handle to a scope in an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Binding {
    value: Value,
    constant: bool,
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    bindings: HashMap<String, Binding>,
    structs: HashMap<String, Rc<StructDecl>>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    scope: Scope,
}

/// Arena of lexical scopes. The root scope always exists.
#[derive(Debug)]
pub struct Environment {
    slots: Vec<Slot>,
    /// Number of live scopes; `slots[..live]` are alive
    live: usize,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                scope: Scope::default(),
            }],
            live: 1,
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId {
            index: 0,
            generation: self.slots[0].generation,
        }
    }

    /// Number of live scopes, the root included.
    pub fn depth(&self) -> usize {
        self.live
    }

    pub fn is_alive(&self, id: ScopeId) -> bool {
        id.index < self.live && self.slots[id.index].generation == id.generation
    }

    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        let scope = Scope {
            parent: Some(parent),
            ..Scope::default()
        };

        let index = self.live;
        let generation = if let Some(slot) = self.slots.get_mut(index) {
            slot.generation = slot.generation.wrapping_add(1);
            slot.scope = scope;
            slot.generation
        } else {
            self.slots.push(Slot {
                generation: 0,
                scope,
            });
            0
        };
        self.live += 1;

        tracing::trace!(index, depth = self.live, "push scope");
        ScopeId { index, generation }
    }

    /// Destroy the most recently pushed scope. The root cannot be popped.
    pub fn pop_scope(&mut self, id: ScopeId) -> Result<(), ScopeError> {
        if !self.is_alive(id) {
            return Err(ScopeError::Stale);
        }
        if id.index == 0 || id.index + 1 != self.live {
            return Err(ScopeError::OutOfOrder);
        }

        self.slots[id.index].scope = Scope::default();
        self.live -= 1;
        tracing::trace!(index = id.index, depth = self.live, "pop scope");
        Ok(())
    }

    fn scope(&self, id: ScopeId) -> Result<&Scope, ScopeError> {
        if self.is_alive(id) {
            Ok(&self.slots[id.index].scope)
        } else {
            Err(ScopeError::Stale)
        }
    }

    fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope, ScopeError> {
        if self.is_alive(id) {
            Ok(&mut self.slots[id.index].scope)
        } else {
            Err(ScopeError::Stale)
        }
    }

    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: Value,
        constant: bool,
    ) -> Result<(), ScopeError> {
        let scope = self.scope_mut(scope)?;
        if scope.bindings.contains_key(name) {
            return Err(ScopeError::AlreadyDeclared(name.to_string()));
        }
        scope
            .bindings
            .insert(name.to_string(), Binding { value, constant });
        Ok(())
    }

    /// Find the scope that binds `name`, walking up from `scope`.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Result<ScopeId, ScopeError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id)?;
            if scope.bindings.contains_key(name) {
                return Ok(id);
            }
            current = scope.parent;
        }
        Err(ScopeError::NotDeclared(name.to_string()))
    }

    pub fn get(&self, scope: ScopeId, name: &str) -> Result<&Value, ScopeError> {
        let owner = self.resolve(scope, name)?;
        self.scope(owner)?
            .bindings
            .get(name)
            .map(|binding| &binding.value)
            .ok_or_else(|| ScopeError::NotDeclared(name.to_string()))
    }

    /// Replace the binding of `name` in the scope that owns it.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<(), ScopeError> {
        let owner = self.resolve(scope, name)?;
        let binding = self
            .scope_mut(owner)?
            .bindings
            .get_mut(name)
            .ok_or_else(|| ScopeError::NotDeclared(name.to_string()))?;
        if binding.constant {
            return Err(ScopeError::Constant(name.to_string()));
        }
        binding.value = value;
        Ok(())
    }

    pub fn is_constant(&self, scope: ScopeId, name: &str) -> Result<bool, ScopeError> {
        let owner = self.resolve(scope, name)?;
        Ok(self
            .scope(owner)?
            .bindings
            .get(name)
            .is_some_and(|binding| binding.constant))
    }

    pub fn declare_struct(&mut self, scope: ScopeId, decl: Rc<StructDecl>) -> Result<(), ScopeError> {
        let scope = self.scope_mut(scope)?;
        let name = decl.name.name.clone();
        if scope.structs.contains_key(&name) {
            return Err(ScopeError::AlreadyDeclared(name));
        }
        scope.structs.insert(name, decl);
        Ok(())
    }

    pub fn resolve_struct(&self, scope: ScopeId, name: &str) -> Result<Rc<StructDecl>, ScopeError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id)?;
            if let Some(decl) = scope.structs.get(name) {
                return Ok(Rc::clone(decl));
            }
            current = scope.parent;
        }
        Err(ScopeError::NotDeclared(name.to_string()))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_resolve_through_parent() {
        let mut env = Environment::new();
        let root = env.root();
        env.declare(root, "x", Value::int(1), false).unwrap();

        let child = env.push_scope(root);
        assert_eq!(env.resolve(child, "x").unwrap(), root);
        assert_eq!(env.get(child, "x").unwrap(), &Value::int(1));
    }

    #[test]
    fn test_redeclare_in_same_scope_fails() {
        let mut env = Environment::new();
        let root = env.root();
        env.declare(root, "x", Value::int(1), false).unwrap();
        assert_eq!(
            env.declare(root, "x", Value::int(2), false),
            Err(ScopeError::AlreadyDeclared("x".into()))
        );
    }

    #[test]
    fn test_shadowing_in_child_scope() {
        let mut env = Environment::new();
        let root = env.root();
        env.declare(root, "x", Value::int(1), false).unwrap();
        let child = env.push_scope(root);
        env.declare(child, "x", Value::Boolean(true), false).unwrap();
        assert_eq!(env.get(child, "x").unwrap(), &Value::Boolean(true));
        env.pop_scope(child).unwrap();
        assert_eq!(env.get(root, "x").unwrap(), &Value::int(1));
    }

    #[test]
    fn test_constant_cannot_be_assigned() {
        let mut env = Environment::new();
        let root = env.root();
        env.declare(root, "y", Value::int(1), true).unwrap();
        let child = env.push_scope(root);
        assert_eq!(
            env.assign(child, "y", Value::int(2)),
            Err(ScopeError::Constant("y".into()))
        );
        assert!(env.is_constant(child, "y").unwrap());
    }

    #[test]
    fn test_assign_updates_owner() {
        let mut env = Environment::new();
        let root = env.root();
        env.declare(root, "x", Value::int(1), false).unwrap();
        let child = env.push_scope(root);
        env.assign(child, "x", Value::int(5)).unwrap();
        env.pop_scope(child).unwrap();
        assert_eq!(env.get(root, "x").unwrap(), &Value::int(5));
    }

    #[test]
    fn test_undeclared() {
        let env = Environment::new();
        assert_eq!(
            env.get(env.root(), "missing"),
            Err(ScopeError::NotDeclared("missing".into()))
        );
    }

    #[test]
    fn test_stale_handle_is_detected() {
        let mut env = Environment::new();
        let root = env.root();
        let first = env.push_scope(root);
        env.pop_scope(first).unwrap();
        let second = env.push_scope(root);

        assert!(!env.is_alive(first));
        assert!(env.is_alive(second));
        assert_eq!(env.declare(first, "x", Value::Null, false), Err(ScopeError::Stale));
    }

    #[test]
    fn test_pop_out_of_order() {
        let mut env = Environment::new();
        let root = env.root();
        let outer = env.push_scope(root);
        let _inner = env.push_scope(outer);
        assert_eq!(env.pop_scope(outer), Err(ScopeError::OutOfOrder));
        assert_eq!(env.pop_scope(root), Err(ScopeError::OutOfOrder));
        assert_eq!(env.depth(), 3);
    }
}
