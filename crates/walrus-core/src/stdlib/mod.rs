//! Built-in functions available to every program.
//!
//! A built-in is consulted only when a called name is not bound in the
//! environment, so user declarations shadow it.

mod collections;
mod print;
mod time;

use std::collections::HashMap;
use std::io::Write;

use thiserror::Error;

use crate::value::Value;

pub use collections::Len;
pub use print::Print;
pub use time::Time;

/// Error type for built-in calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BuiltinError {
    pub message: String,
}

impl BuiltinError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type BuiltinResult<T> = Result<T, BuiltinError>;

/// A natively implemented function.
pub trait Builtin {
    fn name(&self) -> &'static str;

    /// Exact number of arguments, or `None` for any number.
    fn arity(&self) -> Option<usize>;

    /// Call with already evaluated arguments. Text output goes to `out`.
    fn call(&self, args: &[Value], out: &mut dyn Write) -> BuiltinResult<Value>;
}

/// Registry of built-in functions keyed by name.
pub struct BuiltinRegistry {
    builtins: HashMap<String, Box<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            builtins: HashMap::new(),
        }
    }

    /// `print`, `len` and `time`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Print));
        registry.register(Box::new(Len));
        registry.register(Box::new(Time));
        registry
    }

    pub fn register(&mut self, builtin: Box<dyn Builtin>) {
        self.builtins.insert(builtin.name().to_string(), builtin);
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Builtin>> {
        self.builtins.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins.get(name).map(|b| b.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.builtins.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let registry = BuiltinRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["len", "print", "time"]);
        assert!(registry.has("print"));
        assert!(!registry.has("input"));
    }

    #[test]
    fn test_error_display() {
        let err = BuiltinError::new("expected an array or a string");
        assert_eq!(err.to_string(), "expected an array or a string");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert_eq!(boxed.to_string(), "expected an array or a string");
    }

    #[test]
    fn test_remove() {
        let mut registry = BuiltinRegistry::with_defaults();
        assert!(registry.remove("time").is_some());
        assert!(registry.get("time").is_none());
    }

    #[test]
    fn test_print_joins_without_separator() {
        let mut out = Vec::new();
        let result = Print
            .call(&[Value::String("a =".into()), Value::int(3)], &mut out)
            .unwrap();
        assert_eq!(result, Value::Void);
        assert_eq!(String::from_utf8(out).unwrap(), "a =3\n");
    }

    #[test]
    fn test_len() {
        let mut out = Vec::new();
        let array = Value::Array(vec![Value::int(1), Value::int(2)]);
        assert_eq!(Len.call(&[array], &mut out).unwrap(), Value::i64(2));
        assert_eq!(Len.call(&[Value::String("héllo".into())], &mut out).unwrap(), Value::i64(5));
        assert!(Len.call(&[Value::Boolean(true)], &mut out).is_err());
    }

    #[test]
    fn test_time_is_i64() {
        let mut out = Vec::new();
        let now = Time.call(&[], &mut out).unwrap();
        assert_eq!(now.type_name(), "i64");
        assert!(now.is_truthy());
    }
}
