//! Runtime values.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{FunctionDecl, StructDecl, Type};
use crate::environment::ScopeId;
use crate::numeric;

/// A user-defined function together with the scope it was declared in.
#[derive(Debug)]
pub struct FunctionValue {
    pub decl: Rc<FunctionDecl>,
    pub closure: ScopeId,
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        &self.decl.name.name
    }
}

/// An instance of a declared struct. Static properties are not stored.
#[derive(Debug, Clone)]
pub struct StructInstance {
    pub decl: Rc<StructDecl>,
    pub fields: BTreeMap<String, Value>,
}

impl StructInstance {
    pub fn name(&self) -> &str {
        &self.decl.name.name
    }
}

/// A runtime value with its type tag.
#[derive(Debug, Clone)]
pub enum Value {
    Integer { value: i128, bits: u8, signed: bool },
    Float { value: f64, bits: u8 },
    Boolean(bool),
    String(String),
    Character(char),
    Null,
    Void,
    Function(Rc<FunctionValue>),
    /// A registered built-in, by name
    Native(String),
    Array(Vec<Value>),
    Struct(StructInstance),
}

impl Value {
    /// A signed integer sized to fit `value`.
    pub fn int(value: i128) -> Self {
        Value::Integer {
            value,
            bits: numeric::integer_bits(value),
            signed: true,
        }
    }

    pub fn i64(value: i64) -> Self {
        Value::Integer {
            value: value.into(),
            bits: 64,
            signed: true,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Integer { bits, signed, .. } => numeric::integer_type_name(*bits, *signed),
            Value::Float { bits, .. } => format!("f{}", bits),
            Value::Boolean(_) => "bool".into(),
            Value::String(_) => "str".into(),
            Value::Character(_) => "char".into(),
            Value::Null => "null".into(),
            Value::Void => "void".into(),
            Value::Function(_) | Value::Native(_) => "fn".into(),
            Value::Array(items) => match items.first() {
                Some(first) => format!("[]{}", first.type_name()),
                None => "[]".into(),
            },
            Value::Struct(instance) => instance.name().to_string(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer { value, .. } => *value != 0,
            Value::Float { value, .. } => *value != 0.0,
            Value::Boolean(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Character(c) => *c != '\0',
            Value::Null | Value::Void => false,
            Value::Array(items) => !items.is_empty(),
            Value::Function(_) | Value::Native(_) | Value::Struct(_) => true,
        }
    }

    /// Whether the value has a textual form usable in string concatenation.
    pub fn is_printable(&self) -> bool {
        matches!(
            self,
            Value::Integer { .. }
                | Value::Float { .. }
                | Value::Boolean(_)
                | Value::String(_)
                | Value::Character(_)
                | Value::Null
        )
    }

    /// The zero value of a declared type.
    pub fn default_for(ty: &Type) -> Value {
        match ty {
            Type::Integer { bits, signed } => Value::Integer {
                value: 0,
                bits: *bits,
                signed: *signed,
            },
            Type::Float { bits } => Value::Float {
                value: 0.0,
                bits: *bits,
            },
            Type::Boolean => Value::Boolean(false),
            Type::String => Value::String(String::new()),
            Type::Character => Value::Character('\0'),
            Type::Null => Value::Null,
            Type::Array(_) => Value::Array(Vec::new()),
            Type::Void => Value::Void,
        }
    }

    /// Check the value against a declared type, re-tagging numbers to the
    /// declared width. The error is a description of the mismatch.
    pub fn conform_to(self, ty: &Type) -> Result<Value, String> {
        match (ty, self) {
            (Type::Null, value) => Ok(value),
            (Type::Integer { bits, signed }, Value::Integer { value, .. }) => {
                if numeric::fits(value, *bits, *signed) {
                    Ok(Value::Integer {
                        value,
                        bits: *bits,
                        signed: *signed,
                    })
                } else {
                    Err(format!(
                        "`{}` does not fit in `{}` (potential data loss)",
                        value, ty
                    ))
                }
            }
            (Type::Float { bits }, Value::Float { value, .. }) => Ok(float(value, *bits)),
            (Type::Float { bits }, Value::Integer { value, .. }) => {
                Ok(float(value as f64, *bits))
            }
            (Type::Boolean, value @ Value::Boolean(_))
            | (Type::String, value @ Value::String(_))
            | (Type::Character, value @ Value::Character(_))
            | (Type::Void, value @ (Value::Void | Value::Null)) => Ok(value),
            (Type::Array(element), Value::Array(items)) => items
                .into_iter()
                .map(|item| item.conform_to(element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (ty, value) => Err(format!(
                "expected `{}`, found `{}`",
                ty,
                value.type_name()
            )),
        }
    }

    /// Check a value assigned over `self`, keeping the existing type tag.
    ///
    /// A `null` binding accepts anything.
    pub fn retag_assignment(&self, new: Value) -> Result<Value, String> {
        match (self, new) {
            (Value::Null, new) => Ok(new),
            (Value::Integer { bits, signed, .. }, new @ Value::Integer { .. }) => {
                new.conform_to(&Type::Integer {
                    bits: *bits,
                    signed: *signed,
                })
            }
            (Value::Float { bits, .. }, new @ (Value::Float { .. } | Value::Integer { .. })) => {
                new.conform_to(&Type::Float { bits: *bits })
            }
            (Value::Struct(old), Value::Struct(new)) if old.name() == new.name() => {
                Ok(Value::Struct(new))
            }
            (
                Value::Function(_) | Value::Native(_),
                new @ (Value::Function(_) | Value::Native(_)),
            ) => Ok(new),
            (old, new)
                if std::mem::discriminant(old) == std::mem::discriminant(&new)
                    && !matches!(old, Value::Struct(_)) =>
            {
                Ok(new)
            }
            (old, new) => Err(format!(
                "cannot assign `{}` to a variable of type `{}`",
                new.type_name(),
                old.type_name()
            )),
        }
    }
}

fn float(value: f64, bits: u8) -> Value {
    let value = if bits == 32 {
        f64::from(value as f32)
    } else {
        value
    };
    Value::Float { value, bits }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer { value: a, .. }, Value::Integer { value: b, .. }) => a == b,
            (Value::Float { value: a, .. }, Value::Float { value: b, .. }) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Character(a), Value::Character(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Void, Value::Void) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a.name() == b.name() && a.fields == b.fields,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer { value, .. } => write!(f, "{}", value),
            Value::Float { value, .. } => write!(f, "{}", value),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
            Value::Character(c) => write!(f, "{}", c),
            Value::Null => write!(f, "null"),
            Value::Void => write!(f, "void"),
            Value::Function(func) => write!(f, "<fn {}>", func.name()),
            Value::Native(name) => write!(f, "<native fn {}>", name),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Struct(instance) => {
                write!(f, "{} {{", instance.name())?;
                for (i, (name, value)) in instance.fields.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{}{}: {}", sep, name, value)?;
                }
                write!(f, " }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i(bits: u8) -> Type {
        Type::Integer { bits, signed: true }
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::int(3).is_truthy());
        assert!(!Value::int(0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::Character('a').is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Void.is_truthy());
        assert!(!Value::Array(Vec::new()).is_truthy());
    }

    #[test]
    fn test_conform_retags_integer() {
        let value = Value::int(5).conform_to(&i(64)).unwrap();
        assert_eq!(value.type_name(), "i64");
    }

    #[test]
    fn test_conform_rejects_overflow() {
        let err = Value::int(300).conform_to(&i(8)).unwrap_err();
        assert_eq!(err, "`300` does not fit in `i8` (potential data loss)");
        let err = Value::int(-1)
            .conform_to(&Type::Integer { bits: 8, signed: false })
            .unwrap_err();
        assert!(err.contains("u8"));
    }

    #[test]
    fn test_conform_mismatch() {
        let err = Value::Boolean(true).conform_to(&Type::String).unwrap_err();
        assert_eq!(err, "expected `str`, found `bool`");
    }

    #[test]
    fn test_unknown_type_accepts_anything() {
        assert_eq!(Value::Boolean(true).conform_to(&Type::Null).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_conform_array_elements() {
        let array = Value::Array(vec![Value::int(1), Value::int(2)]);
        let conformed = array.conform_to(&Type::Array(Box::new(i(32)))).unwrap();
        assert_eq!(conformed.type_name(), "[]i32");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Value::default_for(&i(16)).type_name(), "i16");
        assert_eq!(Value::default_for(&Type::String), Value::String(String::new()));
        assert_eq!(Value::default_for(&Type::Null), Value::Null);
    }

    #[test]
    fn test_assignment_keeps_width() {
        let old = Value::Integer {
            value: 1,
            bits: 32,
            signed: true,
        };
        let new = old.retag_assignment(Value::int(2)).unwrap();
        assert_eq!(new.type_name(), "i32");
        assert!(old.retag_assignment(Value::String("x".into())).is_err());
        assert!(Value::Null.retag_assignment(Value::String("x".into())).is_ok());
    }

    #[test]
    fn test_display_array() {
        let array = Value::Array(vec![Value::int(1), Value::String("a".into())]);
        assert_eq!(array.to_string(), "[1, a]");
    }
}
