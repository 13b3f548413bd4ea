use std::io::Write;

use super::{Builtin, BuiltinError, BuiltinResult};
use crate::value::Value;

/// `len(array)` or `len(str)`, as an `i64`.
pub struct Len;

impl Builtin for Len {
    fn name(&self) -> &'static str {
        "len"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn call(&self, args: &[Value], _out: &mut dyn Write) -> BuiltinResult<Value> {
        let len = match args.first() {
            Some(Value::Array(items)) => items.len(),
            Some(Value::String(s)) => s.chars().count(),
            Some(other) => {
                return Err(BuiltinError::new(format!(
                    "expected an array or a string, found `{}`",
                    other.type_name()
                )))
            }
            None => return Err(BuiltinError::new("missing argument")),
        };
        let len = i64::try_from(len).map_err(|_| BuiltinError::new("length does not fit in i64"))?;
        Ok(Value::i64(len))
    }
}
