use std::io::Write;

use super::{Builtin, BuiltinError, BuiltinResult};
use crate::value::Value;

/// `print(args...)`: writes every argument, then a newline.
pub struct Print;

impl Builtin for Print {
    fn name(&self) -> &'static str {
        "print"
    }

    fn arity(&self) -> Option<usize> {
        None
    }

    fn call(&self, args: &[Value], out: &mut dyn Write) -> BuiltinResult<Value> {
        let io_error = |e: std::io::Error| BuiltinError::new(format!("failed to write output: {}", e));
        for arg in args {
            write!(out, "{}", arg).map_err(io_error)?;
        }
        writeln!(out).map_err(io_error)?;
        Ok(Value::Void)
    }
}
