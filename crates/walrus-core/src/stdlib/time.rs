use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Builtin, BuiltinError, BuiltinResult};
use crate::value::Value;

/// `time()`: seconds since the Unix epoch.
pub struct Time;

impl Builtin for Time {
    fn name(&self) -> &'static str {
        "time"
    }

    fn arity(&self) -> Option<usize> {
        Some(0)
    }

    fn call(&self, _args: &[Value], _out: &mut dyn Write) -> BuiltinResult<Value> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| BuiltinError::new(format!("system clock is before the epoch: {}", e)))?;
        let seconds = i64::try_from(elapsed.as_secs())
            .map_err(|_| BuiltinError::new("timestamp does not fit in i64"))?;
        Ok(Value::i64(seconds))
    }
}
