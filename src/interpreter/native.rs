use super::error::RuntimeErrorKind;
use super::value::{LoxValue, NativeFunction};
use std::time::{SystemTime, UNIX_EPOCH};

/// `clock()`: seconds since the Unix epoch.
#[derive(Debug)]
pub struct NativeClock;

impl NativeFunction for NativeClock {
    fn get_name(&self) -> &'static str {
        "clock"
    }

    fn arity(&self) -> usize {
        0
    }

    fn call(&self, _arguments: &[LoxValue]) -> Result<LoxValue, RuntimeErrorKind> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Ok(LoxValue::Number(since_epoch.as_secs_f64()))
    }
}
