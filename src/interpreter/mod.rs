pub mod context;
pub mod environment;
pub mod error;
pub mod formatter;
mod native;
mod tree;
pub mod value;

pub use tree::{TreeWalkInterpreter, MAX_CALL_DEPTH};
use value::LoxValue;

/// How a statement completed.
#[derive(Debug)]
pub enum ProgramState {
    Run,
    /// A `return` is unwinding to the nearest call.
    Return(LoxValue),
}

/// Where `print` output goes.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}
