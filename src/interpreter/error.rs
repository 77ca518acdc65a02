use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    NonNumeric,
    #[error("Operands must be numbers.")]
    NonNumerics,
    #[error("Operands must be two numbers or two strings.")]
    NonAddable,
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(CompactString),
    #[error("Can only call functions and classes.")]
    NotCallable,
    #[error("Expected {expected} arguments but got {actual}.")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("Stack overflow.")]
    StackOverflow,
}

impl RuntimeErrorKind {
    pub fn at(self, line: u32) -> RuntimeError {
        RuntimeError { kind: self, line }
    }
}

/// An error that stops execution, tagged with the line of the construct that raised it.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}\n[line {line}]")]
pub struct RuntimeError {
    #[source]
    pub kind: RuntimeErrorKind,
    pub line: u32,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::NonNumeric => "RT001",
            RuntimeErrorKind::NonNumerics => "RT002",
            RuntimeErrorKind::NonAddable => "RT003",
            RuntimeErrorKind::UndefinedVariable(_) => "RT004",
            RuntimeErrorKind::NotCallable => "RT005",
            RuntimeErrorKind::ArityMismatch { .. } => "RT006",
            RuntimeErrorKind::StackOverflow => "RT007",
        }
    }
}
