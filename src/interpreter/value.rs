use super::environment::Environment;
use super::error::RuntimeErrorKind;
use crate::parser::statement::FunctionDecl;
use compact_str::{CompactString, CompactStringExt};
use std::rc::Rc;

pub trait NativeFunction: std::fmt::Debug {
    fn get_name(&self) -> &'static str;
    fn arity(&self) -> usize;
    fn call(&self, arguments: &[LoxValue]) -> Result<LoxValue, RuntimeErrorKind>;
}

/// A user function together with the scope it was declared in.
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Environment,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.declaration.name.name
    }
}

// The closure can point back at this function, so it is left out.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.declaration.parameters.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum LoxValue {
    Nil,
    Bool(bool),
    Number(f64),
    String(CompactString),
    NativeFunction(Rc<dyn NativeFunction>),
    Function(Rc<Function>),
}

/// A value that can be the target of a call.
pub enum Callable<'a> {
    Native(&'a Rc<dyn NativeFunction>),
    Function(&'a Rc<Function>),
}

impl Callable<'_> {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity(),
            Callable::Function(function) => function.declaration.parameters.len(),
        }
    }
}

impl std::fmt::Display for LoxValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::NativeFunction(_) => write!(f, "<native fn>"),
            Self::Function(fun) => write!(f, "<fn {}>", fun.name()),
        }
    }
}

impl LoxValue {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LoxValue::Bool(false) | LoxValue::Nil)
    }

    pub fn as_callable(&self) -> Option<Callable<'_>> {
        match self {
            LoxValue::NativeFunction(native) => Some(Callable::Native(native)),
            LoxValue::Function(function) => Some(Callable::Function(function)),
            _ => None,
        }
    }

    pub fn numeric_negate(&self) -> Result<LoxValue, RuntimeErrorKind> {
        match self {
            LoxValue::Number(v) => Ok(LoxValue::Number(-v)),
            _ => Err(RuntimeErrorKind::NonNumeric),
        }
    }
}

// Binary operators
impl LoxValue {
    fn numbers(&self, other: &LoxValue) -> Result<(f64, f64), RuntimeErrorKind> {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => Ok((*lhs, *rhs)),
            _ => Err(RuntimeErrorKind::NonNumerics),
        }
    }

    /// Numeric addition or string concatenation.
    pub fn add(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => Ok(LoxValue::Number(lhs + rhs)),
            (LoxValue::String(lhs), LoxValue::String(rhs)) => {
                Ok(LoxValue::String([lhs, rhs].concat_compact()))
            }
            _ => Err(RuntimeErrorKind::NonAddable),
        }
    }

    pub fn subtract(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.numbers(other)?;
        Ok(LoxValue::Number(lhs - rhs))
    }

    pub fn multiply(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.numbers(other)?;
        Ok(LoxValue::Number(lhs * rhs))
    }

    /// IEEE division. Dividing by zero gives an infinity or NaN.
    pub fn divide(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.numbers(other)?;
        Ok(LoxValue::Number(lhs / rhs))
    }

    pub fn less_than(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.numbers(other)?;
        Ok(LoxValue::Bool(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.numbers(other)?;
        Ok(LoxValue::Bool(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.numbers(other)?;
        Ok(LoxValue::Bool(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.numbers(other)?;
        Ok(LoxValue::Bool(lhs >= rhs))
    }

    /// Values of different kinds are never equal. Callables compare by identity.
    pub fn is_equal(&self, other: &LoxValue) -> bool {
        match (self, other) {
            (LoxValue::Nil, LoxValue::Nil) => true,
            (LoxValue::Bool(lhs), LoxValue::Bool(rhs)) => lhs == rhs,
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => lhs == rhs,
            (LoxValue::String(lhs), LoxValue::String(rhs)) => lhs == rhs,
            (LoxValue::NativeFunction(lhs), LoxValue::NativeFunction(rhs)) => {
                std::ptr::addr_eq(Rc::as_ptr(lhs), Rc::as_ptr(rhs))
            }
            (LoxValue::Function(lhs), LoxValue::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}
