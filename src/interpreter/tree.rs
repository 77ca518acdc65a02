use super::environment::Environment;
use super::error::{RuntimeError, RuntimeErrorKind};
use super::value::{Callable, Function, LoxValue};
use super::{ProgramState, SystemContext};
use crate::parser::expression::{
    BinaryOperator, Expression, ExpressionNode, ExpressionNodeRef, Literal, LogicalOperator,
    UnaryOperator,
};
use crate::parser::statement::{Declaration, NonDeclaration, Program, Statement};
use std::cell::Cell;
use std::rc::Rc;

/// Deepest chain of user function calls before `Stack overflow.` is raised.
pub const MAX_CALL_DEPTH: usize = 256;

/// Executes parsed programs. The root environment persists across calls to `interpret`.
#[derive(Debug)]
pub struct TreeWalkInterpreter {
    globals: Environment,
    call_depth: Cell<usize>,
}

impl Default for TreeWalkInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWalkInterpreter {
    pub fn new() -> Self {
        Self {
            globals: Environment::with_natives(),
            call_depth: Cell::new(0),
        }
    }

    /// Runs every parsed declaration in order, stopping at the first runtime error.
    pub fn interpret<C: SystemContext>(
        &self,
        program: &Program,
        context: &mut C,
    ) -> Result<(), RuntimeError> {
        for statement in program.iter() {
            tracing::trace!(?statement, "executing top-level statement");
            match self.interpret_statement(statement, &self.globals, context)? {
                ProgramState::Run => {}
                // Only reachable when a top-level `return` was already reported as a syntax error.
                ProgramState::Return(_) => break,
            }
        }
        Ok(())
    }

    pub fn interpret_statement<C: SystemContext>(
        &self,
        statement: &Statement,
        environment: &Environment,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        match statement {
            Statement::Declaration(decl) => self.interpret_declaration(decl, environment, context),
            Statement::NonDeclaration(stmt) => {
                self.interpret_non_declaration(stmt, environment, context)
            }
        }
    }

    pub fn evaluate<C: SystemContext>(
        &self,
        expr: &Expression,
        environment: &Environment,
        context: &mut C,
    ) -> Result<LoxValue, RuntimeError> {
        self.evaluate_node(expr, expr.get_root_ref(), environment, context)
    }
}

// Statements
impl TreeWalkInterpreter {
    fn interpret_declaration<C: SystemContext>(
        &self,
        decl: &Declaration,
        environment: &Environment,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        match decl {
            Declaration::Variable { name, initial } => {
                let value = match initial {
                    Some(expr) => self.evaluate(expr, environment, context)?,
                    None => LoxValue::Nil,
                };
                environment.define(&name.name, value);
            }
            Declaration::Function(decl) => {
                let function = Function {
                    declaration: Rc::clone(decl),
                    closure: environment.clone(),
                };
                environment.define(&decl.name.name, LoxValue::Function(Rc::new(function)));
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_non_declaration<C: SystemContext>(
        &self,
        statement: &NonDeclaration,
        environment: &Environment,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        match statement {
            NonDeclaration::Expression(expr) => {
                self.evaluate(expr, environment, context)?;
                Ok(ProgramState::Run)
            }
            NonDeclaration::Print(expr) => {
                let value = self.evaluate(expr, environment, context)?;
                context.writeln(&value.to_string());
                Ok(ProgramState::Run)
            }
            NonDeclaration::Block(statements) => {
                self.interpret_block(statements, &environment.new_scope(), context)
            }
            NonDeclaration::If {
                condition,
                success,
                failure,
            } => {
                if self.evaluate(condition, environment, context)?.is_truthy() {
                    self.interpret_non_declaration(success, environment, context)
                } else if let Some(failure) = failure {
                    self.interpret_non_declaration(failure, environment, context)
                } else {
                    Ok(ProgramState::Run)
                }
            }
            NonDeclaration::While { condition, body } => {
                while self.evaluate(condition, environment, context)?.is_truthy() {
                    if let ProgramState::Return(value) =
                        self.interpret_non_declaration(body, environment, context)?
                    {
                        return Ok(ProgramState::Return(value));
                    }
                }
                Ok(ProgramState::Run)
            }
            NonDeclaration::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, environment, context)?,
                    None => LoxValue::Nil,
                };
                Ok(ProgramState::Return(value))
            }
        }
    }

    /// Runs `statements` in `scope`. The caller's scope is untouched whichever way this exits.
    fn interpret_block<C: SystemContext>(
        &self,
        statements: &[Statement],
        scope: &Environment,
        context: &mut C,
    ) -> Result<ProgramState, RuntimeError> {
        for statement in statements {
            if let ProgramState::Return(value) =
                self.interpret_statement(statement, scope, context)?
            {
                return Ok(ProgramState::Return(value));
            }
        }
        Ok(ProgramState::Run)
    }
}

// Expressions
impl TreeWalkInterpreter {
    fn evaluate_node<C: SystemContext>(
        &self,
        expr: &Expression,
        node: ExpressionNodeRef,
        environment: &Environment,
        context: &mut C,
    ) -> Result<LoxValue, RuntimeError> {
        match expr.get_node(node) {
            ExpressionNode::Literal(literal) => Ok(match literal {
                Literal::Nil => LoxValue::Nil,
                Literal::Bool(v) => LoxValue::Bool(*v),
                Literal::Number(v) => LoxValue::Number(*v),
                Literal::String(v) => LoxValue::String(v.clone()),
            }),
            ExpressionNode::Variable(name) => {
                environment.get(name).map_err(|kind| kind.at(name.line))
            }
            ExpressionNode::Group { inner } => {
                self.evaluate_node(expr, *inner, environment, context)
            }
            ExpressionNode::Unary { operator, rhs, line } => {
                let rhs = self.evaluate_node(expr, *rhs, environment, context)?;
                match operator {
                    UnaryOperator::Bang => Ok(LoxValue::Bool(!rhs.is_truthy())),
                    UnaryOperator::Minus => rhs.numeric_negate().map_err(|kind| kind.at(*line)),
                }
            }
            ExpressionNode::Binary {
                operator,
                lhs,
                rhs,
                line,
            } => {
                let lhs = self.evaluate_node(expr, *lhs, environment, context)?;
                let rhs = self.evaluate_node(expr, *rhs, environment, context)?;
                let result = match operator {
                    BinaryOperator::Add => lhs.add(&rhs),
                    BinaryOperator::Subtract => lhs.subtract(&rhs),
                    BinaryOperator::Multiply => lhs.multiply(&rhs),
                    BinaryOperator::Divide => lhs.divide(&rhs),
                    BinaryOperator::LessThan => lhs.less_than(&rhs),
                    BinaryOperator::LessThanEqual => lhs.less_than_or_equal(&rhs),
                    BinaryOperator::GreaterThan => lhs.greater_than(&rhs),
                    BinaryOperator::GreaterThanEqual => lhs.greater_than_or_equal(&rhs),
                    BinaryOperator::EqualEqual => Ok(LoxValue::Bool(lhs.is_equal(&rhs))),
                    BinaryOperator::BangEqual => Ok(LoxValue::Bool(!lhs.is_equal(&rhs))),
                };
                result.map_err(|kind| kind.at(*line))
            }
            ExpressionNode::Logical { operator, lhs, rhs } => {
                let lhs = self.evaluate_node(expr, *lhs, environment, context)?;
                let short_circuits = match operator {
                    LogicalOperator::Or => lhs.is_truthy(),
                    LogicalOperator::And => !lhs.is_truthy(),
                };
                if short_circuits {
                    Ok(lhs)
                } else {
                    self.evaluate_node(expr, *rhs, environment, context)
                }
            }
            ExpressionNode::Assign { name, value } => {
                let value = self.evaluate_node(expr, *value, environment, context)?;
                environment
                    .assign(name, value.clone())
                    .map_err(|kind| kind.at(name.line))?;
                Ok(value)
            }
            ExpressionNode::Call {
                callee,
                arguments,
                line,
            } => {
                let callee = self.evaluate_node(expr, *callee, environment, context)?;
                let Some(callable) = callee.as_callable() else {
                    return Err(RuntimeErrorKind::NotCallable.at(*line));
                };

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate_node(expr, *argument, environment, context)?);
                }

                if values.len() != callable.arity() {
                    return Err(RuntimeErrorKind::ArityMismatch {
                        expected: callable.arity(),
                        actual: values.len(),
                    }
                    .at(*line));
                }
                self.call(callable, values, *line, context)
            }
        }
    }

    fn call<C: SystemContext>(
        &self,
        callable: Callable<'_>,
        arguments: Vec<LoxValue>,
        line: u32,
        context: &mut C,
    ) -> Result<LoxValue, RuntimeError> {
        match callable {
            Callable::Native(native) => {
                tracing::debug!(name = native.get_name(), "calling native function");
                native.call(&arguments).map_err(|kind| kind.at(line))
            }
            Callable::Function(function) => {
                let depth = self.call_depth.get();
                if depth >= MAX_CALL_DEPTH {
                    tracing::debug!(name = function.name(), line, depth, "call depth exceeded");
                    return Err(RuntimeErrorKind::StackOverflow.at(line));
                }
                tracing::debug!(name = function.name(), line, depth, "calling function");

                let scope = function.closure.new_scope();
                for (parameter, argument) in function.declaration.parameters.iter().zip(arguments) {
                    scope.define(&parameter.name, argument);
                }
                self.call_depth.set(depth + 1);
                let state = self.interpret_block(&function.declaration.body, &scope, context);
                self.call_depth.set(depth);
                match state? {
                    ProgramState::Return(value) => Ok(value),
                    ProgramState::Run => Ok(LoxValue::Nil),
                }
            }
        }
    }
}
