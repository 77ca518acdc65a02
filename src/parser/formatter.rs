use super::expression::{Expression, ExpressionNode, ExpressionNodeRef, Literal};
use super::{ParserError, ParserErrorKind};
use crate::report::Diagnostic;

pub trait ExpressionFormatter {
    fn format(&self, tree: &Expression) -> String;
}

pub struct DebugExpressionFormatter;

impl ExpressionFormatter for DebugExpressionFormatter {
    fn format(&self, tree: &Expression) -> String {
        format!("{tree:?}")
    }
}

/// Fully parenthesized prefix form, e.g. `(+ 1 (* 2 3))`.
pub struct SExpressionFormatter;

impl SExpressionFormatter {
    fn format_literal(literal: &Literal) -> String {
        match literal {
            Literal::Nil => "nil".into(),
            Literal::Bool(v) => format!("{v}"),
            Literal::Number(v) => format!("{v}"),
            Literal::String(v) => format!("{v}"),
        }
    }

    fn format_node(tree: &Expression, node: ExpressionNodeRef) -> String {
        match tree.get_node(node) {
            ExpressionNode::Literal(literal) => Self::format_literal(literal),
            ExpressionNode::Variable(name) => format!("{name}"),
            ExpressionNode::Group { inner } => {
                format!("(group {})", Self::format_node(tree, *inner))
            }
            ExpressionNode::Unary { operator, rhs, .. } => {
                format!("({} {})", operator.symbol(), Self::format_node(tree, *rhs))
            }
            ExpressionNode::Binary {
                operator, lhs, rhs, ..
            } => format!(
                "({} {} {})",
                operator.symbol(),
                Self::format_node(tree, *lhs),
                Self::format_node(tree, *rhs),
            ),
            ExpressionNode::Logical { operator, lhs, rhs } => format!(
                "({} {} {})",
                operator.symbol(),
                Self::format_node(tree, *lhs),
                Self::format_node(tree, *rhs),
            ),
            ExpressionNode::Assign { name, value } => {
                format!("(= {name} {})", Self::format_node(tree, *value))
            }
            ExpressionNode::Call {
                callee, arguments, ..
            } => {
                let mut buffer = format!("(call {}", Self::format_node(tree, *callee));
                for argument in arguments.iter() {
                    buffer.push(' ');
                    buffer.push_str(&Self::format_node(tree, *argument));
                }
                buffer.push(')');
                buffer
            }
        }
    }
}

impl ExpressionFormatter for SExpressionFormatter {
    fn format(&self, tree: &Expression) -> String {
        Self::format_node(tree, tree.get_root_ref())
    }
}

pub trait ParserFormatter {
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugParserFormatter;

impl ParserFormatter for DebugParserFormatter {
    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// `[line n] Error at '<lexeme>': <message>`
pub struct BasicParserFormatter;

impl ParserFormatter for BasicParserFormatter {
    fn format_error(&self, error: &ParserError) -> String {
        format!("{error}")
    }
}

pub struct PrettyParserFormatter<'src> {
    name: &'src str,
    text: &'src str,
}

impl<'src> PrettyParserFormatter<'src> {
    pub fn new(name: &'src str, text: &'src str) -> Self {
        Self { name, text }
    }
}

impl<'src> ParserFormatter for PrettyParserFormatter<'src> {
    fn format_error(&self, error: &ParserError) -> String {
        let token = &error.token;
        let label = match error.kind {
            ParserErrorKind::UnexpectedToken { expected, .. } => {
                format!("Expected {expected} but got {}", token.kind)
            }
            ParserErrorKind::NonExpression => format!("{} does not start an expression", token.kind),
            ParserErrorKind::InvalidLValue => "Left side is not a variable".into(),
            ParserErrorKind::TooManyParameters { .. } => "Parameter over the limit".into(),
            ParserErrorKind::TooManyArguments { .. } => "Argument over the limit".into(),
            ParserErrorKind::NonFunctionReturn => "Not inside a function".into(),
            ParserErrorKind::TooDeep { .. } => "Nested one level too deep".into(),
        };
        Diagnostic {
            code: error.code(),
            message: error.kind.to_string(),
            label,
            span: token.span,
        }
        .render(self.name, self.text)
    }
}
