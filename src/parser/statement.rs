use super::error::ParserError;
use super::expression::Expression;
use crate::string::Ident;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    NonDeclaration(NonDeclaration),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Variable {
        name: Ident,
        initial: Option<Expression>,
    },
    Function(Rc<FunctionDecl>),
}

/// Shared between the statement tree and every function value created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub parameters: Vec<Ident>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NonDeclaration {
    Expression(Expression),
    Print(Expression),
    Block(Vec<Statement>),
    If {
        condition: Expression,
        success: Box<NonDeclaration>,
        failure: Option<Box<NonDeclaration>>,
    },
    While {
        condition: Expression,
        body: Box<NonDeclaration>,
    },
    Return {
        value: Option<Expression>,
        line: u32,
    },
}

/// The parsed top level of a source text. Declarations that failed to parse are kept as `None`.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub declarations: Vec<Option<Statement>>,
    pub errors: Vec<ParserError>,
}

impl Program {
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.declarations.iter().flatten()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
