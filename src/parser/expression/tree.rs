use super::{BinaryOperator, LogicalOperator, UnaryOperator};
use crate::lexer::TokenLiteral;
use crate::string::Ident;
use compact_str::CompactString;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Number(f64),
    String(CompactString),
}

impl From<TokenLiteral> for Literal {
    fn from(value: TokenLiteral) -> Self {
        match value {
            TokenLiteral::Number(v) => Literal::Number(v),
            TokenLiteral::String(v) => Literal::String(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionNodeRef(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Literal(Literal),
    Variable(Ident),
    Group {
        inner: ExpressionNodeRef,
    },
    Unary {
        operator: UnaryOperator,
        rhs: ExpressionNodeRef,
        line: u32,
    },
    Binary {
        operator: BinaryOperator,
        lhs: ExpressionNodeRef,
        rhs: ExpressionNodeRef,
        line: u32,
    },
    Logical {
        operator: LogicalOperator,
        lhs: ExpressionNodeRef,
        rhs: ExpressionNodeRef,
    },
    Assign {
        name: Ident,
        value: ExpressionNodeRef,
    },
    Call {
        callee: ExpressionNodeRef,
        arguments: Vec<ExpressionNodeRef>,
        /// Line of the closing parenthesis.
        line: u32,
    },
}

impl ExpressionNode {
    /// The variable this node names, if it can stand on the left of `=`.
    pub fn get_l_value(&self) -> Option<&Ident> {
        match self {
            ExpressionNode::Variable(name) => Some(name),
            _ => None,
        }
    }
}

/// An expression tree under construction. Nodes only ever refer to nodes pushed before them.
#[derive(Debug, Clone, Default)]
pub struct IncompleteExpression {
    nodes: Vec<ExpressionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    nodes: Vec<ExpressionNode>,
    root: ExpressionNodeRef,
}

impl IncompleteExpression {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: ExpressionNode) -> ExpressionNodeRef {
        self.nodes.push(node);
        ExpressionNodeRef(self.nodes.len() as u32 - 1)
    }

    pub fn get_node(&self, index: ExpressionNodeRef) -> Option<&ExpressionNode> {
        self.nodes.get(index.0 as usize)
    }

    /// Closes the tree. `root` must come from `push` on this same tree.
    pub fn finish(self, root: ExpressionNodeRef) -> Expression {
        debug_assert!((root.0 as usize) < self.nodes.len());
        Expression {
            nodes: self.nodes,
            root,
        }
    }
}

impl Expression {
    pub fn literal(value: Literal) -> Self {
        let mut tree = IncompleteExpression::new();
        let root = tree.push(ExpressionNode::Literal(value));
        tree.finish(root)
    }

    pub fn get_root_ref(&self) -> ExpressionNodeRef {
        self.root
    }

    pub fn get_root(&self) -> &ExpressionNode {
        self.get_node(self.root)
    }

    pub fn get_node(&self, node: ExpressionNodeRef) -> &ExpressionNode {
        &self.nodes[node.0 as usize]
    }
}
