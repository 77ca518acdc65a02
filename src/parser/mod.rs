mod error;
pub mod expression;
pub mod formatter;
pub mod statement;

pub use error::{ParserError, ParserErrorKind};
use expression::{
    BinaryOperator, Expression, ExpressionNode, ExpressionNodeRef, IncompleteExpression, Literal,
    LogicalOperator, UnaryOperator,
};
use statement::{Declaration, FunctionDecl, NonDeclaration, Program, Statement};
use crate::lexer::{Token, TokenKind};
use crate::string::Ident;
use std::rc::Rc;

/// Most parameters a function may declare and most arguments a call may pass.
pub const MAX_ARITY: usize = 255;
/// Most nested expressions, statements or function declarations open at once.
pub const MAX_NESTING: usize = 200;

type ParseResult<T> = Result<T, ParserError>;
type Rule = fn(&mut Parser, &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// Errors that were reported without abandoning the construct being parsed.
    errors: Vec<ParserError>,
    function_depth: usize,
    nesting: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        match tokens.last() {
            Some(Token {
                kind: TokenKind::Eof,
                ..
            }) => {}
            Some(last) => {
                let eof = Token::eof(last.span.end(), last.line);
                tokens.push(eof);
            }
            None => tokens.push(Token::eof(0, 1)),
        }
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
            function_depth: 0,
            nesting: 0,
        }
    }

    /// Parses declarations until the end of input, recovering from every syntax error.
    pub fn parse(mut self) -> Program {
        let mut declarations = Vec::new();
        while !self.is_at_end() {
            declarations.push(self.declaration());
        }
        tracing::trace!(
            declarations = declarations.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        Program {
            declarations,
            errors: self.errors,
        }
    }

    /// Parses a source holding exactly one expression. Any error, including ones that would
    /// normally be recovered from, fails the whole parse.
    pub fn parse_expression(mut self) -> Result<Expression, Vec<ParserError>> {
        let expression = self.expression().and_then(|expr| {
            self.expect(TokenKind::Eof, "Expect end of expression.")?;
            Ok(expr)
        });
        match expression {
            Ok(expr) if self.errors.is_empty() => Ok(expr),
            Ok(_) => Err(self.errors),
            Err(error) => {
                self.errors.push(error);
                Err(self.errors)
            }
        }
    }
}

// Token cursor
impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn eat_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, expected: TokenKind, message: &'static str) -> ParseResult<Token> {
        match self.eat_if(expected) {
            Some(token) => Ok(token),
            None => Err(ParserError::new(
                ParserErrorKind::UnexpectedToken { expected, message },
                self.peek(),
            )),
        }
    }

    /// Records an error without unwinding.
    fn report(&mut self, kind: ParserErrorKind, token: &Token) {
        let error = ParserError::new(kind, token);
        tracing::debug!(code = error.code(), line = error.line(), "syntax error");
        self.errors.push(error);
    }

    /// Runs `rule` one nesting level deeper, failing once `MAX_NESTING` levels are open.
    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.nesting >= MAX_NESTING {
            return Err(ParserError::new(
                ParserErrorKind::TooDeep { limit: MAX_NESTING },
                self.peek(),
            ));
        }
        self.nesting += 1;
        let result = rule(self);
        self.nesting -= 1;
        result
    }

    /// Skips to the next likely declaration boundary.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon || self.peek().kind.starts_statement()
            {
                return;
            }
            self.advance();
        }
    }
}

// Expressions
impl Parser {
    fn expression(&mut self) -> ParseResult<Expression> {
        let mut tree = IncompleteExpression::new();
        let root = self.assignment(&mut tree)?;
        Ok(tree.finish(root))
    }

    fn assignment(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        self.nested(|parser| parser.assignment_rule(tree))
    }

    fn assignment_rule(
        &mut self,
        tree: &mut IncompleteExpression,
    ) -> ParseResult<ExpressionNodeRef> {
        let target = self.logic_or(tree)?;

        let Some(equals) = self.eat_if(TokenKind::Equal) else {
            return Ok(target);
        };
        let value = self.assignment(tree)?;

        let name = tree
            .get_node(target)
            .and_then(ExpressionNode::get_l_value)
            .cloned();
        match name {
            Some(name) => Ok(tree.push(ExpressionNode::Assign { name, value })),
            None => {
                self.report(ParserErrorKind::InvalidLValue, &equals);
                Ok(target)
            }
        }
    }

    fn logic_or(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        let mut lhs = self.logic_and(tree)?;
        while self.eat_if(TokenKind::KeywordOr).is_some() {
            let rhs = self.logic_and(tree)?;
            lhs = tree.push(ExpressionNode::Logical {
                operator: LogicalOperator::Or,
                lhs,
                rhs,
            });
        }
        Ok(lhs)
    }

    fn logic_and(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        let mut lhs = self.equality(tree)?;
        while self.eat_if(TokenKind::KeywordAnd).is_some() {
            let rhs = self.equality(tree)?;
            lhs = tree.push(ExpressionNode::Logical {
                operator: LogicalOperator::And,
                lhs,
                rhs,
            });
        }
        Ok(lhs)
    }

    /// A left-associative chain of `operand (op operand)*` for the given operator tokens.
    fn binary_level(
        &mut self,
        tree: &mut IncompleteExpression,
        operators: &[TokenKind],
        operand: Rule,
    ) -> ParseResult<ExpressionNodeRef> {
        let mut lhs = operand(self, tree)?;
        while operators.contains(&self.peek().kind) {
            let token = self.advance();
            let operator = BinaryOperator::from_token(token.kind)
                .expect("Binary levels only list binary operator tokens.");
            let rhs = operand(self, tree)?;
            lhs = tree.push(ExpressionNode::Binary {
                operator,
                lhs,
                rhs,
                line: token.line,
            });
        }
        Ok(lhs)
    }

    fn equality(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        self.binary_level(
            tree,
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Parser::comparison,
        )
    }

    fn comparison(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        self.binary_level(
            tree,
            &[
                TokenKind::GreaterThan,
                TokenKind::GreaterThanEqual,
                TokenKind::LessThan,
                TokenKind::LessThanEqual,
            ],
            Parser::term,
        )
    }

    fn term(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        self.binary_level(tree, &[TokenKind::Minus, TokenKind::Plus], Parser::factor)
    }

    fn factor(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        self.binary_level(tree, &[TokenKind::Slash, TokenKind::Star], Parser::unary)
    }

    fn unary(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        match UnaryOperator::from_token(self.peek().kind) {
            Some(operator) => {
                let token = self.advance();
                let rhs = self.nested(|parser| parser.unary(tree))?;
                Ok(tree.push(ExpressionNode::Unary {
                    operator,
                    rhs,
                    line: token.line,
                }))
            }
            None => self.call(tree),
        }
    }

    fn call(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        let mut callee = self.primary(tree)?;
        while self.eat_if(TokenKind::LeftParenthesis).is_some() {
            callee = self.finish_call(tree, callee)?;
        }
        Ok(callee)
    }

    fn finish_call(
        &mut self,
        tree: &mut IncompleteExpression,
        callee: ExpressionNodeRef,
    ) -> ParseResult<ExpressionNodeRef> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    let token = self.peek().clone();
                    self.report(
                        ParserErrorKind::TooManyArguments { limit: MAX_ARITY },
                        &token,
                    );
                }
                arguments.push(self.assignment(tree)?);
                if self.eat_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let paren = self.expect(
            TokenKind::RightParenthesis,
            "Expect ')' after arguments.",
        )?;
        Ok(tree.push(ExpressionNode::Call {
            callee,
            arguments,
            line: paren.line,
        }))
    }

    fn primary(&mut self, tree: &mut IncompleteExpression) -> ParseResult<ExpressionNodeRef> {
        let token = self.peek().clone();
        let node = match token.kind {
            TokenKind::KeywordFalse => ExpressionNode::Literal(Literal::Bool(false)),
            TokenKind::KeywordTrue => ExpressionNode::Literal(Literal::Bool(true)),
            TokenKind::KeywordNil => ExpressionNode::Literal(Literal::Nil),
            TokenKind::NumericLiteral | TokenKind::StringLiteral => {
                let literal = token
                    .literal
                    .clone()
                    .expect("Literal tokens always carry their value.");
                ExpressionNode::Literal(literal.into())
            }
            TokenKind::Ident => ExpressionNode::Variable(Ident::from(&token)),
            TokenKind::LeftParenthesis => {
                self.advance();
                let inner = self.assignment(tree)?;
                self.expect(
                    TokenKind::RightParenthesis,
                    "Expect ')' after expression.",
                )?;
                return Ok(tree.push(ExpressionNode::Group { inner }));
            }
            _ => return Err(ParserError::new(ParserErrorKind::NonExpression, &token)),
        };
        self.advance();
        Ok(tree.push(node))
    }
}

// Statements
impl Parser {
    /// Returns `None` when the declaration had to be abandoned.
    fn declaration(&mut self) -> Option<Statement> {
        let result = if self.eat_if(TokenKind::KeywordVar).is_some() {
            self.var_declaration().map(Statement::Declaration)
        } else if self.eat_if(TokenKind::KeywordFun).is_some() {
            self.nested(Parser::function)
                .map(|decl| Statement::Declaration(Declaration::Function(Rc::new(decl))))
        } else {
            self.statement().map(Statement::NonDeclaration)
        };

        match result {
            Ok(statement) => Some(statement),
            Err(error) => {
                tracing::debug!(code = error.code(), line = error.line(), "syntax error");
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> ParseResult<Declaration> {
        let name = self.expect(TokenKind::Ident, "Expect variable name.")?;
        let initial = match self.eat_if(TokenKind::Equal) {
            Some(_) => Some(self.expression()?),
            None => None,
        };
        self.expect(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Declaration::Variable {
            name: Ident::from(&name),
            initial,
        })
    }

    fn function(&mut self) -> ParseResult<FunctionDecl> {
        let name = self.expect(TokenKind::Ident, "Expect function name.")?;
        self.expect(
            TokenKind::LeftParenthesis,
            "Expect '(' after function name.",
        )?;

        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                if parameters.len() >= MAX_ARITY {
                    let token = self.peek().clone();
                    self.report(
                        ParserErrorKind::TooManyParameters { limit: MAX_ARITY },
                        &token,
                    );
                }
                let parameter = self.expect(TokenKind::Ident, "Expect parameter name.")?;
                parameters.push(Ident::from(&parameter));
                if self.eat_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParenthesis, "Expect ')' after parameters.")?;
        self.expect(TokenKind::LeftBrace, "Expect '{' before function body.")?;

        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;

        Ok(FunctionDecl {
            name: Ident::from(&name),
            parameters,
            body: body?,
        })
    }

    fn statement(&mut self) -> ParseResult<NonDeclaration> {
        self.nested(Parser::statement_rule)
    }

    fn statement_rule(&mut self) -> ParseResult<NonDeclaration> {
        match self.peek().kind {
            TokenKind::KeywordFor => {
                self.advance();
                self.for_statement()
            }
            TokenKind::KeywordIf => {
                self.advance();
                self.if_statement()
            }
            TokenKind::KeywordPrint => {
                self.advance();
                let value = self.expression()?;
                self.expect(TokenKind::Semicolon, "Expect ';' after value.")?;
                Ok(NonDeclaration::Print(value))
            }
            TokenKind::KeywordReturn => {
                let keyword = self.advance();
                self.return_statement(keyword)
            }
            TokenKind::KeywordWhile => {
                self.advance();
                self.while_statement()
            }
            TokenKind::LeftBrace => {
                self.advance();
                Ok(NonDeclaration::Block(self.block()?))
            }
            _ => self.expression_statement(),
        }
    }

    /// Parses the rest of a block after its `{`.
    fn block(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }
        self.expect(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<NonDeclaration> {
        let expr = self.expression()?;
        self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(NonDeclaration::Expression(expr))
    }

    fn if_statement(&mut self) -> ParseResult<NonDeclaration> {
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.expect(
            TokenKind::RightParenthesis,
            "Expect ')' after if condition.",
        )?;

        let success = Box::new(self.statement()?);
        let failure = match self.eat_if(TokenKind::KeywordElse) {
            Some(_) => Some(Box::new(self.statement()?)),
            None => None,
        };
        Ok(NonDeclaration::If {
            condition,
            success,
            failure,
        })
    }

    fn while_statement(&mut self) -> ParseResult<NonDeclaration> {
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RightParenthesis, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(NonDeclaration::While { condition, body })
    }

    /// `for` has no node of its own and is rewritten into a `while` loop.
    fn for_statement(&mut self) -> ParseResult<NonDeclaration> {
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after 'for'.")?;

        let initializer = if self.eat_if(TokenKind::Semicolon).is_some() {
            None
        } else if self.eat_if(TokenKind::KeywordVar).is_some() {
            Some(Statement::Declaration(self.var_declaration()?))
        } else {
            Some(Statement::NonDeclaration(self.expression_statement()?))
        };

        let condition = match self.check(TokenKind::Semicolon) {
            true => None,
            false => Some(self.expression()?),
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = match self.check(TokenKind::RightParenthesis) {
            true => None,
            false => Some(self.expression()?),
        };
        self.expect(
            TokenKind::RightParenthesis,
            "Expect ')' after for clauses.",
        )?;

        let mut body = self.statement()?;
        if let Some(increment) = increment {
            body = NonDeclaration::Block(vec![
                Statement::NonDeclaration(body),
                Statement::NonDeclaration(NonDeclaration::Expression(increment)),
            ]);
        }
        let condition = condition.unwrap_or_else(|| Expression::literal(Literal::Bool(true)));
        let mut body = NonDeclaration::While {
            condition,
            body: Box::new(body),
        };
        if let Some(initializer) = initializer {
            body = NonDeclaration::Block(vec![initializer, Statement::NonDeclaration(body)]);
        }
        Ok(body)
    }

    fn return_statement(&mut self, keyword: Token) -> ParseResult<NonDeclaration> {
        if self.function_depth == 0 {
            self.report(ParserErrorKind::NonFunctionReturn, &keyword);
        }
        let value = match self.check(TokenKind::Semicolon) {
            true => None,
            false => Some(self.expression()?),
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(NonDeclaration::Return {
            value,
            line: keyword.line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::scan;

    fn parse(source: &str) -> Program {
        Parser::new(scan(source).tokens).parse()
    }

    fn messages(program: &Program) -> Vec<String> {
        program.errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn missing_eof_is_appended() {
        let parser = Parser::new(Vec::new());
        assert!(parser.is_at_end());
    }

    #[test]
    fn recovers_after_bad_declaration() {
        let program = parse("var = 1;\nprint 2;");
        assert_eq!(
            messages(&program),
            vec!["[line 1] Error at '=': Expect variable name."]
        );
        assert_eq!(program.iter().count(), 1);
        assert_eq!(program.declarations.len(), 2);
    }

    #[test]
    fn missing_semicolon_reported_at_end() {
        let program = parse("print 1");
        assert_eq!(
            messages(&program),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
    }

    #[test]
    fn invalid_assignment_target_keeps_statement() {
        let program = parse("a + b = c;");
        assert_eq!(
            messages(&program),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
        assert_eq!(program.iter().count(), 1);
    }

    #[test]
    fn top_level_return_is_reported() {
        let program = parse("return 1;");
        assert_eq!(
            messages(&program),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
        assert!(parse("fun f() { return 1; }").errors.is_empty());
    }

    #[test]
    fn for_loop_is_rewritten_as_while() {
        let program = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!program.has_errors());
        let Some(Statement::NonDeclaration(NonDeclaration::Block(outer))) = program.iter().next()
        else {
            panic!("expected a block around the loop");
        };
        assert!(matches!(
            outer[0],
            Statement::Declaration(Declaration::Variable { .. })
        ));
        let Statement::NonDeclaration(NonDeclaration::While { body, .. }) = &outer[1] else {
            panic!("expected a while loop");
        };
        assert!(matches!(**body, NonDeclaration::Block(ref inner) if inner.len() == 2));
    }

    #[test]
    fn empty_for_clauses_loop_forever() {
        let program = parse("for (;;) {}");
        let Some(Statement::NonDeclaration(NonDeclaration::While { condition, .. })) =
            program.iter().next()
        else {
            panic!("expected a bare while loop");
        };
        assert_eq!(
            condition.get_root(),
            &ExpressionNode::Literal(Literal::Bool(true))
        );
    }

    #[test]
    fn too_many_parameters_is_not_fatal() {
        let parameters: Vec<String> = (0..256).map(|i| format!("p{i}")).collect();
        let source = format!("fun f({}) {{}}", parameters.join(", "));
        let program = parse(&source);
        assert_eq!(program.errors.len(), 1);
        assert_eq!(
            program.errors[0].kind,
            ParserErrorKind::TooManyParameters { limit: 255 }
        );
        assert_eq!(program.iter().count(), 1);
    }

    #[test]
    fn too_many_arguments_is_not_fatal() {
        let arguments: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", arguments.join(", "));
        let program = parse(&source);
        assert_eq!(program.errors.len(), 1);
        assert_eq!(
            program.errors[0].kind,
            ParserErrorKind::TooManyArguments { limit: 255 }
        );
        assert_eq!(program.errors[0].token.lexeme, "255");
        assert_eq!(program.iter().count(), 1);
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let depth = 20_000;
        let source = format!("print {}1{};\nprint 2;", "(".repeat(depth), ")".repeat(depth));
        let program = parse(&source);
        assert_eq!(program.errors.len(), 1);
        assert_eq!(
            program.errors[0].kind,
            ParserErrorKind::TooDeep { limit: MAX_NESTING }
        );
        assert_eq!(program.iter().count(), 1);

        let source = format!("{}print 1;{}", "{".repeat(depth), "}".repeat(depth));
        assert!(parse(&source)
            .errors
            .iter()
            .any(|e| e.kind == ParserErrorKind::TooDeep { limit: MAX_NESTING }));
    }

    #[test]
    fn nesting_below_the_limit_parses() {
        let source = format!("print {}1{};", "-(".repeat(60), ")".repeat(60));
        assert!(!parse(&source).has_errors());
    }
}
