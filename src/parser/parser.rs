use super::ast::{
    Assignment, BinaryOp, Expression, FunctionDef, Precedence, Program, Statement, UnaryOp,
};
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};
use crate::stack::ensure_sufficient_stack;

/// Recursive-descent parser for Brewin
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Creates a new parser over a scanned token stream
    ///
    /// The stream is expected to end with [`TokenKind::Eof`]; one is appended if missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, String::new(), line, column));
        }
        Parser { tokens, current: 0 }
    }

    /// Parses the tokens into an AST
    pub fn parse(&mut self) -> Result<Program> {
        let mut functions = Vec::new();

        while !self.is_at_end() {
            functions.push(self.parse_function()?);
        }

        Ok(Program { functions })
    }

    /// func name(a, b) { ... }
    fn parse_function(&mut self) -> Result<FunctionDef> {
        if !self.check(&TokenKind::Func) {
            return Err(self.syntax_error(format!(
                "Expected `func`, found {}.\n\nHelp: A Brewin program is a list of function \
                 definitions such as `func main() {{ ... }}`",
                Self::token_kind_name(&self.peek().kind)
            )));
        }
        self.advance();

        let name = self.consume_identifier()?;
        self.consume(TokenKind::LeftParen)?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                params.push(self.consume_identifier()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen)?;

        let statements = self.parse_block()?;

        Ok(FunctionDef {
            name,
            params,
            statements,
        })
    }

    /// { statement* }
    fn parse_block(&mut self) -> Result<Vec<Statement>> {
        self.consume(TokenKind::LeftBrace)?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        self.consume(TokenKind::RightBrace)?;
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Statement> {
        match self.peek().kind.clone() {
            TokenKind::Var => {
                self.advance();
                let name = self.consume_identifier()?;
                self.consume(TokenKind::Semicolon)?;
                Ok(Statement::VarDef { name })
            }
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => {
                self.advance();
                let expression = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume(TokenKind::Semicolon)?;
                Ok(Statement::Return { expression })
            }
            TokenKind::Identifier(name) => {
                if self.peek_next_is(&TokenKind::LeftParen) {
                    self.advance();
                    let args = self.parse_arguments()?;
                    self.consume(TokenKind::Semicolon)?;
                    Ok(Statement::Call { name, args })
                } else {
                    let assignment = self.parse_assignment()?;
                    self.consume(TokenKind::Semicolon)?;
                    Ok(Statement::Assign(assignment))
                }
            }
            other => Err(self.syntax_error(format!(
                "Unexpected token {} at start of statement.\n\n\
                 Help: Expected one of: `var`, `if`, `for`, `return`, an assignment, \
                 or a function call",
                Self::token_kind_name(&other)
            ))),
        }
    }

    /// if (cond) { ... } [else { ... }]
    fn parse_if(&mut self) -> Result<Statement> {
        self.consume(TokenKind::If)?;
        self.consume(TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen)?;

        let statements = self.parse_block()?;
        let else_statements = if self.match_kind(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            statements,
            else_statements,
        })
    }

    /// for (i = 0; i < n; i = i + 1) { ... }
    fn parse_for(&mut self) -> Result<Statement> {
        self.consume(TokenKind::For)?;
        self.consume(TokenKind::LeftParen)?;
        let init = self.parse_assignment()?;
        self.consume(TokenKind::Semicolon)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Semicolon)?;
        let update = self.parse_assignment()?;
        self.consume(TokenKind::RightParen)?;

        let statements = self.parse_block()?;

        Ok(Statement::For {
            init,
            condition,
            update,
            statements,
        })
    }

    fn parse_assignment(&mut self) -> Result<Assignment> {
        let name = self.consume_identifier()?;
        self.consume(TokenKind::Assign)?;
        let expression = self.parse_expression()?;
        Ok(Assignment { name, expression })
    }

    /// ( [expr ("," expr)*] )
    fn parse_arguments(&mut self) -> Result<Vec<Expression>> {
        self.consume(TokenKind::LeftParen)?;

        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen)?;
        Ok(args)
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_binary(Precedence::Or)
    }

    /// Precedence climbing; every binary operator is left-associative
    fn parse_binary(&mut self, min: Precedence) -> Result<Expression> {
        let mut left = self.parse_unary()?;

        while let Some(op) = Self::token_to_binary_op(&self.peek().kind) {
            let precedence = op.precedence();
            if precedence < min {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence.next())?;
            left = Expression::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        ensure_sufficient_stack(|| {
            let op = match self.peek().kind {
                TokenKind::Minus => UnaryOp::Neg,
                TokenKind::Not => UnaryOp::Not,
                _ => return self.parse_primary(),
            };
            self.advance();
            let operand = self.parse_unary()?;
            Ok(Expression::unary(op, operand))
        })
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        match self.peek().kind.clone() {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Expression::IntLiteral(n))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expression::StringLiteral(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::BoolLiteral(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::BoolLiteral(false))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expression::NilLiteral)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LeftParen) {
                    let args = self.parse_arguments()?;
                    Ok(Expression::Call { name, args })
                } else {
                    Ok(Expression::Variable(name))
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(expr)
            }
            other => Err(self.syntax_error(format!(
                "Unexpected token {} in expression.\n\n\
                 Help: Expected one of: number, string, `true`, `false`, `nil`, identifier, \
                 function call, or parenthesized expression",
                Self::token_kind_name(&other)
            ))),
        }
    }

    fn token_to_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
        match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Eq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            TokenKind::And => Some(BinaryOp::And),
            TokenKind::Or => Some(BinaryOp::Or),
            _ => None,
        }
    }

    // Helper methods

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next_is(&self, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.current + 1)
            .map(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
            .unwrap_or(false)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            let message = self.build_error_message(&kind, token);

            Err(Error::SyntaxError {
                line: token.line,
                col: token.column,
                message,
            })
        }
    }

    fn consume_identifier(&mut self) -> Result<String> {
        let token = self.consume(TokenKind::Identifier(String::new()))?;
        match token.kind {
            TokenKind::Identifier(name) => Ok(name),
            _ => Err(Error::syntax(token.line, token.column, "Expected identifier")),
        }
    }

    /// Build a helpful error message with a hint for common mistakes
    fn build_error_message(&self, expected: &TokenKind, got: &Token) -> String {
        let expected_str = Self::token_kind_name(expected);
        let got_str = Self::token_kind_name(&got.kind);

        let mut message = format!("Expected {}, found {}", expected_str, got_str);

        let hint = match (expected, &got.kind) {
            (TokenKind::Semicolon, _) => {
                Some("Every statement ends with `;`, including `var x;` and `return;`.")
            }
            (TokenKind::RightBrace, TokenKind::Eof) => {
                Some("Missing closing `}` for an earlier opening `{`.")
            }
            (TokenKind::RightParen, _) => {
                Some("Missing closing `)` for an earlier opening `(`.")
            }
            (TokenKind::LeftBrace, _) => {
                Some("Function, `if`, `else` and `for` bodies must be enclosed in `{ ... }`.")
            }
            (TokenKind::Identifier(_), kind) if kind.is_keyword() => {
                Some("Keywords cannot be used as variable, parameter or function names.")
            }
            (TokenKind::Identifier(_), _) => Some(
                "Expected a variable name or identifier here.\n\
                      Valid identifiers start with a letter or underscore.",
            ),
            (TokenKind::Assign, _) => {
                Some("`for` loops take plain assignments: `for (i = 0; i < n; i = i + 1)`.")
            }
            _ => None,
        };

        if let Some(hint) = hint {
            message.push_str("\n\nHelp: ");
            message.push_str(hint);
        }

        message
    }

    /// Get a human-readable name for a token kind
    fn token_kind_name(kind: &TokenKind) -> String {
        match kind {
            TokenKind::LeftParen => "`(`".to_string(),
            TokenKind::RightParen => "`)`".to_string(),
            TokenKind::LeftBrace => "`{`".to_string(),
            TokenKind::RightBrace => "`}`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Semicolon => "`;`".to_string(),
            TokenKind::Assign => "`=`".to_string(),
            TokenKind::Integer(_) => "integer".to_string(),
            TokenKind::String(_) => "string".to_string(),
            TokenKind::Identifier(name) if name.is_empty() => "identifier".to_string(),
            TokenKind::Identifier(name) => format!("identifier `{}`", name),
            TokenKind::True | TokenKind::False => "boolean".to_string(),
            TokenKind::Nil => "`nil`".to_string(),
            TokenKind::Func => "`func`".to_string(),
            TokenKind::Var => "`var`".to_string(),
            TokenKind::If => "`if`".to_string(),
            TokenKind::Else => "`else`".to_string(),
            TokenKind::For => "`for`".to_string(),
            TokenKind::Return => "`return`".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("{:?}", kind),
        }
    }

    /// Helper to create a syntax error at current position
    fn syntax_error(&self, message: impl Into<String>) -> Error {
        let token = self.peek();
        Error::syntax(token.line, token.column, message)
    }
}
