use std::{fmt, mem};

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{BinOp, Node, Property, Token, TokenKind},
    lexer::{LexError, Lexer, Position},
};

/// Errors that stop a parse. There is no recovery and no partial tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("unexpected end of input at {position}, expected {expected}")]
    UnexpectedEof { expected: String, position: Position },

    #[error("invalid number `{lexeme}` at {position}")]
    InvalidNumber { lexeme: String, position: Position },

    #[error("nesting too deep at {position}")]
    NestingTooDeep { position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::InvalidNumber { position, .. }
            | ParseError::NestingTooDeep { position } => *position,
        }
    }
}

/// How deeply values, directives and parenthesized expressions may nest.
pub const MAX_DEPTH: usize = 256;

/// Recursive-descent parser with one token of lookahead.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    peek_token: Token,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let peek_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            peek_token,
            depth: 0,
        })
    }

    /// Shifts the lookahead into the current token and returns the token
    /// that was current.
    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        let peek = mem::replace(&mut self.peek_token, next);
        Ok(mem::replace(&mut self.current_token, peek))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_token.is(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if !self.check(kind) {
            return Err(self.unexpected(kind));
        }
        self.advance()
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::NestingTooDeep {
                position: self.current_token.position(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn unexpected(&self, expected: impl fmt::Display) -> ParseError {
        let token = &self.current_token;
        match token.kind {
            TokenKind::Eof => ParseError::UnexpectedEof {
                expected: expected.to_string(),
                position: token.position(),
            },
            TokenKind::Illegal => ParseError::Lex(LexError::IllegalCharacter {
                found: token.text.clone(),
                position: token.position(),
            }),
            _ => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.to_string(),
                position: token.position(),
            },
        }
    }

    /// Parses a complete template.
    ///
    /// Returns `None` for input without tokens. Anything after the root
    /// value is an error.
    pub fn parse(&mut self) -> Result<Option<Node>, ParseError> {
        if self.check(TokenKind::Eof) {
            return Ok(None);
        }
        let node = self.parse_value()?;
        self.expect(TokenKind::Eof)?;
        Ok(Some(node))
    }

    /// Parses one value: a JSON literal or a directive.
    ///
    /// Fails with [`ParseError::NestingTooDeep`] past [`MAX_DEPTH`] levels.
    pub fn parse_value(&mut self) -> Result<Node, ParseError> {
        self.enter()?;
        let value = self.parse_value_inner();
        self.leave();
        value
    }

    fn parse_value_inner(&mut self) -> Result<Node, ParseError> {
        match self.current_token.kind {
            TokenKind::LeftBrace => self.parse_object(),
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::String
            | TokenKind::Number
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => self.parse_literal(),
            TokenKind::LeftParen => self.parse_enclosed_template(),
            TokenKind::TemplateStart => self.parse_template(),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_literal(&mut self) -> Result<Node, ParseError> {
        let token = &self.current_token;
        let node = match token.kind {
            TokenKind::String => Node::String(token.text.clone()),
            TokenKind::Number => {
                let value = token
                    .text
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber {
                        position: token.position(),
                        lexeme: token.text.clone(),
                    })?;
                Node::Number(value)
            }
            TokenKind::True => Node::Boolean(true),
            TokenKind::False => Node::Boolean(false),
            TokenKind::Null => Node::Null,
            _ => return Err(self.unexpected("a literal")),
        };
        self.advance()?;
        Ok(node)
    }

    fn parse_object(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::LeftBrace)?;
        let mut properties = vec![];

        if self.check(TokenKind::RightBrace) {
            self.advance()?;
            return Ok(Node::Object(properties));
        }

        loop {
            if !self.check(TokenKind::String) {
                return Err(self.unexpected("string key"));
            }
            let key = self.advance()?.text;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value()?;
            properties.push(Property::new(key, value));

            match self.current_token.kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                TokenKind::RightBrace => {
                    self.advance()?;
                    return Ok(Node::Object(properties));
                }
                _ => return Err(self.unexpected("`,` or `}`")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::LeftBracket)?;
        let mut elements = vec![];

        if self.check(TokenKind::RightBracket) {
            self.advance()?;
            return Ok(Node::Array(elements));
        }

        loop {
            elements.push(self.parse_value()?);

            match self.current_token.kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                TokenKind::RightBracket => {
                    self.advance()?;
                    return Ok(Node::Array(elements));
                }
                _ => return Err(self.unexpected("`,` or `]`")),
            }
        }
    }

    /// `( {{ ... }} )`
    fn parse_enclosed_template(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        if !self.check(TokenKind::TemplateStart) {
            return Err(self.unexpected(TokenKind::TemplateStart));
        }
        let node = self.parse_template()?;
        self.expect(TokenKind::RightParen)?;
        Ok(node)
    }

    /// Dispatches on the token after `{{`.
    fn parse_template(&mut self) -> Result<Node, ParseError> {
        match self.peek_token.kind {
            TokenKind::Range => self.parse_range(),
            TokenKind::If => self.parse_if(),
            _ => self.parse_template_content(),
        }
    }

    /// `{{ range i, x := path }} body {{ end }}`
    fn parse_range(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::TemplateStart)?;
        self.expect(TokenKind::Range)?;
        let index_ident = self.expect(TokenKind::Identifier)?.text;
        self.expect(TokenKind::Comma)?;
        let value_ident = self.expect(TokenKind::Identifier)?.text;
        self.expect(TokenKind::Assign)?;
        let iterable = self.parse_path()?;
        self.expect(TokenKind::TemplateEnd)?;

        debug!(
            target: "kriti::parser",
            index = %index_ident,
            value = %value_ident,
            iterable = ?iterable,
            "range directive"
        );

        let body = self.parse_value()?;
        self.expect(TokenKind::TemplateStart)?;
        self.expect(TokenKind::End)?;
        self.expect(TokenKind::TemplateEnd)?;

        Ok(Node::Range {
            index_ident,
            value_ident,
            iterable: Box::new(iterable),
            body: Box::new(body),
        })
    }

    /// `{{ if cond }} then {{ else }} otherwise {{ end }}`
    fn parse_if(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::TemplateStart)?;
        self.expect(TokenKind::If)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::TemplateEnd)?;

        debug!(target: "kriti::parser", condition = ?condition, "if directive");

        let then_body = self.parse_value()?;
        self.expect(TokenKind::TemplateStart)?;

        let else_body = if self.check(TokenKind::Else) {
            self.advance()?;
            self.expect(TokenKind::TemplateEnd)?;
            let body = self.parse_value()?;
            self.expect(TokenKind::TemplateStart)?;
            Some(Box::new(body))
        } else {
            if !self.check(TokenKind::End) {
                return Err(self.unexpected("`else` or `end`"));
            }
            None
        };

        self.expect(TokenKind::End)?;
        self.expect(TokenKind::TemplateEnd)?;

        Ok(Node::If {
            condition: Box::new(condition),
            then_body: Box::new(then_body),
            else_body,
        })
    }

    /// `{{ expr }}`
    fn parse_template_content(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::TemplateStart)?;
        let expr = self.parse_expression()?;
        self.expect(TokenKind::TemplateEnd)?;
        Ok(expr)
    }

    /// `$` or an identifier, followed by `.`-separated identifiers.
    fn parse_path(&mut self) -> Result<Node, ParseError> {
        let mut segments = vec![];

        match self.current_token.kind {
            TokenKind::Dollar => {
                self.advance()?;
                segments.push("$".to_string());
            }
            TokenKind::Identifier => segments.push(self.advance()?.text),
            _ => return Err(self.unexpected("`$` or identifier")),
        }

        while self.check(TokenKind::Dot) {
            self.advance()?;
            segments.push(self.expect(TokenKind::Identifier)?.text);
        }

        Ok(Node::Path(segments))
    }

    pub fn parse_expression(&mut self) -> Result<Node, ParseError> {
        self.parse_coalesce()
    }

    fn parse_coalesce(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_or()?;

        while self.check(TokenKind::Coalesce) {
            self.advance()?;
            let right = self.parse_or()?;
            left = binary(BinOp::NullCoalesce, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(TokenKind::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_comparison()?;

        while self.check(TokenKind::And) {
            self.advance()?;
            let right = self.parse_comparison()?;
            left = binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    /// Comparisons do not chain: `a < b < c` stops after `a < b`.
    fn parse_comparison(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_call()?;

        if let Some(op) = BinOp::comparison(self.current_token.kind) {
            self.advance()?;
            let right = self.parse_call()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// `name arg arg ...`, only when a bare identifier is directly followed
    /// by something that starts an argument.
    fn parse_call(&mut self) -> Result<Node, ParseError> {
        if self.check(TokenKind::Identifier) && starts_atom(self.peek_token.kind) {
            let name = self.advance()?.text;
            let mut args = vec![];
            while starts_atom(self.current_token.kind) {
                args.push(self.parse_atom()?);
            }
            return Ok(Node::Call { name, args });
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        match self.current_token.kind {
            TokenKind::Dollar | TokenKind::Identifier => self.parse_path(),
            TokenKind::String
            | TokenKind::Number
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => self.parse_literal(),
            TokenKind::LeftParen => {
                self.advance()?;
                self.enter()?;
                let expr = self.parse_expression();
                self.leave();
                let expr = expr?;
                self.expect(TokenKind::RightParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}

fn binary(op: BinOp, left: Node, right: Node) -> Node {
    Node::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn starts_atom(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Dollar
            | TokenKind::String
            | TokenKind::Number
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::LeftParen
    )
}

/// Lexes and parses `source` in one go.
pub fn parse(source: &str) -> Result<Option<Node>, ParseError> {
    Parser::new(Lexer::new(source))?.parse()
}
