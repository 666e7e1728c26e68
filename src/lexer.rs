mod cursor;

use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::ast::{Token, TokenKind};
pub use cursor::{Cursor, EOF_CHAR};

/// Location in the template source.
///
/// `line` and `column` are 1-based, `offset` is in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Lexical errors. All of them are fatal to the current parse.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("invalid escape sequence `\\{found}` at {position}")]
    InvalidEscape { found: char, position: Position },

    #[error("invalid unicode escape sequence at {position}: `\\u` must be followed by 4 hex digits")]
    InvalidUnicodeEscape { position: Position },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid number `{lexeme}` at {position}")]
    InvalidNumber { lexeme: String, position: Position },

    #[error("illegal character `{found}` at {position}")]
    IllegalCharacter { found: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::InvalidEscape { position, .. }
            | LexError::InvalidUnicodeEscape { position }
            | LexError::UnterminatedString { position }
            | LexError::InvalidNumber { position, .. }
            | LexError::IllegalCharacter { position, .. } => *position,
        }
    }
}

/// Scanning mode. Decides whether `{{` and `}}` are directive delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerMode {
    /// Literal JSON
    Normal,
    /// Inside `{{ ... }}`
    Expr,
}

/// Where the token being scanned started.
#[derive(Clone, Copy)]
struct Mark {
    position: usize,
    line: usize,
    column: usize,
    offset: usize,
}

impl Mark {
    fn position(self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }
}

/// Pull-based tokenizer for Kriti templates.
pub struct Lexer {
    cursor: Cursor,
    mode: LexerMode,
    /// The previous token was `.`, so a following name is a path segment
    after_dot: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            cursor: Cursor::new(input),
            mode: LexerMode::Normal,
            after_dot: false,
        }
    }

    pub fn mode(&self) -> LexerMode {
        self.mode
    }

    /// Produces the next token. Once the input is exhausted every call
    /// returns an EOF token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = self.scan_token()?;
        self.after_dot = token.is(TokenKind::Dot);
        trace!(
            target: "kriti::lexer",
            kind = ?token.kind,
            text = %token.text,
            line = token.line,
            column = token.column,
            "token"
        );
        Ok(token)
    }

    fn mark(&self) -> Mark {
        Mark {
            position: self.cursor.position(),
            line: self.cursor.line(),
            column: self.cursor.column(),
            offset: self.cursor.offset(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.current(), ' ' | '\t' | '\r' | '\n') {
            self.cursor.advance();
        }
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.mark();

        if self.cursor.is_eof() {
            return Ok(Token::new(
                TokenKind::Eof,
                EOF_CHAR.to_string(),
                start.line,
                start.column,
                start.offset,
            ));
        }

        let kind = match self.cursor.current() {
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            ',' => self.single(TokenKind::Comma),
            '.' => self.single(TokenKind::Dot),
            '$' => self.single(TokenKind::Dollar),
            '{' => {
                if self.mode == LexerMode::Normal && self.cursor.next() == '{' {
                    self.mode = LexerMode::Expr;
                    self.double(TokenKind::TemplateStart)
                } else {
                    self.single(TokenKind::LeftBrace)
                }
            }
            '}' => {
                if self.mode == LexerMode::Expr && self.cursor.next() == '}' {
                    self.mode = LexerMode::Normal;
                    self.double(TokenKind::TemplateEnd)
                } else {
                    self.single(TokenKind::RightBrace)
                }
            }
            ':' => self.either('=', TokenKind::Assign, TokenKind::Colon),
            '=' => self.either('=', TokenKind::Eq, TokenKind::Illegal),
            '!' => self.either('=', TokenKind::NotEq, TokenKind::Illegal),
            '<' => self.either('=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.either('=', TokenKind::GtEq, TokenKind::Gt),
            '?' => self.either('?', TokenKind::Coalesce, TokenKind::Question),
            '&' => self.either('&', TokenKind::And, TokenKind::Illegal),
            '|' => self.either('|', TokenKind::Or, TokenKind::Illegal),
            '"' | '\'' => return self.read_string(start),
            ch if is_identifier_char(ch) => return Ok(self.read_identifier(start)),
            ch if ch.is_ascii_digit() || ch == '-' => return self.read_number(start),
            _ => self.single(TokenKind::Illegal),
        };

        let text = match kind.literal() {
            Some(literal) => literal.to_string(),
            None => self.cursor.text_since(start.position),
        };
        Ok(Token::new(kind, text, start.line, start.column, start.offset))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    fn double(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        self.cursor.advance();
        kind
    }

    /// `matched` if the character after the current one is `second`,
    /// otherwise `fallback` covering only the current character.
    fn either(&mut self, second: char, matched: TokenKind, fallback: TokenKind) -> TokenKind {
        if self.cursor.next() == second {
            self.double(matched)
        } else {
            self.single(fallback)
        }
    }

    fn read_identifier(&mut self, start: Mark) -> Token {
        while is_identifier_char(self.cursor.current()) {
            self.cursor.advance();
        }

        let ident = self.cursor.text_since(start.position);
        // `$.range` and `x.Null` name object keys, not keywords
        let keyword = if self.after_dot {
            None
        } else {
            TokenKind::keyword(&ident)
        };
        let (kind, text) = match keyword {
            Some(kind) => (kind, ident.to_ascii_lowercase()),
            None => (TokenKind::Identifier, ident),
        };
        Token::new(kind, text, start.line, start.column, start.offset)
    }

    /// Scans a quoted string. Escapes are validated but left in the text.
    fn read_string(&mut self, start: Mark) -> Result<Token, LexError> {
        let quote = self.cursor.current();
        self.cursor.advance(); // opening quote

        let content_start = self.cursor.position();
        let content_offset = self.cursor.offset();

        loop {
            if self.cursor.is_eof() {
                return Err(LexError::UnterminatedString {
                    position: start.position(),
                });
            }
            match self.cursor.current() {
                ch if ch == quote => break,
                '\\' => self.read_escape()?,
                _ => self.cursor.advance(),
            }
        }

        let text = self.cursor.text_since(content_start);
        self.cursor.advance(); // closing quote

        Ok(Token::new(
            TokenKind::String,
            text,
            start.line,
            start.column,
            content_offset,
        ))
    }

    fn read_escape(&mut self) -> Result<(), LexError> {
        let position = self.mark().position();
        self.cursor.advance(); // backslash

        match self.cursor.current() {
            '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => self.cursor.advance(),
            'u' => {
                self.cursor.advance();
                for _ in 0..4 {
                    if !self.cursor.current().is_ascii_hexdigit() {
                        return Err(LexError::InvalidUnicodeEscape { position });
                    }
                    self.cursor.advance();
                }
            }
            // reported as unterminated by the caller
            _ if self.cursor.is_eof() => {}
            found => return Err(LexError::InvalidEscape { found, position }),
        }
        Ok(())
    }

    /// Scans a JSON number: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
    fn read_number(&mut self, start: Mark) -> Result<Token, LexError> {
        if self.cursor.current() == '-' {
            self.cursor.advance();
        }

        match self.cursor.current() {
            '0' => {
                self.cursor.advance();
                if self.cursor.current().is_ascii_digit() {
                    return Err(self.invalid_number(start));
                }
            }
            ch if ch.is_ascii_digit() => self.skip_digits(),
            _ => return Err(self.invalid_number(start)),
        }

        if self.cursor.current() == '.' {
            self.cursor.advance();
            if !self.cursor.current().is_ascii_digit() {
                return Err(self.invalid_number(start));
            }
            self.skip_digits();
        }

        if matches!(self.cursor.current(), 'e' | 'E') {
            self.cursor.advance();
            if matches!(self.cursor.current(), '+' | '-') {
                self.cursor.advance();
            }
            if !self.cursor.current().is_ascii_digit() {
                return Err(self.invalid_number(start));
            }
            self.skip_digits();
        }

        if is_number_char(self.cursor.current()) {
            return Err(self.invalid_number(start));
        }

        let text = self.cursor.text_since(start.position);
        Ok(Token::new(
            TokenKind::Number,
            text,
            start.line,
            start.column,
            start.offset,
        ))
    }

    fn skip_digits(&mut self) {
        while self.cursor.current().is_ascii_digit() {
            self.cursor.advance();
        }
    }

    /// Consumes the rest of a malformed number so the error shows all of it.
    fn invalid_number(&mut self, start: Mark) -> LexError {
        while is_number_char(self.cursor.current()) {
            self.cursor.advance();
        }
        LexError::InvalidNumber {
            lexeme: self.cursor.text_since(start.position),
            position: start.position(),
        }
    }
}

/// Tokenizes the whole input, EOF token included.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token()?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_number_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '+' | '-')
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("if ELSE End range null True false");
    let expected = [
        (TokenKind::If, "if"),
        (TokenKind::Else, "else"),
        (TokenKind::End, "end"),
        (TokenKind::Range, "range"),
        (TokenKind::Null, "null"),
        (TokenKind::True, "true"),
        (TokenKind::False, "false"),
        (TokenKind::Eof, "\0"),
    ];
    for (kind, text) in expected {
        let token = lexer.next_token().unwrap();
        assert_eq!((token.kind, token.text.as_str()), (kind, text));
    }
}

#[test]
fn test_mode_switching() {
    let mut lexer = Lexer::new("{{ x }}}");
    assert_eq!(lexer.mode(), LexerMode::Normal);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::TemplateStart);
    assert_eq!(lexer.mode(), LexerMode::Expr);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::TemplateEnd);
    assert_eq!(lexer.mode(), LexerMode::Normal);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::RightBrace);
}
