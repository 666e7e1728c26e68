use std::fmt;

use crate::lexer::Position;

/// Kind of a lexical token.
///
/// Fixed-form kinds (punctuation, operators, keywords) always carry their
/// canonical literal as token text, see [`TokenKind::literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A character no rule accepts, or a lone `=`, `!`, `&` or `|`
    Illegal,

    /// End of input. Repeats forever once reached.
    Eof,

    // Literals
    /// Field name, binding or function name
    ///
    /// Letters and underscores only, digits are not part of identifiers.
    ///
    /// # Examples
    /// ```text
    /// results
    /// concatName
    /// _internal
    /// ```
    Identifier,

    /// JSON number lexeme
    ///
    /// # Examples
    /// ```text
    /// 0
    /// -12.5
    /// 1.2e-34
    /// ```
    Number,

    /// String literal in single or double quotes
    ///
    /// The token text is the raw content between the quotes with escapes
    /// still in place.
    String,

    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,

    // Delimiters
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,

    /// Binding operator of the range header
    ///
    /// # Example
    /// ```text
    /// {{ range i, x := $.results }}
    /// ```
    Assign,

    // Comparison
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,

    /// Root of the data context
    ///
    /// # Examples
    /// ```text
    /// $
    /// $.results
    /// ```
    Dollar,

    /// `?`, reserved
    Question,
    /// `??`
    Coalesce,
    /// `&&`
    And,
    /// `||`
    Or,

    // Directives
    /// Opens a directive (`{{`)
    TemplateStart,
    /// Closes a directive (`}}`)
    TemplateEnd,

    // Keywords
    /// `if`
    If,
    /// `else`
    Else,
    /// `end`
    End,
    /// `range`
    Range,
}

impl TokenKind {
    /// Canonical text of a fixed-form token, `None` for identifiers,
    /// numbers, strings, illegal characters and EOF.
    pub fn literal(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Illegal | Eof | Identifier | Number | String => return None,
            True => "true",
            False => "false",
            Null => "null",
            LeftParen => "(",
            RightParen => ")",
            LeftBrace => "{",
            RightBrace => "}",
            LeftBracket => "[",
            RightBracket => "]",
            Comma => ",",
            Dot => ".",
            Colon => ":",
            Assign => ":=",
            Eq => "==",
            NotEq => "!=",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            Dollar => "$",
            Question => "?",
            Coalesce => "??",
            And => "&&",
            Or => "||",
            TemplateStart => "{{",
            TemplateEnd => "}}",
            If => "if",
            Else => "else",
            End => "end",
            Range => "range",
        };
        Some(text)
    }

    /// Looks up a keyword, ignoring case.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        match ident.to_ascii_lowercase().as_str() {
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "end" => Some(TokenKind::End),
            "range" => Some(TokenKind::Range),
            "null" => Some(TokenKind::Null),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literal() {
            Some(text) => write!(f, "`{}`", text),
            None => {
                let name = match self {
                    TokenKind::Illegal => "illegal character",
                    TokenKind::Eof => "end of input",
                    TokenKind::Identifier => "identifier",
                    TokenKind::Number => "number",
                    _ => "string",
                };
                f.write_str(name)
            }
        }
    }
}

/// A token produced by the [`Lexer`](crate::Lexer).
///
/// `line` and `column` point at the first character of the token (the
/// opening quote for strings). `offset` is the byte offset where `text`
/// starts, so `&source[offset..offset + text.len()] == text` for every token
/// but EOF and keywords spelled in other than lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize, offset: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
            offset,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Where the token starts, for error reporting.
    ///
    /// For a string token `line` and `column` give the opening quote while
    /// `offset` gives the first byte of `text`, one past the quote.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::Illegal => {
                write!(f, "{} `{}`", self.kind, self.text)
            }
            TokenKind::String => write!(f, "string \"{}\"", self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}
