/// Character returned once the cursor has run past the end of the input.
pub const EOF_CHAR: char = '\0';

/// Character-level scanner over the template source.
///
/// Tracks the char index, byte offset and 1-based line/column of the current
/// character. Reading past the end yields [`EOF_CHAR`] rather than failing.
#[derive(Debug, Clone)]
pub struct Cursor {
    input: Vec<char>,
    position: usize,
    offset: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    pub fn new(input: &str) -> Self {
        Cursor {
            input: input.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn current(&self) -> char {
        self.peek(0)
    }

    pub fn next(&self) -> char {
        self.peek(1)
    }

    fn peek(&self, ahead: usize) -> char {
        self.input
            .get(self.position + ahead)
            .copied()
            .unwrap_or(EOF_CHAR)
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Moves past the current character.
    ///
    /// `\n` and a `\r` not followed by `\n` start a new line; in `\r\n` the
    /// `\n` does.
    pub fn advance(&mut self) {
        let Some(&ch) = self.input.get(self.position) else {
            return;
        };

        self.position += 1;
        self.offset += ch.len_utf8();

        match ch {
            '\n' => self.newline(),
            '\r' if self.current() != '\n' => self.newline(),
            _ => self.column += 1,
        }
    }

    fn newline(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Index of the current character, in chars.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Byte offset of the current character.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Text from char index `start` up to the current character.
    pub fn text_since(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_sentinel() {
        let mut cursor = Cursor::new("a");
        assert_eq!(cursor.current(), 'a');
        assert_eq!(cursor.next(), EOF_CHAR);
        cursor.advance();
        assert!(cursor.is_eof());
        assert_eq!(cursor.current(), EOF_CHAR);
        cursor.advance();
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_line_endings() {
        let mut cursor = Cursor::new("a\nb\r\nc\rd \te");
        let mut seen = vec![];
        while !cursor.is_eof() {
            let ch = cursor.current();
            if ch.is_alphabetic() {
                seen.push((ch, cursor.line(), cursor.column()));
            }
            cursor.advance();
        }
        assert_eq!(
            seen,
            vec![('a', 1, 1), ('b', 2, 1), ('c', 3, 1), ('d', 4, 1), ('e', 4, 4)]
        );
    }

    #[test]
    fn test_byte_offsets() {
        let mut cursor = Cursor::new("é\"x");
        cursor.advance();
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.position(), 1);
        cursor.advance();
        assert_eq!(cursor.text_since(0), "é\"");
    }
}
