/// Position in source code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Byte offset in source
    pub byte: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

impl Position {
    pub fn new() -> Self {
        Self { byte: 0, line: 0, col: 0 }
    }
}

/// Span in source code (a range from start position to end position)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width span at a position
    pub fn at(position: Position) -> Self {
        Self { start: position, end: position }
    }
}

/// Character cursor shared by both tokenizers
pub(crate) struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: Position,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            position: Position::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn at_eof(&self) -> bool {
        self.position.byte >= self.bytes.len()
    }

    pub fn peek_char(&self) -> Option<char> {
        if self.at_eof() {
            return None;
        }
        // Simple ASCII fast path
        let b = self.bytes[self.position.byte];
        if b < 128 {
            Some(b as char)
        } else {
            self.source[self.position.byte..].chars().next()
        }
    }

    pub fn peek_next_char(&self) -> Option<char> {
        let mut chars = self.source[self.position.byte..].chars();
        chars.next()?;
        chars.next()
    }

    pub fn starts_with(&self, text: &str) -> bool {
        self.source[self.position.byte..].starts_with(text)
    }

    pub fn advance(&mut self) {
        let Some(ch) = self.peek_char() else {
            return;
        };
        self.position.byte += ch.len_utf8();
        if ch == '\n' {
            self.position.line += 1;
            self.position.col = 0;
        } else {
            self.position.col += 1;
        }
    }

    pub fn advance_by(&mut self, chars: usize) {
        for _ in 0..chars {
            self.advance();
        }
    }

    /// Consume `ch` if it is next
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek_char() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn skip_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek_char() {
            if !predicate(ch) {
                break;
            }
            self.advance();
        }
    }

    /// Text consumed since `start`
    pub fn slice_from(&self, start: Position) -> &'a str {
        &self.source[start.byte..self.position.byte]
    }

    pub fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.position)
    }

    /// Consume a `//` comment up to (not including) the line break
    pub fn line_comment(&mut self) -> String {
        let start = self.position;
        self.skip_while(|c| c != '\n' && c != '\r');
        self.slice_from(start).trim_end().to_string()
    }

    /// Consume a `/* */` comment, `None` when it never closes
    pub fn block_comment(&mut self) -> Option<String> {
        let start = self.position;
        self.advance_by(2);
        while !self.at_eof() {
            if self.starts_with("*/") {
                self.advance_by(2);
                return Some(self.slice_from(start).to_string());
            }
            self.advance();
        }
        None
    }
}
