use crate::error::{ErrorKind, ParseError};
use crate::parser::scanner::Scanner;
use crate::parser::{Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword,
    Int,
    Float,
    Imag,
    Char,
    String,
    /// Operator or delimiter, including explicit `;`
    Op,
    /// Semicolon inserted at a line break
    AutoSemi,
    Eof,
}

/// Go token with the comments that surround it
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// Comments on the lines above the token
    pub comments: Vec<String>,
    /// An empty line precedes the token (or its comments)
    pub blank_before: bool,
    /// Comment written after the token on the same line
    pub trailing: Option<String>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            comments: Vec::new(),
            blank_before: false,
            trailing: None,
        }
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    /// Explicit or inserted `;`
    pub fn is_semicolon(&self) -> bool {
        self.kind == TokenKind::AutoSemi || self.is_op(";")
    }
}

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go", "goto",
    "if", "import", "interface", "map", "package", "range", "return", "select", "struct", "switch", "type", "var",
];

// Longest first so that greedy matching works
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|", "^", "<", ">", "=", "!", "(", ")", "[", "]",
    "{", "}", ",", ";", ".", ":", "~",
];

/// Tokenizer for Go source files
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    tokens: Vec<Token>,
    /// Comments waiting for the next token
    pending: Vec<String>,
    pending_blank: bool,
    /// Comment found after the last token on its line
    same_line: Option<String>,
    /// Line breaks since the last token
    newlines: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            tokens: Vec::new(),
            pending: Vec::new(),
            pending_blank: false,
            same_line: None,
            newlines: 0,
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        loop {
            self.scanner.skip_while(|c| c == ' ' || c == '\t' || c == '\r');
            let Some(ch) = self.scanner.peek_char() else {
                self.line_break();
                let mut eof = Token::new(TokenKind::Eof, "", Span::at(self.scanner.position()));
                eof.comments = std::mem::take(&mut self.pending);
                eof.blank_before = self.pending_blank;
                self.tokens.push(eof);
                return Ok(self.tokens);
            };

            if ch == '\n' {
                self.line_break();
                self.scanner.advance();
                self.newlines += 1;
                continue;
            }

            if self.scanner.starts_with("//") {
                let text = self.scanner.line_comment();
                self.comment(text);
                continue;
            }

            if self.scanner.starts_with("/*") {
                let start = self.scanner.position();
                let text = self.scanner.block_comment().ok_or_else(|| {
                    ParseError::new(
                        ErrorKind::UnterminatedComment,
                        "comment is never closed",
                        self.scanner.span_from(start),
                    )
                    .with_help("Close the comment with '*/'")
                })?;
                let spans_lines = text.contains('\n');
                self.comment(text);
                if spans_lines {
                    // A multi-line comment acts like a line break
                    self.line_break();
                    self.newlines += 1;
                }
                continue;
            }

            let mut token = self.scan_token(ch)?;
            token.comments = std::mem::take(&mut self.pending);
            token.blank_before = if token.comments.is_empty() { self.newlines >= 2 } else { self.pending_blank };
            if let Some(inline) = self.same_line.take() {
                token.comments.push(inline);
            }
            self.pending_blank = false;
            self.newlines = 0;
            self.tokens.push(token);
        }
    }

    fn comment(&mut self, text: String) {
        let on_token_line = self.newlines == 0 && !self.tokens.is_empty();
        if on_token_line && self.same_line.is_none() {
            self.same_line = Some(text);
        } else {
            if self.pending.is_empty() {
                self.pending_blank = self.newlines >= 2;
            }
            self.pending.push(text);
            self.newlines = 0;
        }
    }

    /// Insert a semicolon if the line ends a statement, and place the same-line comment
    fn line_break(&mut self) {
        if self.newlines > 0 {
            return;
        }
        let inline = self.same_line.take();
        let Some(last) = self.tokens.last_mut() else {
            if let Some(text) = inline {
                self.pending.push(text);
            }
            return;
        };
        if ends_statement(last) {
            let position = last.span.end;
            let mut semi = Token::new(TokenKind::AutoSemi, "\n", Span::at(position));
            semi.trailing = inline;
            self.tokens.push(semi);
        } else if last.is_op(",") {
            // `a, // note` belongs to the element before the comma
            last.trailing = inline;
        } else if let Some(text) = inline {
            // `{ // note` documents whatever follows
            self.pending.push(text);
        }
    }

    fn scan_token(&mut self, ch: char) -> Result<Token, ParseError> {
        let start = self.scanner.position();

        if ch.is_alphabetic() || ch == '_' {
            self.scanner.skip_while(|c| c.is_alphanumeric() || c == '_');
            let text = self.scanner.slice_from(start);
            let kind = if KEYWORDS.contains(&text) { TokenKind::Keyword } else { TokenKind::Ident };
            return Ok(Token::new(kind, text, self.scanner.span_from(start)));
        }

        if ch.is_ascii_digit() || (ch == '.' && self.scanner.peek_next_char().is_some_and(|c| c.is_ascii_digit())) {
            return self.scan_number(start);
        }

        match ch {
            '"' => return self.scan_quoted(start, '"', TokenKind::String),
            '\'' => return self.scan_quoted(start, '\'', TokenKind::Char),
            '`' => return self.scan_raw_string(start),
            _ => {}
        }

        for op in OPERATORS {
            if self.scanner.starts_with(op) {
                self.scanner.advance_by(op.len());
                return Ok(Token::new(TokenKind::Op, *op, self.scanner.span_from(start)));
            }
        }

        self.scanner.advance();
        Err(ParseError::new(
            ErrorKind::UnexpectedToken,
            format!("unexpected character '{}'", ch),
            self.scanner.span_from(start),
        ))
    }

    fn scan_number(&mut self, start: Position) -> Result<Token, ParseError> {
        let mut kind = TokenKind::Int;
        let hex = self.scanner.starts_with("0x") || self.scanner.starts_with("0X");
        if hex {
            self.scanner.advance_by(2);
        }
        loop {
            match self.scanner.peek_char() {
                Some(c) if c.is_ascii_hexdigit() && (hex || c.is_ascii_digit()) => self.scanner.advance(),
                Some('_') => self.scanner.advance(),
                Some('b' | 'B' | 'o' | 'O') if self.scanner.slice_from(start) == "0" => self.scanner.advance(),
                Some('.') if !hex && kind == TokenKind::Int => {
                    kind = TokenKind::Float;
                    self.scanner.advance();
                }
                Some('e' | 'E') if !hex => {
                    kind = TokenKind::Float;
                    self.scanner.advance();
                    if matches!(self.scanner.peek_char(), Some('+' | '-')) {
                        self.scanner.advance();
                    }
                }
                Some('p' | 'P') if hex => {
                    kind = TokenKind::Float;
                    self.scanner.advance();
                    if matches!(self.scanner.peek_char(), Some('+' | '-')) {
                        self.scanner.advance();
                    }
                }
                _ => break,
            }
        }
        if self.scanner.eat('i') {
            kind = TokenKind::Imag;
        }
        let text = self.scanner.slice_from(start);
        if text.ends_with('_') {
            return Err(ParseError::new(
                ErrorKind::InvalidNumber,
                format!("'{}' cannot end with '_'", text),
                self.scanner.span_from(start),
            ));
        }
        Ok(Token::new(kind, text, self.scanner.span_from(start)))
    }

    fn scan_quoted(&mut self, start: Position, quote: char, kind: TokenKind) -> Result<Token, ParseError> {
        self.scanner.advance();
        loop {
            match self.scanner.peek_char() {
                Some('\\') => {
                    self.scanner.advance();
                    self.scanner.advance();
                }
                Some(c) if c == quote => {
                    self.scanner.advance();
                    break;
                }
                Some('\n') | None => {
                    return Err(ParseError::new(
                        ErrorKind::UnterminatedString,
                        "literal is not terminated",
                        self.scanner.span_from(start),
                    )
                    .with_help(format!("Close the literal with {}", quote)));
                }
                Some(_) => self.scanner.advance(),
            }
        }
        let text = self.scanner.slice_from(start);
        Ok(Token::new(kind, text, self.scanner.span_from(start)))
    }

    fn scan_raw_string(&mut self, start: Position) -> Result<Token, ParseError> {
        self.scanner.advance();
        self.scanner.skip_while(|c| c != '`');
        if !self.scanner.eat('`') {
            return Err(ParseError::new(
                ErrorKind::UnterminatedString,
                "raw string is not terminated",
                self.scanner.span_from(start),
            ));
        }
        let text = self.scanner.slice_from(start);
        Ok(Token::new(TokenKind::String, text, self.scanner.span_from(start)))
    }
}

/// Tokens after which a line break ends the statement
fn ends_statement(token: &Token) -> bool {
    match token.kind {
        TokenKind::Ident | TokenKind::Int | TokenKind::Float | TokenKind::Imag | TokenKind::Char | TokenKind::String => true,
        TokenKind::Keyword => matches!(token.text.as_str(), "break" | "continue" | "fallthrough" | "return"),
        TokenKind::Op => matches!(token.text.as_str(), "++" | "--" | ")" | "]" | "}"),
        TokenKind::AutoSemi | TokenKind::Eof => false,
    }
}

/// Tokenize Go source
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Tokenizer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_semicolon_insertion() {
        let tokens = kinds("x := 1\nreturn\n");
        let texts: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["x", ":=", "1", "\n", "return", "\n", ""]);
        assert_eq!(tokens[3].0, TokenKind::AutoSemi);
    }

    #[test]
    fn test_no_semicolon_after_open_brace() {
        let tokens = kinds("func f() {\n}\n");
        let semis = tokens.iter().filter(|(k, _)| *k == TokenKind::AutoSemi).count();
        assert_eq!(semis, 1);
    }

    #[test]
    fn test_literals() {
        let tokens = kinds("0x1F 1.5e3 2i 'a' \"s\\\"q\" `raw\nline`");
        assert_eq!(tokens[0], (TokenKind::Int, "0x1F".to_string()));
        assert_eq!(tokens[1], (TokenKind::Float, "1.5e3".to_string()));
        assert_eq!(tokens[2], (TokenKind::Imag, "2i".to_string()));
        assert_eq!(tokens[3], (TokenKind::Char, "'a'".to_string()));
        assert_eq!(tokens[4], (TokenKind::String, "\"s\\\"q\"".to_string()));
        assert_eq!(tokens[5], (TokenKind::String, "`raw\nline`".to_string()));
    }

    #[test]
    fn test_greedy_operators() {
        let texts: Vec<String> = kinds("a &^= b <<= c...").into_iter().map(|(_, t)| t).collect();
        assert_eq!(&texts[..6], &["a", "&^=", "b", "<<=", "c", "..."]);
    }

    #[test]
    fn test_comment_attachment() {
        let tokens = tokenize("package x\n\n// Doc line\nfunc f() {} // trailing\n").unwrap();
        let func = tokens.iter().find(|t| t.is_keyword("func")).unwrap();
        assert_eq!(func.comments, vec!["// Doc line"]);
        assert!(func.blank_before);
        let semi = tokens.iter().rev().find(|t| t.kind == TokenKind::AutoSemi).unwrap();
        assert_eq!(semi.trailing.as_deref(), Some("// trailing"));
    }

    #[test]
    fn test_comment_after_comma_stays_with_it() {
        let tokens = tokenize("x := T{\n\tA: 1, // first\n\t// above b\n\tB: 2,\n}\n").unwrap();
        let comma = tokens.iter().find(|t| t.is_op(",")).unwrap();
        assert_eq!(comma.trailing.as_deref(), Some("// first"));
        let b = tokens.iter().find(|t| t.text == "B").unwrap();
        assert_eq!(b.comments, vec!["// above b"]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("x := \"open\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
    }
}
