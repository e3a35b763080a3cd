use crate::error::{ErrorKind, ParseError};
use crate::parser::scanner::Scanner;
use crate::parser::{Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword, dotted names included
    Ident,
    Number,
    /// Quoted string, quotes included
    String,
    Symbol,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub comments: Vec<String>,
    pub blank_before: bool,
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

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    pub fn is_ident(&self, ident: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == ident
    }
}

/// Tokenize protobuf source
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut scanner = Scanner::new(source);
    let mut tokens: Vec<Token> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut pending_blank = false;
    let mut newlines = 0usize;

    loop {
        scanner.skip_while(|c| c == ' ' || c == '\t' || c == '\r');
        let Some(ch) = scanner.peek_char() else {
            let mut eof = Token::new(TokenKind::Eof, "", Span::at(scanner.position()));
            eof.comments = pending;
            eof.blank_before = pending_blank;
            tokens.push(eof);
            return Ok(tokens);
        };

        if ch == '\n' {
            scanner.advance();
            newlines += 1;
            continue;
        }

        let comment = if scanner.starts_with("//") {
            Some(scanner.line_comment())
        } else if scanner.starts_with("/*") {
            let start = scanner.position();
            Some(scanner.block_comment().ok_or_else(|| {
                ParseError::new(ErrorKind::UnterminatedComment, "comment is never closed", scanner.span_from(start))
                    .with_help("Close the comment with '*/'")
            })?)
        } else {
            None
        };
        if let Some(text) = comment {
            match tokens.last_mut() {
                Some(last) if newlines == 0 && last.trailing.is_none() => last.trailing = Some(text),
                _ => {
                    if pending.is_empty() {
                        pending_blank = newlines >= 2;
                    }
                    pending.push(text);
                    newlines = 0;
                }
            }
            continue;
        }

        let mut token = scan_token(&mut scanner, ch)?;
        token.blank_before = if pending.is_empty() { newlines >= 2 } else { pending_blank };
        token.comments = std::mem::take(&mut pending);
        pending_blank = false;
        newlines = 0;
        tokens.push(token);
    }
}

fn scan_token(scanner: &mut Scanner<'_>, ch: char) -> Result<Token, ParseError> {
    let start = scanner.position();

    if ch.is_alphabetic() || ch == '_' || (ch == '.' && scanner.peek_next_char().is_some_and(|c| c.is_alphabetic())) {
        scanner.advance();
        scanner.skip_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
        return Ok(Token::new(TokenKind::Ident, scanner.slice_from(start), scanner.span_from(start)));
    }

    if ch.is_ascii_digit() || (ch == '.' && scanner.peek_next_char().is_some_and(|c| c.is_ascii_digit())) {
        scan_number(scanner, start);
        return Ok(Token::new(TokenKind::Number, scanner.slice_from(start), scanner.span_from(start)));
    }

    if ch == '"' || ch == '\'' {
        scanner.advance();
        loop {
            match scanner.peek_char() {
                Some('\\') => {
                    scanner.advance();
                    scanner.advance();
                }
                Some(c) if c == ch => {
                    scanner.advance();
                    break;
                }
                Some('\n') | None => {
                    return Err(ParseError::new(
                        ErrorKind::UnterminatedString,
                        "string is not terminated",
                        scanner.span_from(start),
                    ));
                }
                Some(_) => scanner.advance(),
            }
        }
        return Ok(Token::new(TokenKind::String, scanner.slice_from(start), scanner.span_from(start)));
    }

    if "=;{}[]()<>,:-+/".contains(ch) {
        scanner.advance();
        return Ok(Token::new(TokenKind::Symbol, scanner.slice_from(start), scanner.span_from(start)));
    }

    scanner.advance();
    Err(ParseError::new(
        ErrorKind::UnexpectedToken,
        format!("unexpected character '{}'", ch),
        scanner.span_from(start),
    ))
}

fn scan_number(scanner: &mut Scanner<'_>, start: Position) {
    let hex = scanner.starts_with("0x") || scanner.starts_with("0X");
    if hex {
        scanner.advance_by(2);
        scanner.skip_while(|c| c.is_ascii_hexdigit());
        return;
    }
    loop {
        match scanner.peek_char() {
            Some(c) if c.is_ascii_digit() || c == '.' => scanner.advance(),
            Some('e' | 'E') if !scanner.slice_from(start).is_empty() => {
                scanner.advance();
                if matches!(scanner.peek_char(), Some('+' | '-')) {
                    scanner.advance();
                }
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_identifiers_and_symbols() {
        let tokens = tokenize("option (gogoproto.nullable) = false;").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["option", "(", "gogoproto.nullable", ")", "=", "false", ";", ""]);
    }

    #[test]
    fn test_strings_and_numbers() {
        let tokens = tokenize("'a\\'b' \"c\" 0x1F 1.5e-3").unwrap();
        assert_eq!(tokens[0].text, "'a\\'b'");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "0x1F");
        assert_eq!(tokens[3].text, "1.5e-3");
    }

    #[test]
    fn test_comments() {
        let tokens = tokenize("syntax = \"proto3\";\n\n// Queries a post\nrpc X // inline\n").unwrap();
        let rpc = tokens.iter().find(|t| t.is_ident("rpc")).unwrap();
        assert_eq!(rpc.comments, vec!["// Queries a post"]);
        assert!(rpc.blank_before);
        let x = tokens.iter().find(|t| t.is_ident("X")).unwrap();
        assert_eq!(x.trailing.as_deref(), Some("// inline"));
    }
}
