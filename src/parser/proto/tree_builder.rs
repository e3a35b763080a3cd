use super::tokenizer::{Token, TokenKind};
use crate::ast::proto::*;
use crate::ast::{Decor, Spacing};
use crate::error::{ErrorKind, ParseError};
use crate::parser::Span;

/// Builds a protobuf syntax tree from a token stream
pub struct TreeBuilder {
    tokens: Vec<Token>,
    pos: usize,
}

impl TreeBuilder {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn build(&mut self) -> Result<Proto, ParseError> {
        let mut proto = Proto::default();

        while self.peek().kind != TokenKind::Eof {
            if self.eat_symbol(";") {
                continue;
            }
            let token = self.peek().clone();
            let element = match token.text.as_str() {
                "syntax" | "edition" if token.kind == TokenKind::Ident => Element::Syntax(self.parse_syntax()?),
                "package" if token.kind == TokenKind::Ident => Element::Package(self.parse_package()?),
                "import" if token.kind == TokenKind::Ident => Element::Import(self.parse_import()?),
                "option" if token.kind == TokenKind::Ident => Element::Option(self.parse_option()?),
                "message" if token.kind == TokenKind::Ident => Element::Message(self.parse_message()?),
                "enum" if token.kind == TokenKind::Ident => Element::Enum(self.parse_enum()?),
                "service" if token.kind == TokenKind::Ident => Element::Service(self.parse_service()?),
                _ => {
                    return Err(ParseError::new(
                        ErrorKind::UnexpectedToken,
                        format!("unexpected '{}' at top level", token.text),
                        token.span,
                    )
                    .with_help("Expected 'syntax', 'package', 'import', 'option', 'message', 'enum' or 'service'"));
                }
            };
            proto.elements.push(element);
        }
        proto.trailing = std::mem::take(&mut self.tokens[self.pos].comments);

        Ok(proto)
    }

    fn parse_syntax(&mut self) -> Result<Syntax, ParseError> {
        let mut decor = self.take_decor();
        let keyword = self.advance().text;
        self.expect_symbol("=")?;
        let value = self.expect_string()?;
        decor.trailing = self.expect_end()?;
        Ok(Syntax { keyword, value, decor })
    }

    fn parse_package(&mut self) -> Result<Package, ParseError> {
        let mut decor = self.take_decor();
        self.advance();
        let name = self.expect_ident()?;
        decor.trailing = self.expect_end()?;
        Ok(Package { name, decor })
    }

    fn parse_import(&mut self) -> Result<Import, ParseError> {
        let mut decor = self.take_decor();
        self.advance();
        let kind = if self.eat_ident("public") {
            ImportKind::Public
        } else if self.eat_ident("weak") {
            ImportKind::Weak
        } else {
            ImportKind::Plain
        };
        let filename = self.expect_string()?;
        decor.trailing = self.expect_end()?;
        Ok(Import { filename, kind, decor })
    }

    /// `option name = constant;`
    fn parse_option(&mut self) -> Result<ProtoOption, ParseError> {
        let mut decor = self.take_decor();
        self.advance();
        let mut option = self.parse_option_assignment()?;
        decor.trailing = self.expect_end()?;
        option.decor = decor;
        Ok(option)
    }

    fn parse_option_assignment(&mut self) -> Result<ProtoOption, ParseError> {
        let name = self.parse_option_name()?;
        self.expect_symbol("=")?;
        let constant = self.parse_constant()?;
        Ok(ProtoOption::new(name, constant))
    }

    /// `java_package`, `(gogoproto.nullable)` or `(google.api.http).get`
    fn parse_option_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        if self.peek().is_symbol("(") {
            let open = self.advance().span;
            name.push('(');
            name.push_str(&self.expect_ident()?);
            self.expect_close(")", open)?;
            name.push(')');
        } else {
            name.push_str(&self.expect_ident()?);
        }
        while self.peek().kind == TokenKind::Ident && self.peek().text.starts_with('.') {
            name.push_str(&self.advance().text);
        }
        Ok(name)
    }

    fn parse_constant(&mut self) -> Result<Literal, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::String => {
                let mut value = self.expect_string()?;
                // Adjacent strings concatenate
                while self.peek().kind == TokenKind::String {
                    value.push_str(&self.expect_string()?);
                }
                Ok(Literal::String(value))
            }
            TokenKind::Ident | TokenKind::Number => {
                self.advance();
                Ok(Literal::Source(token.text))
            }
            TokenKind::Symbol if token.text == "-" || token.text == "+" => {
                self.advance();
                let value = self.advance();
                if !matches!(value.kind, TokenKind::Number | TokenKind::Ident) {
                    return Err(self.unexpected(&value, "number"));
                }
                Ok(Literal::Source(format!("{}{}", token.text, value.text)))
            }
            TokenKind::Symbol if token.text == "{" => self.parse_aggregate(),
            TokenKind::Symbol if token.text == "[" => self.parse_list(),
            _ => Err(self.unexpected(&token, "constant")),
        }
    }

    /// `{ key: value key2 { ... } }`
    fn parse_aggregate(&mut self) -> Result<Literal, ParseError> {
        let open = self.expect_symbol("{")?.span;
        let mut entries = Vec::new();
        while !self.peek().is_symbol("}") && self.peek().kind != TokenKind::Eof {
            let key = if self.peek().is_symbol("[") {
                let bracket = self.advance().span;
                let inner = self.expect_ident()?;
                self.expect_close("]", bracket)?;
                format!("[{}]", inner)
            } else {
                self.expect_ident()?
            };
            let has_colon = self.eat_symbol(":");
            let value = if !has_colon && !self.peek().is_symbol("{") {
                return Err(self.unexpected(&self.peek().clone(), "':'"));
            } else {
                self.parse_constant()?
            };
            entries.push((key, value));
            if !self.eat_symbol(",") {
                self.eat_symbol(";");
            }
        }
        self.expect_close("}", open)?;
        Ok(Literal::Aggregate(entries))
    }

    fn parse_list(&mut self) -> Result<Literal, ParseError> {
        let open = self.expect_symbol("[")?.span;
        let mut items = Vec::new();
        while !self.peek().is_symbol("]") && self.peek().kind != TokenKind::Eof {
            items.push(self.parse_constant()?);
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.expect_close("]", open)?;
        Ok(Literal::List(items))
    }

    fn parse_message(&mut self) -> Result<Message, ParseError> {
        let mut decor = self.take_decor();
        self.advance();
        let name = self.expect_ident()?;
        let open = self.expect_symbol("{")?;
        decor.trailing = open.trailing;

        let mut elements = Vec::new();
        while !self.peek().is_symbol("}") && self.peek().kind != TokenKind::Eof {
            if self.eat_symbol(";") {
                continue;
            }
            elements.push(self.parse_message_element()?);
        }
        let trailing = std::mem::take(&mut self.tokens[self.pos].comments);
        self.expect_close("}", open.span)?;

        Ok(Message { name, elements, decor, trailing })
    }

    fn parse_message_element(&mut self) -> Result<MessageElement, ParseError> {
        let token = self.peek().clone();
        let next_is_name = self.peek_nth(1).kind == TokenKind::Ident;
        match token.text.as_str() {
            "option" => Ok(MessageElement::Option(self.parse_option()?)),
            "message" if next_is_name => Ok(MessageElement::Message(self.parse_message()?)),
            "enum" if next_is_name => Ok(MessageElement::Enum(self.parse_enum()?)),
            "oneof" if next_is_name => Ok(MessageElement::Oneof(self.parse_oneof()?)),
            "reserved" if !next_is_name || self.peek_nth(1).text == "max" => {
                Ok(MessageElement::Reserved(self.parse_reserved()?))
            }
            "extensions" if !next_is_name => Ok(MessageElement::Extensions(self.parse_reserved()?)),
            "map" if self.peek_nth(1).is_symbol("<") => Ok(MessageElement::MapField(self.parse_map_field()?)),
            _ if token.kind == TokenKind::Ident => {
                let decor = self.take_decor();
                let label = match token.text.as_str() {
                    "repeated" if next_is_name => Some(FieldLabel::Repeated),
                    "optional" if next_is_name => Some(FieldLabel::Optional),
                    "required" if next_is_name => Some(FieldLabel::Required),
                    _ => None,
                };
                if label.is_some() {
                    self.advance();
                }
                let ty = self.expect_ident()?;
                let mut field = self.parse_field_tail(ty)?;
                field.decor.before = decor.before;
                field.decor.comments = decor.comments;
                Ok(MessageElement::Field(NormalField { field, label }))
            }
            _ => Err(self.unexpected(&token, "message element")),
        }
    }

    /// `name = 1 [options];` after the type
    fn parse_field_tail(&mut self, ty: String) -> Result<Field, ParseError> {
        let name = self.expect_ident()?;
        self.expect_symbol("=")?;
        let span = self.peek().span;
        let sequence = self.expect_number::<u32>()?;
        if sequence == 0 || sequence > MAX_FIELD_NUMBER {
            return Err(ParseError::new(
                ErrorKind::InvalidNumber,
                format!("field number {} is out of range", sequence),
                span,
            )
            .with_help(format!("field numbers run from 1 to {}", MAX_FIELD_NUMBER)));
        }
        let mut field = Field::new(name, ty).with_sequence(sequence);
        if self.peek().is_symbol("[") {
            field.options = self.parse_field_options()?;
        }
        field.decor.trailing = self.expect_end()?;
        Ok(field)
    }

    fn parse_field_options(&mut self) -> Result<Vec<ProtoOption>, ParseError> {
        let open = self.expect_symbol("[")?.span;
        let mut options = Vec::new();
        loop {
            options.push(self.parse_option_assignment()?);
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.expect_close("]", open)?;
        Ok(options)
    }

    fn parse_map_field(&mut self) -> Result<MapField, ParseError> {
        let decor = self.take_decor();
        self.advance();
        let open = self.expect_symbol("<")?.span;
        let key_type = self.expect_ident()?;
        self.expect_symbol(",")?;
        let value_type = self.expect_ident()?;
        self.expect_close(">", open)?;
        let mut field = self.parse_field_tail(value_type)?;
        field.decor.before = decor.before;
        field.decor.comments = decor.comments;
        Ok(MapField { key_type, field })
    }

    fn parse_oneof(&mut self) -> Result<Oneof, ParseError> {
        let mut decor = self.take_decor();
        self.advance();
        let name = self.expect_ident()?;
        let open = self.expect_symbol("{")?;
        decor.trailing = open.trailing;

        let mut options = Vec::new();
        let mut fields = Vec::new();
        while !self.peek().is_symbol("}") && self.peek().kind != TokenKind::Eof {
            if self.eat_symbol(";") {
                continue;
            }
            if self.peek().is_ident("option") {
                options.push(self.parse_option()?);
                continue;
            }
            let field_decor = self.take_decor();
            let ty = self.expect_ident()?;
            let mut field = self.parse_field_tail(ty)?;
            field.decor.before = field_decor.before;
            field.decor.comments = field_decor.comments;
            fields.push(field);
        }
        self.expect_close("}", open.span)?;

        Ok(Oneof { name, options, fields, decor })
    }

    /// `reserved 2, 9 to 11, 40 to max;` or `reserved "foo", "bar";`
    fn parse_reserved(&mut self) -> Result<Reserved, ParseError> {
        let mut reserved = Reserved { decor: self.take_decor(), ..Reserved::default() };
        self.advance();
        loop {
            if self.peek().kind == TokenKind::String {
                reserved.names.push(self.expect_string()?);
            } else {
                let start = self.expect_signed()?;
                let end = if self.eat_ident("to") {
                    if self.eat_ident("max") { RangeEnd::Max } else { RangeEnd::Value(self.expect_signed()?) }
                } else {
                    RangeEnd::Same
                };
                reserved.ranges.push(Range { start, end });
            }
            if !self.eat_symbol(",") {
                break;
            }
        }
        reserved.decor.trailing = self.expect_end()?;
        Ok(reserved)
    }

    fn parse_enum(&mut self) -> Result<Enum, ParseError> {
        let mut decor = self.take_decor();
        self.advance();
        let name = self.expect_ident()?;
        let open = self.expect_symbol("{")?;
        decor.trailing = open.trailing;

        let mut elements = Vec::new();
        while !self.peek().is_symbol("}") && self.peek().kind != TokenKind::Eof {
            if self.eat_symbol(";") {
                continue;
            }
            let is_value = self.peek_nth(1).is_symbol("=");
            let is_option = self.peek().is_ident("option");
            let is_reserved = self.peek().is_ident("reserved");
            if is_option && !is_value {
                elements.push(EnumElement::Option(self.parse_option()?));
            } else if is_reserved && !is_value {
                elements.push(EnumElement::Reserved(self.parse_reserved()?));
            } else {
                let mut value_decor = self.take_decor();
                let name = self.expect_ident()?;
                self.expect_symbol("=")?;
                let number = self.expect_signed()?;
                let options = if self.peek().is_symbol("[") { self.parse_field_options()? } else { Vec::new() };
                value_decor.trailing = self.expect_end()?;
                elements.push(EnumElement::Value(EnumValue { name, number, options, decor: value_decor }));
            }
        }
        let trailing = std::mem::take(&mut self.tokens[self.pos].comments);
        self.expect_close("}", open.span)?;

        Ok(Enum { name, elements, decor, trailing })
    }

    fn parse_service(&mut self) -> Result<Service, ParseError> {
        let mut decor = self.take_decor();
        self.advance();
        let name = self.expect_ident()?;
        let open = self.expect_symbol("{")?;
        decor.trailing = open.trailing;

        let mut elements = Vec::new();
        while !self.peek().is_symbol("}") && self.peek().kind != TokenKind::Eof {
            if self.eat_symbol(";") {
                continue;
            }
            let token = self.peek().clone();
            if token.is_ident("option") {
                elements.push(ServiceElement::Option(self.parse_option()?));
            } else if token.is_ident("rpc") {
                elements.push(ServiceElement::Rpc(self.parse_rpc()?));
            } else {
                return Err(self.unexpected(&token, "'rpc' or 'option'"));
            }
        }
        let trailing = std::mem::take(&mut self.tokens[self.pos].comments);
        self.expect_close("}", open.span)?;

        Ok(Service { name, elements, decor, trailing })
    }

    fn parse_rpc(&mut self) -> Result<Rpc, ParseError> {
        let mut decor = self.take_decor();
        self.advance();
        let name = self.expect_ident()?;

        let (request, request_stream) = self.parse_rpc_type()?;
        if !self.eat_ident("returns") {
            let token = self.peek().clone();
            return Err(self.unexpected(&token, "'returns'"));
        }
        let (returns, returns_stream) = self.parse_rpc_type()?;

        let mut options = Vec::new();
        if self.peek().is_symbol("{") {
            let open = self.advance().span;
            while !self.peek().is_symbol("}") && self.peek().kind != TokenKind::Eof {
                if self.eat_symbol(";") {
                    continue;
                }
                if !self.peek().is_ident("option") {
                    let token = self.peek().clone();
                    return Err(self.unexpected(&token, "'option'"));
                }
                options.push(self.parse_option()?);
            }
            let close = self.advance();
            if !close.is_symbol("}") {
                return Err(self.unexpected(&close, "'}'").with_related(open));
            }
            decor.trailing = close.trailing;
            if self.peek().is_symbol(";") {
                decor.trailing = decor.trailing.or(self.advance().trailing);
            }
        } else {
            decor.trailing = self.expect_end()?;
        }

        Ok(Rpc { name, request, request_stream, returns, returns_stream, options, decor })
    }

    /// `(stream Type)`
    fn parse_rpc_type(&mut self) -> Result<(String, bool), ParseError> {
        let open = self.expect_symbol("(")?.span;
        let stream = self.peek().is_ident("stream") && self.peek_nth(1).kind == TokenKind::Ident;
        if stream {
            self.advance();
        }
        let ty = self.expect_ident()?;
        self.expect_close(")", open)?;
        Ok((ty, stream))
    }

    // === Token helpers ===

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.peek().is_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, ident: &str) -> bool {
        if self.peek().is_ident(ident) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<Token, ParseError> {
        if self.peek().is_symbol(symbol) {
            return Ok(self.advance());
        }
        let token = self.peek().clone();
        Err(self.unexpected(&token, &format!("'{}'", symbol)))
    }

    fn expect_close(&mut self, symbol: &str, open: Span) -> Result<(), ParseError> {
        self.expect_symbol(symbol).map(|_| ()).map_err(|err| err.with_related(open))
    }

    /// `;` ending an element, returning the comment after it
    fn expect_end(&mut self) -> Result<Option<String>, ParseError> {
        self.expect_symbol(";").map(|token| token.trailing)
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        if self.peek().kind == TokenKind::Ident {
            return Ok(self.advance().text);
        }
        let token = self.peek().clone();
        Err(self.unexpected(&token, "identifier"))
    }

    /// String content without quotes
    fn expect_string(&mut self) -> Result<String, ParseError> {
        let token = self.peek().clone();
        if token.kind != TokenKind::String {
            return Err(self.unexpected(&token, "string"));
        }
        self.advance();
        Ok(string_content(&token.text))
    }

    fn expect_number<T: std::str::FromStr>(&mut self) -> Result<T, ParseError> {
        let token = self.advance();
        parse_int(&token.text)
            .and_then(|n| n.to_string().parse().ok())
            .ok_or_else(|| {
                ParseError::new(ErrorKind::InvalidNumber, format!("expected number, found '{}'", token.text), token.span)
            })
    }

    fn expect_signed(&mut self) -> Result<i64, ParseError> {
        if self.eat_symbol("-") {
            return Ok(-self.expect_number::<i64>()?);
        }
        self.expect_number()
    }

    fn unexpected(&self, token: &Token, expected: &str) -> ParseError {
        let found = if token.kind == TokenKind::Eof { "end of file" } else { token.text.as_str() };
        ParseError::new(
            if token.kind == TokenKind::Eof { ErrorKind::UnexpectedEof } else { ErrorKind::UnexpectedToken },
            format!("expected {}, found '{}'", expected, found),
            token.span,
        )
    }

    /// Move the current token's comments into a decor
    fn take_decor(&mut self) -> Decor {
        let index = self.pos.min(self.tokens.len() - 1);
        let token = &mut self.tokens[index];
        Decor {
            before: if token.blank_before { Spacing::EmptyLine } else { Spacing::NewLine },
            comments: std::mem::take(&mut token.comments),
            trailing: None,
        }
    }
}

/// Decimal, hex or octal integer
fn parse_int(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    if text.len() > 1 && text.starts_with('0') {
        return i64::from_str_radix(&text[1..], 8).ok();
    }
    text.parse().ok()
}

/// Content of a quoted string, normalized for double quotes
fn string_content(literal: &str) -> String {
    let quote = literal.chars().next().unwrap_or('"');
    let inner = &literal[1..literal.len().saturating_sub(1).max(1)];
    if quote == '\'' {
        inner.replace("\\'", "'").replace('"', "\\\"")
    } else {
        inner.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("017"), Some(15));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("1.5"), None);
    }

    #[test]
    fn test_string_content() {
        assert_eq!(string_content("\"proto3\""), "proto3");
        assert_eq!(string_content("'it\\'s \"x\"'"), "it's \\\"x\\\"");
        assert_eq!(string_content("\"\""), "");
    }
}
