use super::{Generator, Output};
use crate::ast::proto::*;
use crate::ast::{Decor, Spacing};

/// Prints a protobuf syntax tree with two-space indentation
pub struct ProtoGenerator;

impl ProtoGenerator {
    pub fn new() -> Self {
        Self
    }

    fn proto(&self, proto: &Proto, out: &mut Output) {
        let mut previous: Option<&Element> = None;
        for element in &proto.elements {
            if let Some(prev) = previous {
                if separated(prev, element) {
                    out.blank_line();
                }
            }
            self.element(element, out);
            previous = Some(element);
        }
        if !proto.trailing.is_empty() {
            out.blank_line();
            for comment in &proto.trailing {
                out.push(comment);
                out.newline();
            }
        }
    }

    fn element(&self, element: &Element, out: &mut Output) {
        match element {
            Element::Syntax(syntax) => {
                comments(out, &syntax.decor);
                out.push(&format!("{} = \"{}\";", syntax.keyword, syntax.value));
                end(out, &syntax.decor);
            }
            Element::Package(package) => {
                comments(out, &package.decor);
                out.push(&format!("package {};", package.name));
                end(out, &package.decor);
            }
            Element::Import(import) => {
                comments(out, &import.decor);
                out.push("import ");
                match import.kind {
                    ImportKind::Plain => {}
                    ImportKind::Public => out.push("public "),
                    ImportKind::Weak => out.push("weak "),
                }
                out.push(&format!("\"{}\";", import.filename));
                end(out, &import.decor);
            }
            Element::Option(option) => self.option(option, out),
            Element::Enum(enumeration) => self.enumeration(enumeration, out),
            Element::Message(message) => self.message(message, out),
            Element::Service(service) => self.service(service, out),
        }
    }

    fn option(&self, option: &ProtoOption, out: &mut Output) {
        comments(out, &option.decor);
        out.push("option ");
        out.push(&option.name);
        out.push(" = ");
        self.literal(&option.constant, out);
        out.push(";");
        end(out, &option.decor);
    }

    fn literal(&self, literal: &Literal, out: &mut Output) {
        match literal {
            Literal::Source(text) => out.push(text),
            Literal::String(text) => out.push(&format!("\"{}\"", text)),
            Literal::Aggregate(entries) => {
                if entries.is_empty() {
                    out.push("{}");
                    return;
                }
                out.push("{");
                out.newline();
                out.indented(|out| {
                    for (key, value) in entries {
                        out.push(key);
                        out.push(": ");
                        self.literal(value, out);
                        out.newline();
                    }
                });
                out.push("}");
            }
            Literal::List(items) => {
                out.push("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(", ");
                    }
                    self.literal(item, out);
                }
                out.push("]");
            }
        }
    }

    /// `[a = b, c = d]` after a field number
    fn field_options(&self, options: &[ProtoOption], out: &mut Output) {
        if options.is_empty() {
            return;
        }
        out.push(" [");
        for (i, option) in options.iter().enumerate() {
            if i > 0 {
                out.push(", ");
            }
            out.push(&option.name);
            out.push(" = ");
            self.literal(&option.constant, out);
        }
        out.push("]");
    }

    fn message(&self, message: &Message, out: &mut Output) {
        comments(out, &message.decor);
        out.push(&format!("message {} {{", message.name));
        if message.elements.is_empty() && message.trailing.is_empty() {
            out.push("}");
            end(out, &message.decor);
            return;
        }
        trailing(out, &message.decor);
        out.newline();
        out.indented(|out| {
            for (i, element) in message.elements.iter().enumerate() {
                if i > 0 && message_element_decor(element).before == Spacing::EmptyLine {
                    out.blank_line();
                }
                self.message_element(element, out);
            }
            for comment in &message.trailing {
                out.push(comment);
                out.newline();
            }
        });
        out.push("}");
        out.newline();
    }

    fn message_element(&self, element: &MessageElement, out: &mut Output) {
        match element {
            MessageElement::Field(normal) => {
                comments(out, &normal.field.decor);
                if let Some(label) = normal.label {
                    out.push(label.as_str());
                    out.push(" ");
                }
                out.push(&normal.field.ty);
                out.push(" ");
                self.field_tail(&normal.field, out);
            }
            MessageElement::MapField(map) => {
                comments(out, &map.field.decor);
                out.push(&format!("map<{}, {}> ", map.key_type, map.field.ty));
                self.field_tail(&map.field, out);
            }
            MessageElement::Oneof(oneof) => {
                comments(out, &oneof.decor);
                out.push(&format!("oneof {} {{", oneof.name));
                trailing(out, &oneof.decor);
                out.newline();
                out.indented(|out| {
                    for option in &oneof.options {
                        self.option(option, out);
                    }
                    for field in &oneof.fields {
                        comments(out, &field.decor);
                        out.push(&field.ty);
                        out.push(" ");
                        self.field_tail(field, out);
                    }
                });
                out.push("}");
                out.newline();
            }
            MessageElement::Message(message) => self.message(message, out),
            MessageElement::Enum(enumeration) => self.enumeration(enumeration, out),
            MessageElement::Option(option) => self.option(option, out),
            MessageElement::Reserved(reserved) => self.reserved("reserved", reserved, out),
            MessageElement::Extensions(reserved) => self.reserved("extensions", reserved, out),
        }
    }

    /// `name = 1 [options];` and the trailing comment
    fn field_tail(&self, field: &Field, out: &mut Output) {
        out.push(&field.name);
        if let Some(sequence) = field.sequence {
            out.push(&format!(" = {}", sequence));
        }
        self.field_options(&field.options, out);
        out.push(";");
        end(out, &field.decor);
    }

    fn reserved(&self, keyword: &str, reserved: &Reserved, out: &mut Output) {
        comments(out, &reserved.decor);
        out.push(keyword);
        out.push(" ");
        let items: Vec<String> = if reserved.names.is_empty() {
            reserved
                .ranges
                .iter()
                .map(|range| match range.end {
                    RangeEnd::Same => range.start.to_string(),
                    RangeEnd::Value(end) => format!("{} to {}", range.start, end),
                    RangeEnd::Max => format!("{} to max", range.start),
                })
                .collect()
        } else {
            reserved.names.iter().map(|name| format!("\"{}\"", name)).collect()
        };
        out.push(&items.join(", "));
        out.push(";");
        end(out, &reserved.decor);
    }

    fn enumeration(&self, enumeration: &Enum, out: &mut Output) {
        comments(out, &enumeration.decor);
        out.push(&format!("enum {} {{", enumeration.name));
        trailing(out, &enumeration.decor);
        out.newline();
        out.indented(|out| {
            for (i, element) in enumeration.elements.iter().enumerate() {
                match element {
                    EnumElement::Value(value) => {
                        if i > 0 && value.decor.before == Spacing::EmptyLine {
                            out.blank_line();
                        }
                        comments(out, &value.decor);
                        out.push(&format!("{} = {}", value.name, value.number));
                        self.field_options(&value.options, out);
                        out.push(";");
                        end(out, &value.decor);
                    }
                    EnumElement::Option(option) => self.option(option, out),
                    EnumElement::Reserved(reserved) => self.reserved("reserved", reserved, out),
                }
            }
            for comment in &enumeration.trailing {
                out.push(comment);
                out.newline();
            }
        });
        out.push("}");
        out.newline();
    }

    fn service(&self, service: &Service, out: &mut Output) {
        comments(out, &service.decor);
        out.push(&format!("service {} {{", service.name));
        trailing(out, &service.decor);
        out.newline();
        out.indented(|out| {
            for (i, element) in service.elements.iter().enumerate() {
                match element {
                    ServiceElement::Rpc(rpc) => {
                        if i > 0 && rpc.decor.before == Spacing::EmptyLine {
                            out.blank_line();
                        }
                        self.rpc(rpc, out);
                    }
                    ServiceElement::Option(option) => self.option(option, out),
                }
            }
            for comment in &service.trailing {
                out.push(comment);
                out.newline();
            }
        });
        out.push("}");
        out.newline();
    }

    fn rpc(&self, rpc: &Rpc, out: &mut Output) {
        comments(out, &rpc.decor);
        let stream = |flag: bool| if flag { "stream " } else { "" };
        out.push(&format!(
            "rpc {}({}{}) returns ({}{})",
            rpc.name,
            stream(rpc.request_stream),
            rpc.request,
            stream(rpc.returns_stream),
            rpc.returns
        ));
        if rpc.options.is_empty() {
            out.push(";");
            end(out, &rpc.decor);
            return;
        }
        out.push(" {");
        out.newline();
        out.indented(|out| {
            for option in &rpc.options {
                self.option(option, out);
            }
        });
        out.push("}");
        end(out, &rpc.decor);
    }
}

impl Default for ProtoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for ProtoGenerator {
    type Tree = Proto;

    fn generate(&self, proto: &Proto) -> String {
        let mut out = Output::new("  ");
        self.proto(proto, &mut out);
        out.finish()
    }
}

/// Whether an empty line goes between two top-level elements
fn separated(previous: &Element, element: &Element) -> bool {
    let kind = |element: &Element| std::mem::discriminant(element);
    element_decor(element).before == Spacing::EmptyLine
        || kind(previous) != kind(element)
        || matches!(element, Element::Message(_) | Element::Service(_) | Element::Enum(_))
}

fn element_decor(element: &Element) -> &Decor {
    match element {
        Element::Syntax(e) => &e.decor,
        Element::Package(e) => &e.decor,
        Element::Import(e) => &e.decor,
        Element::Option(e) => &e.decor,
        Element::Enum(e) => &e.decor,
        Element::Message(e) => &e.decor,
        Element::Service(e) => &e.decor,
    }
}

fn message_element_decor(element: &MessageElement) -> &Decor {
    match element {
        MessageElement::Field(e) => &e.field.decor,
        MessageElement::MapField(e) => &e.field.decor,
        MessageElement::Oneof(e) => &e.decor,
        MessageElement::Message(e) => &e.decor,
        MessageElement::Enum(e) => &e.decor,
        MessageElement::Option(e) => &e.decor,
        MessageElement::Reserved(e) | MessageElement::Extensions(e) => &e.decor,
    }
}

fn comments(out: &mut Output, decor: &Decor) {
    for comment in &decor.comments {
        out.push(comment);
        out.newline();
    }
}

fn trailing(out: &mut Output, decor: &Decor) {
    if let Some(comment) = &decor.trailing {
        out.push(" ");
        out.push(comment);
    }
}

/// Trailing comment, then end the line
fn end(out: &mut Output, decor: &Decor) {
    trailing(out, decor);
    out.newline();
}
