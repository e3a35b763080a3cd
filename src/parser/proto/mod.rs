pub mod tokenizer;
mod tree_builder;

pub use tokenizer::{tokenize, Token, TokenKind};
use tree_builder::TreeBuilder;

use super::Parser;
use crate::ast::proto::Proto;
use crate::error::ParseError;

/// Protobuf source parser
pub struct ProtoParser {
    filename: String,
}

impl ProtoParser {
    pub fn new() -> Self {
        Self { filename: String::new() }
    }

    /// Record the file name on parsed trees
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }
}

impl Default for ProtoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for ProtoParser {
    type Tree = Proto;

    fn parse(&self, source: &str) -> Result<Proto, ParseError> {
        let tokens = tokenize(source)?;
        let mut builder = TreeBuilder::new(tokens);
        let mut proto = builder.build()?;
        proto.filename = self.filename.clone();
        Ok(proto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::proto::*;

    const QUERY: &str = r#"syntax = "proto3";
package blog.blog;

import "google/api/annotations.proto";
import public "gogoproto/gogo.proto";

option go_package = "blog/x/blog/types";

// Query defines the gRPC querier service.
service Query {
  rpc Params(QueryParamsRequest) returns (QueryParamsResponse) {
    option (google.api.http).get = "/blog/blog/params";
  }
  rpc Watch(stream WatchRequest) returns (stream WatchResponse); // streaming
}

message QueryParamsRequest {}

message Post {
  reserved 2, 9 to 11, 40 to max;
  reserved "legacy";
  string creator = 1;
  repeated uint64 ids = 3 [(gogoproto.nullable) = false, packed = true];
  map<string, int32> counts = 4;
  oneof kind {
    string text = 5;
    bytes blob = 6;
  }
  enum Status {
    option allow_alias = true;
    UNKNOWN = 0;
    NEG = -1;
  }
}
"#;

    fn parse(source: &str) -> Proto {
        ProtoParser::new().with_filename("query.proto").parse(source).unwrap()
    }

    #[test]
    fn test_parse_header() {
        let proto = parse(QUERY);
        assert_eq!(proto.filename, "query.proto");
        match &proto.elements[0] {
            Element::Syntax(syntax) => assert_eq!(syntax.value, "proto3"),
            other => panic!("expected syntax, got {:?}", other),
        }
        match &proto.elements[1] {
            Element::Package(package) => assert_eq!(package.name, "blog.blog"),
            other => panic!("expected package, got {:?}", other),
        }
        match &proto.elements[3] {
            Element::Import(import) => {
                assert_eq!(import.filename, "gogoproto/gogo.proto");
                assert_eq!(import.kind, ImportKind::Public);
            }
            other => panic!("expected import, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_service() {
        let proto = parse(QUERY);
        let service = proto
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Service(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(service.decor.comments, vec!["// Query defines the gRPC querier service."]);
        assert!(service.decor.before == crate::ast::Spacing::EmptyLine);

        let ServiceElement::Rpc(params) = &service.elements[0] else { panic!("expected rpc") };
        assert_eq!(params.request, "QueryParamsRequest");
        assert_eq!(params.options[0].name, "(google.api.http).get");
        assert_eq!(params.options[0].constant, Literal::String("/blog/blog/params".into()));

        let ServiceElement::Rpc(watch) = &service.elements[1] else { panic!("expected rpc") };
        assert!(watch.request_stream && watch.returns_stream);
        assert_eq!(watch.decor.trailing.as_deref(), Some("// streaming"));
    }

    #[test]
    fn test_parse_message_elements() {
        let proto = parse(QUERY);
        let post = proto
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Message(m) if m.name == "Post" => Some(m),
                _ => None,
            })
            .unwrap();

        let MessageElement::Reserved(reserved) = &post.elements[0] else { panic!("expected reserved") };
        assert!(reserved.contains(10));
        assert!(reserved.contains(1000));
        assert!(!reserved.contains(3));

        let MessageElement::Field(ids) = &post.elements[3] else { panic!("expected field") };
        assert_eq!(ids.label, Some(FieldLabel::Repeated));
        assert_eq!(ids.field.sequence, Some(3));
        assert_eq!(ids.field.options.len(), 2);

        let MessageElement::MapField(counts) = &post.elements[4] else { panic!("expected map") };
        assert_eq!(counts.key_type, "string");
        assert_eq!(counts.field.ty, "int32");

        let MessageElement::Oneof(kind) = &post.elements[5] else { panic!("expected oneof") };
        assert_eq!(kind.fields.len(), 2);

        let MessageElement::Enum(status) = &post.elements[6] else { panic!("expected enum") };
        assert!(matches!(&status.elements[2], EnumElement::Value(v) if v.number == -1));
    }

    #[test]
    fn test_parse_error_points_at_token() {
        let err = ProtoParser::new().parse("message X {\n  string = 1;\n}\n").unwrap_err();
        assert_eq!(err.span.start.line, 1);
    }

    #[test]
    fn test_field_number_out_of_range() {
        let err = ProtoParser::new().parse("message X {\n  string a = 536870912;\n}\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidNumber);
        assert_eq!(err.span.start.line, 1);
        assert!(err.help.is_some());
        assert!(ProtoParser::new().parse("message X {\n  string a = 536870911;\n}\n").is_ok());
        assert!(ProtoParser::new().parse("message X {\n  string a = 0;\n}\n").is_err());
    }

    #[test]
    fn test_unclosed_message() {
        let err = ProtoParser::new().parse("message X {\n  string a = 1;\n").unwrap_err();
        assert!(err.related_span.is_some());
    }
}
