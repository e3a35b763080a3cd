//! Build, edit and print Go and Protocol Buffers sources.
//!
//! Sources are parsed into syntax trees ([`parser`]), edited with fluent
//! builders ([`build`]), cursor walks ([`walk`]) and the protobuf file model
//! ([`proto`]), then printed back in canonical form ([`generate`]). The
//! [`transform`] module chains those pieces into recipes that wire a new list
//! type into a Cosmos SDK application.

pub mod ast;
pub mod build;
pub mod error;
pub mod generate;
pub mod parser;
pub mod proto;
pub mod transform;
pub mod walk;

pub use error::{ConfigError, LookupError, MutateError, ParseError, ProtoError, RecipeError};
pub use proto::ProtoFile;
pub use transform::{list_type, Modification, Options, Sequence, Target, Tree};

use std::path::Path;

/// Kind of source a path holds, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Go,
    Proto,
}

impl SourceKind {
    pub fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "go" => Some(SourceKind::Go),
            "proto" => Some(SourceKind::Proto),
            _ => None,
        }
    }
}

/// Parse and print a source back in canonical form
pub fn format_source(source: &str, path: &Path) -> Result<String, ParseError> {
    match SourceKind::of(path) {
        Some(SourceKind::Proto) => Ok(ProtoFile::parse(source, &path.to_string_lossy())?.print()),
        _ => Ok(<ast::go::File as Tree>::parse(source, path)?.print()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind() {
        assert_eq!(SourceKind::of(Path::new("x/blog/genesis.go")), Some(SourceKind::Go));
        assert_eq!(SourceKind::of(Path::new("proto/blog/tx.proto")), Some(SourceKind::Proto));
        assert_eq!(SourceKind::of(Path::new("README.md")), None);
        assert_eq!(SourceKind::of(Path::new("Makefile")), None);
    }

    #[test]
    fn test_format_source_normalizes() {
        let out = format_source("package main\nfunc main() {\n}\n", Path::new("main.go")).unwrap();
        assert_eq!(out, "package main\n\nfunc main() {}\n");

        let out = format_source("syntax = \"proto3\";\npackage a;\n", Path::new("a.proto")).unwrap();
        assert_eq!(out, "syntax = \"proto3\";\n\npackage a;\n");
    }
}
