pub mod go;
pub mod proto;
pub(crate) mod scanner;

pub use go::GoParser;
pub use proto::ProtoParser;
pub use scanner::{Position, Span};

use crate::error::ParseError;

/// Parser trait - converts source code to a syntax tree
pub trait Parser {
    type Tree;

    fn parse(&self, source: &str) -> Result<Self::Tree, ParseError>;
}
