pub mod tokenizer;
mod tree_builder;

pub use tokenizer::{tokenize, Token, TokenKind};
use tree_builder::TreeBuilder;

use super::Parser;
use crate::ast::go::File;
use crate::error::ParseError;

/// Go source parser
pub struct GoParser {
    // Configuration only, no state
}

impl GoParser {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GoParser {
    type Tree = File;

    fn parse(&self, source: &str) -> Result<File, ParseError> {
        let tokens = tokenize(source)?;
        let mut builder = TreeBuilder::new(tokens);
        builder.build()
    }
}
