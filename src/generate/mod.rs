mod go;
mod output;
mod proto;

pub use go::{print_expr, print_stmt, GoGenerator};
pub use output::Output;
pub use proto::ProtoGenerator;

/// Generator trait - converts a syntax tree back to source code
pub trait Generator {
    type Tree;

    fn generate(&self, tree: &Self::Tree) -> String;
}
