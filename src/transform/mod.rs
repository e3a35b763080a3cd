//! Mutation recipes and the sequencer that chains them.
//!
//! A recipe takes ownership of a parsed tree and hands back the edited
//! tree or an error. A [`Sequence`] runs its recipes in order on one file;
//! the first failure aborts the whole sequence and none of its edits reach
//! the printed output.

mod cli;
mod genesis;
mod handler;
mod imports;
mod module;
mod options;
mod plan;
mod protos;
mod simulation;

pub use cli::{query_commands, tx_commands};
pub use genesis::{
    default_genesis, export_genesis, genesis_proto, genesis_test, genesis_types_test, init_genesis, validate_genesis,
};
pub use handler::new_handler;
pub use imports::ensure_import;
pub use module::{codec_interfaces, codec_register, grpc_gateway_routes, store_keys};
pub use options::{DataType, Field, Fields, Name, Options};
pub use plan::{list_type, Modification, Target};
pub use protos::{query_proto, tx_proto};
pub use simulation::{simulation_genesis, simulation_operations, simulation_weights};

use crate::ast::go::{Block, File, Stmt};
use crate::error::{MutateError, ParseError, RecipeError};
use crate::generate::{Generator, GoGenerator};
use crate::parser::{GoParser, Parser};
use crate::proto::ProtoFile;
use crate::walk::{self, find_function_mut, find_method_mut};
use std::path::Path;
use tracing::debug;

/// A tree a sequence can parse, edit and print back
pub trait Tree: Sized {
    fn parse(source: &str, path: &Path) -> Result<Self, ParseError>;
    fn print(&self) -> String;
}

impl Tree for File {
    fn parse(source: &str, _path: &Path) -> Result<Self, ParseError> {
        GoParser::new().parse(source)
    }

    fn print(&self) -> String {
        GoGenerator::new().generate(self)
    }
}

impl Tree for ProtoFile {
    fn parse(source: &str, path: &Path) -> Result<Self, ParseError> {
        ProtoFile::parse(source, &path.to_string_lossy())
    }

    fn print(&self) -> String {
        ProtoFile::print(self)
    }
}

/// One mutation step
pub type Recipe<T> = fn(T, &Options) -> Result<T, RecipeError>;

/// Named recipes applied in order to a single file
pub struct Sequence<T> {
    steps: Vec<(&'static str, Recipe<T>)>,
}

impl<T: Tree> Sequence<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step; `name` shows up in logs and errors
    pub fn step(mut self, name: &'static str, recipe: Recipe<T>) -> Self {
        self.steps.push((name, recipe));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|(name, _)| *name)
    }

    /// Run every step on an already parsed tree
    pub fn run(&self, tree: T, path: &Path, opts: &Options) -> Result<T, MutateError> {
        self.steps.iter().try_fold(tree, |tree, &(step, recipe)| {
            debug!(path = %path.display(), step, "applying recipe");
            recipe(tree, opts).map_err(|source| MutateError::Step { path: path.to_path_buf(), step, source })
        })
    }

    /// Parse `source`, run every step and print the result
    pub fn apply(&self, source: &str, path: &Path, opts: &Options) -> Result<String, MutateError> {
        let tree = T::parse(source, path).map_err(|source| MutateError::Parse { path: path.to_path_buf(), source })?;
        Ok(self.run(tree, path, opts)?.print())
    }
}

impl<T: Tree> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of the plain function `name`
fn function_body<'f>(file: &'f mut File, name: &str) -> Result<&'f mut Block, RecipeError> {
    find_function_mut(file, name)?
        .body
        .as_mut()
        .ok_or_else(|| RecipeError::anchor(format!("body of function {:?}", name)))
}

/// Body of the method `"Receiver.Name"`
fn method_body<'f>(file: &'f mut File, name: &str) -> Result<&'f mut Block, RecipeError> {
    find_method_mut(file, name)?
        .body
        .as_mut()
        .ok_or_else(|| RecipeError::anchor(format!("body of method {:?}", name)))
}

/// Splice `stmts` in front of the last top-level `return` of `body`
fn insert_before_return_of(body: &mut Block, stmts: Vec<Stmt>, function: &str) -> Result<(), RecipeError> {
    if walk::insert_before_return(body, stmts) {
        Ok(())
    } else {
        Err(RecipeError::anchor(format!("return statement of {:?}", function)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::FunctionCall;
    use std::path::PathBuf;

    fn opts() -> Options {
        Options::new("blog", "cosmonaut", "blog", "post").unwrap()
    }

    fn call_init(mut file: File, _: &Options) -> Result<File, RecipeError> {
        function_body(&mut file, "main")?.stmts.push(FunctionCall::new("initialize").as_statement());
        Ok(file)
    }

    fn call_run(mut file: File, _: &Options) -> Result<File, RecipeError> {
        function_body(&mut file, "main")?.stmts.push(FunctionCall::new("run").as_statement());
        Ok(file)
    }

    fn fail(_: File, _: &Options) -> Result<File, RecipeError> {
        Err(RecipeError::anchor("nothing"))
    }

    #[test]
    fn test_steps_run_in_order() {
        let sequence = Sequence::new().step("init", call_init).step("run", call_run);
        let out = sequence.apply("package main\n\nfunc main() {}\n", Path::new("main.go"), &opts()).unwrap();
        assert_eq!(out, "package main\n\nfunc main() {\n\tinitialize()\n\trun()\n}\n");
        assert_eq!(sequence.names().collect::<Vec<_>>(), vec!["init", "run"]);
    }

    #[test]
    fn test_failing_step_is_named() {
        let sequence = Sequence::new().step("init", call_init).step("broken", fail).step("run", call_run);
        let err = sequence.apply("package main\n\nfunc main() {}\n", Path::new("main.go"), &opts()).unwrap_err();
        match err {
            MutateError::Step { path, step, source } => {
                assert_eq!(path, PathBuf::from("main.go"));
                assert_eq!(step, "broken");
                assert_eq!(source, RecipeError::anchor("nothing"));
            }
            other => panic!("expected a step error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_stops_before_any_step() {
        let sequence = Sequence::new().step("init", call_init);
        let err = sequence.apply("package main\n\nfunc main( {\n", Path::new("main.go"), &opts()).unwrap_err();
        assert!(matches!(err, MutateError::Parse { .. }));
    }

    #[test]
    fn test_empty_sequence_prints_back() {
        let sequence: Sequence<File> = Sequence::new();
        assert!(sequence.is_empty());
        let source = "package main\n\nfunc main() {}\n";
        assert_eq!(sequence.apply(source, Path::new("main.go"), &opts()).unwrap(), source);
    }

    #[test]
    fn test_missing_function_surfaces_lookup_error() {
        let sequence = Sequence::new().step("init", call_init);
        let err = sequence.apply("package main\n", Path::new("main.go"), &opts()).unwrap_err();
        assert!(err.to_string().contains("could not locate function \"main\""), "{}", err);
    }

    #[test]
    fn test_insert_before_last_return() {
        let mut file = File::parse("package p\n\nfunc f() error {\n\tif x {\n\t\treturn err\n\t}\n\treturn nil\n}\n", Path::new("p.go")).unwrap();
        let body = function_body(&mut file, "f").unwrap();
        insert_before_return_of(body, vec![FunctionCall::new("y").as_statement()], "f").unwrap();
        assert_eq!(file.print(), "package p\n\nfunc f() error {\n\tif x {\n\t\treturn err\n\t}\n\ty()\n\treturn nil\n}\n");
    }

    #[test]
    fn test_missing_return_is_an_anchor_error() {
        let mut file = File::parse("package p\n\nfunc f() {\n\tx()\n}\n", Path::new("p.go")).unwrap();
        let body = function_body(&mut file, "f").unwrap();
        let err = insert_before_return_of(body, Vec::new(), "f").unwrap_err();
        assert!(err.to_string().contains("return statement of \"f\""), "{}", err);
    }
}
