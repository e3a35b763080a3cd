//! Fluent builders for Go syntax fragments.
//!
//! Every builder owns the node it is shaping and hands it over when its
//! terminal method (`node`, `build`, `done`, `to`) consumes the builder.

mod composite;
mod expr;
mod stmt;

pub use composite::{key_value, key_values, Slice, Structure};
pub use expr::{Function, FunctionCall, IndexExpression};
pub use stmt::{Assignment, Block, IfStatement, RangeHeader, RangeStatement, WhenBuilder};

use crate::ast::go::{BasicLit, DeclKeyword, Expr, GenDecl, Spec, Stmt, StmtKind, ValueSpec};
use crate::ast::Decor;

/// Anything that finishes into an expression
pub trait Builder {
    fn build(self) -> Expr;
}

/// A literal-like value accepted wherever the builders take "an item"
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Str(String),
    Bool(bool),
    Expr(Expr),
}

impl Literal {
    pub fn into_expr(self) -> Expr {
        match self {
            Literal::Int(value) => Expr::BasicLit(BasicLit::int(value)),
            Literal::Str(text) => Expr::BasicLit(BasicLit::string(&text)),
            Literal::Bool(value) => Expr::ident(value.to_string()),
            Literal::Expr(expr) => expr,
        }
    }
}

macro_rules! literal_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Literal {
            fn from(value: $ty) -> Self {
                Literal::Int(i64::from(value))
            }
        })*
    };
}

literal_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Literal {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => Literal::Int(value),
            // Past i64, keep the digits verbatim
            Err(_) => Literal::Expr(Expr::BasicLit(BasicLit { kind: crate::ast::go::LitKind::Int, value: value.to_string() })),
        }
    }
}

impl From<&str> for Literal {
    fn from(text: &str) -> Self {
        Literal::Str(text.to_string())
    }
}

impl From<String> for Literal {
    fn from(text: String) -> Self {
        Literal::Str(text)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<Expr> for Literal {
    fn from(expr: Expr) -> Self {
        Literal::Expr(expr)
    }
}

impl From<Structure> for Literal {
    fn from(structure: Structure) -> Self {
        Literal::Expr(structure.build())
    }
}

impl From<Slice> for Literal {
    fn from(slice: Slice) -> Self {
        Literal::Expr(slice.build())
    }
}

impl From<FunctionCall> for Literal {
    fn from(call: FunctionCall) -> Self {
        Literal::Expr(call.build())
    }
}

impl From<Function> for Literal {
    fn from(function: Function) -> Self {
        Literal::Expr(function.build())
    }
}

/// Identifier for a bare name, left-nested selector chain for `a.b.c`
pub fn identifier(name: &str) -> Expr {
    let mut parts = name.split('.');
    let first = Expr::ident(parts.next().unwrap_or_default());
    parts.fold(first, Expr::selector)
}

pub fn string(text: &str) -> Expr {
    Expr::BasicLit(BasicLit::string(text))
}

pub fn int(value: i64) -> Expr {
    Expr::BasicLit(BasicLit::int(value))
}

pub fn true_() -> Expr {
    Expr::ident("true")
}

pub fn false_() -> Expr {
    Expr::ident("false")
}

pub fn nil() -> Expr {
    Expr::ident("nil")
}

/// `&x`
pub fn address_of(expr: Expr) -> Expr {
    Expr::address_of(expr)
}

/// `make([]T)`
pub fn make_slice_of(name: &str) -> Expr {
    let slice = Expr::ArrayType { len: None, elt: Box::new(identifier(name)) };
    FunctionCall::new("make").with_parameters([slice]).build()
}

/// `make(map[K]V)`
pub fn make_map_of(key: &str, value: &str) -> Expr {
    let map = Expr::MapType { key: Box::new(identifier(key)), value: Box::new(identifier(value)) };
    FunctionCall::new("make").with_parameters([map]).build()
}

/// `fmt.Errorf("...")` with the message already formatted
pub fn errorf(message: impl AsRef<str>) -> FunctionCall {
    FunctionCall::new("fmt.Errorf").with_string(message.as_ref())
}

/// `var name Type`
pub fn uninitialized_var(name: &str, type_name: &str) -> Stmt {
    let spec = ValueSpec {
        names: vec![name.to_string()],
        ty: Some(identifier(type_name)),
        values: Vec::new(),
        decor: Decor::default(),
    };
    Stmt::new(StmtKind::Decl(GenDecl::new(DeclKeyword::Var, vec![Spec::Value(spec)])))
}

/// `name = item` as a spec for a `const` or `var` group
pub fn global(name: &str, item: impl Into<Literal>) -> Spec {
    Spec::Value(ValueSpec {
        names: vec![name.to_string()],
        ty: None,
        values: vec![item.into().into_expr()],
        decor: Decor::default(),
    })
}

/// `name Type = item`
pub fn typed_global(name: &str, type_name: &str, item: impl Into<Literal>) -> Spec {
    let mut spec = global(name, item);
    if let Spec::Value(value) = &mut spec {
        value.ty = Some(identifier(type_name));
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{print_expr, print_stmt};

    #[test]
    fn test_identifier_builds_left_nested_chain() {
        let expr = identifier("genState.PostList.Items");
        match &expr {
            Expr::Selector { x, sel } => {
                assert_eq!(sel, "Items");
                assert!(matches!(x.as_ref(), Expr::Selector { sel, .. } if sel == "PostList"));
            }
            other => panic!("expected selector, got {:?}", other),
        }
        assert_eq!(expr.dotted_name().as_deref(), Some("genState.PostList.Items"));
        assert_eq!(identifier("k"), Expr::ident("k"));
    }

    #[test]
    fn test_literal_conversion() {
        assert_eq!(print_expr(&Literal::from(7u8).into_expr()), "7");
        assert_eq!(print_expr(&Literal::from("a\"b").into_expr()), "\"a\\\"b\"");
        assert_eq!(print_expr(&Literal::from(true).into_expr()), "true");
        assert_eq!(print_expr(&Literal::from(u64::MAX).into_expr()), "18446744073709551615");
    }

    #[test]
    fn test_make_helpers() {
        assert_eq!(print_expr(&make_slice_of("types.Post")), "make([]types.Post)");
        assert_eq!(print_expr(&make_map_of("string", "bool")), "make(map[string]bool)");
    }

    #[test]
    fn test_uninitialized_var() {
        assert_eq!(print_stmt(&uninitialized_var("weightMsgCreatePost", "int")), "var weightMsgCreatePost int");
    }
}
