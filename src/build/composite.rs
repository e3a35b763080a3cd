use super::{identifier, Builder, Literal};
use crate::ast::go::{CompositeLit, Expr};
use crate::ast::Layout;

/// Builds a keyed composite literal, `T{Key: value, ...}`.
///
/// Struct literals default to one field per line.
#[derive(Debug, Clone)]
pub struct Structure {
    ty: Option<Expr>,
    elts: Vec<Expr>,
    layout: Layout,
}

impl Structure {
    /// Literal of the named type, which may be package qualified
    pub fn named(name: &str) -> Self {
        Self { ty: Some(identifier(name)), ..Self::anonymous() }
    }

    /// Literal without a type, as nested inside another literal
    pub fn anonymous() -> Self {
        Self { ty: None, elts: Vec::new(), layout: Layout::Lines }
    }

    /// Literal from ordered key/value pairs
    pub fn from_fields<S: AsRef<str>, I: Into<Literal>>(fields: impl IntoIterator<Item = (S, I)>) -> Self {
        fields
            .into_iter()
            .fold(Self::anonymous(), |structure, (name, item)| structure.append_field(name.as_ref(), item))
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn append_expr(self, name: &str, value: Expr) -> Self {
        self.append(Expr::key_value(identifier(name), value))
    }

    pub fn append_field(self, name: &str, item: impl Into<Literal>) -> Self {
        self.append(key_value(name, item))
    }

    /// Append a raw element, usually a key/value pair
    pub fn append(mut self, elt: Expr) -> Self {
        self.elts.push(elt);
        self
    }

    pub fn done(self) -> Expr {
        Expr::CompositeLit(CompositeLit::new(self.ty, self.elts, self.layout))
    }

    /// `&T{...}`
    pub fn address_of(self) -> Expr {
        Expr::address_of(self.done())
    }
}

impl Builder for Structure {
    fn build(self) -> Expr {
        self.done()
    }
}

/// Builds `[]T{a, b, c}`, inline unless told otherwise
#[derive(Debug, Clone)]
pub struct Slice {
    ty: Expr,
    elts: Vec<Expr>,
    layout: Layout,
}

impl Slice {
    pub fn of(name: &str) -> Self {
        Self {
            ty: Expr::ArrayType { len: None, elt: Box::new(identifier(name)) },
            elts: Vec::new(),
            layout: Layout::Inline,
        }
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn append(self, item: impl Into<Literal>) -> Self {
        self.append_expr(item.into().into_expr())
    }

    pub fn extend<I: Into<Literal>>(self, items: impl IntoIterator<Item = I>) -> Self {
        items.into_iter().fold(self, |slice, item| slice.append(item))
    }

    pub fn append_expr(mut self, expr: Expr) -> Self {
        self.elts.push(expr);
        self
    }

    pub fn node(self) -> CompositeLit {
        CompositeLit::new(Some(self.ty), self.elts, self.layout)
    }
}

impl Builder for Slice {
    fn build(self) -> Expr {
        Expr::CompositeLit(self.node())
    }
}

/// `Key: value`
pub fn key_value(name: &str, item: impl Into<Literal>) -> Expr {
    Expr::key_value(identifier(name), item.into().into_expr())
}

/// Untyped `{Key: value, ...}` literal, one pair per line
pub fn key_values<S: AsRef<str>, I: Into<Literal>>(fields: impl IntoIterator<Item = (S, I)>) -> Expr {
    Structure::from_fields(fields).done()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{int, string};
    use crate::generate::print_expr;

    #[test]
    fn test_structure_lines() {
        let expr = Structure::named("types.Post").append_field("Id", 0).append_field("Creator", "cosmos1").address_of();
        assert_eq!(print_expr(&expr), "&types.Post{\n\tId: 0,\n\tCreator: \"cosmos1\",\n}");
    }

    #[test]
    fn test_structure_inline_and_empty() {
        let expr = Structure::named("Params").layout(Layout::Inline).append_expr("Enabled", Expr::ident("true")).done();
        assert_eq!(print_expr(&expr), "Params{Enabled: true}");
        assert_eq!(print_expr(&Structure::named("types.Post").done()), "types.Post{}");
    }

    #[test]
    fn test_nested_anonymous_literal() {
        let slice = Slice::of("types.Post")
            .layout(Layout::Lines)
            .append(Structure::from_fields([("Id", int(0))]))
            .append(key_values([("Id", 1)]));
        assert_eq!(print_expr(&slice.build()), "[]types.Post{\n\t{\n\t\tId: 0,\n\t},\n\t{\n\t\tId: 1,\n\t},\n}");
    }

    #[test]
    fn test_slice_inline() {
        let slice = Slice::of("string").extend(["a", "b"]).append_expr(string("c"));
        assert_eq!(print_expr(&slice.build()), "[]string{\"a\", \"b\", \"c\"}");
    }
}
