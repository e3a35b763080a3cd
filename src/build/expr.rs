use super::{identifier, string, Block, Builder, Literal};
use crate::ast::go::{CallExpr, Expr, Field, FuncLit, FuncType, Stmt, StmtKind};
use crate::ast::Decor;

/// Builds a call expression, usable as an expression or a statement
#[derive(Debug, Clone)]
pub struct FunctionCall {
    inner: CallExpr,
    decor: Decor,
}

impl FunctionCall {
    /// Call the function named by `name`, which may be dotted
    pub fn new(name: &str) -> Self {
        Self::of(identifier(name))
    }

    /// Call an arbitrary callee expression
    pub fn of(fun: Expr) -> Self {
        Self {
            inner: CallExpr::new(fun),
            decor: Decor::default(),
        }
    }

    pub fn with_parameters(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        for expr in exprs {
            self.inner.push(expr);
        }
        self
    }

    pub fn with_parameter(self, item: impl Into<Literal>) -> Self {
        self.with_parameters([item.into().into_expr()])
    }

    /// Identifier or selector argument
    pub fn with_argument(self, name: &str) -> Self {
        self.with_parameters([identifier(name)])
    }

    pub fn with_vars(self, names: &[&str]) -> Self {
        self.with_parameters(names.iter().map(|name| identifier(name)))
    }

    pub fn with_string(self, text: &str) -> Self {
        self.with_parameters([string(text)])
    }

    /// Last argument spread with `...`, finishing the call
    pub fn with_variadic_argument(self, name: &str) -> Expr {
        self.with_variadic_expression(identifier(name))
    }

    pub fn with_variadic_expression(mut self, expr: Expr) -> Expr {
        self.inner.push(expr);
        self.inner.ellipsis = true;
        self.build()
    }

    /// Comment placed above the call once it is a statement
    pub fn prepend_comment(mut self, text: &str) -> Self {
        self.decor = self.decor.with_comment(text);
        self
    }

    /// Separate the statement from the previous one by an empty line
    pub fn spaced(mut self) -> Self {
        self.decor.before = crate::ast::Spacing::EmptyLine;
        self
    }

    pub fn as_statement(self) -> Stmt {
        Stmt::new(StmtKind::Expr(Expr::Call(self.inner))).with_decor(self.decor)
    }

    pub fn node(self) -> CallExpr {
        self.inner
    }
}

impl Builder for FunctionCall {
    fn build(self) -> Expr {
        Expr::Call(self.node())
    }
}

/// Builds `x[index]`
#[derive(Debug, Clone)]
pub struct IndexExpression {
    x: Expr,
}

impl IndexExpression {
    pub fn new(x: Expr) -> Self {
        Self { x }
    }

    /// Index into the collection named by `name`
    pub fn named(name: &str) -> Self {
        Self::new(identifier(name))
    }

    pub fn with_identifier(self, name: &str) -> Expr {
        self.with(identifier(name))
    }

    pub fn with(self, index: Expr) -> Expr {
        Expr::Index { x: Box::new(self.x), index: Box::new(index) }
    }
}

/// Builds a function literal
#[derive(Debug, Clone, Default)]
pub struct Function {
    ty: FuncType,
    body: Block,
}

impl Function {
    /// Empty `func() {}`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, name: &str, ty: Expr) -> Self {
        self.ty.params.push(Field::new(vec![name.to_string()], ty));
        self
    }

    pub fn result(mut self, ty: Expr) -> Self {
        self.ty.results.push(Field::unnamed(ty));
        self
    }

    /// Add statements to the body
    pub fn body(mut self, f: impl FnOnce(&mut Block)) -> Self {
        f(&mut self.body);
        self
    }
}

impl Builder for Function {
    fn build(self) -> Expr {
        Expr::FuncLit(FuncLit { ty: self.ty, body: self.body.done() })
    }
}
