use super::{identifier, true_, FunctionCall, Literal};
use crate::ast::go::{
    AssignOp, AssignStmt, BinaryOp, Block as BlockNode, BranchKeyword, Expr, IfStmt, RangeStmt, Stmt, StmtKind,
};
use crate::ast::{Decor, Spacing};

/// Builds an assignment or a definition
#[derive(Debug, Clone)]
pub struct Assignment {
    inner: AssignStmt,
    decor: Decor,
}

impl Assignment {
    /// `lhs... = `
    pub fn assign(lhs: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            inner: AssignStmt { lhs: lhs.into_iter().collect(), op: AssignOp::Assign, rhs: Vec::new() },
            decor: Decor::default(),
        }
    }

    /// `lhs... := `
    pub fn define(lhs: impl IntoIterator<Item = Expr>) -> Self {
        let mut assignment = Self::assign(lhs);
        assignment.inner.op = AssignOp::Define;
        assignment
    }

    /// Assign to an identifier or selector
    pub fn variable(name: &str) -> Self {
        Self::assign([identifier(name)])
    }

    pub fn define_variable(name: &str) -> Self {
        Self::define([identifier(name)])
    }

    /// `name, err = `
    pub fn check(name: &str) -> Self {
        Self::assign([identifier(name), Expr::ident("err")])
    }

    /// `name, err := `
    pub fn define_check(name: &str) -> Self {
        Self::define([identifier(name), Expr::ident("err")])
    }

    /// `collection[index] = `
    pub fn index(collection: Expr, index: Expr) -> Self {
        Self::assign([Expr::Index { x: Box::new(collection), index: Box::new(index) }])
    }

    /// Add one more name on the left
    pub fn target(mut self, name: &str) -> Self {
        self.inner.lhs.push(identifier(name));
        self
    }

    pub fn prepend_comment(mut self, text: &str) -> Self {
        self.decor = self.decor.with_comment(text);
        self
    }

    pub fn spaced(mut self) -> Self {
        self.decor.before = Spacing::EmptyLine;
        self
    }

    /// Set the right-hand side, finishing the statement
    pub fn to<I: Into<Literal>>(mut self, rhs: impl IntoIterator<Item = I>) -> Stmt {
        self.inner.rhs = rhs.into_iter().map(|item| item.into().into_expr()).collect();
        self.node()
    }

    fn node(self) -> Stmt {
        Stmt::new(StmtKind::Assign(self.inner)).with_decor(self.decor)
    }
}

/// Statement list handed to `then`, `body` and similar callbacks
#[derive(Debug, Clone, Default)]
pub struct Block {
    stmts: Vec<Stmt>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, stmt: impl Into<Stmt>) -> &mut Self {
        self.stmts.push(stmt.into());
        self
    }

    pub fn extend(&mut self, stmts: impl IntoIterator<Item = Stmt>) -> &mut Self {
        self.stmts.extend(stmts);
        self
    }

    /// Function call as a statement
    pub fn call(&mut self, call: FunctionCall) -> &mut Self {
        self.append(call.as_statement())
    }

    pub fn if_stmt(&mut self, stmt: IfStatement) -> &mut Self {
        self.append(stmt.node())
    }

    pub fn continue_stmt(&mut self) -> &mut Self {
        self.append(StmtKind::Branch { keyword: BranchKeyword::Continue, label: None })
    }

    pub fn break_stmt(&mut self) -> &mut Self {
        self.append(StmtKind::Branch { keyword: BranchKeyword::Break, label: None })
    }

    /// `return` with the given results, none for a bare return
    pub fn returns<I: Into<Literal>>(&mut self, items: impl IntoIterator<Item = I>) -> &mut Self {
        let results = items.into_iter().map(|item| item.into().into_expr()).collect();
        self.append(StmtKind::Return(results))
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn done(self) -> BlockNode {
        BlockNode::new(self.stmts)
    }
}

/// Builds an `if` statement whose condition can be reshaped.
///
/// Comparisons only wrap identifiers and parenthesized conditions; anything
/// else is parenthesized first so the result never depends on precedence.
#[derive(Debug, Clone)]
pub struct IfStatement {
    init: Option<Stmt>,
    cond: Expr,
    body: Block,
    els: Option<Block>,
    decor: Decor,
}

impl IfStatement {
    pub fn new(cond: Expr) -> Self {
        Self { init: None, cond, body: Block::new(), els: None, decor: Decor::default() }
    }

    /// Condition on an identifier or selector
    pub fn var(name: &str) -> Self {
        Self::new(identifier(name))
    }

    /// Replace the body
    pub fn then(mut self, f: impl FnOnce(&mut Block)) -> Self {
        let mut body = Block::new();
        f(&mut body);
        self.body = body;
        self
    }

    pub fn otherwise(mut self, f: impl FnOnce(&mut Block)) -> Self {
        let mut els = Block::new();
        f(&mut els);
        self.els = Some(els);
        self
    }

    /// `cond == true`, unless the condition already reads as a boolean
    pub fn is_true(self) -> Self {
        match self.cond {
            Expr::Ident(_) | Expr::Paren(_) => self,
            _ => self.is_equal_to(true_()),
        }
    }

    pub fn is_equal_to(self, expr: Expr) -> Self {
        self.compare(BinaryOp::Eql, expr, false)
    }

    pub fn is_greater_or_equal_to(self, expr: Expr) -> Self {
        self.compare(BinaryOp::Geq, expr, true)
    }

    pub fn is_greater_or_equal_to_var(self, name: &str) -> Self {
        self.is_greater_or_equal_to(identifier(name))
    }

    fn compare(mut self, op: BinaryOp, expr: Expr, selector_ok: bool) -> Self {
        match self.cond {
            Expr::Ident(_) | Expr::Paren(_) => {}
            Expr::Selector { .. } if selector_ok => {}
            cond => {
                self.cond = Expr::paren(cond);
                return self.compare(op, expr, selector_ok);
            }
        }
        self.cond = Expr::binary(self.cond, op, expr);
        self
    }

    pub fn condition(&self) -> &Expr {
        &self.cond
    }

    pub fn prepend_comment(mut self, text: &str) -> Self {
        self.decor = self.decor.with_comment(text);
        self
    }

    pub fn spaced(mut self) -> Self {
        self.decor.before = Spacing::EmptyLine;
        self
    }

    pub fn node(self) -> Stmt {
        let els = self.els.map(|block| Box::new(Stmt::new(StmtKind::Block(block.done()))));
        Stmt::new(StmtKind::If(IfStmt {
            init: self.init.map(Box::new),
            cond: self.cond,
            body: self.body.done(),
            els,
        }))
        .with_decor(self.decor)
    }
}

/// Builds `if a, b := rhs; cond { ... }`
#[derive(Debug, Clone)]
pub struct WhenBuilder {
    assign: Assignment,
    rhs: Vec<Expr>,
}

impl WhenBuilder {
    /// Bind existing variables with `=`
    pub fn assigning(items: &[&str]) -> Self {
        Self::targets(AssignOp::Assign, items)
    }

    /// Bind new variables with `:=`
    pub fn defining(items: &[&str]) -> Self {
        Self::targets(AssignOp::Define, items)
    }

    fn targets(op: AssignOp, items: &[&str]) -> Self {
        let mut assign = Assignment::assign(items.iter().map(|item| identifier(item)));
        assign.inner.op = op;
        Self { assign, rhs: Vec::new() }
    }

    pub fn to<I: Into<Literal>>(mut self, items: impl IntoIterator<Item = I>) -> Self {
        self.rhs = items.into_iter().map(|item| item.into().into_expr()).collect();
        self
    }

    pub fn if_var(self, name: &str) -> IfStatement {
        self.if_expr(identifier(name))
    }

    pub fn if_expr(self, cond: Expr) -> IfStatement {
        let mut stmt = IfStatement::new(cond);
        stmt.init = Some(self.assign.to(self.rhs));
        stmt
    }
}

/// Loop variables of a range statement, before its range expression is known
#[derive(Debug, Clone)]
pub struct RangeHeader {
    key: Option<Expr>,
    value: Option<Expr>,
    define: bool,
}

impl RangeHeader {
    pub fn key(mut self, name: &str) -> Self {
        self.key = Some(identifier(name));
        self
    }

    pub fn value(mut self, name: &str) -> Self {
        self.value = Some(identifier(name));
        self
    }

    /// Use `=` instead of `:=`
    pub fn assignment(mut self) -> Self {
        self.define = false;
        self
    }

    /// Range over an identifier or selector
    pub fn over(self, name: &str) -> RangeStatement {
        self.of(identifier(name))
    }

    pub fn of(self, x: Expr) -> RangeStatement {
        RangeStatement { header: self, x, body: Block::new(), decor: Decor::default() }
    }
}

/// Builds a `for ... range` loop
#[derive(Debug, Clone)]
pub struct RangeStatement {
    header: RangeHeader,
    x: Expr,
    body: Block,
    decor: Decor,
}

impl RangeStatement {
    /// `for _, value := range`
    pub fn for_each_item(value: &str) -> RangeHeader {
        RangeHeader { key: Some(Expr::ident("_")), value: Some(identifier(value)), define: true }
    }

    /// `for key, value := range`
    pub fn for_each(key: &str, value: &str) -> RangeHeader {
        Self::for_each_item(value).key(key)
    }

    pub fn body(mut self, f: impl FnOnce(&mut Block)) -> Self {
        let mut body = Block::new();
        f(&mut body);
        self.body = body;
        self
    }

    pub fn with(mut self, block: Block) -> Self {
        self.body = block;
        self
    }

    pub fn prepend_comment(mut self, text: &str) -> Self {
        self.decor = self.decor.with_comment(text);
        self
    }

    pub fn spaced(mut self) -> Self {
        self.decor.before = Spacing::EmptyLine;
        self
    }

    pub fn node(self) -> Stmt {
        Stmt::new(StmtKind::Range(RangeStmt {
            key: self.header.key,
            value: self.header.value,
            define: self.header.define,
            x: self.x,
            body: self.body.done(),
        }))
        .with_decor(self.decor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{int, nil, Builder, IndexExpression};
    use crate::generate::print_stmt;

    #[test]
    fn test_assignment_forms() {
        let stmt = Assignment::define_check("res").to([FunctionCall::new("f").build()]);
        assert_eq!(print_stmt(&stmt), "res, err := f()");
        let stmt = Assignment::index(Expr::ident("m"), Expr::ident("k")).to([true]);
        assert_eq!(print_stmt(&stmt), "m[k] = true");
        let stmt = Assignment::variable("genesis.PostCount").target("x").to([int(1), int(2)]);
        assert_eq!(print_stmt(&stmt), "genesis.PostCount, x = 1, 2");
    }

    #[test]
    fn test_is_true_keeps_identifiers() {
        let stmt = IfStatement::var("ok").is_true().then(|b| {
            b.returns([nil()]);
        });
        assert_eq!(print_stmt(&stmt.node()), "if ok {\n\treturn nil\n}");
    }

    #[test]
    fn test_is_true_wraps_other_shapes() {
        let cond = Expr::binary(Expr::ident("a"), BinaryOp::LOr, Expr::ident("b"));
        let stmt = IfStatement::new(cond).is_true();
        assert_eq!(crate::generate::print_expr(stmt.condition()), "(a || b) == true");
    }

    #[test]
    fn test_greater_or_equal_accepts_selector() {
        let stmt = IfStatement::var("elem.Id").is_greater_or_equal_to_var("gs.PostCount");
        assert_eq!(crate::generate::print_expr(stmt.condition()), "elem.Id >= gs.PostCount");
        let stmt = IfStatement::var("elem.Id").is_equal_to(int(0));
        assert_eq!(crate::generate::print_expr(stmt.condition()), "(elem.Id) == 0");
    }

    #[test]
    fn test_when_defining() {
        let stmt = WhenBuilder::defining(&["_", "ok"])
            .to([IndexExpression::named("postIdMap").with_identifier("elem.Id")])
            .if_var("ok")
            .then(|b| {
                b.returns([crate::build::errorf("duplicated id for post").build()]);
            });
        assert_eq!(
            print_stmt(&stmt.node()),
            "if _, ok := postIdMap[elem.Id]; ok {\n\treturn fmt.Errorf(\"duplicated id for post\")\n}"
        );
    }

    #[test]
    fn test_when_assigning_uses_plain_assign() {
        let stmt = WhenBuilder::assigning(&["v"]).to([int(1)]).if_var("v").node();
        assert_eq!(print_stmt(&stmt), "if v = 1; v {}");
    }

    #[test]
    fn test_range_statement() {
        let stmt = RangeStatement::for_each_item("elem")
            .over("genState.PostList")
            .prepend_comment("Set all the post")
            .body(|b| {
                b.call(FunctionCall::new("k.SetPost").with_vars(&["ctx", "elem"]));
            })
            .node();
        assert_eq!(
            print_stmt(&stmt),
            "// Set all the post\nfor _, elem := range genState.PostList {\n\tk.SetPost(ctx, elem)\n}"
        );
    }

    #[test]
    fn test_range_with_assignment() {
        let stmt = RangeStatement::for_each("i", "v").assignment().of(Expr::ident("xs")).node();
        assert_eq!(print_stmt(&stmt), "for i, v = range xs {}");
    }
}
