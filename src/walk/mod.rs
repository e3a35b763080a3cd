//! Pre-order traversal of a Go tree with in-place editing.
//!
//! [`apply`] visits every node below the root and hands the visitor a
//! [`Cursor`]. Edits requested through the cursor are applied once the
//! visitor returns, so a visitor only ever sees a consistent tree. Nodes
//! inserted by a visitor are not visited themselves.

mod find;
mod inspect;

pub use find::{find_function, find_function_mut, find_method, find_method_mut};
pub use inspect::{
    composite_literal, composite_literal_mut, key_as_identifier, value_as_basic_literal, value_as_composite_literal,
    value_as_composite_literal_mut,
};

use crate::ast::go::{
    Block, CaseClause, CompositeLit, Decl, Element, Expr, Field, File, FuncType, Spec, Stmt, StmtKind,
};

/// Mutable view of the node under the cursor
#[derive(Debug)]
pub enum NodeMut<'a> {
    File(&'a mut File),
    Decl(&'a mut Decl),
    Spec(&'a mut Spec),
    Field(&'a mut Field),
    Block(&'a mut Block),
    Stmt(&'a mut Stmt),
    Case(&'a mut CaseClause),
    Expr(&'a mut Expr),
}

impl<'a> From<&'a mut File> for NodeMut<'a> {
    fn from(file: &'a mut File) -> Self {
        NodeMut::File(file)
    }
}

impl<'a> From<&'a mut Block> for NodeMut<'a> {
    fn from(block: &'a mut Block) -> Self {
        NodeMut::Block(block)
    }
}

impl<'a> From<&'a mut Stmt> for NodeMut<'a> {
    fn from(stmt: &'a mut Stmt) -> Self {
        NodeMut::Stmt(stmt)
    }
}

impl<'a> From<&'a mut Expr> for NodeMut<'a> {
    fn from(expr: &'a mut Expr) -> Self {
        NodeMut::Expr(expr)
    }
}

/// A node handed to the cursor for insertion or replacement
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Decl(Decl),
    Spec(Spec),
    Field(Field),
    Block(Block),
    Stmt(Stmt),
    Case(CaseClause),
    Expr(Expr),
}

impl Node {
    fn kind(&self) -> &'static str {
        match self {
            Node::Decl(_) => "declaration",
            Node::Spec(_) => "spec",
            Node::Field(_) => "field",
            Node::Block(_) => "block",
            Node::Stmt(_) => "statement",
            Node::Case(_) => "case clause",
            Node::Expr(_) => "expression",
        }
    }
}

macro_rules! node_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(impl From<$ty> for Node {
            fn from(node: $ty) -> Self {
                Node::$variant(node)
            }
        })*
    };
}

node_from!(Decl => Decl, Spec => Spec, Field => Field, Block => Block, Stmt => Stmt, Case => CaseClause, Expr => Expr);

/// Kind of node that holds the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    File,
    GenDecl,
    FuncDecl,
    Spec,
    Field,
    Block,
    Stmt,
    CaseClause,
    CompositeLit,
    Call,
    Expr,
}

#[derive(Debug, Default)]
struct Edits {
    replace: Option<Node>,
    before: Vec<Node>,
    after: Vec<Node>,
    delete: bool,
}

impl Edits {
    fn has_list_edits(&self) -> bool {
        self.delete || !self.before.is_empty() || !self.after.is_empty()
    }
}

/// Handle on the node being visited
#[derive(Debug)]
pub struct Cursor<'a> {
    node: NodeMut<'a>,
    parent: Parent,
    index: Option<usize>,
    edits: Edits,
}

impl<'a> Cursor<'a> {
    fn new(node: NodeMut<'a>, parent: Parent, index: Option<usize>) -> Self {
        Self { node, parent, index, edits: Edits::default() }
    }

    pub fn node(&self) -> &NodeMut<'a> {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut NodeMut<'a> {
        &mut self.node
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    /// Position inside the parent's list, `None` for a single child
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn stmt(&self) -> Option<&Stmt> {
        match &self.node {
            NodeMut::Stmt(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn stmt_mut(&mut self) -> Option<&mut Stmt> {
        match &mut self.node {
            NodeMut::Stmt(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn expr(&self) -> Option<&Expr> {
        match &self.node {
            NodeMut::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn expr_mut(&mut self) -> Option<&mut Expr> {
        match &mut self.node {
            NodeMut::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    /// The composite literal under the cursor, if that is what it is
    pub fn composite_lit_mut(&mut self) -> Option<&mut CompositeLit> {
        match &mut self.node {
            NodeMut::Expr(Expr::CompositeLit(lit)) => Some(lit),
            _ => None,
        }
    }

    pub fn case_clause_mut(&mut self) -> Option<&mut CaseClause> {
        match &mut self.node {
            NodeMut::Case(clause) => Some(clause),
            _ => None,
        }
    }

    /// Replace the current node once the visitor returns. Children of the
    /// replacement are walked when the visitor asked for descent.
    pub fn replace(&mut self, node: impl Into<Node>) {
        self.edits.replace = Some(node.into());
    }

    /// Insert a sibling before the current node. Only valid inside a list.
    pub fn insert_before(&mut self, node: impl Into<Node>) {
        self.require_list("insert_before");
        self.edits.before.push(node.into());
    }

    /// Insert a sibling after the current node. Only valid inside a list.
    ///
    /// Several calls keep their call order.
    pub fn insert_after(&mut self, node: impl Into<Node>) {
        self.require_list("insert_after");
        self.edits.after.push(node.into());
    }

    /// Remove the current node from its list; its children are not walked
    pub fn delete(&mut self) {
        self.require_list("delete");
        self.edits.delete = true;
    }

    fn require_list(&self, operation: &str) {
        if self.index.is_none() {
            panic!("Cursor::{} called on a node that is not a list element ({:?} child)", operation, self.parent);
        }
    }

    fn into_parts(self) -> (NodeMut<'a>, Edits) {
        (self.node, self.edits)
    }
}

/// Walk `root` in pre-order, calling `visit` on every node below it.
///
/// The visitor returns whether to descend into the current node's
/// children. Absent optional children (an `if` without `else`, a bodyless
/// function) are simply not visited.
pub fn apply<'t, F>(root: impl Into<NodeMut<'t>>, mut visit: F)
where
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    walk_children(root.into(), &mut visit);
}

/// A node that can sit in a list or single child slot
trait Walkable: Sized {
    fn wrap(&mut self) -> NodeMut<'_>;
    fn unwrap(node: Node) -> Result<Self, Node>;

    fn take_place(&mut self, replacement: Self) {
        *self = replacement;
    }
}

macro_rules! walkable {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(impl Walkable for $ty {
            fn wrap(&mut self) -> NodeMut<'_> {
                NodeMut::$variant(self)
            }

            fn unwrap(node: Node) -> Result<Self, Node> {
                match node {
                    Node::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        })*
    };
}

walkable!(Decl => Decl, Spec => Spec, Field => Field, Block => Block, Stmt => Stmt, Case => CaseClause, Expr => Expr);

/// Literal elements and call arguments are visited as their expression
impl Walkable for Element {
    fn wrap(&mut self) -> NodeMut<'_> {
        NodeMut::Expr(&mut self.expr)
    }

    fn unwrap(node: Node) -> Result<Self, Node> {
        <Expr as Walkable>::unwrap(node).map(Element::from)
    }

    // A replaced element keeps its comments
    fn take_place(&mut self, replacement: Self) {
        self.expr = replacement.expr;
    }
}

fn convert<T: Walkable>(node: Node, slot: &str) -> T {
    match T::unwrap(node) {
        Ok(inner) => inner,
        Err(other) => panic!("expected a {} node, got {}", slot, other.kind()),
    }
}

fn slot_name<T: Walkable>(item: &mut T) -> &'static str {
    match item.wrap() {
        NodeMut::File(_) => "file",
        NodeMut::Decl(_) => "declaration",
        NodeMut::Spec(_) => "spec",
        NodeMut::Field(_) => "field",
        NodeMut::Block(_) => "block",
        NodeMut::Stmt(_) => "statement",
        NodeMut::Case(_) => "case clause",
        NodeMut::Expr(_) => "expression",
    }
}

fn walk_list<T, F>(list: &mut Vec<T>, parent: Parent, visit: &mut F)
where
    T: Walkable,
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    let mut i = 0;
    while i < list.len() {
        let slot = slot_name(&mut list[i]);
        let mut cursor = Cursor::new(list[i].wrap(), parent, Some(i));
        let descend = visit(&mut cursor);
        let (_, edits) = cursor.into_parts();

        if let Some(node) = edits.replace {
            list[i].take_place(convert(node, slot));
        }
        if descend && !edits.delete {
            walk_children(list[i].wrap(), visit);
        }

        let before: Vec<T> = edits.before.into_iter().map(|node| convert(node, slot)).collect();
        let after: Vec<T> = edits.after.into_iter().map(|node| convert(node, slot)).collect();
        let kept = usize::from(!edits.delete);
        let step = before.len() + kept + after.len();

        let mut segment = before;
        if edits.delete {
            list.remove(i);
        } else {
            segment.push(list.remove(i));
        }
        segment.extend(after);
        list.splice(i..i, segment);
        i += step;
    }
}

fn walk_one<T, F>(item: &mut T, parent: Parent, visit: &mut F)
where
    T: Walkable,
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    let slot = slot_name(item);
    let mut cursor = Cursor::new(item.wrap(), parent, None);
    let descend = visit(&mut cursor);
    let (_, edits) = cursor.into_parts();
    debug_assert!(!edits.has_list_edits());

    if let Some(node) = edits.replace {
        item.take_place(convert(node, slot));
    }
    if descend {
        walk_children(item.wrap(), visit);
    }
}

fn walk_opt<T, F>(item: &mut Option<T>, parent: Parent, visit: &mut F)
where
    T: Walkable,
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    if let Some(item) = item {
        walk_one(item, parent, visit);
    }
}

fn walk_boxed<T, F>(item: &mut Option<Box<T>>, parent: Parent, visit: &mut F)
where
    T: Walkable,
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    if let Some(item) = item {
        walk_one(&mut **item, parent, visit);
    }
}

fn walk_func_type<F>(ty: &mut FuncType, parent: Parent, visit: &mut F)
where
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    walk_list(&mut ty.params, parent, visit);
    walk_list(&mut ty.results, parent, visit);
}

fn walk_children<F>(node: NodeMut<'_>, visit: &mut F)
where
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    match node {
        NodeMut::File(file) => walk_list(&mut file.decls, Parent::File, visit),
        NodeMut::Decl(Decl::Gen(gen_decl)) => walk_list(&mut gen_decl.specs, Parent::GenDecl, visit),
        NodeMut::Decl(Decl::Func(func)) => {
            walk_opt(&mut func.recv, Parent::FuncDecl, visit);
            walk_func_type(&mut func.ty, Parent::FuncDecl, visit);
            walk_opt(&mut func.body, Parent::FuncDecl, visit);
        }
        NodeMut::Spec(Spec::Import(_)) => {}
        NodeMut::Spec(Spec::Value(value)) => {
            walk_opt(&mut value.ty, Parent::Spec, visit);
            walk_list(&mut value.values, Parent::Spec, visit);
        }
        NodeMut::Spec(Spec::Type(ty)) => walk_one(&mut ty.ty, Parent::Spec, visit),
        NodeMut::Field(field) => walk_one(&mut field.ty, Parent::Field, visit),
        NodeMut::Block(block) => walk_list(&mut block.stmts, Parent::Block, visit),
        NodeMut::Stmt(stmt) => walk_stmt(&mut stmt.kind, visit),
        NodeMut::Case(clause) => {
            walk_list(&mut clause.list, Parent::CaseClause, visit);
            walk_list(&mut clause.body, Parent::CaseClause, visit);
        }
        NodeMut::Expr(expr) => walk_expr(expr, visit),
    }
}

fn walk_stmt<F>(kind: &mut StmtKind, visit: &mut F)
where
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    let parent = Parent::Stmt;
    match kind {
        StmtKind::Expr(x) | StmtKind::Go(x) | StmtKind::Defer(x) => walk_one(x, parent, visit),
        StmtKind::IncDec { x, .. } => walk_one(x, parent, visit),
        StmtKind::Send { chan, value } => {
            walk_one(chan, parent, visit);
            walk_one(value, parent, visit);
        }
        StmtKind::Assign(assign) => {
            walk_list(&mut assign.lhs, parent, visit);
            walk_list(&mut assign.rhs, parent, visit);
        }
        StmtKind::Decl(gen_decl) => walk_list(&mut gen_decl.specs, Parent::GenDecl, visit),
        StmtKind::Return(results) => walk_list(results, parent, visit),
        StmtKind::Branch { .. } => {}
        StmtKind::Block(block) => walk_one(block, parent, visit),
        StmtKind::If(if_stmt) => {
            walk_boxed(&mut if_stmt.init, parent, visit);
            walk_one(&mut if_stmt.cond, parent, visit);
            walk_one(&mut if_stmt.body, parent, visit);
            walk_boxed(&mut if_stmt.els, parent, visit);
        }
        StmtKind::Switch(switch) => {
            walk_boxed(&mut switch.init, parent, visit);
            walk_opt(&mut switch.tag, parent, visit);
            walk_list(&mut switch.body, parent, visit);
        }
        StmtKind::TypeSwitch(switch) => {
            walk_boxed(&mut switch.init, parent, visit);
            walk_one(&mut *switch.assign, parent, visit);
            walk_list(&mut switch.body, parent, visit);
        }
        StmtKind::For(for_stmt) => {
            walk_boxed(&mut for_stmt.init, parent, visit);
            walk_opt(&mut for_stmt.cond, parent, visit);
            walk_boxed(&mut for_stmt.post, parent, visit);
            walk_one(&mut for_stmt.body, parent, visit);
        }
        StmtKind::Range(range) => {
            walk_opt(&mut range.key, parent, visit);
            walk_opt(&mut range.value, parent, visit);
            walk_one(&mut range.x, parent, visit);
            walk_one(&mut range.body, parent, visit);
        }
        StmtKind::Labeled { stmt, .. } => walk_one(&mut **stmt, parent, visit),
    }
}

fn walk_expr<F>(expr: &mut Expr, visit: &mut F)
where
    F: FnMut(&mut Cursor<'_>) -> bool,
{
    let parent = Parent::Expr;
    match expr {
        Expr::Ident(_) | Expr::BasicLit(_) => {}
        Expr::CompositeLit(lit) => {
            walk_boxed(&mut lit.ty, parent, visit);
            walk_list(&mut lit.elts, Parent::CompositeLit, visit);
        }
        Expr::FuncLit(func) => {
            walk_func_type(&mut func.ty, parent, visit);
            walk_one(&mut func.body, parent, visit);
        }
        Expr::Paren(x) | Expr::Star(x) | Expr::Selector { x, .. } | Expr::Unary { x, .. } => {
            walk_one(&mut **x, parent, visit)
        }
        Expr::Index { x, index } => {
            walk_one(&mut **x, parent, visit);
            walk_one(&mut **index, parent, visit);
        }
        Expr::Slice { x, low, high, max } => {
            walk_one(&mut **x, parent, visit);
            walk_boxed(low, parent, visit);
            walk_boxed(high, parent, visit);
            walk_boxed(max, parent, visit);
        }
        Expr::TypeAssert { x, ty } => {
            walk_one(&mut **x, parent, visit);
            walk_boxed(ty, parent, visit);
        }
        Expr::Call(call) => {
            walk_one(&mut *call.fun, parent, visit);
            walk_list(&mut call.args, Parent::Call, visit);
        }
        Expr::Binary { x, y, .. } => {
            walk_one(&mut **x, parent, visit);
            walk_one(&mut **y, parent, visit);
        }
        Expr::KeyValue { key, value } => {
            walk_one(&mut **key, parent, visit);
            walk_one(&mut **value, parent, visit);
        }
        Expr::Ellipsis(elt) => walk_boxed(elt, parent, visit),
        Expr::ArrayType { len, elt } => {
            walk_boxed(len, parent, visit);
            walk_one(&mut **elt, parent, visit);
        }
        Expr::StructType(fields) | Expr::InterfaceType(fields) => walk_list(fields, parent, visit),
        Expr::FuncType(ty) => walk_func_type(ty, parent, visit),
        Expr::MapType { key, value } => {
            walk_one(&mut **key, parent, visit);
            walk_one(&mut **value, parent, visit);
        }
        Expr::ChanType { value, .. } => walk_one(&mut **value, parent, visit),
    }
}

/// Insert `stmts` right before the last top-level `return` of the first
/// function body below `root` that has one.
///
/// Returns nested in `if`, loops or function literals are skipped, so the
/// insertion lands in the function's own statement list. Returns whether a
/// return statement was found.
pub fn insert_before_return<T>(root: &mut T, stmts: Vec<Stmt>) -> bool
where
    for<'a> &'a mut T: Into<NodeMut<'a>>,
{
    // (function ordinal, statement index) of the last return in the first body with one
    let mut target: Option<(usize, usize)> = None;
    let mut function = 0;
    apply(&mut *root, |cursor| match top_level(cursor, &mut function) {
        Visit::Return(index) => {
            if target.is_none_or(|(owner, _)| owner == function) {
                target = Some((function, index));
            }
            false
        }
        Visit::Descend => target.is_none_or(|(owner, _)| owner == function),
        Visit::Skip => false,
    });
    let Some(target) = target else {
        return false;
    };

    let mut pending = Some(stmts);
    let mut function = 0;
    apply(&mut *root, |cursor| {
        if pending.is_none() {
            return false;
        }
        match top_level(cursor, &mut function) {
            Visit::Return(index) if (function, index) == target => {
                for stmt in pending.take().into_iter().flatten() {
                    cursor.insert_before(stmt);
                }
                false
            }
            Visit::Descend => true,
            _ => false,
        }
    });
    pending.is_none()
}

enum Visit {
    Descend,
    Return(usize),
    Skip,
}

/// Classify a node for a walk over function bodies only, counting functions
fn top_level(cursor: &Cursor<'_>, function: &mut usize) -> Visit {
    match cursor.node() {
        NodeMut::Decl(Decl::Func(_)) => {
            *function += 1;
            Visit::Descend
        }
        NodeMut::Block(_) => Visit::Descend,
        NodeMut::Stmt(stmt) if stmt.is_return() && cursor.parent() == Parent::Block => {
            cursor.index().map_or(Visit::Skip, Visit::Return)
        }
        _ => Visit::Skip,
    }
}
