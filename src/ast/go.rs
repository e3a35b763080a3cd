use super::{Decor, Layout};

/// A Go source file
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub package: String,
    pub decor: Decor, // comments above the package clause
    pub decls: Vec<Decl>,
    pub trailing: Vec<String>, // comments after the last declaration
}

impl File {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            decor: Decor::default(),
            decls: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// All import specs, in declaration order
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|decl| match decl {
            Decl::Gen(gen_decl) if gen_decl.keyword == DeclKeyword::Import => gen_decl.specs.as_slice(),
            _ => &[][..],
        })
        .filter_map(|spec| match spec {
            Spec::Import(import) => Some(import),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            Decl::Gen(_) => None,
        })
    }
}

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

impl Decl {
    pub fn decor(&self) -> &Decor {
        match self {
            Decl::Gen(d) => &d.decor,
            Decl::Func(d) => &d.decor,
        }
    }

    pub fn decor_mut(&mut self) -> &mut Decor {
        match self {
            Decl::Gen(d) => &mut d.decor,
            Decl::Func(d) => &mut d.decor,
        }
    }
}

/// `import`, `const`, `var` or `type` declaration, grouped or not
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub keyword: DeclKeyword,
    pub grouped: bool, // written with parentheses
    pub specs: Vec<Spec>,
    pub decor: Decor,
}

impl GenDecl {
    pub fn new(keyword: DeclKeyword, specs: Vec<Spec>) -> Self {
        let grouped = specs.len() != 1 || keyword == DeclKeyword::Import;
        Self { keyword, grouped, specs, decor: Decor::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Import,
    Const,
    Var,
    Type,
}

impl DeclKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKeyword::Import => "import",
            DeclKeyword::Const => "const",
            DeclKeyword::Var => "var",
            DeclKeyword::Type => "type",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

impl Spec {
    pub fn decor(&self) -> &Decor {
        match self {
            Spec::Import(s) => &s.decor,
            Spec::Value(s) => &s.decor,
            Spec::Type(s) => &s.decor,
        }
    }

    pub fn decor_mut(&mut self) -> &mut Decor {
        match self {
            Spec::Import(s) => &mut s.decor,
            Spec::Value(s) => &mut s.decor,
            Spec::Type(s) => &mut s.decor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub name: Option<String>, // alias, `.` or `_`
    pub path: String,         // unquoted
    pub decor: Decor,
}

/// `a, b T = x, y` inside a `const` or `var` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
    pub decor: Decor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub alias: bool, // `type A = B`
    pub ty: Expr,
    pub decor: Decor,
}

/// Function or method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub recv: Option<Field>,
    pub name: String,
    pub ty: FuncType,
    pub body: Option<Block>,
    pub decor: Decor,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// Parameter, result, receiver, struct field or interface method
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<String>, // empty for unnamed parameters and embedded fields
    pub ty: Expr,
    pub tag: Option<String>, // raw literal, quotes included
    pub decor: Decor,
}

impl Field {
    pub fn new(names: Vec<String>, ty: Expr) -> Self {
        Self { names, ty, tag: None, decor: Decor::default() }
    }

    pub fn unnamed(ty: Expr) -> Self {
        Self::new(Vec::new(), ty)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub trailing: Vec<String>, // comments before the closing brace
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts, trailing: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub decor: Decor,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self { kind, decor: Decor::default() }
    }

    pub fn with_decor(mut self, decor: Decor) -> Self {
        self.decor = decor;
        self
    }

    pub fn is_return(&self) -> bool {
        matches!(self.kind, StmtKind::Return(_))
    }
}

impl From<StmtKind> for Stmt {
    fn from(kind: StmtKind) -> Self {
        Stmt::new(kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Send { chan: Expr, value: Expr },
    IncDec { x: Expr, inc: bool },
    Assign(AssignStmt),
    Decl(GenDecl),
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch { keyword: BranchKeyword, label: Option<String> },
    Block(Block),
    If(IfStmt),
    Switch(SwitchStmt),
    TypeSwitch(TypeSwitchStmt),
    For(ForStmt),
    Range(RangeStmt),
    Labeled { label: String, stmt: Box<Stmt> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub op: AssignOp,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Define,
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Define => ":=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Quo => "/=",
            AssignOp::Rem => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::AndNot => "&^=",
        }
    }

    pub fn from_token(op: &str) -> Option<Self> {
        Some(match op {
            "=" => AssignOp::Assign,
            ":=" => AssignOp::Define,
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" => AssignOp::Quo,
            "%=" => AssignOp::Rem,
            "&=" => AssignOp::And,
            "|=" => AssignOp::Or,
            "^=" => AssignOp::Xor,
            "<<=" => AssignOp::Shl,
            ">>=" => AssignOp::Shr,
            "&^=" => AssignOp::AndNot,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKeyword {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKeyword::Break => "break",
            BranchKeyword::Continue => "continue",
            BranchKeyword::Goto => "goto",
            BranchKeyword::Fallthrough => "fallthrough",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub body: Block,
    pub els: Option<Box<Stmt>>, // an `If` or a `Block`
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub tag: Option<Expr>,
    pub body: Vec<CaseClause>,
}

/// `switch x := y.(type) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub assign: Box<Stmt>, // `x := y.(type)` or `y.(type)`
    pub body: Vec<CaseClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub list: Vec<Expr>, // empty for `default`
    pub body: Vec<Stmt>,
    pub decor: Decor,
}

impl CaseClause {
    pub fn is_default(&self) -> bool {
        self.list.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    pub define: bool, // `:=` rather than `=`
    pub x: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    BasicLit(BasicLit),
    CompositeLit(CompositeLit),
    FuncLit(FuncLit),
    Paren(Box<Expr>),
    Selector { x: Box<Expr>, sel: String },
    Index { x: Box<Expr>, index: Box<Expr> },
    Slice { x: Box<Expr>, low: Option<Box<Expr>>, high: Option<Box<Expr>>, max: Option<Box<Expr>> },
    TypeAssert { x: Box<Expr>, ty: Option<Box<Expr>> }, // `None` is `.(type)`
    Call(CallExpr),
    Star(Box<Expr>),
    Unary { op: UnaryOp, x: Box<Expr> },
    Binary { x: Box<Expr>, op: BinaryOp, y: Box<Expr> },
    KeyValue { key: Box<Expr>, value: Box<Expr> },
    Ellipsis(Option<Box<Expr>>),

    // Types
    ArrayType { len: Option<Box<Expr>>, elt: Box<Expr> }, // `None` is a slice
    StructType(Vec<Field>),
    FuncType(FuncType),
    InterfaceType(Vec<Field>),
    MapType { key: Box<Expr>, value: Box<Expr> },
    ChanType { dir: ChanDir, value: Box<Expr> },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn selector(x: Expr, sel: impl Into<String>) -> Self {
        Expr::Selector { x: Box::new(x), sel: sel.into() }
    }

    pub fn binary(x: Expr, op: BinaryOp, y: Expr) -> Self {
        Expr::Binary { x: Box::new(x), op, y: Box::new(y) }
    }

    pub fn key_value(key: Expr, value: Expr) -> Self {
        Expr::KeyValue { key: Box::new(key), value: Box::new(value) }
    }

    pub fn paren(x: Expr) -> Self {
        Expr::Paren(Box::new(x))
    }

    pub fn address_of(x: Expr) -> Self {
        Expr::Unary { op: UnaryOp::And, x: Box::new(x) }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Components of an identifier or selector chain, leftmost first
    pub fn flatten_selector(&self) -> Option<Vec<&str>> {
        match self {
            Expr::Ident(name) => Some(vec![name.as_str()]),
            Expr::Selector { x, sel } => {
                let mut parts = x.flatten_selector()?;
                parts.push(sel);
                Some(parts)
            }
            _ => None,
        }
    }

    /// Dotted rendering of an identifier or selector chain
    pub fn dotted_name(&self) -> Option<String> {
        self.flatten_selector().map(|parts| parts.join("."))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub kind: LitKind,
    pub value: String, // source text, quotes included
}

impl BasicLit {
    pub fn string(text: &str) -> Self {
        Self { kind: LitKind::String, value: quote(text) }
    }

    pub fn int(value: i64) -> Self {
        Self { kind: LitKind::Int, value: value.to_string() }
    }

    /// Content of a string literal without quotes or escapes
    pub fn unquoted(&self) -> Option<String> {
        if self.kind != LitKind::String {
            return None;
        }
        unquote(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    pub ty: Option<Box<Expr>>, // elided inside an outer literal
    pub elts: Vec<Element>,
    pub layout: Layout,
    pub closing: Vec<String>, // comments before `}`
}

impl CompositeLit {
    pub fn new(ty: Option<Expr>, elts: Vec<Expr>, layout: Layout) -> Self {
        Self { ty: ty.map(Box::new), elts: elts.into_iter().map(Element::from).collect(), layout, closing: Vec::new() }
    }

    pub fn push(&mut self, expr: Expr) {
        self.elts.push(Element::from(expr));
    }

    pub fn exprs(&self) -> impl Iterator<Item = &Expr> {
        self.elts.iter().map(|elt| &elt.expr)
    }

    pub fn exprs_mut(&mut self) -> impl Iterator<Item = &mut Expr> {
        self.elts.iter_mut().map(|elt| &mut elt.expr)
    }

    /// Some element or the closing brace carries a comment
    pub fn has_comments(&self) -> bool {
        !self.closing.is_empty() || self.elts.iter().any(Element::has_comments)
    }
}

/// Entry of a composite literal or an argument list, with the comments
/// written around it
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub expr: Expr,
    pub decor: Decor,
}

impl Element {
    pub fn with_decor(mut self, decor: Decor) -> Self {
        self.decor = decor;
        self
    }

    pub fn has_comments(&self) -> bool {
        !self.decor.comments.is_empty() || self.decor.trailing.is_some()
    }
}

impl From<Expr> for Element {
    fn from(expr: Expr) -> Self {
        Self { expr, decor: Decor::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncLit {
    pub ty: FuncType,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub args: Vec<Element>,
    pub ellipsis: bool,       // `f(xs...)`
    pub closing: Vec<String>, // comments before `)`
}

impl CallExpr {
    pub fn new(fun: Expr) -> Self {
        Self { fun: Box::new(fun), args: Vec::new(), ellipsis: false, closing: Vec::new() }
    }

    pub fn push(&mut self, expr: Expr) {
        self.args.push(Element::from(expr));
    }

    pub fn has_comments(&self) -> bool {
        !self.closing.is_empty() || self.args.iter().any(Element::has_comments)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Xor,
    And,
    Recv,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Xor => "^",
            UnaryOp::And => "&",
            UnaryOp::Recv => "<-",
        }
    }

    pub fn from_token(op: &str) -> Option<Self> {
        Some(match op {
            "!" => UnaryOp::Not,
            "-" => UnaryOp::Neg,
            "+" => UnaryOp::Pos,
            "^" => UnaryOp::Xor,
            "&" => UnaryOp::And,
            "<-" => UnaryOp::Recv,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LOr,
    LAnd,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Quo,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::LOr => "||",
            BinaryOp::LAnd => "&&",
            BinaryOp::Eql => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lss => "<",
            BinaryOp::Leq => "<=",
            BinaryOp::Gtr => ">",
            BinaryOp::Geq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Quo => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&",
            BinaryOp::AndNot => "&^",
        }
    }

    pub fn from_token(op: &str) -> Option<Self> {
        Some(match op {
            "||" => BinaryOp::LOr,
            "&&" => BinaryOp::LAnd,
            "==" => BinaryOp::Eql,
            "!=" => BinaryOp::Neq,
            "<" => BinaryOp::Lss,
            "<=" => BinaryOp::Leq,
            ">" => BinaryOp::Gtr,
            ">=" => BinaryOp::Geq,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "|" => BinaryOp::Or,
            "^" => BinaryOp::Xor,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Quo,
            "%" => BinaryOp::Rem,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "&" => BinaryOp::And,
            "&^" => BinaryOp::AndNot,
            _ => return None,
        })
    }

    /// Go operator precedence, 5 binds tightest
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::LOr => 1,
            BinaryOp::LAnd => 2,
            BinaryOp::Eql | BinaryOp::Neq | BinaryOp::Lss | BinaryOp::Leq | BinaryOp::Gtr | BinaryOp::Geq => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Mul
            | BinaryOp::Quo
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
        }
    }
}

/// Quote text as an interpreted Go string literal
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Decode an interpreted or raw Go string literal
pub fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal.strip_prefix('`').and_then(|rest| rest.strip_suffix('`')) {
        return Some(raw.to_string());
    }
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            other => {
                // Keep escapes we do not interpret verbatim
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_unquote() {
        assert_eq!(quote("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(unquote(r#""say \"hi\"""#).as_deref(), Some("say \"hi\""));
        assert_eq!(unquote("`raw\\n`").as_deref(), Some("raw\\n"));
        assert_eq!(unquote("nope"), None);
    }

    #[test]
    fn test_flatten_selector() {
        let expr = Expr::selector(Expr::selector(Expr::ident("a"), "b"), "c");
        assert_eq!(expr.flatten_selector(), Some(vec!["a", "b", "c"]));
        assert_eq!(expr.dotted_name().as_deref(), Some("a.b.c"));
        assert_eq!(Expr::Star(Box::new(Expr::ident("T"))).flatten_selector(), None);
    }

    #[test]
    fn test_gen_decl_grouping() {
        let single = GenDecl::new(DeclKeyword::Const, vec![Spec::Value(ValueSpec {
            names: vec!["A".into()],
            ty: None,
            values: vec![Expr::BasicLit(BasicLit::int(1))],
            decor: Decor::default(),
        })]);
        assert!(!single.grouped);
        assert!(GenDecl::new(DeclKeyword::Import, Vec::new()).grouped);
    }
}
