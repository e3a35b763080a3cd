use super::{Generator, Output};
use crate::ast::go::*;
use crate::ast::{Decor, Layout, Spacing};

/// Prints a Go syntax tree as gofmt-style source
pub struct GoGenerator;

impl GoGenerator {
    pub fn new() -> Self {
        Self
    }

    fn file(&self, file: &File, out: &mut Output) {
        comments(out, &file.decor);
        out.push("package ");
        out.push(&file.package);
        trailing(out, &file.decor);
        out.newline();

        let mut previous: Option<&Decl> = None;
        for decl in &file.decls {
            // Functions and the first declaration always stand apart
            let spaced = match previous {
                None => true,
                Some(prev) => {
                    decl.decor().before == Spacing::EmptyLine
                        || matches!(decl, Decl::Func(_))
                        || matches!(prev, Decl::Func(_))
                        || matches!((prev, decl), (Decl::Gen(a), Decl::Gen(b)) if a.keyword != b.keyword || a.grouped || b.grouped)
                }
            };
            if spaced {
                out.blank_line();
            }
            match decl {
                Decl::Gen(gen_decl) => {
                    comments(out, &gen_decl.decor);
                    self.gen_decl(gen_decl, out);
                    trailing(out, &gen_decl.decor);
                }
                Decl::Func(func) => {
                    comments(out, &func.decor);
                    self.func_decl(func, out);
                    trailing(out, &func.decor);
                }
            }
            out.newline();
            previous = Some(decl);
        }

        if !file.trailing.is_empty() {
            out.blank_line();
            for comment in &file.trailing {
                out.push(comment);
                out.newline();
            }
        }
    }

    // === Declarations ===

    fn gen_decl(&self, decl: &GenDecl, out: &mut Output) {
        out.push(decl.keyword.as_str());
        if !decl.grouped && decl.specs.len() == 1 {
            out.push(" ");
            self.spec(&decl.specs[0], out);
            return;
        }
        if decl.specs.is_empty() {
            out.push(" ()");
            return;
        }
        out.push(" (");
        out.newline();
        out.indented(|out| {
            for (i, spec) in decl.specs.iter().enumerate() {
                let decor = spec.decor();
                if i > 0 && decor.before == Spacing::EmptyLine {
                    out.blank_line();
                }
                comments(out, decor);
                self.spec(spec, out);
                trailing(out, decor);
                out.newline();
            }
        });
        out.push(")");
    }

    fn spec(&self, spec: &Spec, out: &mut Output) {
        match spec {
            Spec::Import(import) => {
                if let Some(name) = &import.name {
                    out.push(name);
                    out.push(" ");
                }
                out.push(&quote(&import.path));
            }
            Spec::Value(value) => {
                out.push(&value.names.join(", "));
                if let Some(ty) = &value.ty {
                    out.push(" ");
                    self.expr(ty, out);
                }
                if !value.values.is_empty() {
                    out.push(" = ");
                    self.expr_list(&value.values, out);
                }
            }
            Spec::Type(type_spec) => {
                out.push(&type_spec.name);
                out.push(if type_spec.alias { " = " } else { " " });
                self.expr(&type_spec.ty, out);
            }
        }
    }

    fn func_decl(&self, func: &FuncDecl, out: &mut Output) {
        out.push("func ");
        if let Some(recv) = &func.recv {
            out.push("(");
            self.field(recv, out);
            out.push(") ");
        }
        out.push(&func.name);
        self.signature(&func.ty, out);
        if let Some(body) = &func.body {
            out.push(" ");
            self.block(body, out);
        }
    }

    fn signature(&self, ty: &FuncType, out: &mut Output) {
        out.push("(");
        self.field_list(&ty.params, out);
        out.push(")");
        match ty.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                out.push(" ");
                self.expr(&single.ty, out);
            }
            results => {
                out.push(" (");
                self.field_list(results, out);
                out.push(")");
            }
        }
    }

    fn field_list(&self, fields: &[Field], out: &mut Output) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(", ");
            }
            self.field(field, out);
        }
    }

    fn field(&self, field: &Field, out: &mut Output) {
        if !field.names.is_empty() {
            out.push(&field.names.join(", "));
            out.push(" ");
        }
        self.expr(&field.ty, out);
        if let Some(tag) = &field.tag {
            out.push(" ");
            out.push(tag);
        }
    }

    // === Statements ===

    fn block(&self, block: &Block, out: &mut Output) {
        if block.stmts.is_empty() && block.trailing.is_empty() {
            out.push("{}");
            return;
        }
        out.push("{");
        out.newline();
        out.indented(|out| {
            self.stmt_list(&block.stmts, out);
            for comment in &block.trailing {
                out.push(comment);
                out.newline();
            }
        });
        out.push("}");
    }

    fn stmt_list(&self, stmts: &[Stmt], out: &mut Output) {
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 && stmt.decor.before == Spacing::EmptyLine {
                out.blank_line();
            }
            comments(out, &stmt.decor);
            self.stmt(stmt, out);
            trailing(out, &stmt.decor);
            out.newline();
        }
    }

    fn stmt(&self, stmt: &Stmt, out: &mut Output) {
        self.stmt_kind(&stmt.kind, out);
    }

    fn stmt_kind(&self, kind: &StmtKind, out: &mut Output) {
        match kind {
            StmtKind::Expr(expr) => self.expr(expr, out),
            StmtKind::Send { chan, value } => {
                self.expr(chan, out);
                out.push(" <- ");
                self.expr(value, out);
            }
            StmtKind::IncDec { x, inc } => {
                self.expr(x, out);
                out.push(if *inc { "++" } else { "--" });
            }
            StmtKind::Assign(assign) => {
                self.expr_list(&assign.lhs, out);
                out.push(" ");
                out.push(assign.op.as_str());
                out.push(" ");
                self.expr_list(&assign.rhs, out);
            }
            StmtKind::Decl(decl) => self.gen_decl(decl, out),
            StmtKind::Go(call) => {
                out.push("go ");
                self.expr(call, out);
            }
            StmtKind::Defer(call) => {
                out.push("defer ");
                self.expr(call, out);
            }
            StmtKind::Return(results) => {
                out.push("return");
                if !results.is_empty() {
                    out.push(" ");
                    self.expr_list(results, out);
                }
            }
            StmtKind::Branch { keyword, label } => {
                out.push(keyword.as_str());
                if let Some(label) = label {
                    out.push(" ");
                    out.push(label);
                }
            }
            StmtKind::Block(block) => self.block(block, out),
            StmtKind::If(if_stmt) => self.if_stmt(if_stmt, out),
            StmtKind::Switch(switch) => {
                out.push("switch ");
                if let Some(init) = &switch.init {
                    self.stmt(init, out);
                    out.push("; ");
                }
                if let Some(tag) = &switch.tag {
                    self.expr(tag, out);
                    out.push(" ");
                }
                self.case_body(&switch.body, out);
            }
            StmtKind::TypeSwitch(switch) => {
                out.push("switch ");
                if let Some(init) = &switch.init {
                    self.stmt(init, out);
                    out.push("; ");
                }
                self.stmt(&switch.assign, out);
                out.push(" ");
                self.case_body(&switch.body, out);
            }
            StmtKind::For(for_stmt) => {
                out.push("for ");
                let has_clauses = for_stmt.init.is_some() || for_stmt.post.is_some();
                if has_clauses {
                    if let Some(init) = &for_stmt.init {
                        self.stmt(init, out);
                    }
                    out.push("; ");
                    if let Some(cond) = &for_stmt.cond {
                        self.expr(cond, out);
                    }
                    out.push("; ");
                    if let Some(post) = &for_stmt.post {
                        self.stmt(post, out);
                        out.push(" ");
                    }
                } else if let Some(cond) = &for_stmt.cond {
                    self.expr(cond, out);
                    out.push(" ");
                }
                self.block(&for_stmt.body, out);
            }
            StmtKind::Range(range) => {
                out.push("for ");
                if let Some(key) = &range.key {
                    self.expr(key, out);
                    if let Some(value) = &range.value {
                        out.push(", ");
                        self.expr(value, out);
                    }
                    out.push(if range.define { " := " } else { " = " });
                }
                out.push("range ");
                self.expr(&range.x, out);
                out.push(" ");
                self.block(&range.body, out);
            }
            StmtKind::Labeled { label, stmt } => {
                // Labels sit one level left of the statement
                out.dedent();
                out.push(label);
                out.push(":");
                out.newline();
                out.indent();
                comments(out, &stmt.decor);
                self.stmt(stmt, out);
                trailing(out, &stmt.decor);
            }
        }
    }

    fn if_stmt(&self, if_stmt: &IfStmt, out: &mut Output) {
        out.push("if ");
        if let Some(init) = &if_stmt.init {
            self.stmt(init, out);
            out.push("; ");
        }
        self.expr(&if_stmt.cond, out);
        out.push(" ");
        self.block(&if_stmt.body, out);
        if let Some(els) = &if_stmt.els {
            out.push(" else ");
            match &els.kind {
                StmtKind::If(nested) => self.if_stmt(nested, out),
                StmtKind::Block(block) => self.block(block, out),
                other => {
                    // Not valid Go; keep it printable
                    self.block(&Block::new(vec![Stmt::new(other.clone())]), out)
                }
            }
        }
    }

    fn case_body(&self, clauses: &[CaseClause], out: &mut Output) {
        out.push("{");
        out.newline();
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 && clause.decor.before == Spacing::EmptyLine {
                out.blank_line();
            }
            comments(out, &clause.decor);
            if clause.is_default() {
                out.push("default:");
            } else {
                out.push("case ");
                self.expr_list(&clause.list, out);
                out.push(":");
            }
            trailing(out, &clause.decor);
            out.newline();
            out.indented(|out| self.stmt_list(&clause.body, out));
        }
        out.push("}");
    }

    // === Expressions ===

    fn expr_list(&self, exprs: &[Expr], out: &mut Output) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                out.push(", ");
            }
            self.expr(expr, out);
        }
    }

    fn expr(&self, expr: &Expr, out: &mut Output) {
        self.expr_prec(expr, 0, out);
    }

    /// Print `expr`, parenthesized when it binds looser than `prec`
    fn expr_prec(&self, expr: &Expr, prec: u8, out: &mut Output) {
        match expr {
            Expr::Ident(name) => out.push(name),
            Expr::BasicLit(lit) => out.push(&lit.value),
            Expr::CompositeLit(lit) => self.composite(lit, out),
            Expr::FuncLit(lit) => {
                out.push("func");
                self.signature(&lit.ty, out);
                out.push(" ");
                self.block(&lit.body, out);
            }
            Expr::Paren(inner) => {
                out.push("(");
                self.expr(inner, out);
                out.push(")");
            }
            Expr::Selector { x, sel } => {
                self.operand(x, out);
                out.push(".");
                out.push(sel);
            }
            Expr::Index { x, index } => {
                self.operand(x, out);
                out.push("[");
                self.expr(index, out);
                out.push("]");
            }
            Expr::Slice { x, low, high, max } => {
                self.operand(x, out);
                out.push("[");
                if let Some(low) = low {
                    self.expr(low, out);
                }
                out.push(":");
                if let Some(high) = high {
                    self.expr(high, out);
                }
                if let Some(max) = max {
                    out.push(":");
                    self.expr(max, out);
                }
                out.push("]");
            }
            Expr::TypeAssert { x, ty } => {
                self.operand(x, out);
                out.push(".(");
                match ty {
                    Some(ty) => self.expr(ty, out),
                    None => out.push("type"),
                }
                out.push(")");
            }
            Expr::Call(call) => {
                self.operand(&call.fun, out);
                out.push("(");
                if call.has_comments() {
                    self.element_lines(&call.args, &call.closing, call.ellipsis, out);
                } else {
                    self.element_list(&call.args, out);
                    if call.ellipsis {
                        out.push("...");
                    }
                }
                out.push(")");
            }
            Expr::Star(x) => {
                out.push("*");
                self.unary_operand(x, out);
            }
            Expr::Unary { op, x } => {
                out.push(op.as_str());
                self.unary_operand(x, out);
            }
            Expr::Binary { x, op, y } => {
                let own = op.precedence();
                let wrap = own < prec;
                if wrap {
                    out.push("(");
                }
                self.expr_prec(x, own, out);
                out.push(" ");
                out.push(op.as_str());
                out.push(" ");
                self.expr_prec(y, own + 1, out);
                if wrap {
                    out.push(")");
                }
            }
            Expr::KeyValue { key, value } => {
                self.expr(key, out);
                out.push(": ");
                self.expr(value, out);
            }
            Expr::Ellipsis(elt) => {
                out.push("...");
                if let Some(elt) = elt {
                    self.expr(elt, out);
                }
            }
            Expr::ArrayType { len, elt } => {
                out.push("[");
                if let Some(len) = len {
                    self.expr(len, out);
                }
                out.push("]");
                self.expr(elt, out);
            }
            Expr::StructType(fields) => self.field_block("struct", fields, out),
            Expr::FuncType(ty) => {
                out.push("func");
                self.signature(ty, out);
            }
            Expr::InterfaceType(methods) => self.field_block("interface", methods, out),
            Expr::MapType { key, value } => {
                out.push("map[");
                self.expr(key, out);
                out.push("]");
                self.expr(value, out);
            }
            Expr::ChanType { dir, value } => {
                out.push(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(value, out);
            }
        }
    }

    /// Operand of a selector, index or call
    fn operand(&self, expr: &Expr, out: &mut Output) {
        match expr {
            Expr::Binary { .. } | Expr::Unary { .. } | Expr::Star(_) | Expr::FuncType(_) => {
                out.push("(");
                self.expr(expr, out);
                out.push(")");
            }
            _ => self.expr(expr, out),
        }
    }

    fn unary_operand(&self, expr: &Expr, out: &mut Output) {
        match expr {
            Expr::Binary { .. } => {
                out.push("(");
                self.expr(expr, out);
                out.push(")");
            }
            _ => self.expr(expr, out),
        }
    }

    fn composite(&self, lit: &CompositeLit, out: &mut Output) {
        if let Some(ty) = &lit.ty {
            self.expr(ty, out);
        }
        if lit.elts.is_empty() && lit.closing.is_empty() {
            out.push("{}");
            return;
        }
        out.push("{");
        match lit.layout {
            Layout::Inline if !lit.has_comments() => self.element_list(&lit.elts, out),
            _ => self.element_lines(&lit.elts, &lit.closing, false, out),
        }
        out.push("}");
    }

    fn element_list(&self, elts: &[Element], out: &mut Output) {
        for (i, elt) in elts.iter().enumerate() {
            if i > 0 {
                out.push(", ");
            }
            self.expr(&elt.expr, out);
        }
    }

    /// One element per line, each closed by a comma
    fn element_lines(&self, elts: &[Element], closing: &[String], ellipsis: bool, out: &mut Output) {
        out.newline();
        out.indented(|out| {
            for (i, elt) in elts.iter().enumerate() {
                if i > 0 && elt.decor.before == Spacing::EmptyLine {
                    out.blank_line();
                }
                comments(out, &elt.decor);
                self.expr(&elt.expr, out);
                if ellipsis && i + 1 == elts.len() {
                    out.push("...");
                }
                out.push(",");
                trailing(out, &elt.decor);
                out.newline();
            }
            for comment in closing {
                out.push(comment);
                out.newline();
            }
        });
    }

    /// `struct { ... }` or `interface { ... }`
    fn field_block(&self, keyword: &str, fields: &[Field], out: &mut Output) {
        out.push(keyword);
        if fields.is_empty() {
            out.push("{}");
            return;
        }
        out.push(" {");
        out.newline();
        out.indented(|out| {
            for (i, field) in fields.iter().enumerate() {
                if i > 0 && field.decor.before == Spacing::EmptyLine {
                    out.blank_line();
                }
                comments(out, &field.decor);
                match (&field.ty, keyword) {
                    (Expr::FuncType(ty), "interface") if !field.names.is_empty() => {
                        out.push(&field.names.join(", "));
                        self.signature(ty, out);
                    }
                    _ => self.field(field, out),
                }
                trailing(out, &field.decor);
                out.newline();
            }
        });
        out.push("}");
    }
}

impl Default for GoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for GoGenerator {
    type Tree = File;

    fn generate(&self, file: &File) -> String {
        let mut out = Output::new("\t");
        self.file(file, &mut out);
        out.finish()
    }
}

/// Print a single expression on its own
pub fn print_expr(expr: &Expr) -> String {
    let mut out = Output::new("\t");
    GoGenerator.expr(expr, &mut out);
    out.finish().trim_end().to_string()
}

/// Print a single statement on its own
pub fn print_stmt(stmt: &Stmt) -> String {
    let mut out = Output::new("\t");
    comments(&mut out, &stmt.decor);
    GoGenerator.stmt(stmt, &mut out);
    trailing(&mut out, &stmt.decor);
    out.finish().trim_end().to_string()
}

fn comments(out: &mut Output, decor: &Decor) {
    for comment in &decor.comments {
        out.push(comment);
        out.newline();
    }
}

fn trailing(out: &mut Output, decor: &Decor) {
    if let Some(comment) = &decor.trailing {
        out.push(" ");
        out.push(comment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{GoParser, Parser};

    fn roundtrip(source: &str) -> String {
        let file = GoParser::new().parse(source).unwrap();
        GoGenerator::new().generate(&file)
    }

    #[test]
    fn test_roundtrip_function() {
        let source = "package types\n\nimport (\n\t\"fmt\"\n)\n\n// DefaultGenesis returns the default genesis state\nfunc DefaultGenesis() *GenesisState {\n\treturn &GenesisState{\n\t\tParams: DefaultParams(),\n\t}\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_roundtrip_control_flow() {
        let source = "package keeper\n\nfunc f(xs []int) (n int, err error) {\n\tfor i, x := range xs {\n\t\tif x > 0 && i != 2 {\n\t\t\tn += x\n\t\t} else if x < 0 {\n\t\t\tcontinue\n\t\t} else {\n\t\t\tbreak\n\t\t}\n\t}\n\n\tswitch v := any(n).(type) {\n\tcase int:\n\t\t_ = v\n\tdefault:\n\t}\n\treturn n, nil\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_roundtrip_spaced_case_clauses() {
        let source = "package blog\n\nfunc f(msg sdk.Msg) {\n\tswitch msg := msg.(type) {\n\tcase *types.MsgCreatePost:\n\t\t_ = msg\n\n\tdefault:\n\t\tpanic(msg)\n\t}\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_roundtrip_comments_in_literal() {
        let source = "package blog\n\nfunc f() {\n\tstate := types.GenesisState{\n\t\t// defaults\n\t\tParams: types.DefaultParams(), // keep\n\n\t\tPorts: []string{\"a\", \"b\"},\n\t\t// this line is used by starport scaffolding # genesis/types/default\n\t}\n\t_ = state\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_commented_call_arguments_stay_on_their_lines() {
        let source = "package blog\n\nfunc f() {\n\tregister(\n\t\tcdc, // codec\n\t\tkeys...,\n\t\t// more to come\n\t)\n\tplain(\n\t\ta,\n\t\tb,\n\t)\n}\n";
        assert_eq!(
            roundtrip(source),
            "package blog\n\nfunc f() {\n\tregister(\n\t\tcdc, // codec\n\t\tkeys...,\n\t\t// more to come\n\t)\n\tplain(a, b)\n}\n"
        );
    }

    #[test]
    fn test_inline_literal_with_comment_is_spread() {
        let source = "package blog\n\nvar xs = []int{1, // one\n\t2}\n";
        assert_eq!(roundtrip(source), "package blog\n\nvar xs = []int{\n\t1, // one\n\t2,\n}\n");
    }

    #[test]
    fn test_binary_parenthesized_by_precedence() {
        let sum = Expr::binary(Expr::ident("a"), BinaryOp::Add, Expr::ident("b"));
        let product = Expr::binary(sum, BinaryOp::Mul, Expr::ident("c"));
        assert_eq!(print_expr(&product), "(a + b) * c");
    }

    #[test]
    fn test_func_separated_by_blank_line() {
        let mut file = File::new("types");
        for name in ["A", "B"] {
            file.decls.push(Decl::Func(FuncDecl {
                recv: None,
                name: name.into(),
                ty: FuncType::default(),
                body: Some(Block::default()),
                decor: Decor::default(),
            }));
        }
        assert_eq!(GoGenerator::new().generate(&file), "package types\n\nfunc A() {}\n\nfunc B() {}\n");
    }

    #[test]
    fn test_print_stmt_with_comment() {
        let stmt = Stmt::new(StmtKind::Return(vec![Expr::ident("nil")])).with_decor(Decor::new().with_comment("done"));
        assert_eq!(print_stmt(&stmt), "// done\nreturn nil");
    }
}
