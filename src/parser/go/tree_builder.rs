use super::tokenizer::{Token, TokenKind};
use crate::ast::go::*;
use crate::ast::{Decor, Layout, Spacing};
use crate::error::{ErrorKind, ParseError};
use crate::parser::Span;

/// Result of a simple statement in a header where `range` is allowed
enum Simple {
    Stmt(StmtKind),
    Range { key: Option<Expr>, value: Option<Expr>, define: bool, x: Expr },
}

/// Builds a Go syntax tree from a token stream
pub struct TreeBuilder {
    tokens: Vec<Token>,
    pos: usize,
    /// Below zero inside `if`/`for`/`switch` headers, where `T{` opens a block
    expr_level: i32,
}

impl TreeBuilder {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, expr_level: 0 }
    }

    pub fn build(&mut self) -> Result<File, ParseError> {
        let decor = self.take_decor();
        self.expect_keyword("package")?;
        let package = self.expect_ident()?;
        self.expect_semi()?;

        let mut file = File::new(package);
        file.decor = decor;

        while self.peek().kind != TokenKind::Eof {
            if self.peek().is_semicolon() {
                self.advance();
                continue;
            }
            let decl = if self.at_keyword("func") {
                Decl::Func(self.parse_func_decl()?)
            } else if self.at_keyword("import")
                || self.at_keyword("const")
                || self.at_keyword("var")
                || self.at_keyword("type")
            {
                Decl::Gen(self.parse_gen_decl()?)
            } else {
                let token = self.peek();
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    format!("expected declaration, found '{}'", token.text),
                    token.span,
                )
                .with_help("Top-level code must start with 'func', 'import', 'const', 'var' or 'type'"));
            };
            file.decls.push(decl);
        }
        file.trailing = std::mem::take(&mut self.tokens[self.pos].comments);

        Ok(file)
    }

    // === Declarations ===

    fn parse_gen_decl(&mut self) -> Result<GenDecl, ParseError> {
        let decor = self.take_decor();
        let mut decl = self.parse_gen_decl_inner()?;
        decl.decor = decor;
        decl.decor.trailing = self.expect_semi()?;
        Ok(decl)
    }

    /// Declaration without its leading comments or terminating semicolon
    fn parse_gen_decl_inner(&mut self) -> Result<GenDecl, ParseError> {
        let keyword_token = self.advance();
        let keyword = match keyword_token.text.as_str() {
            "import" => DeclKeyword::Import,
            "const" => DeclKeyword::Const,
            "var" => DeclKeyword::Var,
            _ => DeclKeyword::Type,
        };

        if !self.eat_op("(") {
            let spec = self.parse_spec(keyword)?;
            return Ok(GenDecl { keyword, grouped: false, specs: vec![spec], decor: Decor::default() });
        }

        let mut specs = Vec::new();
        while !self.at_op(")") && self.peek().kind != TokenKind::Eof {
            if self.peek().is_semicolon() {
                self.advance();
                continue;
            }
            let decor = self.take_decor();
            let mut spec = self.parse_spec(keyword)?;
            *spec.decor_mut() = decor;
            spec.decor_mut().trailing = self.expect_semi()?;
            specs.push(spec);
        }
        self.expect_close(")", keyword_token.span)?;

        Ok(GenDecl { keyword, grouped: true, specs, decor: Decor::default() })
    }

    fn parse_spec(&mut self, keyword: DeclKeyword) -> Result<Spec, ParseError> {
        match keyword {
            DeclKeyword::Import => {
                let name = if self.peek().kind == TokenKind::Ident || self.at_op(".") {
                    Some(self.advance().text)
                } else {
                    None
                };
                let token = self.advance();
                if token.kind != TokenKind::String {
                    return Err(ParseError::new(
                        ErrorKind::UnexpectedToken,
                        format!("expected import path, found '{}'", token.text),
                        token.span,
                    ));
                }
                let path = unquote(&token.text).unwrap_or_default();
                Ok(Spec::Import(ImportSpec { name, path, decor: Decor::default() }))
            }
            DeclKeyword::Const | DeclKeyword::Var => {
                let names = self.parse_ident_list()?;
                let ty = if self.at_op("=") || self.peek().is_semicolon() || self.at_op(")") {
                    None
                } else {
                    Some(self.parse_type()?)
                };
                let values = if self.eat_op("=") { self.parse_expr_list()? } else { Vec::new() };
                Ok(Spec::Value(ValueSpec { names, ty, values, decor: Decor::default() }))
            }
            DeclKeyword::Type => {
                let name = self.expect_ident()?;
                let alias = self.eat_op("=");
                let ty = self.parse_type()?;
                Ok(Spec::Type(TypeSpec { name, alias, ty, decor: Decor::default() }))
            }
        }
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let mut decor = self.take_decor();
        self.expect_keyword("func")?;

        let recv = if self.at_op("(") {
            let open = self.peek().span;
            let mut fields = self.parse_params()?;
            if fields.len() != 1 {
                return Err(ParseError::new(ErrorKind::InvalidSyntax, "method has multiple receivers", open)
                    .with_help("A method takes exactly one receiver"));
            }
            fields.pop()
        } else {
            None
        };

        let name = self.expect_ident()?;
        let ty = self.parse_signature()?;
        let body = if self.at_op("{") {
            let level = std::mem::replace(&mut self.expr_level, 0);
            let block = self.parse_block()?;
            self.expr_level = level;
            Some(block)
        } else {
            None
        };
        decor.trailing = self.expect_semi()?;

        Ok(FuncDecl { recv, name, ty, body, decor })
    }

    fn parse_signature(&mut self) -> Result<FuncType, ParseError> {
        let params = self.parse_params()?;
        let results = if self.at_op("(") {
            self.parse_params()?
        } else if self.starts_type() {
            vec![Field::unnamed(self.parse_type()?)]
        } else {
            Vec::new()
        };
        Ok(FuncType { params, results })
    }

    /// `(a, b int, c ...string)` or `(int, error)`
    fn parse_params(&mut self) -> Result<Vec<Field>, ParseError> {
        let open = self.expect_op("(")?.span;
        let mut entries: Vec<(Option<String>, Option<Expr>)> = Vec::new();

        while !self.at_op(")") && self.peek().kind != TokenKind::Eof {
            if self.peek().kind == TokenKind::Ident {
                let name = self.advance().text;
                if self.at_op(".") {
                    self.advance();
                    let sel = self.expect_ident()?;
                    entries.push((None, Some(Expr::selector(Expr::Ident(name), sel))));
                } else if self.at_op(",") || self.at_op(")") {
                    entries.push((Some(name), None));
                } else {
                    let ty = self.parse_param_type()?;
                    entries.push((Some(name), Some(ty)));
                }
            } else {
                let ty = self.parse_param_type()?;
                entries.push((None, Some(ty)));
            }
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_close(")", open)?;

        let named = entries.iter().any(|(name, ty)| name.is_some() && ty.is_some());
        if !named {
            return Ok(entries
                .into_iter()
                .filter_map(|(name, ty)| ty.or(name.map(Expr::Ident)))
                .map(Field::unnamed)
                .collect());
        }

        let mut fields = Vec::new();
        let mut names = Vec::new();
        for (name, ty) in entries {
            match (name, ty) {
                (Some(name), None) => names.push(name),
                (Some(name), Some(ty)) => {
                    names.push(name);
                    fields.push(Field::new(std::mem::take(&mut names), ty));
                }
                (None, _) => {
                    return Err(ParseError::new(
                        ErrorKind::InvalidSyntax,
                        "mixed named and unnamed parameters",
                        open,
                    ));
                }
            }
        }
        if !names.is_empty() {
            return Err(ParseError::new(ErrorKind::InvalidSyntax, "missing parameter type", open)
                .with_help(format!("Give '{}' a type", names.join(", "))));
        }
        Ok(fields)
    }

    fn parse_param_type(&mut self) -> Result<Expr, ParseError> {
        if self.eat_op("...") {
            let elt = self.parse_type()?;
            return Ok(Expr::Ellipsis(Some(Box::new(elt))));
        }
        self.parse_type()
    }

    // === Types ===

    fn starts_type(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Ident => true,
            TokenKind::Keyword => matches!(token.text.as_str(), "map" | "chan" | "func" | "struct" | "interface"),
            TokenKind::Op => matches!(token.text.as_str(), "*" | "[" | "(" | "<-"),
            _ => false,
        }
    }

    fn parse_type(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match (token.kind, token.text.as_str()) {
            (TokenKind::Ident, _) => {
                self.advance();
                let mut ty = Expr::Ident(token.text);
                if self.eat_op(".") {
                    ty = Expr::selector(ty, self.expect_ident()?);
                }
                Ok(ty)
            }
            (TokenKind::Op, "*") => {
                self.advance();
                Ok(Expr::Star(Box::new(self.parse_type()?)))
            }
            (TokenKind::Op, "(") => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect_close(")", token.span)?;
                Ok(Expr::paren(inner))
            }
            (TokenKind::Op, "[") => self.parse_array_type(),
            (TokenKind::Op, "<-") => {
                self.advance();
                self.expect_keyword("chan")?;
                Ok(Expr::ChanType { dir: ChanDir::Recv, value: Box::new(self.parse_type()?) })
            }
            (TokenKind::Keyword, "map") => self.parse_map_type(),
            (TokenKind::Keyword, "chan") => self.parse_chan_type(),
            (TokenKind::Keyword, "func") => {
                self.advance();
                Ok(Expr::FuncType(self.parse_signature()?))
            }
            (TokenKind::Keyword, "struct") => self.parse_struct_type(),
            (TokenKind::Keyword, "interface") => self.parse_interface_type(),
            _ => Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                format!("expected type, found '{}'", token.text),
                token.span,
            )),
        }
    }

    fn parse_array_type(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect_op("[")?.span;
        let len = if self.at_op("]") {
            None
        } else if self.eat_op("...") {
            Some(Box::new(Expr::Ellipsis(None)))
        } else {
            Some(Box::new(self.with_level(1, |b| b.parse_expr())?))
        };
        self.expect_close("]", open)?;
        let elt = self.parse_type()?;
        Ok(Expr::ArrayType { len, elt: Box::new(elt) })
    }

    fn parse_map_type(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword("map")?;
        let open = self.expect_op("[")?.span;
        let key = self.parse_type()?;
        self.expect_close("]", open)?;
        let value = self.parse_type()?;
        Ok(Expr::MapType { key: Box::new(key), value: Box::new(value) })
    }

    fn parse_chan_type(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword("chan")?;
        let dir = if self.eat_op("<-") { ChanDir::Send } else { ChanDir::Both };
        Ok(Expr::ChanType { dir, value: Box::new(self.parse_type()?) })
    }

    fn parse_struct_type(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword("struct")?;
        let open = self.expect_op("{")?.span;
        let mut fields = Vec::new();

        while !self.at_op("}") && self.peek().kind != TokenKind::Eof {
            if self.peek().is_semicolon() {
                self.advance();
                continue;
            }
            let decor = self.take_decor();
            let embedded = self.at_op("*")
                || (self.peek().kind == TokenKind::Ident && {
                    let next = self.peek_nth(1);
                    next.is_op(".") || next.is_semicolon() || next.is_op("}") || next.kind == TokenKind::String
                });
            let mut field = if embedded {
                Field::unnamed(self.parse_type()?)
            } else {
                let names = self.parse_ident_list()?;
                Field::new(names, self.parse_type()?)
            };
            if self.peek().kind == TokenKind::String {
                field.tag = Some(self.advance().text);
            }
            field.decor = decor;
            field.decor.trailing = self.expect_semi()?;
            fields.push(field);
        }
        self.expect_close("}", open)?;

        Ok(Expr::StructType(fields))
    }

    fn parse_interface_type(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword("interface")?;
        let open = self.expect_op("{")?.span;
        let mut methods = Vec::new();

        while !self.at_op("}") && self.peek().kind != TokenKind::Eof {
            if self.peek().is_semicolon() {
                self.advance();
                continue;
            }
            let decor = self.take_decor();
            let mut field = if self.peek().kind == TokenKind::Ident && self.peek_nth(1).is_op("(") {
                let name = self.advance().text;
                Field::new(vec![name], Expr::FuncType(self.parse_signature()?))
            } else {
                Field::unnamed(self.parse_type()?)
            };
            field.decor = decor;
            field.decor.trailing = self.expect_semi()?;
            methods.push(field);
        }
        self.expect_close("}", open)?;

        Ok(Expr::InterfaceType(methods))
    }

    // === Statements ===

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect_op("{")?.span;
        let stmts = self.parse_stmt_list()?;
        let trailing = std::mem::take(&mut self.tokens[self.pos].comments);
        if !self.at_op("}") {
            return Err(ParseError::new(
                ErrorKind::UnclosedBlock,
                format!("expected '}}', found '{}'", self.peek().text),
                self.peek().span,
            )
            .with_related(open)
            .with_related_label("block opened here")
            .with_help("Close the block with '}'"));
        }
        self.advance();
        Ok(Block { stmts, trailing })
    }

    /// Statements up to `}`, `case` or `default`
    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            let token = self.peek();
            if token.is_op("}") || token.is_keyword("case") || token.is_keyword("default") || token.kind == TokenKind::Eof
            {
                break;
            }
            if token.is_semicolon() {
                self.advance();
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let decor = self.take_decor();
        let kind = self.parse_stmt_kind()?;
        let mut stmt = Stmt { kind, decor };
        if !matches!(stmt.kind, StmtKind::Labeled { .. }) {
            stmt.decor.trailing = self.expect_semi()?;
        }
        Ok(stmt)
    }

    fn parse_stmt_kind(&mut self) -> Result<StmtKind, ParseError> {
        let token = self.peek().clone();

        if token.kind == TokenKind::Keyword {
            match token.text.as_str() {
                "var" | "const" | "type" => return Ok(StmtKind::Decl(self.parse_gen_decl_inner()?)),
                "return" => {
                    self.advance();
                    let results = if self.peek().is_semicolon() || self.at_op("}") {
                        Vec::new()
                    } else {
                        self.parse_expr_list()?
                    };
                    return Ok(StmtKind::Return(results));
                }
                "if" => return Ok(StmtKind::If(self.parse_if()?)),
                "for" => return self.parse_for(),
                "switch" => return self.parse_switch(),
                "go" | "defer" => {
                    self.advance();
                    let call = self.parse_expr()?;
                    return Ok(if token.text == "go" { StmtKind::Go(call) } else { StmtKind::Defer(call) });
                }
                "break" | "continue" | "goto" | "fallthrough" => {
                    self.advance();
                    let keyword = match token.text.as_str() {
                        "break" => BranchKeyword::Break,
                        "continue" => BranchKeyword::Continue,
                        "goto" => BranchKeyword::Goto,
                        _ => BranchKeyword::Fallthrough,
                    };
                    let label = if self.peek().kind == TokenKind::Ident { Some(self.advance().text) } else { None };
                    return Ok(StmtKind::Branch { keyword, label });
                }
                "func" | "map" | "chan" | "struct" | "interface" => {}
                _ => {
                    return Err(ParseError::new(
                        ErrorKind::UnexpectedToken,
                        format!("unexpected '{}' at start of statement", token.text),
                        token.span,
                    ));
                }
            }
        }

        if token.is_op("{") {
            return Ok(StmtKind::Block(self.parse_block()?));
        }

        if token.kind == TokenKind::Ident && self.peek_nth(1).is_op(":") {
            self.advance();
            self.advance();
            let stmt = if self.at_op("}") {
                Stmt::new(StmtKind::Block(Block::default()))
            } else {
                self.parse_stmt()?
            };
            return Ok(StmtKind::Labeled { label: token.text, stmt: Box::new(stmt) });
        }

        match self.parse_simple_stmt(false)? {
            Simple::Stmt(kind) => Ok(kind),
            Simple::Range { .. } => Err(ParseError::new(
                ErrorKind::InvalidSyntax,
                "'range' outside of a for statement",
                token.span,
            )),
        }
    }

    fn parse_simple_stmt(&mut self, range_ok: bool) -> Result<Simple, ParseError> {
        if range_ok && self.at_keyword("range") {
            self.advance();
            let x = self.parse_expr()?;
            return Ok(Simple::Range { key: None, value: None, define: false, x });
        }

        let start = self.peek().span;
        let mut lhs = self.parse_expr_list()?;
        let token = self.peek().clone();

        if token.kind == TokenKind::Op {
            if let Some(op) = AssignOp::from_token(&token.text) {
                self.advance();
                if range_ok && self.at_keyword("range") && matches!(op, AssignOp::Assign | AssignOp::Define) {
                    self.advance();
                    let x = self.parse_expr()?;
                    let mut targets = lhs.into_iter();
                    return Ok(Simple::Range {
                        key: targets.next(),
                        value: targets.next(),
                        define: op == AssignOp::Define,
                        x,
                    });
                }
                let rhs = self.parse_expr_list()?;
                return Ok(Simple::Stmt(StmtKind::Assign(AssignStmt { lhs, op, rhs })));
            }
            match token.text.as_str() {
                "++" | "--" => {
                    self.advance();
                    let x = single(lhs, start)?;
                    return Ok(Simple::Stmt(StmtKind::IncDec { x, inc: token.text == "++" }));
                }
                "<-" => {
                    self.advance();
                    let chan = single(lhs, start)?;
                    let value = self.parse_expr()?;
                    return Ok(Simple::Stmt(StmtKind::Send { chan, value }));
                }
                _ => {}
            }
        }

        if lhs.len() > 1 {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                format!("expected ':=' or '=' after expression list, found '{}'", token.text),
                token.span,
            ));
        }
        let expr = lhs.pop().ok_or_else(|| ParseError::new(ErrorKind::InvalidSyntax, "expected expression", start))?;
        Ok(Simple::Stmt(StmtKind::Expr(expr)))
    }

    fn parse_if(&mut self) -> Result<IfStmt, ParseError> {
        let if_token = self.advance();
        let level = std::mem::replace(&mut self.expr_level, -1);

        if self.at_op("{") {
            self.expr_level = level;
            return Err(ParseError::new(ErrorKind::InvalidSyntax, "missing condition in if statement", if_token.span));
        }

        let mut init = None;
        let mut header = if self.at_op(";") { None } else { Some(self.parse_simple_stmt(false)?) };
        if self.eat_op(";") {
            init = header.take();
            header = Some(self.parse_simple_stmt(false)?);
        }
        self.expr_level = level;

        let cond = match header {
            Some(Simple::Stmt(StmtKind::Expr(cond))) => cond,
            _ => {
                return Err(ParseError::new(ErrorKind::InvalidSyntax, "expected condition after 'if'", if_token.span)
                    .with_help("Use 'if x := f(); x != nil {' to combine a statement with a condition"));
            }
        };
        let init = init.map(|simple| simple_to_stmt(simple, if_token.span)).transpose()?;

        let body = self.parse_block()?;
        let els = if self.eat_keyword("else") {
            if self.at_keyword("if") {
                Some(Box::new(Stmt::new(StmtKind::If(self.parse_if()?))))
            } else if self.at_op("{") {
                Some(Box::new(Stmt::new(StmtKind::Block(self.parse_block()?))))
            } else {
                let token = self.peek();
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    format!("expected 'if' or '{{' after 'else', found '{}'", token.text),
                    token.span,
                ));
            }
        } else {
            None
        };

        Ok(IfStmt { init: init.map(Box::new), cond, body, els })
    }

    fn parse_for(&mut self) -> Result<StmtKind, ParseError> {
        let for_token = self.advance();
        let level = std::mem::replace(&mut self.expr_level, -1);

        let mut init = None;
        let mut cond = None;
        let mut post = None;
        let mut range = None;

        if !self.at_op("{") {
            let first = if self.at_op(";") { None } else { Some(self.parse_simple_stmt(true)?) };
            match first {
                Some(Simple::Range { key, value, define, x }) => range = Some((key, value, define, x)),
                first if self.eat_op(";") => {
                    init = first.map(|s| simple_to_stmt(s, for_token.span)).transpose()?;
                    if !self.at_op(";") {
                        cond = Some(self.parse_expr()?);
                    }
                    self.expect_op(";")?;
                    if !self.at_op("{") {
                        post = Some(simple_to_stmt(self.parse_simple_stmt(false)?, for_token.span)?);
                    }
                }
                Some(Simple::Stmt(StmtKind::Expr(expr))) => cond = Some(expr),
                _ => {
                    self.expr_level = level;
                    return Err(ParseError::new(ErrorKind::InvalidSyntax, "malformed for statement header", for_token.span));
                }
            }
        }
        self.expr_level = level;
        let body = self.parse_block()?;

        if let Some((key, value, define, x)) = range {
            return Ok(StmtKind::Range(RangeStmt { key, value, define, x, body }));
        }
        Ok(StmtKind::For(ForStmt {
            init: init.map(Box::new),
            cond,
            post: post.map(Box::new),
            body,
        }))
    }

    fn parse_switch(&mut self) -> Result<StmtKind, ParseError> {
        let switch_token = self.advance();
        let level = std::mem::replace(&mut self.expr_level, -1);

        let mut init = None;
        let mut header = None;
        if !self.at_op("{") {
            if !self.at_op(";") {
                header = Some(self.parse_simple_stmt(false)?);
            }
            if self.eat_op(";") {
                init = header.take();
                if !self.at_op("{") {
                    header = Some(self.parse_simple_stmt(false)?);
                }
            }
        }
        self.expr_level = level;

        let init = init.map(|s| simple_to_stmt(s, switch_token.span)).transpose()?.map(Box::new);
        let header = header.map(|s| simple_to_stmt(s, switch_token.span)).transpose()?;

        let open = self.expect_op("{")?.span;
        let mut clauses = Vec::new();
        while !self.at_op("}") && self.peek().kind != TokenKind::Eof {
            if self.peek().is_semicolon() {
                self.advance();
                continue;
            }
            clauses.push(self.parse_case_clause()?);
        }
        self.expect_close("}", open)?;

        let is_type_switch = match header.as_ref().map(|stmt| &stmt.kind) {
            Some(StmtKind::Assign(AssignStmt { op: AssignOp::Define, rhs, .. })) => {
                rhs.len() == 1 && matches!(rhs[0], Expr::TypeAssert { ty: None, .. })
            }
            Some(StmtKind::Expr(Expr::TypeAssert { ty: None, .. })) => true,
            _ => false,
        };

        match header {
            Some(assign) if is_type_switch => Ok(StmtKind::TypeSwitch(TypeSwitchStmt {
                init,
                assign: Box::new(assign),
                body: clauses,
            })),
            Some(Stmt { kind: StmtKind::Expr(tag), .. }) => Ok(StmtKind::Switch(SwitchStmt { init, tag: Some(tag), body: clauses })),
            None => Ok(StmtKind::Switch(SwitchStmt { init, tag: None, body: clauses })),
            Some(_) => Err(ParseError::new(
                ErrorKind::InvalidSyntax,
                "switch expression must be an expression",
                switch_token.span,
            )),
        }
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause, ParseError> {
        let decor = self.take_decor();
        let list = if self.eat_keyword("case") {
            self.parse_expr_list()?
        } else if self.eat_keyword("default") {
            Vec::new()
        } else {
            let token = self.peek();
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                format!("expected 'case' or 'default', found '{}'", token.text),
                token.span,
            ));
        };
        self.expect_op(":")?;
        let body = self.parse_stmt_list()?;
        Ok(CaseClause { list, body, decor })
    }

    // === Expressions ===

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut list = vec![self.parse_expr()?];
        while self.eat_op(",") {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut x = self.parse_unary()?;
        loop {
            let token = self.peek();
            if token.kind != TokenKind::Op {
                break;
            }
            let Some(op) = BinaryOp::from_token(&token.text) else {
                break;
            };
            if op.precedence() < min_precedence {
                break;
            }
            self.advance();
            let y = self.parse_binary(op.precedence() + 1)?;
            x = Expr::binary(x, op, y);
        }
        Ok(x)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        if token.kind == TokenKind::Op {
            if token.text == "*" {
                self.advance();
                return Ok(Expr::Star(Box::new(self.parse_unary()?)));
            }
            if token.text == "<-" && self.peek_nth(1).is_keyword("chan") {
                return self.parse_type();
            }
            if let Some(op) = UnaryOp::from_token(&token.text) {
                self.advance();
                let x = self.parse_unary()?;
                return Ok(Expr::Unary { op, x: Box::new(x) });
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let mut x = self.parse_operand()?;
        loop {
            let token = self.peek().clone();
            if token.kind != TokenKind::Op {
                break;
            }
            match token.text.as_str() {
                "." => {
                    self.advance();
                    if self.eat_op("(") {
                        let ty = if self.eat_keyword("type") {
                            None
                        } else {
                            Some(Box::new(self.parse_type()?))
                        };
                        self.expect_close(")", token.span)?;
                        x = Expr::TypeAssert { x: Box::new(x), ty };
                    } else {
                        x = Expr::selector(x, self.expect_ident()?);
                    }
                }
                "[" => {
                    self.advance();
                    x = self.with_level(1, |b| b.parse_index_or_slice(x, token.span))?;
                }
                "(" => {
                    self.advance();
                    x = self.with_level(1, |b| b.parse_call(x, token.span))?;
                }
                "{" if is_literal_type(&x) && (self.expr_level >= 0 || !is_type_name(&x)) => {
                    x = self.parse_composite(Some(x))?;
                }
                _ => break,
            }
        }
        Ok(x)
    }

    fn parse_index_or_slice(&mut self, x: Expr, open: Span) -> Result<Expr, ParseError> {
        let low = if self.at_op(":") { None } else { Some(Box::new(self.parse_expr()?)) };
        if !self.eat_op(":") {
            let index = low.ok_or_else(|| ParseError::new(ErrorKind::InvalidSyntax, "expected operand", open))?;
            self.expect_close("]", open)?;
            return Ok(Expr::Index { x: Box::new(x), index });
        }
        let high = if self.at_op("]") || self.at_op(":") { None } else { Some(Box::new(self.parse_expr()?)) };
        let max = if self.eat_op(":") { Some(Box::new(self.parse_expr()?)) } else { None };
        self.expect_close("]", open)?;
        Ok(Expr::Slice { x: Box::new(x), low, high, max })
    }

    fn parse_call(&mut self, fun: Expr, open: Span) -> Result<Expr, ParseError> {
        let mut call = CallExpr::new(fun);
        while !self.at_op(")") && self.peek().kind != TokenKind::Eof {
            let decor = self.take_decor();
            let expr = self.parse_expr()?;
            if self.eat_op("...") {
                call.ellipsis = true;
            }
            let (elt, more) = self.finish_element(expr, decor);
            call.args.push(elt);
            if !more {
                break;
            }
        }
        call.closing = std::mem::take(&mut self.tokens[self.pos].comments);
        self.expect_close(")", open)?;
        Ok(Expr::Call(call))
    }

    fn parse_composite(&mut self, ty: Option<Expr>) -> Result<Expr, ParseError> {
        let open = self.expect_op("{")?.span;
        let layout = if self.peek().span.start.line > open.end.line { Layout::Lines } else { Layout::Inline };

        let elts = self.with_level(1, |b| {
            let mut elts = Vec::new();
            while !b.at_op("}") && b.peek().kind != TokenKind::Eof {
                let decor = b.take_decor();
                let key = b.parse_element()?;
                let expr = if b.eat_op(":") {
                    let value = b.parse_element()?;
                    Expr::key_value(key, value)
                } else {
                    key
                };
                let (elt, more) = b.finish_element(expr, decor);
                elts.push(elt);
                if !more {
                    break;
                }
            }
            Ok(elts)
        })?;
        let closing = std::mem::take(&mut self.tokens[self.pos].comments);
        self.expect_close("}", open)?;

        Ok(Expr::CompositeLit(CompositeLit { ty: ty.map(Box::new), elts, layout, closing }))
    }

    /// Consume the comma after a list element, keeping the comment behind it.
    /// Returns whether another element may follow.
    fn finish_element(&mut self, expr: Expr, mut decor: Decor) -> (Element, bool) {
        if !self.at_op(",") {
            return (Element { expr, decor }, false);
        }
        decor.trailing = self.advance().trailing;
        (Element { expr, decor }, true)
    }

    fn parse_element(&mut self) -> Result<Expr, ParseError> {
        if self.at_op("{") {
            return self.parse_composite(None);
        }
        self.parse_expr()
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::Ident(token.text))
            }
            TokenKind::Int | TokenKind::Float | TokenKind::Imag | TokenKind::Char | TokenKind::String => {
                self.advance();
                let kind = match token.kind {
                    TokenKind::Int => LitKind::Int,
                    TokenKind::Float => LitKind::Float,
                    TokenKind::Imag => LitKind::Imag,
                    TokenKind::Char => LitKind::Char,
                    _ => LitKind::String,
                };
                Ok(Expr::BasicLit(BasicLit { kind, value: token.text }))
            }
            TokenKind::Op if token.text == "(" => {
                self.advance();
                let inner = self.with_level(1, |b| b.parse_expr())?;
                self.expect_close(")", token.span)?;
                Ok(Expr::paren(inner))
            }
            TokenKind::Op if token.text == "[" => self.parse_type(),
            TokenKind::Keyword if token.text == "func" => {
                self.advance();
                let ty = self.parse_signature()?;
                if !self.at_op("{") {
                    return Ok(Expr::FuncType(ty));
                }
                let body = self.with_level(0, |b| b.parse_block())?;
                Ok(Expr::FuncLit(FuncLit { ty, body }))
            }
            TokenKind::Keyword if matches!(token.text.as_str(), "map" | "chan" | "struct" | "interface") => self.parse_type(),
            _ => Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                format!("expected expression, found '{}'", display_text(&token)),
                token.span,
            )),
        }
    }

    // === Token helpers ===

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_op(&self, op: &str) -> bool {
        self.peek().is_op(op)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.at_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: &str) -> Result<Token, ParseError> {
        if self.at_op(op) {
            return Ok(self.advance());
        }
        let token = self.peek();
        Err(ParseError::new(
            if token.kind == TokenKind::Eof { ErrorKind::UnexpectedEof } else { ErrorKind::UnexpectedToken },
            format!("expected '{}', found '{}'", op, display_text(token)),
            token.span,
        ))
    }

    /// Require a closing delimiter, pointing back at the opening one
    fn expect_close(&mut self, close: &str, open: Span) -> Result<(), ParseError> {
        self.expect_op(close).map(|_| ()).map_err(|err| err.with_related(open))
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            return Ok(());
        }
        let token = self.peek();
        Err(ParseError::new(
            ErrorKind::UnexpectedToken,
            format!("expected '{}', found '{}'", keyword, display_text(token)),
            token.span,
        ))
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Ident {
            return Ok(self.advance().text);
        }
        Err(ParseError::new(
            ErrorKind::UnexpectedToken,
            format!("expected identifier, found '{}'", display_text(token)),
            token.span,
        ))
    }

    fn parse_ident_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.eat_op(",") {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    /// Consume a statement terminator and return its trailing comment.
    /// The terminator may be omitted before a closing `)` or `}`.
    fn expect_semi(&mut self) -> Result<Option<String>, ParseError> {
        let token = self.peek();
        if token.is_semicolon() {
            return Ok(self.advance().trailing);
        }
        if token.is_op(")") || token.is_op("}") || token.kind == TokenKind::Eof {
            return Ok(None);
        }
        Err(ParseError::new(
            ErrorKind::UnexpectedToken,
            format!("expected end of statement, found '{}'", display_text(token)),
            token.span,
        )
        .with_help("Put each statement on its own line or separate them with ';'"))
    }

    /// Move the current token's comments into a decor
    fn take_decor(&mut self) -> Decor {
        let index = self.pos.min(self.tokens.len() - 1);
        let token = &mut self.tokens[index];
        Decor {
            before: if token.blank_before { Spacing::EmptyLine } else { Spacing::NewLine },
            comments: std::mem::take(&mut token.comments),
            trailing: None,
        }
    }

    fn with_level<T>(&mut self, level: i32, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        let saved = std::mem::replace(&mut self.expr_level, level);
        let result = f(self);
        self.expr_level = saved;
        result
    }
}

fn display_text(token: &Token) -> &str {
    match token.kind {
        TokenKind::Eof => "end of file",
        TokenKind::AutoSemi => "newline",
        _ => &token.text,
    }
}

fn single(mut list: Vec<Expr>, span: Span) -> Result<Expr, ParseError> {
    if list.len() != 1 {
        return Err(ParseError::new(ErrorKind::InvalidSyntax, "expected a single expression", span));
    }
    list.pop().ok_or_else(|| ParseError::new(ErrorKind::InvalidSyntax, "expected expression", span))
}

fn simple_to_stmt(simple: Simple, span: Span) -> Result<Stmt, ParseError> {
    match simple {
        Simple::Stmt(kind) => Ok(Stmt::new(kind)),
        Simple::Range { .. } => Err(ParseError::new(ErrorKind::InvalidSyntax, "unexpected 'range'", span)),
    }
}

/// Expressions that may precede `{` in a composite literal
fn is_literal_type(x: &Expr) -> bool {
    match x {
        Expr::Ident(_) => true,
        Expr::Selector { x, .. } => matches!(**x, Expr::Ident(_)),
        Expr::ArrayType { .. } | Expr::MapType { .. } | Expr::StructType(_) => true,
        _ => false,
    }
}

fn is_type_name(x: &Expr) -> bool {
    matches!(x, Expr::Ident(_) | Expr::Selector { .. })
}
