//! Statement parsing.

use pasc_lex::TokenKind;
use pasc_util::Diagnostic;

use crate::ast::*;
use crate::Parser;

impl Parser {
    /// Parse `begin stmt-list end`.
    pub(crate) fn parse_compound(&mut self) -> Result<CompoundStmt, Diagnostic> {
        let start = self.expect(&TokenKind::Begin)?.span;
        let stmts = self.parse_stmt_list()?;
        let end = self.expect(&TokenKind::End)?.span;
        Ok(CompoundStmt {
            stmts,
            span: start.to(end),
        })
    }

    /// Parse a `;`-separated statement list.
    ///
    /// Empty statements between separators are tolerated, and the separator
    /// before the closing `end`/`until` may be omitted: the list simply ends
    /// when neither a statement nor a `;` follows.
    pub(crate) fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>, Diagnostic> {
        let mut stmts = Vec::new();
        loop {
            if self.starts_statement() {
                stmts.push(self.parse_statement()?);
            }
            if !self.eat(&TokenKind::Semicolon) {
                return Ok(stmts);
            }
        }
    }

    fn starts_statement(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Ident(_)
                | TokenKind::Begin
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Repeat
        )
    }

    /// Parse a single statement, dispatching on the leading token.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, Diagnostic> {
        match self.peek().kind.clone() {
            TokenKind::Begin => Ok(Stmt::Compound(self.parse_compound()?)),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Ident(_) => self.parse_simple_statement(),
            _ => Err(self.error_here("statement")),
        }
    }

    /// Parse an identifier-led statement: assignment, procedure call, or an
    /// I/O statement.
    fn parse_simple_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let name = self.expect_ident()?;

        // The I/O builtins get dedicated nodes so the newline flag and the
        // l-value rules have somewhere to live. A shadowing assignment like
        // `write := 1` still parses as an assignment.
        if let Some(stmt) = self.parse_io_statement(&name)? {
            return Ok(stmt);
        }

        if self.check(&TokenKind::LParen) {
            let args = self.parse_actuals()?;
            let span = name.span.to(self.prev_span());
            return Ok(Stmt::Call(CallStmt {
                callee: name,
                args,
                span,
            }));
        }

        let target = if self.check(&TokenKind::LBracket) {
            let indices = self.parse_indices()?;
            let span = name.span.to(self.prev_span());
            Expr::Index(IndexExpr {
                array: name,
                indices,
                span,
            })
        } else {
            Expr::Var(name)
        };

        if self.eat(&TokenKind::Assign) {
            let value = self.parse_expression()?;
            let span = target.span().to(value.span());
            return Ok(Stmt::Assign(AssignStmt {
                target,
                value,
                span,
            }));
        }

        // A bare identifier is a parameterless procedure call.
        match target {
            Expr::Var(ident) => {
                let span = ident.span;
                Ok(Stmt::Call(CallStmt {
                    callee: ident,
                    args: Vec::new(),
                    span,
                }))
            }
            _ => Err(self.error_here("':='")),
        }
    }

    /// Recognize `write`/`writeln`/`read`/`readln` statements.
    ///
    /// Returns `Ok(None)` when the identifier is not an I/O builtin, or when
    /// it is being used as an assignment target.
    fn parse_io_statement(&mut self, name: &Ident) -> Result<Option<Stmt>, Diagnostic> {
        if self.check(&TokenKind::Assign) || self.check(&TokenKind::LBracket) {
            return Ok(None);
        }
        let (read, newline) = match name.name.to_ascii_lowercase().as_str() {
            "write" => (false, false),
            "writeln" => (false, true),
            "read" => (true, false),
            "readln" => (true, true),
            _ => return Ok(None),
        };

        let args = if self.check(&TokenKind::LParen) {
            self.parse_actuals()?
        } else {
            Vec::new()
        };
        let span = name.span.to(self.prev_span());
        let io = IoStmt {
            args,
            newline,
            span,
        };
        Ok(Some(if read { Stmt::Read(io) } else { Stmt::Write(io) }))
    }

    /// Parse `if cond then stmt [else stmt]`.
    ///
    /// The `else` attaches to the nearest unmatched `if`; recursive descent
    /// gives that binding without extra work.
    fn parse_if(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(&TokenKind::If)?.span;
        let cond = self.parse_expression()?;
        self.expect(&TokenKind::Then)?;
        let then_branch = Box::new(self.parse_statement()?);

        let mut span = start.to(then_branch.span());
        let else_branch = if self.eat(&TokenKind::Else) {
            let stmt = self.parse_statement()?;
            span = start.to(stmt.span());
            Some(Box::new(stmt))
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span,
        }))
    }

    /// Parse `while cond do stmt`.
    fn parse_while(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(&TokenKind::While)?.span;
        let cond = self.parse_expression()?;
        self.expect(&TokenKind::Do)?;
        let body = Box::new(self.parse_statement()?);
        let span = start.to(body.span());
        Ok(Stmt::While(WhileStmt { cond, body, span }))
    }

    /// Parse `for i := from to|downto limit do stmt`.
    ///
    /// The loop variable must be a bare identifier.
    fn parse_for(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(&TokenKind::For)?.span;
        let var = self.expect_ident()?;
        self.expect(&TokenKind::Assign)?;
        let from = self.parse_expression()?;

        let direction = if self.eat(&TokenKind::To) {
            ForDirection::To
        } else if self.eat(&TokenKind::Downto) {
            ForDirection::Downto
        } else {
            return Err(self.error_here("'to' or 'downto'"));
        };

        let limit = self.parse_expression()?;
        self.expect(&TokenKind::Do)?;
        let body = Box::new(self.parse_statement()?);
        let span = start.to(body.span());

        Ok(Stmt::For(ForStmt {
            var,
            from,
            limit,
            direction,
            body,
            span,
        }))
    }

    /// Parse `repeat stmt-list until cond`.
    fn parse_repeat(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(&TokenKind::Repeat)?.span;
        let body = self.parse_stmt_list()?;
        self.expect(&TokenKind::Until)?;
        let cond = self.parse_expression()?;
        let span = start.to(cond.span());
        Ok(Stmt::Repeat(RepeatStmt { body, cond, span }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pasc_lex::tokenize;

    fn body_of(source: &str) -> Vec<Stmt> {
        parse(tokenize(source).unwrap())
            .expect("parsing should succeed")
            .body
    }

    fn parse_err(source: &str) -> String {
        parse(tokenize(source).unwrap()).unwrap_err().to_string()
    }

    #[test]
    fn test_assignment() {
        let body = body_of("program P; var x: integer; begin x := 1 + 2 end.");
        assert_eq!(body.len(), 1);
        match &body[0] {
            Stmt::Assign(a) => {
                assert!(matches!(a.target, Expr::Var(_)));
                assert!(matches!(a.value, Expr::Binary(_)));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_array_element_assignment() {
        let body = body_of("program P; begin a[i, j] := 0 end.");
        match &body[0] {
            Stmt::Assign(a) => match &a.target {
                Expr::Index(ix) => {
                    assert_eq!(ix.array.name, "a");
                    assert_eq!(ix.indices.len(), 2);
                }
                other => panic!("expected index target, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_procedure_calls() {
        let body = body_of("program P; begin Init; Step(1, x) end.");
        match (&body[0], &body[1]) {
            (Stmt::Call(bare), Stmt::Call(args)) => {
                assert_eq!(bare.callee.name, "Init");
                assert!(bare.args.is_empty());
                assert_eq!(args.callee.name, "Step");
                assert_eq!(args.args.len(), 2);
            }
            other => panic!("expected two calls, got {:?}", other),
        }
    }

    #[test]
    fn test_io_statements() {
        let body = body_of("program P; begin write(x, ' '); writeln; read(x); readln(y) end.");
        assert!(matches!(&body[0], Stmt::Write(io) if !io.newline && io.args.len() == 2));
        assert!(matches!(&body[1], Stmt::Write(io) if io.newline && io.args.is_empty()));
        assert!(matches!(&body[2], Stmt::Read(io) if !io.newline && io.args.len() == 1));
        assert!(matches!(&body[3], Stmt::Read(io) if io.newline));
    }

    #[test]
    fn test_io_names_are_case_insensitive() {
        let body = body_of("program P; begin WriteLn('hi') end.");
        assert!(matches!(&body[0], Stmt::Write(io) if io.newline));
    }

    #[test]
    fn test_shadowed_write_is_assignment() {
        let body = body_of("program P; var write: integer; begin write := 1 end.");
        assert!(matches!(&body[0], Stmt::Assign(_)));
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        let body = body_of("program P; begin if a then if b then x := 1 else x := 2 end.");
        match &body[0] {
            Stmt::If(outer) => {
                assert!(outer.else_branch.is_none());
                match outer.then_branch.as_ref() {
                    Stmt::If(inner) => assert!(inner.else_branch.is_some()),
                    other => panic!("expected nested if, got {:?}", other),
                }
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_while_and_compound() {
        let body = body_of("program P; begin while i <= 10 do begin s := s + i; i := i + 1 end end.");
        match &body[0] {
            Stmt::While(w) => match w.body.as_ref() {
                Stmt::Compound(c) => assert_eq!(c.stmts.len(), 2),
                other => panic!("expected compound body, got {:?}", other),
            },
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_for_directions() {
        let body = body_of("program P; begin for i := 1 to 5 do f := f * i; for j := 5 downto 1 do g := g + j end.");
        assert!(matches!(&body[0], Stmt::For(f) if f.direction == ForDirection::To));
        assert!(matches!(&body[1], Stmt::For(f) if f.direction == ForDirection::Downto));
    }

    #[test]
    fn test_repeat_until() {
        let body = body_of("program P; begin repeat i := i + 1 until i > 10 end.");
        match &body[0] {
            Stmt::Repeat(r) => {
                assert_eq!(r.body.len(), 1);
                assert!(matches!(r.cond, Expr::Binary(_)));
            }
            other => panic!("expected repeat, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_semicolon_optional() {
        // Both with and without the separator before `end`.
        assert_eq!(body_of("program P; begin x := 1; y := 2 end.").len(), 2);
        assert_eq!(body_of("program P; begin x := 1; y := 2; end.").len(), 2);
    }

    #[test]
    fn test_empty_statements_tolerated() {
        assert_eq!(body_of("program P; begin ;; x := 1;; end.").len(), 1);
    }

    #[test]
    fn test_for_loop_variable_must_be_bare() {
        let err = parse_err("program P; begin for a[1] := 1 to 3 do x := 1 end.");
        assert!(err.contains("expected ':='"), "got: {}", err);
    }

    #[test]
    fn test_missing_then() {
        let err = parse_err("program P; begin if x > 0 x := 1 end.");
        assert!(err.contains("expected 'then'"), "got: {}", err);
    }

    #[test]
    fn test_while_requires_body_statement() {
        // `do` followed directly by `;` leaves no body statement; the
        // offending token is the semicolon.
        let err = parse_err("program P; begin while x do; end.");
        assert!(err.contains("expected statement"), "got: {}", err);
    }
}
