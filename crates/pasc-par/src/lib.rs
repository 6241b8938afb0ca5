//! pasc-par - Parser (Syntactic Analyzer)
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Recursive descent over the Pascal dialect's grammar, producing a single
//! [`Program`] AST or the first syntax diagnostic. One token of lookahead
//! (`peek`) and single-token consumption (`expect`) are the only primitives;
//! there is no backtracking.
//!
//! GRAMMAR (EBNF):
//! ---------------
//! ```ebnf
//! program       = "program" ident ";" declarations compound "." ;
//!
//! declarations  = { var-section | proc-decl | func-decl } ;
//! var-section   = "var" ident-list ":" type ";" { ident-list ":" type ";" } ;
//! proc-decl     = "procedure" ident [ formals ] ";" declarations compound ";" ;
//! func-decl     = "function" ident [ formals ] ":" type ";" declarations compound ";" ;
//! formals       = "(" formal-group { ";" formal-group } ")" ;
//! formal-group  = [ "var" ] ident-list ":" type ;
//!
//! type          = simple-type
//!               | "array" "[" range { "," range } "]" "of" simple-type ;
//! range         = signed-int ".." signed-int ;
//!
//! compound      = "begin" stmt-list "end" ;
//! stmt-list     = [ statement ] { ";" [ statement ] } ;
//! statement     = assignment | call | compound | if | while | for | repeat
//!               | read | write ;
//!
//! expression    = simple-expr { relop simple-expr } ;
//! simple-expr   = term { ( "+" | "-" | "or" ) term } ;
//! term          = factor { ( "*" | "/" | "div" | "mod" | "and" ) factor } ;
//! factor        = ( "+" | "-" | "not" ) factor | literal
//!               | "(" expression ")" | ident [ actuals | indices ] ;
//! ```
//!
//! All binary operators are left-associative within their level, implemented
//! as the usual iterative left-fold rather than left recursion. The dangling
//! `else` binds to the nearest unmatched `if`, which recursive descent gives
//! for free. A statement separator `;` may be omitted before `end`, `until`,
//! and `else`.
//!
//! ERROR POLICY:
//! -------------
//! The first unexpected token aborts with `expected X, got Y` at the
//! offending token's position. No recovery.

pub mod ast;

mod expr;
mod stmt;

pub use ast::*;

use pasc_lex::{Token, TokenKind};
use pasc_util::{Diagnostic, Span};

/// Parse a token stream into a [`Program`].
///
/// The stream must be the output of [`pasc_lex::tokenize`]: Eof-terminated,
/// positions non-decreasing.
///
/// # Example
///
/// ```
/// use pasc_lex::tokenize;
/// use pasc_par::parse;
///
/// let tokens = tokenize("program P; begin end.").unwrap();
/// let program = parse(tokens).unwrap();
/// assert_eq!(program.name.name, "P");
/// assert!(program.body.is_empty());
/// ```
pub fn parse(tokens: Vec<Token>) -> Result<Program, Diagnostic> {
    Parser::new(tokens).parse_program()
}

/// Recursive descent parser.
pub struct Parser {
    /// Token stream from the lexer.
    tokens: Vec<Token>,

    /// Current position in the token stream.
    position: usize,
}

impl Parser {
    /// Create a parser over `tokens`.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, Span::DUMMY));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse a complete program: header, declarations, main block, `.`.
    pub fn parse_program(&mut self) -> Result<Program, Diagnostic> {
        let start = self.peek().span;

        self.expect(&TokenKind::Program)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Semicolon)?;

        let decls = self.parse_declarations()?;

        let body = self.parse_compound()?;
        self.expect(&TokenKind::Dot)?;
        let end = self.expect(&TokenKind::Eof)?.span;

        Ok(Program {
            name,
            decls,
            body: body.stmts,
            span: start.to(end),
        })
    }

    // ========================================================================
    // DECLARATIONS
    // ========================================================================

    /// Parse the declaration region of a program, procedure, or function.
    fn parse_declarations(&mut self) -> Result<Vec<Decl>, Diagnostic> {
        let mut decls = Vec::new();
        loop {
            if self.eat(&TokenKind::Var) {
                // One `var` keyword introduces one or more groups.
                loop {
                    decls.push(Decl::Var(self.parse_var_group()?));
                    if !matches!(self.peek().kind, TokenKind::Ident(_)) {
                        break;
                    }
                }
            } else if self.check(&TokenKind::Procedure) {
                decls.push(Decl::Proc(self.parse_proc_decl()?));
            } else if self.check(&TokenKind::Function) {
                decls.push(Decl::Func(self.parse_func_decl()?));
            } else {
                return Ok(decls);
            }
        }
    }

    /// Parse one `a, b, c : type ;` group of a var section.
    fn parse_var_group(&mut self) -> Result<VarDecl, Diagnostic> {
        let start = self.peek().span;
        let names = self.parse_ident_list()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type_spec()?;
        let end = self.expect(&TokenKind::Semicolon)?.span;
        Ok(VarDecl {
            names,
            ty,
            span: start.to(end),
        })
    }

    /// Parse `procedure Name [(formals)]; declarations compound ;`.
    fn parse_proc_decl(&mut self) -> Result<ProcDecl, Diagnostic> {
        let start = self.expect(&TokenKind::Procedure)?.span;
        let name = self.expect_ident()?;
        let params = self.parse_formal_params()?;
        self.expect(&TokenKind::Semicolon)?;

        let decls = self.parse_declarations()?;
        let body = self.parse_compound()?;
        let end = self.expect(&TokenKind::Semicolon)?.span;

        Ok(ProcDecl {
            name,
            params,
            decls,
            body: body.stmts,
            span: start.to(end),
        })
    }

    /// Parse `function Name [(formals)] : type ; declarations compound ;`.
    fn parse_func_decl(&mut self) -> Result<FuncDecl, Diagnostic> {
        let start = self.expect(&TokenKind::Function)?.span;
        let name = self.expect_ident()?;
        let params = self.parse_formal_params()?;
        self.expect(&TokenKind::Colon)?;
        let ret = self.parse_type_spec()?;
        self.expect(&TokenKind::Semicolon)?;

        let decls = self.parse_declarations()?;
        let body = self.parse_compound()?;
        let end = self.expect(&TokenKind::Semicolon)?.span;

        Ok(FuncDecl {
            name,
            params,
            ret,
            decls,
            body: body.stmts,
            span: start.to(end),
        })
    }

    /// Parse an optional parenthesized formal parameter list.
    ///
    /// Groups are separated by `;`; a group prefixed with `var` passes its
    /// parameters by reference.
    fn parse_formal_params(&mut self) -> Result<Vec<FormalParam>, Diagnostic> {
        let mut params = Vec::new();
        if !self.eat(&TokenKind::LParen) {
            return Ok(params);
        }
        if self.eat(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let mode = if self.eat(&TokenKind::Var) {
                PassMode::ByRef
            } else {
                PassMode::ByValue
            };
            let names = self.parse_ident_list()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type_spec()?;
            for name in names {
                let span = name.span.to(ty.span());
                params.push(FormalParam {
                    name,
                    ty: ty.clone(),
                    mode,
                    span,
                });
            }
            if !self.eat(&TokenKind::Semicolon) {
                break;
            }
        }

        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// Parse `a, b, c` (at least one identifier).
    fn parse_ident_list(&mut self) -> Result<Vec<Ident>, Diagnostic> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    /// Parse a simple type name or an array type.
    fn parse_type_spec(&mut self) -> Result<TypeSpec, Diagnostic> {
        if matches!(self.peek().kind, TokenKind::Array) {
            let start = self.advance().span;
            self.expect(&TokenKind::LBracket)?;
            let mut ranges = vec![self.parse_index_range()?];
            while self.eat(&TokenKind::Comma) {
                ranges.push(self.parse_index_range()?);
            }
            self.expect(&TokenKind::RBracket)?;
            self.expect(&TokenKind::Of)?;
            let (elem, elem_span) = self.parse_simple_type()?;
            return Ok(TypeSpec::Array {
                elem,
                ranges,
                span: start.to(elem_span),
            });
        }

        let (simple, span) = self.parse_simple_type()?;
        Ok(TypeSpec::Simple(simple, span))
    }

    /// Parse one of the five primitive type names (case-insensitive).
    fn parse_simple_type(&mut self) -> Result<(SimpleType, Span), Diagnostic> {
        let token = self.peek().clone();
        if let TokenKind::Ident(name) = &token.kind {
            let simple = match name.to_ascii_lowercase().as_str() {
                "integer" => Some(SimpleType::Integer),
                "real" => Some(SimpleType::Real),
                "boolean" => Some(SimpleType::Boolean),
                "char" => Some(SimpleType::Char),
                "string" => Some(SimpleType::String),
                _ => None,
            };
            if let Some(simple) = simple {
                self.advance();
                return Ok((simple, token.span));
            }
        }
        Err(self.error_here("type name"))
    }

    /// Parse `lo..hi` with optionally signed integer bounds.
    fn parse_index_range(&mut self) -> Result<IndexRange, Diagnostic> {
        let start = self.peek().span;
        let lo = self.parse_signed_int()?;
        self.expect(&TokenKind::DotDot)?;
        let hi = self.parse_signed_int()?;
        let end = self.prev_span();
        Ok(IndexRange {
            lo,
            hi,
            span: start.to(end),
        })
    }

    /// Parse an integer literal with an optional leading sign.
    fn parse_signed_int(&mut self) -> Result<i64, Diagnostic> {
        let negative = if self.eat(&TokenKind::Minus) {
            true
        } else {
            self.eat(&TokenKind::Plus);
            false
        };
        match self.peek().kind.clone() {
            TokenKind::Int(value) => {
                self.advance();
                Ok(if negative { -value } else { value })
            }
            _ => Err(self.error_here("integer literal")),
        }
    }

    // ========================================================================
    // PRIMITIVES
    // ========================================================================

    /// The current token. `Eof` is sticky, so this never runs off the end.
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    /// True if the current token has exactly this kind.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    /// Consume the current token if it has this kind.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of exactly this kind or abort.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&kind.to_string()))
        }
    }

    /// Consume an identifier token or abort.
    pub(crate) fn expect_ident(&mut self) -> Result<Ident, Diagnostic> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident {
                    name,
                    span: token.span,
                })
            }
            _ => Err(self.error_here("identifier")),
        }
    }

    /// Span of the most recently consumed token.
    pub(crate) fn prev_span(&self) -> Span {
        self.tokens[self.position.saturating_sub(1)].span
    }

    /// `expected X, got Y` at the current token.
    pub(crate) fn error_here(&self, expected: &str) -> Diagnostic {
        let found = &self.peek().kind;
        Diagnostic::syntax(
            format!("expected {}, got {}", expected, found),
            self.peek().span,
        )
    }
}
