//! Expression parsing.
//!
//! Precedence, lowest to highest: relational (`= <> < <= > >=`) < additive
//! (`+ - or`) < multiplicative (`* / div mod and`) < unary (`+ - not`) <
//! atom. Every level is left-associative, folded iteratively.

use pasc_lex::TokenKind;
use pasc_util::Diagnostic;

use crate::ast::*;
use crate::Parser;

impl Parser {
    /// Parse a full expression (relational level).
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_simple_expr()?;
        loop {
            let op = match relational_op(&self.peek().kind) {
                Some(op) => op,
                None => return Ok(left),
            };
            self.advance();
            let right = self.parse_simple_expr()?;
            left = binary(op, left, right);
        }
    }

    /// Parse the additive level: `+`, `-`, `or`.
    fn parse_simple_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                TokenKind::Or => BinOp::Or,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
    }

    /// Parse the multiplicative level: `*`, `/`, `div`, `mod`, `and`.
    fn parse_term(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Div => BinOp::IntDiv,
                TokenKind::Mod => BinOp::Mod,
                TokenKind::And => BinOp::And,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_factor()?;
            left = binary(op, left, right);
        }
    }

    /// Parse a unary application or an atom.
    fn parse_factor(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Plus => self.parse_unary(UnOp::Plus),
            TokenKind::Minus => self.parse_unary(UnOp::Neg),
            TokenKind::Not => self.parse_unary(UnOp::Not),

            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::IntLit(value, token.span))
            }
            TokenKind::Real(value) => {
                self.advance();
                Ok(Expr::RealLit(value, token.span))
            }
            TokenKind::Str(ref value) => {
                self.advance();
                Ok(Expr::StrLit(value.clone(), token.span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::BoolLit(true, token.span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::BoolLit(false, token.span))
            }

            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }

            TokenKind::Ident(_) => self.parse_ident_expr(),

            _ => Err(self.error_here("expression")),
        }
    }

    /// Parse a prefix operator application.
    fn parse_unary(&mut self, op: UnOp) -> Result<Expr, Diagnostic> {
        let start = self.advance().span;
        let operand = Box::new(self.parse_factor()?);
        let span = start.to(operand.span());
        Ok(Expr::Unary(UnaryExpr { op, operand, span }))
    }

    /// Parse an identifier atom: variable reference, function call, or
    /// array element. A following `(` means call; `[` means indexing.
    fn parse_ident_expr(&mut self) -> Result<Expr, Diagnostic> {
        let name = self.expect_ident()?;

        if self.check(&TokenKind::LParen) {
            let args = self.parse_actuals()?;
            let span = name.span.to(self.prev_span());
            return Ok(Expr::Call(CallExpr {
                callee: name,
                args,
                span,
            }));
        }

        if self.check(&TokenKind::LBracket) {
            let indices = self.parse_indices()?;
            let span = name.span.to(self.prev_span());
            return Ok(Expr::Index(IndexExpr {
                array: name,
                indices,
                span,
            }));
        }

        Ok(Expr::Var(name))
    }

    /// Parse a parenthesized, comma-separated actual argument list.
    pub(crate) fn parse_actuals(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    /// Parse a bracketed, comma-separated index list (at least one index).
    pub(crate) fn parse_indices(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        self.expect(&TokenKind::LBracket)?;
        let mut indices = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            indices.push(self.parse_expression()?);
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(indices)
    }
}

fn relational_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Eq => Some(BinOp::Eq),
        TokenKind::NotEq => Some(BinOp::Ne),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::LtEq => Some(BinOp::Le),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::GtEq => Some(BinOp::Ge),
        _ => None,
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    let span = left.span().to(right.span());
    Expr::Binary(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    })
}
