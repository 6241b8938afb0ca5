//! pasc-sem - Semantic Analyzer
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The analyzer walks the AST depth-first, populating and querying scoped
//! symbol tables, and either accepts the tree or aborts with the first
//! semantic diagnostic.
//!
//! SCOPING:
//! --------
//! - The program introduces the global scope, pre-seeded with the I/O
//!   builtins (`write`, `writeln`, `read`, `readln`).
//! - Every procedure/function body opens a child scope: formals first, then
//!   (for functions) the function's own name as its return slot, then
//!   locals. Duplicates within one scope are rejected; shadowing an outer
//!   binding is allowed.
//! - Assigning to the function's own name is the one way to set the return
//!   value. Outside the function's body, its name only calls.
//! - A `for` control variable is re-bound as a loop index for the body walk;
//!   assigning to it (or reusing it for an inner `for`) is rejected.
//!
//! TYPE RULES:
//! -----------
//! - `integer → real` promotes implicitly in mixed arithmetic and on
//!   assignment; `real → integer` never does.
//! - A one-character string literal converts to `char` on assignment and
//!   by-value argument passing only. `char`/`string` comparison is an error.
//! - `and or not` and every condition require boolean operands.
//! - `div mod` are integer-only and yield integer; `/` is numeric and
//!   yields real; `+ - *` yield integer iff both operands are integer.
//! - Relational operators take two numerics (with promotion) or two
//!   operands of the same simple non-array type, and yield boolean.
//! - Indexing needs one integer index per declared dimension. Bounds are
//!   not checked statically.
//! - Calls check arity and per-argument compatibility; `var` formals demand
//!   an l-value of exactly matching type, with no promotion.

pub mod scope;
pub mod types;

pub use scope::{Builtin, ScopeTree, Signature, Symbol, SymbolKind};
pub use types::Type;

use pasc_par::{
    AssignStmt, BinOp, BinaryExpr, CallStmt, Decl, Expr, ForStmt, FormalParam, FuncDecl, Ident,
    IndexExpr, IoStmt, PassMode, ProcDecl, Program, Stmt, TypeSpec, UnOp, UnaryExpr,
};
use pasc_util::{Diagnostic, Span};

/// Validate a parsed program.
///
/// # Example
///
/// ```
/// use pasc_lex::tokenize;
/// use pasc_par::parse;
///
/// let program = parse(tokenize("program P; var x: integer; begin x := 1 end.").unwrap()).unwrap();
/// assert!(pasc_sem::analyze(&program).is_ok());
/// ```
pub fn analyze(program: &Program) -> Result<(), Diagnostic> {
    SemanticAnalyzer::new().analyze(program)
}

/// The analyzer: a scope tree plus the stack of function bodies the walk is
/// currently inside (for return-slot assignments).
pub struct SemanticAnalyzer {
    scopes: ScopeTree,
    /// Lower-cased names of enclosing functions, innermost last.
    active_functions: Vec<String>,
}

impl SemanticAnalyzer {
    /// Create an analyzer with the builtins seeded into the global scope.
    pub fn new() -> Self {
        let mut scopes = ScopeTree::new();
        let builtins = [
            ("write", Builtin::Write),
            ("writeln", Builtin::Writeln),
            ("read", Builtin::Read),
            ("readln", Builtin::Readln),
        ];
        for (name, builtin) in builtins {
            // The global scope is empty at this point; seeding cannot fail.
            let _ = scopes.declare(Symbol {
                name: name.to_string(),
                kind: SymbolKind::Builtin(builtin),
            });
        }
        Self {
            scopes,
            active_functions: Vec::new(),
        }
    }

    /// Walk the whole program; the first violation aborts.
    pub fn analyze(&mut self, program: &Program) -> Result<(), Diagnostic> {
        self.check_decls(&program.decls)?;
        for stmt in &program.body {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    // ========================================================================
    // DECLARATIONS
    // ========================================================================

    fn check_decls(&mut self, decls: &[Decl]) -> Result<(), Diagnostic> {
        for decl in decls {
            match decl {
                Decl::Var(var) => {
                    let ty = Type::from_spec(&var.ty);
                    for name in &var.names {
                        self.declare(
                            Symbol {
                                name: name.name.clone(),
                                kind: SymbolKind::Variable(ty.clone()),
                            },
                            name.span,
                        )?;
                    }
                }
                Decl::Proc(proc) => self.check_proc(proc)?,
                Decl::Func(func) => self.check_func(func)?,
            }
        }
        Ok(())
    }

    fn check_proc(&mut self, proc: &ProcDecl) -> Result<(), Diagnostic> {
        let sig = signature_of(&proc.params, None);
        self.declare(
            Symbol {
                name: proc.name.name.clone(),
                kind: SymbolKind::Procedure(sig),
            },
            proc.name.span,
        )?;

        self.scopes.enter_scope();
        let result = self
            .declare_formals(&proc.params)
            .and_then(|_| self.check_routine_body(&proc.decls, &proc.body));
        self.scopes.exit_scope();
        result
    }

    fn check_func(&mut self, func: &FuncDecl) -> Result<(), Diagnostic> {
        let sig = signature_of(&func.params, Some(&func.ret));
        self.declare(
            Symbol {
                name: func.name.name.clone(),
                kind: SymbolKind::Function(sig.clone()),
            },
            func.name.span,
        )?;

        self.scopes.enter_scope();
        self.active_functions
            .push(func.name.name.to_ascii_lowercase());
        let result = self
            .declare_formals(&func.params)
            .and_then(|_| {
                // The return slot: the function's own name, visible inside
                // its body with the full signature so recursion checks too.
                self.declare(
                    Symbol {
                        name: func.name.name.clone(),
                        kind: SymbolKind::Function(sig),
                    },
                    func.name.span,
                )
            })
            .and_then(|_| self.check_routine_body(&func.decls, &func.body));
        self.active_functions.pop();
        self.scopes.exit_scope();
        result
    }

    fn declare_formals(&mut self, params: &[FormalParam]) -> Result<(), Diagnostic> {
        for param in params {
            self.declare(
                Symbol {
                    name: param.name.name.clone(),
                    kind: SymbolKind::Param(Type::from_spec(&param.ty), param.mode),
                },
                param.name.span,
            )?;
        }
        Ok(())
    }

    fn check_routine_body(&mut self, decls: &[Decl], body: &[Stmt]) -> Result<(), Diagnostic> {
        self.check_decls(decls)?;
        for stmt in body {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn declare(&mut self, symbol: Symbol, span: Span) -> Result<(), Diagnostic> {
        let name = symbol.name.clone();
        self.scopes.declare(symbol).map_err(|_| {
            Diagnostic::semantic(format!("Duplicate declaration '{}'", name), span)
        })
    }

    // ========================================================================
    // STATEMENTS
    // ========================================================================

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), Diagnostic> {
        match stmt {
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::If(s) => {
                self.check_condition(&s.cond)?;
                self.check_stmt(&s.then_branch)?;
                if let Some(else_branch) = &s.else_branch {
                    self.check_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::While(s) => {
                self.check_condition(&s.cond)?;
                self.check_stmt(&s.body)
            }
            Stmt::Repeat(s) => {
                for inner in &s.body {
                    self.check_stmt(inner)?;
                }
                self.check_condition(&s.cond)
            }
            Stmt::For(s) => self.check_for(s),
            Stmt::Compound(c) => {
                for inner in &c.stmts {
                    self.check_stmt(inner)?;
                }
                Ok(())
            }
            Stmt::Call(c) => self.check_call_stmt(c),
            Stmt::Write(io) => self.check_write(io),
            Stmt::Read(io) => self.check_read(io),
        }
    }

    fn check_condition(&mut self, cond: &Expr) -> Result<(), Diagnostic> {
        let ty = self.check_expr(cond)?;
        if ty != Type::Boolean {
            return Err(Diagnostic::semantic(
                format!("Condition must be boolean, got {}", ty),
                cond.span(),
            ));
        }
        Ok(())
    }

    fn check_assign(&mut self, assign: &AssignStmt) -> Result<(), Diagnostic> {
        let dst = self.check_assign_target(&assign.target)?;
        let src = self.check_expr(&assign.value)?;
        self.require_assignable(&dst, &assign.value, &src, assign.span)
    }

    /// Resolve an assignment target to its storage type, enforcing the
    /// l-value rules.
    fn check_assign_target(&mut self, target: &Expr) -> Result<Type, Diagnostic> {
        match target {
            Expr::Var(ident) => match self.resolve_kind(ident)? {
                SymbolKind::Variable(ty) | SymbolKind::Param(ty, _) => Ok(ty),
                SymbolKind::Function(sig) => {
                    let lowered = ident.name.to_ascii_lowercase();
                    match sig.ret {
                        Some(ret) if self.active_functions.contains(&lowered) => Ok(ret),
                        _ => Err(Diagnostic::semantic(
                            format!("Cannot assign to '{}'", ident.name),
                            ident.span,
                        )),
                    }
                }
                SymbolKind::LoopIndex => Err(Diagnostic::semantic(
                    format!("Assignment to loop variable '{}'", ident.name),
                    ident.span,
                )),
                SymbolKind::Procedure(_) | SymbolKind::Builtin(_) => Err(Diagnostic::semantic(
                    format!("Cannot assign to '{}'", ident.name),
                    ident.span,
                )),
            },
            Expr::Index(ix) => self.check_index(ix),
            other => Err(Diagnostic::semantic(
                "Assignment target is not a variable",
                other.span(),
            )),
        }
    }

    fn check_for(&mut self, stmt: &ForStmt) -> Result<(), Diagnostic> {
        match self.resolve_kind(&stmt.var)? {
            SymbolKind::Variable(Type::Integer) | SymbolKind::Param(Type::Integer, _) => {}
            SymbolKind::LoopIndex => {
                return Err(Diagnostic::semantic(
                    format!("Assignment to loop variable '{}'", stmt.var.name),
                    stmt.var.span,
                ))
            }
            _ => {
                return Err(Diagnostic::semantic(
                    "For loop variable must be an integer variable",
                    stmt.var.span,
                ))
            }
        }

        for bound in [&stmt.from, &stmt.limit] {
            let ty = self.check_expr(bound)?;
            if ty != Type::Integer {
                return Err(Diagnostic::semantic(
                    format!("Type mismatch: for bound must be integer, got {}", ty),
                    bound.span(),
                ));
            }
        }

        // Re-bind the control variable as a loop index for the body walk.
        self.scopes.enter_scope();
        let _ = self.scopes.declare(Symbol {
            name: stmt.var.name.clone(),
            kind: SymbolKind::LoopIndex,
        });
        let result = self.check_stmt(&stmt.body);
        self.scopes.exit_scope();
        result
    }

    fn check_call_stmt(&mut self, call: &CallStmt) -> Result<(), Diagnostic> {
        match self.resolve_kind(&call.callee)? {
            SymbolKind::Procedure(sig) | SymbolKind::Function(sig) => {
                self.check_args(&call.callee, &sig, &call.args)
            }
            _ => Err(Diagnostic::semantic(
                format!("'{}' is not callable", call.callee.name),
                call.callee.span,
            )),
        }
    }

    fn check_write(&mut self, io: &IoStmt) -> Result<(), Diagnostic> {
        for arg in &io.args {
            let ty = self.check_expr(arg)?;
            if !ty.is_simple() {
                return Err(Diagnostic::semantic(
                    format!("Type mismatch: write argument must have primitive type, got {}", ty),
                    arg.span(),
                ));
            }
        }
        Ok(())
    }

    fn check_read(&mut self, io: &IoStmt) -> Result<(), Diagnostic> {
        for arg in &io.args {
            if !arg.is_lvalue() {
                return Err(Diagnostic::semantic(
                    "read argument must be a variable",
                    arg.span(),
                ));
            }
            let ty = self.check_assign_target(arg)?;
            if !ty.is_simple() {
                return Err(Diagnostic::semantic(
                    format!("Type mismatch: read argument must have primitive type, got {}", ty),
                    arg.span(),
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    fn check_expr(&mut self, expr: &Expr) -> Result<Type, Diagnostic> {
        match expr {
            Expr::IntLit(..) => Ok(Type::Integer),
            Expr::RealLit(..) => Ok(Type::Real),
            Expr::StrLit(..) => Ok(Type::String),
            Expr::BoolLit(..) => Ok(Type::Boolean),
            Expr::Var(ident) => match self.resolve_kind(ident)? {
                SymbolKind::Variable(ty) | SymbolKind::Param(ty, _) => Ok(ty),
                SymbolKind::LoopIndex => Ok(Type::Integer),
                SymbolKind::Function(sig) => {
                    // Inside its own body, the function name denotes the
                    // result variable; elsewhere it only calls.
                    let lowered = ident.name.to_ascii_lowercase();
                    match sig.ret {
                        Some(ret) if self.active_functions.contains(&lowered) => Ok(ret),
                        _ => Err(Diagnostic::semantic(
                            format!("'{}' is not a variable", ident.name),
                            ident.span,
                        )),
                    }
                }
                _ => Err(Diagnostic::semantic(
                    format!("'{}' is not a variable", ident.name),
                    ident.span,
                )),
            },
            Expr::Index(ix) => self.check_index(ix),
            Expr::Call(call) => match self.resolve_kind(&call.callee)? {
                SymbolKind::Function(sig) => {
                    self.check_args(&call.callee, &sig, &call.args)?;
                    match sig.ret {
                        Some(ret) => Ok(ret),
                        None => Err(Diagnostic::semantic(
                            format!("'{}' is not a function", call.callee.name),
                            call.callee.span,
                        )),
                    }
                }
                _ => Err(Diagnostic::semantic(
                    format!("'{}' is not a function", call.callee.name),
                    call.callee.span,
                )),
            },
            Expr::Unary(u) => self.check_unary(u),
            Expr::Binary(b) => self.check_binary(b),
        }
    }

    fn check_index(&mut self, ix: &IndexExpr) -> Result<Type, Diagnostic> {
        let (elem, dims) = match self.resolve_kind(&ix.array)? {
            SymbolKind::Variable(Type::Array { elem, dims })
            | SymbolKind::Param(Type::Array { elem, dims }, _) => (elem, dims),
            _ => {
                return Err(Diagnostic::semantic(
                    format!("'{}' is not an array", ix.array.name),
                    ix.array.span,
                ))
            }
        };

        if ix.indices.len() != dims.len() {
            return Err(Diagnostic::semantic(
                format!(
                    "Wrong number of indices for '{}': expected {}, got {}",
                    ix.array.name,
                    dims.len(),
                    ix.indices.len()
                ),
                ix.span,
            ));
        }

        for index in &ix.indices {
            let ty = self.check_expr(index)?;
            if ty != Type::Integer {
                return Err(Diagnostic::semantic(
                    format!("Type mismatch: array index must be integer, got {}", ty),
                    index.span(),
                ));
            }
        }

        Ok(*elem)
    }

    fn check_unary(&mut self, u: &UnaryExpr) -> Result<Type, Diagnostic> {
        let ty = self.check_expr(&u.operand)?;
        match u.op {
            UnOp::Plus | UnOp::Neg => {
                if ty.is_numeric() {
                    Ok(ty)
                } else {
                    Err(Diagnostic::semantic(
                        format!(
                            "Type mismatch: unary '{}' requires a numeric operand, got {}",
                            if u.op == UnOp::Neg { "-" } else { "+" },
                            ty
                        ),
                        u.span,
                    ))
                }
            }
            UnOp::Not => {
                if ty == Type::Boolean {
                    Ok(ty)
                } else {
                    Err(Diagnostic::semantic(
                        format!("Type mismatch: 'not' requires a boolean operand, got {}", ty),
                        u.span,
                    ))
                }
            }
        }
    }

    fn check_binary(&mut self, b: &BinaryExpr) -> Result<Type, Diagnostic> {
        let lhs = self.check_expr(&b.left)?;
        let rhs = self.check_expr(&b.right)?;

        let mismatch = || {
            Diagnostic::semantic(
                format!(
                    "Type mismatch: invalid operands to '{}' ({} and {})",
                    op_lexeme(b.op),
                    lhs,
                    rhs
                ),
                b.span,
            )
        };

        match b.op {
            BinOp::And | BinOp::Or => {
                if lhs == Type::Boolean && rhs == Type::Boolean {
                    Ok(Type::Boolean)
                } else {
                    Err(mismatch())
                }
            }
            BinOp::IntDiv | BinOp::Mod => {
                if lhs == Type::Integer && rhs == Type::Integer {
                    Ok(Type::Integer)
                } else {
                    Err(mismatch())
                }
            }
            BinOp::Div => {
                if lhs.is_numeric() && rhs.is_numeric() {
                    Ok(Type::Real)
                } else {
                    Err(mismatch())
                }
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul => {
                if lhs.is_numeric() && rhs.is_numeric() {
                    Ok(types::arithmetic_result(&lhs, &rhs))
                } else {
                    Err(mismatch())
                }
            }
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let numeric_pair = lhs.is_numeric() && rhs.is_numeric();
                let same_simple = lhs == rhs && lhs.is_simple();
                if numeric_pair || same_simple {
                    Ok(Type::Boolean)
                } else {
                    Err(mismatch())
                }
            }
        }
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn check_args(
        &mut self,
        callee: &Ident,
        sig: &Signature,
        args: &[Expr],
    ) -> Result<(), Diagnostic> {
        if args.len() != sig.formals.len() {
            return Err(Diagnostic::semantic(
                format!(
                    "Wrong number of arguments to '{}': expected {}, got {}",
                    callee.name,
                    sig.formals.len(),
                    args.len()
                ),
                callee.span,
            ));
        }

        for (position, (arg, (formal_ty, mode))) in args.iter().zip(&sig.formals).enumerate() {
            let (arg_ty, compatible) = match mode {
                // By-reference: l-value of exactly matching type, no
                // promotion, no char-literal conversion. The callee can
                // write through it, so the assignment-target rules apply:
                // a loop index is rejected here the same way direct
                // assignment to it is.
                PassMode::ByRef => {
                    if !arg.is_lvalue() {
                        return Err(Diagnostic::semantic(
                            format!(
                                "Argument {} to '{}' must be a variable",
                                position + 1,
                                callee.name
                            ),
                            arg.span(),
                        ));
                    }
                    let arg_ty = self.check_assign_target(arg)?;
                    let compatible = arg_ty == *formal_ty;
                    (arg_ty, compatible)
                }
                PassMode::ByValue => {
                    let arg_ty = self.check_expr(arg)?;
                    let compatible =
                        types::assignable(formal_ty, &arg_ty) || is_char_literal(formal_ty, arg);
                    (arg_ty, compatible)
                }
            };
            if !compatible {
                return Err(Diagnostic::semantic(
                    format!(
                        "Type mismatch: argument {} to '{}' expects {}, got {}",
                        position + 1,
                        callee.name,
                        formal_ty,
                        arg_ty
                    ),
                    arg.span(),
                ));
            }
        }
        Ok(())
    }

    fn require_assignable(
        &self,
        dst: &Type,
        src_expr: &Expr,
        src: &Type,
        span: Span,
    ) -> Result<(), Diagnostic> {
        if types::assignable(dst, src) || is_char_literal(dst, src_expr) {
            return Ok(());
        }
        Err(Diagnostic::semantic(
            format!("Type mismatch: cannot assign {} to {}", src, dst),
            span,
        ))
    }

    fn resolve_kind(&self, ident: &Ident) -> Result<SymbolKind, Diagnostic> {
        self.scopes
            .resolve(&ident.name)
            .map(|symbol| symbol.kind.clone())
            .ok_or_else(|| {
                Diagnostic::semantic(
                    format!("Undefined identifier '{}'", ident.name),
                    ident.span,
                )
            })
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// True when a one-character string literal targets a `char` destination.
fn is_char_literal(dst: &Type, expr: &Expr) -> bool {
    *dst == Type::Char && matches!(expr, Expr::StrLit(s, _) if s.chars().count() == 1)
}

fn signature_of(params: &[FormalParam], ret: Option<&TypeSpec>) -> Signature {
    Signature {
        formals: params
            .iter()
            .map(|p| (Type::from_spec(&p.ty), p.mode))
            .collect(),
        ret: ret.map(Type::from_spec),
    }
}

fn op_lexeme(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::IntDiv => "div",
        BinOp::Mod => "mod",
        BinOp::And => "and",
        BinOp::Or => "or",
        BinOp::Eq => "=",
        BinOp::Ne => "<>",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
    }
}
