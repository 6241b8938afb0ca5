//! pasc-gen - Code Generator
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Lowers a semantically validated AST to three-address code. The generator
//! is a single post-order walk: routines first (nested routines emitted
//! before their parent, each routine contiguous and ending in `return`),
//! then `main:` with the program body, then `halt`.
//!
//! FRESH NAMES:
//! ------------
//! Two monotonically increasing counters mint temporaries (`t0, t1, …`) and
//! labels (`L0, L1, …`). They are owned by the generator instance, never
//! reset within a run, and restart at 0 on each invocation, so identical
//! input produces byte-identical output.
//!
//! LOWERING CONVENTIONS:
//! ---------------------
//! - Boolean literals become `1`/`0`; `not b` becomes `t = b == 0`; unary
//!   minus becomes `t = 0 - x`.
//! - `and`/`or` lower with short-circuit control flow in every context: the
//!   left operand is copied into the result temporary and the right operand
//!   is only evaluated (and copied over it) when it can still change the
//!   outcome.
//! - `for` bounds are evaluated once before the loop; a bare-variable bound
//!   is copied into a fresh temporary so later mutation cannot re-enter the
//!   comparison.
//! - Multi-dimensional array access chains single-index loads
//!   (`t0 = a[i]; t1 = t0[j]`); stores go through the last loaded level.
//! - `var`-formal actuals pass the variable's name; an array-element actual
//!   is materialized into a temporary first.

pub mod tac;

pub use tac::{render, Instr, Operand, TacOp};

use rustc_hash::FxHashMap;

use pasc_par::{
    AssignStmt, BinOp, BinaryExpr, CallStmt, Decl, Expr, ForDirection, ForStmt, Ident, IfStmt,
    IndexExpr, IoStmt, PassMode, Program, RepeatStmt, Stmt, UnOp, UnaryExpr, WhileStmt,
};

/// Lower a validated program to TAC.
///
/// The input must have passed semantic analysis; generation itself cannot
/// fail.
///
/// # Example
///
/// ```
/// use pasc_lex::tokenize;
/// use pasc_par::parse;
///
/// let program = parse(tokenize("program P; var x: integer; begin x := 1 end.").unwrap()).unwrap();
/// pasc_sem::analyze(&program).unwrap();
/// let tac = pasc_gen::render(&pasc_gen::generate(&program));
/// assert_eq!(tac, "main:\nx = 1\nhalt\n");
/// ```
pub fn generate(program: &Program) -> Vec<Instr> {
    Generator::new().generate(program)
}

/// The generator: an append-only instruction stream plus the fresh-name
/// counters.
pub struct Generator {
    code: Vec<Instr>,
    next_temp: u32,
    next_label: u32,
    /// Pass modes per routine (lower-cased name), for `var`-formal actuals.
    /// Registered in declaration order, so every call site emitted later
    /// sees its callee's modes.
    routines: FxHashMap<String, Vec<PassMode>>,
}

impl Generator {
    pub fn new() -> Self {
        Self {
            code: Vec::new(),
            next_temp: 0,
            next_label: 0,
            routines: FxHashMap::default(),
        }
    }

    /// Run the whole lowering and return the instruction stream.
    pub fn generate(mut self, program: &Program) -> Vec<Instr> {
        self.gen_routines(&program.decls);
        self.emit(Instr::Label("main".to_string()));
        for stmt in &program.body {
            self.gen_stmt(stmt);
        }
        self.emit(Instr::Halt);
        self.code
    }

    // ========================================================================
    // ROUTINES
    // ========================================================================

    /// Emit the TAC routines for all procedure/function declarations, in
    /// declaration order. Variable declarations emit nothing: storage is
    /// implicit in TAC naming.
    fn gen_routines(&mut self, decls: &[Decl]) {
        for decl in decls {
            match decl {
                Decl::Var(_) => {}
                Decl::Proc(proc) => {
                    self.register_routine(&proc.name, &proc.params.iter().map(|p| p.mode).collect::<Vec<_>>());
                    self.gen_routine(&proc.name.name, &proc.decls, &proc.body);
                }
                Decl::Func(func) => {
                    self.register_routine(&func.name, &func.params.iter().map(|p| p.mode).collect::<Vec<_>>());
                    self.gen_routine(&func.name.name, &func.decls, &func.body);
                }
            }
        }
    }

    fn register_routine(&mut self, name: &Ident, modes: &[PassMode]) {
        self.routines
            .insert(name.name.to_ascii_lowercase(), modes.to_vec());
    }

    fn gen_routine(&mut self, name: &str, decls: &[Decl], body: &[Stmt]) {
        // Nested routines come first so every routine stays contiguous.
        self.gen_routines(decls);

        self.emit(Instr::Label(name.to_string()));
        for stmt in body {
            self.gen_stmt(stmt);
        }
        self.emit(Instr::Return);
    }

    // ========================================================================
    // STATEMENTS
    // ========================================================================

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => self.gen_assign(assign),
            Stmt::If(s) => self.gen_if(s),
            Stmt::While(s) => self.gen_while(s),
            Stmt::For(s) => self.gen_for(s),
            Stmt::Repeat(s) => self.gen_repeat(s),
            Stmt::Compound(c) => {
                for inner in &c.stmts {
                    self.gen_stmt(inner);
                }
            }
            Stmt::Call(call) => self.gen_call_stmt(call),
            Stmt::Write(io) => self.gen_write(io),
            Stmt::Read(io) => self.gen_read(io),
        }
    }

    fn gen_assign(&mut self, assign: &AssignStmt) {
        let src = self.gen_expr(&assign.value);
        match &assign.target {
            Expr::Var(ident) => self.emit(Instr::Copy {
                dst: ident.name.clone(),
                src,
            }),
            Expr::Index(ix) => self.gen_index_store(ix, src),
            // Other expression forms are rejected by semantic analysis.
            _ => {}
        }
    }

    /// `if c then S1 [else S2]`: the else label is allocated before the end
    /// label, so a plain if-else uses `L0` for else and `L1` for the join.
    fn gen_if(&mut self, stmt: &IfStmt) {
        let cond = self.gen_expr(&stmt.cond);
        match &stmt.else_branch {
            Some(else_branch) => {
                let l_else = self.fresh_label();
                let l_end = self.fresh_label();
                self.emit(Instr::IfFalse {
                    cond,
                    target: l_else.clone(),
                });
                self.gen_stmt(&stmt.then_branch);
                self.emit(Instr::Goto(l_end.clone()));
                self.emit(Instr::Label(l_else));
                self.gen_stmt(else_branch);
                self.emit(Instr::Label(l_end));
            }
            None => {
                let l_end = self.fresh_label();
                self.emit(Instr::IfFalse {
                    cond,
                    target: l_end.clone(),
                });
                self.gen_stmt(&stmt.then_branch);
                self.emit(Instr::Label(l_end));
            }
        }
    }

    /// `while c do S`: top label, test, exit on false, body, back edge.
    fn gen_while(&mut self, stmt: &WhileStmt) {
        let l_top = self.fresh_label();
        let l_end = self.fresh_label();
        self.emit(Instr::Label(l_top.clone()));
        let cond = self.gen_expr(&stmt.cond);
        self.emit(Instr::IfFalse {
            cond,
            target: l_end.clone(),
        });
        self.gen_stmt(&stmt.body);
        self.emit(Instr::Goto(l_top));
        self.emit(Instr::Label(l_end));
    }

    /// `for i := a to b do S`: initialize, test against the once-evaluated
    /// bound, step by one, loop.
    fn gen_for(&mut self, stmt: &ForStmt) {
        let from = self.gen_expr(&stmt.from);
        self.emit(Instr::Copy {
            dst: stmt.var.name.clone(),
            src: from,
        });

        // The bound is evaluated exactly once. Literals (and temporaries
        // from compound bounds) are already stable; a bare variable gets
        // copied so body mutation cannot feed back into the test.
        let limit = self.gen_expr(&stmt.limit);
        let limit = if matches!(stmt.limit, Expr::Var(_)) {
            let t = self.fresh_temp();
            self.emit(Instr::Copy {
                dst: t.clone(),
                src: limit,
            });
            Operand::Name(t)
        } else {
            limit
        };

        let (test_op, step_op) = match stmt.direction {
            ForDirection::To => (TacOp::Le, TacOp::Add),
            ForDirection::Downto => (TacOp::Ge, TacOp::Sub),
        };

        let l_top = self.fresh_label();
        let l_end = self.fresh_label();
        self.emit(Instr::Label(l_top.clone()));
        let t = self.fresh_temp();
        self.emit(Instr::Binary {
            dst: t.clone(),
            op: test_op,
            lhs: Operand::Name(stmt.var.name.clone()),
            rhs: limit,
        });
        self.emit(Instr::IfFalse {
            cond: Operand::Name(t),
            target: l_end.clone(),
        });
        self.gen_stmt(&stmt.body);
        self.emit(Instr::Binary {
            dst: stmt.var.name.clone(),
            op: step_op,
            lhs: Operand::Name(stmt.var.name.clone()),
            rhs: Operand::Int(1),
        });
        self.emit(Instr::Goto(l_top));
        self.emit(Instr::Label(l_end));
    }

    /// `repeat S until c`: body, test, loop back while false.
    fn gen_repeat(&mut self, stmt: &RepeatStmt) {
        let l_top = self.fresh_label();
        self.emit(Instr::Label(l_top.clone()));
        for inner in &stmt.body {
            self.gen_stmt(inner);
        }
        let cond = self.gen_expr(&stmt.cond);
        self.emit(Instr::IfFalse {
            cond,
            target: l_top,
        });
    }

    fn gen_call_stmt(&mut self, call: &CallStmt) {
        let args = self.gen_call_args(&call.callee, &call.args);
        self.emit(Instr::Call {
            dst: None,
            callee: call.callee.name.clone(),
            args,
        });
    }

    fn gen_write(&mut self, io: &IoStmt) {
        for arg in &io.args {
            let operand = self.gen_expr(arg);
            self.emit(Instr::Write(operand));
        }
        if io.newline {
            self.emit(Instr::Writeln);
        }
    }

    fn gen_read(&mut self, io: &IoStmt) {
        for arg in &io.args {
            match arg {
                Expr::Var(ident) => self.emit(Instr::Read(ident.name.clone())),
                Expr::Index(ix) => {
                    // The line grammar reads into a name; go through a
                    // temporary and store it into the element.
                    let t = self.fresh_temp();
                    self.emit(Instr::Read(t.clone()));
                    self.gen_index_store(ix, Operand::Name(t));
                }
                // Non-l-values are rejected by semantic analysis.
                _ => {}
            }
        }
        if io.newline {
            self.emit(Instr::Readln);
        }
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    /// Post-order lowering; returns the operand holding the value.
    /// Literals and variables are used in place and cost no temporary.
    fn gen_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::IntLit(value, _) => Operand::Int(*value),
            Expr::RealLit(value, _) => Operand::Real(*value),
            Expr::StrLit(value, _) => Operand::Str(value.clone()),
            Expr::BoolLit(value, _) => Operand::Int(i64::from(*value)),
            Expr::Var(ident) => Operand::Name(ident.name.clone()),
            Expr::Index(ix) => self.gen_index_load(ix),
            Expr::Call(call) => {
                let args = self.gen_call_args(&call.callee, &call.args);
                let t = self.fresh_temp();
                self.emit(Instr::Call {
                    dst: Some(t.clone()),
                    callee: call.callee.name.clone(),
                    args,
                });
                Operand::Name(t)
            }
            Expr::Unary(u) => self.gen_unary(u),
            Expr::Binary(b) => self.gen_binary(b),
        }
    }

    fn gen_unary(&mut self, u: &UnaryExpr) -> Operand {
        match u.op {
            // Unary plus is the identity.
            UnOp::Plus => self.gen_expr(&u.operand),
            UnOp::Neg => {
                let operand = self.gen_expr(&u.operand);
                let t = self.fresh_temp();
                self.emit(Instr::Binary {
                    dst: t.clone(),
                    op: TacOp::Sub,
                    lhs: Operand::Int(0),
                    rhs: operand,
                });
                Operand::Name(t)
            }
            UnOp::Not => {
                let operand = self.gen_expr(&u.operand);
                let t = self.fresh_temp();
                self.emit(Instr::Binary {
                    dst: t.clone(),
                    op: TacOp::Eq,
                    lhs: operand,
                    rhs: Operand::Int(0),
                });
                Operand::Name(t)
            }
        }
    }

    fn gen_binary(&mut self, b: &BinaryExpr) -> Operand {
        match b.op {
            BinOp::And => self.gen_short_circuit(b, false),
            BinOp::Or => self.gen_short_circuit(b, true),
            _ => {
                let lhs = self.gen_expr(&b.left);
                let rhs = self.gen_expr(&b.right);
                let t = self.fresh_temp();
                self.emit(Instr::Binary {
                    dst: t.clone(),
                    op: tac_op(b.op),
                    lhs,
                    rhs,
                });
                Operand::Name(t)
            }
        }
    }

    /// Short-circuit `and`/`or`: copy the left value into the result
    /// temporary, skip the right operand when it cannot change the outcome.
    ///
    /// `skip_on_true` is true for `or` (left true decides), false for `and`
    /// (left false decides).
    fn gen_short_circuit(&mut self, b: &BinaryExpr, skip_on_true: bool) -> Operand {
        let lhs = self.gen_expr(&b.left);
        let t = self.fresh_temp();
        self.emit(Instr::Copy {
            dst: t.clone(),
            src: lhs,
        });

        let l_skip = self.fresh_label();
        let cond = Operand::Name(t.clone());
        if skip_on_true {
            self.emit(Instr::IfTrue {
                cond,
                target: l_skip.clone(),
            });
        } else {
            self.emit(Instr::IfFalse {
                cond,
                target: l_skip.clone(),
            });
        }

        let rhs = self.gen_expr(&b.right);
        self.emit(Instr::Copy {
            dst: t.clone(),
            src: rhs,
        });
        self.emit(Instr::Label(l_skip));
        Operand::Name(t)
    }

    /// Chain one `IndexLoad` per dimension; the final temporary holds the
    /// element value.
    fn gen_index_load(&mut self, ix: &IndexExpr) -> Operand {
        let mut current = ix.array.name.clone();
        for index in &ix.indices {
            let idx = self.gen_expr(index);
            let t = self.fresh_temp();
            self.emit(Instr::IndexLoad {
                dst: t.clone(),
                array: current,
                index: idx,
            });
            current = t;
        }
        Operand::Name(current)
    }

    /// Store through the last dimension, loading the way down for
    /// multi-dimensional targets.
    fn gen_index_store(&mut self, ix: &IndexExpr, src: Operand) {
        let mut current = ix.array.name.clone();
        if let Some((last, front)) = ix.indices.split_last() {
            for index in front {
                let idx = self.gen_expr(index);
                let t = self.fresh_temp();
                self.emit(Instr::IndexLoad {
                    dst: t.clone(),
                    array: current,
                    index: idx,
                });
                current = t;
            }
            let idx = self.gen_expr(last);
            self.emit(Instr::IndexStore {
                array: current,
                index: idx,
                src,
            });
        }
    }

    /// Evaluate actuals left to right. A `var`-formal actual that is a bare
    /// variable passes its name directly; an array-element actual is
    /// materialized into a temporary first.
    fn gen_call_args(&mut self, callee: &Ident, args: &[Expr]) -> Vec<Operand> {
        let modes = self
            .routines
            .get(&callee.name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default();

        args.iter()
            .enumerate()
            .map(|(i, arg)| {
                let by_ref = modes.get(i).copied() == Some(PassMode::ByRef);
                match (by_ref, arg) {
                    (true, Expr::Var(ident)) => Operand::Name(ident.name.clone()),
                    _ => self.gen_expr(arg),
                }
            })
            .collect()
    }

    // ========================================================================
    // FRESH NAMES
    // ========================================================================

    fn fresh_temp(&mut self) -> String {
        let name = format!("t{}", self.next_temp);
        self.next_temp += 1;
        name
    }

    fn fresh_label(&mut self) -> String {
        let name = format!("L{}", self.next_label);
        self.next_label += 1;
        name
    }

    fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

fn tac_op(op: BinOp) -> TacOp {
    match op {
        BinOp::Add => TacOp::Add,
        BinOp::Sub => TacOp::Sub,
        BinOp::Mul => TacOp::Mul,
        BinOp::Div => TacOp::Div,
        BinOp::IntDiv => TacOp::IntDiv,
        BinOp::Mod => TacOp::Mod,
        BinOp::Eq => TacOp::Eq,
        BinOp::Ne => TacOp::Ne,
        BinOp::Lt => TacOp::Lt,
        BinOp::Le => TacOp::Le,
        BinOp::Gt => TacOp::Gt,
        BinOp::Ge => TacOp::Ge,
        // `and`/`or` lower via short-circuit control flow.
        BinOp::And | BinOp::Or => unreachable!("logical operators have no straight-line form"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasc_lex::tokenize;
    use pasc_par::parse;

    /// Full front end plus lowering; returns the TAC lines.
    fn lower(source: &str) -> Vec<String> {
        let program = parse(tokenize(source).expect("lexing should succeed"))
            .expect("parsing should succeed");
        pasc_sem::analyze(&program).expect("analysis should succeed");
        generate(&program).iter().map(|i| i.to_string()).collect()
    }

    // ========================================================================
    // SCENARIOS
    // ========================================================================

    #[test]
    fn test_arithmetic_program() {
        let tac = lower("program P; var x,y,z:integer; begin x:=10; y:=20; z:=x+y end.");
        assert_eq!(
            tac,
            vec!["main:", "x = 10", "y = 20", "t0 = x + y", "z = t0", "halt"]
        );
    }

    #[test]
    fn test_if_else() {
        let tac = lower(
            "program P; var i:integer; begin i:=15; \
             if i>10 then writeln('big') else writeln('small') end.",
        );
        assert_eq!(
            tac,
            vec![
                "main:",
                "i = 15",
                "t0 = i > 10",
                "if_false t0 goto L0",
                "write 'big'",
                "writeln",
                "goto L1",
                "L0:",
                "write 'small'",
                "writeln",
                "L1:",
                "halt",
            ]
        );
    }

    #[test]
    fn test_while_loop() {
        let tac = lower(
            "program P; var s,i:integer; begin s:=0; i:=1; \
             while i<=10 do begin s:=s+i; i:=i+1 end end.",
        );
        assert_eq!(
            tac,
            vec![
                "main:",
                "s = 0",
                "i = 1",
                "L0:",
                "t0 = i <= 10",
                "if_false t0 goto L1",
                "t1 = s + i",
                "s = t1",
                "t2 = i + 1",
                "i = t2",
                "goto L0",
                "L1:",
                "halt",
            ]
        );
        // Exactly one backward goto to the top, one if_false to the exit.
        assert_eq!(tac.iter().filter(|l| *l == "goto L0").count(), 1);
        assert_eq!(
            tac.iter().filter(|l| l.starts_with("if_false")).count(),
            1
        );
    }

    #[test]
    fn test_for_loop() {
        let tac = lower("program P; var i,f:integer; begin f:=1; for i:=1 to 5 do f:=f*i end.");
        assert_eq!(
            tac,
            vec![
                "main:",
                "f = 1",
                "i = 1",
                "L0:",
                "t0 = i <= 5",
                "if_false t0 goto L1",
                "t1 = f * i",
                "f = t1",
                "i = i + 1",
                "goto L0",
                "L1:",
                "halt",
            ]
        );
    }

    #[test]
    fn test_function_and_call() {
        let tac = lower(
            "program P; function Add(x,y:integer):integer; begin Add:=x+y end; \
             var r:integer; begin r:=Add(2,3) end.",
        );
        assert_eq!(
            tac,
            vec![
                "Add:",
                "t0 = x + y",
                "Add = t0",
                "return",
                "main:",
                "t1 = call Add, 2, 3",
                "r = t1",
                "halt",
            ]
        );
        // The routine precedes main and main appears exactly once.
        assert_eq!(tac.iter().filter(|l| *l == "main:").count(), 1);
        assert!(tac.iter().position(|l| l == "Add:") < tac.iter().position(|l| l == "main:"));
    }

    // ========================================================================
    // STATEMENT LOWERING
    // ========================================================================

    #[test]
    fn test_downto_steps_backward() {
        let tac = lower("program P; var i,s:integer; begin for i:=5 downto 1 do s:=s+i end.");
        assert!(tac.contains(&"t0 = i >= 1".to_string()));
        assert!(tac.contains(&"i = i - 1".to_string()));
    }

    #[test]
    fn test_for_bound_variable_copied_once() {
        let tac = lower(
            "program P; var i,n,s:integer; begin n:=3; for i:=1 to n do s:=s+1 end.",
        );
        assert_eq!(
            tac,
            vec![
                "main:",
                "n = 3",
                "i = 1",
                "t0 = n",
                "L0:",
                "t1 = i <= t0",
                "if_false t1 goto L1",
                "t2 = s + 1",
                "s = t2",
                "i = i + 1",
                "goto L0",
                "L1:",
                "halt",
            ]
        );
    }

    #[test]
    fn test_repeat_until() {
        let tac = lower(
            "program P; var i:integer; begin i:=0; repeat i:=i+1 until i>3 end.",
        );
        assert_eq!(
            tac,
            vec![
                "main:",
                "i = 0",
                "L0:",
                "t0 = i + 1",
                "i = t0",
                "t1 = i > 3",
                "if_false t1 goto L0",
                "halt",
            ]
        );
    }

    #[test]
    fn test_if_without_else_uses_one_label() {
        let tac = lower("program P; var x:integer; begin if x>0 then x:=0 end.");
        assert_eq!(
            tac,
            vec![
                "main:",
                "t0 = x > 0",
                "if_false t0 goto L0",
                "x = 0",
                "L0:",
                "halt",
            ]
        );
    }

    #[test]
    fn test_procedure_call_and_var_formal() {
        let tac = lower(
            "program P; var i:integer; a:array[1..5] of integer; \
             procedure Bump(var n:integer); begin n:=n+1 end; \
             begin Bump(i); Bump(a[2]) end.",
        );
        assert_eq!(
            tac,
            vec![
                "Bump:",
                "t0 = n + 1",
                "n = t0",
                "return",
                "main:",
                "call Bump, i",
                "t1 = a[2]",
                "call Bump, t1",
                "halt",
            ]
        );
    }

    #[test]
    fn test_read_and_write_forms() {
        let tac = lower(
            "program P; var x:integer; a:array[1..5] of integer; \
             begin read(x); readln(x); write(x, ' '); writeln(x); read(a[1]) end.",
        );
        assert_eq!(
            tac,
            vec![
                "main:",
                "read x",
                "read x",
                "readln",
                "write x",
                "write ' '",
                "write x",
                "writeln",
                "read t0",
                "a[1] = t0",
                "halt",
            ]
        );
    }

    #[test]
    fn test_bare_writeln() {
        let tac = lower("program P; begin writeln end.");
        assert_eq!(tac, vec!["main:", "writeln", "halt"]);
    }

    // ========================================================================
    // EXPRESSION LOWERING
    // ========================================================================

    #[test]
    fn test_unary_lowering() {
        let tac = lower("program P; var x:integer; b:boolean; begin x := -x; b := not b end.");
        assert_eq!(
            tac,
            vec![
                "main:",
                "t0 = 0 - x",
                "x = t0",
                "t1 = b == 0",
                "b = t1",
                "halt",
            ]
        );
    }

    #[test]
    fn test_boolean_literals_lower_to_bits() {
        let tac = lower("program P; var b:boolean; begin b := true; b := false end.");
        assert_eq!(tac, vec!["main:", "b = 1", "b = 0", "halt"]);
    }

    #[test]
    fn test_short_circuit_and() {
        let tac = lower(
            "program P; var a,b,c:boolean; begin c := a and b end.",
        );
        assert_eq!(
            tac,
            vec![
                "main:",
                "t0 = a",
                "if_false t0 goto L0",
                "t0 = b",
                "L0:",
                "c = t0",
                "halt",
            ]
        );
    }

    #[test]
    fn test_short_circuit_or_in_condition() {
        let tac = lower(
            "program P; var a,b:boolean; x:integer; \
             begin if a or b then x:=1 end.",
        );
        assert_eq!(
            tac,
            vec![
                "main:",
                "t0 = a",
                "if_true t0 goto L0",
                "t0 = b",
                "L0:",
                "if_false t0 goto L1",
                "x = 1",
                "L1:",
                "halt",
            ]
        );
    }

    #[test]
    fn test_div_mod_lexemes() {
        let tac = lower("program P; var x:integer; begin x := x div 2; x := x mod 2 end.");
        assert!(tac.contains(&"t0 = x div 2".to_string()));
        assert!(tac.contains(&"t1 = x mod 2".to_string()));
    }

    #[test]
    fn test_comparison_operators_map() {
        let tac = lower(
            "program P; var b:boolean; x:integer; \
             begin b := x = 1; b := x <> 1 end.",
        );
        assert!(tac.contains(&"t0 = x == 1".to_string()));
        assert!(tac.contains(&"t1 = x != 1".to_string()));
    }

    #[test]
    fn test_multi_dimensional_access() {
        let tac = lower(
            "program P; var m:array[1..2, 1..2] of integer; x:integer; \
             begin x := m[1, 2]; m[2, 1] := x end.",
        );
        assert_eq!(
            tac,
            vec![
                "main:",
                "t0 = m[1]",
                "t1 = t0[2]",
                "x = t1",
                "t2 = m[2]",
                "t2[1] = x",
                "halt",
            ]
        );
    }

    #[test]
    fn test_nested_routines_emitted_contiguously() {
        let tac = lower(
            "program P; procedure Outer; procedure Inner; begin writeln('in') end; \
             begin Inner end; begin Outer end.",
        );
        assert_eq!(
            tac,
            vec![
                "Inner:",
                "write 'in'",
                "writeln",
                "return",
                "Outer:",
                "call Inner",
                "return",
                "main:",
                "call Outer",
                "halt",
            ]
        );
    }

    // ========================================================================
    // PROPERTIES
    // ========================================================================

    #[test]
    fn test_determinism() {
        let source = "program P; var i,s:integer; begin for i:=1 to 9 do s:=s+i*i end.";
        assert_eq!(lower(source), lower(source));
    }

    #[test]
    fn test_labels_defined_exactly_once() {
        let tac = lower(
            "program P; var i,j:integer; b:boolean; begin \
             for i:=1 to 3 do for j:=1 to 3 do \
             if (i < j) or (i > j) then writeln(i) else writeln(j); \
             b := true and false \
             end.",
        );
        use std::collections::HashMap;
        let mut defined: HashMap<&str, usize> = HashMap::new();
        for line in &tac {
            if let Some(label) = line.strip_suffix(':') {
                *defined.entry(label).or_default() += 1;
            }
        }
        for line in &tac {
            let target = line
                .split_once("goto ")
                .map(|(_, t)| t);
            if let Some(target) = target {
                assert_eq!(defined.get(target), Some(&1), "label {} in {:?}", target, tac);
            }
        }
        assert_eq!(defined.get("main"), Some(&1));
        // halt is the last line of the main emission.
        assert_eq!(tac.last().map(String::as_str), Some("halt"));
        assert_eq!(tac.iter().filter(|l| *l == "halt").count(), 1);
    }

    #[test]
    fn test_counters_span_whole_compilation() {
        // Temporaries minted in a routine are not reused in main.
        let tac = lower(
            "program P; function Sq(x:integer):integer; begin Sq := x*x end; \
             var r:integer; begin r := Sq(2) + Sq(3) end.",
        );
        assert_eq!(
            tac,
            vec![
                "Sq:",
                "t0 = x * x",
                "Sq = t0",
                "return",
                "main:",
                "t1 = call Sq, 2",
                "t2 = call Sq, 3",
                "t3 = t1 + t2",
                "r = t3",
                "halt",
            ]
        );
    }

    #[test]
    fn test_real_literal_rendering_in_assignment() {
        let tac = lower("program P; var r:real; begin r := 1.0; r := 2.5 end.");
        assert_eq!(tac, vec!["main:", "r = 1.0", "r = 2.5", "halt"]);
    }
}
