//! The three-address instruction set.
//!
//! TAC is line-oriented: one instruction per line, each referencing at most
//! three operands. [`Instr`]'s `Display` impl produces exactly the emitted
//! text, so rendering a program is joining the display of its instructions.

use std::fmt;

/// An instruction operand: a literal or a name (variable, temporary, or
/// formal).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Real(f64),
    /// String literal; renders single-quoted with `''` escaping restored.
    Str(String),
    Name(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(value) => write!(f, "{}", value),
            Operand::Real(value) => {
                // Keep integral reals visibly real: 1.0 stays "1.0".
                if value.fract() == 0.0 && value.is_finite() {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Operand::Str(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Operand::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A binary TAC operator. `=`/`<>` in source become `==`/`!=`; `div` and
/// `mod` keep their lexemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for TacOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lexeme = match self {
            TacOp::Add => "+",
            TacOp::Sub => "-",
            TacOp::Mul => "*",
            TacOp::Div => "/",
            TacOp::IntDiv => "div",
            TacOp::Mod => "mod",
            TacOp::Eq => "==",
            TacOp::Ne => "!=",
            TacOp::Lt => "<",
            TacOp::Le => "<=",
            TacOp::Gt => ">",
            TacOp::Ge => ">=",
        };
        write!(f, "{}", lexeme)
    }
}

/// One TAC instruction; one output line.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// `<label>:`
    Label(String),
    /// `<dst> = <src>` - constant load or copy.
    Copy { dst: String, src: Operand },
    /// `<dst> = <a> <op> <b>`
    Binary {
        dst: String,
        op: TacOp,
        lhs: Operand,
        rhs: Operand,
    },
    /// `goto <label>`
    Goto(String),
    /// `if_true <cond> goto <label>`
    IfTrue { cond: Operand, target: String },
    /// `if_false <cond> goto <label>`
    IfFalse { cond: Operand, target: String },
    /// `call <callee>, <args>` or `<dst> = call <callee>, <args>`
    Call {
        dst: Option<String>,
        callee: String,
        args: Vec<Operand>,
    },
    /// `return`
    Return,
    /// `write <operand>`
    Write(Operand),
    /// `writeln`
    Writeln,
    /// `read <lvalue>`
    Read(String),
    /// `readln`
    Readln,
    /// `<dst> = <array>[<index>]`
    IndexLoad {
        dst: String,
        array: String,
        index: Operand,
    },
    /// `<array>[<index>] = <src>`
    IndexStore {
        array: String,
        index: Operand,
        src: Operand,
    },
    /// `halt`
    Halt,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Label(label) => write!(f, "{}:", label),
            Instr::Copy { dst, src } => write!(f, "{} = {}", dst, src),
            Instr::Binary { dst, op, lhs, rhs } => {
                write!(f, "{} = {} {} {}", dst, lhs, op, rhs)
            }
            Instr::Goto(target) => write!(f, "goto {}", target),
            Instr::IfTrue { cond, target } => write!(f, "if_true {} goto {}", cond, target),
            Instr::IfFalse { cond, target } => write!(f, "if_false {} goto {}", cond, target),
            Instr::Call { dst, callee, args } => {
                if let Some(dst) = dst {
                    write!(f, "{} = call {}", dst, callee)?;
                } else {
                    write!(f, "call {}", callee)?;
                }
                for arg in args {
                    write!(f, ", {}", arg)?;
                }
                Ok(())
            }
            Instr::Return => write!(f, "return"),
            Instr::Write(operand) => write!(f, "write {}", operand),
            Instr::Writeln => write!(f, "writeln"),
            Instr::Read(lvalue) => write!(f, "read {}", lvalue),
            Instr::Readln => write!(f, "readln"),
            Instr::IndexLoad { dst, array, index } => {
                write!(f, "{} = {}[{}]", dst, array, index)
            }
            Instr::IndexStore { array, index, src } => {
                write!(f, "{}[{}] = {}", array, index, src)
            }
            Instr::Halt => write!(f, "halt"),
        }
    }
}

/// Render an instruction list as TAC text, one line per instruction, with a
/// trailing newline.
pub fn render(instrs: &[Instr]) -> String {
    let mut out = String::new();
    for instr in instrs {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_rendering() {
        assert_eq!(Operand::Int(42).to_string(), "42");
        assert_eq!(Operand::Int(-7).to_string(), "-7");
        assert_eq!(Operand::Real(3.14).to_string(), "3.14");
        assert_eq!(Operand::Real(1.0).to_string(), "1.0");
        assert_eq!(Operand::Str("big".into()).to_string(), "'big'");
        assert_eq!(Operand::Str("it's".into()).to_string(), "'it''s'");
        assert_eq!(Operand::Name("t0".into()).to_string(), "t0");
    }

    #[test]
    fn test_instruction_rendering() {
        assert_eq!(Instr::Label("main".into()).to_string(), "main:");
        assert_eq!(
            Instr::Copy {
                dst: "x".into(),
                src: Operand::Int(10)
            }
            .to_string(),
            "x = 10"
        );
        assert_eq!(
            Instr::Binary {
                dst: "t0".into(),
                op: TacOp::Add,
                lhs: Operand::Name("x".into()),
                rhs: Operand::Name("y".into())
            }
            .to_string(),
            "t0 = x + y"
        );
        assert_eq!(
            Instr::IfFalse {
                cond: Operand::Name("t0".into()),
                target: "L0".into()
            }
            .to_string(),
            "if_false t0 goto L0"
        );
        assert_eq!(
            Instr::Call {
                dst: Some("t1".into()),
                callee: "Add".into(),
                args: vec![Operand::Int(2), Operand::Int(3)]
            }
            .to_string(),
            "t1 = call Add, 2, 3"
        );
        assert_eq!(
            Instr::Call {
                dst: None,
                callee: "Init".into(),
                args: vec![]
            }
            .to_string(),
            "call Init"
        );
        assert_eq!(
            Instr::IndexLoad {
                dst: "t2".into(),
                array: "a".into(),
                index: Operand::Name("i".into())
            }
            .to_string(),
            "t2 = a[i]"
        );
        assert_eq!(
            Instr::IndexStore {
                array: "a".into(),
                index: Operand::Int(1),
                src: Operand::Name("t2".into())
            }
            .to_string(),
            "a[1] = t2"
        );
        assert_eq!(Instr::Halt.to_string(), "halt");
    }

    #[test]
    fn test_div_mod_keep_lexemes() {
        assert_eq!(TacOp::IntDiv.to_string(), "div");
        assert_eq!(TacOp::Mod.to_string(), "mod");
        assert_eq!(TacOp::Eq.to_string(), "==");
        assert_eq!(TacOp::Ne.to_string(), "!=");
    }

    #[test]
    fn test_render_joins_lines() {
        let text = render(&[Instr::Label("main".into()), Instr::Halt]);
        assert_eq!(text, "main:\nhalt\n");
    }
}
