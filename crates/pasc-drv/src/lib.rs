//! pasc-drv - Compiler Driver
//!
//! ============================================================================
//! PIPELINE
//! ============================================================================
//!
//! ```text
//! Source file (.pas)
//!        │
//!        ▼
//!   [Lexer]    ──▶ token stream        (pasc-lex)
//!        │
//!        ▼
//!   [Parser]   ──▶ AST                 (pasc-par)
//!        │
//!        ▼
//!   [Semantic] ──▶ validated AST       (pasc-sem)
//!        │
//!        ▼
//!   [Codegen]  ──▶ TAC text            (pasc-gen)
//! ```
//!
//! Control flow is strictly sequential: a phase runs to completion and
//! either hands its artifact to the next phase or aborts the compilation
//! with the first diagnostic. No phase re-enters an earlier one.
//!
//! The driver routes diagnostics to stderr, writes TAC to stdout or a named
//! output file, and maps failures to exit status: `0` success, `1` any
//! compilation error, `2` I/O errors and bad arguments.

mod error;

pub use error::{DriverError, Result};

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use pasc_util::Diagnostic;

/// Compiler configuration for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Path of the source file.
    pub input: PathBuf,

    /// Write TAC here instead of stdout.
    pub output: Option<PathBuf>,

    /// Emit phase markers to stderr before each phase.
    pub verbose: bool,
}

/// A compilation session: the unit of state for one invocation.
pub struct Session {
    pub config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Read the input, run the pipeline, write the output.
    pub fn run(&self) -> Result<()> {
        let source = fs::read_to_string(&self.config.input).map_err(|source| DriverError::Io {
            path: self.config.input.clone(),
            source,
        })?;

        let tac = compile(&source, self.config.verbose)?;

        match &self.config.output {
            Some(path) => fs::write(path, tac).map_err(|source| DriverError::Io {
                path: path.clone(),
                source,
            })?,
            None => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(tac.as_bytes())
                    .and_then(|_| handle.flush())
                    .map_err(|source| DriverError::Io {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })?;
            }
        }

        Ok(())
    }
}

/// Run the four phases over `source`, producing the TAC text.
///
/// This is the library surface of the compiler: no files, no process exit,
/// just source in and TAC (or the first diagnostic) out. `verbose` writes a
/// marker line to stderr before each phase.
///
/// # Example
///
/// ```
/// let tac = pasc_drv::compile("program P; var x: integer; begin x := 1 end.", false).unwrap();
/// assert_eq!(tac, "main:\nx = 1\nhalt\n");
/// ```
pub fn compile(source: &str, verbose: bool) -> std::result::Result<String, Diagnostic> {
    if verbose {
        eprintln!("-- Lexing --");
    }
    let tokens = pasc_lex::tokenize(source)?;
    debug!(tokens = tokens.len(), "lexing done");

    if verbose {
        eprintln!("-- Parsing --");
    }
    let program = pasc_par::parse(tokens)?;
    debug!(decls = program.decls.len(), "parsing done");

    if verbose {
        eprintln!("-- Semantic Analysis --");
    }
    pasc_sem::analyze(&program)?;

    if verbose {
        eprintln!("-- Code Generation --");
    }
    let instrs = pasc_gen::generate(&program);
    debug!(instructions = instrs.len(), "code generation done");

    Ok(pasc_gen::render(&instrs))
}
