//! Compiler diagnostics.
//!
//! A [`Diagnostic`] names the phase that failed, a message, and the source
//! position it refers to. The pipeline stops at the first diagnostic; later
//! phases never run, so one compilation produces at most one of these.
//!
//! # Examples
//!
//! ```
//! use pasc_util::{Diagnostic, Span};
//!
//! let diag = Diagnostic::syntax("expected ';', got 'end'", Span::new(20, 23, 2, 5));
//! assert_eq!(diag.to_string(), "Syntax Error: expected ';', got 'end' at 2:5");
//! ```

use std::fmt;

use thiserror::Error;

use crate::span::Span;

/// The compilation phase a diagnostic originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Character-level scanning.
    Lexical,
    /// Token-level parsing.
    Syntax,
    /// Declaration, scope, and type checking.
    Semantic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lexical => write!(f, "Lexical"),
            Phase::Syntax => write!(f, "Syntax"),
            Phase::Semantic => write!(f, "Semantic"),
        }
    }
}

/// A fatal compilation diagnostic.
///
/// Formats as `<Phase> Error: <message> at <line>:<column>`, which is the
/// exact shape the driver prints to stderr.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{phase} Error: {message} at {span}")]
pub struct Diagnostic {
    /// Originating phase.
    pub phase: Phase,
    /// Human-readable description, without position information.
    pub message: String,
    /// Where in the source the violation sits.
    pub span: Span,
}

impl Diagnostic {
    /// Create a diagnostic for an arbitrary phase.
    pub fn new(phase: Phase, message: impl Into<String>, span: Span) -> Self {
        Self {
            phase,
            message: message.into(),
            span,
        }
    }

    /// A lexical error at `span`.
    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self::new(Phase::Lexical, message, span)
    }

    /// A syntax error at `span`.
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(Phase::Syntax, message, span)
    }

    /// A semantic error at `span`.
    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::new(Phase::Semantic, message, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_format() {
        let d = Diagnostic::lexical("Unexpected character '#'", Span::new(4, 5, 1, 5));
        assert_eq!(d.to_string(), "Lexical Error: Unexpected character '#' at 1:5");
    }

    #[test]
    fn test_semantic_format() {
        let d = Diagnostic::semantic("Type mismatch: cannot assign real to integer", Span::new(40, 41, 1, 41));
        assert!(d.to_string().starts_with("Semantic Error: Type mismatch"));
        assert!(d.to_string().ends_with("at 1:41"));
    }

    #[test]
    fn test_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        let d = Diagnostic::syntax("expected 'begin', got 'end'", Span::DUMMY);
        takes_error(&d);
    }
}
