//! pasc-util - Foundation types shared by every compiler phase.
//!
//! The whole pipeline speaks two small vocabularies that live here:
//!
//! - [`Span`]: a source location (byte range plus 1-based line/column of the
//!   first character). Tokens and AST nodes each carry one, and diagnostics
//!   report through it.
//! - [`Diagnostic`]: the single error currency of the compiler. Every phase
//!   returns `Result<_, Diagnostic>` and aborts at the first violation; the
//!   driver formats the diagnostic and chooses the exit status.
//!
//! Nothing in this crate knows about tokens, trees, or TAC; it is the layer
//! below all of them.

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, Phase};
pub use span::Span;
