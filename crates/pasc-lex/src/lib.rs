//! pasc-lex - Lexical Analyzer
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The lexer transforms Pascal source text into a stream of tokens. It is the
//! first phase of the pipeline and the only one that looks at characters.
//!
//! ```text
//! Source:  "x := x + 1;"
//!
//! Tokens:  [Ident("x")] [Assign] [Ident("x")] [Plus] [Int(1)] [Semicolon] [Eof]
//!          (whitespace and comments are skipped, never tokenized)
//! ```
//!
//! TOKEN CATEGORIES:
//! -----------------
//! 1. Keywords - reserved words, matched case-insensitively
//!    (`program`, `var`, `begin`, ..., `downto`). Type names such as
//!    `integer` are NOT keywords; they reach the parser as identifiers.
//! 2. Identifiers - a letter followed by letters, digits, or underscores.
//!    The original spelling is preserved in the token.
//! 3. Literals - integers (`42`), reals (`3.14`, `2.5e-3`), and
//!    single-quoted strings (`'it''s'` with `''` as the embedded quote).
//! 4. Operators - longest match first: `:=`, `<=`, `>=`, `<>` before their
//!    single-character prefixes.
//! 5. Punctuation - `; , : . .. ( ) [ ]`.
//!
//! POSITION TRACKING:
//! ------------------
//! Every token carries a [`Span`](pasc_util::Span) pointing at its first
//! character. Positions are 1-based and non-decreasing across the stream.
//!
//! ERROR POLICY:
//! -------------
//! The first lexical violation (unexpected character, unterminated string or
//! comment, malformed number) aborts scanning with a single
//! [`Diagnostic`](pasc_util::Diagnostic); no recovery is attempted.

pub mod cursor;
pub mod lexer;
pub mod token;

mod edge_cases;

pub use cursor::Cursor;
pub use lexer::{tokenize, Lexer};
pub use token::{keyword_from_ident, Token, TokenKind};
