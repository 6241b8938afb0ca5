//! Edge case and property tests for pasc-lex.
