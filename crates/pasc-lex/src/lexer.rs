//! Main lexer implementation.
//!
//! The [`Lexer`] turns source text into [`Token`]s, skipping whitespace and
//! all three comment forms (`{ … }`, `(* … *)`, `// …`). It aborts with a
//! [`Diagnostic`] on the first lexical violation.

use pasc_util::{Diagnostic, Span};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};

/// Tokenize an entire source string.
///
/// On success the returned vector is non-empty and its last element is the
/// [`TokenKind::Eof`] token. Token positions are non-decreasing.
///
/// # Example
///
/// ```
/// use pasc_lex::{tokenize, TokenKind};
///
/// let tokens = tokenize("x := 1").unwrap();
/// let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Ident("x".into()),
///         TokenKind::Assign,
///         TokenKind::Int(1),
///         TokenKind::Eof,
///     ]
/// );
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// The scanner itself: a [`Cursor`] plus the start position of the token
/// currently being recognized.
pub struct Lexer<'a> {
    /// Character cursor for traversing source.
    cursor: Cursor<'a>,

    /// Start byte position of the current token.
    token_start: usize,

    /// Start line of the current token.
    token_start_line: u32,

    /// Start column of the current token.
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Returns the next token, or the first lexical diagnostic.
    ///
    /// After [`TokenKind::Eof`] has been returned, every further call
    /// returns `Eof` again.
    pub fn next_token(&mut self) -> Result<Token, Diagnostic> {
        self.skip_whitespace_and_comments()?;

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(self.token(TokenKind::Eof));
        }

        match self.cursor.current_char() {
            ';' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::Semicolon))
            }
            ',' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::Comma))
            }
            '(' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::LParen))
            }
            ')' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::RParen))
            }
            '[' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::LBracket))
            }
            ']' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::RBracket))
            }
            '+' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::Plus))
            }
            '-' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::Minus))
            }
            '*' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::Star))
            }
            '/' => {
                // "//" is consumed by the comment skipper above.
                self.cursor.advance();
                Ok(self.token(TokenKind::Slash))
            }
            '=' => {
                self.cursor.advance();
                Ok(self.token(TokenKind::Eq))
            }
            ':' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.token(TokenKind::Assign))
                } else {
                    Ok(self.token(TokenKind::Colon))
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.token(TokenKind::LtEq))
                } else if self.cursor.match_char('>') {
                    Ok(self.token(TokenKind::NotEq))
                } else {
                    Ok(self.token(TokenKind::Lt))
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.token(TokenKind::GtEq))
                } else {
                    Ok(self.token(TokenKind::Gt))
                }
            }
            '.' => {
                self.cursor.advance();
                if self.cursor.match_char('.') {
                    Ok(self.token(TokenKind::DotDot))
                } else {
                    Ok(self.token(TokenKind::Dot))
                }
            }
            '\'' => self.lex_string(),
            c if c.is_ascii_alphabetic() => Ok(self.lex_identifier()),
            c if c.is_ascii_digit() => self.lex_number(),
            c => {
                self.cursor.advance();
                Err(self.error(format!("Unexpected character '{}'", c)))
            }
        }
    }

    /// Lexes an identifier or keyword.
    ///
    /// Identifiers start with a letter, followed by letters, digits, or
    /// underscores. The scanned text is matched case-insensitively against
    /// the keyword table first.
    fn lex_identifier(&mut self) -> Token {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        match keyword_from_ident(text) {
            Some(keyword) => self.token(keyword),
            None => self.token(TokenKind::Ident(text.to_string())),
        }
    }

    /// Lexes an integer or real literal.
    ///
    /// A `.` after the digit run starts a real only when a digit follows;
    /// a second `.` means the integer is the lower bound of a range
    /// (`1..10`), so the dots are left for the next token.
    fn lex_number(&mut self) -> Result<Token, Diagnostic> {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        if self.cursor.current_char() == '.' {
            if self.cursor.peek_char(1).is_ascii_digit() {
                return self.lex_real();
            }
            if self.cursor.peek_char(1) != '.' {
                self.cursor.advance();
                let text = self.cursor.slice_from(self.token_start);
                return Err(self.error(format!("Malformed number literal '{}'", text)));
            }
            // `lo..hi`: the dots belong to the range operator.
        }

        let text = self.cursor.slice_from(self.token_start);
        match text.parse::<i64>() {
            Ok(value) => Ok(self.token(TokenKind::Int(value))),
            Err(_) => Err(self.error(format!("Malformed number literal '{}'", text))),
        }
    }

    /// Lexes the fractional part and optional exponent of a real literal.
    ///
    /// Called with the cursor on the `.`; the integer part is already
    /// consumed.
    fn lex_real(&mut self) -> Result<Token, Diagnostic> {
        self.cursor.advance(); // .
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        if self.cursor.current_char() == 'e' || self.cursor.current_char() == 'E' {
            self.cursor.advance();
            if self.cursor.current_char() == '+' || self.cursor.current_char() == '-' {
                self.cursor.advance();
            }
            if !self.cursor.current_char().is_ascii_digit() {
                let text = self.cursor.slice_from(self.token_start);
                return Err(self.error(format!("Malformed number literal '{}'", text)));
            }
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let text = self.cursor.slice_from(self.token_start);
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(self.token(TokenKind::Real(value))),
            _ => Err(self.error(format!("Malformed number literal '{}'", text))),
        }
    }

    /// Lexes a single-quoted string literal.
    ///
    /// `''` inside the literal is an embedded quote. The literal must close
    /// before the end of the line.
    fn lex_string(&mut self) -> Result<Token, Diagnostic> {
        self.cursor.advance(); // opening quote

        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() || self.cursor.current_char() == '\n' {
                return Err(self.error("Unterminated string"));
            }

            if self.cursor.current_char() == '\'' {
                if self.cursor.peek_char(1) == '\'' {
                    content.push('\'');
                    self.cursor.advance();
                    self.cursor.advance();
                } else {
                    self.cursor.advance();
                    break;
                }
            } else {
                content.push(self.cursor.current_char());
                self.cursor.advance();
            }
        }

        Ok(self.token(TokenKind::Str(content)))
    }

    /// Skips whitespace and all comment forms.
    ///
    /// Comments do not nest. A block comment that reaches end of input
    /// without its closer is a lexical error reported at the comment's
    /// opening position.
    fn skip_whitespace_and_comments(&mut self) -> Result<(), Diagnostic> {
        loop {
            while self.cursor.current_char().is_whitespace() && !self.cursor.is_at_end() {
                self.cursor.advance();
            }

            if self.cursor.current_char() == '{' {
                let open = self.here();
                self.cursor.advance();
                while self.cursor.current_char() != '}' {
                    if self.cursor.is_at_end() {
                        return Err(Diagnostic::lexical("Unterminated comment", open));
                    }
                    self.cursor.advance();
                }
                self.cursor.advance();
                continue;
            }

            if self.cursor.current_char() == '(' && self.cursor.peek_char(1) == '*' {
                let open = self.here();
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    if self.cursor.is_at_end() {
                        return Err(Diagnostic::lexical("Unterminated comment", open));
                    }
                    if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == ')' {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
                continue;
            }

            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
                continue;
            }

            return Ok(());
        }
    }

    /// Builds a token spanning from the recorded start to the cursor.
    fn token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            Span::new(
                self.token_start,
                self.cursor.position(),
                self.token_start_line,
                self.token_start_column,
            ),
        )
    }

    /// A diagnostic anchored at the current token's start.
    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::lexical(
            message,
            Span::new(
                self.token_start,
                self.cursor.position(),
                self.token_start_line,
                self.token_start_column,
            ),
        )
    }

    /// A zero-width span at the cursor's current position.
    fn here(&self) -> Span {
        Span::point(self.cursor.position(), self.cursor.line(), self.cursor.column())
    }
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
