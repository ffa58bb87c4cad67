//! Quote and comment aware SQL tokenizer.
//!
//! Quoting follows MySQL: `'..'` and `".."` are strings, backticks quote
//! identifiers. Comments are dropped, optimizer hints are kept as
//! [`TokenKind::Hint`] tokens.

mod keywords;
mod segments;
mod token;

use std::borrow::Borrow;

pub use keywords::{is_callable_keyword, is_keyword};
pub use segments::{split_statements, strip_comments};
use thiserror::Error;
pub use token::{Token, TokenKind};

/// Multi-byte operators, longest first.
const OPERATORS: &[&str] = &[
    "<=>", "->>", "<=", ">=", "<>", "!=", "||", "&&", ":=", "<<", ">>", "->", "::",
];

/// Lexical errors raised in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString(usize),
    #[error("unterminated quoted identifier")]
    UnterminatedIdentifier(usize),
    #[error("unterminated block comment")]
    UnterminatedComment(usize),
    #[error("unbalanced parenthesis")]
    UnbalancedParen(usize)
}

impl LexError {
    /// Byte offset where the offending construct starts.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnterminatedString(at)
            | Self::UnterminatedIdentifier(at)
            | Self::UnterminatedComment(at)
            | Self::UnbalancedParen(at) => *at
        }
    }
}

/// Single-pass tokenizer over the bytes of one SQL text.
#[derive(Debug)]
pub struct Lexer<'a> {
    sql:     &'a str,
    pos:     usize,
    lenient: bool,
    tokens:  Vec<Token>
}

impl<'a> Lexer<'a> {
    pub fn new(sql: &'a str) -> Self {
        Self {
            sql,
            pos: 0,
            lenient: false,
            tokens: Vec::new()
        }
    }

    /// Consume unterminated quotes and comments to the end of input instead
    /// of failing.
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let sql = self.sql;
        let bytes = sql.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            let start = self.pos;
            let next = bytes.get(start + 1).copied();
            match b {
                _ if b.is_ascii_whitespace() => self.pos += 1,
                b'#' => self.pos = segments::line_end(bytes, start),
                b'-' if segments::is_dash_comment(bytes, start) => {
                    self.pos = segments::line_end(bytes, start)
                }
                b'/' if next == Some(b'*') => self.block_comment(start)?,
                b'\'' | b'"' => self.quoted(start, start, TokenKind::String)?,
                b'`' => self.quoted(start, start, TokenKind::QuotedIdentifier)?,
                b'x' | b'X' | b'b' | b'B' | b'n' | b'N' if next == Some(b'\'') => {
                    self.quoted(start, start + 1, TokenKind::String)?
                }
                b'0'..=b'9' => self.number(start),
                b'.' if next.is_some_and(|n| n.is_ascii_digit()) && !self.after_operand() => {
                    self.number(start)
                }
                b'?' => {
                    let len = if next == Some(b'+') && bytes.get(start + 2) == Some(&b')') {
                        2
                    } else {
                        1
                    };
                    self.emit(TokenKind::Placeholder, start, start + len);
                }
                b':' if next.is_some_and(is_word_start) => {
                    let end = self.word_end(start + 1);
                    self.emit(TokenKind::Placeholder, start, end);
                }
                b'$' if next.is_some_and(|n| n.is_ascii_digit()) => {
                    let end = digits_end(bytes, start + 1);
                    self.emit(TokenKind::Placeholder, start, end);
                }
                b'@' => self.variable(start),
                b'(' => self.emit(TokenKind::LParen, start, start + 1),
                b')' => self.emit(TokenKind::RParen, start, start + 1),
                b',' => self.emit(TokenKind::Comma, start, start + 1),
                b'.' => self.emit(TokenKind::Dot, start, start + 1),
                b';' => self.emit(TokenKind::Semicolon, start, start + 1),
                _ if is_word_start(b) => self.word(start),
                _ => self.operator(start)
            }
        }
        Ok(self.tokens)
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens
            .push(Token::new(kind, &self.sql[start..end], start));
        self.pos = end;
    }

    fn after_operand(&self) -> bool {
        self.tokens.last().is_some_and(|t| {
            matches!(
                t.kind,
                TokenKind::Identifier
                    | TokenKind::QuotedIdentifier
                    | TokenKind::RParen
                    | TokenKind::Number
                    | TokenKind::String
            )
        })
    }

    fn block_comment(&mut self, start: usize) -> Result<(), LexError> {
        let sql = self.sql;
        let bytes = sql.as_bytes();
        let end = match segments::find(bytes, start + 2, b"*/") {
            Some(close) => close + 2,
            None if self.lenient => bytes.len(),
            None => return Err(LexError::UnterminatedComment(start))
        };
        if matches!(bytes.get(start + 2), Some(b'!') | Some(b'+')) {
            self.emit(TokenKind::Hint, start, end);
        } else {
            self.pos = end;
        }
        Ok(())
    }

    fn quoted(&mut self, start: usize, quote_at: usize, kind: TokenKind) -> Result<(), LexError> {
        let end = match segments::quoted_end(self.sql.as_bytes(), quote_at) {
            Some(end) => end,
            None if self.lenient => self.sql.len(),
            None if kind == TokenKind::QuotedIdentifier => {
                return Err(LexError::UnterminatedIdentifier(start));
            }
            None => return Err(LexError::UnterminatedString(start))
        };
        self.emit(kind, start, end);
        Ok(())
    }

    fn number(&mut self, start: usize) {
        let sql = self.sql;
        let bytes = sql.as_bytes();
        if bytes[start] == b'0' && matches!(bytes.get(start + 1), Some(b'x') | Some(b'X')) {
            let end = start
                + 2
                + bytes[start + 2..]
                    .iter()
                    .take_while(|b| b.is_ascii_hexdigit())
                    .count();
            if end > start + 2 && !bytes.get(end).copied().is_some_and(is_word_char) {
                self.emit(TokenKind::Number, start, end);
                return;
            }
        }
        let mut end = digits_end(bytes, start);
        if bytes.get(end) == Some(&b'.') {
            end = digits_end(bytes, end + 1);
        }
        if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
                exp += 1;
            }
            if bytes.get(exp).is_some_and(|b| b.is_ascii_digit()) {
                end = digits_end(bytes, exp);
            }
        }
        if bytes[start] != b'.' && bytes.get(end).copied().is_some_and(is_word_char) {
            // `1abc` is a valid identifier in MySQL
            let end = self.word_end(end);
            self.emit(TokenKind::Identifier, start, end);
        } else {
            self.emit(TokenKind::Number, start, end);
        }
    }

    fn word_end(&self, from: usize) -> usize {
        let sql = self.sql;
        let bytes = sql.as_bytes();
        from + bytes[from..]
            .iter()
            .take_while(|&&b| is_word_char(b))
            .count()
    }

    fn word(&mut self, start: usize) {
        let end = self.word_end(start);
        let kind = if is_keyword(&self.sql[start..end]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.emit(kind, start, end);
    }

    fn variable(&mut self, start: usize) {
        let sql = self.sql;
        let bytes = sql.as_bytes();
        let mut end = start + 1;
        if bytes.get(end) == Some(&b'@') {
            end += 1;
        }
        let name_end = end + bytes[end..]
            .iter()
            .take_while(|&&b| is_word_char(b) || b == b'.')
            .count();
        if name_end == end {
            self.emit(TokenKind::Operator, start, start + 1);
        } else {
            self.emit(TokenKind::Variable, start, name_end);
        }
    }

    fn operator(&mut self, start: usize) {
        let rest = &self.sql[start..];
        let len = OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op))
            .map_or_else(|| rest.chars().next().map_or(1, char::len_utf8), |op| op.len());
        self.emit(TokenKind::Operator, start, start + len);
    }
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_word_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn digits_end(bytes: &[u8], from: usize) -> usize {
    from + bytes[from..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

/// Tokenize in strict mode.
///
/// ```
/// use sql_advisor::lexer::{TokenKind, tokenize};
///
/// let tokens = tokenize("select `id` from t where a <=> ?").unwrap();
/// assert_eq!(tokens[1].kind, TokenKind::QuotedIdentifier);
/// assert!(tokens[6].is_op("<=>"));
/// assert_eq!(tokens[7].kind, TokenKind::Placeholder);
/// ```
pub fn tokenize(sql: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(sql).tokenize()
}

/// Tokenize without failing on unterminated constructs.
pub fn tokenize_lenient(sql: &str) -> Vec<Token> {
    Lexer::new(sql).lenient().tokenize().unwrap_or_default()
}

/// Report the first parenthesis without a partner.
pub fn check_balanced(tokens: &[Token]) -> Result<(), LexError> {
    let mut open = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::LParen => open.push(token.offset),
            TokenKind::RParen => {
                if open.pop().is_none() {
                    return Err(LexError::UnbalancedParen(token.offset));
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(offset) => Err(LexError::UnbalancedParen(offset)),
        None => Ok(())
    }
}

/// Index of the `)` closing the parenthesis at `open`.
///
/// Works over owned tokens and over filtered `&Token` views alike.
///
/// # Returns
///
/// `None` when `open` is not a `(` or the parenthesis is never closed.
///
/// # Example
///
/// ```
/// use sql_advisor::lexer::{matching_paren, tokenize};
///
/// let tokens = tokenize("f((a), b) + 1").unwrap();
/// assert_eq!(matching_paren(&tokens, 1), Some(7));
/// assert_eq!(matching_paren(&tokens, 0), None);
/// ```
pub fn matching_paren<T: Borrow<Token>>(tokens: &[T], open: usize) -> Option<usize> {
    if tokens.get(open)?.borrow().kind != TokenKind::LParen {
        return None;
    }
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        match token.borrow().kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
