use compact_str::CompactString;
use serde::Serialize;

/// Lexical class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// Reserved word (`select`, `from`, `join`, ...)
    Keyword,
    /// Bare identifier, including function names
    Identifier,
    /// Backtick-quoted identifier
    QuotedIdentifier,
    /// String literal, including `X'..'`, `B'..'` and `N'..'` forms
    String,
    /// Numeric literal (integer, decimal, exponent, `0x..`)
    Number,
    /// Bind placeholder: `?`, `?+`, `:name`, `$1`
    Placeholder,
    /// User or system variable: `@x`, `@@session.x`
    Variable,
    Operator,
    LParen,
    RParen,
    Comma,
    Dot,
    Semicolon,
    /// Optimizer hint or executable comment (`/*+ .. */`, `/*! .. */`)
    Hint
}

/// A lexical token with its byte offset in the source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind:   TokenKind,
    pub text:   CompactString,
    pub offset: usize
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<CompactString>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset
        }
    }

    /// Byte offset one past the last byte of the token.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Case-insensitive match against a keyword or bare identifier.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self.kind, TokenKind::Keyword | TokenKind::Identifier)
            && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Identifier-like token that can name a column, table or alias.
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::QuotedIdentifier)
    }

    /// Literal value: strings, numbers, placeholders, `NULL`, `TRUE`, `FALSE`.
    pub fn is_literal(&self) -> bool {
        match self.kind {
            TokenKind::String | TokenKind::Number | TokenKind::Placeholder => true,
            TokenKind::Keyword => {
                self.is_word("null") || self.is_word("true") || self.is_word("false")
            }
            _ => false
        }
    }

    /// Identifier text with backtick quoting removed. An unterminated
    /// identifier (lenient lexing) keeps everything after the opening quote.
    pub fn unquoted(&self) -> String {
        let Some(inner) = self
            .text
            .strip_prefix('`')
            .filter(|_| self.kind == TokenKind::QuotedIdentifier)
        else {
            return self.text.to_string();
        };
        let mut name = String::with_capacity(inner.len());
        let mut chars = inner.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '`' {
                name.push(c);
            } else if chars.next_if_eq(&'`').is_some() {
                name.push('`');
            } else {
                break;
            }
        }
        name
    }

    /// Content of a string literal without prefix and quotes.
    pub fn string_value(&self) -> Option<&str> {
        if self.kind != TokenKind::String {
            return None;
        }
        let text = self.text.as_str();
        let start = text.find(['\'', '"'])?;
        let quote = text[start..].chars().next()?;
        let body = &text[start + 1..];
        Some(body.strip_suffix(quote).unwrap_or(body))
    }
}
