//! Literal-agnostic statement fingerprints.
//!
//! A fingerprint is the statement with every literal replaced by `?`, value
//! lists collapsed, hints dropped and spacing and case made canonical. The
//! fingerprint id is the upper-case hex of the last 8 bytes of its MD5.

use std::fmt;

use serde::Serialize;

use crate::lexer::{
    Token, TokenKind, is_callable_keyword, is_keyword, matching_paren, tokenize_lenient
};

/// Canonical, literal-free form of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable short id of this fingerprint.
    pub fn id(&self) -> FingerprintId {
        identify(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 16 upper-case hex characters derived from a [`Fingerprint`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FingerprintId(String);

impl FingerprintId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FingerprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize SQL text into its fingerprint.
///
/// The input is expected to be comment-stripped and trimmed; unterminated
/// quotes are tolerated.
///
/// ```
/// use sql_advisor::fingerprint::normalize;
///
/// let a = normalize("SELECT * FROM table_a WHERE a = 1");
/// let b = normalize("select *   from table_a where a='x'");
/// assert_eq!(a.as_str(), "select * from table_a where a = ?");
/// assert_eq!(a, b);
/// ```
pub fn normalize(sql: &str) -> Fingerprint {
    normalize_tokens(&tokenize_lenient(sql))
}

/// Normalize an already tokenized statement.
pub fn normalize_tokens(tokens: &[Token]) -> Fingerprint {
    let tokens: Vec<&Token> = tokens.iter().filter(|t| t.kind != TokenKind::Hint).collect();
    let end = tokens
        .iter()
        .rposition(|t| t.kind != TokenKind::Semicolon)
        .map_or(0, |p| p + 1);
    let tokens = &tokens[..end];

    let mut pieces: Vec<Piece> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.is_word("in")
            && let Some(close) = literal_list_end(tokens, i + 1)
        {
            pieces.push(Piece::new(TokenKind::Keyword, "in(?+)"));
            i = close + 1;
            continue;
        }
        if (token.is_word("values") || token.is_word("value"))
            && !pieces.last().is_some_and(Piece::expects_operand)
            && let Some(close) = tuple_list_end(tokens, i + 1)
        {
            pieces.push(Piece::new(TokenKind::Keyword, "values(?+)"));
            i = close + 1;
            continue;
        }
        if token.is_literal() {
            if token.kind == TokenKind::Keyword && follows_is(&pieces) {
                pieces.push(Piece::new(
                    TokenKind::Keyword,
                    token.text.as_str().to_ascii_lowercase()
                ));
            } else {
                if token.kind == TokenKind::Number {
                    fold_unary_sign(&mut pieces);
                }
                pieces.push(Piece::new(TokenKind::Placeholder, "?"));
            }
            i += 1;
            continue;
        }
        let text = match token.kind {
            TokenKind::Keyword | TokenKind::Identifier | TokenKind::Variable => {
                token.text.as_str().to_ascii_lowercase()
            }
            TokenKind::QuotedIdentifier => {
                let inner = token.unquoted();
                if is_plain_identifier(&inner) {
                    inner.to_ascii_lowercase()
                } else {
                    token.text.to_string()
                }
            }
            _ => token.text.to_string()
        };
        let kind = match token.kind {
            TokenKind::QuotedIdentifier if !text.starts_with('`') => TokenKind::Identifier,
            kind => kind
        };
        pieces.push(Piece::new(kind, text));
        i += 1;
    }
    Fingerprint(render(&pieces))
}

/// Derive the fingerprint id: MD5, last 8 bytes, upper-case hex.
///
/// ```
/// use sql_advisor::fingerprint::identify;
///
/// let id = identify("select ?");
/// assert_eq!(id.as_str().len(), 16);
/// assert_eq!(id, identify("select ?"));
/// ```
pub fn identify(fingerprint: &str) -> FingerprintId {
    let hex = format!("{:x}", md5::compute(fingerprint.as_bytes()));
    FingerprintId(hex[hex.len() - 16..].to_ascii_uppercase())
}

#[derive(Debug)]
struct Piece {
    kind: TokenKind,
    text: String
}

impl Piece {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into()
        }
    }

    /// Position right after this piece cannot hold a complete operand.
    fn expects_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Operator | TokenKind::Comma | TokenKind::LParen
        )
    }

    fn is_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier
                | TokenKind::QuotedIdentifier
                | TokenKind::Placeholder
                | TokenKind::Variable
                | TokenKind::RParen
        )
    }
}

fn follows_is(pieces: &[Piece]) -> bool {
    match pieces {
        [.., last] if last.text == "is" => true,
        [.., is, not] => is.text == "is" && not.text == "not",
        _ => false
    }
}

fn fold_unary_sign(pieces: &mut Vec<Piece>) {
    let Some(last) = pieces.last() else {
        return;
    };
    if last.kind != TokenKind::Operator || !(last.text == "-" || last.text == "+") {
        return;
    }
    let unary = pieces.len() < 2 || !pieces[pieces.len() - 2].is_operand();
    if unary {
        pieces.pop();
    }
}

fn is_plain_identifier(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !is_keyword(name)
}

/// `( lit, lit, ... )` made only of literals and signs.
fn literal_list_end(tokens: &[&Token], open: usize) -> Option<usize> {
    let close = matching_paren(tokens, open)?;
    let inner = &tokens[open + 1..close];
    let literal_only = inner.iter().all(|t| {
        t.is_literal()
            || t.kind == TokenKind::Comma
            || t.is_op("-")
            || t.is_op("+")
    });
    (literal_only && inner.iter().any(|t| t.is_literal())).then_some(close)
}

/// `( .. ), ( .. ), ...` tuple list following `VALUES`.
fn tuple_list_end(tokens: &[&Token], open: usize) -> Option<usize> {
    let mut close = matching_paren(tokens, open)?;
    while tokens.get(close + 1).is_some_and(|t| t.kind == TokenKind::Comma) {
        match matching_paren(tokens, close + 2) {
            Some(next) => close = next,
            None => break
        }
    }
    Some(close)
}

fn render(pieces: &[Piece]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Piece> = None;
    for piece in pieces {
        if let Some(p) = prev
            && needs_space(p, piece)
        {
            out.push(' ');
        }
        out.push_str(&piece.text);
        prev = Some(piece);
    }
    out
}

fn needs_space(prev: &Piece, current: &Piece) -> bool {
    if matches!(
        current.kind,
        TokenKind::Comma | TokenKind::RParen | TokenKind::Dot | TokenKind::Semicolon
    ) {
        return false;
    }
    if matches!(prev.kind, TokenKind::LParen | TokenKind::Dot) {
        return false;
    }
    if current.kind == TokenKind::LParen {
        let call = match prev.kind {
            TokenKind::Identifier | TokenKind::QuotedIdentifier => true,
            TokenKind::Keyword => is_callable_keyword(&prev.text),
            _ => false
        };
        return !call;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier("user_id"));
        assert!(!is_plain_identifier("order"));
        assert!(!is_plain_identifier("1abc"));
        assert!(!is_plain_identifier("my col"));
    }

    #[test]
    fn test_follows_is() {
        let pieces = vec![
            Piece::new(TokenKind::Identifier, "a"),
            Piece::new(TokenKind::Keyword, "is"),
            Piece::new(TokenKind::Keyword, "not"),
        ];
        assert!(follows_is(&pieces));
        assert!(!follows_is(&pieces[..1]));
    }
}
