//! Token helpers shared by the built-in rules.

pub(super) use crate::lexer::matching_paren;
use crate::{
    lexer::{Token, TokenKind},
    query::{AuditContext, ClauseKind}
};

/// Clauses holding predicates: WHERE, HAVING and join conditions in FROM.
pub(super) const CONDITIONS: &[ClauseKind] =
    &[ClauseKind::Where, ClauseKind::Having, ClauseKind::From];

/// Bodies of every clause whose kind is listed, in statement order.
pub(super) fn bodies<'a>(
    ctx: &'a AuditContext,
    kinds: &'a [ClauseKind]
) -> impl Iterator<Item = &'a [Token]> + 'a {
    ctx.clauses
        .iter()
        .filter(move |c| kinds.contains(&c.kind))
        .map(move |c| ctx.body(c))
}

/// `name(` at `idx`, matched case-insensitively.
pub(super) fn is_call(tokens: &[Token], idx: usize, name: &str) -> bool {
    tokens[idx].kind == TokenKind::Identifier
        && tokens[idx].text.eq_ignore_ascii_case(name)
        && tokens
            .get(idx + 1)
            .is_some_and(|t| t.kind == TokenKind::LParen)
}

/// Arguments of the call at `idx`, without the parentheses.
pub(super) fn call_args(tokens: &[Token], idx: usize) -> Option<&[Token]> {
    let close = matching_paren(tokens, idx + 1)?;
    Some(&tokens[idx + 2..close])
}

/// Indices of tokens at parenthesis depth 0 of `tokens`, including the
/// outermost parentheses themselves.
pub(super) fn top_level(tokens: &[Token]) -> Vec<usize> {
    let mut depth = 0usize;
    let mut out = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => {
                if depth == 0 {
                    out.push(idx);
                }
                depth += 1;
            }
            TokenKind::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    out.push(idx);
                }
            }
            _ if depth == 0 => out.push(idx),
            _ => {}
        }
    }
    out
}

/// Ordering item without a trailing `ASC`/`DESC`.
pub(super) fn strip_direction(item: &[Token]) -> &[Token] {
    match item.split_last() {
        Some((last, rest)) if last.is_word("asc") || last.is_word("desc") => rest,
        _ => item
    }
}

/// Plain column reference: `col`, `tbl.col`, `db.tbl.col`.
pub(super) fn is_column_ref(item: &[Token]) -> bool {
    !item.is_empty()
        && item.iter().enumerate().all(|(idx, t)| {
            if idx % 2 == 0 {
                t.is_name() || t.kind == TokenKind::Keyword && !t.is_literal()
            } else {
                t.kind == TokenKind::Dot
            }
        })
        && item.len() % 2 == 1
}

/// Single numeric literal, e.g. `GROUP BY 1`.
pub(super) fn is_constant(item: &[Token]) -> bool {
    matches!(item, [t] if t.kind == TokenKind::Number)
}

/// Arithmetic operator that binds tighter than a comparison.
pub(super) fn is_arithmetic(token: &Token) -> bool {
    token.kind == TokenKind::Operator
        && matches!(token.text.as_str(), "+" | "-" | "*" | "/" | "%" | "||" | "^" | "&" | "|")
}

/// Comparison operator.
pub(super) fn is_comparison(token: &Token) -> bool {
    token.kind == TokenKind::Operator
        && matches!(
            token.text.as_str(),
            "=" | "!=" | "<>" | "<" | ">" | "<=" | ">=" | "<=>"
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_column_ref() {
        let toks = tokenize("t.col").unwrap();
        assert!(is_column_ref(&toks));
        let toks = tokenize("col + 1").unwrap();
        assert!(!is_column_ref(&toks));
        let toks = tokenize("upper(col)").unwrap();
        assert!(!is_column_ref(&toks));
    }

    #[test]
    fn test_call_args() {
        let toks = tokenize("count(distinct a, b)").unwrap();
        assert!(is_call(&toks, 0, "COUNT"));
        assert_eq!(call_args(&toks, 0).map(|a| a.len()), Some(4));
    }

    #[test]
    fn test_strip_direction() {
        let toks = tokenize("c1 desc").unwrap();
        assert_eq!(strip_direction(&toks).len(), 1);
    }
}
