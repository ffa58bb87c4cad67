//! Token-level structure: top-level clauses and subquery nesting.

use super::types::{Clause, ClauseKind, StatementType};
use crate::lexer::{Token, TokenKind};

/// Split the token stream into top-level clauses.
///
/// Only keywords at parenthesis depth 0 open a clause, so subqueries stay
/// inside the clause that contains them.
pub fn segment(tokens: &[Token], statement_type: StatementType) -> Vec<Clause> {
    let mut clauses = Vec::new();
    let mut current = Clause {
        kind:    ClauseKind::Head,
        keyword: 0,
        body:    0..0
    };
    let mut depth = 0usize;
    let mut idx = 0;
    while idx < tokens.len() {
        match tokens[idx].kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            TokenKind::Keyword if depth == 0 => {
                if let Some((kind, width)) = clause_start(tokens, idx, statement_type) {
                    current.body.end = idx;
                    if current.kind != ClauseKind::Head || !current.body.is_empty() {
                        clauses.push(current);
                    }
                    current = Clause {
                        kind,
                        keyword: idx,
                        body: idx + width..idx + width
                    };
                    idx += width;
                    continue;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    let end = tokens
        .iter()
        .rposition(|t| t.kind != TokenKind::Semicolon)
        .map_or(0, |p| p + 1);
    current.body.end = end.max(current.body.start);
    if current.kind != ClauseKind::Head || !current.body.is_empty() {
        clauses.push(current);
    }
    clauses
}

fn clause_start(
    tokens: &[Token],
    idx: usize,
    statement_type: StatementType
) -> Option<(ClauseKind, usize)> {
    let token = &tokens[idx];
    let next = tokens.get(idx + 1);
    let next_is = |word: &str| next.is_some_and(|t| t.is_word(word));
    let word = token.text.to_ascii_lowercase();
    let start = match word.as_str() {
        "select" => (ClauseKind::Select, 1),
        "from" => (ClauseKind::From, 1),
        "where" => (ClauseKind::Where, 1),
        "group" if next_is("by") => (ClauseKind::GroupBy, 2),
        "order" if next_is("by") => (ClauseKind::OrderBy, 2),
        "having" => (ClauseKind::Having, 1),
        "limit" => (ClauseKind::Limit, 1),
        "into" => (ClauseKind::Into, 1),
        "union" | "except" | "intersect" => (ClauseKind::Union, 1),
        "set" if statement_type.is_write() => (ClauseKind::Set, 1),
        "values"
            if matches!(statement_type, StatementType::Insert | StatementType::Replace)
                && next.is_some_and(|t| t.kind == TokenKind::LParen)
                && !follows_operator(tokens, idx) =>
        {
            (ClauseKind::Values, 1)
        }
        "on" if next_is("duplicate") => {
            let mut width = 2;
            for word in ["key", "update"] {
                if tokens.get(idx + width).is_some_and(|t| t.is_word(word)) {
                    width += 1;
                }
            }
            (ClauseKind::OnDuplicate, width)
        }
        _ => return None
    };
    Some(start)
}

/// `values(col)` inside an assignment is a function call, not a clause.
fn follows_operator(tokens: &[Token], idx: usize) -> bool {
    idx > 0
        && matches!(
            tokens[idx - 1].kind,
            TokenKind::Operator | TokenKind::Comma | TokenKind::LParen
        )
}

/// Number of enclosing subqueries for every token.
///
/// A parenthesis opens a subquery when the next token is `select` or
/// `with`. The parentheses themselves belong to the outer level.
pub fn nesting(tokens: &[Token]) -> Vec<usize> {
    let mut levels = Vec::with_capacity(tokens.len());
    let mut stack: Vec<bool> = Vec::new();
    let mut level = 0usize;
    for (idx, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => {
                levels.push(level);
                let subquery = tokens
                    .get(idx + 1)
                    .is_some_and(|t| t.is_word("select") || t.is_word("with"));
                if subquery {
                    level += 1;
                }
                stack.push(subquery);
            }
            TokenKind::RParen => {
                if stack.pop() == Some(true) {
                    level = level.saturating_sub(1);
                }
                levels.push(level);
            }
            _ => levels.push(level)
        }
    }
    levels
}
