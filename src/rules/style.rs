use super::{
    Finding, Rule, RuleCategory, RuleInfo, Severity,
    scan::{CONDITIONS, bodies}
};
use crate::{
    lexer::{Token, TokenKind},
    query::AuditContext
};

/// Comparison with NULL using `=`, `<>` or `!=`
///
/// Such comparisons evaluate to NULL, so the predicate never matches.
pub struct EqualsNull;

impl Rule for EqualsNull {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "STA.001",
            summary:  "Use IS NULL instead of = NULL",
            severity: Severity::Error,
            category: RuleCategory::Correctness,
            case:     "select c1 from tbl where c1 = null"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let is_eq = |t: &Token| t.is_op("=") || t.is_op("<>") || t.is_op("!=");
        let op = bodies(ctx, CONDITIONS).find_map(|body| {
            body.windows(2).find_map(|w| {
                if is_eq(&w[0]) && w[1].is_word("null") {
                    Some(&w[0])
                } else if w[0].is_word("null") && is_eq(&w[1]) {
                    Some(&w[1])
                } else {
                    None
                }
            })
        })?;
        Some(
            Finding::new(
                &self.info(),
                format!(
                    "`{} NULL` is never true; use IS NULL or IS NOT NULL",
                    op.text
                )
            )
            .at(op.offset)
        )
    }
}

/// Whitespace around the dot of a qualified name
pub struct SpacedQualifier;

impl Rule for SpacedQualifier {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "STA.002",
            summary:  "No spaces around '.' in qualified names",
            severity: Severity::Info,
            category: RuleCategory::Style,
            case:     "select tbl. col from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let dot = ctx.tokens.windows(3).find_map(|w| {
            let qualified = w[1].kind == TokenKind::Dot
                && w[0].is_name()
                && (w[2].is_name() || w[2].is_op("*"));
            let spaced = w[0].end() != w[1].offset || w[1].end() != w[2].offset;
            (qualified && spaced).then_some(&w[1])
        })?;
        Some(
            Finding::new(
                &self.info(),
                "Whitespace around '.' makes `tbl. col` look like two separate names"
            )
            .at(dot.offset)
        )
    }
}

/// Quoted identifier with characters outside `[A-Za-z0-9_$]`
pub struct UnusualIdentifier;

impl Rule for UnusualIdentifier {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "STA.004",
            summary:  "Identifier contains special characters",
            severity: Severity::Info,
            category: RuleCategory::Style,
            case:     "select `col-1` from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let (token, name) = ctx
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::QuotedIdentifier)
            .map(|t| (t, t.unquoted()))
            .find(|(_, name)| {
                name.chars()
                    .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            })?;
        Some(
            Finding::new(
                &self.info(),
                format!(
                    "Identifier '{}' needs quoting everywhere it is used; stick to letters, digits and underscores",
                    name
                )
            )
            .with_detail(name)
            .at(token.offset)
        )
    }
}
