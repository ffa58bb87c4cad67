use super::{
    Finding, Rule, RuleCategory, RuleInfo, Severity,
    scan::{CONDITIONS, bodies, matching_paren}
};
use crate::{
    lexer::Token,
    query::{AuditContext, split_items}
};

/// First `LIKE` pattern in the predicates matching `pred`.
fn like_pattern<'a>(
    ctx: &'a AuditContext,
    pred: impl Fn(&str) -> bool
) -> Option<&'a Token> {
    bodies(ctx, CONDITIONS).find_map(|body| {
        body.windows(2)
            .filter(|w| w[0].is_word("like"))
            .map(|w| &w[1])
            .find(|t| t.string_value().is_some_and(&pred))
    })
}

/// `LIKE` pattern starting with a wildcard
///
/// A leading `%` or `_` prevents index range scans.
pub struct LeadingWildcard;

impl Rule for LeadingWildcard {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ARG.001",
            summary:  "Avoid LIKE patterns with a leading wildcard",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select c1, c2, c3 from tbl where name like '%foo'"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let pattern = like_pattern(ctx, |v| v.starts_with(['%', '_']))?;
        Some(
            Finding::new(
                &self.info(),
                "LIKE pattern starts with a wildcard and cannot use an index; consider a full-text index"
            )
            .with_detail(pattern.text.as_str())
            .at(pattern.offset)
        )
    }
}

/// `LIKE` without any wildcard
pub struct LikeWithoutWildcard;

impl Rule for LikeWithoutWildcard {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ARG.002",
            summary:  "LIKE without wildcard",
            severity: Severity::Info,
            category: RuleCategory::Style,
            case:     "select c1, c2, c3 from tbl where name like 'foo'"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let pattern = like_pattern(ctx, |v| !v.contains(['%', '_']))?;
        Some(
            Finding::new(
                &self.info(),
                "LIKE pattern has no wildcard; use `=` for an exact match"
            )
            .with_detail(pattern.text.as_str())
            .at(pattern.offset)
        )
    }
}

/// `IN` list longer than the configured maximum
pub struct LongInList {
    pub max_items: usize
}

impl Rule for LongInList {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ARG.005",
            summary:  "IN list is too long",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select id from tbl where id in (1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11)"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let tokens = &ctx.tokens;
        for (idx, token) in tokens.iter().enumerate() {
            if !token.is_word("in")
                || tokens
                    .get(idx + 2)
                    .is_some_and(|t| t.is_word("select") || t.is_word("with"))
            {
                continue;
            }
            let Some(close) = matching_paren(tokens, idx + 1) else {
                continue;
            };
            let items = split_items(&tokens[idx + 2..close]).len();
            if items > self.max_items {
                return Some(
                    Finding::new(
                        &self.info(),
                        format!(
                            "IN list has {} items (limit {}); large lists make the optimizer fall back to full scans",
                            items, self.max_items
                        )
                    )
                    .at(token.offset)
                );
            }
        }
        None
    }
}

/// `IS NULL` / `IS NOT NULL` in a predicate
pub struct IsNullPredicate;

impl Rule for IsNullPredicate {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ARG.006",
            summary:  "Avoid NULL checks in WHERE",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select id from tbl where num is null"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = bodies(ctx, CONDITIONS).find_map(|body| {
            body.iter().enumerate().find_map(|(idx, t)| {
                let null_at = match body.get(idx + 1) {
                    Some(n) if n.is_word("not") => idx + 2,
                    _ => idx + 1
                };
                let is_null = t.is_word("is") && body.get(null_at).is_some_and(|n| n.is_word("null"));
                is_null.then_some(t)
            })
        })?;
        Some(
            Finding::new(
                &self.info(),
                "IS NULL checks often skip indexes; prefer NOT NULL columns with defaults"
            )
            .at(token.offset)
        )
    }
}

/// Regular expression matching
pub struct RegexpMatch;

impl Rule for RegexpMatch {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ARG.007",
            summary:  "Avoid regular expression matching",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1, c2 from tbl where name regexp 'foo'"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = ctx
            .tokens
            .iter()
            .find(|t| t.is_word("regexp") || t.is_word("rlike"))?;
        Some(
            Finding::new(
                &self.info(),
                "REGEXP cannot use indexes; consider LIKE prefixes or full-text search"
            )
            .at(token.offset)
        )
    }
}

/// OR of equalities on the same column
pub struct OrInsteadOfIn;

impl Rule for OrInsteadOfIn {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ARG.008",
            summary:  "Use IN instead of OR on the same column",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1 from tbl where col = 1 or col = 2"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let col = ctx.or_eq_cols.first()?;
        Some(
            Finding::new(
                &self.info(),
                format!("Column '{}' is compared with OR several times; rewrite as IN (...)", col)
            )
            .with_detail(col.as_str())
        )
    }
}

/// String literal with leading or trailing spaces
pub struct PaddedString;

impl Rule for PaddedString {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ARG.009",
            summary:  "String literal contains leading or trailing spaces",
            severity: Severity::Info,
            category: RuleCategory::Correctness,
            case:     "select c1 from tbl where name = ' foo'"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = ctx.tokens.iter().find(|t| {
            t.string_value().is_some_and(|v| {
                let trimmed = v.trim();
                !trimmed.is_empty() && trimmed.len() != v.len()
            })
        })?;
        Some(
            Finding::new(
                &self.info(),
                "Quoted value has surrounding spaces; trailing spaces are ignored by comparisons, leading ones are not"
            )
            .with_detail(token.text.as_str())
            .at(token.offset)
        )
    }
}

/// Negative predicates
pub struct NegativePredicate;

impl Rule for NegativePredicate {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ARG.011",
            summary:  "Avoid negative predicates",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select id from tbl where id != 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = bodies(ctx, CONDITIONS).find_map(|body| {
            body.iter().enumerate().find_map(|(idx, t)| {
                let negated = t.is_op("!=")
                    || t.is_op("<>")
                    || t.is_word("not")
                        && body
                            .get(idx + 1)
                            .is_some_and(|n| n.is_word("in") || n.is_word("like"));
                negated.then_some(t)
            })
        })?;
        Some(
            Finding::new(
                &self.info(),
                "Negative predicates (!=, <>, NOT IN, NOT LIKE) prevent index range scans"
            )
            .with_detail(token.text.as_str())
            .at(token.offset)
        )
    }
}
