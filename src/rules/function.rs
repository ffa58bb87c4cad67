use super::{
    Finding, Rule, RuleCategory, RuleInfo, Severity,
    scan::{call_args, is_call}
};
use crate::{
    lexer::{Token, TokenKind},
    query::{AuditContext, ClauseKind}
};

/// Functions that turn a NULL aggregate into a value.
const NULL_GUARDS: &[&str] = &["ifnull", "coalesce", "isnull", "nvl"];

/// Function applied to a column in WHERE
///
/// `where upper(name) = 'FOO'` evaluates the function for every row and
/// cannot use an index on `name`.
pub struct FunctionOnColumn;

impl Rule for FunctionOnColumn {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "FUN.001",
            summary:  "Avoid functions on indexed columns in WHERE",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select id from tbl where upper(name) = 'FOO'"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        for clause in ctx.clauses_of(ClauseKind::Where) {
            let body = ctx.body(clause);
            for (idx, token) in body.iter().enumerate() {
                if token.kind != TokenKind::Identifier
                    || !body
                        .get(idx + 1)
                        .is_some_and(|t| t.kind == TokenKind::LParen)
                {
                    continue;
                }
                let on_column = call_args(body, idx)
                    .is_some_and(|args| args.iter().any(Token::is_name));
                if on_column {
                    return Some(
                        Finding::new(
                            &self.info(),
                            format!(
                                "{}() is applied to a column in WHERE, so its index cannot be used",
                                token.text.to_ascii_uppercase()
                            )
                        )
                        .with_detail(token.text.as_str())
                        .at(token.offset)
                    );
                }
            }
        }
        None
    }
}

/// `||` used for concatenation
pub struct PipeConcat;

impl Rule for PipeConcat {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "FUN.003",
            summary:  "Use CONCAT() instead of ||",
            severity: Severity::Info,
            category: RuleCategory::Correctness,
            case:     "select c1 || c2 from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = ctx.tokens.iter().find(|t| t.is_op("||"))?;
        Some(
            Finding::new(
                &self.info(),
                "|| means OR unless PIPES_AS_CONCAT is set; use CONCAT() to join strings"
            )
            .at(token.offset)
        )
    }
}

/// `SYSDATE()`
pub struct Sysdate;

impl Rule for Sysdate {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "FUN.004",
            summary:  "Avoid SYSDATE()",
            severity: Severity::Info,
            category: RuleCategory::Correctness,
            case:     "select sysdate()"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let tokens = &ctx.tokens;
        let idx = (0..tokens.len()).find(|&idx| is_call(tokens, idx, "sysdate"))?;
        Some(
            Finding::new(
                &self.info(),
                "SYSDATE() returns the execution time and differs across replicas; use NOW()"
            )
            .at(tokens[idx].offset)
        )
    }
}

/// `COUNT(col)` or `COUNT(1)` instead of `COUNT(*)`
pub struct CountColumn;

impl Rule for CountColumn {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "FUN.005",
            summary:  "Use COUNT(*) to count rows",
            severity: Severity::Info,
            category: RuleCategory::Correctness,
            case:     "select count(col) from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let tokens = &ctx.tokens;
        let idx = (0..tokens.len()).find(|&idx| {
            is_call(tokens, idx, "count")
                && call_args(tokens, idx).is_some_and(|args| match args {
                    [] => false,
                    [star] if star.is_op("*") => false,
                    [first, ..] => !first.is_word("distinct")
                })
        })?;
        Some(
            Finding::new(
                &self.info(),
                "COUNT(col) skips NULL values and COUNT(const) hides intent; use COUNT(*) to count rows"
            )
            .at(tokens[idx].offset)
        )
    }
}

/// `SUM(col)` returning NULL on empty input
pub struct SumMayBeNull;

impl Rule for SumMayBeNull {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "FUN.006",
            summary:  "SUM() may return NULL",
            severity: Severity::Info,
            category: RuleCategory::Correctness,
            case:     "select sum(col) from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let tokens = &ctx.tokens;
        // Name of the function owning each open parenthesis.
        let mut calls: Vec<&str> = Vec::new();
        for (idx, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::LParen => {
                    let owner = idx
                        .checked_sub(1)
                        .map(|p| &tokens[p])
                        .filter(|p| p.kind == TokenKind::Identifier)
                        .map_or("", |p| p.text.as_str());
                    calls.push(owner);
                }
                TokenKind::RParen => {
                    calls.pop();
                }
                _ if is_call(tokens, idx, "sum") => {
                    let guarded = calls
                        .iter()
                        .any(|c| NULL_GUARDS.iter().any(|g| g.eq_ignore_ascii_case(c)));
                    if !guarded {
                        return Some(
                            Finding::new(
                                &self.info(),
                                "SUM() returns NULL when no rows match; wrap it in IFNULL(SUM(col), 0)"
                            )
                            .at(token.offset)
                        );
                    }
                }
                _ => {}
            }
        }
        None
    }
}
