use super::{Finding, Rule, RuleCategory, RuleInfo, Severity};
use crate::{
    lexer::TokenKind,
    query::{AuditContext, ClauseKind}
};

/// `IN (SELECT ...)`
pub struct InSubquery;

impl Rule for InSubquery {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SUB.001",
            summary:  "Rewrite IN (subquery) as a JOIN",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1 from t1 where id in (select id from t2)"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = ctx.tokens.windows(3).find_map(|w| {
            let subquery = w[0].is_word("in")
                && w[1].kind == TokenKind::LParen
                && (w[2].is_word("select") || w[2].is_word("with"));
            subquery.then_some(&w[0])
        })?;
        Some(
            Finding::new(
                &self.info(),
                "IN (SELECT ...) may run the subquery per row on older servers; a JOIN is usually faster"
            )
            .at(token.offset)
        )
    }
}

/// UNION without ALL
pub struct UnionWithoutAll;

impl Rule for UnionWithoutAll {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SUB.002",
            summary:  "Prefer UNION ALL over UNION",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1 from t1 union select c1 from t2"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let union = ctx.clauses_of(ClauseKind::Union).find(|c| {
            ctx.tokens[c.keyword].is_word("union")
                && !ctx.body(c).first().is_some_and(|t| t.is_word("all"))
        })?;
        Some(
            Finding::new(
                &self.info(),
                "UNION removes duplicates with an extra sort; use UNION ALL when rows are already distinct"
            )
            .at(ctx.tokens[union.keyword].offset)
        )
    }
}

/// Subqueries nested too deep
pub struct DeepSubquery {
    pub max_depth: usize
}

impl Rule for DeepSubquery {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SUB.004",
            summary:  "Subquery nesting is too deep",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select c1 from t1 where id in (select id from t2 where id in (select id from t3 where id in (select id from t4 where id in (select id from t5))))"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let depth = ctx.subquery_depth();
        (depth > self.max_depth).then(|| {
            Finding::new(
                &self.info(),
                format!(
                    "Subqueries are nested {} levels deep (limit {}); flatten them into joins",
                    depth, self.max_depth
                )
            )
        })
    }
}

/// LIMIT inside a subquery
pub struct LimitInSubquery;

impl Rule for LimitInSubquery {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SUB.005",
            summary:  "LIMIT inside a subquery",
            severity: Severity::Error,
            category: RuleCategory::Correctness,
            case:     "select c1 from tbl where c2 in (select c2 from t2 limit 10)"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = ctx
            .tokens
            .iter()
            .zip(&ctx.nesting)
            .find_map(|(t, &level)| (level > 0 && t.is_word("limit")).then_some(t))?;
        Some(
            Finding::new(
                &self.info(),
                "MySQL does not support LIMIT in IN/ALL/ANY/SOME subqueries"
            )
            .at(token.offset)
        )
    }
}
