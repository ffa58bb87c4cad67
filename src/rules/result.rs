use super::{
    Finding, Rule, RuleCategory, RuleInfo, Severity,
    scan::{CONDITIONS, bodies, is_arithmetic, is_comparison, top_level}
};
use crate::{
    lexer::{Token, TokenKind},
    query::{AuditContext, ClauseKind, StatementType}
};

fn is_write_with(ctx: &AuditContext, kind: ClauseKind) -> bool {
    matches!(
        ctx.statement_type,
        StatementType::Update | StatementType::Delete
    ) && ctx.has_clause(kind)
}

/// `SQL_CALC_FOUND_ROWS`
pub struct CalcFoundRows;

impl Rule for CalcFoundRows {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "KWR.001",
            summary:  "SQL_CALC_FOUND_ROWS is inefficient",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select sql_calc_found_rows col from tbl where id > 1000 limit 10"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = ctx
            .tokens
            .iter()
            .find(|t| t.is_word("sql_calc_found_rows"))?;
        Some(
            Finding::new(
                &self.info(),
                "SQL_CALC_FOUND_ROWS reads every matching row and is deprecated; run a separate COUNT(*)"
            )
            .at(token.offset)
        )
    }
}

/// `INSERT ... SELECT`
pub struct InsertSelect;

impl Rule for InsertSelect {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "LCK.001",
            summary:  "INSERT INTO ... SELECT takes broad locks",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "insert into tbl select * from t2"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if !matches!(
            ctx.statement_type,
            StatementType::Insert | StatementType::Replace
        ) {
            return None;
        }
        let select = ctx.clause(ClauseKind::Select)?;
        Some(
            Finding::new(
                &self.info(),
                "INSERT ... SELECT locks the rows it reads from the source table"
            )
            .at(ctx.tokens[select.keyword].offset)
        )
    }
}

/// `ON DUPLICATE KEY UPDATE`
pub struct OnDuplicateUpdate;

impl Rule for OnDuplicateUpdate {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "LCK.002",
            summary:  "Be careful with INSERT ... ON DUPLICATE KEY UPDATE",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "insert into tbl (id, c1) values (1, 2) on duplicate key update c1 = 3"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let clause = ctx.clause(ClauseKind::OnDuplicate)?;
        Some(
            Finding::new(
                &self.info(),
                "ON DUPLICATE KEY UPDATE on tables with several unique keys may update an unexpected row"
            )
            .at(ctx.tokens[clause.keyword].offset)
        )
    }
}

/// LIMIT without ORDER BY
pub struct LimitWithoutOrder;

impl Rule for LimitWithoutOrder {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "RES.002",
            summary:  "LIMIT without ORDER BY returns nondeterministic rows",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "select c1 from tbl where c2 = 1 limit 10"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if ctx.statement_type != StatementType::Select || ctx.has_clause(ClauseKind::OrderBy) {
            return None;
        }
        let limit = ctx.clause(ClauseKind::Limit)?;
        Some(
            Finding::new(
                &self.info(),
                "Without ORDER BY the rows returned by LIMIT depend on the execution plan"
            )
            .at(ctx.tokens[limit.keyword].offset)
        )
    }
}

/// UPDATE or DELETE with LIMIT
pub struct WriteWithLimit;

impl Rule for WriteWithLimit {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "RES.003",
            summary:  "UPDATE/DELETE with LIMIT",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "delete from tbl where c1 = 1 limit 10"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if !is_write_with(ctx, ClauseKind::Limit) {
            return None;
        }
        let limit = ctx.clause(ClauseKind::Limit)?;
        Some(
            Finding::new(
                &self.info(),
                format!(
                    "{} with LIMIT is unsafe for statement-based replication",
                    ctx.statement_type
                )
            )
            .at(ctx.tokens[limit.keyword].offset)
        )
    }
}

/// UPDATE or DELETE with ORDER BY
pub struct WriteWithOrder;

impl Rule for WriteWithOrder {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "RES.004",
            summary:  "UPDATE/DELETE with ORDER BY",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "delete from tbl where c1 = 1 order by c2"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if !is_write_with(ctx, ClauseKind::OrderBy) {
            return None;
        }
        let order = ctx.clause(ClauseKind::OrderBy)?;
        Some(
            Finding::new(
                &self.info(),
                format!("{} with ORDER BY sorts rows before writing them", ctx.statement_type)
            )
            .at(ctx.tokens[order.keyword].offset)
        )
    }
}

/// `AND` separating assignments in SET
pub struct AndInSet;

impl Rule for AndInSet {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "RES.005",
            summary:  "AND used between SET assignments",
            severity: Severity::Error,
            category: RuleCategory::Correctness,
            case:     "update tbl set c1 = 1 and c2 = 2 where c3 = 3"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = ctx.clauses_of(ClauseKind::Set).find_map(|c| {
            let body = ctx.body(c);
            top_level(body)
                .into_iter()
                .map(|idx| &body[idx])
                .find(|t| t.is_word("and"))
        })?;
        Some(
            Finding::new(
                &self.info(),
                "`SET c1 = 1 AND c2 = 2` assigns a boolean to c1; separate assignments with commas"
            )
            .at(token.offset)
        )
    }
}

/// Literal comparison found in a predicate, with its outcome.
fn constant_comparison(ctx: &AuditContext) -> Option<(&Token, bool)> {
    bodies(ctx, CONDITIONS).find_map(|body| {
        body.windows(3).enumerate().find_map(|(idx, w)| {
            if w[0].kind != TokenKind::Number
                || w[2].kind != TokenKind::Number
                || !is_comparison(&w[1])
            {
                return None;
            }
            let before = idx.checked_sub(1).and_then(|p| body.get(p));
            let after = body.get(idx + 3);
            if before.is_some_and(|t| is_arithmetic(t) || t.kind == TokenKind::Dot)
                || after.is_some_and(|t| is_arithmetic(t) || t.kind == TokenKind::Dot)
            {
                return None;
            }
            let lhs = w[0].text.parse::<f64>().ok()?;
            let rhs = w[2].text.parse::<f64>().ok()?;
            let outcome = match w[1].text.as_str() {
                "=" | "<=>" => lhs == rhs,
                "!=" | "<>" => lhs != rhs,
                "<" => lhs < rhs,
                ">" => lhs > rhs,
                "<=" => lhs <= rhs,
                ">=" => lhs >= rhs,
                _ => return None
            };
            Some((&w[0], outcome))
        })
    })
}

/// Predicate that can never match
pub struct AlwaysFalse;

impl Rule for AlwaysFalse {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "RES.006",
            summary:  "Comparison is always false",
            severity: Severity::Error,
            category: RuleCategory::Correctness,
            case:     "select c1 from tbl where 1 = 0"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let (token, outcome) = constant_comparison(ctx)?;
        (!outcome).then(|| {
            Finding::new(
                &self.info(),
                "Condition compares two constants and never holds; the statement matches no rows"
            )
            .at(token.offset)
        })
    }
}

/// Predicate that always matches
pub struct AlwaysTrue;

impl Rule for AlwaysTrue {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "RES.007",
            summary:  "Comparison is always true",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "select c1 from tbl where 1 = 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let (token, outcome) = constant_comparison(ctx)?;
        outcome.then(|| {
            Finding::new(
                &self.info(),
                "Condition compares two constants and always holds; remove it"
            )
            .at(token.offset)
        })
    }
}

/// Server-side file import or export
pub struct FileTransfer;

impl Rule for FileTransfer {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "RES.008",
            summary:  "Avoid LOAD DATA and SELECT ... INTO OUTFILE",
            severity: Severity::Warning,
            category: RuleCategory::Security,
            case:     "load data infile '/tmp/data.csv' into table tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = if ctx.starts_with_words(&["load", "data"]) {
            ctx.tokens.first()
        } else {
            ctx.tokens
                .iter()
                .find(|t| t.is_word("outfile") || t.is_word("dumpfile"))
        }?;
        Some(
            Finding::new(
                &self.info(),
                "Reading or writing files on the database host bypasses access control and replication"
            )
            .at(token.offset)
        )
    }
}
