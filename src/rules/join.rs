use indexmap::IndexSet;

use super::{Finding, Rule, RuleCategory, RuleInfo, Severity, scan::top_level};
use crate::{
    lexer::{Token, TokenKind},
    query::{AuditContext, ClauseKind, StatementType, TableRef}
};

/// First depth-0 `JOIN` keyword in the body.
fn top_level_join(body: &[Token]) -> Option<&Token> {
    top_level(body)
        .into_iter()
        .map(|idx| &body[idx])
        .find(|t| t.is_word("join") || t.is_word("straight_join"))
}

/// Tables that are not references to a CTE of the same statement.
fn base_tables(ctx: &AuditContext) -> impl Iterator<Item = &TableRef> {
    ctx.tables.iter().filter(|t| {
        t.database.is_some()
            || !ctx
                .cte_names
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&t.name))
    })
}

/// Comma joins mixed with `JOIN`
pub struct MixedJoinSyntax;

impl Rule for MixedJoinSyntax {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "JOI.001",
            summary:  "Do not mix comma joins with JOIN",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "select a from t1, t2 join t3 on t2.id = t3.id"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        ctx.clauses_of(ClauseKind::From).find_map(|c| {
            let body = ctx.body(c);
            let comma = top_level(body)
                .into_iter()
                .any(|idx| body[idx].kind == TokenKind::Comma);
            let join = top_level_join(body)?;
            comma.then(|| {
                Finding::new(
                    &self.info(),
                    "Comma joins bind weaker than JOIN, so ON conditions may reference unknown columns"
                )
                .at(join.offset)
            })
        })
    }
}

/// Same table joined more than once
pub struct SelfJoin;

impl Rule for SelfJoin {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "JOI.002",
            summary:  "Same table joined more than once",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select t1.id from tbl t1 join tbl t2 on t1.id = t2.pid"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let mut seen = IndexSet::new();
        let table = base_tables(ctx).find(|t| {
            let key = (
                t.database.as_deref().map(str::to_ascii_lowercase),
                t.name.to_ascii_lowercase()
            );
            !seen.insert(key)
        })?;
        Some(
            Finding::new(
                &self.info(),
                format!(
                    "Table '{}' appears more than once; a single pass may be enough",
                    table.name
                )
            )
            .with_detail(table.name.as_str())
        )
    }
}

/// Too many tables in one statement
pub struct TooManyJoins {
    pub max_tables: usize
}

impl Rule for TooManyJoins {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "JOI.005",
            summary:  "Too many tables joined",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select t1.id from t1 join t2 on t1.id = t2.id join t3 on t1.id = t3.id join t4 on t1.id = t4.id join t5 on t1.id = t5.id join t6 on t1.id = t6.id"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let count = base_tables(ctx).count();
        (count > self.max_tables).then(|| {
            Finding::new(
                &self.info(),
                format!(
                    "Statement references {} tables (limit {}); the optimizer may pick a poor join order",
                    count, self.max_tables
                )
            )
        })
    }
}

/// Multi-table UPDATE or DELETE
pub struct MultiTableWrite;

impl Rule for MultiTableWrite {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "JOI.007",
            summary:  "Avoid multi-table UPDATE and DELETE",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "update t1 join t2 on t1.id = t2.id set t1.c1 = t2.c1 where t2.c2 = 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if !matches!(
            ctx.statement_type,
            StatementType::Update | StatementType::Delete
        ) {
            return None;
        }
        let join = [ClauseKind::Head, ClauseKind::From]
            .into_iter()
            .flat_map(|kind| ctx.clauses_of(kind))
            .find_map(|c| top_level_join(ctx.body(c)));
        if join.is_none() && base_tables(ctx).count() < 2 {
            return None;
        }
        let finding = Finding::new(
            &self.info(),
            format!(
                "Multi-table {} locks rows in every joined table; update one table at a time",
                ctx.statement_type
            )
        );
        Some(match join {
            Some(token) => finding.at(token.offset),
            None => finding
        })
    }
}

/// Tables from more than one database
pub struct CrossDatabase;

impl Rule for CrossDatabase {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "JOI.008",
            summary:  "Avoid cross-database joins",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "select t1.id from db1.t1 join db2.t2 on t1.id = t2.id"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let databases: IndexSet<String> = base_tables(ctx)
            .filter_map(|t| t.database.as_deref().or(ctx.schema.as_deref()))
            .map(str::to_ascii_lowercase)
            .collect();
        if databases.len() < 2 {
            return None;
        }
        let names: Vec<&str> = databases.iter().map(String::as_str).collect();
        Some(
            Finding::new(
                &self.info(),
                "Statement spans several databases; keep joined tables in one schema"
            )
            .with_detail(names.join(", "))
        )
    }
}
