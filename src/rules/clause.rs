use super::{
    Finding, Rule, RuleCategory, RuleInfo, Severity,
    scan::{is_call, is_column_ref, is_constant, strip_direction}
};
use crate::{
    lexer::{Token, TokenKind},
    query::{AuditContext, ClauseKind, StatementType}
};

/// SELECT reading a table without any filter
pub struct SelectWithoutWhere;

impl Rule for SelectWithoutWhere {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.001",
            summary:  "SELECT without WHERE",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select id from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if ctx.statement_type != StatementType::Select || ctx.has_clause(ClauseKind::Where) {
            return None;
        }
        let from = ctx.clause(ClauseKind::From)?;
        if matches!(ctx.body(from), [t] if t.is_word("dual")) {
            return None;
        }
        Some(
            Finding::new(
                &self.info(),
                "SELECT has no WHERE condition and reads the whole table"
            )
            .at(ctx.tokens[from.keyword].offset)
        )
    }
}

/// `ORDER BY RAND()`
pub struct OrderByRand;

impl Rule for OrderByRand {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.002",
            summary:  "Avoid ORDER BY RAND()",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select name from tbl where id < 1000 order by rand(1)"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let clause = ctx
            .clauses_of(ClauseKind::OrderBy)
            .find(|c| c.body.clone().any(|idx| is_call(&ctx.tokens, idx, "rand")))?;
        Some(
            Finding::new(
                &self.info(),
                "ORDER BY RAND() sorts every row; pick random keys in application code instead"
            )
            .at(ctx.tokens[clause.keyword].offset)
        )
    }
}

/// `LIMIT` with a non-zero offset
pub struct OffsetPagination;

impl Rule for OffsetPagination {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.003",
            summary:  "Avoid LIMIT with OFFSET pagination",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1, c2 from tbl where name = 'xx' order by c1 limit 10 offset 100"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let clause = ctx.clauses_of(ClauseKind::Limit).find(|c| {
            let body = ctx.body(c);
            let offset = match body.iter().position(|t| t.is_word("offset")) {
                Some(at) => body.get(at + 1),
                // MySQL `LIMIT offset, count`
                None if body.iter().any(|t| t.kind == TokenKind::Comma) => body.first(),
                None => None
            };
            offset.is_some_and(|t| !is_zero(t))
        })?;
        Some(
            Finding::new(
                &self.info(),
                "OFFSET pagination scans and discards every skipped row; use keyset pagination"
            )
            .at(ctx.tokens[clause.keyword].offset)
        )
    }
}

fn is_zero(token: &Token) -> bool {
    token.kind == TokenKind::Number && token.text.trim_start_matches('0').is_empty()
}

/// `GROUP BY` a constant
pub struct GroupByConstant;

impl Rule for GroupByConstant {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.004",
            summary:  "Avoid GROUP BY a constant",
            severity: Severity::Warning,
            category: RuleCategory::Style,
            case:     "select col1, col2 from tbl where col1 = 1 group by 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let item = ctx
            .clause_items(ClauseKind::GroupBy)
            .into_iter()
            .find(|item| is_constant(item))?;
        Some(
            Finding::new(
                &self.info(),
                "GROUP BY a position number breaks silently when the select list changes"
            )
            .with_detail(item[0].text.as_str())
            .at(item[0].offset)
        )
    }
}

/// `ORDER BY` a constant
pub struct OrderByConstant;

impl Rule for OrderByConstant {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.005",
            summary:  "Avoid ORDER BY a constant",
            severity: Severity::Warning,
            category: RuleCategory::Style,
            case:     "select id from tbl where id < 1000 order by 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let item = ctx
            .clause_items(ClauseKind::OrderBy)
            .into_iter()
            .find(|item| is_constant(strip_direction(item)))?;
        Some(
            Finding::new(
                &self.info(),
                "ORDER BY a position number is meaningless when the select list changes"
            )
            .with_detail(item[0].text.as_str())
            .at(item[0].offset)
        )
    }
}

/// `ORDER BY` mixing ascending and descending columns
pub struct MixedOrderDirection;

impl Rule for MixedOrderDirection {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.007",
            summary:  "ORDER BY mixes ASC and DESC",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select c1, c2, c3 from tbl where c1 = 'foo' order by c2 desc, c3 asc"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let items = ctx.clause_items(ClauseKind::OrderBy);
        let descending = items
            .iter()
            .filter(|item| item.last().is_some_and(|t| t.is_word("desc")))
            .count();
        if descending == 0 || descending == items.len() {
            return None;
        }
        let clause = ctx.clause(ClauseKind::OrderBy)?;
        Some(
            Finding::new(
                &self.info(),
                "Sorting columns in different directions cannot be served by one index"
            )
            .at(ctx.tokens[clause.keyword].offset)
        )
    }
}

/// `GROUP BY` without `ORDER BY`
pub struct GroupByWithoutOrder;

impl Rule for GroupByWithoutOrder {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.008",
            summary:  "Specify ORDER BY with GROUP BY",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1, count(*) from tbl group by c1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if ctx.has_clause(ClauseKind::OrderBy) {
            return None;
        }
        let clause = ctx.clause(ClauseKind::GroupBy)?;
        Some(
            Finding::new(
                &self.info(),
                "Older MySQL versions sort GROUP BY results implicitly; add ORDER BY NULL to skip the sort or an explicit ORDER BY"
            )
            .at(ctx.tokens[clause.keyword].offset)
        )
    }
}

fn expression_item<'a>(ctx: &'a AuditContext, kind: ClauseKind) -> Option<&'a [Token]> {
    ctx.clause_items(kind).into_iter().find(|item| {
        let item = strip_direction(strip_rollup(item));
        !item.is_empty() && !is_column_ref(item) && !is_constant(item)
    })
}

fn strip_rollup(item: &[Token]) -> &[Token] {
    match item {
        [rest @ .., with, rollup] if with.is_word("with") && rollup.is_word("rollup") => rest,
        _ => item
    }
}

fn render(item: &[Token]) -> String {
    item.iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `ORDER BY` an expression
pub struct OrderByExpression;

impl Rule for OrderByExpression {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.009",
            summary:  "ORDER BY an expression needs a temporary table",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select description from film where title = 'ABC' order by substr(description, 1, 2)"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let item = expression_item(ctx, ClauseKind::OrderBy)?;
        Some(
            Finding::new(
                &self.info(),
                "Sorting by an expression or function result prevents index ordering"
            )
            .with_detail(render(item))
            .at(item[0].offset)
        )
    }
}

/// `GROUP BY` an expression
pub struct GroupByExpression;

impl Rule for GroupByExpression {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.010",
            summary:  "GROUP BY an expression needs a temporary table",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select col1 + 1, count(*) from tbl group by col1 + 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let item = expression_item(ctx, ClauseKind::GroupBy)?;
        Some(
            Finding::new(
                &self.info(),
                "Grouping by an expression or function result prevents index grouping"
            )
            .with_detail(render(item))
            .at(item[0].offset)
        )
    }
}

/// `HAVING` clause
pub struct HavingClause;

impl Rule for HavingClause {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.013",
            summary:  "Avoid HAVING",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1, count(*) as cnt from tbl group by c1 having cnt > 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let clause = ctx.clause(ClauseKind::Having)?;
        Some(
            Finding::new(
                &self.info(),
                "HAVING filters after grouping; move conditions on plain columns into WHERE"
            )
            .at(ctx.tokens[clause.keyword].offset)
        )
    }
}

/// DELETE without WHERE
pub struct DeleteWithoutWhere;

impl Rule for DeleteWithoutWhere {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.014",
            summary:  "Use TRUNCATE instead of DELETE without WHERE",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "delete from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if ctx.statement_type != StatementType::Delete || ctx.has_clause(ClauseKind::Where) {
            return None;
        }
        Some(Finding::new(
            &self.info(),
            "DELETE without WHERE removes every row one by one; TRUNCATE is much faster"
        ))
    }
}

/// UPDATE without WHERE
pub struct UpdateWithoutWhere;

impl Rule for UpdateWithoutWhere {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "CLA.015",
            summary:  "UPDATE without WHERE",
            severity: Severity::Error,
            category: RuleCategory::Security,
            case:     "update tbl set col = 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if ctx.statement_type != StatementType::Update || ctx.has_clause(ClauseKind::Where) {
            return None;
        }
        Some(Finding::new(
            &self.info(),
            "UPDATE without WHERE changes every row of the table"
        ))
    }
}

/// `GROUP BY` a column already pinned to one value by `WHERE`
pub struct GroupByPinnedColumn;

impl Rule for GroupByPinnedColumn {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "GRP.001",
            summary:  "GROUP BY on a column compared with = in WHERE",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1, avg(c2) from tbl where c1 = 1 group by c1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let col = ctx.group_cols.iter().find(|g| {
            ctx.eq_literal_cols
                .iter()
                .any(|e| e.eq_ignore_ascii_case(g))
        })?;
        Some(
            Finding::new(
                &self.info(),
                format!(
                    "Column '{}' has a single value after WHERE; grouping by it is redundant",
                    col
                )
            )
            .with_detail(col.as_str())
        )
    }
}
