use super::{
    Finding, Rule, RuleCategory, RuleInfo, Severity,
    scan::{call_args, is_call}
};
use crate::{
    lexer::{Token, TokenKind},
    query::{AuditContext, ClauseKind, split_items}
};

/// `*` or `tbl.*` as a whole select item.
fn is_wildcard(item: &[Token]) -> bool {
    match item {
        [star] => star.is_op("*"),
        [.., dot, star] => dot.kind == TokenKind::Dot && star.is_op("*"),
        _ => false
    }
}

/// Select list without a leading `DISTINCT`, plus whether it had one.
fn select_list(body: &[Token]) -> (bool, &[Token]) {
    match body.split_first() {
        Some((first, rest)) if first.is_word("distinct") || first.is_word("distinctrow") => {
            (true, rest)
        }
        _ => (false, body)
    }
}

/// `SELECT *`
pub struct SelectStar;

impl Rule for SelectStar {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "COL.001",
            summary:  "Avoid SELECT *",
            severity: Severity::Warning,
            category: RuleCategory::Performance,
            case:     "select * from tbl where id = 1"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let item = ctx.clauses_of(ClauseKind::Select).find_map(|c| {
            let (_, list) = select_list(ctx.body(c));
            split_items(list).into_iter().find(|item| is_wildcard(item))
        })?;
        let star = item.last()?;
        Some(
            Finding::new(
                &self.info(),
                "SELECT * reads every column and breaks when the table changes; list the columns you need"
            )
            .at(star.offset)
        )
    }
}

/// INSERT or REPLACE without an explicit column list
pub struct InsertWithoutColumns;

impl Rule for InsertWithoutColumns {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "COL.002",
            summary:  "INSERT without column list",
            severity: Severity::Info,
            category: RuleCategory::Style,
            case:     "insert into tbl values (1, 'name')"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if !ctx.starts_with_words(&["insert"]) && !ctx.starts_with_words(&["replace"]) {
            return None;
        }
        if !ctx.has_clause(ClauseKind::Values) && !ctx.has_clause(ClauseKind::Select) {
            return None;
        }
        let target = ctx
            .clause(ClauseKind::Into)
            .or_else(|| ctx.clause(ClauseKind::Head))?;
        let has_columns = ctx
            .body(target)
            .iter()
            .any(|t| t.kind == TokenKind::LParen);
        if has_columns {
            return None;
        }
        Some(
            Finding::new(
                &self.info(),
                "INSERT without a column list breaks when the table definition changes"
            )
            .at(ctx.tokens[target.keyword].offset)
        )
    }
}

/// DISTINCT over too many columns
pub struct WideDistinct {
    pub max_columns: usize
}

impl Rule for WideDistinct {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "DIS.001",
            summary:  "Too many columns in DISTINCT",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select distinct c1, c2, c3, c4, c5, c6 from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        ctx.clauses_of(ClauseKind::Select).find_map(|c| {
            let (distinct, list) = select_list(ctx.body(c));
            let columns = split_items(list).len();
            (distinct && columns > self.max_columns).then(|| {
                Finding::new(
                    &self.info(),
                    format!(
                        "DISTINCT over {} columns (limit {}) builds a large temporary table",
                        columns, self.max_columns
                    )
                )
                .at(ctx.tokens[c.keyword].offset)
            })
        })
    }
}

/// `COUNT(DISTINCT a, b)`
pub struct CountDistinctColumns;

impl Rule for CountDistinctColumns {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "DIS.002",
            summary:  "COUNT(DISTINCT) over several columns",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "select count(distinct c1, c2) from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let tokens = &ctx.tokens;
        let idx = (0..tokens.len()).find(|&idx| {
            is_call(tokens, idx, "count")
                && call_args(tokens, idx).is_some_and(|args| match args.split_first() {
                    Some((first, rest)) if first.is_word("distinct") => {
                        split_items(rest).len() > 1
                    }
                    _ => false
                })
        })?;
        Some(
            Finding::new(
                &self.info(),
                "COUNT(DISTINCT a, b) skips rows where any column is NULL, which may not be what you expect"
            )
            .at(tokens[idx].offset)
        )
    }
}

/// `DISTINCT *`
pub struct DistinctStar;

impl Rule for DistinctStar {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "DIS.003",
            summary:  "DISTINCT * is redundant on tables with a primary key",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select distinct * from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        ctx.clauses_of(ClauseKind::Select).find_map(|c| {
            let (distinct, list) = select_list(ctx.body(c));
            let star = split_items(list).into_iter().any(is_wildcard);
            (distinct && star).then(|| {
                Finding::new(
                    &self.info(),
                    "Rows already differ by primary key; DISTINCT * only adds a sort"
                )
                .at(ctx.tokens[c.keyword].offset)
            })
        })
    }
}
