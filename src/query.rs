//! Audit-context builder: tokens, clauses and the parsed statement tree.

mod clause;
mod extract;
mod types;

use std::{fmt, str::FromStr};

use extract::{ExtractionContext, extract_columns_from_expr, extract_from_set_expr};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use sqlparser::{
    ast::{Expr, FromTable, LimitClause, OrderByKind, SelectItem, SetExpr, Statement, Value},
    dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect},
    parser::Parser
};
use tracing::debug;
pub use types::{
    AuditContext, Clause, ClauseKind, ColumnVec, StatementType, TableRef, split_items
};

use crate::{
    error::EngineError,
    lexer::{LexError, Token, TokenKind, check_balanced, tokenize}
};

/// SQL dialect for parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SqlDialect {
    Generic,
    #[default]
    MySQL,
    PostgreSQL,
    SQLite
}

impl SqlDialect {
    /// Convert to sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {})
        }
    }
}

impl FromStr for SqlDialect {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "mysql" => Ok(Self::MySQL),
            "postgresql" | "postgres" => Ok(Self::PostgreSQL),
            "sqlite" => Ok(Self::SQLite),
            other => Err(EngineError::configuration(format!("unknown SQL dialect '{other}'")))
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::MySQL => write!(f, "mysql"),
            Self::PostgreSQL => write!(f, "postgresql"),
            Self::SQLite => write!(f, "sqlite")
        }
    }
}

/// Build the audit context of one comment-stripped statement.
///
/// Unterminated quotes or comments, unbalanced parentheses, several
/// statements, DML the parser rejects and `SELECT *` without `FROM` are
/// syntax errors. Other statements the parser does not know are returned
/// as [`StatementType::Unknown`] with tokens and clauses only.
///
/// # Arguments
///
/// * `sql` - A single statement, comment-stripped; a trailing `;` is allowed
/// * `schema` - Current database; cross-database rules compare against it
/// * `dialect` - sqlparser dialect used for the tree
///
/// # Errors
///
/// [`EngineError::Syntax`] with the line and column of the failure when
/// known.
///
/// # Example
///
/// ```
/// use sql_advisor::query::{ClauseKind, SqlDialect, StatementType, parse};
///
/// let ctx = parse("select id from users where id = 1", None, SqlDialect::MySQL).unwrap();
/// assert_eq!(ctx.statement_type, StatementType::Select);
/// assert!(ctx.has_clause(ClauseKind::Where));
/// assert_eq!(ctx.eq_literal_cols.as_slice(), ["id"]);
/// ```
pub fn parse(
    sql: &str,
    schema: Option<&str>,
    dialect: SqlDialect
) -> Result<AuditContext, EngineError> {
    let lex_error = |e: LexError| EngineError::syntax_at(e.to_string(), sql, e.offset());
    let tokens = tokenize(sql).map_err(lex_error)?;
    check_balanced(&tokens).map_err(lex_error)?;
    let tokens: Vec<Token> = tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Hint)
        .collect();

    let Some(last) = tokens.iter().rposition(|t| t.kind != TokenKind::Semicolon) else {
        return Err(EngineError::syntax("empty statement"));
    };
    if let Some(sep) = tokens[..last]
        .iter()
        .find(|t| t.kind == TokenKind::Semicolon)
    {
        return Err(EngineError::syntax_at(
            "multiple statements in one request",
            sql,
            sep.offset
        ));
    }

    let detected = StatementType::detect(&tokens);
    let parser_dialect = dialect.into_parser_dialect();
    let statement = match Parser::parse_sql(parser_dialect.as_ref(), sql) {
        Ok(mut statements) if statements.len() <= 1 => statements.pop(),
        Ok(_) => return Err(EngineError::syntax("multiple statements in one request")),
        Err(e) if detected.is_dml() => return Err(EngineError::syntax(e.to_string())),
        Err(e) => {
            debug!(error = %e, "statement not recognised by the parser");
            None
        }
    };
    let statement_type = match &statement {
        Some(Statement::Query(_)) => StatementType::Select,
        Some(_) => detected,
        None => StatementType::Unknown
    };

    let mut ctx = AuditContext::new(sql, statement_type, tokens);
    ctx.schema = schema.filter(|s| !s.is_empty()).map(Into::into);
    ctx.nesting = clause::nesting(&ctx.tokens);
    ctx.clauses = clause::segment(&ctx.tokens, detected);
    if let Some(stmt) = &statement {
        extract_statement(stmt, &mut ctx)?;
    }
    ctx.statement = statement;
    Ok(ctx)
}

fn extract_statement(stmt: &Statement, ctx: &mut AuditContext) -> Result<(), EngineError> {
    let mut ext = ExtractionContext::default();
    match stmt {
        Statement::Query(query) => {
            reject_bare_wildcard(query)?;
            extract_query(query, ctx, &mut ext);
        }
        Statement::Insert(insert) => {
            ext.tables
                .push(TableRef::parse(&insert.table.to_string(), None));
            if let Some(source) = &insert.source {
                extract_query(source, ctx, &mut ext);
            }
        }
        Statement::Update(update) => {
            extract::extract_from_table_with_joins(&update.table, &mut ext);
            if let Some(sel) = &update.selection {
                extract::extract_selection(sel, &mut ext);
            }
        }
        Statement::Delete(delete) => {
            if let FromTable::WithFromKeyword(items) | FromTable::WithoutKeyword(items) =
                &delete.from
            {
                for item in items {
                    extract::extract_from_table_with_joins(item, &mut ext);
                }
            }
            if let Some(sel) = &delete.selection {
                extract::extract_selection(sel, &mut ext);
            }
        }
        Statement::Truncate(truncate) => {
            for table in &truncate.table_names {
                ext.tables
                    .push(TableRef::parse(&table.name.to_string(), None));
            }
        }
        Statement::Drop {
            names, ..
        } => {
            for name in names {
                ext.tables.push(TableRef::parse(&name.to_string(), None));
            }
        }
        _ => {}
    }
    ext.apply(ctx);
    Ok(())
}

fn extract_query(
    query: &sqlparser::ast::Query,
    ctx: &mut AuditContext,
    ext: &mut ExtractionContext
) {
    for cte in query.with.iter().flat_map(|w| &w.cte_tables) {
        ctx.cte_names.push(cte.alias.name.value.as_str().into());
    }
    if let Some(limit_clause) = &query.limit_clause {
        match limit_clause {
            LimitClause::LimitOffset {
                limit,
                offset,
                ..
            } => {
                ctx.limit = limit.as_ref().and_then(number);
                ctx.offset = offset.as_ref().and_then(|o| number(&o.value));
            }
            LimitClause::OffsetCommaLimit {
                offset,
                limit,
                ..
            } => {
                ctx.limit = number(limit);
                ctx.offset = number(offset);
            }
        }
    }
    if let Some(order_by) = &query.order_by
        && let OrderByKind::Expressions(exprs) = &order_by.kind
    {
        let mut cols = IndexSet::new();
        for expr in exprs {
            extract_columns_from_expr(&expr.expr, &mut cols);
        }
        ctx.order_cols = cols.into_iter().collect();
    }
    extract_from_set_expr(&query.body, ext);
}

fn number(expr: &Expr) -> Option<u64> {
    match expr {
        Expr::Value(val) => match &val.value {
            Value::Number(n, _) => n.parse().ok(),
            _ => None
        },
        _ => None
    }
}

/// `SELECT *` needs a table to expand against.
fn reject_bare_wildcard(query: &sqlparser::ast::Query) -> Result<(), EngineError> {
    if let SetExpr::Select(select) = query.body.as_ref()
        && select.from.is_empty()
        && select.projection.iter().any(|item| {
            matches!(item, SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..))
        })
    {
        return Err(EngineError::syntax("SELECT * requires a FROM clause"));
    }
    Ok(())
}
