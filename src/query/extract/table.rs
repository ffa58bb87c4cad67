use sqlparser::ast::{TableFactor, TableWithJoins};

use super::{ExtractionContext, set_expr::extract_from_set_expr};
use crate::query::types::TableRef;

pub fn extract_from_table_with_joins(table: &TableWithJoins, ctx: &mut ExtractionContext) {
    extract_from_table_factor(&table.relation, ctx);
    for join in &table.joins {
        extract_from_table_factor(&join.relation, ctx);
    }
}

pub fn extract_from_table_factor(table_factor: &TableFactor, ctx: &mut ExtractionContext) {
    match table_factor {
        TableFactor::Table {
            name,
            alias,
            ..
        } => {
            let alias = alias.as_ref().map(|a| a.name.value.as_str());
            ctx.tables.push(TableRef::parse(&name.to_string(), alias));
        }
        TableFactor::Derived {
            subquery, ..
        } => {
            // derived tables contribute their tables, not their predicates
            let mut sub = ExtractionContext::default();
            extract_from_set_expr(&subquery.body, &mut sub);
            ctx.tables.extend(sub.tables);
            ctx.has_subquery = true;
        }
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => extract_from_table_with_joins(table_with_joins, ctx),
        _ => {}
    }
}
