use sqlparser::ast::{Expr, GroupByExpr, SelectItem, SetExpr};

use super::{
    ExtractionContext,
    expr::{contains_subquery, equality_columns, extract_columns_from_expr, or_equality_columns},
    table::extract_from_table_with_joins
};

pub fn extract_from_set_expr(set_expr: &SetExpr, ctx: &mut ExtractionContext) {
    match set_expr {
        SetExpr::Select(select) => {
            ctx.has_distinct |= select.distinct.is_some();
            for item in &select.projection {
                if let SelectItem::UnnamedExpr(expr)
                | SelectItem::ExprWithAlias {
                    expr, ..
                } = item
                    && contains_subquery(expr)
                {
                    ctx.has_subquery = true;
                }
            }
            for table in &select.from {
                extract_from_table_with_joins(table, ctx);
            }
            if let Some(selection) = &select.selection {
                extract_selection(selection, ctx);
            }
            if let GroupByExpr::Expressions(exprs, _) = &select.group_by {
                for expr in exprs {
                    extract_columns_from_expr(expr, &mut ctx.group_cols);
                }
            }
            if let Some(having) = &select.having {
                extract_columns_from_expr(having, &mut ctx.having_cols);
            }
        }
        SetExpr::SetOperation {
            left,
            right,
            ..
        } => {
            ctx.has_union = true;
            extract_from_set_expr(left, ctx);
            extract_from_set_expr(right, ctx);
        }
        SetExpr::Query(query) => extract_from_set_expr(&query.body, ctx),
        _ => {}
    }
}

/// Record what a WHERE predicate references.
pub fn extract_selection(selection: &Expr, ctx: &mut ExtractionContext) {
    extract_columns_from_expr(selection, &mut ctx.where_cols);
    equality_columns(selection, &mut ctx.eq_literal_cols);
    or_equality_columns(selection, &mut ctx.or_eq_cols);
    if contains_subquery(selection) {
        ctx.has_subquery = true;
    }
}
