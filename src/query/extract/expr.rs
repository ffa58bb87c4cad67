use compact_str::CompactString;
use indexmap::IndexSet;
use sqlparser::ast::{BinaryOperator, Expr};

/// Collect the column names referenced by an expression.
pub fn extract_columns_from_expr(expr: &Expr, columns: &mut IndexSet<CompactString>) {
    match expr {
        Expr::Identifier(ident) => {
            columns.insert(ident.value.as_str().into());
        }
        Expr::CompoundIdentifier(idents) => {
            if let Some(col) = idents.last() {
                columns.insert(col.value.as_str().into());
            }
        }
        Expr::BinaryOp {
            left,
            right,
            ..
        } => {
            extract_columns_from_expr(left, columns);
            extract_columns_from_expr(right, columns);
        }
        Expr::UnaryOp {
            expr, ..
        } => {
            extract_columns_from_expr(expr, columns);
        }
        Expr::InList {
            expr,
            list,
            ..
        } => {
            extract_columns_from_expr(expr, columns);
            for item in list {
                extract_columns_from_expr(item, columns);
            }
        }
        Expr::InSubquery {
            expr, ..
        } => {
            extract_columns_from_expr(expr, columns);
        }
        Expr::Subquery(_)
        | Expr::Exists {
            ..
        } => {}
        Expr::Between {
            expr,
            low,
            high,
            ..
        } => {
            extract_columns_from_expr(expr, columns);
            extract_columns_from_expr(low, columns);
            extract_columns_from_expr(high, columns);
        }
        Expr::IsNull(e) | Expr::IsNotNull(e) => {
            extract_columns_from_expr(e, columns);
        }
        Expr::Nested(e) => {
            extract_columns_from_expr(e, columns);
        }
        Expr::Function(func) => {
            if let sqlparser::ast::FunctionArguments::List(arg_list) = &func.args {
                for arg in &arg_list.args {
                    if let sqlparser::ast::FunctionArg::Unnamed(
                        sqlparser::ast::FunctionArgExpr::Expr(e)
                    ) = arg
                    {
                        extract_columns_from_expr(e, columns);
                    }
                }
            }
        }
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            if let Some(op) = operand {
                extract_columns_from_expr(op, columns);
            }
            for case_when in conditions {
                extract_columns_from_expr(&case_when.condition, columns);
                extract_columns_from_expr(&case_when.result, columns);
            }
            if let Some(else_res) = else_result {
                extract_columns_from_expr(else_res, columns);
            }
        }
        Expr::Cast {
            expr, ..
        } => {
            extract_columns_from_expr(expr, columns);
        }
        Expr::Extract {
            expr, ..
        } => {
            extract_columns_from_expr(expr, columns);
        }
        _ => {}
    }
}

pub fn contains_subquery(expr: &Expr) -> bool {
    match expr {
        Expr::Subquery(_)
        | Expr::InSubquery {
            ..
        }
        | Expr::Exists {
            ..
        } => true,
        Expr::BinaryOp {
            left,
            right,
            ..
        } => contains_subquery(left) || contains_subquery(right),
        Expr::Nested(e) => contains_subquery(e),
        Expr::InList {
            expr,
            list,
            ..
        } => contains_subquery(expr) || list.iter().any(contains_subquery),
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            operand.as_ref().is_some_and(|o| contains_subquery(o))
                || conditions
                    .iter()
                    .any(|cw| contains_subquery(&cw.condition) || contains_subquery(&cw.result))
                || else_result.as_ref().is_some_and(|e| contains_subquery(e))
        }
        _ => false
    }
}

/// Columns pinned by `col = literal` in the AND chain of a predicate.
pub fn equality_columns(expr: &Expr, columns: &mut IndexSet<CompactString>) {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right
        } => {
            equality_columns(left, columns);
            equality_columns(right, columns);
        }
        Expr::Nested(e) => equality_columns(e, columns),
        _ => {
            if let Some(col) = literal_equality(expr) {
                columns.insert(col);
            }
        }
    }
}

/// Columns compared to literals more than once inside one OR chain.
pub fn or_equality_columns(expr: &Expr, columns: &mut IndexSet<CompactString>) {
    match expr {
        Expr::BinaryOp {
            op: BinaryOperator::Or,
            ..
        } => {
            let mut leaves = Vec::new();
            flatten_or(expr, &mut leaves);
            let mut seen = IndexSet::new();
            for leaf in leaves {
                match literal_equality(leaf) {
                    Some(col) => {
                        if !seen.insert(col.clone()) {
                            columns.insert(col);
                        }
                    }
                    None => or_equality_columns(leaf, columns)
                }
            }
        }
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right
        } => {
            or_equality_columns(left, columns);
            or_equality_columns(right, columns);
        }
        Expr::Nested(e) => or_equality_columns(e, columns),
        _ => {}
    }
}

fn flatten_or<'a>(expr: &'a Expr, leaves: &mut Vec<&'a Expr>) {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Or,
            right
        } => {
            flatten_or(left, leaves);
            flatten_or(right, leaves);
        }
        Expr::Nested(inner)
            if matches!(
                inner.as_ref(),
                Expr::BinaryOp {
                    op: BinaryOperator::Or,
                    ..
                }
            ) =>
        {
            flatten_or(inner, leaves)
        }
        _ => leaves.push(expr)
    }
}

/// `col = literal` or `literal = col`.
fn literal_equality(expr: &Expr) -> Option<CompactString> {
    let Expr::BinaryOp {
        left,
        op: BinaryOperator::Eq,
        right
    } = expr
    else {
        return None;
    };
    match (column_name(left), column_name(right)) {
        (Some(col), None) if is_literal(right) => Some(col),
        (None, Some(col)) if is_literal(left) => Some(col),
        _ => None
    }
}

fn column_name(expr: &Expr) -> Option<CompactString> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.as_str().into()),
        Expr::CompoundIdentifier(idents) => idents.last().map(|i| i.value.as_str().into()),
        Expr::Nested(e) => column_name(e),
        _ => None
    }
}

fn is_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Value(_) => true,
        Expr::UnaryOp {
            expr, ..
        } => matches!(expr.as_ref(), Expr::Value(_)),
        Expr::Nested(e) => is_literal(e),
        _ => false
    }
}
