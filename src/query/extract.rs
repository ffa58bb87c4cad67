mod expr;
mod set_expr;
mod table;

use compact_str::CompactString;
pub use expr::extract_columns_from_expr;
use indexmap::IndexSet;
pub use set_expr::{extract_from_set_expr, extract_selection};
pub use table::extract_from_table_with_joins;

use super::types::{AuditContext, TableRef};

/// Facts collected while walking a statement tree
#[derive(Debug, Default)]
pub struct ExtractionContext {
    pub tables:          Vec<TableRef>,
    pub where_cols:      IndexSet<CompactString>,
    pub group_cols:      IndexSet<CompactString>,
    pub having_cols:     IndexSet<CompactString>,
    pub eq_literal_cols: IndexSet<CompactString>,
    pub or_eq_cols:      IndexSet<CompactString>,
    pub has_union:       bool,
    pub has_distinct:    bool,
    pub has_subquery:    bool
}

impl ExtractionContext {
    /// Move the collected facts into an audit context.
    pub fn apply(self, ctx: &mut AuditContext) {
        ctx.tables.extend(self.tables);
        ctx.where_cols.extend(self.where_cols);
        ctx.group_cols.extend(self.group_cols);
        ctx.having_cols.extend(self.having_cols);
        ctx.eq_literal_cols.extend(self.eq_literal_cols);
        ctx.or_eq_cols.extend(self.or_eq_cols);
        ctx.has_union |= self.has_union;
        ctx.has_distinct |= self.has_distinct;
        ctx.has_subquery |= self.has_subquery;
    }
}
