use super::{Finding, Rule, RuleCategory, RuleInfo, Severity};
use crate::query::AuditContext;

/// Detects TRUNCATE statements which instantly delete all data
///
/// TRUNCATE cannot be limited to specific rows, bypasses DELETE triggers
/// and is not written to the binary log row by row.
pub struct TruncateTable;

impl Rule for TruncateTable {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SEC.001",
            summary:  "TRUNCATE statement detected",
            severity: Severity::Error,
            category: RuleCategory::Security,
            case:     "truncate table tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        if !ctx.starts_with_words(&["truncate"]) {
            return None;
        }
        let tables: Vec<&str> = ctx.tables.iter().map(|t| t.name.as_str()).collect();
        let finding = Finding::new(
            &self.info(),
            "TRUNCATE removes every row and cannot be rolled back; use DELETE with WHERE or ensure backups exist"
        );
        Some(if tables.is_empty() {
            finding
        } else {
            finding.with_detail(tables.join(", "))
        })
    }
}

/// Password written in plain text
pub struct PlaintextPassword;

impl Rule for PlaintextPassword {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SEC.002",
            summary:  "Password stored in plain text",
            severity: Severity::Error,
            category: RuleCategory::Security,
            case:     "create user 'bob'@'%' identified by 'secret'"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = ctx.tokens.windows(3).find_map(|w| {
            let plain = w[0].is_word("identified")
                && w[1].is_word("by")
                && w[2].string_value().is_some();
            plain.then_some(&w[2])
        })?;
        Some(
            Finding::new(
                &self.info(),
                "Password appears in plain text and ends up in logs; use IDENTIFIED BY PASSWORD with a hash"
            )
            .at(token.offset)
        )
    }
}

/// Destructive statement that needs a backup first
pub struct DestructiveStatement;

impl Rule for DestructiveStatement {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "SEC.003",
            summary:  "Back up data before DELETE, DROP or TRUNCATE",
            severity: Severity::Warning,
            category: RuleCategory::Security,
            case:     "drop table tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let first = ctx.tokens.first()?;
        let destructive =
            first.is_word("delete") || first.is_word("drop") || first.is_word("truncate");
        destructive.then(|| {
            Finding::new(
                &self.info(),
                format!(
                    "{} permanently removes data; make sure a backup exists before running it",
                    first.text.to_ascii_uppercase()
                )
            )
            .at(first.offset)
        })
    }
}
