//! Heuristic rules and the trait they implement.
//!
//! Every rule inspects one [`AuditContext`] and reports at most one
//! [`Finding`]. Rules are stateless apart from configured thresholds and
//! must be `Send + Sync` so the engine can run them in parallel.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ AuditContext │────▶│    Engine    │────▶│   Findings   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                      ┌──────┴──────┐
//!                      │  Registry   │
//!                      │ (id order)  │
//!                      └─────────────┘
//! ```
//!
//! # Rule families
//!
//! | Prefix | Area                                   |
//! |--------|----------------------------------------|
//! | `ALI`  | aliases                                |
//! | `ARG`  | predicate arguments                    |
//! | `CLA`  | clause usage                           |
//! | `COL`  | column lists                           |
//! | `DIS`  | DISTINCT                               |
//! | `FUN`  | function calls                         |
//! | `GRP`  | grouping                               |
//! | `JOI`  | joins                                  |
//! | `KWR`  | discouraged keywords                   |
//! | `LCK`  | locking                                |
//! | `LIT`  | literals                               |
//! | `RES`  | result correctness                     |
//! | `SEC`  | dangerous operations                   |
//! | `STA`  | style                                  |
//! | `SUB`  | subqueries                             |
//!
//! # Implementing custom rules
//!
//! ```
//! use sql_advisor::{
//!     query::AuditContext,
//!     rules::{Finding, Rule, RuleCategory, RuleInfo, Severity}
//! };
//!
//! struct NoUnionRule;
//!
//! impl Rule for NoUnionRule {
//!     fn info(&self) -> RuleInfo {
//!         RuleInfo {
//!             id:       "CUS.001",
//!             summary:  "UNION is not allowed",
//!             severity: Severity::Warning,
//!             category: RuleCategory::Style,
//!             case:     "select 1 union select 2"
//!         }
//!     }
//!
//!     fn check(&self, ctx: &AuditContext) -> Option<Finding> {
//!         ctx.has_union
//!             .then(|| Finding::new(&self.info(), "Split the statement in two"))
//!     }
//! }
//! ```

mod alias;
mod argument;
mod clause;
mod column;
mod function;
mod join;
mod literal;
mod result;
mod scan;
mod security;
mod style;
mod subquery;
mod types;

pub use types::{Finding, RuleCategory, RuleInfo, Severity, parse_severity};

use crate::{config::RuleLimits, query::AuditContext};

/// Trait for implementing SQL heuristic rules.
///
/// Rules are stateless analyzers that examine a single statement and
/// return a finding when the anti-pattern is present.
pub trait Rule: Send + Sync {
    /// Returns metadata about this rule.
    fn info(&self) -> RuleInfo;

    /// Inspects a statement.
    ///
    /// Returns `None` when the statement passes this rule. A finding must
    /// carry this rule's id.
    fn check(&self, ctx: &AuditContext) -> Option<Finding>;

    /// Placeholder rules are registered but never evaluated or reported.
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// The `OK` rule reserved for "no problems found"
pub struct Placeholder;

impl Rule for Placeholder {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "OK",
            summary:  "OK",
            severity: Severity::Info,
            category: RuleCategory::Style,
            case:     "select * from tbl"
        }
    }

    fn check(&self, _ctx: &AuditContext) -> Option<Finding> {
        None
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}

/// Every built-in rule, thresholds taken from `limits`.
pub fn builtin(limits: &RuleLimits) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(Placeholder),
        Box::new(alias::ImplicitAlias),
        Box::new(alias::RedundantAlias),
        Box::new(argument::LeadingWildcard),
        Box::new(argument::LikeWithoutWildcard),
        Box::new(argument::LongInList {
            max_items: limits.max_in_count
        }),
        Box::new(argument::IsNullPredicate),
        Box::new(argument::RegexpMatch),
        Box::new(argument::OrInsteadOfIn),
        Box::new(argument::PaddedString),
        Box::new(argument::NegativePredicate),
        Box::new(clause::SelectWithoutWhere),
        Box::new(clause::OrderByRand),
        Box::new(clause::OffsetPagination),
        Box::new(clause::GroupByConstant),
        Box::new(clause::OrderByConstant),
        Box::new(clause::MixedOrderDirection),
        Box::new(clause::GroupByWithoutOrder),
        Box::new(clause::OrderByExpression),
        Box::new(clause::GroupByExpression),
        Box::new(clause::HavingClause),
        Box::new(clause::DeleteWithoutWhere),
        Box::new(clause::UpdateWithoutWhere),
        Box::new(clause::GroupByPinnedColumn),
        Box::new(column::SelectStar),
        Box::new(column::InsertWithoutColumns),
        Box::new(column::WideDistinct {
            max_columns: limits.max_distinct_count
        }),
        Box::new(column::CountDistinctColumns),
        Box::new(column::DistinctStar),
        Box::new(function::FunctionOnColumn),
        Box::new(function::PipeConcat),
        Box::new(function::Sysdate),
        Box::new(function::CountColumn),
        Box::new(function::SumMayBeNull),
        Box::new(join::MixedJoinSyntax),
        Box::new(join::SelfJoin),
        Box::new(join::TooManyJoins {
            max_tables: limits.max_join_tables
        }),
        Box::new(join::MultiTableWrite),
        Box::new(join::CrossDatabase),
        Box::new(result::CalcFoundRows),
        Box::new(result::InsertSelect),
        Box::new(result::OnDuplicateUpdate),
        Box::new(literal::IpAsString),
        Box::new(literal::UnquotedDate),
        Box::new(literal::IdListString),
        Box::new(result::LimitWithoutOrder),
        Box::new(result::WriteWithLimit),
        Box::new(result::WriteWithOrder),
        Box::new(result::AndInSet),
        Box::new(result::AlwaysFalse),
        Box::new(result::AlwaysTrue),
        Box::new(result::FileTransfer),
        Box::new(security::TruncateTable),
        Box::new(security::PlaintextPassword),
        Box::new(security::DestructiveStatement),
        Box::new(style::EqualsNull),
        Box::new(style::SpacedQualifier),
        Box::new(style::UnusualIdentifier),
        Box::new(subquery::InSubquery),
        Box::new(subquery::UnionWithoutAll),
        Box::new(subquery::DeepSubquery {
            max_depth: limits.max_subquery_depth
        }),
        Box::new(subquery::LimitInSubquery),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_builtin_ids_unique() {
        let rules = builtin(&RuleLimits::default());
        let ids: HashSet<_> = rules.iter().map(|r| r.info().id).collect();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn test_only_ok_is_placeholder() {
        let rules = builtin(&RuleLimits::default());
        let placeholders: Vec<_> = rules
            .iter()
            .filter(|r| r.is_placeholder())
            .map(|r| r.info().id)
            .collect();
        assert_eq!(placeholders, vec!["OK"]);
    }
}
