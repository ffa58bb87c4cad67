//! Rule execution engine.
//!
//! Runs every registered rule against one [`AuditContext`] and collects
//! the findings into a map keyed by rule id. A rule that panics or reports
//! a finding under a foreign id is logged and left out; the remaining rules
//! still run.

use std::{
    collections::BTreeMap,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc
};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    cancel::CancellationToken,
    error::EngineError,
    query::AuditContext,
    registry::Registry,
    rules::{Finding, Rule},
    suppression::SuppressionSet
};

/// Findings of one analysis, ordered by rule id.
pub type Findings = BTreeMap<&'static str, Finding>;

enum Outcome {
    Found(Finding),
    Clean,
    Cancelled
}

/// Evaluates the registry against audit contexts.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    parallel: bool
}

impl Engine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            parallel: false
        }
    }

    /// Evaluate the rules of one statement on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Run all active rules against `ctx`.
    ///
    /// Returns [`EngineError::Cancelled`] without partial results when the
    /// token fires before every rule has run.
    pub fn analyze(
        &self,
        ctx: &AuditContext,
        suppression: &SuppressionSet,
        cancel: &CancellationToken
    ) -> Result<Findings, EngineError> {
        let active: Vec<&dyn Rule> = self
            .registry
            .all()
            .filter(|rule| !rule.is_placeholder())
            .filter(|rule| {
                let id = rule.info().id;
                let suppressed = suppression.is_suppressed(id);
                if suppressed {
                    debug!(rule = id, "rule suppressed");
                }
                !suppressed
            })
            .collect();

        let outcomes: Vec<Outcome> = if self.parallel {
            active
                .par_iter()
                .map(|rule| self.evaluate(*rule, ctx, cancel))
                .collect()
        } else {
            let mut outcomes = Vec::with_capacity(active.len());
            for rule in &active {
                let outcome = self.evaluate(*rule, ctx, cancel);
                let stop = matches!(outcome, Outcome::Cancelled);
                outcomes.push(outcome);
                if stop {
                    break;
                }
            }
            outcomes
        };

        let mut findings = Findings::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Found(finding) => {
                    findings.insert(finding.rule_id, finding);
                }
                Outcome::Clean => {}
                Outcome::Cancelled => {
                    debug!("analysis cancelled");
                    return Err(EngineError::Cancelled);
                }
            }
        }
        Ok(findings)
    }

    fn evaluate(&self, rule: &dyn Rule, ctx: &AuditContext, cancel: &CancellationToken) -> Outcome {
        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }
        let id = rule.info().id;
        let finding = match catch_unwind(AssertUnwindSafe(|| rule.check(ctx))) {
            Ok(Some(finding)) => finding,
            Ok(None) => return Outcome::Clean,
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| String::from("unknown panic"));
                warn!(rule = id, %reason, "rule execution fault, finding omitted");
                return Outcome::Clean;
            }
        };
        if finding.rule_id != id {
            warn!(
                rule = id,
                reported = finding.rule_id,
                "rule reported a finding under another id, discarded"
            );
            return Outcome::Clean;
        }
        let mut finding = finding;
        if let Some(severity) = self.registry.severity_override(id) {
            finding.severity = severity;
        }
        Outcome::Found(finding)
    }
}
