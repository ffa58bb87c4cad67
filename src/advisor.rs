//! Request pipeline: strip, fingerprint, parse, evaluate, aggregate.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    cancel::CancellationToken,
    config::Config,
    engine::Engine,
    error::EngineError,
    fingerprint,
    lexer::strip_comments,
    query::{self, SqlDialect},
    registry::Registry,
    rules::{Finding, Severity},
    suppression::{SharedSuppression, SuppressionSet}
};

/// One statement to advise on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseRequest {
    /// Default database for unqualified table names
    #[serde(default)]
    pub schema:       String,
    pub sql:          String,
    /// Extra rule patterns to suppress for this request only
    #[serde(default)]
    pub ignore_rules: Vec<String>
}

impl AdviseRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_ignore_rules(mut self, rules: Vec<String>) -> Self {
        self.ignore_rules = rules;
        self
    }
}

/// Advice for one statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdviseResponse {
    /// Trimmed statement without comments
    pub sql:               String,
    pub finger_print_id:   String,
    pub finger_print:      String,
    /// Findings keyed by rule id, in id order
    pub heuristic_suggest: BTreeMap<String, Finding>
}

impl AdviseResponse {
    /// Highest severity among the findings.
    pub fn max_severity(&self) -> Option<Severity> {
        self.heuristic_suggest.values().map(|f| f.severity).max()
    }
}

/// Process-wide advisor: immutable registry plus a reloadable suppression
/// set.
pub struct Advisor {
    engine:      Engine,
    suppression: SharedSuppression,
    dialect:     SqlDialect,
    timeout:     Option<Duration>
}

impl Advisor {
    pub fn new(registry: Arc<Registry>, suppression: SuppressionSet) -> Self {
        Self {
            engine:      Engine::new(registry),
            suppression: SharedSuppression::new(suppression),
            dialect:     SqlDialect::default(),
            timeout:     None
        }
    }

    /// Build the registry and suppression set from configuration.
    ///
    /// Invalid severity overrides and ignore patterns are reported here,
    /// never per request.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let registry = Arc::new(Registry::from_config(&config.rules)?);
        let suppression = SuppressionSet::from_patterns(&config.rules.ignore, &registry)?;
        let timeout = (config.engine.timeout_ms > 0)
            .then(|| Duration::from_millis(config.engine.timeout_ms));
        let mut advisor = Self::new(registry, suppression)
            .with_dialect(config.engine.dialect)
            .with_parallel(config.engine.parallel);
        advisor.timeout = timeout;
        Ok(advisor)
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Deadline applied to every analysis.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.engine = self.engine.with_parallel(parallel);
        self
    }

    pub fn registry(&self) -> &Registry {
        self.engine.registry()
    }

    /// Current suppression snapshot.
    pub fn suppression(&self) -> Arc<SuppressionSet> {
        self.suppression.load()
    }

    /// Validate `patterns` and swap them in atomically.
    ///
    /// On error the previous set stays active.
    pub fn reload_suppression<S: AsRef<str>>(&self, patterns: &[S]) -> Result<(), EngineError> {
        let set = SuppressionSet::from_patterns(patterns, self.registry())?;
        self.suppression.store(set);
        debug!(patterns = patterns.len(), "suppression set reloaded");
        Ok(())
    }

    /// Advise on one statement.
    ///
    /// Returns `Ok(None)` when nothing but comments and whitespace is left.
    ///
    /// ```
    /// use sql_advisor::{
    ///     advisor::{AdviseRequest, Advisor},
    ///     config::Config
    /// };
    ///
    /// let advisor = Advisor::from_config(&Config::default()).unwrap();
    /// let response = advisor
    ///     .advise(&AdviseRequest::new("select * from tbl where id = 1"))
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(response.finger_print, "select * from tbl where id = ?");
    /// assert!(response.heuristic_suggest.contains_key("COL.001"));
    /// ```
    pub fn advise(&self, request: &AdviseRequest) -> Result<Option<AdviseResponse>, EngineError> {
        let cancel = match self.timeout {
            Some(timeout) => CancellationToken::with_deadline(timeout),
            None => CancellationToken::new()
        };
        self.advise_with_cancel(request, &cancel)
    }

    /// Advise on one statement under an explicit cancellation token.
    ///
    /// # Arguments
    ///
    /// * `request` - Statement, schema and per-request ignore patterns
    /// * `cancel` - Checked between rules; a cancelled token or an expired
    ///   deadline aborts the analysis
    ///
    /// # Returns
    ///
    /// `Ok(None)` for input that is empty once comments are removed,
    /// otherwise the fingerprint and the findings keyed by rule id.
    ///
    /// # Errors
    ///
    /// [`EngineError::Syntax`] when the statement does not parse and
    /// [`EngineError::Cancelled`] when `cancel` fires. No partial result is
    /// returned in either case.
    pub fn advise_with_cancel(
        &self,
        request: &AdviseRequest,
        cancel: &CancellationToken
    ) -> Result<Option<AdviseResponse>, EngineError> {
        let sql = strip_comments(request.sql.trim());
        if sql.is_empty() {
            debug!("empty statement after comment removal, nothing to advise");
            return Ok(None);
        }

        let finger_print = fingerprint::normalize(&sql);
        let finger_print_id = finger_print.id();
        info!(id = %finger_print_id, fingerprint = %finger_print, "statement fingerprinted");

        let schema = Some(request.schema.as_str());
        let ctx = query::parse(&sql, schema, self.dialect)?;
        debug!(statement_type = %ctx.statement_type, "audit context built");

        let suppression = self.suppression.load();
        let suppression = if request.ignore_rules.is_empty() {
            suppression
        } else {
            Arc::new(suppression.with_request(&request.ignore_rules))
        };
        let findings = self.engine.analyze(&ctx, &suppression, cancel)?;

        Ok(Some(AdviseResponse {
            sql,
            finger_print_id: finger_print_id.into_string(),
            finger_print: finger_print.into_string(),
            heuristic_suggest: findings
                .into_iter()
                .map(|(id, finding)| (id.to_string(), finding))
                .collect()
        }))
    }

    /// Advise on several statements in parallel; results keep input order.
    pub fn advise_batch(
        &self,
        requests: &[AdviseRequest]
    ) -> Vec<Result<Option<AdviseResponse>, EngineError>> {
        requests.par_iter().map(|r| self.advise(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_only_is_noop() {
        let advisor = Advisor::from_config(&Config::default()).unwrap();
        let response = advisor
            .advise(&AdviseRequest::new("-- just a comment"))
            .unwrap();
        assert!(response.is_none());
    }

    #[test]
    fn test_request_ignore_rules() {
        let advisor = Advisor::from_config(&Config::default()).unwrap();
        let request = AdviseRequest::new("select * from tbl where id = 1")
            .with_ignore_rules(vec!["col.*".into()]);
        let response = advisor.advise(&request).unwrap().unwrap();
        assert!(!response.heuristic_suggest.contains_key("COL.001"));
    }
}
