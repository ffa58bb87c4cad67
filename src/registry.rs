//! Rule registry keyed by rule id.
//!
//! The registry is assembled once through [`RegistryBuilder`] and is
//! read-only afterwards, so it can be shared between threads behind an
//! [`Arc`](std::sync::Arc) without locking.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::{
    config::RulesConfig,
    error::EngineError,
    rules::{self, Rule, Severity, parse_severity}
};

/// Immutable set of rules, iterated in ascending id order.
pub struct Registry {
    rules:    BTreeMap<&'static str, Box<dyn Rule>>,
    severity: HashMap<&'static str, Severity>
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("severity", &self.severity)
            .finish()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Built-in rules with thresholds and severity overrides from `config`.
    pub fn from_config(config: &RulesConfig) -> Result<Self, EngineError> {
        let mut builder = Self::builder().register_all(rules::builtin(&config.limits));
        for (id, level) in &config.severity {
            builder = builder.severity(id, level);
        }
        builder.build()
    }

    /// All rules in ascending id order, placeholders included.
    pub fn all(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.values().map(AsRef::as_ref)
    }

    pub fn lookup(&self, id: &str) -> Option<&dyn Rule> {
        self.rules.get(id).map(AsRef::as_ref)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Configured severity for a rule, if it differs from the default.
    pub fn severity_override(&self, id: &str) -> Option<Severity> {
        self.severity.get(id).copied()
    }
}

/// Collects rules and validates them on [`build`](RegistryBuilder::build).
#[derive(Default)]
pub struct RegistryBuilder {
    rules:    Vec<Box<dyn Rule>>,
    severity: Vec<(String, String)>
}

impl RegistryBuilder {
    pub fn register<R: Rule + 'static>(self, rule: R) -> Self {
        self.register_boxed(Box::new(rule))
    }

    pub fn register_boxed(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn register_all(mut self, rules: impl IntoIterator<Item = Box<dyn Rule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Override the severity of a registered rule (`info`, `warning`,
    /// `error`).
    pub fn severity(mut self, id: impl Into<String>, level: impl Into<String>) -> Self {
        self.severity.push((id.into(), level.into()));
        self
    }

    /// Validate and freeze the registry.
    ///
    /// Duplicate ids, overrides for unknown rules and unknown severity
    /// names are configuration errors.
    pub fn build(self) -> Result<Registry, EngineError> {
        let mut rules = BTreeMap::new();
        for rule in self.rules {
            let id = rule.info().id;
            if rules.insert(id, rule).is_some() {
                return Err(EngineError::configuration(format!(
                    "rule '{}' is registered twice",
                    id
                )));
            }
        }
        let mut severity = HashMap::new();
        for (id, level) in self.severity {
            let Some(key) = rules
                .keys()
                .copied()
                .find(|k| k.eq_ignore_ascii_case(&id))
            else {
                return Err(EngineError::configuration(format!(
                    "severity override for unknown rule '{}'",
                    id
                )));
            };
            let Some(level) = parse_severity(&level) else {
                return Err(EngineError::configuration(format!(
                    "unknown severity '{}' for rule '{}'",
                    level, id
                )));
            };
            severity.insert(key, level);
        }
        debug!(
            rules = rules.len(),
            overrides = severity.len(),
            "rule registry built"
        );
        Ok(Registry {
            rules,
            severity
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleLimits;

    #[test]
    fn test_iteration_is_sorted() {
        let registry = Registry::builder()
            .register_all(rules::builtin(&RuleLimits::default()))
            .build()
            .unwrap();
        let ids: Vec<_> = registry.ids().collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_override_matches_case_insensitively() {
        let registry = Registry::builder()
            .register(rules::Placeholder)
            .severity("ok", "error")
            .build()
            .unwrap();
        assert_eq!(registry.severity_override("OK"), Some(Severity::Error));
    }
}
