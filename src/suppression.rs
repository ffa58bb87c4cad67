//! Rule suppression by id or id prefix.
//!
//! Patterns are either an exact rule id (`COL.001`) or a prefix followed by
//! `*` (`ALI.*`, `COL*`). Matching ignores ASCII case.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::{error::EngineError, registry::Registry};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Exact(String),
    Prefix(String)
}

impl Pattern {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let upper = raw.to_ascii_uppercase();
        Some(match upper.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_string()),
            None => Self::Exact(upper)
        })
    }

    fn matches(&self, id: &str) -> bool {
        match self {
            Self::Exact(exact) => exact.eq_ignore_ascii_case(id),
            Self::Prefix(prefix) => id
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        }
    }
}

/// Rules that must not be evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionSet {
    patterns: Vec<Pattern>
}

impl SuppressionSet {
    /// Empty set: nothing is suppressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configured patterns against the registry.
    ///
    /// # Arguments
    ///
    /// * `patterns` - Exact rule ids (`COL.001`) or prefixes ending in `*`
    ///   (`ALI.*`), matched case-insensitively
    /// * `registry` - Rules the patterns are checked against
    ///
    /// # Errors
    ///
    /// [`EngineError::Configuration`] for an empty pattern or one that
    /// matches no registered rule.
    pub fn from_patterns<S: AsRef<str>>(
        patterns: &[S],
        registry: &Registry
    ) -> Result<Self, EngineError> {
        let mut parsed = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let raw = raw.as_ref();
            let Some(pattern) = Pattern::parse(raw) else {
                return Err(EngineError::configuration("empty rule pattern in ignore list"));
            };
            if !registry.ids().any(|id| pattern.matches(id)) {
                return Err(EngineError::configuration(format!(
                    "ignore pattern '{}' matches no known rule",
                    raw
                )));
            }
            parsed.push(pattern);
        }
        Ok(Self {
            patterns: parsed
        })
    }

    pub fn is_suppressed(&self, rule_id: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(rule_id))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// This set plus the per-request patterns.
    ///
    /// Request patterns can only add suppressions; malformed entries are
    /// skipped.
    pub fn with_request<S: AsRef<str>>(&self, patterns: &[S]) -> Self {
        let mut merged = self.clone();
        for raw in patterns {
            match Pattern::parse(raw.as_ref()) {
                Some(pattern) => {
                    if !merged.patterns.contains(&pattern) {
                        merged.patterns.push(pattern);
                    }
                }
                None => debug!(pattern = raw.as_ref(), "ignoring empty request pattern")
            }
        }
        merged
    }
}

/// Suppression set that can be swapped while requests are in flight.
///
/// Readers get an [`Arc`] snapshot; a request keeps using the snapshot it
/// started with.
#[derive(Debug, Default)]
pub struct SharedSuppression {
    current: RwLock<Arc<SuppressionSet>>
}

impl SharedSuppression {
    pub fn new(set: SuppressionSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(set))
        }
    }

    pub fn load(&self) -> Arc<SuppressionSet> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner())
        }
    }

    pub fn store(&self, set: SuppressionSet) {
        let set = Arc::new(set);
        match self.current.write() {
            Ok(mut guard) => *guard = set,
            Err(poisoned) => *poisoned.into_inner() = set
        }
    }
}
