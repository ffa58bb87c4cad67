use std::{sync::Arc, time::Duration};

use sql_advisor::{
    cancel::CancellationToken,
    config::{RuleLimits, RulesConfig},
    engine::Engine,
    error::EngineError,
    query::{AuditContext, SqlDialect, parse},
    registry::Registry,
    rules::{Finding, Placeholder, Rule, RuleCategory, RuleInfo, Severity, builtin},
    suppression::SuppressionSet
};

struct Always(&'static str);

impl Rule for Always {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       self.0,
            summary:  "always reports",
            severity: Severity::Warning,
            category: RuleCategory::Style,
            case:     "select 1"
        }
    }

    fn check(&self, _ctx: &AuditContext) -> Option<Finding> {
        Some(Finding::new(&self.info(), "reported"))
    }
}

struct Panics;

impl Rule for Panics {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "TST.900",
            summary:  "panics",
            severity: Severity::Error,
            category: RuleCategory::Correctness,
            case:     "select 1"
        }
    }

    fn check(&self, _ctx: &AuditContext) -> Option<Finding> {
        panic!("rule bug")
    }
}

struct WrongId;

impl Rule for WrongId {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "TST.901",
            summary:  "reports under another id",
            severity: Severity::Info,
            category: RuleCategory::Style,
            case:     "select 1"
        }
    }

    fn check(&self, _ctx: &AuditContext) -> Option<Finding> {
        Some(Finding::new(&Always("TST.002").info(), "not mine"))
    }
}

fn ctx(sql: &str) -> AuditContext {
    parse(sql, None, SqlDialect::MySQL).unwrap()
}

fn builtin_registry() -> Arc<Registry> {
    Arc::new(Registry::from_config(&RulesConfig::default()).unwrap())
}

fn run(engine: &Engine, sql: &str, suppression: &SuppressionSet) -> Vec<&'static str> {
    engine
        .analyze(&ctx(sql), suppression, &CancellationToken::new())
        .unwrap()
        .into_keys()
        .collect()
}

#[test]
fn test_registry_lookup() {
    let registry = builtin_registry();
    assert!(registry.lookup("COL.001").is_some());
    assert!(registry.lookup("NOPE.001").is_none());
    assert_eq!(registry.len(), builtin(&RuleLimits::default()).len());
    assert!(!registry.is_empty());
}

#[test]
fn test_registry_rejects_duplicate_id() {
    let result = Registry::builder()
        .register(Always("TST.001"))
        .register(Always("TST.001"))
        .build();
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

#[test]
fn test_registry_rejects_unknown_override() {
    let result = Registry::builder()
        .register(Always("TST.001"))
        .severity("TST.404", "error")
        .build();
    assert!(result.is_err());

    let result = Registry::builder()
        .register(Always("TST.001"))
        .severity("TST.001", "fatal")
        .build();
    assert!(result.is_err());
}

#[test]
fn test_placeholder_is_skipped() {
    let registry = Registry::builder()
        .register(Placeholder)
        .register(Always("TST.001"))
        .build()
        .unwrap();
    let engine = Engine::new(Arc::new(registry));
    assert_eq!(run(&engine, "select 1", &SuppressionSet::new()), vec!["TST.001"]);
}

#[test]
fn test_findings_keyed_and_sorted() {
    let registry = Registry::builder()
        .register(Always("TST.003"))
        .register(Always("TST.001"))
        .register(Always("TST.002"))
        .build()
        .unwrap();
    let engine = Engine::new(Arc::new(registry));
    assert_eq!(
        run(&engine, "select 1", &SuppressionSet::new()),
        vec!["TST.001", "TST.002", "TST.003"]
    );
}

#[test]
fn test_panicking_rule_is_isolated() {
    let registry = Registry::builder()
        .register(Panics)
        .register(Always("TST.001"))
        .build()
        .unwrap();
    let engine = Engine::new(Arc::new(registry));
    assert_eq!(run(&engine, "select 1", &SuppressionSet::new()), vec!["TST.001"]);
}

#[test]
fn test_foreign_id_finding_is_discarded() {
    let registry = Registry::builder()
        .register(WrongId)
        .register(Always("TST.001"))
        .build()
        .unwrap();
    let engine = Engine::new(Arc::new(registry));
    assert_eq!(run(&engine, "select 1", &SuppressionSet::new()), vec!["TST.001"]);
}

#[test]
fn test_severity_override_applied() {
    let registry = Registry::builder()
        .register(Always("TST.001"))
        .severity("TST.001", "info")
        .build()
        .unwrap();
    let engine = Engine::new(Arc::new(registry));
    let findings = engine
        .analyze(&ctx("select 1"), &SuppressionSet::new(), &CancellationToken::new())
        .unwrap();
    assert_eq!(findings["TST.001"].severity, Severity::Info);
}

#[test]
fn test_suppressed_rules_do_not_run() {
    let registry = builtin_registry();
    let engine = Engine::new(Arc::clone(&registry));
    let sql = "select * from t where id = 1";
    assert!(run(&engine, sql, &SuppressionSet::new()).contains(&"COL.001"));

    let suppression = SuppressionSet::from_patterns(&["col.001"], &registry).unwrap();
    assert!(!run(&engine, sql, &suppression).contains(&"COL.001"));

    let suppression = SuppressionSet::from_patterns(&["COL.*"], &registry).unwrap();
    assert!(
        run(&engine, sql, &suppression)
            .iter()
            .all(|id| !id.starts_with("COL."))
    );
}

#[test]
fn test_suppression_patterns_validated() {
    let registry = builtin_registry();
    assert!(SuppressionSet::from_patterns(&["ZZZ.001"], &registry).is_err());
    assert!(SuppressionSet::from_patterns(&["  "], &registry).is_err());
    assert!(
        SuppressionSet::from_patterns::<&str>(&[], &registry)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_cancelled_token_yields_no_findings() {
    let engine = Engine::new(builtin_registry());
    let token = CancellationToken::new();
    token.cancel();
    let result = engine.analyze(&ctx("select * from t"), &SuppressionSet::new(), &token);
    assert_eq!(result, Err(EngineError::Cancelled));
}

#[test]
fn test_expired_deadline_cancels() {
    let engine = Engine::new(builtin_registry()).with_parallel(true);
    let token = CancellationToken::with_deadline(Duration::ZERO);
    let result = engine.analyze(&ctx("select * from t"), &SuppressionSet::new(), &token);
    assert_eq!(result, Err(EngineError::Cancelled));
}

#[test]
fn test_parallel_matches_sequential() {
    let registry = builtin_registry();
    let sequential = Engine::new(Arc::clone(&registry));
    let parallel = Engine::new(registry).with_parallel(true);
    let sql = "select * from t1, t2 join t3 on t2.id = t3.id where upper(name) = 'x' order by rand()";
    let context = ctx(sql);
    let a = sequential
        .analyze(&context, &SuppressionSet::new(), &CancellationToken::new())
        .unwrap();
    let b = parallel
        .analyze(&context, &SuppressionSet::new(), &CancellationToken::new())
        .unwrap();
    assert_eq!(a, b);
    assert!(!a.is_empty());
}

#[test]
fn test_analysis_is_deterministic() {
    let engine = Engine::new(builtin_registry());
    let sql = "select distinct * from t where a = null or a = 1 or a = 2 limit 10";
    let first = run(&engine, sql, &SuppressionSet::new());
    for _ in 0..5 {
        assert_eq!(run(&engine, sql, &SuppressionSet::new()), first);
    }
}
