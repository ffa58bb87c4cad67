use std::{sync::Arc, thread, time::Duration};

use sql_advisor::{
    advisor::{AdviseRequest, Advisor},
    cancel::CancellationToken,
    config::Config,
    error::EngineError,
    fingerprint::{identify, normalize},
    registry::Registry,
    rules::Severity,
    suppression::SuppressionSet
};

fn advisor() -> Advisor {
    Advisor::from_config(&Config::default()).unwrap()
}

#[test]
fn test_response_shape() {
    let response = advisor()
        .advise(&AdviseRequest::new("  select * from table_a where a = 1 -- note\n"))
        .unwrap()
        .unwrap();
    assert_eq!(response.sql, "select * from table_a where a = 1");
    assert_eq!(response.finger_print, "select * from table_a where a = ?");
    assert_eq!(response.finger_print_id, identify(&response.finger_print).into_string());
    assert!(response.heuristic_suggest.contains_key("COL.001"));
    assert_eq!(response.max_severity(), Some(Severity::Warning));
}

#[test]
fn test_same_fingerprint_for_different_literals() {
    let advisor = advisor();
    let a = advisor
        .advise(&AdviseRequest::new("select * from table_a where a = 1"))
        .unwrap()
        .unwrap();
    let b = advisor
        .advise(&AdviseRequest::new("select * from table_a where a = 2"))
        .unwrap()
        .unwrap();
    assert_eq!(a.finger_print_id, b.finger_print_id);
    assert_eq!(a.heuristic_suggest, b.heuristic_suggest);
}

#[test]
fn test_clean_statement_has_empty_map() {
    let response = advisor()
        .advise(&AdviseRequest::new(
            "select id, name from users where id = 1 order by id"
        ))
        .unwrap()
        .unwrap();
    assert!(response.heuristic_suggest.is_empty());
    assert_eq!(response.max_severity(), None);
}

#[test]
fn test_comment_only_is_noop() {
    assert!(advisor().advise(&AdviseRequest::new("/* nothing */")).unwrap().is_none());
    assert!(advisor().advise(&AdviseRequest::new("   ")).unwrap().is_none());
}

#[test]
fn test_syntax_error_surfaces() {
    let err = advisor().advise(&AdviseRequest::new("SELECT *")).unwrap_err();
    assert!(err.is_syntax());
}

#[test]
fn test_unterminated_non_ascii_identifier_is_syntax_error() {
    let err = advisor().advise(&AdviseRequest::new("select `é")).unwrap_err();
    assert!(err.is_syntax());
    let err = advisor()
        .advise(&AdviseRequest::new("select id from `tablé where id = 1"))
        .unwrap_err();
    assert!(err.is_syntax());
}

#[test]
fn test_schema_feeds_cross_database_rule() {
    let sql = "select a.id from a join other.b on a.id = b.id";
    let without = advisor().advise(&AdviseRequest::new(sql)).unwrap().unwrap();
    assert!(!without.heuristic_suggest.contains_key("JOI.008"));

    let with = advisor()
        .advise(&AdviseRequest::new(sql).with_schema("main"))
        .unwrap()
        .unwrap();
    assert!(with.heuristic_suggest.contains_key("JOI.008"));
}

#[test]
fn test_config_suppression() {
    let mut config = Config::default();
    config.rules.ignore = vec!["COL.001".to_string()];
    let response = Advisor::from_config(&config)
        .unwrap()
        .advise(&AdviseRequest::new("select * from t where id = 1"))
        .unwrap()
        .unwrap();
    assert!(!response.heuristic_suggest.contains_key("COL.001"));
}

#[test]
fn test_request_cannot_enable_suppressed_rule() {
    let mut config = Config::default();
    config.rules.ignore = vec!["COL.*".to_string()];
    let advisor = Advisor::from_config(&config).unwrap();
    let request = AdviseRequest::new("select * from t where id = 1")
        .with_ignore_rules(vec!["ARG.*".to_string()]);
    let response = advisor.advise(&request).unwrap().unwrap();
    assert!(!response.heuristic_suggest.contains_key("COL.001"));
    assert!(advisor.suppression().is_suppressed("COL.001"));
}

#[test]
fn test_severity_override_from_config() {
    let mut config = Config::default();
    config
        .rules
        .severity
        .insert("COL.001".to_string(), "error".to_string());
    let response = Advisor::from_config(&config)
        .unwrap()
        .advise(&AdviseRequest::new("select * from t where id = 1"))
        .unwrap()
        .unwrap();
    assert_eq!(response.heuristic_suggest["COL.001"].severity, Severity::Error);
}

#[test]
fn test_invalid_config_rejected_at_startup() {
    let mut config = Config::default();
    config.rules.ignore = vec!["XYZ.123".to_string()];
    assert!(matches!(
        Advisor::from_config(&config),
        Err(EngineError::Configuration(_))
    ));
}

#[test]
fn test_reload_suppression() {
    let advisor = advisor();
    let request = AdviseRequest::new("select * from t where id = 1");
    advisor.reload_suppression(&["COL.001"]).unwrap();
    let response = advisor.advise(&request).unwrap().unwrap();
    assert!(!response.heuristic_suggest.contains_key("COL.001"));

    assert!(advisor.reload_suppression(&["BAD.999"]).is_err());
    assert!(advisor.suppression().is_suppressed("COL.001"));
}

#[test]
fn test_cancelled_request() {
    let advisor = advisor();
    let token = CancellationToken::new();
    token.cancel();
    let result = advisor.advise_with_cancel(&AdviseRequest::new("select * from t"), &token);
    assert_eq!(result, Err(EngineError::Cancelled));
}

#[test]
fn test_timeout_applies_deadline() {
    let advisor = advisor().with_timeout(Duration::ZERO);
    let result = advisor.advise(&AdviseRequest::new("select * from t"));
    assert_eq!(result, Err(EngineError::Cancelled));
}

#[test]
fn test_batch_keeps_order() {
    let requests = vec![
        AdviseRequest::new("select * from t where id = 1"),
        AdviseRequest::new("-- skip"),
        AdviseRequest::new("select * from"),
        AdviseRequest::new("delete from t"),
    ];
    let results = advisor().advise_batch(&requests);
    assert_eq!(results.len(), 4);
    assert!(results[0].as_ref().unwrap().is_some());
    assert!(results[1].as_ref().unwrap().is_none());
    assert!(results[2].is_err());
    let delete = results[3].as_ref().unwrap().as_ref().unwrap();
    assert!(delete.heuristic_suggest.contains_key("CLA.014"));
}

#[test]
fn test_concurrent_requests_share_advisor() {
    let registry = Arc::new(Registry::from_config(&Default::default()).unwrap());
    let advisor = Arc::new(Advisor::new(registry, SuppressionSet::new()));
    let expected = normalize("select * from t where id = ?").id();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let advisor = Arc::clone(&advisor);
            thread::spawn(move || {
                let sql = format!("select * from t where id = {i}");
                advisor.advise(&AdviseRequest::new(sql)).unwrap().unwrap()
            })
        })
        .collect();
    for handle in handles {
        let response = handle.join().unwrap();
        assert_eq!(response.finger_print_id, expected.as_str());
        assert!(response.heuristic_suggest.contains_key("COL.001"));
    }
}

#[test]
fn test_request_from_json() {
    let request: AdviseRequest =
        serde_json::from_str(r#"{"sql": "select 1", "ignore_rules": ["COL.001"]}"#).unwrap();
    assert_eq!(request.schema, "");
    assert_eq!(request.ignore_rules, vec!["COL.001"]);
}
