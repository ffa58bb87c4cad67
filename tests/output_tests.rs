// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sql_advisor::{
    advisor::{AdviseRequest, Advisor},
    config::Config,
    output::{AdviceEntry, OutputFormat, OutputOptions, format_advice, format_rules},
    suppression::SuppressionSet
};

fn entries() -> Vec<AdviceEntry> {
    let advisor = Advisor::from_config(&Config::default()).unwrap();
    let response = advisor
        .advise(&AdviseRequest::new("select * from t where id = 1"))
        .unwrap()
        .unwrap();
    vec![
        AdviceEntry::Advice(response),
        AdviceEntry::Error {
            sql:   "select * from".to_string(),
            error: "syntax error: unexpected end of input".to_string()
        },
    ]
}

fn plain(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false
    }
}

#[test]
fn test_default_options() {
    let opts = OutputOptions::default();
    assert_eq!(opts.format, OutputFormat::Text);
    assert!(opts.colored);
}

#[test]
fn test_json_advice() {
    let output = format_advice(&entries(), &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["finger_print"], "select * from t where id = ?");
    assert_eq!(items[0]["finger_print_id"].as_str().unwrap().len(), 16);
    assert_eq!(items[0]["heuristic_suggest"]["COL.001"]["severity"], "Warning");
    assert_eq!(items[1]["sql"], "select * from");
    assert!(items[1]["error"].as_str().unwrap().contains("syntax error"));
}

#[test]
fn test_yaml_advice() {
    let output = format_advice(&entries(), &plain(OutputFormat::Yaml));
    assert!(output.contains("finger_print:"));
    assert!(output.contains("COL.001"));
}

#[test]
fn test_text_advice() {
    let output = format_advice(&entries(), &plain(OutputFormat::Text));
    assert!(output.contains("Statement #1 ["));
    assert!(output.contains("select * from t where id = ?"));
    assert!(output.contains("COL.001"));
    assert!(output.contains("Statement #2"));
    assert!(output.contains("syntax error"));
    assert!(output.starts_with("Statement #1"));
    let summary = output.lines().last().unwrap();
    assert!(summary.starts_with("2 statement(s)"));
    assert!(summary.ends_with("1 error(s)"));
    assert!(!output.contains("\x1b["));
}

#[test]
fn test_text_without_findings() {
    let advisor = Advisor::from_config(&Config::default()).unwrap();
    let response = advisor
        .advise(&AdviseRequest::new("select id from t where id = 1 order by id"))
        .unwrap()
        .unwrap();
    let output = format_advice(&[AdviceEntry::Advice(response)], &plain(OutputFormat::Text));
    assert!(output.contains("no suggestions"));
}

#[test]
fn test_empty_json_is_array() {
    assert_eq!(format_advice(&[], &plain(OutputFormat::Json)), "[]");
}

#[test]
fn test_rules_listing() {
    let advisor = Advisor::from_config(&Config::default()).unwrap();
    let suppression = SuppressionSet::from_patterns(&["ALI.*"], advisor.registry()).unwrap();
    let output = format_rules(advisor.registry(), &suppression, &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    let rules = value.as_array().unwrap();
    assert!(rules.iter().all(|r| r["id"] != "OK"));
    let ali = rules.iter().find(|r| r["id"] == "ALI.001").unwrap();
    assert_eq!(ali["suppressed"], true);
    let col = rules.iter().find(|r| r["id"] == "COL.001").unwrap();
    assert_eq!(col["suppressed"], false);
    assert_eq!(col["category"], "Performance");
}

#[test]
fn test_rules_text_marks_suppressed() {
    let advisor = Advisor::from_config(&Config::default()).unwrap();
    let suppression = SuppressionSet::from_patterns(&["COL.001"], advisor.registry()).unwrap();
    let output = format_rules(advisor.registry(), &suppression, &plain(OutputFormat::Text));
    let line = output
        .lines()
        .find(|l| l.starts_with("COL.001"))
        .unwrap();
    assert!(line.ends_with("(suppressed)"));
}
