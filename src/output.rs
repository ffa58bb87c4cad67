use colored::Colorize;
use serde::Serialize;

use crate::{
    advisor::AdviseResponse,
    registry::Registry,
    rules::{Finding, RuleCategory, Severity},
    suppression::SuppressionSet
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Result for one input statement
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AdviceEntry {
    Advice(AdviseResponse),
    Error { sql: String, error: String }
}

/// Registry entry as listed by `sql-advisor rules`
#[derive(Debug, Clone, Serialize)]
pub struct RuleEntry {
    pub id:         &'static str,
    pub summary:    &'static str,
    pub severity:   Severity,
    pub category:   RuleCategory,
    pub case:       &'static str,
    pub suppressed: bool
}

/// Format advice for every input statement
pub fn format_advice(entries: &[AdviceEntry], opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(entries).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(entries).unwrap_or_default(),
        OutputFormat::Text => format_advice_text(entries, opts)
    }
}

/// Describe the registry, marking suppressed rules
pub fn format_rules(
    registry: &Registry,
    suppression: &SuppressionSet,
    opts: &OutputOptions
) -> String {
    let entries: Vec<RuleEntry> = registry
        .all()
        .filter(|rule| !rule.is_placeholder())
        .map(|rule| {
            let info = rule.info();
            RuleEntry {
                id:         info.id,
                summary:    info.summary,
                severity:   registry.severity_override(info.id).unwrap_or(info.severity),
                category:   info.category,
                case:       info.case,
                suppressed: suppression.is_suppressed(info.id)
            }
        })
        .collect();
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&entries).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&entries).unwrap_or_default(),
        OutputFormat::Text => format_rules_text(&entries, opts)
    }
}

fn paint_severity(severity: Severity, colored: bool) -> String {
    let label = format!("{:<5}", severity);
    if !colored {
        return label;
    }
    match severity {
        Severity::Error => label.red().bold().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Info => label.blue().to_string()
    }
}

fn format_finding(finding: &Finding, opts: &OutputOptions) -> String {
    let mut line = format!(
        "  [{}] {} {}: {}",
        paint_severity(finding.severity, opts.colored),
        finding.rule_id,
        finding.summary,
        finding.message
    );
    if let Some(detail) = &finding.detail {
        line.push_str(&format!(" ({})", detail));
    }
    line
}

fn format_advice_text(entries: &[AdviceEntry], opts: &OutputOptions) -> String {
    let mut output = String::new();
    let mut findings = 0usize;
    let mut errors = 0usize;

    for (i, entry) in entries.iter().enumerate() {
        match entry {
            AdviceEntry::Advice(response) => {
                let header = format!("Statement #{} [{}]", i + 1, response.finger_print_id);
                if opts.colored {
                    output.push_str(&header.cyan().bold().to_string());
                } else {
                    output.push_str(&header);
                }
                output.push('\n');
                output.push_str(&format!("  {}\n", response.finger_print));
                if response.heuristic_suggest.is_empty() {
                    output.push_str("  no suggestions\n");
                }
                for finding in response.heuristic_suggest.values() {
                    output.push_str(&format_finding(finding, opts));
                    output.push('\n');
                }
                findings += response.heuristic_suggest.len();
            }
            AdviceEntry::Error {
                sql,
                error
            } => {
                let header = format!("Statement #{}", i + 1);
                let message = format!("  {}", error);
                if opts.colored {
                    output.push_str(&header.cyan().bold().to_string());
                    output.push('\n');
                    output.push_str(&message.red().to_string());
                } else {
                    output.push_str(&header);
                    output.push('\n');
                    output.push_str(&message);
                }
                output.push('\n');
                output.push_str(&format!("  {}\n", sql));
                errors += 1;
            }
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "{} statement(s), {} suggestion(s), {} error(s)",
        entries.len(),
        findings,
        errors
    ));
    output
}

fn format_rules_text(entries: &[RuleEntry], opts: &OutputOptions) -> String {
    let mut output = String::new();
    for entry in entries {
        let id = if opts.colored {
            entry.id.bold().to_string()
        } else {
            entry.id.to_string()
        };
        output.push_str(&format!(
            "{:<8} [{}] {:<12} {}",
            id,
            paint_severity(entry.severity, opts.colored),
            entry.category.to_string(),
            entry.summary
        ));
        if entry.suppressed {
            output.push_str(" (suppressed)");
        }
        output.push('\n');
        output.push_str(&format!("         e.g. {}\n", entry.case));
    }
    output
}
