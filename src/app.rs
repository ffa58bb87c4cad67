//! Application logic for the `sql-advisor` CLI.
//!
//! Kept apart from the binary entry point so commands can be tested
//! without spawning a process.

mod advise;
mod convert;
mod helpers;
mod types;

pub use advise::run_advise;
pub use convert::{convert_dialect, convert_format};
pub use helpers::{build_requests, calculate_exit_code, init_tracing, read_input};
pub use types::{AdviseParams, CommandOutput, RulesParams};

use crate::{
    advisor::Advisor,
    config::Config,
    error::AppResult,
    output::{OutputOptions, format_rules}
};

/// Runs the rules command: lists the registry with configured severities
/// and suppressions.
pub fn run_rules(params: RulesParams, config: Config) -> AppResult<CommandOutput> {
    let advisor = Advisor::from_config(&config)?;
    let opts = OutputOptions {
        format:  convert_format(params.output_format),
        colored: !params.no_color
    };
    Ok(CommandOutput {
        exit_code: 0,
        output:    format_rules(advisor.registry(), &advisor.suppression(), &opts)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Format, Input};

    fn params(sql: &str) -> AdviseParams {
        AdviseParams {
            sql:           Some(sql.to_string()),
            queries_path:  None,
            input:         Input::Sql,
            schema:        String::new(),
            ignore:        Vec::new(),
            dialect:       None,
            output_format: Format::Json,
            no_color:      true,
            parallel:      false
        }
    }

    #[test]
    fn test_syntax_error_exit_code() {
        let out = run_advise(params("select * from"), Config::default()).unwrap();
        assert_eq!(out.exit_code, 2);
    }

    #[test]
    fn test_warning_exit_code() {
        let out = run_advise(params("select * from tbl where id = 1"), Config::default()).unwrap();
        assert_eq!(out.exit_code, 1);
        assert!(out.output.contains("COL.001"));
    }

    #[test]
    fn test_comment_only_has_no_entries() {
        let out = run_advise(params("-- nothing"), Config::default()).unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.output.trim(), "[]");
    }

    #[test]
    fn test_missing_input_is_error() {
        let mut p = params("");
        p.sql = None;
        assert!(run_advise(p, Config::default()).is_err());
    }

    #[test]
    fn test_rules_marks_suppressed() {
        let mut config = Config::default();
        config.rules.ignore = vec!["COL.001".to_string()];
        let out = run_rules(
            RulesParams {
                output_format: Format::Json,
                no_color:      true
            },
            config
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out.output).unwrap();
        let col = value
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["id"] == "COL.001")
            .unwrap();
        assert_eq!(col["suppressed"], true);
    }
}
