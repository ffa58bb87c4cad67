//! Helper functions for CLI operations.
//!
//! Reading input, turning it into advise requests, computing the exit code
//! and installing the log subscriber.

use std::{
    fs::read_to_string,
    io::{self, Read}
};

use tracing_subscriber::EnvFilter;

use crate::{
    advisor::AdviseRequest,
    cli::Input,
    error::{AppError, AppResult, file_read_error},
    lexer::split_statements,
    output::AdviceEntry,
    rules::Severity
};

/// Calculates the process exit code from the advice of a batch.
///
/// - `0` - No findings or only informational ones
/// - `1` - At least one warning
/// - `2` - At least one error finding, or a statement that failed to parse
///
/// ```
/// use sql_advisor::app::calculate_exit_code;
///
/// assert_eq!(calculate_exit_code(&[]), 0);
/// ```
pub fn calculate_exit_code(entries: &[AdviceEntry]) -> i32 {
    let mut worst: Option<Severity> = None;
    for entry in entries {
        match entry {
            AdviceEntry::Error {
                ..
            } => return 2,
            AdviceEntry::Advice(response) => worst = worst.max(response.max_severity())
        }
    }
    match worst {
        Some(Severity::Error) => 2,
        Some(Severity::Warning) => 1,
        _ => 0
    }
}

/// Reads input from a file, or from stdin when the path is "-".
pub fn read_input(path: &str) -> AppResult<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        read_to_string(path).map_err(|e| file_read_error(path, e))
    }
}

/// Turns raw input into advise requests.
///
/// SQL input is split on top-level `;`; every statement gets `schema` and
/// `ignore`. JSONL input holds one request per line, blank lines skipped;
/// `ignore` is appended to each request's own patterns.
pub fn build_requests(
    text: &str,
    input: Input,
    schema: &str,
    ignore: &[String]
) -> AppResult<Vec<AdviseRequest>> {
    match input {
        Input::Sql => Ok(split_statements(text)
            .into_iter()
            .map(|sql| {
                AdviseRequest::new(sql)
                    .with_schema(schema)
                    .with_ignore_rules(ignore.to_vec())
            })
            .collect()),
        Input::Jsonl => text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                let mut request: AdviseRequest = serde_json::from_str(line).map_err(|e| {
                    AppError::bad_request(format!("Invalid request on line {}: {}", idx + 1, e))
                })?;
                request.ignore_rules.extend(ignore.iter().cloned());
                Ok(request)
            })
            .collect()
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling it twice is harmless.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requests_sql() {
        let requests = build_requests("select 1; select 2;", Input::Sql, "db", &[]).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].schema, "db");
    }

    #[test]
    fn test_build_requests_jsonl() {
        let text = "{\"schema\": \"db\", \"sql\": \"select 1\"}\n\n{\"sql\": \"select 2\", \"ignore_rules\": [\"COL.001\"]}\n";
        let requests = build_requests(text, Input::Jsonl, "", &["ALI.*".to_string()]).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].schema, "db");
        assert_eq!(requests[1].ignore_rules, vec!["COL.001", "ALI.*"]);
    }

    #[test]
    fn test_build_requests_jsonl_invalid_line() {
        assert!(build_requests("{not json}", Input::Jsonl, "", &[]).is_err());
    }
}
