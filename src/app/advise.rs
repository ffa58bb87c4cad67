//! Advise command execution.

use tracing::error;

use super::{
    convert::{convert_dialect, convert_format},
    helpers::{build_requests, calculate_exit_code, read_input},
    types::{AdviseParams, CommandOutput}
};
use crate::{
    advisor::{AdviseRequest, Advisor},
    config::Config,
    error::{AppResult, config_error},
    output::{AdviceEntry, OutputOptions, format_advice}
};

/// Runs the advise command.
///
/// Statements that fail to parse become error entries and set exit code 2;
/// the rest of the batch is still advised. Empty and comment-only
/// statements produce no entry.
///
/// # Errors
///
/// Returns an error when the input cannot be read, a JSONL line is not a
/// valid request, or the configuration is rejected.
pub fn run_advise(params: AdviseParams, mut config: Config) -> AppResult<CommandOutput> {
    if let Some(dialect) = params.dialect {
        config.engine.dialect = convert_dialect(dialect);
    }
    config.engine.parallel |= params.parallel;
    let advisor = Advisor::from_config(&config)?;

    let requests = match (&params.sql, &params.queries_path) {
        (Some(sql), _) => vec![
            AdviseRequest::new(sql.as_str())
                .with_schema(params.schema.as_str())
                .with_ignore_rules(params.ignore.clone()),
        ],
        (None, Some(path)) => {
            let text = read_input(path)?;
            build_requests(&text, params.input, &params.schema, &params.ignore)?
        }
        (None, None) => return Err(config_error("Either --sql or --queries is required"))
    };

    let results = advisor.advise_batch(&requests);
    let entries: Vec<AdviceEntry> = requests
        .iter()
        .zip(results)
        .filter_map(|(request, result)| match result {
            Ok(Some(response)) => Some(AdviceEntry::Advice(response)),
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, "statement rejected");
                Some(AdviceEntry::Error {
                    sql:   request.sql.trim().to_string(),
                    error: e.to_string()
                })
            }
        })
        .collect();

    let opts = OutputOptions {
        format:  convert_format(params.output_format),
        colored: !params.no_color
    };
    Ok(CommandOutput {
        exit_code: calculate_exit_code(&entries),
        output:    format_advice(&entries, &opts)
    })
}
