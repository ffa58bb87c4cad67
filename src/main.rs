//! # SQL Advisor
//!
//! Fingerprinting and heuristic review for SQL statements.
//!
//! Every statement is reduced to a literal-free fingerprint with a stable
//! 16 character id, parsed into an audit context and checked against a
//! catalog of anti-pattern rules.
//!
//! # Quick Start
//!
//! ```bash
//! # One statement
//! sql-advisor advise --sql "select * from users where id = 1"
//!
//! # A file of statements separated by `;`, as JSON
//! sql-advisor advise -q queries.sql -f json
//!
//! # JSON lines from stdin: {"schema": "db", "sql": "...", "ignore_rules": []}
//! cat requests.jsonl | sql-advisor advise -q - --input jsonl
//!
//! # Rule catalog
//! sql-advisor rules
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success, no findings or only informational ones
//! - `1` - Warnings found, or a fatal setup error
//! - `2` - Errors found, or a statement failed to parse
//!
//! # Logging
//!
//! Diagnostics go to stderr. `RUST_LOG` takes precedence over the `[log]`
//! level from configuration.

use std::process;

use clap::Parser;
use sql_advisor::{
    app::{AdviseParams, RulesParams, init_tracing, run_advise, run_rules},
    cli::{Cli, Commands},
    config::Config,
    error::AppResult
};

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load_from(cli.config.as_deref())?;
    init_tracing(&config.log.level);

    let output = match cli.command {
        Commands::Advise {
            sql,
            queries,
            input,
            schema,
            ignore,
            dialect,
            output_format,
            no_color,
            parallel
        } => run_advise(
            AdviseParams {
                sql,
                queries_path: queries.map(|p| p.display().to_string()),
                input,
                schema,
                ignore,
                dialect,
                output_format,
                no_color,
                parallel
            },
            config
        )?,
        Commands::Rules {
            output_format,
            no_color
        } => run_rules(
            RulesParams {
                output_format,
                no_color
            },
            config
        )?
    };

    println!("{}", output.output);
    Ok(output.exit_code)
}
