use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SQL Advisor - fingerprint SQL statements and flag anti-patterns
#[derive(Parser, Debug)]
#[command(name = "sql-advisor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file, takes precedence over the default locations
    #[arg(long, global = true, env = "SQL_ADVISOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Advise on SQL statements
    Advise {
        /// Statement text; takes precedence over --queries
        #[arg(long, conflicts_with = "queries")]
        sql: Option<String>,

        /// Path to SQL statements or JSONL requests (use - for stdin)
        #[arg(short, long)]
        queries: Option<PathBuf>,

        /// Input format of --queries
        #[arg(long, value_enum, default_value = "sql")]
        input: Input,

        /// Default database for unqualified table names
        #[arg(long, default_value = "")]
        schema: String,

        /// Rule id or prefix pattern (ALI.*) to suppress, repeatable
        #[arg(long = "ignore", value_name = "RULE")]
        ignore: Vec<String>,

        /// SQL dialect for parsing, overrides the configuration
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Evaluate the rules of each statement in parallel
        #[arg(long)]
        parallel: bool
    },

    /// List the registered rules
    Rules {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Input {
    /// Statements separated by `;`
    Sql,
    /// One JSON request per line: {"schema", "sql", "ignore_rules"}
    Jsonl
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dialect {
    Generic,
    Mysql,
    Postgresql,
    Sqlite
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
