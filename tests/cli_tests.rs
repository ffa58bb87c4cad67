// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use clap::Parser;
use sql_advisor::{
    app::{convert_dialect, convert_format},
    cli::{Cli, Commands, Dialect, Format, Input},
    output::OutputFormat,
    query::SqlDialect
};

#[test]
fn test_parse_advise_defaults() {
    let cli = Cli::try_parse_from(["sql-advisor", "advise", "--sql", "select 1"]).unwrap();
    assert!(cli.config.is_none());
    match cli.command {
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
        } => {
            assert_eq!(sql.as_deref(), Some("select 1"));
            assert!(queries.is_none());
            assert_eq!(input, Input::Sql);
            assert_eq!(schema, "");
            assert!(ignore.is_empty());
            assert!(dialect.is_none());
            assert_eq!(output_format, Format::Text);
            assert!(!no_color);
            assert!(!parallel);
        }
        Commands::Rules {
            ..
        } => panic!("expected advise")
    }
}

#[test]
fn test_parse_advise_options() {
    let cli = Cli::try_parse_from([
        "sql-advisor",
        "advise",
        "-q",
        "-",
        "--input",
        "jsonl",
        "--ignore",
        "COL.001",
        "--ignore",
        "ALI.*",
        "--dialect",
        "postgresql",
        "-f",
        "json",
        "--config",
        "custom.toml"
    ])
    .unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.toml")));
    match cli.command {
        Commands::Advise {
            queries,
            input,
            ignore,
            dialect,
            output_format,
            ..
        } => {
            assert_eq!(queries.as_deref(), Some(std::path::Path::new("-")));
            assert_eq!(input, Input::Jsonl);
            assert_eq!(ignore, vec!["COL.001", "ALI.*"]);
            assert_eq!(dialect, Some(Dialect::Postgresql));
            assert_eq!(output_format, Format::Json);
        }
        Commands::Rules {
            ..
        } => panic!("expected advise")
    }
}

#[test]
fn test_sql_conflicts_with_queries() {
    let result = Cli::try_parse_from([
        "sql-advisor",
        "advise",
        "--sql",
        "select 1",
        "-q",
        "file.sql"
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_rules() {
    let cli = Cli::try_parse_from(["sql-advisor", "rules", "-f", "yaml", "--no-color"]).unwrap();
    match cli.command {
        Commands::Rules {
            output_format,
            no_color
        } => {
            assert_eq!(output_format, Format::Yaml);
            assert!(no_color);
        }
        Commands::Advise {
            ..
        } => panic!("expected rules")
    }
}

#[test]
fn test_unknown_format_rejected() {
    assert!(Cli::try_parse_from(["sql-advisor", "rules", "-f", "sarif"]).is_err());
}

#[test]
fn test_convert_dialect() {
    assert_eq!(convert_dialect(Dialect::Generic), SqlDialect::Generic);
    assert_eq!(convert_dialect(Dialect::Mysql), SqlDialect::MySQL);
    assert_eq!(convert_dialect(Dialect::Postgresql), SqlDialect::PostgreSQL);
    assert_eq!(convert_dialect(Dialect::Sqlite), SqlDialect::SQLite);
}

#[test]
fn test_convert_format() {
    assert_eq!(convert_format(Format::Text), OutputFormat::Text);
    assert_eq!(convert_format(Format::Json), OutputFormat::Json);
    assert_eq!(convert_format(Format::Yaml), OutputFormat::Yaml);
}
