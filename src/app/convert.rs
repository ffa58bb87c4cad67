//! Type conversion functions for CLI to internal types.

use crate::{
    cli::{Dialect, Format},
    output::OutputFormat,
    query::SqlDialect
};

/// Converts a CLI dialect enum to the internal SQL dialect type.
///
/// The CLI exposes lower-case dialect names through clap; the advisor
/// parses statements with the matching sqlparser dialect.
///
/// # Arguments
///
/// * `dialect` - The dialect given with `--dialect`
///
/// # Returns
///
/// The corresponding internal `SqlDialect` variant.
///
/// # Example
///
/// ```
/// use sql_advisor::{app::convert_dialect, cli::Dialect, query::SqlDialect};
///
/// let dialect = convert_dialect(Dialect::Mysql);
/// assert!(matches!(dialect, SqlDialect::MySQL));
/// ```
pub fn convert_dialect(dialect: Dialect) -> SqlDialect {
    match dialect {
        Dialect::Generic => SqlDialect::Generic,
        Dialect::Mysql => SqlDialect::MySQL,
        Dialect::Postgresql => SqlDialect::PostgreSQL,
        Dialect::Sqlite => SqlDialect::SQLite
    }
}

/// Converts a CLI format enum to the internal output format type.
///
/// # Arguments
///
/// * `format` - The format given with `-f` / `--output-format`
///
/// # Returns
///
/// The corresponding internal `OutputFormat` variant.
///
/// # Example
///
/// ```
/// use sql_advisor::{app::convert_format, cli::Format, output::OutputFormat};
///
/// let format = convert_format(Format::Yaml);
/// assert!(matches!(format, OutputFormat::Yaml));
/// ```
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}
