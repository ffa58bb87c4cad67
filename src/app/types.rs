//! Application types for CLI commands.
//!
//! Parameters passed from the parsed command line to the command runners,
//! and the output they hand back to `main`.

use crate::cli::{Dialect, Format, Input};

/// Parameters for the advise command.
///
/// # Example
///
/// ```
/// use sql_advisor::{
///     app::AdviseParams,
///     cli::{Format, Input}
/// };
///
/// let params = AdviseParams {
///     sql:           Some("select * from tbl".to_string()),
///     queries_path:  None,
///     input:         Input::Sql,
///     schema:        String::new(),
///     ignore:        vec!["ALI.*".to_string()],
///     dialect:       None,
///     output_format: Format::Json,
///     no_color:      true,
///     parallel:      false
/// };
/// assert!(params.queries_path.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct AdviseParams {
    /// Statement given inline with `--sql`.
    pub sql:           Option<String>,
    /// Path to the input file or "-" for stdin.
    pub queries_path:  Option<String>,
    pub input:         Input,
    /// Default database for unqualified tables.
    pub schema:        String,
    /// Per-request suppression patterns.
    pub ignore:        Vec<String>,
    /// Dialect override; the configured dialect is used when absent.
    pub dialect:       Option<Dialect>,
    pub output_format: Format,
    pub no_color:      bool,
    pub parallel:      bool
}

/// Parameters for the rules command.
#[derive(Debug, Clone)]
pub struct RulesParams {
    pub output_format: Format,
    pub no_color:      bool
}

/// Rendered command output and the exit code it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// 0 = clean or info only, 1 = warnings, 2 = errors or syntax errors.
    pub exit_code: i32,
    pub output:    String
}
