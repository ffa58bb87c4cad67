use std::fmt;

pub use masterror::{AppError, AppResult};
use thiserror::Error;

/// 1-based line and column inside a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Position {
    pub line:   usize,
    pub column: usize
}

impl Position {
    /// Translate a byte offset of `sql` into a line and column.
    pub fn from_offset(sql: &str, offset: usize) -> Self {
        let offset = offset.min(sql.len());
        let before = sql.get(..offset).unwrap_or(sql);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1
        };
        Self {
            line,
            column
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors surfaced by the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Statement could not be tokenized or parsed.
    #[error("syntax error{}: {message}", at_position(.position))]
    Syntax {
        message:  String,
        position: Option<Position>
    },
    /// Invalid registry or suppression setup. Only raised while building.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Analysis stopped by a cancellation token or deadline.
    #[error("analysis cancelled")]
    Cancelled
}

fn at_position(position: &Option<Position>) -> String {
    position.map(|p| format!(" at {p}")).unwrap_or_default()
}

impl EngineError {
    /// Syntax error from a parser message, picking up `Line: X, Column: Y`
    /// when present.
    pub fn syntax(message: impl Into<String>) -> Self {
        let message = message.into();
        let position = extract_position(&message);
        Self::Syntax {
            message,
            position
        }
    }

    /// Syntax error at a byte offset of `sql`.
    pub fn syntax_at(message: impl Into<String>, sql: &str, offset: usize) -> Self {
        Self::Syntax {
            message:  message.into(),
            position: Some(Position::from_offset(sql, offset))
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Syntax {
                message,
                position
            } => AppError::bad_request(format_sql_error("Query parse error", &message, position)),
            EngineError::Configuration(message) => config_error(message),
            EngineError::Cancelled => AppError::service("Analysis cancelled")
        }
    }
}

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

fn format_sql_error(prefix: &str, message: &str, position: Option<Position>) -> String {
    match position {
        Some(pos) => format!("{} at {}:\n  {}", prefix, pos, message),
        None => format!("{}:\n  {}", prefix, message)
    }
}

/// Parse sqlparser's `Line: X, Column: Y` suffix. The colon after `Column`
/// is optional across sqlparser versions.
fn extract_position(message: &str) -> Option<Position> {
    let line_marker = "Line: ";
    let col_marker = ", Column";

    let line_start = message.find(line_marker)? + line_marker.len();
    let col_start = message[line_start..].find(col_marker)? + line_start;
    let line = message[line_start..col_start].trim().parse().ok()?;

    let rest = message[col_start + col_marker.len()..].trim_start_matches([':', ' ']);
    let col_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let column = rest[..col_end].parse().ok()?;

    Some(Position {
        line,
        column
    })
}
