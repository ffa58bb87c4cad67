use sql_advisor::error::{AppError, EngineError, Position, config_error, file_read_error};

#[test]
fn test_position_from_offset() {
    let sql = "select a\nfrom t\nwhere x";
    assert_eq!(
        Position::from_offset(sql, 0),
        Position {
            line:   1,
            column: 1
        }
    );
    assert_eq!(
        Position::from_offset(sql, 14),
        Position {
            line:   2,
            column: 6
        }
    );
}

#[test]
fn test_position_clamped_to_input() {
    let pos = Position::from_offset("select", 100);
    assert_eq!(pos.line, 1);
    assert_eq!(pos.column, 7);
}

#[test]
fn test_position_display() {
    let pos = Position {
        line:   3,
        column: 9
    };
    assert_eq!(pos.to_string(), "line 3, column 9");
}

#[test]
fn test_syntax_error_display() {
    let err = EngineError::syntax_at("unterminated string literal", "select 'a", 7);
    assert!(err.is_syntax());
    assert_eq!(
        err.to_string(),
        "syntax error at line 1, column 8: unterminated string literal"
    );
}

#[test]
fn test_syntax_error_picks_up_parser_position() {
    let err = EngineError::syntax("Expected: an expression, found: EOF at Line: 1, Column: 14");
    match err {
        EngineError::Syntax {
            position, ..
        } => assert_eq!(
            position,
            Some(Position {
                line:   1,
                column: 14
            })
        ),
        other => panic!("unexpected error: {other:?}")
    }
}

#[test]
fn test_syntax_error_without_position() {
    let err = EngineError::syntax("empty statement");
    assert_eq!(err.to_string(), "syntax error: empty statement");
}

#[test]
fn test_other_variants_display() {
    assert_eq!(EngineError::Cancelled.to_string(), "analysis cancelled");
    assert_eq!(
        EngineError::configuration("bad pattern").to_string(),
        "configuration error: bad pattern"
    );
    assert!(!EngineError::Cancelled.is_syntax());
}

#[test]
fn test_engine_error_into_app_error() {
    let app: AppError = EngineError::syntax("oops").into();
    let _ = app.to_string();
    let app: AppError = EngineError::Cancelled.into();
    let _ = app.to_string();
    let app: AppError = EngineError::configuration("x").into();
    let _ = app.to_string();
}

#[test]
fn test_error_helpers() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let _ = file_read_error("queries.sql", io).to_string();
    let _ = config_error("bad config").to_string();
}
