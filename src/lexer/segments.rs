//! Quote and comment aware scanning of raw SQL text.
//!
//! Used for the two text-level operations that must not disturb the original
//! statement: comment stripping and splitting a script into statements.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Code,
    Quoted,
    Comment,
    Hint
}

#[derive(Debug)]
struct Segment {
    kind:  SegmentKind,
    range: Range<usize>
}

/// Start of a `--` comment: two dashes followed by whitespace, a control
/// character or the end of input.
pub(crate) fn is_dash_comment(bytes: &[u8], at: usize) -> bool {
    bytes.get(at) == Some(&b'-')
        && bytes.get(at + 1) == Some(&b'-')
        && bytes
            .get(at + 2)
            .is_none_or(|b| b.is_ascii_whitespace() || b.is_ascii_control())
}

/// End of a quoted run starting at `start` (exclusive), or `None` when the
/// quote is never closed. Handles doubled quotes and backslash escapes.
pub(crate) fn quoted_end(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let escapes = quote != b'`';
    let mut pos = start + 1;
    while pos < bytes.len() {
        let b = bytes[pos];
        if escapes && b == b'\\' {
            pos += 2;
            continue;
        }
        if b == quote {
            if bytes.get(pos + 1) == Some(&quote) {
                pos += 2;
                continue;
            }
            return Some(pos + 1);
        }
        pos += 1;
    }
    None
}

fn scan(sql: &str) -> Vec<Segment> {
    let bytes = sql.as_bytes();
    let mut segments = Vec::new();
    let mut code_start = 0;
    let mut pos = 0;
    let push = |segments: &mut Vec<Segment>, kind, range: Range<usize>| {
        if !range.is_empty() {
            segments.push(Segment {
                kind,
                range
            });
        }
    };
    while pos < bytes.len() {
        let b = bytes[pos];
        let (kind, end) = match b {
            b'\'' | b'"' | b'`' => match quoted_end(bytes, pos) {
                Some(end) => (SegmentKind::Quoted, end),
                None => (SegmentKind::Quoted, bytes.len())
            },
            b'#' => (SegmentKind::Comment, line_end(bytes, pos)),
            b'-' if is_dash_comment(bytes, pos) => (SegmentKind::Comment, line_end(bytes, pos)),
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                let kind = match bytes.get(pos + 2) {
                    Some(b'!') | Some(b'+') => SegmentKind::Hint,
                    _ => SegmentKind::Comment
                };
                match find(bytes, pos + 2, b"*/") {
                    Some(close) => (kind, close + 2),
                    // left in place so the strict lexer reports it
                    None => (SegmentKind::Code, bytes.len())
                }
            }
            _ => {
                pos += 1;
                continue;
            }
        };
        push(&mut segments, SegmentKind::Code, code_start..pos);
        push(&mut segments, kind, pos..end);
        pos = end;
        code_start = end;
    }
    push(&mut segments, SegmentKind::Code, code_start..bytes.len());
    segments
}

pub(crate) fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| from + p)
}

pub(crate) fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

/// Remove `--`, `#` and `/* */` comments outside of quotes and trim the
/// result. Optimizer hints (`/*+ */`) and executable comments (`/*! */`) are
/// kept.
///
/// ```
/// use sql_advisor::lexer::strip_comments;
///
/// assert_eq!(strip_comments("select 1 -- trailing"), "select 1");
/// assert_eq!(strip_comments("-- just a comment"), "");
/// assert_eq!(strip_comments("select '--' /* c */ from t"), "select '--'   from t");
/// ```
pub fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    for segment in scan(sql) {
        match segment.kind {
            SegmentKind::Comment => out.push(' '),
            _ => out.push_str(&sql[segment.range])
        }
    }
    out.trim().to_string()
}

/// Split a script into statements on top-level `;`.
///
/// Pieces that contain nothing but whitespace and comments are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut start = 0;
    for segment in scan(sql) {
        if segment.kind != SegmentKind::Code {
            continue;
        }
        for (i, b) in sql[segment.range.clone()].bytes().enumerate() {
            if b == b';' {
                let end = segment.range.start + i;
                push_statement(&mut statements, &sql[start..end]);
                start = end + 1;
            }
        }
    }
    push_statement(&mut statements, &sql[start..]);
    statements
}

fn push_statement(statements: &mut Vec<String>, piece: &str) {
    if !strip_comments(piece).is_empty() {
        statements.push(piece.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_comment_requires_space() {
        assert_eq!(strip_comments("select 1--2"), "select 1--2");
        assert_eq!(strip_comments("select 1 -- 2"), "select 1");
    }

    #[test]
    fn test_hash_comment_until_newline() {
        assert_eq!(strip_comments("select a # note\nfrom t"), "select a  \nfrom t");
    }

    #[test]
    fn test_hint_is_kept() {
        let sql = "select /*+ MAX_EXECUTION_TIME(1000) */ a from t";
        assert_eq!(strip_comments(sql), sql);
    }

    #[test]
    fn test_quoted_comment_markers_are_kept() {
        assert_eq!(strip_comments("select '# no' from t"), "select '# no' from t");
        assert_eq!(strip_comments("select 'it''s -- x'"), "select 'it''s -- x'");
    }

    #[test]
    fn test_unterminated_block_comment_is_left_in_place() {
        assert_eq!(strip_comments("select 1 /* open"), "select 1 /* open");
    }

    #[test]
    fn test_split_ignores_quoted_semicolons() {
        let parts = split_statements("select ';' from t; -- c\n; update t set a = 1;");
        assert_eq!(parts, vec!["select ';' from t", "update t set a = 1"]);
    }
}
