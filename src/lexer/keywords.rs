//! Reserved words recognised by the lexer.
//!
//! The list is intentionally limited to words that structure a statement or
//! can follow a table or column name. Function names such as `count` or
//! `date` stay identifiers.

/// Sorted, lower-case keyword table (binary searched).
const KEYWORDS: &[&str] = &[
    "add",
    "all",
    "alter",
    "analyze",
    "and",
    "any",
    "as",
    "asc",
    "before",
    "between",
    "both",
    "by",
    "call",
    "case",
    "change",
    "character",
    "charset",
    "check",
    "collate",
    "column",
    "constraint",
    "create",
    "cross",
    "current_date",
    "current_time",
    "current_timestamp",
    "database",
    "delayed",
    "delete",
    "desc",
    "describe",
    "distinct",
    "distinctrow",
    "div",
    "drop",
    "dual",
    "duplicate",
    "else",
    "elseif",
    "end",
    "escape",
    "except",
    "exists",
    "explain",
    "false",
    "fetch",
    "for",
    "force",
    "foreign",
    "from",
    "full",
    "fulltext",
    "grant",
    "group",
    "having",
    "high_priority",
    "identified",
    "if",
    "ignore",
    "in",
    "index",
    "infile",
    "inner",
    "insert",
    "intersect",
    "interval",
    "into",
    "is",
    "join",
    "key",
    "keys",
    "kill",
    "lateral",
    "leading",
    "left",
    "like",
    "limit",
    "lines",
    "load",
    "local",
    "lock",
    "locked",
    "low_priority",
    "match",
    "mode",
    "natural",
    "not",
    "nowait",
    "null",
    "offset",
    "on",
    "optimize",
    "or",
    "order",
    "outer",
    "outfile",
    "over",
    "partition",
    "primary",
    "procedure",
    "quick",
    "recursive",
    "regexp",
    "rename",
    "replace",
    "returning",
    "revoke",
    "right",
    "rlike",
    "rollup",
    "schema",
    "select",
    "separator",
    "set",
    "share",
    "show",
    "signed",
    "skip",
    "some",
    "sql_big_result",
    "sql_buffer_result",
    "sql_cache",
    "sql_calc_found_rows",
    "sql_no_cache",
    "sql_small_result",
    "straight_join",
    "table",
    "then",
    "to",
    "trailing",
    "true",
    "truncate",
    "union",
    "unique",
    "unlock",
    "unsigned",
    "update",
    "use",
    "using",
    "values",
    "when",
    "where",
    "window",
    "with",
    "xor",
];

/// Keywords rendered without a space before an opening parenthesis.
const CALLABLE_KEYWORDS: &[&str] = &[
    "database", "if", "in", "insert", "left", "replace", "right", "schema", "values",
];

/// Returns true when `word` (any case) is a reserved keyword.
pub fn is_keyword(word: &str) -> bool {
    if word.bytes().any(|b| b.is_ascii_uppercase()) {
        KEYWORDS
            .binary_search(&word.to_ascii_lowercase().as_str())
            .is_ok()
    } else {
        KEYWORDS.binary_search(&word).is_ok()
    }
}

/// Keywords that read as a call when followed by `(`.
pub fn is_callable_keyword(word: &str) -> bool {
    CALLABLE_KEYWORDS
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table_is_sorted() {
        assert!(KEYWORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_keyword_lookup_ignores_case() {
        assert!(is_keyword("SELECT"));
        assert!(is_keyword("straight_join"));
        assert!(!is_keyword("count"));
        assert!(!is_keyword("users"));
    }
}
