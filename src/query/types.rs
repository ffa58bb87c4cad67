use std::ops::Range;

use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;
use sqlparser::ast::Statement;

use crate::lexer::{Token, TokenKind};

/// Type alias for small column vectors (typically < 8 elements)
pub type ColumnVec = SmallVec<[CompactString; 8]>;

/// Kind of statement under analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum StatementType {
    Select,
    Insert,
    Replace,
    Update,
    Delete,
    Truncate,
    Ddl,
    Other,
    /// Statement the parser did not recognise; only tokens and clauses are
    /// available.
    Unknown
}

impl StatementType {
    /// Classify a statement by its leading keyword.
    pub fn detect(tokens: &[Token]) -> Self {
        let Some(first) = tokens.iter().find(|t| t.kind != TokenKind::LParen) else {
            return Self::Other;
        };
        if first.kind != TokenKind::Keyword && first.kind != TokenKind::Identifier {
            return Self::Other;
        }
        match first.text.to_ascii_lowercase().as_str() {
            "select" | "with" => Self::Select,
            "insert" => Self::Insert,
            "replace" => Self::Replace,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "truncate" => Self::Truncate,
            "create" | "alter" | "drop" | "rename" => Self::Ddl,
            _ => Self::Other
        }
    }

    /// Data manipulation statements must parse; anything else degrades to
    /// [`StatementType::Unknown`].
    pub fn is_dml(self) -> bool {
        matches!(
            self,
            Self::Select | Self::Insert | Self::Replace | Self::Update | Self::Delete
        )
    }

    /// Statements that write rows.
    pub fn is_write(self) -> bool {
        matches!(self, Self::Insert | Self::Replace | Self::Update | Self::Delete)
    }
}

impl std::fmt::Display for StatementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Replace => write!(f, "REPLACE"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Truncate => write!(f, "TRUNCATE"),
            Self::Ddl => write!(f, "DDL"),
            Self::Other => write!(f, "OTHER"),
            Self::Unknown => write!(f, "UNKNOWN")
        }
    }
}

/// Top-level clause of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClauseKind {
    /// Tokens before the first recognised clause (`update t1 join t2 ...`)
    Head,
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Set,
    Values,
    Into,
    OnDuplicate,
    Union
}

/// Clause position inside the token stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clause {
    pub kind:    ClauseKind,
    /// Index of the first keyword token
    pub keyword: usize,
    /// Token indices after the clause keywords
    pub body:    Range<usize>
}

/// Table referenced by the statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRef {
    pub name:     CompactString,
    pub database: Option<CompactString>,
    pub alias:    Option<CompactString>
}

impl TableRef {
    /// Build from a possibly qualified, possibly quoted name.
    pub fn parse(qualified: &str, alias: Option<&str>) -> Self {
        let parts = split_qualified(qualified);
        let (database, name) = match parts.as_slice() {
            [.., db, name] => (Some(db.clone()), name.clone()),
            [name] => (None, name.clone()),
            [] => (None, CompactString::default())
        };
        Self {
            name,
            database,
            alias: alias.map(CompactString::from)
        }
    }
}

/// Split `a.b.c` on dots outside of quotes, removing quote characters.
fn split_qualified(name: &str) -> Vec<CompactString> {
    let mut parts = Vec::new();
    let mut current = CompactString::default();
    let mut quote: Option<char> = None;
    for c in name.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '`' | '"' | '[') => quote = Some(if c == '[' { ']' } else { c }),
            (None, '.') => parts.push(std::mem::take(&mut current)),
            (None, c) if !c.is_whitespace() => current.push(c),
            (None, _) => {}
        }
    }
    parts.push(current);
    parts
}

/// Parsed statement with everything rules look at.
///
/// Built once per request by [`crate::query::parse`] and never mutated
/// afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct AuditContext {
    pub sql:             String,
    pub schema:          Option<CompactString>,
    pub statement_type:  StatementType,
    /// Token stream with optimizer hints removed
    pub tokens:          Vec<Token>,
    /// Number of enclosing subqueries for every token
    pub nesting:         Vec<usize>,
    pub clauses:         Vec<Clause>,
    /// Referenced tables in order of appearance, duplicates kept
    pub tables:          Vec<TableRef>,
    pub cte_names:       Vec<CompactString>,
    pub where_cols:      ColumnVec,
    pub order_cols:      ColumnVec,
    pub group_cols:      ColumnVec,
    pub having_cols:     ColumnVec,
    /// Columns compared with `=` to a literal in the AND chain of WHERE
    pub eq_literal_cols: ColumnVec,
    /// Columns compared to literals in an OR chain more than once
    pub or_eq_cols:      ColumnVec,
    pub limit:           Option<u64>,
    pub offset:          Option<u64>,
    pub has_union:       bool,
    pub has_distinct:    bool,
    pub has_subquery:    bool,
    #[serde(skip)]
    pub statement:       Option<Statement>
}

impl AuditContext {
    pub fn new(sql: impl Into<String>, statement_type: StatementType, tokens: Vec<Token>) -> Self {
        Self {
            sql: sql.into(),
            schema: None,
            statement_type,
            tokens,
            nesting: Vec::new(),
            clauses: Vec::new(),
            tables: Vec::new(),
            cte_names: Vec::new(),
            where_cols: ColumnVec::new(),
            order_cols: ColumnVec::new(),
            group_cols: ColumnVec::new(),
            having_cols: ColumnVec::new(),
            eq_literal_cols: ColumnVec::new(),
            or_eq_cols: ColumnVec::new(),
            limit: None,
            offset: None,
            has_union: false,
            has_distinct: false,
            has_subquery: false,
            statement: None
        }
    }

    /// First clause of the given kind.
    pub fn clause(&self, kind: ClauseKind) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.kind == kind)
    }

    pub fn clauses_of(&self, kind: ClauseKind) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(move |c| c.kind == kind)
    }

    pub fn has_clause(&self, kind: ClauseKind) -> bool {
        self.clause(kind).is_some()
    }

    /// Tokens of a clause body.
    pub fn body(&self, clause: &Clause) -> &[Token] {
        &self.tokens[clause.body.clone()]
    }

    /// Body tokens of every clause of the given kind, in order.
    pub fn clause_tokens(&self, kind: ClauseKind) -> impl Iterator<Item = &Token> {
        self.clauses_of(kind)
            .flat_map(move |c| self.tokens[c.body.clone()].iter())
    }

    /// Comma separated items of the first clause of the given kind.
    pub fn clause_items(&self, kind: ClauseKind) -> Vec<&[Token]> {
        self.clause(kind)
            .map(|c| split_items(self.body(c)))
            .unwrap_or_default()
    }

    /// Case-insensitive check of the leading words of the statement.
    pub fn starts_with_words(&self, words: &[&str]) -> bool {
        self.tokens.len() >= words.len()
            && self
                .tokens
                .iter()
                .zip(words)
                .all(|(t, w)| t.is_word(w))
    }

    /// Any token of the statement is the given keyword or identifier.
    pub fn contains_word(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t.is_word(word))
    }

    /// Deepest subquery nesting level.
    pub fn subquery_depth(&self) -> usize {
        self.nesting.iter().copied().max().unwrap_or(0)
    }
}

/// Split tokens on commas at parenthesis depth 0.
pub fn split_items(tokens: &[Token]) -> Vec<&[Token]> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                items.push(&tokens[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        items.push(&tokens[start..]);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_qualified_strips_quotes() {
        let parts = split_qualified("`db`.`my.table`");
        assert_eq!(parts, vec!["db", "my.table"]);
    }

    #[test]
    fn test_table_ref_database() {
        let t = TableRef::parse("db1.t1", Some("a"));
        assert_eq!(t.database.as_deref(), Some("db1"));
        assert_eq!(t.name, "t1");
        assert_eq!(t.alias.as_deref(), Some("a"));
    }
}
