use std::sync::LazyLock;

use regex::Regex;

use super::{Finding, Rule, RuleCategory, RuleInfo, Severity};
use crate::{
    lexer::{Token, TokenKind},
    query::AuditContext
};

static IPV4_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(25[0-5]|2[0-4]\d|1?\d?\d)(\.(25[0-5]|2[0-4]\d|1?\d?\d)){3}$")
        .expect("valid regex")
});

static ID_LIST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+(\s*,\s*\d+)+\s*$").expect("valid regex"));

/// First string literal whose content matches `regex`.
fn matching_string<'a>(ctx: &'a AuditContext, regex: &Regex) -> Option<&'a Token> {
    ctx.tokens
        .iter()
        .find(|t| t.string_value().is_some_and(|v| regex.is_match(v)))
}

/// IPv4 address kept as a string
pub struct IpAsString;

impl Rule for IpAsString {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "LIT.001",
            summary:  "IP address stored as a string",
            severity: Severity::Info,
            category: RuleCategory::Performance,
            case:     "select c1 from tbl where ip = '192.168.1.1'"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = matching_string(ctx, &IPV4_REGEX)?;
        Some(
            Finding::new(
                &self.info(),
                "IPv4 addresses fit in an unsigned integer; store them with INET_ATON() and compare numerically"
            )
            .with_detail(token.text.as_str())
            .at(token.offset)
        )
    }
}

/// Date written without quotes, e.g. `2018-01-10`
pub struct UnquotedDate;

impl Rule for UnquotedDate {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "LIT.002",
            summary:  "Date literal without quotes",
            severity: Severity::Warning,
            category: RuleCategory::Correctness,
            case:     "select c1 from tbl where created < 2018-01-10"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let window = ctx.tokens.windows(5).find(|w| is_bare_date(w))?;
        let first = &window[0];
        let text = &ctx.sql[first.offset..window[4].end()];
        Some(
            Finding::new(
                &self.info(),
                format!("{} is evaluated as arithmetic; quote the date as '{}'", text, text)
            )
            .with_detail(text)
            .at(first.offset)
        )
    }
}

/// `yyyy-mm-dd` lexed as three numbers joined by minus signs.
fn is_bare_date(window: &[Token]) -> bool {
    let digits = |t: &Token, min: usize, max: usize| {
        t.kind == TokenKind::Number
            && (min..=max).contains(&t.text.len())
            && t.text.bytes().all(|b| b.is_ascii_digit())
    };
    let contiguous = window.windows(2).all(|p| p[0].end() == p[1].offset);
    contiguous
        && digits(&window[0], 4, 4)
        && window[1].is_op("-")
        && digits(&window[2], 1, 2)
        && window[3].is_op("-")
        && digits(&window[4], 1, 2)
}

/// Several ids packed into one string
pub struct IdListString;

impl Rule for IdListString {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "LIT.003",
            summary:  "Comma-separated ids in a single string",
            severity: Severity::Info,
            category: RuleCategory::Correctness,
            case:     "select c1 from tbl where id in ('1,2,3')"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        let token = matching_string(ctx, &ID_LIST_REGEX)?;
        Some(
            Finding::new(
                &self.info(),
                "A single string holding a list of ids matches as one value; pass the ids as separate values"
            )
            .with_detail(token.text.as_str())
            .at(token.offset)
        )
    }
}
