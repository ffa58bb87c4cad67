use super::{
    Finding, Rule, RuleCategory, RuleInfo, Severity,
    scan::{bodies, top_level}
};
use crate::{
    lexer::{Token, TokenKind},
    query::{AuditContext, ClauseKind}
};

const ALIASED: &[ClauseKind] = &[ClauseKind::Select, ClauseKind::From];

/// Alias declared without the `AS` keyword
///
/// `select name n from tbl t1` reads like a missing comma; an explicit
/// `AS` makes the intent obvious.
pub struct ImplicitAlias;

impl Rule for ImplicitAlias {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ALI.001",
            summary:  "Use the AS keyword to declare aliases",
            severity: Severity::Info,
            category: RuleCategory::Style,
            case:     "select name n from tbl t1 where id < 1000"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        for body in bodies(ctx, ALIASED) {
            let top = top_level(body);
            for pair in top.windows(2) {
                let (prev, alias) = (&body[pair[0]], &body[pair[1]]);
                if pair[1] == pair[0] + 1 && ends_operand(prev) && alias.is_name() {
                    return Some(
                        Finding::new(
                            &self.info(),
                            format!(
                                "Alias '{}' is declared without AS; write `AS {}` explicitly",
                                alias.unquoted(),
                                alias.unquoted()
                            )
                        )
                        .with_detail(alias.unquoted())
                        .at(alias.offset)
                    );
                }
            }
        }
        None
    }
}

fn ends_operand(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Identifier
            | TokenKind::QuotedIdentifier
            | TokenKind::RParen
            | TokenKind::Number
            | TokenKind::String
    )
}

/// Alias identical to the column or table it names
pub struct RedundantAlias;

impl Rule for RedundantAlias {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "ALI.003",
            summary:  "Alias is identical to the original name",
            severity: Severity::Info,
            category: RuleCategory::Style,
            case:     "select name as name from tbl"
        }
    }

    fn check(&self, ctx: &AuditContext) -> Option<Finding> {
        for body in bodies(ctx, ALIASED) {
            for (idx, token) in body.iter().enumerate() {
                if !token.is_word("as") || idx == 0 {
                    continue;
                }
                let (Some(original), Some(alias)) = (body.get(idx - 1), body.get(idx + 1)) else {
                    continue;
                };
                if original.is_name()
                    && alias.is_name()
                    && original.unquoted().eq_ignore_ascii_case(&alias.unquoted())
                {
                    return Some(
                        Finding::new(
                            &self.info(),
                            format!("Alias '{}' repeats the name it aliases; drop it", alias.unquoted())
                        )
                        .with_detail(alias.unquoted())
                        .at(alias.offset)
                    );
                }
            }
        }
        None
    }
}
