//! Keyword allow-list check run before any statement reaches the driver.

use crate::error::SqlSessionError;

/// Leading keyword a statement was accepted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Update,
    Delete,
    InsertInto,
    Create,
    Drop,
    Alter,
}

impl StatementKind {
    /// The fixed allow-list, checked in this order.
    pub const ALLOWED: [StatementKind; 7] = [
        StatementKind::Select,
        StatementKind::Update,
        StatementKind::Delete,
        StatementKind::InsertInto,
        StatementKind::Create,
        StatementKind::Drop,
        StatementKind::Alter,
    ];

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::InsertInto => "INSERT INTO",
            StatementKind::Create => "CREATE",
            StatementKind::Drop => "DROP",
            StatementKind::Alter => "ALTER",
        }
    }

    /// True for statements that produce rows.
    #[must_use]
    pub fn returns_rows(self) -> bool {
        matches!(self, StatementKind::Select)
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Check that `sql` starts with an allow-listed keyword.
///
/// Leading and trailing characters up to and including space (so ASCII
/// control characters too, but not other Unicode whitespace) are trimmed, and
/// the rest is uppercased before a plain prefix comparison; nothing else about
/// the statement is parsed.
///
/// ```rust
/// use sql_session::prelude::*;
///
/// assert_eq!(validate_statement("  drop table x").unwrap(), StatementKind::Drop);
/// assert!(validate_statement("TRUNCATE x").is_err());
/// ```
///
/// # Errors
///
/// Returns `SqlSessionError::InvalidStatement` when no keyword matches.
pub fn validate_statement(sql: &str) -> Result<StatementKind, SqlSessionError> {
    let normalized = trim_controls(sql).to_uppercase();
    StatementKind::ALLOWED
        .into_iter()
        .find(|kind| normalized.starts_with(kind.keyword()))
        .ok_or_else(|| {
            SqlSessionError::InvalidStatement(format!(
                "statement must start with one of {}: {}",
                allowed_list(),
                preview(sql)
            ))
        })
}

fn trim_controls(sql: &str) -> &str {
    sql.trim_matches(|c: char| c <= ' ')
}

fn allowed_list() -> String {
    StatementKind::ALLOWED
        .iter()
        .map(|kind| kind.keyword())
        .collect::<Vec<_>>()
        .join(", ")
}

fn preview(sql: &str) -> String {
    const MAX: usize = 40;
    let trimmed = trim_controls(sql);
    match trimmed.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
