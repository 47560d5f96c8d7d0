//! Audit data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Audit Query Constants
// ============================================================================

/// Default number of audit entries returned per query
pub const DEFAULT_AUDIT_QUERY_LIMIT: i64 = 100;

/// Maximum number of audit entries that can be returned in a single query.
pub const MAX_AUDIT_QUERY_LIMIT: i64 = 1000;

/// Longest display string stored with an entry
pub const MAX_OBJECT_REPR_CHARS: usize = 200;

/// Audit log entry from the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    /// User who performed the action (none for anonymous or deleted users)
    pub user_id: Option<Uuid>,
    /// Username of `user_id`, joined at read time
    pub username: Option<String>,
    pub action: String,
    pub object_type: String,
    pub object_id: Option<Uuid>,
    pub object_repr: String,
    /// `{"created": true}`, `{"deleted": true}` or `{field: {"old", "new"}}`
    pub changes: JsonValue,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl AuditEntry {
    /// Human-readable action, falling back to the stored value
    pub fn action_label(&self) -> String {
        self.action
            .parse::<AuditAction>()
            .map(|a| a.label().to_string())
            .unwrap_or_else(|_| self.action.clone())
    }
}

/// Audit action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    Loan,
    Return,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Loan => "loan",
            Self::Return => "return",
        }
    }

    /// Display label used in statistics and exports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create => "Creation",
            Self::Update => "Update",
            Self::Delete => "Deletion",
            Self::Login => "Login",
            Self::Logout => "Logout",
            Self::Loan => "Loan",
            Self::Return => "Return",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "login" => Ok(Self::Login),
            "logout" => Ok(Self::Logout),
            "loan" => Ok(Self::Loan),
            "return" => Ok(Self::Return),
            other => Err(format!("unknown audit action '{}'", other)),
        }
    }
}

/// Entity types whose changes can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Book,
    Author,
    Genre,
    Loan,
    Profile,
    User,
}

impl ObjectType {
    pub const ALL: [ObjectType; 6] = [
        Self::Book,
        Self::Author,
        Self::Genre,
        Self::Loan,
        Self::Profile,
        Self::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::Author => "Author",
            Self::Genre => "Genre",
            Self::Loan => "Loan",
            Self::Profile => "Profile",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown object type '{}'", s))
    }
}

/// Query parameters for audit logs
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub object_type: Option<ObjectType>,
    pub object_id: Option<Uuid>,
    /// Start timestamp for range query
    pub start_time: Option<DateTime<Utc>>,
    /// End timestamp for range query
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_AUDIT_QUERY_LIMIT
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            action: None,
            object_type: None,
            object_id: None,
            start_time: None,
            end_time: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl AuditQuery {
    /// Limit clamped to `1..=MAX_AUDIT_QUERY_LIMIT`
    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_AUDIT_QUERY_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.max(0)
    }
}

/// Which records a caller may read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditScope {
    /// Staff see the whole log
    All,
    /// Everyone else sees the records they caused
    User(Uuid),
}

impl AuditScope {
    /// Bind value for `($n::uuid IS NULL OR user_id = $n)`
    pub fn user_filter(&self) -> Option<Uuid> {
        match self {
            Self::All => None,
            Self::User(id) => Some(*id),
        }
    }
}

/// Data for creating a new audit entry
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAuditEntry {
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub object_type: ObjectType,
    pub object_id: Option<Uuid>,
    pub object_repr: String,
    pub changes: JsonValue,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

/// Cut a display string to at most `MAX_OBJECT_REPR_CHARS` characters
pub fn truncate_repr(repr: &str) -> String {
    match repr.char_indices().nth(MAX_OBJECT_REPR_CHARS) {
        Some((byte_idx, _)) => repr[..byte_idx].to_string(),
        None => repr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_round_trip() {
        for action in [
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::Login,
            AuditAction::Logout,
            AuditAction::Loan,
            AuditAction::Return,
        ] {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
        assert!("export".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&AuditAction::Return).unwrap();
        assert_eq!(json, r#""return""#);

        let action: AuditAction = serde_json::from_str(r#""loan""#).unwrap();
        assert_eq!(action, AuditAction::Loan);
    }

    #[test]
    fn test_object_type_parsing_is_case_insensitive() {
        assert_eq!("book".parse::<ObjectType>().unwrap(), ObjectType::Book);
        assert_eq!(" Profile ".parse::<ObjectType>().unwrap(), ObjectType::Profile);
        assert!("AuditLog".parse::<ObjectType>().is_err());
    }

    #[test]
    fn test_query_limits_are_clamped() {
        let query = AuditQuery {
            limit: 5000,
            offset: -3,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), MAX_AUDIT_QUERY_LIMIT);
        assert_eq!(query.effective_offset(), 0);
        assert_eq!(AuditQuery::default().effective_limit(), 100);
    }

    #[test]
    fn test_truncate_repr_respects_char_boundaries() {
        let long = "ñ".repeat(250);
        let cut = truncate_repr(&long);
        assert_eq!(cut.chars().count(), MAX_OBJECT_REPR_CHARS);
        assert_eq!(truncate_repr("Rayuela"), "Rayuela");
    }

    #[test]
    fn test_scope_filter() {
        let id = Uuid::new_v4();
        assert_eq!(AuditScope::All.user_filter(), None);
        assert_eq!(AuditScope::User(id).user_filter(), Some(id));
    }
}
