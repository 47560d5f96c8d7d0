//! Change capture for tracked entities
//!
//! Write paths hand the recorder the row they created or deleted, or the
//! before and after images of the row they updated. The recorder turns that
//! into an audit entry with a field-level diff. Recording is best effort: a
//! failed insert is logged and swallowed so the originating request still
//! succeeds.

use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::models::{truncate_repr, AuditAction, AuditEntry, CreateAuditEntry, ObjectType};
use super::queries::create_audit_entry;

/// A row type whose changes are recorded in the audit log
///
/// The serde serialization of the row defines which fields are compared.
/// Fields skipped during serialization are never captured.
pub trait Auditable: Serialize {
    const OBJECT_TYPE: ObjectType;

    fn object_id(&self) -> Uuid;

    /// Display string stored as `object_repr`
    fn object_repr(&self) -> String;

    /// Fields left out of update diffs
    fn ignored_fields() -> &'static [&'static str] {
        &[]
    }
}

/// Who caused a change and from where
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditContext {
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl AuditContext {
    pub fn system() -> Self {
        Self::default()
    }
}

/// Render a JSON value the way it is stored in a diff
pub fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Field-level differences between two images of the same row
///
/// Returns `{field: {"old": .., "new": ..}}` for every serialized field
/// whose value changed, skipping `T::ignored_fields()`.
pub fn diff<T: Auditable>(before: &T, after: &T) -> Map<String, JsonValue> {
    let (Ok(JsonValue::Object(old)), Ok(JsonValue::Object(new))) =
        (serde_json::to_value(before), serde_json::to_value(after))
    else {
        return Map::new();
    };

    let ignored = T::ignored_fields();
    let mut changes = Map::new();

    for (field, new_value) in &new {
        if ignored.contains(&field.as_str()) {
            continue;
        }
        let old_value = old.get(field).unwrap_or(&JsonValue::Null);
        if old_value != new_value {
            changes.insert(
                field.clone(),
                json!({
                    "old": render_value(old_value),
                    "new": render_value(new_value),
                }),
            );
        }
    }

    changes
}

/// Build the entry for `row` without touching the database
pub fn entry_for<T: Auditable>(
    ctx: &AuditContext,
    action: AuditAction,
    row: &T,
    changes: JsonValue,
) -> CreateAuditEntry {
    CreateAuditEntry {
        user_id: ctx.user_id,
        action,
        object_type: T::OBJECT_TYPE,
        object_id: Some(row.object_id()),
        object_repr: truncate_repr(&row.object_repr()),
        changes,
        ip_address: ctx.ip_address.clone(),
        user_agent: ctx.user_agent.clone(),
    }
}

/// Writes audit entries for the tracked object types
#[derive(Clone)]
pub struct AuditRecorder {
    pool: PgPool,
    tracked: Arc<HashSet<ObjectType>>,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("tracked", &self.tracked)
            .finish_non_exhaustive()
    }
}

impl AuditRecorder {
    pub fn new(pool: PgPool, tracked: impl IntoIterator<Item = ObjectType>) -> Self {
        Self {
            pool,
            tracked: Arc::new(tracked.into_iter().collect()),
        }
    }

    pub fn is_tracked(&self, object_type: ObjectType) -> bool {
        self.tracked.contains(&object_type)
    }

    pub async fn created<T: Auditable>(&self, ctx: &AuditContext, row: &T) -> Option<AuditEntry> {
        self.event(ctx, AuditAction::Create, row, json!({"created": true}))
            .await
    }

    /// Records an update, or nothing when no captured field changed
    pub async fn updated<T: Auditable>(
        &self,
        ctx: &AuditContext,
        before: &T,
        after: &T,
    ) -> Option<AuditEntry> {
        if !self.is_tracked(T::OBJECT_TYPE) {
            return None;
        }
        let changes = diff(before, after);
        if changes.is_empty() {
            tracing::debug!(
                target: "audit",
                object_type = %T::OBJECT_TYPE,
                object_id = %after.object_id(),
                "No field changes, update not recorded"
            );
            return None;
        }
        self.event(ctx, AuditAction::Update, after, JsonValue::Object(changes))
            .await
    }

    pub async fn deleted<T: Auditable>(&self, ctx: &AuditContext, row: &T) -> Option<AuditEntry> {
        self.event(ctx, AuditAction::Delete, row, json!({"deleted": true}))
            .await
    }

    /// Login and logout records for `user`
    pub async fn session<T: Auditable>(
        &self,
        ctx: &AuditContext,
        action: AuditAction,
        user: &T,
    ) -> Option<AuditEntry> {
        let changes = match action {
            AuditAction::Login => json!({"login_success": true}),
            AuditAction::Logout => json!({"logout_success": true}),
            _ => json!({}),
        };
        self.event(ctx, action, user, changes).await
    }

    /// Record any action with caller-supplied changes
    pub async fn event<T: Auditable>(
        &self,
        ctx: &AuditContext,
        action: AuditAction,
        row: &T,
        changes: JsonValue,
    ) -> Option<AuditEntry> {
        if !self.is_tracked(T::OBJECT_TYPE) {
            return None;
        }
        self.record(entry_for(ctx, action, row, changes)).await
    }

    async fn record(&self, entry: CreateAuditEntry) -> Option<AuditEntry> {
        let action = entry.action;
        let object_type = entry.object_type;
        let object_id = entry.object_id;

        match create_audit_entry(&self.pool, entry).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(
                    target: "audit",
                    error = %e,
                    %action,
                    %object_type,
                    object_id = ?object_id,
                    "Failed to write audit log entry"
                );
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use sqlx::postgres::PgPoolOptions;

    #[derive(Clone, Serialize)]
    struct Shelf {
        id: Uuid,
        label: String,
        capacity: i32,
        note: Option<String>,
        touched: i64,
        #[serde(skip_serializing)]
        secret: String,
    }

    impl Auditable for Shelf {
        const OBJECT_TYPE: ObjectType = ObjectType::Genre;

        fn object_id(&self) -> Uuid {
            self.id
        }

        fn object_repr(&self) -> String {
            self.label.clone()
        }

        fn ignored_fields() -> &'static [&'static str] {
            &["touched"]
        }
    }

    fn shelf() -> Shelf {
        Shelf {
            id: Uuid::new_v4(),
            label: "Novela".to_string(),
            capacity: 40,
            note: None,
            touched: 1,
            secret: "a".to_string(),
        }
    }

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/libris")
            .unwrap()
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("Rayuela")), "Rayuela");
        assert_eq!(render_value(&JsonValue::Null), "null");
        assert_eq!(render_value(&json!(471)), "471");
        assert_eq!(render_value(&json!(true)), "true");
    }

    #[test]
    fn test_diff_reports_changed_fields_only() {
        let before = shelf();
        let mut after = before.clone();
        after.label = "Novela negra".to_string();
        after.note = Some("basement".to_string());

        let changes = diff(&before, &after);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["label"], json!({"old": "Novela", "new": "Novela negra"}));
        assert_eq!(changes["note"], json!({"old": "null", "new": "basement"}));
    }

    #[test]
    fn test_diff_skips_ignored_and_unserialized_fields() {
        let before = shelf();
        let mut after = before.clone();
        after.touched = 99;
        after.secret = "b".to_string();

        assert!(diff(&before, &after).is_empty());
    }

    #[test]
    fn test_entry_for_copies_context() {
        let row = shelf();
        let ctx = AuditContext {
            user_id: Some(Uuid::new_v4()),
            ip_address: Some("10.0.0.7".to_string()),
            user_agent: "curl/8.0".to_string(),
        };

        let entry = entry_for(&ctx, AuditAction::Delete, &row, json!({"deleted": true}));
        assert_eq!(entry.user_id, ctx.user_id);
        assert_eq!(entry.object_type, ObjectType::Genre);
        assert_eq!(entry.object_id, Some(row.id));
        assert_eq!(entry.object_repr, "Novela");
        assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.7"));
    }

    #[tokio::test]
    async fn test_untracked_types_are_skipped() {
        let recorder = AuditRecorder::new(lazy_pool(), [ObjectType::Book]);
        let row = shelf();

        assert!(!recorder.is_tracked(ObjectType::Genre));
        assert!(recorder.created(&AuditContext::system(), &row).await.is_none());
        assert!(recorder.deleted(&AuditContext::system(), &row).await.is_none());
    }

    #[tokio::test]
    async fn test_unchanged_update_writes_nothing() {
        let recorder = AuditRecorder::new(lazy_pool(), ObjectType::ALL);
        let row = shelf();

        assert!(recorder
            .updated(&AuditContext::system(), &row, &row)
            .await
            .is_none());
    }
}
