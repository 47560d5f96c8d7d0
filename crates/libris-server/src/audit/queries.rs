//! Database queries for audit logs

use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::models::{AuditEntry, AuditQuery, AuditScope, CreateAuditEntry};
use crate::error::ServerResult;

const ENTRY_COLUMNS: &str = r#"
    a.id, a.user_id, u.username, a.action, a.object_type, a.object_id,
    a.object_repr, a.changes, a.timestamp, a.ip_address, a.user_agent
"#;

/// Create a new audit log entry
///
/// Inserts the record and returns it with the generated id, timestamp and
/// the acting user's name.
pub async fn create_audit_entry(
    pool: &PgPool,
    entry: CreateAuditEntry,
) -> ServerResult<AuditEntry> {
    let sql = format!(
        r#"
        WITH a AS (
            INSERT INTO audit_log (
                user_id, action, object_type, object_id,
                object_repr, changes, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
        )
        SELECT {ENTRY_COLUMNS}
        FROM a
        LEFT JOIN users u ON u.id = a.user_id
        "#
    );

    let record = sqlx::query_as::<_, AuditEntry>(&sql)
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(entry.object_type.as_str())
        .bind(entry.object_id)
        .bind(&entry.object_repr)
        .bind(&entry.changes)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .fetch_one(pool)
        .await?;

    debug!(
        audit_id = %record.id,
        action = %entry.action,
        object_type = %entry.object_type,
        "Created audit log entry"
    );

    Ok(record)
}

/// Fetch one entry if it is inside the caller's scope
pub async fn get_audit_entry(
    pool: &PgPool,
    id: Uuid,
    scope: AuditScope,
) -> ServerResult<Option<AuditEntry>> {
    let sql = format!(
        r#"
        SELECT {ENTRY_COLUMNS}
        FROM audit_log a
        LEFT JOIN users u ON u.id = a.user_id
        WHERE a.id = $1 AND ($2::uuid IS NULL OR a.user_id = $2)
        "#
    );

    let record = sqlx::query_as::<_, AuditEntry>(&sql)
        .bind(id)
        .bind(scope.user_filter())
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// Query audit logs with filters
///
/// Builds the WHERE clause from the filters that are set, always restricted
/// to the caller's scope. Newest entries come first.
pub async fn query_audit_logs(
    pool: &PgPool,
    query: &AuditQuery,
    scope: AuditScope,
) -> ServerResult<Vec<AuditEntry>> {
    let mut sql = format!(
        r#"
        SELECT {ENTRY_COLUMNS}
        FROM audit_log a
        LEFT JOIN users u ON u.id = a.user_id
        WHERE ($1::uuid IS NULL OR a.user_id = $1)
        "#
    );

    let mut bind_count = 2;
    let mut conditions = Vec::new();

    if query.user_id.is_some() {
        conditions.push(format!("a.user_id = ${}", bind_count));
        bind_count += 1;
    }
    if query.action.is_some() {
        conditions.push(format!("a.action = ${}", bind_count));
        bind_count += 1;
    }
    if query.object_type.is_some() {
        conditions.push(format!("a.object_type = ${}", bind_count));
        bind_count += 1;
    }
    if query.object_id.is_some() {
        conditions.push(format!("a.object_id = ${}", bind_count));
        bind_count += 1;
    }
    if query.start_time.is_some() {
        conditions.push(format!("a.timestamp >= ${}", bind_count));
        bind_count += 1;
    }
    if query.end_time.is_some() {
        conditions.push(format!("a.timestamp <= ${}", bind_count));
        bind_count += 1;
    }

    for condition in conditions {
        sql.push_str(" AND ");
        sql.push_str(&condition);
    }

    sql.push_str(" ORDER BY a.timestamp DESC");
    sql.push_str(&format!(" LIMIT ${}", bind_count));
    bind_count += 1;
    sql.push_str(&format!(" OFFSET ${}", bind_count));

    let mut query_builder = sqlx::query_as::<_, AuditEntry>(&sql).bind(scope.user_filter());

    if let Some(user_id) = query.user_id {
        query_builder = query_builder.bind(user_id);
    }
    if let Some(action) = query.action {
        query_builder = query_builder.bind(action.as_str());
    }
    if let Some(object_type) = query.object_type {
        query_builder = query_builder.bind(object_type.as_str());
    }
    if let Some(object_id) = query.object_id {
        query_builder = query_builder.bind(object_id);
    }
    if let Some(start_time) = query.start_time {
        query_builder = query_builder.bind(start_time);
    }
    if let Some(end_time) = query.end_time {
        query_builder = query_builder.bind(end_time);
    }

    query_builder = query_builder
        .bind(query.effective_limit())
        .bind(query.effective_offset());

    let records = query_builder.fetch_all(pool).await?;

    debug!(count = records.len(), "Queried audit logs");

    Ok(records)
}

/// Newest-first entries for a spreadsheet export, at most `max_rows`
pub async fn export_rows(
    pool: &PgPool,
    scope: AuditScope,
    max_rows: i64,
) -> ServerResult<Vec<AuditEntry>> {
    let sql = format!(
        r#"
        SELECT {ENTRY_COLUMNS}
        FROM audit_log a
        LEFT JOIN users u ON u.id = a.user_id
        WHERE ($1::uuid IS NULL OR a.user_id = $1)
        ORDER BY a.timestamp DESC
        LIMIT $2
        "#
    );

    let records = sqlx::query_as::<_, AuditEntry>(&sql)
        .bind(scope.user_filter())
        .bind(max_rows)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

pub async fn count_audit_logs(pool: &PgPool, scope: AuditScope) -> ServerResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM audit_log WHERE ($1::uuid IS NULL OR user_id = $1)",
    )
    .bind(scope.user_filter())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::models::{AuditAction, ObjectType};
    use serde_json::json;

    async fn insert_user(pool: &PgPool, username: &str) -> sqlx::Result<Uuid> {
        sqlx::query_scalar(
            "INSERT INTO users (username, password_hash) VALUES ($1, 'x') RETURNING id",
        )
        .bind(username)
        .fetch_one(pool)
        .await
    }

    fn entry(user_id: Option<Uuid>, action: AuditAction, object_type: ObjectType) -> CreateAuditEntry {
        CreateAuditEntry {
            user_id,
            action,
            object_type,
            object_id: Some(Uuid::new_v4()),
            object_repr: "Rayuela - Julio Cortázar".to_string(),
            changes: json!({"created": true}),
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: "test-agent".to_string(),
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_audit_entry(pool: PgPool) -> ServerResult<()> {
        let user_id = insert_user(&pool, "librarian").await?;

        let result =
            create_audit_entry(&pool, entry(Some(user_id), AuditAction::Create, ObjectType::Book))
                .await?;

        assert_eq!(result.action, "create");
        assert_eq!(result.object_type, "Book");
        assert_eq!(result.username.as_deref(), Some("librarian"));
        assert_eq!(result.changes, json!({"created": true}));

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_scope_limits_visibility(pool: PgPool) -> ServerResult<()> {
        let alice = insert_user(&pool, "alice").await?;
        let bob = insert_user(&pool, "bob").await?;

        for _ in 0..3 {
            create_audit_entry(&pool, entry(Some(alice), AuditAction::Update, ObjectType::Book))
                .await?;
        }
        let bobs =
            create_audit_entry(&pool, entry(Some(bob), AuditAction::Delete, ObjectType::Genre))
                .await?;

        let all = query_audit_logs(&pool, &AuditQuery::default(), AuditScope::All).await?;
        assert_eq!(all.len(), 4);

        let own = query_audit_logs(&pool, &AuditQuery::default(), AuditScope::User(alice)).await?;
        assert_eq!(own.len(), 3);
        assert!(own.iter().all(|r| r.user_id == Some(alice)));

        assert!(get_audit_entry(&pool, bobs.id, AuditScope::User(alice)).await?.is_none());
        assert!(get_audit_entry(&pool, bobs.id, AuditScope::All).await?.is_some());
        assert_eq!(count_audit_logs(&pool, AuditScope::User(bob)).await?, 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_filters_and_export_cap(pool: PgPool) -> ServerResult<()> {
        let user = insert_user(&pool, "carol").await?;
        create_audit_entry(&pool, entry(Some(user), AuditAction::Create, ObjectType::Book)).await?;
        create_audit_entry(&pool, entry(Some(user), AuditAction::Loan, ObjectType::Loan)).await?;
        create_audit_entry(&pool, entry(None, AuditAction::Create, ObjectType::Author)).await?;

        let loans = query_audit_logs(
            &pool,
            &AuditQuery {
                action: Some(AuditAction::Loan),
                ..Default::default()
            },
            AuditScope::All,
        )
        .await?;
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].object_type, "Loan");

        let exported = export_rows(&pool, AuditScope::All, 2).await?;
        assert_eq!(exported.len(), 2);
        assert!(exported[0].timestamp >= exported[1].timestamp);

        Ok(())
    }
}
