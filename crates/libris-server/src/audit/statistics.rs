//! Aggregate counts over the audit log

use chrono::{DateTime, Duration, Utc};
use libris_common::LibrisError;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;

use super::models::{AuditAction, AuditScope};
use super::queries::count_audit_logs;
use crate::error::{ServerError, ServerResult};

/// Statistics over the caller's visible records
///
/// `total_logs` counts everything in scope. The other figures cover only the
/// recent window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditStatistics {
    pub total_logs: i64,
    pub recent_logs: i64,
    pub actions_by_type: BTreeMap<String, i64>,
    pub objects_by_type: BTreeMap<String, i64>,
    pub top_users: BTreeMap<String, i64>,
}

/// Group stored action names under their display labels
pub fn label_actions(rows: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    let mut labelled = BTreeMap::new();
    for (action, count) in rows {
        let label = action
            .parse::<AuditAction>()
            .map(|a| a.label().to_string())
            .unwrap_or(action);
        *labelled.entry(label).or_insert(0) += count;
    }
    labelled
}

async fn grouped(
    pool: &PgPool,
    sql: &str,
    scope: AuditScope,
    since: DateTime<Utc>,
) -> ServerResult<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(sql)
        .bind(scope.user_filter())
        .bind(since)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Start of the "recent" window ending at `now`
fn window_start(now: DateTime<Utc>, window_days: i64) -> ServerResult<DateTime<Utc>> {
    Duration::try_days(window_days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            ServerError::from(LibrisError::Config(format!(
                "statistics window of {} days is out of range",
                window_days
            )))
        })
}

#[tracing::instrument(skip(pool))]
pub async fn collect(
    pool: &PgPool,
    scope: AuditScope,
    window_days: i64,
    now: DateTime<Utc>,
) -> ServerResult<AuditStatistics> {
    let since = window_start(now, window_days)?;

    let total_logs = count_audit_logs(pool, scope).await?;

    let recent_logs = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM audit_log
        WHERE ($1::uuid IS NULL OR user_id = $1) AND timestamp >= $2
        "#,
    )
    .bind(scope.user_filter())
    .bind(since)
    .fetch_one(pool)
    .await?;

    let actions = grouped(
        pool,
        r#"
        SELECT action, COUNT(*) FROM audit_log
        WHERE ($1::uuid IS NULL OR user_id = $1) AND timestamp >= $2
        GROUP BY action
        "#,
        scope,
        since,
    )
    .await?;

    let objects = grouped(
        pool,
        r#"
        SELECT object_type, COUNT(*) FROM audit_log
        WHERE ($1::uuid IS NULL OR user_id = $1) AND timestamp >= $2
        GROUP BY object_type
        "#,
        scope,
        since,
    )
    .await?;

    let users = grouped(
        pool,
        r#"
        SELECT u.username, COUNT(*) FROM audit_log a
        JOIN users u ON u.id = a.user_id
        WHERE ($1::uuid IS NULL OR a.user_id = $1) AND a.timestamp >= $2
        GROUP BY u.username
        "#,
        scope,
        since,
    )
    .await?;

    Ok(AuditStatistics {
        total_logs,
        recent_logs,
        actions_by_type: label_actions(actions),
        objects_by_type: objects.into_iter().collect(),
        top_users: users.into_iter().collect(),
    })
}
