use chrono::{DateTime, NaiveDate, Utc};
use libris_common::types::UserTier;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::audit::{Auditable, ObjectType};

const PROFILE_COLUMNS: &str = r#"
    p.id, p.user_id, u.username, p.tier, p.phone, p.address, p.birth_date,
    p.registered_at, p.loan_limit, p.active
"#;

/// `SELECT` of profile rows with the owner's username, aliased `p`
pub fn profile_select() -> String {
    format!("SELECT {PROFILE_COLUMNS} FROM profiles p JOIN users u ON u.id = p.user_id")
}

/// Wrap an `INSERT`/`UPDATE ... RETURNING *` on profiles so it yields full rows
pub fn profile_returning(statement: &str) -> String {
    format!(
        "WITH p AS ({statement}) SELECT {PROFILE_COLUMNS} FROM p JOIN users u ON u.id = p.user_id"
    )
}

/// Library membership details of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub tier: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub registered_at: DateTime<Utc>,
    pub loan_limit: i32,
    pub active: bool,
}

impl Profile {
    pub fn tier(&self) -> UserTier {
        self.tier.parse().unwrap_or_default()
    }

    pub async fn find<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Profile>(&format!("{} WHERE p.id = $1", profile_select()))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Profile>(&format!("{} WHERE p.user_id = $1", profile_select()))
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }
}

impl Auditable for Profile {
    const OBJECT_TYPE: ObjectType = ObjectType::Profile;

    fn object_id(&self) -> Uuid {
        self.id
    }

    fn object_repr(&self) -> String {
        format!("{} - {}", self.username, self.tier().label())
    }

    fn ignored_fields() -> &'static [&'static str] {
        &["username"]
    }
}
