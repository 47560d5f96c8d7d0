use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::audit::{Auditable, ObjectType};

pub const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, is_active, date_joined";

/// Account row. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub async fn find<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_username<'e, E: PgExecutor<'e>>(
        executor: E,
        username: &str,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(executor)
        .await
    }
}

impl Auditable for User {
    const OBJECT_TYPE: ObjectType = ObjectType::User;

    fn object_id(&self) -> Uuid {
        self.id
    }

    fn object_repr(&self) -> String {
        self.username.clone()
    }
}
