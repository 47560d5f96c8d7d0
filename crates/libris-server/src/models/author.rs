use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::audit::{Auditable, ObjectType};

pub const AUTHOR_COLUMNS: &str =
    "id, first_name, last_name, biography, birth_date, nationality";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub biography: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<String>,
}

impl Author {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub async fn find<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Author>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}

impl Auditable for Author {
    const OBJECT_TYPE: ObjectType = ObjectType::Author;

    fn object_id(&self) -> Uuid {
        self.id
    }

    fn object_repr(&self) -> String {
        self.display_name()
    }
}
