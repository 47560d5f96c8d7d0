use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::audit::{Auditable, ObjectType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl Genre {
    pub async fn find<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Genre>("SELECT id, name, description FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

impl Auditable for Genre {
    const OBJECT_TYPE: ObjectType = ObjectType::Genre;

    fn object_id(&self) -> Uuid {
        self.id
    }

    fn object_repr(&self) -> String {
        self.name.clone()
    }
}
