use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Category reference inside product payloads; only the id is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
}
