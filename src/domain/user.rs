use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A local account. Passwords are stored as entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            id: 0,
            name,
            email,
            password,
            created_at: Utc::now(),
        }
    }
}
