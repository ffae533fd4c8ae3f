use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - a reader's reply, owned by exactly one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    /// Only active comments are shown to readers.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new, active comment on `post_id`.
    pub fn new(post_id: Uuid, name: String, email: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            name,
            email,
            body,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
