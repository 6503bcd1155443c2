use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

/// Server-side half of a login session (stored in MongoDB `sessions`).
///
/// The cookie only names the session; deleting this record logs the user out.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub created_at: i64,
    /// BSON date so the TTL index can expire stale sessions
    pub expires_at: BsonDateTime,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= BsonDateTime::now()
    }
}
