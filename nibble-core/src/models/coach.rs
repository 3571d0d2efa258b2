use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a coach conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachRole {
    Parent,
    Coach,
}

/// One message in the nutrition-coach chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoachMessage {
    pub id: Uuid,
    pub role: CoachRole,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl CoachMessage {
    pub fn new(role: CoachRole, content: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            sent_at,
        }
    }
}
