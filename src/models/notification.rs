use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Job,
    Application,
    Payment,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Job => "job",
            NotificationKind::Application => "application",
            NotificationKind::Payment => "payment",
            NotificationKind::System => "system",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub title: String,
    pub description: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub job_id: Option<ObjectId>,
    pub payment_id: Option<ObjectId>,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub read: bool,
    pub job_id: Option<String>,
    pub payment_id: Option<String>,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        NotificationResponse {
            id: n.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: n.title,
            description: n.description,
            kind: n.kind.as_str().to_string(),
            read: n.read,
            job_id: n.job_id.map(|id| id.to_hex()),
            payment_id: n.payment_id.map(|id| id.to_hex()),
            created_at: n.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}
