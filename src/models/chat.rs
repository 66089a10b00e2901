use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub chat_id: String,
    pub sender_id: ObjectId,
    pub body: String,
    pub sent_at: DateTime,
}

/// Chats are keyed by the two participants; ordering the ids makes the
/// key independent of who opened the conversation.
pub fn chat_id_for(a: &ObjectId, b: &ObjectId) -> String {
    let (lo, hi) = if a.to_hex() <= b.to_hex() { (a, b) } else { (b, a) };
    format!("{}_{}", lo.to_hex(), hi.to_hex())
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub body: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ChatMessageResponse {
    pub id: String,
    pub sender_id: String,
    pub body: String,
    pub sent_at: String,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(m: ChatMessage) -> Self {
        ChatMessageResponse {
            id: m.id.map(|id| id.to_hex()).unwrap_or_default(),
            sender_id: m.sender_id.to_hex(),
            body: m.body,
            sent_at: m.sent_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_id_is_order_independent() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_eq!(chat_id_for(&a, &b), chat_id_for(&b, &a));
    }
}
