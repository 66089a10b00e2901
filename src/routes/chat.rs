use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::{doc, DateTime, oid::ObjectId};
use mongodb::options::FindOptions;
use validator::Validate;

use crate::db::DbConn;
use crate::guards::AuthGuard;
use crate::models::{chat_id_for, ChatMessage, ChatMessageResponse, SendMessageDto};
use crate::utils::{ApiResponse, ApiError};

#[openapi(tag = "Chat")]
#[post("/chats/<other_id>/messages", data = "<dto>")]
pub async fn send_message(
    db: &State<DbConn>,
    auth: AuthGuard,
    other_id: String,
    dto: Json<SendMessageDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    dto.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let other = ObjectId::parse_str(&other_id)
        .map_err(|_| ApiError::bad_request("Invalid recipient ID"))?;
    if other == auth.account_id {
        return Err(ApiError::bad_request("Cannot message yourself"));
    }

    let message = ChatMessage {
        id: None,
        chat_id: chat_id_for(&auth.account_id, &other),
        sender_id: auth.account_id,
        body: dto.body.clone(),
        sent_at: DateTime::now(),
    };

    let result = db
        .collection::<ChatMessage>("chat_messages")
        .insert_one(&message, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to send message: {}", e)))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "id": result.inserted_id.as_object_id().map(|id| id.to_hex()),
        "chat_id": message.chat_id
    }))))
}

#[openapi(tag = "Chat")]
#[get("/chats/<other_id>/messages?<limit>")]
pub async fn get_messages(
    db: &State<DbConn>,
    auth: AuthGuard,
    other_id: String,
    limit: Option<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let other = ObjectId::parse_str(&other_id)
        .map_err(|_| ApiError::bad_request("Invalid participant ID"))?;

    // The chat id embeds the caller's own account id, so a caller can
    // only ever read conversations they are part of.
    let chat_id = chat_id_for(&auth.account_id, &other);
    let limit = limit.unwrap_or(100).min(500);

    let find_options = FindOptions::builder()
        .limit(limit)
        .sort(doc! { "sent_at": 1 })
        .build();

    let mut cursor = db
        .collection::<ChatMessage>("chat_messages")
        .find(doc! { "chat_id": &chat_id }, find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut messages = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let message: ChatMessage = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        messages.push(ChatMessageResponse::from(message));
    }
    let total = messages.len();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "chat_id": chat_id,
        "messages": messages,
        "total": total
    }))))
}
