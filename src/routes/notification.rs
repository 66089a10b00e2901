use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::db::DbConn;
use crate::guards::AuthGuard;
use crate::models::{Notification, NotificationResponse, Role};
use crate::utils::{ApiResponse, ApiError};

#[openapi(tag = "Notifications")]
#[get("/notifications?<limit>")]
pub async fn list_notifications(
    db: &State<DbConn>,
    auth: AuthGuard,
    limit: Option<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let limit = limit.unwrap_or(50).min(200);

    let find_options = FindOptions::builder()
        .limit(limit)
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = db
        .collection::<Notification>("notifications")
        .find(doc! { "user_id": auth.account_id }, find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut notifications = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let notification: Notification = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        notifications.push(NotificationResponse::from(notification));
    }

    let unread = db
        .collection::<Notification>("notifications")
        .count_documents(doc! { "user_id": auth.account_id, "read": false }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Count error: {}", e)))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "notifications": notifications,
        "unread": unread
    }))))
}

#[openapi(tag = "Notifications")]
#[get("/notifications/unread-count")]
pub async fn unread_count(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let unread = db
        .collection::<Notification>("notifications")
        .count_documents(doc! { "user_id": auth.account_id, "read": false }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Count error: {}", e)))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "unread": unread
    }))))
}

#[openapi(tag = "Notifications")]
#[put("/notifications/<notification_id>/read")]
pub async fn mark_as_read(
    db: &State<DbConn>,
    auth: AuthGuard,
    notification_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&notification_id)
        .map_err(|_| ApiError::bad_request("Invalid notification ID"))?;

    let result = db
        .collection::<Notification>("notifications")
        .update_one(
            doc! { "_id": object_id, "user_id": auth.account_id },
            doc! { "$set": { "read": true } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update notification: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Notification not found"));
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Notification marked as read"
    }))))
}

#[openapi(tag = "Notifications")]
#[put("/notifications/read-all")]
pub async fn mark_all_as_read(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let result = db
        .collection::<Notification>("notifications")
        .update_many(
            doc! { "user_id": auth.account_id, "read": false },
            doc! { "$set": { "read": true } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update notifications: {}", e)))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "updated": result.modified_count
    }))))
}

#[openapi(tag = "Notifications")]
#[delete("/notifications/<notification_id>")]
pub async fn delete_notification(
    db: &State<DbConn>,
    auth: AuthGuard,
    notification_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&notification_id)
        .map_err(|_| ApiError::bad_request("Invalid notification ID"))?;

    // Owners delete their own; admins can delete any.
    let filter = if auth.role == Role::Admin {
        doc! { "_id": object_id }
    } else {
        doc! { "_id": object_id, "user_id": auth.account_id }
    };

    let result = db
        .collection::<Notification>("notifications")
        .delete_one(filter, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete notification: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Notification not found"));
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Notification deleted"
    }))))
}
