use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::{doc, DateTime, oid::ObjectId};
use mongodb::options::FindOptions;
use validator::Validate;

use crate::db::DbConn;
use crate::guards::{AuthGuard, WorkerGuard};
use crate::models::{UpdateWorkerProfileDto, WorkerProfile, WorkerResponse, WorkerSearchQuery};
use crate::utils::{validate_phone, ApiResponse, ApiError};

#[openapi(tag = "Workers")]
#[get("/worker/profile")]
pub async fn get_worker_profile(
    db: &State<DbConn>,
    guard: WorkerGuard,
) -> Result<Json<ApiResponse<WorkerResponse>>, ApiError> {
    let profile = db
        .collection::<WorkerProfile>("worker")
        .find_one(doc! { "account_id": guard.auth.account_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Worker profile not found"))?;

    Ok(Json(ApiResponse::success(WorkerResponse::from(profile))))
}

#[openapi(tag = "Workers")]
#[put("/worker/profile", data = "<dto>")]
pub async fn update_worker_profile(
    db: &State<DbConn>,
    guard: WorkerGuard,
    dto: Json<UpdateWorkerProfileDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    dto.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    if let Some(ref phone) = dto.phone {
        if !validate_phone(phone) {
            return Err(ApiError::bad_request("Invalid phone number"));
        }
    }

    let mut update_doc = doc! { "updated_at": DateTime::now() };

    if let Some(ref full_name) = dto.full_name {
        update_doc.insert("full_name", full_name);
    }
    if let Some(ref phone) = dto.phone {
        update_doc.insert("phone", phone);
    }
    if let Some(ref city) = dto.city {
        update_doc.insert("city", city);
    }
    if let Some(ref bio) = dto.bio {
        update_doc.insert("bio", bio);
    }
    if let Some(ref service_types) = dto.service_types {
        update_doc.insert("service_types", service_types);
    }
    if let Some(experience_years) = dto.experience_years {
        update_doc.insert("experience_years", experience_years);
    }
    if let Some(ref url) = dto.profile_picture_url {
        update_doc.insert("profile_picture_url", url);
    }
    if let Some(ref url) = dto.identity_document_url {
        update_doc.insert("identity_document_url", url);
    }

    let result = db
        .collection::<WorkerProfile>("worker")
        .update_one(
            doc! { "account_id": guard.auth.account_id },
            doc! { "$set": update_doc },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update profile: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Worker profile not found"));
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Profile updated successfully"
    }))))
}

#[openapi(tag = "Workers")]
#[get("/workers/<worker_id>")]
pub async fn get_worker_by_id(
    db: &State<DbConn>,
    _auth: AuthGuard,
    worker_id: String,
) -> Result<Json<ApiResponse<WorkerResponse>>, ApiError> {
    let object_id = ObjectId::parse_str(&worker_id)
        .map_err(|_| ApiError::bad_request("Invalid worker ID"))?;

    let profile = db
        .collection::<WorkerProfile>("worker")
        .find_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Worker not found"))?;

    Ok(Json(ApiResponse::success(WorkerResponse::from(profile))))
}

#[openapi(tag = "Workers")]
#[get("/workers?<query..>")]
pub async fn search_workers(
    db: &State<DbConn>,
    _auth: AuthGuard,
    query: WorkerSearchQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(100);
    let skip = (page - 1) * limit;

    let mut filter = doc! { "status": "active" };
    if let Some(ref service_type) = query.service_type {
        filter.insert("service_types", service_type);
    }
    if let Some(ref city) = query.city {
        filter.insert("city", city);
    }

    let find_options = FindOptions::builder()
        .skip(skip as u64)
        .limit(limit)
        .sort(doc! { "rating": -1, "reviews_count": -1 })
        .build();

    let mut cursor = db
        .collection::<WorkerProfile>("worker")
        .find(filter.clone(), find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut workers = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let worker: WorkerProfile = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        workers.push(WorkerResponse::from(worker));
    }

    let total = db
        .collection::<WorkerProfile>("worker")
        .count_documents(filter, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Count error: {}", e)))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "workers": workers,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": (total as f64 / limit as f64).ceil() as i64,
        }
    }))))
}
