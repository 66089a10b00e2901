use mongodb::bson::{doc, oid::ObjectId};
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::{ServicePackage, TrainingProgram};
use crate::db::DbConn;
use crate::utils::{ApiResponse, ApiError};

/// Get all service packages
#[openapi(tag = "Catalog")]
#[get("/packages")]
pub async fn get_all_packages(
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mut cursor = db
        .collection::<ServicePackage>("service_packages")
        .find(None, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut packages = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let package = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        packages.push(package);
    }
    let total = packages.len();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "packages": packages,
        "total": total
    }))))
}

/// Get service packages by category
#[openapi(tag = "Catalog")]
#[get("/packages/category/<category>")]
pub async fn get_packages_by_category(
    category: String,
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mut cursor = db
        .collection::<ServicePackage>("service_packages")
        .find(doc! { "category": &category }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut packages = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let package = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        packages.push(package);
    }

    if packages.is_empty() {
        return Err(ApiError::not_found(format!("No packages found for category: {}", category)));
    }
    let total = packages.len();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "category": category,
        "packages": packages,
        "total": total
    }))))
}

/// Get a single service package by ID
#[openapi(tag = "Catalog")]
#[get("/packages/<package_id>")]
pub async fn get_package_by_id(
    package_id: String,
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&package_id)
        .map_err(|_| ApiError::bad_request("Invalid package ID"))?;

    let package = db
        .collection::<ServicePackage>("service_packages")
        .find_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found(format!("Package '{}' not found", package_id)))?;

    Ok(Json(ApiResponse::success(serde_json::json!(package))))
}

/// Get all training programs
#[openapi(tag = "Catalog")]
#[get("/training")]
pub async fn get_all_training(
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mut cursor = db
        .collection::<TrainingProgram>("training")
        .find(None, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut programs = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let program = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        programs.push(program);
    }
    let total = programs.len();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "programs": programs,
        "total": total
    }))))
}
