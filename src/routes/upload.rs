use rocket::serde::json::Json;
use rocket::fs::TempFile;
use rocket_okapi::openapi;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;
use log::info;

use crate::guards::AuthGuard;
use crate::utils::{ApiResponse, ApiError};

const UPLOAD_DIR: &str = "uploads";

fn extension_from_filename(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

fn extension_from_content_type(content_type: &str) -> Option<String> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg".to_string()),
        "image/png" => Some("png".to_string()),
        "image/webp" => Some("webp".to_string()),
        "application/pdf" => Some("pdf".to_string()),
        _ => None,
    }
}

fn is_valid_image_extension(ext: &str) -> bool {
    matches!(ext, "jpg" | "jpeg" | "png" | "webp")
}

fn is_valid_document_extension(ext: &str) -> bool {
    matches!(ext, "pdf" | "jpg" | "jpeg" | "png")
}

fn resolve_extension(file: &TempFile<'_>) -> Result<String, ApiError> {
    if let Some(ext) = file.name().and_then(extension_from_filename) {
        return Ok(ext);
    }
    file.content_type()
        .and_then(|ct| extension_from_content_type(&ct.to_string()))
        .ok_or_else(|| ApiError::bad_request("Cannot determine file type"))
}

async fn store(mut file: TempFile<'_>, subdir: &str, ext: &str) -> Result<String, ApiError> {
    let dir = format!("{}/{}", UPLOAD_DIR, subdir);
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))?;

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    let path = format!("{}/{}", dir, filename);

    file.persist_to(&path)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to store file: {}", e)))?;

    info!("Stored upload at {}", path);
    Ok(format!("/uploads/{}/{}", subdir, filename))
}

/// Profile pictures. Returns the public URL of the stored image.
#[openapi(tag = "Uploads")]
#[post("/upload/image", data = "<file>")]
pub async fn upload_image(
    file: TempFile<'_>,
    _auth: AuthGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let ext = resolve_extension(&file)?;
    if !is_valid_image_extension(&ext) {
        return Err(ApiError::bad_request("Only jpg, jpeg, png and webp images are allowed"));
    }

    let url = store(file, "images", &ext).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "url": url
    }))))
}

/// Identity documents. Returns the public URL of the stored file.
#[openapi(tag = "Uploads")]
#[post("/upload/document", data = "<file>")]
pub async fn upload_document(
    file: TempFile<'_>,
    _auth: AuthGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let ext = resolve_extension(&file)?;
    if !is_valid_document_extension(&ext) {
        return Err(ApiError::bad_request("Only pdf, jpg, jpeg and png documents are allowed"));
    }

    let url = store(file, "documents", &ext).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "url": url
    }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_fallbacks() {
        assert_eq!(extension_from_filename("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(extension_from_filename("no-extension"), None);
        assert_eq!(extension_from_content_type("image/webp"), Some("webp".to_string()));
        assert_eq!(extension_from_content_type("text/plain"), None);
    }

    #[test]
    fn document_rules_allow_pdf_but_not_webp() {
        assert!(is_valid_document_extension("pdf"));
        assert!(!is_valid_document_extension("webp"));
        assert!(is_valid_image_extension("webp"));
    }
}
