use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::{doc, DateTime};

use crate::db::DbConn;
use crate::guards::HouseholdGuard;
use crate::models::{HouseholdProfile, HouseholdResponse, UpdateHouseholdProfileDto};
use crate::utils::{validate_phone, ApiResponse, ApiError};

#[openapi(tag = "Households")]
#[get("/household/profile")]
pub async fn get_household_profile(
    db: &State<DbConn>,
    guard: HouseholdGuard,
) -> Result<Json<ApiResponse<HouseholdResponse>>, ApiError> {
    let profile = db
        .collection::<HouseholdProfile>("household")
        .find_one(doc! { "account_id": guard.auth.account_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Household profile not found"))?;

    Ok(Json(ApiResponse::success(HouseholdResponse::from(profile))))
}

#[openapi(tag = "Households")]
#[put("/household/profile", data = "<dto>")]
pub async fn update_household_profile(
    db: &State<DbConn>,
    guard: HouseholdGuard,
    dto: Json<UpdateHouseholdProfileDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
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
    if let Some(ref address) = dto.address {
        update_doc.insert("address", address);
    }
    if let Some(ref url) = dto.profile_picture_url {
        update_doc.insert("profile_picture_url", url);
    }

    let result = db
        .collection::<HouseholdProfile>("household")
        .update_one(
            doc! { "account_id": guard.auth.account_id },
            doc! { "$set": update_doc },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update profile: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Household profile not found"));
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Profile updated successfully"
    }))))
}
