use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

use super::ProfileStatus;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HouseholdProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub account_id: ObjectId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub profile_picture_url: Option<String>,
    pub status: ProfileStatus,
    pub jobs_posted: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHouseholdProfileDto {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct HouseholdResponse {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub profile_picture_url: Option<String>,
    pub status: String,
    pub jobs_posted: i32,
}

impl From<HouseholdProfile> for HouseholdResponse {
    fn from(profile: HouseholdProfile) -> Self {
        HouseholdResponse {
            id: profile.id.map(|id| id.to_hex()).unwrap_or_default(),
            full_name: profile.full_name,
            phone: profile.phone,
            city: profile.city,
            address: profile.address,
            profile_picture_url: profile.profile_picture_url,
            status: format!("{:?}", profile.status).to_lowercase(),
            jobs_posted: profile.jobs_posted,
        }
    }
}
