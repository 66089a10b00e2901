use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;
use validator::Validate;

use super::ProfileStatus;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkerProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub account_id: ObjectId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub service_types: Vec<String>,
    pub experience_years: Option<i32>,
    pub profile_picture_url: Option<String>,
    pub identity_document_url: Option<String>,
    pub status: ProfileStatus,
    pub rating: f64,
    pub reviews_count: i32,
    pub jobs_completed: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Running average after one more review.
pub fn rating_after_review(rating: f64, reviews_count: i32, new_rating: i32) -> (f64, i32) {
    let count = reviews_count.max(0);
    let updated = (rating * count as f64 + new_rating as f64) / (count + 1) as f64;
    (updated, count + 1)
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdateWorkerProfileDto {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub service_types: Option<Vec<String>>,
    #[validate(range(min = 0, max = 60))]
    pub experience_years: Option<i32>,
    pub profile_picture_url: Option<String>,
    pub identity_document_url: Option<String>,
}

#[derive(Debug, FromForm, Deserialize, JsonSchema)]
pub struct WorkerSearchQuery {
    pub service_type: Option<String>,
    pub city: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkerResponse {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub service_types: Vec<String>,
    pub experience_years: Option<i32>,
    pub profile_picture_url: Option<String>,
    pub status: String,
    pub rating: f64,
    pub reviews_count: i32,
    pub jobs_completed: i32,
}

impl From<WorkerProfile> for WorkerResponse {
    fn from(profile: WorkerProfile) -> Self {
        WorkerResponse {
            id: profile.id.map(|id| id.to_hex()).unwrap_or_default(),
            full_name: profile.full_name,
            phone: profile.phone,
            city: profile.city,
            bio: profile.bio,
            service_types: profile.service_types,
            experience_years: profile.experience_years,
            profile_picture_url: profile.profile_picture_url,
            status: format!("{:?}", profile.status).to_lowercase(),
            rating: profile.rating,
            reviews_count: profile.reviews_count,
            jobs_completed: profile.jobs_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_recompute_weights_previous_reviews() {
        let (rating, count) = rating_after_review(4.0, 2, 5);
        assert!((rating - 13.0 / 3.0).abs() < 1e-9);
        assert_eq!(count, 3);
    }

    #[test]
    fn first_review_sets_the_average() {
        let (rating, count) = rating_after_review(0.0, 0, 4);
        assert!((rating - 4.0).abs() < 1e-9);
        assert_eq!(count, 1);
    }
}
