use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use log::warn;
use rocket_okapi::okapi::schemars::JsonSchema;

use crate::config::Config;
use crate::models::{Job, ProfileStatus, WorkerProfile};

/// One ranked candidate for a job, as rendered to the caller. The
/// external scorer is opaque and non-deterministic; its output is only
/// ever displayed — assignment still goes through the assign endpoint.
#[derive(Debug, Serialize, JsonSchema)]
pub struct MatchCandidate {
    pub worker_id: String,
    pub worker_name: String,
    pub score: f64,
    pub justification: String,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScoredCandidate {
    worker_id: String,
    score: f64,
    justification: String,
}

#[derive(Debug, Deserialize)]
struct MatchingResponse {
    candidates: Vec<ScoredCandidate>,
}

pub struct MatchingService;

impl MatchingService {
    fn client() -> Client {
        Client::new()
    }

    /// Ranks `workers` for `job`. Uses the configured scoring service
    /// when available, otherwise falls back to ordering by rating.
    pub async fn rank_candidates(job: &Job, workers: &[WorkerProfile]) -> Vec<MatchCandidate> {
        if !Config::is_matching_enabled() {
            return Self::rank_by_rating(workers);
        }

        match Self::rank_remote(job, workers).await {
            Ok(candidates) if !candidates.is_empty() => candidates,
            Ok(_) => Self::rank_by_rating(workers),
            Err(e) => {
                warn!("Matching service failed, falling back to rating order: {}", e);
                Self::rank_by_rating(workers)
            }
        }
    }

    async fn rank_remote(job: &Job, workers: &[WorkerProfile]) -> Result<Vec<MatchCandidate>, String> {
        let url = Config::matching_url().ok_or_else(|| "matching_url not configured".to_string())?;

        let body = json!({
            "job": {
                "title": job.title,
                "description": job.description,
                "service_type": job.service_type,
                "schedule_text": job.schedule_text,
            },
            "candidates": workers.iter().map(|w| json!({
                "worker_id": w.id.map(|id| id.to_hex()).unwrap_or_default(),
                "bio": w.bio,
                "service_types": w.service_types,
                "experience_years": w.experience_years,
                "rating": w.rating,
            })).collect::<Vec<_>>(),
        });

        let mut request = Self::client().post(&url).json(&body);
        if let Some(key) = Config::matching_api_key() {
            request = request.bearer_auth(key);
        }

        let res = request
            .send()
            .await
            .map_err(|e| format!("Matching request failed: {}", e))?;

        if !res.status().is_success() {
            return Err(res.text().await.unwrap_or_else(|_| "Matching service error".to_string()));
        }

        let ranked: MatchingResponse = res
            .json()
            .await
            .map_err(|e| format!("Matching response malformed: {}", e))?;

        // Join scores back onto our roster; unknown ids are dropped.
        let mut candidates: Vec<MatchCandidate> = ranked
            .candidates
            .into_iter()
            .filter_map(|scored| {
                workers
                    .iter()
                    .find(|w| w.id.map(|id| id.to_hex()).as_deref() == Some(scored.worker_id.as_str()))
                    .map(|w| MatchCandidate {
                        worker_id: scored.worker_id,
                        worker_name: w.full_name.clone(),
                        score: scored.score,
                        justification: scored.justification,
                        profile_picture_url: w.profile_picture_url.clone(),
                    })
            })
            .collect();

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(candidates)
    }

    fn rank_by_rating(workers: &[WorkerProfile]) -> Vec<MatchCandidate> {
        let mut active: Vec<&WorkerProfile> = workers
            .iter()
            .filter(|w| w.status == ProfileStatus::Active)
            .collect();
        active.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));

        active
            .into_iter()
            .map(|w| MatchCandidate {
                worker_id: w.id.map(|id| id.to_hex()).unwrap_or_default(),
                worker_name: w.full_name.clone(),
                score: w.rating / 5.0,
                justification: if w.reviews_count > 0 {
                    format!("Rated {:.1} across {} reviews", w.rating, w.reviews_count)
                } else {
                    "No reviews yet".to_string()
                },
                profile_picture_url: w.profile_picture_url.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime};

    fn worker(name: &str, rating: f64, reviews: i32, status: ProfileStatus) -> WorkerProfile {
        WorkerProfile {
            id: Some(ObjectId::new()),
            account_id: ObjectId::new(),
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "+250788123456".to_string(),
            city: None,
            bio: None,
            service_types: vec!["cleaning".to_string()],
            experience_years: Some(3),
            profile_picture_url: None,
            identity_document_url: None,
            status,
            rating,
            reviews_count: reviews,
            jobs_completed: reviews,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn fallback_ranks_active_workers_by_rating() {
        let workers = vec![
            worker("Alice", 3.5, 4, ProfileStatus::Active),
            worker("Beatrice", 4.8, 12, ProfileStatus::Active),
            worker("Chantal", 5.0, 2, ProfileStatus::Suspended),
        ];

        let ranked = MatchingService::rank_by_rating(&workers);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].worker_name, "Beatrice");
        assert_eq!(ranked[1].worker_name, "Alice");
    }
}
