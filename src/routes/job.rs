use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::{doc, DateTime, oid::ObjectId, to_bson};
use mongodb::options::FindOptions;
use validator::Validate;
use std::collections::HashMap;

use crate::db::DbConn;
use crate::guards::{AuthGuard, HouseholdGuard, WorkerGuard};
use crate::models::{
    Application, ApplicationStatus, ApplyError, ApplyJobDto, BookingResponse, CreateJobDto,
    HouseholdProfile, Job, JobResponse, JobStatus, ProfileStatus, RescheduleJobDto, Review, Role,
    SubmitReviewDto, WorkerProfile, rating_after_review,
};
use crate::services::{MatchingService, Notifier};
use crate::utils::{ApiResponse, ApiError};

/* ----------------------------- helpers ----------------------------- */

async fn load_job(db: &DbConn, job_id: &str) -> Result<(ObjectId, Job), ApiError> {
    let object_id = ObjectId::parse_str(job_id)
        .map_err(|_| ApiError::bad_request("Invalid job ID"))?;

    let job = db
        .collection::<Job>("jobs")
        .find_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    Ok((object_id, job))
}

async fn household_of(db: &DbConn, auth: &AuthGuard) -> Result<HouseholdProfile, ApiError> {
    db.collection::<HouseholdProfile>("household")
        .find_one(doc! { "account_id": auth.account_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Household profile not found"))
}

async fn worker_of(db: &DbConn, auth: &AuthGuard) -> Result<WorkerProfile, ApiError> {
    db.collection::<WorkerProfile>("worker")
        .find_one(doc! { "account_id": auth.account_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Worker profile not found"))
}

fn ensure_transition(current: JobStatus, next: JobStatus) -> Result<(), ApiError> {
    if !current.can_transition(next) {
        return Err(ApiError::conflict(format!(
            "Cannot move a {} job to {}",
            current.as_str(),
            next.as_str()
        )));
    }
    Ok(())
}

fn ensure_owner(job: &Job, auth: &AuthGuard) -> Result<(), ApiError> {
    if job.household_id != auth.account_id {
        return Err(ApiError::forbidden("Not your job post"));
    }
    Ok(())
}

/// Looks up the assigned worker's profile, if any.
async fn assigned_worker(db: &DbConn, job: &Job) -> Option<WorkerProfile> {
    let worker_id = job.worker_id?;
    db.collection::<WorkerProfile>("worker")
        .find_one(doc! { "_id": worker_id }, None)
        .await
        .ok()
        .flatten()
}

/* ----------------------------- create ----------------------------- */

#[openapi(tag = "Jobs")]
#[post("/jobs", data = "<dto>")]
pub async fn create_job(
    db: &State<DbConn>,
    guard: HouseholdGuard,
    dto: Json<CreateJobDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    dto.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let household = household_of(db, &guard.auth).await?;
    if household.status == ProfileStatus::Suspended {
        return Err(ApiError::forbidden("Your profile is suspended"));
    }

    // Households still awaiting approval post into the moderation queue.
    let status = if household.status == ProfileStatus::Active {
        JobStatus::Open
    } else {
        JobStatus::Pending
    };

    let now = DateTime::now();
    let job = Job {
        id: None,
        title: dto.title.clone(),
        description: dto.description.clone(),
        service_type: dto.service_type.clone(),
        schedule_text: dto.schedule_text.clone(),
        compensation: crate::models::Compensation {
            salary: dto.salary,
            pay_frequency: dto.pay_frequency,
            benefits: dto.benefits,
        },
        household_id: guard.auth.account_id,
        household_name: household.full_name.clone(),
        worker_id: None,
        worker_name: None,
        status,
        applicants: Vec::new(),
        review: None,
        created_at: now,
        updated_at: now,
    };

    let result = db
        .collection::<Job>("jobs")
        .insert_one(&job, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create job: {}", e)))?;

    let job_id = result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| ApiError::internal_error("Failed to get inserted job ID"))?;

    db.collection::<HouseholdProfile>("household")
        .update_one(
            doc! { "_id": household.id },
            doc! { "$inc": { "jobs_posted": 1 }, "$set": { "updated_at": DateTime::now() } },
            None,
        )
        .await
        .ok();

    Notifier::notify_job(
        db,
        guard.auth.account_id,
        "Job Posted",
        format!("Your job \"{}\" is now {}", job.title, status.as_str()),
        job_id,
    )
    .await;

    Ok(Json(ApiResponse::success_with_message(
        "Job created successfully".to_string(),
        serde_json::json!({
            "id": job_id.to_hex(),
            "status": status.as_str()
        }),
    )))
}

/* ----------------------------- browse ----------------------------- */

#[derive(FromForm, serde::Deserialize, rocket_okapi::okapi::schemars::JsonSchema)]
pub struct JobListQuery {
    pub status: Option<String>,
    pub service_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[openapi(tag = "Jobs")]
#[get("/jobs?<query..>")]
pub async fn list_jobs(
    db: &State<DbConn>,
    _auth: AuthGuard,
    query: JobListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(100);
    let skip = (page - 1) * limit;

    let mut filter = doc! {};
    filter.insert("status", query.status.as_deref().unwrap_or("open"));
    if let Some(ref service_type) = query.service_type {
        filter.insert("service_type", service_type);
    }

    let find_options = FindOptions::builder()
        .skip(skip as u64)
        .limit(limit)
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = db
        .collection::<Job>("jobs")
        .find(filter.clone(), find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut jobs = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let job = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        jobs.push(JobResponse::from(job));
    }

    let total = db
        .collection::<Job>("jobs")
        .count_documents(filter, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Count error: {}", e)))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "jobs": jobs,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": (total as f64 / limit as f64).ceil() as i64,
        }
    }))))
}

#[openapi(tag = "Jobs")]
#[get("/jobs/<job_id>")]
pub async fn get_job(
    db: &State<DbConn>,
    _auth: AuthGuard,
    job_id: String,
) -> Result<Json<ApiResponse<JobResponse>>, ApiError> {
    let (_, job) = load_job(db, &job_id).await?;
    Ok(Json(ApiResponse::success(JobResponse::from(job))))
}

/* ----------------------------- apply ----------------------------- */

#[openapi(tag = "Jobs")]
#[post("/jobs/<job_id>/apply", data = "<dto>")]
pub async fn apply_for_job(
    db: &State<DbConn>,
    guard: WorkerGuard,
    job_id: String,
    dto: Json<ApplyJobDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let worker = worker_of(db, &guard.auth).await?;
    if worker.status == ProfileStatus::Suspended {
        return Err(ApiError::forbidden("Your profile is suspended"));
    }
    let worker_profile_id = worker
        .id
        .ok_or_else(|| ApiError::internal_error("Worker profile missing ID"))?;

    let (object_id, mut job) = load_job(db, &job_id).await?;

    let application = Application {
        worker_id: worker_profile_id,
        worker_name: worker.full_name.clone(),
        cover_letter: dto.cover_letter.clone(),
        status: ApplicationStatus::Pending,
        applied_at: DateTime::now(),
    };

    job.add_applicant(application.clone()).map_err(|e| match e {
        ApplyError::NotOpen => ApiError::conflict("This job is no longer accepting applications"),
        ApplyError::AlreadyApplied => ApiError::conflict("You have already applied for this job"),
    })?;

    // Write-side guard: the push only lands while the job is still open
    // and this worker is not yet in the applicant list.
    let result = db
        .collection::<Job>("jobs")
        .update_one(
            doc! {
                "_id": object_id,
                "status": JobStatus::Open.as_str(),
                "applicants.worker_id": { "$ne": worker_profile_id }
            },
            doc! {
                "$push": {
                    "applicants": to_bson(&application)
                        .map_err(|e| ApiError::internal_error(format!("Serialization error: {}", e)))?
                },
                "$set": { "updated_at": DateTime::now() }
            },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to apply: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::conflict("This job is no longer accepting applications"));
    }

    Notifier::notify(
        db,
        job.household_id,
        crate::models::NotificationKind::Application,
        "New Application",
        format!("{} applied for \"{}\"", worker.full_name, job.title),
        Some(object_id),
        None,
    )
    .await;

    Ok(Json(ApiResponse::success_with_message(
        "Application submitted".to_string(),
        serde_json::json!({ "job_id": object_id.to_hex() }),
    )))
}

/* ----------------------------- lifecycle ----------------------------- */

#[openapi(tag = "Jobs")]
#[post("/jobs/<job_id>/cancel")]
pub async fn cancel_job(
    db: &State<DbConn>,
    auth: AuthGuard,
    job_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let (object_id, job) = load_job(db, &job_id).await?;

    match auth.role {
        Role::Admin => {}
        Role::Household => ensure_owner(&job, &auth)?,
        Role::Worker => return Err(ApiError::forbidden("Only the household or an admin can cancel")),
    }

    ensure_transition(job.status, JobStatus::Cancelled)?;

    db.collection::<Job>("jobs")
        .update_one(
            doc! { "_id": object_id, "status": job.status.as_str() },
            doc! { "$set": { "status": JobStatus::Cancelled.as_str(), "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to cancel job: {}", e)))?;

    if let Some(worker) = assigned_worker(db, &job).await {
        Notifier::notify_job(
            db,
            worker.account_id,
            "Booking Cancelled",
            format!("\"{}\" has been cancelled", job.title),
            object_id,
        )
        .await;
    }
    if auth.role == Role::Admin {
        Notifier::notify_job(
            db,
            job.household_id,
            "Job Cancelled",
            format!("An admin cancelled \"{}\"", job.title),
            object_id,
        )
        .await;
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Booking cancelled"
    }))))
}

#[openapi(tag = "Jobs")]
#[post("/jobs/<job_id>/reschedule", data = "<dto>")]
pub async fn reschedule_job(
    db: &State<DbConn>,
    guard: HouseholdGuard,
    job_id: String,
    dto: Json<RescheduleJobDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    dto.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let (object_id, job) = load_job(db, &job_id).await?;
    ensure_owner(&job, &guard.auth)?;
    ensure_transition(job.status, JobStatus::Rescheduled)?;

    db.collection::<Job>("jobs")
        .update_one(
            doc! { "_id": object_id, "status": job.status.as_str() },
            doc! { "$set": {
                "status": JobStatus::Rescheduled.as_str(),
                "schedule_text": &dto.schedule_text,
                "updated_at": DateTime::now()
            } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to reschedule job: {}", e)))?;

    if let Some(worker) = assigned_worker(db, &job).await {
        Notifier::notify_job(
            db,
            worker.account_id,
            "Booking Rescheduled",
            format!("\"{}\" has a new schedule: {}", job.title, dto.schedule_text),
            object_id,
        )
        .await;
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Booking rescheduled"
    }))))
}

#[openapi(tag = "Jobs")]
#[post("/jobs/<job_id>/complete")]
pub async fn complete_job(
    db: &State<DbConn>,
    guard: HouseholdGuard,
    job_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let (object_id, job) = load_job(db, &job_id).await?;
    ensure_owner(&job, &guard.auth)?;
    ensure_transition(job.status, JobStatus::Completed)?;

    db.collection::<Job>("jobs")
        .update_one(
            doc! { "_id": object_id, "status": job.status.as_str() },
            doc! { "$set": { "status": JobStatus::Completed.as_str(), "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to complete job: {}", e)))?;

    if let Some(worker) = assigned_worker(db, &job).await {
        db.collection::<WorkerProfile>("worker")
            .update_one(
                doc! { "_id": worker.id },
                doc! { "$inc": { "jobs_completed": 1 }, "$set": { "updated_at": DateTime::now() } },
                None,
            )
            .await
            .ok();

        Notifier::notify_job(
            db,
            worker.account_id,
            "Job Completed",
            format!("\"{}\" has been marked completed", job.title),
            object_id,
        )
        .await;
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Job marked completed"
    }))))
}

/* ----------------------------- review ----------------------------- */

#[openapi(tag = "Jobs")]
#[post("/jobs/<job_id>/review", data = "<dto>")]
pub async fn submit_review(
    db: &State<DbConn>,
    guard: HouseholdGuard,
    job_id: String,
    dto: Json<SubmitReviewDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    dto.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let (object_id, job) = load_job(db, &job_id).await?;
    ensure_owner(&job, &guard.auth)?;

    if job.status != JobStatus::Completed {
        return Err(ApiError::conflict("Only completed jobs can be reviewed"));
    }
    let worker_id = job
        .worker_id
        .ok_or_else(|| ApiError::bad_request("This job has no assigned worker"))?;

    let review = Review {
        rating: dto.rating,
        comment: dto.comment.clone(),
        created_at: DateTime::now(),
    };

    // Compare-and-set on the job document: the filter on `review: null`
    // makes a concurrent duplicate match zero documents instead of
    // double-counting into the worker's average.
    let result = db
        .collection::<Job>("jobs")
        .update_one(
            doc! {
                "_id": object_id,
                "status": JobStatus::Completed.as_str(),
                "review": null
            },
            doc! { "$set": {
                "review": to_bson(&review)
                    .map_err(|e| ApiError::internal_error(format!("Serialization error: {}", e)))?,
                "updated_at": DateTime::now()
            } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to save review: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::conflict("This job already has a review"));
    }

    let worker = db
        .collection::<WorkerProfile>("worker")
        .find_one(doc! { "_id": worker_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Worker not found"))?;

    let (rating, reviews_count) = rating_after_review(worker.rating, worker.reviews_count, dto.rating);

    db.collection::<WorkerProfile>("worker")
        .update_one(
            doc! { "_id": worker_id },
            doc! { "$set": {
                "rating": rating,
                "reviews_count": reviews_count,
                "updated_at": DateTime::now()
            } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update rating: {}", e)))?;

    Notifier::notify_job(
        db,
        worker.account_id,
        "New Review",
        format!("{} rated you {} stars", job.household_name, dto.rating),
        object_id,
    )
    .await;

    Ok(Json(ApiResponse::success_with_message(
        "Review submitted successfully".to_string(),
        serde_json::json!({
            "rating": rating,
            "reviews_count": reviews_count
        }),
    )))
}

/* ----------------------------- matching ----------------------------- */

#[openapi(tag = "Jobs")]
#[get("/jobs/<job_id>/match")]
pub async fn match_workers(
    db: &State<DbConn>,
    auth: AuthGuard,
    job_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let (_, job) = load_job(db, &job_id).await?;

    match auth.role {
        Role::Admin => {}
        Role::Household => ensure_owner(&job, &auth)?,
        Role::Worker => return Err(ApiError::forbidden("Matching is not available to workers")),
    }

    let mut cursor = db
        .collection::<WorkerProfile>("worker")
        .find(
            doc! {
                "service_types": &job.service_type,
                "status": "active"
            },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut workers = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let worker = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        workers.push(worker);
    }

    let candidates = MatchingService::rank_candidates(&job, &workers).await;
    let total = candidates.len();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "job_id": job_id,
        "candidates": candidates,
        "total": total
    }))))
}

/* ----------------------------- views ----------------------------- */

#[openapi(tag = "Jobs")]
#[get("/household/bookings")]
pub async fn household_bookings(
    db: &State<DbConn>,
    guard: HouseholdGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mut cursor = db
        .collection::<Job>("jobs")
        .find(
            doc! {
                "household_id": guard.auth.account_id,
                "worker_id": { "$ne": null }
            },
            FindOptions::builder().sort(doc! { "updated_at": -1 }).build(),
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut jobs = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let job: Job = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        jobs.push(job);
    }

    // Join worker contact details in one query.
    let worker_ids: Vec<ObjectId> = jobs.iter().filter_map(|j| j.worker_id).collect();
    let mut workers: HashMap<ObjectId, WorkerProfile> = HashMap::new();
    if !worker_ids.is_empty() {
        let mut cursor = db
            .collection::<WorkerProfile>("worker")
            .find(doc! { "_id": { "$in": worker_ids } }, None)
            .await
            .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
        while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
            let worker: WorkerProfile = cursor.deserialize_current()
                .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
            if let Some(id) = worker.id {
                workers.insert(id, worker);
            }
        }
    }

    let bookings: Vec<BookingResponse> = jobs
        .into_iter()
        .map(|job| {
            let worker = job.worker_id.and_then(|id| workers.get(&id));
            BookingResponse {
                job_id: job.id.map(|id| id.to_hex()).unwrap_or_default(),
                title: job.title,
                service_type: job.service_type,
                schedule_text: job.schedule_text,
                status: job.status.as_str().to_string(),
                worker_id: job.worker_id.map(|id| id.to_hex()),
                worker_name: job.worker_name,
                worker_phone: worker.map(|w| w.phone.clone()),
                worker_profile_picture_url: worker.and_then(|w| w.profile_picture_url.clone()),
                booked_at: job.updated_at.try_to_rfc3339_string().unwrap_or_default(),
            }
        })
        .collect();
    let total = bookings.len();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "bookings": bookings,
        "total": total
    }))))
}

#[openapi(tag = "Jobs")]
#[get("/worker/jobs")]
pub async fn worker_jobs(
    db: &State<DbConn>,
    guard: WorkerGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let worker = worker_of(db, &guard.auth).await?;

    let mut cursor = db
        .collection::<Job>("jobs")
        .find(
            doc! { "worker_id": worker.id },
            FindOptions::builder().sort(doc! { "updated_at": -1 }).build(),
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut jobs = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let job: Job = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        jobs.push(JobResponse::from(job));
    }
    let total = jobs.len();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "jobs": jobs,
        "total": total
    }))))
}
