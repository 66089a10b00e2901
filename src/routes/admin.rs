use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::{doc, DateTime, oid::ObjectId, to_bson};
use mongodb::options::FindOptions;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{
    AdminProfile, ApplicationStatus, HouseholdProfile, HouseholdResponse, Job, JobResponse,
    JobStatus, Payment, PaymentResponse, ProfileStatus, WorkerProfile, WorkerResponse,
};
use crate::services::{EmailService, Notifier};
use crate::utils::{ApiResponse, ApiError};

/* ==================== DASHBOARD ==================== */

async fn count(db: &DbConn, collection: &str) -> u64 {
    db.collection::<mongodb::bson::Document>(collection)
        .count_documents(None, None)
        .await
        .unwrap_or(0)
}

async fn count_jobs_with_status(db: &DbConn, status: JobStatus) -> u64 {
    db.collection::<Job>("jobs")
        .count_documents(doc! { "status": status.as_str() }, None)
        .await
        .unwrap_or(0)
}

async fn latest_jobs(db: &DbConn, limit: i64) -> Result<Vec<JobResponse>, ApiError> {
    let find_options = FindOptions::builder()
        .limit(limit)
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = db
        .collection::<Job>("jobs")
        .find(None, find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut jobs = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let job: Job = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        jobs.push(JobResponse::from(job));
    }
    Ok(jobs)
}

async fn latest_workers(db: &DbConn, limit: i64) -> Result<Vec<WorkerResponse>, ApiError> {
    let find_options = FindOptions::builder()
        .limit(limit)
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = db
        .collection::<WorkerProfile>("worker")
        .find(None, find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut workers = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let worker: WorkerProfile = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        workers.push(WorkerResponse::from(worker));
    }
    Ok(workers)
}

async fn latest_payments(db: &DbConn, limit: i64) -> Result<Vec<PaymentResponse>, ApiError> {
    let find_options = FindOptions::builder()
        .limit(limit)
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = db
        .collection::<Payment>("service_payments")
        .find(None, find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut payments = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let payment: Payment = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        payments.push(PaymentResponse::from(payment));
    }
    Ok(payments)
}

#[openapi(tag = "Admin")]
#[get("/admin/dashboard")]
pub async fn dashboard(
    db: &State<DbConn>,
    _admin: AdminGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let stats = serde_json::json!({
        "workers": count(db, "worker").await,
        "households": count(db, "household").await,
        "admins": count(db, "admins").await,
        "jobs": count(db, "jobs").await,
        "notifications": count(db, "notifications").await,
        "service_payments": count(db, "service_payments").await,
        "training_payments": count(db, "training_payments").await,
    });

    let activity = serde_json::json!({
        "pending": count_jobs_with_status(db, JobStatus::Pending).await,
        "open": count_jobs_with_status(db, JobStatus::Open).await,
        "assigned": count_jobs_with_status(db, JobStatus::Assigned).await,
        "completed": count_jobs_with_status(db, JobStatus::Completed).await,
        "cancelled": count_jobs_with_status(db, JobStatus::Cancelled).await,
        "rescheduled": count_jobs_with_status(db, JobStatus::Rescheduled).await,
    });

    let recent_data = serde_json::json!({
        "jobs": latest_jobs(db, 5).await?,
        "workers": latest_workers(db, 5).await?,
        "payments": latest_payments(db, 5).await?,
    });

    Ok(Json(ApiResponse::success(serde_json::json!({
        "stats": stats,
        "activity": activity,
        "recent_data": recent_data,
    }))))
}

#[openapi(tag = "Admin")]
#[get("/admin/profile")]
pub async fn get_admin_profile(
    db: &State<DbConn>,
    admin: AdminGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let profile = db
        .collection::<AdminProfile>("admins")
        .find_one(doc! { "account_id": admin.auth.account_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Admin profile not found"))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "id": profile.id.map(|id| id.to_hex()),
        "full_name": profile.full_name,
        "email": profile.email,
    }))))
}

/* ==================== PROFILE MODERATION ==================== */

#[derive(FromForm, serde::Deserialize, rocket_okapi::okapi::schemars::JsonSchema)]
pub struct ProfileListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[openapi(tag = "Admin")]
#[get("/admin/workers?<query..>")]
pub async fn get_all_workers(
    db: &State<DbConn>,
    _admin: AdminGuard,
    query: ProfileListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(100);
    let skip = (page - 1) * limit;

    let mut filter = doc! {};
    if let Some(ref status) = query.status {
        filter.insert("status", status);
    }

    let find_options = FindOptions::builder()
        .skip(skip as u64)
        .limit(limit)
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = db.collection::<WorkerProfile>("worker")
        .find(filter.clone(), find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut workers = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let worker: WorkerProfile = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        workers.push(WorkerResponse::from(worker));
    }

    let total = db.collection::<WorkerProfile>("worker")
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

#[openapi(tag = "Admin")]
#[get("/admin/households?<query..>")]
pub async fn get_all_households(
    db: &State<DbConn>,
    _admin: AdminGuard,
    query: ProfileListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(100);
    let skip = (page - 1) * limit;

    let mut filter = doc! {};
    if let Some(ref status) = query.status {
        filter.insert("status", status);
    }

    let find_options = FindOptions::builder()
        .skip(skip as u64)
        .limit(limit)
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = db.collection::<HouseholdProfile>("household")
        .find(filter.clone(), find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut households = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let household: HouseholdProfile = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        households.push(HouseholdResponse::from(household));
    }

    let total = db.collection::<HouseholdProfile>("household")
        .count_documents(filter, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Count error: {}", e)))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "households": households,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": (total as f64 / limit as f64).ceil() as i64,
        }
    }))))
}

#[derive(serde::Deserialize, rocket_okapi::okapi::schemars::JsonSchema)]
pub struct UpdateProfileStatusDto {
    pub status: ProfileStatus,
}

async fn set_profile_status(
    db: &DbConn,
    collection: &str,
    profile_id: &str,
    status: ProfileStatus,
) -> Result<ObjectId, ApiError> {
    let object_id = ObjectId::parse_str(profile_id)
        .map_err(|_| ApiError::bad_request("Invalid profile ID"))?;

    let status_bson = to_bson(&status)
        .map_err(|e| ApiError::internal_error(format!("Serialization error: {}", e)))?;

    let result = db
        .collection::<mongodb::bson::Document>(collection)
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": { "status": status_bson, "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update profile: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Profile not found"));
    }

    Ok(object_id)
}

#[openapi(tag = "Admin")]
#[put("/admin/workers/<worker_id>/status", data = "<dto>")]
pub async fn update_worker_status(
    db: &State<DbConn>,
    _admin: AdminGuard,
    worker_id: String,
    dto: Json<UpdateProfileStatusDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = set_profile_status(db, "worker", &worker_id, dto.status).await?;

    if let Ok(Some(worker)) = db
        .collection::<WorkerProfile>("worker")
        .find_one(doc! { "_id": object_id }, None)
        .await
    {
        let (title, description) = match dto.status {
            ProfileStatus::Active => ("Profile Approved", "Your worker profile is now active"),
            ProfileStatus::Suspended => ("Profile Suspended", "Your worker profile has been suspended"),
            ProfileStatus::Pending => ("Profile Under Review", "Your worker profile is being reviewed"),
        };
        Notifier::notify(
            db,
            worker.account_id,
            crate::models::NotificationKind::System,
            title,
            description,
            None,
            None,
        )
        .await;
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Worker status updated"
    }))))
}

#[openapi(tag = "Admin")]
#[put("/admin/households/<household_id>/status", data = "<dto>")]
pub async fn update_household_status(
    db: &State<DbConn>,
    _admin: AdminGuard,
    household_id: String,
    dto: Json<UpdateProfileStatusDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = set_profile_status(db, "household", &household_id, dto.status).await?;

    if let Ok(Some(household)) = db
        .collection::<HouseholdProfile>("household")
        .find_one(doc! { "_id": object_id }, None)
        .await
    {
        let (title, description) = match dto.status {
            ProfileStatus::Active => ("Profile Approved", "Your household profile is now active"),
            ProfileStatus::Suspended => ("Profile Suspended", "Your household profile has been suspended"),
            ProfileStatus::Pending => ("Profile Under Review", "Your household profile is being reviewed"),
        };
        Notifier::notify(
            db,
            household.account_id,
            crate::models::NotificationKind::System,
            title,
            description,
            None,
            None,
        )
        .await;
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Household status updated"
    }))))
}

#[openapi(tag = "Admin")]
#[delete("/admin/workers/<worker_id>")]
pub async fn delete_worker(
    db: &State<DbConn>,
    _admin: AdminGuard,
    worker_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&worker_id)
        .map_err(|_| ApiError::bad_request("Invalid worker ID"))?;

    let result = db
        .collection::<WorkerProfile>("worker")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete worker: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Worker not found"));
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Worker deleted successfully"
    }))))
}

#[openapi(tag = "Admin")]
#[delete("/admin/households/<household_id>")]
pub async fn delete_household(
    db: &State<DbConn>,
    _admin: AdminGuard,
    household_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&household_id)
        .map_err(|_| ApiError::bad_request("Invalid household ID"))?;

    let result = db
        .collection::<HouseholdProfile>("household")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete household: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Household not found"));
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Household deleted successfully"
    }))))
}

/* ==================== JOB MODERATION ==================== */

#[openapi(tag = "Admin")]
#[put("/admin/jobs/<job_id>/approve")]
pub async fn approve_job(
    db: &State<DbConn>,
    _admin: AdminGuard,
    job_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&job_id)
        .map_err(|_| ApiError::bad_request("Invalid job ID"))?;

    let job = db
        .collection::<Job>("jobs")
        .find_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if !job.status.can_transition(JobStatus::Open) {
        return Err(ApiError::conflict(format!(
            "Cannot move a {} job to open",
            job.status.as_str()
        )));
    }

    db.collection::<Job>("jobs")
        .update_one(
            doc! { "_id": object_id, "status": job.status.as_str() },
            doc! { "$set": { "status": JobStatus::Open.as_str(), "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to approve job: {}", e)))?;

    Notifier::notify_job(
        db,
        job.household_id,
        "Job Approved",
        format!("\"{}\" is now open for applications", job.title),
        object_id,
    )
    .await;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Job approved"
    }))))
}

#[derive(serde::Deserialize, rocket_okapi::okapi::schemars::JsonSchema)]
pub struct AssignWorkerDto {
    pub worker_id: String,
}

#[openapi(tag = "Admin")]
#[put("/admin/jobs/<job_id>/assign", data = "<dto>")]
pub async fn assign_worker(
    db: &State<DbConn>,
    _admin: AdminGuard,
    job_id: String,
    dto: Json<AssignWorkerDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let job_object_id = ObjectId::parse_str(&job_id)
        .map_err(|_| ApiError::bad_request("Invalid job ID"))?;
    let worker_object_id = ObjectId::parse_str(&dto.worker_id)
        .map_err(|_| ApiError::bad_request("Invalid worker ID"))?;

    let job = db
        .collection::<Job>("jobs")
        .find_one(doc! { "_id": job_object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if !job.status.can_transition(JobStatus::Assigned) {
        return Err(ApiError::conflict(format!(
            "Cannot move a {} job to assigned",
            job.status.as_str()
        )));
    }

    let worker = db
        .collection::<WorkerProfile>("worker")
        .find_one(doc! { "_id": worker_object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Worker not found"))?;

    if worker.status != ProfileStatus::Active {
        return Err(ApiError::bad_request("Worker is not active"));
    }

    // Settle the applicant list: the chosen worker is accepted, the rest
    // rejected.
    let applicants: Vec<_> = job
        .applicants
        .iter()
        .cloned()
        .map(|mut a| {
            a.status = if a.worker_id == worker_object_id {
                ApplicationStatus::Accepted
            } else {
                ApplicationStatus::Rejected
            };
            a
        })
        .collect();

    db.collection::<Job>("jobs")
        .update_one(
            doc! { "_id": job_object_id, "status": job.status.as_str() },
            doc! { "$set": {
                "worker_id": worker_object_id,
                "worker_name": &worker.full_name,
                "status": JobStatus::Assigned.as_str(),
                "applicants": to_bson(&applicants)
                    .map_err(|e| ApiError::internal_error(format!("Serialization error: {}", e)))?,
                "updated_at": DateTime::now()
            } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to assign worker: {}", e)))?;

    Notifier::notify_job(
        db,
        worker.account_id,
        "New Assignment",
        format!("You have been assigned to \"{}\"", job.title),
        job_object_id,
    )
    .await;

    EmailService::send_assignment_email(&worker.email, &worker.full_name, &job.title).await;

    Ok(Json(ApiResponse::success_with_message(
        "Worker assigned successfully".to_string(),
        serde_json::json!({
            "job_id": job_object_id.to_hex(),
            "worker_id": worker_object_id.to_hex(),
            "worker_name": worker.full_name
        }),
    )))
}

#[openapi(tag = "Admin")]
#[delete("/admin/jobs/<job_id>")]
pub async fn delete_job(
    db: &State<DbConn>,
    _admin: AdminGuard,
    job_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&job_id)
        .map_err(|_| ApiError::bad_request("Invalid job ID"))?;

    let result = db
        .collection::<Job>("jobs")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete job: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Job not found"));
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Job deleted successfully"
    }))))
}
