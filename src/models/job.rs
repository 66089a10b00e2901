use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;
use validator::Validate;

/// Lifecycle of a job post. Transitions go through `can_transition`;
/// writers never set a status the table does not allow.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Open,
    Assigned,
    Completed,
    Cancelled,
    Rescheduled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Open => "open",
            JobStatus::Assigned => "assigned",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Rescheduled => "rescheduled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// Legal-transition table.
    ///
    /// pending     → open, cancelled
    /// open        → assigned, cancelled, rescheduled
    /// assigned    → completed, cancelled, rescheduled
    /// rescheduled → open, assigned, cancelled
    pub fn can_transition(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Open)
                | (Pending, Cancelled)
                | (Open, Assigned)
                | (Open, Cancelled)
                | (Open, Rescheduled)
                | (Assigned, Completed)
                | (Assigned, Cancelled)
                | (Assigned, Rescheduled)
                | (Rescheduled, Open)
                | (Rescheduled, Assigned)
                | (Rescheduled, Cancelled)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PayFrequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, JsonSchema)]
pub struct Benefits {
    pub accommodation: bool,
    pub meals: bool,
    pub transport: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct Compensation {
    pub salary: f64,
    pub pay_frequency: PayFrequency,
    pub benefits: Benefits,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One worker's bid on a job, embedded in the job document.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Application {
    pub worker_id: ObjectId,
    pub worker_name: String,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Review {
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Job {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub schedule_text: String,
    pub compensation: Compensation,
    pub household_id: ObjectId,
    pub household_name: String,
    pub worker_id: Option<ObjectId>,
    pub worker_name: Option<String>,
    pub status: JobStatus,
    pub applicants: Vec<Application>,
    pub review: Option<Review>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ApplyError {
    /// The job left the `open` state.
    NotOpen,
    /// The worker already has an application on this job.
    AlreadyApplied,
}

impl Job {
    pub fn has_applicant(&self, worker_id: &ObjectId) -> bool {
        self.applicants.iter().any(|a| &a.worker_id == worker_id)
    }

    /// Appends a worker's application. A worker id appears at most once
    /// per job, and only `open` jobs accept applications.
    pub fn add_applicant(&mut self, application: Application) -> Result<(), ApplyError> {
        if self.status != JobStatus::Open {
            return Err(ApplyError::NotOpen);
        }
        if self.has_applicant(&application.worker_id) {
            return Err(ApplyError::AlreadyApplied);
        }
        self.applicants.push(application);
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateJobDto {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 20, max = 2000, message = "Description must be 20-2000 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: String,
    #[validate(length(min = 1, message = "Schedule is required"))]
    pub schedule_text: String,
    #[validate(range(min = 1.0, message = "Salary must be at least 1"))]
    pub salary: f64,
    pub pay_frequency: PayFrequency,
    #[serde(default)]
    pub benefits: Benefits,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RescheduleJobDto {
    #[validate(length(min = 1, message = "Schedule is required"))]
    pub schedule_text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ApplyJobDto {
    pub cover_letter: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct SubmitReviewDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ApplicationResponse {
    pub worker_id: String,
    pub worker_name: String,
    pub cover_letter: String,
    pub status: String,
    pub applied_at: String,
}

impl From<&Application> for ApplicationResponse {
    fn from(a: &Application) -> Self {
        ApplicationResponse {
            worker_id: a.worker_id.to_hex(),
            worker_name: a.worker_name.clone(),
            cover_letter: a.cover_letter.clone(),
            status: format!("{:?}", a.status).to_lowercase(),
            applied_at: a.applied_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ReviewResponse {
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<&Review> for ReviewResponse {
    fn from(r: &Review) -> Self {
        ReviewResponse {
            rating: r.rating,
            comment: r.comment.clone(),
            created_at: r.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct JobResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub schedule_text: String,
    pub compensation: Compensation,
    pub household_id: String,
    pub household_name: String,
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
    pub status: String,
    pub applicants: Vec<ApplicationResponse>,
    pub review: Option<ReviewResponse>,
    pub created_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        JobResponse {
            id: job.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: job.title,
            description: job.description,
            service_type: job.service_type,
            schedule_text: job.schedule_text,
            compensation: job.compensation,
            household_id: job.household_id.to_hex(),
            household_name: job.household_name,
            worker_id: job.worker_id.map(|id| id.to_hex()),
            worker_name: job.worker_name,
            status: job.status.as_str().to_string(),
            applicants: job.applicants.iter().map(ApplicationResponse::from).collect(),
            review: job.review.as_ref().map(ReviewResponse::from),
            created_at: job.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

/// Read-shaped projection of an assigned job for the household's
/// bookings view. Never persisted; the worker contact fields are joined
/// in at read time.
#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingResponse {
    pub job_id: String,
    pub title: String,
    pub service_type: String,
    pub schedule_text: String,
    pub status: String,
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
    pub worker_phone: Option<String>,
    pub worker_profile_picture_url: Option<String>,
    pub booked_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus) -> Job {
        Job {
            id: Some(ObjectId::new()),
            title: "Live-in nanny".to_string(),
            description: "Care for two children on weekdays.".to_string(),
            service_type: "childcare".to_string(),
            schedule_text: "Mon-Fri, 8am-5pm".to_string(),
            compensation: Compensation {
                salary: 150000.0,
                pay_frequency: PayFrequency::Monthly,
                benefits: Benefits::default(),
            },
            household_id: ObjectId::new(),
            household_name: "Mukamana family".to_string(),
            worker_id: None,
            worker_name: None,
            status,
            applicants: Vec::new(),
            review: None,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    fn application(worker_id: ObjectId) -> Application {
        Application {
            worker_id,
            worker_name: "Claudine".to_string(),
            cover_letter: "I have five years of experience.".to_string(),
            status: ApplicationStatus::Pending,
            applied_at: DateTime::now(),
        }
    }

    #[test]
    fn legal_transitions_accepted() {
        assert!(JobStatus::Pending.can_transition(JobStatus::Open));
        assert!(JobStatus::Open.can_transition(JobStatus::Assigned));
        assert!(JobStatus::Open.can_transition(JobStatus::Rescheduled));
        assert!(JobStatus::Assigned.can_transition(JobStatus::Completed));
        assert!(JobStatus::Rescheduled.can_transition(JobStatus::Open));
        assert!(JobStatus::Assigned.can_transition(JobStatus::Cancelled));
    }

    #[test]
    fn illegal_transitions_rejected() {
        assert!(!JobStatus::Pending.can_transition(JobStatus::Assigned));
        assert!(!JobStatus::Open.can_transition(JobStatus::Completed));
        assert!(!JobStatus::Assigned.can_transition(JobStatus::Open));
        assert!(!JobStatus::Open.can_transition(JobStatus::Open));
    }

    #[test]
    fn terminal_states_are_immovable() {
        for next in [
            JobStatus::Pending,
            JobStatus::Open,
            JobStatus::Assigned,
            JobStatus::Completed,
            JobStatus::Cancelled,
            JobStatus::Rescheduled,
        ] {
            assert!(!JobStatus::Completed.can_transition(next));
            assert!(!JobStatus::Cancelled.can_transition(next));
        }
    }

    #[test]
    fn duplicate_application_is_rejected() {
        let mut job = job(JobStatus::Open);
        let worker_id = ObjectId::new();

        assert!(job.add_applicant(application(worker_id)).is_ok());
        assert_eq!(
            job.add_applicant(application(worker_id)),
            Err(ApplyError::AlreadyApplied)
        );
        assert_eq!(job.applicants.len(), 1);
    }

    #[test]
    fn applications_rejected_unless_open() {
        for status in [
            JobStatus::Pending,
            JobStatus::Assigned,
            JobStatus::Completed,
            JobStatus::Cancelled,
            JobStatus::Rescheduled,
        ] {
            let mut job = job(status);
            assert_eq!(
                job.add_applicant(application(ObjectId::new())),
                Err(ApplyError::NotOpen)
            );
            assert!(job.applicants.is_empty());
        }
    }
}
