use mongodb::bson::{oid::ObjectId, DateTime};
use log::error;

use crate::db::DbConn;
use crate::models::{Notification, NotificationKind};

/// Fan-out writer for the notification sink. A failed write is logged
/// and swallowed; lifecycle actions never fail over a missed badge.
pub struct Notifier;

impl Notifier {
    pub async fn notify(
        db: &DbConn,
        user_id: ObjectId,
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
        job_id: Option<ObjectId>,
        payment_id: Option<ObjectId>,
    ) {
        let notification = Notification {
            id: None,
            user_id,
            title: title.into(),
            description: description.into(),
            kind,
            read: false,
            job_id,
            payment_id,
            created_at: DateTime::now(),
        };

        if let Err(e) = db
            .collection::<Notification>("notifications")
            .insert_one(&notification, None)
            .await
        {
            error!("Failed to write notification for {}: {}", user_id.to_hex(), e);
        }
    }

    pub async fn notify_job(
        db: &DbConn,
        user_id: ObjectId,
        title: impl Into<String>,
        description: impl Into<String>,
        job_id: ObjectId,
    ) {
        Self::notify(db, user_id, NotificationKind::Job, title, description, Some(job_id), None).await;
    }
}
