use rocket::serde::json::Json;
use rocket::State;
use rocket::request::{self, FromRequest, Request, Outcome};
use rocket::http::Status;
use rocket_okapi::openapi;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use rocket_okapi::r#gen::OpenApiGenerator;
use mongodb::bson::{doc, DateTime, oid::ObjectId};
use mongodb::options::{FindOptions, UpdateOptions};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::Config;
use crate::db::DbConn;
use crate::guards::AuthGuard;
use crate::models::{NotificationKind, Payment, PaymentKind, PaymentResponse, PaymentWebhookDto, Role};
use crate::services::Notifier;
use crate::utils::{ApiResponse, ApiError};

/// Hex-encoded HMAC-SHA256 over the raw webhook body.
pub fn verify_signature(secret: &str, body: &str, signature: &str) -> bool {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());
    expected == signature
}

/// Signature header attached by the payment collaborator.
pub struct WebhookSignature(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for WebhookSignature {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.headers().get_one("X-Webhook-Signature") {
            Some(signature) => Outcome::Success(WebhookSignature(signature.to_string())),
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for WebhookSignature {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

async fn list_payments(
    db: &DbConn,
    auth: &AuthGuard,
    kind: PaymentKind,
    page: i64,
    limit: i64,
) -> Result<serde_json::Value, ApiError> {
    let page = page.max(1);
    let limit = limit.min(100);
    let skip = (page - 1) * limit;

    // Admins see the whole ledger; everyone else only entries they are
    // party to.
    let filter = if auth.role == Role::Admin {
        doc! {}
    } else {
        doc! { "$or": [
            { "payer_id": auth.account_id },
            { "payee_id": auth.account_id }
        ] }
    };

    let find_options = FindOptions::builder()
        .skip(skip as u64)
        .limit(limit)
        .sort(doc! { "date": -1 })
        .build();

    let mut cursor = db
        .collection::<Payment>(kind.collection())
        .find(filter.clone(), find_options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut payments = Vec::new();
    while cursor.advance().await.map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))? {
        let payment: Payment = cursor.deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        payments.push(PaymentResponse::from(payment));
    }

    let total = db
        .collection::<Payment>(kind.collection())
        .count_documents(filter, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Count error: {}", e)))?;

    Ok(serde_json::json!({
        "payments": payments,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": (total as f64 / limit as f64).ceil() as i64,
        }
    }))
}

#[openapi(tag = "Payments")]
#[get("/payments/service?<page>&<limit>")]
pub async fn list_service_payments(
    db: &State<DbConn>,
    auth: AuthGuard,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let data = list_payments(db, &auth, PaymentKind::Service, page.unwrap_or(1), limit.unwrap_or(20)).await?;
    Ok(Json(ApiResponse::success(data)))
}

#[openapi(tag = "Payments")]
#[get("/payments/training?<page>&<limit>")]
pub async fn list_training_payments(
    db: &State<DbConn>,
    auth: AuthGuard,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let data = list_payments(db, &auth, PaymentKind::Training, page.unwrap_or(1), limit.unwrap_or(20)).await?;
    Ok(Json(ApiResponse::success(data)))
}

/// Ingest endpoint for the external payment collaborator. The ledger is
/// read-only everywhere else; this is its single writer.
#[openapi(tag = "Payments")]
#[post("/payments/webhook", data = "<body>")]
pub async fn payment_webhook(
    db: &State<DbConn>,
    signature: WebhookSignature,
    body: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let secret = Config::payment_webhook_secret()
        .ok_or_else(|| ApiError::internal_error("Payment webhook secret not configured"))?;

    if !verify_signature(&secret, &body, &signature.0) {
        return Err(ApiError::unauthorized("Invalid webhook signature"));
    }

    let dto: PaymentWebhookDto = serde_json::from_str(&body)
        .map_err(|e| ApiError::bad_request(format!("Malformed webhook payload: {}", e)))?;

    let payer_id = ObjectId::parse_str(&dto.payer_id)
        .map_err(|_| ApiError::bad_request("Invalid payer ID"))?;
    let payee_id = ObjectId::parse_str(&dto.payee_id)
        .map_err(|_| ApiError::bad_request("Invalid payee ID"))?;

    let status_bson = mongodb::bson::to_bson(&dto.status)
        .map_err(|e| ApiError::internal_error(format!("Serialization error: {}", e)))?;

    // Upsert by reference so a redelivered webhook overwrites rather
    // than duplicates.
    db.collection::<Payment>(dto.kind.collection())
        .update_one(
            doc! { "reference": &dto.reference },
            doc! {
                "$set": {
                    "date": DateTime::now(),
                    "payer_id": payer_id,
                    "payer_name": &dto.payer_name,
                    "payee_id": payee_id,
                    "payee_name": &dto.payee_name,
                    "amount": dto.amount,
                    "status": status_bson,
                },
                "$setOnInsert": { "created_at": DateTime::now() }
            },
            UpdateOptions::builder().upsert(true).build(),
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to record payment: {}", e)))?;

    let payment = db
        .collection::<Payment>(dto.kind.collection())
        .find_one(doc! { "reference": &dto.reference }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    Notifier::notify(
        db,
        payee_id,
        NotificationKind::Payment,
        "Payment Update",
        format!(
            "Payment of {} from {} is {}",
            dto.amount,
            dto.payer_name,
            format!("{:?}", dto.status).to_lowercase()
        ),
        None,
        payment.and_then(|p| p.id),
    )
    .await;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "reference": dto.reference
    }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip() {
        let secret = "whsec_test";
        let body = r#"{"reference":"pay_123","amount":50.0}"#;

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        assert!(verify_signature(secret, body, &signature));
        assert!(!verify_signature(secret, body, "deadbeef"));
        assert!(!verify_signature("other-secret", body, &signature));
    }
}
