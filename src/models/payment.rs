use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Service,
    Training,
}

impl PaymentKind {
    pub fn collection(&self) -> &'static str {
        match self {
            PaymentKind::Service => "service_payments",
            PaymentKind::Training => "training_payments",
        }
    }
}

/// Ledger entry written by the payment collaborator's webhook. Read-only
/// everywhere else.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reference: String,
    pub date: DateTime,
    pub payer_id: ObjectId,
    pub payer_name: String,
    pub payee_id: ObjectId,
    pub payee_name: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub created_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PaymentWebhookDto {
    pub kind: PaymentKind,
    pub reference: String,
    pub payer_id: String,
    pub payer_name: String,
    pub payee_id: String,
    pub payee_name: String,
    pub amount: f64,
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PaymentResponse {
    pub id: String,
    pub reference: String,
    pub date: String,
    pub payer_name: String,
    pub payee_name: String,
    pub amount: f64,
    pub status: String,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        PaymentResponse {
            id: p.id.map(|id| id.to_hex()).unwrap_or_default(),
            reference: p.reference,
            date: p.date.try_to_rfc3339_string().unwrap_or_default(),
            payer_name: p.payer_name,
            payee_name: p.payee_name,
            amount: p.amount,
            status: format!("{:?}", p.status).to_lowercase(),
        }
    }
}
