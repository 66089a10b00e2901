use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Household,
    Worker,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Household => "household",
            Role::Worker => "worker",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
    Google,
    Github,
}

/// Moderation state shared by every role profile.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Active,
    Pending,
    Suspended,
}

/// Credential record behind the auth endpoints. `password_hash` is None
/// for accounts created through an OAuth provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: Option<String>,
    pub provider: AuthProvider,
    pub role: Role,
    pub last_login_at: DateTime,
    pub created_at: DateTime,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RegisterDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OAuthLoginDto {
    pub code: String,
    pub redirect_uri: String,
    /// Role to register under when the account does not exist yet.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub provider: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: account.email,
            role: account.role.as_str().to_string(),
            provider: format!("{:?}", account.provider).to_lowercase(),
        }
    }
}
