use rocket::serde::json::Json;
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::time::Duration;
use rocket_okapi::openapi;
use mongodb::bson::{doc, DateTime, oid::ObjectId};
use log::info;

use crate::config::Config;
use crate::db::DbConn;
use crate::guards::{AuthGuard, SESSION_COOKIE};
use crate::models::{
    Account, AccountResponse, AuthProvider, HouseholdProfile, LoginDto, OAuthLoginDto,
    ProfileStatus, RegisterDto, Role, WorkerProfile,
};
use crate::services::{EmailService, JwtService, OAuthService};
use crate::services::oauth::OAuthProfile;
use validator::Validate;
use crate::utils::{validate_email, validate_phone, validate_password, ApiResponse, ApiError};

const LOGIN_WINDOW_MS: i64 = 15 * 60 * 1000;
const LOGIN_LIMIT: i32 = 10;
const REFRESH_LIMIT: i32 = 10;
const REFRESH_WINDOW_MS: i64 = 60 * 1000;

/// --------------------
/// Rate limiter helper
/// --------------------
async fn rate_limit(
    db: &DbConn,
    key: &str,
    limit: i32,
    window_ms: i64,
) -> Result<(), ApiError> {
    let now = chrono::Utc::now().timestamp_millis();
    let window_expires = DateTime::from_millis(now + window_ms);

    let collection = db.collection::<mongodb::bson::Document>("rate_limits");

    let doc = collection
        .find_one(doc! { "key": key }, None)
        .await
        .map_err(|_| ApiError::internal_error("Rate limiter lookup failed"))?;

    match doc {
        // First request OR expired window
        None => {
            collection
                .insert_one(
                    doc! {
                        "key": key,
                        "count": 1,
                        "expires_at": window_expires
                    },
                    None,
                )
                .await
                .map_err(|_| ApiError::internal_error("Rate limiter insert failed"))?;
            Ok(())
        }

        Some(d) => {
            let count = d.get_i32("count").unwrap_or(0);
            let expires_at = d.get_datetime("expires_at").ok();

            // Window expired → reset
            if expires_at.map(|e| *e < DateTime::now()).unwrap_or(true) {
                collection
                    .update_one(
                        doc! { "key": key },
                        doc! {
                            "$set": {
                                "count": 1,
                                "expires_at": window_expires
                            }
                        },
                        None,
                    )
                    .await
                    .map_err(|_| ApiError::internal_error("Rate limiter reset failed"))?;
                return Ok(());
            }

            // Limit exceeded
            if count >= limit {
                return Err(ApiError::too_many_requests("Too many attempts. Please try later."));
            }

            // Increment count
            collection
                .update_one(
                    doc! { "key": key },
                    doc! { "$inc": { "count": 1 } },
                    None,
                )
                .await
                .map_err(|_| ApiError::internal_error("Rate limiter increment failed"))?;

            Ok(())
        }
    }
}

/// Password rule for email/password sign-up. Returns the error code the
/// caller surfaces, or None when the password is acceptable.
fn password_error(password: &str) -> Option<&'static str> {
    if password.len() < 6 {
        return Some("auth/weak-password");
    }
    if !validate_password(password) {
        return Some("Password must contain upper and lower case letters and a number");
    }
    None
}

/// Maps identity error codes to the strings shown in the UI toast.
pub fn describe_auth_error(code: &str) -> &'static str {
    match code {
        "auth/email-already-in-use" => "An account with this email already exists",
        "auth/weak-password" => "Password must be at least 6 characters",
        "auth/user-not-found" => "No account found for this email",
        "auth/invalid-credential" => "Incorrect email or password",
        _ => "Authentication failed",
    }
}

fn set_session_cookie(jar: &CookieJar<'_>, token: &str) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(!Config::is_development());
    cookie.set_path("/");
    cookie.set_max_age(Duration::seconds(Config::session_expiry()));
    jar.add(cookie);
}

async fn issue_tokens(
    jar: &CookieJar<'_>,
    account: &Account,
) -> Result<serde_json::Value, ApiError> {
    let id = account
        .id
        .as_ref()
        .ok_or_else(|| ApiError::internal_error("Account missing ID"))?;

    let access_token = JwtService::generate_access_token(id, &account.email, account.role)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    let refresh_token = JwtService::generate_refresh_token(id, &account.email, account.role)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    set_session_cookie(jar, &access_token);

    Ok(serde_json::json!({
        "account": AccountResponse::from(account.clone()),
        "accessToken": access_token,
        "refreshToken": refresh_token
    }))
}

/// Creates the role profile that goes with a fresh account. New profiles
/// start `pending` until an admin approves them.
async fn create_role_profile(
    db: &DbConn,
    account_id: ObjectId,
    role: Role,
    full_name: &str,
    email: &str,
    phone: &str,
    city: Option<String>,
    picture: Option<String>,
) -> Result<(), ApiError> {
    let now = DateTime::now();
    match role {
        Role::Worker => {
            let profile = WorkerProfile {
                id: None,
                account_id,
                full_name: full_name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                city,
                bio: None,
                service_types: Vec::new(),
                experience_years: None,
                profile_picture_url: picture,
                identity_document_url: None,
                status: ProfileStatus::Pending,
                rating: 0.0,
                reviews_count: 0,
                jobs_completed: 0,
                created_at: now,
                updated_at: now,
            };
            db.collection::<WorkerProfile>("worker")
                .insert_one(&profile, None)
                .await
                .map_err(|e| ApiError::internal_error(format!("Failed to create profile: {}", e)))?;
        }
        Role::Household => {
            let profile = HouseholdProfile {
                id: None,
                account_id,
                full_name: full_name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                city,
                address: None,
                profile_picture_url: picture,
                status: ProfileStatus::Pending,
                jobs_posted: 0,
                created_at: now,
                updated_at: now,
            };
            db.collection::<HouseholdProfile>("household")
                .insert_one(&profile, None)
                .await
                .map_err(|e| ApiError::internal_error(format!("Failed to create profile: {}", e)))?;
        }
        Role::Admin => {
            return Err(ApiError::forbidden("Admin accounts are provisioned manually"));
        }
    }
    Ok(())
}

/// --------------------
/// Register (email/password)
/// --------------------
#[openapi(tag = "Auth")]
#[post("/auth/register", data = "<dto>")]
pub async fn register(
    db: &State<DbConn>,
    jar: &CookieJar<'_>,
    dto: Json<RegisterDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    dto.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;
    if !validate_email(&dto.email) {
        return Err(ApiError::bad_request("Invalid email"));
    }
    if !validate_phone(&dto.phone) {
        return Err(ApiError::bad_request("Invalid phone number"));
    }
    if let Some(reason) = password_error(&dto.password) {
        return Err(ApiError::bad_request(reason));
    }
    if dto.role == Role::Admin {
        return Err(ApiError::forbidden("Admin accounts are provisioned manually"));
    }

    rate_limit(db, &format!("register:{}", dto.email), LOGIN_LIMIT, LOGIN_WINDOW_MS).await?;

    let accounts = db.collection::<Account>("accounts");

    let existing = accounts
        .find_one(doc! { "email": &dto.email }, None)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    if existing.is_some() {
        info!("Registration rejected for {}: {}", dto.email, describe_auth_error("auth/email-already-in-use"));
        return Err(ApiError::conflict("auth/email-already-in-use"));
    }

    let password_hash = bcrypt::hash(&dto.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal_error(format!("Failed to hash password: {}", e)))?;

    let account = Account {
        id: None,
        email: dto.email.clone(),
        password_hash: Some(password_hash),
        provider: AuthProvider::Email,
        role: dto.role,
        last_login_at: DateTime::now(),
        created_at: DateTime::now(),
    };

    let res = accounts
        .insert_one(&account, None)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let account_id = res
        .inserted_id
        .as_object_id()
        .ok_or_else(|| ApiError::internal_error("Failed to get inserted account ID"))?;

    create_role_profile(
        db,
        account_id,
        dto.role,
        &dto.full_name,
        &dto.email,
        &dto.phone,
        dto.city.clone(),
        None,
    )
    .await?;

    EmailService::send_welcome_email(&dto.email, &dto.full_name).await;

    let mut account = account;
    account.id = Some(account_id);
    let data = issue_tokens(jar, &account).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Registration successful".to_string(),
        data,
    )))
}

/// --------------------
/// Login (email/password)
/// --------------------
#[openapi(tag = "Auth")]
#[post("/auth/login", data = "<dto>")]
pub async fn login(
    db: &State<DbConn>,
    jar: &CookieJar<'_>,
    dto: Json<LoginDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    rate_limit(db, &format!("login:{}", dto.email), LOGIN_LIMIT, LOGIN_WINDOW_MS).await?;

    let accounts = db.collection::<Account>("accounts");

    let account = accounts
        .find_one(doc! { "email": &dto.email }, None)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("auth/user-not-found"))?;

    let hash = account
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("auth/invalid-credential"))?;

    let valid = bcrypt::verify(&dto.password, hash)
        .map_err(|e| ApiError::internal_error(format!("Password check failed: {}", e)))?;
    if !valid {
        info!("Login failed for {}: {}", dto.email, describe_auth_error("auth/invalid-credential"));
        return Err(ApiError::unauthorized("auth/invalid-credential"));
    }

    accounts
        .update_one(
            doc! { "_id": account.id },
            doc! { "$set": { "last_login_at": DateTime::now() } },
            None,
        )
        .await
        .ok();

    let data = issue_tokens(jar, &account).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Login successful".to_string(),
        data,
    )))
}

/// --------------------
/// OAuth sign-in (Google / GitHub)
/// --------------------
async fn oauth_login(
    db: &DbConn,
    jar: &CookieJar<'_>,
    profile: OAuthProfile,
    provider: AuthProvider,
    role: Option<Role>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let accounts = db.collection::<Account>("accounts");

    let existing = accounts
        .find_one(doc! { "email": &profile.email }, None)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let (account, is_new) = match existing {
        Some(account) => {
            accounts
                .update_one(
                    doc! { "_id": account.id },
                    doc! { "$set": { "last_login_at": DateTime::now() } },
                    None,
                )
                .await
                .ok();
            (account, false)
        }
        None => {
            let role = role.unwrap_or(Role::Household);
            if role == Role::Admin {
                return Err(ApiError::forbidden("Admin accounts are provisioned manually"));
            }

            let account = Account {
                id: None,
                email: profile.email.clone(),
                password_hash: None,
                provider,
                role,
                last_login_at: DateTime::now(),
                created_at: DateTime::now(),
            };

            let res = accounts
                .insert_one(&account, None)
                .await
                .map_err(|e| ApiError::internal_error(e.to_string()))?;

            let account_id = res
                .inserted_id
                .as_object_id()
                .ok_or_else(|| ApiError::internal_error("Failed to get inserted account ID"))?;

            let name = profile.name.clone().unwrap_or_default();
            create_role_profile(
                db,
                account_id,
                role,
                &name,
                &profile.email,
                "",
                None,
                profile.picture.clone(),
            )
            .await?;

            EmailService::send_welcome_email(&profile.email, &name).await;

            let mut account = account;
            account.id = Some(account_id);
            (account, true)
        }
    };

    let data = issue_tokens(jar, &account).await?;

    Ok(Json(ApiResponse::success_with_message(
        if is_new { "Registration successful" } else { "Login successful" }.to_string(),
        data,
    )))
}

#[openapi(tag = "Auth")]
#[post("/auth/google", data = "<dto>")]
pub async fn google_login(
    db: &State<DbConn>,
    jar: &CookieJar<'_>,
    dto: Json<OAuthLoginDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let profile = OAuthService::google_exchange(&dto.code, &dto.redirect_uri)
        .await
        .map_err(ApiError::unauthorized)?;

    oauth_login(db, jar, profile, AuthProvider::Google, dto.role).await
}

#[openapi(tag = "Auth")]
#[post("/auth/github", data = "<dto>")]
pub async fn github_login(
    db: &State<DbConn>,
    jar: &CookieJar<'_>,
    dto: Json<OAuthLoginDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let profile = OAuthService::github_exchange(&dto.code, &dto.redirect_uri)
        .await
        .map_err(ApiError::unauthorized)?;

    oauth_login(db, jar, profile, AuthProvider::Github, dto.role).await
}

/// --------------------
/// Silent Refresh Token
/// --------------------
#[derive(serde::Deserialize, rocket_okapi::okapi::schemars::JsonSchema)]
pub struct RefreshTokenDto {
    pub refresh_token: String,
}

#[openapi(tag = "Auth")]
#[post("/auth/refresh", data = "<dto>")]
pub async fn refresh_token(
    db: &State<DbConn>,
    dto: Json<RefreshTokenDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    rate_limit(db, "refresh_token", REFRESH_LIMIT, REFRESH_WINDOW_MS).await?;

    let claims = crate::services::JwtService::verify_token(&dto.refresh_token, true)
        .map_err(|_| ApiError::unauthorized("Invalid refresh token"))?;

    let account_id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthorized("Invalid account id in token"))?;

    let access = JwtService::generate_access_token(&account_id, &claims.email, claims.role)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "accessToken": access
    }))))
}

/// --------------------
/// Logout
/// --------------------
#[openapi(tag = "Auth")]
#[post("/auth/logout")]
pub async fn logout(
    jar: &CookieJar<'_>,
    _auth: AuthGuard,
) -> Json<ApiResponse<serde_json::Value>> {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    Json(ApiResponse::success(serde_json::json!({
        "message": "Logged out"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_passwords_report_the_weak_password_code() {
        assert_eq!(password_error("123"), Some("auth/weak-password"));
        assert_eq!(password_error("Ab1"), Some("auth/weak-password"));
    }

    #[test]
    fn strong_passwords_pass() {
        assert_eq!(password_error("Password123"), None);
        assert!(password_error("password").is_some());
    }

    #[test]
    fn auth_codes_map_to_toast_messages() {
        assert_eq!(
            describe_auth_error("auth/email-already-in-use"),
            "An account with this email already exists"
        );
        assert_eq!(
            describe_auth_error("auth/weak-password"),
            "Password must be at least 6 characters"
        );
        assert_eq!(describe_auth_error("something-else"), "Authentication failed");
    }
}
