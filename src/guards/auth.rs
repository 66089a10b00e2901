use rocket::request::{self, FromRequest, Request, Outcome};
use rocket::http::Status;
use mongodb::bson::oid::ObjectId;

use crate::models::Role;

// === OpenAPI (compatible with rocket_okapi 0.8.0 / 0.8.1) ===
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use rocket_okapi::r#gen::OpenApiGenerator;

/// Name of the HTTP-only session cookie carrying the access token.
pub const SESSION_COOKIE: &str = "session-token";

/// JWT-based authentication guard. Accepts a bearer token in the
/// Authorization header, falling back to the session cookie.
pub struct AuthGuard {
    pub account_id: ObjectId,
    pub email: String,
    pub role: Role,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let token = req
            .headers()
            .get_one("Authorization")
            .map(|h| h.trim_start_matches("Bearer ").to_string())
            .or_else(|| req.cookies().get(SESSION_COOKIE).map(|c| c.value().to_string()));

        match token {
            Some(token) => match crate::services::JwtService::verify_token(&token, false) {
                Ok(claims) => match ObjectId::parse_str(&claims.sub) {
                    Ok(account_id) => Outcome::Success(AuthGuard {
                        account_id,
                        email: claims.email,
                        role: claims.role,
                    }),
                    Err(_) => Outcome::Error((Status::Unauthorized, ())),
                },
                Err(_) => Outcome::Error((Status::Unauthorized, ())),
            },
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

/// === OpenAPI Integration (Fallback for older versions) ===
/// Keeps OpenAPI generation working even without new traits.
impl<'a> OpenApiFromRequest<'a> for AuthGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        // The guard doesn't contribute any special header/parameter for docs
        Ok(RequestHeaderInput::None)
    }
}
