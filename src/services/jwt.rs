use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey};
use serde::{Deserialize, Serialize};
use mongodb::bson::oid::ObjectId;

use crate::models::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Account ID
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

pub struct JwtService;

impl JwtService {
    pub fn generate_access_token(account_id: &ObjectId, email: &str, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        let expiry = crate::config::Config::jwt_expiry();
        let now = chrono::Utc::now().timestamp();

        let claims = Claims {
            sub: account_id.to_hex(),
            email: email.to_string(),
            role,
            exp: now + expiry,
            iat: now,
        };

        let secret = crate::config::Config::jwt_secret();
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn generate_refresh_token(account_id: &ObjectId, email: &str, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        let expiry = crate::config::Config::jwt_refresh_expiry();
        let now = chrono::Utc::now().timestamp();

        let claims = Claims {
            sub: account_id.to_hex(),
            email: email.to_string(),
            role,
            exp: now + expiry,
            iat: now,
        };

        let secret = crate::config::Config::jwt_refresh_secret();
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn verify_token(token: &str, is_refresh: bool) -> Result<Claims, jsonwebtoken::errors::Error> {
        let secret = if is_refresh {
            crate::config::Config::jwt_refresh_secret()
        } else {
            crate::config::Config::jwt_secret()
        };

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_claims() {
        let id = ObjectId::new();
        let token = JwtService::generate_access_token(&id, "test@example.com", Role::Worker).unwrap();
        let claims = JwtService::verify_token(&token, false).unwrap();

        assert_eq!(claims.sub, id.to_hex());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, Role::Worker);
    }

    #[test]
    fn refresh_secret_does_not_verify_access_tokens() {
        let id = ObjectId::new();
        let token = JwtService::generate_access_token(&id, "test@example.com", Role::Household).unwrap();
        assert!(JwtService::verify_token(&token, true).is_err());
    }
}
