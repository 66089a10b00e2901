use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Profile returned by an OAuth provider after the code exchange.
#[derive(Debug)]
pub struct OAuthProfile {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    email: Option<String>,
    name: Option<String>,
    login: String,
    avatar_url: Option<String>,
}

pub struct OAuthService;

impl OAuthService {
    fn client() -> Client {
        Client::new()
    }

    pub async fn google_exchange(code: &str, redirect_uri: &str) -> Result<OAuthProfile, String> {
        let client_id = Config::google_client_id()
            .ok_or_else(|| "GOOGLE_CLIENT_ID not configured".to_string())?;
        let client_secret = Config::google_client_secret()
            .ok_or_else(|| "GOOGLE_CLIENT_SECRET not configured".to_string())?;

        let body = json!({
            "code": code,
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": redirect_uri,
            "grant_type": "authorization_code",
        });

        let res = Self::client()
            .post(GOOGLE_TOKEN_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Google token request failed: {}", e))?;

        if !res.status().is_success() {
            return Err(res.text().await.unwrap_or_else(|_| "Google token error".to_string()));
        }

        let token: TokenResponse = res
            .json()
            .await
            .map_err(|e| format!("Google token response malformed: {}", e))?;

        let user: GoogleUser = Self::client()
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| format!("Google userinfo request failed: {}", e))?
            .json()
            .await
            .map_err(|e| format!("Google userinfo malformed: {}", e))?;

        let email = user.email.ok_or_else(|| "Google account has no email".to_string())?;

        Ok(OAuthProfile {
            email,
            name: user.name,
            picture: user.picture,
        })
    }

    pub async fn github_exchange(code: &str, redirect_uri: &str) -> Result<OAuthProfile, String> {
        let client_id = Config::github_client_id()
            .ok_or_else(|| "GITHUB_CLIENT_ID not configured".to_string())?;
        let client_secret = Config::github_client_secret()
            .ok_or_else(|| "GITHUB_CLIENT_SECRET not configured".to_string())?;

        let body = json!({
            "code": code,
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": redirect_uri,
        });

        let res = Self::client()
            .post(GITHUB_TOKEN_URL)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("GitHub token request failed: {}", e))?;

        if !res.status().is_success() {
            return Err(res.text().await.unwrap_or_else(|_| "GitHub token error".to_string()));
        }

        let token: TokenResponse = res
            .json()
            .await
            .map_err(|e| format!("GitHub token response malformed: {}", e))?;

        let user: GithubUser = Self::client()
            .get(GITHUB_USER_URL)
            .header("User-Agent", "homehands-server")
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| format!("GitHub user request failed: {}", e))?
            .json()
            .await
            .map_err(|e| format!("GitHub user malformed: {}", e))?;

        // GitHub hides the email unless it is public on the profile.
        let email = user.email.ok_or_else(|| "GitHub account has no public email".to_string())?;

        Ok(OAuthProfile {
            email,
            name: user.name.or(Some(user.login)),
            picture: user.avatar_url,
        })
    }
}
