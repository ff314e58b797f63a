//! Login
//!
//! Strapi local auth: `POST /api/auth/local` with identifier + password.

use list_view::{Session, SessionToken};
use serde::Deserialize;
use serde_json::json;

use super::{status_error, ApiError};
use crate::config::AppConfig;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    jwt: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

fn session_from(response: AuthResponse) -> Result<Session, ApiError> {
    let token = SessionToken::new(response.jwt).ok_or(ApiError::Empty)?;
    let user_name = response.user.username.or(response.user.email);
    Ok(Session { token, user_name })
}

/// Exchange credentials for a session
pub async fn login(config: &AppConfig, identifier: &str, password: &str) -> Result<Session, ApiError> {
    let response = reqwest::Client::new()
        .post(config.rest_url("auth/local"))
        .json(&json!({ "identifier": identifier, "password": password }))
        .send()
        .await?;
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(status_error(status.as_u16(), &text));
    }
    session_from(serde_json::from_str(&text)?)
}
