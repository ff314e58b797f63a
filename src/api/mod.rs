//! Backend API Adapters
//!
//! `DataSource` implementations over Strapi's GraphQL and REST APIs.
//! Transport and decode failures are turned into `SourceError` here and
//! never reach the list view.

mod auth;
mod graphql;
mod rest;

pub use auth::login;
pub use graphql::{GraphqlEmployees, GraphqlTodos};
pub use rest::RestTodos;

use list_view::{Session, SourceError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        field: Option<String>,
        message: String,
    },
    #[error("GraphQL error: {message}")]
    Graphql { code: Option<String>, message: String },
    #[error("response had no data")]
    Empty,
}

impl From<ApiError> for SourceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status: 401 | 403, .. } => SourceError::Auth,
            ApiError::Status { status: 404, message, .. } => SourceError::NotFound(message),
            ApiError::Status { status: 400, field, message } => SourceError::Validation { field, message },
            ApiError::Graphql { code: Some(code), message } => match code.as_str() {
                "UNAUTHENTICATED" | "FORBIDDEN" => SourceError::Auth,
                "NOT_FOUND" => SourceError::NotFound(message),
                "BAD_USER_INPUT" => SourceError::Validation { field: None, message },
                _ => SourceError::Transport(message),
            },
            other => SourceError::Transport(other.to_string()),
        }
    }
}

// ========================
// Strapi Error Bodies
// ========================

#[derive(Debug, Default, Deserialize)]
struct StrapiErrorBody {
    #[serde(default)]
    error: Option<StrapiError>,
}

#[derive(Debug, Deserialize)]
struct StrapiError {
    message: String,
    #[serde(default)]
    details: Option<StrapiErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct StrapiErrorDetails {
    #[serde(default)]
    errors: Vec<StrapiFieldError>,
}

#[derive(Debug, Deserialize)]
struct StrapiFieldError {
    #[serde(default)]
    path: Vec<String>,
    message: String,
}

/// Build an `ApiError` from a non-success status and its body
fn status_error(status: u16, body: &str) -> ApiError {
    let parsed: StrapiErrorBody = serde_json::from_str(body).unwrap_or_default();
    match parsed.error {
        Some(error) => {
            let first_field = error
                .details
                .and_then(|d| d.errors.into_iter().next())
                .map(|e| (e.path.last().cloned(), e.message));
            match first_field {
                Some((field, message)) => ApiError::Status { status, field, message },
                None => ApiError::Status { status, field: None, message: error.message },
            }
        }
        None => ApiError::Status { status, field: None, message: format!("status {}", status) },
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
    #[serde(default)]
    extensions: Option<Value>,
}

/// Unwrap a GraphQL response; the first error wins
fn graphql_data<T>(envelope: GraphqlEnvelope<T>) -> Result<T, ApiError> {
    if let Some(first) = envelope.errors.into_iter().next() {
        let code = first
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(ApiError::Graphql { code, message: first.message });
    }
    envelope.data.ok_or(ApiError::Empty)
}

// ========================
// HTTP Client
// ========================

/// Authenticated HTTP client shared by the adapters.
///
/// The session is fixed at construction; a new login builds a new client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: AppConfig,
    session: Session,
}

impl ApiClient {
    pub fn new(config: AppConfig, session: Session) -> Self {
        Self { http: reqwest::Client::new(), config, session }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// POST a GraphQL operation and decode its `data`
    pub async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, ApiError> {
        let body = serde_json::json!({ "query": query, "variables": variables });
        let response = self
            .http
            .post(self.config.graphql_url())
            .header(reqwest::header::AUTHORIZATION, self.session.bearer())
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }
        graphql_data(serde_json::from_str(&text)?)
    }

    /// Send a REST request to `/api/<path>`; `None` for empty bodies
    pub async fn rest<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<T>, ApiError> {
        let mut request = self
            .http
            .request(method, self.config.rest_url(path))
            .header(reqwest::header::AUTHORIZATION, self.session.bearer());
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses_map_to_auth() {
        assert_eq!(SourceError::from(status_error(401, "")), SourceError::Auth);
        assert_eq!(SourceError::from(status_error(403, "{}")), SourceError::Auth);
    }

    #[test]
    fn test_strapi_validation_body_names_field() {
        let body = r#"{"error":{"status":400,"name":"ValidationError","message":"1 error occurred",
            "details":{"errors":[{"path":["data","todo"],"message":"todo must be defined"}]}}}"#;
        assert_eq!(
            SourceError::from(status_error(400, body)),
            SourceError::Validation { field: Some("todo".into()), message: "todo must be defined".into() }
        );
    }

    #[test]
    fn test_not_found_and_server_errors() {
        let body = r#"{"error":{"status":404,"message":"Not Found"}}"#;
        assert_eq!(SourceError::from(status_error(404, body)), SourceError::NotFound("Not Found".into()));
        assert!(matches!(SourceError::from(status_error(502, "bad gateway")), SourceError::Transport(_)));
    }

    #[test]
    fn test_graphql_errors_use_extension_code() {
        let envelope: GraphqlEnvelope<Value> = serde_json::from_str(
            r#"{"data":null,"errors":[{"message":"Forbidden access","extensions":{"code":"FORBIDDEN"}}]}"#,
        )
        .unwrap();
        let err = graphql_data(envelope).unwrap_err();
        assert_eq!(SourceError::from(err), SourceError::Auth);
    }

    #[test]
    fn test_graphql_without_data_is_empty() {
        let envelope: GraphqlEnvelope<Value> = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(matches!(graphql_data(envelope), Err(ApiError::Empty)));
    }
}
