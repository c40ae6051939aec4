use crate::auth::{auth_header, AuthProfile};
use ppc_core::model::{NodesSnapshot, StatusSnapshot};
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub const STATUS_PATH: &str = "/api/status";
pub const NODES_PATH: &str = "/api/nodes";

/// The read path distinguishes exactly two failures: a 401, and everything
/// else. Callers branch on unauthorized vs anything-else and nothing finer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("request failed (http status {status:?})")]
    RequestFailed { status: Option<u16> },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

pub(crate) fn classify_status(status: StatusCode) -> Result<(), ApiError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        return Err(ApiError::RequestFailed {
            status: Some(status.as_u16()),
        });
    }
    Ok(())
}

/// Authenticated read-only client for the admin API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_typed<T: DeserializeOwned>(
        &self,
        path: &str,
        profile: &AuthProfile,
    ) -> Result<T, ApiError> {
        let mut request = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(CACHE_CONTROL, "no-store");
        if let Some(header) = auth_header(profile) {
            request = request.header(AUTHORIZATION, header);
        }

        let response = request.send().await.map_err(|err| {
            warn!("api_request_error: {path}: {err}");
            ApiError::RequestFailed {
                status: err.status().map(|status| status.as_u16()),
            }
        })?;
        classify_status(response.status())?;

        response.json().await.map_err(|err| {
            warn!("api_decode_error: {path}: {err}");
            ApiError::RequestFailed { status: None }
        })
    }

    pub async fn get_json(&self, path: &str, profile: &AuthProfile) -> Result<Value, ApiError> {
        self.get_typed(path, profile).await
    }

    pub async fn fetch_status(&self, profile: &AuthProfile) -> Result<StatusSnapshot, ApiError> {
        self.get_typed(STATUS_PATH, profile).await
    }

    pub async fn fetch_nodes(&self, profile: &AuthProfile) -> Result<NodesSnapshot, ApiError> {
        self.get_typed(NODES_PATH, profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_two_way_only() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            Err(ApiError::Unauthorized)
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            Err(ApiError::RequestFailed { status: Some(403) })
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(ApiError::RequestFailed { status: Some(500) })
        );
        assert_eq!(classify_status(StatusCode::OK), Ok(()));
    }

    #[test]
    fn unauthorized_branch_helper() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::RequestFailed { status: None }.is_unauthorized());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://127.0.0.1:17287/");
        assert_eq!(client.base_url(), "http://127.0.0.1:17287");
    }

    #[tokio::test]
    async fn network_failure_maps_to_request_failed_without_status() {
        // nothing listens on this port
        let client = ApiClient::new("http://127.0.0.1:1");
        let err = client
            .fetch_status(&AuthProfile::default())
            .await
            .expect_err("expected failure");
        assert_eq!(err, ApiError::RequestFailed { status: None });
    }
}
