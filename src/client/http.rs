//! reqwest-backed gateway client.
//!
//! No timeout and no retry: a call either resolves or stays pending, and every
//! failure is reported once to the caller.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::error_detail;
use super::{ApiError, GatewayApi};
use crate::config::ApiConfig;
use crate::models::{AuditRecord, CommandRequest, Credential, ExecutionResult, Identity, RuleDraft};

const IDENTITY_PATH: &str = "/users/me";
const EXECUTE_PATH: &str = "/commands/execute";
const RULES_PATH: &str = "/rules";
const AUDIT_PATH: &str = "/audit-logs";

#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    credential_header: String,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential_header: config.credential_header.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, credential: &Credential) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(self.credential_header.as_str(), credential.expose())
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Transport(format!("{path}: {err}")))?;

        let status = response.status();
        debug!("{} -> {}", path, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::Transport(format!("{path}: {err}")))?;

        serde_json::from_slice(&body).map_err(|err| {
            ApiError::InvalidResponse(format!("failed to parse response from '{path}': {err}"))
        })
    }
}

#[async_trait]
impl GatewayApi for HttpGateway {
    async fn fetch_identity(&self, credential: &Credential) -> Result<Identity, ApiError> {
        let request = self.request(Method::GET, IDENTITY_PATH, credential);
        let response = self.send(request, IDENTITY_PATH).await?;
        Self::decode(response, IDENTITY_PATH).await
    }

    async fn execute_command(
        &self,
        credential: &Credential,
        command: &str,
    ) -> Result<ExecutionResult, ApiError> {
        let body = CommandRequest {
            command: command.to_string(),
        };
        let request = self
            .request(Method::POST, EXECUTE_PATH, credential)
            .json(&body);
        let response = self.send(request, EXECUTE_PATH).await?;
        Self::decode(response, EXECUTE_PATH).await
    }

    async fn create_rule(&self, credential: &Credential, draft: &RuleDraft) -> Result<(), ApiError> {
        let request = self.request(Method::POST, RULES_PATH, credential).json(draft);
        self.send(request, RULES_PATH).await?;
        Ok(())
    }

    async fn list_audit_logs(&self, credential: &Credential) -> Result<Vec<AuditRecord>, ApiError> {
        let request = self.request(Method::GET, AUDIT_PATH, credential);
        let response = self.send(request, AUDIT_PATH).await?;
        Self::decode(response, AUDIT_PATH).await
    }
}
