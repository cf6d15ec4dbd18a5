//! SCIM 2.0 HTTP client (reqwest-based).

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::auth::ScimCredentials;
use super::models::{escape_filter_value, ScimGroup, ScimListResponse, ScimPatchRequest, ScimUser};
use crate::error::{DirectoryError, DirectoryResult};

const SCIM_CONTENT_TYPE: &str = "application/scim+json";

/// Thin SCIM client: one method per endpoint rolesync touches.
#[derive(Debug, Clone)]
pub struct ScimClient {
    base_url: String,
    credentials: ScimCredentials,
    http_client: Client,
}

impl ScimClient {
    /// Create a client around a pre-built `reqwest::Client`.
    #[must_use]
    pub fn new(base_url: &str, credentials: ScimCredentials, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            http_client,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Users ─────────────────────────────────────────────────────────

    /// Find a user by `userName` (GET /Users?filter=...).
    pub async fn find_user(&self, user_name: &str) -> DirectoryResult<Option<ScimUser>> {
        let filter = format!("userName eq \"{}\"", escape_filter_value(user_name));
        let url = format!("{}/Users", self.base_url);
        let list: ScimListResponse<ScimUser> = self.list(&url, &filter).await?;
        Ok(list.resources.into_iter().next())
    }

    /// Create a user (POST /Users).
    pub async fn create_user(&self, user: &ScimUser) -> DirectoryResult<ScimUser> {
        let url = format!("{}/Users", self.base_url);
        debug!("SCIM POST {}", url);
        let builder = self.authorize(self.http_client.post(&url));
        let response = builder
            .header("Content-Type", SCIM_CONTENT_TYPE)
            .json(user)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Delete a user (DELETE /Users/:id).
    pub async fn delete_user(&self, id: &str) -> DirectoryResult<()> {
        let url = format!("{}/Users/{}", self.base_url, id);
        debug!("SCIM DELETE {}", url);
        let response = self.authorize(self.http_client.delete(&url)).send().await?;
        Self::handle_empty_response(response).await
    }

    // ── Groups ────────────────────────────────────────────────────────

    /// Find a group by `displayName` (GET /Groups?filter=...).
    pub async fn find_group(&self, display_name: &str) -> DirectoryResult<Option<ScimGroup>> {
        let filter = format!("displayName eq \"{}\"", escape_filter_value(display_name));
        let url = format!("{}/Groups", self.base_url);
        let list: ScimListResponse<ScimGroup> = self.list(&url, &filter).await?;
        Ok(list.resources.into_iter().next())
    }

    /// Get a group with its members (GET /Groups/:id).
    pub async fn get_group(&self, id: &str) -> DirectoryResult<ScimGroup> {
        let url = format!("{}/Groups/{}", self.base_url, id);
        debug!("SCIM GET {}", url);
        let response = self.authorize(self.http_client.get(&url)).send().await?;
        Self::handle_response(response).await
    }

    /// Patch a group (PATCH /Groups/:id). Targets may answer 200 or 204.
    pub async fn patch_group(&self, id: &str, patch: &ScimPatchRequest) -> DirectoryResult<()> {
        let url = format!("{}/Groups/{}", self.base_url, id);
        self.send_patch(&url, patch).await
    }

    // ── Internal HTTP ─────────────────────────────────────────────────

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(self.credentials.token())
    }

    async fn list<T: DeserializeOwned>(
        &self,
        url: &str,
        filter: &str,
    ) -> DirectoryResult<ScimListResponse<T>> {
        debug!("SCIM GET {} (filter={:?})", url, filter);
        let builder = self
            .http_client
            .get(url)
            .query(&[("filter", filter), ("count", "1")]);
        let response = self.authorize(builder).send().await?;
        Self::handle_response(response).await
    }

    async fn send_patch<B: Serialize>(&self, url: &str, body: &B) -> DirectoryResult<()> {
        debug!("SCIM PATCH {}", url);
        let builder = self.authorize(self.http_client.patch(url));
        let response = builder
            .header("Content-Type", SCIM_CONTENT_TYPE)
            .json(body)
            .send()
            .await?;
        Self::handle_empty_response(response).await
    }

    // ── Response handling ─────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> DirectoryResult<T> {
        if response.status().is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                DirectoryError::invalid_response(format!("Failed to parse response: {e}"))
            })
        } else {
            Self::handle_error_response(response).await
        }
    }

    async fn handle_empty_response(response: reqwest::Response) -> DirectoryResult<()> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT || status.is_success() {
            Ok(())
        } else {
            Self::handle_error_response(response).await
        }
    }

    async fn handle_error_response<T>(response: reqwest::Response) -> DirectoryResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(DirectoryError::Unauthorized {
                    message: format!("HTTP {}: {body}", status.as_u16()),
                })
            }
            _ => {
                let detail = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                Err(DirectoryError::Http {
                    status: status.as_u16(),
                    detail,
                })
            }
        }
    }
}
