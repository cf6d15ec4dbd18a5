//! SCIM 2.0 identity directory.
//!
//! Users are addressed by `userName` and groups by `displayName`; both are
//! resolved to resource ids with filtered list requests before mutating.
//! Membership changes go through PATCH on the group, and are only sent when
//! the current member list says they are needed.

mod auth;
mod client;
pub mod models;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

pub use auth::ScimCredentials;
pub use client::ScimClient;

use crate::error::{DirectoryError, DirectoryResult};
use crate::outcome::MutationOutcome;
use crate::traits::{DirectoryUser, IdentityDirectory};
use models::{ScimGroup, ScimPatchRequest, ScimUser};

/// Connection settings for a SCIM target.
#[derive(Debug, Clone)]
pub struct ScimConfig {
    /// Base URL, e.g. `https://idp.example.com/scim/v2`.
    pub base_url: String,
    pub credentials: ScimCredentials,
    pub timeout: Duration,
}

/// [`IdentityDirectory`] backed by a SCIM 2.0 service.
#[derive(Debug, Clone)]
pub struct ScimDirectory {
    client: ScimClient,
}

impl ScimDirectory {
    /// Build a directory with its own HTTP client.
    pub fn new(config: &ScimConfig) -> DirectoryResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(DirectoryError::InvalidConfiguration {
                message: "SCIM base URL is empty".to_string(),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("rolesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DirectoryError::InvalidConfiguration {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self::with_client(ScimClient::new(
            &config.base_url,
            config.credentials.clone(),
            http_client,
        )))
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: ScimClient) -> Self {
        Self { client }
    }

    async fn resolve_user(&self, username: &str) -> DirectoryResult<Option<String>> {
        match self.client.find_user(username).await? {
            Some(user) => user.id.map(Some).ok_or_else(|| {
                DirectoryError::invalid_response(format!("user {username} has no id"))
            }),
            None => Ok(None),
        }
    }

    /// Resolve a group by display name and fetch its current members.
    async fn resolve_group(&self, group: &str) -> DirectoryResult<ScimGroup> {
        let found = self
            .client
            .find_group(group)
            .await?
            .ok_or_else(|| DirectoryError::GroupNotFound {
                group: group.to_string(),
            })?;
        self.client.get_group(&found.id).await
    }
}

#[async_trait]
impl IdentityDirectory for ScimDirectory {
    fn display_name(&self) -> &str {
        self.client.base_url()
    }

    async fn get_user(&self, username: &str) -> DirectoryResult<Option<DirectoryUser>> {
        let Some(user) = self.client.find_user(username).await? else {
            return Ok(None);
        };
        let id = user.id.ok_or_else(|| {
            DirectoryError::invalid_response(format!("user {username} has no id"))
        })?;
        Ok(Some(DirectoryUser {
            username: user.user_name,
            id,
        }))
    }

    async fn create_user(&self, username: &str) -> DirectoryResult<MutationOutcome> {
        match self.client.create_user(&ScimUser::new(username)).await {
            Ok(created) => {
                debug!(username, id = ?created.id, "SCIM user created");
                Ok(MutationOutcome::Applied)
            }
            Err(DirectoryError::Http { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                Ok(MutationOutcome::AlreadySatisfied)
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_user(&self, username: &str) -> DirectoryResult<MutationOutcome> {
        let Some(id) = self.resolve_user(username).await? else {
            return Ok(MutationOutcome::AlreadySatisfied);
        };

        match self.client.delete_user(&id).await {
            Ok(()) => Ok(MutationOutcome::Applied),
            Err(DirectoryError::Http { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(MutationOutcome::AlreadySatisfied)
            }
            Err(e) => Err(e),
        }
    }

    async fn add_user_to_group(
        &self,
        group: &str,
        username: &str,
    ) -> DirectoryResult<MutationOutcome> {
        let user_id = self
            .resolve_user(username)
            .await?
            .ok_or_else(|| DirectoryError::UserNotFound {
                username: username.to_string(),
            })?;
        let scim_group = self.resolve_group(group).await?;

        if scim_group.has_member(&user_id) {
            return Ok(MutationOutcome::AlreadySatisfied);
        }

        self.client
            .patch_group(&scim_group.id, &ScimPatchRequest::add_member(&user_id))
            .await?;
        Ok(MutationOutcome::Applied)
    }

    async fn remove_user_from_group(
        &self,
        group: &str,
        username: &str,
    ) -> DirectoryResult<MutationOutcome> {
        let Some(user_id) = self.resolve_user(username).await? else {
            return Ok(MutationOutcome::AlreadySatisfied);
        };
        let scim_group = self.resolve_group(group).await?;

        if !scim_group.has_member(&user_id) {
            return Ok(MutationOutcome::AlreadySatisfied);
        }

        self.client
            .patch_group(&scim_group.id, &ScimPatchRequest::remove_member(&user_id))
            .await?;
        Ok(MutationOutcome::Applied)
    }
}
