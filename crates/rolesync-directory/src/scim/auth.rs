//! SCIM target credentials.

/// Bearer token for a SCIM target.
///
/// The [`Debug`] impl redacts the token to keep it out of log output.
#[derive(Clone)]
pub struct ScimCredentials {
    token: String,
}

impl ScimCredentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for ScimCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bearer")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
