//! Domain model for the authenticated user, from the `/v1/backend/auth` endpoint.

use serde::{Deserialize, Serialize};

/// Who the client certificate belongs to, as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthIdentity {
    /// SSL fingerprint of the presented certificate.
    pub fingerprint: String,
    /// Whether the scheduler trusts the certificate.
    pub verified: bool,
    /// The user account bound to the certificate.
    pub user: AuthUser,
}

/// The user account part of an [`AuthIdentity`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthUser {
    /// User id, used in every per-user endpoint.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Identifier of the certificate subject.
    #[serde(default)]
    pub ssl_id: Option<String>,
    /// Remaining cellular data quota in bytes.
    #[serde(default)]
    pub quota_data: u64,
    /// Remaining storage quota in bytes.
    #[serde(default)]
    pub quota_storage: u64,
    /// Remaining node time quota in seconds.
    #[serde(default)]
    pub quota_time: u64,
    /// Account role (e.g. "user", "admin").
    #[serde(default)]
    pub role: Option<String>,
}

impl AuthIdentity {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.user.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.user.name
    }
}

impl std::fmt::Display for AuthIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Authentication ID: {}, Name: {}, Storage Quota remaining: {}",
            self.user.id, self.user.name, self.user.quota_storage
        )
    }
}
