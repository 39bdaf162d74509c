use crate::{
    AuthIdentity, SchedulerError, SchedulerResult,
    core::infrastructure::transport::{Transport, get_as},
};
use tracing::debug;

/// Identity endpoint of the scheduler.
pub const AUTH_ENDPOINT: &str = "/v1/backend/auth";

/// Resolves which user the client certificate belongs to.
pub struct AuthService;

impl AuthService {
    pub fn new() -> Self {
        Self
    }

    /// Calls the identity endpoint.
    ///
    /// # Errors
    /// Every failure (unreachable scheduler, TLS rejection, non-2xx status,
    /// unexpected body) is reported as `SchedulerError::Authentication`
    /// with the underlying message.
    pub async fn execute(&self, transport: &dyn Transport) -> SchedulerResult<AuthIdentity> {
        let identity: AuthIdentity = get_as(transport, AUTH_ENDPOINT)
            .await
            .map_err(Self::into_authentication_error)?;
        debug!(user_id = identity.id(), verified = identity.verified, "authenticated");
        Ok(identity)
    }

    fn into_authentication_error(error: SchedulerError) -> SchedulerError {
        match error {
            SchedulerError::Authentication(message) => SchedulerError::Authentication(message),
            SchedulerError::Api {
                status, message, ..
            } => {
                SchedulerError::Authentication(format!("{} (HTTP {})", message, status))
            }
            other => SchedulerError::Authentication(other.to_string()),
        }
    }
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new()
    }
}
