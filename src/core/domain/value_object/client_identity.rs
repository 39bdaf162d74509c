use crate::core::domain::error::{SchedulerError, SchedulerResult, ValidationError};
use std::fmt;
use std::path::Path;

const PEM_MARKER: &[u8] = b"-----BEGIN ";

/// A client certificate and its private key, both PEM encoded.
///
/// This is the only credential the scheduler accepts: every request is
/// authenticated with mutual TLS. Converting a PKCS#12 bundle into PEM is
/// left to the caller.
#[derive(Clone)]
pub struct ClientIdentity {
    certificate_pem: Vec<u8>,
    key_pem: Vec<u8>,
}

impl ClientIdentity {
    /// Builds an identity from PEM bytes.
    ///
    /// # Errors
    /// Returns `ValidationError` if either input does not look like PEM.
    pub fn from_pem(
        certificate_pem: impl Into<Vec<u8>>,
        key_pem: impl Into<Vec<u8>>,
    ) -> Result<Self, ValidationError> {
        let certificate_pem = certificate_pem.into();
        let key_pem = key_pem.into();
        validate_pem("certificate", &certificate_pem)?;
        validate_pem("private key", &key_pem)?;
        Ok(Self {
            certificate_pem,
            key_pem,
        })
    }

    /// Reads the certificate and key from PEM files.
    ///
    /// # Errors
    /// Returns `SchedulerError::Authentication` if a file cannot be read,
    /// or a validation error if its content is not PEM.
    pub async fn from_files(
        certificate_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> SchedulerResult<Self> {
        let certificate_pem = read_pem_file(certificate_path.as_ref()).await?;
        let key_pem = read_pem_file(key_path.as_ref()).await?;
        Ok(Self::from_pem(certificate_pem, key_pem)?)
    }

    /// Returns the certificate PEM bytes.
    #[must_use]
    pub fn certificate_pem(&self) -> &[u8] {
        &self.certificate_pem
    }

    /// Converts into the identity type understood by the HTTP client.
    ///
    /// # Errors
    /// Returns `SchedulerError::Authentication` if the TLS backend rejects
    /// the key material.
    pub(crate) fn to_reqwest_identity(&self) -> SchedulerResult<reqwest::Identity> {
        let mut bundle = Vec::with_capacity(self.key_pem.len() + self.certificate_pem.len() + 1);
        bundle.extend_from_slice(&self.key_pem);
        if !bundle.ends_with(b"\n") {
            bundle.push(b'\n');
        }
        bundle.extend_from_slice(&self.certificate_pem);
        reqwest::Identity::from_pem(&bundle).map_err(|e| {
            SchedulerError::Authentication(format!("Invalid client certificate or key: {}", e))
        })
    }
}

// Never print key material.
impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("certificate_pem", &format!("{} bytes", self.certificate_pem.len()))
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

async fn read_pem_file(path: &Path) -> SchedulerResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        SchedulerError::Authentication(format!("Cannot read {}: {}", path.display(), e))
    })
}

/// Checks that the bytes contain a PEM block.
pub(crate) fn validate_pem(field: &str, pem: &[u8]) -> Result<(), ValidationError> {
    if pem.is_empty() {
        return Err(ValidationError::Field {
            field: field.to_string(),
            message: "PEM data cannot be empty".to_string(),
        });
    }
    if !pem.windows(PEM_MARKER.len()).any(|w| w == PEM_MARKER) {
        return Err(ValidationError::Format(format!(
            "{} is not PEM encoded",
            field
        )));
    }
    Ok(())
}
