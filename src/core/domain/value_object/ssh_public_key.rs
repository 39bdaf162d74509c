use crate::core::domain::error::ValidationError;
use std::fmt;

const KEY_PREFIXES: [&str; 4] = ["ssh-", "ecdsa-", "sk-ssh-", "sk-ecdsa-"];

/// An OpenSSH public key, installed in the experiment container for tunnel access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshPublicKey(String);

impl SshPublicKey {
    /// Validates a public key. Surrounding whitespace (e.g. the trailing
    /// newline of a `.pub` file) is removed.
    pub fn new(key: impl AsRef<str>) -> Result<Self, ValidationError> {
        let key = key.as_ref().trim();
        validate_ssh_public_key(key)?;
        Ok(Self(key.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SshPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a trimmed OpenSSH public key line.
pub(crate) fn validate_ssh_public_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::Field {
            field: "ssh_public_key".to_string(),
            message: "SSH public key cannot be empty".to_string(),
        });
    }
    if key.contains('\n') {
        return Err(ValidationError::Format(
            "SSH public key must be a single line".to_string(),
        ));
    }
    if !KEY_PREFIXES.iter().any(|prefix| key.starts_with(prefix)) {
        return Err(ValidationError::Format(
            "SSH public key must be in OpenSSH format (e.g. 'ssh-rsa AAAA...')".to_string(),
        ));
    }
    if key.split_whitespace().count() < 2 {
        return Err(ValidationError::Format(
            "SSH public key is missing its key body".to_string(),
        ));
    }
    Ok(())
}
