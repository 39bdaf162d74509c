use crate::core::domain::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Countries hosting MONROE nodes, by name.
const KNOWN_COUNTRIES: [(&str, &str); 4] = [
    ("norway", "no"),
    ("sweden", "se"),
    ("italy", "it"),
    ("spain", "es"),
];

/// A lowercase ISO 3166-1 alpha-2 country code used in node filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Validates a two letter code. Upper case input is accepted and lowered.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim().to_ascii_lowercase();
        validate_country_code(&code)?;
        Ok(Self(code))
    }

    /// Resolves one of the testbed's country names ("Norway", "Sweden", ...).
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        let lowered = name.trim().to_ascii_lowercase();
        KNOWN_COUNTRIES
            .iter()
            .find(|(country, _)| *country == lowered)
            .map(|(_, code)| Self((*code).to_string()))
            .ok_or_else(|| {
                ValidationError::ConstraintViolation(format!(
                    "Unknown country '{}'. Known countries: Norway, Sweden, Italy, Spain",
                    name
                ))
            })
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// Validates a lowercase country code.
pub(crate) fn validate_country_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::Field {
            field: "country".to_string(),
            message: "Country code cannot be empty".to_string(),
        });
    }
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::Format(format!(
            "Country code '{}' must be two ASCII letters",
            code
        )));
    }
    Ok(())
}
