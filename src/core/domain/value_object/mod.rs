mod client_identity;
mod country_code;
mod scheduler_url;
pub(crate) mod serde_helpers;
mod ssh_public_key;

pub use client_identity::ClientIdentity;
pub use country_code::CountryCode;
pub use scheduler_url::{DEFAULT_SCHEDULER_URL, SchedulerUrl};
pub use ssh_public_key::SshPublicKey;
