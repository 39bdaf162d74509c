use crate::core::domain::value_object::{ClientIdentity, SchedulerUrl};

/// Where the scheduler lives and how to prove who we are to it.
#[derive(Debug, Clone)]
pub struct SchedulerConnection {
    url: SchedulerUrl,
    identity: Option<ClientIdentity>,
    ca_certificate: Option<Vec<u8>>,
    accept_invalid_certs: bool,
}

impl SchedulerConnection {
    pub fn new(
        url: SchedulerUrl,
        identity: Option<ClientIdentity>,
        ca_certificate: Option<Vec<u8>>,
        accept_invalid_certs: bool,
    ) -> Self {
        Self {
            url,
            identity,
            ca_certificate,
            accept_invalid_certs,
        }
    }

    pub fn url(&self) -> &SchedulerUrl {
        &self.url
    }

    /// The client certificate presented on every request.
    pub fn identity(&self) -> Option<&ClientIdentity> {
        self.identity.as_ref()
    }

    /// An extra PEM root to trust, for schedulers signed by a private CA.
    pub fn ca_certificate(&self) -> Option<&[u8]> {
        self.ca_certificate.as_deref()
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}
