use crate::api::error::AuthError;

/// The two durable credential artifacts.
///
/// Owned by exactly one client instance; only a successful challenge
/// verification ever writes to it. The fetch path reads it sequentially, so
/// no locking is involved.
#[derive(Default)]
pub struct Session {
    access_token: Option<String>,
    prospect_id: Option<String>,
}

impl Session {
    #[must_use]
    pub const fn new(access_token: Option<String>, prospect_id: Option<String>) -> Self {
        Self { access_token, prospect_id }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn prospect_id(&self) -> Option<&str> {
        self.prospect_id.as_deref()
    }

    /// Both credentials, or [`AuthError::NotAuthenticated`] before any
    /// network traffic happens.
    pub fn credentials(&self) -> Result<(&str, &str), AuthError> {
        match (self.access_token.as_deref(), self.prospect_id.as_deref()) {
            (Some(access_token), Some(prospect_id)) => Ok((access_token, prospect_id)),
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    pub(super) fn install(&mut self, access_token: String, prospect_id: String) {
        self.access_token = Some(access_token);
        self.prospect_id = Some(prospect_id);
    }
}

/// Transient exchange token from a passcode request.
///
/// Lives for a single passcode round-trip and is never persisted. Requesting
/// another passcode simply hands the caller a replacement value; the gateway
/// keeps the token valid server-side until it expires, so a rejected code
/// may be retried against the same challenge.
#[derive(Debug)]
pub struct Challenge {
    pub(super) exchange_token: String,
}
