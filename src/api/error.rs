use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a gateway call.
///
/// Authentication problems get their own subtree so that callers can tell a
/// dead session apart from an upstream having a bad day: the former needs a
/// fresh passwordless login, the latter is retried on the next poll.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Connection-level failure: DNS, TLS, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("`{path}` failed with HTTP {status}")]
    Status { path: &'static str, status: StatusCode },

    #[error("malformed response from `{path}`: {reason}")]
    Malformed { path: &'static str, reason: String },
}

/// The current session is unusable and no amount of retrying will fix it.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The access token or the prospect identifier is missing, so the call
    /// is refused before any network traffic.
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("passcode request rejected with HTTP {0}")]
    ChallengeRejected(StatusCode),

    #[error("no exchange token in the challenge response")]
    MissingExchangeToken,

    #[error("passcode rejected with HTTP {0}")]
    CodeRejected(StatusCode),

    #[error("missing access token or prospect id in the verification response")]
    IncompleteVerification,

    #[error("authentication expired")]
    Expired,
}
