//! Attendance port.
//!
//! One shared, stateless client instance serves every account; all mutable
//! per-account state lives in the credential store. Adapters map their
//! transport/deserialization failures into the closed `ClientError` taxonomy
//! at the boundary so the orchestrator never inspects raw responses.

use async_trait::async_trait;

use crate::games::Game;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttendanceStatus {
    NotClaimedToday,
    AlreadyClaimedToday,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The day's attendance was claimed just now.
    Claimed { reward: Option<String> },
    /// The service reports the day already claimed: a race with another
    /// run. Success-equivalent, not an error.
    AlreadyClaimed,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The service rejected the token (401/403-equivalent, or an expired
    /// token code in the body). Never retried.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Transport failure (connect, timeout, TLS). Retryable.
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected response status or shape. Retryable.
    #[error("api error: {0}")]
    Api(String),
}

#[async_trait]
pub trait AttendanceClient: Send + Sync {
    /// Query whether today's attendance has been claimed.
    async fn check_status(
        &self,
        game: &Game,
        session_token: &str,
    ) -> Result<AttendanceStatus, ClientError>;

    /// Claim today's attendance.
    async fn claim(&self, game: &Game, session_token: &str) -> Result<ClaimOutcome, ClientError>;
}
