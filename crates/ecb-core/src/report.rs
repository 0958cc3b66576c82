//! Run outcomes and the reporter port.
//!
//! The core never renders text for humans; a `RunReport` is structured data
//! handed to whatever notification collaborator the caller wires in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AccountId, GameName},
    utils::iso_timestamp_utc,
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    AlreadyClaimed,
    TokenInvalid,
    TransientError,
    FatalError,
}

impl Outcome {
    /// Success-equivalent outcomes reset the account failure counter.
    pub fn is_success_like(self) -> bool {
        matches!(self, Outcome::Success | Outcome::AlreadyClaimed)
    }
}

/// One immutable outcome per account per run attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckinResult {
    pub account_id: AccountId,
    pub account_label: String,
    /// RFC3339 UTC.
    pub timestamp: String,
    pub outcome: Outcome,
    /// Opaque reward payload, present only on `Success`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,
    pub detail: String,
}

impl CheckinResult {
    pub fn new(
        account_id: AccountId,
        account_label: impl Into<String>,
        outcome: Outcome,
        reward: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            account_label: account_label.into(),
            timestamp: iso_timestamp_utc(),
            outcome,
            reward,
            detail: detail.into(),
        }
    }
}

/// Ordered per-account outcomes for one run (order = account load order).
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub game: GameName,
    pub started_at: String,
    pub finished_at: String,
    pub results: Vec<CheckinResult>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.count(Outcome::Success)
    }

    pub fn already_claimed(&self) -> usize {
        self.count(Outcome::AlreadyClaimed)
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.outcome.is_success_like())
            .count()
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Port for the external notification collaborator.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn publish(&self, report: &RunReport) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: Outcome) -> CheckinResult {
        CheckinResult::new(AccountId(1), "doctor", outcome, None, "")
    }

    #[test]
    fn report_counters() {
        let report = RunReport {
            game: GameName::new("endfield"),
            started_at: iso_timestamp_utc(),
            finished_at: iso_timestamp_utc(),
            results: vec![
                result(Outcome::Success),
                result(Outcome::AlreadyClaimed),
                result(Outcome::TokenInvalid),
                result(Outcome::TransientError),
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.already_claimed(), 1);
        assert_eq!(report.failed(), 2);
    }

    #[test]
    fn reward_is_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&result(Outcome::AlreadyClaimed)).unwrap();
        assert!(!json.contains("reward"));
    }
}
