//! SKPort attendance adapter.
//!
//! Implements the core attendance port against the SKPort web API
//! (`zonai.skport.com`). One stateless client serves every account; the only
//! thing it caches is the per-session sign token obtained from
//! `/auth/refresh`, keyed by a digest of the session token and evicted as
//! soon as the service rejects a signed call.

mod models;
mod sign;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::debug;

use ecb_core::{
    attendance::{AttendanceClient, AttendanceStatus, ClaimOutcome, ClientError},
    games::Game,
    Error,
};

use models::{AttendanceData, ClaimData, RefreshData, SkResponse};

const REFRESH_PATH: &str = "/auth/refresh";
const CODE_OK: i64 = 0;
/// Either of these means "today is already claimed" on the claim endpoint.
const CODES_ALREADY_SIGNED: [i64; 2] = [1001, 10001];
const CODE_TOKEN_EXPIRED: i64 = 10002;

pub struct SkportClient {
    http: reqwest::Client,
    /// session-token digest -> sign token.
    sign_tokens: Mutex<HashMap<String, String>>,
}

impl SkportClient {
    pub fn new(http_timeout: Duration) -> ecb_core::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| Error::Config(format!("cannot build http client: {e}")))?;
        Ok(Self {
            http,
            sign_tokens: Mutex::new(HashMap::new()),
        })
    }

    /// Fetch (or reuse) the sign token the service hands out per session.
    async fn ensure_sign_token(
        &self,
        game: &Game,
        session_token: &str,
    ) -> Result<String, ClientError> {
        let key = sign::token_digest(session_token);
        {
            let cache = self.sign_tokens.lock().await;
            if let Some(token) = cache.get(&key) {
                return Ok(token.clone());
            }
        }

        debug!(game = %game.name, "refreshing skport sign token");
        let url = format!("{}{}", game.base_url, REFRESH_PATH);
        let response = self
            .http
            .get(&url)
            .header("cred", session_token)
            .header("platform", sign::PLATFORM)
            .header("vname", sign::VNAME)
            .header("timestamp", sign::unix_timestamp())
            .header("sk-language", "en")
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_body(response).await?;
        let token = parse_refresh_body(&body)?;

        let mut cache = self.sign_tokens.lock().await;
        cache.insert(key, token.clone());
        Ok(token)
    }

    async fn evict_sign_token(&self, session_token: &str) {
        let key = sign::token_digest(session_token);
        self.sign_tokens.lock().await.remove(&key);
    }

    async fn signed_request(
        &self,
        game: &Game,
        session_token: &str,
        path: &str,
        post: bool,
    ) -> Result<String, ClientError> {
        let sign_token = self.ensure_sign_token(game, session_token).await?;
        let timestamp = sign::unix_timestamp();
        let signature = sign::compute_sign(&sign_token, path, "", &timestamp);

        let url = format!("{}{}", game.base_url, path);
        let mut request = if post {
            self.http
                .post(&url)
                .header("Content-Type", "application/json")
        } else {
            self.http.get(&url)
        };
        request = request
            .header("cred", session_token)
            .header("platform", sign::PLATFORM)
            .header("vname", sign::VNAME)
            .header("timestamp", timestamp)
            .header("sk-language", "en")
            .header("sign", signature);

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.evict_sign_token(session_token).await;
            return Err(ClientError::Auth(format!("http {status}")));
        }

        read_body(response).await
    }
}

#[async_trait]
impl AttendanceClient for SkportClient {
    async fn check_status(
        &self,
        game: &Game,
        session_token: &str,
    ) -> Result<AttendanceStatus, ClientError> {
        let body = self
            .signed_request(game, session_token, &game.status_path, false)
            .await?;
        let result = parse_status_body(&body);
        if matches!(result, Err(ClientError::Auth(_))) {
            self.evict_sign_token(session_token).await;
        }
        result
    }

    async fn claim(&self, game: &Game, session_token: &str) -> Result<ClaimOutcome, ClientError> {
        let body = self
            .signed_request(game, session_token, &game.claim_path, true)
            .await?;
        let result = parse_claim_body(&body);
        if matches!(result, Err(ClientError::Auth(_))) {
            self.evict_sign_token(session_token).await;
        }
        result
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Auth(format!("http {status}")));
    }
    if !status.is_success() {
        return Err(ClientError::Api(format!("unexpected http status {status}")));
    }
    response.text().await.map_err(map_transport_error)
}

fn map_transport_error(e: reqwest::Error) -> ClientError {
    if e.is_decode() {
        ClientError::Api(format!("cannot read response body: {e}"))
    } else {
        ClientError::Network(e.to_string())
    }
}

fn parse_refresh_body(body: &str) -> Result<String, ClientError> {
    let resp: SkResponse<RefreshData> = serde_json::from_str(body)
        .map_err(|e| ClientError::Api(format!("malformed refresh response: {e}")))?;

    if resp.code != CODE_OK {
        // A refused refresh means the session token itself is bad.
        return Err(ClientError::Auth(nonempty_message(
            resp.message,
            "sign token refresh refused",
        )));
    }
    match resp.data {
        Some(data) if !data.token.is_empty() => Ok(data.token),
        _ => Err(ClientError::Api("refresh response missing token".into())),
    }
}

fn parse_status_body(body: &str) -> Result<AttendanceStatus, ClientError> {
    let resp: SkResponse<AttendanceData> = serde_json::from_str(body)
        .map_err(|e| ClientError::Api(format!("malformed status response: {e}")))?;

    match resp.code {
        CODE_OK => {
            let data = resp
                .data
                .ok_or_else(|| ClientError::Api("status response missing data".into()))?;
            debug!(total_signed = data.total_signed(), "attendance status fetched");
            if data.has_today {
                Ok(AttendanceStatus::AlreadyClaimedToday)
            } else {
                Ok(AttendanceStatus::NotClaimedToday)
            }
        }
        CODE_TOKEN_EXPIRED => Err(ClientError::Auth(nonempty_message(
            resp.message,
            "token expired",
        ))),
        code => Err(ClientError::Api(format!(
            "status code {code}: {}",
            resp.message
        ))),
    }
}

fn parse_claim_body(body: &str) -> Result<ClaimOutcome, ClientError> {
    let resp: SkResponse<ClaimData> = serde_json::from_str(body)
        .map_err(|e| ClientError::Api(format!("malformed claim response: {e}")))?;

    if resp.code == CODE_OK {
        let reward = resp.data.and_then(|d| d.reward_text());
        return Ok(ClaimOutcome::Claimed { reward });
    }
    if CODES_ALREADY_SIGNED.contains(&resp.code)
        || resp.message.to_lowercase().contains("already")
    {
        return Ok(ClaimOutcome::AlreadyClaimed);
    }
    if resp.code == CODE_TOKEN_EXPIRED {
        return Err(ClientError::Auth(nonempty_message(
            resp.message,
            "token expired",
        )));
    }
    Err(ClientError::Api(format!(
        "claim code {}: {}",
        resp.code, resp.message
    )))
}

fn nonempty_message(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_yields_sign_token() {
        let body = r#"{"code": 0, "message": "OK", "data": {"token": "st-123"}}"#;
        assert_eq!(parse_refresh_body(body).unwrap(), "st-123");
    }

    #[test]
    fn refused_refresh_is_auth() {
        let body = r#"{"code": 401, "message": "invalid cred"}"#;
        assert!(matches!(
            parse_refresh_body(body),
            Err(ClientError::Auth(msg)) if msg == "invalid cred"
        ));
    }

    #[test]
    fn status_maps_has_today_both_ways() {
        let claimed = r#"{"code": 0, "data": {"hasToday": true}}"#;
        let unclaimed = r#"{"code": 0, "data": {"hasToday": false}}"#;
        assert_eq!(
            parse_status_body(claimed).unwrap(),
            AttendanceStatus::AlreadyClaimedToday
        );
        assert_eq!(
            parse_status_body(unclaimed).unwrap(),
            AttendanceStatus::NotClaimedToday
        );
    }

    #[test]
    fn expired_token_code_is_auth_on_status() {
        let body = r#"{"code": 10002, "message": "login expired"}"#;
        assert!(matches!(
            parse_status_body(body),
            Err(ClientError::Auth(_))
        ));
    }

    #[test]
    fn unknown_status_code_is_api_error() {
        let body = r#"{"code": 500, "message": "boom"}"#;
        assert!(matches!(parse_status_body(body), Err(ClientError::Api(_))));
    }

    #[test]
    fn malformed_status_body_is_api_error() {
        assert!(matches!(
            parse_status_body("<html>"),
            Err(ClientError::Api(_))
        ));
    }

    #[test]
    fn successful_claim_carries_joined_rewards() {
        let body = r#"{
          "code": 0,
          "data": {
            "awardIds": ["a1"],
            "resourceInfoMap": {"a1": {"name": "Orundum", "count": 100}}
          }
        }"#;
        assert_eq!(
            parse_claim_body(body).unwrap(),
            ClaimOutcome::Claimed {
                reward: Some("Orundum x100".to_string())
            }
        );
    }

    #[test]
    fn already_signed_codes_map_to_already_claimed() {
        for code in [1001, 10001] {
            let body = format!(r#"{{"code": {code}, "message": ""}}"#);
            assert_eq!(
                parse_claim_body(&body).unwrap(),
                ClaimOutcome::AlreadyClaimed
            );
        }
    }

    #[test]
    fn already_message_maps_to_already_claimed() {
        let body = r#"{"code": 7, "message": "Already signed in today"}"#;
        assert_eq!(parse_claim_body(body).unwrap(), ClaimOutcome::AlreadyClaimed);
    }

    #[test]
    fn expired_token_code_is_auth_on_claim() {
        let body = r#"{"code": 10002, "message": "token expired"}"#;
        assert!(matches!(parse_claim_body(body), Err(ClientError::Auth(_))));
    }

    #[test]
    fn other_claim_codes_are_api_errors() {
        let body = r#"{"code": 9999, "message": "maintenance"}"#;
        assert!(matches!(parse_claim_body(body), Err(ClientError::Api(_))));
    }
}
