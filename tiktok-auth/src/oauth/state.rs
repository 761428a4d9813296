//! CSRF state payloads round-tripped through the TikTok authorization redirect.
//!
//! The payload is JSON `{ token?, cid?, createdAt? }` encoded as unpadded base64url, with
//! `createdAt` in epoch milliseconds.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::StateExpectations;
use crate::error::{state_error, Error, ErrorKind, StateErrorKind};

/// Decoded `state` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl StatePayload {
    /// Issue a fresh payload with a random token.
    ///
    /// # Arguments
    ///
    /// * `cid` - Optional correlation id echoed back in the callback
    /// * `now` - Issue time, recorded as `createdAt`
    pub fn issue(cid: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            token: Some(generate_token()),
            cid,
            created_at: Some(now.timestamp_millis()),
        }
    }

    /// Encode as unpadded base64url JSON.
    pub fn encode(&self) -> Result<String, Error> {
        let json = serde_json::to_vec(self).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::State(StateErrorKind::InvalidFormat),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a base64url JSON payload. Padding is tolerated.
    pub fn decode(state: &str) -> Result<Self, Error> {
        let trimmed = state.trim().trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD.decode(trimmed).map_err(|_| {
            state_error(StateErrorKind::InvalidFormat, "Invalid OAuth state format")
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|_| state_error(StateErrorKind::InvalidFormat, "Invalid OAuth state format"))
    }
}

/// Validate the callback `state` against the configured expectations.
///
/// Runs entirely before any network call.
///
/// # Returns
///
/// The decoded payload, or `None` when no state was supplied and none is required.
pub fn validate_state(
    state: Option<&str>,
    expectations: &StateExpectations,
    now: DateTime<Utc>,
) -> Result<Option<StatePayload>, Error> {
    let Some(state) = state.filter(|s| !s.is_empty()) else {
        if expectations.required {
            return Err(state_error(
                StateErrorKind::Missing,
                "Missing OAuth state (CSRF protection)",
            ));
        }
        return Ok(None);
    };

    let payload = StatePayload::decode(state)?;

    if let Some(expected) = &expectations.expected_token {
        if payload.token.as_deref() != Some(expected.as_str()) {
            return Err(state_error(StateErrorKind::Mismatch, "OAuth state token mismatch (CSRF)"));
        }
    }

    if let Some(expected) = &expectations.expected_cid {
        if payload.cid.as_deref() != Some(expected.as_str()) {
            return Err(state_error(StateErrorKind::Mismatch, "OAuth state cid mismatch (CSRF)"));
        }
    }

    if let (Some(created_at), Some(max_age)) = (payload.created_at, expectations.max_age) {
        let age_ms = now
            .timestamp_millis()
            .checked_sub(created_at)
            .ok_or_else(|| state_error(StateErrorKind::Expired, "OAuth state expired"))?;
        if age_ms < 0 {
            return Err(state_error(
                StateErrorKind::IssuedInFuture,
                "OAuth state was issued in the future",
            ));
        }
        if age_ms > max_age.num_milliseconds() {
            return Err(state_error(StateErrorKind::Expired, "OAuth state expired"));
        }
    }

    debug!("OAuth state validated");
    Ok(Some(payload))
}

/// Generate a cryptographically random state token.
fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn kind(err: Error) -> StateErrorKind {
        match err.error_kind {
            ErrorKind::State(kind) => kind,
            other => panic!("expected state error, got {:?}", other),
        }
    }

    fn encoded(token: &str, cid: &str, created_at: DateTime<Utc>) -> String {
        StatePayload {
            token: Some(token.to_string()),
            cid: Some(cid.to_string()),
            created_at: Some(created_at.timestamp_millis()),
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let now = Utc::now();
        let payload = StatePayload {
            token: Some("t".to_string()),
            cid: Some("c".to_string()),
            created_at: Some(now.timestamp_millis()),
        };

        let decoded = StatePayload::decode(&payload.encode().unwrap()).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_wire_format_uses_created_at_camel_case() {
        let payload = StatePayload {
            token: None,
            cid: None,
            created_at: Some(1_700_000_000_000),
        };
        let json = URL_SAFE_NO_PAD.decode(payload.encode().unwrap()).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), r#"{"createdAt":1700000000000}"#);
    }

    #[test]
    fn test_decode_tolerates_padding() {
        let padded = base64::engine::general_purpose::URL_SAFE.encode(r#"{"cid":"c"}"#);
        assert!(padded.ends_with('='));
        assert_eq!(StatePayload::decode(&padded).unwrap().cid.as_deref(), Some("c"));
    }

    #[test]
    fn test_issue_generates_random_token() {
        let now = Utc::now();
        let first = StatePayload::issue(Some("cid".to_string()), now);
        let second = StatePayload::issue(None, now);

        assert_eq!(first.token.as_ref().map(String::len), Some(64));
        assert_ne!(first.token, second.token);
        assert_eq!(first.created_at, Some(now.timestamp_millis()));
    }

    #[test]
    fn test_extreme_created_at_is_expired() {
        let state = StatePayload {
            token: None,
            cid: None,
            created_at: Some(i64::MIN),
        }
        .encode()
        .unwrap();
        let expectations = StateExpectations::from_minutes(false, 10);

        assert_eq!(
            kind(validate_state(Some(&state), &expectations, Utc::now()).unwrap_err()),
            StateErrorKind::Expired
        );
    }

    #[test]
    fn test_missing_state_when_required() {
        let expectations = StateExpectations::default();
        assert_eq!(
            kind(validate_state(None, &expectations, Utc::now()).unwrap_err()),
            StateErrorKind::Missing
        );
        assert_eq!(
            kind(validate_state(Some(""), &expectations, Utc::now()).unwrap_err()),
            StateErrorKind::Missing
        );
    }

    #[test]
    fn test_missing_state_when_optional() {
        let expectations = StateExpectations::from_minutes(false, 10);
        assert_eq!(validate_state(None, &expectations, Utc::now()).unwrap(), None);
    }

    #[test]
    fn test_invalid_format() {
        let expectations = StateExpectations::default();
        assert_eq!(
            kind(validate_state(Some("!!not base64!!"), &expectations, Utc::now()).unwrap_err()),
            StateErrorKind::InvalidFormat
        );
        let not_json = URL_SAFE_NO_PAD.encode("plain text");
        assert_eq!(
            kind(validate_state(Some(&not_json), &expectations, Utc::now()).unwrap_err()),
            StateErrorKind::InvalidFormat
        );
    }

    #[test]
    fn test_token_and_cid_mismatch() {
        let now = Utc::now();
        let state = encoded("t", "c", now);

        let wrong_token = StateExpectations::default().with_expected_token(Some("other".to_string()));
        assert_eq!(
            kind(validate_state(Some(&state), &wrong_token, now).unwrap_err()),
            StateErrorKind::Mismatch
        );

        let wrong_cid = StateExpectations::default().with_expected_cid(Some("other".to_string()));
        assert_eq!(
            kind(validate_state(Some(&state), &wrong_cid, now).unwrap_err()),
            StateErrorKind::Mismatch
        );

        let matching = StateExpectations::default()
            .with_expected_token(Some("t".to_string()))
            .with_expected_cid(Some("c".to_string()));
        assert!(validate_state(Some(&state), &matching, now).unwrap().is_some());
    }

    #[test]
    fn test_expired_state() {
        let now = Utc::now();
        let state = encoded("t", "c", now - Duration::minutes(11));
        assert_eq!(
            kind(validate_state(Some(&state), &StateExpectations::default(), now).unwrap_err()),
            StateErrorKind::Expired
        );
    }

    #[test]
    fn test_state_within_max_age() {
        let now = Utc::now();
        for minutes in [0, 1, 9] {
            let state = encoded("t", "c", now - Duration::minutes(minutes));
            assert!(validate_state(Some(&state), &StateExpectations::default(), now).is_ok());
        }
    }

    #[test]
    fn test_future_state() {
        let now = Utc::now();
        let state = encoded("t", "c", now + Duration::seconds(30));
        assert_eq!(
            kind(validate_state(Some(&state), &StateExpectations::default(), now).unwrap_err()),
            StateErrorKind::IssuedInFuture
        );
    }

    #[test]
    fn test_age_check_disabled() {
        let now = Utc::now();
        let state = encoded("t", "c", now - Duration::days(30));
        let expectations = StateExpectations::from_minutes(true, 0);
        assert!(validate_state(Some(&state), &expectations, now).is_ok());
    }
}
