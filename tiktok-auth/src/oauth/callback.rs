//! OAuth callback data handed over by the host after the authorization redirect.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Callback passthroughs. Any of the three sources may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackData {
    /// Query parameters already parsed by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query_parameters: Option<HashMap<String, String>>,
    /// Raw query string of the callback URL, with or without the leading `?`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_query_string: Option<String>,
    /// Directly supplied authorization code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// `code` and `state` extracted from callback data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

impl CallbackData {
    /// Callback data from a raw query string such as `?code=abc&state=xyz`.
    pub fn from_query_string(raw: &str) -> Self {
        Self {
            raw_query_string: Some(raw.to_string()),
            ..Default::default()
        }
    }

    /// Extract `code` and `state`.
    ///
    /// Each value is taken from the query-parameter map first, then from the raw query
    /// string; `code` finally falls back to the directly supplied field. Empty values
    /// count as absent.
    pub fn params(&self) -> CallbackParams {
        let raw = self.raw_query_string.as_deref().map(parse_query).unwrap_or_default();

        let lookup = |key: &str| {
            self.callback_query_parameters
                .as_ref()
                .and_then(|map| map.get(key))
                .filter(|v| !v.is_empty())
                .cloned()
                .or_else(|| raw.get(key).filter(|v| !v.is_empty()).cloned())
        };

        CallbackParams {
            code: lookup("code").or_else(|| self.code.clone().filter(|c| !c.is_empty())),
            state: lookup("state"),
        }
    }
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    let raw = raw.trim();
    let query = match raw.strip_prefix('?') {
        Some(query) => query,
        None if raw.contains("://") => raw.split_once('?').map(|(_, q)| q).unwrap_or(""),
        None => raw,
    };
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
