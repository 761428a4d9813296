//! TikTok content API client.
//!
//! Sends the request descriptors built by the handlers, signed with the bearer token from
//! the persisted token data, and performs the single-chunk binary upload for video posts.

use async_trait::async_trait;
use log::*;
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use tiktok_auth::credentials::DEFAULT_API_BASE_URL;
use tiktok_auth::http::{HttpClient, HttpClientBuilder};
use tiktok_auth::oauth::token::TokenData;
use tiktok_auth::oauth::{BearerSigner, RequestSigner};

use crate::traits::transport::Transport;
use crate::types::item::BinaryData;
use crate::types::request::RequestDescriptor;
use crate::Error;

/// TikTok API client
pub struct TikTokClient {
    http_client: HttpClient,
    base_url: String,
    signer: BearerSigner,
}

impl TikTokClient {
    /// Create a client signed with the access token in `tokens`.
    pub fn new(tokens: &TokenData) -> Result<Self, Error> {
        let http_client = HttpClientBuilder::new().build()?;
        Self::with_client(http_client, DEFAULT_API_BASE_URL, tokens)
    }

    /// Create a client over an existing HTTP client and base URL.
    pub fn with_client(
        http_client: HttpClient,
        base_url: &str,
        tokens: &TokenData,
    ) -> Result<Self, Error> {
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer: BearerSigner::from_token_data(tokens)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Maps a non-2xx response to an error carrying the body verbatim.
async fn error_for_status(response: reqwest::Response) -> Error {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let error_text = response.text().await.unwrap_or_default();
    warn!("TikTok API error {}: {}", status, error_text);

    match status {
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            retry_after_seconds: retry_after.unwrap_or(0),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(error_text),
        StatusCode::NOT_FOUND => Error::NotFound(error_text),
        _ => Error::Provider(error_text),
    }
}

/// TikTok reports some failures with a 2xx status and `error.code != "ok"`.
fn check_envelope(body: &Value, raw: &str) -> Result<(), Error> {
    let code = body
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str)
        .unwrap_or("ok");

    if code.is_empty() || code == "ok" {
        return Ok(());
    }

    warn!("TikTok API returned error code {}", code);
    match code {
        "access_token_invalid" | "scope_not_authorized" => Err(Error::Authentication(raw.to_string())),
        "rate_limit_exceeded" => Err(Error::RateLimited {
            retry_after_seconds: 0,
        }),
        _ => Err(Error::Provider(raw.to_string())),
    }
}

#[async_trait]
impl Transport for TikTokClient {
    async fn send(&self, request: RequestDescriptor) -> Result<Value, Error> {
        let url = self.url(&request.path);
        debug!("{} {}", request.method, request.path);

        let mut builder = self
            .http_client
            .request(request.method.clone(), &url)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let builder = self.signer.sign(builder)?;

        let response = builder.send().await.map_err(|e| {
            warn!("Failed to send TikTok request to {}: {:?}", request.path, e);
            Error::from(e)
        })?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let raw = response.text().await?;
        if raw.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        let body: Value = serde_json::from_str(&raw).map_err(|e| {
            warn!("Failed to parse TikTok response from {}: {:?}", request.path, e);
            Error::Deserialization(format!("{}: {}", e, raw))
        })?;
        check_envelope(&body, &raw)?;

        Ok(body)
    }

    async fn upload(&self, upload_url: &str, binary: &BinaryData) -> Result<(), Error> {
        let size = binary.data.len();
        if size == 0 {
            return Err(Error::Configuration(
                "Video Post: binary data is empty.".to_string(),
            ));
        }
        let content_range = format!("bytes 0-{}/{}", size - 1, size);
        debug!("Uploading {} bytes ({})", size, content_range);

        let response = self
            .http_client
            .put(upload_url)
            .header(CONTENT_TYPE, binary.mime_type.as_str())
            .header(CONTENT_RANGE, content_range)
            .body(binary.data.clone())
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to upload video to TikTok: {:?}", e);
                Error::from(e)
            })?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        info!("Uploaded {} bytes to TikTok", size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(base_url: &str) -> TikTokClient {
        let tokens = TokenData {
            access_token: Some("act.1".to_string()),
            ..Default::default()
        };
        TikTokClient::with_client(HttpClientBuilder::new().build().unwrap(), base_url, &tokens)
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_signs_and_returns_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/video/list/")
            .match_query(Matcher::UrlEncoded("fields".into(), "id,title".into()))
            .match_header("authorization", "Bearer act.1")
            .match_body(Matcher::Json(json!({"cursor": 0, "max_count": 20})))
            .with_status(200)
            .with_body(r#"{"data":{"videos":[]},"error":{"code":"ok","message":""}}"#)
            .create_async()
            .await;

        let request = RequestDescriptor::post("/v2/video/list/", json!({"cursor": 0, "max_count": 20}))
            .with_query("fields", "id,title");
        let body = client(&server.url()).send(request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body["data"]["videos"], json!([]));
    }

    #[tokio::test]
    async fn test_error_envelope_is_provider_error() {
        let mut server = Server::new_async().await;
        let raw = r#"{"data":{},"error":{"code":"invalid_params","message":"bad video id"}}"#;
        let _mock = server
            .mock("POST", "/v2/video/delete/")
            .with_status(200)
            .with_body(raw)
            .create_async()
            .await;

        let err = client(&server.url())
            .send(RequestDescriptor::post("/v2/video/delete/", json!({"video_id": "1"})))
            .await
            .unwrap_err();

        match err {
            Error::Provider(body) => assert_eq!(body, raw),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = Server::new_async().await;
        let _limited = server
            .mock("GET", "/v2/user/info/")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;
        let _failed = server
            .mock("POST", "/v2/hashtag/search/")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let client = client(&server.url());
        let err = client
            .send(RequestDescriptor::get("/v2/user/info/").with_query("fields", "open_id"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimited { retry_after_seconds: 7 }));

        let err = client
            .send(RequestDescriptor::post("/v2/hashtag/search/", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(body) if body == "upstream exploded"));
    }

    #[tokio::test]
    async fn test_upload_sets_content_range() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/upload/abc")
            .match_header("content-range", "bytes 0-4/5")
            .match_header("content-type", "video/mp4")
            .match_header("content-length", "5")
            .match_body(Matcher::Exact("hello".to_string()))
            .with_status(201)
            .create_async()
            .await;

        let binary = BinaryData {
            data: b"hello".to_vec(),
            mime_type: "video/mp4".to_string(),
            file_name: Some("clip.mp4".to_string()),
        };
        client(&server.url())
            .upload(&format!("{}/upload/abc", server.url()), &binary)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn test_requires_access_token() {
        let result = TikTokClient::with_client(
            HttpClientBuilder::new().build().unwrap(),
            "http://localhost",
            &TokenData::default(),
        );
        assert!(matches!(result, Err(Error::Authentication(_))));
    }
}
