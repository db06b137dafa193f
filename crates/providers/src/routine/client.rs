use crate::routine::config::RoutineConfig;
use glow_core::chat::{ChatError, Message};
use reqwest::{header, Client, StatusCode};
use tokio::time::Duration;
use tracing::{debug, error, info};

/// Client for the remote routine endpoint: POST `{ "messages": [...] }`,
/// success is a JSON object carrying the reply under `response`.
#[derive(Clone)]
pub struct RoutineClient {
    http: Client,
    cfg: RoutineConfig,
}

impl RoutineClient {
    pub fn new(cfg: RoutineConfig) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = &cfg.api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", key))?,
            );
        }
        let mut builder = Client::builder()
            .default_headers(headers)
            .use_rustls_tls()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(2)
            .timeout(cfg.timeout);
        if let Some(p) = &cfg.proxy {
            builder = builder.proxy(reqwest::Proxy::all(p)?);
        }
        let http = builder.build()?;
        Ok(Self { http, cfg })
    }

    /// Send the entire ordered history and return the assistant reply text.
    pub async fn send_chat(&self, msgs: &[Message]) -> Result<String, ChatError> {
        let url = self.cfg.endpoint.trim_end_matches('/').to_string();
        info!(target: "providers::routine", "send chat url={} messages={}", url, msgs.len());
        let body = serde_json::json!({ "messages": msgs });
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_err)?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.ok();
            error!(target: "providers::routine", "chat non-2xx status={} body={:?}", status, body);
            return Err(map_status_err(status, body));
        }
        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        let reply = parse_reply(&v)?;
        debug!(target: "providers::routine", "reply len={}", reply.len());
        Ok(reply)
    }
}

fn parse_reply(v: &serde_json::Value) -> Result<String, ChatError> {
    v["response"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ChatError::Decode("missing 'response' field in reply".into()))
}

fn map_reqwest_err(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout(e.to_string())
    } else if e.is_request() || e.is_connect() {
        ChatError::Network(e.to_string())
    } else {
        ChatError::Other(e.to_string())
    }
}

fn map_status_err(status: StatusCode, body: Option<String>) -> ChatError {
    let s = format!("{} {}", status.as_u16(), body.unwrap_or_default());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChatError::Auth(s),
        StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimit(s),
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => ChatError::Network(s),
        StatusCode::NOT_FOUND => ChatError::Protocol("404".into()),
        _ => ChatError::Other(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_is_read_from_the_response_field() {
        let v = serde_json::json!({ "response": "AM: cleanse. PM: retinol." });
        assert_eq!(parse_reply(&v).unwrap(), "AM: cleanse. PM: retinol.");
    }

    #[test]
    fn missing_or_non_string_response_is_a_decode_error() {
        for v in [
            serde_json::json!({}),
            serde_json::json!({ "reply": "nope" }),
            serde_json::json!({ "response": 42 }),
        ] {
            assert!(matches!(parse_reply(&v), Err(ChatError::Decode(_))));
        }
    }

    #[test]
    fn status_codes_map_to_the_error_taxonomy() {
        assert!(matches!(
            map_status_err(StatusCode::UNAUTHORIZED, None),
            ChatError::Auth(_)
        ));
        assert!(matches!(
            map_status_err(StatusCode::TOO_MANY_REQUESTS, None),
            ChatError::RateLimit(_)
        ));
        assert!(matches!(
            map_status_err(StatusCode::BAD_GATEWAY, Some("boom".into())),
            ChatError::Network(_)
        ));
        assert!(matches!(
            map_status_err(StatusCode::NOT_FOUND, None),
            ChatError::Protocol(_)
        ));
        assert!(matches!(
            map_status_err(StatusCode::IM_A_TEAPOT, None),
            ChatError::Other(_)
        ));
    }
}
