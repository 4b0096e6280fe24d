//! 内容安全接口（msgSecCheck）的 HTTP 实现

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::traits::{RemoteModerator, RemoteSignal};
use crate::error::{CensorError, CensorResult};

#[derive(Debug, Deserialize)]
struct ModerationEnvelope {
    code: i64,
    #[serde(default)]
    data: Option<ModerationData>,
}

#[derive(Debug, Deserialize)]
struct ModerationData {
    #[serde(default)]
    result: Option<ModerationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModerationResult {
    #[serde(default)]
    is_risky: bool,
    #[serde(default)]
    label_text: String,
}

/// 远程内容审核（POST `{"content": text}`）
#[derive(Debug, Clone)]
pub struct HttpRemoteModerator {
    client: Client,
    url: Url,
}

impl HttpRemoteModerator {
    pub fn new(url: &str, timeout_secs: u64) -> CensorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: Url::parse(url)?,
        })
    }

    /// 解析接口返回：仅 code == 200 且带 result 时有效
    pub fn parse_response(bytes: &[u8]) -> CensorResult<RemoteSignal> {
        let envelope: ModerationEnvelope = serde_json::from_slice(bytes)?;
        if envelope.code != 200 {
            return Err(CensorError::ModerationError(format!(
                "审核接口返回码 {}",
                envelope.code
            )));
        }

        let result = envelope
            .data
            .and_then(|d| d.result)
            .ok_or_else(|| CensorError::ModerationError("审核接口返回格式异常".to_string()))?;

        Ok(RemoteSignal {
            is_risky: result.is_risky,
            label: result.label_text,
        })
    }
}

#[async_trait]
impl RemoteModerator for HttpRemoteModerator {
    async fn remote_moderate(&self, text: &str) -> CensorResult<RemoteSignal> {
        let response = self.client
            .post(self.url.clone())
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|e| CensorError::ModerationError(format!("审核接口调用失败：{}", e)))?;

        if !response.status().is_success() {
            return Err(CensorError::ModerationError(format!(
                "URL {} 返回状态码 {}",
                self.url, response.status()
            )));
        }

        let bytes = response.bytes().await?;
        let signal = Self::parse_response(&bytes)?;
        debug!("远程审核结果：risky={}，label={}", signal.is_risky, signal.label);
        Ok(signal)
    }
}
