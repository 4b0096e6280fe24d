//! 远程审核接口定义
//! 审核出错时视为无远程信号，仅使用本地匹配

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CensorResult;

/// 远程审核结果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteSignal {
    pub is_risky: bool,
    /// 风险标签（如“色情”“辱骂”），用于拼接提示语
    pub label: String,
}

impl RemoteSignal {
    pub fn risky(label: impl Into<String>) -> Self {
        Self {
            is_risky: true,
            label: label.into(),
        }
    }

    pub fn clean() -> Self {
        Self::default()
    }
}

/// 云端内容审核接口
#[async_trait]
pub trait RemoteModerator: Send + Sync {
    async fn remote_moderate(&self, text: &str) -> CensorResult<RemoteSignal>;
}

/// 空审核器：始终返回无风险
pub struct NoopModerator;

#[async_trait]
impl RemoteModerator for NoopModerator {
    async fn remote_moderate(&self, _text: &str) -> CensorResult<RemoteSignal> {
        Ok(RemoteSignal::clean())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_never_flags() {
        let signal = NoopModerator.remote_moderate("任何内容").await.unwrap();
        assert_eq!(signal, RemoteSignal::clean());
    }
}
