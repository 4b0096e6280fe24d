//! 全局配置管理,存储所有可配置项

use std::time::Duration;
use url::Url;

use crate::error::{CensorError, CensorResult};

/// 词库默认缓存有效期：30分钟
pub const DEFAULT_LIBRARY_TTL: Duration = Duration::from_secs(30 * 60);

/// 全局配置
#[derive(Debug, Clone)]
pub struct CensorConfig {
    // 后端基础地址
    pub api_base_url: String,
    // 敏感词库接口路径
    pub library_path: String,
    // 词库缓存有效期
    pub library_ttl: Duration,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 远程内容审核接口，None 表示仅本地匹配
    pub moderation_url: Option<String>,
    // 启动时预置的自定义敏感词
    pub custom_words: Vec<String>,
}

impl Default for CensorConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://nkuwiki.com".to_string(),
            library_path: "/wxapp/banwords/library".to_string(),
            library_ttl: DEFAULT_LIBRARY_TTL,
            http_timeout: 10,
            moderation_url: None,
            custom_words: Vec::new(),
        }
    }
}

impl CensorConfig {
    /// 拼接词库接口完整地址
    pub fn library_url(&self) -> CensorResult<Url> {
        let base = Url::parse(&self.api_base_url)?;
        Ok(base.join(&self.library_path)?)
    }

    /// 校验配置：超时与缓存有效期必须大于0，审核地址不能为空
    pub fn validate(&self) -> CensorResult<()> {
        if self.http_timeout == 0 {
            return Err(CensorError::InvalidInput("http_timeout 必须大于0".to_string()));
        }
        if self.library_ttl.is_zero() {
            return Err(CensorError::InvalidInput("library_ttl 必须大于0".to_string()));
        }
        if self.moderation_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            return Err(CensorError::InvalidInput("moderation_url 不能为空".to_string()));
        }
        Ok(())
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> CensorConfig {
        CensorConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: CensorConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CensorConfig::default(),
        }
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn library_path(mut self, path: impl Into<String>) -> Self {
        self.config.library_path = path.into();
        self
    }

    pub fn library_ttl(mut self, ttl: Duration) -> Self {
        self.config.library_ttl = ttl;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn moderation_url(mut self, url: impl Into<String>) -> Self {
        self.config.moderation_url = Some(url.into());
        self
    }

    pub fn custom_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.custom_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> CensorConfig {
        self.config
    }
}
