//! 敏感词库加载器
//! 负责从后端接口、本地文件或内存拉取词库，不做任何缓存

use std::path::PathBuf;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::model::WordLibrary;
use crate::config::CensorConfig;
use crate::error::{CensorError, CensorResult};

const USER_AGENT: &str = concat!("textcensor/", env!("CARGO_PKG_VERSION"));

/// 词库拉取接口
/// 缓存、单飞与兜底都由 WordLibraryStore 负责，实现方只需完成一次拉取
#[async_trait]
pub trait LibraryFetcher: Send + Sync {
    /// 拉取完整词库
    async fn fetch_word_library(&self) -> CensorResult<WordLibrary>;

    /// 来源描述（用于日志输出）
    fn source_name(&self) -> String;
}

/// 后端接口词库拉取器
#[derive(Debug, Clone)]
pub struct HttpLibraryFetcher {
    client: Client,
    url: Url,
}

impl HttpLibraryFetcher {
    /// 根据配置创建（超时取自 http_timeout）
    pub fn new(config: &CensorConfig) -> CensorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .build()?;
        Ok(Self {
            client,
            url: config.library_url()?,
        })
    }
}

#[async_trait]
impl LibraryFetcher for HttpLibraryFetcher {
    async fn fetch_word_library(&self) -> CensorResult<WordLibrary> {
        let response = self.client
            .get(self.url.clone())
            .header("User-Agent", USER_AGENT)
            .header("Accept-Encoding", "gzip, deflate")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CensorError::LibraryFetchError(format!("请求超时：{}", e))
                } else {
                    CensorError::LibraryFetchError(format!("请求失败：{}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(CensorError::LibraryFetchError(format!(
                "URL {} 返回状态码 {}",
                self.url, response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            CensorError::LibraryFetchError(format!("读取响应体失败：{}", e))
        })?;
        debug!("词库响应体大小：{} 字节", bytes.len());

        WordLibrary::from_json_slice(&bytes)
    }

    fn source_name(&self) -> String {
        self.url.to_string()
    }
}

/// 本地 JSON 文件词库拉取器
#[derive(Debug, Clone)]
pub struct FileLibraryFetcher {
    path: PathBuf,
}

impl FileLibraryFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LibraryFetcher for FileLibraryFetcher {
    async fn fetch_word_library(&self) -> CensorResult<WordLibrary> {
        let data = tokio::fs::read(&self.path).await?;
        WordLibrary::from_json_slice(&data)
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

/// 内存词库拉取器（预加载词库或测试使用）
#[derive(Debug, Clone)]
pub struct StaticLibraryFetcher {
    library: WordLibrary,
}

impl StaticLibraryFetcher {
    pub fn new(mut library: WordLibrary) -> Self {
        library.normalize();
        Self { library }
    }
}

#[async_trait]
impl LibraryFetcher for StaticLibraryFetcher {
    async fn fetch_word_library(&self) -> CensorResult<WordLibrary> {
        Ok(self.library.clone())
    }

    fn source_name(&self) -> String {
        "static".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::model::CategoryConfig;

    #[tokio::test]
    async fn test_file_fetcher_reads_envelope() {
        let path = std::env::temp_dir().join(format!("textcensor_loader_{}.json", std::process::id()));
        tokio::fs::write(
            &path,
            r#"{"code":200,"data":{"library":{"abuse":{"defaultRisk":4,"words":["傻逼"]}}}}"#,
        )
        .await
        .unwrap();

        let fetcher = FileLibraryFetcher::new(&path);
        let lib = fetcher.fetch_word_library().await.unwrap();
        assert_eq!(lib.category_words("abuse"), vec!["傻逼".to_string()]);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_fetcher_missing_file() {
        let fetcher = FileLibraryFetcher::new("/definitely/not/here/library.json");
        let err = fetcher.fetch_word_library().await.unwrap_err();
        assert!(matches!(err, CensorError::IoError(_)));
    }

    #[tokio::test]
    async fn test_static_fetcher_normalizes() {
        let mut lib = WordLibrary::new();
        lib.categories.push(CategoryConfig { default_risk: 0, ..CategoryConfig::new("ad", 2, ["加微信"]) });
        lib.categories.push(CategoryConfig::new(" ", 4, ["无名"]));
        let fetched = StaticLibraryFetcher::new(lib).fetch_word_library().await.unwrap();
        assert_eq!(fetched.category_names(), vec!["ad".to_string()]);
        assert_eq!(fetched.category("ad").unwrap().default_risk, 1);
    }

    #[test]
    fn test_http_fetcher_uses_config_url() {
        let fetcher = HttpLibraryFetcher::new(&CensorConfig::default()).unwrap();
        assert_eq!(fetcher.source_name(), "https://nkuwiki.com/wxapp/banwords/library");
    }
}
