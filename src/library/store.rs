//! 敏感词库缓存
//! 核心职责：
//! 1. TTL 缓存词库快照，过期或强制刷新时重新拉取
//! 2. 单飞刷新：并发调用只触发一次拉取，其余调用等待并共享结果
//! 3. 拉取失败时保留旧词库，首次即失败则装载内置兜底词库
//! 4. 维护运行期自定义词集合

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::loader::LibraryFetcher;
use super::model::{LibrarySnapshot, WordLibrary};

/// 拉取失败后的最短重试间隔（不超过 TTL）
pub const FAILURE_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// 词库生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryStatus {
    Uninitialized,
    Initializing,
    Ready,
    Expired,
    Refreshing,
}

struct StoreState {
    library: Option<Arc<WordLibrary>>,
    // 最近一次成功拉取的时间，兜底词库不设置
    fetched_at: Option<Instant>,
    failed_at: Option<Instant>,
    // 按添加顺序，首条命中依赖该顺序
    custom_words: Arc<Vec<String>>,
    ttl: Duration,
    // 每次拉取结束（无论成败）递增
    refresh_generation: u64,
    // 词库或自定义词变化时递增，编译缓存以此为键
    version: u64,
}

impl StoreState {
    fn is_expired(&self) -> bool {
        match (&self.library, self.fetched_at) {
            (Some(_), Some(at)) => at.elapsed() >= self.ttl,
            _ => true,
        }
    }

    fn is_fresh(&self) -> bool {
        if self.library.is_none() {
            return false;
        }
        if !self.is_expired() {
            return true;
        }
        let backoff = FAILURE_RETRY_INTERVAL.min(self.ttl);
        self.failed_at.is_some_and(|at| at.elapsed() < backoff)
    }
}

/// 敏感词库缓存
pub struct WordLibraryStore {
    fetcher: Arc<dyn LibraryFetcher>,
    state: RwLock<StoreState>,
    refresh_lock: Mutex<()>,
}

impl WordLibraryStore {
    pub fn new(fetcher: Arc<dyn LibraryFetcher>, ttl: Duration) -> Self {
        Self {
            fetcher,
            state: RwLock::new(StoreState {
                library: None,
                fetched_at: None,
                failed_at: None,
                custom_words: Arc::new(Vec::new()),
                ttl,
                refresh_generation: 0,
                version: 0,
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    /// 预置自定义词（构造阶段使用）
    pub fn with_custom_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = self.state.get_mut();
        let custom = Arc::make_mut(&mut state.custom_words);
        for word in words {
            let word = word.as_ref().trim();
            if !word.is_empty() && !custom.iter().any(|w| w == word) {
                custom.push(word.to_string());
            }
        }
        self
    }

    /// 获取词库
    /// - 未强制且缓存未过期：直接返回缓存，无 I/O
    /// - 已有刷新在进行：等待其完成并返回其结果
    /// - 否则发起一次拉取
    pub async fn get_library(&self, force: bool) -> Arc<WordLibrary> {
        let observed = {
            let state = self.state.read().await;
            if !force && state.is_fresh() {
                if let Some(library) = &state.library {
                    return library.clone();
                }
            }
            state.refresh_generation
        };

        let _guard = self.refresh_lock.lock().await;

        // 等锁期间已有调用完成刷新，直接共享其结果
        {
            let state = self.state.read().await;
            if state.refresh_generation != observed {
                if let Some(library) = &state.library {
                    return library.clone();
                }
            }
        }

        self.refresh().await
    }

    /// 强制刷新
    pub async fn force_refresh(&self) -> Arc<WordLibrary> {
        self.get_library(true).await
    }

    /// 调用方需持有 refresh_lock
    async fn refresh(&self) -> Arc<WordLibrary> {
        debug!("开始拉取敏感词库：{}", self.fetcher.source_name());
        let result = self.fetcher.fetch_word_library().await;

        let mut state = self.state.write().await;
        state.refresh_generation += 1;

        match result {
            Ok(library) => {
                info!(
                    "敏感词库更新成功，分类数：{}，词条数：{}",
                    library.categories.len(),
                    library.total_words()
                );
                let library = Arc::new(library);
                state.library = Some(library.clone());
                state.fetched_at = Some(Instant::now());
                state.failed_at = None;
                state.version += 1;
                library
            }
            Err(e) => {
                warn!("获取敏感词库失败：{}", e);
                state.failed_at = Some(Instant::now());
                if let Some(existing) = &state.library {
                    return existing.clone();
                }
                warn!("使用内置兜底敏感词库");
                let fallback = Arc::new(WordLibrary::builtin_fallback());
                state.library = Some(fallback.clone());
                state.version += 1;
                fallback
            }
        }
    }

    /// 获取词库与自定义词的一致快照
    pub async fn snapshot(&self, force: bool) -> LibrarySnapshot {
        let library = self.get_library(force).await;
        let state = self.state.read().await;
        LibrarySnapshot {
            version: state.version,
            library: state.library.clone().unwrap_or(library),
            custom_words: state.custom_words.clone(),
        }
    }

    /// 添加自定义词，空白或已存在返回 false
    pub async fn add_custom_word(&self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() {
            return false;
        }

        let mut state = self.state.write().await;
        if state.custom_words.iter().any(|w| w == word) {
            return false;
        }
        // 正在扫描的旧集合不受影响
        Arc::make_mut(&mut state.custom_words).push(word.to_string());
        state.version += 1;
        debug!("添加自定义敏感词：{}", word);
        true
    }

    /// 删除自定义词，不存在返回 false
    pub async fn remove_custom_word(&self, word: &str) -> bool {
        let word = word.trim();
        let mut state = self.state.write().await;
        if !state.custom_words.iter().any(|w| w == word) {
            return false;
        }
        Arc::make_mut(&mut state.custom_words).retain(|w| w != word);
        state.version += 1;
        debug!("删除自定义敏感词：{}", word);
        true
    }

    pub async fn custom_words(&self) -> Vec<String> {
        self.state.read().await.custom_words.iter().cloned().collect()
    }

    /// 清除缓存，下次访问重新拉取
    pub async fn clear_cache(&self) {
        let mut state = self.state.write().await;
        state.library = None;
        state.fetched_at = None;
        state.failed_at = None;
        state.version += 1;
        info!("敏感词缓存已清除");
    }

    /// 缓存是否过期（兜底词库始终视为过期）
    pub async fn is_cache_expired(&self) -> bool {
        self.state.read().await.is_expired()
    }

    pub async fn set_cache_ttl(&self, ttl: Duration) {
        self.state.write().await.ttl = ttl;
    }

    pub async fn status(&self) -> LibraryStatus {
        let refreshing = self.refresh_lock.try_lock().is_err();
        let state = self.state.read().await;
        match (&state.library, refreshing) {
            (None, true) => LibraryStatus::Initializing,
            (None, false) => LibraryStatus::Uninitialized,
            (Some(_), true) => LibraryStatus::Refreshing,
            (Some(_), false) if state.is_fresh() => LibraryStatus::Ready,
            (Some(_), false) => LibraryStatus::Expired,
        }
    }

    /// 分类列表
    pub async fn categories(&self) -> Vec<String> {
        self.get_library(false).await.category_names()
    }

    /// 指定分类的敏感词
    pub async fn category_words(&self, category: &str) -> Vec<String> {
        self.get_library(false).await.category_words(category)
    }
}
