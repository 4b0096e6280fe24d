//! 敏感词检测器核心：整合词库、模式编译、扫描与风险合成
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::analyzer::{LiteralScanner, ScanEngine};
use super::synthesizer::{RiskSynthesizer, Verdict};
use crate::compiler::{CompiledPatternSet, PatternCompiler};
use crate::config::{CensorConfig, DEFAULT_LIBRARY_TTL};
use crate::error::CensorResult;
use crate::library::{
    HttpLibraryFetcher, LibraryFetcher, LibraryStatus, StaticLibraryFetcher, WordLibrary,
    WordLibraryStore,
};
use crate::moderation::{HttpRemoteModerator, RemoteModerator};
use crate::utils::{PinyinTransliterator, TextMasker, Transliterator};

/// 敏感词检测器
pub struct TextCensor {
    store: WordLibraryStore,
    transliterator: Arc<dyn Transliterator>,
    moderator: Option<Arc<dyn RemoteModerator>>,
    // 当前编译结果，按快照版本整体替换
    compiled: RwLock<Option<Arc<CompiledPatternSet>>>,
}

impl TextCensor {
    /// 按配置创建检测器（HTTP 词库，可选远程审核）
    pub fn new(config: CensorConfig) -> CensorResult<Self> {
        config.validate()?;
        let fetcher = HttpLibraryFetcher::new(&config)?;
        let mut censor = Self::from_store(
            WordLibraryStore::new(Arc::new(fetcher), config.library_ttl)
                .with_custom_words(&config.custom_words),
        );

        if let Some(url) = &config.moderation_url {
            let moderator = HttpRemoteModerator::new(url, config.http_timeout)?;
            censor.moderator = Some(Arc::new(moderator));
        }
        Ok(censor)
    }

    /// 自定义词库来源
    pub fn with_fetcher(fetcher: Arc<dyn LibraryFetcher>, ttl: Duration) -> Self {
        Self::from_store(WordLibraryStore::new(fetcher, ttl))
    }

    /// 固定词库（测试、离线场景）
    pub fn with_library(library: WordLibrary) -> Self {
        Self::with_fetcher(Arc::new(StaticLibraryFetcher::new(library)), DEFAULT_LIBRARY_TTL)
    }

    pub fn with_moderator(mut self, moderator: Arc<dyn RemoteModerator>) -> Self {
        self.moderator = Some(moderator);
        self
    }

    pub fn with_transliterator(mut self, transliterator: Arc<dyn Transliterator>) -> Self {
        self.transliterator = transliterator;
        self
    }

    fn from_store(store: WordLibraryStore) -> Self {
        Self {
            store,
            transliterator: Arc::new(PinyinTransliterator::new()),
            moderator: None,
            compiled: RwLock::new(None),
        }
    }

    /// 检测文本
    /// 空白文本直接返回无风险，不触发词库初始化
    pub async fn check(&self, text: &str) -> Verdict {
        if text.trim().is_empty() {
            return Verdict::safe();
        }

        if let Some(moderator) = &self.moderator {
            match moderator.remote_moderate(text).await {
                Ok(signal) if signal.is_risky => {
                    debug!("远程审核判定有风险：{}", signal.label);
                    return RiskSynthesizer::from_remote(&signal);
                }
                Ok(_) => {}
                Err(e) => warn!("远程审核失败，仅使用本地匹配：{}", e),
            }
        }

        let patterns = self.ensure_patterns().await;
        let matches = ScanEngine::scan_all(&patterns, text, self.transliterator.as_ref());
        RiskSynthesizer::synthesize(matches)
    }

    /// 可空输入版本
    pub async fn check_optional(&self, text: Option<&str>) -> Verdict {
        match text {
            Some(text) => self.check(text).await,
            None => Verdict::safe(),
        }
    }

    /// 文本打码：只处理原文命中，拼音/缩写命中的偏移不对应原文
    pub async fn filter(&self, text: &str, mask: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let patterns = self.ensure_patterns().await;
        let mut matches = Vec::new();
        LiteralScanner::scan(&patterns, text, &mut matches);

        let spans: Vec<_> = matches
            .iter()
            .map(|m| m.byte_offset..m.end_offset())
            .collect();
        TextMasker::mask(text, &spans, mask)
    }

    /// 添加自定义敏感词，返回前完成重新编译
    pub async fn add_custom_word(&self, word: &str) -> bool {
        let added = self.store.add_custom_word(word).await;
        if added {
            self.ensure_patterns().await;
        }
        added
    }

    /// 删除自定义敏感词，返回前完成重新编译
    pub async fn remove_custom_word(&self, word: &str) -> bool {
        let removed = self.store.remove_custom_word(word).await;
        if removed {
            self.ensure_patterns().await;
        }
        removed
    }

    pub async fn custom_words(&self) -> Vec<String> {
        self.store.custom_words().await
    }

    /// 强制刷新词库
    pub async fn force_refresh(&self) -> Arc<WordLibrary> {
        self.store.force_refresh().await
    }

    pub async fn categories(&self) -> Vec<String> {
        self.store.categories().await
    }

    pub async fn category_words(&self, category: &str) -> Vec<String> {
        self.store.category_words(category).await
    }

    pub async fn status(&self) -> LibraryStatus {
        self.store.status().await
    }

    /// 词库缓存（清除缓存、调整有效期等维护操作）
    pub fn store(&self) -> &WordLibraryStore {
        &self.store
    }

    /// 获取与当前词库快照一致的编译结果
    pub async fn compiled_patterns(&self) -> Arc<CompiledPatternSet> {
        self.ensure_patterns().await
    }

    async fn ensure_patterns(&self) -> Arc<CompiledPatternSet> {
        let snapshot = self.store.snapshot(false).await;

        if let Some(set) = self.compiled.read().await.as_ref() {
            if set.version >= snapshot.version {
                return set.clone();
            }
        }

        let mut guard = self.compiled.write().await;
        // 等写锁期间可能已被其它调用编译
        if let Some(set) = guard.as_ref() {
            if set.version >= snapshot.version {
                return set.clone();
            }
        }

        let set = Arc::new(PatternCompiler::compile(&snapshot, self.transliterator.as_ref()));
        *guard = Some(set.clone());
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::PatternKind;
    use crate::config::ConfigManager;
    use crate::error::CensorError;
    use crate::library::CategoryConfig;

    /// 词库词按表转写，其它输入一律转写为固定拼音
    struct FixedTransliterator(&'static str);

    impl Transliterator for FixedTransliterator {
        fn to_phonetic(&self, text: &str) -> String {
            match text {
                "傻逼" => "sha bi",
                "法轮功" => "fa lun gong",
                "台独" => "tai du",
                _ => self.0,
            }
            .to_string()
        }
    }

    fn censor() -> TextCensor {
        TextCensor::with_library(
            WordLibrary::new()
                .with_category(CategoryConfig::new("abuse", 4, ["傻逼"]))
                .with_category(CategoryConfig::new("politics", 5, ["法轮功"]).with_combo(["台", "独"])),
        )
    }

    #[tokio::test]
    async fn test_check_literal_hit() {
        let censor = censor();
        let verdict = censor.check("你是个傻*逼").await;
        assert!(verdict.risk);
        assert_eq!(verdict.matches[0].kind, PatternKind::Literal);
        assert_eq!(verdict.reason.as_deref(), Some("包含辱骂内容，请修改后再试"));
    }

    #[tokio::test]
    async fn test_blank_input_does_not_initialize() {
        let censor = censor();
        assert_eq!(censor.check("  \n").await, Verdict::safe());
        assert_eq!(censor.check_optional(None).await, Verdict::safe());
        assert_eq!(censor.status().await, LibraryStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_filter_masks_literal_only() {
        let censor = censor();
        assert_eq!(censor.filter("支持台_独吗", "*").await, "支持***吗");
        // 拼音命中不打码
        assert_eq!(censor.filter("fa lun gong", "*").await, "fa lun gong");
        assert_eq!(censor.filter("", "*").await, "");
    }

    #[tokio::test]
    async fn test_custom_word_recompiles() {
        let censor = censor();
        let before = censor.compiled_patterns().await;
        assert!(!censor.check("加我微信").await.risk);

        assert!(censor.add_custom_word("微信").await);
        let verdict = censor.check("加我微 信").await;
        assert!(verdict.risk);
        assert_eq!(verdict.matches[0].category, "custom");
        assert_eq!(verdict.reason.as_deref(), Some("包含自定义内容，请修改后再试"));

        // 旧编译结果保持不变
        assert!(before.literal.iter().all(|p| p.source_word != "微信"));

        assert!(censor.remove_custom_word("微信").await);
        assert!(!censor.check("加我微信").await.risk);
    }

    #[tokio::test]
    async fn test_patterns_cached_between_checks() {
        let censor = censor();
        let a = censor.compiled_patterns().await;
        censor.check("随便说点什么").await;
        let b = censor.compiled_patterns().await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_custom_word_compiled_before_return() {
        let censor = censor();
        censor.check("随便").await;

        assert!(censor.add_custom_word("香菜").await);
        let cached = censor.compiled.read().await.clone().unwrap();
        assert!(cached.literal.iter().any(|p| p.source_word == "香菜" && p.category == "custom"));

        assert!(censor.remove_custom_word("香菜").await);
        let cached = censor.compiled.read().await.clone().unwrap();
        assert!(cached.literal.iter().all(|p| p.source_word != "香菜"));
    }

    #[tokio::test]
    async fn test_custom_transliterator_drives_phonetic_scan() {
        let censor = censor().with_transliterator(Arc::new(FixedTransliterator("fa lun gong")));
        let verdict = censor.check("随便说说").await;
        assert!(verdict.risk);
        assert_eq!(verdict.matches[0].kind, PatternKind::Phonetic);
        assert_eq!(verdict.matches[0].source_word, "法轮功");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ConfigManager::custom().http_timeout(0).build();
        assert!(matches!(TextCensor::new(config), Err(CensorError::InvalidInput(_))));
    }
}
