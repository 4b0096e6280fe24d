//! 敏感词库数据模型定义
//! 仅存储词库数据与扁平化后的词条定义，支持序列化/反序列化

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::error::{CensorError, CensorResult};

/// 自定义敏感词的固定分类
pub const CUSTOM_CATEGORY: &str = "custom";
/// 自定义敏感词的固定风险等级
pub const CUSTOM_WORD_RISK: u8 = 3;
pub const MIN_RISK: u8 = 1;
pub const MAX_RISK: u8 = 5;

/// 词条类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordKind {
    /// 原文词条
    Literal,
    /// 拼音首字母缩写
    Acronym,
}

/// 扁平化后的单个敏感词条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDefinition {
    pub word: String,
    pub category: String,
    pub risk: u8,
    pub kind: WordKind,
}

impl WordDefinition {
    /// 创建原文词条，空白词返回 None
    pub fn literal(word: &str, category: &str, risk: u8) -> Option<Self> {
        Self::build(word, category, risk, WordKind::Literal)
    }

    /// 创建缩写词条，空白词返回 None
    pub fn acronym(word: &str, category: &str, risk: u8) -> Option<Self> {
        Self::build(word, category, risk, WordKind::Acronym)
    }

    fn build(word: &str, category: &str, risk: u8, kind: WordKind) -> Option<Self> {
        let word = word.trim();
        if word.is_empty() {
            return None;
        }
        Some(Self {
            word: word.to_string(),
            category: category.to_string(),
            risk: clamp_risk(risk),
            kind,
        })
    }
}

impl fmt::Display for WordDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}:{}]", self.word, self.category, self.risk)
    }
}

/// 风险等级收敛到 [1,5]
pub fn clamp_risk(risk: u8) -> u8 {
    risk.clamp(MIN_RISK, MAX_RISK)
}

fn default_category_risk() -> u8 {
    CUSTOM_WORD_RISK
}

/// defaultRisk 容错解析：数值收敛到 [1,5]，非数值取默认等级
fn deserialize_risk<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(risk_from_value(&value))
}

fn risk_from_value(value: &Value) -> u8 {
    match value.as_f64() {
        Some(n) if n.is_finite() => n.round().clamp(MIN_RISK as f64, MAX_RISK as f64) as u8,
        _ => CUSTOM_WORD_RISK,
    }
}

/// 分类词库配置（兼容后端 JSON 的混合结构）
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CategoryConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(
        rename = "defaultRisk",
        alias = "default_risk",
        default = "default_category_risk",
        deserialize_with = "deserialize_risk"
    )]
    pub default_risk: u8,
    // 字符串或字符串数组
    #[serde(default)]
    pub words: Option<Value>,
    // 组合词：片段数组的数组，如 [["台","独"]]
    #[serde(rename = "patterns", alias = "combo_patterns", default)]
    pub combo_patterns: Option<Value>,
}

impl CategoryConfig {
    pub fn new<W, S>(category: &str, default_risk: u8, words: W) -> Self
    where
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words.into_iter().map(|w| Value::String(w.into())).collect();
        Self {
            category: category.to_string(),
            default_risk: clamp_risk(default_risk),
            words: Some(Value::Array(words)),
            combo_patterns: None,
        }
    }

    /// 追加组合词
    pub fn with_combo<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let combo = Value::Array(fragments.into_iter().map(|f| Value::String(f.into())).collect());
        match self.combo_patterns {
            Some(Value::Array(ref mut arr)) => arr.push(combo),
            _ => self.combo_patterns = Some(Value::Array(vec![combo])),
        }
        self
    }

    /// 普通词列表（跳过非字符串与空白项）
    pub fn word_list(&self) -> Vec<String> {
        let mut words = Vec::new();
        match &self.words {
            Some(Value::String(s)) => push_trimmed(&mut words, s),
            Some(Value::Array(arr)) => {
                for item in arr {
                    if let Value::String(s) = item {
                        push_trimmed(&mut words, s);
                    }
                }
            }
            _ => {}
        }
        words
    }

    /// 组合词列表，每项片段无分隔拼接为一个词
    pub fn combo_list(&self) -> Vec<String> {
        let Some(Value::Array(arr)) = &self.combo_patterns else {
            return Vec::new();
        };

        arr.iter()
            .filter_map(|item| match item {
                Value::Array(fragments) => {
                    let combo: String = fragments
                        .iter()
                        .filter_map(Value::as_str)
                        .collect();
                    let combo = combo.trim();
                    (!combo.is_empty()).then(|| combo.to_string())
                }
                _ => None,
            })
            .collect()
    }

    /// 风险等级（已收敛）
    pub fn risk(&self) -> u8 {
        clamp_risk(self.default_risk)
    }
}

fn push_trimmed(out: &mut Vec<String>, raw: &str) {
    let w = raw.trim();
    if !w.is_empty() {
        out.push(w.to_string());
    }
}

/// 完整敏感词库：分类 -> 分类配置
/// 分类按下发顺序保存，首条命中的分类依赖该顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordLibrary {
    pub categories: Vec<CategoryConfig>,
}

impl Serialize for WordLibrary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.categories.iter().map(|c| (&c.category, c)))
    }
}

impl WordLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入分类配置，分类名取自配置本身；同名分类原位替换
    pub fn insert(&mut self, config: CategoryConfig) {
        match self.categories.iter_mut().find(|c| c.category == config.category) {
            Some(existing) => *existing = config,
            None => self.categories.push(config),
        }
    }

    pub fn with_category(mut self, config: CategoryConfig) -> Self {
        self.insert(config);
        self
    }

    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.category == name)
    }

    /// 解析后端返回数据，兼容 `{code, data: {library}}` 包装与裸词库两种格式
    pub fn from_json_slice(bytes: &[u8]) -> CensorResult<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_json_value(value)
    }

    /// 单个分类格式错误只跳过该分类
    pub fn from_json_value(value: Value) -> CensorResult<Self> {
        let library_value = if let Some(lib) = value.pointer("/data/library") {
            lib.clone()
        } else if value.get("code").is_some() || value.get("data").is_some() {
            return Err(CensorError::LibraryParseError(
                "获取敏感词库数据格式错误：缺少 data.library".to_string(),
            ));
        } else {
            value
        };

        let Value::Object(entries) = library_value else {
            return Err(CensorError::LibraryParseError(
                "敏感词库必须是 分类 -> 配置 的对象".to_string(),
            ));
        };

        let mut library = WordLibrary::new();
        for (name, raw) in entries {
            match serde_json::from_value::<CategoryConfig>(raw) {
                Ok(mut config) => {
                    config.category = name;
                    library.insert(config);
                }
                Err(e) => warn!("敏感词分类 {} 格式错误，已跳过：{}", name, e),
            }
        }
        library.normalize();
        Ok(library)
    }

    /// 收敛风险等级，丢弃无名分类
    pub fn normalize(&mut self) {
        self.categories.retain(|c| !c.category.trim().is_empty());
        for config in self.categories.iter_mut() {
            config.default_risk = clamp_risk(config.default_risk);
        }
    }

    /// 内置兜底词库（网络失败且无缓存时使用）
    pub fn builtin_fallback() -> Self {
        WordLibrary::new()
            .with_category(CategoryConfig::new("politics", 5, ["台独", "法轮功"]))
            .with_category(CategoryConfig::new("violence", 4, ["恐怖袭击", "杀人放火"]))
            .with_category(CategoryConfig::new("porn", 5, ["色情服务", "裸聊"]))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// 分类名列表
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.category.clone()).collect()
    }

    /// 指定分类的普通词
    pub fn category_words(&self, category: &str) -> Vec<String> {
        self.category(category)
            .map(CategoryConfig::word_list)
            .unwrap_or_default()
    }

    /// 词条总数（普通词 + 组合词）
    pub fn total_words(&self) -> usize {
        self.categories
            .iter()
            .map(|c| c.word_list().len() + c.combo_list().len())
            .sum()
    }
}

/// 词库快照：编译与扫描只面向不可变快照
#[derive(Debug, Clone)]
pub struct LibrarySnapshot {
    /// 词库或自定义词任一变化都会递增
    pub version: u64,
    pub library: Arc<WordLibrary>,
    /// 按添加顺序
    pub custom_words: Arc<Vec<String>>,
}
