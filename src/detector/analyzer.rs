//! 扫描器：原文、拼音、缩写三类模式分别对文本执行匹配
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::compiler::{CompiledPattern, CompiledPatternSet, PatternKind};
use crate::utils::phonetic::Transliterator;

/// 已是拼音/字母形式的文本，无需再转写
static ROMANIZED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z\s]+$").expect("romanized text regex")
});

/// 单次命中
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// 被命中的片段（拼音命中时为转写文本中的片段）
    pub matched_span: String,
    /// 片段在被扫描文本中的字节偏移
    pub byte_offset: usize,
    pub source_word: String,
    pub category: String,
    pub risk: u8,
    pub kind: PatternKind,
}

impl MatchResult {
    pub fn end_offset(&self) -> usize {
        self.byte_offset + self.matched_span.len()
    }
}

/// 原文扫描器
pub struct LiteralScanner;

impl LiteralScanner {
    pub fn scan(set: &CompiledPatternSet, text: &str, matches: &mut Vec<MatchResult>) {
        collect(&set.literal, text, matches);
    }
}

/// 拼音扫描器
pub struct PhoneticScanner;

impl PhoneticScanner {
    pub fn scan(
        set: &CompiledPatternSet,
        text: &str,
        transliterator: &dyn Transliterator,
        matches: &mut Vec<MatchResult>,
    ) {
        if set.phonetic.is_empty() {
            return;
        }

        if ROMANIZED.is_match(text) {
            collect(&set.phonetic, text, matches);
        } else {
            let phonetic = transliterator.to_phonetic(text);
            collect(&set.phonetic, &phonetic, matches);
        }
    }
}

/// 缩写扫描器：直接作用于原文（大小写不敏感）
pub struct AcronymScanner;

impl AcronymScanner {
    pub fn scan(set: &CompiledPatternSet, text: &str, matches: &mut Vec<MatchResult>) {
        collect(&set.acronym, text, matches);
    }
}

/// 扫描引擎：三类扫描各自独立运行，结果按 原文 -> 拼音 -> 缩写 顺序拼接，不去重
pub struct ScanEngine;

impl ScanEngine {
    pub fn scan_all(
        set: &CompiledPatternSet,
        text: &str,
        transliterator: &dyn Transliterator,
    ) -> Vec<MatchResult> {
        let mut matches = Vec::new();

        LiteralScanner::scan(set, text, &mut matches);
        let literal_hits = matches.len();
        PhoneticScanner::scan(set, text, transliterator, &mut matches);
        let phonetic_hits = matches.len() - literal_hits;
        AcronymScanner::scan(set, text, &mut matches);
        let acronym_hits = matches.len() - literal_hits - phonetic_hits;

        if !matches.is_empty() {
            debug!(
                "扫描命中：原文{}处、拼音{}处、缩写{}处（模式版本 {}）",
                literal_hits, phonetic_hits, acronym_hits, set.version
            );
        }
        matches
    }
}

fn collect(patterns: &[CompiledPattern], haystack: &str, matches: &mut Vec<MatchResult>) {
    for pattern in patterns {
        for range in pattern.matcher.find_all(haystack) {
            matches.push(MatchResult {
                matched_span: haystack[range.clone()].to_string(),
                byte_offset: range.start,
                source_word: pattern.source_word.clone(),
                category: pattern.category.clone(),
                risk: pattern.risk,
                kind: pattern.kind(),
            });
        }
    }
}
