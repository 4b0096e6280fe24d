//! 编译后模式模型
//! 每个敏感词编译出的匹配器，以及某一词库快照对应的整套模式

use std::ops::Range;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 模式族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// 原文模糊匹配
    Literal,
    /// 拼音模糊匹配
    Phonetic,
    /// 首字母缩写匹配
    Acronym,
}

/// 匹配器：带干扰字符容忍的有序字符/音节匹配
#[derive(Debug, Clone)]
pub enum Matcher {
    LiteralFuzzy(Regex),
    PhoneticFuzzy(Regex),
    Acronym(Regex),
}

impl Matcher {
    /// 返回全部命中区间（字节偏移）
    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        self.regex()
            .find_iter(text)
            .map(|m| m.range())
            .collect()
    }

    /// 规则描述
    pub fn describe(&self) -> &str {
        self.regex().as_str()
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Matcher::LiteralFuzzy(_) => PatternKind::Literal,
            Matcher::PhoneticFuzzy(_) => PatternKind::Phonetic,
            Matcher::Acronym(_) => PatternKind::Acronym,
        }
    }

    fn regex(&self) -> &Regex {
        match self {
            Matcher::LiteralFuzzy(r) | Matcher::PhoneticFuzzy(r) | Matcher::Acronym(r) => r,
        }
    }
}

/// 编译后的单个模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub source_word: String,
    pub category: String,
    pub risk: u8,
    pub matcher: Matcher,
}

impl CompiledPattern {
    pub fn kind(&self) -> PatternKind {
        self.matcher.kind()
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub definitions: usize,
    pub literal_count: usize,
    pub phonetic_count: usize,
    pub acronym_count: usize,
    pub skipped_count: usize,
}

/// 某一词库快照编译出的不可变模式集合
#[derive(Debug, Clone, Default)]
pub struct CompiledPatternSet {
    /// 对应 LibrarySnapshot::version
    pub version: u64,
    pub literal: Vec<CompiledPattern>,
    pub phonetic: Vec<CompiledPattern>,
    pub acronym: Vec<CompiledPattern>,
    pub stats: CompileStats,
}

impl CompiledPatternSet {
    pub fn len(&self) -> usize {
        self.literal.len() + self.phonetic.len() + self.acronym.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
