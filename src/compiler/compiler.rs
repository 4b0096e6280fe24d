//! 敏感词模式编译器
//! 负责：词库扁平化、首字母缩写派生、三类模糊正则的构建
//! 非法首字符等脏数据在此处被跳过，不影响其余词条

use std::time::Instant;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::pattern::{CompileStats, CompiledPattern, CompiledPatternSet, Matcher};
use crate::error::{CensorError, CensorResult};
use crate::library::{
    LibrarySnapshot, WordDefinition, WordKind, WordLibrary, CUSTOM_CATEGORY, CUSTOM_WORD_RISK,
};
use crate::utils::phonetic::{acronym_of, Transliterator};

/// 干扰字符：空白（含全角）、标点、数学/修饰符号、emoji、零宽字符、变体选择符
pub const INTERFERE_CLASS: &str = r"[\s\p{P}\p{Sm}\p{Sk}\p{So}\x{200B}-\x{200D}\x{2060}\x{FE0E}\x{FE0F}]";
/// 缩写专用干扰字符：任何非字母
pub const ACRONYM_INTERFERE_CLASS: &str = r"\P{L}";

/// 允许作为词首的符号
const SAFE_START_SYMBOLS: &str = "@#￥$%&（）()[]【】_.·、，。？！：；\"'《》-";
/// 会让正则以元字符开头的词首
const INVALID_START: &str = "+*?|{[()^$.\\";

/// 缩写最短长度（不含）
const MIN_ACRONYM_LEN: usize = 2;
/// 拼音去除干扰后的最短长度（不含）
const MIN_PHONETIC_LEN: usize = 3;

/// 模式编译器
pub struct PatternCompiler;

impl PatternCompiler {
    /// 编译词库快照
    pub fn compile(snapshot: &LibrarySnapshot, transliterator: &dyn Transliterator) -> CompiledPatternSet {
        let start = Instant::now();
        let definitions = Self::flatten(&snapshot.library, &snapshot.custom_words, transliterator);

        let mut set = CompiledPatternSet {
            version: snapshot.version,
            ..Default::default()
        };
        let mut stats = CompileStats {
            definitions: definitions.len(),
            ..Default::default()
        };

        for def in &definitions {
            match def.kind {
                WordKind::Literal => {
                    match Self::compile_literal(def) {
                        Ok(pattern) => {
                            set.literal.push(pattern);
                            stats.literal_count += 1;
                        }
                        Err(e) => {
                            debug!("敏感词正则生成失败：{}，{}", def, e);
                            stats.skipped_count += 1;
                        }
                    }

                    match Self::compile_phonetic(def, transliterator) {
                        Ok(Some(pattern)) => {
                            set.phonetic.push(pattern);
                            stats.phonetic_count += 1;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            debug!("敏感词拼音正则生成失败：{}，{}", def, e);
                            stats.skipped_count += 1;
                        }
                    }
                }
                WordKind::Acronym => match Self::compile_acronym(def) {
                    Ok(pattern) => {
                        set.acronym.push(pattern);
                        stats.acronym_count += 1;
                    }
                    Err(e) => {
                        debug!("敏感词缩写正则生成失败：{}，{}", def, e);
                        stats.skipped_count += 1;
                    }
                },
            }
        }

        debug!("✅ 敏感词模式编译完成（版本 {}），耗时{:?}", set.version, start.elapsed());
        debug!(
            "📊 编译统计：词条{}条、原文模式{}条、拼音模式{}条、缩写模式{}条、跳过{}条",
            stats.definitions,
            stats.literal_count,
            stats.phonetic_count,
            stats.acronym_count,
            stats.skipped_count
        );

        set.stats = stats;
        set
    }

    /// 词库扁平化：普通词、组合词、自定义词 -> 原文词条，并为每个原文词条派生缩写词条
    pub fn flatten(
        library: &WordLibrary,
        custom_words: &[String],
        transliterator: &dyn Transliterator,
    ) -> Vec<WordDefinition> {
        let mut flattened = Vec::new();

        for config in &library.categories {
            let category = config.category.as_str();
            let risk = config.risk();
            for word in config.word_list().into_iter().chain(config.combo_list()) {
                Self::push_with_acronym(&mut flattened, &word, category, risk, transliterator);
            }
        }

        for word in custom_words {
            Self::push_with_acronym(&mut flattened, word, CUSTOM_CATEGORY, CUSTOM_WORD_RISK, transliterator);
        }

        flattened
    }

    fn push_with_acronym(
        out: &mut Vec<WordDefinition>,
        word: &str,
        category: &str,
        risk: u8,
        transliterator: &dyn Transliterator,
    ) {
        let Some(def) = WordDefinition::literal(word, category, risk) else {
            return;
        };

        let acronym = Self::derive_acronym(&def.word, transliterator);
        out.push(def);

        if let Some(acronym) = acronym.and_then(|a| WordDefinition::acronym(&a, category, risk)) {
            out.push(acronym);
        }
    }

    /// 拼音首字母缩写：长度大于2且全为ASCII字母才有效
    pub fn derive_acronym(word: &str, transliterator: &dyn Transliterator) -> Option<String> {
        let acronym = acronym_of(&transliterator.syllables(word));
        let valid = acronym.chars().count() > MIN_ACRONYM_LEN
            && acronym.chars().all(|c| c.is_ascii_alphabetic());
        valid.then_some(acronym)
    }

    /// 原文模糊正则：字符之间允许任意干扰字符
    pub fn literal_pattern(word: &str) -> CensorResult<String> {
        let first = word
            .chars()
            .next()
            .ok_or_else(|| CensorError::CompileSkip("空词".to_string()))?;
        if !is_safe_start(first) {
            return Err(CensorError::CompileSkip(format!("非法首字符 {:?}", first)));
        }

        let separator = format!("{}*", INTERFERE_CLASS);
        let pattern = word
            .chars()
            .map(|c| regex::escape(&c.to_string()))
            .collect::<Vec<_>>()
            .join(&separator);
        Ok(pattern)
    }

    /// 拼音模糊正则：音节之间允许任意干扰字符
    /// 去除干扰后长度不超过3时返回 Ok(None)
    pub fn phonetic_pattern(syllables: &[String]) -> CensorResult<Option<String>> {
        let syllables: Vec<&String> = syllables
            .iter()
            .filter(|s| s.chars().any(char::is_alphanumeric))
            .collect();

        let Some(first) = syllables.first().and_then(|s| s.chars().next()) else {
            return Ok(None);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(CensorError::CompileSkip(format!("非法拼音首字符 {:?}", first)));
        }

        let stripped_len: usize = syllables
            .iter()
            .map(|s| s.chars().filter(|c| c.is_alphanumeric()).count())
            .sum();
        if stripped_len <= MIN_PHONETIC_LEN {
            return Ok(None);
        }

        let separator = format!("{}*", INTERFERE_CLASS);
        let pattern = syllables
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join(&separator);
        Ok(Some(pattern))
    }

    /// 缩写正则：每个字母后允许任意非字母字符
    pub fn acronym_pattern(acronym: &str) -> CensorResult<String> {
        if acronym.is_empty() || !acronym.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CensorError::CompileSkip(format!("非法缩写 {:?}", acronym)));
        }
        Ok(acronym
            .chars()
            .map(|c| format!("{}{}*", c, ACRONYM_INTERFERE_CLASS))
            .collect())
    }

    fn compile_literal(def: &WordDefinition) -> CensorResult<CompiledPattern> {
        let regex = build_regex(&Self::literal_pattern(&def.word)?)?;
        Ok(Self::pattern(def, Matcher::LiteralFuzzy(regex)))
    }

    fn compile_phonetic(
        def: &WordDefinition,
        transliterator: &dyn Transliterator,
    ) -> CensorResult<Option<CompiledPattern>> {
        let Some(pattern) = Self::phonetic_pattern(&transliterator.syllables(&def.word))? else {
            return Ok(None);
        };
        let regex = build_regex(&pattern)?;
        Ok(Some(Self::pattern(def, Matcher::PhoneticFuzzy(regex))))
    }

    fn compile_acronym(def: &WordDefinition) -> CensorResult<CompiledPattern> {
        let regex = build_regex(&Self::acronym_pattern(&def.word)?)?;
        Ok(Self::pattern(def, Matcher::Acronym(regex)))
    }

    fn pattern(def: &WordDefinition, matcher: Matcher) -> CompiledPattern {
        CompiledPattern {
            source_word: def.word.clone(),
            category: def.category.clone(),
            risk: def.risk,
            matcher,
        }
    }
}

fn build_regex(pattern: &str) -> CensorResult<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// 词首校验：脏数据防护，不作为安全边界
fn is_safe_start(c: char) -> bool {
    let safe = ('\u{4e00}'..='\u{9fa5}').contains(&c)
        || c.is_ascii_alphanumeric()
        || SAFE_START_SYMBOLS.contains(c);
    safe && !INVALID_START.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::library::CategoryConfig;
    use crate::utils::phonetic::PinyinTransliterator;

    fn snapshot(library: WordLibrary, custom: &[&str]) -> LibrarySnapshot {
        LibrarySnapshot {
            version: 7,
            library: Arc::new(library),
            custom_words: Arc::new(custom.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn literal_regex(word: &str) -> Regex {
        build_regex(&PatternCompiler::literal_pattern(word).unwrap()).unwrap()
    }

    #[test]
    fn test_literal_pattern_tolerates_interference() {
        let regex = literal_regex("傻逼");
        for text in ["傻逼", "傻*逼", "傻_逼", "傻 逼", "傻\u{3000}逼", "傻🤔逼", "傻|【逼】", "傻……逼", "傻\u{200B}逼"] {
            assert!(regex.is_match(text), "应命中：{}", text);
        }
        assert!(!regex.is_match("傻瓜子"));
        assert!(!regex.is_match("傻x逼"));
    }

    #[test]
    fn test_literal_pattern_case_insensitive_and_escaped() {
        let regex = literal_regex("V.X");
        assert!(regex.is_match("v . x"));
        assert!(!regex.is_match("vax"));
    }

    #[test]
    fn test_unsafe_start_rejected() {
        for word in ["*abc", "+V", "(测试", ".net", "|x", "\\d", "?", "ÿes"] {
            let err = PatternCompiler::literal_pattern(word).unwrap_err();
            assert!(matches!(err, CensorError::CompileSkip(_)), "应跳过：{}", word);
        }
        assert!(PatternCompiler::literal_pattern("@某人").is_ok());
        assert!(PatternCompiler::literal_pattern("《禁书》").is_ok());
    }

    #[test]
    fn test_phonetic_pattern_length_gate() {
        let t = PinyinTransliterator::new();
        assert!(PatternCompiler::phonetic_pattern(&t.syllables("傻逼")).unwrap().is_some());
        assert!(PatternCompiler::phonetic_pattern(&t.syllables("色")).unwrap().is_none());
        assert!(PatternCompiler::phonetic_pattern(&t.syllables("vx")).unwrap().is_none());
        assert!(PatternCompiler::phonetic_pattern(&[]).unwrap().is_none());

        let pattern = PatternCompiler::phonetic_pattern(&t.syllables("台独")).unwrap().unwrap();
        let regex = build_regex(&pattern).unwrap();
        assert!(regex.is_match("tai du"));
        assert!(regex.is_match("TAI_DU"));
        assert!(!regex.is_match("t a i d u"));
    }

    #[test]
    fn test_acronym_pattern_rejects_letters_between() {
        let regex = build_regex(&PatternCompiler::acronym_pattern("flg").unwrap()).unwrap();
        assert!(regex.is_match("f l g"));
        assert!(regex.is_match("F.L.G"));
        assert!(regex.is_match("f1l2g"));
        assert!(!regex.is_match("f a l g"));
        assert!(!regex.is_match("f中l文g"));
        assert!(PatternCompiler::acronym_pattern("f1g").is_err());
    }

    #[test]
    fn test_derive_acronym() {
        let t = PinyinTransliterator::new();
        assert_eq!(PatternCompiler::derive_acronym("法轮功", &t), Some("flg".to_string()));
        assert_eq!(PatternCompiler::derive_acronym("傻逼", &t), None);
        assert_eq!(PatternCompiler::derive_acronym("64事件", &t), None);
    }

    #[test]
    fn test_flatten_words_combos_and_custom() {
        let t = PinyinTransliterator::new();
        let library = WordLibrary::new()
            .with_category(CategoryConfig::new("abuse", 4, ["傻逼"]))
            .with_category(CategoryConfig::new("politics", 5, ["法轮功"]).with_combo(["台", "独"]));
        let custom = vec!["草泥马".to_string()];

        let defs = PatternCompiler::flatten(&library, &custom, &t);
        let summary: Vec<(&str, &str, WordKind)> = defs
            .iter()
            .map(|d| (d.word.as_str(), d.category.as_str(), d.kind))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("傻逼", "abuse", WordKind::Literal),
                ("法轮功", "politics", WordKind::Literal),
                ("flg", "politics", WordKind::Acronym),
                ("台独", "politics", WordKind::Literal),
                ("草泥马", "custom", WordKind::Literal),
                ("cnm", "custom", WordKind::Acronym),
            ]
        );
        assert!(defs.iter().filter(|d| d.category == "custom").all(|d| d.risk == CUSTOM_WORD_RISK));
    }

    #[test]
    fn test_compile_skips_dirty_words() {
        let t = PinyinTransliterator::new();
        let library = WordLibrary::new()
            .with_category(CategoryConfig::new("ad", 2, ["+V", "加微信", "*"]));
        let set = PatternCompiler::compile(&snapshot(library, &[]), &t);

        assert_eq!(set.version, 7);
        assert_eq!(set.literal.len(), 1);
        assert_eq!(set.literal[0].source_word, "加微信");
        assert_eq!(set.stats.skipped_count, 2);
        // "jia wei xin" 长度足够，生成拼音模式与缩写模式
        assert_eq!(set.phonetic.len(), 1);
        assert_eq!(set.acronym.len(), 1);
        assert_eq!(set.acronym[0].source_word, "jwx");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let t = PinyinTransliterator::new();
        let library = WordLibrary::new()
            .with_category(CategoryConfig::new("abuse", 4, ["傻逼", "他妈的"]))
            .with_category(CategoryConfig::new("politics", 5, ["法轮功"]));
        let snap = snapshot(library, &["草泥马"]);

        let describe = |set: &CompiledPatternSet| -> Vec<String> {
            set.literal
                .iter()
                .chain(&set.phonetic)
                .chain(&set.acronym)
                .map(|p| format!("{}|{}|{}", p.source_word, p.category, p.matcher.describe()))
                .collect()
        };

        let a = PatternCompiler::compile(&snap, &t);
        let b = PatternCompiler::compile(&snap, &t);
        assert_eq!(describe(&a), describe(&b));
        assert_eq!(a.stats, b.stats);
    }
}
