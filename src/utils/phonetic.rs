//! 拼音转写工具
//! 将中文文本转换为空格分隔的无声调拼音音节，非中文片段原样保留（小写）

use pinyin::ToPinyin;

/// 文本转写接口
pub trait Transliterator: Send + Sync {
    /// 转为空格分隔的音节串
    fn to_phonetic(&self, text: &str) -> String;

    /// 按音节拆分
    fn syllables(&self, text: &str) -> Vec<String> {
        self.to_phonetic(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// 基于 pinyin crate 的拼音转写
///
/// - 每个汉字输出一个音节（多音字取常用读音）
/// - 连续的字母/数字合并为一个片段并转小写
/// - 空白作为分隔，其它符号各自成为一个片段
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinTransliterator;

impl PinyinTransliterator {
    pub fn new() -> Self {
        Self
    }
}

impl Transliterator for PinyinTransliterator {
    fn to_phonetic(&self, text: &str) -> String {
        let mut tokens: Vec<String> = Vec::new();
        let mut run = String::new();

        for ch in text.chars() {
            if let Some(py) = ch.to_pinyin() {
                flush_run(&mut run, &mut tokens);
                tokens.push(py.plain().to_string());
            } else if ch.is_whitespace() {
                flush_run(&mut run, &mut tokens);
            } else if ch.is_alphanumeric() {
                run.extend(ch.to_lowercase());
            } else {
                flush_run(&mut run, &mut tokens);
                tokens.push(ch.to_string());
            }
        }
        flush_run(&mut run, &mut tokens);

        tokens.join(" ")
    }
}

fn flush_run(run: &mut String, tokens: &mut Vec<String>) {
    if !run.is_empty() {
        tokens.push(std::mem::take(run));
    }
}

/// 取每个音节首字母拼接为缩写（小写）
pub fn acronym_of(syllables: &[String]) -> String {
    syllables
        .iter()
        .filter_map(|s| s.chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_to_syllables() {
        let t = PinyinTransliterator::new();
        assert_eq!(t.to_phonetic("傻逼"), "sha bi");
        assert_eq!(t.to_phonetic("法轮功"), "fa lun gong");
        assert_eq!(t.syllables("台独"), vec!["tai".to_string(), "du".to_string()]);
    }

    #[test]
    fn test_mixed_text_keeps_runs_and_symbols() {
        let t = PinyinTransliterator::new();
        assert_eq!(t.to_phonetic("VX加我"), "vx jia wo");
        assert_eq!(t.to_phonetic("傻 * 逼"), "sha * bi");
        assert_eq!(t.to_phonetic("64事件"), "64 shi jian");
    }

    #[test]
    fn test_idempotent_on_output() {
        let t = PinyinTransliterator::new();
        let once = t.to_phonetic("草泥马 hello, 64");
        assert_eq!(t.to_phonetic(&once), once);
    }

    #[test]
    fn test_empty_and_blank() {
        let t = PinyinTransliterator::new();
        assert_eq!(t.to_phonetic(""), "");
        assert_eq!(t.to_phonetic(" \u{3000} "), "");
    }

    #[test]
    fn test_acronym_of() {
        let t = PinyinTransliterator::new();
        assert_eq!(acronym_of(&t.syllables("法轮功")), "flg");
        assert_eq!(acronym_of(&t.syllables("傻逼")), "sb");
        assert_eq!(acronym_of(&[]), "");
    }
}
