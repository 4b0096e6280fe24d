//! 文本打码工具
//! 将命中区间内的字符替换为掩码，保持字符数不变

use std::ops::Range;

/// 默认掩码
pub const DEFAULT_MASK: &str = "*";

/// 文本打码工具
pub struct TextMasker;

impl TextMasker {
    /// 按字节区间打码
    /// 区间内每个字符替换为掩码中的一个字符（掩码循环使用），区间外字符原样保留
    pub fn mask(text: &str, spans: &[Range<usize>], mask: &str) -> String {
        let mask_chars: Vec<char> = if mask.is_empty() {
            DEFAULT_MASK.chars().collect()
        } else {
            mask.chars().collect()
        };

        let merged = Self::merge(spans);
        let mut pending = merged.iter().peekable();
        let mut offset_in_span = 0usize;
        let mut masked = String::with_capacity(text.len());

        for (pos, ch) in text.char_indices() {
            while pending.peek().is_some_and(|span| pos >= span.end) {
                pending.next();
                offset_in_span = 0;
            }

            match pending.peek() {
                Some(span) if pos >= span.start => {
                    masked.push(mask_chars[offset_in_span % mask_chars.len()]);
                    offset_in_span += 1;
                }
                _ => masked.push(ch),
            }
        }

        masked
    }

    /// 合并重叠区间（按起点排序）
    pub fn merge(spans: &[Range<usize>]) -> Vec<Range<usize>> {
        let mut sorted: Vec<Range<usize>> = spans.iter().filter(|s| !s.is_empty()).cloned().collect();
        sorted.sort_by_key(|s| (s.start, s.end));

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(sorted.len());
        for span in sorted {
            match merged.last_mut() {
                Some(last) if span.start < last.end => last.end = last.end.max(span.end),
                _ => merged.push(span),
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_preserves_char_count() {
        let text = "你是个傻*逼吧";
        let start = text.find('傻').unwrap();
        let end = text.find('逼').unwrap() + '逼'.len_utf8();

        let masked = TextMasker::mask(text, &[start..end], "*");
        assert_eq!(masked, "你是个***吧");
        assert_eq!(masked.chars().count(), text.chars().count());
    }

    #[test]
    fn test_mask_overlapping_and_cycled() {
        let text = "abcdefgh";
        let masked = TextMasker::mask(text, &[1..4, 3..6], "xy");
        assert_eq!(masked, "axyxyxgh");
    }

    #[test]
    fn test_mask_separate_spans_restart_cycle() {
        let masked = TextMasker::mask("abcdef", &[0..2, 4..6], "xy");
        assert_eq!(masked, "xycdxy");
    }

    #[test]
    fn test_empty_mask_falls_back() {
        assert_eq!(TextMasker::mask("abc", &[0..3], ""), "***");
        assert_eq!(TextMasker::mask("abc", &[], "#"), "abc");
    }

    #[test]
    fn test_merge() {
        assert_eq!(TextMasker::merge(&[5..7, 0..2, 1..3, 4..4]), vec![0..3, 5..7]);
        assert_eq!(TextMasker::merge(&[0..2, 2..4]), vec![0..2, 2..4]);
    }
}
