//! 通用工具：拼音转写与文本打码
pub mod phonetic;
pub mod text_masker;

pub use self::phonetic::{PinyinTransliterator, Transliterator};
pub use self::text_masker::TextMasker;
