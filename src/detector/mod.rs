//! 检测模块：扫描、风险合成与对外检测接口
pub mod analyzer;
pub mod synthesizer;
pub mod detector;
pub mod global;

// 导出核心接口
pub use self::analyzer::{AcronymScanner, LiteralScanner, MatchResult, PhoneticScanner, ScanEngine};
pub use self::synthesizer::{RiskSynthesizer, Verdict, GENERIC_REASON};
pub use self::detector::TextCensor;
pub use self::global::{
    check_text, filter_text, get_global_censor, init_text_censor, init_text_censor_with_config,
};
