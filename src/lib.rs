//! textcensor - 用户提交文本的敏感词模糊匹配引擎
//! 支持干扰字符、拼音与首字母缩写变体检测

// 导出全局错误类型
pub use self::error::{CensorError, CensorResult};

// 导出配置模块
pub use self::config::{CensorConfig, ConfigManager, CustomConfigBuilder, DEFAULT_LIBRARY_TTL};

// 导出词库模块核心接口
pub use self::library::{
    CategoryConfig, WordDefinition, WordKind, WordLibrary, LibrarySnapshot,
    LibraryFetcher, HttpLibraryFetcher, FileLibraryFetcher, StaticLibraryFetcher,
    LibraryStatus, WordLibraryStore,
};

// 导出编译模块核心接口
pub use self::compiler::{
    CompiledPattern, CompiledPatternSet, CompileStats, Matcher, PatternCompiler, PatternKind
};

// 导出工具模块核心接口
pub use self::utils::{PinyinTransliterator, Transliterator, TextMasker};

// 导出远程审核接口
pub use self::moderation::{HttpRemoteModerator, NoopModerator, RemoteModerator, RemoteSignal};

// 导出检测模块核心接口
pub use self::detector::{
    TextCensor,
    Verdict,
    MatchResult,
    RiskSynthesizer,
    ScanEngine,
    init_text_censor,
    init_text_censor_with_config,
    get_global_censor,
    check_text,
    filter_text,
};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod library;
pub mod compiler;
pub mod utils;
pub mod moderation;
pub mod detector;
