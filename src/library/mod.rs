//! 词库模块：负责敏感词库的数据模型、拉取与缓存
pub mod model;
pub mod loader;
pub mod store;

// 导出核心接口
pub use self::model::{
    CategoryConfig, LibrarySnapshot, WordDefinition, WordKind, WordLibrary,
    CUSTOM_CATEGORY, CUSTOM_WORD_RISK, MAX_RISK, MIN_RISK,
};
pub use self::loader::{FileLibraryFetcher, HttpLibraryFetcher, LibraryFetcher, StaticLibraryFetcher};
pub use self::store::{LibraryStatus, WordLibraryStore};
