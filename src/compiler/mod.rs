//! 编译模块：将扁平化后的敏感词编译为可执行的模糊匹配模式
pub mod pattern;
pub mod compiler;

pub use self::pattern::{CompileStats, CompiledPattern, CompiledPatternSet, Matcher, PatternKind};
pub use self::compiler::{PatternCompiler, ACRONYM_INTERFERE_CLASS, INTERFERE_CLASS};
