//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum CensorError {
    // 词库相关错误
    #[error("敏感词库拉取失败：{0}")]
    LibraryFetchError(String),
    #[error("敏感词库解析失败：{0}")]
    LibraryParseError(String),

    // 内容安全接口错误
    #[error("远程内容审核失败：{0}")]
    ModerationError(String),

    // 编译相关错误
    #[error("敏感词跳过编译：{0}")]
    CompileSkip(String),
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),

    // 检测器相关错误
    #[error("检测器未初始化：{0}")]
    CensorNotInitialized(String),
    #[error("检测器初始化失败：{0}")]
    CensorInitError(String),

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

// 全局Result类型
pub type CensorResult<T> = Result<T, CensorError>;
