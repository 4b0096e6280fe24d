//! 全局检测器单例管理
//! 业务代码可直接持有 TextCensor；这里只提供进程级的便捷入口
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::detector::TextCensor;
use super::synthesizer::Verdict;
use crate::config::{CensorConfig, ConfigManager};
use crate::error::{CensorError, CensorResult};
use crate::utils::text_masker::DEFAULT_MASK;

/// 全局检测器实例
static GLOBAL_CENSOR: Lazy<OnceCell<Arc<TextCensor>>> = Lazy::new(OnceCell::new);

/// 初始化全局检测器（默认配置）
pub async fn init_text_censor() -> CensorResult<()> {
    init_text_censor_with_config(ConfigManager::get_default()).await
}

/// 带自定义配置初始化全局检测器，重复调用不生效
pub async fn init_text_censor_with_config(config: CensorConfig) -> CensorResult<()> {
    GLOBAL_CENSOR
        .get_or_try_init(|| async { TextCensor::new(config).map(Arc::new) })
        .await
        .map_err(|e| CensorError::CensorInitError(e.to_string()))?;
    Ok(())
}

/// 获取全局检测器
pub fn get_global_censor() -> CensorResult<Arc<TextCensor>> {
    GLOBAL_CENSOR
        .get()
        .cloned()
        .ok_or_else(|| CensorError::CensorNotInitialized("请先调用 init_text_censor".to_string()))
}

/// 使用全局检测器检测文本
pub async fn check_text(text: &str) -> CensorResult<Verdict> {
    let censor = get_global_censor()?;
    Ok(censor.check(text).await)
}

/// 使用全局检测器打码（默认掩码 `*`）
pub async fn filter_text(text: &str, mask: Option<&str>) -> CensorResult<String> {
    let censor = get_global_censor()?;
    Ok(censor.filter(text, mask.unwrap_or(DEFAULT_MASK)).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_global_lifecycle() {
        // 未初始化前的调用在同一测试内验证，避免与其它测试竞争
        if GLOBAL_CENSOR.get().is_none() {
            assert!(matches!(
                check_text("测试").await,
                Err(CensorError::CensorNotInitialized(_))
            ));
        }

        let config = ConfigManager::custom()
            .api_base_url("http://127.0.0.1:9")
            .custom_words(["违禁词"])
            .build();
        init_text_censor_with_config(config).await.unwrap();
        // 重复初始化无副作用
        init_text_censor().await.unwrap();

        let censor = get_global_censor().unwrap();
        assert!(censor.custom_words().await.contains(&"违禁词".to_string()));
    }
}
