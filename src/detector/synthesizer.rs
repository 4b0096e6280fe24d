//! 风险合成：将命中列表归纳为是否有风险以及一条面向用户的提示语
use serde::Serialize;

use super::analyzer::MatchResult;
use crate::moderation::RemoteSignal;

/// 无具体分类时的提示语
pub const GENERIC_REASON: &str = "包含敏感内容，请修改后再试";

/// 检测结论
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Verdict {
    pub risk: bool,
    pub matches: Vec<MatchResult>,
    pub reason: Option<String>,
}

impl Verdict {
    /// 无风险结论
    pub fn safe() -> Self {
        Self::default()
    }

    /// 命中中的最高风险等级，无命中为 0
    pub fn max_risk(&self) -> u8 {
        self.matches.iter().map(|m| m.risk).max().unwrap_or(0)
    }

    /// 命中分类（去重，按首次出现顺序）
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for m in &self.matches {
            if !categories.contains(&m.category) {
                categories.push(m.category.clone());
            }
        }
        categories
    }
}

/// 风险合成器
pub struct RiskSynthesizer;

impl RiskSynthesizer {
    /// 本地命中 -> 结论；提示语只取第一条命中的分类
    pub fn synthesize(matches: Vec<MatchResult>) -> Verdict {
        let Some(first) = matches.first() else {
            return Verdict::safe();
        };

        let reason = format!("包含{}内容，请修改后再试", Self::category_label(&first.category));
        Verdict {
            risk: true,
            matches,
            reason: Some(reason),
        }
    }

    /// 远程审核判定有风险时使用其标签
    pub fn from_remote(signal: &RemoteSignal) -> Verdict {
        if !signal.is_risky {
            return Verdict::safe();
        }

        let label = signal.label.trim();
        let reason = if label.is_empty() {
            GENERIC_REASON.to_string()
        } else {
            format!("包含{}，请修改后再试", label)
        };
        Verdict {
            risk: true,
            matches: Vec::new(),
            reason: Some(reason),
        }
    }

    /// 分类 -> 中文标签
    pub fn category_label(category: &str) -> &'static str {
        match category {
            "politics" => "政治",
            "porn" => "色情",
            "gambling" => "赌博",
            "violence" => "暴力",
            "illegal" => "违法",
            "abuse" => "辱骂",
            "ad" => "广告",
            "spam" => "垃圾",
            "custom" => "自定义",
            _ => "敏感",
        }
    }
}
