// 该文件是 MaizeScan 项目的一部分。
// src/model.rs - 诊断模型
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 叶片健康状态，封闭枚举，不存在“未知”
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
  Healthy,
  LeafBlight,
  CommonRust,
}

impl Label {
  pub const ALL: [Label; 3] = [Label::Healthy, Label::LeafBlight, Label::CommonRust];

  pub fn as_str(&self) -> &'static str {
    match self {
      Label::Healthy => "Healthy",
      Label::LeafBlight => "LeafBlight",
      Label::CommonRust => "CommonRust",
    }
  }
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知标签: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
  type Err = UnknownLabel;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Label::ALL
      .into_iter()
      .find(|label| label.as_str() == s)
      .ok_or_else(|| UnknownLabel(s.to_string()))
  }
}

/// 诊断结论：标签与启发式置信度
///
/// 置信度是阈值规则推出的启发式分数，不是经过校准的概率。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
  pub label: Label,
  pub confidence: f64,
}

/// 一次推理的完整输出
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
  pub ratios: ColorRatios,
  pub verdict: Verdict,
  pub info: &'static DiseaseInfo,
}

mod classify;
mod color_rule;
mod disease;
mod hsv;
mod segment;

pub use self::classify::{RULES, Rule, classify};
pub use self::color_rule::{ColorRuleModel, ModelError};
pub use self::disease::{DiseaseInfo, Severity, disease_info};
pub use self::hsv::{Hsv, rgb_to_hsv};
pub use self::segment::{BROWN_BAND, ColorBand, ColorRatios, HEALTHY_BAND, YELLOW_BAND, segment};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_label_names() {
    assert_eq!(Label::LeafBlight.to_string(), "LeafBlight");
    assert_eq!(format!("{:<8}|", Label::Healthy), "Healthy |");
    assert_eq!(serde_json::to_string(&Label::CommonRust).unwrap(), "\"CommonRust\"");
  }

  #[test]
  fn test_label_parses_its_own_name() {
    for label in Label::ALL {
      assert_eq!(label.as_str().parse::<Label>(), Ok(label));
    }
    assert_eq!("Rust".parse::<Label>(), Err(UnknownLabel("Rust".to_string())));
  }
}
