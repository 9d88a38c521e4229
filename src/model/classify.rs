// 该文件是 MaizeScan 项目的一部分。
// src/model/classify.rs - 阈值优先级规则
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

use super::{ColorRatios, Label, Verdict};

/// 一条判定规则：条件、标签和置信度公式
pub struct Rule {
  pub name: &'static str,
  pub applies: fn(&ColorRatios) -> bool,
  pub label: Label,
  pub confidence: fn(&ColorRatios) -> f64,
}

fn brown_dominates(r: &ColorRatios) -> bool {
  r.brown_ratio > 0.12
}

fn blight_confidence(r: &ColorRatios) -> f64 {
  (0.85 + r.brown_ratio).min(0.95)
}

fn yellow_dominates(r: &ColorRatios) -> bool {
  r.yellow_ratio > 0.18
}

fn rust_confidence(r: &ColorRatios) -> f64 {
  (0.75 + r.yellow_ratio).min(0.90)
}

fn green_dominates(r: &ColorRatios) -> bool {
  r.healthy_ratio > 0.75
}

fn healthy_confidence(r: &ColorRatios) -> f64 {
  (0.90 + r.healthy_ratio / 10.0).min(0.98)
}

/// 按顺序求值，首个命中者生效
pub const RULES: [Rule; 3] = [
  Rule {
    name: "brown",
    applies: brown_dominates,
    label: Label::LeafBlight,
    confidence: blight_confidence,
  },
  Rule {
    name: "yellow",
    applies: yellow_dominates,
    label: Label::CommonRust,
    confidence: rust_confidence,
  },
  Rule {
    name: "healthy",
    applies: green_dominates,
    label: Label::Healthy,
    confidence: healthy_confidence,
  },
];

/// 没有色带占优时的默认结论
const FALLBACK: Verdict = Verdict {
  label: Label::Healthy,
  confidence: 0.80,
};

pub fn classify(ratios: &ColorRatios) -> Verdict {
  RULES
    .iter()
    .find(|rule| (rule.applies)(ratios))
    .map(|rule| Verdict {
      label: rule.label,
      confidence: (rule.confidence)(ratios),
    })
    .unwrap_or(FALLBACK)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ratios(healthy: f64, brown: f64, yellow: f64) -> ColorRatios {
    ColorRatios {
      healthy_ratio: healthy,
      brown_ratio: brown,
      yellow_ratio: yellow,
    }
  }

  #[test]
  fn test_blight_scenario() {
    let v = classify(&ratios(0.2, 0.20, 0.05));
    assert_eq!(v.label, Label::LeafBlight);
    assert_eq!(v.confidence, 0.95);
  }

  #[test]
  fn test_rust_scenario() {
    let v = classify(&ratios(0.1, 0.05, 0.25));
    assert_eq!(v.label, Label::CommonRust);
    assert_eq!(v.confidence, 0.90);
  }

  #[test]
  fn test_healthy_scenario() {
    let v = classify(&ratios(0.80, 0.0, 0.0));
    assert_eq!(v.label, Label::Healthy);
    assert_eq!(v.confidence, 0.98);
  }

  #[test]
  fn test_fallback_is_exact() {
    let v = classify(&ratios(0.5, 0.0, 0.0));
    assert_eq!(v, Verdict { label: Label::Healthy, confidence: 0.80 });
  }

  #[test]
  fn test_brown_wins_over_yellow() {
    // 黄色占比更高也不影响优先级
    let v = classify(&ratios(0.0, 0.13, 0.60));
    assert_eq!(v.label, Label::LeafBlight);
    let v = classify(&ratios(0.9, 0.5, 0.19));
    assert_eq!(v.label, Label::LeafBlight);
  }

  #[test]
  fn test_thresholds_are_strict() {
    assert_eq!(classify(&ratios(0.0, 0.12, 0.0)), FALLBACK);
    assert_eq!(classify(&ratios(0.0, 0.0, 0.18)), FALLBACK);
    assert_eq!(classify(&ratios(0.75, 0.0, 0.0)), FALLBACK);
  }

  #[test]
  fn test_uncapped_confidence() {
    let v = classify(&ratios(0.0, 0.0, 0.19));
    assert_eq!(v.label, Label::CommonRust);
    assert!((v.confidence - 0.94).abs() < 1e-12);
    let v = classify(&ratios(0.0, 0.121, 0.0));
    assert_eq!(v.confidence, 0.95);
  }

  #[test]
  fn test_confidence_monotone_and_capped() {
    let caps = [0.95, 0.90, 0.98];
    for (rule, cap) in RULES.iter().zip(caps) {
      let mut last = f64::MIN;
      for step in 0..=100 {
        let x = step as f64 / 100.0;
        let r = match rule.name {
          "brown" => ratios(0.0, x, 0.0),
          "yellow" => ratios(0.0, 0.0, x),
          _ => ratios(x, 0.0, 0.0),
        };
        let c = (rule.confidence)(&r);
        assert!(c >= last, "{} 不单调", rule.name);
        assert!(c <= cap, "{} 超出上限", rule.name);
        last = c;
      }
    }
  }

  #[test]
  fn test_every_output_is_bounded() {
    for h in 0..=10 {
      for b in 0..=10 {
        for y in 0..=10 {
          let v = classify(&ratios(h as f64 / 10.0, b as f64 / 10.0, y as f64 / 10.0));
          assert!((0.0..=1.0).contains(&v.confidence));
          assert!(Label::ALL.contains(&v.label));
        }
      }
    }
  }
}
