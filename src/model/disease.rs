// 该文件是 MaizeScan 项目的一部分。
// src/model/disease.rs - 病害说明表
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

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
  None,
  Medium,
  High,
}

/// 病害的静态描述信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseInfo {
  pub label: Label,
  pub description: &'static str,
  pub symptoms: &'static str,
  pub treatment: &'static str,
  pub prevention: &'static str,
  pub severity: Severity,
  /// 前端配色提示: success / warning / danger
  pub ui_hint: &'static str,
}

static DISEASE_TABLE: [DiseaseInfo; 3] = [
  DiseaseInfo {
    label: Label::Healthy,
    description: "Maize plant in optimal condition with no signs of disease.",
    symptoms: "Uniform green color, intact leaves, vigorous growth.",
    treatment: "Keep current agricultural practices. Preventive monitoring.",
    prevention: "Crop rotation, certified seed, adequate irrigation.",
    severity: Severity::None,
    ui_hint: "success",
  },
  DiseaseInfo {
    label: Label::LeafBlight,
    description: "Fungal disease caused by Exserohilum turcicum that affects the foliage.",
    symptoms: "Elongated grey-brown cigar-shaped lesions.",
    treatment: "Systemic fungicides (strobilurins + triazoles).",
    prevention: "Two to three year rotation, remove harvest residue.",
    severity: Severity::High,
    ui_hint: "danger",
  },
  DiseaseInfo {
    label: Label::CommonRust,
    description: "Fungal disease caused by Puccinia sorghi that forms pustules.",
    symptoms: "Small circular orange-brown pustules.",
    treatment: "Protective (chlorothalonil) or systemic fungicides.",
    prevention: "Avoid late sowing, adequate plant spacing.",
    severity: Severity::Medium,
    ui_hint: "warning",
  },
];

fn lookup(table: &'static [DiseaseInfo], label: Label) -> &'static DiseaseInfo {
  table
    .iter()
    .find(|info| info.label == label)
    .unwrap_or_else(|| {
      warn!("UnreachableLabel: 标签 {} 没有对应的病害信息，回退到 Healthy", label);
      &DISEASE_TABLE[0]
    })
}

/// 查询标签对应的病害信息，缺失时回退到 Healthy
pub fn disease_info(label: Label) -> &'static DiseaseInfo {
  lookup(&DISEASE_TABLE, label)
}
