// 该文件是 MaizeScan 项目的一部分。
// src/model/color_rule.rs - 颜色规则诊断模型
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

use thiserror::Error;
use tracing::debug;

use super::{Diagnosis, Model, classify, disease_info, segment};
use crate::frame::{FrameError, LeafFrame};

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("图像错误: {0}")]
  FrameError(#[from] FrameError),
}

/// 分段 → 规则判定 → 附加病害信息。无内部状态，可在线程间共享。
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorRuleModel;

impl ColorRuleModel {
  pub fn new() -> Self {
    Self
  }

  /// 解码字节后诊断，解码失败时不计算任何占比
  pub fn diagnose_bytes(&self, bytes: &[u8]) -> Result<(LeafFrame, Diagnosis), ModelError> {
    let frame = LeafFrame::decode(bytes)?;
    let diagnosis = self.infer(&frame)?;
    Ok((frame, diagnosis))
  }
}

impl Model for ColorRuleModel {
  type Input = LeafFrame;
  type Output = Diagnosis;
  type Error = ModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let ratios = segment(input);
    let verdict = classify(&ratios);
    debug!(
      "占比 {:?} -> {} ({:.3})",
      ratios, verdict.label, verdict.confidence
    );
    Ok(Diagnosis {
      ratios,
      verdict,
      info: disease_info(verdict.label),
    })
  }
}
