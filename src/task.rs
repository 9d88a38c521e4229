// 该文件是 MaizeScan 项目的一部分。
// src/task.rs - 诊断任务
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

use std::collections::HashMap;
use std::fmt::Display;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
  frame::LeafFrame,
  history::{HistoryStore, NewRecord},
  input::SourceImage,
  model::{Diagnosis, Label, Model},
  output::Render,
};

pub trait Task<I, M, O>: Sized {
  type Error;
  type Summary;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Summary, Self::Error>;
}

/// 单张图像的处理结果
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
  pub analysis_id: u64,
  pub source: String,
  pub label: Label,
  pub confidence: f64,
  pub annotated: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TaskSummary {
  pub processed: usize,
  pub skipped: usize,
  pub label_counts: HashMap<Label, usize>,
  pub outcomes: Vec<AnalysisOutcome>,
}

/// 对每张输入图像执行：推理 → 标注输出 → 写入历史
///
/// 输出为 `None` 时只诊断并记录，不写标注图像。
pub struct AnalyzeTask<H> {
  history: H,
  limit: Option<usize>,
}

impl<H: HistoryStore> AnalyzeTask<H> {
  pub fn new(history: H) -> Self {
    Self {
      history,
      limit: None,
    }
  }

  /// 最多处理的图像数
  pub fn with_limit(mut self, limit: Option<usize>) -> Self {
    self.limit = limit;
    self
  }
}

impl<I, E, M, ME, O, RE, H> Task<I, M, Option<O>> for AnalyzeTask<H>
where
  I: Iterator<Item = Result<SourceImage, E>>,
  E: Display,
  M: Model<Input = LeafFrame, Output = Diagnosis, Error = ME>,
  ME: std::error::Error + Send + Sync + 'static,
  O: Render<SourceImage, Diagnosis, Error = RE>,
  RE: std::error::Error + Send + Sync + 'static,
  H: HistoryStore,
{
  type Error = anyhow::Error;
  type Summary = TaskSummary;

  fn run_task(self, input: I, model: M, output: Option<O>) -> Result<Self::Summary, Self::Error> {
    info!("开始任务...");
    let mut summary = TaskSummary::default();

    for item in input {
      if self.limit.is_some_and(|n| summary.processed >= n) {
        info!("达到指定数量 {}, 退出任务循环", summary.processed);
        break;
      }

      let source = match item {
        Ok(source) => source,
        Err(e) => {
          warn!("跳过无法读取的图像: {}", e);
          summary.skipped += 1;
          continue;
        }
      };

      let now = std::time::Instant::now();
      let diagnosis = model.infer(&source.frame)?;
      let annotated = match &output {
        Some(output) => {
          let path = output.render_result(&source, &diagnosis).map_err(|e| {
            error!("标注输出失败: {}", e);
            e
          })?;
          path.file_name().map(|n| n.to_string_lossy().into_owned())
        }
        None => None,
      };

      let record = NewRecord::from_diagnosis(&source.name, annotated.clone(), &diagnosis);
      let analysis_id = self.history.append(record)?;

      let verdict = diagnosis.verdict;
      info!(
        "#{} {}: {} ({:.1}%)，耗时 {:.2?}",
        analysis_id,
        source.name,
        verdict.label,
        verdict.confidence * 100.0,
        now.elapsed()
      );

      *summary.label_counts.entry(verdict.label).or_default() += 1;
      summary.processed += 1;
      summary.outcomes.push(AnalysisOutcome {
        analysis_id,
        source: source.name,
        label: verdict.label,
        confidence: verdict.confidence,
        annotated,
      });
    }

    info!(
      "任务完成: 处理 {} 张，跳过 {} 张",
      summary.processed, summary.skipped
    );
    Ok(summary)
  }
}
