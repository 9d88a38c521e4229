// 该文件是 MaizeScan 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use args::{Args, Command};
use maizescan::{
  FromUrl,
  history::{HistoryStore, SqliteHistory},
  input::InputWrapper,
  model::ColorRuleModel,
  output::OutputWrapper,
  task::{AnalyzeTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  match args.command {
    Command::Analyze {
      input,
      output,
      history,
      limit,
      json,
    } => {
      info!("输入来源: {}", input);
      match &output {
        Some(output) => info!("输出路径: {}", output),
        None => info!("未指定输出，不保存标注图像"),
      }

      let input = InputWrapper::from_url(&input)?;
      let output = output.as_ref().map(OutputWrapper::from_url).transpose()?;
      let history = SqliteHistory::open(&history)?;

      let summary = AnalyzeTask::new(&history)
        .with_limit(limit)
        .run_task(input, ColorRuleModel::new(), output)?;

      if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
      } else {
        for outcome in &summary.outcomes {
          println!(
            "#{:<4} {:<32} {:<10} {:>5.1}%  {}",
            outcome.analysis_id,
            outcome.source,
            outcome.label,
            outcome.confidence * 100.0,
            outcome.annotated.as_deref().unwrap_or("-")
          );
        }
        println!(
          "处理完成: {} 张，跳过 {} 张",
          summary.processed, summary.skipped
        );
      }
    }
    Command::History {
      history,
      limit,
      json,
    } => {
      let history = SqliteHistory::open(&history)?;
      let records = history.list_recent(limit)?;

      if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
      } else {
        for record in &records {
          println!(
            "#{:<4} {} {:<32} {:<10} {:>5.1}%  {:?}",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.source_filename,
            record.verdict.label,
            record.verdict.confidence * 100.0,
            record.disease_info.severity
          );
        }
      }
    }
  }

  Ok(())
}
