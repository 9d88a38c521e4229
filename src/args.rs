// 该文件是 MaizeScan 项目的一部分。
// src/args.rs - 命令行参数
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

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

/// MaizeScan 玉米叶片颜色诊断
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 诊断图像并保存标注结果
  Analyze {
    /// 输入来源
    /// - 单个图像: image:///path/leaf.jpg
    /// - 图像目录: folder:///path/leaves
    #[arg(long, value_name = "SOURCE")]
    input: Url,

    /// 标注图像输出，省略时只诊断并记录
    /// - 指定文件: image:///path/annotated.png（批量输入时依次编号）
    /// - 按日期归档: folder:///path/uploads[?original]
    #[arg(long, value_name = "OUTPUT")]
    output: Option<Url>,

    /// 历史记录数据库（SQLite）
    #[arg(long, default_value = "database/analysis.db", value_name = "FILE")]
    history: PathBuf,

    /// 最多处理的图像数
    #[arg(long, value_name = "COUNT")]
    limit: Option<usize>,

    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,
  },
  /// 查看最近的诊断记录
  History {
    /// 历史记录数据库（SQLite）
    #[arg(long, default_value = "database/analysis.db", value_name = "FILE")]
    history: PathBuf,

    /// 显示条数
    #[arg(long, default_value = "20", value_name = "COUNT")]
    limit: usize,

    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,
  },
}
