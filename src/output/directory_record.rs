// 该文件是 MaizeScan 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Datelike, Utc};
use image::{ImageFormat, RgbImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  FromUrl, FromUrlWithScheme,
  input::SourceImage,
  model::Diagnosis,
  output::{
    Render,
    draw::{Draw, DrawError},
  },
  utils::{has_query_flag, url_to_path},
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("绘制错误: {0}")]
  DrawError(#[from] DrawError),
  #[error("计数器锁已损坏")]
  Poisoned,
  #[error("无法在 {0} 中找到未被占用的文件名")]
  NameExhausted(PathBuf),
}

// 文件名被占用时换一个序号重试的次数
const MAX_NAME_ATTEMPTS: usize = 64;

/// 按日期分目录保存标注图像，文件名带微秒时间戳和序号，互不覆盖
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: Draw<'static>,
  counter: Mutex<u64>,
  keep_original: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    Ok(Self::new(url_to_path(uri))?.keep_original(has_query_flag(uri, "original")))
  }
}

/// 输出只写 png/jpeg，其他格式改存为 png
fn writable_name(source_name: &str) -> String {
  let source = Path::new(source_name);
  let is_writable = source
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| ["png", "jpg", "jpeg"].iter().any(|x| e.eq_ignore_ascii_case(x)))
    .unwrap_or(false);
  if is_writable {
    source_name.to_string()
  } else {
    source.with_extension("png").to_string_lossy().into_owned()
  }
}

fn annotated_name(stamp: &str, id: u64, source_name: &str) -> String {
  format!("annotated_{}_{:04X}_{}", stamp, id, writable_name(source_name))
}

impl DirectoryRecordOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Result<Self, DirectoryRecordOutputError> {
    Ok(DirectoryRecordOutput {
      directory: directory.into(),
      draw: Draw::new()?,
      counter: Mutex::new(0),
      keep_original: false,
    })
  }

  /// 同时保存未标注的原图
  pub fn keep_original(mut self, keep_original: bool) -> Self {
    self.keep_original = keep_original;
    self
  }

  fn next_id(&self) -> Result<u64, DirectoryRecordOutputError> {
    let mut counter = self
      .counter
      .lock()
      .map_err(|_| DirectoryRecordOutputError::Poisoned)?;
    *counter += 1;
    Ok(*counter)
  }

  /// 以 `create_new` 占用标注文件名；其他实例或进程已占用时换下一个序号
  fn claim_annotated(
    &self,
    directory: &Path,
    stamp: &str,
    source_name: &str,
  ) -> Result<(u64, PathBuf, File), DirectoryRecordOutputError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
      let id = self.next_id()?;
      let path = directory.join(annotated_name(stamp, id, source_name));
      match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => return Ok((id, path, file)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
          debug!("文件名已被占用: {}", path.display());
        }
        Err(e) => return Err(e.into()),
      }
    }
    Err(DirectoryRecordOutputError::NameExhausted(directory.to_path_buf()))
  }

  fn day_directory(&self, now: &DateTime<Utc>) -> Result<PathBuf, DirectoryRecordOutputError> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }
    Ok(directory)
  }
}

fn write_image(image: &RgbImage, path: &Path, file: File) -> Result<(), DirectoryRecordOutputError> {
  let format = ImageFormat::from_path(path)?;
  let mut writer = BufWriter::new(file);
  image.write_to(&mut writer, format)?;
  writer.flush()?;
  Ok(())
}

impl Render<SourceImage, Diagnosis> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &SourceImage, result: &Diagnosis) -> Result<PathBuf, Self::Error> {
    let now = Utc::now();
    let directory = self.day_directory(&now)?;
    let stamp = now.format("%Y%m%d_%H%M%S_%6f").to_string();
    let (id, path, file) = self.claim_annotated(&directory, &stamp, &frame.name)?;

    if self.keep_original {
      // 标注文件名已独占，同一时间戳与序号的原图名不会与他人冲突
      let original = directory.join(format!("{}_{:04X}_{}", stamp, id, writable_name(&frame.name)));
      let original_file = OpenOptions::new().write(true).create_new(true).open(&original)?;
      write_image(frame.frame.as_rgb_image(), &original, original_file)?;
    }

    let image = self.draw.annotate(&frame.frame, &result.verdict);
    write_image(&image, &path, file)?;
    info!("保存标注图像: {}", path.display());

    Ok(path)
  }
}
