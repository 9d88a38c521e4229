// 该文件是 MaizeScan 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::SourceImage,
  model::Diagnosis,
  output::{
    Render,
    draw::{Draw, DrawError},
    ensure_parent,
  },
  utils::url_to_path,
};

/// 把标注图像写到指定路径
///
/// 第一张写到原路径，同一实例之后的图像依次写到 `<stem>_0001.<ext>`、`<stem>_0002.<ext>` ...，
/// 批量输入不会互相覆盖。
pub struct SaveImageFileOutput {
  path: PathBuf,
  draw: Draw<'static>,
  rendered: AtomicU64,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("绘制错误: {0}")]
  DrawError(#[from] DrawError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Self::new(url_to_path(uri))
  }
}

impl SaveImageFileOutput {
  pub fn new(path: impl Into<PathBuf>) -> Result<Self, SaveImageFileError> {
    Ok(SaveImageFileOutput {
      path: path.into(),
      draw: Draw::new()?,
      rendered: AtomicU64::new(0),
    })
  }
}

fn numbered_path(path: &Path, index: u64) -> PathBuf {
  if index == 0 {
    return path.to_path_buf();
  }
  let stem = path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  let name = match path.extension() {
    Some(ext) => format!("{}_{:04}.{}", stem, index, ext.to_string_lossy()),
    None => format!("{}_{:04}", stem, index),
  };
  path.with_file_name(name)
}

impl Render<SourceImage, Diagnosis> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, frame: &SourceImage, result: &Diagnosis) -> Result<PathBuf, Self::Error> {
    let image = self.draw.annotate(&frame.frame, &result.verdict);
    let path = numbered_path(&self.path, self.rendered.fetch_add(1, Ordering::Relaxed));
    ensure_parent(&path)?;
    image.save(&path)?;
    info!("保存标注图像到文件: {} ({})", path.display(), frame.name);
    Ok(path)
  }
}
