// 该文件是 MaizeScan 项目的一部分。
// src/input/read_image_file.rs - 单个图像文件输入
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

use thiserror::Error;
use tracing::error;
use url::Url;

use super::SourceImage;
use crate::{FromUrl, FromUrlWithScheme, frame::FrameError, utils::url_to_path};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Invalid image {0}: {1}")]
  InvalidImage(String, FrameError),
}

/// 读取并解码一个图像文件
pub(super) fn read_source(path: &Path) -> Result<SourceImage, ImageFileInputError> {
  let bytes = std::fs::read(path)?;
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  SourceImage::from_bytes(&name, &bytes)
    .map_err(|e| ImageFileInputError::InvalidImage(path.display().to_string(), e))
}

pub struct ImageFileInput {
  path: Option<PathBuf>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url_to_path(url);
    if !path.is_file() {
      return Err(ImageFileInputError::IoError(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} 不是文件", path.display()),
      )));
    }

    Ok(ImageFileInput { path: Some(path) })
  }
}

impl ImageFileInput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: Some(path.into()),
    }
  }
}

impl Iterator for ImageFileInput {
  type Item = Result<SourceImage, ImageFileInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    self.path.take().map(|path| read_source(&path))
  }
}
