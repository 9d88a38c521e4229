// 该文件是 MaizeScan 项目的一部分。
// src/input/read_image_dir.rs - 图像目录输入
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
use std::vec::IntoIter;

use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use super::{SourceImage, allowed_file, read_image_file::read_source};
use crate::{FromUrl, FromUrlWithScheme, input::ImageFileInputError, utils::url_to_path};

#[derive(Error, Debug)]
pub enum ImageDirInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("{0}")]
  ImageFileError(#[from] ImageFileInputError),
}

/// 按文件名顺序遍历目录中的图像（不递归）
pub struct ImageDirInput {
  files: IntoIter<PathBuf>,
}

impl FromUrlWithScheme for ImageDirInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for ImageDirInput {
  type Error = ImageDirInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageDirInputError::SchemaMismatch);
    }
    Self::open(url_to_path(url))
  }
}

impl ImageDirInput {
  pub fn open(directory: impl Into<PathBuf>) -> Result<Self, ImageDirInputError> {
    let directory = directory.into();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(&directory)? {
      let path = entry?.path();
      if path.is_file() && allowed_file(&path) {
        files.push(path);
      } else {
        debug!("跳过非图像文件: {}", path.display());
      }
    }
    files.sort();

    Ok(Self {
      files: files.into_iter(),
    })
  }
}

impl Iterator for ImageDirInput {
  type Item = Result<SourceImage, ImageDirInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    self
      .files
      .next()
      .map(|path| read_source(&path).map_err(ImageDirInputError::from))
  }
}
