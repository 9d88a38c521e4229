// 该文件是 MaizeScan 项目的一部分。
// src/input.rs - 图像输入
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

use std::path::Path;

use thiserror::Error;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{FrameError, LeafFrame},
};

/// 允许的图像扩展名
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub fn allowed_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| {
      ALLOWED_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
    .unwrap_or(false)
}

/// 一张待分析的图像及其来源文件名
#[derive(Debug, Clone)]
pub struct SourceImage {
  pub name: String,
  pub frame: LeafFrame,
}

impl SourceImage {
  /// 只保留文件名部分，丢弃目录
  pub fn new(name: &str, frame: LeafFrame) -> Self {
    let name = Path::new(name)
      .file_name()
      .and_then(|n| n.to_str())
      .filter(|n| !n.is_empty())
      .unwrap_or("image.png")
      .to_string();
    Self { name, frame }
  }

  pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, FrameError> {
    Ok(Self::new(name, LeafFrame::decode(bytes)?))
  }
}

mod read_image_dir;
mod read_image_file;

pub use self::read_image_dir::{ImageDirInput, ImageDirInputError};
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("Image file input error: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("Image directory input error: {0}")]
  ImageDirInputError(#[from] ImageDirInputError),
  #[error("URI scheme mismatch")]
  SchemeMismatch,
}

pub enum InputWrapper {
  ReadImageFile(ImageFileInput),
  ReadImageDir(ImageDirInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ImageFileInput::SCHEME => Ok(InputWrapper::ReadImageFile(ImageFileInput::from_url(url)?)),
      ImageDirInput::SCHEME => Ok(InputWrapper::ReadImageDir(ImageDirInput::from_url(url)?)),
      _ => Err(InputError::SchemeMismatch),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = Result<SourceImage, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::ReadImageFile(input) => input.next().map(|r| r.map_err(InputError::from)),
      InputWrapper::ReadImageDir(input) => input.next().map(|r| r.map_err(InputError::from)),
    }
  }
}
