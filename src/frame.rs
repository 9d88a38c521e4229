// 该文件是 MaizeScan 项目的一部分。
// src/frame.rs - 叶片图像帧定义
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

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use thiserror::Error;

const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum FrameError {
  #[error("无效图像: {0}")]
  InvalidImage(String),
  #[error("图像编码错误: {0}")]
  EncodeError(#[from] image::ImageError),
}

/// 已解码的 RGB 叶片图像，宽高均不为零
#[derive(Debug, Clone, PartialEq)]
pub struct LeafFrame {
  image: RgbImage,
}

impl TryFrom<RgbImage> for LeafFrame {
  type Error = FrameError;

  fn try_from(image: RgbImage) -> Result<Self, Self::Error> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
      return Err(FrameError::InvalidImage(format!(
        "图像尺寸为零: {}x{}",
        width, height
      )));
    }
    Ok(Self { image })
  }
}

impl LeafFrame {
  /// 从任意编码的字节解码，格式由内容推断
  pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
    let image = image::load_from_memory(bytes)
      .map_err(|e| FrameError::InvalidImage(e.to_string()))?;
    Self::try_from(image.to_rgb8())
  }

  pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, FrameError> {
    let mut buffer = Cursor::new(Vec::new());
    self.image.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn pixel_count(&self) -> usize {
    self.image.width() as usize * self.image.height() as usize
  }

  pub fn as_rgb_image(&self) -> &RgbImage {
    &self.image
  }

  pub fn into_rgb_image(self) -> RgbImage {
    self.image
  }
}
