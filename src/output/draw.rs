// 该文件是 MaizeScan 项目的一部分。
// src/output/draw.rs - 诊断结论标注
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

use ab_glyph::{FontRef, InvalidFont, PxScale};
use image::{Rgb, RgbImage, imageops::FilterType};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use thiserror::Error;

use crate::{frame::LeafFrame, model::Verdict};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 22.0; // 约等于 0.7 倍的 Hershey 字体
const LABEL_STROKE: i32 = 2; // 笔画宽度（像素）
const PLATE_MARGIN: i32 = 10; // 底板距左上角以及文字左右的间距
const PLATE_COLOR: [u8; 3] = [40, 40, 40];
const TEXT_COLOR: [u8; 3] = [255, 255, 255];
/// 超过该宽度的图像先按比例缩小
pub const MAX_ANNOTATED_WIDTH: u32 = 800;

static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("字体加载失败: {0}")]
  FontError(#[from] InvalidFont),
}

/// 生成标注文字，例如 `LeafBlight (87.3%)`
pub fn caption(verdict: &Verdict) -> String {
  format!("{} ({:.1}%)", verdict.label, verdict.confidence * 100.0)
}

pub struct Draw<'a> {
  font_size: f32,
  font: FontRef<'a>,
  max_width: u32,
  plate_color: [u8; 3],
  text_color: [u8; 3],
}

impl Draw<'static> {
  /// 使用内嵌的 DejaVu Sans 字体
  pub fn new() -> Result<Self, DrawError> {
    let font = FontRef::try_from_slice(EMBEDDED_FONT)?;
    Ok(Self::with_font(font))
  }
}

impl<'a> Draw<'a> {
  pub fn with_font(font: FontRef<'a>) -> Self {
    Self {
      font_size: LABEL_FONT_SIZE,
      font,
      max_width: MAX_ANNOTATED_WIDTH,
      plate_color: PLATE_COLOR,
      text_color: TEXT_COLOR,
    }
  }

  /// 返回带标注的新图像，原始帧保持不变
  pub fn annotate(&self, frame: &LeafFrame, verdict: &Verdict) -> RgbImage {
    let mut image = self.fit_width(frame.as_rgb_image());
    self.draw_caption(&mut image, &caption(verdict));
    image
  }

  fn fit_width(&self, source: &RgbImage) -> RgbImage {
    let (width, height) = source.dimensions();
    if width <= self.max_width {
      return source.clone();
    }

    let ratio = self.max_width as f64 / width as f64;
    let new_height = ((height as f64 * ratio).round() as u32).max(1);
    image::imageops::resize(source, self.max_width, new_height, FilterType::Triangle)
  }

  // 左上角深色底板 + 白色文字
  fn draw_caption(&self, image: &mut RgbImage, text: &str) {
    let scale = PxScale::from(self.font_size);
    let (text_width, text_height) = text_size(scale, &self.font, text);
    let padding_y = (text_height as i32 / 2).max(4);

    let plate_width = text_width + 2 * PLATE_MARGIN as u32 + (LABEL_STROKE - 1) as u32;
    let plate_height = text_height + 2 * padding_y as u32;
    let plate = Rect::at(PLATE_MARGIN, PLATE_MARGIN).of_size(plate_width, plate_height);
    draw_filled_rect_mut(image, plate, Rgb(self.plate_color));

    let text_x = 2 * PLATE_MARGIN;
    let text_y = PLATE_MARGIN + padding_y;
    // 横向错开一像素重复绘制，加粗笔画
    for offset in 0..LABEL_STROKE {
      draw_text_mut(
        image,
        Rgb(self.text_color),
        text_x + offset,
        text_y,
        scale,
        &self.font,
        text,
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Label;

  fn leaf(width: u32, height: u32) -> LeafFrame {
    LeafFrame::try_from(RgbImage::from_pixel(width, height, Rgb([40, 160, 40]))).unwrap()
  }

  fn verdict(label: Label, confidence: f64) -> Verdict {
    Verdict { label, confidence }
  }

  #[test]
  fn test_caption_format() {
    assert_eq!(caption(&verdict(Label::LeafBlight, 0.873)), "LeafBlight (87.3%)");
    assert_eq!(caption(&verdict(Label::Healthy, 0.8)), "Healthy (80.0%)");
    assert_eq!(caption(&verdict(Label::CommonRust, 0.9)), "CommonRust (90.0%)");
  }

  #[test]
  fn test_wide_image_is_downscaled() {
    let draw = Draw::new().unwrap();
    let out = draw.annotate(&leaf(1000, 500), &verdict(Label::Healthy, 0.98));
    assert_eq!(out.dimensions(), (800, 400));

    let out = draw.annotate(&leaf(1001, 333), &verdict(Label::Healthy, 0.98));
    assert_eq!(out.dimensions(), (800, 266));
  }

  #[test]
  fn test_narrow_image_keeps_size() {
    let draw = Draw::new().unwrap();
    let out = draw.annotate(&leaf(600, 400), &verdict(Label::Healthy, 0.98));
    assert_eq!(out.dimensions(), (600, 400));
    let out = draw.annotate(&leaf(800, 90), &verdict(Label::Healthy, 0.98));
    assert_eq!(out.dimensions(), (800, 90));
  }

  #[test]
  fn test_reannotation_keeps_size() {
    let draw = Draw::new().unwrap();
    let v = verdict(Label::CommonRust, 0.9);
    let once = draw.annotate(&leaf(640, 480), &v);
    let twice = draw.annotate(&LeafFrame::try_from(once.clone()).unwrap(), &v);
    assert_eq!(once.dimensions(), twice.dimensions());
  }

  #[test]
  fn test_source_is_untouched() {
    let draw = Draw::new().unwrap();
    let frame = leaf(200, 100);
    let before = frame.clone();
    let out = draw.annotate(&frame, &verdict(Label::LeafBlight, 0.95));
    assert_eq!(frame, before);
    assert_ne!(&out, frame.as_rgb_image());
  }

  #[test]
  fn test_plate_and_text_are_drawn() {
    let draw = Draw::new().unwrap();
    let out = draw.annotate(&leaf(400, 200), &verdict(Label::LeafBlight, 0.95));
    // 底板左上角
    assert_eq!(out.get_pixel(PLATE_MARGIN as u32, PLATE_MARGIN as u32), &Rgb(PLATE_COLOR));
    // 底板外仍是原色
    assert_eq!(out.get_pixel(5, 5), &Rgb([40, 160, 40]));
    assert_eq!(out.get_pixel(399, 199), &Rgb([40, 160, 40]));
    // 文字区域出现亮色像素
    let bright = out
      .pixels()
      .filter(|p| p.0.iter().all(|&c| c > 200))
      .count();
    assert!(bright > 0);
  }

  #[test]
  fn test_tiny_image_does_not_panic() {
    let draw = Draw::new().unwrap();
    let out = draw.annotate(&leaf(3, 3), &verdict(Label::Healthy, 0.8));
    assert_eq!(out.dimensions(), (3, 3));
  }
}
