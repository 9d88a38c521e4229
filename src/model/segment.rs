// 该文件是 MaizeScan 项目的一部分。
// src/model/segment.rs - 颜色分段与像素占比
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

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::hsv::{Hsv, rgb_to_hsv};
use crate::frame::LeafFrame;

/// HSV 空间中的闭区间色带
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBand {
  pub lower: [u8; 3],
  pub upper: [u8; 3],
}

impl ColorBand {
  pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
    Self { lower, upper }
  }

  pub fn contains(&self, hsv: Hsv) -> bool {
    hsv
      .as_array()
      .iter()
      .zip(self.lower.iter().zip(self.upper.iter()))
      .all(|(v, (lo, hi))| lo <= v && v <= hi)
  }
}

/// 绿色健康叶片
pub const HEALTHY_BAND: ColorBand = ColorBand::new([35, 40, 40], [85, 255, 255]);
/// 褐色病斑（叶枯病）
pub const BROWN_BAND: ColorBand = ColorBand::new([10, 50, 20], [20, 255, 200]);
/// 黄色/橙色孢子堆（锈病）
pub const YELLOW_BAND: ColorBand = ColorBand::new([20, 100, 100], [30, 255, 255]);

/// 三个色带各自的像素占比。色带在边界处可以重叠，占比之和不必为 1。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorRatios {
  pub healthy_ratio: f64,
  pub brown_ratio: f64,
  pub yellow_ratio: f64,
}

pub fn segment(frame: &LeafFrame) -> ColorRatios {
  let (mut healthy, mut brown, mut yellow) = (0usize, 0usize, 0usize);

  for pixel in frame.as_rgb_image().pixels() {
    let [r, g, b] = pixel.0;
    let hsv = rgb_to_hsv(r, g, b);
    healthy += HEALTHY_BAND.contains(hsv) as usize;
    brown += BROWN_BAND.contains(hsv) as usize;
    yellow += YELLOW_BAND.contains(hsv) as usize;
  }

  // LeafFrame 保证至少一个像素
  let total = frame.pixel_count() as f64;
  let ratios = ColorRatios {
    healthy_ratio: healthy as f64 / total,
    brown_ratio: brown as f64 / total,
    yellow_ratio: yellow as f64 / total,
  };
  debug!(
    "色带像素: 绿 {} 褐 {} 黄 {} / {}",
    healthy, brown, yellow, total
  );
  ratios
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  fn frame_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Rgb<u8>) -> LeafFrame {
    LeafFrame::try_from(RgbImage::from_fn(width, height, f)).unwrap()
  }

  #[test]
  fn test_band_bounds_are_inclusive() {
    let lo = Hsv { h: 35, s: 40, v: 40 };
    let hi = Hsv { h: 85, s: 255, v: 255 };
    assert!(HEALTHY_BAND.contains(lo));
    assert!(HEALTHY_BAND.contains(hi));
    assert!(!HEALTHY_BAND.contains(Hsv { h: 34, s: 40, v: 40 }));
    assert!(!HEALTHY_BAND.contains(Hsv { h: 86, s: 255, v: 255 }));
    assert!(!BROWN_BAND.contains(Hsv { h: 15, s: 100, v: 201 }));
  }

  #[test]
  fn test_hue_20_falls_in_both_brown_and_yellow() {
    let hsv = Hsv { h: 20, s: 150, v: 150 };
    assert!(BROWN_BAND.contains(hsv));
    assert!(YELLOW_BAND.contains(hsv));
  }

  #[test]
  fn test_all_green_leaf() {
    let frame = frame_from_fn(16, 16, |_, _| Rgb([40, 160, 40]));
    let ratios = segment(&frame);
    assert_eq!(ratios.healthy_ratio, 1.0);
    assert_eq!(ratios.brown_ratio, 0.0);
    assert_eq!(ratios.yellow_ratio, 0.0);
  }

  #[test]
  fn test_mixed_leaf_ratios() {
    // 上半绿色，下四分之一褐色，其余灰色
    let frame = frame_from_fn(10, 20, |_, y| match y {
      0..=9 => Rgb([40, 160, 40]),
      10..=14 => Rgb([150, 75, 30]),
      _ => Rgb([128, 128, 128]),
    });
    let ratios = segment(&frame);
    assert!((ratios.healthy_ratio - 0.5).abs() < 1e-12);
    assert!((ratios.brown_ratio - 0.25).abs() < 1e-12);
    assert_eq!(ratios.yellow_ratio, 0.0);
  }

  #[test]
  fn test_ratios_stay_in_unit_interval() {
    let frame = frame_from_fn(37, 23, |x, y| {
      Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x + y) * 5 % 256) as u8])
    });
    let ratios = segment(&frame);
    for r in [ratios.healthy_ratio, ratios.brown_ratio, ratios.yellow_ratio] {
      assert!((0.0..=1.0).contains(&r));
    }
  }

  #[test]
  fn test_single_pixel_image() {
    let frame = frame_from_fn(1, 1, |_, _| Rgb([230, 190, 40]));
    let ratios = segment(&frame);
    assert_eq!(ratios.yellow_ratio, 1.0);
  }
}
