// 该文件是 MaizeScan 项目的一部分。
// src/model/hsv.rs - RGB 转 HSV
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

/// 8 位 HSV，H ∈ [0, 179]（半度），S、V ∈ [0, 255]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
  pub h: u8,
  pub s: u8,
  pub v: u8,
}

impl Hsv {
  pub fn as_array(&self) -> [u8; 3] {
    [self.h, self.s, self.v]
  }
}

use std::sync::LazyLock;

// 定点运算的小数位数
const HSV_SHIFT: u32 = 12;
const HSV_HALF: i32 = 1 << (HSV_SHIFT - 1);

// 除法查找表：sdiv[i] = round(255·2¹² / i)，hdiv[i] = round(180·2¹² / 6i)，下标 0 为 0
static SDIV_TABLE: LazyLock<[i32; 256]> = LazyLock::new(|| div_table(255.0));
static HDIV_TABLE: LazyLock<[i32; 256]> = LazyLock::new(|| div_table(180.0 / 6.0));

fn div_table(numerator: f64) -> [i32; 256] {
  let mut table = [0; 256];
  for (i, entry) in table.iter_mut().enumerate().skip(1) {
    *entry = (numerator * (1 << HSV_SHIFT) as f64 / i as f64).round_ties_even() as i32;
  }
  table
}

/// RGB 转 8 位 HSV
///
/// 使用 12 位定点数与除法查找表，结果与 OpenCV `COLOR_RGB2HSV` 的 8 位输出逐值一致。
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
  let (r, g, b) = (r as i32, g as i32, b as i32);
  let v = r.max(g).max(b);
  let diff = v - r.min(g).min(b);

  let s = (diff * SDIV_TABLE[v as usize] + HSV_HALF) >> HSV_SHIFT;

  // 最大分量的优先级：R > G > B
  let h = if v == r {
    g - b
  } else if v == g {
    b - r + 2 * diff
  } else {
    r - g + 4 * diff
  };
  let mut h = (h * HDIV_TABLE[diff as usize] + HSV_HALF) >> HSV_SHIFT;
  if h < 0 {
    h += 180;
  }

  Hsv {
    h: h.clamp(0, 179) as u8,
    s: s.clamp(0, 255) as u8,
    v: v as u8,
  }
}
