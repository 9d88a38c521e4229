// 该文件是 MaizeScan 项目的一部分。
// src/utils.rs - 工具函数
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

use url::Url;

/// 取 URL 的路径部分并做百分号解码
pub fn url_to_path(url: &Url) -> PathBuf {
  let raw = url.path();
  match urlencoding::decode(raw) {
    Ok(decoded) => PathBuf::from(decoded.into_owned()),
    Err(_) => PathBuf::from(raw),
  }
}

/// 查询参数中是否出现某个键
pub fn has_query_flag(url: &Url, key: &str) -> bool {
  url.query_pairs().any(|(k, _)| k == key)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_percent_decoded_path() {
    let url = Url::parse("image:///tmp/my%20leaf.png").unwrap();
    assert_eq!(url_to_path(&url), PathBuf::from("/tmp/my leaf.png"));
  }

  #[test]
  fn test_query_flag() {
    let url = Url::parse("folder:///out?original&x=1").unwrap();
    assert!(has_query_flag(&url, "original"));
    assert!(!has_query_flag(&url, "always"));
  }
}
