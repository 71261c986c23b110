// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/utils.rs - 通用工具函数
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

use std::{fmt::Display, path::PathBuf};

use tracing::error;
use tracing_subscriber::EnvFilter;
use url::Url;

/// 从 URL 中取出本地路径，路径中的百分号编码会被解码
pub fn path_from_url(url: &Url) -> PathBuf {
  let raw = url.path();
  match urlencoding::decode(raw) {
    Ok(decoded) => PathBuf::from(decoded.into_owned()),
    Err(_) => PathBuf::from(raw),
  }
}

/// 初始化日志，`RUST_LOG` 优先
pub fn init_tracing(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("debug")
    } else {
      EnvFilter::new("info")
    }
  });
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 向用户弹出阻塞式提示
pub fn alert(message: &impl Display) {
  error!("{}", message);
  eprintln!("{}", message);
}
