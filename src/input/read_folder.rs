// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/input/read_folder.rs - 目录批量输入
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

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::SelectedImage,
  input::{IntakeError, Normalize, intake},
  utils::path_from_url,
};

#[derive(Error, Debug)]
pub enum FolderInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("不是目录: {0}")]
  NotADirectory(PathBuf),
  #[error("图像读取错误: {0}")]
  IntakeError(#[from] IntakeError),
}

/// 按文件名顺序逐个产出目录中的图像
///
/// 空文件和非图像文件会被跳过。
pub struct FolderInput {
  entries: std::vec::IntoIter<PathBuf>,
  normalize: Normalize,
}

impl FromUrlWithScheme for FolderInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for FolderInput {
  type Error = FolderInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(FolderInputError::SchemeMismatch);
    }
    FolderInput::open(path_from_url(url))
  }
}

impl FolderInput {
  pub fn open(directory: impl Into<PathBuf>) -> Result<Self, FolderInputError> {
    let directory = directory.into();
    if !directory.is_dir() {
      return Err(FolderInputError::NotADirectory(directory));
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(&directory)? {
      let path = entry?.path();
      if path.is_file() {
        entries.push(path);
      }
    }
    entries.sort();
    info!("目录 {} 中共有 {} 个文件", directory.display(), entries.len());

    Ok(FolderInput {
      entries: entries.into_iter(),
      normalize: Normalize::default(),
    })
  }

  pub fn with_normalize(mut self, normalize: Normalize) -> Self {
    self.normalize = normalize;
    self
  }
}

impl Iterator for FolderInput {
  type Item = Result<SelectedImage, FolderInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    for path in self.entries.by_ref() {
      let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(e) => return Some(Err(e.into())),
      };

      match intake(&path, data, self.normalize) {
        Ok(Some(selected)) => return Some(Ok(selected)),
        Ok(None) => debug!("跳过空文件: {}", path.display()),
        Err(IntakeError::NotAnImage(name)) => warn!("跳过非图像文件: {}", name),
        Err(e) => return Some(Err(e.into())),
      }
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageFormat, Rgb, RgbImage};

  #[test]
  fn yields_images_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.png", "a.png"] {
      RgbImage::from_pixel(3, 3, Rgb([9, 9, 9]))
        .save_with_format(dir.path().join(name), ImageFormat::Png)
        .unwrap();
    }
    std::fs::write(dir.path().join("readme.txt"), b"field notes").unwrap();
    std::fs::write(dir.path().join("c.jpg"), b"").unwrap();

    let names: Vec<String> = FolderInput::open(dir.path())
      .unwrap()
      .with_normalize(Normalize::Original)
      .map(|selected| selected.unwrap().file_name().to_string())
      .collect();

    assert_eq!(names, vec!["a.png", "b.png"]);
  }

  #[test]
  fn empty_folder_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(FolderInput::open(dir.path()).unwrap().count(), 0);
  }

  #[test]
  fn file_is_not_a_folder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.png");
    std::fs::write(&path, b"x").unwrap();
    assert!(matches!(
      FolderInput::open(&path),
      Err(FolderInputError::NotADirectory(_))
    ));
  }
}
