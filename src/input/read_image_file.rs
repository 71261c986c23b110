// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::SelectedImage,
  input::{IntakeError, Normalize, intake},
  utils::path_from_url,
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image intake error: {0}")]
  IntakeError(#[from] IntakeError),
}

/// 单个图像文件，只产出一次
pub struct ImageFileInput {
  path: PathBuf,
  normalize: Normalize,
  consumed: bool,
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

    Ok(ImageFileInput::new(path_from_url(url)))
  }
}

impl ImageFileInput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      normalize: Normalize::default(),
      consumed: false,
    }
  }

  pub fn with_normalize(mut self, normalize: Normalize) -> Self {
    self.normalize = normalize;
    self
  }

  fn read(&self) -> Result<Option<SelectedImage>, ImageFileInputError> {
    debug!("读取图像文件: {}", self.path.display());
    let data = std::fs::read(&self.path)?;
    Ok(intake(&self.path, data, self.normalize)?)
  }
}

impl Iterator for ImageFileInput {
  type Item = Result<SelectedImage, ImageFileInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.consumed {
      return None;
    }
    self.consumed = true;
    self.read().transpose()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageFormat, Rgb, RgbImage};

  #[test]
  fn yields_one_selection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("soil sample.png");
    RgbImage::from_pixel(8, 6, Rgb([1, 2, 3]))
      .save_with_format(&path, ImageFormat::Png)
      .unwrap();

    let url = Url::from_file_path(&path).unwrap();
    let url = Url::parse(&url.as_str().replacen("file:", "image:", 1)).unwrap();
    let mut input = ImageFileInput::from_url(&url)
      .unwrap()
      .with_normalize(Normalize::Original);

    let selected = input.next().unwrap().unwrap();
    assert_eq!(selected.file_name(), "soil sample.png");
    assert_eq!((selected.width(), selected.height()), (8, 6));
    assert!(input.next().is_none());
  }

  #[test]
  fn empty_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.jpg");
    std::fs::write(&path, b"").unwrap();

    let mut input = ImageFileInput::new(&path);
    assert!(input.next().is_none());
  }

  #[test]
  fn non_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"not an image").unwrap();

    let mut input = ImageFileInput::new(&path);
    let err = input.next().unwrap().unwrap_err();
    assert!(matches!(
      err,
      ImageFileInputError::IntakeError(IntakeError::NotAnImage(_))
    ));
  }

  #[test]
  fn wrong_scheme_is_rejected() {
    let url = Url::parse("folder:///tmp").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch)
    ));
  }
}
