// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
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
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{SelectedImage, guess_image_media_type},
};

mod normalize;
pub use self::normalize::{DEFAULT_SQUARE_SIDE, Normalize, NormalizeError};

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

mod read_folder;
pub use self::read_folder::{FolderInput, FolderInputError};

const FALLBACK_FILE_NAME: &str = "image";

#[derive(Error, Debug)]
pub enum IntakeError {
  #[error("不是图像文件: {0}")]
  NotAnImage(String),
  #[error("图像归一化错误: {0}")]
  NormalizeError(#[from] NormalizeError),
}

/// 把一次文件选择变成待上传的图像
///
/// 空选择返回 `Ok(None)`，调用方应当直接忽略。
pub fn intake(
  path: &Path,
  data: Vec<u8>,
  normalize: Normalize,
) -> Result<Option<SelectedImage>, IntakeError> {
  let file_name = path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

  if data.is_empty() {
    debug!("忽略空选择: {}", file_name);
    return Ok(None);
  }

  let media_type =
    guess_image_media_type(path, &data).ok_or_else(|| IntakeError::NotAnImage(file_name.clone()))?;

  Ok(Some(normalize.apply(&file_name, media_type, data)?))
}

#[derive(Error, Debug)]
pub enum InputError {
  #[error("Image file input error: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("Folder input error: {0}")]
  FolderInputError(#[from] FolderInputError),
  #[error("URI scheme mismatch")]
  SchemeMismatch,
}

pub enum InputWrapper {
  ReadImageFile(ImageFileInput),
  ReadFolder(FolderInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ImageFileInput::SCHEME => Ok(InputWrapper::ReadImageFile(ImageFileInput::from_url(url)?)),
      FolderInput::SCHEME => Ok(InputWrapper::ReadFolder(FolderInput::from_url(url)?)),
      _ => Err(InputError::SchemeMismatch),
    }
  }
}

impl InputWrapper {
  pub fn with_normalize(self, normalize: Normalize) -> Self {
    match self {
      InputWrapper::ReadImageFile(input) => {
        InputWrapper::ReadImageFile(input.with_normalize(normalize))
      }
      InputWrapper::ReadFolder(input) => InputWrapper::ReadFolder(input.with_normalize(normalize)),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = Result<SelectedImage, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::ReadImageFile(input) => input.next().map(|r| r.map_err(InputError::from)),
      InputWrapper::ReadFolder(input) => input.next().map(|r| r.map_err(InputError::from)),
    }
  }
}
