// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::{
  path::{Path, PathBuf},
  sync::atomic::{AtomicU16, Ordering},
};

use chrono::{DateTime, Datelike, Local};
use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, frame::SelectedImage, model::PredictionResult, output::Render,
  utils::path_from_url,
};

const RESULT_EXTENSION: &str = "jpg";
const RECORD_EXTENSION: &str = "txt";

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("结果图像 base64 解码错误: {0}")]
  Base64Error(#[from] base64::DecodeError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按日期归档每次预测：结果图像、文本记录，可选地保存上传的图像
///
/// `folder:/data/records?always&input`
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  frame_counter: AtomicU16,
  always: bool,
  keep_input: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");
    let keep_input = uri.query_pairs().any(|(k, _)| k == "input");

    Ok(DirectoryRecordOutput {
      directory: path_from_url(uri),
      frame_counter: AtomicU16::new(0),
      always,
      keep_input,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  fn frame_stem(&self, now: DateTime<Local>) -> Result<PathBuf, DirectoryRecordOutputError> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  fn record(result: &PredictionResult, path: &Path) -> std::io::Result<()> {
    let records: Vec<String> = result
      .predictions
      .iter()
      .map(|p| format!("{}, {:.4}", p.class, p.confidence))
      .collect();
    std::fs::write(path, records.join("\n"))
  }

  /// 写出一条记录，返回结果图像的路径
  pub fn save_result(
    &self,
    frame: &SelectedImage,
    result: &PredictionResult,
  ) -> Result<PathBuf, DirectoryRecordOutputError> {
    let image = result.decode_image()?;
    let stem = self.frame_stem(Local::now())?;

    let image_path = stem.with_extension(RESULT_EXTENSION);
    std::fs::write(&image_path, image)?;
    Self::record(result, &stem.with_extension(RECORD_EXTENSION))?;

    if self.keep_input {
      let extension = ImageFormat::from_mime_type(frame.media_type())
        .and_then(|format| format.extensions_str().first().copied())
        .or_else(|| Path::new(frame.file_name()).extension().and_then(|ext| ext.to_str()))
        .unwrap_or(RESULT_EXTENSION);
      let mut input_path = stem.into_os_string();
      input_path.push("-input");
      let input_path = PathBuf::from(input_path).with_extension(extension);
      std::fs::write(&input_path, frame.data())?;
      debug!("保存上传图像: {}", input_path.display());
    }

    warn!("记录预测结果: {}", image_path.display());
    Ok(image_path)
  }
}

impl Render<SelectedImage, PredictionResult> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(
    &self,
    frame: &SelectedImage,
    result: &PredictionResult,
  ) -> Result<(), Self::Error> {
    if self.always || !result.is_empty() {
      self.save_result(frame, result)?;
    } else {
      debug!("没有检测结果，跳过记录");
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Prediction;
  use image::RgbImage;

  fn output(dir: &Path, query: &str) -> DirectoryRecordOutput {
    let mut url = Url::from_directory_path(dir).unwrap();
    url.set_query(Some(query));
    let url = Url::parse(&url.as_str().replacen("file:", "folder:", 1)).unwrap();
    DirectoryRecordOutput::from_url(&url).unwrap()
  }

  fn frame() -> SelectedImage {
    SelectedImage::new("plot.png", "image/png", b"png-bytes".to_vec(), RgbImage::new(1, 1))
  }

  fn result(predictions: Vec<Prediction>) -> PredictionResult {
    PredictionResult {
      predictions,
      image: "Zm9v".to_string(),
    }
  }

  fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
      for entry in std::fs::read_dir(current).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
          pending.push(path);
        } else {
          files.push(path);
        }
      }
    }
    files.sort();
    files
  }

  #[test]
  fn writes_image_and_record() {
    let dir = tempfile::tempdir().unwrap();
    let output = output(dir.path(), "input");
    let result = result(vec![Prediction {
      class: "grass".to_string(),
      confidence: 0.91,
    }]);

    let image_path = output.save_result(&frame(), &result).unwrap();

    assert_eq!(std::fs::read(&image_path).unwrap(), b"foo");
    assert_eq!(
      std::fs::read_to_string(image_path.with_extension("txt")).unwrap(),
      "grass, 0.9100"
    );
    let files = files_under(dir.path());
    assert_eq!(files.len(), 3);
    assert!(
      files
        .iter()
        .any(|p| p.to_string_lossy().ends_with("-input.png"))
    );
  }

  #[test]
  fn input_extension_follows_media_type() {
    let dir = tempfile::tempdir().unwrap();
    let frame = SelectedImage::new("plot", "image/png", b"png-bytes".to_vec(), RgbImage::new(1, 1));
    let result = result(vec![Prediction {
      class: "clay".to_string(),
      confidence: 0.5,
    }]);

    output(dir.path(), "input").save_result(&frame, &result).unwrap();

    let files = files_under(dir.path());
    let input = files
      .iter()
      .find(|p| p.to_string_lossy().contains("-input"))
      .unwrap();
    assert_eq!(input.extension().unwrap(), "png");
    assert_eq!(std::fs::read(input).unwrap(), b"png-bytes");
  }

  #[test]
  fn empty_results_are_skipped_unless_always() {
    let dir = tempfile::tempdir().unwrap();
    output(dir.path(), "")
      .render_result(&frame(), &result(vec![]))
      .unwrap();
    assert!(files_under(dir.path()).is_empty());

    output(dir.path(), "always")
      .render_result(&frame(), &result(vec![]))
      .unwrap();
    assert_eq!(files_under(dir.path()).len(), 2);
  }
}
