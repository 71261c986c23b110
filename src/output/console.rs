// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/output/console.rs - 控制台输出
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

use std::io::Write;

use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, frame::SelectedImage, model::PredictionResult, output::Render,
};

#[derive(Error, Debug)]
pub enum ConsoleOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 把预测结果逐行打印到标准输出
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl FromUrlWithScheme for ConsoleOutput {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ConsoleOutputError::SchemeMismatch);
    }
    Ok(ConsoleOutput)
  }
}

impl ConsoleOutput {
  pub fn write_report<W: Write>(
    &self,
    writer: &mut W,
    frame: &SelectedImage,
    result: &PredictionResult,
  ) -> std::io::Result<()> {
    writeln!(
      writer,
      "Uploaded Image: {} ({}x{}, {})",
      frame.file_name(),
      frame.width(),
      frame.height(),
      frame.media_type()
    )?;
    writeln!(writer, "Predictions:")?;
    for line in result.lines() {
      writeln!(writer, "  {}", line)?;
    }
    writeln!(
      writer,
      "Detected Result: {} characters of data:image/jpeg;base64",
      result.image_src().len()
    )?;
    Ok(())
  }
}

impl Render<SelectedImage, PredictionResult> for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn render_result(
    &self,
    frame: &SelectedImage,
    result: &PredictionResult,
  ) -> Result<(), Self::Error> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    self.write_report(&mut handle, frame, result)?;
    handle.flush()?;
    Ok(())
  }
}
