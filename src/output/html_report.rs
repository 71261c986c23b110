// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/output/html_report.rs - HTML 报告输出
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

use std::{fmt::Write as _, path::PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, frame::SelectedImage, model::PredictionResult, output::Render,
  utils::path_from_url,
};

#[derive(Error, Debug)]
pub enum HtmlReportError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("格式化错误: {0}")]
  FmtError(#[from] std::fmt::Error),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 生成单文件 HTML 页面：上传预览、预测列表和结果图像
pub struct HtmlReportOutput {
  path: PathBuf,
}

impl FromUrlWithScheme for HtmlReportOutput {
  const SCHEME: &'static str = "html";
}

impl FromUrl for HtmlReportOutput {
  type Error = HtmlReportError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(HtmlReportError::SchemeMismatch);
    }
    Ok(HtmlReportOutput {
      path: path_from_url(uri),
    })
  }
}

fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      _ => escaped.push(c),
    }
  }
  escaped
}

impl HtmlReportOutput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn report(
    frame: &SelectedImage,
    result: &PredictionResult,
  ) -> Result<String, std::fmt::Error> {
    let preview_src = format!(
      "data:{};base64,{}",
      frame.media_type(),
      STANDARD.encode(frame.data())
    );

    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>")?;
    writeln!(html, "<head><meta charset=\"utf-8\"><title>Soil &amp; Vegetation Detection</title></head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>Soil &amp; Vegetation Detection</h1>")?;
    writeln!(html, "<h3>Uploaded Image:</h3>")?;
    writeln!(
      html,
      "<img src=\"{}\" alt=\"preview\" title=\"{}\">",
      escape(&preview_src),
      escape(frame.file_name())
    )?;
    writeln!(html, "<h2>Predictions:</h2>")?;
    for prediction in &result.predictions {
      writeln!(
        html,
        "<p><b>{}</b> — Confidence: {}</p>",
        escape(&prediction.class),
        prediction.confidence
      )?;
    }
    writeln!(html, "<h3>Detected Result:</h3>")?;
    writeln!(
      html,
      "<img src=\"{}\" alt=\"result\">",
      escape(&result.image_src())
    )?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
  }
}

impl Render<SelectedImage, PredictionResult> for HtmlReportOutput {
  type Error = HtmlReportError;

  fn render_result(
    &self,
    frame: &SelectedImage,
    result: &PredictionResult,
  ) -> Result<(), Self::Error> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }
    std::fs::write(&self.path, Self::report(frame, result)?)?;
    warn!("保存 HTML 报告: {}", self.path.display());
    Ok(())
  }
}
