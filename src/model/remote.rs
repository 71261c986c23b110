// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/model/remote.rs - 远程预测服务
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

use std::time::Duration;

use reqwest::{
  StatusCode,
  blocking::{
    Client,
    multipart::{Form, Part},
  },
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl,
  model::{Model, PredictionResult, Submission},
};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/predict/";

const FILE_FIELD: &str = "file";
const MODEL_TYPE_FIELD: &str = "model_type";
const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

#[derive(Error, Debug)]
pub enum PredictError {
  #[error("预测服务地址错误: {0}")]
  EndpointError(String),
  #[error("网络错误: {0}")]
  Network(#[from] reqwest::Error),
  #[error("预测服务返回 {status}: {message}")]
  Status { status: StatusCode, message: String },
  #[error("响应格式错误: {0}")]
  InvalidResponse(#[from] serde_json::Error),
}

/// 服务端出错时的返回体
#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: String,
}

fn error_message(body: &[u8]) -> String {
  match serde_json::from_slice::<ErrorBody>(body) {
    Ok(ErrorBody { error }) => error,
    Err(_) => String::from_utf8_lossy(body).into_owned(),
  }
}

pub struct RemoteModelBuilder {
  endpoint: Url,
  timeout: Option<Duration>,
}

impl FromUrl for RemoteModelBuilder {
  type Error = PredictError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
      return Err(PredictError::EndpointError(format!(
        "预测服务地址必须使用 http 或 https 方案, 实际为 '{}'",
        url.scheme()
      )));
    }

    Ok(RemoteModelBuilder {
      endpoint: url.clone(),
      timeout: None,
    })
  }
}

impl Default for RemoteModelBuilder {
  fn default() -> Self {
    RemoteModelBuilder {
      endpoint: Url::parse(DEFAULT_ENDPOINT).expect("默认预测服务地址无效"),
      timeout: None,
    }
  }
}

impl RemoteModelBuilder {
  /// 请求超时，默认不超时
  pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn build(self) -> Result<RemoteModel, PredictError> {
    info!("预测服务地址: {}", self.endpoint);
    let client = Client::builder().timeout(self.timeout).build()?;
    Ok(RemoteModel {
      client,
      endpoint: self.endpoint,
    })
  }
}

/// 通过 HTTP 调用的远程检测模型
///
/// 每次 `infer` 只发一个请求，失败不重试。
pub struct RemoteModel {
  client: Client,
  endpoint: Url,
}

impl RemoteModel {
  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }

  fn form(submission: &Submission<'_>) -> Result<Form, PredictError> {
    let image = submission.image;
    let part = Part::bytes(image.data().to_vec())
      .file_name(image.file_name().to_string())
      .mime_str(image.media_type())?;

    Ok(
      Form::new()
        .part(FILE_FIELD, part)
        .text(MODEL_TYPE_FIELD, submission.model_choice.as_str()),
    )
  }
}

impl<'a> Model<Submission<'a>> for RemoteModel {
  type Output = PredictionResult;
  type Error = PredictError;

  fn infer(&self, input: &Submission<'a>) -> Result<Self::Output, Self::Error> {
    debug!(
      "提交 {} ({}, {} 字节), 模型类型: {}",
      input.image.file_name(),
      input.image.media_type(),
      input.image.data().len(),
      input.model_choice
    );

    let response = self
      .client
      .post(self.endpoint.clone())
      .multipart(Self::form(input)?)
      .send()?;

    let status = response.status();
    let body = response.bytes()?;
    debug!("预测服务返回 {}, {} 字节", status, body.len());

    if !status.is_success() {
      let message = error_message(&body);
      error!("预测服务返回错误 {}: {}", status, message);
      return Err(PredictError::Status { status, message });
    }

    let result: PredictionResult = serde_json::from_slice(&body)?;
    debug!("检测到 {} 个结果", result.len());
    Ok(result)
  }
}
