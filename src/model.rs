// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/model.rs - 模型
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

use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::SelectedImage;

pub const RESULT_IMAGE_PREFIX: &str = "data:image/jpeg;base64,";

pub trait Model<Input: ?Sized> {
  type Output;
  type Error;

  fn infer(&self, input: &Input) -> Result<Self::Output, Self::Error>;
}

/// 后端检测任务的选择，以显示名原样发送
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ModelChoice {
  #[default]
  SoilDetection,
  VegetationDetection,
}

impl ModelChoice {
  pub const ALL: [ModelChoice; 2] = [ModelChoice::SoilDetection, ModelChoice::VegetationDetection];

  pub fn as_str(&self) -> &'static str {
    match self {
      ModelChoice::SoilDetection => "Soil Detection",
      ModelChoice::VegetationDetection => "Vegetation Detection",
    }
  }

  pub fn submission(self, image: &SelectedImage) -> Submission<'_> {
    Submission {
      image,
      model_choice: self,
    }
  }
}

impl fmt::Display for ModelChoice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("未知的模型类型: {0}")]
pub struct UnknownModelChoice(pub String);

impl FromStr for ModelChoice {
  type Err = UnknownModelChoice;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ModelChoice::ALL
      .into_iter()
      .find(|choice| choice.as_str() == s)
      .ok_or_else(|| UnknownModelChoice(s.to_string()))
  }
}

/// 一次提交：选中的图像和模型类型
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
  pub image: &'a SelectedImage,
  pub model_choice: ModelChoice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
  pub class: String,
  pub confidence: f64,
}

impl fmt::Display for Prediction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} — Confidence: {}", self.class, self.confidence)
  }
}

/// 预测服务的返回结果
///
/// `image` 是不带 data URI 前缀的 base64 JPEG。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
  pub predictions: Vec<Prediction>,
  pub image: String,
}

impl PredictionResult {
  pub fn len(&self) -> usize {
    self.predictions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.predictions.is_empty()
  }

  /// 可直接作为 `<img src>` 使用的结果图像地址
  pub fn image_src(&self) -> String {
    format!("{}{}", RESULT_IMAGE_PREFIX, self.image)
  }

  pub fn decode_image(&self) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(self.image.trim())
  }

  /// 每个预测一行，保持返回顺序
  pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
    self.predictions.iter().map(Prediction::to_string)
  }
}

mod remote;
pub use self::remote::{DEFAULT_ENDPOINT, PredictError, RemoteModel, RemoteModelBuilder};
