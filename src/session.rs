// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/session.rs - 交互状态
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

use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
  frame::SelectedImage,
  model::{Model, ModelChoice, PredictionResult, Submission},
};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 用户可见的两种失败，显示文本固定，具体原因只写入日志
#[derive(Error, Debug)]
pub enum SessionError {
  #[error("Please upload an image first!")]
  NoFileSelected,
  #[error("Prediction failed. Make sure the prediction backend is running!")]
  PredictionFailed(#[source] BoxError),
}

/// 一次会话中的全部状态
#[derive(Debug, Default)]
pub struct Session {
  selected: Option<SelectedImage>,
  model_choice: ModelChoice,
  result: Option<PredictionResult>,
  loading: bool,
}

impl Session {
  pub fn new(model_choice: ModelChoice) -> Self {
    Self {
      model_choice,
      ..Default::default()
    }
  }

  /// 选择新的图像，`None` 表示空选择并被忽略
  ///
  /// 新选择会清掉上一次的结果。
  pub fn select(&mut self, image: Option<SelectedImage>) {
    let Some(image) = image else {
      debug!("空选择，忽略");
      return;
    };

    info!(
      "选中图像 {} ({}x{}, {})",
      image.file_name(),
      image.width(),
      image.height(),
      image.media_type()
    );
    self.selected = Some(image);
    self.result = None;
  }

  pub fn set_model(&mut self, model_choice: ModelChoice) {
    self.model_choice = model_choice;
  }

  pub fn model_choice(&self) -> ModelChoice {
    self.model_choice
  }

  pub fn selected(&self) -> Option<&SelectedImage> {
    self.selected.as_ref()
  }

  pub fn result(&self) -> Option<&PredictionResult> {
    self.result.as_ref()
  }

  /// 当前可渲染的内容：图像和它的结果
  pub fn current(&self) -> Option<(&SelectedImage, &PredictionResult)> {
    self.selected.as_ref().zip(self.result.as_ref())
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  /// 提交当前图像
  ///
  /// 没有选中图像时不会调用模型。失败时保留之前的结果。
  pub fn predict<M, E>(&mut self, model: &M) -> Result<&PredictionResult, SessionError>
  where
    M: for<'a> Model<Submission<'a>, Output = PredictionResult, Error = E>,
    E: std::error::Error + Send + Sync + 'static,
  {
    let Some(image) = self.selected.as_ref() else {
      return Err(SessionError::NoFileSelected);
    };

    self.loading = true;
    let outcome = model.infer(&self.model_choice.submission(image));
    self.loading = false;

    match outcome {
      Ok(result) => {
        info!("预测完成: {} 个结果", result.len());
        Ok(self.result.insert(result))
      }
      Err(e) => {
        error!("预测失败: {}", e);
        Err(SessionError::PredictionFailed(Box::new(e)))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::RgbImage;
  use std::cell::{Cell, RefCell};

  #[derive(Error, Debug)]
  #[error("connection refused")]
  struct Refused;

  /// 记录调用次数，按顺序返回预设结果
  struct ScriptedModel {
    calls: Cell<usize>,
    seen: RefCell<Vec<(String, ModelChoice)>>,
    replies: RefCell<Vec<Result<PredictionResult, Refused>>>,
  }

  impl ScriptedModel {
    fn new(replies: Vec<Result<PredictionResult, Refused>>) -> Self {
      Self {
        calls: Cell::new(0),
        seen: RefCell::new(Vec::new()),
        replies: RefCell::new(replies),
      }
    }
  }

  impl<'a> Model<Submission<'a>> for ScriptedModel {
    type Output = PredictionResult;
    type Error = Refused;

    fn infer(&self, input: &Submission<'a>) -> Result<PredictionResult, Refused> {
      self.calls.set(self.calls.get() + 1);
      self
        .seen
        .borrow_mut()
        .push((input.image.file_name().to_string(), input.model_choice));
      self.replies.borrow_mut().remove(0)
    }
  }

  fn image(name: &str) -> SelectedImage {
    SelectedImage::new(name, "image/jpeg", vec![0xff, 0xd8], RgbImage::new(2, 2))
  }

  fn result(class: &str) -> PredictionResult {
    PredictionResult {
      predictions: vec![crate::model::Prediction {
        class: class.to_string(),
        confidence: 0.5,
      }],
      image: "Zm9v".to_string(),
    }
  }

  #[test]
  fn no_file_never_calls_model() {
    let model = ScriptedModel::new(vec![]);
    let mut session = Session::default();

    let err = session.predict(&model).unwrap_err();
    assert!(matches!(err, SessionError::NoFileSelected));
    assert_eq!(err.to_string(), "Please upload an image first!");
    assert_eq!(model.calls.get(), 0);
  }

  #[test]
  fn empty_selection_keeps_state() {
    let mut session = Session::default();
    session.select(Some(image("a.jpg")));
    session.select(None);
    assert_eq!(session.selected().unwrap().file_name(), "a.jpg");
  }

  #[test]
  fn success_replaces_result_with_selected_model() {
    let model = ScriptedModel::new(vec![Ok(result("grass")), Ok(result("moss"))]);
    let mut session = Session::new(ModelChoice::VegetationDetection);
    session.select(Some(image("a.jpg")));

    assert_eq!(session.predict(&model).unwrap().predictions[0].class, "grass");
    session.set_model(ModelChoice::SoilDetection);
    assert_eq!(session.predict(&model).unwrap().predictions[0].class, "moss");

    assert_eq!(
      *model.seen.borrow(),
      vec![
        ("a.jpg".to_string(), ModelChoice::VegetationDetection),
        ("a.jpg".to_string(), ModelChoice::SoilDetection),
      ]
    );
    assert!(!session.is_loading());
  }

  #[test]
  fn failure_keeps_previous_result() {
    let model = ScriptedModel::new(vec![Ok(result("grass")), Err(Refused)]);
    let mut session = Session::default();
    session.select(Some(image("a.jpg")));
    session.predict(&model).unwrap();

    let err = session.predict(&model).unwrap_err();
    assert_eq!(
      err.to_string(),
      "Prediction failed. Make sure the prediction backend is running!"
    );
    assert_eq!(session.result().unwrap().predictions[0].class, "grass");
    assert!(!session.is_loading());
  }

  #[test]
  fn new_selection_clears_result() {
    let model = ScriptedModel::new(vec![Ok(result("grass")), Err(Refused)]);
    let mut session = Session::default();
    session.select(Some(image("a.jpg")));
    session.predict(&model).unwrap();

    session.select(Some(image("b.jpg")));
    assert!(session.result().is_none());
    assert!(session.predict(&model).is_err());
    assert!(session.current().is_none());
  }
}
