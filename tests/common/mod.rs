#![allow(dead_code)]

use std::{
  cell::{Cell, RefCell},
  io::Cursor,
  path::Path,
};

use image::{ImageFormat, Rgb, RgbImage};
use soilveg::{
  frame::SelectedImage,
  model::{Model, ModelChoice, Prediction, PredictionResult, Submission},
  output::Render,
};
use thiserror::Error;

pub fn write_png(path: &Path, width: u32, height: u32) {
  RgbImage::from_pixel(width, height, Rgb([90, 140, 60]))
    .save_with_format(path, ImageFormat::Png)
    .unwrap();
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
  let mut buffer = Cursor::new(Vec::new());
  RgbImage::from_pixel(width, height, Rgb([200, 10, 10]))
    .write_to(&mut buffer, ImageFormat::Jpeg)
    .unwrap();
  buffer.into_inner()
}

pub fn result(classes: &[(&str, f64)]) -> PredictionResult {
  PredictionResult {
    predictions: classes
      .iter()
      .map(|(class, confidence)| Prediction {
        class: class.to_string(),
        confidence: *confidence,
      })
      .collect(),
    image: "Zm9v".to_string(),
  }
}

#[derive(Error, Debug)]
#[error("backend unreachable")]
pub struct Unreachable;

/// 按顺序返回预设结果，并记录每次提交
#[derive(Default)]
pub struct ScriptedModel {
  pub calls: Cell<usize>,
  pub seen: RefCell<Vec<(String, ModelChoice, (u32, u32))>>,
  pub replies: RefCell<Vec<Result<PredictionResult, Unreachable>>>,
}

impl ScriptedModel {
  pub fn new(replies: Vec<Result<PredictionResult, Unreachable>>) -> Self {
    Self {
      replies: RefCell::new(replies),
      ..Default::default()
    }
  }
}

impl<'a> Model<Submission<'a>> for &ScriptedModel {
  type Output = PredictionResult;
  type Error = Unreachable;

  fn infer(&self, input: &Submission<'a>) -> Result<PredictionResult, Unreachable> {
    self.calls.set(self.calls.get() + 1);
    self.seen.borrow_mut().push((
      input.image.file_name().to_string(),
      input.model_choice,
      (input.image.width(), input.image.height()),
    ));
    self.replies.borrow_mut().remove(0)
  }
}

#[derive(Error, Debug)]
#[error("render failed")]
pub struct RenderFailed;

/// 记录渲染出的预测行
#[derive(Default)]
pub struct RecordingOutput {
  pub rendered: RefCell<Vec<(String, Vec<String>, String)>>,
}

impl Render<SelectedImage, PredictionResult> for &RecordingOutput {
  type Error = RenderFailed;

  fn render_result(
    &self,
    frame: &SelectedImage,
    result: &PredictionResult,
  ) -> Result<(), RenderFailed> {
    self.rendered.borrow_mut().push((
      frame.file_name().to_string(),
      result.lines().collect(),
      result.image_src(),
    ));
    Ok(())
  }
}
