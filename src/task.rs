// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/task.rs - 任务流程
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

use std::{thread, time::Duration};
use tracing::{error, info, warn};

use crate::{
  frame::SelectedImage,
  model::{Model, ModelChoice, PredictionResult, Submission},
  output::Render,
  session::Session,
  utils::alert,
};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error>;
}

#[derive(Default, Debug)]
pub struct OneShotTask {
  model_choice: ModelChoice,
}

impl OneShotTask {
  pub fn with_model_choice(mut self, model_choice: ModelChoice) -> Self {
    self.model_choice = model_choice;
    self
  }
}

impl<IE, ME, RE, I, M, O> Task<I, M, O> for OneShotTask
where
  IE: std::error::Error + Sync + Send + 'static,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<SelectedImage, IE>>,
  M: for<'a> Model<Submission<'a>, Output = PredictionResult, Error = ME>,
  O: Render<SelectedImage, PredictionResult, Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let mut session = Session::new(self.model_choice);
    session.select(input.next().transpose()?);

    info!("开始推理, 模型类型: {}", session.model_choice());
    let now = std::time::Instant::now();
    if let Err(e) = session.predict(&model) {
      alert(&e);
      return Err(e.into());
    }
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    if let Some((image, result)) = session.current() {
      output.render_result(image, result)?;
      info!("渲染完成");
    }

    Ok(())
  }
}

#[derive(Default, Debug)]
pub struct ContinuousTask {
  model_choice: ModelChoice,
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_model_choice(mut self, model_choice: ModelChoice) -> Self {
    self.model_choice = model_choice;
    self
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<IE, ME, RE, I, M, O> Task<I, M, O> for ContinuousTask
where
  IE: std::error::Error + Sync + Send + 'static,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<SelectedImage, IE>>,
  M: for<'a> Model<Submission<'a>, Output = PredictionResult, Error = ME>,
  O: Render<SelectedImage, PredictionResult, Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let (tx, rx) = std::sync::mpsc::channel();

    // 同一进程只能注册一次处理函数
    if let Err(e) = ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    }) {
      warn!("无法注册 Ctrl-C 处理函数: {}", e);
    }

    let mut session = Session::new(self.model_choice);
    let mut frame_index = 0;
    let mut failures = 0usize;

    for selection in input {
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }

      // 读取失败不计入数量
      let image = match selection {
        Ok(image) => image,
        Err(e) => {
          error!("读取第 {} 张图像后的输入失败: {}", frame_index, e);
          failures += 1;
          continue;
        }
      };
      frame_index += 1;
      session.select(Some(image));

      info!("处理第 {} 张图像", frame_index);
      let now = std::time::Instant::now();
      match session.predict(&model) {
        Ok(_) => {
          if let Some((image, result)) = session.current() {
            output.render_result(image, result)?;
          }
          info!("推理完成，耗时: {:.2?}", now.elapsed());
        }
        Err(e) => {
          alert(&e);
          failures += 1;
        }
      }

      if self.frame_number.map(|n| frame_index >= n).unwrap_or(false) {
        info!("达到指定数量 {}, 退出任务循环", frame_index);
        break;
      }
    }

    if frame_index == 0 {
      alert(&crate::session::SessionError::NoFileSelected);
    }
    info!("任务完成，共 {} 张，失败 {} 张", frame_index, failures);
    Ok(())
  }
}
