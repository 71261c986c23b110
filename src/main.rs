// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use soilveg::{
  FromUrl,
  input::InputWrapper,
  model::RemoteModelBuilder,
  output::OutputWrapper,
  task::{OneShotTask, Task},
  utils::init_tracing,
};

fn main() -> Result<()> {
  let args = args::Args::parse();
  init_tracing(args.verbose);

  info!("输入来源: {}", args.input);
  info!("模型类型: {}", args.model_type);
  info!("预测服务: {}", args.endpoint);
  info!("归一化: {:?}", args.normalize());

  let input = InputWrapper::from_url(&args.input)?.with_normalize(args.normalize());
  let model = RemoteModelBuilder::from_url(&args.endpoint)?
    .timeout(args.timeout.map(Duration::from_secs))
    .build()?;
  let output = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  OneShotTask::default()
    .with_model_choice(args.model_type)
    .run_task(input, model, output)?;

  Ok(())
}
