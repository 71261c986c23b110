// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/bin/simple_continueshot.rs - 连续批量预测
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use url::Url;

use soilveg::{
  FromUrl,
  input::{DEFAULT_SQUARE_SIDE, InputWrapper, Normalize},
  model::{DEFAULT_ENDPOINT, ModelChoice, RemoteModelBuilder},
  output::OutputWrapper,
  task::{ContinuousTask, Task},
  utils::init_tracing,
};
use tracing::info;

/// Soilveg 连续预测参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源，通常是 folder:/path/to/photos
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出位置，可重复
  #[arg(long, value_name = "OUTPUT", default_value = "console:")]
  pub output: Vec<Url>,
  /// 检测任务类型
  #[arg(long, value_enum, default_value_t = ModelChoice::SoilDetection)]
  pub model_type: ModelChoice,
  /// 预测服务地址
  #[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
  pub endpoint: Url,
  /// 上传前拉伸到的正方形边长，0 表示原样上传
  #[arg(long, value_name = "SIDE", default_value_t = DEFAULT_SQUARE_SIDE)]
  pub resize: u32,
  /// 请求超时（秒）
  #[arg(long, value_name = "SECONDS")]
  pub timeout: Option<u64>,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,

  #[arg(short, long)]
  pub verbose: bool,
}

fn main() -> Result<()> {
  let args = Args::parse();
  init_tracing(args.verbose);

  info!("输入来源: {}", args.input);
  info!("预测服务: {}", args.endpoint);
  info!("输出路径: {:?}", args.output);

  let input =
    InputWrapper::from_url(&args.input)?.with_normalize(Normalize::from_side(args.resize));
  let model = RemoteModelBuilder::from_url(&args.endpoint)?
    .timeout(args.timeout.map(Duration::from_secs))
    .build()?;
  let output = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  ContinuousTask::default()
    .with_model_choice(args.model_type)
    .with_frame_number(args.frame_number)
    .run_task(input, model, output)?;

  Ok(())
}
