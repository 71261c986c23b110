// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use clap::Parser;
use url::Url;

use soilveg::{
  input::{DEFAULT_SQUARE_SIDE, Normalize},
  model::{DEFAULT_ENDPOINT, ModelChoice},
};

/// Soilveg 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  /// 支持格式:
  /// - 图片: image:/path/to/photo.jpg
  /// - 目录: folder:/path/to/photos
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出位置，可重复
  /// 支持格式:
  /// - 控制台: console:
  /// - 图片: image:/path/to/result.jpg
  /// - 目录记录: folder:/path/to/records?always&input
  /// - HTML 报告: html:/path/to/report.html
  #[arg(long, value_name = "OUTPUT", default_value = "console:")]
  pub output: Vec<Url>,

  /// 检测任务类型
  #[arg(long, value_enum, default_value_t = ModelChoice::SoilDetection)]
  pub model_type: ModelChoice,

  /// 预测服务地址
  #[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
  pub endpoint: Url,

  /// 上传前拉伸到的正方形边长，0 表示原样上传
  #[arg(long, value_name = "SIDE", default_value_t = DEFAULT_SQUARE_SIDE, conflicts_with = "no_resize")]
  pub resize: u32,

  /// 原样上传，不做归一化
  #[arg(long)]
  pub no_resize: bool,

  /// 请求超时（秒），默认不超时
  #[arg(long, value_name = "SECONDS")]
  pub timeout: Option<u64>,

  /// 输出调试日志
  #[arg(short, long)]
  pub verbose: bool,
}

impl Args {
  pub fn normalize(&self) -> Normalize {
    if self.no_resize {
      Normalize::Original
    } else {
      Normalize::from_side(self.resize)
    }
  }
}
