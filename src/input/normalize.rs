// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/input/normalize.rs - 上传前图像归一化
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

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType};
use thiserror::Error;
use tracing::debug;

use crate::frame::SelectedImage;

pub const DEFAULT_SQUARE_SIDE: u32 = 640;
const NORMALIZED_MEDIA_TYPE: &str = "image/jpeg";
const JPEG_QUALITY: u8 = 92;

#[derive(Error, Debug)]
pub enum NormalizeError {
  #[error("图像解码/编码错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("无效的目标边长: {0}")]
  InvalidSide(u32),
}

/// 上传前的图像处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
  /// 原样上传
  Original,
  /// 拉伸为 side x side 的正方形并重新编码为 JPEG，不保留长宽比
  Square(u32),
}

impl Default for Normalize {
  fn default() -> Self {
    Normalize::Square(DEFAULT_SQUARE_SIDE)
  }
}

impl Normalize {
  /// 命令行边长参数，0 表示原样上传
  pub fn from_side(side: u32) -> Self {
    match side {
      0 => Normalize::Original,
      side => Normalize::Square(side),
    }
  }

  pub fn apply(
    self,
    file_name: &str,
    media_type: &str,
    data: Vec<u8>,
  ) -> Result<SelectedImage, NormalizeError> {
    if let Normalize::Square(0) = self {
      return Err(NormalizeError::InvalidSide(0));
    }

    let decoded = image::load_from_memory(&data)?;
    debug!(
      "解码图像 {}: {}x{} ({})",
      file_name,
      decoded.width(),
      decoded.height(),
      media_type
    );

    match self {
      Normalize::Original => Ok(SelectedImage::new(
        file_name,
        media_type,
        data,
        decoded.to_rgb8(),
      )),
      Normalize::Square(side) => {
        let resized = decoded
          .resize_exact(side, side, FilterType::Triangle)
          .to_rgb8();
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).encode_image(&resized)?;
        debug!(
          "归一化为 {}x{} JPEG: {} -> {} 字节",
          side,
          side,
          data.len(),
          encoded.len()
        );
        Ok(SelectedImage::new(
          file_name,
          NORMALIZED_MEDIA_TYPE,
          encoded,
          resized,
        ))
      }
    }
  }
}
