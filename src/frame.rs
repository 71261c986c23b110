// 该文件是 Soilveg （土壤植被检测） 项目的一部分。
// src/frame.rs - 待上传图像定义
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

use std::path::Path;

use image::{ImageFormat, RgbImage};

const IMAGE_MEDIA_PREFIX: &str = "image/";

/// 用户选中的图像
///
/// `data` 是实际发送给预测服务的字节，`preview` 是同一图像解码后的预览。
/// 两者在选择时一起生成，因此任何请求发出之前预览一定存在。
#[derive(Debug, Clone)]
pub struct SelectedImage {
  file_name: String,
  media_type: String,
  data: Box<[u8]>,
  preview: RgbImage,
}

impl SelectedImage {
  pub fn new(
    file_name: impl Into<String>,
    media_type: impl Into<String>,
    data: Vec<u8>,
    preview: RgbImage,
  ) -> Self {
    Self {
      file_name: file_name.into(),
      media_type: media_type.into(),
      data: data.into_boxed_slice(),
      preview,
    }
  }

  pub fn file_name(&self) -> &str {
    &self.file_name
  }

  pub fn media_type(&self) -> &str {
    &self.media_type
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn preview(&self) -> &RgbImage {
    &self.preview
  }

  pub fn width(&self) -> u32 {
    self.preview.width()
  }

  pub fn height(&self) -> u32 {
    self.preview.height()
  }
}

/// 推断文件的媒体类型，先看内容再看扩展名
///
/// 只返回 `image/*` 类型，其它情况返回 `None`。
pub fn guess_image_media_type(path: &Path, data: &[u8]) -> Option<&'static str> {
  image::guess_format(data)
    .or_else(|_| ImageFormat::from_path(path))
    .ok()
    .map(|format| format.to_mime_type())
    .filter(|mime| mime.starts_with(IMAGE_MEDIA_PREFIX))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  fn png_bytes() -> Vec<u8> {
    let image = RgbImage::from_pixel(4, 4, image::Rgb([10, 200, 30]));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
  }

  #[test]
  fn content_wins_over_extension() {
    let media = guess_image_media_type(Path::new("field.jpg"), &png_bytes());
    assert_eq!(media, Some("image/png"));
  }

  #[test]
  fn falls_back_to_extension() {
    let media = guess_image_media_type(Path::new("field.jpeg"), b"not really a header");
    assert_eq!(media, Some("image/jpeg"));
  }

  #[test]
  fn rejects_non_images() {
    assert_eq!(guess_image_media_type(Path::new("notes.txt"), b"hello"), None);
  }
}
