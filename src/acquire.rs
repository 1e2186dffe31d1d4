//! 画像取得
//!
//! ファイルパスまたは Data URL から ImagePayload を作る。
//! 画像以外は拒否し、大きすぎる写真は縮小してから送る。

use crate::error::{FridgeChefError, Result};
use fridge_chef_common::{is_image_mime, ImagePayload};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::convert::Infallible;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// 画像の入力元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    DataUrl(String),
}

impl FromStr for ImageSource {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim_start().starts_with("data:") {
            Ok(ImageSource::DataUrl(s.trim().to_string()))
        } else {
            Ok(ImageSource::Path(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => write!(f, "{}", path.display()),
            ImageSource::DataUrl(url) => write!(f, "data URL ({} chars)", url.len()),
        }
    }
}

/// 画像を取得する
///
/// `max_edge` が0なら縮小しない
pub async fn acquire(source: &ImageSource, max_edge: u32) -> Result<ImagePayload> {
    let payload = match source {
        ImageSource::Path(path) => load_file(path).await?,
        ImageSource::DataUrl(url) => ImagePayload::from_data_url(url)?,
    };

    if max_edge == 0 {
        return Ok(payload);
    }

    tokio::task::spawn_blocking(move || downscale(payload, max_edge))
        .await
        .map_err(|e| FridgeChefError::ImageLoad(e.to_string()))?
}

async fn load_file(path: &Path) -> Result<ImagePayload> {
    if !path.is_file() {
        return Err(FridgeChefError::FileNotFound(path.display().to_string()));
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if !is_image_mime(mime.essence_str()) {
        return Err(FridgeChefError::ImageRejected(mime.essence_str().to_string()));
    }

    let data = tokio::fs::read(path).await?;
    if data.is_empty() {
        return Err(FridgeChefError::ImageLoad(format!("{} is empty", path.display())));
    }

    debug!(path = %path.display(), bytes = data.len(), mime = mime.essence_str(), "image loaded");
    Ok(ImagePayload::new(mime.essence_str(), data))
}

/// 長辺が `max_edge` を超えていればJPEGで縮小し直す
///
/// デコードできない形式はそのまま返す
fn downscale(payload: ImagePayload, max_edge: u32) -> Result<ImagePayload> {
    let img = match image::load_from_memory(payload.data()) {
        Ok(img) => img,
        Err(e) => {
            debug!(error = %e, "image not decodable, sending as-is");
            return Ok(payload);
        }
    };

    let (width, height) = img.dimensions();
    if width.max(height) <= max_edge {
        return Ok(payload);
    }

    let resized = img.resize(max_edge, max_edge, FilterType::Triangle);
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(resized.to_rgb8())
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .map_err(|e| FridgeChefError::ImageLoad(e.to_string()))?;

    debug!(
        from = %format!("{}x{}", width, height),
        to = %format!("{}x{}", resized.width(), resized.height()),
        "image downscaled"
    );
    Ok(ImagePayload::new("image/jpeg", buffer))
}
