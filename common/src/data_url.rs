//! Data URL ユーティリティ
//!
//! "data:image/jpeg;base64,/9j/4AAQ..." 形式と ImagePayload の相互変換

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};
use crate::types::ImagePayload;

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Data URLからBase64データ部分を抽出
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split_once(',').map(|(_, data)| data)
}

/// Data URLからMIMEタイプを抽出
///
/// 抽出失敗時は "image/jpeg" をデフォルトとして返す
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .strip_prefix("data:")
        .and_then(|s| s.split([';', ',']).next())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// `image/*` かどうか
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .split_once('/')
        .map(|(top, sub)| top.eq_ignore_ascii_case("image") && !sub.is_empty())
        .unwrap_or(false)
}

impl ImagePayload {
    /// Data URLから生成
    ///
    /// 画像以外のMIMEタイプは `Error::ImageRejected`
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let data_url = data_url.trim();
        if !data_url.starts_with("data:") {
            return Err(Error::InvalidDataUrl("missing data: prefix".into()));
        }

        let encoded = extract_base64_from_data_url(data_url)
            .ok_or_else(|| Error::InvalidDataUrl("missing ',' separator".into()))?;

        let mime_type = extract_mime_type_from_data_url(data_url);
        if !is_image_mime(mime_type) {
            return Err(Error::ImageRejected(mime_type.to_string()));
        }

        let data = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::InvalidDataUrl(format!("base64: {}", e)))?;

        Ok(Self::new(mime_type, data))
    }

    /// Base64エンコードしたデータ部分
    pub fn base64_data(&self) -> String {
        STANDARD.encode(self.data())
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.base64_data())
    }
}
