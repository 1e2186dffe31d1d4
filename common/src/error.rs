//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{}", crate::prompts::EMPTY_ANALYSIS_MESSAGE)]
    EmptyResponse,

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Not an image: {0}")]
    ImageRejected(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        let display = format!("{}", error);
        assert!(display.contains("JSON error"));
    }

    #[test]
    fn test_error_display_parse() {
        let error = Error::Parse("JSON not found".to_string());
        assert_eq!(format!("{}", error), "Parse error: JSON not found");
    }

    #[test]
    fn test_error_display_empty_response() {
        let error = Error::EmptyResponse;
        assert_eq!(format!("{}", error), crate::prompts::EMPTY_ANALYSIS_MESSAGE);
    }

    #[test]
    fn test_error_display_image_rejected() {
        let error = Error::ImageRejected("text/plain".to_string());
        let display = format!("{}", error);
        assert!(display.contains("Not an image"));
        assert!(display.contains("text/plain"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
