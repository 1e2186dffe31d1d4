//! 推論クライアント
//!
//! 2種類の呼び出し:
//! - analyze: 画像 → 固定スキーマのJSON（AnalysisResult）
//! - ask: 解析結果と履歴を文脈にした自由記述の回答
//!
//! どちらも内部リトライなしの1回の呼び出し。

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use fridge_chef_common::{AnalysisResult, ChatMessage, ImagePayload};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("API key is not set. Export GEMINI_API_KEY or run `fridge-chef config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("{}", fridge_chef_common::EMPTY_ANALYSIS_MESSAGE)]
    EmptyResponse,

    #[error("Could not read the AI response: {0}")]
    Parse(String),
}

impl From<fridge_chef_common::Error> for InferenceError {
    fn from(e: fridge_chef_common::Error) -> Self {
        match e {
            fridge_chef_common::Error::EmptyResponse => InferenceError::EmptyResponse,
            other => InferenceError::Parse(other.to_string()),
        }
    }
}

#[async_trait]
pub trait Inference: Send + Sync {
    /// 画像を解析して食材とレシピを返す
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, InferenceError>;

    /// フォローアップの質問に答える
    ///
    /// `history` には今回の質問を含めない
    async fn ask(
        &self,
        question: &str,
        context: &AnalysisResult,
        history: &[ChatMessage],
    ) -> Result<String, InferenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_common_empty_response() {
        let err: InferenceError = fridge_chef_common::Error::EmptyResponse.into();
        assert_eq!(err, InferenceError::EmptyResponse);
    }

    #[test]
    fn test_from_common_parse() {
        let err: InferenceError = fridge_chef_common::Error::Parse("bad".into()).into();
        assert!(matches!(err, InferenceError::Parse(msg) if msg.contains("bad")));
    }

    #[test]
    fn test_empty_response_display() {
        assert_eq!(
            InferenceError::EmptyResponse.to_string(),
            fridge_chef_common::EMPTY_ANALYSIS_MESSAGE
        );
    }

    #[test]
    fn test_from_common_json_shape_error() {
        let common = fridge_chef_common::parse_analysis_response(r#"{"detectedIngredients": []}"#).unwrap_err();
        let err: InferenceError = common.into();
        assert!(matches!(err, InferenceError::Parse(msg) if msg.contains("suggestedRecipes")));
    }

    #[test]
    fn test_status_display() {
        let err = InferenceError::Status {
            status: 429,
            body: "quota".into(),
        };
        assert_eq!(err.to_string(), "API error (429): quota");
    }
}
