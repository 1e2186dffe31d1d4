//! Gemini API連携
//!
//! generateContent エンドポイントへの解析・チャット呼び出し

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use fridge_chef_common::{
    analysis_response_schema, build_chat_system_instruction, parse_analysis_response,
    AnalysisResult, ChatMessage, ChatRole, ImagePayload, ANALYSIS_PROMPT, CHAT_FALLBACK_REPLY,
};

use super::{Inference, InferenceError};
use crate::config::Config;
use crate::error::{FridgeChefError, Result};

/// Gemini APIリクエスト
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Gemini APIレスポンス
#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// 先頭候補のテキストパートを連結
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// ローカルの発言者をリモートの役割名へ
fn remote_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    }
}

fn build_analysis_request(image: &ImagePayload) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user"),
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type().to_string(),
                        data: image.base64_data(),
                    },
                },
                Part::Text {
                    text: ANALYSIS_PROMPT.to_string(),
                },
            ],
        }],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: analysis_response_schema(),
        }),
    }
}

fn build_chat_request(
    question: &str,
    context: &AnalysisResult,
    history: &[ChatMessage],
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|msg| Content {
            role: Some(remote_role(msg.role)),
            parts: vec![Part::Text {
                text: msg.content.clone(),
            }],
        })
        .collect();

    contents.push(Content {
        role: Some("user"),
        parts: vec![Part::Text {
            text: question.to_string(),
        }],
    });

    GenerateContentRequest {
        contents,
        system_instruction: Some(Content {
            role: None,
            parts: vec![Part::Text {
                text: build_chat_system_instruction(context),
            }],
        }),
        generation_config: None,
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| FridgeChefError::Config(format!("HTTP client: {}", e)))?;

        let api_key = config.get_api_key();
        if api_key.is_none() {
            warn!("no API key configured; inference calls will fail");
        }

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// generateContent 呼び出し（共通処理）
    async fn generate(&self, request: &GenerateContentRequest) -> std::result::Result<String, InferenceError> {
        let api_key = self.api_key.as_deref().ok_or(InferenceError::MissingApiKey)?;

        debug!(model = %self.model, turns = request.contents.len(), "calling generateContent");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generateContent failed");
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;

        let text = payload.text();
        debug!(chars = text.len(), "generateContent returned");
        Ok(text)
    }
}

#[async_trait]
impl Inference for GeminiClient {
    async fn analyze(&self, image: &ImagePayload) -> std::result::Result<AnalysisResult, InferenceError> {
        let request = build_analysis_request(image);
        let text = self.generate(&request).await?;
        Ok(parse_analysis_response(&text)?)
    }

    async fn ask(
        &self,
        question: &str,
        context: &AnalysisResult,
        history: &[ChatMessage],
    ) -> std::result::Result<String, InferenceError> {
        let request = build_chat_request(question, context, history);
        let text = self.generate(&request).await?;

        if text.trim().is_empty() {
            return Ok(CHAT_FALLBACK_REPLY.to_string());
        }
        Ok(text)
    }
}
