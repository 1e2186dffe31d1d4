//! FridgeChef Common Library
//!
//! CLIと将来のフロントエンドで共有される型・プロンプト・状態遷移

pub mod types;
pub mod error;
pub mod data_url;
pub mod prompts;
pub mod schema;
pub mod parser;
pub mod state;

pub use types::{AnalysisResult, ChatMessage, ChatRole, Difficulty, ImagePayload, Recipe};
pub use error::{Error, Result};
pub use data_url::{extract_base64_from_data_url, extract_mime_type_from_data_url, is_image_mime};
pub use prompts::{
    build_chat_system_instruction, ANALYSIS_FAILURE_MESSAGE, ANALYSIS_PROMPT,
    CHAT_FAILURE_REPLY, CHAT_FALLBACK_REPLY, CHAT_GREETING, EMPTY_ANALYSIS_MESSAGE,
};
pub use schema::analysis_response_schema;
pub use parser::{extract_json, parse_analysis_response};
pub use state::{transition, AppState, Command, Generation, Intent, Phase};
