use thiserror::Error;

use crate::inference::InferenceError;

#[derive(Error, Debug)]
pub enum FridgeChefError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Please select an image file ({0})")]
    ImageRejected(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Common(#[from] fridge_chef_common::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FridgeChefError {
    /// ユーザーに警告を出すだけで状態を変えない種類のエラーか
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FridgeChefError::ImageRejected(_)
                | FridgeChefError::Common(fridge_chef_common::Error::ImageRejected(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, FridgeChefError>;
