//! FridgeChef
//!
//! 冷蔵庫の写真をGeminiで解析し、食材とレシピを表示してチャットで相談するCLI

pub mod acquire;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod render;
pub mod repl;
pub mod session;
