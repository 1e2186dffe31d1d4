//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use fridge_chef::acquire::{acquire, ImageSource};
use fridge_chef::error::FridgeChefError;
use fridge_chef::inference::{GeminiClient, Inference, InferenceError};
use fridge_chef_common::{AnalysisResult, ImagePayload};
use tempfile::tempdir;

/// 存在しないファイルを指定した場合
#[tokio::test]
async fn test_acquire_nonexistent_file() {
    let source: ImageSource = "/nonexistent/path/12345/fridge.jpg".parse().unwrap();
    let err = acquire(&source, 0).await.unwrap_err();

    assert!(matches!(err, FridgeChefError::FileNotFound(_)));
    assert!(!err.is_rejection());
}

/// 画像以外のファイルは拒否される
#[tokio::test]
async fn test_acquire_rejects_non_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "milk, eggs").unwrap();

    let err = acquire(&ImageSource::Path(path), 0).await.unwrap_err();
    assert!(err.is_rejection());
    assert!(err.to_string().contains("Please select an image file"));
}

/// 画像以外の data URL も拒否される
#[tokio::test]
async fn test_acquire_rejects_non_image_data_url() {
    let source: ImageSource = "data:text/plain;base64,aGVsbG8=".parse().unwrap();
    let err = acquire(&source, 0).await.unwrap_err();
    assert!(err.is_rejection());
}

/// FridgeChefErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        FridgeChefError::Config("テスト設定エラー".to_string()),
        FridgeChefError::FileNotFound("fridge.jpg".to_string()),
        FridgeChefError::ImageRejected("text/plain".to_string()),
        FridgeChefError::ImageLoad("壊れた画像".to_string()),
        FridgeChefError::Cache("書き込み失敗".to_string()),
        FridgeChefError::Inference(InferenceError::EmptyResponse),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 推論エラーはそのままのメッセージで表示される
#[test]
fn test_inference_error_is_transparent() {
    let err: FridgeChefError = InferenceError::Status {
        status: 403,
        body: "forbidden".into(),
    }
    .into();
    assert_eq!(err.to_string(), "API error (403): forbidden");
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = InferenceError::MissingApiKey.to_string();

    assert!(display.contains("GEMINI_API_KEY"));
    assert!(display.contains("fridge-chef config"));
}

/// APIキーなしでは通信せずに失敗する
#[tokio::test]
async fn test_missing_key_fails_every_call() {
    // 到達できないアドレス。通信すれば Transport になる
    let client = GeminiClient::new(None, "test-model", "http://127.0.0.1:9");
    let image = ImagePayload::new("image/jpeg", vec![0xFF, 0xD8]);

    assert_eq!(client.analyze(&image).await, Err(InferenceError::MissingApiKey));
    assert_eq!(
        client.ask("Salt?", &AnalysisResult::default(), &[]).await,
        Err(InferenceError::MissingApiKey)
    );
}

/// 共通クレートのエラー変換
#[test]
fn test_common_error_conversion() {
    let err: FridgeChefError = fridge_chef_common::Error::InvalidDataUrl("no comma".into()).into();
    assert!(matches!(err, FridgeChefError::Common(_)));
    assert!(err.to_string().contains("no comma"));

    let err: InferenceError = fridge_chef_common::Error::EmptyResponse.into();
    assert_eq!(err, InferenceError::EmptyResponse);
}

/// 不正なJSON設定ファイル
#[test]
fn test_invalid_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = fridge_chef::config::Config::load_from(&path);
    assert!(result.is_err());
}

/// エラーのDebug実装確認
#[test]
fn test_error_debug() {
    let err = FridgeChefError::Config("テスト".to_string());
    let debug = format!("{:?}", err);

    assert!(debug.contains("Config"));
}
