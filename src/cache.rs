//! 解析結果キャッシュモジュール
//!
//! 画像（MIMEタイプ + バイト列）のSHA-256をキーにして解析結果をキャッシュし、
//! 同じ写真の再解析をスキップする。チャットはキャッシュしない。

use crate::error::{FridgeChefError, Result};
use crate::inference::{Inference, InferenceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fridge_chef_common::{AnalysisResult, ChatMessage, ImagePayload};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const CACHE_FILE_NAME: &str = "analysis-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 画像ハッシュ → 解析結果のマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub mime_type: String,
    pub size: u64,
    pub cached_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    /// 既定のキャッシュディレクトリ
    pub fn default_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir()
            .ok_or_else(|| FridgeChefError::Cache("cache directory not found".into()))?;
        Ok(base.join("fridge-chef"))
    }

    pub fn cache_path(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（壊れていれば空）
    pub fn load(dir: &Path) -> Self {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        match serde_json::from_reader::<_, CacheFile>(BufReader::new(file)) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                warn!("cache version mismatch, starting fresh");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "unreadable cache, starting fresh");
                Self::default()
            }
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(Self::cache_path(dir))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// キャッシュファイルを削除。存在しなければ false
    pub fn clear(dir: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    pub fn get(&self, hash: &str) -> Option<&AnalysisResult> {
        self.entries.get(hash).map(|e| &e.result)
    }

    pub fn insert(&mut self, hash: String, image: &ImagePayload, result: AnalysisResult) {
        self.entries.insert(
            hash,
            CacheEntry {
                mime_type: image.mime_type().to_string(),
                size: image.len() as u64,
                cached_at: Utc::now(),
                result,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// 画像のハッシュ（SHA-256, hex）
pub fn compute_image_hash(image: &ImagePayload) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.mime_type().as_bytes());
    hasher.update([0u8]);
    hasher.update(image.data());
    hex::encode(hasher.finalize())
}

/// 解析結果をキャッシュする Inference ラッパー
pub struct CachedInference<I> {
    inner: I,
    dir: PathBuf,
    cache: Mutex<CacheFile>,
    /// 書き出しは1件ずつ、新しいスナップショットが後に書かれる
    writer: tokio::sync::Mutex<()>,
}

impl<I: Inference> CachedInference<I> {
    pub fn new(inner: I, dir: PathBuf) -> Self {
        let cache = CacheFile::load(&dir);
        debug!(entries = cache.len(), dir = %dir.display(), "analysis cache loaded");
        Self {
            inner,
            dir,
            cache: Mutex::new(cache),
            writer: tokio::sync::Mutex::new(()),
        }
    }

    fn lookup(&self, hash: &str) -> Option<AnalysisResult> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(hash).cloned()
    }

    /// メモリ上に追加し、スナップショットをブロッキングスレッドで書き出す
    async fn store(&self, hash: String, image: &ImagePayload, result: AnalysisResult) {
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.insert(hash, image, result);
        }

        let _writing = self.writer.lock().await;
        let snapshot = self.cache.lock().unwrap_or_else(|e| e.into_inner()).clone();

        let dir = self.dir.clone();
        let saved = tokio::task::spawn_blocking(move || snapshot.save(&dir)).await;
        // 保存失敗は解析結果に影響させない
        match saved {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "failed to save analysis cache"),
            Err(e) => warn!(error = %e, "analysis cache writer aborted"),
        }
    }
}

#[async_trait]
impl<I: Inference> Inference for CachedInference<I> {
    async fn analyze(&self, image: &ImagePayload) -> std::result::Result<AnalysisResult, InferenceError> {
        let hash = compute_image_hash(image);
        if let Some(result) = self.lookup(&hash) {
            debug!(%hash, "analysis cache hit");
            return Ok(result);
        }

        let result = self.inner.analyze(image).await?;
        self.store(hash, image, result.clone()).await;
        Ok(result)
    }

    async fn ask(
        &self,
        question: &str,
        context: &AnalysisResult,
        history: &[ChatMessage],
    ) -> std::result::Result<String, InferenceError> {
        self.inner.ask(question, context, history).await
    }
}
