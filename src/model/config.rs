use anyhow::{Context, Result};
use candle_core::Device;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use super::ModelHandle;
use crate::environment::Settings;
use crate::TARGET_MODEL;

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Configuration for the extractive question-answering model
#[derive(Debug, Clone)]
pub struct QaModelConfig {
    pub handle: ModelHandle,
    pub models_dir: PathBuf,
    pub weights_file: String,
    pub max_seq_len: usize,
    pub max_answer_len: usize,
    pub device: Device,
}

impl QaModelConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            handle: settings.qa_model.clone(),
            models_dir: settings.models_dir.clone(),
            weights_file: settings.qa_weights_file.clone(),
            max_seq_len: settings.qa_max_seq_len,
            max_answer_len: settings.qa_max_answer_len,
            device: Device::Cpu,
        }
    }

    pub fn model_dir(&self) -> PathBuf {
        self.handle.cache_dir(&self.models_dir)
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model_dir().join(&self.weights_file)
    }

    pub fn config_path(&self) -> PathBuf {
        self.model_dir().join(CONFIG_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join(TOKENIZER_FILE)
    }

    /// Download any model file missing from the local cache.
    pub async fn ensure_models_exist(&self) -> Result<()> {
        let dir = self.model_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        for file in [CONFIG_FILE, TOKENIZER_FILE, self.weights_file.as_str()] {
            download_if_missing(&self.handle, file, &dir.join(file)).await?;
        }

        Ok(())
    }
}

async fn download_if_missing(handle: &ModelHandle, file: &str, path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let url = handle.file_url(file);
    info!(target: TARGET_MODEL, "Downloading {} from {}", file, url);
    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("Failed to request {}", url))?
        .error_for_status()
        .with_context(|| format!("Download of {} refused", url))?;
    let bytes = response.bytes().await?;
    fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(target: TARGET_MODEL, "Downloaded {} to {}", file, path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_handle() {
        let settings = Settings::default();
        let config = QaModelConfig::from_settings(&settings);
        assert_eq!(
            config.weights_path(),
            PathBuf::from("models/deepset--bert-base-cased-squad2/main/model.safetensors")
        );
        assert!(config.tokenizer_path().ends_with("tokenizer.json"));
    }

    #[tokio::test]
    async fn test_existing_files_are_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = QaModelConfig::from_settings(&Settings::default());
        config.models_dir = dir.path().to_path_buf();
        config.handle = ModelHandle::new("local/model", "v1");

        let model_dir = config.model_dir();
        std::fs::create_dir_all(&model_dir).unwrap();
        for file in [CONFIG_FILE, TOKENIZER_FILE, "model.safetensors"] {
            std::fs::write(model_dir.join(file), b"{}").unwrap();
        }

        assert!(config.ensure_models_exist().await.is_ok());
    }
}
