use anyhow::{bail, Context, Result};
use burn::optim::AdamConfig;
use burn::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::model::{FeatureExtractorConfig, GeneratorConfig};
use crate::shared::constants;
use crate::utils::file_utils::ensure_dir;

/// Where the data comes from and where the run writes.
#[derive(Config, Debug)]
pub struct TrainerConfig {
    pub dataset_name: String,
    pub datasets_root: PathBuf,
    pub source_domain: String,
    pub target_domain: String,
    pub logdir: PathBuf,
    pub save_dir: PathBuf,
    pub result_dir: PathBuf,
    #[config(default = 256)]
    pub input_size: usize,
    #[config(default = 1)]
    pub batch_size: usize,
    #[config(default = true)]
    pub show_progress: bool,
}

/// Hyperparameters of the generator pretraining phase.
#[derive(Config)]
pub struct PretrainConfig {
    pub generator: GeneratorConfig,
    pub feature_extractor: FeatureExtractorConfig,
    pub optimizer: AdamConfig,
    #[config(default = false)]
    pub pass_vgg: bool,
    #[config(default = 1e-5)]
    pub learning_rate: f64,
    #[config(default = 3000)]
    pub num_iterations: usize,
    #[config(default = 16)]
    pub tracking_size: usize,
    #[config(default = 100)]
    pub reporting_steps: usize,
    #[config(default = 0)]
    pub seed: u64,
    pub vgg_weights: Option<PathBuf>,
}

impl TrainerConfig {
    pub fn with_defaults(dataset_name: &str) -> Self {
        TrainerConfig::new(
            dataset_name.to_string(),
            PathBuf::from(constants::DATASETS_ROOT),
            "A".to_string(),
            "B".to_string(),
            PathBuf::from("runs"),
            PathBuf::from("ckpts"),
            PathBuf::from(constants::RESULT_DIR),
        )
    }

    pub fn source_dir(&self) -> PathBuf {
        crate::dataset::ImageDataset::domain_dir(
            &self.datasets_root,
            &self.dataset_name,
            &self.source_domain,
        )
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.save_dir.join(constants::CHECKPOINT_NAME)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        // two stride-2 stages in the generator
        if self.input_size == 0 || self.input_size % 4 != 0 {
            bail!("input_size must be a positive multiple of 4, got {}", self.input_size);
        }
        Ok(())
    }
}

/// Adam with epsilon 1e-8; burn's default is 1e-5.
pub fn adam() -> AdamConfig {
    AdamConfig::new().with_epsilon(1e-8)
}

impl PretrainConfig {
    pub fn with_defaults() -> Self {
        PretrainConfig::new(GeneratorConfig::new(), FeatureExtractorConfig::new(), adam())
    }

    pub fn validate(&self) -> Result<()> {
        if self.reporting_steps == 0 {
            bail!("reporting_steps must be at least 1");
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            bail!("learning_rate must be positive, got {}", self.learning_rate);
        }
        Ok(())
    }

    /// Number of tracking batches captured at setup.
    pub fn tracking_batches(&self, batch_size: usize) -> usize {
        self.tracking_size / batch_size.max(1)
    }
}

#[derive(Serialize)]
struct RunSnapshot<'a> {
    trainer: &'a TrainerConfig,
    pretrain: &'a PretrainConfig,
}

/// Write both configs to `<logdir>/pretrain_config.json`.
pub fn save_run_config(trainer: &TrainerConfig, pretrain: &PretrainConfig) -> Result<PathBuf> {
    ensure_dir(&trainer.logdir)?;
    let path = trainer.logdir.join(constants::RUN_CONFIG_FILE);
    let json = serde_json::to_string_pretty(&RunSnapshot { trainer, pretrain })?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

pub fn load_run_config(path: &Path) -> Result<(TrainerConfig, PretrainConfig)> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let trainer = serde_json::from_value(value["trainer"].clone())?;
    let pretrain = serde_json::from_value(value["pretrain"].clone())?;
    Ok((trainer, pretrain))
}
