//! Configuration constants and types for stego-net.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Side length every network input is resized to.
pub const IMAGE_SIZE: usize = 128;

/// Channel count of every network input and output image.
pub const IMAGE_CHANNELS: usize = 3;

/// Base channel width of the codec backbone (doubles at each contracting stage).
pub const BASE_CHANNELS: usize = 32;

/// Weight of the secret-reconstruction term in the codec loss.
///
/// Values above 1.0 trade cover imperceptibility for secret fidelity.
pub const DEFAULT_SECRET_WEIGHT: f32 = 2.0;

/// Default learning rate for both training loops.
pub const DEFAULT_LEARNING_RATE: f64 = 1e-3;

/// Default codec training epochs.
pub const DEFAULT_CODEC_EPOCHS: usize = 5;

/// Default codec training batch size.
pub const DEFAULT_CODEC_BATCH: usize = 8;

/// Default detector training epochs.
pub const DEFAULT_DETECTOR_EPOCHS: usize = 10;

/// Default detector training batch size.
pub const DEFAULT_DETECTOR_BATCH: usize = 16;

/// Maximum number of stego images generated for the detector dataset.
pub const STEGO_DATASET_CAP: usize = 2000;

/// Default path of the persisted codec weights.
pub const DEFAULT_CODEC_MODEL: &str = "models/stego_codec.bin";

/// Default path of the persisted detector weights.
pub const DEFAULT_DETECTOR_MODEL: &str = "models/steganalysis.bin";

/// Configuration for codec training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecTrainConfig {
    /// Number of passes over the dataset.
    pub epochs: usize,

    /// Examples per gradient step.
    pub batch_size: usize,

    /// Adam learning rate.
    pub learning_rate: f64,

    /// Weight of the secret-reconstruction loss term.
    pub secret_weight: f32,

    /// Seed for epoch shuffling.
    pub seed: u64,
}

impl Default for CodecTrainConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_CODEC_EPOCHS,
            batch_size: DEFAULT_CODEC_BATCH,
            learning_rate: DEFAULT_LEARNING_RATE,
            secret_weight: DEFAULT_SECRET_WEIGHT,
            seed: 42,
        }
    }
}

impl CodecTrainConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be greater than 0".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch size must be greater than 0".into(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(
                "learning rate must be a positive finite number".into(),
            ));
        }
        if !(self.secret_weight.is_finite() && self.secret_weight > 0.0) {
            return Err(Error::InvalidConfig(
                "secret weight must be a positive finite number".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for detector training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorTrainConfig {
    /// Number of passes over the dataset.
    pub epochs: usize,

    /// Examples per gradient step.
    pub batch_size: usize,

    /// Adam learning rate.
    pub learning_rate: f64,

    /// Seed for epoch shuffling.
    pub seed: u64,
}

impl Default for DetectorTrainConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_DETECTOR_EPOCHS,
            batch_size: DEFAULT_DETECTOR_BATCH,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: 42,
        }
    }
}

impl DetectorTrainConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be greater than 0".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch size must be greater than 0".into(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(
                "learning rate must be a positive finite number".into(),
            ));
        }
        Ok(())
    }
}
