//! Deployed-model registry.
//!
//! An explicitly constructed holder for the two deployed models, loaded once
//! at process start and read by every inference pipeline. Each slot loads
//! independently: a missing or corrupt codec record must never take the
//! detector down with it, and vice versa. A failed slot keeps its typed
//! failure cause so callers get a precise "not loaded" error instead of a
//! crash.

use crate::codec::StegoCodec;
use crate::config::{DEFAULT_CODEC_MODEL, DEFAULT_DETECTOR_MODEL};
use crate::detector::Detector;
use crate::error::{Error, Result};
use crate::{InferenceBackend, InferenceDevice};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Locations of the persisted model records.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    /// Codec weight file.
    pub codec: PathBuf,
    /// Detector weight file.
    pub detector: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            codec: PathBuf::from(DEFAULT_CODEC_MODEL),
            detector: PathBuf::from(DEFAULT_DETECTOR_MODEL),
        }
    }
}

/// A registry slot: either a loaded model or the reason it is unavailable.
#[derive(Debug)]
pub enum ModelSlot<M> {
    /// The model loaded successfully.
    Loaded(M),
    /// Loading failed; the cause is kept for reporting.
    Unavailable(Error),
}

impl<M> ModelSlot<M> {
    /// Whether the slot holds a usable model.
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelSlot::Loaded(_))
    }

    /// The load failure, if any.
    pub fn failure(&self) -> Option<&Error> {
        match self {
            ModelSlot::Loaded(_) => None,
            ModelSlot::Unavailable(err) => Some(err),
        }
    }

    fn get(&self, slot: &'static str) -> Result<&M> {
        match self {
            ModelSlot::Loaded(model) => Ok(model),
            ModelSlot::Unavailable(err) => Err(Error::ModelNotLoaded {
                slot,
                reason: err.to_string(),
            }),
        }
    }
}

/// Read-only holder of the deployed codec and detector.
#[derive(Debug)]
pub struct ModelRegistry {
    device: InferenceDevice,
    codec: ModelSlot<StegoCodec<InferenceBackend>>,
    detector: ModelSlot<Detector<InferenceBackend>>,
}

impl ModelRegistry {
    /// Attempt to load both models. Failures degrade the affected slot and
    /// are logged; construction itself never fails.
    pub fn load(paths: &ModelPaths, device: &InferenceDevice) -> Self {
        info!("model loading start");

        let codec = load_slot("stego", &paths.codec, |path| {
            StegoCodec::load(path, device)
        });
        let detector = load_slot("detect", &paths.detector, |path| {
            Detector::load(path, device)
        });

        info!("model loading end");
        Self {
            device: device.clone(),
            codec,
            detector,
        }
    }

    /// The device models were loaded onto.
    pub fn device(&self) -> &InferenceDevice {
        &self.device
    }

    /// The codec, or a "not loaded" error carrying the failure cause.
    pub fn codec(&self) -> Result<&StegoCodec<InferenceBackend>> {
        self.codec.get("stego")
    }

    /// The detector, or a "not loaded" error carrying the failure cause.
    pub fn detector(&self) -> Result<&Detector<InferenceBackend>> {
        self.detector.get("detect")
    }

    /// The codec slot, for status reporting.
    pub fn codec_slot(&self) -> &ModelSlot<StegoCodec<InferenceBackend>> {
        &self.codec
    }

    /// The detector slot, for status reporting.
    pub fn detector_slot(&self) -> &ModelSlot<Detector<InferenceBackend>> {
        &self.detector
    }
}

fn load_slot<M>(
    name: &'static str,
    path: &Path,
    loader: impl FnOnce(&Path) -> Result<M>,
) -> ModelSlot<M> {
    match loader(path) {
        Ok(model) => {
            info!(slot = name, path = %path.display(), "model loaded");
            ModelSlot::Loaded(model)
        }
        Err(err) => {
            warn!(slot = name, path = %path.display(), error = %err, "model unavailable");
            ModelSlot::Unavailable(err)
        }
    }
}
