//! On-disk training datasets.
//!
//! Datasets are flat directories of individually decodable images. Directory
//! contents are matched by sorted filename order, never by metadata. Pairing
//! covers with secrets is positional, not semantic; the strategy is an
//! explicit parameter so the training loop never hard-codes it.

mod generate;

pub use generate::generate_stego_dataset;

use crate::detector::Label;
use crate::error::{Error, Result};
use crate::transform;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// How covers and secrets are matched into training pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingStrategy {
    /// Zip both directories in sorted filename order (the documented default).
    SortedFilename,
    /// Keep covers sorted but permute the secrets with a seeded shuffle.
    Shuffled { seed: u64 },
}

impl Default for PairingStrategy {
    fn default() -> Self {
        PairingStrategy::SortedFilename
    }
}

/// List the files of a flat dataset directory in sorted filename order.
///
/// Subdirectories and hidden files are skipped; decodability is checked later
/// at load time so one bad file never hides the rest of the directory.
fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    if files.is_empty() {
        return Err(Error::EmptyDataset(dir.to_path_buf()));
    }
    Ok(files)
}

fn load_tensor<B: Backend>(path: &Path, device: &B::Device) -> Option<Tensor<B, 3>> {
    match transform::open(path) {
        Ok(img) => Some(transform::to_tensor(&img, device)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping undecodable image");
            None
        }
    }
}

/// (cover, secret) pairs for codec training.
#[derive(Debug, Clone)]
pub struct ImagePairDataset {
    pairs: Vec<(PathBuf, PathBuf)>,
}

impl ImagePairDataset {
    /// Pair the two directories according to `strategy`, truncating to the
    /// shorter list's length.
    pub fn load(cover_dir: &Path, secret_dir: &Path, strategy: PairingStrategy) -> Result<Self> {
        let covers = list_images(cover_dir)?;
        let mut secrets = list_images(secret_dir)?;

        if let PairingStrategy::Shuffled { seed } = strategy {
            let mut rng = StdRng::seed_from_u64(seed);
            secrets.shuffle(&mut rng);
        }

        let pairs = covers.into_iter().zip(secrets).collect();
        Ok(Self { pairs })
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the dataset holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The paths of a single pair.
    pub fn paths(&self, index: usize) -> Option<(&Path, &Path)> {
        self.pairs
            .get(index)
            .map(|(c, s)| (c.as_path(), s.as_path()))
    }

    /// Load one pair as tensors. Returns `None` (after logging) if either
    /// side fails to decode; a bad pair never aborts an epoch.
    pub fn load_pair<B: Backend>(
        &self,
        index: usize,
        device: &B::Device,
    ) -> Option<(Tensor<B, 3>, Tensor<B, 3>)> {
        let (cover_path, secret_path) = &self.pairs[index];
        let cover = load_tensor(cover_path, device)?;
        let secret = load_tensor(secret_path, device)?;
        Some((cover, secret))
    }

    /// Load and stack the pairs at `indices` into `[n, 3, 128, 128]` batch
    /// tensors, skipping pairs that fail to decode.
    pub fn batch<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device,
    ) -> Option<(Tensor<B, 4>, Tensor<B, 4>)> {
        let mut covers = Vec::with_capacity(indices.len());
        let mut secrets = Vec::with_capacity(indices.len());
        for &index in indices {
            if let Some((cover, secret)) = self.load_pair(index, device) {
                covers.push(cover);
                secrets.push(secret);
            }
        }
        if covers.is_empty() {
            return None;
        }
        Some((Tensor::stack(covers, 0), Tensor::stack(secrets, 0)))
    }
}

/// Labeled (image, label) examples for detector training: every image of the
/// clean directory (label 0) followed by every image of the stego directory
/// (label 1), each class in sorted filename order.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    entries: Vec<(PathBuf, Label)>,
}

impl LabeledDataset {
    /// Combine a clean-image directory and a stego-image directory.
    pub fn load(clean_dir: &Path, stego_dir: &Path) -> Result<Self> {
        let mut entries: Vec<(PathBuf, Label)> = list_images(clean_dir)?
            .into_iter()
            .map(|p| (p, Label::Clean))
            .collect();
        entries.extend(
            list_images(stego_dir)?
                .into_iter()
                .map(|p| (p, Label::Stego)),
        );
        Ok(Self { entries })
    }

    /// Number of labeled examples.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dataset holds no examples.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The label of a single entry.
    pub fn label(&self, index: usize) -> Option<Label> {
        self.entries.get(index).map(|(_, label)| *label)
    }

    /// Load and stack the examples at `indices` into an `[n, 3, 128, 128]`
    /// image batch and an `[n]` integer label batch, skipping undecodable
    /// images.
    pub fn batch<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device,
    ) -> Option<(Tensor<B, 4>, Tensor<B, 1, Int>)> {
        let mut images = Vec::with_capacity(indices.len());
        let mut labels = Vec::with_capacity(indices.len());
        for &index in indices {
            let (path, label) = &self.entries[index];
            if let Some(image) = load_tensor(path, device) {
                images.push(image);
                labels.push(label.index());
            }
        }
        if images.is_empty() {
            return None;
        }
        let count = labels.len();
        let labels = Tensor::from_data(TensorData::new(labels, [count]), device);
        Some((Tensor::stack(images, 0), labels))
    }
}
