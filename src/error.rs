//! Error types for stego-net.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stego-net operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stego-net operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file could not be decoded or encoded as an image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A tensor did not match the fixed network input contract.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        found: [usize; 3],
    },

    /// Two images passed to a metric have different dimensions.
    #[error("image dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },

    /// An image is too small for the metric window.
    #[error("image {width}x{height} is smaller than the {window}x{window} metric window")]
    ImageTooSmall { width: u32, height: u32, window: u32 },

    /// A dataset directory yielded no images.
    #[error("no images found in {0}")]
    EmptyDataset(PathBuf),

    /// Every image in a dataset failed to decode.
    #[error("no decodable images in dataset")]
    NoDecodableImages,

    /// A required model slot was never loaded.
    #[error("model '{slot}' not loaded: {reason}")]
    ModelNotLoaded { slot: &'static str, reason: String },

    /// A model weight file does not exist.
    #[error("model file not found: {0}")]
    ModelFileNotFound(PathBuf),

    /// A model weight file exists but could not be deserialized.
    #[error("failed to deserialize model {path}: {reason}")]
    ModelDeserialize { path: PathBuf, reason: String },

    /// A model weight record could not be written.
    #[error("failed to save model {path}: {reason}")]
    ModelSerialize { path: PathBuf, reason: String },

    /// Invalid training configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
