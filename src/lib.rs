//! Deep-learning image steganography.
//!
//! Hides a secret image inside a cover image so the produced stego image is
//! visually close to the cover, recovers an approximation of the secret from
//! the stego image alone, and classifies arbitrary images as clean or stego.
//!
//! # Architecture
//!
//! ```text
//! (cover, secret) → Encoder U-Net → stego → Decoder U-Net → recovered
//!                                     └→ Steganalysis CNN → {clean, stego}
//! ```
//!
//! The codec's two backbones are trained jointly against
//! `mse(stego, cover) + 2 * mse(recovered, secret)`; the detector is trained
//! afterwards on stego images generated by the frozen codec. The scheme is a
//! learned, probabilistic transform: recovery is approximate and no
//! cryptographic hiding guarantee is made.
//!
//! # Example
//!
//! ```rust,no_run
//! use stego_net::registry::{ModelPaths, ModelRegistry};
//! use stego_net::{pipeline, transform};
//!
//! let device = Default::default();
//! let registry = ModelRegistry::load(&ModelPaths::default(), &device);
//!
//! let cover = transform::open("cover.png".as_ref()).unwrap();
//! let secret = transform::open("secret.png".as_ref()).unwrap();
//!
//! let outcome = pipeline::hide(&registry, &cover, &secret).unwrap();
//! outcome.stego.save("stego.png").unwrap();
//! ```

pub mod codec;
pub mod config;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod registry;
pub mod transform;

pub use error::{Error, Result};
pub use registry::{ModelPaths, ModelRegistry};

/// CPU backend used for inference.
pub type InferenceBackend = burn::backend::NdArray;

/// Device type of the inference backend.
pub type InferenceDevice = <InferenceBackend as burn::tensor::backend::Backend>::Device;

/// Backend used for training: the inference backend wrapped with autodiff.
pub type TrainingBackend = burn::backend::Autodiff<InferenceBackend>;
