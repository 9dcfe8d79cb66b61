//! Inference pipelines.
//!
//! Each pipeline is one synchronous forward pass over models borrowed from a
//! [`ModelRegistry`]. Every entry point checks slot availability and returns
//! a "model not loaded" error instead of panicking when weights are missing.

use crate::detector::Label;
use crate::error::Result;
use crate::registry::ModelRegistry;
use crate::{metrics, transform, InferenceBackend};
use image::{DynamicImage, RgbImage};

/// Result of hiding a secret inside a cover.
#[derive(Debug)]
pub struct HideOutcome {
    /// The cover-like image carrying the embedded secret.
    pub stego: RgbImage,
    /// The decoder's reconstruction of the secret, reported alongside.
    pub recovered: RgbImage,
    /// PSNR between the (resized) cover and the stego image, in dB.
    pub psnr: f64,
    /// Mean SSIM between the (resized) cover and the stego image.
    pub ssim: f64,
}

/// Embed `secret` into `cover`.
///
/// Returns the stego image, the recovered secret, and cover/stego fidelity
/// metrics. Metrics compare at the network resolution, so the cover is
/// resized through the same transform as the tensors.
pub fn hide(
    registry: &ModelRegistry,
    cover: &DynamicImage,
    secret: &DynamicImage,
) -> Result<HideOutcome> {
    let codec = registry.codec()?;
    let device = registry.device();

    let cover_tensor = transform::to_tensor::<InferenceBackend>(cover, device);
    let cover_resized = transform::to_image(cover_tensor.clone())?;
    let secret_tensor = transform::to_tensor::<InferenceBackend>(secret, device);

    let (stego, recovered) = codec.forward(cover_tensor.unsqueeze(), secret_tensor.unsqueeze());
    let stego = transform::to_image(stego.squeeze::<3>(0))?;
    let recovered = transform::to_image(recovered.squeeze::<3>(0))?;

    let psnr = metrics::psnr(&cover_resized, &stego)?;
    let ssim = metrics::ssim(&cover_resized, &stego)?;

    Ok(HideOutcome {
        stego,
        recovered,
        psnr,
        ssim,
    })
}

/// Reconstruct the hidden secret from a stego image alone.
pub fn recover(registry: &ModelRegistry, stego: &DynamicImage) -> Result<RgbImage> {
    let codec = registry.codec()?;
    let device = registry.device();

    let tensor = transform::to_tensor::<InferenceBackend>(stego, device);
    let recovered = codec.decode(tensor.unsqueeze());
    transform::to_image(recovered.squeeze::<3>(0))
}

/// Classify an image as clean or stego.
pub fn detect(registry: &ModelRegistry, image: &DynamicImage) -> Result<Label> {
    let detector = registry.detector()?;
    let device = registry.device();

    let tensor = transform::to_tensor::<InferenceBackend>(image, device);
    Ok(detector.classify(tensor))
}
