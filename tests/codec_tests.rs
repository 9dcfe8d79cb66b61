//! Determinism and persistence tests for the steganographic codec.

use burn::tensor::{Distribution, Tensor};
use stego_net::codec::{StegoCodec, StegoCodecConfig};
use stego_net::error::Error;
use stego_net::{InferenceBackend, InferenceDevice};
use std::fs;
use tempfile::TempDir;

fn device() -> InferenceDevice {
    Default::default()
}

fn random_image_batch(device: &InferenceDevice) -> Tensor<InferenceBackend, 4> {
    Tensor::random([1, 3, 128, 128], Distribution::Uniform(0.0, 1.0), device)
}

#[test]
fn forward_is_deterministic_for_fixed_weights() {
    let device = device();
    let codec = StegoCodecConfig::new()
        .with_base_channels(8)
        .init::<InferenceBackend>(&device);

    let cover = random_image_batch(&device);
    let secret = random_image_batch(&device);

    let (stego_a, recovered_a) = codec.forward(cover.clone(), secret.clone());
    let (stego_b, recovered_b) = codec.forward(cover, secret);

    assert_eq!(stego_a.into_data(), stego_b.into_data());
    assert_eq!(recovered_a.into_data(), recovered_b.into_data());
}

#[test]
fn save_then_load_preserves_behavior() {
    let device = device();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("stego_codec.bin");

    // Full-width codec so the persisted record matches the load-time config.
    let codec = StegoCodecConfig::new().init::<InferenceBackend>(&device);

    let cover = random_image_batch(&device);
    let secret = random_image_batch(&device);
    let (stego_before, recovered_before) = codec.forward(cover.clone(), secret.clone());

    codec.save(&path).expect("Failed to save codec");

    let loaded = StegoCodec::<InferenceBackend>::load(&path, &device).expect("Failed to load codec");
    let (stego_after, recovered_after) = loaded.forward(cover, secret);

    assert_eq!(stego_before.into_data(), stego_after.into_data());
    assert_eq!(recovered_before.into_data(), recovered_after.into_data());
}

#[test]
fn loading_a_missing_record_reports_file_not_found() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("does_not_exist.bin");

    match StegoCodec::<InferenceBackend>::load(&path, &device()) {
        Err(Error::ModelFileNotFound(_)) => {}
        other => panic!("expected ModelFileNotFound, got {other:?}"),
    }
}

#[test]
fn loading_a_corrupt_record_reports_deserialize_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("corrupt.bin");
    fs::write(&path, b"not a model record").expect("Failed to write corrupt file");

    match StegoCodec::<InferenceBackend>::load(&path, &device()) {
        Err(Error::ModelDeserialize { .. }) => {}
        other => panic!("expected ModelDeserialize, got {other:?}"),
    }
}
