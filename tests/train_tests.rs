//! End-to-end training chain on a tiny dataset: codec training, stego
//! dataset generation with the frozen codec, then detector training.

use image::{Rgb, RgbImage};
use stego_net::codec::{self, StegoCodec};
use stego_net::config::{CodecTrainConfig, DetectorTrainConfig};
use stego_net::dataset::{
    generate_stego_dataset, ImagePairDataset, LabeledDataset, PairingStrategy,
};
use stego_net::{InferenceBackend, InferenceDevice, TrainingBackend};
use std::path::Path;
use tempfile::TempDir;

fn device() -> InferenceDevice {
    Default::default()
}

fn write_png(dir: &Path, name: &str, shade: u8) {
    let mut img = RgbImage::new(32, 32);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([
            shade.wrapping_add(x as u8),
            shade.wrapping_add(y as u8),
            shade,
        ]);
    }
    img.save(dir.join(name)).expect("Failed to write test image");
}

#[test]
fn full_training_chain_runs_on_a_tiny_dataset() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let device = device();

    let covers = temp_dir.path().join("covers");
    let secrets = temp_dir.path().join("secrets");
    std::fs::create_dir_all(&covers).expect("Failed to create covers dir");
    std::fs::create_dir_all(&secrets).expect("Failed to create secrets dir");
    write_png(&covers, "c0.png", 40);
    write_png(&covers, "c1.png", 90);
    write_png(&secrets, "s0.png", 140);
    write_png(&secrets, "s1.png", 190);

    // Codec training: one epoch, one batch.
    let pairs = ImagePairDataset::load(&covers, &secrets, PairingStrategy::SortedFilename)
        .expect("Failed to load pairs");
    let codec_config = CodecTrainConfig {
        epochs: 1,
        batch_size: 2,
        seed: 7,
        ..Default::default()
    };
    let (model, stats) =
        codec::train::<TrainingBackend>(&pairs, &codec_config, &device).expect("codec training");
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].batches, 1);
    assert!(stats[0].avg_loss.is_finite());

    let codec_path = temp_dir.path().join("models").join("stego_codec.bin");
    std::fs::create_dir_all(codec_path.parent().unwrap()).expect("Failed to create models dir");
    model.save(&codec_path).expect("Failed to save codec");

    // Stego dataset generation with the frozen codec.
    let frozen = StegoCodec::<InferenceBackend>::load(&codec_path, &device)
        .expect("Failed to load trained codec");
    let stego_dir = temp_dir.path().join("stego");
    let count =
        generate_stego_dataset(&frozen, &pairs, &stego_dir, 2, &device).expect("generation");
    assert_eq!(count, 2);
    assert!(stego_dir.join("stego_0.png").is_file());
    assert!(stego_dir.join("stego_1.png").is_file());

    // Detector training on clean + generated stego images.
    let labeled = LabeledDataset::load(&covers, &stego_dir).expect("Failed to load labeled set");
    assert_eq!(labeled.len(), 4);

    let detector_config = DetectorTrainConfig {
        epochs: 1,
        batch_size: 4,
        seed: 7,
        ..Default::default()
    };
    let (_detector, stats) =
        stego_net::detector::train::<TrainingBackend>(&labeled, &detector_config, &device)
            .expect("detector training");
    assert_eq!(stats.len(), 1);
    assert!(stats[0].avg_loss.is_finite());
    assert!((0.0..=1.0).contains(&stats[0].accuracy));
}
