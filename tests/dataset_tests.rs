//! Dataset layout and pairing contract tests.

use image::{Rgb, RgbImage};
use stego_net::dataset::{ImagePairDataset, LabeledDataset, PairingStrategy};
use stego_net::detector::Label;
use stego_net::error::Error;
use stego_net::{InferenceBackend, InferenceDevice};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn device() -> InferenceDevice {
    Default::default()
}

/// Write a small decodable PNG with the given name.
fn write_png(dir: &Path, name: &str, shade: u8) {
    let mut img = RgbImage::new(16, 16);
    for pixel in img.pixels_mut() {
        *pixel = Rgb([shade, shade / 2, 255 - shade]);
    }
    img.save(dir.join(name)).expect("Failed to write test image");
}

#[test]
fn pairing_truncates_to_the_shorter_directory() {
    let covers = TempDir::new().expect("Failed to create temp dir");
    let secrets = TempDir::new().expect("Failed to create temp dir");
    for name in ["a.png", "b.png", "c.png"] {
        write_png(covers.path(), name, 10);
    }
    for name in ["x.png", "y.png"] {
        write_png(secrets.path(), name, 200);
    }

    let dataset =
        ImagePairDataset::load(covers.path(), secrets.path(), PairingStrategy::SortedFilename)
            .expect("Failed to load pairs");
    assert_eq!(dataset.len(), 2);
}

#[test]
fn pairing_follows_sorted_filename_order() {
    let covers = TempDir::new().expect("Failed to create temp dir");
    let secrets = TempDir::new().expect("Failed to create temp dir");
    // Created out of order on purpose; pairing must sort by name.
    write_png(covers.path(), "b.png", 10);
    write_png(covers.path(), "a.png", 20);
    write_png(secrets.path(), "y.png", 30);
    write_png(secrets.path(), "x.png", 40);

    let dataset =
        ImagePairDataset::load(covers.path(), secrets.path(), PairingStrategy::SortedFilename)
            .expect("Failed to load pairs");

    let (cover, secret) = dataset.paths(0).expect("first pair");
    assert_eq!(cover.file_name().unwrap(), "a.png");
    assert_eq!(secret.file_name().unwrap(), "x.png");

    let (cover, secret) = dataset.paths(1).expect("second pair");
    assert_eq!(cover.file_name().unwrap(), "b.png");
    assert_eq!(secret.file_name().unwrap(), "y.png");
}

#[test]
fn shuffled_pairing_is_a_permutation_of_the_secrets() {
    let covers = TempDir::new().expect("Failed to create temp dir");
    let secrets = TempDir::new().expect("Failed to create temp dir");
    for i in 0..6 {
        write_png(covers.path(), &format!("c{i}.png"), i * 20);
        write_png(secrets.path(), &format!("s{i}.png"), i * 30);
    }

    let sorted =
        ImagePairDataset::load(covers.path(), secrets.path(), PairingStrategy::SortedFilename)
            .expect("Failed to load pairs");
    let shuffled = ImagePairDataset::load(
        covers.path(),
        secrets.path(),
        PairingStrategy::Shuffled { seed: 7 },
    )
    .expect("Failed to load pairs");

    assert_eq!(sorted.len(), shuffled.len());

    // Covers keep their sorted order; the secret side is a permutation of the
    // same file set.
    let secret_set = |dataset: &ImagePairDataset| -> BTreeSet<_> {
        (0..dataset.len())
            .map(|i| dataset.paths(i).unwrap().1.to_path_buf())
            .collect()
    };
    assert_eq!(secret_set(&sorted), secret_set(&shuffled));
    for i in 0..shuffled.len() {
        assert_eq!(
            shuffled.paths(i).unwrap().0.file_name().unwrap(),
            format!("c{i}.png").as_str()
        );
    }
}

#[test]
fn labeled_dataset_lists_clean_before_stego_in_sorted_order() {
    let clean = TempDir::new().expect("Failed to create temp dir");
    let stego = TempDir::new().expect("Failed to create temp dir");
    for name in ["m.png", "k.png", "z.png"] {
        write_png(clean.path(), name, 50);
    }
    for name in ["b.png", "a.png"] {
        write_png(stego.path(), name, 150);
    }

    let dataset = LabeledDataset::load(clean.path(), stego.path()).expect("Failed to load dataset");

    assert_eq!(dataset.len(), 5);
    for i in 0..3 {
        assert_eq!(dataset.label(i), Some(Label::Clean));
    }
    for i in 3..5 {
        assert_eq!(dataset.label(i), Some(Label::Stego));
    }
}

#[test]
fn empty_directory_is_rejected() {
    let covers = TempDir::new().expect("Failed to create temp dir");
    let secrets = TempDir::new().expect("Failed to create temp dir");
    write_png(secrets.path(), "s.png", 9);

    match ImagePairDataset::load(covers.path(), secrets.path(), PairingStrategy::SortedFilename) {
        Err(Error::EmptyDataset(path)) => assert_eq!(path, covers.path()),
        other => panic!("expected EmptyDataset, got {other:?}"),
    }
}

#[test]
fn undecodable_images_are_skipped_inside_a_batch() {
    let covers = TempDir::new().expect("Failed to create temp dir");
    let secrets = TempDir::new().expect("Failed to create temp dir");
    write_png(covers.path(), "a.png", 10);
    write_png(covers.path(), "b.png", 20);
    fs::write(covers.path().join("c.png"), b"definitely not a png").expect("Failed to write file");
    for name in ["x.png", "y.png", "z.png"] {
        write_png(secrets.path(), name, 99);
    }

    let dataset =
        ImagePairDataset::load(covers.path(), secrets.path(), PairingStrategy::SortedFilename)
            .expect("Failed to load pairs");
    assert_eq!(dataset.len(), 3);

    let (cover_batch, secret_batch) = dataset
        .batch::<InferenceBackend>(&[0, 1, 2], &device())
        .expect("batch should keep the decodable pairs");
    assert_eq!(cover_batch.dims(), [2, 3, 128, 128]);
    assert_eq!(secret_batch.dims(), [2, 3, 128, 128]);
}
