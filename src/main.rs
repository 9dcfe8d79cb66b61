//! stego-net - deep-learning image steganography.
//!
//! Trains the steganographic codec and the steganalysis detector, generates
//! detector datasets from a trained codec, and runs the hide/recover/detect
//! inference pipelines.

use clap::{Parser, Subcommand, ValueEnum};
use stego_net::codec::{self, StegoCodec};
use stego_net::config::{
    CodecTrainConfig, DetectorTrainConfig, DEFAULT_CODEC_MODEL, DEFAULT_DETECTOR_MODEL,
    STEGO_DATASET_CAP,
};
use stego_net::dataset::{generate_stego_dataset, ImagePairDataset, LabeledDataset, PairingStrategy};
use stego_net::detector;
use stego_net::registry::{ModelPaths, ModelRegistry};
use stego_net::{pipeline, transform, InferenceBackend, InferenceDevice, Result, TrainingBackend};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stego-net")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Deep-learning image steganography",
    long_about = "Hide a secret image inside a cover image, recover it from the stego image alone, and detect hidden payloads with an independent classifier."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// How covers and secrets are paired for codec training.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Pairing {
    /// Zip both directories in sorted filename order.
    Sorted,
    /// Keep covers sorted, permute secrets with a seeded shuffle.
    Shuffled,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the steganographic codec on (cover, secret) pairs
    TrainCodec {
        /// Directory of cover images
        #[arg(long)]
        covers: PathBuf,

        /// Directory of secret images
        #[arg(long)]
        secrets: PathBuf,

        /// Number of training epochs
        #[arg(long, default_value = "5")]
        epochs: usize,

        /// Batch size
        #[arg(long, default_value = "8")]
        batch: usize,

        /// Adam learning rate
        #[arg(long, default_value = "0.001")]
        lr: f64,

        /// Weight of the secret-reconstruction loss term
        #[arg(long, default_value = "2.0")]
        secret_weight: f32,

        /// Cover/secret pairing strategy
        #[arg(long, value_enum, default_value = "sorted")]
        pairing: Pairing,

        /// Seed for shuffled pairing and epoch shuffling
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output path for the trained weights
        #[arg(long, default_value = DEFAULT_CODEC_MODEL)]
        out: PathBuf,
    },

    /// Train the steganalysis detector on clean and stego directories
    TrainDetector {
        /// Directory of clean images (label 0)
        #[arg(long)]
        clean: PathBuf,

        /// Directory of stego images (label 1)
        #[arg(long)]
        stego: PathBuf,

        /// Number of training epochs
        #[arg(long, default_value = "10")]
        epochs: usize,

        /// Batch size
        #[arg(long, default_value = "16")]
        batch: usize,

        /// Adam learning rate
        #[arg(long, default_value = "0.001")]
        lr: f64,

        /// Seed for epoch shuffling
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output path for the trained weights
        #[arg(long, default_value = DEFAULT_DETECTOR_MODEL)]
        out: PathBuf,
    },

    /// Generate a stego dataset for detector training with a trained codec
    GenStego {
        /// Directory of cover images
        #[arg(long)]
        covers: PathBuf,

        /// Directory of secret images
        #[arg(long)]
        secrets: PathBuf,

        /// Path to the trained codec weights
        #[arg(long, default_value = DEFAULT_CODEC_MODEL)]
        model: PathBuf,

        /// Output directory for the generated stego images
        #[arg(long)]
        out_dir: PathBuf,

        /// Maximum number of images to generate
        #[arg(long, default_value_t = STEGO_DATASET_CAP)]
        limit: usize,
    },

    /// Hide a secret image inside a cover image
    Hide {
        /// Cover image path
        #[arg(long)]
        cover: PathBuf,

        /// Secret image path
        #[arg(long)]
        secret: PathBuf,

        /// Output path for the stego image
        #[arg(long)]
        out: PathBuf,

        /// Path to the trained codec weights
        #[arg(long, default_value = DEFAULT_CODEC_MODEL)]
        model: PathBuf,
    },

    /// Recover the hidden secret from a stego image
    Recover {
        /// Stego image path
        #[arg(long)]
        stego: PathBuf,

        /// Output path for the recovered image
        #[arg(long)]
        out: PathBuf,

        /// Path to the trained codec weights
        #[arg(long, default_value = DEFAULT_CODEC_MODEL)]
        model: PathBuf,
    },

    /// Classify an image as clean or stego
    Detect {
        /// Image path
        #[arg(long)]
        image: PathBuf,

        /// Path to the trained detector weights
        #[arg(long, default_value = DEFAULT_DETECTOR_MODEL)]
        model: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::TrainCodec {
            covers,
            secrets,
            epochs,
            batch,
            lr,
            secret_weight,
            pairing,
            seed,
            out,
        } => cmd_train_codec(
            &covers,
            &secrets,
            epochs,
            batch,
            lr,
            secret_weight,
            pairing,
            seed,
            &out,
        ),

        Commands::TrainDetector {
            clean,
            stego,
            epochs,
            batch,
            lr,
            seed,
            out,
        } => cmd_train_detector(&clean, &stego, epochs, batch, lr, seed, &out),

        Commands::GenStego {
            covers,
            secrets,
            model,
            out_dir,
            limit,
        } => cmd_gen_stego(&covers, &secrets, &model, &out_dir, limit),

        Commands::Hide {
            cover,
            secret,
            out,
            model,
        } => cmd_hide(&cover, &secret, &out, model),

        Commands::Recover { stego, out, model } => cmd_recover(&stego, &out, model),

        Commands::Detect { image, model } => cmd_detect(&image, model),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_train_codec(
    covers: &Path,
    secrets: &Path,
    epochs: usize,
    batch: usize,
    lr: f64,
    secret_weight: f32,
    pairing: Pairing,
    seed: u64,
    out: &Path,
) -> Result<()> {
    let strategy = match pairing {
        Pairing::Sorted => PairingStrategy::SortedFilename,
        Pairing::Shuffled => PairingStrategy::Shuffled { seed },
    };
    let dataset = ImagePairDataset::load(covers, secrets, strategy)?;
    println!("training codec on {} image pairs", dataset.len());

    let config = CodecTrainConfig {
        epochs,
        batch_size: batch,
        learning_rate: lr,
        secret_weight,
        seed,
    };

    let device = InferenceDevice::default();
    let (model, _stats) = codec::train::<TrainingBackend>(&dataset, &config, &device)?;

    ensure_parent_dir(out)?;
    model.save(out)?;
    println!("model saved to {}", out.display());

    Ok(())
}

fn cmd_train_detector(
    clean: &Path,
    stego: &Path,
    epochs: usize,
    batch: usize,
    lr: f64,
    seed: u64,
    out: &Path,
) -> Result<()> {
    let dataset = LabeledDataset::load(clean, stego)?;
    println!("training detector on {} labeled images", dataset.len());

    let config = DetectorTrainConfig {
        epochs,
        batch_size: batch,
        learning_rate: lr,
        seed,
    };

    let device = InferenceDevice::default();
    let (model, _stats) = detector::train::<TrainingBackend>(&dataset, &config, &device)?;

    ensure_parent_dir(out)?;
    model.save(out)?;
    println!("model saved to {}", out.display());

    Ok(())
}

fn cmd_gen_stego(
    covers: &Path,
    secrets: &Path,
    model: &Path,
    out_dir: &Path,
    limit: usize,
) -> Result<()> {
    let device = InferenceDevice::default();
    let codec = StegoCodec::<InferenceBackend>::load(model, &device)?;
    let pairs = ImagePairDataset::load(covers, secrets, PairingStrategy::SortedFilename)?;

    let count = generate_stego_dataset(&codec, &pairs, out_dir, limit, &device)?;
    println!("Generated {} stego images", count);

    Ok(())
}

fn cmd_hide(cover: &Path, secret: &Path, out: &Path, model: PathBuf) -> Result<()> {
    let device = InferenceDevice::default();
    let paths = ModelPaths {
        codec: model,
        ..Default::default()
    };
    let registry = ModelRegistry::load(&paths, &device);

    let cover = transform::open(cover)?;
    let secret = transform::open(secret)?;
    let outcome = pipeline::hide(&registry, &cover, &secret)?;

    ensure_parent_dir(out)?;
    outcome.stego.save(out)?;
    let recovered_path = recovered_output_path(out);
    outcome.recovered.save(&recovered_path)?;

    println!("stego saved to {}", out.display());
    println!("recovered preview saved to {}", recovered_path.display());
    println!("psnr: {:.4}, ssim: {:.4}", outcome.psnr, outcome.ssim);

    Ok(())
}

fn cmd_recover(stego: &Path, out: &Path, model: PathBuf) -> Result<()> {
    let device = InferenceDevice::default();
    let paths = ModelPaths {
        codec: model,
        ..Default::default()
    };
    let registry = ModelRegistry::load(&paths, &device);

    let stego = transform::open(stego)?;
    let recovered = pipeline::recover(&registry, &stego)?;

    ensure_parent_dir(out)?;
    recovered.save(out)?;
    println!("recovered image saved to {}", out.display());

    Ok(())
}

fn cmd_detect(image: &Path, model: PathBuf) -> Result<()> {
    let device = InferenceDevice::default();
    let paths = ModelPaths {
        detector: model,
        ..Default::default()
    };
    let registry = ModelRegistry::load(&paths, &device);

    let image = transform::open(image)?;
    let label = pipeline::detect(&registry, &image)?;
    println!("prediction: {}", label);

    Ok(())
}

/// `<out>_recovered.<ext>` next to the requested output path.
fn recovered_output_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recovered");
    let ext = out.extension().and_then(|s| s.to_str()).unwrap_or("png");
    out.with_file_name(format!("{stem}_recovered.{ext}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
