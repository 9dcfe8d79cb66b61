//! Detector training loop.

use crate::config::DetectorTrainConfig;
use crate::dataset::LabeledDataset;
use crate::detector::{Detector, DetectorConfig};
use crate::error::{Error, Result};
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::warn;

/// Per-epoch training metrics.
#[derive(Debug, Clone)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Number of gradient steps taken.
    pub batches: usize,
    /// Mean cross-entropy loss over the epoch's batches.
    pub avg_loss: f64,
    /// Fraction of correctly classified examples over the epoch.
    pub accuracy: f64,
}

/// Train a detector from scratch on `dataset`, returning the trained model
/// and per-epoch statistics. Accuracy is tracked as correct/total over the
/// epoch's batch stream.
pub fn train<B: AutodiffBackend>(
    dataset: &LabeledDataset,
    config: &DetectorTrainConfig,
    device: &B::Device,
) -> Result<(Detector<B>, Vec<EpochStats>)> {
    config.validate()?;
    if dataset.is_empty() {
        return Err(Error::NoDecodableImages);
    }

    let mut model = DetectorConfig::new().init::<B>(device);
    let mut optim = AdamConfig::new().init();
    let loss_fn = CrossEntropyLossConfig::new().init(device);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut stats = Vec::with_capacity(config.epochs);
    for epoch in 1..=config.epochs {
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        indices.shuffle(&mut rng);

        let mut total_loss = 0.0f64;
        let mut batches = 0usize;
        let mut correct = 0i64;
        let mut total = 0i64;
        for chunk in indices.chunks(config.batch_size) {
            let Some((images, targets)) = dataset.batch::<B>(chunk, device) else {
                continue;
            };

            let logits = model.forward(images);
            let loss = loss_fn.forward(logits.clone(), targets.clone());

            let value: f64 = loss.clone().into_scalar().elem();
            if !value.is_finite() {
                warn!(epoch, batch = batches, loss = value, "non-finite detector loss");
            }

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);

            let batch_size = targets.dims()[0] as i64;
            let predictions = logits.argmax(1).squeeze::<1>(1);
            let hits: i64 = predictions
                .equal(targets)
                .int()
                .sum()
                .into_scalar()
                .elem();
            correct += hits;
            total += batch_size;

            total_loss += value;
            batches += 1;
        }

        if batches == 0 {
            return Err(Error::NoDecodableImages);
        }

        let avg_loss = total_loss / batches as f64;
        let accuracy = correct as f64 / total as f64;
        println!(
            "epoch {epoch}/{} loss: {avg_loss:.4} acc: {accuracy:.4}",
            config.epochs
        );
        stats.push(EpochStats {
            epoch,
            batches,
            avg_loss,
            accuracy,
        });
    }

    Ok((model, stats))
}
