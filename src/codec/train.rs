//! Codec training loop.
//!
//! Joint optimization of both backbones against the combined loss
//! `mse(stego, cover) + secret_weight * mse(recovered, secret)`. The secret
//! weight defaults to 2.0, prioritizing secret fidelity over cover
//! imperceptibility; it is a tunable trade-off, not a constant.

use crate::codec::{StegoCodec, StegoCodecConfig};
use crate::config::{CodecTrainConfig, BASE_CHANNELS};
use crate::dataset::ImagePairDataset;
use crate::error::{Error, Result};
use burn::nn::loss::{MseLoss, Reduction};
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
    /// Mean combined loss over the epoch's batches.
    pub avg_loss: f64,
}

/// Train a codec from scratch on `dataset`, returning the trained model and
/// per-epoch statistics.
///
/// Batches are visited in a seeded shuffled order; each batch updates both
/// backbones' parameters in one Adam step. A non-finite batch loss is
/// reported and training continues.
pub fn train<B: AutodiffBackend>(
    dataset: &ImagePairDataset,
    config: &CodecTrainConfig,
    device: &B::Device,
) -> Result<(StegoCodec<B>, Vec<EpochStats>)> {
    config.validate()?;
    if dataset.is_empty() {
        return Err(Error::NoDecodableImages);
    }

    let mut model = StegoCodecConfig::new()
        .with_base_channels(BASE_CHANNELS)
        .init::<B>(device);
    let mut optim = AdamConfig::new().init();
    let mse = MseLoss::new();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut stats = Vec::with_capacity(config.epochs);
    for epoch in 1..=config.epochs {
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        indices.shuffle(&mut rng);

        let mut total = 0.0f64;
        let mut batches = 0usize;
        for chunk in indices.chunks(config.batch_size) {
            let Some((cover, secret)) = dataset.batch::<B>(chunk, device) else {
                continue;
            };

            let (stego, recovered) = model.forward(cover.clone(), secret.clone());
            let cover_loss = mse.forward(stego, cover, Reduction::Mean);
            let secret_loss = mse.forward(recovered, secret, Reduction::Mean);
            let loss = cover_loss + secret_loss.mul_scalar(config.secret_weight);

            let value: f64 = loss.clone().into_scalar().elem();
            if !value.is_finite() {
                warn!(epoch, batch = batches, loss = value, "non-finite codec loss");
            }

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);

            total += value;
            batches += 1;
        }

        if batches == 0 {
            return Err(Error::NoDecodableImages);
        }

        let avg_loss = total / batches as f64;
        println!("epoch {epoch}/{}, loss: {avg_loss:.6}", config.epochs);
        stats.push(EpochStats {
            epoch,
            batches,
            avg_loss,
        });
    }

    Ok((model, stats))
}
