//! Stego-class generation for the detector dataset.
//!
//! Runs a frozen, already-trained codec over (cover, secret) pairs and saves
//! only the stego output. Codec training must precede this step, which must
//! precede detector training.

use crate::codec::StegoCodec;
use crate::dataset::ImagePairDataset;
use crate::error::Result;
use crate::transform;
use burn::tensor::backend::Backend;
use std::fs;
use std::path::Path;
use tracing::info;

/// Populate `out_dir` with stego images produced from `pairs`, capped at
/// `limit` to bound the dataset size deterministically. Returns the number of
/// images written.
pub fn generate_stego_dataset<B: Backend>(
    codec: &StegoCodec<B>,
    pairs: &ImagePairDataset,
    out_dir: &Path,
    limit: usize,
    device: &B::Device,
) -> Result<usize> {
    fs::create_dir_all(out_dir)?;

    let mut count = 0usize;
    for index in 0..pairs.len() {
        if count >= limit {
            break;
        }
        let Some((cover, secret)) = pairs.load_pair::<B>(index, device) else {
            continue;
        };

        let stego = codec.encode(cover.unsqueeze(), secret.unsqueeze());
        let image = transform::to_image(stego.squeeze::<3>(0))?;
        image.save(out_dir.join(format!("stego_{count}.png")))?;
        count += 1;
    }

    info!(count, out_dir = %out_dir.display(), "generated stego dataset");
    Ok(count)
}
