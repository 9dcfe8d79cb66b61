//! The steganographic codec: paired encoder/decoder backbones.

use crate::codec::unet::{UNet, UNetConfig};
use crate::config::{BASE_CHANNELS, IMAGE_CHANNELS};
use crate::error;
use burn::config::Config;
use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use std::path::{Path, PathBuf};

// The file recorder stores records under its own extension; mirror that here
// so the existence check below agrees with what ends up on disk.
fn record_path(path: &Path) -> PathBuf {
    path.with_extension("bin")
}

/// Configuration of the [`StegoCodec`].
#[derive(Config, Debug)]
pub struct StegoCodecConfig {
    /// Base channel width shared by both backbones.
    #[config(default = 32)]
    pub base_channels: usize,
}

impl StegoCodecConfig {
    /// Initialize a codec with freshly initialized weights.
    pub fn init<B: Backend>(&self, device: &B::Device) -> StegoCodec<B> {
        StegoCodec {
            encoder: UNetConfig::new(IMAGE_CHANNELS * 2)
                .with_base_channels(self.base_channels)
                .init(device),
            decoder: UNetConfig::new(IMAGE_CHANNELS)
                .with_base_channels(self.base_channels)
                .init(device),
        }
    }
}

/// Paired encoder/decoder trained jointly: the encoder maps a concatenated
/// (cover, secret) pair to a stego image, the decoder maps a stego image alone
/// back to a recovered secret.
///
/// `encode` and `decode` are independent entry points; recovery never needs a
/// placeholder cover argument. For fixed weights both mappings are
/// deterministic.
#[derive(Module, Debug)]
pub struct StegoCodec<B: Backend> {
    encoder: UNet<B>,
    decoder: UNet<B>,
}

impl<B: Backend> StegoCodec<B> {
    /// Embed `secret` into `cover`, producing a stego image.
    ///
    /// Both inputs are `[batch, 3, 128, 128]`; they are concatenated along the
    /// channel axis before entering the encoder backbone.
    pub fn encode(&self, cover: Tensor<B, 4>, secret: Tensor<B, 4>) -> Tensor<B, 4> {
        self.encoder.forward(Tensor::cat(vec![cover, secret], 1))
    }

    /// Reconstruct the hidden secret from a stego image alone.
    pub fn decode(&self, stego: Tensor<B, 4>) -> Tensor<B, 4> {
        self.decoder.forward(stego)
    }

    /// Joint forward pass used by training: both outputs are always computed
    /// because the loss needs them simultaneously.
    pub fn forward(
        &self,
        cover: Tensor<B, 4>,
        secret: Tensor<B, 4>,
    ) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let stego = self.encode(cover, secret);
        let recovered = self.decode(stego.clone());
        (stego, recovered)
    }

    /// Persist the codec weights as a single binary record keyed by the two
    /// sub-networks.
    pub fn save(self, path: &Path) -> error::Result<()> {
        let path = record_path(path);
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        self.save_file(&path, &recorder)
            .map_err(|e| error::Error::ModelSerialize {
                path: path.clone(),
                reason: e.to_string(),
            })
    }

    /// Load codec weights from disk onto the given device.
    ///
    /// Distinguishes a missing file from a file that exists but cannot be
    /// deserialized, so the registry can report the precise failure.
    pub fn load(path: &Path, device: &B::Device) -> error::Result<Self> {
        let path = record_path(path);
        if !path.is_file() {
            return Err(error::Error::ModelFileNotFound(path));
        }
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        StegoCodecConfig::new()
            .with_base_channels(BASE_CHANNELS)
            .init::<B>(device)
            .load_file(path.clone(), &recorder, device)
            .map_err(|e| error::Error::ModelDeserialize {
                path,
                reason: e.to_string(),
            })
    }
}
