//! Steganalysis classifier.

use crate::error;
use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// Mirror of the recorder's file naming, so the existence check matches disk.
fn record_path(path: &Path) -> PathBuf {
    path.with_extension("bin")
}

/// Binary steganalysis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// No hidden payload detected.
    Clean,
    /// The image carries an embedded payload.
    Stego,
}

impl Label {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Clean => "clean",
            Label::Stego => "stego",
        }
    }

    /// Class index used by the detector's output head.
    pub fn index(&self) -> i64 {
        match self {
            Label::Clean => 0,
            Label::Stego => 1,
        }
    }

    /// Label for a class index, if valid.
    pub fn from_index(index: i64) -> Option<Label> {
        match index {
            0 => Some(Label::Clean),
            1 => Some(Label::Stego),
            _ => None,
        }
    }

    /// Map a `[batch, 2]` logit tensor to labels via arg-max.
    ///
    /// Ties resolve deterministically to the lowest index, i.e. `Clean`.
    pub fn from_logits<B: Backend>(logits: Tensor<B, 2>) -> Vec<Label> {
        logits
            .argmax(1)
            .into_data()
            .iter::<i64>()
            .map(|index| if index == 1 { Label::Stego } else { Label::Clean })
            .collect()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of the [`Detector`].
#[derive(Config, Debug)]
pub struct DetectorConfig {
    /// Channel width of the first stage; doubles at each of the four stages.
    #[config(default = 16)]
    pub base_channels: usize,

    /// Width of the intermediate fully-connected layer.
    #[config(default = 256)]
    pub hidden_size: usize,
}

impl DetectorConfig {
    /// Initialize a detector with freshly initialized weights.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Detector<B> {
        let base = self.base_channels;
        // Four 2x poolings reduce 128 -> 8 along each spatial axis.
        let flattened = base * 8 * 8 * 8;
        Detector {
            conv1: conv3x3(3, base, device),
            norm1: BatchNormConfig::new(base).init(device),
            conv2: conv3x3(base, base * 2, device),
            norm2: BatchNormConfig::new(base * 2).init(device),
            conv3: conv3x3(base * 2, base * 4, device),
            norm3: BatchNormConfig::new(base * 4).init(device),
            conv4: conv3x3(base * 4, base * 8, device),
            norm4: BatchNormConfig::new(base * 8).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            fc1: LinearConfig::new(flattened, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, 2).init(device),
            activation: Relu::new(),
        }
    }
}

fn conv3x3<B: Backend>(in_channels: usize, out_channels: usize, device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new([in_channels, out_channels], [3, 3])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .init(device)
}

/// Four-stage convolutional classifier mapping an image to two class logits
/// ({clean, stego}).
#[derive(Module, Debug)]
pub struct Detector<B: Backend> {
    conv1: Conv2d<B>,
    norm1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    norm2: BatchNorm<B, 2>,
    conv3: Conv2d<B>,
    norm3: BatchNorm<B, 2>,
    conv4: Conv2d<B>,
    norm4: BatchNorm<B, 2>,
    pool: MaxPool2d,
    fc1: Linear<B>,
    fc2: Linear<B>,
    activation: Relu,
}

impl<B: Backend> Detector<B> {
    /// Compute class logits for a `[batch, 3, 128, 128]` input.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.pool.forward(
            self.activation
                .forward(self.norm1.forward(self.conv1.forward(images))),
        );
        let x = self
            .pool
            .forward(self.activation.forward(self.norm2.forward(self.conv2.forward(x))));
        let x = self
            .pool
            .forward(self.activation.forward(self.norm3.forward(self.conv3.forward(x))));
        let x = self
            .pool
            .forward(self.activation.forward(self.norm4.forward(self.conv4.forward(x))));

        let x = x.flatten::<2>(1, 3);
        let x = self.activation.forward(self.fc1.forward(x));
        self.fc2.forward(x)
    }

    /// Classify a single `[3, 128, 128]` image.
    ///
    /// Equal logits resolve to `Clean` (lowest index wins).
    pub fn classify(&self, image: Tensor<B, 3>) -> Label {
        let logits = self.forward(image.unsqueeze());
        let index: i64 = logits.argmax(1).into_scalar().elem();
        if index == 1 {
            Label::Stego
        } else {
            Label::Clean
        }
    }

    /// Persist the detector weights.
    pub fn save(self, path: &Path) -> error::Result<()> {
        let path = record_path(path);
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        self.save_file(&path, &recorder)
            .map_err(|e| error::Error::ModelSerialize {
                path: path.clone(),
                reason: e.to_string(),
            })
    }

    /// Load detector weights from disk onto the given device.
    pub fn load(path: &Path, device: &B::Device) -> error::Result<Self> {
        let path = record_path(path);
        if !path.is_file() {
            return Err(error::Error::ModelFileNotFound(path));
        }
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        DetectorConfig::new()
            .init::<B>(device)
            .load_file(path.clone(), &recorder, device)
            .map_err(|e| error::Error::ModelDeserialize {
                path,
                reason: e.to_string(),
            })
    }
}
