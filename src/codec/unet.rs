//! Multi-scale image-to-image backbone.
//!
//! A compact U-Net: three contracting stages, a bottleneck, and three
//! expanding stages that concatenate the matching contracting output before
//! each decode block. The skip connections carry fine spatial detail past the
//! bottleneck, which is what lets the decoder half recover secret detail from
//! a stego image whose capacity the bottleneck otherwise limits.

use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, PaddingConfig2d, Relu};
use burn::tensor::backend::Backend;
use burn::tensor::module::interpolate;
use burn::tensor::ops::{InterpolateMode, InterpolateOptions};
use burn::tensor::Tensor;

/// Two 3x3 convolutions, each followed by batch normalization and ReLU.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv1: Conv2d<B>,
    norm1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    norm2: BatchNorm<B, 2>,
    activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            conv1: Conv2dConfig::new([in_channels, out_channels], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            norm1: BatchNormConfig::new(out_channels).init(device),
            conv2: Conv2dConfig::new([out_channels, out_channels], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            norm2: BatchNormConfig::new(out_channels).init(device),
            activation: Relu::new(),
        }
    }

    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.activation.forward(self.norm1.forward(self.conv1.forward(input)));
        self.activation.forward(self.norm2.forward(self.conv2.forward(x)))
    }
}

/// 2x bilinear upsampling followed by a 3x3 convolution block.
#[derive(Module, Debug)]
pub struct UpConv<B: Backend> {
    conv: Conv2d<B>,
    norm: BatchNorm<B, 2>,
    activation: Relu,
}

impl<B: Backend> UpConv<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv2dConfig::new([in_channels, out_channels], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            norm: BatchNormConfig::new(out_channels).init(device),
            activation: Relu::new(),
        }
    }

    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, _, height, width] = input.dims();
        let upsampled = interpolate(
            input,
            [height * 2, width * 2],
            InterpolateOptions::new(InterpolateMode::Bilinear),
        );
        self.activation
            .forward(self.norm.forward(self.conv.forward(upsampled)))
    }
}

/// Configuration of the [`UNet`] backbone.
#[derive(Config, Debug)]
pub struct UNetConfig {
    /// Input channel count (6 for the encoder half, 3 for the decoder half).
    pub in_channels: usize,

    /// Channel width of the first stage; doubles at each contraction.
    #[config(default = 32)]
    pub base_channels: usize,
}

impl UNetConfig {
    /// Initialize the backbone on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> UNet<B> {
        let base = self.base_channels;
        UNet {
            enc1: ConvBlock::new(self.in_channels, base, device),
            enc2: ConvBlock::new(base, base * 2, device),
            enc3: ConvBlock::new(base * 2, base * 4, device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            bottleneck: ConvBlock::new(base * 4, base * 8, device),
            up3: UpConv::new(base * 8, base * 4, device),
            dec3: ConvBlock::new(base * 8, base * 4, device),
            up2: UpConv::new(base * 4, base * 2, device),
            dec2: ConvBlock::new(base * 4, base * 2, device),
            up1: UpConv::new(base * 2, base, device),
            dec1: ConvBlock::new(base * 2, base, device),
            head: Conv2dConfig::new([base, 3], [1, 1]).init(device),
        }
    }
}

/// Image-to-image network with a contracting path, bottleneck, and expanding
/// path with skip connections, projecting to 3 output channels.
#[derive(Module, Debug)]
pub struct UNet<B: Backend> {
    enc1: ConvBlock<B>,
    enc2: ConvBlock<B>,
    enc3: ConvBlock<B>,
    pool: MaxPool2d,
    bottleneck: ConvBlock<B>,
    up3: UpConv<B>,
    dec3: ConvBlock<B>,
    up2: UpConv<B>,
    dec2: ConvBlock<B>,
    up1: UpConv<B>,
    dec1: ConvBlock<B>,
    head: Conv2d<B>,
}

impl<B: Backend> UNet<B> {
    /// Run the backbone on a `[batch, in_channels, 128, 128]` input, producing
    /// a `[batch, 3, 128, 128]` output.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let c1 = self.enc1.forward(input);
        let p1 = self.pool.forward(c1.clone());
        let c2 = self.enc2.forward(p1);
        let p2 = self.pool.forward(c2.clone());
        let c3 = self.enc3.forward(p2);
        let p3 = self.pool.forward(c3.clone());

        let bottleneck = self.bottleneck.forward(p3);

        let u3 = self.up3.forward(bottleneck);
        let d3 = self.dec3.forward(Tensor::cat(vec![c3, u3], 1));
        let u2 = self.up2.forward(d3);
        let d2 = self.dec2.forward(Tensor::cat(vec![c2, u2], 1));
        let u1 = self.up1.forward(d2);
        let d1 = self.dec1.forward(Tensor::cat(vec![c1, u1], 1));

        self.head.forward(d1)
    }
}
