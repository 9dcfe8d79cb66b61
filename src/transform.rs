//! Image preprocessing and its inverse.
//!
//! Every image entering a network goes through [`to_tensor`]: decode to RGB,
//! resize to a fixed square resolution (no aspect-ratio preservation), and
//! normalize to a `[3, 128, 128]` float tensor in `[0, 1]`, channel first.
//! [`to_image`] inverts the layout, clamping to `[0, 255]` and rounding to
//! bytes. The round trip is lossy (resize + quantization).
//!
//! This module is the only place resizing is permitted; everything downstream
//! fails fast on a shape mismatch instead.

use crate::config::{IMAGE_CHANNELS, IMAGE_SIZE};
use crate::error::{Error, Result};
use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::path::Path;

/// Decode an image from a file on disk.
pub fn open(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Decode an image from an in-memory byte buffer.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Convert an image into a normalized `[3, 128, 128]` tensor.
///
/// The source is converted to RGB and resized to 128x128 with bilinear
/// filtering, stretching as needed. Pixel values are scaled to `[0, 1]` in
/// channel-first order.
pub fn to_tensor<B: Backend>(image: &DynamicImage, device: &B::Device) -> Tensor<B, 3> {
    let resized = image
        .resize_exact(IMAGE_SIZE as u32, IMAGE_SIZE as u32, FilterType::Triangle)
        .to_rgb8();

    let mut data = vec![0.0f32; IMAGE_CHANNELS * IMAGE_SIZE * IMAGE_SIZE];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for (channel, &value) in pixel.0.iter().enumerate() {
            data[channel * IMAGE_SIZE * IMAGE_SIZE + y * IMAGE_SIZE + x] = value as f32 / 255.0;
        }
    }

    Tensor::from_data(
        TensorData::new(data, [IMAGE_CHANNELS, IMAGE_SIZE, IMAGE_SIZE]),
        device,
    )
}

/// Convert a `[3, 128, 128]` tensor back into an RGB byte image.
///
/// Values are scaled by 255, clamped to `[0, 255]` and rounded. Any other
/// tensor shape is rejected.
pub fn to_image<B: Backend>(tensor: Tensor<B, 3>) -> Result<RgbImage> {
    let dims = tensor.dims();
    if dims != [IMAGE_CHANNELS, IMAGE_SIZE, IMAGE_SIZE] {
        return Err(Error::ShapeMismatch {
            expected: [IMAGE_CHANNELS, IMAGE_SIZE, IMAGE_SIZE],
            found: dims,
        });
    }

    let values: Vec<f32> = tensor.into_data().iter::<f32>().collect();
    let mut bytes = vec![0u8; IMAGE_SIZE * IMAGE_SIZE * IMAGE_CHANNELS];
    for channel in 0..IMAGE_CHANNELS {
        for y in 0..IMAGE_SIZE {
            for x in 0..IMAGE_SIZE {
                let value = values[channel * IMAGE_SIZE * IMAGE_SIZE + y * IMAGE_SIZE + x];
                let byte = (value * 255.0).round().clamp(0.0, 255.0) as u8;
                bytes[(y * IMAGE_SIZE + x) * IMAGE_CHANNELS + channel] = byte;
            }
        }
    }

    // Buffer length matches the dimensions by construction.
    Ok(RgbImage::from_raw(IMAGE_SIZE as u32, IMAGE_SIZE as u32, bytes)
        .unwrap_or_else(|| RgbImage::new(IMAGE_SIZE as u32, IMAGE_SIZE as u32)))
}
