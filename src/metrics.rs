//! Reconstruction quality metrics.
//!
//! Pure functions over same-shaped RGB byte images, used for reporting only.
//! PSNR returns the 100 dB sentinel for a zero mean-squared error; SSIM is the
//! mean structural similarity over a sliding 7x7 uniform window, averaged
//! across channels.

use crate::error::{Error, Result};
use image::RgbImage;

/// Peak signal value for 8-bit images.
const PEAK: f64 = 255.0;

/// Sentinel PSNR for identical images (zero mean-squared error).
const PSNR_IDENTICAL: f64 = 100.0;

/// SSIM window side length.
const SSIM_WINDOW: u32 = 7;

/// SSIM stabilization constants, (K1*L)^2 and (K2*L)^2 with K1=0.01, K2=0.03.
const SSIM_C1: f64 = (0.01 * PEAK) * (0.01 * PEAK);
const SSIM_C2: f64 = (0.03 * PEAK) * (0.03 * PEAK);

fn check_dimensions(a: &RgbImage, b: &RgbImage) -> Result<()> {
    if a.dimensions() != b.dimensions() {
        return Err(Error::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }
    Ok(())
}

/// Peak signal-to-noise ratio between two same-shaped images, in dB.
///
/// Returns 100.0 when the images are identical. Symmetric in its arguments.
pub fn psnr(a: &RgbImage, b: &RgbImage) -> Result<f64> {
    check_dimensions(a, b)?;

    let mut sum = 0.0f64;
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        for channel in 0..3 {
            let diff = pa.0[channel] as f64 - pb.0[channel] as f64;
            sum += diff * diff;
        }
    }
    let count = (a.width() * a.height() * 3) as f64;
    let mse = sum / count;

    if mse == 0.0 {
        return Ok(PSNR_IDENTICAL);
    }
    Ok(20.0 * (PEAK / mse.sqrt()).log10())
}

/// Mean structural similarity between two same-shaped images.
///
/// Computed per channel over every valid 7x7 window position with uniform
/// weighting, then averaged across windows and channels. Identical images
/// score exactly 1.0.
pub fn ssim(a: &RgbImage, b: &RgbImage) -> Result<f64> {
    check_dimensions(a, b)?;

    let (width, height) = a.dimensions();
    if width < SSIM_WINDOW || height < SSIM_WINDOW {
        return Err(Error::ImageTooSmall {
            width,
            height,
            window: SSIM_WINDOW,
        });
    }

    let mut total = 0.0f64;
    let mut windows = 0usize;
    for channel in 0..3 {
        for y0 in 0..=(height - SSIM_WINDOW) {
            for x0 in 0..=(width - SSIM_WINDOW) {
                total += window_ssim(a, b, channel, x0, y0);
                windows += 1;
            }
        }
    }
    Ok(total / windows as f64)
}

fn window_ssim(a: &RgbImage, b: &RgbImage, channel: usize, x0: u32, y0: u32) -> f64 {
    let n = (SSIM_WINDOW * SSIM_WINDOW) as f64;
    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    let mut sum_aa = 0.0;
    let mut sum_bb = 0.0;
    let mut sum_ab = 0.0;

    for y in y0..y0 + SSIM_WINDOW {
        for x in x0..x0 + SSIM_WINDOW {
            let va = a.get_pixel(x, y).0[channel] as f64;
            let vb = b.get_pixel(x, y).0[channel] as f64;
            sum_a += va;
            sum_b += vb;
            sum_aa += va * va;
            sum_bb += vb * vb;
            sum_ab += va * vb;
        }
    }

    let mean_a = sum_a / n;
    let mean_b = sum_b / n;
    let var_a = sum_aa / n - mean_a * mean_a;
    let var_b = sum_bb / n - mean_b * mean_b;
    let cov = sum_ab / n - mean_a * mean_b;

    ((2.0 * mean_a * mean_b + SSIM_C1) * (2.0 * cov + SSIM_C2))
        / ((mean_a * mean_a + mean_b * mean_b + SSIM_C1) * (var_a + var_b + SSIM_C2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32, offset: u8) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let base = ((x * 7 + y * 13) % 256) as u8;
            *pixel = Rgb([
                base.wrapping_add(offset),
                base.wrapping_mul(3),
                (255 - base).wrapping_add(offset),
            ]);
        }
        img
    }

    #[test]
    fn psnr_of_identical_images_is_sentinel() {
        let img = gradient(32, 32, 0);
        assert_eq!(psnr(&img, &img).unwrap(), 100.0);
    }

    #[test]
    fn psnr_is_symmetric_and_finite() {
        let a = gradient(32, 32, 0);
        let b = gradient(32, 32, 9);
        let ab = psnr(&a, &b).unwrap();
        let ba = psnr(&b, &a).unwrap();
        assert!(ab.is_finite());
        assert_eq!(ab, ba);
        assert!(ab < 100.0);
    }

    #[test]
    fn psnr_rejects_mismatched_dimensions() {
        let a = gradient(32, 32, 0);
        let b = gradient(16, 32, 0);
        assert!(matches!(
            psnr(&a, &b),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn ssim_of_identical_images_is_one() {
        let img = gradient(24, 24, 0);
        assert_eq!(ssim(&img, &img).unwrap(), 1.0);
    }

    #[test]
    fn ssim_of_different_images_is_below_one() {
        let a = gradient(24, 24, 0);
        let b = gradient(24, 24, 60);
        let value = ssim(&a, &b).unwrap();
        assert!(value < 1.0);
        assert!(value > -1.0);
    }

    #[test]
    fn ssim_rejects_tiny_images() {
        let a = gradient(4, 4, 0);
        assert!(matches!(ssim(&a, &a), Err(Error::ImageTooSmall { .. })));
    }
}
