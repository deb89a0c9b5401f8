use image::{DynamicImage, GrayImage, Luma, RgbImage};
use ndarray::Array2;

use crate::error::{ComparisonError, Result};

/// BT.601 luma, rounded to the nearest integer.
pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let lum = 0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64;
        gray.put_pixel(x, y, Luma([lum.round().clamp(0.0, 255.0) as u8]));
    }

    gray
}

pub fn gray_to_array(image: &GrayImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    let mut arr = Array2::zeros((height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        arr[[y as usize, x as usize]] = pixel[0] as f64;
    }

    arr
}

/// Normalized `size`x`size` Gaussian weights, row-major.
pub fn gaussian_window(size: usize, sigma: f64) -> Vec<f64> {
    let radius = (size / 2) as f64;
    let profile = (0..size)
        .map(|i| {
            let d = i as f64 - radius;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect::<Vec<_>>();

    let mut weights = Vec::with_capacity(size * size);
    for &wy in &profile {
        for &wx in &profile {
            weights.push(wy * wx);
        }
    }

    let total = weights.iter().sum::<f64>();
    weights.iter_mut().for_each(|w| *w /= total);
    weights
}

pub fn uniform_window(size: usize) -> Vec<f64> {
    let n = (size * size) as f64;
    vec![1.0 / n; size * size]
}

/// Builds an image from an interleaved 8-bit buffer with 1 (gray) or 3 (RGB) channels.
pub fn image_from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(ComparisonError::InvalidImage(format!(
            "zero-area buffer ({}x{})",
            width, height
        )));
    }

    let expected = width as usize * height as usize * channels as usize;
    if data.len() != expected {
        return Err(ComparisonError::InvalidImage(format!(
            "buffer holds {} bytes, {}x{}x{} needs {}",
            data.len(),
            width,
            height,
            channels,
            expected
        )));
    }

    let image = match channels {
        1 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        other => {
            return Err(ComparisonError::InvalidImage(format!(
                "unsupported channel count {}",
                other
            )));
        }
    };

    image.ok_or_else(|| ComparisonError::InvalidImage("buffer does not fit dimensions".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_gray_of_neutral_rgb_is_unchanged() {
        let rgb = RgbImage::from_pixel(4, 3, Rgb([128, 128, 128]));
        let gray = rgb_to_gray(&rgb);
        assert!(gray.pixels().all(|p| p[0] == 128));
    }

    #[test]
    fn test_gaussian_window_is_normalized_and_symmetric() {
        let w = gaussian_window(11, 1.5);
        assert_eq!(w.len(), 121);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(w[0], w[120]);
        assert!(w[60] > w[59]);
    }

    #[test]
    fn test_image_from_raw_rejects_bad_buffers() {
        assert!(image_from_raw(0, 5, 1, Vec::new()).is_err());
        assert!(image_from_raw(2, 2, 3, vec![0; 11]).is_err());
        assert!(image_from_raw(2, 2, 4, vec![0; 16]).is_err());

        let image = image_from_raw(2, 2, 1, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(image.to_luma8().get_pixel(1, 1)[0], 4);
    }
}
