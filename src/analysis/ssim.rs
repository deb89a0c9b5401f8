//! Windowed structural similarity (SSIM).
//!
//! Only windows lying fully inside the image are evaluated, so the map is
//! `window_size - 1` pixels smaller than the inputs on each axis. Map pixel
//! `(x, y)` describes the window centred on image pixel
//! `(x + offset, y + offset)`.

use image::{GrayImage, Luma};
use log::debug;
use ndarray::{Array2, Zip};

use crate::{
    error::{ComparisonError, Result},
    image_utils::{gaussian_window, gray_to_array, uniform_window},
};

const DYNAMIC_RANGE: f64 = 255.0;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

#[derive(Debug, Clone)]
pub struct SimilarityMap {
    values: Array2<f64>,
    offset: u32,
}

impl SimilarityMap {
    /// `(width, height)` of the map.
    pub fn dimensions(&self) -> (u32, u32) {
        let (rows, cols) = self.values.dim();
        (cols as u32, rows as u32)
    }

    /// Shift from map coordinates to coordinates of the compared images.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        self.values.get([y as usize, x as usize]).copied()
    }

    pub fn mean(&self) -> f64 {
        self.values.mean().unwrap_or(1.0).clamp(-1.0, 1.0)
    }

    pub fn min(&self) -> f64 {
        self.values.fold(f64::INFINITY, |acc, &v| acc.min(v))
    }

    /// Renders similarity as 8-bit intensity: 255 for identical, 0 for opposite structure.
    pub fn to_intensity_image(&self) -> GrayImage {
        let (width, height) = self.dimensions();
        GrayImage::from_fn(width, height, |x, y| {
            let s = self.values[[y as usize, x as usize]];
            Luma([((1.0 + s) * 127.5).round().clamp(0.0, 255.0) as u8])
        })
    }
}

pub struct SimilarityEngine {
    window_size: u32,
    gaussian_weights: bool,
    sigma: f64,
    parallel: bool,
}

impl SimilarityEngine {
    pub fn new(window_size: u32) -> Result<Self> {
        if window_size < 3 || window_size % 2 == 0 {
            return Err(ComparisonError::InvalidParameter(format!(
                "SSIM window size must be odd and at least 3, got {}",
                window_size
            )));
        }

        Ok(Self {
            window_size,
            gaussian_weights: true,
            sigma: 1.5,
            parallel: true,
        })
    }

    pub fn with_gaussian_sigma(mut self, sigma: f64) -> Self {
        self.gaussian_weights = true;
        self.sigma = sigma;
        self
    }

    pub fn with_uniform_window(mut self) -> Self {
        self.gaussian_weights = false;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn compute(&self, reference: &GrayImage, candidate: &GrayImage) -> Result<SimilarityMap> {
        let (width, height) = reference.dimensions();
        if candidate.dimensions() != (width, height) {
            return Err(ComparisonError::mismatch(
                (width, height),
                candidate.dimensions(),
            ));
        }
        if width < self.window_size || height < self.window_size {
            return Err(ComparisonError::InvalidParameter(format!(
                "{}x{} image is smaller than the {}x{} SSIM window",
                width, height, self.window_size, self.window_size
            )));
        }

        let k = self.window_size as usize;
        let weights = if self.gaussian_weights {
            gaussian_window(k, self.sigma)
        } else {
            uniform_window(k)
        };
        // Sample covariance for the uniform window, as in the original SSIM reference code.
        let cov_norm = if self.gaussian_weights {
            1.0
        } else {
            let n = (k * k) as f64;
            n / (n - 1.0)
        };

        let x = gray_to_array(reference);
        let y = gray_to_array(candidate);
        let c1 = (K1 * DYNAMIC_RANGE).powi(2);
        let c2 = (K2 * DYNAMIC_RANGE).powi(2);

        let rows = height as usize - k + 1;
        let cols = width as usize - k + 1;
        let mut values = Array2::<f64>::zeros((rows, cols));

        let window_ssim = |(oy, ox): (usize, usize), out: &mut f64| {
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            let mut sum_xx = 0.0;
            let mut sum_yy = 0.0;
            let mut sum_xy = 0.0;

            for dy in 0..k {
                for dx in 0..k {
                    let w = weights[dy * k + dx];
                    let a = x[[oy + dy, ox + dx]];
                    let b = y[[oy + dy, ox + dx]];
                    sum_x += w * a;
                    sum_y += w * b;
                    sum_xx += w * (a * a);
                    sum_yy += w * (b * b);
                    sum_xy += w * (a * b);
                }
            }

            let var_x = (sum_xx - sum_x * sum_x) * cov_norm;
            let var_y = (sum_yy - sum_y * sum_y) * cov_norm;
            let cov_xy = (sum_xy - sum_x * sum_y) * cov_norm;

            let numerator = (2.0 * (sum_x * sum_y) + c1) * (2.0 * cov_xy + c2);
            let denominator = (sum_x * sum_x + sum_y * sum_y + c1) * (var_x + var_y + c2);

            *out = (numerator / denominator).clamp(-1.0, 1.0);
        };

        if self.parallel {
            Zip::indexed(&mut values).par_for_each(window_ssim);
        } else {
            Zip::indexed(&mut values).for_each(window_ssim);
        }

        let map = SimilarityMap {
            values,
            offset: self.window_size / 2,
        };

        debug!(
            "SimilarityEngine: {}x{} map (offset {}), mean {:.4}, min {:.4}",
            cols,
            rows,
            map.offset,
            map.mean(),
            map.min()
        );

        Ok(map)
    }
}
