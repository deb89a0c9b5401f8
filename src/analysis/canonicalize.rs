use image::{DynamicImage, GenericImageView, GrayImage, RgbImage, imageops::FilterType};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ComparisonError, Result},
    image_utils::rgb_to_gray,
};

/// Resampling kernel used when bringing inputs to the canonical size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Reference and candidate brought to the same size and color depth.
#[derive(Debug, Clone)]
pub struct CanonicalPair {
    pub reference: RgbImage,
    pub candidate: RgbImage,
}

impl CanonicalPair {
    pub fn dimensions(&self) -> (u32, u32) {
        self.reference.dimensions()
    }

    pub fn to_gray(&self) -> (GrayImage, GrayImage) {
        (rgb_to_gray(&self.reference), rgb_to_gray(&self.candidate))
    }
}

pub struct Canonicalizer {
    width: u32,
    height: u32,
    filter: ResampleFilter,
}

impl Canonicalizer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ComparisonError::InvalidParameter(format!(
                "canonical size must be non-zero, got {}x{}",
                width, height
            )));
        }

        Ok(Self {
            width,
            height,
            filter: ResampleFilter::default(),
        })
    }

    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn canonicalize(
        &self,
        reference: &DynamicImage,
        candidate: &DynamicImage,
    ) -> Result<CanonicalPair> {
        let reference_rgb = self.normalize(reference, "reference")?;
        let candidate_rgb = self.normalize(candidate, "candidate")?;

        debug!(
            "Canonicalizer: {:?} + {:?} -> {}x{} ({:?})",
            reference.dimensions(),
            candidate.dimensions(),
            self.width,
            self.height,
            self.filter
        );

        Ok(CanonicalPair {
            reference: reference_rgb,
            candidate: candidate_rgb,
        })
    }

    fn normalize(&self, image: &DynamicImage, role: &str) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ComparisonError::InvalidImage(format!(
                "{} image has zero area ({}x{})",
                role, width, height
            )));
        }

        let rgb = image.to_rgb8();
        if (width, height) == (self.width, self.height) {
            return Ok(rgb);
        }

        Ok(image::imageops::resize(
            &rgb,
            self.width,
            self.height,
            self.filter.into(),
        ))
    }
}

/// Decodes an encoded raster (PNG, JPEG, ...) into an image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(ComparisonError::InvalidImage("empty input".into()));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| ComparisonError::InvalidImage(format!("cannot decode: {}", e)))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(ComparisonError::InvalidImage("decoded image has zero area".into()));
    }

    Ok(image)
}
