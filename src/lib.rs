//! Reference-versus-candidate image comparison.
//!
//! Both images are resized to a common canvas, compared with windowed SSIM,
//! and the dissimilar areas are segmented with Otsu's threshold, reduced to
//! bounding boxes and drawn onto copies of the inputs.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{
        canonicalize::{Canonicalizer, ResampleFilter, decode_image},
        regions::RegionExtractor,
        segmentation::Segmenter,
        ssim::{SimilarityEngine, SimilarityMap},
    },
    detection::{Classifier, Verdict},
    error::{ComparisonError, Result},
    report::{EncodedImages, visualization::Annotator},
};

pub mod analysis;
pub mod detection;
pub mod error;
pub mod image_utils;
pub mod report;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub target_width: u32,
    pub target_height: u32,
    pub ssim_window_size: u32,
    pub gaussian_weights: bool,
    pub gaussian_sigma: f64,
    pub resize_filter: ResampleFilter,
    pub min_region_area: u32,
    pub match_threshold: f64,
    pub minor_threshold: f64,
    pub annotation_color: [u8; 3],
    pub annotation_thickness: u32,
    pub parallel: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            target_width: 250,
            target_height: 160,
            ssim_window_size: 11,
            gaussian_weights: true,
            gaussian_sigma: 1.5,
            resize_filter: ResampleFilter::CatmullRom,
            min_region_area: 0,
            match_threshold: 0.95,
            minor_threshold: 0.7,
            annotation_color: [255, 0, 0],
            annotation_thickness: 2,
            parallel: true,
        }
    }
}

impl ComparisonConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ComparisonError::InvalidParameter(format!(
                "target size must be non-zero, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        if self.ssim_window_size < 3 || self.ssim_window_size % 2 == 0 {
            return Err(ComparisonError::InvalidParameter(format!(
                "SSIM window size must be odd and at least 3, got {}",
                self.ssim_window_size
            )));
        }
        if self.ssim_window_size > self.target_width.min(self.target_height) {
            return Err(ComparisonError::InvalidParameter(format!(
                "SSIM window {} does not fit a {}x{} canvas",
                self.ssim_window_size, self.target_width, self.target_height
            )));
        }
        if self.gaussian_weights && !(self.gaussian_sigma.is_finite() && self.gaussian_sigma > 0.0) {
            return Err(ComparisonError::InvalidParameter(format!(
                "gaussian sigma must be positive, got {}",
                self.gaussian_sigma
            )));
        }
        if self.annotation_thickness == 0 {
            return Err(ComparisonError::InvalidParameter(
                "annotation thickness must be at least 1".into(),
            ));
        }
        Classifier::new(self.match_threshold, self.minor_threshold)?;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ComparisonError::InvalidParameter(format!("config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Axis-aligned bounding box of one connected cluster of differing pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x - self.x < self.width && y >= self.y && y - self.y < self.height
    }

    pub fn translate(&self, offset: u32) -> Region {
        Region {
            x: self.x.saturating_add(offset),
            y: self.y.saturating_add(offset),
            ..*self
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub score: f64,
    pub verdict: Verdict,
    /// Regions in canonical-image coordinates.
    pub regions: Vec<Region>,
    pub annotated_reference: RgbImage,
    pub annotated_candidate: RgbImage,
    /// Binary mask on the similarity-map grid (see [`ComparisonResult::offset`]).
    pub difference_mask: GrayImage,
    /// Similarity map rendered as 8-bit intensity, bright where the images agree.
    pub similarity_image: GrayImage,
    pub similarity_map: SimilarityMap,
    pub otsu_level: u8,
}

impl ComparisonResult {
    /// Score as a percentage rounded to two decimals.
    pub fn percentage(&self) -> f64 {
        (self.score * 10_000.0).round() / 100.0
    }

    pub fn message(&self) -> &'static str {
        self.verdict.message()
    }

    /// Offset from mask/map coordinates to canonical-image coordinates.
    pub fn offset(&self) -> u32 {
        self.similarity_map.offset()
    }

    pub fn encode_png(&self) -> Result<EncodedImages> {
        EncodedImages::from_result(self)
    }
}

pub struct ImageComparator {
    canonicalizer: Canonicalizer,
    engine: SimilarityEngine,
    segmenter: Segmenter,
    extractor: RegionExtractor,
    annotator: Annotator,
    classifier: Classifier,
}

impl ImageComparator {
    pub fn new(config: ComparisonConfig) -> Result<Self> {
        config.validate()?;

        let canonicalizer = Canonicalizer::new(config.target_width, config.target_height)?
            .with_filter(config.resize_filter);

        let engine = SimilarityEngine::new(config.ssim_window_size)?.with_parallel(config.parallel);
        let engine = if config.gaussian_weights {
            engine.with_gaussian_sigma(config.gaussian_sigma)
        } else {
            engine.with_uniform_window()
        };

        Ok(Self {
            canonicalizer,
            engine,
            segmenter: Segmenter::new(),
            extractor: RegionExtractor::new().with_min_region_area(config.min_region_area),
            annotator: Annotator::new(config.annotation_color, config.annotation_thickness)?,
            classifier: Classifier::new(config.match_threshold, config.minor_threshold)?,
        })
    }

    pub fn compare(
        &self,
        reference: &DynamicImage,
        candidate: &DynamicImage,
    ) -> Result<ComparisonResult> {
        let pair = self.canonicalizer.canonicalize(reference, candidate)?;
        let (reference_gray, candidate_gray) = pair.to_gray();

        let similarity_map = self.engine.compute(&reference_gray, &candidate_gray)?;
        let score = similarity_map.mean();
        let verdict = self.classifier.classify(score);

        let mask = self.segmenter.segment(&similarity_map);
        let offset = similarity_map.offset();
        let regions = self
            .extractor
            .extract(&mask)
            .into_iter()
            .map(|r| r.translate(offset))
            .collect::<Vec<_>>();

        let (annotated_reference, annotated_candidate) = self.annotator.annotate(&pair, &regions)?;

        debug!(
            "compare: score {:.4} ({}), {} region(s)",
            score,
            verdict,
            regions.len()
        );

        Ok(ComparisonResult {
            score,
            verdict,
            regions,
            annotated_reference,
            annotated_candidate,
            similarity_image: similarity_map.to_intensity_image(),
            otsu_level: mask.level(),
            difference_mask: mask.into_image(),
            similarity_map,
        })
    }

    /// Decodes both inputs (PNG, JPEG, ...) and compares them.
    pub fn compare_bytes(&self, reference: &[u8], candidate: &[u8]) -> Result<ComparisonResult> {
        let reference = decode_image(reference)?;
        let candidate = decode_image(candidate)?;
        self.compare(&reference, &candidate)
    }
}

pub fn compare(
    reference: &DynamicImage,
    candidate: &DynamicImage,
    config: &ComparisonConfig,
) -> Result<ComparisonResult> {
    ImageComparator::new(config.clone())?.compare(reference, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_contains_edges() {
        let region = Region { x: 2, y: 3, width: 4, height: 1 };
        assert!(region.contains(2, 3));
        assert!(region.contains(5, 3));
        assert!(!region.contains(6, 3));
        assert!(!region.contains(2, 4));
        assert!(!region.contains(1, 3));
    }

    #[test]
    fn test_region_near_u32_max_does_not_overflow() {
        let region: Region = serde_json::from_str(
            r#"{ "x": 4294967290, "y": 4294967290, "width": 100, "height": 100 }"#,
        )
        .unwrap();

        assert!(region.contains(u32::MAX, u32::MAX));
        assert!(!region.contains(0, 0));
        assert_eq!(region.translate(10).x, u32::MAX);
        assert_eq!(region.area(), 10_000);
    }
}
