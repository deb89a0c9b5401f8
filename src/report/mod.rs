pub mod visualization;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use serde::Serialize;

use crate::{ComparisonResult, Region, detection::Verdict, error::Result};

#[derive(Serialize)]
pub struct JsonReport {
    pub score: f64,
    pub percentage: f64,
    pub verdict: Verdict,
    pub message: String,
    pub otsu_level: u8,
    pub map_offset: u32,
    pub mask_width: u32,
    pub mask_height: u32,
    pub region_count: usize,
    pub regions: Vec<Region>,
}

impl From<&ComparisonResult> for JsonReport {
    fn from(result: &ComparisonResult) -> Self {
        let (mask_width, mask_height) = result.difference_mask.dimensions();
        Self {
            score: result.score,
            percentage: result.percentage(),
            verdict: result.verdict,
            message: result.message().to_string(),
            otsu_level: result.otsu_level,
            map_offset: result.offset(),
            mask_width,
            mask_height,
            region_count: result.regions.len(),
            regions: result.regions.clone(),
        }
    }
}

impl JsonReport {
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// PNG encodings of every image a comparison produces.
#[derive(Debug, Clone)]
pub struct EncodedImages {
    pub annotated_reference: Vec<u8>,
    pub annotated_candidate: Vec<u8>,
    pub difference_mask: Vec<u8>,
    pub similarity_image: Vec<u8>,
}

impl EncodedImages {
    pub fn from_result(result: &ComparisonResult) -> Result<Self> {
        Ok(Self {
            annotated_reference: encode_png(&DynamicImage::ImageRgb8(
                result.annotated_reference.clone(),
            ))?,
            annotated_candidate: encode_png(&DynamicImage::ImageRgb8(
                result.annotated_candidate.clone(),
            ))?,
            difference_mask: encode_png(&DynamicImage::ImageLuma8(result.difference_mask.clone()))?,
            similarity_image: encode_png(&DynamicImage::ImageLuma8(
                result.similarity_image.clone(),
            ))?,
        })
    }
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
