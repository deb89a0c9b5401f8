use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use log::debug;

use crate::{
    Region,
    analysis::canonicalize::CanonicalPair,
    error::{ComparisonError, Result},
};

#[derive(Debug, Clone)]
pub struct Annotator {
    color: Rgb<u8>,
    thickness: u32,
}

impl Annotator {
    pub fn new(color: [u8; 3], thickness: u32) -> Result<Self> {
        if thickness == 0 {
            return Err(ComparisonError::InvalidParameter(
                "annotation thickness must be at least 1".into(),
            ));
        }

        Ok(Self {
            color: Rgb(color),
            thickness,
        })
    }

    /// Draws every region on copies of both canonical images.
    ///
    /// Regions are in canonical-image coordinates.
    pub fn annotate(&self, pair: &CanonicalPair, regions: &[Region]) -> Result<(RgbImage, RgbImage)> {
        let dimensions = pair.dimensions();
        if pair.candidate.dimensions() != dimensions {
            return Err(ComparisonError::mismatch(
                dimensions,
                pair.candidate.dimensions(),
            ));
        }

        let mut reference = pair.reference.clone();
        let mut candidate = pair.candidate.clone();

        for region in regions {
            self.draw_region_border(&mut reference, region);
            self.draw_region_border(&mut candidate, region);
        }

        debug!("Annotator: drew {} region(s)", regions.len());

        Ok((reference, candidate))
    }

    /// Outline from `(x, y)` to `(x + width, y + height)`, thickened outward.
    fn draw_region_border(&self, image: &mut RgbImage, region: &Region) {
        for t in 0..self.thickness {
            let rect = Rect::at(region.x as i32 - t as i32, region.y as i32 - t as i32)
                .of_size(region.width + 1 + 2 * t, region.height + 1 + 2 * t);
            draw_hollow_rect_mut(image, rect, self.color);
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self {
            color: Rgb([255, 0, 0]),
            thickness: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(width: u32, height: u32) -> CanonicalPair {
        CanonicalPair {
            reference: RgbImage::from_pixel(width, height, Rgb([128, 128, 128])),
            candidate: RgbImage::from_pixel(width, height, Rgb([64, 64, 64])),
        }
    }

    #[test]
    fn test_outline_is_two_pixels_wide() {
        let pair = pair(30, 30);
        let region = Region { x: 10, y: 10, width: 5, height: 5 };
        let (reference, candidate) = Annotator::default().annotate(&pair, &[region]).unwrap();

        let red = Rgb([255, 0, 0]);
        for image in [&reference, &candidate] {
            assert_eq!(image.get_pixel(10, 10), &red);
            assert_eq!(image.get_pixel(9, 9), &red);
            assert_eq!(image.get_pixel(15, 12), &red);
            assert_eq!(image.get_pixel(16, 12), &red);
            assert_ne!(image.get_pixel(8, 12), &red);
            assert_ne!(image.get_pixel(12, 12), &red);
        }
        assert_eq!(pair.reference.get_pixel(10, 10), &Rgb([128, 128, 128]));
    }

    #[test]
    fn test_border_region_is_clipped() {
        let pair = pair(20, 20);
        let region = Region { x: 0, y: 0, width: 20, height: 20 };
        let (reference, _) = Annotator::default().annotate(&pair, &[region]).unwrap();
        assert_eq!(reference.get_pixel(0, 5), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_mismatched_pair_fails() {
        let mut pair = pair(20, 20);
        pair.candidate = RgbImage::new(21, 20);
        let result = Annotator::default().annotate(&pair, &[]);
        assert!(matches!(result, Err(ComparisonError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_zero_thickness_rejected() {
        assert!(Annotator::new([0, 255, 0], 0).is_err());
    }
}
