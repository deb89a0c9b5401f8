use image::{GrayImage, Luma};
use log::debug;

use crate::analysis::ssim::SimilarityMap;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Binary mask of dissimilar pixels, on the similarity-map grid.
#[derive(Debug, Clone)]
pub struct DifferenceMask {
    image: GrayImage,
    level: u8,
}

impl DifferenceMask {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Otsu level: intensities at or below it were flagged as different.
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_different(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] == FOREGROUND
    }

    pub fn flagged_pixels(&self) -> usize {
        self.image.pixels().filter(|p| p[0] == FOREGROUND).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

impl From<GrayImage> for DifferenceMask {
    /// Wraps an existing mask; any non-zero sample counts as foreground.
    fn from(image: GrayImage) -> Self {
        let mut image = image;
        for pixel in image.pixels_mut() {
            if pixel[0] != BACKGROUND {
                *pixel = Luma([FOREGROUND]);
            }
        }
        Self { image, level: 0 }
    }
}

#[derive(Debug, Default)]
pub struct Segmenter;

impl Segmenter {
    pub fn new() -> Self {
        Self
    }

    pub fn segment(&self, map: &SimilarityMap) -> DifferenceMask {
        let intensity = map.to_intensity_image();
        let level = otsu_level(&intensity);
        let image = threshold_inverted(&intensity, level);

        let mask = DifferenceMask { image, level };
        debug!(
            "Segmenter: otsu level {}, {} of {} pixels flagged",
            level,
            mask.flagged_pixels(),
            intensity.len()
        );
        mask
    }
}

/// Otsu's threshold over a 256-bin histogram, via `imageproc`.
///
/// Class 0 holds intensities `<= level`. The first level maximizing the
/// between-class variance wins; a histogram with a single populated bin
/// returns 0.
pub fn otsu_level(image: &GrayImage) -> u8 {
    imageproc::contrast::otsu_level(image)
}

fn threshold_inverted(image: &GrayImage, level: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = if pixel[0] <= level { FOREGROUND } else { BACKGROUND };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ssim::SimilarityEngine;

    #[test]
    fn test_bimodal_level_is_first_maximum() {
        let img = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 3 { 50 } else { 200 }]));
        assert_eq!(otsu_level(&img), 50);
    }

    #[test]
    fn test_level_separates_clusters() {
        let img = GrayImage::from_fn(16, 16, |x, y| {
            let v = if y < 8 { 20 + (x % 4) as u8 } else { 180 + (x % 5) as u8 };
            Luma([v])
        });
        let level = otsu_level(&img);
        assert!((23..180).contains(&level));
    }

    #[test]
    fn test_uniform_image_does_not_panic() {
        assert_eq!(otsu_level(&GrayImage::from_pixel(5, 5, Luma([255]))), 0);
        assert_eq!(otsu_level(&GrayImage::from_pixel(5, 5, Luma([0]))), 0);
    }

    #[test]
    fn test_all_zero_intensity_flags_everything() {
        let intensity = GrayImage::from_pixel(5, 5, Luma([0]));
        let mask = threshold_inverted(&intensity, otsu_level(&intensity));
        assert!(mask.pixels().all(|p| p[0] == FOREGROUND));
    }

    #[test]
    fn test_all_bright_intensity_flags_nothing() {
        let intensity = GrayImage::from_pixel(5, 5, Luma([255]));
        let mask = threshold_inverted(&intensity, otsu_level(&intensity));
        assert!(mask.pixels().all(|p| p[0] == BACKGROUND));
    }

    #[test]
    fn test_identical_images_produce_empty_mask() {
        let img = GrayImage::from_fn(30, 30, |x, y| Luma([(x * 8 + y) as u8]));
        let map = SimilarityEngine::new(7).unwrap().compute(&img, &img).unwrap();

        let mask = Segmenter::new().segment(&map);
        assert_eq!(mask.dimensions(), map.dimensions());
        assert_eq!(mask.flagged_pixels(), 0);
    }

    #[test]
    fn test_dissimilar_area_is_foreground() {
        let reference = GrayImage::from_pixel(40, 40, Luma([128]));
        let mut candidate = reference.clone();
        for y in 15..25 {
            for x in 15..25 {
                candidate.put_pixel(x, y, Luma([0]));
            }
        }

        let map = SimilarityEngine::new(7).unwrap().compute(&reference, &candidate).unwrap();
        let mask = Segmenter::new().segment(&map);

        // map (17, 17) is the window centred on image (20, 20)
        assert!(mask.is_different(17, 17));
        assert!(!mask.is_different(0, 0));
        assert!(mask.as_image().pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_from_gray_binarizes() {
        let mask = DifferenceMask::from(GrayImage::from_fn(3, 1, |x, _| Luma([x as u8])));
        assert!(!mask.is_different(0, 0));
        assert!(mask.is_different(1, 0));
        assert!(mask.is_different(2, 0));
    }
}
