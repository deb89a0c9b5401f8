#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

pub fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
}

pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// Copy of `image` with the `w`x`h` block at `(x, y)` set to `value`.
pub fn with_block(image: &DynamicImage, x: u32, y: u32, w: u32, h: u32, value: u8) -> DynamicImage {
    let mut gray = image.to_luma8();
    for py in y..y + h {
        for px in x..x + w {
            gray.put_pixel(px, py, Luma([value]));
        }
    }
    DynamicImage::ImageLuma8(gray)
}

/// Deterministic high-frequency texture.
pub fn textured(width: u32, height: u32, seed: u32) -> DynamicImage {
    let gray = GrayImage::from_fn(width, height, |x, y| {
        let v = ((x * 13 + seed) ^ (y * 7) ^ (x * y + seed * 3)) & 0xFF;
        Luma([v as u8])
    });
    DynamicImage::ImageLuma8(gray)
}

pub fn checkerboard(width: u32, height: u32, cell: u32, dark: u8, light: u8) -> DynamicImage {
    let gray = GrayImage::from_fn(width, height, |x, y| {
        let on = ((x / cell) + (y / cell)) % 2 == 0;
        Luma([if on { dark } else { light }])
    });
    DynamicImage::ImageLuma8(gray)
}
