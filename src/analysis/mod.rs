pub mod canonicalize;
pub mod regions;
pub mod segmentation;
pub mod ssim;
