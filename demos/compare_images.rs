//! Compare Images Example
//!
//! Compares a candidate image against a reference, prints the verdict and
//! writes the annotated images, the difference mask and a JSON report.
//!
//! Run with: cargo run --example compare_images -- <reference> <candidate> [output_dir] [config.json]

use std::{env, fs, path::Path};

use image_difference::{
    ComparisonConfig, ImageComparator, error::Result, report::JsonReport,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        println!("Usage: {} <reference> <candidate> [output_dir] [config.json]", args[0]);
        println!();
        println!("Arguments:");
        println!("  reference   - Path to the trusted reference image");
        println!("  candidate   - Path to the image to verify");
        println!("  output_dir  - Optional output directory (default: ./output)");
        println!("  config.json - Optional comparison settings");
        return Ok(());
    }

    let output_dir = args.get(3).map(|s| s.as_str()).unwrap_or("./output");
    let config = match args.get(4) {
        Some(path) => ComparisonConfig::from_json_file(path)?,
        None => ComparisonConfig::default(),
    };

    let reference = fs::read(&args[1])?;
    let candidate = fs::read(&args[2])?;

    let comparator = ImageComparator::new(config)?;
    let result = comparator.compare_bytes(&reference, &candidate)?;

    println!("Similarity: {}% correct", result.percentage());
    println!("Verdict:    {}", result.verdict);
    println!("            {}", result.message());
    println!("Regions:    {}", result.regions.len());
    for (i, region) in result.regions.iter().take(10).enumerate() {
        println!(
            "  {}. ({}, {}) {}x{}",
            i + 1,
            region.x,
            region.y,
            region.width,
            region.height
        );
    }
    if result.regions.len() > 10 {
        println!("  ... and {} more", result.regions.len() - 10);
    }

    fs::create_dir_all(output_dir)?;
    let out = Path::new(output_dir);
    let encoded = result.encode_png()?;

    fs::write(out.join("image_original.png"), &encoded.annotated_reference)?;
    fs::write(out.join("image_uploaded.png"), &encoded.annotated_candidate)?;
    fs::write(out.join("image_diff.png"), &encoded.similarity_image)?;
    fs::write(out.join("image_thresh.png"), &encoded.difference_mask)?;

    match JsonReport::from(&result).to_json() {
        Ok(json) => fs::write(out.join("report.json"), json)?,
        Err(e) => eprintln!("Failed to render report: {}", e),
    }

    println!();
    println!("Output written to {}", output_dir);

    Ok(())
}
