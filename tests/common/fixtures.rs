#![allow(dead_code)]

use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use imgaug::Label;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 100x100 image filled with pure red
pub fn red_image() -> RgbImage {
    uniform_image(100, 100, [255, 0, 0])
}

/// Image filled with a single colour
pub fn uniform_image(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    ImageBuffer::from_fn(width, height, |_, _| Rgb(color))
}

/// RGB gradient with a constant blue channel
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let r = (x * 255 / width) as u8;
        let g = (y * 255 / height) as u8;
        Rgb([r, g, 128])
    })
}

/// Black and white squares of `cell` pixels
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Saves `img` as a PNG named `name` inside `dir` and returns its path
pub fn save_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

/// Population variance of every subpixel value
pub fn variance(img: &DynamicImage) -> f64 {
    let bytes = img.as_bytes();
    let n = bytes.len() as f64;
    let mean = bytes.iter().map(|&b| b as f64).sum::<f64>() / n;
    bytes
        .iter()
        .map(|&b| (b as f64 - mean).powi(2))
        .sum::<f64>()
        / n
}

/// File names directly inside `dir`, sorted
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Entry names of a zip archive, sorted
pub fn zip_entry_names(path: &Path) -> anyhow::Result<Vec<String>> {
    let archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut names: Vec<String> = archive.file_names().map(|s| s.to_string()).collect();
    names.sort();
    Ok(names)
}

/// Decode one JPEG entry of a zip archive
pub fn zip_entry_image(path: &Path, entry: &str) -> anyhow::Result<DynamicImage> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut file = archive.by_name(entry)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(image::load_from_memory_with_format(
        &bytes,
        image::ImageFormat::Jpeg,
    )?)
}

/// Entry names of a tar.zst archive, sorted
pub fn tar_zst_entry_names(path: &Path) -> anyhow::Result<Vec<String>> {
    let decoder = zstd::stream::read::Decoder::new(File::open(path)?)?;
    let mut archive = tar::Archive::new(decoder);
    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        names.push(entry.path()?.to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Every `{base}_{label}_{round}.jpeg` name for `rounds` rounds, sorted
pub fn expected_entries(base: &str, rounds: u32) -> Vec<String> {
    let mut names: Vec<String> = (1..=rounds)
        .flat_map(|round| {
            Label::ALL
                .iter()
                .map(move |label| format!("{}_{}_{}.jpeg", base, label, round))
        })
        .collect();
    names.sort();
    names
}
