use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern, glob_with};
use image::RgbImage;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::ArchiveWriter;
use crate::augment::generate_rounds;
use crate::config::RunConfig;
use crate::filters::FilterBank;
use crate::models::RunSummary;

/// Extensions picked up when a directory is given as input
pub const IMG_FORMATS: [&str; 3] = ["jpeg", "jpg", "png"];

/// Replace every directory in `inputs` by the images directly inside it
///
/// Plain paths are kept as given; whether they are readable is decided later.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        let Some(dir) = input.to_str() else {
            warn!("Skipping directory with non UTF-8 path: {:?}", input);
            continue;
        };

        let mut found: Vec<PathBuf> = IMG_FORMATS
            .iter()
            .flat_map(|ext| {
                let pattern = format!("{}/*.{}", Pattern::escape(dir), ext);
                match glob_with(&pattern, options) {
                    Ok(entries) => entries.filter_map(|entry| entry.ok()).collect::<Vec<PathBuf>>(),
                    Err(e) => {
                        warn!("Invalid glob pattern {}: {}", pattern, e);
                        Vec::new()
                    }
                }
            })
            .filter(|path| path.is_file())
            .collect();
        found.sort();
        found.dedup();
        debug!("Found {} images in {:?}", found.len(), input);
        paths.extend(found);
    }
    paths
}

/// Decode a source image as 8-bit RGB
pub fn load_source(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).with_context(|| format!("Failed to decode image {:?}", path))?;
    anyhow::ensure!(
        img.width() > 0 && img.height() > 0,
        "Image {:?} is empty",
        path
    );
    Ok(img.to_rgb8())
}

/// Drives one augmentation run over a list of source images
pub struct AugmentationRun {
    config: RunConfig,
    bank: FilterBank,
}

impl AugmentationRun {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            bank: FilterBank::standard(),
        }
    }

    /// Replace the standard filter bank
    ///
    /// The bank must produce every label exactly once.
    pub fn with_bank(mut self, bank: FilterBank) -> Result<Self> {
        if !bank.is_complete() {
            anyhow::bail!(
                "Filter bank must produce every label exactly once, got {:?}",
                bank.labels()
            );
        }
        self.bank = bank;
        Ok(self)
    }

    /// Process every input in order and return the accumulated summary
    ///
    /// Only a missing, uncreatable output directory fails the whole run.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<RunSummary> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut summary = RunSummary::new();
        for path in inputs {
            let source = match load_source(path) {
                Ok(source) => source,
                Err(e) => {
                    warn!("Skipping unreadable image: {:#}", e);
                    summary.images_skipped += 1;
                    continue;
                }
            };
            let Some(base_name) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("Skipping image without a usable file name: {:?}", path);
                summary.images_skipped += 1;
                continue;
            };

            let batches = generate_rounds(&self.bank, &source, self.config.rounds, &mut rng);
            let writer =
                ArchiveWriter::new(base_name, output_dir).with_quality(self.config.jpeg_quality);

            match writer.write_archive(self.config.format, batches) {
                Ok(Some(outcome)) => {
                    info!(
                        "Augmented images for {:?} saved in {:?} ({} variants)",
                        path, outcome.path, outcome.report.written
                    );
                    summary.images_processed += 1;
                    summary.variants_written += outcome.report.written;
                    summary.variants_failed += outcome.report.failed;
                    summary.archives.push(outcome.path);
                }
                Ok(None) => {
                    info!("No rounds requested for {:?}; no archive created", path);
                    summary.images_processed += 1;
                }
                Err(e) => {
                    error!("Failed to archive variants of {:?}: {:#}", path, e);
                    summary.images_failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
