use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::archive::{ArchiveFormat, DEFAULT_JPEG_QUALITY};

/// Expand a small labeled image set by packing filtered variants of every
/// source image into a per-image archive
#[derive(Parser, Debug, Clone)]
#[command(name = "imgaug", version, long_about = None)]
pub struct Cli {
    /// Source images, or directories of .jpeg/.jpg/.png images
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory that receives one archive per source image
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Number of full filter rounds per source image
    #[arg(short, long, default_value_t = 1, value_parser = validate_rounds)]
    pub rounds: u32,

    /// Seed for the per-round variant ordering
    #[arg(long)]
    pub seed: Option<u64>,

    /// Archive container to produce
    #[arg(long, value_enum, default_value = "zip")]
    pub format: ArchiveFormat,

    /// JPEG quality of each archived variant
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = validate_quality)]
    pub quality: u8,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated settings for one augmentation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub rounds: u32,
    pub seed: Option<u64>,
    pub format: ArchiveFormat,
    pub jpeg_quality: u8,
}

impl RunConfig {
    pub fn new(output_dir: impl Into<PathBuf>, rounds: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            rounds,
            seed: None,
            format: ArchiveFormat::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_format(mut self, format: ArchiveFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }
}

impl TryFrom<&Cli> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(cli: &Cli) -> anyhow::Result<Self> {
        let Some(output_dir) = cli.output.clone() else {
            anyhow::bail!("No output directory selected (use --output <DIR>)");
        };
        let mut config = RunConfig::new(output_dir, cli.rounds)
            .with_format(cli.format)
            .with_quality(cli.quality);
        config.seed = cli.seed;
        Ok(config)
    }
}

// Rounds must be a positive integer
pub fn validate_rounds(s: &str) -> Result<u32, String> {
    match u32::from_str(s.trim()) {
        Ok(val) if val > 0 => Ok(val),
        _ => Err("ROUNDS must be a positive integer (e.g. 2 for 2x)".to_string()),
    }
}

// JPEG quality is a percentage in 1..=100
fn validate_quality(s: &str) -> Result<u8, String> {
    match u8::from_str(s) {
        Ok(val) if (1..=100).contains(&val) => Ok(val),
        _ => Err("QUALITY must be between 1 and 100".to_string()),
    }
}
