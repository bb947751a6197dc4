use image::DynamicImage;
use std::fmt;
use std::path::PathBuf;

/// Identifier of one Filter Bank output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    Hsv,
    Grayscale,
    Bw,
    Blur,
    ChannelBlur,
    ZoomBlur,
    DirectionalBlur,
    DefocusBlur,
}

impl Label {
    /// Every label, in the order the standard bank produces them
    pub const ALL: [Label; 14] = [
        Label::Red,
        Label::Green,
        Label::Blue,
        Label::Cyan,
        Label::Magenta,
        Label::Yellow,
        Label::Hsv,
        Label::Grayscale,
        Label::Bw,
        Label::Blur,
        Label::ChannelBlur,
        Label::ZoomBlur,
        Label::DirectionalBlur,
        Label::DefocusBlur,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Red => "red",
            Label::Green => "green",
            Label::Blue => "blue",
            Label::Cyan => "cyan",
            Label::Magenta => "magenta",
            Label::Yellow => "yellow",
            Label::Hsv => "hsv",
            Label::Grayscale => "grayscale",
            Label::Bw => "bw",
            Label::Blur => "blur",
            Label::ChannelBlur => "channel_blur",
            Label::ZoomBlur => "zoom_blur",
            Label::DirectionalBlur => "directional_blur",
            Label::DefocusBlur => "defocus_blur",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filtered rendering of a source image
///
/// `grayscale` and `bw` carry a single-channel buffer, `hsv` carries H, S, V in
/// place of R, G, B. Everything else is 8-bit RGB.
#[derive(Debug, Clone)]
pub struct Variant {
    pub label: Label,
    pub image: DynamicImage,
}

impl Variant {
    pub fn new(label: Label, image: DynamicImage) -> Self {
        Self { label, image }
    }
}

/// The 14 variants of one augmentation round
#[derive(Debug, Clone)]
pub struct Batch {
    /// Zero-based round index, only used for naming
    pub round: u32,
    pub variants: Vec<Variant>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.variants.iter().map(|v| v.label).collect()
    }

    /// Entry name of a variant of this round, e.g. `cat_hsv_2.jpeg`
    pub fn entry_name(&self, base_name: &str, label: Label) -> String {
        format!("{}_{}_{}.jpeg", base_name, label, self.round + 1)
    }
}

/// Counters for one driver invocation
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub images_processed: usize,
    pub images_skipped: usize,
    pub images_failed: usize,
    pub variants_written: usize,
    pub variants_failed: usize,
    pub archives: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of variants successfully archived
    pub fn total(&self) -> usize {
        self.variants_written
    }

    pub fn log_summary(&self) {
        log::info!("=== Augmentation Summary ===");
        log::info!("Images processed: {}", self.images_processed);
        log::info!("Archives written: {}", self.archives.len());
        log::info!("Variants written: {}", self.variants_written);

        if self.images_skipped > 0 {
            log::warn!("Images skipped (unreadable): {}", self.images_skipped);
        }
        if self.images_failed > 0 {
            log::warn!("Images failed (archive error): {}", self.images_failed);
        }
        if self.variants_failed > 0 {
            log::warn!("Variants failed: {}", self.variants_failed);
        }
    }
}
