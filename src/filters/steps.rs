use crate::filters::{FilterStep, blur, color};
use crate::models::{Label, Variant};
use image::{DynamicImage, RgbImage};

/// Isolate the red, green and blue channels
pub struct ChannelIsolationStep;

impl FilterStep for ChannelIsolationStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        vec![
            Variant::new(Label::Red, DynamicImage::ImageRgb8(color::isolate_red(source))),
            Variant::new(Label::Green, DynamicImage::ImageRgb8(color::isolate_green(source))),
            Variant::new(Label::Blue, DynamicImage::ImageRgb8(color::isolate_blue(source))),
        ]
    }

    fn labels(&self) -> &[Label] {
        &[Label::Red, Label::Green, Label::Blue]
    }

    fn name(&self) -> &str {
        "Channel Isolation"
    }
}

/// Cyan, magenta and yellow views from one subtractive-colour decomposition
pub struct SubtractiveColorStep;

impl FilterStep for SubtractiveColorStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        let (cyan, magenta, yellow) = color::subtractive_views(source);
        vec![
            Variant::new(Label::Cyan, DynamicImage::ImageRgb8(cyan)),
            Variant::new(Label::Magenta, DynamicImage::ImageRgb8(magenta)),
            Variant::new(Label::Yellow, DynamicImage::ImageRgb8(yellow)),
        ]
    }

    fn labels(&self) -> &[Label] {
        &[Label::Cyan, Label::Magenta, Label::Yellow]
    }

    fn name(&self) -> &str {
        "Subtractive Color"
    }
}

/// Remap into HSV, kept in a 3-channel buffer
pub struct HsvStep;

impl FilterStep for HsvStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        vec![Variant::new(
            Label::Hsv,
            DynamicImage::ImageRgb8(color::to_hsv(source)),
        )]
    }

    fn labels(&self) -> &[Label] {
        &[Label::Hsv]
    }

    fn name(&self) -> &str {
        "HSV Remap"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl FilterStep for GrayscaleStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        vec![Variant::new(
            Label::Grayscale,
            DynamicImage::ImageLuma8(color::to_grayscale(source)),
        )]
    }

    fn labels(&self) -> &[Label] {
        &[Label::Grayscale]
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Grayscale followed by a fixed binary threshold
pub struct ThresholdStep {
    pub threshold: u8,
}

impl FilterStep for ThresholdStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        let gray = color::to_grayscale(source);
        vec![Variant::new(
            Label::Bw,
            DynamicImage::ImageLuma8(color::binarize(&gray, self.threshold)),
        )]
    }

    fn labels(&self) -> &[Label] {
        &[Label::Bw]
    }

    fn name(&self) -> &str {
        "Binary Threshold"
    }
}

/// Apply Gaussian blur
///
/// Used for both `blur` and `defocus_blur`, which differ only in kernel size.
pub struct GaussianBlurStep {
    pub label: Label,
    pub kernel_size: usize,
}

impl FilterStep for GaussianBlurStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        vec![Variant::new(
            self.label,
            DynamicImage::ImageRgb8(blur::gaussian_blur(source, self.kernel_size)),
        )]
    }

    fn labels(&self) -> &[Label] {
        std::slice::from_ref(&self.label)
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Gaussian blur per channel plane
pub struct ChannelBlurStep {
    pub kernel_size: usize,
}

impl FilterStep for ChannelBlurStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        vec![Variant::new(
            Label::ChannelBlur,
            DynamicImage::ImageRgb8(blur::channel_blur(source, self.kernel_size)),
        )]
    }

    fn labels(&self) -> &[Label] {
        &[Label::ChannelBlur]
    }

    fn name(&self) -> &str {
        "Channel Blur"
    }
}

/// Radial zoom blur by blending with an upscaled centre crop
pub struct ZoomBlurStep {
    pub factor: f32,
    /// Weight of the original image in the blend
    pub weight: f32,
}

impl FilterStep for ZoomBlurStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        vec![Variant::new(
            Label::ZoomBlur,
            DynamicImage::ImageRgb8(blur::zoom_blur(source, self.factor, self.weight)),
        )]
    }

    fn labels(&self) -> &[Label] {
        &[Label::ZoomBlur]
    }

    fn name(&self) -> &str {
        "Zoom Blur"
    }
}

/// Horizontal motion blur
pub struct DirectionalBlurStep {
    pub kernel_size: usize,
}

impl FilterStep for DirectionalBlurStep {
    fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        vec![Variant::new(
            Label::DirectionalBlur,
            DynamicImage::ImageRgb8(blur::directional_blur(source, self.kernel_size)),
        )]
    }

    fn labels(&self) -> &[Label] {
        &[Label::DirectionalBlur]
    }

    fn name(&self) -> &str {
        "Directional Blur"
    }
}
