pub mod blur;
pub mod color;
pub mod steps;

use crate::models::{Label, Variant};
use image::RgbImage;
use std::collections::HashSet;
use std::sync::Arc;

/// Trait that every filter of the bank implements
///
/// Filters are pure: the same source always yields the same variants.
pub trait FilterStep: Send + Sync {
    /// Render this step's variants from an unmodified source image
    fn apply(&self, source: &RgbImage) -> Vec<Variant>;

    /// Labels produced by `apply`, in output order
    fn labels(&self) -> &[Label];

    /// Human-readable name for this step (used in log output)
    fn name(&self) -> &str;
}

/// Ordered collection of filter steps
pub struct FilterBank {
    steps: Vec<Arc<dyn FilterStep>>,
}

impl FilterBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// The fourteen-output bank used for augmentation
    pub fn standard() -> Self {
        use steps::*;

        Self::new()
            .add_step(Arc::new(ChannelIsolationStep))
            .add_step(Arc::new(SubtractiveColorStep))
            .add_step(Arc::new(HsvStep))
            .add_step(Arc::new(GrayscaleStep))
            .add_step(Arc::new(ThresholdStep { threshold: 128 }))
            .add_step(Arc::new(GaussianBlurStep {
                label: Label::Blur,
                kernel_size: 7,
            }))
            .add_step(Arc::new(ChannelBlurStep { kernel_size: 15 }))
            .add_step(Arc::new(ZoomBlurStep {
                factor: 1.2,
                weight: 0.6,
            }))
            .add_step(Arc::new(DirectionalBlurStep { kernel_size: 15 }))
            .add_step(Arc::new(GaussianBlurStep {
                label: Label::DefocusBlur,
                kernel_size: 15,
            }))
    }

    /// Add a filter step to the bank
    pub fn add_step(mut self, step: Arc<dyn FilterStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn FilterStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn steps(&self) -> &[Arc<dyn FilterStep>] {
        &self.steps
    }

    /// All labels the bank produces, in output order
    pub fn labels(&self) -> Vec<Label> {
        self.steps
            .iter()
            .flat_map(|step| step.labels().iter().copied())
            .collect()
    }

    /// Whether the bank produces every label exactly once
    pub fn is_complete(&self) -> bool {
        let labels = self.labels();
        let unique: HashSet<Label> = labels.iter().copied().collect();
        labels.len() == Label::ALL.len() && unique.len() == Label::ALL.len()
    }

    /// Apply every step once to `source`
    pub fn apply(&self, source: &RgbImage) -> Vec<Variant> {
        let mut variants = Vec::with_capacity(Label::ALL.len());
        for step in &self.steps {
            log::trace!("Running filter step: {}", step.name());
            variants.extend(step.apply(source));
        }
        variants
    }
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::standard()
    }
}
