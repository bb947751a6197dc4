mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from imgaug for tests
#[allow(unused_imports)]
pub use imgaug::{
    ArchiveFormat, ArchiveSink, ArchiveWriter, AugmentationRun, Batch, FilterBank, Label,
    RunConfig, RunSummary, Variant, WriteReport, generate_rounds,
};
