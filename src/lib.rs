pub mod archive;
pub mod augment;
pub mod config;
pub mod filters;
pub mod models;
pub mod pipeline;

pub use archive::{ArchiveFormat, ArchiveSink, ArchiveWriter, WriteReport};
pub use augment::{Rounds, generate_rounds};
pub use config::{Cli, RunConfig};
pub use filters::{FilterBank, FilterStep};
pub use models::{Batch, Label, RunSummary, Variant};
pub use pipeline::{AugmentationRun, expand_inputs, load_source};
