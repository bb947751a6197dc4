//! Per-image archive packing.
//!
//! Every variant is first encoded as a JPEG scratch file inside a staging
//! directory in the output directory, then inserted into the image's archive
//! under the same name. Scratch files are removed by a drop guard, so they go
//! away on every exit path, including a failed insert.

use anyhow::{Context, Result};
use clap::ValueEnum;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tar::Builder;
use tempdir::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use zstd::stream::write::Encoder as ZstdEncoder;

use crate::models::Batch;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

const ZSTD_LEVEL: i32 = 3;

/// Container format of the per-image archive
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum ArchiveFormat {
    /// `{name}.zip`, deflate-compressed entries
    #[default]
    Zip,
    /// `{name}.tar.zst`
    TarZst,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarZst => "tar.zst",
        }
    }

    /// Where the archive for `base_name` lands
    pub fn archive_path(&self, output_dir: &Path, base_name: &str) -> PathBuf {
        output_dir.join(format!("{}.{}", base_name, self.extension()))
    }

    /// Create an empty archive for `base_name` in `output_dir`
    pub fn create(&self, output_dir: &Path, base_name: &str) -> Result<Box<dyn ArchiveSink>> {
        let path = self.archive_path(output_dir, base_name);
        Ok(match self {
            ArchiveFormat::Zip => Box::new(ZipSink::create(path)?),
            ArchiveFormat::TarZst => Box::new(TarZstSink::create(path)?),
        })
    }
}

/// Destination of archived variants
pub trait ArchiveSink {
    /// Copy the file at `source` into the archive as `entry_name`
    fn insert(&mut self, entry_name: &str, source: &Path) -> Result<()>;

    /// Flush and close the archive, returning its path
    fn finish(self: Box<Self>) -> Result<PathBuf>;
}

pub struct ZipSink {
    path: PathBuf,
    writer: ZipWriter<BufWriter<File>>,
}

impl ZipSink {
    pub fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create archive {:?}", path))?;
        Ok(Self {
            path,
            writer: ZipWriter::new(BufWriter::new(file)),
        })
    }
}

impl ArchiveSink for ZipSink {
    fn insert(&mut self, entry_name: &str, source: &Path) -> Result<()> {
        // Read up front so a bad source never leaves a half-written entry
        let data = fs::read(source)
            .with_context(|| format!("Failed to read scratch file {:?}", source))?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(entry_name, options)
            .with_context(|| format!("Failed to start entry {} in {:?}", entry_name, self.path))?;
        self.writer
            .write_all(&data)
            .with_context(|| format!("Failed to write entry {} in {:?}", entry_name, self.path))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        let ZipSink { path, writer } = *self;
        let mut out = writer
            .finish()
            .with_context(|| format!("Failed to finalize zip {:?}", path))?;
        out.flush()
            .with_context(|| format!("Failed to flush zip {:?}", path))?;
        Ok(path)
    }
}

pub struct TarZstSink {
    path: PathBuf,
    builder: Builder<ZstdEncoder<'static, BufWriter<File>>>,
}

impl TarZstSink {
    pub fn create(path: PathBuf) -> Result<Self> {
        let out = File::create(&path)
            .with_context(|| format!("Failed to create archive {:?}", path))?;

        // zstd encoder wrapping the output file
        let encoder = ZstdEncoder::new(BufWriter::new(out), ZSTD_LEVEL)
            .with_context(|| format!("Failed to create zstd encoder for {:?}", path))?;

        Ok(Self {
            path,
            builder: Builder::new(encoder),
        })
    }
}

impl ArchiveSink for TarZstSink {
    fn insert(&mut self, entry_name: &str, source: &Path) -> Result<()> {
        self.builder
            .append_path_with_name(source, entry_name)
            .with_context(|| format!("Failed to add {} to {:?}", entry_name, self.path))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        let TarZstSink { path, builder } = *self;

        // Finish tar, then finish zstd stream
        let encoder = builder
            .into_inner()
            .with_context(|| format!("Failed to finalize tar for {:?}", path))?;
        let mut out = encoder
            .finish()
            .with_context(|| format!("Failed to finalize zstd stream for {:?}", path))?;
        out.flush()
            .with_context(|| format!("Failed to flush {:?}", path))?;
        Ok(path)
    }
}

/// Encode an image as JPEG at `path`
pub fn encode_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create scratch file {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    image
        .write_with_encoder(encoder)
        .with_context(|| format!("Failed to encode JPEG {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush scratch file {:?}", path))?;
    Ok(())
}

/// A scratch file that is deleted when the guard goes out of scope
struct ScratchArtifact {
    path: PathBuf,
}

impl ScratchArtifact {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchArtifact {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed scratch file {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {:?}: {}", self.path, e),
        }
    }
}

/// Per-image result of writing batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    pub failed: usize,
}

/// A finalized archive and what went into it
#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    pub path: PathBuf,
    pub report: WriteReport,
}

/// Writes the batches of one source image into that image's archive
pub struct ArchiveWriter<'a> {
    base_name: &'a str,
    output_dir: &'a Path,
    jpeg_quality: u8,
}

impl<'a> ArchiveWriter<'a> {
    pub fn new(base_name: &'a str, output_dir: &'a Path) -> Self {
        Self {
            base_name,
            output_dir,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Archive every variant of every batch into `sink`
    ///
    /// A failing variant is counted and skipped; only failure to set up the
    /// staging directory aborts the image.
    pub fn write_batches<I>(&self, batches: I, sink: &mut dyn ArchiveSink) -> Result<WriteReport>
    where
        I: IntoIterator<Item = Batch>,
    {
        let staging = TempDir::new_in(self.output_dir, &format!(".{}_staging", self.base_name))
            .with_context(|| format!("Failed to create staging directory in {:?}", self.output_dir))?;

        let mut report = WriteReport::default();
        for batch in batches {
            for variant in &batch.variants {
                let entry_name = batch.entry_name(self.base_name, variant.label);
                match self.write_variant(staging.path(), &entry_name, &variant.image, sink) {
                    Ok(()) => {
                        debug!("Archived {}", entry_name);
                        report.written += 1;
                    }
                    Err(e) => {
                        warn!("Failed to archive {}: {:#}", entry_name, e);
                        report.failed += 1;
                    }
                }
            }
        }

        if let Err(e) = staging.close() {
            warn!("Failed to remove staging directory: {}", e);
        }
        Ok(report)
    }

    fn write_variant(
        &self,
        staging_dir: &Path,
        entry_name: &str,
        image: &DynamicImage,
        sink: &mut dyn ArchiveSink,
    ) -> Result<()> {
        // Guard first, so a half-encoded file is removed as well
        let artifact = ScratchArtifact::new(staging_dir.join(entry_name));
        encode_jpeg(image, artifact.path(), self.jpeg_quality)?;
        sink.insert(entry_name, artifact.path())?;
        Ok(())
    }

    /// Create the archive, fill it and finalize it
    ///
    /// Returns `None` without touching the filesystem when there are no batches.
    pub fn write_archive<I>(&self, format: ArchiveFormat, batches: I) -> Result<Option<ArchiveOutcome>>
    where
        I: IntoIterator<Item = Batch>,
    {
        let mut batches = batches.into_iter().peekable();
        if batches.peek().is_none() {
            return Ok(None);
        }

        let path = format.archive_path(self.output_dir, self.base_name);
        let sink = format.create(self.output_dir, self.base_name)?;
        self.write_into(&path, sink, batches).map(Some)
    }

    /// Fill an already created archive at `path` and finalize it
    ///
    /// The archive file is removed when the batches cannot be written or the
    /// archive cannot be finalized.
    pub fn write_into<I>(
        &self,
        path: &Path,
        mut sink: Box<dyn ArchiveSink>,
        batches: I,
    ) -> Result<ArchiveOutcome>
    where
        I: IntoIterator<Item = Batch>,
    {
        let report = match self.write_batches(batches, sink.as_mut()) {
            Ok(report) => report,
            Err(e) => {
                drop(sink);
                discard_partial_archive(path);
                return Err(e);
            }
        };
        match sink.finish() {
            Ok(path) => Ok(ArchiveOutcome { path, report }),
            Err(e) => {
                discard_partial_archive(path);
                Err(e)
            }
        }
    }
}

fn discard_partial_archive(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed partial archive {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial archive {:?}: {}", path, e),
    }
}
