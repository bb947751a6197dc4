//! Integration tests for the archive writer.
//!
//! Tests cover:
//! - Entry naming and count for zip and tar.zst archives
//! - Scratch files never outlive a write, even when inserts fail
//! - No archive is created when there is nothing to write
//! - A failed finalize leaves no partial archive behind

mod common;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

use common::*;

/// Sink that rejects entries containing `fail_on` and records every scratch path it saw
struct FlakySink {
    fail_on: &'static str,
    seen: Vec<(String, PathBuf, bool)>,
    accepted: Vec<String>,
}

impl FlakySink {
    fn new(fail_on: &'static str) -> Self {
        Self {
            fail_on,
            seen: Vec::new(),
            accepted: Vec::new(),
        }
    }
}

impl ArchiveSink for FlakySink {
    fn insert(&mut self, entry_name: &str, source: &Path) -> Result<()> {
        self.seen
            .push((entry_name.to_string(), source.to_path_buf(), source.is_file()));
        if entry_name.contains(self.fail_on) {
            anyhow::bail!("simulated insert failure for {}", entry_name);
        }
        self.accepted.push(entry_name.to_string());
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        Ok(PathBuf::from("flaky"))
    }
}

fn batches(rounds: u32) -> Vec<Batch> {
    let bank = FilterBank::standard();
    let img = gradient_image(32, 24);
    generate_rounds(&bank, &img, rounds, StdRng::seed_from_u64(5)).collect()
}

#[test]
fn test_zip_archive_holds_every_variant() -> Result<()> {
    let out = tempfile::TempDir::new()?;
    let writer = ArchiveWriter::new("sample", out.path());

    let outcome = writer
        .write_archive(ArchiveFormat::Zip, batches(2))?
        .expect("archive should be created");

    assert_eq!(outcome.path, out.path().join("sample.zip"));
    assert_eq!(outcome.report, WriteReport { written: 28, failed: 0 });
    assert_eq!(zip_entry_names(&outcome.path)?, expected_entries("sample", 2));

    // Only the archive is left behind
    assert_eq!(dir_entries(out.path()), vec!["sample.zip".to_string()]);
    Ok(())
}

#[test]
fn test_tar_zst_archive_holds_every_variant() -> Result<()> {
    let out = tempfile::TempDir::new()?;
    let writer = ArchiveWriter::new("sample", out.path());

    let outcome = writer
        .write_archive(ArchiveFormat::TarZst, batches(1))?
        .expect("archive should be created");

    assert_eq!(outcome.path, out.path().join("sample.tar.zst"));
    assert_eq!(outcome.report.written, 14);
    assert_eq!(tar_zst_entry_names(&outcome.path)?, expected_entries("sample", 1));
    assert_eq!(dir_entries(out.path()), vec!["sample.tar.zst".to_string()]);
    Ok(())
}

#[test]
fn test_failed_insert_still_removes_scratch_file() -> Result<()> {
    let out = tempfile::TempDir::new()?;
    let writer = ArchiveWriter::new("sample", out.path());
    let mut sink = FlakySink::new("_hsv_");

    let report = writer.write_batches(batches(2), &mut sink)?;

    // One failing label per round, the rest keep going
    assert_eq!(report, WriteReport { written: 26, failed: 2 });
    assert_eq!(sink.seen.len(), 28);
    assert!(!sink.accepted.iter().any(|n| n.contains("_hsv_")));

    for (name, path, existed) in &sink.seen {
        assert!(existed, "scratch file for {} was not materialized", name);
        assert!(!path.exists(), "scratch file for {} left behind", name);
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(name.as_str()));
    }
    assert!(dir_entries(out.path()).is_empty());
    Ok(())
}

#[test]
fn test_all_inserts_failing_is_not_fatal() -> Result<()> {
    let out = tempfile::TempDir::new()?;
    let writer = ArchiveWriter::new("sample", out.path());
    let mut sink = FlakySink::new("sample");

    let report = writer.write_batches(batches(1), &mut sink)?;

    assert_eq!(report, WriteReport { written: 0, failed: 14 });
    assert!(sink.seen.iter().all(|(_, path, _)| !path.exists()));
    assert!(dir_entries(out.path()).is_empty());
    Ok(())
}

#[test]
fn test_no_batches_creates_no_archive() -> Result<()> {
    let out = tempfile::TempDir::new()?;
    let writer = ArchiveWriter::new("sample", out.path());

    let outcome = writer.write_archive(ArchiveFormat::Zip, batches(0))?;

    assert!(outcome.is_none());
    assert!(dir_entries(out.path()).is_empty());
    Ok(())
}

#[test]
fn test_missing_output_directory_fails_the_image() -> Result<()> {
    let out = tempfile::TempDir::new()?;
    let missing = out.path().join("does-not-exist");
    let writer = ArchiveWriter::new("sample", &missing);

    let result = writer.write_archive(ArchiveFormat::Zip, batches(1));

    assert!(result.is_err());
    assert!(!missing.exists());
    Ok(())
}

#[test]
fn test_jpeg_quality_is_applied() -> Result<()> {
    let low_dir = tempfile::TempDir::new()?;
    let high_dir = tempfile::TempDir::new()?;

    let low = ArchiveWriter::new("q", low_dir.path())
        .with_quality(10)
        .write_archive(ArchiveFormat::Zip, batches(1))?
        .expect("archive should be created");
    let high = ArchiveWriter::new("q", high_dir.path())
        .with_quality(100)
        .write_archive(ArchiveFormat::Zip, batches(1))?
        .expect("archive should be created");

    let low_size = std::fs::metadata(&low.path)?.len();
    let high_size = std::fs::metadata(&high.path)?.len();
    assert!(low_size < high_size, "{} >= {}", low_size, high_size);
    Ok(())
}

/// Sink that leaves bytes on disk and then fails to finalize
struct BrokenFinishSink {
    path: PathBuf,
}

impl ArchiveSink for BrokenFinishSink {
    fn insert(&mut self, _entry_name: &str, _source: &Path) -> Result<()> {
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        std::fs::write(&self.path, b"truncated")?;
        anyhow::bail!("simulated finalize failure for {:?}", self.path)
    }
}

#[test]
fn test_failed_finalize_removes_partial_archive() -> Result<()> {
    let out = tempfile::TempDir::new()?;
    let writer = ArchiveWriter::new("sample", out.path());
    let path = out.path().join("sample.zip");
    let sink = Box::new(BrokenFinishSink { path: path.clone() });

    let result = writer.write_into(&path, sink, batches(1));

    assert!(result.is_err());
    assert!(!path.exists(), "partial archive left behind");
    assert!(dir_entries(out.path()).is_empty());
    Ok(())
}
