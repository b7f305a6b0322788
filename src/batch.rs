//! Grouping tile files into bounded-size job archives.
//!
//! A flat list of tile files is split into consecutive sublists of at most
//! `batch_size` elements; each sublist becomes one tar archive holding the
//! tile files at their own names plus their companion ROI bundles under a
//! `ROI_management/` sub-path, ready for submission to a remote batch pool.
//! Every archive attempt is recorded as one line in a manifest file, the
//! sole persisted record of which archives exist for an image.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{error, info};
use tar::{Builder, EntryType, Header};

use crate::error::TilebatchError;
use crate::naming::{self, ROI_MANAGEMENT_DIR};

/// Extension of job archives.
pub const JOB_EXT: &str = "tar";

/// Splits `items` into consecutive sublists of at most `batch_size`
/// elements; the final sublist may be shorter. Concatenating the result in
/// order reproduces the input.
///
/// A `batch_size` of 0 is treated as 1.
pub fn split_into_batches<T: Clone>(items: &[T], batch_size: usize) -> Vec<Vec<T>> {
    items
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Builds one job archive at `job_path` from `tiles`.
///
/// The archive contains a `ROI_management/` directory entry, each tile file
/// at its own name, and each tile's ROI bundle (located by naming
/// convention) under `ROI_management/`. The referenced files are read, never
/// mutated.
///
/// # Errors
/// Returns [`TilebatchError::MissingRoiArtifact`] if a tile's bundle does
/// not exist. On any failure the partially written archive is removed
/// best-effort before the error is returned.
pub fn build_job_archive(tiles: &[PathBuf], job_path: &Path) -> Result<(), TilebatchError> {
    let result = build_job_archive_inner(tiles, job_path);
    if result.is_err() {
        let _ = fs::remove_file(job_path);
    }
    result
}

fn build_job_archive_inner(tiles: &[PathBuf], job_path: &Path) -> Result<(), TilebatchError> {
    let file = File::create(job_path)?;
    let mut builder = Builder::new(file);

    let mut roi_dir = Header::new_gnu();
    roi_dir.set_entry_type(EntryType::Directory);
    roi_dir.set_mode(0o777);
    roi_dir.set_size(0);
    builder.append_data(&mut roi_dir, ROI_MANAGEMENT_DIR, std::io::empty())?;

    for tile in tiles {
        let tile_name = tile
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TilebatchError::NonUtf8Path(tile.clone()))?;

        let bundle = naming::roi_bundle_for_tile(tile)?;
        if !bundle.exists() {
            return Err(TilebatchError::MissingRoiArtifact {
                tile: tile.clone(),
                expected: bundle,
            });
        }
        let bundle_name = bundle
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TilebatchError::NonUtf8Path(bundle.clone()))?
            .to_string();

        builder.append_path_with_name(tile, tile_name)?;
        builder.append_path_with_name(&bundle, format!("{ROI_MANAGEMENT_DIR}/{bundle_name}"))?;
    }

    builder.finish()?;
    Ok(())
}

/// The manifest produced by one packaging run.
#[derive(Clone, Debug)]
pub struct JobManifest {
    /// Path of the manifest file on disk.
    pub path: PathBuf,

    /// Archive filenames recorded, in attempt order.
    pub entries: Vec<String>,

    /// Number of archives skipped because they already existed.
    pub skipped: usize,

    /// Number of archive builds that failed and were isolated.
    pub failed: usize,
}

/// Packages every tile file in `tile_dir` into job archives under
/// `out_dir`, recording each attempt in a manifest file.
///
/// Archives are named `{base}_{suffix}_Job-{n}.tar` with `n` a 1-based
/// counter that advances over skipped archives, so job numbers stay stable
/// across resumed runs even when that leaves gaps. When `skip_existing` is
/// set, an archive whose target path exists is not rebuilt. The manifest
/// (`{base}_{suffix}_JobList.txt`) is opened once, truncated, and receives
/// one flushed line per attempt, skipped or built.
///
/// A failed archive build is logged and isolated; the run continues with
/// the next batch and the failure is tallied in [`JobManifest::failed`].
pub fn package_jobs(
    source: &Path,
    tile_dir: &Path,
    out_dir: &Path,
    suffix: &str,
    batch_size: usize,
    skip_existing: bool,
) -> Result<JobManifest, TilebatchError> {
    let tile_list = naming::list_filetype(tile_dir, crate::writer::TILE_EXT)?;
    let batches = split_into_batches(&tile_list, batch_size);

    fs::create_dir_all(out_dir)?;
    let manifest_path =
        naming::output_path(source, out_dir, &format!("{suffix}_JobList"), "txt")?;
    let mut manifest_file = File::create(&manifest_path)?;

    let mut manifest = JobManifest {
        path: manifest_path,
        entries: Vec::new(),
        skipped: 0,
        failed: 0,
    };

    for (index, batch) in batches.iter().enumerate() {
        let job_number = index + 1;
        let job_suffix = format!("{suffix}_Job-{job_number}");
        let job_path = naming::output_path(source, out_dir, &job_suffix, JOB_EXT)?;
        let job_name = job_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TilebatchError::NonUtf8Path(job_path.clone()))?
            .to_string();

        if skip_existing && job_path.exists() {
            info!("job archive {job_name} already exists; skipping");
            manifest.skipped += 1;
        } else if let Err(err) = build_job_archive(batch, &job_path) {
            error!("failed to build job archive {job_name}: {err}");
            manifest.failed += 1;
            continue;
        }

        writeln!(manifest_file, "{job_name}")?;
        manifest_file.flush()?;
        manifest.entries.push(job_name);
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_partition_without_reordering() {
        let items: Vec<u32> = (0..25).collect();
        let batches = split_into_batches(&items, 10);

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 10);
        assert_eq!(batches[1].len(), 10);
        assert_eq!(batches[2].len(), 5);

        let rejoined: Vec<u32> = batches.into_iter().flatten().collect();
        assert_eq!(rejoined, items);
    }

    #[test]
    fn evenly_divisible_list_has_no_short_tail() {
        let items: Vec<u32> = (0..20).collect();
        let batches = split_into_batches(&items, 5);
        assert_eq!(batches.len(), 4);
        assert!(batches.iter().all(|b| b.len() == 5));
    }

    #[test]
    fn empty_list_yields_no_batches() {
        let batches = split_into_batches::<u32>(&[], 10);
        assert!(batches.is_empty());
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let batches = split_into_batches(&[1, 2, 3], 0);
        assert_eq!(batches.len(), 3);
    }
}
