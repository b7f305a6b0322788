//! Persisting tiles and ROI bundles with the skip-if-exists policy.
//!
//! Writers are the pipeline's unit of resumable progress: each output file
//! is individually check-then-skip, so re-running tiling over a partially
//! processed directory neither redoes completed work nor duplicates output.
//! Existence is checked explicitly and reported through [`WriteOutcome`]
//! rather than surfacing as an error.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::ArrayView2;

use crate::codec;
use crate::error::TilebatchError;
use crate::grid::GridCoord;
use crate::naming::{self, ROI_BUNDLE_EXT, ROI_MANAGEMENT_DIR};
use crate::roi::RoiBundle;

/// Extension of tile pixel files.
pub const TILE_EXT: &str = "tif";

/// What a write call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was written (fresh or deterministic overwrite).
    Created,
    /// The file already existed and `skip_existing` left it untouched.
    Existing,
}

/// Writes a tile's pixel block to
/// `{out_dir}/{base}_{suffix}_{i}x-{j}y.tif`.
///
/// Creates `out_dir` as needed. When `skip_existing` is set and the target
/// already exists, nothing is written and the existing path is returned with
/// [`WriteOutcome::Existing`]; otherwise the file is (over)written
/// deterministically.
pub fn write_tile(
    pixels: ArrayView2<'_, u16>,
    source: &Path,
    out_dir: &Path,
    suffix: &str,
    coord: GridCoord,
    skip_existing: bool,
) -> Result<(PathBuf, WriteOutcome), TilebatchError> {
    fs::create_dir_all(out_dir)?;
    let path = naming::output_path(source, out_dir, &naming::tile_suffix(suffix, coord), TILE_EXT)?;

    if skip_existing && path.exists() {
        debug!("tile {} already exists; skipping", path.display());
        return Ok((path, WriteOutcome::Existing));
    }

    codec::write_image(&path, pixels)?;
    Ok((path, WriteOutcome::Created))
}

/// Writes a tile's ROI bundle to
/// `{out_dir}/ROI_management/{base}_{suffix}_{i}x-{j}y_ROIs.json`.
///
/// Same directory-creation and skip semantics as [`write_tile`].
pub fn write_roi_bundle(
    bundle: &RoiBundle,
    source: &Path,
    out_dir: &Path,
    suffix: &str,
    coord: GridCoord,
    skip_existing: bool,
) -> Result<(PathBuf, WriteOutcome), TilebatchError> {
    let roi_dir = out_dir.join(ROI_MANAGEMENT_DIR);
    fs::create_dir_all(&roi_dir)?;
    let path = naming::output_path(
        source,
        &roi_dir,
        &naming::roi_suffix(suffix, coord),
        ROI_BUNDLE_EXT,
    )?;

    if skip_existing && path.exists() {
        debug!("ROI bundle {} already exists; skipping", path.display());
        return Ok((path, WriteOutcome::Existing));
    }

    let file = File::create(&path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, bundle).map_err(|source| {
        TilebatchError::RoiBundleWrite {
            path: path.clone(),
            source,
        }
    })?;

    Ok((path, WriteOutcome::Created))
}

/// Reads an ROI bundle back from disk.
pub fn read_roi_bundle(path: &Path) -> Result<RoiBundle, TilebatchError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| TilebatchError::RoiBundleParse {
        path: path.to_path_buf(),
        source,
    })
}
