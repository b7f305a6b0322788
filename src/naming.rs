//! Filename conventions, directory listing, and base-name pairing.
//!
//! Every artifact the pipeline writes is named from the source image's
//! *base name* (the part of the stem before the first underscore) plus an
//! output suffix and, for per-tile artifacts, the tile's grid coordinate.
//! The base name is also the join key when pairing companion files across
//! directories (e.g. a fixed/moving image pair, or a tile and its ROI
//! bundle).

use std::path::{Path, PathBuf};

use log::info;
use walkdir::WalkDir;

use crate::error::TilebatchError;
use crate::grid::GridCoord;

/// Sub-directory holding ROI metadata bundles, both on disk and inside job
/// archives.
pub const ROI_MANAGEMENT_DIR: &str = "ROI_management";

/// Suffix appended to a tile's stem to name its ROI bundle.
pub const ROI_BUNDLE_SUFFIX: &str = "_ROIs";

/// Extension of ROI metadata bundles.
pub const ROI_BUNDLE_EXT: &str = "json";

/// Extracts the base name of a file: the stem up to the first underscore,
/// or the whole stem when there is none.
///
/// # Errors
/// Returns [`TilebatchError::NonUtf8Path`] if the filename is not valid
/// UTF-8.
pub fn base_name(path: &Path) -> Result<&str, TilebatchError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| TilebatchError::NonUtf8Path(path.to_path_buf()))?;

    Ok(stem.split('_').next().unwrap_or(stem))
}

/// Builds an output path `{output_dir}/{base}_{suffix}.{ext}` from a source
/// image path.
pub fn output_path(
    source: &Path,
    output_dir: &Path,
    suffix: &str,
    ext: &str,
) -> Result<PathBuf, TilebatchError> {
    let base = base_name(source)?;
    Ok(output_dir.join(format!("{base}_{suffix}.{ext}")))
}

/// Per-tile suffix: `{suffix}_{i}x-{j}y`.
pub fn tile_suffix(suffix: &str, coord: GridCoord) -> String {
    format!("{suffix}_{coord}")
}

/// Per-tile ROI bundle suffix: `{suffix}_{i}x-{j}y_ROIs`.
pub fn roi_suffix(suffix: &str, coord: GridCoord) -> String {
    format!("{suffix}_{coord}{ROI_BUNDLE_SUFFIX}")
}

/// Locates the ROI bundle companion of a tile file by naming convention:
/// `{tile_dir}/ROI_management/{tile_stem}_ROIs.json`.
pub fn roi_bundle_for_tile(tile_path: &Path) -> Result<PathBuf, TilebatchError> {
    let stem = tile_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| TilebatchError::NonUtf8Path(tile_path.to_path_buf()))?;
    let dir = tile_path.parent().unwrap_or_else(|| Path::new(""));

    Ok(dir
        .join(ROI_MANAGEMENT_DIR)
        .join(format!("{stem}{ROI_BUNDLE_SUFFIX}.{ROI_BUNDLE_EXT}")))
}

/// Lists files with the given extension directly inside `dir`, sorted by
/// filename for deterministic enumeration order.
pub fn list_filetype(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, TilebatchError> {
    collect_with_extension(dir, ext, 1)
}

/// Lists files with the given extension anywhere under `root`, sorted by
/// path.
pub fn list_filetype_in_subdirs(root: &Path, ext: &str) -> Result<Vec<PathBuf>, TilebatchError> {
    collect_with_extension(root, ext, usize::MAX)
}

fn collect_with_extension(
    dir: &Path,
    ext: &str,
    max_depth: usize,
) -> Result<Vec<PathBuf>, TilebatchError> {
    if !dir.is_dir() {
        return Err(TilebatchError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(max_depth) {
        let entry = entry.map_err(|e| TilebatchError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Pairs files across two directories by shared base name.
///
/// For every `ext` file in `dir_a` (in sorted enumeration order), scans
/// `dir_b` for a file with an identical base name. Returns two index-aligned
/// path lists: `paths_a[k]` and `paths_b[k]` share a base name.
///
/// Policy for irregular matches: the first match in `dir_b` wins when a base
/// name is ambiguous, and names with no match are dropped with an `info` log
/// line. Neither case is an error.
pub fn find_shared(
    dir_a: &Path,
    dir_b: &Path,
    ext: &str,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>), TilebatchError> {
    let files_a = list_filetype(dir_a, ext)?;
    let files_b = list_filetype(dir_b, ext)?;

    let mut paths_a = Vec::new();
    let mut paths_b = Vec::new();

    for file_a in files_a {
        let base_a = base_name(&file_a)?.to_string();

        let matched = files_b
            .iter()
            .find(|file_b| base_name(file_b).map(|b| b == base_a).unwrap_or(false));

        match matched {
            Some(file_b) => {
                paths_a.push(file_a);
                paths_b.push(file_b.clone());
            }
            None => {
                info!(
                    "no companion for base name '{}' in {}; skipping {}",
                    base_a,
                    dir_b.display(),
                    file_a.display()
                );
            }
        }
    }

    Ok((paths_a, paths_b))
}
