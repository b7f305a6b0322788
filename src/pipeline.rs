//! End-to-end orchestration: image → tiles + ROI bundles → job archives.
//!
//! This module wires the leaf components together the way an operator uses
//! them: one image is tiled, filtered, and written synchronously (one tile
//! materialized at a time), and a directory sweep applies the same pass to
//! every image it finds, followed by job packaging per image. Images are
//! independent; one image's failure is logged and never aborts the sweep.

use std::path::{Path, PathBuf};

use log::{error, info};

use crate::batch::{self, JobManifest};
use crate::codec;
use crate::error::TilebatchError;
use crate::filter::passes_threshold;
use crate::grid::tiles;
use crate::naming;
use crate::roi::{partition_rois, RoiBundle, TimeStamp};
use crate::writer::{self, WriteOutcome, TILE_EXT};

/// Sub-directory of each image's tile directory holding its job archives.
pub const BATCH_DIR: &str = "Batches";

/// Tunables for the tiling/batching pipeline. Every field has a default.
#[derive(Clone, Debug)]
pub struct TilingConfig {
    /// Nominal tile extent (rows, columns).
    pub tile_size: [usize; 2],

    /// Stride between consecutive tile origins.
    pub tile_separation: [usize; 2],

    /// ROI extent within an accepted tile; also the ROI stride.
    pub roi_size: [usize; 2],

    /// Brightness cutoff as a percentage of the image's global maximum.
    pub intensity_threshold: f64,

    /// Minimum number of bright pixels for a tile to be accepted.
    pub count_threshold: usize,

    /// Maximum number of tile files per job archive.
    pub batch_size: usize,

    /// Output suffix embedded in every artifact name.
    pub suffix: String,

    /// Leave existing outputs untouched (the resumability policy).
    pub skip_existing: bool,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_size: [512, 512],
            tile_separation: [512, 512],
            roi_size: [64, 64],
            intensity_threshold: 1.0,
            count_threshold: 10,
            batch_size: 10,
            suffix: "Tile".to_string(),
            skip_existing: true,
        }
    }
}

impl TilingConfig {
    /// Sets the tile size.
    pub fn with_tile_size(mut self, size: [usize; 2]) -> Self {
        self.tile_size = size;
        self
    }

    /// Sets the tile separation.
    pub fn with_tile_separation(mut self, separation: [usize; 2]) -> Self {
        self.tile_separation = separation;
        self
    }

    /// Sets the ROI size.
    pub fn with_roi_size(mut self, size: [usize; 2]) -> Self {
        self.roi_size = size;
        self
    }

    /// Sets the output suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets the skip-existing policy.
    pub fn with_skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }
}

/// Per-image counts from a tiling pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileReport {
    /// Tiles produced by the sequence.
    pub generated: usize,

    /// Tiles that passed the content filter.
    pub accepted: usize,

    /// Tile files freshly written.
    pub written: usize,

    /// Tile files left untouched because they already existed.
    pub skipped: usize,
}

/// Tiles one image: every accepted tile is written to `out_dir` together
/// with its ROI bundle under `out_dir/ROI_management/`.
///
/// Tiles are generated, filtered, and persisted strictly one at a time.
pub fn process_image(
    image_path: &Path,
    out_dir: &Path,
    cfg: &TilingConfig,
) -> Result<TileReport, TilebatchError> {
    let image = codec::read_image(image_path)?;
    let reference_max = codec::max_intensity(image.view());

    let mut report = TileReport::default();

    for tile in tiles(image.view(), cfg.tile_size, cfg.tile_separation)? {
        report.generated += 1;

        if !passes_threshold(
            tile.pixels.view(),
            cfg.intensity_threshold,
            cfg.count_threshold,
            reference_max,
        ) {
            continue;
        }
        report.accepted += 1;

        let stamp = TimeStamp::now();
        let (rows, cols) = tile.pixels.dim();
        let bundle = RoiBundle {
            separate_rois: partition_rois([rows, cols], cfg.roi_size, &stamp)?,
        };

        writer::write_roi_bundle(
            &bundle,
            image_path,
            out_dir,
            &cfg.suffix,
            tile.span.coord,
            cfg.skip_existing,
        )?;
        let (_, outcome) = writer::write_tile(
            tile.pixels.view(),
            image_path,
            out_dir,
            &cfg.suffix,
            tile.span.coord,
            cfg.skip_existing,
        )?;

        match outcome {
            WriteOutcome::Created => report.written += 1,
            WriteOutcome::Existing => report.skipped += 1,
        }
    }

    Ok(report)
}

/// Packages the tiles of one image into job archives.
///
/// Thin wrapper over [`batch::package_jobs`] using the config's batch size
/// and skip policy.
pub fn package_image_jobs(
    image_path: &Path,
    tile_dir: &Path,
    out_dir: &Path,
    cfg: &TilingConfig,
) -> Result<JobManifest, TilebatchError> {
    batch::package_jobs(
        image_path,
        tile_dir,
        out_dir,
        &cfg.suffix,
        cfg.batch_size,
        cfg.skip_existing,
    )
}

/// Summary of a directory sweep.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Images tiled and packaged successfully.
    pub processed: Vec<PathBuf>,

    /// Images whose processing failed and was isolated.
    pub failed: Vec<PathBuf>,
}

/// Tiles and packages every `.tif` image found under `input_dir`.
///
/// Each image gets its own tile directory `{out_dir}/{base_name}` and a
/// `Batches/` sub-directory with its job archives and manifest. A failing
/// image is logged at `error` and skipped; the sweep continues.
pub fn process_directory(
    input_dir: &Path,
    out_dir: &Path,
    cfg: &TilingConfig,
) -> Result<RunReport, TilebatchError> {
    let image_paths = naming::list_filetype_in_subdirs(input_dir, TILE_EXT)?;

    let mut report = RunReport::default();

    for path in image_paths {
        info!("tiling {}", path.display());

        match process_one(&path, out_dir, cfg) {
            Ok(()) => report.processed.push(path),
            Err(err) => {
                error!("skipping {}: {err}", path.display());
                report.failed.push(path);
            }
        }
    }

    Ok(report)
}

fn process_one(path: &Path, out_dir: &Path, cfg: &TilingConfig) -> Result<(), TilebatchError> {
    let tile_dir = out_dir.join(naming::base_name(path)?);

    let tile_report = process_image(path, &tile_dir, cfg)?;
    info!(
        "{}: {} tiles generated, {} accepted, {} written, {} existing",
        path.display(),
        tile_report.generated,
        tile_report.accepted,
        tile_report.written,
        tile_report.skipped
    );

    let batch_dir = tile_dir.join(BATCH_DIR);
    let manifest = package_image_jobs(path, &tile_dir, &batch_dir, cfg)?;
    info!(
        "{}: {} job archive(s) recorded in {}",
        path.display(),
        manifest.entries.len(),
        manifest.path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_configuration() {
        let cfg = TilingConfig::default();
        assert_eq!(cfg.tile_size, [512, 512]);
        assert_eq!(cfg.tile_separation, [512, 512]);
        assert_eq!(cfg.roi_size, [64, 64]);
        assert_eq!(cfg.intensity_threshold, 1.0);
        assert_eq!(cfg.count_threshold, 10);
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.suffix, "Tile");
        assert!(cfg.skip_existing);
    }

    #[test]
    fn builder_setters_override_defaults() {
        let cfg = TilingConfig::default()
            .with_tile_size([128, 128])
            .with_roi_size([32, 32])
            .with_suffix("Fast")
            .with_skip_existing(false);

        assert_eq!(cfg.tile_size, [128, 128]);
        assert_eq!(cfg.roi_size, [32, 32]);
        assert_eq!(cfg.suffix, "Fast");
        assert!(!cfg.skip_existing);
    }
}
