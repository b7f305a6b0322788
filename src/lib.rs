//! Tilebatch: tile and ROI partitioning for large scientific images.
//!
//! Tilebatch decomposes very large 2-D images into a grid of (optionally
//! overlapping) tiles, discards tiles without enough content, subdivides the
//! survivors into fixed-size regions of interest with geometric metadata,
//! and packages the resulting files into bounded-size tar archives ("jobs")
//! for submission to a remote batch-compute pool, together with a manifest
//! of the produced archives.
//!
//! # Modules
//!
//! - [`grid`]: tile/ROI counts, spans, and the lazy tile sequence
//! - [`filter`]: content-based tile accept/reject
//! - [`roi`]: ROI records and partitioning
//! - [`codec`]: the image read/write seam (16-bit grayscale TIFF)
//! - [`writer`]: tile and ROI bundle persistence with skip-if-exists
//! - [`naming`]: filename conventions and base-name pairing
//! - [`batch`]: job archives and the manifest
//! - [`pipeline`]: per-image and per-directory orchestration
//! - [`error`]: error types for tilebatch operations

pub mod batch;
pub mod codec;
pub mod error;
pub mod filter;
pub mod grid;
pub mod naming;
pub mod pipeline;
pub mod roi;
pub mod writer;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::TilebatchError;

use pipeline::TilingConfig;

/// The tilebatch CLI application.
#[derive(Parser)]
#[command(name = "tilebatch")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Tile one image into tiles and ROI bundles.
    Tile(TileArgs),

    /// Package a directory of tile files into job archives.
    Batch(BatchArgs),

    /// Tile and package every image under a directory.
    Run(RunArgs),

    /// List files paired across two directories by shared base name.
    Pair(PairArgs),
}

/// Tunables shared by the tiling subcommands.
#[derive(clap::Args)]
struct TilingOptions {
    /// Tile edge length in pixels (tiles are square).
    #[arg(long, default_value_t = 512)]
    tile_size: usize,

    /// Stride between tile origins; defaults to the tile size (gapless).
    #[arg(long)]
    tile_separation: Option<usize>,

    /// ROI edge length in pixels within an accepted tile.
    #[arg(long, default_value_t = 64)]
    roi_size: usize,

    /// Brightness cutoff as a percentage of the image's global maximum.
    #[arg(long, default_value_t = 1.0)]
    intensity_threshold: f64,

    /// Minimum number of bright pixels for a tile to be kept.
    #[arg(long, default_value_t = 10)]
    count_threshold: usize,

    /// Maximum number of tile files per job archive.
    #[arg(long, default_value_t = 10)]
    batch_size: usize,

    /// Suffix embedded in every output filename.
    #[arg(long, default_value = "Tile")]
    suffix: String,

    /// Rebuild outputs even when they already exist.
    #[arg(long)]
    overwrite: bool,
}

impl TilingOptions {
    fn to_config(&self) -> TilingConfig {
        let separation = self.tile_separation.unwrap_or(self.tile_size);
        TilingConfig {
            tile_size: [self.tile_size; 2],
            tile_separation: [separation; 2],
            roi_size: [self.roi_size; 2],
            intensity_threshold: self.intensity_threshold,
            count_threshold: self.count_threshold,
            batch_size: self.batch_size,
            suffix: self.suffix.clone(),
            skip_existing: !self.overwrite,
        }
    }
}

/// Arguments for the tile subcommand.
#[derive(clap::Args)]
struct TileArgs {
    /// Input image to tile.
    input: PathBuf,

    /// Directory receiving tiles and ROI bundles.
    #[arg(short, long)]
    out_dir: PathBuf,

    #[command(flatten)]
    options: TilingOptions,
}

/// Arguments for the batch subcommand.
#[derive(clap::Args)]
struct BatchArgs {
    /// Source image path; used only for naming derivation.
    source: PathBuf,

    /// Directory containing the tile files to package.
    #[arg(short, long)]
    tile_dir: PathBuf,

    /// Directory receiving job archives and the manifest.
    #[arg(short, long)]
    out_dir: PathBuf,

    #[command(flatten)]
    options: TilingOptions,
}

/// Arguments for the run subcommand.
#[derive(clap::Args)]
struct RunArgs {
    /// Directory scanned recursively for .tif images.
    input_dir: PathBuf,

    /// Directory receiving per-image tile directories.
    #[arg(short, long)]
    out_dir: PathBuf,

    #[command(flatten)]
    options: TilingOptions,
}

/// Arguments for the pair subcommand.
#[derive(clap::Args)]
struct PairArgs {
    /// First directory; pairs follow its enumeration order.
    dir_a: PathBuf,

    /// Second directory, scanned for matching base names.
    dir_b: PathBuf,

    /// File extension to match (without the dot).
    #[arg(long, default_value = "tif")]
    extension: String,
}

/// Run the tilebatch CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), TilebatchError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Tile(args)) => run_tile(args),
        Some(Commands::Batch(args)) => run_batch(args),
        Some(Commands::Run(args)) => run_run(args),
        Some(Commands::Pair(args)) => run_pair(args),
        None => {
            println!("tilebatch {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Tile and ROI partitioning for large scientific images.");
            println!();
            println!("Run 'tilebatch --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the tile subcommand.
fn run_tile(args: TileArgs) -> Result<(), TilebatchError> {
    let cfg = args.options.to_config();
    let report = pipeline::process_image(&args.input, &args.out_dir, &cfg)?;

    println!(
        "{}: {} tiles generated, {} accepted, {} written, {} existing",
        args.input.display(),
        report.generated,
        report.accepted,
        report.written,
        report.skipped
    );
    Ok(())
}

/// Execute the batch subcommand.
fn run_batch(args: BatchArgs) -> Result<(), TilebatchError> {
    let cfg = args.options.to_config();
    let manifest = pipeline::package_image_jobs(&args.source, &args.tile_dir, &args.out_dir, &cfg)?;

    println!(
        "{} archive(s) recorded in {} ({} skipped, {} failed)",
        manifest.entries.len(),
        manifest.path.display(),
        manifest.skipped,
        manifest.failed
    );
    Ok(())
}

/// Execute the run subcommand.
fn run_run(args: RunArgs) -> Result<(), TilebatchError> {
    let cfg = args.options.to_config();
    let report = pipeline::process_directory(&args.input_dir, &args.out_dir, &cfg)?;

    println!(
        "{} image(s) processed, {} failed",
        report.processed.len(),
        report.failed.len()
    );
    Ok(())
}

/// Execute the pair subcommand.
fn run_pair(args: PairArgs) -> Result<(), TilebatchError> {
    let (paths_a, paths_b) = naming::find_shared(&args.dir_a, &args.dir_b, &args.extension)?;

    for (a, b) in paths_a.iter().zip(paths_b.iter()) {
        println!("{}\t{}", a.display(), b.display());
    }
    println!("{} pair(s)", paths_a.len());
    Ok(())
}
