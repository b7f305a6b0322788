mod common;

use assert_cmd::Command;
use tempfile::tempdir;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.arg("-V");
    cmd.assert()
        .success()
        .stdout(predicates::str::starts_with("tilebatch "));
}

#[test]
fn no_subcommand_prints_hint() {
    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("tilebatch --help"));
}

// Tile subcommand tests

#[test]
fn tile_writes_outputs_and_reports_counts() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("SampleA_shg.tif");
    common::write_ramp_tif(&image, 100, 100);
    let out_dir = dir.path().join("tiles");

    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.arg("tile")
        .arg(&image)
        .arg("--out-dir")
        .arg(&out_dir)
        .args(["--tile-size", "40", "--roi-size", "20"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("4 tiles generated"))
        .stdout(predicates::str::contains("4 written"));

    assert!(out_dir.join("SampleA_Tile_0x-0y.tif").exists());
}

#[test]
fn tile_on_missing_image_fails() {
    let dir = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.arg("tile")
        .arg(dir.path().join("nope.tif"))
        .arg("--out-dir")
        .arg(dir.path().join("tiles"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Failed to read image"));
}

// Batch subcommand tests

#[test]
fn batch_packages_tiles_into_archives() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("SampleA_shg.tif");
    common::write_ramp_tif(&image, 100, 100);
    let tile_dir = dir.path().join("tiles");

    Command::cargo_bin("tilebatch")
        .unwrap()
        .arg("tile")
        .arg(&image)
        .arg("--out-dir")
        .arg(&tile_dir)
        .args(["--tile-size", "40", "--roi-size", "20"])
        .assert()
        .success();

    let out_dir = dir.path().join("Batches");
    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.arg("batch")
        .arg(&image)
        .arg("--tile-dir")
        .arg(&tile_dir)
        .arg("--out-dir")
        .arg(&out_dir)
        .args(["--batch-size", "3"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("2 archive(s) recorded"));

    assert!(out_dir.join("SampleA_Tile_Job-1.tar").exists());
    assert!(out_dir.join("SampleA_Tile_Job-2.tar").exists());
    assert!(out_dir.join("SampleA_Tile_JobList.txt").exists());
}

// Run subcommand tests

#[test]
fn run_sweeps_a_directory() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    common::write_ramp_tif(&input.join("SampleA_shg.tif"), 100, 100);
    common::write_ramp_tif(&input.join("nested").join("SampleB_shg.tif"), 80, 80);
    let out_dir = dir.path().join("out");

    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.arg("run")
        .arg(&input)
        .arg("--out-dir")
        .arg(&out_dir)
        .args(["--tile-size", "40", "--roi-size", "20", "--batch-size", "2"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("2 image(s) processed, 0 failed"));

    assert!(out_dir
        .join("SampleA")
        .join("SampleA_Tile_0x-0y.tif")
        .exists());
    assert!(out_dir
        .join("SampleA")
        .join("Batches")
        .join("SampleA_Tile_JobList.txt")
        .exists());
    assert!(out_dir
        .join("SampleB")
        .join("Batches")
        .join("SampleB_Tile_Job-1.tar")
        .exists());
}

// Pair subcommand tests

#[test]
fn pair_lists_shared_base_names() {
    let dir = tempdir().unwrap();
    let dir_a = dir.path().join("a");
    let dir_b = dir.path().join("b");
    common::write_flat_tif(&dir_a.join("SampleA_mod1.tif"), 8, 8, 1);
    common::write_flat_tif(&dir_b.join("SampleA_mod2.tif"), 8, 8, 1);

    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.arg("pair").arg(&dir_a).arg(&dir_b);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("SampleA_mod1.tif"))
        .stdout(predicates::str::contains("1 pair(s)"));
}

#[test]
fn pair_on_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let dir_a = dir.path().join("a");
    std::fs::create_dir_all(&dir_a).unwrap();

    let mut cmd = Command::cargo_bin("tilebatch").unwrap();
    cmd.arg("pair").arg(&dir_a).arg(dir.path().join("nope"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Not a directory"));
}
