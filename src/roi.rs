//! ROI partitioning and metadata records.
//!
//! An accepted tile is subdivided into fixed-size regions of interest by
//! re-applying the grid geometry at ROI granularity, in the tile's local
//! coordinate space. Each ROI gets one metadata record carrying its bounding
//! geometry and a wall-clock provenance stamp; the records for one tile are
//! bundled into a single JSON document keyed by ROI name.
//!
//! Coordinates in the records are 1-based, matching the legacy
//! region-numbering convention consumed downstream (first pixel index is 1,
//! not 0).

use std::collections::BTreeMap;

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::TilebatchError;
use crate::grid::{spans, GridCoord};

/// Shape code for a rectangular ROI. The only shape this pipeline emits.
pub const ROI_SHAPE_RECTANGLE: u8 = 1;

/// Wall-clock stamp recorded into ROI records for provenance.
///
/// Captured once per tile so every ROI of a tile carries the same stamp.
/// Has no effect on identity or filtering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStamp {
    /// ISO calendar date, e.g. `2026-08-30`.
    pub date: String,

    /// Clock time as `H:M:S` without zero padding.
    pub time: String,
}

impl TimeStamp {
    /// Captures the current local date and time.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            date: now.date_naive().to_string(),
            time: format!("{}:{}:{}", now.hour(), now.minute(), now.second()),
        }
    }
}

/// Metadata record for one ROI within a tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoiRecord {
    /// Date the record was created.
    pub date: String,

    /// Time the record was created.
    pub time: String,

    /// Shape code; always [`ROI_SHAPE_RECTANGLE`].
    pub shape: u8,

    /// Bounding rectangle as (x, y, width, height), 1-based.
    pub roi: [f64; 4],

    /// Enclosing rectangle as (x1, y1, x2, y2), 1-based.
    pub enclosing_rect: [f64; 4],

    /// Centroid x: midpoint of the bounding box along axis 0.
    pub xm: f64,

    /// Centroid y: midpoint of the bounding box along axis 1.
    pub ym: f64,

    /// Closed 5-point rectangle outline matching the bounding box.
    pub boundary: Vec<[f64; 2]>,

    /// Position of this ROI within the tile's grid.
    pub coord: GridCoord,
}

/// The on-disk ROI bundle document: one record set per accepted tile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoiBundle {
    /// ROI records keyed by ROI name (`ROI{i}x{j}y`).
    pub separate_rois: BTreeMap<String, RoiRecord>,
}

impl RoiBundle {
    /// Number of ROIs in the bundle.
    pub fn len(&self) -> usize {
        self.separate_rois.len()
    }

    /// Returns true if the bundle holds no ROIs.
    pub fn is_empty(&self) -> bool {
        self.separate_rois.is_empty()
    }
}

/// Name of an ROI within its tile: `ROI{i}x{j}y`.
pub fn roi_name(coord: GridCoord) -> String {
    format!("ROI{}x{}y", coord.i, coord.j)
}

/// Subdivides a tile of `tile_shape` into ROIs of `roi_size` and returns one
/// record per ROI, keyed by ROI name.
///
/// ROI size doubles as the separation, so ROIs tile the accepted tile
/// gaplessly; the final row/column absorbs any remainder. All geometry in
/// the records is 1-based.
///
/// # Errors
/// Returns [`TilebatchError::InvalidGeometry`] for zero-sized dimensions.
pub fn partition_rois(
    tile_shape: [usize; 2],
    roi_size: [usize; 2],
    stamp: &TimeStamp,
) -> Result<BTreeMap<String, RoiRecord>, TilebatchError> {
    let mut rois = BTreeMap::new();

    for span in spans(tile_shape, roi_size, roi_size)? {
        // Shift into the 1-based legacy convention.
        let start = [span.start[0] as f64 + 1.0, span.start[1] as f64 + 1.0];
        let end = [span.end[0] as f64 + 1.0, span.end[1] as f64 + 1.0];
        let shape = span.shape();
        let (width, height) = (shape[0] as f64, shape[1] as f64);

        let record = RoiRecord {
            date: stamp.date.clone(),
            time: stamp.time.clone(),
            shape: ROI_SHAPE_RECTANGLE,
            roi: [start[0], start[1], width, height],
            enclosing_rect: [start[0], start[1], end[0], end[1]],
            xm: start[0] + width / 2.0,
            ym: start[1] + height / 2.0,
            boundary: vec![
                [start[0], start[1]],
                [start[0], end[1]],
                [end[0], end[1]],
                [end[0], start[1]],
                [start[0], start[1]],
            ],
            coord: span.coord,
        };

        rois.insert(roi_name(span.coord), record);
    }

    Ok(rois)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> TimeStamp {
        TimeStamp {
            date: "2026-08-30".into(),
            time: "12:0:0".into(),
        }
    }

    #[test]
    fn roi_names_are_unique_per_tile() {
        let rois = partition_rois([512, 512], [64, 64], &stamp()).unwrap();
        assert_eq!(rois.len(), 64);
        assert!(rois.contains_key("ROI0x0y"));
        assert!(rois.contains_key("ROI7x7y"));
    }

    #[test]
    fn first_roi_uses_one_based_coordinates() {
        let rois = partition_rois([512, 512], [64, 64], &stamp()).unwrap();
        let first = &rois["ROI0x0y"];

        assert_eq!(first.roi, [1.0, 1.0, 64.0, 64.0]);
        assert_eq!(first.enclosing_rect, [1.0, 1.0, 65.0, 65.0]);
        assert_eq!(first.xm, 33.0);
        assert_eq!(first.ym, 33.0);
    }

    #[test]
    fn boundary_is_closed_five_point_rectangle() {
        let rois = partition_rois([128, 128], [64, 64], &stamp()).unwrap();
        let record = &rois["ROI1x1y"];

        assert_eq!(record.boundary.len(), 5);
        assert_eq!(record.boundary[0], record.boundary[4]);
        assert_eq!(record.boundary[0], [65.0, 65.0]);
        assert_eq!(record.boundary[2], [129.0, 129.0]);
    }

    #[test]
    fn final_roi_absorbs_tile_remainder() {
        // 100 = 64 + 36 leftover; the single ROI per axis spans all 100.
        let rois = partition_rois([100, 100], [64, 64], &stamp()).unwrap();
        assert_eq!(rois.len(), 1);

        let only = &rois["ROI0x0y"];
        assert_eq!(only.roi, [1.0, 1.0, 100.0, 100.0]);
    }

    #[test]
    fn bundle_round_trips_through_json() {
        let bundle = RoiBundle {
            separate_rois: partition_rois([128, 128], [64, 64], &stamp()).unwrap(),
        };

        let json = serde_json::to_string(&bundle).unwrap();
        let restored: RoiBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(bundle, restored);
        assert!(json.contains("\"separate_rois\""));
    }

    #[test]
    fn zero_roi_size_is_rejected() {
        assert!(partition_rois([128, 128], [0, 64], &stamp()).is_err());
    }
}
