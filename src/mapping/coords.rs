use serde::{Deserialize, Serialize};

use crate::models::{PhotoAsset, PhotoFormat};

/// Anchor in fractional grid units: the integer part is the zero-based
/// column/row index, the fractional part an intra-cell pixel offset.
/// Offsets of 0.1-0.2 are the fixed margin convention used throughout the
/// photo section; changing them shifts every image off its printed frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub col: f64,
    pub row: f64,
}

impl Anchor {
    pub const fn new(col: f64, row: f64) -> Self {
        Self { col, row }
    }
}

/// How an evidence photo lands on the sheet. Exactly one placement policy
/// per slot; the enum makes that structural.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum CoordinateSpec {
    /// Anchor the top-left corner and scale the image to a fixed pixel
    /// extent regardless of its native resolution.
    FixedExtent {
        anchor: Anchor,
        width_px: u32,
        height_px: u32,
    },
    /// Stretch the image to exactly fill the rectangle between the two
    /// anchors, ignoring aspect ratio.
    BoundingRegion {
        top_left: Anchor,
        bottom_right: Anchor,
    },
}

/// OOXML drawing unit conversions. Anchor fractions are interpreted against
/// the nominal cell size of the template grid.
pub const EMU_PER_PIXEL: i64 = 9525;
pub const CELL_WIDTH_PX: f64 = 64.0;
pub const CELL_HEIGHT_PX: f64 = 20.0;

/// A fractional anchor split into the shape the drawing layer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOffset {
    pub col: u32,
    pub col_off_emu: i64,
    pub row: u32,
    pub row_off_emu: i64,
}

impl CellOffset {
    pub fn from_anchor(anchor: Anchor) -> Self {
        let col = anchor.col.trunc() as u32;
        let row = anchor.row.trunc() as u32;
        let col_off_px = anchor.col.fract() * CELL_WIDTH_PX;
        let row_off_px = anchor.row.fract() * CELL_HEIGHT_PX;
        Self {
            col,
            col_off_emu: (col_off_px * EMU_PER_PIXEL as f64).round() as i64,
            row,
            row_off_emu: (row_off_px * EMU_PER_PIXEL as f64).round() as i64,
        }
    }
}

/// Resolved argument shape for one embedding call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAnchor {
    /// Fixed extent anchored at a single cell.
    OneCell {
        from: CellOffset,
        ext_cx_emu: i64,
        ext_cy_emu: i64,
    },
    /// Region fill between two cells; the image stretches to the rectangle.
    TwoCell { from: CellOffset, to: CellOffset },
}

#[derive(Debug, Clone)]
pub struct ImagePlacement {
    pub anchor: ImageAnchor,
    pub bytes: Vec<u8>,
    pub format: PhotoFormat,
}

/// Translate a slot's coordinate spec plus its uploaded asset into the
/// embedding call. Pure; the caller decides whether a slot without a spec
/// is skipped (it is, silently).
pub fn placement(spec: CoordinateSpec, asset: &PhotoAsset) -> ImagePlacement {
    let anchor = match spec {
        CoordinateSpec::FixedExtent {
            anchor,
            width_px,
            height_px,
        } => ImageAnchor::OneCell {
            from: CellOffset::from_anchor(anchor),
            ext_cx_emu: width_px as i64 * EMU_PER_PIXEL,
            ext_cy_emu: height_px as i64 * EMU_PER_PIXEL,
        },
        CoordinateSpec::BoundingRegion {
            top_left,
            bottom_right,
        } => ImageAnchor::TwoCell {
            from: CellOffset::from_anchor(top_left),
            to: CellOffset::from_anchor(bottom_right),
        },
    };

    ImagePlacement {
        anchor,
        bytes: asset.bytes.clone(),
        format: asset.format,
    }
}
