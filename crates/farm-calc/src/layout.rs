//! Near-square field layout search.
//!
//! Scores every candidate width up to `2 * sqrt(tiles)` and keeps the
//! cheapest rectangle that still covers the requested tile count.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CalcError;
use farm_core::ValidationError;

/// Penalty per unused cell, relative to one unit of width/height imbalance.
pub const WASTE_WEIGHT: f64 = 0.1;

/// A recommended arrangement of farm tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    /// Nothing to plant.
    NotNeeded,
    /// A `width` x `height` field. `total_cells` may exceed `required`;
    /// the excess cells are buffer space.
    Grid {
        width: u64,
        height: u64,
        total_cells: u64,
        required: u64,
    },
}

/// One cell of a grid layout, in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    /// A planted tile, numbered from zero.
    Planted(u64),
    /// A cell beyond the required tile count.
    Buffer,
}

impl Layout {
    /// True for grids with equal sides.
    pub fn is_square(&self) -> bool {
        matches!(*self, Layout::Grid { width, height, .. } if width == height)
    }

    /// Cells in the grid that are not needed for planting.
    pub fn unused_cells(&self) -> u64 {
        match *self {
            Layout::NotNeeded => 0,
            Layout::Grid {
                total_cells,
                required,
                ..
            } => total_cells - required,
        }
    }

    /// Width and height, if there is a grid.
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        match *self {
            Layout::NotNeeded => None,
            Layout::Grid { width, height, .. } => Some((width, height)),
        }
    }

    /// All cells row by row; planted cells come first.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (total, required) = match *self {
            Layout::NotNeeded => (0, 0),
            Layout::Grid {
                total_cells,
                required,
                ..
            } => (total_cells, required),
        };
        (0..total).map(move |i| {
            if i < required {
                Cell::Planted(i)
            } else {
                Cell::Buffer
            }
        })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Layout::NotNeeded => write!(f, "no planting needed"),
            Layout::Grid { width, height, .. } if width == height => {
                write!(f, "{width}×{height}")
            }
            Layout::Grid {
                width,
                height,
                total_cells,
                ..
            } => write!(f, "{width}×{height} ({total_cells} cells)"),
        }
    }
}

/// Score of a `width` x `height` candidate for `tiles`; lower is better.
///
/// Imbalance between the sides counts fully, wasted cells at [`WASTE_WEIGHT`].
pub fn layout_score(width: u64, height: u64, tiles: u64) -> f64 {
    let imbalance = (width as f64 - height as f64).abs();
    let waste = width.saturating_mul(height).saturating_sub(tiles) as f64;
    imbalance + waste * WASTE_WEIGHT
}

/// Largest width the search considers for `tiles`.
pub fn scan_bound(tiles: u64) -> u64 {
    let bound = ((tiles as f64).sqrt() * 2.0).ceil() as u64;
    bound.min(tiles)
}

/// Find the lowest-scoring grid that covers `tiles`.
///
/// Ties keep the narrowest candidate. Zero tiles needs no layout.
///
/// The scan visits about `2 * sqrt(tiles)` widths, so it stays cheap up to
/// around 10^12 tiles; candidates whose area overflows `u64` are skipped.
pub fn optimal_layout(tiles: u64) -> Layout {
    if tiles == 0 {
        return Layout::NotNeeded;
    }
    let (mut best_w, mut best_h) = (1, tiles);
    let mut best_score = f64::INFINITY;
    for w in 1..=scan_bound(tiles) {
        let h = tiles.div_ceil(w);
        match w.checked_mul(h) {
            Some(cells) if cells >= tiles => {}
            _ => continue,
        }
        let score = layout_score(w, h, tiles);
        if score < best_score {
            best_score = score;
            best_w = w;
            best_h = h;
        }
    }
    Layout::Grid {
        width: best_w,
        height: best_h,
        total_cells: best_w * best_h,
        required: tiles,
    }
}

/// [`optimal_layout`] for signed input; negative counts are rejected.
pub fn try_optimal_layout(tiles: i64) -> Result<Layout, CalcError> {
    let tiles = u64::try_from(tiles).map_err(|_| ValidationError::NegativeTiles(tiles))?;
    Ok(optimal_layout(tiles))
}
