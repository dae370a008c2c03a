//! Footprint and pivot arithmetic for objects snapped to a uniform grid.
//!
//! Every function here is pure. Invalid input (non-positive cell sizes,
//! negative object sizes) is passed through the arithmetic unchanged rather
//! than rejected; the placement grid validates its own cell size on
//! construction.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Direction, Footprint};

/// Decimal places kept when computing pivot offsets.
pub const PIVOT_DECIMALS: i32 = 6;

/// Decimal places kept before rounding rendered sizes up to whole cells.
const BOUNDS_DECIMALS: i32 = 3;

/// Axis-aligned bounds of an object's rendered geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderBounds {
    /// Minimum corner of the bounds.
    pub min: Vec3,
    /// Extent of the bounds along each axis.
    pub size: Vec3,
}

impl RenderBounds {
    /// Creates bounds from a minimum corner and an extent.
    #[must_use]
    pub const fn new(min: Vec3, size: Vec3) -> Self {
        Self { min, size }
    }
}

/// Applies the dynamic-size correction to a nominal object size.
///
/// Dynamic-size objects are scaled by the cell size when instantiated, so
/// their effective size grows by the same factor.
#[must_use]
pub fn dynamic_size(size: Vec2, dynamic: bool, cell_size: f32) -> Vec2 {
    if dynamic {
        size * cell_size
    } else {
        size
    }
}

/// Rounds each axis up to the next whole multiple of `multiple`.
#[must_use]
pub fn round_to_next_multiple(size: Vec2, multiple: f32) -> Vec2 {
    Vec2::new(
        (size.x / multiple).ceil() * multiple,
        (size.y / multiple).ceil() * multiple,
    )
}

/// World-space size an object claims on the grid for the given direction.
///
/// A 1.2 x 1.7 object on a 1.5 cell grid claims 1.5 x 3.0.
#[must_use]
pub fn corrected_object_size(
    size: Vec2,
    dynamic: bool,
    direction: Direction,
    cell_size: f32,
) -> Vec2 {
    let corrected = dynamic_size(size, dynamic, cell_size);
    let snapped = round_to_next_multiple(corrected, cell_size);
    if direction.swaps_axes() {
        Vec2::new(snapped.y, snapped.x)
    } else {
        snapped
    }
}

/// Number of cells an object occupies for the given direction.
///
/// Each axis is rounded up to whole cells, then width and depth are exchanged
/// for the quarter-turn directions.
#[must_use]
pub fn occupied_cells(size: Vec2, dynamic: bool, direction: Direction, cell_size: f32) -> Footprint {
    let corrected = dynamic_size(size, dynamic, cell_size);
    let cells = Footprint::new(
        (corrected.x / cell_size).ceil() as u32,
        (corrected.y / cell_size).ceil() as u32,
    );
    if direction.swaps_axes() {
        cells.swapped()
    } else {
        cells
    }
}

/// Rounds to the nearest integer, sending exact halves toward positive infinity.
///
/// `2.5` becomes `3` and `-2.5` becomes `-2`; banker's rounding would move
/// half of the cell boundaries to the wrong side.
#[must_use]
pub fn round_half_up(value: f32) -> i32 {
    if (value % 1.0).abs() == 0.5 {
        value.ceil() as i32
    } else {
        value.round() as i32
    }
}

/// Rounds every component of `vector` to `decimals` places.
#[must_use]
pub fn round_vec3(vector: Vec3, decimals: i32) -> Vec3 {
    let multiplier = 10f32.powi(decimals);
    (vector * multiplier).round() / multiplier
}

/// Offset that centres an object's rendered bounds within the cells it claims.
///
/// `origin` is the object's transform position while `bounds` were measured.
#[must_use]
pub fn pivot_offset(bounds: &RenderBounds, origin: Vec3, cell_size: f32) -> Vec3 {
    let size = bounds.size;
    let adjusted_x = cells_spanned(size.x, cell_size) * cell_size;
    let adjusted_z = cells_spanned(size.z, cell_size) * cell_size;

    let margin = Vec3::new((adjusted_x - size.x) / 2.0, 0.0, (adjusted_z - size.z) / 2.0);
    round_vec3(margin + (origin - bounds.min), PIVOT_DECIMALS)
}

fn cells_spanned(extent: f32, cell_size: f32) -> f32 {
    let multiplier = 10f32.powi(BOUNDS_DECIMALS);
    ((extent / cell_size * multiplier).round() / multiplier).ceil()
}

/// Adjusts a pivot offset for a rotation given in degrees.
///
/// Quarter turns (90 and 270) exchange the x and z components. The half turn
/// is passed through unchanged, exactly like the identity rotation.
#[must_use]
pub fn rotated_pivot_offset(offset: Vec3, angle_degrees: i32) -> Vec3 {
    match angle_degrees.rem_euclid(360) {
        90 | 270 => Vec3::new(offset.z, offset.y, offset.x),
        _ => offset,
    }
}

/// Pivot offset adjusted for the provided direction.
#[must_use]
pub fn total_offset(offset: Vec3, direction: Direction) -> Vec3 {
    rotated_pivot_offset(offset, direction.angle_degrees())
}
