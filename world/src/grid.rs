//! Coordinate transform between world space and grid cells.

use glam::{Affine3A, Vec3};
use grid_builder_core::{geometry::round_half_up, CellCoord, Footprint};
use thiserror::Error;

/// Width and depth of a grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    width: u32,
    depth: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(width: u32, depth: u32) -> Self {
        Self { width, depth }
    }

    /// Number of cells along x.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells along z.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }
}

/// Errors raised when constructing a [`PlacementGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GridConfigError {
    /// Cell size must be finite and strictly positive.
    #[error("cell size must be a positive number (received {cell_size})")]
    InvalidCellSize {
        /// Rejected cell size.
        cell_size: f32,
    },
    /// Both dimensions must be at least one cell.
    #[error("grid dimensions must be at least 1x1 (received {width}x{depth})")]
    InvalidDimensions {
        /// Rejected width.
        width: u32,
        /// Rejected depth.
        depth: u32,
    },
}

/// Uniform, axis-aligned grid placed in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementGrid {
    dimensions: GridDimensions,
    cell_size: f32,
    inverted_cell_size: f32,
    transform: Affine3A,
    inverse: Affine3A,
}

impl PlacementGrid {
    /// Creates a grid whose local frame coincides with world space.
    pub fn new(dimensions: GridDimensions, cell_size: f32) -> Result<Self, GridConfigError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridConfigError::InvalidCellSize { cell_size });
        }
        if dimensions.width == 0 || dimensions.depth == 0 {
            return Err(GridConfigError::InvalidDimensions {
                width: dimensions.width,
                depth: dimensions.depth,
            });
        }

        Ok(Self {
            dimensions,
            cell_size,
            inverted_cell_size: 1.0 / cell_size,
            transform: Affine3A::IDENTITY,
            inverse: Affine3A::IDENTITY,
        })
    }

    /// Places the grid's local frame with the provided transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine3A) -> Self {
        self.transform = transform;
        self.inverse = transform.inverse();
        self
    }

    /// Dimensions of the grid in cells.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Edge length of one cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Local-to-world transform of the grid.
    #[must_use]
    pub const fn transform(&self) -> &Affine3A {
        &self.transform
    }

    /// Cell containing `world_position`.
    ///
    /// Integer coordinates sit on cell boundaries, so a point exactly on a
    /// boundary belongs to the cell on its positive side.
    #[must_use]
    pub fn world_to_cell(&self, world_position: Vec3) -> CellCoord {
        let local = self.inverse.transform_point3(world_position) * self.inverted_cell_size;
        let offset =
            Vec3::new(self.cell_size * 0.5, 0.0, self.cell_size * 0.5) * self.inverted_cell_size;
        let local = local - offset;
        CellCoord::new(round_half_up(local.x), round_half_up(local.z))
    }

    /// World position of the corner anchoring `cell`.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellCoord) -> Vec3 {
        let local = Vec3::new(cell.x() as f32, 0.0, cell.z() as f32) * self.cell_size;
        self.transform.transform_point3(local)
    }

    /// Reports whether `footprint` anchored at `origin` lies inside the grid.
    #[must_use]
    pub fn is_within_bounds(&self, origin: CellCoord, footprint: Footprint) -> bool {
        let width = i64::from(self.dimensions.width);
        let depth = i64::from(self.dimensions.depth);
        let size_x = i64::from(footprint.width());
        let size_z = i64::from(footprint.depth());

        if size_x > width || size_z > depth {
            return false;
        }

        let x = i64::from(origin.x());
        let z = i64::from(origin.z());
        x >= 0 && z >= 0 && x + size_x <= width && z + size_z <= depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u32, depth: u32, cell_size: f32) -> PlacementGrid {
        PlacementGrid::new(GridDimensions::new(width, depth), cell_size).expect("valid grid")
    }

    #[test]
    fn rejects_non_positive_cell_sizes() {
        let error = PlacementGrid::new(GridDimensions::new(4, 4), 0.0)
            .expect_err("zero cell size must be rejected");
        assert!(matches!(error, GridConfigError::InvalidCellSize { .. }));
        assert!(PlacementGrid::new(GridDimensions::new(4, 4), f32::NAN).is_err());
    }

    #[test]
    fn rejects_empty_dimensions() {
        let error = PlacementGrid::new(GridDimensions::new(0, 3), 1.0)
            .expect_err("zero width must be rejected");
        assert_eq!(error, GridConfigError::InvalidDimensions { width: 0, depth: 3 });
    }

    #[test]
    fn points_inside_a_cell_map_to_that_cell() {
        let grid = grid(10, 10, 1.0);
        assert_eq!(grid.world_to_cell(Vec3::new(2.7, 0.0, 0.2)), CellCoord::new(2, 0));
        assert_eq!(grid.world_to_cell(Vec3::new(0.99, 5.0, 3.5)), CellCoord::new(0, 3));
        assert_eq!(grid.world_to_cell(Vec3::new(-0.3, 0.0, -1.2)), CellCoord::new(-1, -2));
    }

    #[test]
    fn boundaries_belong_to_the_positive_side() {
        let grid = grid(10, 10, 1.0);
        assert_eq!(grid.world_to_cell(Vec3::new(3.0, 0.0, 0.0)), CellCoord::new(3, 0));
        assert_eq!(grid.world_to_cell(Vec3::new(-1.0, 0.0, -2.0)), CellCoord::new(-1, -2));
    }

    #[test]
    fn cell_to_world_round_trips() {
        let translated = grid(8, 8, 0.5)
            .with_transform(Affine3A::from_translation(Vec3::new(10.0, 0.0, -4.0)));
        for cell_size in [1.0, 0.5, 2.0, 0.25] {
            let plain = grid(8, 8, cell_size);
            for x in -6..12 {
                for z in -6..12 {
                    let cell = CellCoord::new(x, z);
                    assert_eq!(plain.world_to_cell(plain.cell_to_world(cell)), cell);
                }
            }
        }
        for x in -6..12 {
            for z in -6..12 {
                let cell = CellCoord::new(x, z);
                assert_eq!(translated.world_to_cell(translated.cell_to_world(cell)), cell);
            }
        }
    }

    #[test]
    fn cell_to_world_applies_the_grid_transform() {
        let grid = grid(4, 4, 2.0).with_transform(Affine3A::from_translation(Vec3::new(1.0, 0.5, 1.0)));
        assert_eq!(grid.cell_to_world(CellCoord::new(2, 1)), Vec3::new(5.0, 0.5, 3.0));
    }

    #[test]
    fn bounds_reject_oversized_negative_and_overflowing_footprints() {
        let grid = grid(4, 3, 1.0);
        assert!(grid.is_within_bounds(CellCoord::new(0, 0), Footprint::new(4, 3)));
        assert!(grid.is_within_bounds(CellCoord::new(2, 1), Footprint::new(2, 2)));
        assert!(!grid.is_within_bounds(CellCoord::new(0, 0), Footprint::new(5, 1)));
        assert!(!grid.is_within_bounds(CellCoord::new(-1, 0), Footprint::UNIT));
        assert!(!grid.is_within_bounds(CellCoord::new(0, -1), Footprint::UNIT));
        assert!(!grid.is_within_bounds(CellCoord::new(3, 0), Footprint::new(2, 1)));
        assert!(!grid.is_within_bounds(CellCoord::new(0, 2), Footprint::new(1, 2)));
    }
}
