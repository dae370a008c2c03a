#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative occupancy state for the grid builder.
//!
//! One [`GridData`] table exists per [`LayerKind`]. Layers are independent:
//! a terrain tile and a building may claim the same cell, and cross-layer
//! policy is left to the placement states.

mod grid;
mod occupancy;

pub use grid::{GridConfigError, GridDimensions, PlacementGrid};
pub use occupancy::{needed_cells, GridData, OccupancyError, PlacementRecord};

use grid_builder_core::{CellCoord, LayerKind};

/// Occupancy tables for every layer, created together at start-up.
#[derive(Clone, Debug, Default)]
pub struct GridLayers {
    layers: [GridData; LayerKind::COUNT],
}

impl GridLayers {
    /// Creates an empty table for every layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupancy table of `kind`.
    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> &GridData {
        &self.layers[kind.index()]
    }

    /// Mutable occupancy table of `kind`.
    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut GridData {
        &mut self.layers[kind.index()]
    }

    /// Iterator over every layer in [`LayerKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerKind, &GridData)> {
        LayerKind::ALL.into_iter().zip(self.layers.iter())
    }

    /// Mutable iterator over every layer in [`LayerKind::ALL`] order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (LayerKind, &mut GridData)> {
        LayerKind::ALL.into_iter().zip(self.layers.iter_mut())
    }

    /// Reports whether no layer claims `cell`.
    #[must_use]
    pub fn is_vacant(&self, cell: CellCoord) -> bool {
        self.layers.iter().all(|layer| !layer.is_occupied(cell))
    }
}
