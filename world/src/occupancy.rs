//! Sparse per-layer occupancy tracking.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use grid_builder_core::{AssetId, CellCoord, Footprint, InstanceId};
use thiserror::Error;
use tracing::debug;

/// Failures raised by occupancy mutations.
///
/// Both variants indicate that the caller skipped validation; placement
/// states always check [`GridData::is_placeable`] or
/// [`GridData::is_moveable`] first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum OccupancyError {
    /// A target cell is already claimed by another placement.
    #[error("cell {cell} is already occupied")]
    Collision {
        /// First conflicting cell.
        cell: CellCoord,
    },
    /// No placement covers the addressed cell.
    #[error("no placement covers cell {cell}")]
    Vacant {
        /// Cell that was expected to be occupied.
        cell: CellCoord,
    },
}

/// Placement shared by every cell it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRecord {
    cells: Vec<CellCoord>,
    asset: AssetId,
    instance: InstanceId,
}

impl PlacementRecord {
    /// Cells claimed by the placement, origin first.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Origin cell of the footprint.
    #[must_use]
    pub fn origin(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Catalog entry the placed object was created from.
    #[must_use]
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }

    /// Identifier of the placed object.
    #[must_use]
    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }
}

/// Occupancy table for one logical layer.
///
/// Each cell maps to at most one [`PlacementRecord`]; every cell of a
/// placement points at the same shared record.
#[derive(Clone, Debug, Default)]
pub struct GridData {
    cells: HashMap<CellCoord, Arc<PlacementRecord>>,
}

impl GridData {
    /// Creates an empty occupancy table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims every cell covered by `footprint` at `origin`.
    ///
    /// Nothing is claimed when any target cell is taken.
    pub fn add(
        &mut self,
        origin: CellCoord,
        footprint: Footprint,
        asset: AssetId,
        instance: InstanceId,
    ) -> Result<(), OccupancyError> {
        let cells = needed_cells(origin, footprint);
        if let Some(&cell) = cells.iter().find(|cell| self.cells.contains_key(cell)) {
            return Err(OccupancyError::Collision { cell });
        }

        debug!(%instance, %asset, %origin, %footprint, "claiming cells");
        self.insert(Arc::new(PlacementRecord {
            cells,
            asset,
            instance,
        }));
        Ok(())
    }

    /// Reports whether every cell covered by `footprint` at `origin` is free.
    #[must_use]
    pub fn is_placeable(&self, origin: CellCoord, footprint: Footprint) -> bool {
        needed_cells(origin, footprint)
            .iter()
            .all(|cell| !self.cells.contains_key(cell))
    }

    /// Like [`GridData::is_placeable`], but cells held by the placement at
    /// `old_origin` count as free because the move vacates them.
    #[must_use]
    pub fn is_moveable(&self, old_origin: CellCoord, new_origin: CellCoord, footprint: Footprint) -> bool {
        let own = self.cells.get(&old_origin);
        needed_cells(new_origin, footprint)
            .iter()
            .all(|cell| match (self.cells.get(cell), own) {
                (None, _) => true,
                (Some(occupant), Some(own)) => Arc::ptr_eq(occupant, own),
                (Some(_), None) => false,
            })
    }

    /// Moves the placement at `old_origin` so that it is anchored at
    /// `new_origin`, keeping its asset and instance identifiers.
    ///
    /// The table is left untouched when the move fails.
    pub fn move_object(
        &mut self,
        old_origin: CellCoord,
        new_origin: CellCoord,
        footprint: Footprint,
    ) -> Result<(), OccupancyError> {
        let Some(current) = self.cells.get(&old_origin).cloned() else {
            return Err(OccupancyError::Vacant { cell: old_origin });
        };

        let cells = needed_cells(new_origin, footprint);
        let blocked = cells.iter().find(|cell| {
            self.cells
                .get(cell)
                .is_some_and(|occupant| !Arc::ptr_eq(occupant, &current))
        });
        if let Some(&cell) = blocked {
            return Err(OccupancyError::Collision { cell });
        }

        self.release(&current);
        debug!(
            instance = %current.instance,
            from = %old_origin,
            to = %new_origin,
            %footprint,
            "moving placement"
        );
        self.insert(Arc::new(PlacementRecord {
            cells,
            asset: current.asset.clone(),
            instance: current.instance.clone(),
        }));
        Ok(())
    }

    /// Identifier of the placement covering `cell`.
    #[must_use]
    pub fn instance_at(&self, cell: CellCoord) -> Option<&InstanceId> {
        self.cells.get(&cell).map(|record| &record.instance)
    }

    /// Placement covering `cell`.
    #[must_use]
    pub fn record_at(&self, cell: CellCoord) -> Option<&PlacementRecord> {
        self.cells.get(&cell).map(Arc::as_ref)
    }

    /// Reports whether any placement covers `cell`.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Frees every cell of the placement covering `cell`.
    pub fn remove_at(&mut self, cell: CellCoord) -> Option<Arc<PlacementRecord>> {
        let record = self.cells.get(&cell).cloned()?;
        self.release(&record);
        debug!(instance = %record.instance, %cell, "released cells");
        Some(record)
    }

    /// Iterator over distinct placements in unspecified order.
    pub fn records(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.cells
            .iter()
            .filter(|(cell, record)| record.origin() == Some(**cell))
            .map(|(_, record)| record.as_ref())
    }

    /// Number of distinct placements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records().count()
    }

    /// Reports whether no cell is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of claimed cells.
    #[must_use]
    pub fn occupied_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Ordered cell-to-instance snapshot of the table.
    #[must_use]
    pub fn occupancy(&self) -> BTreeMap<CellCoord, InstanceId> {
        self.cells
            .iter()
            .map(|(cell, record)| (*cell, record.instance.clone()))
            .collect()
    }

    fn insert(&mut self, record: Arc<PlacementRecord>) {
        for cell in &record.cells {
            let _ = self.cells.insert(*cell, Arc::clone(&record));
        }
    }

    fn release(&mut self, record: &PlacementRecord) {
        for cell in &record.cells {
            let _ = self.cells.remove(cell);
        }
    }
}

/// Cells covered by `footprint` when anchored at `origin`.
#[must_use]
pub fn needed_cells(origin: CellCoord, footprint: Footprint) -> Vec<CellCoord> {
    let mut cells = Vec::with_capacity(usize::try_from(footprint.cell_count()).unwrap_or(0));
    for dx in 0..footprint.width() {
        for dz in 0..footprint.depth() {
            cells.push(origin.offset(dx, dz));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(grid: &mut GridData, x: i32, z: i32, footprint: Footprint, instance: &str) {
        grid.add(
            CellCoord::new(x, z),
            footprint,
            AssetId::new("crate"),
            InstanceId::new(instance),
        )
        .expect("region is free");
    }

    #[test]
    fn needed_cells_cover_the_footprint() {
        let cells = needed_cells(CellCoord::new(0, 0), Footprint::new(2, 3));
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(0, 2),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
            ]
        );
    }

    #[test]
    fn added_region_is_no_longer_placeable() {
        let mut grid = GridData::new();
        let footprint = Footprint::new(2, 2);
        assert!(grid.is_placeable(CellCoord::new(3, 3), footprint));
        add(&mut grid, 3, 3, footprint, "a");
        assert!(!grid.is_placeable(CellCoord::new(3, 3), footprint));
        assert!(!grid.is_placeable(CellCoord::new(4, 4), Footprint::UNIT));
        assert!(grid.is_placeable(CellCoord::new(5, 3), footprint));
    }

    #[test]
    fn every_cell_shares_one_record() {
        let mut grid = GridData::new();
        add(&mut grid, 0, 0, Footprint::new(2, 3), "a");
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.occupied_cell_count(), 6);
        let origin = grid.record_at(CellCoord::new(0, 0)).expect("occupied");
        let corner = grid.record_at(CellCoord::new(1, 2)).expect("occupied");
        assert!(std::ptr::eq(origin, corner));
    }

    #[test]
    fn collisions_leave_the_table_unchanged() {
        let mut grid = GridData::new();
        add(&mut grid, 2, 2, Footprint::UNIT, "a");
        let before = grid.occupancy();

        let result = grid.add(
            CellCoord::new(1, 1),
            Footprint::new(3, 3),
            AssetId::new("crate"),
            InstanceId::new("b"),
        );
        assert_eq!(
            result,
            Err(OccupancyError::Collision {
                cell: CellCoord::new(2, 2)
            })
        );
        assert_eq!(grid.occupancy(), before);
    }

    #[test]
    fn disjoint_regions_add_in_any_order() {
        let a = (CellCoord::new(0, 0), Footprint::new(2, 2));
        let b = (CellCoord::new(2, 0), Footprint::new(1, 3));

        let mut forward = GridData::new();
        add(&mut forward, a.0.x(), a.0.z(), a.1, "a");
        add(&mut forward, b.0.x(), b.0.z(), b.1, "b");

        let mut backward = GridData::new();
        add(&mut backward, b.0.x(), b.0.z(), b.1, "b");
        add(&mut backward, a.0.x(), a.0.z(), a.1, "a");

        assert_eq!(forward.occupancy(), backward.occupancy());
    }

    #[test]
    fn moving_keeps_the_instance_identifier() {
        let mut grid = GridData::new();
        let footprint = Footprint::new(2, 2);
        add(&mut grid, 0, 0, footprint, "a");

        grid.move_object(CellCoord::new(0, 0), CellCoord::new(5, 5), footprint)
            .expect("destination is free");

        assert!(grid.instance_at(CellCoord::new(0, 0)).is_none());
        for cell in needed_cells(CellCoord::new(5, 5), footprint) {
            assert_eq!(grid.instance_at(cell), Some(&InstanceId::new("a")));
        }
        let record = grid.record_at(CellCoord::new(6, 6)).expect("moved");
        assert_eq!(record.asset(), &AssetId::new("crate"));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn own_cells_count_as_free_when_moving() {
        let mut grid = GridData::new();
        let footprint = Footprint::new(2, 3);
        add(&mut grid, 0, 0, footprint, "a");

        let shifted = CellCoord::new(1, 0);
        assert!(!grid.is_placeable(shifted, footprint));
        assert!(grid.is_moveable(CellCoord::new(0, 0), shifted, footprint));

        grid.move_object(CellCoord::new(0, 0), shifted, footprint)
            .expect("overlap with own cells is allowed");
        assert!(grid.instance_at(CellCoord::new(0, 0)).is_none());
        assert_eq!(grid.instance_at(CellCoord::new(2, 2)), Some(&InstanceId::new("a")));
    }

    #[test]
    fn moves_onto_other_placements_are_rejected() {
        let mut grid = GridData::new();
        add(&mut grid, 0, 0, Footprint::UNIT, "a");
        add(&mut grid, 1, 0, Footprint::UNIT, "b");

        assert!(!grid.is_moveable(CellCoord::new(0, 0), CellCoord::new(1, 0), Footprint::UNIT));
        assert_eq!(
            grid.move_object(CellCoord::new(0, 0), CellCoord::new(1, 0), Footprint::UNIT),
            Err(OccupancyError::Collision {
                cell: CellCoord::new(1, 0)
            })
        );
        assert_eq!(grid.instance_at(CellCoord::new(0, 0)), Some(&InstanceId::new("a")));
    }

    #[test]
    fn moving_from_an_empty_cell_is_vacant() {
        let mut grid = GridData::new();
        assert_eq!(
            grid.move_object(CellCoord::new(0, 0), CellCoord::new(1, 1), Footprint::UNIT),
            Err(OccupancyError::Vacant {
                cell: CellCoord::new(0, 0)
            })
        );
        assert!(grid.is_moveable(CellCoord::new(0, 0), CellCoord::new(1, 1), Footprint::UNIT));
    }

    #[test]
    fn removing_any_covered_cell_frees_the_whole_footprint() {
        let mut grid = GridData::new();
        add(&mut grid, 0, 0, Footprint::new(2, 2), "a");

        let removed = grid.remove_at(CellCoord::new(1, 1)).expect("occupied");
        assert_eq!(removed.instance(), &InstanceId::new("a"));
        assert!(grid.is_empty());
        assert!(grid.remove_at(CellCoord::new(0, 0)).is_none());
    }
}
