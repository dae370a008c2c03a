//! Persisted placement records exchanged with save files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AssetId, CellCoord, Direction, InstanceId};

/// Three-component grid position as stored in save files.
///
/// The vertical component is always written as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    /// Cell index along x.
    pub x: i32,
    /// Vertical component, unused by the grid.
    pub y: i32,
    /// Cell index along z.
    pub z: i32,
}

impl GridPosition {
    /// Planar cell addressed by the position.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        CellCoord::new(self.x, self.z)
    }
}

impl From<CellCoord> for GridPosition {
    fn from(cell: CellCoord) -> Self {
        Self {
            x: cell.x(),
            y: 0,
            z: cell.z(),
        }
    }
}

/// Everything needed to restore one placed object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceableObjectData {
    /// Catalog entry the object was created from.
    #[serde(rename = "assetIdentifier")]
    pub asset: AssetId,
    /// Stable identifier of the object.
    #[serde(rename = "guid")]
    pub instance: InstanceId,
    /// Facing of the object.
    #[serde(default)]
    pub direction: Direction,
    /// Origin cell of the object's footprint.
    pub grid_position: GridPosition,
}

impl PlaceableObjectData {
    /// Creates a record anchored at `cell`.
    #[must_use]
    pub fn new(asset: AssetId, instance: InstanceId, cell: CellCoord, direction: Direction) -> Self {
        Self {
            asset,
            instance,
            direction,
            grid_position: GridPosition::from(cell),
        }
    }

    /// Origin cell of the object's footprint.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.grid_position.cell()
    }
}

/// Complete persisted placement state keyed by instance identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default, rename = "placeableObjectDataCollection")]
    records: BTreeMap<InstanceId, PlaceableObjectData>,
}

impl SaveData {
    /// Creates an empty save.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record stored under its instance identifier.
    pub fn add(&mut self, record: PlaceableObjectData) {
        let _ = self.records.insert(record.instance.clone(), record);
    }

    /// Removes the record for `instance`, returning it when present.
    pub fn remove(&mut self, instance: &InstanceId) -> Option<PlaceableObjectData> {
        self.records.remove(instance)
    }

    /// Record stored for `instance`.
    #[must_use]
    pub fn get(&self, instance: &InstanceId) -> Option<&PlaceableObjectData> {
        self.records.get(instance)
    }

    /// Iterator over every record ordered by instance identifier.
    pub fn iter(&self) -> impl Iterator<Item = &PlaceableObjectData> {
        self.records.values()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether the save holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<PlaceableObjectData> for SaveData {
    fn from_iter<I: IntoIterator<Item = PlaceableObjectData>>(iter: I) -> Self {
        let mut save = Self::new();
        for record in iter {
            save.add(record);
        }
        save
    }
}
