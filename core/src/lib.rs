#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the grid builder.
//!
//! This crate defines the vocabulary that connects hosts, the authoritative
//! occupancy stores, and the placement systems. Hosts start placement modes
//! and forward hover/click/rotate input, the placement system mutates the
//! per-layer occupancy stores, and then broadcasts [`PlacementEvent`] values
//! that other systems (building effects, save bookkeeping) react to.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod geometry;
pub mod save;

pub use catalog::{BuildingEffect, BuildingKind, Catalog, Placeable, PlaceableDatabase};
pub use geometry::RenderBounds;
pub use save::{GridPosition, PlaceableObjectData, SaveData};

/// Location of a single grid cell expressed as `x` and `z` coordinates.
///
/// Cells may carry negative coordinates; the placement grid decides which
/// cells lie inside its bounds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    x: i32,
    z: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Cell index along the grid's x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Cell index along the grid's z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the cell displaced by the provided non-negative offsets.
    #[must_use]
    pub const fn offset(self, dx: u32, dz: u32) -> Self {
        Self {
            x: self.x.saturating_add_unsigned(dx),
            z: self.z.saturating_add_unsigned(dz),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Number of cells an object covers once rotation and dynamic sizing apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    width: u32,
    depth: u32,
}

impl Footprint {
    /// Footprint covering exactly one cell.
    pub const UNIT: Self = Self::new(1, 1);

    /// Creates a new footprint with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, depth: u32) -> Self {
        Self { width, depth }
    }

    /// Number of cells covered along the x axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells covered along the z axis.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Total number of covered cells.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.width as u64 * self.depth as u64
    }

    /// Footprint with width and depth exchanged.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self {
            width: self.depth,
            depth: self.width,
        }
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.depth)
    }
}

/// Cardinal facing applied to a placed object.
///
/// Rotating steps through `Down -> Left -> Up -> Right -> Down`, which maps to
/// 0, 90, 180 and 270 degrees respectively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Identity rotation (0 degrees).
    #[default]
    Down,
    /// Quarter turn (90 degrees).
    Left,
    /// Half turn (180 degrees).
    Up,
    /// Three quarter turn (270 degrees).
    Right,
}

impl Direction {
    /// Every direction in rotation order.
    pub const ALL: [Self; 4] = [Self::Down, Self::Left, Self::Up, Self::Right];

    /// Direction reached after one rotation step.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Down => Self::Left,
            Self::Left => Self::Up,
            Self::Up => Self::Right,
            Self::Right => Self::Down,
        }
    }

    /// Rotation angle around the vertical axis in degrees.
    #[must_use]
    pub const fn angle_degrees(self) -> i32 {
        match self {
            Self::Down => 0,
            Self::Left => 90,
            Self::Up => 180,
            Self::Right => 270,
        }
    }

    /// Reports whether the footprint axes are exchanged in this direction.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Logical layer holding an independent occupancy store.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LayerKind {
    /// Buildings, crops and other objects that block anything else on the cell.
    #[default]
    Blocking,
    /// Ground tiles that may still carry blocking objects on top.
    Terrain,
}

impl LayerKind {
    /// Number of layers.
    pub const COUNT: usize = 2;

    /// Every layer in iteration order.
    pub const ALL: [Self; Self::COUNT] = [Self::Blocking, Self::Terrain];

    /// Dense index of the layer within [`LayerKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Blocking => 0,
            Self::Terrain => 1,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocking => f.write_str("Blocking"),
            Self::Terrain => f.write_str("Terrain"),
        }
    }
}

/// Identifier of a catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Creates a new asset identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of a placed object, preserved across moves and reloads.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Creates a new instance identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interactive placement modes a host can activate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementMode {
    /// Placing new objects from the catalog.
    Placing,
    /// Relocating a single existing object.
    Moving,
    /// Removing objects from one layer.
    Removing,
    /// Removing objects from every layer.
    RemovingAll,
}

impl PlacementMode {
    /// Reports whether the mode ends on its own after one successful action.
    #[must_use]
    pub const fn is_single_shot(self) -> bool {
        matches!(self, Self::Moving)
    }

    /// Reports whether rotation input affects the mode.
    #[must_use]
    pub const fn accepts_rotation(self) -> bool {
        matches!(self, Self::Placing | Self::Moving)
    }
}

/// Events broadcast by the placement system after processing input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlacementEvent {
    /// Announces that an interactive mode became active.
    StateStarted {
        /// Mode that was activated.
        mode: PlacementMode,
    },
    /// Announces that the active interactive mode was torn down.
    StateEnded {
        /// Mode that ended.
        mode: PlacementMode,
    },
    /// Confirms that a new object was placed by the player.
    ObjectPlaced {
        /// Identifier assigned to the new object.
        instance: InstanceId,
        /// Catalog entry the object was created from.
        asset: AssetId,
        /// Layer whose occupancy store holds the object.
        layer: LayerKind,
        /// Origin cell anchoring the footprint.
        origin: CellCoord,
        /// Cells covered by the object.
        footprint: Footprint,
        /// Facing applied to the object.
        direction: Direction,
    },
    /// Confirms that a persisted object was re-registered during loading.
    ObjectLoaded {
        /// Identifier restored from the save.
        instance: InstanceId,
        /// Catalog entry the object was created from.
        asset: AssetId,
        /// Layer whose occupancy store holds the object.
        layer: LayerKind,
        /// Origin cell anchoring the footprint.
        origin: CellCoord,
        /// Cells covered by the object.
        footprint: Footprint,
        /// Facing applied to the object.
        direction: Direction,
    },
    /// Confirms that an existing object moved to a new origin.
    ObjectMoved {
        /// Identifier of the moved object, unchanged by the move.
        instance: InstanceId,
        /// Catalog entry the object was created from.
        asset: AssetId,
        /// Layer whose occupancy store holds the object.
        layer: LayerKind,
        /// Origin cell before the move.
        from: CellCoord,
        /// Origin cell after the move.
        to: CellCoord,
        /// Cells covered after the move.
        footprint: Footprint,
        /// Facing applied after the move.
        direction: Direction,
    },
    /// Confirms that an object was removed from its layer.
    ObjectRemoved {
        /// Identifier of the removed object.
        instance: InstanceId,
        /// Catalog entry the object was created from.
        asset: AssetId,
        /// Layer that held the object.
        layer: LayerKind,
        /// Origin cell the object occupied.
        origin: CellCoord,
    },
}

#[cfg(test)]
mod tests {
    use super::{AssetId, CellCoord, Direction, Footprint, InstanceId, LayerKind};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn rotation_is_a_four_cycle() {
        for direction in Direction::ALL {
            let cycled = direction.next().next().next().next();
            assert_eq!(cycled, direction);
        }
    }

    #[test]
    fn rotation_order_matches_angles() {
        assert_eq!(Direction::Down.next(), Direction::Left);
        assert_eq!(Direction::Left.next(), Direction::Up);
        assert_eq!(Direction::Up.next(), Direction::Right);
        assert_eq!(Direction::Right.next(), Direction::Down);

        let angles: Vec<i32> = Direction::ALL.iter().map(|d| d.angle_degrees()).collect();
        assert_eq!(angles, vec![0, 90, 180, 270]);
    }

    #[test]
    fn only_odd_rotations_swap_axes() {
        let swapping = Direction::ALL
            .iter()
            .filter(|direction| direction.swaps_axes())
            .count();
        assert_eq!(swapping, 2);
        assert!(!Direction::Down.swaps_axes());
        assert!(!Direction::Up.swaps_axes());
    }

    #[test]
    fn cell_offset_saturates_instead_of_wrapping() {
        let cell = CellCoord::new(i32::MAX - 1, -3);
        assert_eq!(cell.offset(5, 2), CellCoord::new(i32::MAX, -1));
    }

    #[test]
    fn layer_indices_follow_declaration_order() {
        for (position, layer) in LayerKind::ALL.iter().enumerate() {
            assert_eq!(layer.index(), position);
        }
    }

    #[test]
    fn footprint_swap_preserves_cell_count() {
        let footprint = Footprint::new(2, 3);
        assert_eq!(footprint.swapped(), Footprint::new(3, 2));
        assert_eq!(footprint.swapped().cell_count(), footprint.cell_count());
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&AssetId::new("house"));
        assert_round_trip(&InstanceId::new("5a1c0e2b"));
        assert_round_trip(&CellCoord::new(-4, 9));
        assert_round_trip(&Direction::Right);
        assert_round_trip(&LayerKind::Terrain);
    }
}
