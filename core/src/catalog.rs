//! Catalog of placeable objects and the building effects they carry.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{self, RenderBounds},
    AssetId, Direction, Footprint, LayerKind,
};

/// Looks up catalog entries by asset identifier.
pub trait Catalog {
    /// Returns the entry registered under `asset`, if any.
    fn placeable(&self, asset: &AssetId) -> Option<&Placeable>;
}

/// Single catalog entry describing an object the player can place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placeable {
    /// Identifier referenced by saves and placement requests.
    pub asset: AssetId,
    /// Nominal size in world units along x and z.
    #[serde(default = "unit_size")]
    pub size: Vec2,
    /// Layer whose occupancy store receives the object.
    #[serde(default)]
    pub layer: LayerKind,
    /// Stretches the object to the cell size regardless of nominal size.
    #[serde(default)]
    pub dynamic_size: bool,
    /// Shop grouping label.
    #[serde(default)]
    pub group: String,
    /// Rendered bounds used to centre the object within its cells.
    #[serde(default)]
    pub bounds: Option<RenderBounds>,
    /// Gameplay effect triggered while the object is placed.
    #[serde(default)]
    pub effect: Option<BuildingEffect>,
}

fn unit_size() -> Vec2 {
    Vec2::ONE
}

impl Placeable {
    /// Creates a catalog entry with default grouping, bounds and effect.
    #[must_use]
    pub fn new(asset: impl Into<AssetId>, size: Vec2, layer: LayerKind) -> Self {
        Self {
            asset: asset.into(),
            size,
            layer,
            dynamic_size: false,
            group: String::new(),
            bounds: None,
            effect: None,
        }
    }

    /// Marks the entry as dynamically sized.
    #[must_use]
    pub fn with_dynamic_size(mut self, dynamic_size: bool) -> Self {
        self.dynamic_size = dynamic_size;
        self
    }

    /// Attaches rendered bounds used for pivot computation.
    #[must_use]
    pub fn with_bounds(mut self, bounds: RenderBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Attaches a building effect.
    #[must_use]
    pub fn with_effect(mut self, effect: BuildingEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Assigns a shop group label.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Cells the entry claims when facing `direction`.
    #[must_use]
    pub fn footprint(&self, direction: Direction, cell_size: f32) -> Footprint {
        geometry::occupied_cells(self.size, self.dynamic_size, direction, cell_size)
    }

    /// Unrotated pivot offset; zero when no bounds were recorded.
    #[must_use]
    pub fn pivot_offset(&self, cell_size: f32) -> Vec3 {
        self.bounds.map_or(Vec3::ZERO, |bounds| {
            geometry::pivot_offset(&bounds, Vec3::ZERO, cell_size)
        })
    }

    /// Uniform scale applied to the instantiated object.
    #[must_use]
    pub fn scale(&self, cell_size: f32) -> f32 {
        if self.dynamic_size {
            cell_size
        } else {
            1.0
        }
    }
}

/// In-memory catalog backed by a list of entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceableDatabase {
    placeables: Vec<Placeable>,
}

impl PlaceableDatabase {
    /// Creates a catalog from the provided entries.
    #[must_use]
    pub fn new(placeables: Vec<Placeable>) -> Self {
        Self { placeables }
    }

    /// Iterator over every entry in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Placeable> {
        self.placeables.iter()
    }

    /// Entries sharing the provided shop group.
    #[must_use]
    pub fn grouped_by(&self, group: &str) -> Vec<&Placeable> {
        self.placeables
            .iter()
            .filter(|placeable| placeable.group == group)
            .collect()
    }

    /// Distinct group labels in first-seen order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for placeable in &self.placeables {
            if !groups.contains(&placeable.group.as_str()) {
                groups.push(&placeable.group);
            }
        }
        groups
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placeables.len()
    }

    /// Reports whether the catalog holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placeables.is_empty()
    }
}

impl Catalog for PlaceableDatabase {
    fn placeable(&self, asset: &AssetId) -> Option<&Placeable> {
        self.placeables
            .iter()
            .find(|placeable| &placeable.asset == asset)
    }
}

/// Kinds of buildings with gameplay effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Raises population capacity and adds residents.
    House,
    /// Produces food when staffed.
    Farm,
    /// Reserved; no effect yet.
    Institute,
    /// Reserved; no effect yet.
    PowerPlant,
    /// Converts consumed food into money.
    Bank,
}

/// Parameters of the effect a building applies while placed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingEffect {
    /// Kind of building, selecting which parameters apply.
    pub kind: BuildingKind,
    /// Population capacity added by a house.
    #[serde(default = "default_capacity_increase")]
    pub population_capacity_increase: u32,
    /// Residents a house brings immediately.
    #[serde(default = "default_initial_population")]
    pub initial_population_gain: u32,
    /// Food produced per economy tick by a farm.
    #[serde(default = "default_food_production")]
    pub food_production: f32,
    /// Residents a farm employs.
    #[serde(default = "default_workers_required")]
    pub workers_required: u32,
}

fn default_capacity_increase() -> u32 {
    5
}

fn default_initial_population() -> u32 {
    2
}

fn default_food_production() -> f32 {
    2.0
}

fn default_workers_required() -> u32 {
    2
}

impl BuildingEffect {
    /// Creates an effect with the default parameters for every kind.
    #[must_use]
    pub fn new(kind: BuildingKind) -> Self {
        Self {
            kind,
            population_capacity_increase: default_capacity_increase(),
            initial_population_gain: default_initial_population(),
            food_production: default_food_production(),
            workers_required: default_workers_required(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> PlaceableDatabase {
        PlaceableDatabase::new(vec![
            Placeable::new("house", Vec2::new(2.0, 2.0), LayerKind::Blocking).with_group("Buildings"),
            Placeable::new("grass", Vec2::ONE, LayerKind::Terrain)
                .with_dynamic_size(true)
                .with_group("Ground"),
            Placeable::new("farm", Vec2::new(3.0, 2.0), LayerKind::Blocking).with_group("Buildings"),
        ])
    }

    #[test]
    fn lookup_finds_entries_by_asset() {
        let database = database();
        let grass = database
            .placeable(&AssetId::new("grass"))
            .expect("grass is registered");
        assert_eq!(grass.layer, LayerKind::Terrain);
        assert!(database.placeable(&AssetId::new("castle")).is_none());
    }

    #[test]
    fn grouping_preserves_declaration_order() {
        let database = database();
        let buildings: Vec<&str> = database
            .grouped_by("Buildings")
            .iter()
            .map(|placeable| placeable.asset.as_str())
            .collect();
        assert_eq!(buildings, vec!["house", "farm"]);
        assert_eq!(database.groups(), vec!["Buildings", "Ground"]);
    }

    #[test]
    fn dynamic_entries_scale_to_the_cell() {
        let database = database();
        let grass = database
            .placeable(&AssetId::new("grass"))
            .expect("grass is registered");
        assert!((grass.scale(2.5) - 2.5).abs() < f32::EPSILON);
        assert_eq!(grass.footprint(Direction::Left, 2.5), Footprint::UNIT);
    }

    #[test]
    fn entries_without_bounds_have_no_pivot_offset() {
        let database = database();
        let house = database
            .placeable(&AssetId::new("house"))
            .expect("house is registered");
        assert_eq!(house.pivot_offset(1.0), Vec3::ZERO);
    }
}
