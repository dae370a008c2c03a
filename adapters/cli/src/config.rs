use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::{Affine3A, Vec3};
use grid_builder_core::{Placeable, PlaceableDatabase};
use grid_builder_system_effects::EconomyConfig;
use grid_builder_world::{GridDimensions, PlacementGrid};
use serde::Deserialize;

/// Game configuration read from a TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct GameConfig {
    /// Dimensions and placement of the grid.
    pub(crate) grid: GridSection,
    /// Save file location.
    #[serde(default)]
    pub(crate) save: SaveSection,
    /// Economy balance parameters.
    #[serde(default)]
    pub(crate) economy: EconomyConfig,
    /// Catalog of placeable objects.
    #[serde(default)]
    pub(crate) placeables: Vec<Placeable>,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub(crate) struct GridSection {
    width: u32,
    depth: u32,
    #[serde(default = "default_cell_size")]
    cell_size: f32,
    #[serde(default)]
    origin: [f32; 3],
}

fn default_cell_size() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SaveSection {
    pub(crate) enabled: bool,
    pub(crate) path: PathBuf,
}

impl Default for SaveSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("saves/save_file.json"),
        }
    }
}

impl GameConfig {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;

        let mut seen: Vec<&str> = Vec::with_capacity(config.placeables.len());
        for placeable in &config.placeables {
            let asset = placeable.asset.as_str();
            if seen.contains(&asset) {
                bail!("catalog contains duplicate entry for `{asset}`");
            }
            let size = placeable.size;
            if !(size.x > 0.0 && size.y > 0.0) {
                bail!(
                    "catalog entry `{asset}` must have a positive size, got [{}, {}]",
                    size.x,
                    size.y
                );
            }
            seen.push(asset);
        }
        Ok(config)
    }

    /// Builds the placement grid described by the `[grid]` section.
    pub(crate) fn grid(&self) -> Result<PlacementGrid> {
        let section = self.grid;
        let grid = PlacementGrid::new(
            GridDimensions::new(section.width, section.depth),
            section.cell_size,
        )
        .context("invalid [grid] section")?;
        let origin = Vec3::from_array(section.origin);
        Ok(grid.with_transform(Affine3A::from_translation(origin)))
    }

    /// Catalog assembled from the `[[placeables]]` entries.
    pub(crate) fn catalog(&self) -> PlaceableDatabase {
        PlaceableDatabase::new(self.placeables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_builder_core::{
        AssetId, BuildingKind, Catalog, CellCoord, Direction, Footprint, LayerKind,
    };

    const SAMPLE: &str = r#"
[grid]
width = 12
depth = 8
cell_size = 2.0
origin = [10.0, 0.0, -4.0]

[save]
enabled = false
path = "custom/layout.json"

[economy]
starting_money = 250.0

[[placeables]]
asset = "house"
size = [2.0, 2.0]
layer = "Blocking"
group = "Buildings"
bounds = { min = [-1.0, 0.0, -1.0], size = [2.0, 1.5, 2.0] }
effect = { kind = "House", population_capacity_increase = 4 }

[[placeables]]
asset = "grass"
layer = "Terrain"
dynamic_size = true
group = "Ground"
"#;

    #[test]
    fn parses_every_section() {
        let config = GameConfig::parse(SAMPLE).expect("sample is valid");
        assert!(!config.save.enabled);
        assert_eq!(config.save.path, PathBuf::from("custom/layout.json"));
        assert_eq!(config.economy.starting_money, 250.0);
        assert_eq!(
            config.economy.starting_population_capacity,
            EconomyConfig::default().starting_population_capacity
        );

        let catalog = config.catalog();
        let house = catalog
            .placeable(&AssetId::new("house"))
            .expect("house is registered");
        let effect = house.effect.expect("house carries an effect");
        assert_eq!(effect.kind, BuildingKind::House);
        assert_eq!(effect.population_capacity_increase, 4);
        assert_eq!(effect.initial_population_gain, 2);
        assert!(house.bounds.is_some());

        let grass = catalog
            .placeable(&AssetId::new("grass"))
            .expect("grass is registered");
        assert_eq!(grass.layer, LayerKind::Terrain);
        assert_eq!(grass.footprint(Direction::Down, 2.0), Footprint::UNIT);
    }

    #[test]
    fn grid_section_places_the_grid() {
        let config = GameConfig::parse(SAMPLE).expect("sample is valid");
        let grid = config.grid().expect("grid section is valid");
        assert_eq!(grid.dimensions(), GridDimensions::new(12, 8));
        assert_eq!(grid.cell_size(), 2.0);
        assert_eq!(
            grid.cell_to_world(CellCoord::new(1, 1)),
            Vec3::new(12.0, 0.0, -2.0)
        );
    }

    #[test]
    fn omitted_sections_fall_back_to_defaults() {
        let config = GameConfig::parse("[grid]\nwidth = 4\ndepth = 4\n").expect("minimal config");
        assert_eq!(config.save, SaveSection::default());
        assert_eq!(config.economy, EconomyConfig::default());
        assert!(config.catalog().is_empty());
        assert_eq!(config.grid().expect("valid grid").cell_size(), 1.0);
    }

    #[test]
    fn rejects_invalid_grids_and_duplicate_assets() {
        let config =
            GameConfig::parse("[grid]\nwidth = 4\ndepth = 4\ncell_size = 0.0\n").expect("parses");
        assert!(config.grid().is_err());

        let duplicated = "[grid]\nwidth = 4\ndepth = 4\n\n[[placeables]]\nasset = \"a\"\n\n[[placeables]]\nasset = \"a\"\n";
        assert!(GameConfig::parse(duplicated).is_err());
    }

    #[test]
    fn rejects_entries_without_area() {
        for size in ["[0.0, 0.0]", "[2.0, 0.0]", "[-1.0, 3.0]"] {
            let contents = format!(
                "[grid]\nwidth = 4\ndepth = 4\n\n[[placeables]]\nasset = \"flat\"\nsize = {size}\n"
            );
            let error = GameConfig::parse(&contents).expect_err("sizeless entry is rejected");
            assert!(error.to_string().contains("positive size"), "{error}");
        }

        let sized = "[grid]\nwidth = 4\ndepth = 4\n\n[[placeables]]\nasset = \"post\"\nsize = [0.5, 0.5]\n";
        assert!(GameConfig::parse(sized).is_ok());
    }
}
