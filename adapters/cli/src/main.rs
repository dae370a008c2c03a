#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the grid builder without a renderer.

mod config;
mod save_file;
mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use grid_builder_core::{
    AssetId, CellCoord, Direction, InstanceId, LayerKind, PlaceableDatabase, PlacementEvent,
    SaveData,
};
use grid_builder_system_effects::{Effects, ResourceLedger};
use grid_builder_system_placement::{ActionOutcome, PlacementSystem};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::GameConfig, scene::SceneHandler};

type System = PlacementSystem<PlaceableDatabase, SceneHandler>;

#[derive(Parser)]
#[command(name = "grid-builder")]
#[command(about = "Place, move and remove objects on a layered building grid", long_about = None)]
struct Cli {
    /// Path to the game configuration
    #[arg(long, global = true, default_value = "grid_builder.toml")]
    config: PathBuf,

    /// Overrides the save file location from the configuration
    #[arg(long, global = true)]
    save: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Place a catalog object with its origin at the given cell
    Place {
        /// Asset identifier from the catalog
        asset: String,
        /// Origin cell along x
        x: i32,
        /// Origin cell along z
        z: i32,
        /// Quarter turns applied before placing
        #[arg(long, default_value_t = 0)]
        rotations: u8,
    },
    /// Move a placed object so that its origin lands on the given cell
    Move {
        /// Instance identifier of the placed object
        instance: String,
        /// New origin cell along x
        x: i32,
        /// New origin cell along z
        z: i32,
        /// Quarter turns applied before moving
        #[arg(long, default_value_t = 0)]
        rotations: u8,
    },
    /// Remove whatever occupies the given cell
    Remove {
        /// Cell along x
        x: i32,
        /// Cell along z
        z: i32,
        /// Restrict removal to one layer; every layer when omitted
        #[arg(long)]
        layer: Option<LayerArg>,
    },
    /// List placed objects per layer
    List,
    /// List the catalog grouped by shop group
    Catalog,
    /// Apply building effects and run the economy
    Simulate {
        /// Number of economy seconds to run
        #[arg(long, default_value_t = 10)]
        ticks: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayerArg {
    /// Buildings and other blocking objects
    Blocking,
    /// Ground tiles
    Terrain,
}

impl From<LayerArg> for LayerKind {
    fn from(layer: LayerArg) -> Self {
        match layer {
            LayerArg::Blocking => Self::Blocking,
            LayerArg::Terrain => Self::Terrain,
        }
    }
}

/// Entry point for the grid builder command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = GameConfig::from_path(&cli.config)?;
    let save_path = cli.save.unwrap_or_else(|| config.save.path.clone());
    let save = if config.save.enabled {
        save_file::load(&save_path)?
    } else {
        SaveData::new()
    };

    let scene = SceneHandler::with_save(save.clone());
    let mut system = PlacementSystem::new(config.grid()?, config.catalog(), scene);
    let mut events = Vec::new();
    let report = system.load_all(&save, &mut events);
    for (instance, error) in &report.skipped {
        println!("skipped saved object {instance}: {error}");
    }

    let changed = match cli.command {
        Command::Place {
            asset,
            x,
            z,
            rotations,
        } => {
            system.start_placement(&AssetId::new(asset), &mut events)?;
            interact(&mut system, CellCoord::new(x, z), rotations, &mut events)?
        }
        Command::Move {
            instance,
            x,
            z,
            rotations,
        } => {
            let instance = InstanceId::new(instance);
            let record = system
                .handler()
                .save()
                .get(&instance)
                .cloned()
                .with_context(|| format!("no placed object with instance {instance}"))?;
            system.start_moving(&record, &mut events)?;
            interact(&mut system, CellCoord::new(x, z), rotations, &mut events)?
        }
        Command::Remove { x, z, layer } => {
            match layer {
                Some(layer) => system.start_removing(layer.into(), &mut events),
                None => system.start_removing_all(&mut events),
            }
            interact(&mut system, CellCoord::new(x, z), 0, &mut events)?
        }
        Command::List => {
            print_layers(&system);
            false
        }
        Command::Catalog => {
            print_catalog(&system);
            false
        }
        Command::Simulate { ticks } => {
            let mut ledger = ResourceLedger::new(config.economy);
            let mut effects = Effects::new();
            effects.handle(&events, system.catalog(), &mut ledger);
            for _ in 0..ticks {
                ledger.tick();
            }
            println!(
                "after {ticks} ticks: money {:.0}, population {}/{}, food {:.1}, active effects {}",
                ledger.money(),
                ledger.population(),
                ledger.population_capacity(),
                ledger.food(),
                effects.active_count(),
            );
            false
        }
    };

    if changed && config.save.enabled {
        save_file::store(&save_path, system.handler().save())?;
        info!(path = %save_path.display(), objects = system.handler().save().len(), "saved placements");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Runs one hover/act cycle with the active state and reports the outcome.
fn interact(
    system: &mut System,
    cell: CellCoord,
    rotations: u8,
    events: &mut Vec<PlacementEvent>,
) -> Result<bool> {
    for _ in 0..rotations {
        system.rotate(events);
    }
    let _ = system.tick(cell, events);
    let valid = system.preview().map(|preview| preview.valid);
    let outcome = system.act(cell, events)?;
    system.stop_state(events);

    match &outcome {
        ActionOutcome::Ignored => println!(
            "nothing changed at {cell} (preview valid: {})",
            valid.map_or_else(|| "n/a".to_owned(), |valid| valid.to_string())
        ),
        ActionOutcome::Placed(instance) => println!("placed {instance} at {cell}"),
        ActionOutcome::Loaded(instance) => println!("loaded {instance} at {cell}"),
        ActionOutcome::Moved(instance) => println!("moved {instance} to {cell}"),
        ActionOutcome::Removed(instances) => {
            for instance in instances {
                println!("removed {instance} at {cell}");
            }
        }
    }
    Ok(outcome.is_effective())
}

fn print_layers(system: &System) {
    for (kind, layer) in system.layers().iter() {
        println!("{kind} ({} objects, {} cells)", layer.len(), layer.occupied_cell_count());
        let mut records: Vec<_> = layer.records().collect();
        records.sort_by_key(|record| record.origin());
        for record in records {
            let Some(object) = system.handler().object(record.instance()) else {
                continue;
            };
            println!(
                "  {} {} at {} facing {:?} ({} deg), position {:?}, scale {}, {} cells{}",
                record.instance(),
                object.asset,
                object.cell,
                object.direction,
                object.rotation_degrees,
                object.position,
                object.scale,
                record.cells().len(),
                if object.visible { "" } else { ", hidden" },
            );
        }
    }
}

fn print_catalog(system: &System) {
    let catalog = system.catalog();
    for group in catalog.groups() {
        let label = if group.is_empty() { "(ungrouped)" } else { group };
        println!("{label}");
        for placeable in catalog.grouped_by(group) {
            let footprint = placeable.footprint(Direction::Down, system.grid().cell_size());
            let effect = placeable
                .effect
                .map_or_else(String::new, |effect| format!(", effect {:?}", effect.kind));
            println!(
                "  {} on {} covering {footprint}{effect}",
                placeable.asset, placeable.layer
            );
        }
    }
}
