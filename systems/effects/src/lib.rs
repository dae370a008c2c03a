#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Building effects applied to the resource ledger as objects come and go.

mod ledger;

pub use ledger::{EconomyConfig, InsufficientFunds, ResourceLedger};

use std::collections::HashMap;

use grid_builder_core::{AssetId, BuildingEffect, BuildingKind, Catalog, InstanceId, PlacementEvent};
use tracing::debug;

/// Applies and reverts building effects in response to placement events.
///
/// Only effects that actually took hold are remembered, so removing a farm
/// that never found workers does not release workers it never employed.
#[derive(Debug, Default)]
pub struct Effects {
    applied: HashMap<InstanceId, BuildingEffect>,
}

impl Effects {
    /// Creates a system with no applied effects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of placed objects whose effect is currently applied.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.applied.len()
    }

    /// Consumes placement events and updates the ledger accordingly.
    pub fn handle<C>(&mut self, events: &[PlacementEvent], catalog: &C, ledger: &mut ResourceLedger)
    where
        C: Catalog,
    {
        for event in events {
            match event {
                PlacementEvent::ObjectPlaced {
                    instance, asset, ..
                }
                | PlacementEvent::ObjectLoaded {
                    instance, asset, ..
                } => self.apply(instance, asset, catalog, ledger),
                PlacementEvent::ObjectRemoved { instance, .. } => self.revert(instance, ledger),
                PlacementEvent::StateStarted { .. }
                | PlacementEvent::StateEnded { .. }
                | PlacementEvent::ObjectMoved { .. } => {}
            }
        }
    }

    fn apply<C: Catalog>(
        &mut self,
        instance: &InstanceId,
        asset: &AssetId,
        catalog: &C,
        ledger: &mut ResourceLedger,
    ) {
        let Some(effect) = catalog.placeable(asset).and_then(|placeable| placeable.effect) else {
            return;
        };

        let applied = match effect.kind {
            BuildingKind::House => {
                ledger.add_house(
                    effect.population_capacity_increase,
                    effect.initial_population_gain,
                );
                true
            }
            BuildingKind::Farm => {
                ledger.add_food_production(effect.food_production, effect.workers_required)
            }
            BuildingKind::Bank => {
                ledger.add_bank();
                true
            }
            BuildingKind::Institute | BuildingKind::PowerPlant => false,
        };

        if applied {
            debug!(%instance, kind = ?effect.kind, "building effect applied");
            let _ = self.applied.insert(instance.clone(), effect);
        }
    }

    fn revert(&mut self, instance: &InstanceId, ledger: &mut ResourceLedger) {
        let Some(effect) = self.applied.remove(instance) else {
            return;
        };

        match effect.kind {
            BuildingKind::House => ledger.remove_house(
                effect.population_capacity_increase,
                effect.initial_population_gain,
            ),
            BuildingKind::Farm => {
                ledger.remove_food_production(effect.food_production, effect.workers_required);
            }
            BuildingKind::Bank => ledger.remove_bank(),
            BuildingKind::Institute | BuildingKind::PowerPlant => {}
        }
        debug!(%instance, kind = ?effect.kind, "building effect reverted");
    }
}
