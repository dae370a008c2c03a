use grid_builder_core::{CellCoord, InstanceId, Placeable, PlaceableObjectData, PlacementEvent};
use grid_builder_world::{needed_cells, OccupancyError};
use tracing::debug;

use super::StateContext;
use crate::{PlacementError, PlacementHandler, PlacementRequest};

/// Re-registers one persisted object during session start-up.
#[derive(Clone, Debug)]
pub struct LoadingState {
    placeable: Placeable,
    saved: PlaceableObjectData,
}

impl LoadingState {
    pub(crate) fn begin(placeable: Placeable, saved: PlaceableObjectData) -> Self {
        Self { placeable, saved }
    }

    /// Record being restored.
    #[must_use]
    pub fn saved(&self) -> &PlaceableObjectData {
        &self.saved
    }

    pub(crate) fn act<H: PlacementHandler>(
        &self,
        cell: CellCoord,
        ctx: &mut StateContext<'_, H>,
    ) -> Result<InstanceId, PlacementError> {
        let layer = self.placeable.layer;
        let footprint = self
            .placeable
            .footprint(self.saved.direction, ctx.grid.cell_size());
        let store = ctx.layers.layer(layer);
        if let Some(conflict) = needed_cells(cell, footprint)
            .into_iter()
            .find(|covered| store.is_occupied(*covered))
        {
            return Err(OccupancyError::Collision { cell: conflict }.into());
        }

        let request = PlacementRequest {
            placeable: &self.placeable,
            world_position: ctx.grid.cell_to_world(cell),
            cell,
            direction: self.saved.direction,
            pivot_offset: self.placeable.pivot_offset(ctx.grid.cell_size()),
            cell_size: ctx.grid.cell_size(),
        };
        let instance = ctx.handler.place_from_save(&request, &self.saved);
        ctx.layers.layer_mut(layer).add(
            cell,
            footprint,
            self.placeable.asset.clone(),
            instance.clone(),
        )?;
        debug!(%instance, asset = %self.placeable.asset, %cell, %footprint, "restored placement");

        ctx.events.push(PlacementEvent::ObjectLoaded {
            instance: instance.clone(),
            asset: self.placeable.asset.clone(),
            layer,
            origin: cell,
            footprint,
            direction: self.saved.direction,
        });
        Ok(instance)
    }
}
