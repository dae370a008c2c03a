use glam::Vec3;
use grid_builder_core::{CellCoord, Direction, Footprint, Placeable, PlacementEvent};
use tracing::debug;

use super::{ActionOutcome, PlacementPreview, StateContext};
use crate::{PlacementError, PlacementHandler, PlacementRequest};

/// Places new copies of one catalog entry until the host stops the mode.
#[derive(Clone, Debug)]
pub struct PlacingState {
    placeable: Placeable,
    direction: Direction,
    pivot_offset: Vec3,
    preview: Option<PlacementPreview>,
}

impl PlacingState {
    pub(crate) fn begin(placeable: Placeable, cell_size: f32) -> Self {
        let pivot_offset = placeable.pivot_offset(cell_size);
        debug!(asset = %placeable.asset, ?pivot_offset, "placing started");
        Self {
            placeable,
            direction: Direction::default(),
            pivot_offset,
            preview: None,
        }
    }

    /// Catalog entry being placed.
    #[must_use]
    pub fn placeable(&self) -> &Placeable {
        &self.placeable
    }

    /// Facing applied to the next placement.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Most recent validity feedback.
    #[must_use]
    pub fn preview(&self) -> Option<&PlacementPreview> {
        self.preview.as_ref()
    }

    pub(crate) fn hover<H: PlacementHandler>(&mut self, cell: CellCoord, ctx: &StateContext<'_, H>) {
        let footprint = self.footprint(ctx);
        let valid = self.is_valid(cell, footprint, ctx);
        self.preview = Some(self.preview_at(cell, footprint, valid, ctx));
    }

    pub(crate) fn act<H: PlacementHandler>(
        &mut self,
        cell: CellCoord,
        ctx: &mut StateContext<'_, H>,
    ) -> Result<ActionOutcome, PlacementError> {
        let footprint = self.footprint(ctx);
        if !self.is_valid(cell, footprint, ctx) {
            debug!(asset = %self.placeable.asset, %cell, %footprint, "placement ignored");
            self.preview = Some(self.preview_at(cell, footprint, false, ctx));
            return Ok(ActionOutcome::Ignored);
        }

        let request = PlacementRequest {
            placeable: &self.placeable,
            world_position: ctx.grid.cell_to_world(cell),
            cell,
            direction: self.direction,
            pivot_offset: self.pivot_offset,
            cell_size: ctx.grid.cell_size(),
        };
        let instance = ctx.handler.place_new(&request);
        let layer = self.placeable.layer;
        ctx.layers.layer_mut(layer).add(
            cell,
            footprint,
            self.placeable.asset.clone(),
            instance.clone(),
        )?;

        ctx.events.push(PlacementEvent::ObjectPlaced {
            instance: instance.clone(),
            asset: self.placeable.asset.clone(),
            layer,
            origin: cell,
            footprint,
            direction: self.direction,
        });
        self.preview = Some(self.preview_at(cell, footprint, false, ctx));
        Ok(ActionOutcome::Placed(instance))
    }

    pub(crate) fn rotate<H: PlacementHandler>(&mut self, ctx: &StateContext<'_, H>) {
        self.direction = self.direction.next();
        if let Some(origin) = self.preview.as_ref().map(|preview| preview.origin) {
            self.hover(origin, ctx);
        }
    }

    fn footprint<H>(&self, ctx: &StateContext<'_, H>) -> Footprint {
        self.placeable.footprint(self.direction, ctx.grid.cell_size())
    }

    fn is_valid<H>(&self, cell: CellCoord, footprint: Footprint, ctx: &StateContext<'_, H>) -> bool {
        ctx.grid.is_within_bounds(cell, footprint)
            && ctx
                .layers
                .layer(self.placeable.layer)
                .is_placeable(cell, footprint)
    }

    fn preview_at<H>(
        &self,
        cell: CellCoord,
        footprint: Footprint,
        valid: bool,
        ctx: &StateContext<'_, H>,
    ) -> PlacementPreview {
        PlacementPreview {
            asset: Some(self.placeable.asset.clone()),
            origin: cell,
            world_position: ctx.grid.cell_to_world(cell),
            footprint,
            direction: self.direction,
            valid,
        }
    }
}
