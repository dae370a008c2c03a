use glam::Vec3;
use grid_builder_core::{
    CellCoord, Direction, Footprint, InstanceId, LayerKind, Placeable, PlaceableObjectData,
    PlacementEvent,
};
use tracing::debug;

use super::{ActionOutcome, PlacementPreview, StateContext};
use crate::{PlacementError, PlacementHandler, PlacementRequest};

/// Relocates one existing object; the live object stays hidden meanwhile.
#[derive(Clone, Debug)]
pub struct MovingState {
    placeable: Placeable,
    instance: InstanceId,
    origin: CellCoord,
    direction: Direction,
    pivot_offset: Vec3,
    hidden: bool,
    preview: Option<PlacementPreview>,
}

impl MovingState {
    pub(crate) fn begin<H: PlacementHandler>(
        placeable: Placeable,
        saved: &PlaceableObjectData,
        ctx: &mut StateContext<'_, H>,
    ) -> Self {
        ctx.handler.set_visible(&saved.instance, false);
        debug!(instance = %saved.instance, origin = %saved.cell(), "moving started");
        let pivot_offset = placeable.pivot_offset(ctx.grid.cell_size());
        Self {
            placeable,
            instance: saved.instance.clone(),
            origin: saved.cell(),
            direction: saved.direction,
            pivot_offset,
            hidden: true,
            preview: None,
        }
    }

    /// Identifier of the object being moved.
    #[must_use]
    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }

    /// Origin the object currently occupies.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Facing the object will have after the move.
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
            debug!(instance = %self.instance, %cell, %footprint, "move ignored");
            self.preview = Some(self.preview_at(cell, footprint, false, ctx));
            return Ok(ActionOutcome::Ignored);
        }

        let layer = self.layer();
        ctx.layers
            .layer_mut(layer)
            .move_object(self.origin, cell, footprint)?;

        let request = PlacementRequest {
            placeable: &self.placeable,
            world_position: ctx.grid.cell_to_world(cell),
            cell,
            direction: self.direction,
            pivot_offset: self.pivot_offset,
            cell_size: ctx.grid.cell_size(),
        };
        ctx.handler.reposition(&self.instance, &request);
        ctx.handler.set_visible(&self.instance, true);
        self.hidden = false;

        ctx.events.push(PlacementEvent::ObjectMoved {
            instance: self.instance.clone(),
            asset: self.placeable.asset.clone(),
            layer,
            from: self.origin,
            to: cell,
            footprint,
            direction: self.direction,
        });
        self.origin = cell;
        self.preview = Some(self.preview_at(cell, footprint, false, ctx));
        Ok(ActionOutcome::Moved(self.instance.clone()))
    }

    pub(crate) fn rotate<H: PlacementHandler>(&mut self, ctx: &StateContext<'_, H>) {
        self.direction = self.direction.next();
        if let Some(origin) = self.preview.as_ref().map(|preview| preview.origin) {
            self.hover(origin, ctx);
        }
    }

    pub(crate) fn end<H: PlacementHandler>(self, ctx: &mut StateContext<'_, H>) {
        if self.hidden {
            ctx.handler.set_visible(&self.instance, true);
        }
        debug!(instance = %self.instance, origin = %self.origin, "moving ended");
    }

    fn layer(&self) -> LayerKind {
        self.placeable.layer
    }

    fn footprint<H>(&self, ctx: &StateContext<'_, H>) -> Footprint {
        self.placeable.footprint(self.direction, ctx.grid.cell_size())
    }

    fn is_valid<H>(&self, cell: CellCoord, footprint: Footprint, ctx: &StateContext<'_, H>) -> bool {
        ctx.grid.is_within_bounds(cell, footprint)
            && ctx
                .layers
                .layer(self.layer())
                .is_moveable(self.origin, cell, footprint)
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
