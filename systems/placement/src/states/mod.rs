//! Placement states sharing the begin / hover / act / rotate / end contract.

mod loading;
mod moving;
mod placing;
mod removing;

pub use loading::LoadingState;
pub use moving::MovingState;
pub use placing::PlacingState;
pub use removing::{RemovingAllState, RemovingState};

use glam::Vec3;
use grid_builder_core::{
    AssetId, CellCoord, Direction, Footprint, InstanceId, LayerKind, PlacementEvent,
    PlacementMode,
};
use grid_builder_world::{GridLayers, PlacementGrid};
use tracing::warn;

use crate::{PlacementError, PlacementHandler};

/// Borrowed collaborators a state operates on.
pub(crate) struct StateContext<'a, H> {
    pub(crate) grid: &'a PlacementGrid,
    pub(crate) layers: &'a mut GridLayers,
    pub(crate) handler: &'a mut H,
    pub(crate) events: &'a mut Vec<PlacementEvent>,
}

/// Validity feedback for the cell under the cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Object being placed or moved; `None` for removal previews.
    pub asset: Option<AssetId>,
    /// Hovered origin cell.
    pub origin: CellCoord,
    /// World position of the hovered cell.
    pub world_position: Vec3,
    /// Cells the preview covers.
    pub footprint: Footprint,
    /// Facing of the previewed object.
    pub direction: Direction,
    /// Whether acting on the hovered cell would succeed.
    pub valid: bool,
}

impl PlacementPreview {
    fn removal(grid: &PlacementGrid, cell: CellCoord, valid: bool) -> Self {
        Self {
            asset: None,
            origin: cell,
            world_position: grid.cell_to_world(cell),
            footprint: Footprint::UNIT,
            direction: Direction::Down,
            valid,
        }
    }
}

/// Result of acting on a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action was not valid for the cell and nothing changed.
    Ignored,
    /// A new object was placed.
    Placed(InstanceId),
    /// A persisted object was restored.
    Loaded(InstanceId),
    /// An existing object moved.
    Moved(InstanceId),
    /// One object per listed identifier was removed.
    Removed(Vec<InstanceId>),
}

impl ActionOutcome {
    /// Reports whether the action changed any occupancy.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        match self {
            Self::Ignored => false,
            Self::Removed(instances) => !instances.is_empty(),
            Self::Placed(_) | Self::Loaded(_) | Self::Moved(_) => true,
        }
    }
}

/// Active placement state.
#[derive(Clone, Debug, Default)]
pub enum PlacementState {
    /// No interactive mode is active.
    #[default]
    Idle,
    /// Placing new objects from the catalog.
    Placing(PlacingState),
    /// Relocating one existing object.
    Moving(MovingState),
    /// Removing objects from a single layer.
    Removing(RemovingState),
    /// Removing objects from every layer.
    RemovingAll(RemovingAllState),
    /// Restoring one persisted object; never left active.
    LoadingPlaced(LoadingState),
}

impl PlacementState {
    /// Interactive mode represented by the state.
    #[must_use]
    pub fn mode(&self) -> Option<PlacementMode> {
        match self {
            Self::Idle | Self::LoadingPlaced(_) => None,
            Self::Placing(_) => Some(PlacementMode::Placing),
            Self::Moving(_) => Some(PlacementMode::Moving),
            Self::Removing(_) => Some(PlacementMode::Removing),
            Self::RemovingAll(_) => Some(PlacementMode::RemovingAll),
        }
    }

    /// Most recent validity feedback.
    #[must_use]
    pub fn preview(&self) -> Option<&PlacementPreview> {
        match self {
            Self::Idle | Self::LoadingPlaced(_) => None,
            Self::Placing(state) => state.preview(),
            Self::Moving(state) => state.preview(),
            Self::Removing(state) => state.preview(),
            Self::RemovingAll(state) => state.preview(),
        }
    }

    /// Reports whether no state is active.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub(crate) fn hover<H: PlacementHandler>(
        &mut self,
        cell: CellCoord,
        ctx: &mut StateContext<'_, H>,
    ) {
        match self {
            Self::Idle | Self::LoadingPlaced(_) => {}
            Self::Placing(state) => state.hover(cell, ctx),
            Self::Moving(state) => state.hover(cell, ctx),
            Self::Removing(state) => state.hover(cell, ctx),
            Self::RemovingAll(state) => state.hover(cell, ctx),
        }
    }

    pub(crate) fn act<H: PlacementHandler>(
        &mut self,
        cell: CellCoord,
        ctx: &mut StateContext<'_, H>,
    ) -> Result<ActionOutcome, PlacementError> {
        match self {
            Self::Idle => Ok(ActionOutcome::Ignored),
            Self::Placing(state) => state.act(cell, ctx),
            Self::Moving(state) => state.act(cell, ctx),
            Self::Removing(state) => Ok(state.act(cell, ctx)),
            Self::RemovingAll(state) => Ok(state.act(cell, ctx)),
            Self::LoadingPlaced(state) => state.act(cell, ctx).map(ActionOutcome::Loaded),
        }
    }

    pub(crate) fn rotate<H: PlacementHandler>(&mut self, ctx: &mut StateContext<'_, H>) {
        match self {
            Self::Placing(state) => state.rotate(ctx),
            Self::Moving(state) => state.rotate(ctx),
            Self::Idle | Self::Removing(_) | Self::RemovingAll(_) | Self::LoadingPlaced(_) => {}
        }
    }

    pub(crate) fn end<H: PlacementHandler>(self, ctx: &mut StateContext<'_, H>) {
        if let Self::Moving(state) = self {
            state.end(ctx);
        }
    }
}

/// Destroys the object covering `cell` on `layer` and frees its cells.
///
/// Returns `None` when the cell is empty or the host no longer knows the
/// object; in the latter case the cells stay claimed.
fn remove_from_layer<H: PlacementHandler>(
    layer: LayerKind,
    cell: CellCoord,
    ctx: &mut StateContext<'_, H>,
) -> Option<InstanceId> {
    let instance = ctx.layers.layer(layer).instance_at(cell)?.clone();
    if let Err(missing) = ctx.handler.destroy(&instance) {
        warn!(%layer, %cell, error = %missing, "removal abandoned");
        return None;
    }

    let record = ctx.layers.layer_mut(layer).remove_at(cell)?;
    ctx.events.push(PlacementEvent::ObjectRemoved {
        instance: instance.clone(),
        asset: record.asset().clone(),
        layer,
        origin: record.origin().unwrap_or(cell),
    });
    Some(instance)
}
