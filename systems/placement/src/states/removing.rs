use grid_builder_core::{CellCoord, LayerKind};
use tracing::debug;

use super::{remove_from_layer, ActionOutcome, PlacementPreview, StateContext};
use crate::PlacementHandler;

/// Removes objects from one designated layer.
#[derive(Clone, Debug)]
pub struct RemovingState {
    layer: LayerKind,
    preview: Option<PlacementPreview>,
}

impl RemovingState {
    pub(crate) fn begin(layer: LayerKind) -> Self {
        debug!(%layer, "removing started");
        Self {
            layer,
            preview: None,
        }
    }

    /// Layer the state removes from.
    #[must_use]
    pub const fn layer(&self) -> LayerKind {
        self.layer
    }

    /// Most recent validity feedback.
    #[must_use]
    pub fn preview(&self) -> Option<&PlacementPreview> {
        self.preview.as_ref()
    }

    pub(crate) fn hover<H: PlacementHandler>(&mut self, cell: CellCoord, ctx: &StateContext<'_, H>) {
        let valid = ctx.layers.layer(self.layer).is_occupied(cell);
        self.preview = Some(PlacementPreview::removal(ctx.grid, cell, valid));
    }

    pub(crate) fn act<H: PlacementHandler>(
        &mut self,
        cell: CellCoord,
        ctx: &mut StateContext<'_, H>,
    ) -> ActionOutcome {
        let outcome = match remove_from_layer(self.layer, cell, ctx) {
            Some(instance) => ActionOutcome::Removed(vec![instance]),
            None => {
                debug!(layer = %self.layer, %cell, "nothing to remove");
                ActionOutcome::Ignored
            }
        };
        self.hover(cell, ctx);
        outcome
    }
}

/// Removes whatever occupies a cell on every layer.
#[derive(Clone, Debug, Default)]
pub struct RemovingAllState {
    preview: Option<PlacementPreview>,
}

impl RemovingAllState {
    pub(crate) fn begin() -> Self {
        debug!("removing from all layers started");
        Self::default()
    }

    /// Most recent validity feedback.
    #[must_use]
    pub fn preview(&self) -> Option<&PlacementPreview> {
        self.preview.as_ref()
    }

    pub(crate) fn hover<H: PlacementHandler>(&mut self, cell: CellCoord, ctx: &StateContext<'_, H>) {
        let valid = !ctx.layers.is_vacant(cell);
        self.preview = Some(PlacementPreview::removal(ctx.grid, cell, valid));
    }

    pub(crate) fn act<H: PlacementHandler>(
        &mut self,
        cell: CellCoord,
        ctx: &mut StateContext<'_, H>,
    ) -> ActionOutcome {
        let removed: Vec<_> = LayerKind::ALL
            .into_iter()
            .filter_map(|layer| remove_from_layer(layer, cell, ctx))
            .collect();
        self.hover(cell, ctx);

        if removed.is_empty() {
            debug!(%cell, "nothing to remove on any layer");
            ActionOutcome::Ignored
        } else {
            ActionOutcome::Removed(removed)
        }
    }
}
