#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Placement state machine and the orchestrator that routes host input to it.
//!
//! [`PlacementSystem`] owns the per-layer occupancy stores and at most one
//! active [`PlacementState`]. Hosts start a mode, forward hover cells through
//! [`PlacementSystem::tick`], confirm with [`PlacementSystem::act`] and stop
//! the mode explicitly. Every call appends the resulting [`PlacementEvent`]s
//! to a caller-supplied buffer.

mod handler;
mod states;

pub use handler::{MissingInstance, PlacementHandler, PlacementRequest};
pub use states::{
    ActionOutcome, LoadingState, MovingState, PlacementPreview, PlacementState, PlacingState,
    RemovingAllState, RemovingState,
};

use glam::Vec3;
use grid_builder_core::{
    AssetId, Catalog, CellCoord, InstanceId, LayerKind, Placeable, PlaceableObjectData,
    PlacementEvent, PlacementMode, SaveData,
};
use grid_builder_world::{GridLayers, OccupancyError, PlacementGrid};
use states::StateContext;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failures surfaced by the placement orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The catalog holds no entry for the requested asset.
    #[error("asset `{asset}` is not registered in the catalog")]
    UnknownAsset {
        /// Identifier that failed to resolve.
        asset: AssetId,
    },
    /// The addressed object is no longer anchored where the caller expects.
    #[error("instance {instance} is not anchored at {cell} on the {layer} layer")]
    StaleTarget {
        /// Object the caller referenced.
        instance: InstanceId,
        /// Origin cell the caller supplied.
        cell: CellCoord,
        /// Layer the object belongs to.
        layer: LayerKind,
    },
    /// An occupancy mutation broke the single-claim invariant.
    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
}

/// Summary of a bulk load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Objects restored, in load order.
    pub loaded: Vec<InstanceId>,
    /// Records that were skipped together with the reason.
    pub skipped: Vec<(InstanceId, PlacementError)>,
}

/// Orchestrates placement states over the per-layer occupancy stores.
#[derive(Debug)]
pub struct PlacementSystem<C, H> {
    grid: PlacementGrid,
    layers: GridLayers,
    catalog: C,
    handler: H,
    state: PlacementState,
    last_hover: Option<CellCoord>,
}

impl<C, H> PlacementSystem<C, H>
where
    C: Catalog,
    H: PlacementHandler,
{
    /// Creates an idle system with an empty store for every layer.
    pub fn new(grid: PlacementGrid, catalog: C, handler: H) -> Self {
        Self {
            grid,
            layers: GridLayers::new(),
            catalog,
            handler,
            state: PlacementState::Idle,
            last_hover: None,
        }
    }

    /// Coordinate transform of the grid.
    #[must_use]
    pub fn grid(&self) -> &PlacementGrid {
        &self.grid
    }

    /// Occupancy stores of every layer.
    #[must_use]
    pub fn layers(&self) -> &GridLayers {
        &self.layers
    }

    /// Catalog consulted for asset lookups.
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Host collaborator owning the live objects.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutable access to the host collaborator.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Currently active state.
    #[must_use]
    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    /// Validity feedback published by the active state.
    #[must_use]
    pub fn preview(&self) -> Option<&PlacementPreview> {
        self.state.preview()
    }

    /// Reports whether an interactive mode is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    /// Starts placing copies of `asset`.
    ///
    /// The active state is left untouched when the asset is unknown.
    pub fn start_placement(
        &mut self,
        asset: &AssetId,
        out: &mut Vec<PlacementEvent>,
    ) -> Result<(), PlacementError> {
        let placeable = self.lookup(asset)?;
        self.stop_state(out);
        let state = PlacingState::begin(placeable, self.grid.cell_size());
        self.enter(PlacementState::Placing(state), out);
        Ok(())
    }

    /// Starts removing objects from `layer`.
    pub fn start_removing(&mut self, layer: LayerKind, out: &mut Vec<PlacementEvent>) {
        self.stop_state(out);
        self.enter(PlacementState::Removing(RemovingState::begin(layer)), out);
    }

    /// Starts removing objects from every layer.
    pub fn start_removing_all(&mut self, out: &mut Vec<PlacementEvent>) {
        self.stop_state(out);
        self.enter(PlacementState::RemovingAll(RemovingAllState::begin()), out);
    }

    /// Starts relocating the placed object described by `saved`.
    pub fn start_moving(
        &mut self,
        saved: &PlaceableObjectData,
        out: &mut Vec<PlacementEvent>,
    ) -> Result<(), PlacementError> {
        let placeable = self.lookup(&saved.asset)?;
        self.ensure_anchored(saved, placeable.layer)?;
        self.stop_state(out);

        let (_, mut ctx) = self.parts(out);
        let state = MovingState::begin(placeable, saved, &mut ctx);
        self.enter(PlacementState::Moving(state), out);
        Ok(())
    }

    /// Removes the placed object described by `saved` without leaving a
    /// mode active afterwards.
    pub fn remove(
        &mut self,
        saved: &PlaceableObjectData,
        out: &mut Vec<PlacementEvent>,
    ) -> Result<ActionOutcome, PlacementError> {
        let placeable = self.lookup(&saved.asset)?;
        self.ensure_anchored(saved, placeable.layer)?;
        self.stop_state(out);

        let mut state = RemovingState::begin(placeable.layer);
        let (_, mut ctx) = self.parts(out);
        Ok(state.act(saved.cell(), &mut ctx))
    }

    /// Restores one persisted object.
    pub fn load_placed(
        &mut self,
        saved: &PlaceableObjectData,
        out: &mut Vec<PlacementEvent>,
    ) -> Result<ActionOutcome, PlacementError> {
        let placeable = self.lookup(&saved.asset)?;
        self.stop_state(out);

        self.state = PlacementState::LoadingPlaced(LoadingState::begin(placeable, saved.clone()));
        let (state, mut ctx) = self.parts(out);
        let outcome = state.act(saved.cell(), &mut ctx);
        self.state = PlacementState::Idle;
        outcome
    }

    /// Restores every record of `save`, skipping the ones that fail.
    pub fn load_all(&mut self, save: &SaveData, out: &mut Vec<PlacementEvent>) -> LoadReport {
        let mut report = LoadReport::default();
        for saved in save.iter() {
            match self.load_placed(saved, out) {
                Ok(ActionOutcome::Loaded(instance)) => report.loaded.push(instance),
                Ok(_) => {}
                Err(error) => {
                    warn!(instance = %saved.instance, asset = %saved.asset, %error, "skipping saved object");
                    report.skipped.push((saved.instance.clone(), error));
                }
            }
        }
        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "restored saved placements"
        );
        report
    }

    /// Forwards the hovered cell to the active state.
    ///
    /// Returns `false` when no mode is active or the cell did not change
    /// since the previous tick.
    pub fn tick(&mut self, cell: CellCoord, out: &mut Vec<PlacementEvent>) -> bool {
        if self.state.is_idle() || self.last_hover == Some(cell) {
            return false;
        }
        self.last_hover = Some(cell);
        let (state, mut ctx) = self.parts(out);
        state.hover(cell, &mut ctx);
        true
    }

    /// Forwards the hovered world position to the active state.
    pub fn hover_world(&mut self, position: Vec3, out: &mut Vec<PlacementEvent>) -> bool {
        let cell = self.grid.world_to_cell(position);
        self.tick(cell, out)
    }

    /// Acts on `cell` with the active state.
    ///
    /// Single-shot modes end on their own after an effective action.
    pub fn act(
        &mut self,
        cell: CellCoord,
        out: &mut Vec<PlacementEvent>,
    ) -> Result<ActionOutcome, PlacementError> {
        let mode = self.state.mode();
        let (state, mut ctx) = self.parts(out);
        let outcome = state.act(cell, &mut ctx)?;
        debug!(?mode, %cell, ?outcome, "acted on cell");

        if outcome.is_effective() && mode.is_some_and(PlacementMode::is_single_shot) {
            self.stop_state(out);
        }
        Ok(outcome)
    }

    /// Acts on the cell containing the world `position`.
    pub fn act_at_world(
        &mut self,
        position: Vec3,
        out: &mut Vec<PlacementEvent>,
    ) -> Result<ActionOutcome, PlacementError> {
        let cell = self.grid.world_to_cell(position);
        self.act(cell, out)
    }

    /// Advances the facing of the active state, if it supports rotation.
    pub fn rotate(&mut self, out: &mut Vec<PlacementEvent>) {
        if !self.state.mode().is_some_and(PlacementMode::accepts_rotation) {
            return;
        }
        let (state, mut ctx) = self.parts(out);
        state.rotate(&mut ctx);
    }

    /// Tears down the active state, returning to idle.
    pub fn stop_state(&mut self, out: &mut Vec<PlacementEvent>) {
        self.last_hover = None;
        let state = std::mem::take(&mut self.state);
        let Some(mode) = state.mode() else {
            return;
        };

        let (_, mut ctx) = self.parts(out);
        state.end(&mut ctx);
        debug!(?mode, "placement state ended");
        out.push(PlacementEvent::StateEnded { mode });
    }

    fn enter(&mut self, state: PlacementState, out: &mut Vec<PlacementEvent>) {
        self.state = state;
        self.last_hover = None;
        if let Some(mode) = self.state.mode() {
            debug!(?mode, "placement state started");
            out.push(PlacementEvent::StateStarted { mode });
        }
    }

    fn lookup(&self, asset: &AssetId) -> Result<Placeable, PlacementError> {
        self.catalog
            .placeable(asset)
            .cloned()
            .ok_or_else(|| PlacementError::UnknownAsset {
                asset: asset.clone(),
            })
    }

    fn ensure_anchored(
        &self,
        saved: &PlaceableObjectData,
        layer: LayerKind,
    ) -> Result<(), PlacementError> {
        let cell = saved.cell();
        let anchored = self
            .layers
            .layer(layer)
            .record_at(cell)
            .is_some_and(|record| {
                record.instance() == &saved.instance && record.origin() == Some(cell)
            });
        if anchored {
            Ok(())
        } else {
            Err(PlacementError::StaleTarget {
                instance: saved.instance.clone(),
                cell,
                layer,
            })
        }
    }

    fn parts<'a>(
        &'a mut self,
        events: &'a mut Vec<PlacementEvent>,
    ) -> (&'a mut PlacementState, StateContext<'a, H>) {
        (
            &mut self.state,
            StateContext {
                grid: &self.grid,
                layers: &mut self.layers,
                handler: &mut self.handler,
                events,
            },
        )
    }
}
