//! Contract with the host that owns the live, renderable objects.

use glam::Vec3;
use grid_builder_core::{
    geometry, CellCoord, Direction, InstanceId, Placeable, PlaceableObjectData,
};
use thiserror::Error;

/// Everything a host needs to put an object into the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementRequest<'a> {
    /// Catalog entry being instantiated or repositioned.
    pub placeable: &'a Placeable,
    /// World position of the origin cell's anchoring corner.
    pub world_position: Vec3,
    /// Origin cell of the footprint.
    pub cell: CellCoord,
    /// Facing of the object.
    pub direction: Direction,
    /// Unrotated pivot offset of the object.
    pub pivot_offset: Vec3,
    /// Edge length of one grid cell.
    pub cell_size: f32,
}

impl PlacementRequest<'_> {
    /// Final world position of the object's transform origin.
    #[must_use]
    pub fn anchored_position(&self) -> Vec3 {
        self.world_position + geometry::total_offset(self.pivot_offset, self.direction)
    }

    /// Rotation around the vertical axis in degrees.
    #[must_use]
    pub fn rotation_degrees(&self) -> i32 {
        self.direction.angle_degrees()
    }

    /// Uniform scale applied to the object.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.placeable.scale(self.cell_size)
    }
}

/// Reported when the host has no live object for an instance identifier.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("no live object registered for instance {instance}")]
pub struct MissingInstance {
    /// Identifier that could not be resolved.
    pub instance: InstanceId,
}

/// Host-side object lifecycle driven by the placement states.
///
/// The placement system never creates or destroys renderable objects
/// itself; it only keeps occupancy in sync with what the handler reports.
pub trait PlacementHandler {
    /// Instantiates a new object and returns its freshly allocated identifier.
    fn place_new(&mut self, request: &PlacementRequest<'_>) -> InstanceId;

    /// Re-instantiates a persisted object, returning the identifier it was
    /// registered under (normally the saved one).
    fn place_from_save(
        &mut self,
        request: &PlacementRequest<'_>,
        saved: &PlaceableObjectData,
    ) -> InstanceId;

    /// Moves and rotates an existing object.
    fn reposition(&mut self, instance: &InstanceId, request: &PlacementRequest<'_>);

    /// Shows or hides an existing object while a move preview is active.
    fn set_visible(&mut self, instance: &InstanceId, visible: bool);

    /// Destroys an existing object.
    fn destroy(&mut self, instance: &InstanceId) -> Result<(), MissingInstance>;
}
