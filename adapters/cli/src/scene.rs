use std::collections::BTreeMap;

use glam::Vec3;
use grid_builder_core::{
    AssetId, CellCoord, Direction, InstanceId, PlaceableObjectData, SaveData,
};
use grid_builder_system_placement::{MissingInstance, PlacementHandler, PlacementRequest};
use tracing::debug;
use uuid::Uuid;

/// Headless stand-in for a rendered object.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SceneObject {
    pub(crate) asset: AssetId,
    pub(crate) cell: CellCoord,
    pub(crate) direction: Direction,
    pub(crate) position: Vec3,
    pub(crate) rotation_degrees: i32,
    pub(crate) scale: f32,
    pub(crate) visible: bool,
}

impl SceneObject {
    fn from_request(request: &PlacementRequest<'_>) -> Self {
        Self {
            asset: request.placeable.asset.clone(),
            cell: request.cell,
            direction: request.direction,
            position: request.anchored_position(),
            rotation_degrees: request.rotation_degrees(),
            scale: request.scale(),
            visible: true,
        }
    }
}

/// In-memory scene that keeps the save data in step with live objects.
#[derive(Debug, Default)]
pub(crate) struct SceneHandler {
    objects: BTreeMap<InstanceId, SceneObject>,
    save: SaveData,
}

impl SceneHandler {
    /// Scene whose save starts from a previously persisted collection.
    ///
    /// Records that never become live objects are written back untouched.
    pub(crate) fn with_save(save: SaveData) -> Self {
        Self {
            objects: BTreeMap::new(),
            save,
        }
    }

    /// Persisted view of every live object and of records kept from disk.
    pub(crate) fn save(&self) -> &SaveData {
        &self.save
    }

    /// Live object registered under `instance`.
    pub(crate) fn object(&self, instance: &InstanceId) -> Option<&SceneObject> {
        self.objects.get(instance)
    }

    fn register(&mut self, instance: InstanceId, request: &PlacementRequest<'_>) -> InstanceId {
        self.save.add(PlaceableObjectData::new(
            request.placeable.asset.clone(),
            instance.clone(),
            request.cell,
            request.direction,
        ));
        let _ = self
            .objects
            .insert(instance.clone(), SceneObject::from_request(request));
        instance
    }
}

impl PlacementHandler for SceneHandler {
    fn place_new(&mut self, request: &PlacementRequest<'_>) -> InstanceId {
        let instance = InstanceId::new(Uuid::new_v4().to_string());
        debug!(%instance, asset = %request.placeable.asset, cell = %request.cell, "spawned object");
        self.register(instance, request)
    }

    fn place_from_save(
        &mut self,
        request: &PlacementRequest<'_>,
        saved: &PlaceableObjectData,
    ) -> InstanceId {
        self.register(saved.instance.clone(), request)
    }

    fn reposition(&mut self, instance: &InstanceId, request: &PlacementRequest<'_>) {
        let Some(object) = self.objects.get_mut(instance) else {
            return;
        };
        let visible = object.visible;
        *object = SceneObject {
            visible,
            ..SceneObject::from_request(request)
        };
        self.save.add(PlaceableObjectData::new(
            request.placeable.asset.clone(),
            instance.clone(),
            request.cell,
            request.direction,
        ));
    }

    fn set_visible(&mut self, instance: &InstanceId, visible: bool) {
        if let Some(object) = self.objects.get_mut(instance) {
            object.visible = visible;
        }
    }

    fn destroy(&mut self, instance: &InstanceId) -> Result<(), MissingInstance> {
        if self.objects.remove(instance).is_none() {
            return Err(MissingInstance {
                instance: instance.clone(),
            });
        }
        let _ = self.save.remove(instance);
        debug!(%instance, "destroyed object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use grid_builder_core::{LayerKind, Placeable};

    fn request(placeable: &Placeable, cell: CellCoord, direction: Direction) -> PlacementRequest<'_> {
        PlacementRequest {
            placeable,
            world_position: Vec3::new(cell.x() as f32, 0.0, cell.z() as f32),
            cell,
            direction,
            pivot_offset: Vec3::ZERO,
            cell_size: 1.0,
        }
    }

    #[test]
    fn save_tracks_the_object_lifecycle() {
        let house = Placeable::new("house", Vec2::new(2.0, 2.0), LayerKind::Blocking);
        let mut scene = SceneHandler::default();

        let instance = scene.place_new(&request(&house, CellCoord::new(1, 1), Direction::Down));
        assert_eq!(scene.save().len(), 1);

        scene.reposition(&instance, &request(&house, CellCoord::new(4, 2), Direction::Up));
        let record = scene.save().get(&instance).expect("record follows the object");
        assert_eq!(record.cell(), CellCoord::new(4, 2));
        assert_eq!(record.direction, Direction::Up);
        let object = scene.object(&instance).expect("object is live");
        assert_eq!(object.rotation_degrees, 180);

        scene.destroy(&instance).expect("object is live");
        assert!(scene.save().is_empty());
        assert_eq!(
            scene.destroy(&instance),
            Err(MissingInstance { instance })
        );
    }

    #[test]
    fn saved_objects_keep_their_identifier() {
        let grass = Placeable::new("grass", Vec2::ONE, LayerKind::Terrain).with_dynamic_size(true);
        let saved = PlaceableObjectData::new(
            AssetId::new("grass"),
            InstanceId::new("kept"),
            CellCoord::new(0, 3),
            Direction::Right,
        );
        let mut scene = SceneHandler::default();

        let instance = scene.place_from_save(
            &PlacementRequest {
                cell_size: 2.0,
                ..request(&grass, saved.cell(), saved.direction)
            },
            &saved,
        );
        assert_eq!(instance, InstanceId::new("kept"));
        assert_eq!(scene.save().get(&instance), Some(&saved));
        assert_eq!(scene.object(&instance).map(|object| object.scale), Some(2.0));
    }

    #[test]
    fn seeded_records_survive_without_live_objects() {
        let retired = PlaceableObjectData::new(
            AssetId::new("windmill"),
            InstanceId::new("old"),
            CellCoord::new(5, 5),
            Direction::Down,
        );
        let mut scene = SceneHandler::with_save(std::iter::once(retired.clone()).collect());
        let house = Placeable::new("house", Vec2::new(2.0, 2.0), LayerKind::Blocking);

        let instance = scene.place_new(&request(&house, CellCoord::new(0, 0), Direction::Down));
        assert_eq!(scene.save().len(), 2);
        assert_eq!(scene.save().get(&InstanceId::new("old")), Some(&retired));
        assert!(scene.object(&InstanceId::new("old")).is_none());
        assert!(scene.object(&instance).is_some());
    }

    #[test]
    fn hidden_objects_stay_hidden_when_repositioned() {
        let house = Placeable::new("house", Vec2::new(2.0, 2.0), LayerKind::Blocking);
        let mut scene = SceneHandler::default();
        let instance = scene.place_new(&request(&house, CellCoord::new(0, 0), Direction::Down));

        scene.set_visible(&instance, false);
        scene.reposition(&instance, &request(&house, CellCoord::new(2, 2), Direction::Down));
        assert_eq!(scene.object(&instance).map(|object| object.visible), Some(false));
    }
}
