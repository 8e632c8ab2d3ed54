use glam::Vec3;
use hecs::{DynamicBundle, Entity};

use crate::scene::components::{Children, Parent};
use crate::scene::hierarchy::propagate_world_matrices;

/// One hecs world plus hierarchy bookkeeping. Lights and meshes register
/// themselves simply by carrying the matching components; the renderer
/// discovers them with queries.
pub struct Scene {
    pub world: hecs::World,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
        }
    }

    pub fn spawn(&mut self, bundle: impl DynamicBundle) -> Entity {
        self.world.spawn(bundle)
    }

    /// Despawn an entity, unlinking it from its parent first. Its children
    /// become roots and keep their own subtrees.
    pub fn despawn(&mut self, entity: Entity) {
        self.detach(entity);

        let children = self
            .world
            .get::<&Children>(entity)
            .map(|c| c.0.clone())
            .unwrap_or_default();
        for child in children {
            let _ = self.world.remove_one::<Parent>(child);
        }

        if self.world.despawn(entity).is_err() {
            log::warn!("Tried to despawn missing entity {:?}", entity);
        }
    }

    /// Re-parent `child` under `parent`, detaching it from any previous
    /// parent. The child keeps its local transform; its world matrix follows
    /// the new parent from the next update.
    pub fn add_child(&mut self, parent: Entity, child: Entity) {
        self.detach(child);

        if self.world.insert_one(child, Parent(parent)).is_err() {
            log::warn!("Cannot parent missing entity {:?}", child);
            return;
        }

        let has_children = self.world.get::<&Children>(parent).is_ok();
        if has_children {
            if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
                children.0.push(child);
            }
        } else if self
            .world
            .insert_one(parent, Children(vec![child]))
            .is_err()
        {
            log::warn!("Cannot attach child to missing entity {:?}", parent);
            let _ = self.world.remove_one::<Parent>(child);
        }
    }

    /// Remove `entity` from its parent, making it a root. No-op for roots.
    pub fn detach(&mut self, entity: Entity) {
        let parent = match self.world.get::<&Parent>(entity) {
            Ok(p) => p.0,
            Err(_) => return,
        };

        let _ = self.world.remove_one::<Parent>(entity);
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.retain(|&c| c != entity);
        }
    }

    /// Recompute all world matrices for this frame.
    pub fn update(&mut self) {
        propagate_world_matrices(&mut self.world);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level container: scenes plus world-level lighting state shared by all
/// of them.
pub struct World {
    scenes: Vec<Scene>,
    pub ambient_color: Vec3,
}

impl World {
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            ambient_color: Vec3::splat(0.03),
        }
    }

    pub fn add_scene(&mut self, scene: Scene) -> usize {
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    pub fn remove_scene(&mut self, index: usize) -> Option<Scene> {
        if index < self.scenes.len() {
            Some(self.scenes.remove(index))
        } else {
            None
        }
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn scenes_mut(&mut self) -> &mut [Scene] {
        &mut self.scenes
    }

    pub fn scene_mut(&mut self, index: usize) -> Option<&mut Scene> {
        self.scenes.get_mut(index)
    }

    pub fn update(&mut self) {
        for scene in &mut self.scenes {
            scene.update();
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::components::{TransformComponent, WorldMatrix};
    use crate::scene::Transform;

    #[test]
    fn add_child_links_both_sides() {
        let mut scene = Scene::new();
        let parent = scene.spawn((TransformComponent(Transform::IDENTITY),));
        let child = scene.spawn((TransformComponent(Transform::IDENTITY),));

        scene.add_child(parent, child);

        assert_eq!(scene.world.get::<&Parent>(child).unwrap().0, parent);
        assert_eq!(scene.world.get::<&Children>(parent).unwrap().0, vec![child]);
    }

    #[test]
    fn detach_makes_child_a_root() {
        let mut scene = Scene::new();
        let parent = scene.spawn((TransformComponent(Transform::from_translation(
            Vec3::new(4.0, 0.0, 0.0),
        )),));
        let child = scene.spawn((TransformComponent(Transform::IDENTITY),));
        scene.add_child(parent, child);
        scene.update();

        scene.detach(child);
        scene.update();

        assert!(scene.world.get::<&Parent>(child).is_err());
        assert!(scene.world.get::<&Children>(parent).unwrap().0.is_empty());
        let wm = scene.world.get::<&WorldMatrix>(child).unwrap().0;
        let p = wm.transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn reparent_moves_child() {
        let mut scene = Scene::new();
        let a = scene.spawn((TransformComponent(Transform::IDENTITY),));
        let b = scene.spawn((TransformComponent(Transform::IDENTITY),));
        let child = scene.spawn((TransformComponent(Transform::IDENTITY),));

        scene.add_child(a, child);
        scene.add_child(b, child);

        assert_eq!(scene.world.get::<&Parent>(child).unwrap().0, b);
        assert!(scene.world.get::<&Children>(a).unwrap().0.is_empty());
        assert_eq!(scene.world.get::<&Children>(b).unwrap().0, vec![child]);
    }

    #[test]
    fn despawn_orphans_children() {
        let mut scene = Scene::new();
        let parent = scene.spawn((TransformComponent(Transform::IDENTITY),));
        let child = scene.spawn((TransformComponent(Transform::IDENTITY),));
        scene.add_child(parent, child);

        scene.despawn(parent);

        assert!(!scene.world.contains(parent));
        assert!(scene.world.contains(child));
        assert!(scene.world.get::<&Parent>(child).is_err());
    }
}
