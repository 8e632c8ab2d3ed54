use crate::scene::components::{Children, Parent, TransformComponent, WorldMatrix};
use glam::Mat4;
use hecs::World;

/// Recompute world matrices for every entity with a transform, parent-first.
/// Roots take their local matrix; children multiply the parent's world matrix
/// on the left. Runs unconditionally each frame and is idempotent.
pub(crate) fn propagate_world_matrices(world: &mut World) {
    let roots: Vec<hecs::Entity> = world
        .query::<&TransformComponent>()
        .without::<&Parent>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    log::trace!("Propagating world matrices from {} root entities", roots.len());

    let mut stack: Vec<(hecs::Entity, Mat4)> = Vec::new();

    for root in roots {
        stack.push((root, Mat4::IDENTITY));

        while let Some((entity, parent_world)) = stack.pop() {
            let local = match world.get::<&TransformComponent>(entity) {
                Ok(t) => t.0.local_matrix(),
                Err(_) => {
                    log::trace!("Entity {:?} has no TransformComponent, skipping", entity);
                    continue;
                }
            };

            let world_matrix = parent_world * local;

            let mut has_world_matrix = false;
            if let Ok(mut wm) = world.get::<&mut WorldMatrix>(entity) {
                wm.0 = world_matrix;
                has_world_matrix = true;
            }

            if !has_world_matrix {
                if let Err(e) = world.insert_one(entity, WorldMatrix(world_matrix)) {
                    log::error!(
                        "Failed to insert WorldMatrix for entity {:?}: {:?}",
                        entity,
                        e
                    );
                    continue;
                }
            }

            if let Ok(children) = world.get::<&Children>(entity) {
                for &child in children.0.iter().rev() {
                    stack.push((child, world_matrix));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;
    use glam::{Quat, Vec3};

    fn translated(x: f32, y: f32, z: f32) -> TransformComponent {
        TransformComponent(Transform::from_translation(Vec3::new(x, y, z)))
    }

    #[test]
    fn child_inherits_parent_translation() {
        let mut world = World::new();

        let parent = world.spawn((translated(5.0, 0.0, 0.0),));
        let child = world.spawn((translated(2.0, 0.0, 0.0), Parent(parent)));
        world.insert_one(parent, Children(vec![child])).ok();

        propagate_world_matrices(&mut world);

        let child_world = world.get::<&WorldMatrix>(child).unwrap();
        let p = child_world.0.transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(7.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn rotation_applies_before_child_translation() {
        let mut world = World::new();

        let parent = world.spawn((TransformComponent(Transform::from_trs(
            Vec3::ZERO,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::ONE,
        )),));
        let child = world.spawn((translated(1.0, 0.0, 0.0), Parent(parent)));
        world.insert_one(parent, Children(vec![child])).ok();

        propagate_world_matrices(&mut world);

        let child_world = world.get::<&WorldMatrix>(child).unwrap();
        let p = child_world.0.transform_point3(Vec3::ZERO);
        // +X rotated a quarter turn around Y lands on -Z.
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn three_level_chain_composes() {
        let mut world = World::new();

        let a = world.spawn((translated(1.0, 0.0, 0.0),));
        let b = world.spawn((translated(0.0, 2.0, 0.0), Parent(a)));
        let c = world.spawn((translated(0.0, 0.0, 3.0), Parent(b)));
        world.insert_one(a, Children(vec![b])).ok();
        world.insert_one(b, Children(vec![c])).ok();

        propagate_world_matrices(&mut world);

        let c_world = world.get::<&WorldMatrix>(c).unwrap();
        let p = c_world.0.transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut world = World::new();

        let parent = world.spawn((translated(5.0, 0.0, 0.0),));
        let child = world.spawn((translated(2.0, 0.0, 0.0), Parent(parent)));
        world.insert_one(parent, Children(vec![child])).ok();

        propagate_world_matrices(&mut world);
        let first = world.get::<&WorldMatrix>(child).unwrap().0;
        propagate_world_matrices(&mut world);
        let second = world.get::<&WorldMatrix>(child).unwrap().0;
        assert_eq!(first, second);
    }
}
