//! Frustum culling against world-space bounds, driven through the scene
//! hierarchy the way the renderer does it each frame: local transforms
//! propagate to world matrices, geometry AABBs move into world space, and
//! the result is tested against the camera's clip planes.

use glam::{Mat4, Quat, Vec3};

use wgpu_deferred::math::{aabb_in_frustum, frustum_planes, Aabb};
use wgpu_deferred::renderer::cube_data;
use wgpu_deferred::scene::{
    Camera, Scene, Transform, TransformComponent, WorldMatrix,
};

fn cube_aabb(size: f32) -> Aabb {
    let (vertices, _) = cube_data(size);
    Aabb::from_positions(vertices.iter().map(|v| &v.position))
}

fn look_down_neg_z() -> Camera {
    Camera {
        eye: Vec3::ZERO,
        target: Vec3::NEG_Z,
        ..Default::default()
    }
}

#[test]
fn cube_ahead_of_camera_is_visible() {
    let camera = look_down_neg_z();
    let planes = frustum_planes(&camera.view_proj(1.0));

    let world = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));
    let bounds = cube_aabb(1.0).transformed(&world);
    assert!(aabb_in_frustum(&bounds, &planes));
}

#[test]
fn cube_behind_camera_is_culled() {
    let camera = look_down_neg_z();
    let planes = frustum_planes(&camera.view_proj(1.0));

    let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));
    let bounds = cube_aabb(1.0).transformed(&world);
    assert!(!aabb_in_frustum(&bounds, &planes));
}

#[test]
fn rotated_bounds_still_conservative() {
    let camera = look_down_neg_z();
    let planes = frustum_planes(&camera.view_proj(1.0));

    // A long box rotated 45 degrees pokes a corner into the frustum edge.
    let world = Mat4::from_rotation_translation(
        Quat::from_rotation_y(45f32.to_radians()),
        Vec3::new(-6.0, 0.0, -6.0),
    );
    let local = Aabb {
        min: Vec3::new(-4.0, -0.5, -0.5),
        max: Vec3::new(4.0, 0.5, 0.5),
    };
    let bounds = local.transformed(&world);
    assert!(aabb_in_frustum(&bounds, &planes));
}

#[test]
fn child_bounds_follow_the_parent_transform() {
    let camera = look_down_neg_z();
    let planes = frustum_planes(&camera.view_proj(1.0));

    let mut scene = Scene::new();
    let parent = scene.spawn((TransformComponent(Transform::from_translation(Vec3::new(
        0.0, 0.0, -20.0,
    ))),));
    // Child local position is behind the camera on its own; under the
    // parent it lands well inside the view.
    let child = scene.spawn((TransformComponent(Transform::from_translation(Vec3::new(
        0.0, 0.0, 5.0,
    ))),));
    scene.add_child(parent, child);
    scene.update();

    let world = scene.world.get::<&WorldMatrix>(child).unwrap().0;
    let in_view = cube_aabb(1.0).transformed(&world);
    assert!(aabb_in_frustum(&in_view, &planes));

    let detached = cube_aabb(1.0).transformed(&Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)));
    assert!(!aabb_in_frustum(&detached, &planes));
}

#[test]
fn far_plane_cuts_distant_meshes() {
    let camera = look_down_neg_z();
    let planes = frustum_planes(&camera.view_proj(1.0));

    let beyond_far = cube_aabb(1.0)
        .transformed(&Mat4::from_translation(Vec3::new(0.0, 0.0, -(camera.far + 10.0))));
    assert!(!aabb_in_frustum(&beyond_far, &planes));

    let within_far = cube_aabb(1.0)
        .transformed(&Mat4::from_translation(Vec3::new(0.0, 0.0, -(camera.far - 10.0))));
    assert!(aabb_in_frustum(&within_far, &planes));
}

#[test]
fn scaled_parent_grows_child_bounds() {
    let mut scene = Scene::new();
    let parent = scene.spawn((TransformComponent(Transform::from_trs(
        Vec3::ZERO,
        Quat::IDENTITY,
        Vec3::splat(3.0),
    )),));
    let child = scene.spawn((TransformComponent(Transform::IDENTITY),));
    scene.add_child(parent, child);
    scene.update();

    let world = scene.world.get::<&WorldMatrix>(child).unwrap().0;
    let bounds = cube_aabb(2.0).transformed(&world);
    assert!(bounds.min.abs_diff_eq(Vec3::splat(-3.0), 1e-5));
    assert!(bounds.max.abs_diff_eq(Vec3::splat(3.0), 1e-5));
}
