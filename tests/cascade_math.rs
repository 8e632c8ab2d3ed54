//! End-to-end checks on the cascaded shadow math: camera frustum corners,
//! split schedule, light volume fits and the uniform block that carries the
//! results to the lighting shader.
//!
//! Conventions:
//! - Right-handed view space (camera looks down -Z).
//! - Clip/NDC depth range is [0, 1]. Near -> 0, far -> 1.
//! - `splits[0]` is the camera near plane, the last entry the far plane.

use glam::Vec3;

use wgpu_deferred::renderer::csm::{
    self, CASCADE_SPLIT_SCHEDULE, SHADOW_CASCADE_COUNT,
};
use wgpu_deferred::scene::Camera;

fn test_camera() -> Camera {
    Camera {
        eye: Vec3::new(3.0, 4.0, 8.0),
        target: Vec3::new(0.0, 0.0, 0.0),
        ..Default::default()
    }
}

#[test]
fn frustum_corners_land_on_the_clip_planes() {
    let camera = test_camera();
    let aspect = 16.0 / 9.0;
    let corners = camera.frustum_corners_world_space(aspect).unwrap();
    let view_proj = camera.view_proj(aspect);

    for (i, corner) in corners.iter().enumerate() {
        let ndc = view_proj.project_point3(*corner);
        let expected_z = if i < 4 { 0.0 } else { 1.0 };
        assert!(
            (ndc.z - expected_z).abs() < 1e-3,
            "corner {i}: ndc.z = {}",
            ndc.z
        );
        assert!(ndc.x.abs() <= 1.001 && ndc.y.abs() <= 1.001);
    }
}

#[test]
fn near_and_far_quads_line_up() {
    let corners = test_camera().frustum_corners_world_space(1.0).unwrap();
    let camera = test_camera();
    let forward = (camera.target - camera.eye).normalize();

    // Corner i + 4 lies behind corner i along the view direction.
    for i in 0..4 {
        let ray = corners[i + 4] - corners[i];
        assert!(ray.dot(forward) > 0.0, "corner pair {i} inverted");
    }
}

#[test]
fn schedule_is_monotonic_and_normalized() {
    assert_eq!(CASCADE_SPLIT_SCHEDULE[0], 0.0);
    assert_eq!(CASCADE_SPLIT_SCHEDULE[SHADOW_CASCADE_COUNT], 1.0);
    for pair in CASCADE_SPLIT_SCHEDULE.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn every_cascade_contains_the_scene_around_its_slice() {
    let camera = test_camera();
    let corners = camera.frustum_corners_world_space(16.0 / 9.0).unwrap();
    let light_dir = Vec3::new(-0.3, -1.0, -0.2).normalize();
    let set = csm::compute_cascades(&corners, camera.near, camera.far, light_dir);

    // A point in the middle of the camera range must fall inside at least
    // one cascade volume with a valid depth.
    let probe = camera.eye + (camera.target - camera.eye).normalize() * 10.0;
    let mut covered = false;
    for cascade in 0..SHADOW_CASCADE_COUNT {
        let ndc = set.view_proj[cascade].project_point3(probe);
        if ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z) {
            covered = true;
        }
    }
    assert!(covered, "probe point not covered by any cascade");
}

#[test]
fn margin_keeps_offscreen_casters_in_depth_range() {
    let camera = test_camera();
    let corners = camera.frustum_corners_world_space(1.0).unwrap();
    let light_dir = Vec3::new(0.0, -1.0, 0.0);
    let set = csm::compute_cascades(&corners, camera.near, camera.far, light_dir);

    // A caster floating above the first slice, outside the camera frustum
    // but between the light and the scene, still gets a depth in [0, 1].
    let slice_center = (corners[0] + corners[1] + corners[2] + corners[3]) / 4.0;
    let caster = slice_center - light_dir * (csm::LIGHT_VIEW_MARGIN * 0.5);
    let ndc = set.view_proj[0].project_point3(caster);
    assert!(
        (0.0..=1.0).contains(&ndc.z),
        "caster depth {} outside shadow range",
        ndc.z
    );
}

#[test]
fn degenerate_projection_yields_no_corners() {
    let camera = Camera {
        near: 1.0,
        far: 1.0,
        ..Default::default()
    };
    assert!(camera.frustum_corners_world_space(1.0).is_none());
}
