use glam::{Mat4, Vec3};

pub const SHADOW_CASCADE_COUNT: usize = 3;

/// Normalized split positions across the camera depth range, near to far.
pub const CASCADE_SPLIT_SCHEDULE: [f32; SHADOW_CASCADE_COUNT + 1] = [0.0, 0.2, 0.5, 1.0];

/// World-space margin pulled back along the light direction so casters
/// behind the fitted slice still land in the shadow map.
pub const LIGHT_VIEW_MARGIN: f32 = 50.0;

/// Per-frame cascade fit for one directional light.
pub struct CascadeSet {
    pub view: [Mat4; SHADOW_CASCADE_COUNT],
    pub proj: [Mat4; SHADOW_CASCADE_COUNT],
    pub view_proj: [Mat4; SHADOW_CASCADE_COUNT],
    /// Absolute view-space depths, `splits[0] == near`, last == far.
    pub splits: [f32; SHADOW_CASCADE_COUNT + 1],
}

/// Absolute split depths from the normalized schedule.
pub fn split_depths(near: f32, far: f32) -> [f32; SHADOW_CASCADE_COUNT + 1] {
    let mut splits = [0.0; SHADOW_CASCADE_COUNT + 1];
    for (split, fraction) in splits.iter_mut().zip(CASCADE_SPLIT_SCHEDULE.iter()) {
        *split = near + (far - near) * fraction;
    }
    splits
}

/// Up vector for the light's look-at. +Y unless the light points almost
/// straight up or down, then +Z.
pub fn light_up(direction: Vec3) -> Vec3 {
    if direction.dot(Vec3::Y).abs() > 0.999 {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

/// Fit all cascades for a light. `camera_corners` are the world-space camera
/// frustum corners, near quad first then far quad, with corner `i + 4`
/// behind corner `i`.
pub fn compute_cascades(
    camera_corners: &[Vec3; 8],
    near: f32,
    far: f32,
    light_dir: Vec3,
) -> CascadeSet {
    let light_dir = light_dir.normalize();
    let splits = split_depths(near, far);
    let span = far - near;

    let mut view = [Mat4::IDENTITY; SHADOW_CASCADE_COUNT];
    let mut proj = [Mat4::IDENTITY; SHADOW_CASCADE_COUNT];
    let mut view_proj = [Mat4::IDENTITY; SHADOW_CASCADE_COUNT];

    for cascade in 0..SHADOW_CASCADE_COUNT {
        let t_near = (splits[cascade] - near) / span;
        let t_far = (splits[cascade + 1] - near) / span;

        let slice = slice_corners(camera_corners, t_near, t_far);
        let (v, p) = fit_light_volume(&slice, light_dir);
        view[cascade] = v;
        proj[cascade] = p;
        view_proj[cascade] = p * v;
    }

    CascadeSet {
        view,
        proj,
        view_proj,
        splits,
    }
}

/// Interpolate the four near/far corner pairs at the slice fractions.
fn slice_corners(corners: &[Vec3; 8], t_near: f32, t_far: f32) -> [Vec3; 8] {
    let mut slice = [Vec3::ZERO; 8];
    for i in 0..4 {
        let ray = corners[i + 4] - corners[i];
        slice[i] = corners[i] + ray * t_near;
        slice[i + 4] = corners[i] + ray * t_far;
    }
    slice
}

/// Bounding-sphere fit keeps the light view stable under camera rotation;
/// the ortho volume then tightens to the light-space extrema of the slice
/// plus the margin-extruded copies.
fn fit_light_volume(slice: &[Vec3; 8], light_dir: Vec3) -> (Mat4, Mat4) {
    let centroid = slice.iter().sum::<Vec3>() / slice.len() as f32;
    let radius = slice
        .iter()
        .map(|corner| corner.distance(centroid))
        .fold(0.0f32, f32::max);

    let eye = centroid - light_dir * (radius + LIGHT_VIEW_MARGIN);
    let view = Mat4::look_at_rh(eye, centroid, light_up(light_dir));

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for corner in slice {
        for point in [*corner, *corner - light_dir * LIGHT_VIEW_MARGIN] {
            let ls = view.transform_point3(point);
            min = min.min(ls);
            max = max.max(ls);
        }
    }

    // Light space looks down -Z, so the nearest depth is the largest z.
    let proj = Mat4::orthographic_rh(min.x, max.x, min.y, max.y, -max.z, -min.z);

    (view, proj)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_corners() -> [Vec3; 8] {
        crate::scene::Camera {
            eye: Vec3::new(0.0, 2.0, 0.0),
            target: Vec3::new(0.0, 2.0, -10.0),
            ..Default::default()
        }
        .frustum_corners_world_space(16.0 / 9.0)
        .unwrap()
    }

    #[test]
    fn split_schedule_round_trips() {
        let splits = split_depths(0.1, 100.0);
        let expected = [0.1, 20.08, 50.05, 100.0];
        for (got, want) in splits.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-4, "{got} vs {want}");
        }
    }

    #[test]
    fn splits_are_strictly_increasing() {
        let splits = split_depths(0.5, 250.0);
        for pair in splits.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(splits[0], 0.5);
        assert_eq!(splits[SHADOW_CASCADE_COUNT], 250.0);
    }

    #[test]
    fn cascades_cover_their_slices() {
        let corners = camera_corners();
        let set = compute_cascades(&corners, 0.1, 100.0, Vec3::new(-0.4, -1.0, -0.3));

        for cascade in 0..SHADOW_CASCADE_COUNT {
            let t_near = (set.splits[cascade] - 0.1) / (100.0 - 0.1);
            let t_far = (set.splits[cascade + 1] - 0.1) / (100.0 - 0.1);
            let slice = slice_corners(&corners, t_near, t_far);
            for corner in slice {
                let clip = set.view_proj[cascade].project_point3(corner);
                assert!(clip.x >= -1.0001 && clip.x <= 1.0001, "x: {}", clip.x);
                assert!(clip.y >= -1.0001 && clip.y <= 1.0001, "y: {}", clip.y);
                assert!(clip.z >= -0.0001 && clip.z <= 1.0001, "z: {}", clip.z);
            }
        }
    }

    #[test]
    fn later_cascades_span_larger_volumes() {
        let corners = camera_corners();
        let set = compute_cascades(&corners, 0.1, 100.0, Vec3::new(0.0, -1.0, -0.2));

        let mut previous_width = 0.0;
        for cascade in 0..SHADOW_CASCADE_COUNT {
            // Recover the ortho half-width from the projection diagonal.
            let width = 2.0 / set.proj[cascade].col(0).x;
            assert!(width > previous_width);
            previous_width = width;
        }
    }

    #[test]
    fn vertical_light_falls_back_to_z_up() {
        let corners = camera_corners();
        let set = compute_cascades(&corners, 0.1, 100.0, Vec3::new(0.0, -1.0, 0.0));
        for cascade in 0..SHADOW_CASCADE_COUNT {
            assert!(set.view[cascade].is_finite());
            assert!(set.view_proj[cascade].is_finite());
        }
    }

    #[test]
    fn up_choice_flips_only_near_vertical() {
        assert_eq!(light_up(Vec3::new(0.0, -1.0, 0.0)), Vec3::Z);
        assert_eq!(light_up(Vec3::new(0.0, 1.0, 0.0)), Vec3::Z);
        assert_eq!(light_up(Vec3::new(0.0, -0.7, -0.7).normalize()), Vec3::Y);
    }
}
