use glam::{Mat4, Vec3, Vec4};

use super::Aabb;

/// Padding applied along each plane normal before rejecting a box. Keeps the
/// test conservative so shadow casters near the frustum edge are not dropped.
const CULL_PADDING: f32 = 1.0;

#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_row_combination(v: Vec4) -> Self {
        let normal = v.truncate();
        let inv_len = normal.length().recip();
        Self {
            normal: normal * inv_len,
            d: v.w * inv_len,
        }
    }

    /// Signed distance; non-negative means on the inside half-space.
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// Extract the six frustum planes from a view-projection matrix, normals
/// pointing inward. Order: left, right, bottom, top, near, far.
pub fn frustum_planes(view_proj: &Mat4) -> [Plane; 6] {
    let row0 = view_proj.row(0);
    let row1 = view_proj.row(1);
    let row2 = view_proj.row(2);
    let row3 = view_proj.row(3);

    [
        Plane::from_row_combination(row3 + row0),
        Plane::from_row_combination(row3 - row0),
        Plane::from_row_combination(row3 + row1),
        Plane::from_row_combination(row3 - row1),
        Plane::from_row_combination(row3 + row2),
        Plane::from_row_combination(row3 - row2),
    ]
}

/// Conservative p-vertex test: for each plane pick the corner furthest along
/// the normal, pad it outward, and reject only when that corner is outside.
/// Boxes straddling a plane always pass.
pub fn aabb_in_frustum(aabb: &Aabb, planes: &[Plane; 6]) -> bool {
    for plane in planes {
        let n = plane.normal;
        let positive = Vec3::new(
            if n.x >= 0.0 { aabb.max.x } else { aabb.min.x },
            if n.y >= 0.0 { aabb.max.y } else { aabb.min.y },
            if n.z >= 0.0 { aabb.max.z } else { aabb.min.z },
        ) + n * CULL_PADDING;

        if plane.distance(positive) < 0.0 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_view_proj() -> Mat4 {
        // Camera at origin looking down -Z, 90 degree FOV, square aspect.
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        proj * view
    }

    fn unit_cube_at(center: Vec3) -> Aabb {
        Aabb::new(center - Vec3::splat(0.5), center + Vec3::splat(0.5))
    }

    #[test]
    fn cube_in_front_is_visible() {
        let planes = frustum_planes(&test_view_proj());
        assert!(aabb_in_frustum(&unit_cube_at(Vec3::new(0.0, 0.0, -5.0)), &planes));
    }

    #[test]
    fn cube_behind_camera_is_culled() {
        let planes = frustum_planes(&test_view_proj());
        assert!(!aabb_in_frustum(&unit_cube_at(Vec3::new(0.0, 0.0, 5.0)), &planes));
    }

    #[test]
    fn cube_far_off_axis_is_culled() {
        let planes = frustum_planes(&test_view_proj());
        // At z = -5 with a 90 degree FOV the frustum half-width is 5.
        assert!(!aabb_in_frustum(&unit_cube_at(Vec3::new(50.0, 0.0, -5.0)), &planes));
    }

    #[test]
    fn straddling_cube_is_visible() {
        let planes = frustum_planes(&test_view_proj());
        // Centered on the left plane boundary at z = -5.
        assert!(aabb_in_frustum(&unit_cube_at(Vec3::new(-5.0, 0.0, -5.0)), &planes));
    }

    #[test]
    fn padding_keeps_edge_boxes_visible() {
        let planes = frustum_planes(&test_view_proj());
        // Fully past the plane, but by less than the padding distance.
        let boundary = unit_cube_at(Vec3::new(-6.3, 0.0, -5.0));
        assert!(aabb_in_frustum(&boundary, &planes));
    }

    #[test]
    fn planes_are_normalized() {
        for plane in frustum_planes(&test_view_proj()) {
            assert!((plane.normal.length() - 1.0).abs() < 1e-5);
        }
    }
}
