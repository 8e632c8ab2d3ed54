use glam::{Mat4, Vec3, Vec4};

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect, self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.proj(aspect) * self.view()
    }

    pub fn position(&self) -> Vec3 {
        self.eye
    }

    /// Unproject the eight NDC frustum corners (clip z in [0, 1]) into world
    /// space. Returns `None` when the view-projection is not invertible;
    /// callers skip shadow fitting for the frame.
    pub fn frustum_corners_world_space(&self, aspect: f32) -> Option<[Vec3; 8]> {
        let view_proj = self.view_proj(aspect);
        if !view_proj.is_finite() || view_proj.determinant().abs() < 1e-12 {
            return None;
        }
        let inverse = view_proj.inverse();

        // Near plane first, counter-clockwise from (-1,-1), then the far
        // plane in the same winding.
        const NDC: [[f32; 3]; 8] = [
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ];

        let mut corners = [Vec3::ZERO; 8];
        for (corner, ndc) in corners.iter_mut().zip(NDC.iter()) {
            let h = inverse * Vec4::new(ndc[0], ndc[1], ndc[2], 1.0);
            if h.w.abs() < 1e-12 {
                return None;
            }
            *corner = h.truncate() / h.w;
        }
        Some(corners)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_radians: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_proj_is_invertible() {
        let cam = Camera::default();
        let vp = cam.view_proj(16.0 / 9.0);
        let id = vp * vp.inverse();
        assert!(id.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn frustum_corners_sit_on_near_and_far_planes() {
        let cam = Camera {
            eye: Vec3::ZERO,
            target: Vec3::NEG_Z,
            ..Default::default()
        };
        let corners = cam.frustum_corners_world_space(1.0).unwrap();

        for near_corner in &corners[0..4] {
            assert!((near_corner.z + cam.near).abs() < 1e-4);
        }
        for far_corner in &corners[4..8] {
            assert!((far_corner.z + cam.far).abs() < 1e-2);
        }
    }

    #[test]
    fn far_corners_widen_with_distance() {
        let cam = Camera {
            eye: Vec3::ZERO,
            target: Vec3::NEG_Z,
            ..Default::default()
        };
        let corners = cam.frustum_corners_world_space(1.0).unwrap();
        assert!(corners[4].x.abs() > corners[0].x.abs());
        assert!(corners[6].y.abs() > corners[2].y.abs());
    }
}
