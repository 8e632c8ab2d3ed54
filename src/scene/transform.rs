use glam::{Mat4, Quat, Vec3};

/// Translation/rotation/scale with a cached local matrix. Every setter
/// recomputes the cache so `local_matrix` is always current.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    local: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        local: Mat4::IDENTITY,
    };

    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            local: Mat4::from_scale_rotation_translation(scale, rotation, translation),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_trs(translation, Quat::IDENTITY, Vec3::ONE)
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.local
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.recompute();
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.recompute();
    }

    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(glam::EulerRot::XYZ, x, y, z);
        self.recompute();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.recompute();
    }

    /// Forward axis of the rotated frame (-Z in the local frame).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    fn recompute(&mut self) {
        self.local =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        assert!(Transform::default()
            .local_matrix()
            .abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn setters_refresh_local_matrix() {
        let mut tr = Transform::IDENTITY;
        tr.set_translation(Vec3::new(1.0, 2.0, 3.0));
        tr.set_scale(Vec3::splat(2.0));
        let p = tr.local_matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        // Scale about the origin, then translate: (1,0,0) -> (2,0,0) -> (3,2,3)
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn euler_rotation_matches_quat() {
        let mut tr = Transform::IDENTITY;
        tr.set_rotation_euler(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let f = tr.forward();
        assert!(f.abs_diff_eq(Vec3::NEG_X, 1e-6));
    }
}
