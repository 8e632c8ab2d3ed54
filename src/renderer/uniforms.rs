// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::scene::Camera;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub inverse_view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
    /// x = near, y = far.
    pub near_far: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera, aspect: f32) -> Self {
        let view = camera.view();
        let proj = camera.proj(aspect);
        let view_proj = proj * view;
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            view_proj: view_proj.to_cols_array_2d(),
            inverse_view_proj: view_proj.inverse().to_cols_array_2d(),
            position: camera.position().extend(1.0).to_array(),
            near_far: [camera.near, camera.far, 0.0, 0.0],
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            inverse_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0, 0.0, 0.0, 1.0],
            near_far: [0.1, 100.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Default)]
pub struct SceneUniform {
    pub ambient_color: [f32; 4],
    pub time_seconds: f32,
    pub _padding: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix. Normals transformed by the
    /// model matrix itself skew under non-uniform scale.
    pub normal_matrix: [[f32; 4]; 4],
}

impl MeshUniform {
    pub fn new(model: Mat4) -> Self {
        let normal_matrix = if model.determinant().abs() > 1e-12 {
            model.inverse().transpose()
        } else {
            model
        };
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
        }
    }
}

/// Per-mesh GPU state, attached to mesh entities as a component. The mesh is
/// the sole writer of its buffer; the model matrix is rewritten each frame it
/// is drawn.
pub struct MeshUniforms {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl MeshUniforms {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshUniformBuffer"),
            size: std::mem::size_of::<MeshUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MeshBindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, model: Mat4) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::bytes_of(&MeshUniform::new(model)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_uniform_is_288_bytes() {
        // 4 * mat4x4<f32> + 2 * vec4<f32>
        assert_eq!(std::mem::size_of::<CameraUniform>(), 288);
    }

    #[test]
    fn scene_uniform_is_32_bytes() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 32);
    }

    #[test]
    fn mesh_uniform_is_128_bytes() {
        // model + normal matrix
        assert_eq!(std::mem::size_of::<MeshUniform>(), 128);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular_under_nonuniform_scale() {
        let model = Mat4::from_scale(glam::Vec3::new(1.0, 4.0, 1.0));
        let uniform = MeshUniform::new(model);
        let normal_matrix = Mat4::from_cols_array_2d(&uniform.normal_matrix);

        // A 45-degree surface with its tangent in-plane.
        let local_normal = glam::Vec3::new(0.707, 0.707, 0.0);
        let local_tangent = glam::Vec3::new(0.707, -0.707, 0.0);

        let world_tangent = model.transform_vector3(local_tangent);
        let world_normal = normal_matrix.transform_vector3(local_normal);
        assert!(world_normal.dot(world_tangent).abs() < 1e-5);

        // Transforming the normal by the model matrix does not stay
        // perpendicular; that is what the dedicated matrix is for.
        let skewed = model.transform_vector3(local_normal);
        assert!(skewed.dot(world_tangent).abs() > 1.0);
    }

    #[test]
    fn degenerate_model_matrix_does_not_poison_the_normal_matrix() {
        let flat = Mat4::from_scale(glam::Vec3::new(1.0, 0.0, 1.0));
        let uniform = MeshUniform::new(flat);
        for column in uniform.normal_matrix {
            for value in column {
                assert!(value.is_finite());
            }
        }
    }

    #[test]
    fn inverse_round_trips_view_proj() {
        let camera = Camera::default();
        let uniform = CameraUniform::from_camera(&camera, 1.5);
        let vp = Mat4::from_cols_array_2d(&uniform.view_proj);
        let inv = Mat4::from_cols_array_2d(&uniform.inverse_view_proj);
        assert!((vp * inv).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }
}
