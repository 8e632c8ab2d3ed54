use wgpu::util::DeviceExt;

use super::vertex::{v, Vertex};
use crate::math::Aabb;

/// GPU-resident mesh data plus its local-space bounds. The AABB is computed
/// once from the positions at creation.
pub struct Geometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    aabb: Aabb,
}

impl Geometry {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("VertexBuffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("IndexBuffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let aabb = Aabb::from_positions(vertices.iter().map(|vertex| &vertex.position));

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            aabb,
        }
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Axis-aligned cube centered on the origin with the given edge length.
    pub fn cube(device: &wgpu::Device, size: f32) -> Self {
        let (vertices, indices) = cube_data(size);
        Self::new(device, &vertices, &indices)
    }

    /// Flat plane in the XZ plane, normal up, centered on the origin.
    pub fn plane(device: &wgpu::Device, size: f32) -> Self {
        let (vertices, indices) = plane_data(size);
        Self::new(device, &vertices, &indices)
    }
}

pub fn cube_data(size: f32) -> (Vec<Vertex>, Vec<u32>) {
    let h = size * 0.5;

    let vertices = vec![
        // +X
        v([h, -h, -h], [1.0, 0.0, 0.0], [0.0, 1.0]),
        v([h, h, -h], [1.0, 0.0, 0.0], [0.0, 0.0]),
        v([h, h, h], [1.0, 0.0, 0.0], [1.0, 0.0]),
        v([h, -h, h], [1.0, 0.0, 0.0], [1.0, 1.0]),
        // -X
        v([-h, -h, h], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        v([-h, h, h], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        v([-h, h, -h], [-1.0, 0.0, 0.0], [1.0, 0.0]),
        v([-h, -h, -h], [-1.0, 0.0, 0.0], [1.0, 1.0]),
        // +Y
        v([-h, h, -h], [0.0, 1.0, 0.0], [0.0, 1.0]),
        v([-h, h, h], [0.0, 1.0, 0.0], [0.0, 0.0]),
        v([h, h, h], [0.0, 1.0, 0.0], [1.0, 0.0]),
        v([h, h, -h], [0.0, 1.0, 0.0], [1.0, 1.0]),
        // -Y
        v([-h, -h, h], [0.0, -1.0, 0.0], [0.0, 1.0]),
        v([-h, -h, -h], [0.0, -1.0, 0.0], [0.0, 0.0]),
        v([h, -h, -h], [0.0, -1.0, 0.0], [1.0, 0.0]),
        v([h, -h, h], [0.0, -1.0, 0.0], [1.0, 1.0]),
        // +Z
        v([h, -h, h], [0.0, 0.0, 1.0], [0.0, 1.0]),
        v([h, h, h], [0.0, 0.0, 1.0], [0.0, 0.0]),
        v([-h, h, h], [0.0, 0.0, 1.0], [1.0, 0.0]),
        v([-h, -h, h], [0.0, 0.0, 1.0], [1.0, 1.0]),
        // -Z
        v([-h, -h, -h], [0.0, 0.0, -1.0], [0.0, 1.0]),
        v([-h, h, -h], [0.0, 0.0, -1.0], [0.0, 0.0]),
        v([h, h, -h], [0.0, 0.0, -1.0], [1.0, 0.0]),
        v([h, -h, -h], [0.0, 0.0, -1.0], [1.0, 1.0]),
    ];

    let mut indices = Vec::with_capacity(36);
    for face in 0..6u32 {
        let base = face * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

pub fn plane_data(size: f32) -> (Vec<Vertex>, Vec<u32>) {
    let h = size * 0.5;
    let up = [0.0, 1.0, 0.0];

    let vertices = vec![
        v([-h, 0.0, -h], up, [0.0, 0.0]),
        v([-h, 0.0, h], up, [0.0, 1.0]),
        v([h, 0.0, h], up, [1.0, 1.0]),
        v([h, 0.0, -h], up, [1.0, 0.0]),
    ];

    let indices = vec![0, 1, 2, 0, 2, 3];

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_bounds_match_size() {
        let (vertices, indices) = cube_data(2.0);
        assert_eq!(indices.len(), 36);
        let aabb = Aabb::from_positions(vertices.iter().map(|vertex| &vertex.position));
        assert_eq!(aabb.min, Vec3::splat(-1.0));
        assert_eq!(aabb.max, Vec3::splat(1.0));
    }

    #[test]
    fn cube_winding_is_counter_clockwise() {
        let (vertices, indices) = cube_data(1.0);
        // For each triangle the geometric normal must agree with the
        // authored vertex normal.
        for tri in indices.chunks(3) {
            let a = Vec3::from_array(vertices[tri[0] as usize].position);
            let b = Vec3::from_array(vertices[tri[1] as usize].position);
            let c = Vec3::from_array(vertices[tri[2] as usize].position);
            let n = (b - a).cross(c - a);
            let authored = Vec3::from_array(vertices[tri[0] as usize].normal);
            assert!(n.dot(authored) > 0.0);
        }
    }

    #[test]
    fn plane_is_flat_and_facing_up() {
        let (vertices, indices) = plane_data(4.0);
        assert_eq!(indices.len(), 6);
        for vertex in &vertices {
            assert_eq!(vertex.position[1], 0.0);
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
        }
    }
}
