pub(crate) mod forward;
pub(crate) mod geometry;
pub(crate) mod lighting;
pub(crate) mod output;
pub(crate) mod shadow;

use super::assets::Handle;
use super::geometry::Geometry;
use super::material::MaterialId;

/// HDR-ish target the lighting and forward passes resolve into.
pub const LIGHTING_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// One culled, drawable mesh. Bind groups are cheap clones of the per-mesh
/// component state, so the draw lists borrow nothing from the ECS worlds
/// while a pass is recording.
pub(crate) struct DrawMesh {
    pub geometry: Handle<Geometry>,
    pub material: MaterialId,
    pub mesh_bind_group: wgpu::BindGroup,
}
