pub mod assets;
pub(crate) mod context;
pub mod csm;
pub(crate) mod gbuffer;
pub mod geometry;
pub(crate) mod layouts;
pub mod lights;
pub mod material;
pub(crate) mod material_pipelines;
pub(crate) mod passes;
pub(crate) mod pipeline_builder;
pub mod renderer_core;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use assets::{AssetCache, Assets, Handle};
pub use geometry::{cube_data, plane_data, Geometry};
pub use material::{AlphaMode, Material, MaterialId, MaterialKind, PassKind, ShaderHooks};
pub use passes::LIGHTING_FORMAT;
pub use renderer_core::{Renderer, RendererStats};
pub use texture::Texture;
pub use uniforms::{CameraUniform, MeshUniform, MeshUniforms, SceneUniform};
pub use vertex::Vertex;
