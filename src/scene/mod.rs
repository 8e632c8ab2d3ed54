// scene/mod.rs

pub mod camera;
pub mod components;
pub(crate) mod hierarchy;
pub mod scene;
pub mod transform;

pub use camera::Camera;
pub use scene::{Scene, World};
pub use transform::Transform;

pub use components::{
    Children, DirectionalLight, MeshComponent, Name, Parent, SpotLight, TransformComponent,
    Visible, WorldBounds, WorldMatrix,
};
