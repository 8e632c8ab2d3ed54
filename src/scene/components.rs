// scene/components.rs
// Pure hecs components - no custom entity system

use crate::math::Aabb;
use crate::renderer::{Geometry, Handle, MaterialId};
use crate::scene::Transform;
use glam::{Mat4, Vec3};

/// Local transform component (position, rotation, scale)
#[derive(Debug, Clone, Copy)]
pub struct TransformComponent(pub Transform);

/// World matrix computed from the hierarchy each frame
#[derive(Debug, Clone, Copy)]
pub struct WorldMatrix(pub Mat4);

/// World-space bounds, refreshed from the geometry AABB before culling
#[derive(Debug, Clone, Copy)]
pub struct WorldBounds(pub Aabb);

/// Renderable mesh: geometry handle plus the material it draws with
#[derive(Debug, Clone, Copy)]
pub struct MeshComponent {
    pub geometry: Handle<Geometry>,
    pub material: MaterialId,
}

/// Visibility component
#[derive(Debug, Clone, Copy)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

/// Directional light component. The direction is authored directly rather
/// than derived from the transform.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

/// Spot light component. Position and direction come from the entity's world
/// matrix; angles are half-angles in radians.
#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    pub inner_angle: f32,
    pub outer_angle: f32,
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Parent entity reference
#[derive(Debug, Clone, Copy)]
pub struct Parent(pub hecs::Entity);

/// Child entity list
#[derive(Debug, Clone, Default)]
pub struct Children(pub Vec<hecs::Entity>);
