pub mod aabb;
pub mod frustum;

pub use aabb::Aabb;
pub use frustum::{aabb_in_frustum, frustum_planes, Plane};
