// renderer/material.rs

use super::assets::Handle;
use super::texture::Texture;

/// Identity key for a material. Authoring the same description twice yields
/// two ids and therefore two pipeline cache entries.
pub type MaterialId = Handle<Material>;

/// Which render pass a pipeline is specialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Geometry,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

/// Optional WGSL fragments substituted into the base shader when the
/// pipeline is specialized. `albedo` replaces the default albedo function;
/// `uniforms` is inserted at the declaration marker.
#[derive(Debug, Clone, Default)]
pub struct ShaderHooks {
    pub albedo: Option<String>,
    pub uniforms: Option<String>,
}

/// Closed set of material kinds. There is no open subclassing; pass
/// specialization matches on the tag.
pub enum MaterialKind {
    Pbr {
        albedo: Handle<Texture>,
        normal: Option<Handle<Texture>>,
        metal_roughness: Option<Handle<Texture>>,
    },
    Basic {
        color: [f32; 4],
    },
    /// Complete per-pass shader sources. A pass with no source simply cannot
    /// draw this material.
    Custom {
        geometry_source: Option<String>,
        forward_source: Option<String>,
    },
}

pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub pass: PassKind,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub opacity: f32,
    pub hooks: ShaderHooks,
}

impl Material {
    pub fn pbr(name: impl Into<String>, albedo: Handle<Texture>) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Pbr {
                albedo,
                normal: None,
                metal_roughness: None,
            },
            pass: PassKind::Geometry,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            opacity: 1.0,
            hooks: ShaderHooks::default(),
        }
    }

    pub fn basic(name: impl Into<String>, color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Basic { color },
            pass: PassKind::Geometry,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            opacity: 1.0,
            hooks: ShaderHooks::default(),
        }
    }

    pub fn custom(
        name: impl Into<String>,
        geometry_source: Option<String>,
        forward_source: Option<String>,
    ) -> Self {
        let pass = if geometry_source.is_some() {
            PassKind::Geometry
        } else {
            PassKind::Forward
        };
        Self {
            name: name.into(),
            kind: MaterialKind::Custom {
                geometry_source,
                forward_source,
            },
            pass,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            opacity: 1.0,
            hooks: ShaderHooks::default(),
        }
    }

    pub fn with_normal(mut self, texture: Handle<Texture>) -> Self {
        if let MaterialKind::Pbr { normal, .. } = &mut self.kind {
            *normal = Some(texture);
        } else {
            log::warn!("Normal map ignored on non-PBR material {}", self.name);
        }
        self
    }

    pub fn with_metal_roughness(mut self, texture: Handle<Texture>) -> Self {
        if let MaterialKind::Pbr {
            metal_roughness, ..
        } = &mut self.kind
        {
            *metal_roughness = Some(texture);
        } else {
            log::warn!("Metal/roughness map ignored on non-PBR material {}", self.name);
        }
        self
    }

    pub fn with_alpha_mask(mut self, cutoff: f32) -> Self {
        self.alpha_mode = AlphaMode::Mask;
        self.alpha_cutoff = cutoff;
        self
    }

    /// Blended materials render in the forward pass with premultiplied-over
    /// blending and no depth writes.
    pub fn with_alpha_blend(mut self, opacity: f32) -> Self {
        self.alpha_mode = AlphaMode::Blend;
        self.opacity = opacity;
        self.pass = PassKind::Forward;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub fn with_hooks(mut self, hooks: ShaderHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Whether this material can produce a pipeline for the given pass.
    pub fn supports_pass(&self, pass: PassKind) -> bool {
        match &self.kind {
            MaterialKind::Custom {
                geometry_source,
                forward_source,
            } => match pass {
                PassKind::Geometry => geometry_source.is_some(),
                PassKind::Forward => forward_source.is_some(),
            },
            _ => self.pass == pass,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.alpha_mode == AlphaMode::Blend
    }
}
