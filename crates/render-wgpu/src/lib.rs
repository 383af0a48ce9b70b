//! wgpu render backend for the shooting gallery.
//!
//! Renders a grid floor, one instanced box per target, and the
//! view-model gun with recoil offset and muzzle-flash tint.
//!
//! # Invariants
//! - The renderer never mutates session state.
//! - The camera is shell-owned; the session only sees its ray.

mod camera;
mod gpu;
mod shaders;

pub use camera::FpsCamera;
pub use gpu::GalleryRenderer;
