//! GPU-side data: vertex buffers and textures.
//!
//! - `model`: vertex layout and uploaded mesh buffers
//! - `texture`: textures, samplers and fallbacks

pub mod model;
pub mod texture;
