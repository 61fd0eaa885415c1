//! # glimmer-core - Shader Group Compilation and Execution
//!
//! Glimmer is a small shading library: an embedding renderer describes a
//! *shader group* (an ordered set of shader layers), finalizes it, and then
//! executes it for one shaded point at a time or for a whole image.
//!
//! ## Architecture
//!
//! ```text
//! ShadingSystem
//!   ├─ RendererServices (trait) ── callbacks back into the renderer
//!   ├─ ErrorHandler (trait) ────── sink for diagnostics
//!   └─ ShaderGroup (Arc) ───────── layers + finalized symbol layout
//!         ↓ executed in
//!      ShadingContext ──────────── per-execution heap, one per thread
//! ```
//!
//! The shading system is shared across threads. Each renderer thread creates
//! one [`PerThreadInfo`], obtains a [`ShadingContext`] from it, and runs
//! [`ShadingSystem::execute`] against its own [`ShaderGlobals`] record.
//! Output values are looked up by name ([`ShadingSystem::find_symbol`]) and
//! read out of the context heap after execution.
//!
//! [`shade_image`] wraps the per-point flow for a whole [`ImageBuf`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use glimmer_core::{BaseRendererServices, ShaderGlobals, ShadingSystem};
//!
//! let ss = ShadingSystem::new(Arc::new(BaseRendererServices), None, None);
//! let group = ss.shader_group_begin("g");
//! assert!(ss.shader(&group, "surface", "uv", "layer0"));
//! ss.shader_group_end(&group);
//!
//! let tinfo = ss.create_thread_info();
//! let mut ctx = ss.get_context(&tinfo);
//! let mut sg = ShaderGlobals::default();
//! sg.u = 0.25;
//! assert!(ss.execute(&mut ctx, &group, &sg, true));
//!
//! let sym = ss.find_symbol(&group, "Cout").unwrap();
//! let addr = ss.symbol_address(&ctx, sym).unwrap();
//! let r = unsafe { *(addr.as_ptr() as *const f32) };
//! assert_eq!(r, 0.25);
//! ```

pub mod closure;
pub mod context;
pub mod error;
pub mod errorhandler;
pub mod globals;
pub mod group;
pub mod imagebuf;
pub mod math;
pub mod renderer_services;
pub mod shade_image;
pub mod shading_system;
pub(crate) mod shaders;
pub mod texture;
pub mod typedesc;

pub use closure::ClosureParamDef;
pub use context::{PerThreadInfo, ShadingContext};
pub use error::{Error, Result};
pub use errorhandler::{errcode, verbosity, DefaultErrorHandler, ErrorHandler};
pub use globals::{ClosureColor, ShaderGlobals};
pub use group::{ShaderGroup, ShaderSymbol};
pub use imagebuf::{ImageBuf, Roi};
pub use math::{Matrix44, Vec3f};
pub use renderer_services::{BaseRendererServices, RendererServices, TransformationPtr};
pub use shade_image::{shade_image, SHADE_PIXEL_CENTERS, SHADE_PIXEL_GRID};
pub use shading_system::ShadingSystem;
pub use texture::TextureSystem;
pub use typedesc::TypeDesc;
