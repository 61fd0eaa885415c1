//! # Glimmer FFI
//!
//! Flat C ABI over the Glimmer shading library
//!
//! This crate exposes the shading system to foreign callers as a set of
//! `extern "C"` entry points over opaque pointer handles. It is a thin
//! adapter: no locking, no caching, no semantics of its own. Everything a
//! caller can observe through this surface is the underlying library's
//! behavior.
//!
//! ## Architecture
//!
//! - **Opaque handles** — raw pointers to library objects; create/destroy
//!   pairs own them ([`handles`])
//! - **POD mirrors** — layout-identical `#[repr(C)]` value types crossing
//!   the boundary by cast, never by copy ([`types`])
//! - **Callback bridges** — the renderer-services and error-handler traits
//!   implemented over caller-supplied function pointers
//!   ([`renderer_services`], [`error_handler`])
//! - **Entry points** — one flat function per library operation, prefixed
//!   `glim_` ([`shading_system`], [`group`], [`image`])
//!
//! Handles are non-null and live by contract; the shim validates nothing
//! the underlying library would not. No panic crosses the boundary under
//! the documented contracts.

mod error_handler;
mod group;
mod handles;
mod image;
mod renderer_services;
mod shading_system;
mod types;

pub use error_handler::{
    glim_error_handler_create, glim_error_handler_destroy, glim_error_handler_get_verbosity,
    glim_error_handler_set_verbosity, ErrorHandlerBridge, ErrorHandlerFn,
};
pub use group::{glim_shader_group_release, ShaderGroupHolder};
pub use handles::{
    ErrorHandlerPtr, ImageBufPtr, PerThreadInfoPtr, RendererServicesPtr,
    RendererServicesWrapperPtr, ShaderGlobalsPtr, ShaderGroupRefPtr, ShaderSymbolPtr,
    ShadingContextPtr, ShadingSystemPtr, TextureSystemPtr,
};
pub use image::{
    glim_image_buf_create, glim_image_buf_data, glim_image_buf_destroy, glim_image_buf_roi,
    glim_shade_image,
};
pub use renderer_services::{
    glim_renderer_services_create, glim_renderer_services_destroy,
    glim_renderer_services_wrapper_create, glim_renderer_services_wrapper_destroy,
    glim_renderer_services_wrapper_set_object, glim_renderer_services_wrapper_setfn_get_matrix,
    glim_renderer_services_wrapper_setfn_supports, GetMatrixFn, RendererServicesBridge, SupportsFn,
};
pub use shading_system::{
    glim_shading_system_attribute, glim_shading_system_create,
    glim_shading_system_create_thread_info, glim_shading_system_create_with_error_handler,
    glim_shading_system_destroy, glim_shading_system_destroy_thread_info,
    glim_shading_system_execute, glim_shading_system_find_symbol,
    glim_shading_system_get_context, glim_shading_system_group_attribute,
    glim_shading_system_group_begin, glim_shading_system_group_end,
    glim_shading_system_register_closure, glim_shading_system_release_context,
    glim_shading_system_shader, glim_shading_system_symbol_address,
    glim_shading_system_symbol_typedesc,
};
pub use types::{ClosureParam, Matrix44, Roi, TypeDesc};

// Severity and verbosity values are shared with the core verbatim.
pub use glimmer_core::{errcode, verbosity};

/// Get the version of the glimmer-ffi library
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
