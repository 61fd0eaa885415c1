//! Opaque handle types and pointer plumbing
//!
//! Every object the foreign caller sees is one of these raw pointers. The
//! shim performs no validation: handles are non-null and live by contract,
//! exactly as the underlying library expects of its own embedders.
//!
//! Two ownership shapes are used:
//!
//! - `Box`-backed handles (shading system, base renderer services, thread
//!   info, context, image buffer, group holder): created by `Box::into_raw`
//!   in a create entry point, reclaimed by `Box::from_raw` in the matching
//!   destroy entry point.
//! - `Arc`-backed handles (the two bridges): the caller holds one strong
//!   reference; any shading system created over the bridge holds another,
//!   so destroy order between the system and its bridges is free.

use std::borrow::Cow;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::Arc;

use glimmer_core::{
    BaseRendererServices, ImageBuf, PerThreadInfo, ShaderGlobals, ShaderSymbol, ShadingContext,
    ShadingSystem, TextureSystem,
};

use crate::error_handler::ErrorHandlerBridge;
use crate::group::ShaderGroupHolder;
use crate::renderer_services::RendererServicesBridge;

pub type ShadingSystemPtr = *mut ShadingSystem;
pub type RendererServicesPtr = *mut BaseRendererServices;
pub type RendererServicesWrapperPtr = *const RendererServicesBridge;
pub type ErrorHandlerPtr = *const ErrorHandlerBridge;
pub type TextureSystemPtr = *mut TextureSystem;
pub type ShaderGlobalsPtr = *mut ShaderGlobals;
pub type PerThreadInfoPtr = *mut PerThreadInfo;
pub type ShadingContextPtr = *mut ShadingContext;
/// Not owned by the caller; lifetime is tied to the shader group.
pub type ShaderSymbolPtr = *const ShaderSymbol;
pub type ImageBufPtr = *mut ImageBuf;
pub type ShaderGroupRefPtr = *mut ShaderGroupHolder;

/// Borrow an `Arc`-backed handle as a fresh strong reference.
///
/// # Safety
///
/// `ptr` must have come from `Arc::into_raw` and still be live.
pub(crate) unsafe fn clone_arc<T>(ptr: *const T) -> Arc<T> {
    Arc::increment_strong_count(ptr);
    Arc::from_raw(ptr)
}

/// View a borrowed C string. Invalid UTF-8 is replaced, never rejected;
/// the underlying library treats names as opaque text.
///
/// # Safety
///
/// `ptr` must be non-null and null-terminated.
pub(crate) unsafe fn cstr<'a>(ptr: *const c_char) -> Cow<'a, str> {
    CStr::from_ptr(ptr).to_string_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_arc_leaves_the_original_alive() {
        let original = Arc::new(41u64);
        let raw = Arc::into_raw(original);
        let borrowed = unsafe { clone_arc(raw) };
        assert_eq!(*borrowed, 41);
        assert_eq!(Arc::strong_count(&borrowed), 2);
        drop(borrowed);
        let original = unsafe { Arc::from_raw(raw) };
        assert_eq!(Arc::strong_count(&original), 1);
    }

    #[test]
    fn cstr_borrows_valid_utf8() {
        let s = std::ffi::CString::new("searchpath:shader").unwrap();
        let view = unsafe { cstr(s.as_ptr()) };
        assert_eq!(view, "searchpath:shader");
    }
}
