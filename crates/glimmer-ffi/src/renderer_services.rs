//! Renderer-services bridge
//!
//! The core library asks the renderer questions through the
//! [`RendererServices`] trait. Foreign embedders cannot implement a Rust
//! trait, so this bridge holds a table of optional function pointers, one
//! per bridged method, plus one opaque context pointer that is passed to
//! every call and never dereferenced here. A slot left null falls through
//! to the library's default implementation, so an embedder overrides
//! exactly the subset it needs.
//!
//! The bridge is a passive dispatcher with no state machine: create,
//! configure freely, hand to a shading system, destroy. Callbacks may be
//! invoked from any thread the shading system executes on and must be
//! thread-safe on the embedder's side.

use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_void};
use std::sync::Arc;

use parking_lot::RwLock;

use glimmer_core::{
    BaseRendererServices, Matrix44 as CoreMatrix44, RendererServices, ShaderGlobals,
    TransformationPtr,
};

use crate::handles::{RendererServicesPtr, RendererServicesWrapperPtr, ShaderGlobalsPtr};
use crate::types::Matrix44;

/// Override for `supports`: `(context, feature) -> int`.
pub type SupportsFn = extern "C" fn(object: *mut c_void, feature: *const c_char) -> c_int;

/// Override for `get_matrix`:
/// `(context, shader globals, out matrix, transformation token) -> bool`.
pub type GetMatrixFn = extern "C" fn(
    object: *mut c_void,
    sg: ShaderGlobalsPtr,
    result: *mut Matrix44,
    xform: *const c_void,
) -> c_int;

struct Slots {
    object: *mut c_void,
    supports: Option<SupportsFn>,
    get_matrix: Option<GetMatrixFn>,
}

/// Bridge object behind [`RendererServicesWrapperPtr`] handles.
pub struct RendererServicesBridge {
    slots: RwLock<Slots>,
}

// The opaque context pointer is never dereferenced by the shim; the
// embedder guarantees whatever it points at tolerates the host's threading.
unsafe impl Send for RendererServicesBridge {}
unsafe impl Sync for RendererServicesBridge {}

impl RendererServicesBridge {
    fn new() -> RendererServicesBridge {
        RendererServicesBridge {
            slots: RwLock::new(Slots {
                object: std::ptr::null_mut(),
                supports: None,
                get_matrix: None,
            }),
        }
    }
}

impl RendererServices for RendererServicesBridge {
    fn supports(&self, feature: &str) -> i32 {
        let slots = self.slots.read();
        match slots.supports {
            Some(callback) => {
                let Ok(c_feature) = CString::new(feature) else {
                    return BaseRendererServices.supports(feature);
                };
                callback(slots.object, c_feature.as_ptr())
            }
            None => BaseRendererServices.supports(feature),
        }
    }

    fn get_matrix(
        &self,
        sg: *mut ShaderGlobals,
        result: &mut CoreMatrix44,
        xform: TransformationPtr,
    ) -> bool {
        let slots = self.slots.read();
        match slots.get_matrix {
            Some(callback) => {
                // Layout-asserted mirror: the out-matrix crosses as a cast.
                let out = result as *mut CoreMatrix44 as *mut Matrix44;
                callback(slots.object, sg, out, xform) != 0
            }
            None => BaseRendererServices.get_matrix(sg, result, xform),
        }
    }
}

/// Create a bare renderer-services instance that answers every query with
/// the library default. Useful as a baseline or when the embedder needs no
/// overrides at all.
#[no_mangle]
pub extern "C" fn glim_renderer_services_create() -> RendererServicesPtr {
    Box::into_raw(Box::new(BaseRendererServices))
}

/// # Safety
///
/// `rs` must be a live handle from [`glim_renderer_services_create`],
/// destroyed exactly once.
#[no_mangle]
pub unsafe extern "C" fn glim_renderer_services_destroy(rs: RendererServicesPtr) {
    drop(Box::from_raw(rs));
}

/// Create an empty bridge: no context, every slot null.
#[no_mangle]
pub extern "C" fn glim_renderer_services_wrapper_create() -> RendererServicesWrapperPtr {
    tracing::debug!("creating renderer-services bridge");
    Arc::into_raw(Arc::new(RendererServicesBridge::new()))
}

/// Release the caller's reference. A shading system created over this
/// bridge keeps its own.
///
/// # Safety
///
/// `rsw` must be a live handle from
/// [`glim_renderer_services_wrapper_create`], released exactly once.
#[no_mangle]
pub unsafe extern "C" fn glim_renderer_services_wrapper_destroy(rsw: RendererServicesWrapperPtr) {
    drop(Arc::from_raw(rsw));
}

/// Store the opaque context passed to every bridged callback. The shim
/// never dereferences it.
///
/// # Safety
///
/// `rsw` must be a live bridge handle.
#[no_mangle]
pub unsafe extern "C" fn glim_renderer_services_wrapper_set_object(
    rsw: RendererServicesWrapperPtr,
    object: *mut c_void,
) {
    (*rsw).slots.write().object = object;
}

/// Install (or, with null, clear) the `supports` override.
///
/// # Safety
///
/// `rsw` must be a live bridge handle.
#[no_mangle]
pub unsafe extern "C" fn glim_renderer_services_wrapper_setfn_supports(
    rsw: RendererServicesWrapperPtr,
    supports: Option<SupportsFn>,
) {
    (*rsw).slots.write().supports = supports;
}

/// Install (or, with null, clear) the `get_matrix` override.
///
/// # Safety
///
/// `rsw` must be a live bridge handle.
#[no_mangle]
pub unsafe extern "C" fn glim_renderer_services_wrapper_setfn_get_matrix(
    rsw: RendererServicesWrapperPtr,
    get_matrix: Option<GetMatrixFn>,
) {
    (*rsw).slots.write().get_matrix = get_matrix;
}
