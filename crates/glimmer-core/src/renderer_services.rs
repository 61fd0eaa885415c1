//! Callback interface from shaders back into the renderer
//!
//! The shading system never knows how the embedding renderer stores its
//! transforms or which optional features it implements; it asks through a
//! [`RendererServices`] object supplied at construction. Every method has a
//! conservative default, so an embedder overrides only what it needs.

use std::os::raw::c_void;

use crate::globals::ShaderGlobals;
use crate::math::Matrix44;

/// Opaque token identifying a transformation to `get_matrix`.
///
/// The library never dereferences it; it round-trips from the renderer's
/// `ShaderGlobals` fields (`object2common`, `shader2common`) back into the
/// renderer's own `get_matrix`.
pub type TransformationPtr = *const c_void;

/// Renderer-side services the shading system may call during execution.
///
/// `sg` is passed as a raw pointer on purpose: it crosses the ABI unchanged,
/// may be null, and the callee decides whether to look inside. Methods may be
/// invoked from any thread that executes shaders.
pub trait RendererServices: Send + Sync {
    /// Does the renderer support the named feature? Zero means no; the
    /// meaning of nonzero values is feature-specific.
    fn supports(&self, _feature: &str) -> i32 {
        0
    }

    /// Produce the matrix for the given transformation token, returning
    /// whether one was available. The default knows no transforms and
    /// leaves `result` untouched.
    fn get_matrix(
        &self,
        _sg: *mut ShaderGlobals,
        _result: &mut Matrix44,
        _xform: TransformationPtr,
    ) -> bool {
        false
    }
}

/// The stock renderer services: every query answers with the trait default.
pub struct BaseRendererServices;

impl RendererServices for BaseRendererServices {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let rs = BaseRendererServices;
        assert_eq!(rs.supports("texture"), 0);

        let mut m = Matrix44::scale(3.0);
        let before = m;
        assert!(!rs.get_matrix(std::ptr::null_mut(), &mut m, std::ptr::null()));
        assert_eq!(m, before);
    }
}
