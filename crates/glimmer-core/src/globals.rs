//! Per-point shading state
//!
//! [`ShaderGlobals`] is the record the renderer fills in for each point to
//! be shaded. It serves two purposes: it carries the values of the "global"
//! variables a shader can read (P, N, u, v, ...), and it smuggles opaque
//! renderer state through the library so that
//! [`RendererServices`](crate::RendererServices) callbacks can find their
//! way back to the renderer's own data.
//!
//! The struct is `#[repr(C)]` and its field order is ABI: embedders on the
//! far side of the C boundary declare an identical record and pass a pointer.

use std::ffi::c_void;

use crate::context::ShadingContext;
use crate::math::Vec3f;

/// Placeholder for a closure tree produced by shader execution.
///
/// Closure evaluation is out of scope; the type exists so that the `Ci`
/// slot in [`ShaderGlobals`] has the pointer shape embedders expect.
#[repr(C)]
pub struct ClosureColor {
    _private: [u8; 0],
}

/// State describing one point to be shaded.
///
/// All fields are filled in by the renderer before
/// [`ShadingSystem::execute`](crate::ShadingSystem::execute); not every
/// field is meaningful for every shader. Points, vectors and normals are in
/// "common" space. `Default` zeroes everything, which is a valid starting
/// record.
#[repr(C)]
#[derive(Clone)]
#[allow(non_snake_case)]
pub struct ShaderGlobals {
    /// Surface position and its x/y differentials.
    pub P: Vec3f,
    pub dPdx: Vec3f,
    pub dPdy: Vec3f,
    /// P's z differential, used for volume shading only.
    pub dPdz: Vec3f,

    /// Incident ray and its differentials.
    pub I: Vec3f,
    pub dIdx: Vec3f,
    pub dIdy: Vec3f,

    /// Shading normal, already front-facing.
    pub N: Vec3f,
    /// True geometric normal.
    pub Ng: Vec3f,

    /// 2D surface parameter u and its differentials.
    pub u: f32,
    pub dudx: f32,
    pub dudy: f32,
    /// 2D surface parameter v and its differentials.
    pub v: f32,
    pub dvdx: f32,
    pub dvdy: f32,

    /// Surface tangents: derivative of P with respect to u and v.
    pub dPdu: Vec3f,
    pub dPdv: Vec3f,

    /// Time of this shading sample, and the frame's time interval.
    pub time: f32,
    pub dtime: f32,
    /// Velocity: derivative of P with respect to time.
    pub dPdtime: Vec3f,

    /// For lights: the point being illuminated, with differentials.
    pub Ps: Vec3f,
    pub dPsdx: Vec3f,
    pub dPsdy: Vec3f,

    /// Opaque renderer pointers, never inspected by the library. They are
    /// handed back to the renderer through RendererServices callbacks.
    pub renderstate: *const c_void,
    pub tracedata: *const c_void,
    pub objdata: *const c_void,

    /// Back-pointer to the executing context. Set by the library during
    /// execution; renderers must not touch it.
    pub context: *mut ShadingContext,

    /// Back-pointer to the renderer-services object, stored as an opaque
    /// pointer so the record stays plain data.
    pub renderer: *const c_void,

    /// Transformation tokens consumed by `get_matrix`.
    pub object2common: *const c_void,
    pub shader2common: *const c_void,

    /// Output closure slot. The renderer zeroes it before execution and
    /// reads it back afterwards.
    pub Ci: *mut ClosureColor,

    /// Surface area of the emissive object, for light shaders.
    pub surfacearea: f32,

    /// Bit field of ray type flags.
    pub raytype: i32,

    /// Nonzero flips the result of calculatenormal().
    pub flipHandedness: i32,

    /// Nonzero when shading the back side of a surface.
    pub backfacing: i32,
}

impl Default for ShaderGlobals {
    fn default() -> Self {
        ShaderGlobals {
            P: Vec3f::ZERO,
            dPdx: Vec3f::ZERO,
            dPdy: Vec3f::ZERO,
            dPdz: Vec3f::ZERO,
            I: Vec3f::ZERO,
            dIdx: Vec3f::ZERO,
            dIdy: Vec3f::ZERO,
            N: Vec3f::ZERO,
            Ng: Vec3f::ZERO,
            u: 0.0,
            dudx: 0.0,
            dudy: 0.0,
            v: 0.0,
            dvdx: 0.0,
            dvdy: 0.0,
            dPdu: Vec3f::ZERO,
            dPdv: Vec3f::ZERO,
            time: 0.0,
            dtime: 0.0,
            dPdtime: Vec3f::ZERO,
            Ps: Vec3f::ZERO,
            dPsdx: Vec3f::ZERO,
            dPsdy: Vec3f::ZERO,
            renderstate: std::ptr::null(),
            tracedata: std::ptr::null(),
            objdata: std::ptr::null(),
            context: std::ptr::null_mut(),
            renderer: std::ptr::null(),
            object2common: std::ptr::null(),
            shader2common: std::ptr::null(),
            Ci: std::ptr::null_mut(),
            surfacearea: 0.0,
            raytype: 0,
            flipHandedness: 0,
            backfacing: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_zeroed() {
        let sg = ShaderGlobals::default();
        assert_eq!(sg.P, Vec3f::ZERO);
        assert_eq!(sg.u, 0.0);
        assert!(sg.renderstate.is_null());
        assert!(sg.Ci.is_null());
        assert_eq!(sg.raytype, 0);
    }
}
