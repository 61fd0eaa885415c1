//! Shading-system entry points
//!
//! The flat `extern "C"` surface over [`ShadingSystem`]. Every function
//! takes the system handle first and forwards to the corresponding core
//! method with at most a pointer cast or a C-string view in between; no
//! entry point adds locking, validation, or semantics of its own.
//!
//! Attribute values cross as `(TypeDesc, const void*)` pairs exactly as
//! the caller built them. The shim never decodes them; the core does.

use std::os::raw::{c_char, c_int, c_void};
use std::sync::Arc;

use glimmer_core::{ClosureParamDef, ErrorHandler, RendererServices, ShadingSystem};

use crate::group::ShaderGroupHolder;
use crate::handles::{
    clone_arc, cstr, ErrorHandlerPtr, PerThreadInfoPtr, RendererServicesWrapperPtr,
    ShaderGlobalsPtr, ShaderGroupRefPtr, ShaderSymbolPtr, ShadingContextPtr, ShadingSystemPtr,
};
use crate::types::{ClosureParam, TypeDesc};

// TODO: accept a texture-system handle here once glimmer-core gives
// TextureSystem a real lookup path; until then every system is built
// without one.
fn build(
    rsw: RendererServicesWrapperPtr,
    error_handler: Option<Arc<dyn ErrorHandler>>,
) -> ShadingSystemPtr {
    let renderer = unsafe { clone_arc(rsw) } as Arc<dyn RendererServices>;
    Box::into_raw(Box::new(ShadingSystem::new(renderer, None, error_handler)))
}

/// Create a shading system over the renderer-services bridge. Diagnostics
/// go to the library's default handler.
///
/// # Safety
///
/// `rsw` must be a live bridge handle. The system holds its own reference
/// to it, so the caller may destroy `rsw` in either order.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_create(
    rsw: RendererServicesWrapperPtr,
) -> ShadingSystemPtr {
    build(rsw, None)
}

/// Like [`glim_shading_system_create`], with diagnostics routed through the
/// error-handler bridge.
///
/// # Safety
///
/// `rsw` and `eh` must be live bridge handles; the system references both.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_create_with_error_handler(
    rsw: RendererServicesWrapperPtr,
    eh: ErrorHandlerPtr,
) -> ShadingSystemPtr {
    build(rsw, Some(clone_arc(eh) as Arc<dyn ErrorHandler>))
}

/// # Safety
///
/// `ss` must be a live handle from a create entry point, destroyed exactly
/// once, after every context and thread info it issued.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_destroy(ss: ShadingSystemPtr) {
    drop(Box::from_raw(ss));
}

/// Set a global attribute. Returns whether it was recognized and applied.
///
/// # Safety
///
/// `ss` live; `name` null-terminated; `val` points to a value of the shape
/// `typedesc` describes.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_attribute(
    ss: ShadingSystemPtr,
    name: *const c_char,
    typedesc: TypeDesc,
    val: *const c_void,
) -> bool {
    (*ss).attribute(&cstr(name), typedesc.into_core(), val)
}

/// Set a group-scoped attribute.
///
/// # Safety
///
/// `ss` and `group` live; `name` null-terminated; `val` as for
/// [`glim_shading_system_attribute`].
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_group_attribute(
    ss: ShadingSystemPtr,
    group: ShaderGroupRefPtr,
    name: *const c_char,
    typedesc: TypeDesc,
    val: *const c_void,
) -> bool {
    (*ss).group_attribute(&(*group).group, &cstr(name), typedesc.into_core(), val)
}

/// Register a closure. `params` is an array terminated by an entry with a
/// zeroed typedesc and a null key; the terminator is not part of the
/// layout.
///
/// # Safety
///
/// `ss` live; `name` null-terminated; `params` non-null, terminated as
/// described, each `key` null or null-terminated.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_register_closure(
    ss: ShadingSystemPtr,
    name: *const c_char,
    id: c_int,
    params: *const ClosureParam,
) {
    let mut defs = Vec::new();
    let mut cursor = params;
    loop {
        let param = *cursor;
        if param.typedesc.is_terminator() && param.key.is_null() {
            break;
        }
        defs.push(ClosureParamDef {
            typedesc: param.typedesc.into_core(),
            offset: param.offset as usize,
            key: if param.key.is_null() {
                None
            } else {
                Some(cstr(param.key).into_owned())
            },
            field_size: param.field_size as usize,
        });
        cursor = cursor.add(1);
    }
    (*ss).register_closure(&cstr(name), id, &defs);
}

/// Begin an empty shader group and hand the caller a holder for it.
///
/// # Safety
///
/// `ss` live; `groupname` null-terminated. Release the returned handle
/// with `glim_shader_group_release`.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_group_begin(
    ss: ShadingSystemPtr,
    groupname: *const c_char,
) -> ShaderGroupRefPtr {
    ShaderGroupHolder::new((*ss).shader_group_begin(&cstr(groupname)))
}

/// Finalize the group. No layers may be added afterwards.
///
/// # Safety
///
/// `ss` and `group` live.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_group_end(
    ss: ShadingSystemPtr,
    group: ShaderGroupRefPtr,
) {
    (*ss).shader_group_end(&(*group).group);
}

/// Append a shader layer. Returns false, with a diagnostic, on unknown
/// shader, unsupported usage, or a finalized group.
///
/// # Safety
///
/// `ss` and `group` live; the three strings null-terminated.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_shader(
    ss: ShadingSystemPtr,
    group: ShaderGroupRefPtr,
    shaderusage: *const c_char,
    shadername: *const c_char,
    layername: *const c_char,
) -> bool {
    (*ss).shader(
        &(*group).group,
        &cstr(shaderusage),
        &cstr(shadername),
        &cstr(layername),
    )
}

/// Create per-thread state. One per renderer thread; never shared.
///
/// # Safety
///
/// `ss` live. Destroy the result with
/// [`glim_shading_system_destroy_thread_info`] before `ss`.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_create_thread_info(
    ss: ShadingSystemPtr,
) -> PerThreadInfoPtr {
    Box::into_raw((*ss).create_thread_info())
}

/// # Safety
///
/// `ss` live; `tinfo` from [`glim_shading_system_create_thread_info`],
/// destroyed exactly once, after its contexts are released.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_destroy_thread_info(
    ss: ShadingSystemPtr,
    tinfo: PerThreadInfoPtr,
) {
    (*ss).destroy_thread_info(Box::from_raw(tinfo));
}

/// Get a shading context from this thread's info. One context shades any
/// number of points.
///
/// # Safety
///
/// `ss` and `tinfo` live; use the context only on `tinfo`'s thread.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_get_context(
    ss: ShadingSystemPtr,
    tinfo: PerThreadInfoPtr,
) -> ShadingContextPtr {
    Box::into_raw((*ss).get_context(&*tinfo))
}

/// # Safety
///
/// `ss` live; `context` from [`glim_shading_system_get_context`], released
/// exactly once.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_release_context(
    ss: ShadingSystemPtr,
    context: ShadingContextPtr,
) {
    (*ss).release_context(Box::from_raw(context));
}

/// Execute the group against one shading point. With `run` false the
/// context is only bound to the group, which resolves symbol addresses
/// without evaluating any layer.
///
/// # Safety
///
/// `ss`, `ctx`, `group` live; `sg` points to a live globals record for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_execute(
    ss: ShadingSystemPtr,
    ctx: ShadingContextPtr,
    group: ShaderGroupRefPtr,
    sg: ShaderGlobalsPtr,
    run: bool,
) -> bool {
    (*ss).execute(&mut *ctx, &(*group).group, &*sg, run)
}

/// Look up an output symbol by name or `"layer.symbol"`. Null when the
/// group is not finalized or the symbol does not exist. The returned
/// pointer stays valid as long as the group does and is never freed by the
/// caller.
///
/// # Safety
///
/// `ss` and `group` live; `symbolname` null-terminated.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_find_symbol(
    ss: ShadingSystemPtr,
    group: ShaderGroupRefPtr,
    symbolname: *const c_char,
) -> ShaderSymbolPtr {
    match (*ss).find_symbol(&(*group).group, &cstr(symbolname)) {
        Some(symbol) => symbol as ShaderSymbolPtr,
        None => std::ptr::null(),
    }
}

/// # Safety
///
/// `ss` live; `symbol` from [`glim_shading_system_find_symbol`], non-null.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_symbol_typedesc(
    ss: ShadingSystemPtr,
    symbol: ShaderSymbolPtr,
) -> TypeDesc {
    TypeDesc::from_core((*ss).symbol_typedesc(&*symbol))
}

/// Address of the symbol's value after the context's most recent
/// execution, or null if the context is not bound to the symbol's group.
/// Valid until the context executes again or is released.
///
/// # Safety
///
/// `ss`, `ctx` live; `symbol` non-null and from the bound group.
#[no_mangle]
pub unsafe extern "C" fn glim_shading_system_symbol_address(
    ss: ShadingSystemPtr,
    ctx: ShadingContextPtr,
    symbol: ShaderSymbolPtr,
) -> *const c_void {
    match (*ss).symbol_address(&*ctx, &*symbol) {
        Some(addr) => addr.as_ptr() as *const c_void,
        None => std::ptr::null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer_services::glim_renderer_services_wrapper_create;
    use crate::renderer_services::glim_renderer_services_wrapper_destroy;
    use std::ffi::CString;

    fn new_system() -> (ShadingSystemPtr, RendererServicesWrapperPtr) {
        let rsw = glim_renderer_services_wrapper_create();
        let ss = unsafe { glim_shading_system_create(rsw) };
        (ss, rsw)
    }

    unsafe fn teardown(ss: ShadingSystemPtr, rsw: RendererServicesWrapperPtr) {
        glim_shading_system_destroy(ss);
        glim_renderer_services_wrapper_destroy(rsw);
    }

    #[test]
    fn attribute_round_trip_through_the_abi() {
        let (ss, rsw) = new_system();
        let name = CString::new("exec_repeat").unwrap();
        let two: c_int = 2;
        let ok = unsafe {
            glim_shading_system_attribute(
                ss,
                name.as_ptr(),
                TypeDesc::from_core(glimmer_core::TypeDesc::INT),
                &two as *const c_int as *const c_void,
            )
        };
        assert!(ok);
        assert_eq!(unsafe { (*ss).exec_repeat() }, 2);

        let bogus = CString::new("no_such_option").unwrap();
        assert!(!unsafe {
            glim_shading_system_attribute(
                ss,
                bogus.as_ptr(),
                TypeDesc::from_core(glimmer_core::TypeDesc::INT),
                &two as *const c_int as *const c_void,
            )
        });
        unsafe { teardown(ss, rsw) };
    }

    #[test]
    fn register_closure_stops_at_the_sentinel() {
        let (ss, rsw) = new_system();
        let name = CString::new("diffuse").unwrap();
        let key = CString::new("label").unwrap();
        let zero = TypeDesc {
            basetype: 0,
            aggregate: 0,
            vecsemantics: 0,
            reserved: 0,
            arraylen: 0,
        };
        let params = [
            ClosureParam {
                typedesc: TypeDesc::from_core(glimmer_core::TypeDesc::VECTOR),
                offset: 0,
                key: std::ptr::null(),
                field_size: 12,
            },
            ClosureParam {
                typedesc: TypeDesc::from_core(glimmer_core::TypeDesc::STRING),
                offset: 12,
                key: key.as_ptr(),
                field_size: 8,
            },
            ClosureParam {
                typedesc: zero,
                offset: 0,
                key: std::ptr::null(),
                field_size: 0,
            },
        ];
        unsafe { glim_shading_system_register_closure(ss, name.as_ptr(), 7, params.as_ptr()) };
        assert_eq!(unsafe { (*ss).closure_id("diffuse") }, Some(7));
        unsafe { teardown(ss, rsw) };
    }

    #[test]
    fn full_point_shading_flow() {
        let (ss, rsw) = new_system();
        let groupname = CString::new("flow").unwrap();
        let usage = CString::new("surface").unwrap();
        let shader = CString::new("uv").unwrap();
        let layer = CString::new("layer0").unwrap();
        let symname = CString::new("Cout").unwrap();

        unsafe {
            let group = glim_shading_system_group_begin(ss, groupname.as_ptr());
            assert!(glim_shading_system_shader(
                ss,
                group,
                usage.as_ptr(),
                shader.as_ptr(),
                layer.as_ptr(),
            ));
            glim_shading_system_group_end(ss, group);

            let tinfo = glim_shading_system_create_thread_info(ss);
            let ctx = glim_shading_system_get_context(ss, tinfo);
            let mut sg = glimmer_core::ShaderGlobals::default();
            sg.u = 0.25;
            sg.v = 0.75;
            assert!(glim_shading_system_execute(ss, ctx, group, &mut sg, true));

            let symbol = glim_shading_system_find_symbol(ss, group, symname.as_ptr());
            assert!(!symbol.is_null());
            let td = glim_shading_system_symbol_typedesc(ss, symbol);
            assert_eq!(td.into_core(), glimmer_core::TypeDesc::COLOR);

            let addr = glim_shading_system_symbol_address(ss, ctx, symbol);
            assert!(!addr.is_null());
            let rgb = std::slice::from_raw_parts(addr as *const f32, 3);
            assert_eq!(rgb, [0.25, 0.75, 0.0]);

            crate::group::glim_shader_group_release(group);
            glim_shading_system_release_context(ss, ctx);
            glim_shading_system_destroy_thread_info(ss, tinfo);
            teardown(ss, rsw);
        }
    }

    #[test]
    fn find_symbol_misses_return_null() {
        let (ss, rsw) = new_system();
        let groupname = CString::new("g").unwrap();
        let missing = CString::new("Ci_nope").unwrap();
        unsafe {
            let group = glim_shading_system_group_begin(ss, groupname.as_ptr());
            // Unfinalized group: no symbol table yet.
            assert!(glim_shading_system_find_symbol(ss, group, missing.as_ptr()).is_null());
            glim_shading_system_group_end(ss, group);
            assert!(glim_shading_system_find_symbol(ss, group, missing.as_ptr()).is_null());
            crate::group::glim_shader_group_release(group);
            teardown(ss, rsw);
        }
    }
}
