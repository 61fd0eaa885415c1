//! Image-buffer entry points and whole-image shading
//!
//! The image-shading utility takes an image buffer, so a buffer family is
//! exposed alongside it: create, destroy, raw pixel access, and the
//! buffer's full region. Pixels are interleaved row-major `f32`, zeroed on
//! creation.

use std::os::raw::{c_char, c_int};
use std::slice;

use glimmer_core::{shade_image, ImageBuf, ShaderGlobals};

use crate::handles::{cstr, ImageBufPtr, ShaderGroupRefPtr, ShadingSystemPtr};
use crate::types::Roi;

/// Allocate a zeroed float image.
#[no_mangle]
pub extern "C" fn glim_image_buf_create(
    width: c_int,
    height: c_int,
    nchannels: c_int,
) -> ImageBufPtr {
    tracing::debug!(width, height, nchannels, "creating image buffer");
    Box::into_raw(Box::new(ImageBuf::new(width, height, nchannels)))
}

/// # Safety
///
/// `buf` must be a live handle from [`glim_image_buf_create`], destroyed
/// exactly once.
#[no_mangle]
pub unsafe extern "C" fn glim_image_buf_destroy(buf: ImageBufPtr) {
    drop(Box::from_raw(buf));
}

/// Pointer to the interleaved pixel storage. Valid until the buffer is
/// destroyed.
///
/// # Safety
///
/// `buf` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn glim_image_buf_data(buf: ImageBufPtr) -> *mut f32 {
    (*buf).data_mut().as_mut_ptr()
}

/// Region covering the whole image.
///
/// # Safety
///
/// `buf` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn glim_image_buf_roi(buf: ImageBufPtr) -> Roi {
    Roi::from_core((*buf).roi())
}

/// Shade every pixel of `roi` with `group`, writing the named output
/// symbols into `imagebuf` starting at channel `roi.chbegin`.
///
/// `defaultsg` (nullable) seeds each per-pixel globals record.
/// `shadelocations` is 0 for pixel centers, 1 for the pixel grid. Returns
/// false, with a diagnostic through the system's error handler, on an
/// unfinalized group, a missing output, or an empty region.
///
/// # Safety
///
/// `ss`, `group`, `imagebuf` live; `defaultsg` null or live for the call;
/// `outputs` points to `noutputs` null-terminated strings, or is null with
/// `noutputs` zero.
#[no_mangle]
pub unsafe extern "C" fn glim_shade_image(
    ss: ShadingSystemPtr,
    group: ShaderGroupRefPtr,
    defaultsg: *const ShaderGlobals,
    imagebuf: ImageBufPtr,
    outputs: *const *const c_char,
    noutputs: c_int,
    shadelocations: c_int,
    roi: Roi,
) -> bool {
    let names: Vec<_> = if outputs.is_null() || noutputs <= 0 {
        Vec::new()
    } else {
        slice::from_raw_parts(outputs, noutputs as usize)
            .iter()
            .map(|&p| cstr(p))
            .collect()
    };
    let name_refs: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    shade_image(
        &*ss,
        &(*group).group,
        defaultsg.as_ref(),
        &mut *imagebuf,
        &name_refs,
        shadelocations,
        roi.into_core(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer_services::{
        glim_renderer_services_wrapper_create, glim_renderer_services_wrapper_destroy,
    };
    use crate::shading_system::{
        glim_shading_system_create, glim_shading_system_destroy, glim_shading_system_group_begin,
        glim_shading_system_group_end, glim_shading_system_shader,
    };
    use std::ffi::CString;

    #[test]
    fn buffer_round_trip_and_roi() {
        let buf = glim_image_buf_create(4, 2, 3);
        unsafe {
            let roi = glim_image_buf_roi(buf);
            assert_eq!(roi.xend, 4);
            assert_eq!(roi.yend, 2);
            assert_eq!(roi.chend, 3);

            let data = glim_image_buf_data(buf);
            assert_eq!(*data, 0.0);
            *data = 0.5;
            assert_eq!((*buf).get(0, 0, 0), 0.5);

            glim_image_buf_destroy(buf);
        }
    }

    #[test]
    fn shade_image_through_the_abi() {
        let rsw = glim_renderer_services_wrapper_create();
        let groupname = CString::new("img").unwrap();
        let usage = CString::new("surface").unwrap();
        let shader = CString::new("uv").unwrap();
        let layer = CString::new("layer0").unwrap();
        let output = CString::new("Cout").unwrap();
        let outputs = [output.as_ptr()];

        unsafe {
            let ss = glim_shading_system_create(rsw);
            let group = glim_shading_system_group_begin(ss, groupname.as_ptr());
            assert!(glim_shading_system_shader(
                ss,
                group,
                usage.as_ptr(),
                shader.as_ptr(),
                layer.as_ptr(),
            ));
            glim_shading_system_group_end(ss, group);

            let buf = glim_image_buf_create(4, 4, 3);
            let roi = glim_image_buf_roi(buf);
            assert!(glim_shade_image(
                ss,
                group,
                std::ptr::null(),
                buf,
                outputs.as_ptr(),
                1,
                0,
                roi,
            ));
            // pixel centers: u at x=1 of 4 is 0.375
            assert_eq!((*buf).get(1, 0, 0), 0.375);

            glim_image_buf_destroy(buf);
            crate::group::glim_shader_group_release(group);
            glim_shading_system_destroy(ss);
            glim_renderer_services_wrapper_destroy(rsw);
        }
    }

    #[test]
    fn shade_image_with_no_outputs_is_inert() {
        let rsw = glim_renderer_services_wrapper_create();
        let groupname = CString::new("empty").unwrap();
        unsafe {
            let ss = glim_shading_system_create(rsw);
            let group = glim_shading_system_group_begin(ss, groupname.as_ptr());
            glim_shading_system_group_end(ss, group);

            let buf = glim_image_buf_create(2, 2, 3);
            let roi = glim_image_buf_roi(buf);
            assert!(glim_shade_image(
                ss,
                group,
                std::ptr::null(),
                buf,
                std::ptr::null(),
                0,
                0,
                roi,
            ));
            assert!((*buf).data().iter().all(|&v| v == 0.0));

            glim_image_buf_destroy(buf);
            crate::group::glim_shader_group_release(group);
            glim_shading_system_destroy(ss);
            glim_renderer_services_wrapper_destroy(rsw);
        }
    }
}
