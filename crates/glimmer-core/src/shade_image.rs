//! Shade every pixel of an image buffer with one shader group
//!
//! A convenience over the per-point flow: for each pixel inside the region
//! of interest a [`ShaderGlobals`] is derived from the caller's default
//! record, the group is executed in a scratch context, and the named output
//! symbols are copied into the buffer's channels.

use std::sync::Arc;

use crate::error::Error;
use crate::globals::ShaderGlobals;
use crate::group::ShaderGroup;
use crate::imagebuf::{ImageBuf, Roi};
use crate::shading_system::ShadingSystem;

/// Shade at pixel centers: `u = (x + 0.5) / width`.
pub const SHADE_PIXEL_CENTERS: i32 = 0;
/// Shade on the pixel grid: `u = x / (width - 1)`.
pub const SHADE_PIXEL_GRID: i32 = 1;

/// Run `group` over every pixel of `roi`, writing the named outputs into
/// `buf` starting at channel `roi.chbegin`.
///
/// `defaultsg` seeds every per-pixel record; pass `None` for a zeroed one.
/// `shadelocations` selects the u/v mapping ([`SHADE_PIXEL_CENTERS`] or
/// [`SHADE_PIXEL_GRID`]).
///
/// Returns `false`, with a diagnostic through the system's error handler,
/// if the group is not finalized, an output symbol is missing, or the
/// region does not intersect the image.
pub fn shade_image(
    ss: &ShadingSystem,
    group: &Arc<ShaderGroup>,
    defaultsg: Option<&ShaderGlobals>,
    buf: &mut ImageBuf,
    outputs: &[&str],
    shadelocations: i32,
    roi: Roi,
) -> bool {
    if !group.is_finalized() {
        ss.error_handler()
            .error(&Error::GroupNotFinalized(group.name().to_string()).to_string());
        return false;
    }
    let roi = roi.intersection(&buf.roi());
    if roi.is_empty() {
        ss.error_handler().error(&Error::EmptyRoi.to_string());
        return false;
    }

    let mut symbols = Vec::with_capacity(outputs.len());
    for name in outputs {
        match group.find_symbol(name) {
            Some(sym) => symbols.push(sym),
            None => {
                ss.error_handler()
                    .error(&Error::SymbolNotFound(name.to_string()).to_string());
                return false;
            }
        }
    }

    let width = buf.width().max(1) as f32;
    let height = buf.height().max(1) as f32;
    let mut ctx = ss.scratch_context();
    let mut values = vec![0.0f32; symbols.iter().map(|s| s.size() / 4).max().unwrap_or(0)];

    tracing::debug!(
        group = %group.name(),
        outputs = outputs.len(),
        width = roi.width(),
        height = roi.height(),
        "shading image"
    );

    for y in roi.ybegin..roi.yend {
        for x in roi.xbegin..roi.xend {
            let mut sg = match defaultsg {
                Some(template) => template.clone(),
                None => ShaderGlobals::default(),
            };
            match shadelocations {
                SHADE_PIXEL_GRID => {
                    sg.u = x as f32 / (width - 1.0).max(1.0);
                    sg.v = y as f32 / (height - 1.0).max(1.0);
                }
                _ => {
                    sg.u = (x as f32 + 0.5) / width;
                    sg.v = (y as f32 + 0.5) / height;
                }
            }
            sg.P.x = x as f32;
            sg.P.y = y as f32;
            sg.P.z = 0.0;

            if !ss.execute(&mut ctx, group, &sg, true) {
                return false;
            }

            let mut ch = roi.chbegin;
            for sym in &symbols {
                let n = sym.size() / 4;
                if !ctx.read_floats(sym, &mut values[..n]) {
                    return false;
                }
                for &v in &values[..n] {
                    if ch >= roi.chend {
                        break;
                    }
                    buf.set(x, y, ch, v);
                    ch += 1;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer_services::BaseRendererServices;

    fn uv_group(ss: &ShadingSystem) -> Arc<ShaderGroup> {
        let group = ss.shader_group_begin("img");
        assert!(ss.shader(&group, "surface", "uv", "layer0"));
        ss.shader_group_end(&group);
        group
    }

    fn system() -> ShadingSystem {
        ShadingSystem::new(Arc::new(BaseRendererServices), None, None)
    }

    #[test]
    fn shades_full_image_at_pixel_centers() {
        let ss = system();
        let group = uv_group(&ss);
        let mut buf = ImageBuf::new(4, 4, 3);
        let roi = buf.roi();

        assert!(shade_image(
            &ss,
            &group,
            None,
            &mut buf,
            &["Cout"],
            SHADE_PIXEL_CENTERS,
            roi,
        ));

        // u at x=0 is 0.125, v at y=3 is 0.875
        assert_eq!(buf.get(0, 0, 0), 0.125);
        assert_eq!(buf.get(3, 0, 0), 0.875);
        assert_eq!(buf.get(0, 3, 1), 0.875);
        assert_eq!(buf.get(2, 2, 2), 0.0);
        assert!(buf.data().iter().any(|&v| v != 0.0));
    }

    #[test]
    fn grid_locations_hit_the_corners() {
        let ss = system();
        let group = uv_group(&ss);
        let mut buf = ImageBuf::new(4, 4, 3);
        let roi = buf.roi();

        assert!(shade_image(
            &ss,
            &group,
            None,
            &mut buf,
            &["Cout"],
            SHADE_PIXEL_GRID,
            roi,
        ));
        assert_eq!(buf.get(0, 0, 0), 0.0);
        assert_eq!(buf.get(3, 0, 0), 1.0);
        assert_eq!(buf.get(0, 3, 1), 1.0);
    }

    #[test]
    fn partial_roi_leaves_the_rest_untouched() {
        let ss = system();
        let group = uv_group(&ss);
        let mut buf = ImageBuf::new(4, 4, 3);
        let roi = Roi::new_2d(0, 2, 0, 2, 3);

        assert!(shade_image(
            &ss,
            &group,
            None,
            &mut buf,
            &["Cout"],
            SHADE_PIXEL_CENTERS,
            roi,
        ));
        assert_ne!(buf.get(1, 1, 0), 0.0);
        assert_eq!(buf.get(3, 3, 0), 0.0);
        assert_eq!(buf.get(3, 3, 1), 0.0);
    }

    #[test]
    fn missing_output_fails_before_shading() {
        let ss = system();
        let group = uv_group(&ss);
        let mut buf = ImageBuf::new(4, 4, 3);
        let roi = buf.roi();

        assert!(!shade_image(
            &ss,
            &group,
            None,
            &mut buf,
            &["Ci_nope"],
            SHADE_PIXEL_CENTERS,
            roi,
        ));
        assert!(buf.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn default_globals_seed_every_pixel() {
        let ss = system();
        let group = ss.shader_group_begin("flat");
        assert!(ss.shader(&group, "surface", "constant", "layer0"));
        ss.shader_group_end(&group);

        let mut defaultsg = ShaderGlobals::default();
        defaultsg.time = 2.0;
        let mut buf = ImageBuf::new(2, 2, 3);
        let roi = buf.roi();

        assert!(shade_image(
            &ss,
            &group,
            Some(&defaultsg),
            &mut buf,
            &["Cout"],
            SHADE_PIXEL_CENTERS,
            roi,
        ));
        assert!(buf.data().iter().all(|&v| v == 1.0));
    }
}
