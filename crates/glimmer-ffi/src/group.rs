//! Shader-group handles
//!
//! `shader_group_begin` hands the foreign caller a [`ShaderGroupHolder`]:
//! a boxed strong reference to the shared group. The shading system keeps
//! its groups alive through its own references, so releasing the holder
//! never invalidates contexts still bound to the group; it only drops the
//! caller's share.

use std::sync::Arc;

use glimmer_core::ShaderGroup;

use crate::handles::ShaderGroupRefPtr;

/// Box-backed owner of one strong group reference.
pub struct ShaderGroupHolder {
    pub(crate) group: Arc<ShaderGroup>,
}

impl ShaderGroupHolder {
    pub(crate) fn new(group: Arc<ShaderGroup>) -> ShaderGroupRefPtr {
        Box::into_raw(Box::new(ShaderGroupHolder { group }))
    }
}

/// Drop the caller's reference to the group. The group itself lives on
/// while any context or other holder still uses it.
///
/// # Safety
///
/// `group` must be a live handle from `glim_shading_system_group_begin`,
/// released exactly once.
#[no_mangle]
pub unsafe extern "C" fn glim_shader_group_release(group: ShaderGroupRefPtr) {
    let holder = Box::from_raw(group);
    tracing::debug!(group = %holder.group.name(), "releasing shader group handle");
    drop(holder);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_core::{BaseRendererServices, ShadingSystem};

    #[test]
    fn release_drops_only_the_holders_reference() {
        let ss = ShadingSystem::new(Arc::new(BaseRendererServices), None, None);
        let group = ss.shader_group_begin("held");
        assert_eq!(Arc::strong_count(&group), 1);

        let holder = ShaderGroupHolder::new(group.clone());
        assert_eq!(Arc::strong_count(&group), 2);

        unsafe { glim_shader_group_release(holder) };
        assert_eq!(Arc::strong_count(&group), 1);
        assert_eq!(group.name(), "held");
    }
}
