//! POD mirrors of core value types
//!
//! These structs replicate the layout of their `glimmer-core` equivalents
//! byte for byte, so foreign callers can declare them from a plain C header
//! and this crate can pass pointers straight through with a cast — no
//! per-call marshalling. The shim never looks inside a [`TypeDesc`]; it is
//! opaque in semantics and transparent only in layout.
//!
//! Layout equivalence is enforced at compile time by the assertions at the
//! bottom of this module. If a core type ever changes shape, the crate
//! stops building instead of silently corrupting the ABI.

use std::mem::{offset_of, size_of};
use std::os::raw::{c_char, c_int};

/// Mirror of [`glimmer_core::TypeDesc`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDesc {
    pub basetype: u8,
    pub aggregate: u8,
    pub vecsemantics: u8,
    pub reserved: u8,
    pub arraylen: i32,
}

impl TypeDesc {
    pub(crate) fn into_core(self) -> glimmer_core::TypeDesc {
        // Layout equality is asserted below; this is the pointer-cast
        // passthrough the ABI promises, in by-value form.
        unsafe { std::mem::transmute(self) }
    }

    pub(crate) fn from_core(td: glimmer_core::TypeDesc) -> TypeDesc {
        unsafe { std::mem::transmute(td) }
    }

    /// True for the zeroed descriptor that terminates closure-parameter
    /// arrays.
    pub(crate) fn is_terminator(&self) -> bool {
        self.basetype == 0 && self.aggregate == 0
    }
}

/// One entry in a closure-registration parameter array.
///
/// `key` is a nullable, null-terminated C string. The array passed to
/// `glim_shading_system_register_closure` ends with a zero-filled entry.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ClosureParam {
    pub typedesc: TypeDesc,
    pub offset: c_int,
    pub key: *const c_char,
    pub field_size: c_int,
}

/// Mirror of [`glimmer_core::Matrix44`]: 16 contiguous row-major floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix44 {
    pub m: [[f32; 4]; 4],
}

/// Mirror of [`glimmer_core::Roi`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub xbegin: i32,
    pub xend: i32,
    pub ybegin: i32,
    pub yend: i32,
    pub zbegin: i32,
    pub zend: i32,
    pub chbegin: i32,
    pub chend: i32,
}

impl Roi {
    pub(crate) fn into_core(self) -> glimmer_core::Roi {
        unsafe { std::mem::transmute(self) }
    }

    pub(crate) fn from_core(roi: glimmer_core::Roi) -> Roi {
        unsafe { std::mem::transmute(roi) }
    }
}

const _: () = {
    assert!(size_of::<TypeDesc>() == size_of::<glimmer_core::TypeDesc>());
    assert!(offset_of!(TypeDesc, basetype) == offset_of!(glimmer_core::TypeDesc, basetype));
    assert!(offset_of!(TypeDesc, aggregate) == offset_of!(glimmer_core::TypeDesc, aggregate));
    assert!(
        offset_of!(TypeDesc, vecsemantics) == offset_of!(glimmer_core::TypeDesc, vecsemantics)
    );
    assert!(offset_of!(TypeDesc, arraylen) == offset_of!(glimmer_core::TypeDesc, arraylen));

    assert!(size_of::<Matrix44>() == size_of::<glimmer_core::Matrix44>());
    assert!(size_of::<Matrix44>() == 64);

    assert!(size_of::<Roi>() == size_of::<glimmer_core::Roi>());
    assert!(offset_of!(Roi, xbegin) == offset_of!(glimmer_core::Roi, xbegin));
    assert!(offset_of!(Roi, yend) == offset_of!(glimmer_core::Roi, yend));
    assert!(offset_of!(Roi, chbegin) == offset_of!(glimmer_core::Roi, chbegin));
    assert!(offset_of!(Roi, chend) == offset_of!(glimmer_core::Roi, chend));

    // ClosureParam has no core twin (the core API takes owned defs); its
    // layout is itself the ABI contract.
    assert!(offset_of!(ClosureParam, typedesc) == 0);
    assert!(offset_of!(ClosureParam, offset) == 8);
    assert!(
        offset_of!(ClosureParam, field_size)
            == offset_of!(ClosureParam, key) + size_of::<*const c_char>()
    );
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_sizes_match_core() {
        assert_eq!(size_of::<TypeDesc>(), 8);
        assert_eq!(
            size_of::<TypeDesc>(),
            size_of::<glimmer_core::TypeDesc>()
        );
        assert_eq!(size_of::<Roi>(), 32);
        assert_eq!(size_of::<Matrix44>(), 64);
    }

    #[test]
    fn typedesc_round_trips_bitwise() {
        let td = TypeDesc {
            basetype: 10,
            aggregate: 3,
            vecsemantics: 1,
            reserved: 0,
            arraylen: 4,
        };
        let back = TypeDesc::from_core(td.into_core());
        assert_eq!(back, td);
        assert_eq!(td.into_core(), glimmer_core::TypeDesc::COLOR.array_of(4));
    }

    #[test]
    fn terminator_detection() {
        let zeroed = TypeDesc {
            basetype: 0,
            aggregate: 0,
            vecsemantics: 0,
            reserved: 0,
            arraylen: 0,
        };
        assert!(zeroed.is_terminator());
        assert!(!TypeDesc::from_core(glimmer_core::TypeDesc::FLOAT).is_terminator());
    }

    #[test]
    fn roi_round_trips_bitwise() {
        let roi = Roi {
            xbegin: 0,
            xend: 4,
            ybegin: 1,
            yend: 3,
            zbegin: 0,
            zend: 1,
            chbegin: 0,
            chend: 3,
        };
        let core = roi.into_core();
        assert_eq!(core.xend, 4);
        assert_eq!(core.ybegin, 1);
        assert_eq!(Roi::from_core(core), roi);
    }
}
