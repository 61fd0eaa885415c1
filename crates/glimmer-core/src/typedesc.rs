//! Type descriptors for shader values and attributes
//!
//! A [`TypeDesc`] is an 8-byte value type describing a datum crossing the
//! library boundary: a base numeric type, an aggregate kind (scalar, vector,
//! matrix), optional vector semantics, and an array length. Its layout is
//! part of the ABI and must never change.

/// Base numeric type of a [`TypeDesc`].
pub mod basetype {
    pub const NONE: u8 = 0;
    pub const UINT8: u8 = 1;
    pub const INT8: u8 = 2;
    pub const UINT16: u8 = 3;
    pub const INT16: u8 = 4;
    pub const UINT32: u8 = 5;
    pub const INT: u8 = 6;
    pub const UINT64: u8 = 7;
    pub const INT64: u8 = 8;
    pub const HALF: u8 = 9;
    pub const FLOAT: u8 = 10;
    pub const DOUBLE: u8 = 11;
    pub const STRING: u8 = 12;
    pub const PTR: u8 = 13;
}

/// Aggregate kind of a [`TypeDesc`]: how many base values one element holds.
pub mod aggregate {
    pub const SCALAR: u8 = 1;
    pub const VEC2: u8 = 2;
    pub const VEC3: u8 = 3;
    pub const VEC4: u8 = 4;
    pub const MATRIX33: u8 = 9;
    pub const MATRIX44: u8 = 16;
}

/// Semantic hint for vector aggregates.
pub mod vecsemantics {
    pub const NOSEMANTICS: u8 = 0;
    pub const COLOR: u8 = 1;
    pub const POINT: u8 = 2;
    pub const VECTOR: u8 = 3;
    pub const NORMAL: u8 = 4;
}

/// Descriptor of a value type.
///
/// `arraylen == 0` means "not an array"; a positive value is a fixed-length
/// array of elements.
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
    pub const UNKNOWN: TypeDesc = TypeDesc::new(basetype::NONE, aggregate::SCALAR);
    pub const FLOAT: TypeDesc = TypeDesc::new(basetype::FLOAT, aggregate::SCALAR);
    pub const INT: TypeDesc = TypeDesc::new(basetype::INT, aggregate::SCALAR);
    pub const STRING: TypeDesc = TypeDesc::new(basetype::STRING, aggregate::SCALAR);
    pub const COLOR: TypeDesc =
        TypeDesc::with_semantics(basetype::FLOAT, aggregate::VEC3, vecsemantics::COLOR);
    pub const POINT: TypeDesc =
        TypeDesc::with_semantics(basetype::FLOAT, aggregate::VEC3, vecsemantics::POINT);
    pub const VECTOR: TypeDesc =
        TypeDesc::with_semantics(basetype::FLOAT, aggregate::VEC3, vecsemantics::VECTOR);
    pub const NORMAL: TypeDesc =
        TypeDesc::with_semantics(basetype::FLOAT, aggregate::VEC3, vecsemantics::NORMAL);
    pub const MATRIX44: TypeDesc = TypeDesc::new(basetype::FLOAT, aggregate::MATRIX44);

    pub const fn new(basetype: u8, aggregate: u8) -> TypeDesc {
        TypeDesc::with_semantics(basetype, aggregate, vecsemantics::NOSEMANTICS)
    }

    pub const fn with_semantics(basetype: u8, aggregate: u8, vecsemantics: u8) -> TypeDesc {
        TypeDesc {
            basetype,
            aggregate,
            vecsemantics,
            reserved: 0,
            arraylen: 0,
        }
    }

    pub const fn array_of(mut self, len: i32) -> TypeDesc {
        self.arraylen = len;
        self
    }

    /// Byte size of one base value.
    pub const fn basesize(&self) -> usize {
        match self.basetype {
            basetype::NONE => 0,
            basetype::UINT8 | basetype::INT8 => 1,
            basetype::UINT16 | basetype::INT16 | basetype::HALF => 2,
            basetype::UINT32 | basetype::INT | basetype::FLOAT => 4,
            basetype::UINT64 | basetype::INT64 | basetype::DOUBLE => 8,
            basetype::STRING | basetype::PTR => std::mem::size_of::<*const u8>(),
            _ => 0,
        }
    }

    /// Number of base values in one element.
    pub const fn aggregate_count(&self) -> usize {
        self.aggregate as usize
    }

    /// Number of elements: 1 for non-arrays, `arraylen` otherwise.
    pub const fn numelements(&self) -> usize {
        if self.arraylen > 0 {
            self.arraylen as usize
        } else {
            1
        }
    }

    /// Total byte size of a value of this type.
    pub const fn size(&self) -> usize {
        self.basesize() * self.aggregate_count() * self.numelements()
    }

    /// True for the all-zero descriptor used as an array terminator.
    pub const fn is_none(&self) -> bool {
        self.basetype == basetype::NONE && self.aggregate == 0
    }
}

impl Default for TypeDesc {
    fn default() -> Self {
        TypeDesc::UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typedesc_is_eight_bytes() {
        assert_eq!(std::mem::size_of::<TypeDesc>(), 8);
        assert_eq!(std::mem::align_of::<TypeDesc>(), 4);
    }

    #[test]
    fn scalar_sizes() {
        assert_eq!(TypeDesc::FLOAT.size(), 4);
        assert_eq!(TypeDesc::INT.size(), 4);
        assert_eq!(TypeDesc::COLOR.size(), 12);
        assert_eq!(TypeDesc::MATRIX44.size(), 64);
        assert_eq!(
            TypeDesc::STRING.size(),
            std::mem::size_of::<*const u8>()
        );
    }

    #[test]
    fn array_sizes() {
        let td = TypeDesc::FLOAT.array_of(7);
        assert_eq!(td.numelements(), 7);
        assert_eq!(td.size(), 28);
        assert_eq!(TypeDesc::COLOR.array_of(2).size(), 24);
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
        assert!(zeroed.is_none());
        assert!(!TypeDesc::FLOAT.is_none());
        // UNKNOWN is a real descriptor, not a terminator
        assert!(!TypeDesc::UNKNOWN.is_none());
    }
}
