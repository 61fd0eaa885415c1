//! Small value types shared with the renderer: vectors and matrices.

/// Three-component float vector, `#[repr(C)]` so it can sit inside
/// [`ShaderGlobals`](crate::ShaderGlobals) unchanged across the ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3f {
    pub const ZERO: Vec3f = Vec3f::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Vec3f {
        Vec3f { x, y, z }
    }
}

/// Row-major 4x4 float matrix.
///
/// The layout (16 contiguous `f32`) is part of the ABI: renderer-services
/// `get_matrix` implementations on the far side of the C boundary write into
/// one of these through a raw pointer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix44 {
    pub m: [[f32; 4]; 4],
}

impl Matrix44 {
    pub const IDENTITY: Matrix44 = Matrix44 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Uniform scale matrix, handy for tests and trivial renderers.
    pub fn scale(s: f32) -> Matrix44 {
        let mut m = Matrix44::IDENTITY;
        m.m[0][0] = s;
        m.m[1][1] = s;
        m.m[2][2] = s;
        m
    }
}

impl Default for Matrix44 {
    fn default() -> Self {
        Matrix44::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_layout() {
        assert_eq!(std::mem::size_of::<Matrix44>(), 64);
        assert_eq!(std::mem::size_of::<Vec3f>(), 12);
    }

    #[test]
    fn identity_diagonal() {
        let m = Matrix44::IDENTITY;
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(m.m[i][j], if i == j { 1.0 } else { 0.0 });
            }
        }
    }
}
