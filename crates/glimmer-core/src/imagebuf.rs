//! Float image buffers and regions of interest

/// Integer region of an image: half-open ranges over x, y, z, and channels.
///
/// `#[repr(C)]` and passed by value across the ABI. 2D images use
/// `zbegin = 0, zend = 1`.
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
    /// 2D region over the full channel range `[0, nchannels)`.
    pub const fn new_2d(xbegin: i32, xend: i32, ybegin: i32, yend: i32, nchannels: i32) -> Roi {
        Roi {
            xbegin,
            xend,
            ybegin,
            yend,
            zbegin: 0,
            zend: 1,
            chbegin: 0,
            chend: nchannels,
        }
    }

    pub const fn width(&self) -> i32 {
        self.xend - self.xbegin
    }

    pub const fn height(&self) -> i32 {
        self.yend - self.ybegin
    }

    pub const fn nchannels(&self) -> i32 {
        self.chend - self.chbegin
    }

    pub const fn is_empty(&self) -> bool {
        self.xend <= self.xbegin || self.yend <= self.ybegin || self.chend <= self.chbegin
    }

    /// Intersection of two regions.
    pub fn intersection(&self, other: &Roi) -> Roi {
        Roi {
            xbegin: self.xbegin.max(other.xbegin),
            xend: self.xend.min(other.xend),
            ybegin: self.ybegin.max(other.ybegin),
            yend: self.yend.min(other.yend),
            zbegin: self.zbegin.max(other.zbegin),
            zend: self.zend.min(other.zend),
            chbegin: self.chbegin.max(other.chbegin),
            chend: self.chend.min(other.chend),
        }
    }
}

/// A float image: `width * height` pixels of `nchannels` interleaved
/// channels, zero-initialized.
pub struct ImageBuf {
    width: i32,
    height: i32,
    nchannels: i32,
    pixels: Vec<f32>,
}

impl ImageBuf {
    pub fn new(width: i32, height: i32, nchannels: i32) -> ImageBuf {
        let n = (width.max(0) as usize) * (height.max(0) as usize) * (nchannels.max(0) as usize);
        ImageBuf {
            width,
            height,
            nchannels,
            pixels: vec![0.0; n],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn nchannels(&self) -> i32 {
        self.nchannels
    }

    /// Region covering the whole image.
    pub fn roi(&self) -> Roi {
        Roi::new_2d(0, self.width, 0, self.height, self.nchannels)
    }

    fn index(&self, x: i32, y: i32, ch: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height || ch < 0 || ch >= self.nchannels
        {
            return None;
        }
        Some(((y * self.width + x) * self.nchannels + ch) as usize)
    }

    pub fn get(&self, x: i32, y: i32, ch: i32) -> f32 {
        self.index(x, y, ch).map_or(0.0, |i| self.pixels[i])
    }

    pub fn set(&mut self, x: i32, y: i32, ch: i32, value: f32) {
        if let Some(i) = self.index(x, y, ch) {
            self.pixels[i] = value;
        }
    }

    /// Interleaved pixel storage, row-major.
    pub fn data(&self) -> &[f32] {
        &self.pixels
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_zeroed() {
        let buf = ImageBuf::new(4, 4, 3);
        assert_eq!(buf.data().len(), 48);
        assert!(buf.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn set_get_round_trip() {
        let mut buf = ImageBuf::new(2, 2, 3);
        buf.set(1, 0, 2, 0.5);
        assert_eq!(buf.get(1, 0, 2), 0.5);
        // out of range is inert
        buf.set(5, 0, 0, 9.0);
        assert_eq!(buf.get(5, 0, 0), 0.0);
    }

    #[test]
    fn roi_geometry() {
        let roi = Roi::new_2d(0, 4, 0, 4, 3);
        assert_eq!(roi.width(), 4);
        assert_eq!(roi.height(), 4);
        assert_eq!(roi.nchannels(), 3);
        assert!(!roi.is_empty());

        let clipped = roi.intersection(&Roi::new_2d(2, 8, 1, 3, 4));
        assert_eq!(clipped, Roi::new_2d(2, 4, 1, 3, 3));

        assert!(Roi::new_2d(4, 4, 0, 4, 3).is_empty());
    }

    #[test]
    fn roi_layout() {
        assert_eq!(std::mem::size_of::<Roi>(), 32);
    }
}
