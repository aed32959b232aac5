/// Edge length shared by every generated frame.
pub const WIDTH: u32 = 200;
pub const HEIGHT: u32 = 200;

/// One rendered image, keyed by the epoch second it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Raw RGBA pixel buffer, row-major.
    pub data: Vec<u8>,
    pub rendered_at: i64,
}

impl Frame {
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, rendered_at: i64) -> Self {
        Self {
            width,
            height,
            data,
            rendered_at,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
