/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The part of the rectangle inside a `width` x `height` area
    pub fn clip(&self, width: u32, height: u32) -> Rect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Rect {
            x,
            y,
            width: self.x.saturating_add(self.width).min(width) - x,
            height: self.y.saturating_add(self.height).min(height) - y,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Plain pixel storage: `bpp` bytes per pixel, rows packed top to bottom
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bpp: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, bpp: usize) -> Self {
        Self::filled(width, height, bpp, 0)
    }

    pub fn filled(width: u32, height: u32, bpp: usize, value: u8) -> Self {
        let len = width as usize * height as usize * bpp;
        Self {
            width,
            height,
            bpp,
            data: vec![value; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bpp(&self) -> usize {
        self.bpp
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes held by this buffer
    pub fn memsize(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.bpp
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y);
        self.data.get(start..start + self.bpp)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: &[u8]) {
        if x >= self.width || y >= self.height || value.len() != self.bpp {
            return;
        }
        let start = self.offset(x, y);
        self.data[start..start + self.bpp].copy_from_slice(value);
    }

    /// Fill a rectangle with one byte value, clipped to the buffer
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, value: u8) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);

        if x >= x_end {
            return;
        }

        for row in y.min(y_end)..y_end {
            let start = self.offset(x, row);
            let end = self.offset(x_end, row);
            self.data[start..end].fill(value);
        }
    }

    /// Copy a rectangle out of the buffer, clipped to its bounds
    pub fn read_region(&self, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        let w = x_end.saturating_sub(x);
        let h = y_end.saturating_sub(y);

        let mut region = PixelBuffer::new(w, h, self.bpp);
        if w == 0 || h == 0 {
            return region;
        }
        for row in 0..h {
            let src = self.offset(x, y + row);
            let dst = region.offset(0, row);
            let len = w as usize * self.bpp;
            region.data[dst..dst + len].copy_from_slice(&self.data[src..src + len]);
        }
        region
    }

    /// Paste `region` with its top-left corner at (x, y), clipped
    pub fn write_region(&mut self, region: &PixelBuffer, x: u32, y: u32) {
        if region.bpp != self.bpp {
            return;
        }

        let x_end = x.saturating_add(region.width).min(self.width);
        let y_end = y.saturating_add(region.height).min(self.height);
        let w = x_end.saturating_sub(x) as usize;
        if w == 0 {
            return;
        }

        for row in 0..y_end.saturating_sub(y) {
            let src = region.offset(0, row);
            let dst = self.offset(x, y + row);
            let len = w * self.bpp;
            self.data[dst..dst + len].copy_from_slice(&region.data[src..src + len]);
        }
    }

    /// Nearest-neighbour resample, used for history thumbnails
    pub fn scaled(&self, width: u32, height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height, self.bpp);
        if self.width == 0 || self.height == 0 {
            return out;
        }

        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height.max(1) as u64) as u32;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width.max(1) as u64) as u32;
                if let Some(px) = self.pixel(sx, sy) {
                    let px = px.to_vec();
                    out.set_pixel(x, y, &px);
                }
            }
        }
        out
    }

    /// Drop the pixel data, keeping nothing allocated
    pub fn release(&mut self) {
        self.width = 0;
        self.height = 0;
        self.data = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_clip() {
        assert_eq!(Rect::new(2, 2, 4, 4).clip(4, 8), Rect::new(2, 2, 2, 4));
        assert_eq!(Rect::new(1, 1, 2, 2).clip(8, 8), Rect::new(1, 1, 2, 2));
        assert!(Rect::new(u32::MAX, 0, 1, 1).clip(8, 8).is_empty());
        assert!(Rect::new(0, 9, 100_000, 100_000).clip(8, 8).is_empty());
    }

    #[test]
    fn test_fill_and_read_region() {
        let mut buf = PixelBuffer::new(4, 4, 1);
        buf.fill_rect(1, 1, 2, 2, 9);

        let region = buf.read_region(0, 0, 3, 3);
        assert_eq!(region.width(), 3);
        assert_eq!(region.data(), &[0, 0, 0, 0, 9, 9, 0, 9, 9]);
    }

    #[test]
    fn test_read_region_clips() {
        let buf = PixelBuffer::filled(4, 4, 2, 1);
        let region = buf.read_region(3, 3, 5, 5);
        assert_eq!((region.width(), region.height()), (1, 1));
        assert_eq!(region.data(), &[1, 1]);
    }

    #[test]
    fn test_write_region() {
        let mut buf = PixelBuffer::new(3, 3, 1);
        let patch = PixelBuffer::filled(2, 2, 1, 7);
        buf.write_region(&patch, 2, 2);

        assert_eq!(buf.pixel(2, 2), Some(&[7][..]));
        assert_eq!(buf.pixel(1, 1), Some(&[0][..]));
    }

    #[test]
    fn test_write_region_rejects_mismatched_depth() {
        let mut buf = PixelBuffer::new(2, 2, 4);
        buf.write_region(&PixelBuffer::filled(2, 2, 1, 5), 0, 0);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_scaled() {
        let mut buf = PixelBuffer::new(4, 2, 1);
        buf.fill_rect(2, 0, 2, 2, 3);

        let small = buf.scaled(2, 1);
        assert_eq!(small.data(), &[0, 3]);
    }

    #[test]
    fn test_release() {
        let mut buf = PixelBuffer::filled(8, 8, 4, 1);
        buf.release();
        assert!(buf.is_empty());
        assert_eq!(buf.memsize(), 0);
    }
}
