use fastgame_core::{Color, GameError, Result};
use image::RgbaImage;

/// Axis-aligned rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && (x as i64) < self.right() && y >= self.y && (y as i64) < self.bottom()
    }

    /// Overlap test used for sprite collisions; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && (self.x as i64) < other.right()
            && (other.x as i64) < self.right()
            && (self.y as i64) < other.bottom()
            && (other.y as i64) < self.bottom()
    }

    /// Intersection with `other`, `None` when they do not overlap.
    pub fn clip(&self, other: &Rect) -> Option<Rect> {
        let x0 = (self.x as i64).max(other.x as i64);
        let y0 = (self.y as i64).max(other.y as i64);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = (self.x as i64).min(other.x as i64);
        let y0 = (self.y as i64).min(other.y as i64);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32)
    }
}

/// CPU-side frame the session clears every iteration and widgets draw into.
///
/// Pixels are packed `0x00RRGGBB`, row-major.  Every draw call records the
/// region it touched; [`take_damage`](Self::take_damage) reports what must
/// be re-presented, which is this frame's regions plus last frame's (those
/// were wiped by the clear).
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    damage: Vec<Rect>,
    last_damage: Vec<Rect>,
    /// set by `resize`; forces the next damage report to cover everything
    all_dirty: bool,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE.to_pixel(); width as usize * height as usize],
            damage: Vec::new(),
            last_damage: Vec::new(),
            all_dirty: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Reallocates for a new window size.  Content is reset to white.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![Color::WHITE.to_pixel(); width as usize * height as usize];
        self.damage.clear();
        self.last_damage.clear();
        self.all_dirty = true;
    }

    /// Fills the whole frame without recording damage.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_pixel());
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.bounds().contains(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> GameError {
        GameError::Bounds {
            x: x as i64,
            y: y as i64,
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Result<Color> {
        let idx = self.index(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        Ok(Color::from_pixel(self.pixels[idx]))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<()> {
        let idx = self.index(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        self.pixels[idx] = color.to_pixel();
        self.damage.push(Rect::new(x, y, 1, 1));
        Ok(())
    }

    /// Fills `rect` (clipped to the frame) with an opaque colour.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(area) = rect.clip(&self.bounds()) else {
            return;
        };
        let px = color.to_pixel();
        let stride = self.width as usize;
        for row in area.y as usize..area.bottom() as usize {
            let start = row * stride + area.x as usize;
            self.pixels[start..start + area.width as usize].fill(px);
        }
        self.damage.push(area);
    }

    /// Copies `image` with its top-left corner at `(x, y)`, blending by the
    /// image's alpha channel.  Parts outside the frame are skipped.
    pub fn blit_rgba(&mut self, x: i32, y: i32, image: &RgbaImage) {
        let dest = Rect::new(x, y, image.width(), image.height());
        let Some(area) = dest.clip(&self.bounds()) else {
            return;
        };
        let stride = self.width as usize;
        for py in area.y..area.bottom() as i32 {
            for px in area.x..area.right() as i32 {
                let src = image.get_pixel((px - x) as u32, (py - y) as u32).0;
                let idx = py as usize * stride + px as usize;
                self.pixels[idx] = blend(self.pixels[idx], src);
            }
        }
        self.damage.push(area);
    }

    /// Regions to present for this frame; rotates this frame's damage into
    /// the "last frame" slot.
    pub fn take_damage(&mut self) -> Vec<Rect> {
        if std::mem::take(&mut self.all_dirty) {
            self.last_damage = std::mem::take(&mut self.damage);
            return vec![self.bounds()];
        }
        let current = std::mem::take(&mut self.damage);
        let mut out = std::mem::replace(&mut self.last_damage, current.clone());
        out.extend(current);
        out
    }

    /// Snapshot of the frame as an opaque RGBA image.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixels[y as usize * self.width as usize + x as usize];
            image::Rgba([(px >> 16) as u8, (px >> 8) as u8, px as u8, 0xFF])
        })
    }
}

fn blend(dst: u32, src: [u8; 4]) -> u32 {
    let a = src[3] as u32;
    if a == 0xFF {
        return ((src[0] as u32) << 16) | ((src[1] as u32) << 8) | src[2] as u32;
    }
    if a == 0 {
        return dst;
    }
    let mix = |s: u8, d: u32| (s as u32 * a + d * (255 - a) + 127) / 255;
    let r = mix(src[0], (dst >> 16) & 0xFF);
    let g = mix(src[1], (dst >> 8) & 0xFF);
    let b = mix(src[2], dst & 0xFF);
    (r << 16) | (g << 8) | b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_overlap_rules() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
        // shared edge only
        assert!(!a.intersects(&Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Rect::new(3, 3, 0, 4)));
        assert_eq!(a.clip(&Rect::new(-5, 8, 20, 20)), Some(Rect::new(0, 8, 10, 2)));
        assert_eq!(a.union(&Rect::new(20, 20, 1, 1)), Rect::new(0, 0, 21, 21));
    }

    #[test]
    fn pixel_access_is_bounds_checked() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.set_pixel(3, 2, Color::RED).unwrap();
        assert_eq!(fb.pixel(3, 2).unwrap(), Color::from_pixel(Color::RED.to_pixel()));
        match fb.set_pixel(4, 0, Color::RED) {
            Err(GameError::Bounds { x, width, .. }) => assert_eq!((x, width), (4, 4)),
            other => panic!("expected bounds error, got {other:?}"),
        }
        assert!(fb.pixel(-1, 0).is_err());
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut fb = FrameBuffer::new(8, 8);
        fb.clear(Color::BLACK);
        fb.fill_rect(Rect::new(6, 6, 10, 10), Color::WHITE);
        assert_eq!(fb.pixel(7, 7).unwrap(), Color::WHITE);
        assert_eq!(fb.pixel(5, 5).unwrap(), Color::BLACK);
        fb.fill_rect(Rect::new(100, 100, 2, 2), Color::WHITE);
    }

    #[test]
    fn blit_blends_by_alpha() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.clear(Color::BLACK);
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([255, 255, 255, 0]));
        fb.blit_rgba(0, 0, &img);
        assert_eq!(fb.pixels(), &[0x00FF_0000, 0x0000_0000]);
    }

    #[test]
    fn damage_covers_previous_and_current_draws() {
        let mut fb = FrameBuffer::new(10, 10);
        // first report after creation is the whole frame
        assert_eq!(fb.take_damage(), vec![fb.bounds()]);

        fb.fill_rect(Rect::new(0, 0, 2, 2), Color::RED);
        assert_eq!(fb.take_damage(), vec![Rect::new(0, 0, 2, 2)]);

        fb.fill_rect(Rect::new(5, 5, 1, 1), Color::RED);
        assert_eq!(
            fb.take_damage(),
            vec![Rect::new(0, 0, 2, 2), Rect::new(5, 5, 1, 1)]
        );
        // nothing drawn: only last frame's region needs wiping
        assert_eq!(fb.take_damage(), vec![Rect::new(5, 5, 1, 1)]);
        assert!(fb.take_damage().is_empty());
    }

    #[test]
    fn screenshot_image_matches_pixels() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.clear(Color::BLUE);
        let img = fb.to_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [0, 0, 255, 255]);
    }
}
