use std::path::{Path, PathBuf};

use fastgame_app::{Rect, SessionHandle, SessionList};
use fastgame_core::{GameError, Result};
use glam::Vec2;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::widget::Widget;

/// Looked up, relative to the working directory, for image paths that do
/// not exist as given.
pub const IMAGE_DIR: &str = "resources/images";

/// An image drawn at a position every frame.
///
/// The position is the top-left corner.  Clones share the session and
/// start at the same position with the same image and size.
#[derive(Clone)]
pub struct Sprite {
    game: SessionHandle,
    /// image as loaded
    source: RgbaImage,
    /// `source` scaled to the sprite size
    image: RgbaImage,
    position: Vec2,
    visible: bool,
}

impl Sprite {
    /// Loads `path` and binds to the most recently created session.
    pub fn new(sessions: &SessionList, path: impl AsRef<Path>) -> Result<Self> {
        let game = sessions.current()?;
        Self::bound_to(&game, path)
    }

    pub fn bound_to(game: &SessionHandle, path: impl AsRef<Path>) -> Result<Self> {
        let image = load_rgba(path.as_ref())?;
        Ok(Self::from_image(game, image))
    }

    pub fn from_image(game: &SessionHandle, image: RgbaImage) -> Self {
        Self {
            game: game.clone(),
            source: image.clone(),
            image,
            position: Vec2::ZERO,
            visible: true,
        }
    }

    /// Scales the image to `width` x `height`.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.resize(width, height);
        self
    }

    /// Rescales from the loaded image, so repeated resizes do not lose
    /// detail.  The position is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = scaled(&self.source, width, height);
    }

    /// Swaps in the image at `path`, scaled to `size` when given.
    pub fn set_image(&mut self, path: impl AsRef<Path>, size: Option<(u32, u32)>) -> Result<()> {
        self.source = load_rgba(path.as_ref())?;
        self.image = match size {
            Some((w, h)) => scaled(&self.source, w, h),
            None => self.source.clone(),
        };
        Ok(())
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The scaled image, consuming the sprite.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Bounding-box overlap; sprites that only touch do not collide.
    pub fn collides_with(&self, other: &dyn Widget) -> bool {
        self.rect().intersects(&other.rect())
    }

    /// True while the cursor is over the sprite's box.
    pub fn collide_mouse(&self) -> bool {
        let (x, y) = self.game.mouse_position();
        self.rect().contains(x, y)
    }

    /// Whether the sprite touches or crosses the left/right and the
    /// top/bottom window edges.
    pub fn collide_edge(&self) -> (bool, bool) {
        let rect = self.rect();
        let (w, h) = self.game.size();
        (
            rect.x <= 0 || rect.right() >= w as i64,
            rect.y <= 0 || rect.bottom() >= h as i64,
        )
    }

    /// Puts the top-left corner on the cursor.
    pub fn move_to_mouse(&mut self) {
        let (x, y) = self.game.mouse_position();
        self.position = Vec2::new(x as f32, y as f32);
    }
}

impl Widget for Sprite {
    fn update(&mut self) -> Result<()> {
        if self.visible {
            let Rect { x, y, .. } = self.rect();
            self.game.frame_mut().blit_rgba(x, y, &self.image);
        }
        Ok(())
    }

    fn rect(&self) -> Rect {
        let (w, h) = self.image.dimensions();
        let pos = self.position.round();
        Rect::new(pos.x as i32, pos.y as i32, w, h)
    }
}

fn scaled(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Nearest)
}

/// `path` itself, or else `path` under `root`/[`IMAGE_DIR`].
fn locate(path: &Path, root: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let fallback = root.join(IMAGE_DIR).join(path);
    fallback.is_file().then_some(fallback)
}

pub(crate) fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let Some(found) = locate(path, Path::new("")) else {
        return Err(GameError::ResourceMissing(format!(
            "image file {} does not exist",
            path.display()
        )));
    };
    log::debug!("loading image {}", found.display());
    Ok(image::open(found)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastgame_app::{GameConfig, HeadlessBackend};
    use fastgame_core::Color;

    fn game() -> (SessionList, SessionHandle) {
        let mut list = SessionList::new();
        let s = GameConfig::new()
            .with_size(20, 20)
            .build_with(&mut list, HeadlessBackend::new())
            .unwrap();
        (list, s.handle())
    }

    fn square(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, image::Rgba([255, 0, 0, 255]))
    }

    #[test]
    fn collision_is_a_box_overlap() {
        let (_list, handle) = game();
        let a = Sprite::from_image(&handle, square(10));
        let mut b = Sprite::from_image(&handle, square(10)).with_position(9.0, 9.0);
        assert!(a.collides_with(&b));
        b.move_by(1.0, 0.0);
        // edges touching only
        assert!(!a.collides_with(&b));
    }

    #[test]
    fn update_blits_into_the_frame() {
        let (_list, handle) = game();
        handle.frame_mut().clear(Color::WHITE);
        let mut s = Sprite::from_image(&handle, square(2)).with_position(3.4, 4.6);
        s.update().unwrap();
        assert_eq!(handle.frame().pixel(3, 5).unwrap(), Color::from_pixel(0xFF0000));
        assert_eq!(handle.frame().pixel(2, 5).unwrap(), Color::WHITE);

        handle.frame_mut().clear(Color::WHITE);
        s.hide();
        s.update().unwrap();
        assert_eq!(handle.frame().pixel(3, 5).unwrap(), Color::WHITE);
    }

    #[test]
    fn resizing_starts_from_the_loaded_image() {
        let (_list, handle) = game();
        let mut two_tone = RgbaImage::from_pixel(2, 1, image::Rgba([255, 0, 0, 255]));
        two_tone.put_pixel(1, 0, image::Rgba([0, 0, 255, 255]));
        let mut s = Sprite::from_image(&handle, two_tone).with_size(1, 1);
        assert_eq!(s.size(), (1, 1));
        s.resize(4, 2);
        assert_eq!(s.rect(), Rect::new(0, 0, 4, 2));
        s.update().unwrap();
        // the blue half survives the trip through 1x1
        assert_eq!(handle.frame().pixel(3, 1).unwrap(), Color::from_pixel(0x0000FF));
    }

    #[test]
    fn clones_start_where_the_original_is() {
        let (_list, handle) = game();
        let original = Sprite::from_image(&handle, square(2))
            .with_size(4, 4)
            .with_position(5.0, 6.0);
        let mut copy = original.clone();
        assert_eq!(copy.rect(), original.rect());
        copy.move_by(1.0, 0.0);
        assert_eq!(original.position(), Vec2::new(5.0, 6.0));
    }

    #[test]
    fn edges_are_reported_per_axis() {
        let (_list, handle) = game();
        let mut s = Sprite::from_image(&handle, square(5));
        assert_eq!(s.collide_edge(), (true, true));
        s.set_position(Vec2::new(5.0, 5.0));
        assert_eq!(s.collide_edge(), (false, false));
        s.set_position(Vec2::new(15.0, 5.0));
        assert_eq!(s.collide_edge(), (true, false));
        s.set_position(Vec2::new(5.0, 16.0));
        assert_eq!(s.collide_edge(), (false, true));
    }

    #[test]
    fn mouse_helpers_follow_the_cursor() {
        use fastgame_app::{EventKind, GameConfig, HeadlessBackend, RawEvent, RunOptions};
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut list = SessionList::new();
        let backend = HeadlessBackend::new().with_frame(vec![
            RawEvent::new(EventKind::MouseMove).with_pos(3, 3),
            RawEvent::new(EventKind::MouseMove).with_pos(12, 8),
        ]);
        let mut game = GameConfig::new()
            .with_size(20, 20)
            .with_fps(1000)
            .build_with(&mut list, backend)
            .unwrap();
        let sprite = Rc::new(RefCell::new(
            Sprite::from_image(&list.current().unwrap(), square(4)).with_position(1.0, 1.0),
        ));
        let hits = Rc::new(RefCell::new(Vec::new()));
        let (s, h) = (sprite.clone(), hits.clone());
        game.on_mouse_move(move || {
            h.borrow_mut().push(s.borrow().collide_mouse());
            Ok(())
        });
        game.run(RunOptions::new().returning()).unwrap();

        assert_eq!(*hits.borrow(), vec![true, false]);
        sprite.borrow_mut().move_to_mouse();
        assert_eq!(sprite.borrow().position(), Vec2::new(12.0, 8.0));
        assert!(sprite.borrow().collide_mouse());
    }

    #[test]
    fn set_image_keeps_the_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        square(8).save(&path).unwrap();

        let (_list, handle) = game();
        let mut s = Sprite::from_image(&handle, square(2)).with_position(4.0, 4.0);
        s.set_image(&path, None).unwrap();
        assert_eq!(s.rect(), Rect::new(4, 4, 8, 8));
        s.set_image(&path, Some((3, 2))).unwrap();
        assert_eq!(s.size(), (3, 2));
        assert!(s.set_image(dir.path().join("gone.png"), None).is_err());
    }

    #[test]
    fn images_fall_back_to_the_resource_folder() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join(IMAGE_DIR);
        std::fs::create_dir_all(&images).unwrap();
        square(1).save(images.join("hero.png")).unwrap();

        let found = locate(Path::new("hero.png"), dir.path()).unwrap();
        assert_eq!(found, images.join("hero.png"));
        assert!(locate(Path::new("villain.png"), dir.path()).is_none());
    }

    #[test]
    fn missing_file_is_reported() {
        let (_list, handle) = game();
        match Sprite::bound_to(&handle, "/no/such/sprite.png") {
            Err(GameError::ResourceMissing(msg)) => assert!(msg.contains("sprite.png")),
            other => panic!("unexpected {:?}", other.err()),
        }
    }
}
