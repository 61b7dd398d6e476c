use std::path::Path;

use fastgame_app::{Rect, SessionHandle, SessionList};
use fastgame_core::{Color, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::sprite::load_rgba;
use crate::widget::Widget;

enum Fill {
    Solid(Color),
    Image {
        source: RgbaImage,
        /// `source` scaled to the last window size seen
        scaled: Option<RgbaImage>,
    },
}

/// Covers the whole window with a colour or a stretched image.
pub struct Background {
    game: SessionHandle,
    fill: Fill,
}

impl Background {
    pub fn color(sessions: &SessionList, color: Color) -> Result<Self> {
        Ok(Self::color_bound_to(&sessions.current()?, color))
    }

    pub fn image(sessions: &SessionList, path: impl AsRef<Path>) -> Result<Self> {
        let game = sessions.current()?;
        Self::image_bound_to(&game, path)
    }

    pub fn color_bound_to(game: &SessionHandle, color: Color) -> Self {
        Self {
            game: game.clone(),
            fill: Fill::Solid(color),
        }
    }

    pub fn image_bound_to(game: &SessionHandle, path: impl AsRef<Path>) -> Result<Self> {
        let source = load_rgba(path.as_ref())?;
        Ok(Self {
            game: game.clone(),
            fill: Fill::Image { source, scaled: None },
        })
    }

    pub fn set_color(&mut self, color: Color) {
        self.fill = Fill::Solid(color);
    }
}

impl Widget for Background {
    fn update(&mut self) -> Result<()> {
        let bounds = self.rect();
        match &mut self.fill {
            Fill::Solid(color) => self.game.frame_mut().fill_rect(bounds, *color),
            Fill::Image { source, scaled } => {
                let (w, h) = (bounds.width, bounds.height);
                if scaled.as_ref().map(|img| img.dimensions()) != Some((w, h)) {
                    *scaled = Some(imageops::resize(&*source, w, h, FilterType::Triangle));
                }
                if let Some(img) = scaled {
                    self.game.frame_mut().blit_rgba(0, 0, img);
                }
            }
        }
        Ok(())
    }

    fn rect(&self) -> Rect {
        let (w, h) = self.game.size();
        Rect::new(0, 0, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastgame_app::{GameConfig, HeadlessBackend};

    fn game(list: &mut SessionList) -> SessionHandle {
        GameConfig::new()
            .with_size(8, 6)
            .build_with(list, HeadlessBackend::new())
            .unwrap()
            .handle()
    }

    #[test]
    fn solid_fill_covers_the_window() {
        let mut list = SessionList::new();
        let handle = game(&mut list);
        let mut bg = Background::color(&list, Color::BLUE).unwrap();
        bg.update().unwrap();
        let frame = handle.frame();
        assert!(frame.pixels().iter().all(|&px| px == Color::BLUE.to_pixel()));
    }

    #[test]
    fn image_is_stretched_to_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]))
            .save(&path)
            .unwrap();

        let mut list = SessionList::new();
        let handle = game(&mut list);
        let mut bg = Background::image(&list, &path).unwrap();
        bg.update().unwrap();
        let [r, g, b, _] = handle.frame().pixel(7, 5).unwrap().to_rgba8();
        assert!(r < 5 && g > 250 && b < 5);
        assert_eq!(bg.rect(), Rect::new(0, 0, 8, 6));
    }
}
