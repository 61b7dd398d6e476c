use std::path::Path;

use fastgame_app::{Rect, SessionHandle, SessionList};
use fastgame_core::input::LEFT_BUTTON;
use fastgame_core::{Color, Event, GameError, Result};
use image::RgbaImage;

use crate::sprite::Sprite;
use crate::widget::Widget;

type Command = Box<dyn FnMut() -> anyhow::Result<()>>;

/// Rectangular button, drawn as a tinted fill or as an image.
///
/// Tracks hover/press state from the session's input.  An attached command
/// runs from [`update`](Widget::update) once per left press that lands
/// inside the button.
pub struct Button {
    game: SessionHandle,
    pub rect: Rect,
    pub hovered: bool,
    pub pressed: bool,
    /// base colour (tinted when hovered/pressed)
    pub color: Color,
    pub hover_color: Color,
    pub press_color: Color,
    image: Option<RgbaImage>,
    command: Option<Command>,
    /// serial of the last event checked for a click
    seen: u64,
}

impl Button {
    /// Creates a button on the most recently created session.
    pub fn new(sessions: &SessionList, x: i32, y: i32, w: u32, h: u32) -> Result<Self> {
        Ok(Self::bound_to(&sessions.current()?, x, y, w, h))
    }

    pub fn bound_to(game: &SessionHandle, x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            game: game.clone(),
            rect: Rect::new(x, y, w, h),
            hovered: false,
            pressed: false,
            color: Color::rgb(0.2, 0.2, 0.8),
            hover_color: Color::rgb(0.2, 0.8, 0.2),
            press_color: Color::rgb(0.8, 0.2, 0.2),
            image: None,
            command: None,
            seen: game.event_serial(),
        }
    }

    /// Image button at the origin, scaled to `size` when given.
    pub fn image(
        sessions: &SessionList,
        path: impl AsRef<Path>,
        size: Option<(u32, u32)>,
    ) -> Result<Self> {
        let game = sessions.current()?;
        Self::image_bound_to(&game, path, size)
    }

    pub fn image_bound_to(
        game: &SessionHandle,
        path: impl AsRef<Path>,
        size: Option<(u32, u32)>,
    ) -> Result<Self> {
        let mut sprite = Sprite::bound_to(game, path)?;
        if let Some((w, h)) = size {
            sprite.resize(w, h);
        }
        let (w, h) = sprite.size();
        let mut button = Self::bound_to(game, 0, 0, w, h);
        button.image = Some(sprite.into_image());
        Ok(button)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.rect.x = x;
        self.rect.y = y;
        self
    }

    pub fn with_command<F>(mut self, command: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.set_command(command);
        self
    }

    /// Replaces the command run on a click.
    pub fn set_command<F>(&mut self, command: F)
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.command = Some(Box::new(command));
    }

    /// True while the current event is a left press inside the button.
    pub fn is_clicked(&self) -> bool {
        self.game.with_event(|event| match event {
            Event::MouseDown {
                pos: Some((x, y)),
                button: Some(b),
            } => *b == LEFT_BUTTON && self.rect.contains(*x, *y),
            _ => false,
        })
    }

    fn current_color(&self) -> Color {
        if self.pressed {
            self.press_color
        } else if self.hovered {
            self.hover_color
        } else {
            self.color
        }
    }

    /// Runs the command if a click arrived since the last check.
    fn fire(&mut self) -> Result<()> {
        let serial = self.game.event_serial();
        if serial == self.seen {
            return Ok(());
        }
        self.seen = serial;
        if !self.is_clicked() {
            return Ok(());
        }
        match self.command.as_mut() {
            Some(command) => command().map_err(|source| GameError::Callback {
                slot: "button".to_string(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Widget for Button {
    fn update(&mut self) -> Result<()> {
        let (mx, my) = self.game.mouse_position();
        self.hovered = self.rect.contains(mx, my);
        // press only while the cursor is over us
        self.pressed = self.hovered && self.game.input().is_button_down(LEFT_BUTTON);
        match &self.image {
            Some(image) => self.game.frame_mut().blit_rgba(self.rect.x, self.rect.y, image),
            None => self.game.frame_mut().fill_rect(self.rect, self.current_color()),
        }
        self.fire()
    }

    fn rect(&self) -> Rect {
        self.rect
    }
}
