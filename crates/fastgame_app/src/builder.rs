use std::path::PathBuf;

use fastgame_core::{Color, GameError, Result};
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::context::SessionList;
use crate::session::Session;
use crate::window::WinitBackend;

bitflags::bitflags! {
    /// Window style flags.  The empty set is a normal decorated,
    /// fixed-size window.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowStyle: u32 {
        const RESIZABLE  = 0x0000_0010;
        const NO_FRAME   = 0x0000_0020;
        const FULLSCREEN = 0x8000_0000;
    }
}

impl WindowStyle {
    pub const NORMAL: Self = Self::empty();

    /// Resolves one config-file style name.
    pub fn parse_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::NORMAL),
            "no-frame" | "noframe" => Ok(Self::NO_FRAME),
            "resizable" | "resizeable" => Ok(Self::RESIZABLE),
            "fullscreen" => Ok(Self::FULLSCREEN),
            other => Err(GameError::InvalidConfiguration(format!(
                "unknown window style `{other}`"
            ))),
        }
    }

    /// Names of the flags that are set, `["normal"]` when none are.
    pub fn names(self) -> Vec<&'static str> {
        if self.is_empty() {
            return vec!["normal"];
        }
        let mut out = Vec::new();
        if self.contains(Self::NO_FRAME) {
            out.push("no-frame");
        }
        if self.contains(Self::RESIZABLE) {
            out.push("resizable");
        }
        if self.contains(Self::FULLSCREEN) {
            out.push("fullscreen");
        }
        out
    }
}

/// Configuración inicial de la ventana y el bucle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GameConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    #[serde(with = "crate::config::style_names")]
    pub style: WindowStyle,
    /// Colour depth in bits; 0 lets the platform pick.
    pub depth: u8,
    pub icon: Option<PathBuf>,
    /// Target frames per second for loop pacing.
    pub fps: u32,
    pub debug: bool,
    /// Whether creating the session also brings up the windowing engine.
    pub init_engine: bool,
    /// Colour the frame is cleared to at the start of every iteration.
    pub background: Color,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Fast Game Window".to_string(),
            width: 500,
            height: 500,
            style: WindowStyle::NORMAL,
            depth: 0,
            icon: None,
            fps: 16,
            debug: false,
            init_engine: true,
            background: Color::WHITE,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_style(mut self, style: WindowStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon = Some(path.into());
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_init_engine(mut self, init: bool) -> Self {
        self.init_engine = init;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Rejects values no backend can honour.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidConfiguration(format!(
                "window size {}x{} has a zero dimension",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(GameError::InvalidConfiguration(
                "fps must be a positive integer".into(),
            ));
        }
        if !matches!(self.depth, 0 | 8 | 16 | 24 | 32) {
            return Err(GameError::InvalidConfiguration(format!(
                "unsupported colour depth {}",
                self.depth
            )));
        }
        Ok(())
    }

    /// Opens a window with the default winit backend and registers the
    /// session in `sessions`.
    pub fn build(self, sessions: &mut SessionList) -> Result<Session<WinitBackend>> {
        Session::create(sessions, self)
    }

    /// Same as [`build`](Self::build) but on a caller-supplied backend.
    pub fn build_with<B: Backend>(
        self,
        sessions: &mut SessionList,
        backend: B,
    ) -> Result<Session<B>> {
        Session::with_backend(sessions, self, backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_window() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.title, "Fast Game Window");
        assert_eq!((cfg.width, cfg.height), (500, 500));
        assert_eq!(cfg.fps, 16);
        assert!(cfg.init_engine);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(matches!(
            GameConfig::new().with_fps(0).validate(),
            Err(GameError::InvalidConfiguration(_))
        ));
        assert!(GameConfig::new().with_size(0, 10).validate().is_err());
        assert!(GameConfig::new().with_depth(12).validate().is_err());
        assert!(GameConfig::new().with_depth(24).validate().is_ok());
    }

    #[test]
    fn style_names_compose() {
        let style = WindowStyle::NO_FRAME | WindowStyle::RESIZABLE;
        assert_eq!(style.names(), vec!["no-frame", "resizable"]);
        assert_eq!(WindowStyle::NORMAL.names(), vec!["normal"]);
        assert_eq!(WindowStyle::parse_name("Fullscreen").ok(), Some(WindowStyle::FULLSCREEN));
        assert!(matches!(
            WindowStyle::parse_name("borderless-ish"),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn config_names_differ_from_flag_names() {
        // flag identifiers resolve through bitflags, config names through parse_name
        assert_eq!(WindowStyle::from_name("NO_FRAME"), Some(WindowStyle::NO_FRAME));
        assert_eq!(WindowStyle::from_name("no-frame"), None);
        assert_eq!(WindowStyle::parse_name("no-frame").ok(), Some(WindowStyle::NO_FRAME));
        assert_eq!(WindowStyle::parse_name(" Resizeable ").ok(), Some(WindowStyle::RESIZABLE));
    }
}
