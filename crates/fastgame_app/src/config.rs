//! Loading [`GameConfig`] from TOML and the options that drive `run`.
//!
//! ```toml
//! title = "Snake"
//! width = 640
//! height = 480
//! style = ["no-frame", "resizable"]
//! fps = 30
//! background = "#202020"
//! ```

use std::path::Path;

use fastgame_core::{GameError, Result};
use serde::{Deserialize, Serialize};

use crate::builder::GameConfig;

impl GameConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: GameConfig = toml::from_str(text)
            .map_err(|e| GameError::InvalidConfiguration(e.message().to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GameError::InvalidConfiguration(e.to_string()))
    }
}

/// Serde glue storing [`WindowStyle`](crate::builder::WindowStyle) as a
/// list of names.
pub(crate) mod style_names {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::builder::WindowStyle;

    pub fn serialize<S: Serializer>(style: &WindowStyle, s: S) -> Result<S::Ok, S::Error> {
        style.names().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<WindowStyle, D::Error> {
        let names = Vec::<String>::deserialize(d)?;
        names.iter().try_fold(WindowStyle::NORMAL, |acc, name| {
            WindowStyle::parse_name(name)
                .map(|flag| acc | flag)
                .map_err(|e| D::Error::custom(e.to_string()))
        })
    }
}

/// Where frame pacing happens inside one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FpsPhase {
    #[default]
    Before,
    After,
}

/// What happens once the session has shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitMode {
    /// Terminate the process with the exit code.
    #[default]
    Terminate,
    /// Hand the exit code back to the caller.
    Return,
}

/// Parameters of [`Session::run`](crate::Session::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunOptions {
    pub exit_code: i32,
    /// Pressing Escape shuts the session down.
    pub escape_quits: bool,
    /// Present the whole frame every iteration instead of the damaged region.
    pub full_redraw: bool,
    pub fps_phase: FpsPhase,
    pub exit_mode: ExitMode,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn with_escape_quits(mut self, quits: bool) -> Self {
        self.escape_quits = quits;
        self
    }

    pub fn with_full_redraw(mut self, full: bool) -> Self {
        self.full_redraw = full;
        self
    }

    pub fn with_fps_phase(mut self, phase: FpsPhase) -> Self {
        self.fps_phase = phase;
        self
    }

    pub fn with_exit_mode(mut self, mode: ExitMode) -> Self {
        self.exit_mode = mode;
        self
    }

    /// Shorthand for `with_exit_mode(ExitMode::Return)`.
    pub fn returning(self) -> Self {
        self.with_exit_mode(ExitMode::Return)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WindowStyle;
    use fastgame_core::Color;

    #[test]
    fn toml_overrides_defaults() {
        let cfg = GameConfig::from_toml_str(
            r##"
            title = "Snake"
            width = 640
            style = ["no-frame", "resizable"]
            fps = 30
            background = "#202020"
            "##,
        )
        .unwrap();
        assert_eq!(cfg.title, "Snake");
        assert_eq!((cfg.width, cfg.height), (640, 500));
        assert_eq!(cfg.style, WindowStyle::NO_FRAME | WindowStyle::RESIZABLE);
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.background, Color::from_rgb8(0x20, 0x20, 0x20));
    }

    #[test]
    fn unknown_style_is_invalid_configuration() {
        let err = GameConfig::from_toml_str(r#"style = ["sideways"]"#).unwrap_err();
        match err {
            GameError::InvalidConfiguration(msg) => assert!(msg.contains("sideways"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_fps_in_file_is_rejected() {
        assert!(GameConfig::from_toml_str("fps = 0").is_err());
    }

    #[test]
    fn config_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.toml");
        let cfg = GameConfig::new()
            .with_title("Pong")
            .with_style(WindowStyle::FULLSCREEN)
            .with_background(Color::NAVY);
        std::fs::write(&path, cfg.to_toml_string().unwrap()).unwrap();
        let loaded = GameConfig::load(&path).unwrap();
        assert_eq!(loaded.title, "Pong");
        assert_eq!(loaded.style, WindowStyle::FULLSCREEN);
        assert_eq!(loaded.background.to_pixel(), Color::NAVY.to_pixel());
    }

    #[test]
    fn run_options_defaults() {
        let opts = RunOptions::default();
        assert_eq!(opts.exit_code, 0);
        assert!(!opts.escape_quits);
        assert!(!opts.full_redraw);
        assert_eq!(opts.fps_phase, FpsPhase::Before);
        assert_eq!(opts.exit_mode, ExitMode::Terminate);
        assert_eq!(RunOptions::new().returning().exit_mode, ExitMode::Return);
    }
}
