use thiserror::Error;

/// Every failure a fastgame session or adapter can report.
///
/// Construction-time variants (`Initialization`, `InvalidConfiguration`,
/// `ResourceMissing`) are returned synchronously from the call that hit them.
/// `Callback` is produced by the main loop when a registered callback returns
/// an error; the loop stops and hands it to the caller of `run`.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to initialize the display: {0}")]
    Initialization(String),

    #[error("missing resource: {0}")]
    ResourceMissing(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("joystick error: {0}")]
    Joystick(String),

    #[error("pixel ({x}, {y}) is outside the {width}x{height} frame")]
    Bounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("the `{slot}` callback failed")]
    Callback {
        slot: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// Shortcut used by adapters that need an active session.
    pub fn no_session() -> Self {
        GameError::ResourceMissing("no game session has been created".to_string())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = GameError::Bounds {
            x: 600,
            y: -1,
            width: 500,
            height: 500,
        };
        assert_eq!(
            err.to_string(),
            "pixel (600, -1) is outside the 500x500 frame"
        );
        assert!(GameError::no_session().to_string().contains("no game session"));
    }

    #[test]
    fn callback_error_keeps_its_source() {
        use std::error::Error as _;
        let err = GameError::Callback {
            slot: "update".into(),
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.to_string(), "the `update` callback failed");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".into()));
    }
}
