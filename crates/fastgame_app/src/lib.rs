//! Sesiones de juego: ventana, bucle principal y callbacks.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fastgame_app::{Color, GameConfig, Rect, RunOptions, SessionList};
//!
//! fn main() -> anyhow::Result<()> {
//!     fastgame_app::logging::init(log::LevelFilter::Info);
//!
//!     let mut sessions = SessionList::new();
//!     let mut game = GameConfig::new()
//!         .with_title("My Game")
//!         .with_fps(30)
//!         .build(&mut sessions)?;
//!
//!     let handle = game.handle();
//!     game.update(move || {
//!         if handle.check_rate(30) {
//!             log::info!("one more second");
//!         }
//!         handle.frame_mut().fill_rect(Rect::new(10, 10, 50, 50), Color::RED);
//!         Ok(())
//!     });
//!
//!     game.run(RunOptions::new().with_escape_quits(true))?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod builder;
pub mod callbacks;
pub mod config;
pub mod context;
pub mod frame;
pub mod joystick;
pub mod logging;
pub mod session;
pub mod window;

pub use backend::{Backend, HeadlessBackend, PresentMode};
pub use builder::{GameConfig, WindowStyle};
pub use callbacks::{Callbacks, EndArgs, Slot};
pub use config::{ExitMode, FpsPhase, RunOptions};
pub use context::{SessionHandle, SessionList};
pub use frame::{FrameBuffer, Rect};
pub use joystick::{Joystick, Joysticks};
pub use session::Session;
pub use window::WinitBackend;

// ── Re-export the most-used fastgame_core primitives ───────────────────────
pub use fastgame_core::{
    Attr,
    AttrValue,
    Color,
    Event,
    EventKind,
    GameError,
    InputState,
    KeyCode,
    MouseButton,
    RawEvent,
    Result,
    Time,
    Timer,
};
