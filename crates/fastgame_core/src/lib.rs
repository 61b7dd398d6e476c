// fastgame_core: tipos básicos y utilidades

pub mod color;
pub mod error;
pub mod event;
pub mod input;
pub mod time;

pub use color::Color;
pub use error::{GameError, Result};
pub use event::{normalize, Attr, AttrValue, Event, EventKind, Modifiers, Point, RawEvent};
// re-export common input types so callers don't need to depend on winit
pub use input::{InputState, KeyCode, MouseButton};
pub use time::{FrameClock, Time, Timer};
