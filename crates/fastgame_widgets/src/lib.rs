//! Widgets que dibujan en el frame de una sesión.
//!
//! Constructors taking a [`SessionList`](fastgame_app::SessionList) bind to
//! the most recently created session and fail with
//! [`GameError::ResourceMissing`](fastgame_core::GameError::ResourceMissing)
//! before any session exists.  The `*_bound_to` constructors take a handle
//! explicitly.

pub mod background;
pub mod button;
pub mod sprite;
pub mod widget;

pub use background::Background;
pub use button::Button;
pub use sprite::Sprite;
pub use widget::{Layer, Widget};
