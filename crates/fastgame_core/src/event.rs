//! Event normalization.
//!
//! Backends translate whatever their windowing engine delivers into a
//! [`RawEvent`]: a kind plus a bag of optional attributes, any of which may
//! be missing.  [`normalize`] turns that into an [`Event`], a tagged enum
//! whose variants carry only the attributes meaningful for their kind.
//! Attributes that the raw event did not supply are simply absent; nothing
//! here fails.
//!
//! Callbacks usually pattern-match on [`Event`] directly.  For string-keyed
//! or generic access, [`Event::has`] and [`Event::get`] look up an [`Attr`].
//!
//! ```rust
//! use fastgame_core::event::{normalize, Attr, AttrValue, EventKind, RawEvent};
//!
//! let raw = RawEvent::new(EventKind::MouseDown).with_pos(10, 20).with_button(1);
//! let ev = normalize(&raw);
//! assert_eq!(ev.get(Attr::Position), Some(AttrValue::Point((10, 20))));
//! assert!(!ev.has(Attr::Key));
//! ```

use crate::input::KeyCode;

/// Window coordinates in pixels.
pub type Point = (i32, i32);

/// Pressed state of the left, middle and right mouse buttons.
pub type ButtonMask = [bool; 3];

bitflags::bitflags! {
    /// Keyboard modifier state at the time of a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// The category of an input occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventKind {
    /// No event has been seen yet.
    #[default]
    None,
    Quit,
    MouseDown,
    MouseUp,
    MouseMove,
    KeyDown,
    KeyUp,
    Resize,
    /// Window focus gained or lost.
    Active,
    JoyAxis,
    JoyButtonDown,
    JoyButtonUp,
    /// Engine-specific event the normalizer has no mapping for.
    Other(u32),
}

/// Engine-side event record as produced by a backend.
///
/// Every attribute is optional; a backend fills in what its engine reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub key: Option<KeyCode>,
    pub pos: Option<Point>,
    pub button: Option<u8>,
    pub unicode: Option<String>,
    pub modifiers: Option<Modifiers>,
    pub joy: Option<u32>,
    pub buttons: Option<ButtonMask>,
    pub rel: Option<Point>,
    pub axis: Option<u8>,
    pub value: Option<f32>,
    pub gain: Option<bool>,
    pub state: Option<i64>,
    pub size: Option<(u32, u32)>,
}

impl RawEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn quit() -> Self {
        Self::new(EventKind::Quit)
    }

    pub fn key_down(key: KeyCode) -> Self {
        Self::new(EventKind::KeyDown).with_key(key)
    }

    pub fn key_up(key: KeyCode) -> Self {
        Self::new(EventKind::KeyUp).with_key(key)
    }

    pub fn with_key(mut self, key: KeyCode) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_pos(mut self, x: i32, y: i32) -> Self {
        self.pos = Some((x, y));
        self
    }

    pub fn with_button(mut self, button: u8) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_unicode(mut self, text: impl Into<String>) -> Self {
        self.unicode = Some(text.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    pub fn with_rel(mut self, dx: i32, dy: i32) -> Self {
        self.rel = Some((dx, dy));
        self
    }

    pub fn with_buttons(mut self, buttons: ButtonMask) -> Self {
        self.buttons = Some(buttons);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn with_joy(mut self, joy: u32) -> Self {
        self.joy = Some(joy);
        self
    }

    pub fn with_axis(mut self, axis: u8, value: f32) -> Self {
        self.axis = Some(axis);
        self.value = Some(value);
        self
    }
}

/// Engine-agnostic input event.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Event {
    #[default]
    None,
    Quit,
    MouseDown {
        pos: Option<Point>,
        button: Option<u8>,
    },
    MouseUp {
        pos: Option<Point>,
        button: Option<u8>,
    },
    MouseMove {
        pos: Option<Point>,
        rel: Option<Point>,
        buttons: Option<ButtonMask>,
    },
    KeyDown {
        key: Option<KeyCode>,
        unicode: Option<String>,
        modifiers: Option<Modifiers>,
    },
    KeyUp {
        key: Option<KeyCode>,
        modifiers: Option<Modifiers>,
    },
    Resize {
        size: Option<(u32, u32)>,
    },
    Active {
        gain: Option<bool>,
        state: Option<i64>,
    },
    JoyAxis {
        joy: Option<u32>,
        axis: Option<u8>,
        value: Option<f32>,
    },
    JoyButtonDown {
        joy: Option<u32>,
        button: Option<u8>,
    },
    JoyButtonUp {
        joy: Option<u32>,
        button: Option<u8>,
    },
    Other {
        code: u32,
    },
}

/// Attribute names understood by [`Event::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Type,
    Key,
    Position,
    Button,
    UnicodeChar,
    Modifiers,
    JoystickId,
    ButtonMask,
    RelativeMotion,
    Axis,
    Value,
    Gain,
    State,
    Size,
    Width,
    Height,
}

impl Attr {
    pub const ALL: [Attr; 16] = [
        Attr::Type,
        Attr::Key,
        Attr::Position,
        Attr::Button,
        Attr::UnicodeChar,
        Attr::Modifiers,
        Attr::JoystickId,
        Attr::ButtonMask,
        Attr::RelativeMotion,
        Attr::Axis,
        Attr::Value,
        Attr::Gain,
        Attr::State,
        Attr::Size,
        Attr::Width,
        Attr::Height,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attr::Type => "type",
            Attr::Key => "key",
            Attr::Position => "position",
            Attr::Button => "button",
            Attr::UnicodeChar => "unicode-char",
            Attr::Modifiers => "modifiers",
            Attr::JoystickId => "joystick-id",
            Attr::ButtonMask => "button-mask",
            Attr::RelativeMotion => "relative-motion",
            Attr::Axis => "axis",
            Attr::Value => "value",
            Attr::Gain => "gain",
            Attr::State => "state",
            Attr::Size => "size",
            Attr::Width => "width",
            Attr::Height => "height",
        }
    }

    /// Resolves an attribute name.  The short engine spellings
    /// (`pos`, `unicode`, `mod`, `joy`, `buttons`, `rel`, `w`, `h`) are
    /// accepted as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let attr = match name {
            "pos" => Attr::Position,
            "unicode" => Attr::UnicodeChar,
            "mod" => Attr::Modifiers,
            "joy" => Attr::JoystickId,
            "buttons" => Attr::ButtonMask,
            "rel" => Attr::RelativeMotion,
            "w" => Attr::Width,
            "h" => Attr::Height,
            other => return Attr::ALL.into_iter().find(|a| a.name() == other),
        };
        Some(attr)
    }
}

/// A single attribute value read out of an [`Event`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Kind(EventKind),
    Key(KeyCode),
    Point(Point),
    Int(i64),
    Float(f32),
    Bool(bool),
    Text(String),
    Modifiers(Modifiers),
    Buttons(ButtonMask),
    Size(u32, u32),
}

/// Builds the normalized event for `raw`.  Attributes that do not belong to
/// the raw event's kind are dropped; missing ones stay absent.
pub fn normalize(raw: &RawEvent) -> Event {
    match raw.kind {
        EventKind::None => Event::None,
        EventKind::Quit => Event::Quit,
        EventKind::MouseDown => Event::MouseDown {
            pos: raw.pos,
            button: raw.button,
        },
        EventKind::MouseUp => Event::MouseUp {
            pos: raw.pos,
            button: raw.button,
        },
        EventKind::MouseMove => Event::MouseMove {
            pos: raw.pos,
            rel: raw.rel,
            buttons: raw.buttons,
        },
        EventKind::KeyDown => Event::KeyDown {
            key: raw.key,
            unicode: raw.unicode.clone(),
            modifiers: raw.modifiers,
        },
        EventKind::KeyUp => Event::KeyUp {
            key: raw.key,
            modifiers: raw.modifiers,
        },
        EventKind::Resize => Event::Resize { size: raw.size },
        EventKind::Active => Event::Active {
            gain: raw.gain,
            state: raw.state,
        },
        EventKind::JoyAxis => Event::JoyAxis {
            joy: raw.joy,
            axis: raw.axis,
            value: raw.value,
        },
        EventKind::JoyButtonDown => Event::JoyButtonDown {
            joy: raw.joy,
            button: raw.button,
        },
        EventKind::JoyButtonUp => Event::JoyButtonUp {
            joy: raw.joy,
            button: raw.button,
        },
        EventKind::Other(code) => Event::Other { code },
    }
}

impl From<&RawEvent> for Event {
    fn from(raw: &RawEvent) -> Self {
        normalize(raw)
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::None => EventKind::None,
            Event::Quit => EventKind::Quit,
            Event::MouseDown { .. } => EventKind::MouseDown,
            Event::MouseUp { .. } => EventKind::MouseUp,
            Event::MouseMove { .. } => EventKind::MouseMove,
            Event::KeyDown { .. } => EventKind::KeyDown,
            Event::KeyUp { .. } => EventKind::KeyUp,
            Event::Resize { .. } => EventKind::Resize,
            Event::Active { .. } => EventKind::Active,
            Event::JoyAxis { .. } => EventKind::JoyAxis,
            Event::JoyButtonDown { .. } => EventKind::JoyButtonDown,
            Event::JoyButtonUp { .. } => EventKind::JoyButtonUp,
            Event::Other { code } => EventKind::Other(*code),
        }
    }

    pub fn has(&self, attr: Attr) -> bool {
        self.get(attr).is_some()
    }

    /// Like [`get`](Self::get) but falls back to `default` when absent.
    pub fn get_or(&self, attr: Attr, default: AttrValue) -> AttrValue {
        self.get(attr).unwrap_or(default)
    }

    /// String-keyed lookup; unknown names read as absent.
    pub fn get_by_name(&self, name: &str) -> Option<AttrValue> {
        Attr::from_name(name).and_then(|attr| self.get(attr))
    }

    pub fn get(&self, attr: Attr) -> Option<AttrValue> {
        use Event as E;

        if attr == Attr::Type {
            return Some(AttrValue::Kind(self.kind()));
        }

        match (self, attr) {
            (E::MouseDown { pos, .. }, Attr::Position)
            | (E::MouseUp { pos, .. }, Attr::Position)
            | (E::MouseMove { pos, .. }, Attr::Position) => pos.map(AttrValue::Point),

            (E::MouseDown { button, .. }, Attr::Button)
            | (E::MouseUp { button, .. }, Attr::Button)
            | (E::JoyButtonDown { button, .. }, Attr::Button)
            | (E::JoyButtonUp { button, .. }, Attr::Button) => {
                button.map(|b| AttrValue::Int(b as i64))
            }

            (E::MouseMove { rel, .. }, Attr::RelativeMotion) => rel.map(AttrValue::Point),
            (E::MouseMove { buttons, .. }, Attr::ButtonMask) => buttons.map(AttrValue::Buttons),

            (E::KeyDown { key, .. }, Attr::Key) | (E::KeyUp { key, .. }, Attr::Key) => {
                key.map(AttrValue::Key)
            }
            (E::KeyDown { unicode, .. }, Attr::UnicodeChar) => {
                unicode.clone().map(AttrValue::Text)
            }
            (E::KeyDown { modifiers, .. }, Attr::Modifiers)
            | (E::KeyUp { modifiers, .. }, Attr::Modifiers) => {
                modifiers.map(AttrValue::Modifiers)
            }

            (E::Resize { size }, Attr::Size) => size.map(|(w, h)| AttrValue::Size(w, h)),
            (E::Resize { size }, Attr::Width) => size.map(|(w, _)| AttrValue::Int(w as i64)),
            (E::Resize { size }, Attr::Height) => size.map(|(_, h)| AttrValue::Int(h as i64)),

            (E::Active { gain, .. }, Attr::Gain) => gain.map(AttrValue::Bool),
            (E::Active { state, .. }, Attr::State) => state.map(AttrValue::Int),

            (E::JoyAxis { joy, .. }, Attr::JoystickId)
            | (E::JoyButtonDown { joy, .. }, Attr::JoystickId)
            | (E::JoyButtonUp { joy, .. }, Attr::JoystickId) => {
                joy.map(|j| AttrValue::Int(j as i64))
            }
            (E::JoyAxis { axis, .. }, Attr::Axis) => axis.map(|a| AttrValue::Int(a as i64)),
            (E::JoyAxis { value, .. }, Attr::Value) => value.map(AttrValue::Float),

            _ => None,
        }
    }

    /// Cursor position carried by a mouse event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            Event::MouseDown { pos, .. }
            | Event::MouseUp { pos, .. }
            | Event::MouseMove { pos, .. } => *pos,
            _ => None,
        }
    }

    /// Key carried by a keyboard event, if any.
    pub fn key(&self) -> Option<KeyCode> {
        match self {
            Event::KeyDown { key, .. } | Event::KeyUp { key, .. } => *key,
            _ => None,
        }
    }

    pub fn is_key_down(&self, code: KeyCode) -> bool {
        matches!(self, Event::KeyDown { key: Some(k), .. } if *k == code)
    }
}
