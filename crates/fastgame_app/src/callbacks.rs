//! Callback slots.
//!
//! A session has eight fixed slots, one per lifecycle or input category.
//! Each holds at most one callback; registering again replaces the previous
//! one, and invoking an empty slot does nothing.

use std::collections::{BTreeMap, HashMap};

/// Lifecycle and input categories a callback can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Start,
    End,
    Update,
    MouseDown,
    MouseUp,
    MouseMove,
    KeyDown,
    KeyUp,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::Start,
        Slot::End,
        Slot::Update,
        Slot::MouseDown,
        Slot::MouseUp,
        Slot::MouseMove,
        Slot::KeyDown,
        Slot::KeyUp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Start => "when-start",
            Slot::End => "when-end",
            Slot::Update => "update",
            Slot::MouseDown => "on-mouse-down",
            Slot::MouseUp => "on-mouse-up",
            Slot::MouseMove => "on-mouse-move",
            Slot::KeyDown => "on-key-down",
            Slot::KeyUp => "on-key-up",
        }
    }

    /// Resolves a reserved name; `on-start`/`on-end` are accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "on-start" => Some(Slot::Start),
            "on-end" => Some(Slot::End),
            other => Slot::ALL.into_iter().find(|s| s.name() == other),
        }
    }
}

/// Arguments forwarded from `shutdown` to the `end` callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndArgs {
    pub positional: Vec<String>,
    pub named: BTreeMap<String, String>,
}

impl EndArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn named(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Stored form of every slot callback.  Only the `end` slot ever sees
/// non-empty arguments.
pub type SlotFn = Box<dyn FnMut(&EndArgs) -> anyhow::Result<()>>;

/// Application-defined hook outside the reserved slots.
pub type NamedFn = Box<dyn FnMut() -> anyhow::Result<()>>;

/// One optional callback per slot, plus free-form named hooks.
#[derive(Default)]
pub struct Callbacks {
    start: Option<SlotFn>,
    end: Option<SlotFn>,
    update: Option<SlotFn>,
    mouse_down: Option<SlotFn>,
    mouse_up: Option<SlotFn>,
    mouse_move: Option<SlotFn>,
    key_down: Option<SlotFn>,
    key_up: Option<SlotFn>,
    named: HashMap<String, NamedFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<SlotFn> {
        match slot {
            Slot::Start => &mut self.start,
            Slot::End => &mut self.end,
            Slot::Update => &mut self.update,
            Slot::MouseDown => &mut self.mouse_down,
            Slot::MouseUp => &mut self.mouse_up,
            Slot::MouseMove => &mut self.mouse_move,
            Slot::KeyDown => &mut self.key_down,
            Slot::KeyUp => &mut self.key_up,
        }
    }

    fn slot_ref(&self, slot: Slot) -> &Option<SlotFn> {
        match slot {
            Slot::Start => &self.start,
            Slot::End => &self.end,
            Slot::Update => &self.update,
            Slot::MouseDown => &self.mouse_down,
            Slot::MouseUp => &self.mouse_up,
            Slot::MouseMove => &self.mouse_move,
            Slot::KeyDown => &self.key_down,
            Slot::KeyUp => &self.key_up,
        }
    }

    /// Stores a zero-argument callback, replacing whatever was there.
    pub fn set<F>(&mut self, slot: Slot, mut f: F)
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        *self.slot_mut(slot) = Some(Box::new(move |_: &EndArgs| f()));
    }

    /// Stores an `end` callback that receives the shutdown arguments.
    pub fn set_end<F>(&mut self, f: F)
    where
        F: FnMut(&EndArgs) -> anyhow::Result<()> + 'static,
    {
        self.end = Some(Box::new(f));
    }

    /// Removes and returns the callback in `slot`.
    pub fn clear(&mut self, slot: Slot) -> Option<SlotFn> {
        self.slot_mut(slot).take()
    }

    pub fn get(&mut self, slot: Slot) -> Option<&mut SlotFn> {
        self.slot_mut(slot).as_mut()
    }

    pub fn is_registered(&self, slot: Slot) -> bool {
        self.slot_ref(slot).is_some()
    }

    /// Runs the callback in `slot`.  `Ok(false)` means the slot was empty.
    pub fn invoke(&mut self, slot: Slot) -> anyhow::Result<bool> {
        self.invoke_with(slot, &EndArgs::default())
    }

    pub fn invoke_with(&mut self, slot: Slot, args: &EndArgs) -> anyhow::Result<bool> {
        match self.slot_mut(slot) {
            Some(f) => f(args).map(|()| true),
            None => Ok(false),
        }
    }

    /// Registers a hook by name.  Reserved slot names go to their slot.
    pub fn set_named<F>(&mut self, name: &str, f: F)
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        match Slot::from_name(name) {
            Some(slot) => self.set(slot, f),
            None => {
                self.named.insert(name.to_string(), Box::new(f));
            }
        }
    }

    pub fn has_named(&self, name: &str) -> bool {
        match Slot::from_name(name) {
            Some(slot) => self.is_registered(slot),
            None => self.named.contains_key(name),
        }
    }

    pub fn invoke_named(&mut self, name: &str) -> anyhow::Result<bool> {
        if let Some(slot) = Slot::from_name(name) {
            return self.invoke(slot);
        }
        match self.named.get_mut(name) {
            Some(f) => f().map(|()| true),
            None => Ok(false),
        }
    }
}
