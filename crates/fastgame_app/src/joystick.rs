//! Game controllers read through `gilrs`.
//!
//! [`Joysticks`] owns the gilrs context.  The desktop backend drains it once
//! per frame and turns axis and button changes into `JoyAxis`,
//! `JoyButtonDown` and `JoyButtonUp` events.  [`Joystick`] is a handle on
//! one connected device, for its name and rumble.
//!
//! Axis and button numbers follow the usual controller layout (south face
//! button is 0, left stick X is axis 0).  Stick Y axes are positive upwards.

use std::cell::RefCell;
use std::rc::Rc;

use fastgame_core::event::{EventKind, RawEvent};
use fastgame_core::{GameError, Result};
use gilrs::ev::EventType;
use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Replay, Ticks};
use gilrs::{Axis, Button, GamepadId, Gilrs};

/// Number reported for axes and buttons gilrs could not identify.
pub const UNKNOWN_INPUT: u8 = u8::MAX;

/// Shared gilrs context.
#[derive(Clone)]
pub struct Joysticks {
    gilrs: Rc<RefCell<Gilrs>>,
}

impl Joysticks {
    pub fn new() -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| GameError::Joystick(e.to_string()))?;
        Ok(Self {
            gilrs: Rc::new(RefCell::new(gilrs)),
        })
    }

    /// Connected devices.
    pub fn count(&self) -> usize {
        self.gilrs.borrow().gamepads().count()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.gilrs
            .borrow()
            .gamepads()
            .map(|(id, _)| joy_number(id))
            .collect()
    }

    /// Handle on the connected device numbered `id`.
    pub fn get(&self, id: u32) -> Result<Joystick> {
        let found = self
            .gilrs
            .borrow()
            .gamepads()
            .map(|(gid, _)| gid)
            .find(|gid| joy_number(*gid) == id);
        match found {
            Some(gid) => Ok(Joystick {
                gilrs: self.gilrs.clone(),
                id: gid,
                rumble: None,
            }),
            None => Err(GameError::Joystick(format!("no joystick with id {id}"))),
        }
    }

    /// Handles on every connected device.
    pub fn all(&self) -> Vec<Joystick> {
        self.ids().into_iter().filter_map(|id| self.get(id).ok()).collect()
    }

    /// Drains pending controller events into `out`.
    pub(crate) fn poll(&self, out: &mut Vec<RawEvent>) {
        let mut ctx = self.gilrs.borrow_mut();
        while let Some(gilrs::Event { id, event, .. }) = ctx.next_event() {
            match event {
                EventType::Connected => log::info!("joystick {} connected", joy_number(id)),
                EventType::Disconnected => log::info!("joystick {} disconnected", joy_number(id)),
                other => {
                    if let Some(input) = pad_input(other) {
                        out.push(joy_event(joy_number(id), input));
                    }
                }
            }
        }
    }
}

/// One controller.
pub struct Joystick {
    gilrs: Rc<RefCell<Gilrs>>,
    id: GamepadId,
    rumble: Option<Effect>,
}

impl Joystick {
    pub fn id(&self) -> u32 {
        joy_number(self.id)
    }

    pub fn name(&self) -> String {
        self.gilrs.borrow().gamepad(self.id).name().to_string()
    }

    /// Device UUID as 32 hex digits.
    pub fn guid(&self) -> String {
        self.gilrs
            .borrow()
            .gamepad(self.id)
            .uuid()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    pub fn is_connected(&self) -> bool {
        self.gilrs.borrow().gamepad(self.id).is_connected()
    }

    /// Connected devices, this one included.
    pub fn devices(&self) -> usize {
        self.gilrs.borrow().gamepads().count()
    }

    /// Starts both rumble motors for `duration_ms`.  Strengths are clamped
    /// to `0.0..=1.0`.  Returns `false` when the device has no force
    /// feedback.
    pub fn start_rumble(
        &mut self,
        low_frequency: f32,
        high_frequency: f32,
        duration_ms: u32,
    ) -> Result<bool> {
        let mut gilrs = self.gilrs.borrow_mut();
        if !gilrs.gamepad(self.id).is_ff_supported() {
            return Ok(false);
        }
        let scheduling = Replay {
            play_for: Ticks::from_ms(duration_ms),
            ..Default::default()
        };
        let effect = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: motor_magnitude(low_frequency),
                },
                scheduling,
                ..Default::default()
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: motor_magnitude(high_frequency),
                },
                scheduling,
                ..Default::default()
            })
            .gamepads(&[self.id])
            .finish(&mut *gilrs)
            .map_err(|e| GameError::Joystick(e.to_string()))?;
        effect.play().map_err(|e| GameError::Joystick(e.to_string()))?;
        self.rumble = Some(effect);
        Ok(true)
    }

    pub fn stop_rumble(&mut self) -> Result<()> {
        if let Some(effect) = self.rumble.take() {
            effect.stop().map_err(|e| GameError::Joystick(e.to_string()))?;
        }
        Ok(())
    }
}

/// A controller change worth an engine event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PadInput {
    Axis(Axis, f32),
    Pressed(Button),
    Released(Button),
}

fn pad_input(event: EventType) -> Option<PadInput> {
    match event {
        EventType::AxisChanged(axis, value, _) => Some(PadInput::Axis(axis, value)),
        EventType::ButtonPressed(button, _) => Some(PadInput::Pressed(button)),
        EventType::ButtonReleased(button, _) => Some(PadInput::Released(button)),
        _ => None,
    }
}

pub(crate) fn joy_event(joy: u32, input: PadInput) -> RawEvent {
    match input {
        PadInput::Axis(axis, value) => {
            RawEvent::new(EventKind::JoyAxis).with_joy(joy).with_axis(axis_number(axis), value)
        }
        PadInput::Pressed(button) => RawEvent::new(EventKind::JoyButtonDown)
            .with_joy(joy)
            .with_button(button_number(button)),
        PadInput::Released(button) => RawEvent::new(EventKind::JoyButtonUp)
            .with_joy(joy)
            .with_button(button_number(button)),
    }
}

fn joy_number(id: GamepadId) -> u32 {
    usize::from(id) as u32
}

fn motor_magnitude(strength: f32) -> u16 {
    (strength.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
}

pub fn axis_number(axis: Axis) -> u8 {
    match axis {
        Axis::LeftStickX => 0,
        Axis::LeftStickY => 1,
        Axis::RightStickX => 2,
        Axis::RightStickY => 3,
        Axis::LeftZ => 4,
        Axis::RightZ => 5,
        Axis::DPadX => 6,
        Axis::DPadY => 7,
        _ => UNKNOWN_INPUT,
    }
}

pub fn button_number(button: Button) -> u8 {
    match button {
        Button::South => 0,
        Button::East => 1,
        Button::West => 2,
        Button::North => 3,
        Button::Select => 4,
        Button::Mode => 5,
        Button::Start => 6,
        Button::LeftThumb => 7,
        Button::RightThumb => 8,
        Button::LeftTrigger => 9,
        Button::RightTrigger => 10,
        Button::DPadUp => 11,
        Button::DPadDown => 12,
        Button::DPadLeft => 13,
        Button::DPadRight => 14,
        Button::LeftTrigger2 => 15,
        Button::RightTrigger2 => 16,
        Button::C => 17,
        Button::Z => 18,
        _ => UNKNOWN_INPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastgame_core::{normalize, Attr, AttrValue, Event};

    #[test]
    fn axis_changes_become_joy_axis_events() {
        let raw = joy_event(2, PadInput::Axis(Axis::RightStickY, -0.5));
        match normalize(&raw) {
            Event::JoyAxis { joy, axis, value } => {
                assert_eq!(joy, Some(2));
                assert_eq!(axis, Some(3));
                assert_eq!(value, Some(-0.5));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn button_presses_pair_up() {
        let down = normalize(&joy_event(0, PadInput::Pressed(Button::South)));
        let up = normalize(&joy_event(0, PadInput::Released(Button::South)));
        assert_eq!(down.kind(), EventKind::JoyButtonDown);
        assert_eq!(up.kind(), EventKind::JoyButtonUp);
        assert_eq!(down.get(Attr::Button), Some(AttrValue::Int(0)));
        assert_eq!(up.get(Attr::JoystickId), Some(AttrValue::Int(0)));
    }

    #[test]
    fn numbering_is_distinct() {
        let axes = [
            Axis::LeftStickX,
            Axis::LeftStickY,
            Axis::RightStickX,
            Axis::RightStickY,
            Axis::LeftZ,
            Axis::RightZ,
            Axis::DPadX,
            Axis::DPadY,
        ];
        let mut seen: Vec<u8> = axes.iter().map(|a| axis_number(*a)).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), axes.len());
        assert_eq!(axis_number(Axis::Unknown), UNKNOWN_INPUT);
        assert_eq!(button_number(Button::Unknown), UNKNOWN_INPUT);
        assert_eq!(button_number(Button::Z), 18);
    }

    #[test]
    fn rumble_strength_is_clamped() {
        assert_eq!(motor_magnitude(-1.0), 0);
        assert_eq!(motor_magnitude(2.0), u16::MAX);
        assert_eq!(motor_magnitude(0.5), 32768);
    }
}
