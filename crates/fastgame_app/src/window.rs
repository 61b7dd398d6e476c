//! Desktop backend: a winit 0.30 window presented through softbuffer.
//!
//! The session drives the loop itself, so instead of handing control to
//! `EventLoop::run_app` the backend pumps the event loop once per frame with
//! `pump_app_events` and queues the translated events.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use fastgame_core::event::{ButtonMask, EventKind, Modifiers, Point, RawEvent};
use fastgame_core::input::{button_number, ROLLING_DOWN, ROLLING_UP};
use fastgame_core::{GameError, Result};
use image::RgbaImage;
use softbuffer::{Context, Surface};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, OwnedDisplayHandle};
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Icon, Window, WindowAttributes, WindowId};

use crate::backend::{Backend, PresentMode};
use crate::builder::{GameConfig, WindowStyle};
use crate::frame::{FrameBuffer, Rect};
use crate::joystick::Joysticks;

type WindowSurface = Surface<OwnedDisplayHandle, Arc<Window>>;

/// Window + softbuffer surface.
///
/// Fields drop in declaration order: the surface goes before the context,
/// the context before the window, and the event loop last.
pub struct WinitBackend {
    surface: Option<WindowSurface>,
    context: Option<Context<OwnedDisplayHandle>>,
    window: Option<Arc<Window>>,
    event_loop: Option<EventLoop<()>>,
    queue: Vec<RawEvent>,
    cursor: Option<Point>,
    buttons: ButtonMask,
    modifiers: Modifiers,
    joysticks: Option<Joysticks>,
}

impl WinitBackend {
    /// Brings up the windowing engine and opens a window for `config`.
    ///
    /// Fails with `Initialization` when `config.init_engine` is off; use
    /// [`open_on`](Self::open_on) with an event loop created by the caller.
    pub fn open(config: &GameConfig) -> Result<Self> {
        if !config.init_engine {
            return Err(GameError::Initialization(
                "windowing engine not initialized; pass an event loop to WinitBackend::open_on"
                    .into(),
            ));
        }
        let event_loop = EventLoop::new().map_err(|e| GameError::Initialization(e.to_string()))?;
        Self::open_on(event_loop, config)
    }

    /// Opens a window on an existing event loop.
    pub fn open_on(mut event_loop: EventLoop<()>, config: &GameConfig) -> Result<Self> {
        config.validate()?;

        let mut creator = Creator {
            attributes: Some(window_attributes(config)),
            result: None,
        };
        // resumed() fires during the first pump on desktop platforms
        if let PumpStatus::Exit(code) =
            event_loop.pump_app_events(Some(Duration::from_millis(100)), &mut creator)
        {
            return Err(GameError::Initialization(format!(
                "event loop exited during window creation (code {code})"
            )));
        }

        let (window, context, mut surface) = match creator.result {
            Some(Ok(parts)) => parts,
            Some(Err(msg)) => return Err(GameError::Initialization(msg)),
            None => {
                return Err(GameError::Initialization(
                    "window was never created by the event loop".into(),
                ))
            }
        };

        if let (Some(w), Some(h)) = (NonZeroU32::new(config.width), NonZeroU32::new(config.height)) {
            surface
                .resize(w, h)
                .map_err(|e| GameError::Initialization(e.to_string()))?;
        }

        log::debug!(
            "window {}x{} created (style {:?}, depth {})",
            config.width,
            config.height,
            config.style.names(),
            config.depth
        );

        // a missing controller subsystem only disables joystick events
        let joysticks = match Joysticks::new() {
            Ok(pads) => {
                log::debug!("{} joystick(s) connected", pads.count());
                Some(pads)
            }
            Err(e) => {
                log::warn!("joysticks unavailable: {e}");
                None
            }
        };

        Ok(Self {
            surface: Some(surface),
            context: Some(context),
            window: Some(window),
            event_loop: Some(event_loop),
            queue: Vec::new(),
            cursor: None,
            buttons: [false; 3],
            modifiers: Modifiers::empty(),
            joysticks,
        })
    }

    /// Controller access, `None` when gilrs could not start.
    pub fn joysticks(&self) -> Option<&Joysticks> {
        self.joysticks.as_ref()
    }

    fn window(&self) -> Result<&Arc<Window>> {
        self.window
            .as_ref()
            .ok_or_else(|| GameError::Display("window already released".into()))
    }

    fn mouse_event(&self, kind: EventKind, button: u8) -> RawEvent {
        let mut raw = RawEvent::new(kind).with_button(button);
        raw.pos = self.cursor;
        raw
    }

    fn translate(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.queue.push(RawEvent::quit()),
            WindowEvent::ModifiersChanged(m) => {
                let state = m.state();
                let mut mods = Modifiers::empty();
                mods.set(Modifiers::SHIFT, state.shift_key());
                mods.set(Modifiers::CTRL, state.control_key());
                mods.set(Modifiers::ALT, state.alt_key());
                mods.set(Modifiers::META, state.super_key());
                self.modifiers = mods;
            }
            WindowEvent::KeyboardInput { event, .. } => {
                // held keys auto-repeat on most platforms; report the first press only
                if event.repeat {
                    return;
                }
                let kind = match event.state {
                    ElementState::Pressed => EventKind::KeyDown,
                    ElementState::Released => EventKind::KeyUp,
                };
                let mut raw = RawEvent::new(kind).with_modifiers(self.modifiers);
                if let PhysicalKey::Code(code) = event.physical_key {
                    raw.key = Some(code);
                }
                if kind == EventKind::KeyDown {
                    raw.unicode = event.text.map(|t| t.to_string());
                }
                self.queue.push(raw);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = (position.x as i32, position.y as i32);
                let rel = self
                    .cursor
                    .map(|(px, py)| (pos.0 - px, pos.1 - py))
                    .unwrap_or((0, 0));
                self.cursor = Some(pos);
                let raw = RawEvent::new(EventKind::MouseMove)
                    .with_pos(pos.0, pos.1)
                    .with_rel(rel.0, rel.1)
                    .with_buttons(self.buttons);
                self.queue.push(raw);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.buttons[0] = pressed,
                    MouseButton::Middle => self.buttons[1] = pressed,
                    MouseButton::Right => self.buttons[2] = pressed,
                    _ => {}
                }
                let kind = if pressed {
                    EventKind::MouseDown
                } else {
                    EventKind::MouseUp
                };
                let raw = self.mouse_event(kind, button_number(button));
                self.queue.push(raw);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(p) => p.y,
                };
                self.queue.extend(wheel_clicks(self.cursor, dy));
            }
            WindowEvent::Resized(size) => {
                if let (Some(surface), Some(w), Some(h)) = (
                    self.surface.as_mut(),
                    NonZeroU32::new(size.width),
                    NonZeroU32::new(size.height),
                ) {
                    if let Err(e) = surface.resize(w, h) {
                        log::warn!("surface resize failed: {e}");
                    }
                }
                self.queue
                    .push(RawEvent::new(EventKind::Resize).with_size(size.width, size.height));
            }
            WindowEvent::Focused(focused) => {
                let mut raw = RawEvent::new(EventKind::Active);
                raw.gain = Some(focused);
                raw.state = Some(2);
                self.queue.push(raw);
            }
            WindowEvent::CursorEntered { .. } | WindowEvent::CursorLeft { .. } => {
                let mut raw = RawEvent::new(EventKind::Active);
                raw.gain = Some(matches!(event, WindowEvent::CursorEntered { .. }));
                raw.state = Some(1);
                self.queue.push(raw);
            }
            _ => {}
        }
    }
}

/// A wheel step is a full click of a scroll button: press, then release.
fn wheel_clicks(cursor: Option<Point>, dy: f64) -> Vec<RawEvent> {
    if dy == 0.0 {
        return Vec::new();
    }
    let button = if dy > 0.0 { ROLLING_UP } else { ROLLING_DOWN };
    [EventKind::MouseDown, EventKind::MouseUp]
        .into_iter()
        .map(|kind| {
            let mut raw = RawEvent::new(kind).with_button(button);
            raw.pos = cursor;
            raw
        })
        .collect()
}

fn window_attributes(config: &GameConfig) -> WindowAttributes {
    let mut attributes = Window::default_attributes()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(config.style.contains(WindowStyle::RESIZABLE))
        .with_decorations(!config.style.contains(WindowStyle::NO_FRAME));
    if config.style.contains(WindowStyle::FULLSCREEN) {
        attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    attributes
}

impl ApplicationHandler for WinitBackend {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.window.is_none() {
            return;
        }
        self.translate(event);
    }
}

impl Backend for WinitBackend {
    fn poll_events(&mut self, out: &mut Vec<RawEvent>) {
        // take the loop out so `self` can act as the handler while pumping
        if let Some(mut event_loop) = self.event_loop.take() {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), self);
            self.event_loop = Some(event_loop);
            if let PumpStatus::Exit(_) = status {
                self.queue.push(RawEvent::quit());
            }
        }
        if let Some(pads) = &self.joysticks {
            pads.poll(&mut self.queue);
        }
        out.append(&mut self.queue);
    }

    fn present(&mut self, frame: &FrameBuffer, mode: PresentMode) -> Result<()> {
        if let PresentMode::Damage(regions) = &mode {
            if regions.is_empty() {
                return Ok(());
            }
        }
        let window = self.window()?.clone();
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| GameError::Display("surface already released".into()))?;

        let (w, h) = frame.size();
        let (Some(nw), Some(nh)) = (NonZeroU32::new(w), NonZeroU32::new(h)) else {
            return Ok(());
        };
        surface
            .resize(nw, nh)
            .map_err(|e| GameError::Display(e.to_string()))?;

        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| GameError::Display(e.to_string()))?;
        if buffer.len() != frame.pixels().len() {
            return Err(GameError::Display(format!(
                "surface buffer holds {} pixels, frame has {}",
                buffer.len(),
                frame.pixels().len()
            )));
        }
        buffer.copy_from_slice(frame.pixels());

        window.pre_present_notify();
        match mode {
            PresentMode::Full => buffer.present(),
            PresentMode::Damage(regions) => {
                let rects: Vec<softbuffer::Rect> = regions
                    .iter()
                    .filter_map(|r| to_surface_rect(r, frame))
                    .collect();
                buffer.present_with_damage(&rects)
            }
        }
        .map_err(|e| GameError::Display(e.to_string()))
    }

    fn set_title(&mut self, title: &str) {
        if let Some(window) = &self.window {
            window.set_title(title);
        }
    }

    fn set_icon(&mut self, icon: &RgbaImage) -> Result<()> {
        let (w, h) = icon.dimensions();
        let icon = Icon::from_rgba(icon.as_raw().clone(), w, h)
            .map_err(|e| GameError::Initialization(format!("bad window icon: {e}")))?;
        self.window()?.set_window_icon(Some(icon));
        Ok(())
    }

    fn set_cursor_position(&mut self, pos: Point) -> Result<()> {
        self.window()?
            .set_cursor_position(PhysicalPosition::new(pos.0 as f64, pos.1 as f64))
            .map_err(|e| GameError::Display(e.to_string()))?;
        self.cursor = Some(pos);
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(visible);
        }
    }

    fn toggle_fullscreen(&mut self) {
        if let Some(window) = &self.window {
            if window.fullscreen().is_some() {
                window.set_fullscreen(None);
            } else {
                window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            }
        }
    }

    fn release(&mut self) {
        self.surface = None;
        self.context = None;
        self.window = None;
        self.queue.clear();
    }

    fn is_released(&self) -> bool {
        self.window.is_none()
    }
}

fn to_surface_rect(rect: &Rect, frame: &FrameBuffer) -> Option<softbuffer::Rect> {
    let area = rect.clip(&frame.bounds())?;
    Some(softbuffer::Rect {
        x: area.x as u32,
        y: area.y as u32,
        width: NonZeroU32::new(area.width)?,
        height: NonZeroU32::new(area.height)?,
    })
}

/// One-shot handler that creates the window inside `resumed`, as winit 0.30
/// requires.
struct Creator {
    attributes: Option<WindowAttributes>,
    #[allow(clippy::type_complexity)]
    result: Option<std::result::Result<(Arc<Window>, Context<OwnedDisplayHandle>, WindowSurface), String>>,
}

impl ApplicationHandler for Creator {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.attributes.take() else {
            return;
        };
        let result = event_loop
            .create_window(attributes)
            .map_err(|e| e.to_string())
            .and_then(|window| {
                let window = Arc::new(window);
                let context =
                    Context::new(event_loop.owned_display_handle()).map_err(|e| e.to_string())?;
                let surface = Surface::new(&context, window.clone()).map_err(|e| e.to_string())?;
                Ok((window, context, surface))
            });
        self.result = Some(result);
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_follow_style_flags() {
        let cfg = GameConfig::new()
            .with_title("Styled")
            .with_style(WindowStyle::NO_FRAME | WindowStyle::RESIZABLE);
        let attrs = window_attributes(&cfg);
        assert_eq!(attrs.title, "Styled");
        assert!(attrs.resizable);
        assert!(!attrs.decorations);
        assert!(attrs.fullscreen.is_none());

        let full = window_attributes(&GameConfig::new().with_style(WindowStyle::FULLSCREEN));
        assert!(full.fullscreen.is_some());
        assert!(!full.resizable);
    }

    #[test]
    fn engine_must_be_initialized() {
        let cfg = GameConfig::new().with_init_engine(false);
        assert!(matches!(
            WinitBackend::open(&cfg),
            Err(GameError::Initialization(_))
        ));
    }

    #[test]
    fn wheel_steps_press_and_release_the_scroll_button() {
        let down = wheel_clicks(Some((4, 5)), -1.0);
        assert_eq!(down.len(), 2);
        assert_eq!(down[0].kind, EventKind::MouseDown);
        assert_eq!(down[1].kind, EventKind::MouseUp);
        assert!(down.iter().all(|e| e.button == Some(ROLLING_DOWN) && e.pos == Some((4, 5))));

        let up = wheel_clicks(None, 0.5);
        assert!(up.iter().all(|e| e.button == Some(ROLLING_UP)));
        assert!(wheel_clicks(Some((0, 0)), 0.0).is_empty());
    }

    #[test]
    fn damage_rects_are_clipped_for_the_surface() {
        let fb = FrameBuffer::new(10, 10);
        let r = to_surface_rect(&Rect::new(8, -2, 5, 5), &fb).unwrap();
        assert_eq!((r.x, r.y, r.width.get(), r.height.get()), (8, 0, 2, 3));
        assert!(to_surface_rect(&Rect::new(20, 20, 1, 1), &fb).is_none());
    }
}
