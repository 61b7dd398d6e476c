use std::path::Path;

use fastgame_core::{normalize, Color, Event, EventKind, FrameClock, GameError, KeyCode, Result};
use log::Level;

use crate::backend::{Backend, PresentMode};
use crate::builder::GameConfig;
use crate::callbacks::{Callbacks, EndArgs, Slot};
use crate::config::{ExitMode, FpsPhase, RunOptions};
use crate::context::{Command, SessionHandle, SessionList};
use crate::window::WinitBackend;

/// Exit code recorded when the loop stops on an error.
const FAILURE_EXIT_CODE: i32 = 1;

/// One window plus its main loop.
///
/// A session is created from a [`GameConfig`], gets its callbacks attached
/// with the slot setters and is then driven by [`run`](Self::run) until a
/// quit event, an Escape press (when enabled), an exit request from a
/// callback or a callback error.
///
/// ```rust,ignore
/// let mut sessions = SessionList::new();
/// let mut game = GameConfig::new().with_title("Snake").build(&mut sessions)?;
/// let handle = game.handle();
/// game.update(move || {
///     handle.frame_mut().fill_rect(Rect::new(10, 10, 20, 20), Color::GREEN);
///     Ok(())
/// })
/// .on_key_down(|| Ok(()));
/// game.run(RunOptions::new().with_escape_quits(true))?;
/// ```
pub struct Session<B: Backend = WinitBackend> {
    config: GameConfig,
    backend: B,
    handle: SessionHandle,
    callbacks: Callbacks,
    clock: FrameClock,
    /// `Some` once the session has shut down.
    exit_code: Option<i32>,
    events: Vec<fastgame_core::RawEvent>,
}

impl Session<WinitBackend> {
    /// Opens a winit window for `config` and registers the session.
    pub fn create(sessions: &mut SessionList, config: GameConfig) -> Result<Self> {
        config.validate()?;
        let backend = WinitBackend::open(&config)?;
        Self::with_backend(sessions, config, backend)
    }
}

impl<B: Backend> Session<B> {
    /// Builds a session on top of an already opened backend.
    pub fn with_backend(sessions: &mut SessionList, config: GameConfig, mut backend: B) -> Result<Self> {
        config.validate()?;

        backend.set_title(&config.title);
        if let Some(path) = &config.icon {
            if !path.exists() {
                return Err(GameError::ResourceMissing(format!(
                    "icon file {} does not exist",
                    path.display()
                )));
            }
            let icon = image::open(path)?.to_rgba8();
            backend.set_icon(&icon)?;
        }

        let handle = SessionHandle::new(
            sessions.next_id(),
            &config.title,
            config.width,
            config.height,
            config.debug,
        );
        sessions.push(handle.clone());

        if config.debug {
            log::info!(
                "session {} created: \"{}\" {}x{} @ {} fps",
                handle.id(),
                config.title,
                config.width,
                config.height,
                config.fps
            );
        }

        Ok(Self {
            config,
            backend,
            handle,
            callbacks: Callbacks::new(),
            clock: FrameClock::new(),
            exit_code: None,
            events: Vec::new(),
        })
    }

    // ── callback registration ───────────────────────────────────────────

    /// Attaches `f` to `slot`, replacing the previous callback.
    pub fn register<F>(&mut self, slot: Slot, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.callbacks.set(slot, f);
        self
    }

    pub fn when_start<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.register(Slot::Start, f)
    }

    /// The end callback receives the arguments passed to
    /// [`shutdown`](Self::shutdown).
    pub fn when_end<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&EndArgs) -> anyhow::Result<()> + 'static,
    {
        self.callbacks.set_end(f);
        self
    }

    pub fn update<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.register(Slot::Update, f)
    }

    pub fn on_mouse_down<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.register(Slot::MouseDown, f)
    }

    pub fn on_mouse_up<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.register(Slot::MouseUp, f)
    }

    pub fn on_mouse_move<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.register(Slot::MouseMove, f)
    }

    pub fn on_key_down<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.register(Slot::KeyDown, f)
    }

    pub fn on_key_up<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.register(Slot::KeyUp, f)
    }

    /// Registers an application-defined hook; reserved names map to slots.
    pub fn set_named<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.callbacks.set_named(name, f);
        self
    }

    /// Runs a named hook.  `Ok(false)` when nothing is registered under it.
    pub fn invoke_named(&mut self, name: &str) -> Result<bool> {
        self.callbacks
            .invoke_named(name)
            .map_err(|source| GameError::Callback {
                slot: name.to_string(),
                source,
            })
    }

    pub fn is_registered(&self, slot: Slot) -> bool {
        self.callbacks.is_registered(slot)
    }

    // ── state ───────────────────────────────────────────────────────────

    /// Shared view of this session for widgets and callbacks.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn counter(&self) -> u64 {
        self.handle.counter()
    }

    /// True every `rate` frames; never true for a rate of zero.
    pub fn check_rate(&self, rate: u64) -> bool {
        self.handle.check_rate(rate)
    }

    pub fn title(&self) -> String {
        self.handle.title()
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.handle.store_title(title);
        self.config.title = title.to_string();
        self.backend.set_title(title);
        self
    }

    pub fn set_background(&mut self, color: Color) -> &mut Self {
        self.config.background = color;
        self
    }

    pub fn mouse_position(&self) -> fastgame_core::Point {
        self.handle.mouse_position()
    }

    pub fn set_mouse_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.backend.set_cursor_position((x, y))
    }

    pub fn hide_mouse(&mut self) -> &mut Self {
        self.backend.set_cursor_visible(false);
        self
    }

    pub fn show_mouse(&mut self) -> &mut Self {
        self.backend.set_cursor_visible(true);
        self
    }

    pub fn toggle_fullscreen(&mut self) -> &mut Self {
        self.backend.toggle_fullscreen();
        self
    }

    /// Flips the debug flag and returns the new value.
    pub fn toggle_debug(&mut self) -> bool {
        let debug = !self.handle.is_debug();
        self.handle.set_debug(debug);
        self.config.debug = debug;
        debug
    }

    /// Writes the current frame to `path`; the format follows the extension.
    pub fn screenshot(&self, path: impl AsRef<Path>) -> Result<()> {
        save_frame(&self.handle, path.as_ref())
    }

    pub fn is_shut_down(&self) -> bool {
        self.exit_code.is_some()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    // ── loop ────────────────────────────────────────────────────────────

    /// Runs the main loop until the session shuts down.
    ///
    /// Returns the exit code in [`ExitMode::Return`]; in
    /// [`ExitMode::Terminate`] the process exits instead.  A callback error
    /// stops the loop, releases the window without running `end` and comes
    /// back as [`GameError::Callback`].
    pub fn run(&mut self, options: RunOptions) -> Result<i32> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        match self.run_frames(&options) {
            Ok(()) => self.shutdown(options.exit_code, options.exit_mode, EndArgs::default()),
            Err(err) => {
                if !self.is_shut_down() {
                    log::error!("main loop stopped: {err}");
                    self.backend.release();
                    self.exit_code = Some(FAILURE_EXIT_CODE);
                }
                Err(err)
            }
        }
    }

    /// Returns once the loop should shut down.
    fn run_frames(&mut self, options: &RunOptions) -> Result<()> {
        self.call(Slot::Start)?;
        self.trace(Level::Info, "Starting...");
        if self.apply_commands()? {
            return Ok(());
        }
        self.handle.reset_counter();
        self.clock = FrameClock::new();

        loop {
            self.handle.bump_counter();
            if options.fps_phase == FpsPhase::Before {
                self.pace();
            }

            self.handle.frame_mut().clear(self.config.background);
            self.call(Slot::Update)?;
            if self.apply_commands()? {
                return Ok(());
            }

            if self.pump_events(options)? {
                return Ok(());
            }

            self.present(options.full_redraw)?;
            if options.fps_phase == FpsPhase::After {
                self.pace();
            }
        }
    }

    fn pace(&mut self) {
        let time = self.clock.tick(self.config.fps);
        self.handle.set_time(time);
    }

    /// Polls the backend and dispatches every pending event.  `true` means
    /// the loop must stop.
    fn pump_events(&mut self, options: &RunOptions) -> Result<bool> {
        let mut pending = std::mem::take(&mut self.events);
        pending.clear();
        self.backend.poll_events(&mut pending);

        let mut stop = false;
        for raw in pending.drain(..) {
            if self.dispatch(normalize(&raw), options)? || self.apply_commands()? {
                stop = true;
                break;
            }
        }
        self.events = pending;
        Ok(stop)
    }

    fn dispatch(&mut self, event: Event, options: &RunOptions) -> Result<bool> {
        let kind = event.kind();
        let escape = event.is_key_down(KeyCode::Escape);
        if let Event::Resize { size: Some((w, h)) } = event {
            self.handle.frame_mut().resize(w, h);
        }
        self.handle.set_event(event);

        match kind {
            EventKind::Quit => return Ok(true),
            EventKind::MouseDown => {
                self.trace(Level::Debug, "Mouse button down");
                self.call(Slot::MouseDown)?;
            }
            EventKind::MouseUp => {
                self.trace(Level::Debug, "Mouse button up");
                self.call(Slot::MouseUp)?;
            }
            EventKind::MouseMove => {
                self.trace(Level::Debug, "Mouse is moving");
                self.call(Slot::MouseMove)?;
            }
            EventKind::KeyDown => {
                self.trace(Level::Debug, "A key down");
                self.call(Slot::KeyDown)?;
                if escape {
                    self.trace(Level::Info, "Press ESC");
                    if options.escape_quits {
                        return Ok(true);
                    }
                }
            }
            EventKind::KeyUp => {
                self.trace(Level::Debug, "A key up");
                self.call(Slot::KeyUp)?;
            }
            _ => {}
        }
        Ok(false)
    }

    fn present(&mut self, full_redraw: bool) -> Result<()> {
        let mut frame = self.handle.frame_mut();
        let mode = if full_redraw {
            // keep the damage history in step for a later switch to partial presents
            frame.take_damage();
            PresentMode::Full
        } else {
            PresentMode::Damage(frame.take_damage())
        };
        self.backend.present(&frame, mode)
    }

    /// Applies requests queued through the handle.  `true` on an exit request.
    fn apply_commands(&mut self) -> Result<bool> {
        let mut exit = false;
        for command in self.handle.drain_commands() {
            match command {
                Command::SetTitle(title) => {
                    self.config.title = title.clone();
                    self.backend.set_title(&title);
                }
                Command::SetMousePosition(pos) => self.backend.set_cursor_position(pos)?,
                Command::SetCursorVisible(visible) => self.backend.set_cursor_visible(visible),
                Command::ToggleFullscreen => self.backend.toggle_fullscreen(),
                Command::Screenshot(path) => save_frame(&self.handle, &path)?,
                Command::Exit => exit = true,
            }
        }
        Ok(exit)
    }

    fn call(&mut self, slot: Slot) -> Result<()> {
        self.callbacks
            .invoke(slot)
            .map(|_| ())
            .map_err(|source| GameError::Callback {
                slot: slot.name().to_string(),
                source,
            })
    }

    /// Debug-mode tracing: lifecycle lines at info, per-event lines at debug.
    fn trace(&self, level: Level, message: &str) {
        if self.handle.is_debug() {
            log::log!(level, "{message}");
        }
    }

    /// Releases the window, runs the `end` callback with `args` and, in
    /// [`ExitMode::Terminate`], exits the process with `exit_code`.
    ///
    /// Only the first call does anything; later calls return the exit code
    /// recorded by the first.
    pub fn shutdown(&mut self, exit_code: i32, mode: ExitMode, args: EndArgs) -> Result<i32> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        self.exit_code = Some(exit_code);
        self.trace(Level::Info, "Quitting...");

        self.backend.release();
        // requests aimed at the released window are dropped
        self.handle.drain_commands();

        self.callbacks
            .invoke_with(Slot::End, &args)
            .map_err(|source| GameError::Callback {
                slot: Slot::End.name().to_string(),
                source,
            })?;

        if mode == ExitMode::Terminate {
            log::logger().flush();
            std::process::exit(exit_code);
        }
        Ok(exit_code)
    }
}

fn save_frame(handle: &SessionHandle, path: &Path) -> Result<()> {
    handle.frame().to_image().save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;
    use fastgame_core::RawEvent;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(backend: HeadlessBackend) -> (SessionList, Session<HeadlessBackend>) {
        let mut list = SessionList::new();
        let cfg = GameConfig::new().with_size(16, 16).with_fps(1000);
        let s = Session::with_backend(&mut list, cfg, backend).unwrap();
        (list, s)
    }

    #[test]
    fn construction_registers_the_session() {
        let (list, s) = session(HeadlessBackend::new());
        assert_eq!(list.len(), 1);
        assert!(list.current().unwrap().same_session(&s.handle()));
        assert_eq!(s.backend().title(), "Fast Game Window");
    }

    #[test]
    fn invalid_config_is_rejected_before_registration() {
        let mut list = SessionList::new();
        let cfg = GameConfig::new().with_fps(0);
        let res = Session::with_backend(&mut list, cfg, HeadlessBackend::new());
        assert!(matches!(res, Err(GameError::InvalidConfiguration(_))));
        assert!(list.is_empty());
    }

    #[test]
    fn missing_icon_is_reported() {
        let mut list = SessionList::new();
        let cfg = GameConfig::new().with_icon("/definitely/not/here.png");
        let res = Session::with_backend(&mut list, cfg, HeadlessBackend::new());
        assert!(matches!(res, Err(GameError::ResourceMissing(_))));
    }

    #[test]
    fn icon_is_loaded_and_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.png");
        image::RgbaImage::new(8, 4).save(&path).unwrap();

        let mut list = SessionList::new();
        let cfg = GameConfig::new().with_icon(&path);
        let s = Session::with_backend(&mut list, cfg, HeadlessBackend::new()).unwrap();
        assert_eq!(s.backend().icon_size(), Some((8, 4)));
    }

    #[test]
    fn setters_chain() {
        let (_list, mut s) = session(HeadlessBackend::new());
        s.update(|| Ok(()))
            .on_key_down(|| Ok(()))
            .set_title("Chained")
            .hide_mouse();
        assert!(s.is_registered(Slot::Update));
        assert!(s.is_registered(Slot::KeyDown));
        assert_eq!(s.backend().title(), "Chained");
        assert_eq!(s.title(), "Chained");
        assert!(!s.backend().cursor_visible());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (_list, mut s) = session(HeadlessBackend::new());
        let ends = Rc::new(RefCell::new(0));
        let e = ends.clone();
        s.when_end(move |_| {
            *e.borrow_mut() += 1;
            Ok(())
        });

        assert_eq!(s.shutdown(3, ExitMode::Return, EndArgs::new()).unwrap(), 3);
        assert_eq!(s.shutdown(9, ExitMode::Return, EndArgs::new()).unwrap(), 3);
        assert_eq!(*ends.borrow(), 1);
        assert!(s.backend().is_released());
        // a shut-down session does not run again
        assert_eq!(s.run(RunOptions::new().returning()).unwrap(), 3);
        assert_eq!(s.backend().polls(), 0);
    }

    #[test]
    fn toggle_debug_flips_the_handle_flag() {
        let (_list, mut s) = session(HeadlessBackend::new());
        assert!(s.toggle_debug());
        assert!(s.handle().is_debug());
        assert!(!s.toggle_debug());
    }

    #[test]
    fn resize_events_resize_the_frame() {
        let backend = HeadlessBackend::new()
            .with_frame(vec![RawEvent::new(EventKind::Resize).with_size(40, 30)]);
        let (_list, mut s) = session(backend);
        s.run(RunOptions::new().returning()).unwrap();
        assert_eq!(s.handle().size(), (40, 30));
    }

    #[test]
    fn named_hooks_report_their_name_on_failure() {
        let (_list, mut s) = session(HeadlessBackend::new());
        s.set_named("judge", || Err(anyhow::anyhow!("no")));
        match s.invoke_named("judge") {
            Err(GameError::Callback { slot, .. }) => assert_eq!(slot, "judge"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!s.invoke_named("other").unwrap());
    }
}
