use std::cell::{Cell, Ref, RefCell, RefMut};
use std::path::PathBuf;
use std::rc::Rc;

use fastgame_core::{Event, GameError, InputState, KeyCode, Point, Result, Time};

use crate::frame::FrameBuffer;

/// Request queued by a callback and applied by the loop between callbacks.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    SetTitle(String),
    SetMousePosition(Point),
    SetCursorVisible(bool),
    ToggleFullscreen,
    Screenshot(PathBuf),
    Exit,
}

struct Shared {
    id: usize,
    title: RefCell<String>,
    frame: RefCell<FrameBuffer>,
    event: RefCell<Event>,
    event_serial: Cell<u64>,
    input: RefCell<InputState>,
    counter: Cell<u64>,
    time: Cell<Time>,
    debug: Cell<bool>,
    commands: RefCell<Vec<Command>>,
}

/// Shared view of one session, handed to widgets and captured by callbacks.
///
/// Callbacks run while the session itself is mutably borrowed by `run`, so
/// they cannot reach the session directly.  The handle exposes everything a
/// callback reads per frame (current event, input, frame counter, the frame
/// buffer to draw into) and queues window requests that the loop applies
/// before it moves on.
///
/// ```rust,ignore
/// let game = session.handle();
/// session.update(move || {
///     if game.check_rate(10) {
///         game.frame_mut().fill_rect(Rect::new(0, 0, 20, 20), Color::RED);
///     }
///     Ok(())
/// });
/// ```
#[derive(Clone)]
pub struct SessionHandle {
    inner: Rc<Shared>,
}

impl SessionHandle {
    pub(crate) fn new(id: usize, title: &str, width: u32, height: u32, debug: bool) -> Self {
        Self {
            inner: Rc::new(Shared {
                id,
                title: RefCell::new(title.to_string()),
                frame: RefCell::new(FrameBuffer::new(width, height)),
                event: RefCell::new(Event::None),
                event_serial: Cell::new(0),
                input: RefCell::new(InputState::new()),
                counter: Cell::new(0),
                time: Cell::new(Time::default()),
                debug: Cell::new(debug),
                commands: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Position of this session in its [`SessionList`].
    pub fn id(&self) -> usize {
        self.inner.id
    }

    pub fn same_session(&self, other: &SessionHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn title(&self) -> String {
        self.inner.title.borrow().clone()
    }

    pub fn set_title(&self, title: &str) {
        self.store_title(title);
        self.push(Command::SetTitle(title.to_string()));
    }

    pub(crate) fn store_title(&self, title: &str) {
        *self.inner.title.borrow_mut() = title.to_string();
    }

    pub fn size(&self) -> (u32, u32) {
        self.inner.frame.borrow().size()
    }

    pub fn width(&self) -> u32 {
        self.size().0
    }

    pub fn height(&self) -> u32 {
        self.size().1
    }

    /// Read access to the frame buffer.
    pub fn frame(&self) -> Ref<'_, FrameBuffer> {
        self.inner.frame.borrow()
    }

    /// Write access to the frame buffer.  Do not hold it across a return
    /// to the loop.
    pub fn frame_mut(&self) -> RefMut<'_, FrameBuffer> {
        self.inner.frame.borrow_mut()
    }

    /// The event currently being dispatched (or the last one seen).
    pub fn event(&self) -> Event {
        self.inner.event.borrow().clone()
    }

    pub fn with_event<R>(&self, f: impl FnOnce(&Event) -> R) -> R {
        f(&self.inner.event.borrow())
    }

    /// Number of events dispatched so far; tells a repeated read of
    /// [`event`](Self::event) apart from a new event.
    pub fn event_serial(&self) -> u64 {
        self.inner.event_serial.get()
    }

    pub(crate) fn set_event(&self, event: Event) {
        self.inner.input.borrow_mut().apply(&event);
        *self.inner.event.borrow_mut() = event;
        self.inner.event_serial.set(self.inner.event_serial.get() + 1);
    }

    pub fn input(&self) -> Ref<'_, InputState> {
        self.inner.input.borrow()
    }

    pub fn mouse_position(&self) -> Point {
        self.inner.input.borrow().mouse_position()
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.inner.input.borrow().is_key_pressed(key)
    }

    /// Frame counter; reset to zero when `run` starts.
    pub fn counter(&self) -> u64 {
        self.inner.counter.get()
    }

    pub(crate) fn reset_counter(&self) {
        self.inner.counter.set(0);
    }

    pub(crate) fn bump_counter(&self) -> u64 {
        let next = self.inner.counter.get() + 1;
        self.inner.counter.set(next);
        next
    }

    /// True on frames whose counter is a multiple of `rate`.  A rate of
    /// zero never matches.
    pub fn check_rate(&self, rate: u64) -> bool {
        rate != 0 && self.counter() % rate == 0
    }

    pub fn time(&self) -> Time {
        self.inner.time.get()
    }

    pub(crate) fn set_time(&self, time: Time) {
        self.inner.time.set(time);
    }

    pub fn is_debug(&self) -> bool {
        self.inner.debug.get()
    }

    pub fn set_debug(&self, debug: bool) {
        self.inner.debug.set(debug);
    }

    /// Asks the loop to shut the session down once the current callback
    /// returns.
    pub fn request_exit(&self) {
        self.push(Command::Exit);
    }

    pub fn set_mouse_position(&self, x: i32, y: i32) {
        self.push(Command::SetMousePosition((x, y)));
    }

    pub fn hide_mouse(&self) {
        self.push(Command::SetCursorVisible(false));
    }

    pub fn show_mouse(&self) {
        self.push(Command::SetCursorVisible(true));
    }

    pub fn toggle_fullscreen(&self) {
        self.push(Command::ToggleFullscreen);
    }

    /// Saves the frame as it stands after the current callback.
    pub fn screenshot(&self, path: impl Into<PathBuf>) {
        self.push(Command::Screenshot(path.into()));
    }

    fn push(&self, command: Command) {
        self.inner.commands.borrow_mut().push(command);
    }

    pub(crate) fn drain_commands(&self) -> Vec<Command> {
        std::mem::take(&mut *self.inner.commands.borrow_mut())
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id())
            .field("title", &self.title())
            .field("size", &self.size())
            .finish()
    }
}

/// Every session created in this context, oldest first.
///
/// The list is append-only.  Widgets that are not given a handle explicitly
/// bind to [`current`](Self::current), the most recently created session.
#[derive(Default, Debug)]
pub struct SessionList {
    sessions: Vec<SessionHandle>,
}

impl SessionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_id(&self) -> usize {
        self.sessions.len()
    }

    pub(crate) fn push(&mut self, handle: SessionHandle) {
        self.sessions.push(handle);
    }

    /// The most recently created session.
    pub fn current(&self) -> Result<SessionHandle> {
        self.sessions.last().cloned().ok_or_else(GameError::no_session)
    }

    pub fn get(&self, id: usize) -> Option<&SessionHandle> {
        self.sessions.get(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionHandle> {
        self.sessions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastgame_core::{normalize, EventKind, RawEvent};

    #[test]
    fn empty_list_has_no_current_session() {
        let list = SessionList::new();
        assert!(matches!(list.current(), Err(GameError::ResourceMissing(_))));
    }

    #[test]
    fn current_is_the_latest() {
        let mut list = SessionList::new();
        list.push(SessionHandle::new(0, "a", 10, 10, false));
        list.push(SessionHandle::new(1, "b", 20, 20, false));
        let cur = list.current().unwrap();
        assert_eq!(cur.title(), "b");
        assert!(cur.same_session(list.get(1).unwrap()));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn rate_gate_follows_the_counter() {
        let h = SessionHandle::new(0, "t", 1, 1, false);
        let mut hits = Vec::new();
        for _ in 0..12 {
            let f = h.bump_counter();
            if h.check_rate(4) {
                hits.push(f);
            }
        }
        assert_eq!(hits, vec![4, 8, 12]);
        assert!(!h.check_rate(0));
    }

    #[test]
    fn events_feed_input_state() {
        let h = SessionHandle::new(0, "t", 1, 1, false);
        assert_eq!(h.event_serial(), 0);
        h.set_event(normalize(&RawEvent::new(EventKind::MouseMove).with_pos(7, 9)));
        assert_eq!(h.mouse_position(), (7, 9));
        assert_eq!(h.event().kind(), EventKind::MouseMove);
        // same event twice still counts twice
        h.set_event(normalize(&RawEvent::new(EventKind::MouseMove).with_pos(7, 9)));
        assert_eq!(h.event_serial(), 2);
    }

    #[test]
    fn requests_queue_until_drained() {
        let h = SessionHandle::new(0, "t", 1, 1, false);
        h.set_title("new");
        h.request_exit();
        assert_eq!(h.title(), "new");
        assert_eq!(
            h.drain_commands(),
            vec![Command::SetTitle("new".into()), Command::Exit]
        );
        assert!(h.drain_commands().is_empty());
    }
}
