use std::collections::VecDeque;

use fastgame_core::{Point, RawEvent, Result};
use image::RgbaImage;

use crate::frame::{FrameBuffer, Rect};

/// How much of the frame a present should push to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentMode {
    Full,
    /// Only these regions changed.  An empty list means nothing to show.
    Damage(Vec<Rect>),
}

/// The display and event source behind a session.
///
/// A backend owns the window resource.  After [`release`](Self::release)
/// it must not touch the window again; the session never calls it twice.
pub trait Backend {
    /// Appends every pending engine event to `out` without blocking.
    fn poll_events(&mut self, out: &mut Vec<RawEvent>);

    fn present(&mut self, frame: &FrameBuffer, mode: PresentMode) -> Result<()>;

    fn set_title(&mut self, title: &str);

    fn set_icon(&mut self, icon: &RgbaImage) -> Result<()>;

    fn set_cursor_position(&mut self, pos: Point) -> Result<()>;

    fn set_cursor_visible(&mut self, visible: bool);

    fn toggle_fullscreen(&mut self);

    /// Drops the window resource.
    fn release(&mut self);

    fn is_released(&self) -> bool;
}

/// Backend without a window, fed from a script of event batches.
///
/// Each call to `poll_events` hands out the next batch.  Once the script is
/// exhausted the backend reports a quit, so a headless run always ends.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    script: VecDeque<Vec<RawEvent>>,
    polls: usize,
    presents: Vec<PresentMode>,
    last_frame: Option<Vec<u32>>,
    title: String,
    icon_size: Option<(u32, u32)>,
    cursor: Option<Point>,
    cursor_visible: bool,
    fullscreen: bool,
    released: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            cursor_visible: true,
            ..Default::default()
        }
    }

    /// Queues the events delivered on the next unscripted poll.
    pub fn with_frame(mut self, events: Vec<RawEvent>) -> Self {
        self.script.push_back(events);
        self
    }

    /// Queues `count` polls that deliver nothing.
    pub fn with_idle_frames(mut self, count: usize) -> Self {
        self.script.extend(std::iter::repeat_with(Vec::new).take(count));
        self
    }

    pub fn push_frame(&mut self, events: Vec<RawEvent>) {
        self.script.push_back(events);
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn presents(&self) -> &[PresentMode] {
        &self.presents
    }

    /// Pixels handed to the most recent present.
    pub fn last_frame(&self) -> Option<&[u32]> {
        self.last_frame.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_size(&self) -> Option<(u32, u32)> {
        self.icon_size
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}

impl Backend for HeadlessBackend {
    fn poll_events(&mut self, out: &mut Vec<RawEvent>) {
        self.polls += 1;
        match self.script.pop_front() {
            Some(batch) => out.extend(batch),
            None => out.push(RawEvent::quit()),
        }
    }

    fn present(&mut self, frame: &FrameBuffer, mode: PresentMode) -> Result<()> {
        self.last_frame = Some(frame.pixels().to_vec());
        self.presents.push(mode);
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_icon(&mut self, icon: &RgbaImage) -> Result<()> {
        self.icon_size = Some(icon.dimensions());
        Ok(())
    }

    fn set_cursor_position(&mut self, pos: Point) -> Result<()> {
        self.cursor = Some(pos);
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    fn release(&mut self) {
        self.released = true;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastgame_core::{EventKind, KeyCode};

    #[test]
    fn script_is_replayed_then_quits() {
        let mut backend = HeadlessBackend::new()
            .with_frame(vec![RawEvent::key_down(KeyCode::Space)])
            .with_idle_frames(1);

        let mut out = Vec::new();
        backend.poll_events(&mut out);
        assert_eq!(out, vec![RawEvent::key_down(KeyCode::Space)]);

        out.clear();
        backend.poll_events(&mut out);
        assert!(out.is_empty());

        backend.poll_events(&mut out);
        assert_eq!(out[0].kind, EventKind::Quit);
        assert_eq!(backend.polls(), 3);
    }

    #[test]
    fn records_presents() {
        let mut backend = HeadlessBackend::new();
        let fb = FrameBuffer::new(2, 2);
        backend.present(&fb, PresentMode::Full).unwrap();
        assert_eq!(backend.presents(), &[PresentMode::Full]);
        assert_eq!(backend.last_frame().map(|p| p.len()), Some(4));
        assert!(!backend.is_released());
        backend.release();
        assert!(backend.is_released());
    }
}
