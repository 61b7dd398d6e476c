//! Debug-mode log lines emitted by the main loop.
//!
//! Installs a process-wide logger, so this file holds a single test.

use std::sync::Mutex;

use fastgame_app::{EventKind, GameConfig, HeadlessBackend, KeyCode, RawEvent, RunOptions, SessionList};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct Capture {
    lines: Mutex<Vec<(Level, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.lines
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    lines: Mutex::new(Vec::new()),
};

fn level_of(lines: &[(Level, String)], message: &str) -> Option<Level> {
    lines.iter().find(|(_, m)| m == message).map(|(l, _)| *l)
}

#[test]
fn lifecycle_lines_are_info_and_event_lines_are_debug() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let backend = HeadlessBackend::new().with_frame(vec![
        RawEvent::new(EventKind::MouseDown).with_pos(1, 1).with_button(1),
        RawEvent::new(EventKind::MouseMove).with_pos(2, 2),
        RawEvent::new(EventKind::MouseUp).with_pos(2, 2).with_button(1),
        RawEvent::key_down(KeyCode::KeyA),
        RawEvent::key_up(KeyCode::KeyA),
        RawEvent::key_down(KeyCode::Escape),
    ]);
    let mut sessions = SessionList::new();
    let mut game = GameConfig::new()
        .with_fps(1000)
        .with_debug(true)
        .build_with(&mut sessions, backend)
        .unwrap();
    game.when_start(|| {
        log::warn!("start callback");
        Ok(())
    });
    game.run(RunOptions::new().with_escape_quits(true).returning()).unwrap();

    let lines = CAPTURE.lines.lock().unwrap().clone();
    for message in ["Starting...", "Press ESC", "Quitting..."] {
        assert_eq!(level_of(&lines, message), Some(Level::Info), "{message}");
    }
    for message in [
        "Mouse button down",
        "Mouse is moving",
        "Mouse button up",
        "A key down",
        "A key up",
    ] {
        assert_eq!(level_of(&lines, message), Some(Level::Debug), "{message}");
    }

    // the start callback runs before the loop announces itself
    let position = |message: &str| lines.iter().position(|(_, m)| m == message);
    assert!(position("start callback") < position("Starting..."));
    assert!(position("start callback").is_some());
}
