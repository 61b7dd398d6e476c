// header imports
use std::cell::RefCell;
use std::rc::Rc;

use fastgame_app::{Color, GameConfig, KeyCode, RunOptions, SessionList};
use fastgame_widgets::{Background, Button, Sprite, Widget};
use glam::Vec2;
use image::RgbaImage;
// random colours and directions
use rand::Rng;

const BALL_SIZE: u32 = 16;

/// a sprite bouncing off the window edges
struct Ball {
    sprite: Sprite,
    velocity: Vec2,
}

impl Ball {
    fn step(&mut self, width: u32, height: u32) -> fastgame_app::Result<()> {
        self.sprite.set_position(self.sprite.position() + self.velocity);
        let pos = self.sprite.position();
        let max = Vec2::new(
            width.saturating_sub(BALL_SIZE) as f32,
            height.saturating_sub(BALL_SIZE) as f32,
        );
        if pos.x < 0.0 || pos.x > max.x {
            self.velocity.x = -self.velocity.x;
        }
        if pos.y < 0.0 || pos.y > max.y {
            self.velocity.y = -self.velocity.y;
        }
        self.sprite.set_position(pos.clamp(Vec2::ZERO, max));
        self.sprite.update()
    }
}

fn main() -> anyhow::Result<()> {
    fastgame_app::logging::init(log::LevelFilter::Info);

    // optional TOML config as first argument
    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::new()
            .with_title("fastgame demo")
            .with_size(640, 480)
            .with_fps(60),
    };

    let mut sessions = SessionList::new();
    let mut game = config.build(&mut sessions)?;
    let handle = game.handle();
    if let Some(pads) = game.backend().joysticks() {
        for pad in pads.all() {
            log::info!("joystick {}: {}", pad.id(), pad.name());
        }
    }

    let mut background = Background::color(&sessions, Color::SKY_BLUE)?;
    let balls: Rc<RefCell<Vec<Ball>>> = Rc::new(RefCell::new(Vec::new()));

    // a single button that spawns a ball
    let (h, b) = (handle.clone(), balls.clone());
    let mut add_button = Button::new(&sessions, 10, 10, 100, 30)?.with_command(move || {
        let mut rng = rand::thread_rng();
        let color = image::Rgba([rng.gen(), rng.gen(), rng.gen(), 255]);
        let (w, hgt) = h.size();
        let sprite = Sprite::from_image(&h, RgbaImage::from_pixel(BALL_SIZE, BALL_SIZE, color))
            .with_position(
                rng.gen_range(0.0..(w.saturating_sub(BALL_SIZE).max(1)) as f32),
                rng.gen_range(40.0..(hgt.saturating_sub(BALL_SIZE).max(41)) as f32),
            );
        let velocity = Vec2::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0));
        let mut balls = b.borrow_mut();
        balls.push(Ball { sprite, velocity });
        log::info!("{} balls", balls.len());
        Ok(())
    });

    let (h, b) = (handle.clone(), balls.clone());
    game.update(move || {
        background.update()?;
        let (w, hgt) = h.size();
        for ball in b.borrow_mut().iter_mut() {
            ball.step(w, hgt)?;
        }
        add_button.update()?;
        if h.check_rate(300) {
            log::debug!("frame {} at {:.1} fps", h.counter(), h.time().fps);
        }
        Ok(())
    });

    let h = handle.clone();
    game.on_key_down(move || {
        match h.event().key() {
            Some(KeyCode::KeyF) => h.toggle_fullscreen(),
            Some(KeyCode::KeyS) => h.screenshot("fastgame-demo.png"),
            Some(KeyCode::KeyD) => h.set_debug(!h.is_debug()),
            _ => {}
        }
        Ok(())
    })
    .when_end(|_| {
        log::info!("bye");
        Ok(())
    });

    game.run(RunOptions::new().with_escape_quits(true))?;
    Ok(())
}
