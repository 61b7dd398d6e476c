use fastgame_app::{GameConfig, HeadlessBackend, SessionList};
use fastgame_core::{Color, GameError};
use fastgame_widgets::{Background, Button, Sprite, Widget};
use image::RgbaImage;

fn sprite_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("ball.png");
    RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn widgets_need_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = sprite_file(&dir);
    let list = SessionList::new();

    assert!(matches!(Sprite::new(&list, &path), Err(GameError::ResourceMissing(_))));
    assert!(matches!(
        Background::color(&list, Color::BLACK),
        Err(GameError::ResourceMissing(_))
    ));
    assert!(matches!(
        Button::new(&list, 0, 0, 5, 5),
        Err(GameError::ResourceMissing(_))
    ));
    assert!(matches!(
        Button::image(&list, &path, None),
        Err(GameError::ResourceMissing(_))
    ));
}

#[test]
fn widgets_bind_to_the_latest_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = sprite_file(&dir);
    let mut list = SessionList::new();

    let first = GameConfig::new()
        .with_size(10, 10)
        .build_with(&mut list, HeadlessBackend::new())
        .unwrap();
    let second = GameConfig::new()
        .with_size(30, 30)
        .build_with(&mut list, HeadlessBackend::new())
        .unwrap();

    let mut sprite = Sprite::new(&list, &path).unwrap().with_position(20.0, 20.0);
    sprite.update().unwrap();
    // only the second frame is large enough to hold the sprite
    let blue = Color::from_pixel(0x0000FF);
    assert_eq!(second.handle().frame().pixel(21, 21).unwrap(), blue);
    assert!(first.handle().frame().pixel(21, 21).is_err());

    let bg = Background::color(&list, Color::BLACK).unwrap();
    assert_eq!(bg.rect().width, 30);

    let mut explicit = Background::color_bound_to(&first.handle(), Color::BLACK);
    explicit.update().unwrap();
    assert_eq!(first.handle().frame().pixel(0, 0).unwrap(), Color::BLACK);
}
