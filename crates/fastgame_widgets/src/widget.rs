use fastgame_app::Rect;
use fastgame_core::Result;

/// Anything that draws itself into its session's frame.
///
/// The loop never calls widgets on its own; an `update` callback owns them
/// and calls [`update`](Widget::update) once per frame, after the frame has
/// been cleared.
pub trait Widget {
    fn update(&mut self) -> Result<()>;

    /// Area covered in window pixels.
    fn rect(&self) -> Rect;

    fn hit(&self, x: i32, y: i32) -> bool {
        self.rect().contains(x, y)
    }
}

/// Widgets drawn back to front in insertion order.
#[derive(Default)]
pub struct Layer {
    children: Vec<Box<dyn Widget>>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, widget: impl Widget + 'static) -> &mut Self {
        self.children.push(Box::new(widget));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Topmost widget under the point.
    pub fn hit_index(&self, x: i32, y: i32) -> Option<usize> {
        self.children.iter().rposition(|w| w.hit(x, y))
    }
}

impl Widget for Layer {
    fn update(&mut self) -> Result<()> {
        for child in &mut self.children {
            child.update()?;
        }
        Ok(())
    }

    /// Union of the children's areas.
    fn rect(&self) -> Rect {
        self.children
            .iter()
            .fold(Rect::default(), |acc, w| acc.union(&w.rect()))
    }
}
