use crate::engine::{Assets, Canvas, Point, Rect, Size, Sprite, TextStyle};
use crate::sprite::keys;
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded canvas call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Clear,
    Image { key: String, destination: Rect },
    FillRect { rect: Rect, style: String },
    Text(String),
    Save,
    Restore,
    Flip,
}

/// Canvas that remembers what was drawn on it
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    calls: RefCell<Vec<Call>>,
}

impl RecordingCanvas {
    /// keys of every image drawn, cropped or not, in order
    pub fn images(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Image { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn filled_with(&self, style: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|call| matches!(call, Call::FillRect { style: used, .. } if used == style))
    }

    pub fn flips(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| **call == Call::Flip)
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&self, _rect: &Rect) {
        self.record(Call::Clear);
    }

    fn draw_image(&self, sprite: &Sprite, destination: &Rect) {
        self.record(Call::Image {
            key: sprite.key().to_string(),
            destination: *destination,
        });
    }

    fn draw_image_cropped(&self, sprite: &Sprite, _frame: &Rect, destination: &Rect) {
        self.draw_image(sprite, destination);
    }

    fn fill_rect(&self, rect: &Rect, style: &str) {
        self.record(Call::FillRect {
            rect: *rect,
            style: style.to_string(),
        });
    }

    fn fill_text(&self, text: &str, _position: Point, _style: &TextStyle) {
        self.record(Call::Text(text.to_string()));
    }

    fn save(&self) {
        self.record(Call::Save);
    }

    fn restore(&self) {
        self.record(Call::Restore);
    }

    fn flip_horizontally(&self) {
        self.record(Call::Flip);
    }
}

fn size(width: f32, height: f32) -> Size {
    Size { width, height }
}

/// Every image the game uses, at fixed natural sizes
/// - player poses are 80 x 140, so 40 x 70 on screen
/// - thug is 80 x 120, so 40 x 60 on screen
pub fn assets() -> Rc<Assets> {
    let pose = size(80.0, 140.0);
    Rc::new(
        [
            (keys::STANDING, pose),
            (keys::JUMP, pose),
            (keys::SHOOT, pose),
            (keys::RUNNING_RIGHT_STEP, pose),
            (keys::RUNNING_CHANGE_STEP, pose),
            (keys::RUNNING_LEFT_STEP, pose),
            (keys::SHOOT_RIGHT_STEP, pose),
            (keys::SHOOT_CHANGE_STEP, pose),
            (keys::SHOOT_LEFT_STEP, pose),
            (keys::WEB_PROJECTILE, size(20.0, 20.0)),
            (keys::BACKGROUND, size(1000.0, 400.0)),
            (keys::BUILDING, size(500.0, 300.0)),
            (keys::SPIDER_HEAD, size(50.0, 50.0)),
            (keys::HEART, size(50.0, 50.0)),
            (keys::THUG, size(80.0, 120.0)),
            (keys::KNIFE, size(40.0, 20.0)),
        ]
        .into_iter()
        .collect(),
    )
}
