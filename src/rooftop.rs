use crate::config::RooftopConfig;
use crate::enemy::EnemyId;
use crate::engine::{Canvas, Point, Rect, Sprite};
use rand::rngs::StdRng;
use rand::Rng;

/// A platform strip covering `[x, x + width]`, standing on the canvas bottom
#[derive(Debug, Clone, PartialEq)]
pub struct Rooftop {
    x: f32,
    width: f32,
    height: f32,
    enemy: Option<EnemyId>,
}

impl Rooftop {
    pub fn new(x: f32, width: f32, height: f32) -> Self {
        Rooftop {
            x,
            width,
            height,
            enemy: None,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn enemy(&self) -> Option<EnemyId> {
        self.enemy
    }

    /// screen y of the walkable surface
    pub fn top(&self, viewport_height: f32) -> f32 {
        viewport_height - self.height
    }

    pub fn spans(&self, x: f32) -> bool {
        self.x <= x && x <= self.right()
    }

    /// trailing edge went past the left side of the screen
    pub fn is_behind(&self, camera_x: f32) -> bool {
        self.right() - camera_x <= 0.0
    }

    /// Body cropped out of the building image, plus the ledge cap on the right
    pub fn draw(
        &self,
        canvas: &dyn Canvas,
        building: &Sprite,
        camera_x: f32,
        viewport_height: f32,
        config: &RooftopConfig,
    ) {
        let screen_x = self.x - camera_x;
        let top = self.top(viewport_height);
        let body_width = (self.width - config.ledge_width).max(0.0);

        canvas.draw_image_cropped(
            building,
            &Rect::new_from_x_y(0.0, 0.0, body_width, self.height),
            &Rect::new_from_x_y(screen_x, top, body_width, self.height),
        );
        canvas.draw_image_cropped(
            building,
            &Rect::new_from_x_y(
                building.size().width - config.ledge_width,
                0.0,
                config.ledge_width,
                config.ledge_height,
            ),
            &Rect::new_from_x_y(
                screen_x + body_width,
                top,
                config.ledge_width,
                config.ledge_height,
            ),
        );
    }
}

/// Procedural row of rooftops, streamed as the camera advances
///
/// ┌──────────┐  gap   ┌──────────────┐  gap  ┌────────┐
/// │ rooftop  │◄──────►│   rooftop    │◄─────►│rooftop │ ... appended
/// └──────────┘        └──────────────┘       └────────┘
///  retired once its right edge leaves the screen
pub struct Skyline {
    rooftops: Vec<Rooftop>,
    config: RooftopConfig,
    // widths are crops of the building image, so they cannot exceed it
    max_width: f32,
    viewport_height: f32,
    rng: StdRng,
}

impl Skyline {
    pub fn new(config: RooftopConfig, building_width: f32, viewport_height: f32, rng: StdRng) -> Self {
        let mut skyline = Skyline {
            rooftops: Vec::new(),
            max_width: building_width.max(config.min_width + 1.0),
            config,
            viewport_height,
            rng,
        };
        skyline.reset();
        skyline
    }

    /// Start over with a single enemy-free rooftop at x = 0
    pub fn reset(&mut self) {
        let first = self.generate(0.0);
        self.rooftops = vec![first];
    }

    pub fn rooftops(&self) -> &[Rooftop] {
        &self.rooftops
    }

    fn generate(&mut self, x: f32) -> Rooftop {
        let width = self.rng.gen_range(self.config.min_width..self.max_width);
        let height = self
            .rng
            .gen_range(self.config.min_height..self.config.max_height);
        Rooftop::new(x, width, height)
    }

    /// Next rooftop after the current last one, a random gap apart
    pub fn next_rooftop(&mut self) -> Rooftop {
        let gap = self.rng.gen_range(self.config.min_gap..self.config.max_gap);
        let x = self
            .rooftops
            .last()
            .map_or(0.0, |last| last.right() + gap);
        self.generate(x)
    }

    /// Remove every rooftop behind the camera and hand them back
    pub fn retire(&mut self, camera_x: f32) -> Vec<Rooftop> {
        let (behind, ahead): (Vec<Rooftop>, Vec<Rooftop>) = self
            .rooftops
            .drain(..)
            .partition(|rooftop| rooftop.is_behind(camera_x));
        self.rooftops = ahead;
        behind
    }

    /// Append rooftops until there are enough of them and the last one
    /// reaches past the streaming margin
    /// - `spawn_enemy` is asked for an enemy on the rooftops that roll one
    pub fn extend(
        &mut self,
        camera_x: f32,
        viewport_width: f32,
        mut spawn_enemy: impl FnMut(&Rooftop) -> EnemyId,
    ) {
        let horizon = camera_x + viewport_width + self.config.streaming_margin;
        while self.rooftops.len() < self.config.min_count
            || self
                .rooftops
                .last()
                .map_or(true, |last| last.right() < horizon)
        {
            let mut rooftop = self.next_rooftop();
            if self.rng.gen_bool(self.config.enemy_chance) {
                rooftop.enemy = Some(spawn_enemy(&rooftop));
            }
            self.rooftops.push(rooftop);
        }
    }

    /// Rooftop spanning `point.x` whose surface is at or above `point.y`
    pub fn surface_at(&self, point: Point) -> Option<&Rooftop> {
        self.rooftops
            .iter()
            .find(|rooftop| rooftop.spans(point.x) && point.y >= rooftop.top(self.viewport_height))
    }

    pub fn draw(&self, canvas: &dyn Canvas, building: &Sprite, camera_x: f32) {
        for rooftop in &self.rooftops {
            rooftop.draw(canvas, building, camera_x, self.viewport_height, &self.config);
        }
    }

    #[cfg(test)]
    pub fn set_rooftops(&mut self, rooftops: Vec<Rooftop>) {
        self.rooftops = rooftops;
    }
}
