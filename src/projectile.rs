use crate::character::CharacterKind;
use crate::config::ProjectileConfig;
use crate::enemy::EnemyId;
use crate::engine::{Canvas, Point, Rect, Size, Sprite};
use crate::sprite::{keys, Direction};

const WEB_SIZE: Size = Size {
    width: 20.0,
    height: 20.0,
};

/// Each kind carries its own behavior, picked once at construction
/// ┌────────┬───────────────┬─────────────┬──────────┐
/// │ Kind   │ Fired by      │ Travels     │ Hurts    │
/// ├────────┼───────────────┼─────────────┼──────────┤
/// │ Web    │ Player        │ facing side │ Enemy    │
/// │ Knife  │ Enemy         │ left        │ Player   │
/// └────────┴───────────────┴─────────────┴──────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Web,
    Knife,
}

impl ProjectileKind {
    pub fn hurts(self, target: CharacterKind) -> bool {
        matches!(
            (self, target),
            (ProjectileKind::Web, CharacterKind::Enemy) | (ProjectileKind::Knife, CharacterKind::Player)
        )
    }

    pub fn sprite_key(self) -> &'static str {
        match self {
            ProjectileKind::Web => keys::WEB_PROJECTILE,
            ProjectileKind::Knife => keys::KNIFE,
        }
    }
}

/// Who fired it, a knife is never tested against its own thrower
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Player,
    Enemy(EnemyId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    kind: ProjectileKind,
    position: Point,
    damage: u32,
    direction: Direction,
    speed: f32,
    size: Size,
    owner: Owner,
    spent: bool,
}

impl Projectile {
    pub fn web(position: Point, direction: Direction, config: &ProjectileConfig) -> Self {
        Projectile {
            kind: ProjectileKind::Web,
            position,
            damage: config.web_damage,
            direction,
            speed: config.web_speed,
            size: WEB_SIZE,
            owner: Owner::Player,
            spent: false,
        }
    }

    /// `size` is the on-screen size of the knife sprite
    pub fn knife(position: Point, owner: EnemyId, size: Size, config: &ProjectileConfig) -> Self {
        Projectile {
            kind: ProjectileKind::Knife,
            position,
            damage: config.knife_damage,
            direction: Direction::Left,
            speed: config.knife_speed,
            size,
            owner: Owner::Enemy(owner),
            spent: false,
        }
    }

    pub fn kind(&self) -> ProjectileKind {
        self.kind
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    pub fn advance(&mut self) {
        self.position.x += self.direction.sign() * self.speed;
    }

    pub fn is_off_screen(&self, camera_x: f32, viewport_width: f32) -> bool {
        let screen_x = self.position.x - camera_x;
        screen_x < 0.0 || screen_x >= viewport_width
    }

    /// Any contact uses the projectile up, returns whether it was a real hit
    pub fn handle_hit(&mut self, target: CharacterKind) -> bool {
        if self.spent {
            return false;
        }
        self.spent = true;
        self.kind.hurts(target)
    }

    fn draw_rect(&self, camera_x: f32) -> Rect {
        let screen_x = self.position.x - camera_x;
        match self.kind {
            // web image is centered on the hit point vertically and trails
            // behind it horizontally
            ProjectileKind::Web => {
                let x = match self.direction {
                    Direction::Left => screen_x - self.size.width,
                    Direction::Right => screen_x,
                };
                Rect::new_from_x_y(
                    x,
                    self.position.y - self.size.height / 2.0,
                    self.size.width,
                    self.size.height,
                )
            }
            ProjectileKind::Knife => Rect::new(
                Point {
                    x: screen_x,
                    y: self.position.y,
                },
                self.size,
            ),
        }
    }

    pub fn draw(&self, canvas: &dyn Canvas, sprite: &Sprite, camera_x: f32) {
        canvas.draw_image(sprite, &self.draw_rect(camera_x));
    }
}
