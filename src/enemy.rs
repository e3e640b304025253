use crate::character::{CharacterKind, Collidable, Damageable, Drawable, Health};
use crate::config::{EnemyConfig, ProjectileConfig};
use crate::engine::{Canvas, Point, Rect, Size, Sprite};
use crate::projectile::Projectile;
use crate::rooftop::Rooftop;

const HEALTH_BAR: Size = Size {
    width: 100.0,
    height: 5.0,
};
const HEALTH_BAR_BORDER: f32 = 2.0;
const HEALTH_BAR_GAP: f32 = 5.0;
const FLASH_STYLE: &str = "rgba(255, 0, 0, 0.2)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnemyId(pub u32);

/// A thug standing on a rooftop, throwing knives at whoever approaches
/// - never moves once spawned
/// - faces left, towards the player
#[derive(Debug, Clone)]
pub struct Enemy {
    id: EnemyId,
    position: Point,
    health: Health,
    scale: f32,
    sprite: Sprite,
    damaged: bool,
    frame: u32,
    shoot_interval: u32,
}

impl Enemy {
    /// Centered over the rooftop, feet exactly on its surface
    pub fn spawn(
        id: EnemyId,
        rooftop: &Rooftop,
        sprite: Sprite,
        config: &EnemyConfig,
        viewport_height: f32,
    ) -> Self {
        let size = sprite.size().scaled(config.scale);
        let position = Point {
            x: rooftop.x() + (rooftop.width() - size.width) / 2.0,
            y: rooftop.top(viewport_height) - size.height,
        };
        Enemy {
            id,
            position,
            health: Health::full(config.max_health),
            scale: config.scale,
            sprite,
            damaged: false,
            frame: 0,
            shoot_interval: config.shoot_interval.max(1),
        }
    }

    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    pub fn was_damaged(&self) -> bool {
        self.damaged
    }

    fn size(&self) -> Size {
        self.sprite.size().scaled(self.scale)
    }

    /// AI step, returns a knife when one is thrown this frame
    /// - throws every `shoot_interval` frames, only while on screen
    pub fn update(
        &mut self,
        camera_x: f32,
        viewport_width: f32,
        knife: &Sprite,
        config: &ProjectileConfig,
    ) -> Option<Projectile> {
        let on_screen = self.position.x - camera_x <= viewport_width;
        let thrown = (self.frame % self.shoot_interval == 0 && on_screen)
            .then(|| self.throw_knife(knife, config));
        self.frame = self.frame.wrapping_add(1);
        thrown
    }

    fn throw_knife(&self, knife: &Sprite, config: &ProjectileConfig) -> Projectile {
        let size = self.size();
        let knife_size = knife.size().scaled(self.scale / 2.0);
        let position = Point {
            x: self.position.x - knife_size.width,
            y: self.position.y + size.height / 2.0 - knife_size.height / 2.0,
        };
        Projectile::knife(position, self.id, knife_size, config)
    }

    fn draw_health_bar(&self, canvas: &dyn Canvas, screen_x: f32) {
        let x = screen_x + self.size().width / 2.0 - HEALTH_BAR.width / 2.0;
        let y = self.position.y - (HEALTH_BAR.height + HEALTH_BAR_BORDER * 2.0) - HEALTH_BAR_GAP;

        canvas.fill_rect(
            &Rect::new_from_x_y(
                x - HEALTH_BAR_BORDER,
                y - HEALTH_BAR_BORDER,
                HEALTH_BAR.width + HEALTH_BAR_BORDER * 2.0,
                HEALTH_BAR.height + HEALTH_BAR_BORDER * 2.0,
            ),
            "black",
        );
        canvas.fill_rect(
            &Rect::new_from_x_y(
                x,
                y,
                HEALTH_BAR.width * self.health.ratio(),
                HEALTH_BAR.height,
            ),
            "red",
        );
    }
}

impl Collidable for Enemy {
    fn bounding_box(&self) -> Option<Rect> {
        Some(Rect::new(self.position, self.size()))
    }
}

impl Damageable for Enemy {
    fn kind(&self) -> CharacterKind {
        CharacterKind::Enemy
    }

    fn health(&self) -> Health {
        self.health
    }

    fn handle_hit(&mut self, projectile: &Projectile) {
        if projectile.kind().hurts(CharacterKind::Enemy) {
            self.health.damage(projectile.damage());
            self.damaged = true;
        }
    }
}

impl Drawable for Enemy {
    fn draw(&mut self, canvas: &dyn Canvas, camera_x: f32) {
        let screen_x = self.position.x - camera_x;
        let size = self.size();
        self.draw_health_bar(canvas, screen_x);

        // sprite art faces right, mirror it
        canvas.save();
        canvas.flip_horizontally();
        canvas.draw_image(
            &self.sprite,
            &Rect::new_from_x_y(
                -(screen_x + size.width),
                self.position.y,
                size.width,
                size.height,
            ),
        );
        canvas.restore();

        if self.damaged {
            self.damaged = false;
            canvas.fill_rect(
                &Rect::new_from_x_y(screen_x, self.position.y, size.width, size.height),
                FLASH_STYLE,
            );
        }
    }
}
