use crate::engine::{Canvas, Rect};
use crate::projectile::Projectile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterKind {
    Player,
    Enemy,
}

/// Health clamped to `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    pub fn full(max: u32) -> Self {
        Health { current: max, max }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    /// Fraction left, for health bars
    pub fn ratio(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }

    #[cfg(test)]
    pub fn set(&mut self, current: u32) {
        self.current = current.min(self.max);
    }
}

pub trait Collidable {
    /// World space box of the current sprite, `None` until a sprite is known
    fn bounding_box(&self) -> Option<Rect>;
}

pub trait Damageable {
    fn kind(&self) -> CharacterKind;
    fn health(&self) -> Health;
    /// Each character decides for itself whether the projectile hurts it
    fn handle_hit(&mut self, projectile: &Projectile);
}

pub trait Drawable {
    fn draw(&mut self, canvas: &dyn Canvas, camera_x: f32);
}

// ELI5: a Character is anything that can be hit, shown and collided with
// - Player and Enemy both qualify
// - the collision pass only talks to `dyn Character`
pub trait Character: Collidable + Damageable + Drawable {}

impl<T: Collidable + Damageable + Drawable> Character for T {}
