use crate::engine::Size;
use anyhow::{ensure, Result};
use serde::Deserialize;

/// Tunables, read from `config.json` when present
/// - every field has a default, so a partial file only overrides what it names
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas: Size,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub projectile: ProjectileConfig,
    pub rooftop: RooftopConfig,
    pub audio: AudioConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            canvas: Size {
                width: 711.0,
                height: 400.0,
            },
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            projectile: ProjectileConfig::default(),
            rooftop: RooftopConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl GameConfig {
    /// Rejects values the rooftop generator can't sample from
    pub fn validate(&self) -> Result<()> {
        let rooftop = &self.rooftop;
        ensure!(
            rooftop.min_gap >= 0.0 && rooftop.min_gap < rooftop.max_gap,
            "rooftop gap range [{}, {}) is empty",
            rooftop.min_gap,
            rooftop.max_gap
        );
        ensure!(
            rooftop.min_height < rooftop.max_height,
            "rooftop height range [{}, {}) is empty",
            rooftop.min_height,
            rooftop.max_height
        );
        ensure!(
            rooftop.min_width > 0.0,
            "rooftop min_width {} must be positive",
            rooftop.min_width
        );
        ensure!(
            (0.0..=1.0).contains(&rooftop.enemy_chance),
            "enemy_chance {} is not a probability",
            rooftop.enemy_chance
        );
        ensure!(
            self.canvas.width > 0.0 && self.canvas.height > 0.0,
            "canvas {}x{} has no area",
            self.canvas.width,
            self.canvas.height
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: u32,
    pub respawns: u32,
    pub scale: f32,
    pub gravity: f32,
    pub run_speed: f32,
    // applied upwards, screen y grows downwards
    pub jump_impulse: f32,
    /// screen x past which the camera follows instead of the sprite moving
    pub scroll_threshold: f32,
    pub regeneration_interval: u32,
    pub running_frame_interval: u32,
    pub shoot_interval: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            max_health: 5,
            respawns: 3,
            scale: 0.5,
            gravity: 0.7,
            run_speed: 5.0,
            jump_impulse: 15.0,
            scroll_threshold: 150.0,
            regeneration_interval: 600,
            running_frame_interval: 10,
            shoot_interval: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: u32,
    pub scale: f32,
    pub shoot_interval: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            max_health: 4,
            scale: 0.5,
            shoot_interval: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub web_damage: u32,
    pub web_speed: f32,
    pub knife_damage: u32,
    pub knife_speed: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        ProjectileConfig {
            web_damage: 2,
            web_speed: 10.0,
            knife_damage: 1,
            knife_speed: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RooftopConfig {
    pub min_count: usize,
    /// generated rooftops always reach this far past the right screen edge
    pub streaming_margin: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    pub enemy_chance: f64,
    pub ledge_width: f32,
    pub ledge_height: f32,
}

impl Default for RooftopConfig {
    fn default() -> Self {
        RooftopConfig {
            min_count: 3,
            streaming_margin: 100.0,
            min_width: 200.0,
            min_height: 100.0,
            max_height: 150.0,
            min_gap: 50.0,
            max_gap: 130.0,
            enemy_chance: 0.8,
            ledge_width: 15.0,
            ledge_height: 26.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sound_effects: bool,
    pub music: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            sound_effects: true,
            music: true,
        }
    }
}
