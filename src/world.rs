use crate::character::Drawable;
use crate::collision;
use crate::config::GameConfig;
use crate::enemy::{Enemy, EnemyId};
use crate::engine::audio::{PlayOptions, SoundCue};
use crate::engine::input::KeyState;
use crate::engine::{Assets, Canvas, Point, Rect, Sprite, TextStyle};
use crate::projectile::Projectile;
use crate::rooftop::Skyline;
use crate::sprite::keys;
use crate::sprite::spider_man::{PlayerStep, Respawn, SpiderMan, Terrain};
use anyhow::Result;
use rand::rngs::StdRng;
use std::rc::Rc;

const SCORE_STYLE: TextStyle = TextStyle {
    font: "20px Helvetica",
    align: "center",
    fill: "white",
};
const SCORE_BASELINE: f32 = 30.0;
const PAUSED_STYLE: TextStyle = SCORE_STYLE;
const PAUSED_MARGIN: f32 = 30.0;
const PARALLAX: f32 = 5.0;

const SHOOT_SOUND: SoundCue = SoundCue {
    name: "SHOOT",
    options: PlayOptions {
        restart: true,
        start_time: 0.0,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Paused,
    /// last frame ended the game, the next one starts a fresh one
    GameOver,
}

/// Sprites the world draws directly, resolved once so a missing image
/// fails construction instead of a frame
struct Sprites {
    background: Sprite,
    building: Sprite,
    thug: Sprite,
    heart: Sprite,
    head: Sprite,
}

impl Sprites {
    fn resolve(assets: &Assets) -> Result<Self> {
        // drawn through the asset registry, only checked here
        for key in [keys::STANDING, keys::WEB_PROJECTILE, keys::KNIFE] {
            assets.require(key)?;
        }
        Ok(Sprites {
            background: assets.require(keys::BACKGROUND)?,
            building: assets.require(keys::BUILDING)?,
            thug: assets.require(keys::THUG)?,
            heart: assets.require(keys::HEART)?,
            head: assets.require(keys::SPIDER_HEAD)?,
        })
    }
}

/// TABLE
/// ┌──────────────────── World::update ──────────────────────┐
/// │ 1. rooftops  : retire behind camera, extend ahead       │
/// │ 2. enemies   : AI step, knives thrown                   │
/// │ 3. projectiles : advance, retire off screen             │
/// │ 4. player    : input -> physics, camera follows         │
/// │                death -> respawn or game over            │
/// │ 5. collision : projectiles vs characters                │
/// │ 6. sweep     : dead enemies removed, score++            │
/// └─────────────────────────────────────────────────────────┘
/// Owns every live entity, nothing else adds or removes them
pub struct World {
    config: GameConfig,
    assets: Rc<Assets>,
    sprites: Sprites,
    player: SpiderMan,
    skyline: Skyline,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    camera_x: f32,
    score: u32,
    frame: u32,
    next_enemy_id: u32,
    phase: Phase,
    sounds: Vec<SoundCue>,
}

impl World {
    pub fn new(config: GameConfig, assets: Rc<Assets>, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let sprites = Sprites::resolve(&assets)?;
        let skyline = Skyline::new(
            config.rooftop.clone(),
            sprites.building.size().width,
            config.canvas.height,
            rng,
        );
        let mut world = World {
            player: SpiderMan::new(assets.clone(), &config),
            config,
            assets,
            sprites,
            skyline,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            camera_x: 0.0,
            score: 0,
            frame: 0,
            next_enemy_id: 0,
            phase: Phase::Running,
            sounds: Vec::new(),
        };
        world.stream_rooftops();
        Ok(world)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn camera_x(&self) -> f32 {
        self.camera_x
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn player(&self) -> &SpiderMan {
        &self.player
    }

    pub fn skyline(&self) -> &Skyline {
        &self.skyline
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn pause(&mut self) {
        self.phase = Phase::Paused;
    }

    pub fn unpause(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
        }
    }

    /// Returns `true` when the world is now paused
    pub fn toggle_pause(&mut self) -> bool {
        if self.is_paused() {
            self.unpause();
        } else {
            self.pause();
        }
        self.is_paused()
    }

    /// Sounds requested since the last call
    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    /// Removing an enemy that is already gone changes nothing
    pub fn remove_enemy(&mut self, id: EnemyId) -> Option<Enemy> {
        let index = self.enemies.iter().position(|enemy| enemy.id() == id)?;
        Some(self.enemies.remove(index))
    }

    pub fn update(&mut self, keystate: &KeyState) {
        match self.phase {
            Phase::Paused => return,
            Phase::GameOver => self.phase = Phase::Running,
            Phase::Running => {}
        }

        self.stream_rooftops();
        self.update_enemies();
        self.update_projectiles();

        let terrain = Terrain {
            skyline: &self.skyline,
            camera_x: self.camera_x,
            viewport: self.config.canvas,
        };
        match self.player.update(keystate, &terrain) {
            PlayerStep::Died => {
                self.on_player_death();
                return;
            }
            PlayerStep::Alive {
                camera_advance,
                web,
            } => {
                self.camera_x += camera_advance;
                if let Some(web) = web {
                    self.projectiles.push(web);
                    if self.config.audio.sound_effects {
                        self.sounds.push(SHOOT_SOUND);
                    }
                }
            }
        }

        collision::resolve_hits(&mut self.projectiles, &mut self.player, &mut self.enemies);
        self.sweep_dead_enemies();
        self.frame = self.frame.wrapping_add(1);
    }

    fn stream_rooftops(&mut self) {
        for rooftop in self.skyline.retire(self.camera_x) {
            if let Some(id) = rooftop.enemy() {
                self.remove_enemy(id);
            }
        }

        let enemies = &mut self.enemies;
        let next_enemy_id = &mut self.next_enemy_id;
        let thug = &self.sprites.thug;
        let enemy_config = &self.config.enemy;
        let viewport_height = self.config.canvas.height;
        self.skyline
            .extend(self.camera_x, self.config.canvas.width, |rooftop| {
                let id = EnemyId(*next_enemy_id);
                *next_enemy_id = next_enemy_id.wrapping_add(1);
                enemies.push(Enemy::spawn(
                    id,
                    rooftop,
                    thug.clone(),
                    enemy_config,
                    viewport_height,
                ));
                id
            });
    }

    fn update_enemies(&mut self) {
        let Some(knife) = self.assets.get(keys::KNIFE) else {
            return;
        };
        for enemy in self.enemies.iter_mut() {
            if let Some(thrown) = enemy.update(
                self.camera_x,
                self.config.canvas.width,
                knife,
                &self.config.projectile,
            ) {
                self.projectiles.push(thrown);
            }
        }
    }

    fn update_projectiles(&mut self) {
        let camera_x = self.camera_x;
        let viewport_width = self.config.canvas.width;
        self.projectiles.iter_mut().for_each(Projectile::advance);
        self.projectiles
            .retain(|projectile| !projectile.is_off_screen(camera_x, viewport_width));
    }

    fn sweep_dead_enemies(&mut self) {
        let before = self.enemies.len();
        self.enemies.retain(Enemy::is_alive);
        self.score += (before - self.enemies.len()) as u32;
    }

    fn on_player_death(&mut self) {
        match self.player.respawn() {
            Respawn::Continue => {
                log!("Respawning, {} left", self.player.respawns());
            }
            Respawn::GameOver => {
                log!("Game over with a score of {}", self.score);
                self.player = SpiderMan::new(self.assets.clone(), &self.config);
                self.phase = Phase::GameOver;
            }
        }
        self.restart();
    }

    /// Back to the first rooftop with no enemies or projectiles, the next
    /// update streams the rest of the skyline in
    fn restart(&mut self) {
        self.skyline.reset();
        self.enemies.clear();
        self.projectiles.clear();
        self.camera_x = 0.0;
        self.score = 0;
        self.frame = 0;
    }

    pub fn draw(&mut self, canvas: &dyn Canvas) {
        let viewport = self.config.canvas;
        if self.is_paused() {
            // drawn over the frozen frame
            canvas.fill_text(
                "Paused",
                Point {
                    x: viewport.width / 2.0,
                    y: viewport.height - PAUSED_MARGIN,
                },
                &PAUSED_STYLE,
            );
            return;
        }

        canvas.clear(&Rect::new(Point::default(), viewport));
        self.draw_background(canvas);
        self.skyline
            .draw(canvas, &self.sprites.building, self.camera_x);
        for enemy in self.enemies.iter_mut() {
            enemy.draw(canvas, self.camera_x);
        }
        for projectile in &self.projectiles {
            if let Some(sprite) = self.assets.get(projectile.kind().sprite_key()) {
                projectile.draw(canvas, sprite, self.camera_x);
            }
        }
        self.player.draw(canvas, self.camera_x);
        self.player.draw_hud(
            canvas,
            &self.sprites.heart,
            &self.sprites.head,
            viewport.width,
        );
        canvas.fill_text(
            &self.score.to_string(),
            Point {
                x: viewport.width / 2.0,
                y: SCORE_BASELINE,
            },
            &SCORE_STYLE,
        );
    }

    /// Two copies side by side, drifting at a fifth of the camera speed
    fn draw_background(&self, canvas: &dyn Canvas) {
        let viewport = self.config.canvas;
        let natural = self.sprites.background.size();
        if natural.height <= 0.0 {
            return;
        }
        let width = viewport.height * natural.width / natural.height;
        let x = (-self.camera_x / PARALLAX) % natural.width.min(viewport.width);
        for offset in [0.0, width] {
            canvas.draw_image(
                &self.sprites.background,
                &Rect::new_from_x_y(x + offset, 0.0, width, viewport.height),
            );
        }
    }

    #[cfg(test)]
    pub fn player_mut(&mut self) -> &mut SpiderMan {
        &mut self.player
    }

    #[cfg(test)]
    pub fn projectiles_mut(&mut self) -> &mut Vec<Projectile> {
        &mut self.projectiles
    }

    #[cfg(test)]
    pub fn enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Collidable, Damageable};
    use crate::engine::Size;
    use crate::projectile::ProjectileKind;
    use crate::sprite::Direction;
    use crate::testing::{self, RecordingCanvas};
    use rand::SeedableRng;

    fn world(seed: u64) -> World {
        World::new(GameConfig::default(), testing::assets(), StdRng::seed_from_u64(seed))
            .expect("fixture has every sprite")
    }

    fn running_right() -> KeyState {
        let mut keys = KeyState::new();
        keys.set_pressed("ArrowRight");
        keys
    }

    /// Player standing on the first rooftop, nobody around to throw knives
    fn settled(seed: u64) -> World {
        let mut world = world(seed);
        world.enemies_mut().clear();
        for _ in 0..60 {
            world.update(&KeyState::new());
        }
        world
    }

    fn knife_at_the_player(world: &World) -> Projectile {
        let bounds = world.player().bounding_box().unwrap();
        Projectile::knife(
            Point {
                x: bounds.x() + 5.0 + 10.0,
                y: bounds.y() + 5.0,
            },
            EnemyId(999),
            Default::default(),
            &GameConfig::default().projectile,
        )
    }

    #[test]
    fn missing_sprite_fails_construction() {
        let assets: Assets = [(keys::STANDING, Size::default())].into_iter().collect();

        let world = World::new(GameConfig::default(), Rc::new(assets), StdRng::seed_from_u64(0));

        assert!(world.is_err());
    }

    #[test]
    fn out_of_range_rooftop_config_fails_construction() {
        let mut empty_gaps = GameConfig::default();
        empty_gaps.rooftop.min_gap = 80.0;
        empty_gaps.rooftop.max_gap = 80.0;
        let mut impossible_odds = GameConfig::default();
        impossible_odds.rooftop.enemy_chance = 1.5;

        for config in [empty_gaps, impossible_odds] {
            let world = World::new(config, testing::assets(), StdRng::seed_from_u64(0));

            assert!(world.is_err());
        }
    }

    #[test]
    fn keeps_three_sorted_rooftops_while_running() {
        let mut world = world(7);
        let keys = running_right();

        for _ in 0..1_500 {
            world.update(&keys);
            let rooftops = world.skyline().rooftops();
            if world.frame() > 0 {
                assert!(rooftops.len() >= 3);
            }
            for pair in rooftops.windows(2) {
                assert!(pair[0].right() < pair[1].x());
            }
        }
    }

    #[test]
    fn score_and_camera_never_go_backwards() {
        let mut world = world(11);
        let mut keys = running_right();
        keys.set_pressed("Space");
        let mut score = 0;
        let mut camera_x = 0.0;

        for _ in 0..500 {
            world.update(&keys);
            if world.camera_x() == 0.0 && world.frame() == 0 {
                // a respawn starts everything over
                score = 0;
                camera_x = 0.0;
            }
            assert!(world.score() >= score);
            assert!(world.camera_x() >= camera_x);
            score = world.score();
            camera_x = world.camera_x();
            let health = world.player().health();
            assert!(health.current() <= health.max());
        }
    }

    #[test]
    fn enemies_live_on_rooftops() {
        let world = world(3);

        for enemy in world.enemies() {
            assert!(world
                .skyline()
                .rooftops()
                .iter()
                .any(|rooftop| rooftop.enemy() == Some(enemy.id())));
        }
    }

    #[test]
    fn removing_an_enemy_twice_is_a_no_op() {
        let mut world = world(5);
        let Some(id) = world.enemies().first().map(Enemy::id) else {
            return;
        };
        let count = world.enemies().len();

        assert!(world.remove_enemy(id).is_some());
        assert!(world.remove_enemy(id).is_none());
        assert_eq!(world.enemies().len(), count - 1);
    }

    #[test]
    fn killing_an_enemy_scores_a_point() {
        let mut world = world(2);
        let config = GameConfig::default().projectile;
        let (id, bounds) = match world.enemies().first() {
            Some(enemy) => (enemy.id(), enemy.bounding_box().unwrap()),
            None => return,
        };
        // the web advances 10 before the hit test
        let aim = Point {
            x: bounds.x() - 10.0 + 1.0,
            y: bounds.y() + 1.0,
        };
        for _ in 0..2 {
            world.projectiles_mut().clear();
            world
                .projectiles_mut()
                .push(Projectile::web(aim, Direction::Right, &config));
            world.update(&KeyState::new());
        }

        assert_eq!(world.score(), 1);
        assert!(world.enemies().iter().all(|enemy| enemy.id() != id));
        assert!(world.remove_enemy(id).is_none());
    }

    #[test]
    fn webs_never_hurt_the_player() {
        let mut world = settled(4);
        world.enemies_mut().clear();
        let bounds = world.player().bounding_box().unwrap();
        let web = Projectile::web(
            Point {
                x: bounds.x() - 5.0,
                y: bounds.y() + 5.0,
            },
            Direction::Right,
            &GameConfig::default().projectile,
        );
        world.projectiles_mut().push(web);

        world.update(&KeyState::new());

        assert_eq!(world.player().health().current(), 5);
        assert!(world.projectiles().is_empty());
    }

    #[test]
    fn last_health_point_lost_to_a_knife_respawns() {
        let mut world = settled(6);
        world.enemies_mut().clear();
        world.player_mut().set_health(1);
        let knife = knife_at_the_player(&world);
        world.projectiles_mut().push(knife);

        world.update(&KeyState::new());
        assert_eq!(world.player().health().current(), 0);

        world.update(&KeyState::new());
        assert_eq!(world.player().respawns(), 2);
        assert_eq!(world.player().health().current(), 5);
        assert_eq!(world.phase(), Phase::Running);
        assert!(world.projectiles().is_empty());
        assert!(world.enemies().is_empty());
        assert_eq!(world.camera_x(), 0.0);
        assert_eq!(world.score(), 0);
    }

    #[test]
    fn respawn_clears_enemies_and_projectiles_until_the_next_frame() {
        for seed in 0..20 {
            let mut world = world(seed);
            for _ in 0..60 {
                world.update(&KeyState::new());
            }
            world.player_mut().set_health(0);

            world.update(&KeyState::new());
            assert_eq!(world.player().respawns(), 2, "seed {}", seed);
            assert!(world.enemies().is_empty(), "seed {}", seed);
            assert!(world.projectiles().is_empty(), "seed {}", seed);
            assert_eq!(world.camera_x(), 0.0);
            assert_eq!(world.skyline().rooftops().len(), 1);

            world.update(&KeyState::new());
            assert!(world.skyline().rooftops().len() >= 3, "seed {}", seed);
        }
    }

    #[test]
    fn running_out_of_respawns_ends_the_game_and_starts_over() {
        let mut world = settled(8);
        for _ in 0..4 {
            world.player_mut().set_health(0);
            world.update(&KeyState::new());
        }

        assert_eq!(world.phase(), Phase::GameOver);
        assert!(world.enemies().is_empty());
        assert!(world.projectiles().is_empty());
        assert_eq!(world.camera_x(), 0.0);
        assert_eq!(world.player().respawns(), 3);

        world.update(&KeyState::new());
        assert_eq!(world.phase(), Phase::Running);
    }

    #[test]
    fn pause_freezes_everything() {
        // still falling towards the first rooftop
        let mut world = world(9);
        let keys = running_right();
        for _ in 0..5 {
            world.update(&keys);
        }
        let position = world.player().position();
        let camera_x = world.camera_x();
        let frame = world.frame();

        assert!(world.toggle_pause());
        for _ in 0..100 {
            world.update(&keys);
        }
        assert_eq!(world.player().position(), position);
        assert_eq!(world.camera_x(), camera_x);
        assert_eq!(world.frame(), frame);

        assert!(!world.toggle_pause());
        world.update(&keys);
        assert_eq!(world.frame(), frame + 1);
        assert!(world.player().position().y > position.y);
    }

    #[test]
    fn paused_frame_only_draws_the_overlay() {
        let mut world = settled(1);
        world.pause();
        let canvas = RecordingCanvas::default();

        world.draw(&canvas);

        assert_eq!(canvas.texts(), vec!["Paused".to_string()]);
        assert!(canvas.images().is_empty());
    }

    #[test]
    fn running_frame_draws_scene_then_score() {
        let mut world = settled(1);
        let canvas = RecordingCanvas::default();

        world.draw(&canvas);

        let images = canvas.images();
        assert_eq!(images[0], keys::BACKGROUND);
        assert!(images.iter().any(|key| key == keys::BUILDING));
        assert!(images.iter().any(|key| key == keys::STANDING));
        assert_eq!(canvas.texts(), vec!["0".to_string()]);
    }

    #[test]
    fn firing_a_web_requests_the_shoot_sound() {
        let mut world = settled(12);
        let mut keys = KeyState::new();
        keys.set_pressed("Space");

        world.update(&keys);

        assert!(world
            .projectiles()
            .iter()
            .any(|projectile| projectile.kind() == ProjectileKind::Web));
        assert_eq!(world.drain_sounds(), vec![SHOOT_SOUND]);
        assert!(world.drain_sounds().is_empty());
    }
}
