use crate::character::{CharacterKind, Collidable, Damageable, Drawable, Health};
use crate::config::{GameConfig, PlayerConfig, ProjectileConfig};
use crate::engine::input::{Key, KeyState};
use crate::engine::{Assets, Canvas, Point, Rect, Size, Sprite};
use crate::projectile::Projectile;
use crate::rooftop::Skyline;
use crate::sprite::state::{CharacterState, SpiderManContext, StateSet};
use crate::sprite::{keys, Direction, Jumping, Running, RunningShooting, Shooting, SpriteState, Standing};
use std::rc::Rc;

const FLASH_STYLE: &str = "rgba(0, 0, 0, 0.2)";
const HUD_ICON: Size = Size {
    width: 25.0,
    height: 25.0,
};
const HUD_PADDING: f32 = 5.0;

/// ┌──────────────── Input → State ──────────────────────────┐
/// │  Key / signal   →  Event        →  State                │
/// ├─────────────────────────────────────────────────────────┤
/// │  Up (not FALL)  →  Jump         →  +JUMP (one frame)    │
/// │  Right / Left   →  Run(facing)  →  +RUNNING             │
/// │  Space          →  Shoot        →  +SHOOT (overlay)     │
/// │  any key up     →  Release      →  -RUNNING -SHOOT      │
/// └─────────────────────────────────────────────────────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Jump,
    Run(Direction),
    Shoot,
    Release,
}

/// What the player sees of the world during its update
pub struct Terrain<'a> {
    pub skyline: &'a Skyline,
    pub camera_x: f32,
    pub viewport: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerStep {
    /// fell off the screen or ran out of health, nothing else happened
    Died,
    Alive {
        /// how far the camera should follow this frame
        camera_advance: f32,
        web: Option<Projectile>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Respawn {
    Continue,
    GameOver,
}

pub struct SpiderMan {
    context: SpiderManContext,
    states: StateSet,
    health: Health,
    respawns: u32,
    // derived from the states every frame, None until the first update
    sprite: Option<Sprite>,
    damaged: bool,
    assets: Rc<Assets>,
    config: PlayerConfig,
    projectile_config: ProjectileConfig,
}

/// SpiderMan
/// - update() -> input events -> state image -> physics
/// - handle state transition -> transition()
impl SpiderMan {
    pub fn new(assets: Rc<Assets>, config: &GameConfig) -> Self {
        SpiderMan {
            context: SpiderManContext::new(Point::default()),
            states: StateSet::standing(),
            health: Health::full(config.player.max_health),
            respawns: config.player.respawns,
            sprite: None,
            damaged: false,
            assets,
            config: config.player.clone(),
            projectile_config: config.projectile.clone(),
        }
    }

    pub fn position(&self) -> Point {
        self.context.position
    }

    pub fn velocity(&self) -> Point {
        self.context.velocity
    }

    pub fn facing(&self) -> Direction {
        self.context.facing
    }

    pub fn states(&self) -> StateSet {
        self.states
    }

    pub fn respawns(&self) -> u32 {
        self.respawns
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    pub fn is_dead(&self, viewport_height: f32) -> bool {
        self.context.position.y >= viewport_height || self.health.is_depleted()
    }

    fn size(&self) -> Option<Size> {
        self.sprite
            .as_ref()
            .map(|sprite| sprite.size().scaled(self.config.scale))
    }

    fn transition(&mut self, event: Event) {
        match event {
            // can't jump off thin air
            Event::Jump => {
                if !self.states.contains(CharacterState::Fall) {
                    self.states.insert(CharacterState::Jump);
                }
            }
            Event::Run(direction) => {
                self.states.insert(CharacterState::Running);
                self.context = self.context.face(direction);
            }
            Event::Shoot => self.states.insert(CharacterState::Shoot),
            Event::Release => {
                self.states.remove(CharacterState::Running);
                self.states.remove(CharacterState::Shoot);
                self.context = self.context.on_release();
            }
        }
    }

    fn read_input(&mut self, keystate: &KeyState) {
        if keystate.was_released() {
            self.transition(Event::Release);
        }
        if keystate.is_pressed(Key::ArrowUp) {
            self.transition(Event::Jump);
        }
        if keystate.is_pressed(Key::ArrowRight) {
            self.transition(Event::Run(Direction::Right));
        }
        if keystate.is_pressed(Key::ArrowLeft) {
            self.transition(Event::Run(Direction::Left));
        }
        if keystate.is_pressed(Key::Space) {
            self.transition(Event::Shoot);
        }
    }

    /// Pick this frame's image from the states and apply what they imply
    /// - JUMP is consumed into an upward velocity
    /// - RUNNING sets the horizontal velocity, anything else stops it
    /// - SHOOT fires a web every `shoot_interval` frames
    fn update_state_image(&mut self) -> Option<Projectile> {
        let mut key = Standing::current_frame_name(0);

        if self.states.contains(CharacterState::Jump) {
            key = Jumping::current_frame_name(0);
            self.context = self
                .context
                .set_vertical_velocity(-self.config.jump_impulse);
            self.states.remove(CharacterState::Jump);
        }

        if self.states.contains(CharacterState::Running) {
            let running_frame = self.context.running_frame;
            key = if self.states.contains(CharacterState::Shoot) {
                RunningShooting::current_frame_name(running_frame)
            } else {
                Running::current_frame_name(running_frame)
            };
            if self.context.frame % self.config.running_frame_interval.max(1) == 0 {
                self.context.running_frame = (running_frame + 1) % Running::total_frames();
            }
            self.context = self
                .context
                .set_horizontal_velocity(self.context.facing.sign() * self.config.run_speed);
        } else {
            self.context = self.context.set_horizontal_velocity(0.0);
        }

        let mut web = None;
        if self.states.contains(CharacterState::Shoot) {
            if !self.states.contains(CharacterState::Running) {
                key = Shooting::current_frame_name(0);
            }
            if self.context.shooting_frame % self.config.shoot_interval.max(1) == 0 {
                web = self.shoot();
            }
            self.context.shooting_frame = self.context.shooting_frame.wrapping_add(1);
        }

        // missing state images fall back to standing
        self.sprite = self
            .assets
            .get(key)
            .or_else(|| self.assets.get(keys::STANDING))
            .cloned();
        web
    }

    /// Web leaves from the hand on the facing side, at half height
    fn shoot(&self) -> Option<Projectile> {
        let pose = self
            .assets
            .get(keys::SHOOT)
            .or(self.sprite.as_ref())?
            .size()
            .scaled(self.config.scale);
        let position = self.context.position;
        let x = match self.context.facing {
            Direction::Right => position.x + pose.width + 1.0,
            Direction::Left => position.x - 1.0,
        };
        Some(Projectile::web(
            Point {
                x,
                y: position.y + pose.height / 2.0,
            },
            self.context.facing,
            &self.projectile_config,
        ))
    }

    fn regenerate(&mut self) {
        let interval = self.config.regeneration_interval.max(1);
        if self.context.frame % interval == 0 && !self.health.is_full() {
            self.health.heal(1);
        }
    }

    /// One frame of the player : input -> states -> physics -> camera
    pub fn update(&mut self, keystate: &KeyState, terrain: &Terrain) -> PlayerStep {
        self.read_input(keystate);

        if self.is_dead(terrain.viewport.height) {
            return PlayerStep::Died;
        }

        let web = self.update_state_image();
        let size = self.size().unwrap_or_default();

        self.context = self.context.update(self.config.gravity);
        self.states.insert(CharacterState::Fall);

        let position = self.context.position;
        let feet = Point {
            x: position.x + size.width / 2.0,
            y: position.y + size.height,
        };
        if let Some(rooftop) = terrain.skyline.surface_at(feet) {
            let surface = rooftop.top(terrain.viewport.height);
            self.context = self.context.land_on(surface, size.height);
            self.states.remove(CharacterState::Fall);
        } else if self.context.velocity.x != 0.0 {
            // ran into the side of a building
            let leading_x = if self.context.velocity.x > 0.0 {
                position.x + size.width + 1.0
            } else {
                position.x - 1.0
            };
            let probe = Point {
                x: leading_x,
                y: position.y + size.height - 1.0,
            };
            if terrain.skyline.surface_at(probe).is_some() {
                self.context = self.context.push_back();
            }
        }

        // can't walk back past the left edge of the screen
        self.context = self.context.clamp_x(terrain.camera_x);

        let screen_x = self.context.position.x - terrain.camera_x;
        let camera_advance = if screen_x > self.config.scroll_threshold && self.context.velocity.x > 0.0 {
            self.context.velocity.x
        } else {
            0.0
        };

        self.regenerate();
        self.context = self.context.next_frame();

        PlayerStep::Alive {
            camera_advance,
            web,
        }
    }

    /// Spend a life and start over at the origin
    pub fn respawn(&mut self) -> Respawn {
        if self.respawns == 0 {
            return Respawn::GameOver;
        }
        self.respawns -= 1;
        self.context = SpiderManContext::new(Point::default());
        self.states = StateSet::standing();
        self.health.restore();
        self.damaged = false;
        Respawn::Continue
    }

    /// Hearts on the left for health, heads on the right for respawns
    pub fn draw_hud(&self, canvas: &dyn Canvas, heart: &Sprite, head: &Sprite, viewport_width: f32) {
        for i in 0..self.health.current() {
            let x = i as f32 * HUD_ICON.width + HUD_PADDING * (i + 1) as f32;
            canvas.draw_image(heart, &Rect::new(Point { x, y: HUD_PADDING }, HUD_ICON));
        }
        for i in 0..self.respawns {
            let x = viewport_width - (HUD_ICON.width + HUD_PADDING) * (i + 1) as f32;
            canvas.draw_image(head, &Rect::new(Point { x, y: HUD_PADDING }, HUD_ICON));
        }
    }

    #[cfg(test)]
    pub fn set_health(&mut self, current: u32) {
        self.health.set(current);
    }

    #[cfg(test)]
    pub fn set_position(&mut self, position: Point) {
        self.context.position = position;
    }
}

impl Collidable for SpiderMan {
    fn bounding_box(&self) -> Option<Rect> {
        self.size().map(|size| Rect::new(self.context.position, size))
    }
}

impl Damageable for SpiderMan {
    fn kind(&self) -> CharacterKind {
        CharacterKind::Player
    }

    fn health(&self) -> Health {
        self.health
    }

    fn handle_hit(&mut self, projectile: &Projectile) {
        if projectile.kind().hurts(CharacterKind::Player) {
            self.health.damage(projectile.damage());
            self.damaged = true;
        }
    }
}

impl Drawable for SpiderMan {
    fn draw(&mut self, canvas: &dyn Canvas, camera_x: f32) {
        let (Some(sprite), Some(size)) = (self.sprite.as_ref(), self.size()) else {
            return;
        };
        let screen_x = self.context.position.x - camera_x;
        let y = self.context.position.y;

        canvas.save();
        let destination = match self.context.facing {
            Direction::Right => Rect::new_from_x_y(screen_x, y, size.width, size.height),
            // mirrored : x axis is negated, so draw at -(x + width)
            Direction::Left => {
                canvas.flip_horizontally();
                Rect::new_from_x_y(-(screen_x + size.width), y, size.width, size.height)
            }
        };
        canvas.draw_image(sprite, &destination);
        canvas.restore();

        if self.damaged {
            self.damaged = false;
            canvas.fill_rect(
                &Rect::new_from_x_y(screen_x, y, size.width, size.height),
                FLASH_STYLE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RooftopConfig;
    use crate::enemy::EnemyId;
    use crate::projectile::ProjectileKind;
    use crate::rooftop::Rooftop;
    use crate::testing;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const VIEWPORT: Size = Size {
        width: 711.0,
        height: 400.0,
    };

    fn skyline(rooftops: Vec<Rooftop>) -> Skyline {
        let mut skyline = Skyline::new(RooftopConfig::default(), 500.0, 400.0, StdRng::seed_from_u64(0));
        skyline.set_rooftops(rooftops);
        skyline
    }

    fn spider_man() -> SpiderMan {
        SpiderMan::new(testing::assets(), &GameConfig::default())
    }

    fn pressing(codes: &[&str]) -> KeyState {
        let mut state = KeyState::new();
        for code in codes {
            state.set_pressed(code);
        }
        state
    }

    fn step(player: &mut SpiderMan, keystate: &KeyState, skyline: &Skyline, camera_x: f32) -> PlayerStep {
        player.update(
            keystate,
            &Terrain {
                skyline,
                camera_x,
                viewport: VIEWPORT,
            },
        )
    }

    fn run_frames(player: &mut SpiderMan, keystate: &KeyState, skyline: &Skyline, frames: usize) {
        for _ in 0..frames {
            step(player, keystate, skyline, 0.0);
        }
    }

    #[test]
    fn has_no_bounding_box_before_the_first_frame() {
        assert!(spider_man().bounding_box().is_none());
    }

    #[test]
    fn falls_onto_the_rooftop_below() {
        // top at 300, sprite is 40 x 70 on screen
        let skyline = skyline(vec![Rooftop::new(0.0, 300.0, 100.0)]);
        let mut player = spider_man();

        run_frames(&mut player, &KeyState::new(), &skyline, 60);

        assert_relative_eq!(player.position().y, 230.0);
        assert_relative_eq!(player.velocity().y, 0.0);
        assert!(!player.states().contains(CharacterState::Fall));
        assert!(player.states().contains(CharacterState::Standing));
    }

    #[test]
    fn jumps_only_from_solid_ground() {
        let skyline = skyline(vec![Rooftop::new(0.0, 300.0, 100.0)]);
        let mut player = spider_man();
        run_frames(&mut player, &KeyState::new(), &skyline, 60);

        let up = pressing(&["ArrowUp"]);
        step(&mut player, &up, &skyline, 0.0);
        assert_relative_eq!(player.velocity().y, -15.0 + 0.7, epsilon = 1e-5);
        assert!(player.states().contains(CharacterState::Fall));
        assert_eq!(player.sprite().unwrap().key(), keys::JUMP);

        // holding up in mid air does not jump again
        step(&mut player, &up, &skyline, 0.0);
        assert_relative_eq!(player.velocity().y, -15.0 + 1.4, epsilon = 1e-5);
        assert_eq!(player.sprite().unwrap().key(), keys::STANDING);
    }

    #[test]
    fn running_sets_facing_and_speed() {
        let skyline = skyline(vec![Rooftop::new(0.0, 2000.0, 100.0)]);
        let mut player = spider_man();
        player.set_position(Point { x: 100.0, y: 230.0 });

        step(&mut player, &pressing(&["ArrowRight"]), &skyline, 0.0);
        assert_relative_eq!(player.velocity().x, 5.0);
        assert_relative_eq!(player.position().x, 105.0);
        assert_eq!(player.facing(), Direction::Right);
        assert_eq!(player.sprite().unwrap().key(), keys::RUNNING_RIGHT_STEP);

        step(&mut player, &pressing(&["ArrowLeft"]), &skyline, 0.0);
        assert_relative_eq!(player.velocity().x, -5.0);
        assert_eq!(player.facing(), Direction::Left);
    }

    #[test]
    fn releasing_a_key_stops_running_and_shooting() {
        let skyline = skyline(vec![Rooftop::new(0.0, 2000.0, 100.0)]);
        let mut player = spider_man();
        player.set_position(Point { x: 100.0, y: 230.0 });
        step(&mut player, &pressing(&["ArrowRight", "Space"]), &skyline, 0.0);
        assert!(player
            .states()
            .contains_all(&[CharacterState::Running, CharacterState::Shoot]));

        let mut released = KeyState::new();
        released.set_released("ArrowRight");
        step(&mut player, &released, &skyline, 0.0);

        assert!(!player.states().contains(CharacterState::Running));
        assert!(!player.states().contains(CharacterState::Shoot));
        assert_relative_eq!(player.velocity().x, 0.0);
        assert_eq!(player.sprite().unwrap().key(), keys::STANDING);
    }

    #[test]
    fn holding_space_fires_a_web_every_twenty_frames() {
        let skyline = skyline(vec![Rooftop::new(0.0, 2000.0, 100.0)]);
        let mut player = spider_man();
        player.set_position(Point { x: 100.0, y: 230.0 });
        let space = pressing(&["Space"]);

        let webs: Vec<Projectile> = (0..41)
            .filter_map(|_| match step(&mut player, &space, &skyline, 0.0) {
                PlayerStep::Alive { web, .. } => web,
                PlayerStep::Died => None,
            })
            .collect();

        assert_eq!(webs.len(), 3);
        assert!(webs.iter().all(|web| web.kind() == ProjectileKind::Web));
        // right hand : x + 40 + 1, half of the 70 high pose
        assert_relative_eq!(webs[0].position().x, 141.0);
        assert_relative_eq!(webs[0].position().y, 265.0);
        assert_eq!(player.sprite().unwrap().key(), keys::SHOOT);
    }

    #[test]
    fn webs_leave_from_the_left_hand_when_facing_left() {
        let skyline = skyline(vec![Rooftop::new(0.0, 2000.0, 100.0)]);
        let mut player = spider_man();
        player.set_position(Point { x: 300.0, y: 230.0 });

        let outcome = step(&mut player, &pressing(&["ArrowLeft", "Space"]), &skyline, 0.0);

        let PlayerStep::Alive { web: Some(web), .. } = outcome else {
            panic!("expected a web, got {:?}", outcome);
        };
        assert_eq!(web.direction(), Direction::Left);
        assert_relative_eq!(web.position().x, 299.0);
    }

    #[test]
    fn the_side_of_a_building_blocks_running() {
        // tall building from x = 100, top at 100
        let skyline = skyline(vec![Rooftop::new(100.0, 200.0, 300.0)]);
        let mut player = spider_man();
        player.set_position(Point { x: 56.0, y: 200.0 });

        step(&mut player, &pressing(&["ArrowRight"]), &skyline, 0.0);

        assert_relative_eq!(player.position().x, 56.0);
        assert_relative_eq!(player.velocity().x, 0.0);
    }

    #[test]
    fn camera_follows_past_the_scroll_threshold() {
        let skyline = skyline(vec![Rooftop::new(0.0, 2000.0, 100.0)]);
        let mut player = spider_man();
        let right = pressing(&["ArrowRight"]);

        player.set_position(Point { x: 100.0, y: 230.0 });
        let slow = step(&mut player, &right, &skyline, 0.0);
        assert_eq!(
            slow,
            PlayerStep::Alive {
                camera_advance: 0.0,
                web: None
            }
        );

        player.set_position(Point { x: 300.0, y: 230.0 });
        let scrolling = step(&mut player, &right, &skyline, 100.0);
        assert_eq!(
            scrolling,
            PlayerStep::Alive {
                camera_advance: 5.0,
                web: None
            }
        );
    }

    #[test]
    fn cannot_walk_off_the_left_edge() {
        let skyline = skyline(vec![Rooftop::new(0.0, 2000.0, 100.0)]);
        let mut player = spider_man();
        player.set_position(Point { x: 2.0, y: 230.0 });

        step(&mut player, &pressing(&["ArrowLeft"]), &skyline, 0.0);
        assert_relative_eq!(player.position().x, 0.0);

        player.set_position(Point { x: 502.0, y: 230.0 });
        step(&mut player, &pressing(&["ArrowLeft"]), &skyline, 500.0);
        assert_relative_eq!(player.position().x, 500.0);
    }

    #[test]
    fn falling_off_the_screen_is_death() {
        let skyline = skyline(vec![Rooftop::new(500.0, 200.0, 100.0)]);
        let mut player = spider_man();

        let mut frames = 0;
        while step(&mut player, &KeyState::new(), &skyline, 0.0) != PlayerStep::Died {
            frames += 1;
            assert!(frames < 100, "never left the screen");
        }
        assert!(player.position().y >= 400.0);
    }

    #[test]
    fn knives_hurt_and_webs_do_not() {
        let config = ProjectileConfig::default();
        let mut player = spider_man();
        let web = Projectile::web(Point::default(), Direction::Right, &config);
        let knife = Projectile::knife(Point::default(), EnemyId(1), Size::default(), &config);

        player.handle_hit(&web);
        assert_eq!(player.health().current(), 5);

        player.handle_hit(&knife);
        assert_eq!(player.health().current(), 4);
        assert!(player.damaged);
    }

    #[test]
    fn last_health_point_lost_means_death_next_frame() {
        let skyline = skyline(vec![Rooftop::new(0.0, 300.0, 100.0)]);
        let mut player = spider_man();
        run_frames(&mut player, &KeyState::new(), &skyline, 5);
        player.set_health(1);
        let knife = Projectile::knife(Point::default(), EnemyId(1), Size::default(), &ProjectileConfig::default());

        player.handle_hit(&knife);

        assert_eq!(player.health().current(), 0);
        assert_eq!(step(&mut player, &KeyState::new(), &skyline, 0.0), PlayerStep::Died);
    }

    #[test]
    fn regenerates_one_heart_per_interval() {
        let skyline = skyline(vec![Rooftop::new(0.0, 300.0, 100.0)]);
        let mut player = spider_man();
        run_frames(&mut player, &KeyState::new(), &skyline, 1);
        player.set_health(3);

        // frames 1 ..= 599 do nothing, frame 600 heals
        run_frames(&mut player, &KeyState::new(), &skyline, 599);
        assert_eq!(player.health().current(), 3);
        run_frames(&mut player, &KeyState::new(), &skyline, 1);
        assert_eq!(player.health().current(), 4);
    }

    #[test]
    fn respawns_until_they_run_out() {
        let mut player = spider_man();
        player.set_position(Point { x: 300.0, y: 500.0 });
        player.set_health(0);

        assert_eq!(player.respawn(), Respawn::Continue);
        assert_eq!(player.respawns(), 2);
        assert_eq!(player.position(), Point::default());
        assert_eq!(player.health().current(), 5);

        assert_eq!(player.respawn(), Respawn::Continue);
        assert_eq!(player.respawn(), Respawn::Continue);
        assert_eq!(player.respawns(), 0);
        assert_eq!(player.respawn(), Respawn::GameOver);
    }

    #[test]
    fn facing_left_mirrors_the_sprite() {
        let skyline = skyline(vec![Rooftop::new(0.0, 2000.0, 100.0)]);
        let mut player = spider_man();
        player.set_position(Point { x: 300.0, y: 230.0 });
        step(&mut player, &pressing(&["ArrowLeft"]), &skyline, 0.0);

        let canvas = testing::RecordingCanvas::default();
        player.draw(&canvas, 0.0);

        assert_eq!(canvas.flips(), 1);
    }

    #[test]
    fn hud_shows_health_and_respawns() {
        let mut player = spider_man();
        player.set_health(2);
        let assets = testing::assets();
        let canvas = testing::RecordingCanvas::default();

        player.draw_hud(
            &canvas,
            assets.get(keys::HEART).unwrap(),
            assets.get(keys::SPIDER_HEAD).unwrap(),
            711.0,
        );

        let images = canvas.images();
        assert_eq!(images.iter().filter(|key| *key == keys::HEART).count(), 2);
        assert_eq!(images.iter().filter(|key| *key == keys::SPIDER_HEAD).count(), 3);
    }
}
