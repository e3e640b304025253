use crate::engine::Point;
use crate::sprite::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterState {
    Standing,
    Running,
    Jump,
    Fall,
    Shoot,
}

/// Active states of a character, one bit each
/// - STANDING has no bit : it is what remains when no movement bit is set
/// - SHOOT is an overlay and combines with any movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSet(u8);

impl StateSet {
    const RUNNING: u8 = 0b0001;
    const JUMP: u8 = 0b0010;
    const FALL: u8 = 0b0100;
    const SHOOT: u8 = 0b1000;
    const MOVEMENT: u8 = Self::RUNNING | Self::JUMP | Self::FALL;

    pub fn standing() -> Self {
        StateSet(0)
    }

    fn bit(state: CharacterState) -> u8 {
        match state {
            CharacterState::Standing => 0,
            CharacterState::Running => Self::RUNNING,
            CharacterState::Jump => Self::JUMP,
            CharacterState::Fall => Self::FALL,
            CharacterState::Shoot => Self::SHOOT,
        }
    }

    pub fn contains(self, state: CharacterState) -> bool {
        match state {
            CharacterState::Standing => self.0 & Self::MOVEMENT == 0,
            other => self.0 & Self::bit(other) != 0,
        }
    }

    /// true only when every listed state is active
    pub fn contains_all(self, states: &[CharacterState]) -> bool {
        states.iter().all(|state| self.contains(*state))
    }

    pub fn insert(&mut self, state: CharacterState) {
        match state {
            CharacterState::Standing => self.0 &= !Self::MOVEMENT,
            other => self.0 |= Self::bit(other),
        }
    }

    pub fn remove(&mut self, state: CharacterState) {
        self.0 &= !Self::bit(state);
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
/// Shared data for :
/// - physics : position + velocity
/// - display : frame counters + facing
pub struct SpiderManContext {
    pub frame: u32,
    pub running_frame: usize,
    pub shooting_frame: u32,
    pub position: Point,
    pub velocity: Point,
    pub facing: Direction,
}

impl SpiderManContext {
    pub fn new(position: Point) -> Self {
        SpiderManContext {
            frame: 0,
            running_frame: 0,
            shooting_frame: 0,
            position,
            velocity: Point::default(),
            facing: Direction::Right,
        }
    }

    /// ::update per frame
    /// - gravity -> velocity
    /// - velocity -> position
    pub fn update(mut self, gravity: f32) -> Self {
        self.velocity.y += gravity;
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
        self
    }

    /// key released : animations start over
    pub fn on_release(mut self) -> Self {
        self.running_frame = 0;
        self.shooting_frame = 0;
        self
    }

    pub fn face(mut self, direction: Direction) -> Self {
        self.facing = direction;
        self
    }

    pub fn set_horizontal_velocity(mut self, x: f32) -> Self {
        self.velocity.x = x;
        self
    }

    pub fn set_vertical_velocity(mut self, y: f32) -> Self {
        self.velocity.y = y;
        self
    }

    /// stand on a surface, `height` is the on-screen sprite height
    pub fn land_on(mut self, surface_y: f32, height: f32) -> Self {
        self.position.y = surface_y - height;
        self.velocity.y = 0.0;
        self
    }

    /// undo this frame's horizontal step
    pub fn push_back(mut self) -> Self {
        self.position.x -= self.velocity.x;
        self.velocity.x = 0.0;
        self
    }

    pub fn clamp_x(mut self, min_x: f32) -> Self {
        if self.position.x < min_x {
            self.position.x = min_x;
        }
        self
    }

    pub fn next_frame(mut self) -> Self {
        self.frame = self.frame.wrapping_add(1);
        self
    }
}
