// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Directory Structure                                 │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ Code Directory    │          Role                                        │
// ├───────────────────┼──────────────────────────────────────────────────────┤
// │ sprite/           │ Player character                                     │
// │ ├── mod.rs        │ Image names, facing, animation cycles                │
// │ ├── state.rs      │ State flags + physics context                        │
// │ └── spider_man.rs │ Input -> state -> physics -> image -> draw           │
// └───────────────────┴──────────────────────────────────────────────────────┘

pub mod spider_man;
pub mod state;

/// Resource names, used verbatim as lookup keys into the asset registry
pub mod keys {
    pub const STANDING: &str = "STANDING";
    pub const JUMP: &str = "JUMP";
    pub const SHOOT: &str = "SHOOT";
    pub const RUNNING_RIGHT_STEP: &str = "RUNNING_RIGHT_STEP";
    pub const RUNNING_CHANGE_STEP: &str = "RUNNING_CHANGE_STEP";
    pub const RUNNING_LEFT_STEP: &str = "RUNNING_LEFT_STEP";
    pub const SHOOT_RIGHT_STEP: &str = "SHOOT_RIGHT-STEP";
    pub const SHOOT_CHANGE_STEP: &str = "SHOOT_CHANGE_STEP";
    pub const SHOOT_LEFT_STEP: &str = "SHOOT_LEFT-STEP";
    pub const WEB_PROJECTILE: &str = "WEB_PROJECTILE";
    pub const BACKGROUND: &str = "BACKGROUND";
    pub const BUILDING: &str = "BUILDING";
    pub const SPIDER_HEAD: &str = "SPIDER_HEAD";
    pub const HEART: &str = "HEART";
    pub const THUG: &str = "THUG";
    pub const KNIFE: &str = "KNIFE";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// An image sequence the player cycles through while in a state
pub trait SpriteState {
    fn name() -> &'static str;
    fn frames() -> &'static [&'static str];

    fn total_frames() -> usize {
        Self::frames().len()
    }

    /// wraps around, any frame counter is a valid index
    fn current_frame_name(frame: usize) -> &'static str {
        let frames = Self::frames();
        frames[frame % frames.len()]
    }
}

pub struct Standing;
pub struct Jumping;
pub struct Shooting;
pub struct Running;
pub struct RunningShooting;

impl SpriteState for Standing {
    fn name() -> &'static str {
        "Standing"
    }

    fn frames() -> &'static [&'static str] {
        &[keys::STANDING]
    }
}

impl SpriteState for Jumping {
    fn name() -> &'static str {
        "Jumping"
    }

    fn frames() -> &'static [&'static str] {
        &[keys::JUMP]
    }
}

impl SpriteState for Shooting {
    fn name() -> &'static str {
        "Shooting"
    }

    fn frames() -> &'static [&'static str] {
        &[keys::SHOOT]
    }
}

// right foot, legs together, left foot, legs together
impl SpriteState for Running {
    fn name() -> &'static str {
        "Running"
    }

    fn frames() -> &'static [&'static str] {
        &[
            keys::RUNNING_RIGHT_STEP,
            keys::RUNNING_CHANGE_STEP,
            keys::RUNNING_LEFT_STEP,
            keys::RUNNING_CHANGE_STEP,
        ]
    }
}

impl SpriteState for RunningShooting {
    fn name() -> &'static str {
        "RunningShooting"
    }

    fn frames() -> &'static [&'static str] {
        &[
            keys::SHOOT_RIGHT_STEP,
            keys::SHOOT_CHANGE_STEP,
            keys::SHOOT_LEFT_STEP,
            keys::SHOOT_CHANGE_STEP,
        ]
    }
}
