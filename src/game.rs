use crate::browser;
use crate::config::GameConfig;
use crate::engine::audio::{Audio, AudioPlayer, MusicPause};
use crate::engine::input::KeyState;
use crate::engine::{self, Canvas, Game, ImageStore, Point, Renderer, TextStyle};
use crate::world::World;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::join;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::rc::Rc;

const CONFIG_PATH: &str = "config.json";

/// Every image by the name the game looks it up with
const IMAGES: &[(&str, &str)] = &[
    ("JUMP", "images/jump.png"),
    ("RUNNING_CHANGE_STEP", "images/running-change-step.png"),
    ("RUNNING_LEFT_STEP", "images/running-left-step.png"),
    ("RUNNING_RIGHT_STEP", "images/running-right-step.png"),
    ("SHOOT_CHANGE_STEP", "images/shoot-change-step.png"),
    ("SHOOT_LEFT-STEP", "images/shoot-left-step.png"),
    ("SHOOT_RIGHT-STEP", "images/shoot-right-step.png"),
    ("SHOOT", "images/shoot.png"),
    ("STANDING", "images/standing.png"),
    ("WEB_PROJECTILE", "images/web.png"),
    ("BACKGROUND", "images/background.jpg"),
    ("BUILDING", "images/building.png"),
    ("SPIDER_HEAD", "images/spider-head.png"),
    ("HEART", "images/heart.png"),
    ("THUG", "images/thug.png"),
    ("KNIFE", "images/knife.png"),
];

const SOUNDS: &[(&str, &str)] = &[
    ("AMAZING_SPIDER_MAN_2", "audio/amazing-spider-man-2.mp3"),
    ("FRIENDLY_SPIDERMAN", "audio/60-theme-song.mp3"),
    ("MOVIE_THEME", "audio/old-theme.mp3"),
    ("ANIMATED_SERIES", "audio/animated-series-theme.mp3"),
    ("SHOOT", "audio/shooting-web.wav"),
];

const PLAYLIST: &[&str] = &[
    "AMAZING_SPIDER_MAN_2",
    "FRIENDLY_SPIDERMAN",
    "MOVIE_THEME",
    "ANIMATED_SERIES",
];

const LOADING_STYLE: TextStyle = TextStyle {
    font: "30px Helvetica",
    align: "center",
    fill: "white",
};

/// TABLE
/// ┌──────────────────── Game Lifecycle ─────────────────────┐
/// │                                                         │
/// │   Loading ──initialize()──► Loaded(Session)             │
/// │      │                         │                        │
/// │      │ draw : "Loading..."     ├─► update : World + SFX │
/// │      │                         └─► draw   : World       │
/// │      └─ images, sounds, config.json load in parallel    │
/// │                                                         │
/// └─────────────────────────────────────────────────────────┘
pub enum WebSlinger {
    /// Resources are being fetched, nothing to simulate yet
    Loading,

    /// Resources resolved, world running
    Loaded(Session),
}

pub struct Session {
    world: World,
    images: ImageStore,
    audio: Audio,
    music: MusicPause,
}

impl Session {
    fn pause_music(&mut self, paused: bool) {
        let result = if paused {
            self.music.hold(&self.audio, PLAYLIST)
        } else {
            self.music.release(&self.audio)
        };
        if let Err(err) = result {
            error!("Could not toggle the music : {:#}", err);
        }
    }
}

impl WebSlinger {
    pub fn new() -> Self {
        WebSlinger::Loading
    }

    /// Missing, malformed or out of range config falls back to the defaults
    async fn load_config() -> GameConfig {
        match browser::fetch_json::<GameConfig>(CONFIG_PATH).await {
            Ok(config) => match config.validate() {
                Ok(()) => config,
                Err(err) => {
                    log!("Using default configuration, {} rejected : {:#}", CONFIG_PATH, err);
                    GameConfig::default()
                }
            },
            Err(err) => {
                log!("Using default configuration, {} unavailable : {:#}", CONFIG_PATH, err);
                GameConfig::default()
            }
        }
    }
}

impl Default for WebSlinger {
    fn default() -> Self {
        WebSlinger::new()
    }
}

#[async_trait(?Send)]
impl Game for WebSlinger {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            WebSlinger::Loading => {
                let (config, loaded) = join!(Self::load_config(), engine::load_images(IMAGES));
                let (assets, images) = loaded?;
                let audio = Audio::new(SOUNDS)?;
                log!("Loaded {} images and {} sounds", images.len(), SOUNDS.len());

                if config.audio.music {
                    audio.loop_playlist(PLAYLIST)?;
                }
                let world = World::new(config, Rc::new(assets), StdRng::from_entropy())?;
                Ok(Box::new(WebSlinger::Loaded(Session {
                    world,
                    images,
                    audio,
                    music: MusicPause::default(),
                })))
            }
            WebSlinger::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState) {
        if let WebSlinger::Loaded(session) = self {
            session.world.update(keystate);
            for cue in session.world.drain_sounds() {
                if let Err(err) = session.audio.play(cue.name, cue.options) {
                    error!("Could not play {} : {:#}", cue.name, err);
                }
            }
        }
    }

    fn draw(&mut self, renderer: &Renderer) {
        match self {
            WebSlinger::Loading => {
                let images = ImageStore::new();
                let canvas = GameConfig::default().canvas;
                renderer.surface(&images).fill_text(
                    "Loading...",
                    Point {
                        x: canvas.width / 2.0,
                        y: canvas.height / 2.0,
                    },
                    &LOADING_STYLE,
                );
            }
            WebSlinger::Loaded(session) => {
                let surface = renderer.surface(&session.images);
                session.world.draw(&surface);
            }
        }
    }

    fn toggle_pause(&mut self) -> bool {
        match self {
            WebSlinger::Loading => false,
            WebSlinger::Loaded(session) => {
                let paused = session.world.toggle_pause();
                session.pause_music(paused);
                paused
            }
        }
    }
}
