use crate::browser;
use anyhow::{anyhow, Context, Error, Result};
// web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we control the closure creation and specify the expected type
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use self::input::{KeyPress, KeyState};
use self::scheduler::{FrameHandle, FrameScheduler, FrameSource};
use futures::channel::mpsc::UnboundedReceiver;

pub mod audio;
pub mod input;
pub mod scheduler;

/// TABLE
/// ┌──────────────────────── Frame Flow ─────────────────────────────┐
/// │                                                                 │
/// │  requestAnimationFrame ──► GameLoop ──► Game::update(keystate)  │
/// │          ▲                    │                                 │
/// │          │                    └───────► Game::draw(renderer)    │
/// │          │                                     │                │
/// │          └──── FrameScheduler::schedule() ◄────┘                │
/// │                                                                 │
/// │  Escape ──► Game::toggle_pause() ──► halt / resume scheduling   │
/// └─────────────────────────────────────────────────────────────────┘
#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, keystate: &KeyState);
    fn draw(&mut self, renderer: &Renderer);
    /// Returns `true` when the game is now paused
    fn toggle_pause(&mut self) -> bool;
}

// ==================== Geometry ====================
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn scaled(self, scale: f32) -> Size {
        Size {
            width: self.width * scale,
            height: self.height * scale,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn new_from_x_y(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    /// Edges count as inside
    pub fn contains(&self, point: Point) -> bool {
        self.x() <= point.x
            && self.y() <= point.y
            && self.right() >= point.x
            && self.bottom() >= point.y
    }
}

// ==================== Sprites ====================
/// Name + natural size of a loaded image
/// - the core only ever sees this, the pixels stay in the `ImageStore`
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    key: Rc<str>,
    size: Size,
}

impl Sprite {
    pub fn new(key: &str, size: Size) -> Self {
        Sprite {
            key: Rc::from(key),
            size,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Sprite registry, populated once while loading and read-only afterwards
#[derive(Debug, Default, Clone)]
pub struct Assets {
    sprites: HashMap<String, Sprite>,
}

impl Assets {
    pub fn insert(&mut self, key: &str, size: Size) {
        self.sprites.insert(key.to_string(), Sprite::new(key, size));
    }

    pub fn get(&self, key: &str) -> Option<&Sprite> {
        self.sprites.get(key)
    }

    pub fn require(&self, key: &str) -> Result<Sprite> {
        self.get(key)
            .cloned()
            .ok_or_else(|| anyhow!("Sprite '{}' was never loaded", key))
    }
}

impl<'a> FromIterator<(&'a str, Size)> for Assets {
    fn from_iter<I: IntoIterator<Item = (&'a str, Size)>>(iter: I) -> Self {
        let mut assets = Assets::default();
        for (key, size) in iter {
            assets.insert(key, size);
        }
        assets
    }
}

// ==================== Canvas ====================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle<'a> {
    pub font: &'a str,
    pub align: &'a str,
    pub fill: &'a str,
}

/// Everything the game draws goes through this surface
pub trait Canvas {
    fn clear(&self, rect: &Rect);
    fn draw_image(&self, sprite: &Sprite, destination: &Rect);
    fn draw_image_cropped(&self, sprite: &Sprite, frame: &Rect, destination: &Rect);
    fn fill_rect(&self, rect: &Rect, style: &str);
    fn fill_text(&self, text: &str, position: Point, style: &TextStyle);
    fn save(&self);
    fn restore(&self);
    /// mirror the x axis, drawing at -x afterwards lands on x
    fn flip_horizontally(&self);
}

pub type ImageStore = HashMap<String, HtmlImageElement>;

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Renderer { context }
    }

    /// Pair the context with the loaded images for one frame of drawing
    pub fn surface<'a>(&'a self, images: &'a ImageStore) -> Surface<'a> {
        Surface {
            context: &self.context,
            images,
        }
    }
}

pub struct Surface<'a> {
    context: &'a CanvasRenderingContext2d,
    images: &'a ImageStore,
}

impl Surface<'_> {
    fn image(&self, sprite: &Sprite) -> Option<&HtmlImageElement> {
        let image = self.images.get(sprite.key());
        if image.is_none() {
            error!("No image element registered for '{}'", sprite.key());
        }
        image
    }
}

fn report(result: Result<(), JsValue>, operation: &str) {
    if let Err(err) = result {
        error!("Canvas {} failed : {:#?}", operation, err);
    }
}

impl Canvas for Surface<'_> {
    fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x().into(),
            rect.y().into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    fn draw_image(&self, sprite: &Sprite, destination: &Rect) {
        if let Some(image) = self.image(sprite) {
            report(
                self.context.draw_image_with_html_image_element_and_dw_and_dh(
                    image,
                    destination.x().into(),
                    destination.y().into(),
                    destination.size.width.into(),
                    destination.size.height.into(),
                ),
                "draw_image",
            );
        }
    }

    fn draw_image_cropped(&self, sprite: &Sprite, frame: &Rect, destination: &Rect) {
        if let Some(image) = self.image(sprite) {
            report(
                self.context
                    .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        image,
                        frame.x().into(),
                        frame.y().into(),
                        frame.size.width.into(),
                        frame.size.height.into(),
                        destination.x().into(),
                        destination.y().into(),
                        destination.size.width.into(),
                        destination.size.height.into(),
                    ),
                "draw_image_cropped",
            );
        }
    }

    fn fill_rect(&self, rect: &Rect, style: &str) {
        self.context.set_fill_style_str(style);
        self.context.fill_rect(
            rect.x().into(),
            rect.y().into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    fn fill_text(&self, text: &str, position: Point, style: &TextStyle) {
        self.context.set_font(style.font);
        self.context.set_text_align(style.align);
        self.context.set_fill_style_str(style.fill);
        report(
            self.context
                .fill_text(text, position.x.into(), position.y.into()),
            "fill_text",
        );
    }

    fn save(&self) {
        self.context.save();
    }

    fn restore(&self) {
        self.context.restore();
    }

    fn flip_horizontally(&self) {
        report(self.context.scale(-1.0, 1.0), "scale");
    }
}

// ==================== Loading ====================
/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields the channel result
    // - second ? yields the image load result
    rx.await??;

    Ok(image)
}

/// Load every image of a `(name, path)` manifest at once
/// - resolves when the last one does, order of arrival does not matter
/// - the first failure fails the whole batch
pub async fn load_images(manifest: &[(&str, &str)]) -> Result<(Assets, ImageStore)> {
    let loads = manifest.iter().map(|&(name, path)| async move {
        let image = load_image(path)
            .await
            .with_context(|| format!("Failed to load image '{}' from : {}", name, path))?;
        Ok::<_, Error>((name, image))
    });

    let mut assets = Assets::default();
    let mut images = ImageStore::new();
    for (name, image) in try_join_all(loads).await? {
        assets.insert(
            name,
            Size {
                width: image.natural_width() as f32,
                height: image.natural_height() as f32,
            },
        );
        images.insert(name.to_string(), image);
    }
    Ok((assets, images))
}

// ==================== Loop ====================
type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

/// requestAnimationFrame backed frame source
struct AnimationFrames {
    closure: SharedLoopClosure,
}

impl FrameSource for AnimationFrames {
    fn request_frame(&self) -> Result<FrameHandle> {
        let closure = self.closure.borrow();
        let closure = closure
            .as_ref()
            .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?;
        browser::request_animation_frame(closure).map(FrameHandle)
    }

    fn cancel_frame(&self, handle: FrameHandle) -> Result<()> {
        browser::cancel_animation_frame(handle.0)
    }
}

struct LoopState {
    game: Box<dyn Game>,
    keystate: KeyState,
    keyevents: UnboundedReceiver<KeyPress>,
    scheduler: FrameScheduler<AnimationFrames>,
    renderer: Renderer,
}

impl LoopState {
    fn frame(&mut self) {
        if !self.scheduler.on_frame() {
            return;
        }
        // one update per display refresh, there is no fixed timestep
        input::process_input(&mut self.keystate, &mut self.keyevents);
        self.game.update(&self.keystate);
        self.game.draw(&self.renderer);
        if let Err(err) = self.scheduler.schedule() {
            error!("GameLoop: could not schedule next frame : {:#?}", err);
        }
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if self.game.toggle_pause() {
            self.scheduler.halt()?;
            // paused overlay drawn once, over the frozen frame
            self.game.draw(&self.renderer);
            log!("Paused");
        } else {
            self.scheduler.resume()?;
            log!("Resumed");
        }
        Ok(())
    }
}

pub struct GameLoop;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let renderer = Renderer::new(browser::context()?);
        let mut loading = game;
        loading.draw(&renderer);

        let keyevents = input::prepare_input()?;
        let game = loading.initialize().await?;

        let closure: SharedLoopClosure = Rc::new(RefCell::new(None));
        let state = Rc::new(RefCell::new(LoopState {
            game,
            keystate: KeyState::new(),
            keyevents,
            scheduler: FrameScheduler::new(AnimationFrames {
                closure: closure.clone(),
            }),
            renderer,
        }));

        let frame_state = state.clone();
        *closure.borrow_mut() = Some(browser::create_raf_closure(move |_perf: f64| {
            frame_state.borrow_mut().frame();
        }));

        let pause_state = state.clone();
        input::on_pause_toggle(move || {
            if let Err(err) = pause_state.borrow_mut().toggle_pause() {
                error!("GameLoop: pause toggle failed : {:#?}", err);
            }
        })?;

        state.borrow_mut().scheduler.schedule()?;
        Ok(())
    }
}
