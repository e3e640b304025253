use crate::browser;
use anyhow::Result;
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use std::collections::HashSet;
use web_sys::KeyboardEvent;

/// Keys the game reacts to, named after `KeyboardEvent.code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Escape,
}

impl Key {
    pub fn from_code(code: &str) -> Option<Key> {
        match code {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "Space" => Some(Key::Space),
            "Escape" => Some(Key::Escape),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPress {
    KeyDown(String),
    KeyUp(String),
}

/// Snapshot of the keyboard, sampled once at the start of a frame
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    held: HashSet<Key>,
    // any key went up since the previous frame
    released: bool,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState::default()
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn was_released(&self) -> bool {
        self.released
    }

    pub fn set_pressed(&mut self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.held.insert(key);
        }
    }

    pub fn set_released(&mut self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.held.remove(&key);
        }
        self.released = true;
    }
}

/// Drain everything the listeners queued since the last frame
pub fn process_input(state: &mut KeyState, keyevent_receiver: &mut UnboundedReceiver<KeyPress>) {
    state.released = false;
    // try_recv :
    // - Ok(event) -> queued event
    // - Err(_)    -> nothing queued right now, or the channel closed
    while let Ok(event) = keyevent_receiver.try_recv() {
        match event {
            KeyPress::KeyDown(code) => state.set_pressed(&code),
            KeyPress::KeyUp(code) => state.set_released(&code),
        }
    }
}

/// Listen to the document and forward key events through a channel
/// - events arrive whenever the browser likes
/// - the game only sees them when a frame drains the channel
pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
    let (keydown_sender, keyevent_receiver) = unbounded();
    let keyup_sender = keydown_sender.clone();

    let onkeydown = browser::closure_wrap(Box::new(move |keycode: KeyboardEvent| {
        let _ = keydown_sender.unbounded_send(KeyPress::KeyDown(keycode.code()));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let onkeyup = browser::closure_wrap(Box::new(move |keycode: KeyboardEvent| {
        let _ = keyup_sender.unbounded_send(KeyPress::KeyUp(keycode.code()));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    browser::add_key_listener("keydown", &onkeydown)?;
    browser::add_key_listener("keyup", &onkeyup)?;
    onkeydown.forget();
    onkeyup.forget();

    Ok(keyevent_receiver)
}

/// Escape toggles pause on its first keydown, auto-repeat is ignored
/// - handled outside the frame, since a paused game requests no frames
pub fn on_pause_toggle(mut toggle: impl FnMut() + 'static) -> Result<()> {
    let listener = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        if Key::from_code(&event.code()) == Some(Key::Escape) && !event.repeat() {
            toggle();
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);

    browser::add_key_listener("keydown", &listener)?;
    listener.forget();
    Ok(())
}
