use crate::browser;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    /// play a fresh copy so overlapping effects do not cut each other off
    pub restart: bool,
    /// seconds into the track
    pub start_time: f64,
}

impl Default for PlayOptions {
    fn default() -> Self {
        PlayOptions {
            restart: false,
            start_time: 0.0,
        }
    }
}

/// Sound requested by the simulation, played by whoever owns the speakers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub name: &'static str,
    pub options: PlayOptions,
}

pub trait AudioPlayer {
    fn play(&self, name: &str, options: PlayOptions) -> Result<()>;
    fn pause(&self, name: &str) -> Result<()>;
    /// seconds into the track, `None` unless it is playing
    fn playing_at(&self, name: &str) -> Option<f64>;
}

/// Holds the playlist while the game is paused
/// - pausing remembers which track was playing and where
/// - resuming picks that track up from the same spot
#[derive(Debug, Default)]
pub struct MusicPause {
    held: Option<(&'static str, f64)>,
}

impl MusicPause {
    pub fn hold(&mut self, player: &dyn AudioPlayer, playlist: &[&'static str]) -> Result<()> {
        let playing = playlist
            .iter()
            .find_map(|&track| player.playing_at(track).map(|at| (track, at)));
        if let Some((track, _)) = playing {
            player.pause(track)?;
            self.held = playing;
        }
        Ok(())
    }

    pub fn release(&mut self, player: &dyn AudioPlayer) -> Result<()> {
        match self.held.take() {
            Some((track, start_time)) => player.play(
                track,
                PlayOptions {
                    restart: false,
                    start_time,
                },
            ),
            None => Ok(()),
        }
    }
}

/// Audio registry keyed by resource name, built once while loading
pub struct Audio {
    sounds: HashMap<String, HtmlAudioElement>,
}

impl Audio {
    pub fn new(manifest: &[(&str, &str)]) -> Result<Self> {
        let mut sounds = HashMap::new();
        for &(name, path) in manifest {
            sounds.insert(name.to_string(), browser::new_audio(path)?);
        }
        Ok(Audio { sounds })
    }

    fn sound(&self, name: &str) -> Result<&HtmlAudioElement> {
        self.sounds
            .get(name)
            .ok_or_else(|| anyhow!("No sound registered as '{}'", name))
    }

    /// Chain the tracks through their `ended` event and start the first one
    /// - the callbacks only ever touch audio elements
    pub fn loop_playlist(&self, tracks: &[&str]) -> Result<()> {
        let Some(first) = tracks.first() else {
            return Ok(());
        };
        for (index, name) in tracks.iter().enumerate() {
            let current = self.sound(name)?;
            let next = self.sound(tracks[(index + 1) % tracks.len()])?.clone();
            let on_ended = browser::closure_wrap(Box::new(move || {
                next.set_current_time(0.0);
                start(&next);
            }) as Box<dyn FnMut()>);
            current.set_onended(Some(on_ended.as_ref().unchecked_ref()));
            on_ended.forget();
        }
        self.play(first, PlayOptions::default())
    }
}

impl AudioPlayer for Audio {
    fn play(&self, name: &str, options: PlayOptions) -> Result<()> {
        let registered = self.sound(name)?;
        let sound = if options.restart {
            browser::new_audio(&registered.src())?
        } else {
            registered.clone()
        };
        sound.set_current_time(options.start_time);
        start(&sound);
        Ok(())
    }

    fn pause(&self, name: &str) -> Result<()> {
        self.sound(name)?
            .pause()
            .map_err(|err| anyhow!("Could not pause '{}' : {:#?}", name, err))
    }

    fn playing_at(&self, name: &str) -> Option<f64> {
        self.sounds
            .get(name)
            .filter(|sound| !sound.paused())
            .map(|sound| sound.current_time())
    }
}

// autoplay policies reject play() until the page gets a user gesture
fn start(sound: &HtmlAudioElement) {
    match sound.play() {
        Ok(promise) => browser::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                log!("Audio playback was rejected : {:#?}", err);
            }
        }),
        Err(err) => error!("Audio playback failed : {:#?}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Plays nothing, remembers what it was asked to do
    #[derive(Default)]
    struct Speakers {
        playing: RefCell<HashMap<String, f64>>,
        calls: RefCell<Vec<String>>,
    }

    impl Speakers {
        fn with_track(track: &str, at: f64) -> Self {
            let speakers = Speakers::default();
            speakers.playing.borrow_mut().insert(track.to_string(), at);
            speakers
        }
    }

    impl AudioPlayer for Speakers {
        fn play(&self, name: &str, options: PlayOptions) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("play {} at {}", name, options.start_time));
            self.playing.borrow_mut().insert(name.to_string(), options.start_time);
            Ok(())
        }

        fn pause(&self, name: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("pause {}", name));
            self.playing.borrow_mut().remove(name);
            Ok(())
        }

        fn playing_at(&self, name: &str) -> Option<f64> {
            self.playing.borrow().get(name).copied()
        }
    }

    const TRACKS: &[&str] = &["OPENING", "CLOSING"];

    #[test]
    fn resumes_the_paused_track_where_it_stopped() {
        let speakers = Speakers::with_track("CLOSING", 42.5);
        let mut music = MusicPause::default();

        music.hold(&speakers, TRACKS).unwrap();
        assert_eq!(speakers.playing_at("CLOSING"), None);

        music.release(&speakers).unwrap();
        assert_eq!(
            *speakers.calls.borrow(),
            vec!["pause CLOSING".to_string(), "play CLOSING at 42.5".to_string()]
        );
    }

    #[test]
    fn nothing_to_hold_when_music_is_off() {
        let speakers = Speakers::default();
        let mut music = MusicPause::default();

        music.hold(&speakers, TRACKS).unwrap();
        music.release(&speakers).unwrap();

        assert!(speakers.calls.borrow().is_empty());
    }

    #[test]
    fn releasing_twice_plays_once() {
        let speakers = Speakers::with_track("OPENING", 3.0);
        let mut music = MusicPause::default();

        music.hold(&speakers, TRACKS).unwrap();
        music.release(&speakers).unwrap();
        music.release(&speakers).unwrap();

        assert_eq!(speakers.calls.borrow().len(), 2);
    }
}
