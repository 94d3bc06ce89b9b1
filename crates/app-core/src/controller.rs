//! Keyboard controller: single-key-down bookkeeping, animation timers and
//! the bridge to sound playback.
//!
//! At most one key is "current" (easing down or held) at a time. Pressing a
//! new key releases the previous one, so several keys may be easing back up
//! concurrently while only one eases down. Each animation owns its own timer
//! and touches only its own key's state.

use instant::Instant;
use smallvec::SmallVec;
use thiserror::Error;

use crate::audio::{AudioSink, Voice};
use crate::constants::{KEY_DOWN_INTERVAL, KEY_UP_INTERVAL, SOUND_FADE_OUT};
use crate::layout::{Key, KeyRegistry};
use crate::select::KeyId;
use crate::timer::RepeatingTimer;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum KeyboardError {
    /// A key id outside the registry's white/black ranges. Selection never
    /// produces one, so this is a bug in the caller.
    #[error("key id out of range: {0:?}")]
    InvalidKey(KeyId),
}

/// Rendering collaborator. The controller passes keys through untouched;
/// drawing is composed in, not inherited.
pub trait KeyRenderer {
    fn draw_key(&mut self, key: &Key);
}

struct KeyAnim {
    key: KeyId,
    timer: RepeatingTimer,
}

pub struct KeyboardController {
    registry: KeyRegistry,
    audio: Box<dyn AudioSink>,
    voice: Voice,
    current: Option<KeyId>,
    press: Option<KeyAnim>,
    releases: SmallVec<[KeyAnim; 4]>,
}

impl KeyboardController {
    pub fn new(registry: KeyRegistry, audio: Box<dyn AudioSink>) -> Self {
        Self {
            registry,
            audio,
            voice: Voice::default(),
            current: None,
            press: None,
            releases: SmallVec::new(),
        }
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// The single key currently selected/pressed, if any.
    pub fn current_key(&self) -> Option<KeyId> {
        self.current
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    /// Changes the timbre used by subsequent presses. A note already playing
    /// is unaffected.
    pub fn set_voice(&mut self, voice: Voice) {
        self.voice = voice;
    }

    /// Cycles organ -> piano -> organ.
    pub fn next_voice(&mut self) {
        self.voice = self.voice.next();
        log::info!("voice set to {:?}", self.voice);
    }

    /// Presses `id`: releases the previous current key, starts this key's
    /// sound and its press animation. Calling again with the same id is a
    /// no-op; the animation and sound are not restarted.
    pub fn key_down(&mut self, id: KeyId, now: Instant) -> Result<(), KeyboardError> {
        if self.current == Some(id) {
            return Ok(());
        }
        if !self.registry.contains(id) {
            return Err(KeyboardError::InvalidKey(id));
        }

        if let Some(previous) = self.current.take() {
            self.key_up(previous, now)?;
        }
        self.current = Some(id);

        // A pending release for this key is cancelled; the press resumes
        // from whatever level the key is at.
        self.releases.retain(|anim| anim.key != id);

        let voice = self.voice;
        let Some(key) = self.registry.key_mut(id) else {
            return Err(KeyboardError::InvalidKey(id));
        };
        match self.audio.play(voice, key) {
            Some(channel) => key.state.set_channel(channel),
            None => log::warn!("no sound for key {}; pressing silently", key.name()),
        }

        self.press = Some(KeyAnim {
            key: id,
            timer: RepeatingTimer::new(KEY_DOWN_INTERVAL, now),
        });
        Ok(())
    }

    /// Releases `id`: fades its sound out and starts the release animation.
    /// A no-op for a key already fully up or already releasing.
    pub fn key_up(&mut self, id: KeyId, now: Instant) -> Result<(), KeyboardError> {
        if !self.registry.contains(id) {
            return Err(KeyboardError::InvalidKey(id));
        }

        // A key never has an up-timer and a down-timer at the same time.
        if self.press.as_ref().is_some_and(|anim| anim.key == id) {
            self.press = None;
        }
        if self.current == Some(id) {
            self.current = None;
        }

        let Some(key) = self.registry.key_mut(id) else {
            return Err(KeyboardError::InvalidKey(id));
        };
        if let Some(channel) = key.state.take_channel() {
            self.audio.fade_out(channel, SOUND_FADE_OUT);
        }
        if !key.state.at_top() && !self.releases.iter().any(|anim| anim.key == id) {
            self.releases.push(KeyAnim {
                key: id,
                timer: RepeatingTimer::new(KEY_UP_INTERVAL, now),
            });
        }
        Ok(())
    }

    /// Advances every active animation to `now`, firing any ticks that have
    /// come due. Timers cancel themselves on reaching their terminal level.
    /// Returns true if any key moved.
    pub fn update(&mut self, now: Instant) -> bool {
        let mut moved = false;

        let mut press_done = false;
        if let Some(anim) = self.press.as_mut() {
            let ticks = anim.timer.poll(now);
            if let Some(key) = self.registry.key_mut(anim.key) {
                for _ in 0..ticks {
                    if key.state.at_bottom() {
                        break;
                    }
                    key.state.tick_down();
                    moved = true;
                }
                press_done = key.state.at_bottom();
            }
        }
        if press_done {
            self.press = None;
        }

        for anim in self.releases.iter_mut() {
            let ticks = anim.timer.poll(now);
            if let Some(key) = self.registry.key_mut(anim.key) {
                for _ in 0..ticks {
                    if key.state.at_top() {
                        break;
                    }
                    key.state.tick_up();
                    moved = true;
                }
            }
        }
        let registry = &self.registry;
        self.releases
            .retain(|anim| registry.key(anim.key).is_some_and(|key| !key.state.at_top()));

        moved
    }

    /// True iff the currently-down key's state reports moving. The host
    /// combines this with [`KeyboardController::update`]'s return value to
    /// decide whether a redraw is needed without fresh input.
    pub fn any_key_moving(&self) -> bool {
        self.current
            .and_then(|id| self.registry.key(id))
            .map(|key| key.state.is_moving())
            .unwrap_or(false)
    }

    /// Passes every key to the renderer, whites then blacks.
    pub fn draw_all(&self, renderer: &mut dyn KeyRenderer) {
        for key in self.registry.white_keys() {
            renderer.draw_key(key);
        }
        for key in self.registry.black_keys() {
            renderer.draw_key(key);
        }
    }
}
