//! Per-key press state machine.
//!
//! A key's press depth is a discrete `level` running from 0 (fully released)
//! down to `-PRESS_INTERVALS` (fully pressed), one step per animation tick.
//! The state knows nothing about sound routing or other keys; the keyboard
//! controller drives it through its timers.

use crate::audio::ChannelId;
use crate::constants::{PRESS_INTERVALS, PRESS_STEP};

#[derive(Clone, Debug, Default)]
pub struct KeyState {
    level: i32,
    y_offset: f32,
    channel: Option<ChannelId>,
}

impl KeyState {
    /// Discrete press depth in `[-PRESS_INTERVALS, 0]`.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Vertical offset applied to the key's transform when drawing.
    pub fn y_offset(&self) -> f32 {
        self.y_offset
    }

    pub fn at_bottom(&self) -> bool {
        self.level == -PRESS_INTERVALS
    }

    pub fn at_top(&self) -> bool {
        self.level >= 0
    }

    /// True for every level in `[-PRESS_INTERVALS, 0)`. A key held at the
    /// bottom of its travel keeps reporting moving until it is released.
    pub fn is_moving(&self) -> bool {
        !(self.level >= 0 || self.level < -PRESS_INTERVALS)
    }

    /// One press increment. No-op once the key is fully down.
    pub fn tick_down(&mut self) {
        if !self.at_bottom() {
            self.level -= 1;
            self.y_offset -= PRESS_STEP;
        }
    }

    /// One release increment. No-op once the key is fully up.
    pub fn tick_up(&mut self) {
        if !self.at_top() {
            self.level += 1;
            self.y_offset += PRESS_STEP;
        }
    }

    /// Handle of the note currently sounding for this key, if any.
    pub fn channel(&self) -> Option<ChannelId> {
        self.channel
    }

    pub(crate) fn set_channel(&mut self, channel: ChannelId) {
        self.channel = Some(channel);
    }

    pub(crate) fn take_channel(&mut self) -> Option<ChannelId> {
        self.channel.take()
    }
}
