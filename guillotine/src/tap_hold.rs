use embassy_time::{Duration, Instant};

use crate::event::KeyPos;
use crate::types::action::Action;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapHoldState {
    /// After a press event is received, tap or hold is not decided yet.
    /// The hold action is applied speculatively: layers are turned on, modifiers are not reported.
    Pending,
    /// Key is determined as hold, waiting for release
    Hold,
}

/// What a releasing tap-hold key turns out to be
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapHoldDecision {
    /// Released within the hold timeout, with no other key pressed in between
    Tap,
    /// Hold timeout expired, or another key was pressed while holding
    Hold,
}

/// A pressed tap-hold key
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HoldingKey {
    pub pos: KeyPos,
    pub tap_action: Action,
    pub hold_action: Action,
    pub pressed_time: Instant,
    pub state: TapHoldState,
}

impl HoldingKey {
    pub fn new(pos: KeyPos, tap_action: Action, hold_action: Action, pressed_time: Instant) -> Self {
        Self {
            pos,
            tap_action,
            hold_action,
            pressed_time,
            state: TapHoldState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == TapHoldState::Pending
    }

    /// Time at which a pending key becomes a hold
    pub fn deadline(&self, hold_timeout: Duration) -> Instant {
        self.pressed_time + hold_timeout
    }

    pub fn is_expired(&self, now: Instant, hold_timeout: Duration) -> bool {
        self.is_pending() && now >= self.deadline(hold_timeout)
    }

    /// The decision made when the key is released
    pub fn decide_on_release(&self) -> TapHoldDecision {
        match self.state {
            TapHoldState::Pending => TapHoldDecision::Tap,
            TapHoldState::Hold => TapHoldDecision::Hold,
        }
    }
}
