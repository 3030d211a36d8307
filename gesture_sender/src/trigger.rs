//! Debounce / cooldown gate between noisy per-frame classifications and
//! the single discrete "send the clipboard" event.
//!
//! Time never comes from the wall clock inside this module — callers pass
//! `Instant`s in, so every transition is testable without sleeping.

use std::time::{Duration, Instant};

use serde::Deserialize;

// ════════════════════════════════════════════════════════════════════════════
// TriggerConfig
// ════════════════════════════════════════════════════════════════════════════

/// Named debounce/cooldown parameters, overridable from the config file.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// The fist must hold for MORE than this many consecutive frames
    /// before the gate arms; single-frame misclassifications never fire.
    pub debounce_frames: u32,
    /// Minimum time between successful fires.
    pub cooldown_ms:     u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        TriggerConfig {
            debounce_frames: 10,
            cooldown_ms:     3000,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Decisions and phases
// ════════════════════════════════════════════════════════════════════════════

/// What the gate says about firing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Armed and out of cooldown — dispatch now.
    Fire,
    /// Armed but a recent fire is still cooling; suppressed with no state
    /// change.
    Cooling,
    /// Not armed: neither the debounce condition nor a manual override.
    NotReady,
}

/// Coarse phase for the status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatePhase {
    Idle,
    Accumulating,
    Triggered,
    Cooling,
}

// ════════════════════════════════════════════════════════════════════════════
// TriggerGate
// ════════════════════════════════════════════════════════════════════════════

/// Counter + last-fire timestamp.
///
/// The counter resets on any not-fist frame and after a *successful*
/// dispatch ([`confirm`](TriggerGate::confirm)).  A failed dispatch leaves
/// both the counter and the cooldown untouched, so the gate re-fires every
/// frame until the send lands or the hand opens.
#[derive(Debug)]
pub struct TriggerGate {
    config:      TriggerConfig,
    fist_frames: u32,
    last_fired:  Option<Instant>,
}

impl TriggerGate {
    pub fn new(config: TriggerConfig) -> Self {
        TriggerGate {
            config,
            fist_frames: 0,
            last_fired:  None,
        }
    }

    /// Feed one frame's classification.
    pub fn observe(&mut self, is_fist: bool) {
        if is_fist {
            self.fist_frames += 1;
        } else {
            self.fist_frames = 0;
        }
    }

    /// Debounce condition: strictly more than `debounce_frames` in a row.
    pub fn armed(&self) -> bool {
        self.fist_frames > self.config.debounce_frames
    }

    pub fn fist_frames(&self) -> u32 {
        self.fist_frames
    }

    /// Should a dispatch be attempted this frame?  `manual_override`
    /// (a key press) bypasses the vision debounce but not the cooldown.
    pub fn decide(&self, manual_override: bool, now: Instant) -> GateDecision {
        if !(self.armed() || manual_override) {
            return GateDecision::NotReady;
        }
        if self.in_cooldown(now) {
            GateDecision::Cooling
        } else {
            GateDecision::Fire
        }
    }

    /// Record a successful dispatch: counter back to zero, cooldown
    /// restarts from `now`.
    pub fn confirm(&mut self, now: Instant) {
        self.fist_frames = 0;
        self.last_fired = Some(now);
    }

    pub fn phase(&self, now: Instant) -> GatePhase {
        if self.in_cooldown(now) {
            GatePhase::Cooling
        } else if self.armed() {
            GatePhase::Triggered
        } else if self.fist_frames > 0 {
            GatePhase::Accumulating
        } else {
            GatePhase::Idle
        }
    }

    fn in_cooldown(&self, now: Instant) -> bool {
        match self.last_fired {
            Some(t) => now.duration_since(t) <= Duration::from_millis(self.config.cooldown_ms),
            None => false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
