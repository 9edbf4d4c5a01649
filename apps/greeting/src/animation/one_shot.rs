//! Visibility-gated one-shot animation.
//!
//! The first false→true edge of the visibility signal arms the trigger and
//! opens a short render window. Nothing reopens it afterwards, however often
//! the signal toggles.

use std::time::Duration;

use tracing::debug;

use crate::animation::TimedWindow;

/// How long the sparkle burst stays rendered.
pub const SPARKLE_DURATION: Duration = Duration::from_millis(800);

pub struct OneShotAnimation {
    armed: bool,
    last_signal: bool,
    particles: usize,
    window: TimedWindow,
}

impl OneShotAnimation {
    pub fn new(particles: usize, duration: Duration) -> Self {
        Self {
            armed: false,
            last_signal: false,
            particles,
            window: TimedWindow::new(duration),
        }
    }

    pub fn sparkles(particles: usize) -> Self {
        Self::new(particles, SPARKLE_DURATION)
    }

    /// Feeds one visibility value. Returns true if this call opened the window.
    pub fn observe(&mut self, visible: bool) -> bool {
        let rising = visible && !self.last_signal;
        self.last_signal = visible;

        if !rising || self.armed {
            return false;
        }
        self.armed = true;
        self.window.open();
        debug!(particles = self.particles, "One-shot animation armed");
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_active(&self) -> bool {
        self.window.is_active()
    }

    pub fn particles(&self) -> usize {
        self.particles
    }
}
