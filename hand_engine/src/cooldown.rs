//! Per-action cooldowns.
//!
//! A sustained pose is seen on every frame for as long as it is held; the
//! timer is what turns "held for 500 ms" into one click instead of fifteen.
//! Deadlines are compared against the `now` the caller passes in, so nothing
//! here reads the clock or blocks.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Identifies one debounced action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionId {
    ModeSwitch,
    LeftClick,
    RightClick,
    DoubleClick,
    KeyPress,
    CapsToggle,
    /// Frame-rate throttle for scroll events rather than a debounce.
    Scroll,
}

/// Map of action → instant after which it may fire again.
#[derive(Debug, Default, Clone)]
pub struct CooldownTimer {
    deadlines: HashMap<ActionId, Instant>,
}

impl CooldownTimer {
    pub fn new() -> Self { Self::default() }

    /// True when no unexpired cooldown is registered for `id`.
    pub fn ready(&self, id: ActionId, now: Instant) -> bool {
        match self.deadlines.get(&id) {
            Some(&deadline) => now >= deadline,
            None            => true,
        }
    }

    /// Block `id` until `now + duration`.
    pub fn arm(&mut self, id: ActionId, now: Instant, duration: Duration) {
        self.deadlines.insert(id, now + duration);
    }

    /// `ready` followed by `arm` when it was ready.  Returns whether the
    /// action may fire.
    pub fn try_fire(&mut self, id: ActionId, now: Instant, duration: Duration) -> bool {
        if !self.ready(id, now) {
            return false;
        }
        self.arm(id, now, duration);
        true
    }

    /// Time left before `id` is ready; zero when it already is.
    pub fn remaining(&self, id: ActionId, now: Instant) -> Duration {
        self.deadlines
            .get(&id)
            .map(|&d| d.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn ready_before_any_arm() {
        let t = CooldownTimer::new();
        assert!(t.ready(ActionId::LeftClick, Instant::now()));
    }

    #[test]
    fn blocked_for_the_whole_window_then_ready() {
        let t0 = Instant::now();
        let mut t = CooldownTimer::new();
        t.arm(ActionId::LeftClick, t0, ms(300));
        assert!(!t.ready(ActionId::LeftClick, t0));
        assert!(!t.ready(ActionId::LeftClick, t0 + ms(150)));
        assert!(!t.ready(ActionId::LeftClick, t0 + ms(299)));
        assert!(t.ready(ActionId::LeftClick, t0 + ms(300)));
    }

    #[test]
    fn ids_are_independent() {
        let t0 = Instant::now();
        let mut t = CooldownTimer::new();
        t.arm(ActionId::LeftClick, t0, ms(300));
        assert!(t.ready(ActionId::RightClick, t0));
        assert!(t.ready(ActionId::ModeSwitch, t0));
    }

    #[test]
    fn try_fire_arms_once() {
        let t0 = Instant::now();
        let mut t = CooldownTimer::new();
        assert!(t.try_fire(ActionId::KeyPress, t0, ms(200)));
        assert!(!t.try_fire(ActionId::KeyPress, t0 + ms(33), ms(200)));
        assert!(!t.try_fire(ActionId::KeyPress, t0 + ms(66), ms(200)));
        assert!(t.try_fire(ActionId::KeyPress, t0 + ms(200), ms(200)));
    }

    #[test]
    fn zero_duration_never_blocks() {
        let t0 = Instant::now();
        let mut t = CooldownTimer::new();
        assert!(t.try_fire(ActionId::Scroll, t0, Duration::ZERO));
        assert!(t.try_fire(ActionId::Scroll, t0, Duration::ZERO));
    }

    #[test]
    fn remaining_counts_down() {
        let t0 = Instant::now();
        let mut t = CooldownTimer::new();
        assert_eq!(t.remaining(ActionId::ModeSwitch, t0), Duration::ZERO);
        t.arm(ActionId::ModeSwitch, t0, ms(500));
        assert_eq!(t.remaining(ActionId::ModeSwitch, t0 + ms(100)), ms(400));
        assert_eq!(t.remaining(ActionId::ModeSwitch, t0 + ms(900)), Duration::ZERO);
        assert!(t.ready(ActionId::ModeSwitch, t0 + ms(500)));
    }
}
