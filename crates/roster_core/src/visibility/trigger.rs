use std::time::{Duration, Instant};

use super::ObserveOptions;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    /// Fire while the sentinel is visible.
    #[default]
    Entering,
    /// Fire once the sentinel has been visible and no longer is.
    Leaving,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerConfig {
    pub mode: TriggerMode,
    pub options: ObserveOptions,
    pub cooldown: Duration,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            mode: TriggerMode::default(),
            options: ObserveOptions::default(),
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Load state of the list the trigger feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadGate {
    pub has_next: bool,
    pub is_loading: bool,
}

impl LoadGate {
    pub fn is_open(self) -> bool {
        self.has_next && !self.is_loading
    }
}

/// Decides when a sentinel should request more data.
///
/// Fires at most once per cooldown window for a sustained condition. While
/// the scroll root's content does not overflow, one extra "bootstrap" fire is
/// allowed so a short list can load enough pages to fill the view.
#[derive(Debug, Clone)]
pub struct VisibilityTrigger {
    config: TriggerConfig,
    is_visible: bool,
    seen_visible: bool,
    content_overflows: bool,
    bootstrap_pending: bool,
    last_fired: Option<Instant>,
}

impl VisibilityTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            is_visible: false,
            seen_visible: false,
            content_overflows: false,
            bootstrap_pending: true,
            last_fired: None,
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Forgets visibility history and the cooldown, re-arming the bootstrap fire.
    pub fn reset(&mut self) {
        self.is_visible = false;
        self.seen_visible = false;
        self.bootstrap_pending = true;
        self.last_fired = None;
    }

    /// Moves to a new sentinel. Visibility history belongs to the old one and
    /// is dropped; the cooldown and a pending bootstrap carry over.
    pub fn rebind(&mut self) {
        self.is_visible = false;
        self.seen_visible = false;
    }

    pub fn observe(&mut self, is_visible: bool) {
        self.is_visible = is_visible;
        self.seen_visible |= is_visible;
    }

    /// Once content overflows the bootstrap fire is no longer needed.
    pub fn set_content_overflows(&mut self, overflows: bool) {
        self.content_overflows = overflows;
        if overflows {
            self.bootstrap_pending = false;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    fn condition_holds(&self) -> bool {
        match self.config.mode {
            TriggerMode::Entering => self.is_visible,
            TriggerMode::Leaving => self.seen_visible && !self.is_visible,
        }
    }

    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last_fired?);
        self.config.cooldown.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Returns true when the caller should load the next page.
    pub fn evaluate(&mut self, now: Instant, gate: LoadGate) -> bool {
        if !gate.is_open() || self.cooldown_remaining(now).is_some() {
            return false;
        }
        let bootstrap = self.bootstrap_pending && !self.content_overflows;
        if !(bootstrap || self.condition_holds()) {
            return false;
        }
        self.bootstrap_pending = false;
        if self.config.mode == TriggerMode::Leaving && !bootstrap {
            // Leaving needs a fresh visible -> hidden transition before firing again.
            self.seen_visible = false;
        }
        self.last_fired = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: LoadGate = LoadGate {
        has_next: true,
        is_loading: false,
    };

    fn overflowing(mode: TriggerMode) -> VisibilityTrigger {
        let mut trigger = VisibilityTrigger::new(TriggerConfig {
            mode,
            ..TriggerConfig::default()
        });
        trigger.set_content_overflows(true);
        trigger
    }

    #[test]
    fn sustained_visibility_fires_once_per_cooldown() {
        let start = Instant::now();
        let mut trigger = overflowing(TriggerMode::Entering);
        trigger.observe(true);

        assert!(trigger.evaluate(start, OPEN));
        assert!(!trigger.evaluate(start + Duration::from_millis(10), OPEN));
        assert!(!trigger.evaluate(start + Duration::from_millis(999), OPEN));
        assert!(trigger.evaluate(start + Duration::from_millis(1000), OPEN));
    }

    #[test]
    fn closed_gate_blocks_fire() {
        let start = Instant::now();
        let mut trigger = overflowing(TriggerMode::Entering);
        trigger.observe(true);

        let loading = LoadGate {
            has_next: true,
            is_loading: true,
        };
        assert!(!trigger.evaluate(start, loading));
        assert!(!trigger.evaluate(start, LoadGate::default()));
        assert!(trigger.evaluate(start, OPEN));
    }

    #[test]
    fn leaving_needs_visible_then_hidden() {
        let start = Instant::now();
        let mut trigger = overflowing(TriggerMode::Leaving);

        assert!(!trigger.evaluate(start, OPEN));
        trigger.observe(true);
        assert!(!trigger.evaluate(start, OPEN));
        trigger.observe(false);
        assert!(trigger.evaluate(start, OPEN));
        assert!(!trigger.evaluate(start + Duration::from_secs(5), OPEN));
    }

    #[test]
    fn bootstrap_fires_once_without_overflow() {
        let start = Instant::now();
        let mut trigger = VisibilityTrigger::new(TriggerConfig::default());

        assert!(trigger.evaluate(start, OPEN));
        assert!(!trigger.evaluate(start + Duration::from_secs(2), OPEN));
    }

    #[test]
    fn rebind_forgets_old_sentinel_but_keeps_cooldown() {
        let start = Instant::now();
        let mut trigger = overflowing(TriggerMode::Leaving);
        trigger.observe(true);
        trigger.rebind();
        trigger.observe(false);
        assert!(!trigger.evaluate(start, OPEN));

        trigger.observe(true);
        trigger.observe(false);
        assert!(trigger.evaluate(start, OPEN));
        trigger.rebind();
        trigger.observe(true);
        trigger.observe(false);
        assert!(!trigger.evaluate(start + Duration::from_millis(500), OPEN));
        assert!(trigger.evaluate(start + Duration::from_millis(1000), OPEN));
    }

    #[test]
    fn reset_clears_cooldown() {
        let start = Instant::now();
        let mut trigger = overflowing(TriggerMode::Entering);
        trigger.observe(true);
        assert!(trigger.evaluate(start, OPEN));

        trigger.reset();
        trigger.set_content_overflows(true);
        trigger.observe(true);
        assert!(trigger.evaluate(start + Duration::from_millis(1), OPEN));
    }
}
