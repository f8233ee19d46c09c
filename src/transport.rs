//! Transport State Tracker
//!
//! Turns the four raw control inputs into the running state and the edges
//! the step machine reacts to. All transitions happen on rising edges only;
//! a sustained high never fires twice.

use crate::port::is_high;

/// Thresholded control levels for one sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportLevels {
    pub clock: bool,
    pub reset: bool,
    pub start: bool,
    pub stop: bool,
}

impl TransportLevels {
    /// Threshold raw control voltages at 0.5
    pub fn from_raw(clock: f64, reset: f64, start: f64, stop: f64) -> Self {
        Self {
            clock: is_high(clock),
            reset: is_high(reset),
            start: is_high(start),
            stop: is_high(stop),
        }
    }
}

/// Edges derived for one sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportEvents {
    /// Clock rising edge, real or synthesized by a start
    pub triggered: bool,
    /// Reset rising edge
    pub reset: bool,
    /// Running went from false to true on this sample
    pub started: bool,
}

/// Running state plus previous-sample history for edge detection
#[derive(Debug, Clone, Default)]
pub struct Transport {
    running: bool,
    previously_triggered: bool,
    previously_reset: bool,
    previously_running: bool,
    previously_toggled: bool,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Clear the running state (auto-stop at the end of a non-looping sequence)
    #[inline]
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Block-level run toggle: a rising edge of `toggle` flips the running state
    pub fn apply_toggle(&mut self, toggle: bool) {
        if toggle && !self.previously_toggled {
            self.running = !self.running;
        }
        self.previously_toggled = toggle;
    }

    /// Derive this sample's running state and edges
    ///
    /// Call [`Transport::end_sample`] once the sample has been produced.
    pub fn update(&mut self, levels: TransportLevels) -> TransportEvents {
        self.running = (self.running || levels.start) && !levels.stop;

        let reset = levels.reset && !self.previously_reset;
        if reset {
            self.running = true;
        }

        let started = self.running && !self.previously_running;
        // A start behaves like a clock edge arriving right now.
        let triggered = started || (levels.clock && !self.previously_triggered);

        self.previously_reset = levels.reset;

        TransportEvents {
            triggered,
            reset,
            started,
        }
    }

    /// Shift this sample's levels into history
    ///
    /// `clock_high` should include a synthesized start edge so that a real
    /// clock edge landing on the next sample is not counted twice.
    pub fn end_sample(&mut self, clock_high: bool) {
        self.previously_triggered = clock_high;
        self.previously_running = self.running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(clock: bool, reset: bool, start: bool, stop: bool) -> TransportLevels {
        TransportLevels {
            clock,
            reset,
            start,
            stop,
        }
    }

    fn step(transport: &mut Transport, l: TransportLevels) -> TransportEvents {
        let events = transport.update(l);
        transport.end_sample(l.clock || events.triggered);
        events
    }

    #[test]
    fn test_levels_threshold() {
        let l = TransportLevels::from_raw(0.5, 0.49, 1.0, -1.0);
        assert_eq!(l, levels(true, false, true, false));
    }

    #[test]
    fn test_clock_rising_edge_only_once() {
        let mut t = Transport::new();
        step(&mut t, levels(false, false, true, false));

        assert!(!step(&mut t, levels(false, false, false, false)).triggered);
        assert!(step(&mut t, levels(true, false, false, false)).triggered);
        assert!(!step(&mut t, levels(true, false, false, false)).triggered);
        assert!(!step(&mut t, levels(false, false, false, false)).triggered);
        assert!(step(&mut t, levels(true, false, false, false)).triggered);
    }

    #[test]
    fn test_start_synthesizes_edge() {
        let mut t = Transport::new();
        assert!(!t.is_running());

        let events = step(&mut t, levels(false, false, true, false));
        assert!(events.started);
        assert!(events.triggered);
        assert!(t.is_running());

        // Running stays latched after start goes low.
        let events = step(&mut t, levels(false, false, false, false));
        assert!(!events.started);
        assert!(t.is_running());
    }

    #[test]
    fn test_synthesized_edge_masks_clock_on_next_sample() {
        let mut t = Transport::new();
        step(&mut t, levels(false, false, true, false));
        assert!(!step(&mut t, levels(true, false, false, false)).triggered);
    }

    #[test]
    fn test_stop_overrides_start() {
        let mut t = Transport::new();
        step(&mut t, levels(false, false, true, false));

        let events = step(&mut t, levels(false, false, true, true));
        assert!(!t.is_running());
        assert!(!events.started);

        // Releasing stop with start still held restarts.
        let events = step(&mut t, levels(false, false, true, false));
        assert!(events.started);
    }

    #[test]
    fn test_reset_forces_running() {
        let mut t = Transport::new();
        let events = step(&mut t, levels(false, true, false, true));
        assert!(events.reset);
        assert!(events.started);
        assert!(t.is_running());

        // Held reset is not a new edge.
        assert!(!step(&mut t, levels(false, true, false, false)).reset);
    }

    #[test]
    fn test_toggle_flips_on_rising_edge() {
        let mut t = Transport::new();
        t.apply_toggle(true);
        assert!(t.is_running());
        t.apply_toggle(true);
        assert!(t.is_running());
        t.apply_toggle(false);
        t.apply_toggle(true);
        assert!(!t.is_running());
    }

    #[test]
    fn test_stop_clears_running() {
        let mut t = Transport::new();
        step(&mut t, levels(false, false, true, false));
        t.stop();
        assert!(!t.is_running());
    }
}
