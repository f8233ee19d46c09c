//! Glide Filter
//!
//! Pitch is smoothed by a one-pole low-pass whose cutoff follows the glide
//! parameter. The cutoff itself moves along a short linear ramp so that
//! turning the glide knob never steps the filter coefficient.

use core::f64::consts::TAU;
use libm::Libm;

/// Cutoff span added on top of [`FULL_GLIDE_FREQUENCY`] when glide is 0
pub const NO_GLIDE_FREQUENCY: f64 = 500.0;

/// Cutoff at maximum glide
pub const FULL_GLIDE_FREQUENCY: f64 = 1.0;

/// Time for the cutoff to reach a new glide setting
pub const CUTOFF_RAMP_SECONDS: f64 = 0.25;

/// Map glide (0 = fast, 1 = slow) to a cutoff frequency in Hz
#[inline]
pub fn cutoff_for_glide(glide: f64) -> f64 {
    (1.0 - glide.clamp(0.0, 1.0)) * NO_GLIDE_FREQUENCY + FULL_GLIDE_FREQUENCY
}

/// Linear ramp toward a target over a fixed number of samples
#[derive(Debug, Clone)]
pub struct LinearRamp {
    current: f64,
    target: f64,
    increment: f64,
    remaining: u32,
    ramp_samples: u32,
}

impl LinearRamp {
    pub fn new(sample_rate: f64, ramp_seconds: f64) -> Self {
        let mut ramp = Self {
            current: 0.0,
            target: 0.0,
            increment: 0.0,
            remaining: 0,
            ramp_samples: 0,
        };
        ramp.reset(sample_rate, ramp_seconds);
        ramp
    }

    /// Set the ramp duration for a sample rate; cancels any ramp in progress
    pub fn reset(&mut self, sample_rate: f64, ramp_seconds: f64) {
        self.ramp_samples = libm::round(ramp_seconds * sample_rate).max(0.0) as u32;
        self.set_current_and_target(self.target);
    }

    /// Jump straight to `value`
    pub fn set_current_and_target(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.remaining = 0;
    }

    /// Start ramping toward `target`; a repeated target keeps the ramp going
    pub fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }
        if self.ramp_samples == 0 {
            self.set_current_and_target(target);
            return;
        }
        self.target = target;
        self.remaining = self.ramp_samples;
        self.increment = (target - self.current) / self.ramp_samples as f64;
    }

    /// Advance one sample and return the new value
    #[inline]
    pub fn next_value(&mut self) -> f64 {
        if self.remaining == 0 {
            return self.target;
        }
        self.remaining -= 1;
        self.current = if self.remaining == 0 {
            self.target
        } else {
            self.current + self.increment
        };
        self.current
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}

/// One-pole low-pass filter
#[derive(Debug, Clone, Default)]
pub struct OnePole {
    state: f64,
    coef: f64,
}

impl OnePole {
    pub fn new(sample_rate: f64, cutoff_hz: f64) -> Self {
        let mut filter = Self::default();
        filter.set_cutoff(sample_rate, cutoff_hz);
        filter
    }

    /// Recalculate the coefficient; cutoff is clamped below Nyquist
    ///
    /// A non-positive sample rate holds the filter output.
    #[inline]
    pub fn set_cutoff(&mut self, sample_rate: f64, cutoff_hz: f64) {
        if sample_rate.is_nan() || sample_rate <= 0.0 {
            self.coef = 0.0;
            return;
        }
        let cutoff = cutoff_hz.clamp(0.0, sample_rate * 0.49);
        self.coef = 1.0 - Libm::<f64>::exp(-TAU * cutoff / sample_rate);
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.state += self.coef * (input - self.state);
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    #[inline]
    pub fn coefficient(&self) -> f64 {
        self.coef
    }
}

/// Pitch smoother driven by the glide parameter
#[derive(Debug, Clone)]
pub struct GlideFilter {
    sample_rate: f64,
    cutoff: LinearRamp,
    filter: OnePole,
}

impl GlideFilter {
    pub fn new(sample_rate: f64, glide: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff: LinearRamp::new(sample_rate, CUTOFF_RAMP_SECONDS),
            filter: OnePole::default(),
        };
        filter.initialize(sample_rate, glide);
        filter
    }

    /// Reset filter state and ramp timing for a (new) sample rate
    ///
    /// The cutoff starts settled at the current glide setting.
    pub fn initialize(&mut self, sample_rate: f64, glide: f64) {
        self.sample_rate = sample_rate;
        self.cutoff.reset(sample_rate, CUTOFF_RAMP_SECONDS);
        self.cutoff.set_current_and_target(cutoff_for_glide(glide));
        self.filter.reset();
        self.filter.set_cutoff(sample_rate, self.cutoff.current());
    }

    /// Follow the glide parameter for one sample and recompute coefficients
    #[inline]
    pub fn update(&mut self, glide: f64) {
        self.cutoff.set_target(cutoff_for_glide(glide));
        let cutoff = self.cutoff.next_value();
        self.filter.set_cutoff(self.sample_rate, cutoff);
    }

    /// Filter one pitch sample
    #[inline]
    pub fn process(&mut self, target_pitch: f64) -> f64 {
        self.filter.process(target_pitch)
    }

    /// Smoothed cutoff currently in use
    #[inline]
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff.current()
    }
}
