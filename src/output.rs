//! Output Composer
//!
//! Per-sample frames in and out of the engine, and the rule that assembles
//! the output triple from the engine state.

use crate::buffer::AudioBuffer;
use crate::port::{
    CLOCK_INPUT, END_OF_SEQUENCE_OUTPUT, FULL_SCALE, PITCH_OUTPUT, RESET_INPUT, START_INPUT,
    STOP_INPUT, TRIGGER_OUTPUT,
};
use crate::transport::TransportLevels;

/// Raw control-input voltages for one sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlFrame {
    pub clock: f64,
    pub reset: f64,
    pub start: f64,
    pub stop: f64,
}

impl ControlFrame {
    /// Read the four control inputs at `index`
    #[inline]
    pub fn read<B: AudioBuffer + ?Sized>(buffer: &B, index: usize) -> Self {
        Self {
            clock: buffer.sample(CLOCK_INPUT, index),
            reset: buffer.sample(RESET_INPUT, index),
            start: buffer.sample(START_INPUT, index),
            stop: buffer.sample(STOP_INPUT, index),
        }
    }

    pub fn clock(high: bool) -> Self {
        Self {
            clock: level(high),
            ..Self::default()
        }
    }

    pub fn with_reset(mut self, high: bool) -> Self {
        self.reset = level(high);
        self
    }

    pub fn with_start(mut self, high: bool) -> Self {
        self.start = level(high);
        self
    }

    pub fn with_stop(mut self, high: bool) -> Self {
        self.stop = level(high);
        self
    }

    #[inline]
    pub fn levels(&self) -> TransportLevels {
        TransportLevels::from_raw(self.clock, self.reset, self.start, self.stop)
    }
}

/// Output voltages for one sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutputFrame {
    /// 0 or full scale
    pub gate: f64,
    pub pitch: f64,
    /// 0 or full scale
    pub end_of_sequence: f64,
}

impl OutputFrame {
    /// Write the three outputs at `index`
    #[inline]
    pub fn write<B: AudioBuffer + ?Sized>(&self, buffer: &mut B, index: usize) {
        buffer.set_sample(TRIGGER_OUTPUT, index, self.gate);
        buffer.set_sample(PITCH_OUTPUT, index, self.pitch);
        buffer.set_sample(END_OF_SEQUENCE_OUTPUT, index, self.end_of_sequence);
    }

    #[inline]
    pub fn gate_high(&self) -> bool {
        self.gate > 0.0
    }

    #[inline]
    pub fn end_of_sequence_high(&self) -> bool {
        self.end_of_sequence > 0.0
    }
}

/// Assemble the output triple
///
/// Gate and pitch are silenced while stopped; the end-of-sequence pulse is
/// not, since it marks a wrap rather than playback.
#[inline]
pub fn compose(gate_open: bool, pitch: f64, end_of_sequence_open: bool, running: bool) -> OutputFrame {
    OutputFrame {
        gate: level(running && gate_open),
        pitch: if running { pitch } else { 0.0 },
        end_of_sequence: level(end_of_sequence_open),
    }
}

#[inline]
fn level(high: bool) -> f64 {
    if high {
        FULL_SCALE
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ChannelBuffer;

    #[test]
    fn test_compose_running() {
        let out = compose(true, 0.42, false, true);
        assert_eq!(out.gate, 1.0);
        assert_eq!(out.pitch, 0.42);
        assert_eq!(out.end_of_sequence, 0.0);
        assert!(out.gate_high());
    }

    #[test]
    fn test_compose_stopped_silences_gate_and_pitch() {
        let out = compose(true, 0.42, true, false);
        assert_eq!(out.gate, 0.0);
        assert_eq!(out.pitch, 0.0);
        assert!(out.end_of_sequence_high());
    }

    #[test]
    fn test_frames_in_place() {
        let mut buffer = ChannelBuffer::new(4, 2);
        buffer.set_sample(CLOCK_INPUT, 1, 1.0);
        buffer.set_sample(STOP_INPUT, 1, 0.7);

        let input = ControlFrame::read(&buffer, 1);
        assert_eq!(
            input,
            ControlFrame {
                clock: 1.0,
                reset: 0.0,
                start: 0.0,
                stop: 0.7,
            }
        );

        compose(true, 0.3, true, true).write(&mut buffer, 1);
        assert_eq!(buffer.sample(TRIGGER_OUTPUT, 1), 1.0);
        assert_eq!(buffer.sample(PITCH_OUTPUT, 1), 0.3);
        assert_eq!(buffer.sample(END_OF_SEQUENCE_OUTPUT, 1), 1.0);
        // The stop input channel is not an output.
        assert_eq!(buffer.sample(STOP_INPUT, 1), 0.7);
    }

    #[test]
    fn test_levels_from_frame() {
        let levels = ControlFrame::clock(true).with_reset(true).levels();
        assert!(levels.clock);
        assert!(levels.reset);
        assert!(!levels.start);
        assert!(!levels.stop);
    }
}
