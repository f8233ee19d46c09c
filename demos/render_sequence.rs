//! Render Sequence Example
//!
//! This example drives the sequencer with a 120 BPM clock in host-sized
//! blocks and prints every gate and end-of-sequence transition.
//!
//! Run with: cargo run --example render_sequence

use pulseq::prelude::*;
use std::sync::Arc;

fn main() {
    let sample_rate = 48000.0;
    let block_size = 256;

    // Eighth notes at 120 BPM
    let clock_period = (sample_rate * 0.25) as usize;

    // Build the sequence as a config, then load it into a parameter bank
    let mut config = SequenceConfig::with_steps(6);
    config.gate_length = 0.5;
    config.glide = 0.2;
    config.pitch_extent = 1.0;
    config.looping = false;
    let pitches = [0.0, 0.25, 0.5, 0.0, 0.75, 1.0];
    for (step, pitch) in config.steps.iter_mut().zip(pitches) {
        step.pitch = pitch;
    }
    config.steps[1].gate_mode = GateMode::MultiPulse;
    config.steps[1].pulse_count = 2;
    config.steps[2].gate_mode = GateMode::HoldForPulse;
    config.steps[2].pulse_count = 3;
    config.steps[3].enabled = false;
    config.steps[4].gate_mode = GateMode::Silence;

    let params = Arc::new(ParamBank::from_config(&config).unwrap());
    let display = Arc::new(DisplayState::new());

    let mut sequencer = Sequencer::new(Arc::clone(&params), Arc::clone(&display));
    sequencer.initialize(sample_rate, block_size).unwrap();

    println!(
        "Sequence of {} steps, clock every {} samples",
        config.num_steps(),
        clock_period
    );

    let mut bus = ChannelBuffer::new(BUS_CHANNELS, block_size);
    let mut gate_was_high = false;
    let mut eos_was_high = false;
    let total_samples = clock_period * 16;

    for block_start in (0..total_samples).step_by(block_size) {
        bus.clear();
        for i in 0..block_size {
            let t = block_start + i;
            bus.set_sample(CLOCK_INPUT, i, if t % clock_period < 64 { 1.0 } else { 0.0 });
            if t == 0 {
                bus.set_sample(START_INPUT, i, 1.0);
            }
        }

        sequencer.process(&mut bus, block_size);

        for i in 0..block_size {
            let t = block_start + i;
            let gate_high = bus.sample(TRIGGER_OUTPUT, i) > 0.0;
            let eos_high = bus.sample(END_OF_SEQUENCE_OUTPUT, i) > 0.0;

            if gate_high && !gate_was_high {
                println!(
                    "{:>7} gate on   pitch {:.3}",
                    t,
                    bus.sample(PITCH_OUTPUT, i)
                );
            } else if !gate_high && gate_was_high {
                println!("{:>7} gate off", t);
            }
            if eos_high && !eos_was_high {
                println!("{:>7} end of sequence", t);
            }

            gate_was_high = gate_high;
            eos_was_high = eos_high;
        }

        if !display.is_running() {
            println!("{:>7} stopped on step {}", block_start + block_size, display.current_step());
            break;
        }
    }
}
