//! Audio Performance Benchmarks
//!
//! Benchmarks for validating that the sequencer meets real-time audio
//! processing requirements at various sample rates, buffer sizes and
//! sequence lengths.
//!
//! ## Real-Time Audio Constraints
//!
//! For real-time audio, we must process a buffer of samples before the next
//! buffer arrives. The time budget is:
//!
//! ```text
//! time_budget = buffer_size / sample_rate
//! ```
//!
//! | Sample Rate | Buffer 64  | Buffer 128 | Buffer 256 | Buffer 512 |
//! |-------------|------------|------------|------------|------------|
//! | 44.1 kHz    | 1.45 ms    | 2.90 ms    | 5.80 ms    | 11.61 ms   |
//! | 48 kHz      | 1.33 ms    | 2.67 ms    | 5.33 ms    | 10.67 ms   |
//! | 96 kHz      | 0.67 ms    | 1.33 ms    | 2.67 ms    | 5.33 ms    |
//! | 192 kHz     | 0.33 ms    | 0.67 ms    | 1.33 ms    | 2.67 ms    |
//!
//! A sequencer is a small fraction of any patch, so the numbers here should
//! sit orders of magnitude below these budgets.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pulseq::prelude::*;

// ============================================================================
// Constants
// ============================================================================

const SAMPLE_RATES: [f64; 4] = [44100.0, 48000.0, 96000.0, 192000.0];
const BUFFER_SIZES: [usize; 4] = [64, 128, 256, 512];
const STEP_COUNTS: [usize; 4] = [1, 8, 16, 32];

/// Clock period used by every benchmark (a fast 16th-note clock at 44.1 kHz)
const CLOCK_PERIOD: usize = 2756;

// ============================================================================
// Helper Functions
// ============================================================================

/// A bank with a mix of gate modes, pulse counts and disabled steps
fn create_busy_bank(num_steps: usize) -> ParamBank {
    let bank = ParamBank::new(num_steps).unwrap();
    for step in 0..num_steps {
        let mode = GateMode::ALL[step % GateMode::ALL.len()];
        bank.set(ParamId::Step(step, StepParam::GateMode), mode.index() as f64)
            .unwrap();
        bank.set(
            ParamId::Step(step, StepParam::PulseCount),
            (step % 4 + 1) as f64,
        )
        .unwrap();
        bank.set(
            ParamId::Step(step, StepParam::Pitch),
            step as f64 / num_steps as f64,
        )
        .unwrap();
        if step % 5 == 4 {
            bank.set(ParamId::Step(step, StepParam::Enabled), 0.0).unwrap();
        }
    }
    bank.set(ParamId::Glide, 0.3).unwrap();
    bank
}

/// Square-wave clock for one buffer starting at `offset` samples
fn clock_signal(len: usize, offset: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            if (offset + i) % CLOCK_PERIOD < CLOCK_PERIOD / 2 {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Running sequencer over `bank`
fn create_sequencer(bank: &ParamBank, sample_rate: f64, buffer_size: usize) -> Sequencer<&ParamBank> {
    let mut sequencer = Sequencer::new(bank, ());
    sequencer.initialize(sample_rate, buffer_size).unwrap();
    sequencer.tick(ControlFrame::default().with_start(true));
    sequencer
}

// ============================================================================
// Per-Sample Benchmarks
// ============================================================================

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencer/tick");

    for sample_rate in SAMPLE_RATES {
        let sr_name = format!("{}kHz", sample_rate as u32 / 1000);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("tick", &sr_name),
            &sample_rate,
            |b, &sr| {
                let bank = create_busy_bank(8);
                let mut sequencer = create_sequencer(&bank, sr, 512);
                let mut phase = 0;

                b.iter(|| {
                    let high = phase < CLOCK_PERIOD / 2;
                    phase = (phase + 1) % CLOCK_PERIOD;
                    black_box(sequencer.tick(black_box(ControlFrame::clock(high))))
                });
            },
        );
    }

    group.finish();
}

fn bench_step_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencer/step_count");

    for num_steps in STEP_COUNTS {
        group.throughput(Throughput::Elements(CLOCK_PERIOD as u64));
        group.bench_with_input(
            BenchmarkId::new("clock_period", num_steps),
            &num_steps,
            |b, &n| {
                let bank = create_busy_bank(n);
                let mut sequencer = create_sequencer(&bank, 44100.0, 512);

                b.iter(|| {
                    for i in 0..CLOCK_PERIOD {
                        let frame = ControlFrame::clock(i < CLOCK_PERIOD / 2);
                        black_box(sequencer.tick(frame));
                    }
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Buffer Processing Benchmarks
// ============================================================================

fn bench_buffer_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_processing");

    for sample_rate in SAMPLE_RATES {
        for buffer_size in BUFFER_SIZES {
            let sr_name = format!("{}kHz", sample_rate as u32 / 1000);
            let name = format!("{}/{}samples", sr_name, buffer_size);

            let time_budget_us = (buffer_size as f64 / sample_rate) * 1_000_000.0;

            group.throughput(Throughput::Elements(buffer_size as u64));
            group.bench_with_input(
                BenchmarkId::new("process", &name),
                &(sample_rate, buffer_size),
                |b, &(sr, buf_size)| {
                    let bank = create_busy_bank(16);
                    let display = DisplayState::new();
                    let mut sequencer = Sequencer::new(&bank, &display);
                    sequencer.initialize(sr, buf_size).unwrap();
                    sequencer.tick(ControlFrame::default().with_start(true));

                    let mut bus = ChannelBuffer::new(BUS_CHANNELS, buf_size);
                    let mut offset = 0;

                    b.iter(|| {
                        // Outputs overwrite the inputs in place, so restore them.
                        bus.clear();
                        if let Some(clock) = bus.channel_mut(CLOCK_INPUT) {
                            clock.copy_from_slice(&clock_signal(buf_size, offset));
                        }
                        offset = (offset + buf_size) % CLOCK_PERIOD;
                        sequencer.process(black_box(&mut bus), buf_size);
                        black_box(bus.sample(PITCH_OUTPUT, buf_size - 1))
                    });
                },
            );

            eprintln!(
                "  {} @ {} samples: budget = {:.2}µs",
                sr_name, buffer_size, time_budget_us
            );
        }
    }

    group.finish();
}

// ============================================================================
// Host Bridge Benchmarks
// ============================================================================

fn bench_param_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("param_bank");
    let bank = create_busy_bank(MAX_STEPS);

    group.bench_function("read_step", |b| {
        let mut step = 0;
        b.iter(|| {
            step = (step + 1) % MAX_STEPS;
            black_box(bank.step(black_box(step)))
        });
    });

    group.bench_function("any_step_enabled", |b| {
        b.iter(|| black_box(bank.any_step_enabled()));
    });

    group.bench_function("set_normalized", |b| {
        let mut value = 0.0;
        b.iter(|| {
            value = (value + 0.01) % 1.0;
            bank.set_normalized(ParamId::Glide, black_box(value));
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Groups
// ============================================================================

criterion_group!(sample_benches, bench_tick, bench_step_counts);

criterion_group!(buffer_benches, bench_buffer_processing);

criterion_group!(bridge_benches, bench_param_bank);

criterion_main!(sample_benches, buffer_benches, bridge_benches);
