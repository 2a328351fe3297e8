use std::collections::VecDeque;
use std::path::Path;

use pitch_tracker::config::{Correlation, PreProcessorConfig, YinConfig};
use pitch_tracker::detector::{PitchTracker, YinTracker};
use pitch_tracker::filter::{ButterworthLowPass4, Filter};
use pitch_tracker::preprocessor::PreProcessor;
use pitch_tracker::sample::SaturatingFixed;
use pitch_tracker::source::MemorySource;
use pitch_tracker::tuning::Tuning;
use pitch_tracker::utils::buffer::new_real_buffer;
use pitch_tracker::{Error, PitchEstimate, Sample};

// For writing and reading `.wav` files
use hound;

const SAMPLE_RATE: usize = 48000;

#[test]
fn yin_sin_signal() {
    pure_frequency::<f64>(String::from("sin"), 440.0, plain_config());
}

#[test]
fn yin_square_signal() {
    pure_frequency::<f64>(String::from("square"), 440.0, plain_config());
}

#[test]
fn yin_triangle_signal() {
    pure_frequency::<f64>(String::from("triangle"), 440.0, plain_config());
}

#[test]
fn filtered_sin_signal() {
    pure_frequency::<f64>(String::from("sin"), 440.0, PreProcessorConfig::default());
}

#[test]
fn filtered_square_signal() {
    pure_frequency::<f64>(String::from("square"), 440.0, PreProcessorConfig::default());
}

#[test]
fn single_precision_sin_signal() {
    pure_frequency::<f32>(String::from("sin"), 440.0, PreProcessorConfig::default());
}

#[test]
fn sub_sampled_sin_signal() {
    let config = PreProcessorConfig {
        sub_sample: 2,
        ..PreProcessorConfig::default()
    };
    pure_frequency::<f64>(String::from("sin"), 440.0, config);
}

#[test]
fn fixed_point_sin_signal() {
    pure_frequency::<SaturatingFixed>(String::from("quiet-sin"), 440.0, plain_config());
    pure_frequency::<SaturatingFixed>(
        String::from("quiet-sin"),
        440.0,
        PreProcessorConfig::default(),
    );
}

#[test]
fn fft_matches_direct() {
    let signal = signal_factory(String::from("triangle"), 440.0, SAMPLE_RATE);
    let direct = track::<f64>(&signal, PreProcessorConfig::default(), YinConfig::default());
    let fft = track::<f64>(
        &signal,
        PreProcessorConfig::default(),
        YinConfig {
            correlation: Correlation::Fft,
            ..YinConfig::default()
        },
    );

    assert_eq!(direct.len(), fft.len());
    for (d, f) in direct[10..].iter().zip(fft[10..].iter()) {
        assert_eq!(d.voiced, f.voiced);
        assert!((d.frequency - f.frequency).abs() < 0.01 * d.frequency.max(1.0));
    }
}

#[test]
fn stream_disruptions_give_silent_windows() {
    let signal = signal_factory(String::from("sin"), 440.0, SAMPLE_RATE);
    let mut source = MemorySource::from_signal(SAMPLE_RATE, &signal);
    let mut pre = PreProcessor::<f64>::for_source(PreProcessorConfig::default(), &source).unwrap();
    let mut tracker = YinTracker::from_preprocessor(&pre, YinConfig::default()).unwrap();

    for _ in 0..20 {
        let window = pre.read(&mut source).unwrap();
        tracker.estimate_pitch(window).unwrap();
    }
    assert!(tracker.voiced());

    source.inject_overrun();
    let window = pre.read(&mut source).unwrap();
    assert_eq!(window.len(), pre_output_size());
    assert!(window.iter().all(|&v| v == 0.0));
    assert_eq!(
        tracker.estimate_pitch(window).unwrap(),
        PitchEstimate::unvoiced()
    );
    assert!(!tracker.voiced());

    pre.read(&mut source).unwrap();
    source.inject_underrun();
    let window = pre.read(&mut source).unwrap();
    assert!(window.iter().all(|&v| v == 0.0));
    assert_eq!(pre.resets(), 2);
}

#[test]
fn end_of_source_is_padded() {
    let signal = signal_factory(String::from("sin"), 440.0, SAMPLE_RATE / 10);
    let mut source = MemorySource::from_signal(SAMPLE_RATE, &signal);
    let mut pre = PreProcessor::<f64>::for_source(plain_config(), &source).unwrap();
    let mut tracker = YinTracker::from_preprocessor(&pre, YinConfig::default()).unwrap();

    // 4800 samples are 10 intervals; keep reading well past the end.
    let estimates: Vec<PitchEstimate> = (0..20)
        .map(|_| {
            let window = pre.read(&mut source).unwrap();
            assert_eq!(window.len(), pre_output_size());
            tracker.estimate_pitch(window).unwrap()
        })
        .collect();
    assert_eq!(pre.resets(), 0);
    assert!(estimates[1].voiced);
    assert!(!estimates[19].voiced);
}

#[test]
fn stereo_wav_file() {
    let mut path = std::env::temp_dir();
    path.push(format!("pitch-tracker-{}.wav", std::process::id()));

    let signal = signal_factory(String::from("sin"), 440.0, SAMPLE_RATE);
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for &x in signal.iter() {
        writer.write_sample(0i16).unwrap();
        writer.write_sample(x.to_device()).unwrap();
    }
    writer.finalize().unwrap();

    let (sample_rate, channels, data) = wav_file_to_frames(&path);
    std::fs::remove_file(&path).unwrap();
    assert_eq!((sample_rate, channels), (SAMPLE_RATE, 2));

    let config = PreProcessorConfig {
        channel: 1,
        ..PreProcessorConfig::default()
    };
    let mut source = MemorySource::new(sample_rate, channels, data);
    let estimates = run::<f64>(&mut source, config, YinConfig::default(), 90);
    assert_pitch(&estimates[10..], 440.0);

    // The silent channel never voices.
    let mut source = MemorySource::new(sample_rate, channels, wav_silence(channels));
    let estimates = run::<f64>(
        &mut source,
        PreProcessorConfig::default(),
        YinConfig::default(),
        10,
    );
    assert!(estimates.iter().all(|e| !e.voiced));
}

#[test]
fn silent_window_is_unvoiced() {
    let mut tracker = YinTracker::<f64>::new(SAMPLE_RATE, 1200, 960, YinConfig::default()).unwrap();
    let window: VecDeque<f64> = new_real_buffer::<f64>(2161).into();
    assert_eq!(
        tracker.estimate_pitch(&window).unwrap(),
        PitchEstimate::unvoiced()
    );
}

#[test]
fn short_window_is_an_error() {
    let mut tracker = YinTracker::<f64>::new(SAMPLE_RATE, 1200, 960, YinConfig::default()).unwrap();
    let window: VecDeque<f64> = new_real_buffer::<f64>(100).into();
    assert_eq!(
        tracker.estimate_pitch(&window),
        Err(Error::WindowTooShort {
            required: 2161,
            actual: 100
        })
    );
}

#[test]
fn unfiltered_window_is_the_low_pass_output() {
    let signal = signal_factory(String::from("square"), 440.0, SAMPLE_RATE / 10);
    let mut source = MemorySource::from_signal(SAMPLE_RATE, &signal);
    let mut pre = PreProcessor::<f64>::for_source(plain_config(), &source).unwrap();
    let window: Vec<f64> = pre.read(&mut source).unwrap().iter().copied().collect();

    let mut low_pass = ButterworthLowPass4::<f64>::new(1000.0, SAMPLE_RATE as f64);
    let filtered: Vec<f64> = signal
        .iter()
        .map(|&x| low_pass.process(f64::from_device(x.to_device())))
        .collect();
    // Five intervals of 480 samples fill the 2161 sample window.
    assert_eq!(window, filtered[2400 - 2161..2400].to_vec());
}

#[test]
fn tuner_reading() {
    let signal = signal_factory(String::from("sin"), 440.0, SAMPLE_RATE);
    let estimates = track::<f64>(&signal, plain_config(), YinConfig::default());
    let tuning = Tuning::default();
    for estimate in estimates[10..].iter() {
        let reading = tuning.reading(estimate).unwrap();
        assert_eq!((reading.note, reading.octave), ("A", 4));
        assert!(reading.cents.abs() < 5.0, "{}", reading);
    }
}

fn plain_config() -> PreProcessorConfig {
    PreProcessorConfig {
        enable_high_pass: false,
        enable_agc: false,
        ..PreProcessorConfig::default()
    }
}

fn pre_output_size() -> usize {
    PreProcessorConfig::default()
        .frame_sizes(SAMPLE_RATE)
        .output_size
}

fn wav_file_to_frames(path: &Path) -> (usize, usize, Vec<i16>) {
    println!("Opening \"{}\"", path.display());
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let data: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();

    (spec.sample_rate as usize, spec.channels as usize, data)
}

fn wav_silence(channels: usize) -> Vec<i16> {
    vec![0; channels * SAMPLE_RATE / 10]
}

/// Run `reads` windows of `source` through the pipeline.
fn run<S: Sample>(
    source: &mut MemorySource,
    config: PreProcessorConfig,
    yin: YinConfig,
    reads: usize,
) -> Vec<PitchEstimate> {
    let mut pre = PreProcessor::<S>::for_source(config, &*source).unwrap();
    let mut tracker = YinTracker::from_preprocessor(&pre, yin).unwrap();

    (0..reads)
        .map(|_| {
            let window = pre.read(source).unwrap();
            tracker.estimate_pitch(window).unwrap()
        })
        .collect()
}

/// Estimates for every interval of `signal`, which is one second long.
fn track<S: Sample>(signal: &[f64], config: PreProcessorConfig, yin: YinConfig) -> Vec<PitchEstimate> {
    let mut source = MemorySource::from_signal(SAMPLE_RATE, signal);
    run::<S>(&mut source, config, yin, 90)
}

fn assert_pitch(estimates: &[PitchEstimate], freq_in: f32) {
    for pitch in estimates {
        println!("voiced: {}; freq: {}", pitch.voiced, pitch.frequency);
        assert!(pitch.voiced);
        assert!((pitch.frequency - freq_in).abs() < 0.01 * freq_in);
    }
}

fn sin_wave(freq: f64, size: usize, amplitude: f64) -> Vec<f64> {
    let two_pi = 2.0 * std::f64::consts::PI;
    let dx = two_pi * freq / SAMPLE_RATE as f64;
    (0..size).map(|i| amplitude * (i as f64 * dx).sin()).collect()
}

fn square_wave(freq: f64, size: usize) -> Vec<f64> {
    let period = SAMPLE_RATE as f64 / freq;
    (0..size)
        .map(|i| {
            let x = i as f64 / period;
            let frac = x - x.floor();
            match frac >= 0.5 {
                true => -0.5,
                false => 0.5,
            }
        })
        .collect()
}

fn triangle_wave(freq: f64, size: usize) -> Vec<f64> {
    let period = SAMPLE_RATE as f64 / freq;
    (0..size)
        .map(|i| {
            let x = i as f64 / period;
            let frac = x - x.floor();
            let y = match frac {
                f if f < 0.25 => 4. * f,
                f if f < 0.75 => 1. - 4. * (f - 0.25),
                f => -1. + 4. * (f - 0.75),
            };
            0.5 * y
        })
        .collect()
}

fn signal_factory(name: String, freq: f64, size: usize) -> Vec<f64> {
    match name.as_ref() {
        "sin" => sin_wave(freq, size, 0.5),
        "quiet-sin" => sin_wave(freq, size, 0.25),
        "square" => square_wave(freq, size),
        "triangle" => triangle_wave(freq, size),
        _ => panic!("Unknown wave function {}", name),
    }
}

fn pure_frequency<S: Sample>(wave_name: String, freq_in: f32, config: PreProcessorConfig) {
    let signal = signal_factory(wave_name, freq_in as f64, SAMPLE_RATE);
    let estimates = track::<S>(&signal, config, YinConfig::default());

    // Skip the first windows while the filters and the gain control settle.
    assert_pitch(&estimates[10..], freq_in);
}
