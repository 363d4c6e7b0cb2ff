#![allow(dead_code)]

use std::f32::consts::PI;
use std::path::PathBuf;

use fluxbeat::AudioBuffer;

pub const SR: u32 = 44_100;
pub const WINDOW: usize = 1024;

pub fn gen_sine(freq_hz: f32, sr: u32, n: usize, amp: f32) -> Vec<f32> {
    (0..n)
        .map(|i| amp * (2.0 * PI * freq_hz * i as f32 / sr as f32).sin())
        .collect()
}

/// Silence with a tone burst filling exactly the given windows.
pub fn gen_window_bursts(windows: usize, burst_windows: &[usize], amp: f32) -> Vec<f32> {
    let mut out = vec![0.0f32; windows * WINDOW];
    let tone = gen_sine(1_000.0, SR, WINDOW, amp);
    for &w in burst_windows {
        if w < windows {
            out[w * WINDOW..(w + 1) * WINDOW].copy_from_slice(&tone);
        }
    }
    out
}

/// Tone bursts of varying loudness on a quiet noise bed, roughly musical.
pub fn gen_beat_track(windows: usize, period: usize) -> Vec<f32> {
    let mut out = gen_noise(windows * WINDOW, 0.01, 0xBEEF);
    let mut state = 7u32;
    for w in (period..windows).step_by(period) {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let amp = 0.3 + (state >> 16) as f32 / 65_536.0 * 0.6;
        let tone = gen_sine(220.0 + (w % 7) as f32 * 110.0, SR, WINDOW, amp);
        for (s, t) in out[w * WINDOW..(w + 1) * WINDOW].iter_mut().zip(tone) {
            *s += t;
        }
    }
    out
}

pub fn gen_noise(n: usize, amp: f32, seed: u32) -> Vec<f32> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0) * amp
        })
        .collect()
}

pub fn mono(samples: Vec<f32>) -> AudioBuffer {
    AudioBuffer::mono(samples, SR).expect("valid mono buffer")
}

/// Interleaves two equal-length channels.
pub fn stereo(left: &[f32], right: &[f32]) -> AudioBuffer {
    let samples = left.iter().zip(right).flat_map(|(&l, &r)| [l, r]).collect();
    AudioBuffer::from_interleaved(samples, 2, SR).expect("valid stereo buffer")
}

/// 16-bit PCM WAV bytes for interleaved samples.
pub fn wav_16bit(samples: &[f32], channels: u16, sample_rate: u32) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut out = Vec::with_capacity(file_size as usize + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        let raw = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        out.extend_from_slice(&raw.to_le_bytes());
    }
    out
}

/// Unique path in the system temp dir; the caller removes it.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fluxbeat-{}-{}", std::process::id(), name))
}
