use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::slice::ChunksExact;
use std::sync::Arc;

use super::buffer::AudioBuffer;
use crate::error::{Error, Result};

/// Turns mono audio into one magnitude spectrum per non-overlapping window.
pub struct SpectralFrontend {
    window_size: usize,
    fft: Arc<dyn Fft<f32>>,
    coefficients: Vec<f32>,
    scale_factor: f32,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectralFrontend {
    pub fn new(window_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(window_size);
        let coefficients = hanning(window_size);
        let scale_factor = signal_scale_factor(&coefficients);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            window_size,
            fft,
            coefficients,
            scale_factor,
            buffer: vec![Complex::new(0.0, 0.0); window_size],
            scratch,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Number of full windows in `mono_len` samples. The remainder is never analyzed.
    pub fn window_count(&self, mono_len: usize) -> usize {
        mono_len / self.window_size
    }

    /// Magnitude spectrum of one window, `window_size` bins long.
    ///
    /// The window is Hanning-weighted before the FFT; bin moduli are normalized
    /// by the FFT length and corrected by the window's signal scale factor.
    ///
    /// Every bin is returned, the mirrored upper half included, so flux sums
    /// over all `window_size` bins. Analyzers that keep only the `N/2 + 1`
    /// non-redundant bins report roughly half the flux for real input.
    pub fn spectrum(&mut self, index: usize, window: &[f32]) -> Result<Vec<f32>> {
        if window.len() != self.window_size {
            return Err(Error::processing(
                index,
                format!("expected {} samples, got {}", self.window_size, window.len()),
            ));
        }

        for ((slot, &sample), &coef) in self
            .buffer
            .iter_mut()
            .zip(window.iter())
            .zip(self.coefficients.iter())
        {
            *slot = Complex::new(sample * coef, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let norm = self.scale_factor / self.window_size as f32;
        Ok(self.buffer.iter().map(|c| c.norm() * norm).collect())
    }
}

/// Full windows of `mono`, in order, hop size equal to window size.
pub fn windows(mono: &[f32], window_size: usize) -> ChunksExact<'_, f32> {
    mono.chunks_exact(window_size)
}

/// Averages each interleaved frame across its channels.
pub fn mix_down(buffer: &AudioBuffer) -> Vec<f32> {
    let channels = buffer.channels();
    if channels == 1 {
        return buffer.samples().to_vec();
    }

    buffer
        .samples()
        .par_chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

pub fn hanning(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| {
            0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()
        })
        .collect()
}

/// Inverse coherent gain: restores the amplitude a window attenuates.
pub fn signal_scale_factor(coefficients: &[f32]) -> f32 {
    let sum: f32 = coefficients.iter().sum();
    if sum <= 0.0 {
        return 1.0;
    }
    coefficients.len() as f32 / sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hanning_is_symmetric_and_zero_at_edges() {
        let w = hanning(1024);
        assert_eq!(w.len(), 1024);
        assert!(w[0].abs() < 1e-6);
        assert!(w[1023].abs() < 1e-6);
        for i in 0..512 {
            assert!((w[i] - w[1023 - i]).abs() < 1e-5);
        }
    }

    #[test]
    fn scale_factor_is_about_two_for_hanning() {
        let factor = signal_scale_factor(&hanning(1024));
        assert!((factor - 2.0).abs() < 0.01, "factor = {}", factor);
    }

    #[test]
    fn silent_window_has_zero_spectrum() {
        let mut frontend = SpectralFrontend::new(1024);
        let spectrum = frontend.spectrum(0, &[0.0; 1024]).unwrap();
        assert_eq!(spectrum.len(), 1024);
        assert!(spectrum.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn dc_input_recovers_amplitude_in_bin_zero() {
        let mut frontend = SpectralFrontend::new(1024);
        let spectrum = frontend.spectrum(0, &[0.5; 1024]).unwrap();
        assert!((spectrum[0] - 0.5).abs() < 1e-3, "bin0 = {}", spectrum[0]);
    }

    #[test]
    fn wrong_window_length_is_a_processing_error() {
        let mut frontend = SpectralFrontend::new(1024);
        let err = frontend.spectrum(7, &[0.0; 100]).unwrap_err();
        assert!(matches!(err, Error::Processing { window: 7, .. }));
    }

    #[test]
    fn windows_drop_the_remainder() {
        let frontend = SpectralFrontend::new(1024);
        let mono = vec![0.0; 1024 * 3 + 500];
        assert_eq!(frontend.window_count(mono.len()), 3);
        assert_eq!(windows(&mono, 1024).count(), 3);
        assert_eq!(frontend.window_count(1023), 0);
    }

    #[test]
    fn stereo_mixdown_averages_channels() {
        let a = 0.6;
        let samples: Vec<f32> = (0..2048).flat_map(|_| [0.0, a]).collect();
        let buffer = AudioBuffer::from_interleaved(samples, 2, 44_100).unwrap();
        let mono = mix_down(&buffer);
        assert_eq!(mono.len(), 2048);
        assert!(mono.iter().all(|&s| s == a / 2.0));
    }
}
