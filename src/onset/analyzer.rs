use std::fmt;

use super::record::OnsetRecord;
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};

/// Running spectral-flux onset detector.
///
/// Spectra are fed one window at a time. Each call appends one record; once
/// `threshold_window_size` records exist, every call also thresholds the
/// record at `process_index` and decides the peak flag of the record just
/// before it, so classification lags the newest window by one.
pub struct SpectralFluxAnalyzer {
    window_size: usize,
    threshold_window_size: usize,
    threshold_multiplier: f32,
    previous: Vec<f32>,
    current: Vec<f32>,
    records: Vec<OnsetRecord>,
    process_index: usize,
}

impl SpectralFluxAnalyzer {
    /// Fails with [`Error::InvalidConfig`] when `config` does not validate.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window_size: config.window_size,
            threshold_window_size: config.threshold_window_size,
            threshold_multiplier: config.threshold_multiplier,
            previous: vec![0.0; config.window_size],
            current: vec![0.0; config.window_size],
            records: Vec::new(),
            // Start from the middle of the first threshold window
            process_index: config.threshold_window_size / 2,
        })
    }

    pub fn records(&self) -> &[OnsetRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<OnsetRecord> {
        self.records
    }

    pub fn process_index(&self) -> usize {
        self.process_index
    }

    /// Number of leading records whose fields will not change any more.
    pub fn safe_len(&self) -> usize {
        self.records.len().min(self.process_index.saturating_sub(1))
    }

    /// Analyzes the magnitude spectrum of the next window, starting at `time` seconds.
    pub fn analyze_spectrum(&mut self, spectrum: &[f32], time: f32) -> Result<()> {
        let index = self.records.len();
        if spectrum.len() != self.window_size {
            return Err(Error::processing(
                index,
                format!("spectrum has {} bins, expected {}", spectrum.len(), self.window_size),
            ));
        }

        if let Some(bin) = spectrum.iter().position(|m| !m.is_finite()) {
            return Err(Error::processing(
                index,
                format!("bin {} is {}", bin, spectrum[bin]),
            ));
        }

        let flux = rectified_flux(spectrum, &self.current);
        if !flux.is_finite() {
            return Err(Error::processing(index, format!("spectral flux is {}", flux)));
        }

        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.copy_from_slice(spectrum);

        self.records.push(OnsetRecord::new(time, flux));

        if self.records.len() < self.threshold_window_size {
            log::trace!(
                "Not ready yet: {} of {} flux samples",
                self.records.len(),
                self.threshold_window_size
            );
            return Ok(());
        }

        let p = self.process_index;
        let threshold = self.flux_threshold(p);
        let record = &mut self.records[p];
        record.threshold = Some(threshold);
        record.pruned_spectral_flux = Some((record.spectral_flux - threshold).max(0.0));

        // With p pruned, p - 1 has both neighbours (p - 2, p)
        let candidate = p - 1;
        if self.is_peak(candidate) {
            self.records[candidate].is_peak = true;
            if log::log_enabled!(log::Level::Debug) {
                if let Some(report) = self.peak_report(candidate) {
                    log::debug!("{}", report);
                }
            }
        }

        self.process_index += 1;
        Ok(())
    }

    /// Mean flux over `[index - half, min(len - 1, index + half))`, scaled by
    /// the sensitivity multiplier. The upper bound is exclusive.
    fn flux_threshold(&self, index: usize) -> f32 {
        let (start, end) = self.threshold_span(index, self.records.len());
        let sum: f32 = self.records[start..end].iter().map(|r| r.spectral_flux).sum();
        let avg = sum / (end - start) as f32;
        avg * self.threshold_multiplier
    }

    fn threshold_span(&self, index: usize, len: usize) -> (usize, usize) {
        let half = self.threshold_window_size / 2;
        let start = index.saturating_sub(half);
        let end = len.saturating_sub(1).min(index + half);
        (start, end)
    }

    fn is_peak(&self, index: usize) -> bool {
        let pruned = self.records[index].pruned_or_zero();
        pruned > self.records[index + 1].pruned_or_zero()
            && pruned > self.records[index - 1].pruned_or_zero()
    }

    /// Describes a thresholded record and the window its threshold was averaged over.
    pub fn peak_report(&self, index: usize) -> Option<PeakReport> {
        let record = self.records.get(index)?;
        let threshold = record.threshold?;
        // Record count at the moment `index` was thresholded
        let len_then = index + self.threshold_window_size - self.threshold_window_size / 2;
        let (start, end) = self.threshold_span(index, len_then.min(self.records.len()));
        Some(PeakReport {
            index,
            time: record.time,
            spectral_flux: record.spectral_flux,
            pruned_spectral_flux: record.pruned_or_zero(),
            threshold,
            window_start_time: self.records[start].time,
            window_end_time: self.records[end].time,
            window_samples: end - start,
        })
    }
}

fn rectified_flux(current: &[f32], previous: &[f32]) -> f32 {
    current
        .iter()
        .zip(previous.iter())
        .map(|(cur, prev)| (cur - prev).max(0.0))
        .sum()
}

#[derive(Clone, Debug, PartialEq)]
pub struct PeakReport {
    pub index: usize,
    pub time: f32,
    pub spectral_flux: f32,
    pub pruned_spectral_flux: f32,
    pub threshold: f32,
    pub window_start_time: f32,
    pub window_end_time: f32,
    pub window_samples: usize,
}

impl fmt::Display for PeakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Peak at {:.3}s with pruned flux {:.4} ({:.4} over threshold {:.4}); \
             threshold window {:.3}s-{:.3}s ({:.3}s, {} samples)",
            self.time,
            self.pruned_spectral_flux,
            self.spectral_flux,
            self.threshold,
            self.window_start_time,
            self.window_end_time,
            self.window_end_time - self.window_start_time,
            self.window_samples
        )
    }
}
