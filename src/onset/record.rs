use serde::Serialize;

/// Spectral-flux analysis result for one window.
///
/// `threshold` and `pruned_spectral_flux` stay `None` until enough neighbouring
/// windows exist to average a threshold; an unset record is never a peak.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OnsetRecord {
    /// Source-file offset of the window's first sample, in seconds.
    pub time: f32,
    /// Sum of positive magnitude changes against the previous window.
    pub spectral_flux: f32,
    pub threshold: Option<f32>,
    /// Flux above the threshold, floored at zero.
    pub pruned_spectral_flux: Option<f32>,
    pub is_peak: bool,
}

impl OnsetRecord {
    pub fn new(time: f32, spectral_flux: f32) -> Self {
        Self {
            time,
            spectral_flux,
            ..Self::default()
        }
    }

    /// Pruned flux as used by peak picking; unset counts as zero.
    pub fn pruned_or_zero(&self) -> f32 {
        self.pruned_spectral_flux.unwrap_or(0.0)
    }

    pub fn is_thresholded(&self) -> bool {
        self.threshold.is_some()
    }
}
