use crate::error::{Error, Result};

/// Decoded interleaved PCM, as handed over by the audio loader.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wraps interleaved samples (`frame0_ch0, frame0_ch1, ..., frame1_ch0, ...`).
    pub fn from_interleaved(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(Error::InvalidBuffer("channel count is zero".into()));
        }
        if sample_rate == 0 {
            return Err(Error::InvalidBuffer("sample rate is zero".into()));
        }
        if samples.is_empty() {
            return Err(Error::InvalidBuffer("buffer contains no samples".into()));
        }
        if samples.len() % channels != 0 {
            return Err(Error::InvalidBuffer(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                channels
            )));
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::from_interleaved(samples, 1, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Clip length in seconds.
    pub fn duration(&self) -> f32 {
        self.frame_count() as f32 / self.sample_rate as f32
    }

    /// Seconds between two consecutive frames.
    pub fn sample_interval(&self) -> f32 {
        1.0 / self.sample_rate as f32
    }
}
