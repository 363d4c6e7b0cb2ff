//! # fluxbeat
//!
//! Offline onset detection for rhythm-game level generation. A decoded clip is
//! mixed down to mono, cut into non-overlapping windows, and each window's
//! Hanning-weighted magnitude spectrum is compared with the previous one. The
//! rectified spectral flux is thresholded against a moving local average and
//! local maxima above it are reported as peaks.
//!
//! ```no_run
//! use fluxbeat::{analyze, AnalysisConfig, AudioBuffer};
//!
//! let buffer = AudioBuffer::from_interleaved(vec![0.0; 2 * 44_100 * 10], 2, 44_100)?;
//! let analysis = analyze(&buffer, &AnalysisConfig::default())?;
//! for peak in analysis.peaks() {
//!     println!("onset at {:.3}s", peak.time);
//! }
//! # Ok::<(), fluxbeat::Error>(())
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod onset;
pub mod pipeline;

pub use audio::buffer::AudioBuffer;
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use onset::{OnsetFeed, OnsetRecord};
pub use pipeline::{
    analyze, analyze_with, spawn, spawn_with, AnalysisContext, AnalysisHandle, CancelToken,
    OnsetAnalysis,
};
