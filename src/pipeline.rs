use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::audio::buffer::AudioBuffer;
use crate::audio::spectrum::{mix_down, windows, SpectralFrontend};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::onset::{OnsetFeed, OnsetRecord, SpectralFluxAnalyzer};

/// Cooperative cancellation flag, checked once per analysis window.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Called after every window with `(windows_done, windows_total)`.
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Collaborators of one analysis pass.
#[derive(Default)]
pub struct AnalysisContext {
    pub cancel: CancelToken,
    pub feed: OnsetFeed,
    progress: Option<Box<ProgressFn>>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_feed(mut self, feed: OnsetFeed) -> Self {
        self.feed = feed;
        self
    }

    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }
}

/// Output of a completed pass.
#[derive(Clone, Debug, Serialize)]
pub struct OnsetAnalysis {
    pub sample_rate: u32,
    pub window_size: usize,
    /// Number of analyzed windows (one record each).
    pub windows: usize,
    /// Trailing mono samples that did not fill a whole window.
    pub dropped_samples: usize,
    pub duration: f32,
    pub records: Vec<OnsetRecord>,
}

impl OnsetAnalysis {
    pub fn peaks(&self) -> impl Iterator<Item = &OnsetRecord> {
        self.records.iter().filter(|r| r.is_peak)
    }

    pub fn peak_count(&self) -> usize {
        self.peaks().count()
    }

    pub fn peak_times(&self) -> Vec<f32> {
        self.peaks().map(|r| r.time).collect()
    }
}

/// Runs the whole onset pass over `buffer` on the calling thread.
pub fn analyze(buffer: &AudioBuffer, config: &AnalysisConfig) -> Result<OnsetAnalysis> {
    analyze_with(buffer, config, &AnalysisContext::default())
}

/// Like [`analyze`], publishing finalized records to `ctx.feed` as the pass
/// advances. On failure the feed keeps everything produced before the fault.
pub fn analyze_with(
    buffer: &AudioBuffer,
    config: &AnalysisConfig,
    ctx: &AnalysisContext,
) -> Result<OnsetAnalysis> {
    let mut analyzer = SpectralFluxAnalyzer::new(config)?;
    let result = run_pass(buffer, config, ctx, &mut analyzer);

    // Nothing revises records once the pass has stopped
    ctx.feed.publish(analyzer.records());
    ctx.feed.finish();

    match result {
        Ok((windows, dropped_samples)) => {
            let analysis = OnsetAnalysis {
                sample_rate: buffer.sample_rate(),
                window_size: config.window_size,
                windows,
                dropped_samples,
                duration: buffer.duration(),
                records: analyzer.into_records(),
            };
            log::info!(
                "Spectrum analysis finished: {} windows, {} peaks",
                analysis.windows,
                analysis.peak_count()
            );
            Ok(analysis)
        }
        Err(err @ Error::Cancelled { .. }) => {
            log::warn!("{}", err);
            Err(err)
        }
        Err(err) => {
            log::error!(
                "Spectrum analysis aborted after {} windows: {}",
                analyzer.records().len(),
                err
            );
            Err(err)
        }
    }
}

fn run_pass(
    buffer: &AudioBuffer,
    config: &AnalysisConfig,
    ctx: &AnalysisContext,
    analyzer: &mut SpectralFluxAnalyzer,
) -> Result<(usize, usize)> {
    let mut frontend = SpectralFrontend::new(config.window_size);

    let mono = mix_down(buffer);
    log::debug!(
        "Combined {} channels into {} mono samples",
        buffer.channels(),
        mono.len()
    );

    let total = frontend.window_count(mono.len());
    let dropped = mono.len() - total * config.window_size;
    log::info!(
        "Processing {} windows of {} samples ({} trailing samples dropped)",
        total,
        config.window_size,
        dropped
    );
    if total < config.threshold_window_size {
        log::info!(
            "Clip has fewer than {} windows; no peaks will be detected",
            config.threshold_window_size
        );
    }

    let interval = buffer.sample_interval();
    for (i, window) in windows(&mono, config.window_size).enumerate() {
        if ctx.cancel.is_cancelled() {
            return Err(Error::Cancelled { windows_done: i });
        }

        let spectrum = frontend.spectrum(i, window)?;
        let time = interval * i as f32 * config.window_size as f32;
        analyzer.analyze_spectrum(&spectrum, time)?;

        ctx.feed.publish(&analyzer.records()[..analyzer.safe_len()]);
        if let Some(progress) = &ctx.progress {
            progress(i + 1, total);
        }
    }

    Ok((total, dropped))
}

/// A pass running on a background thread.
pub struct AnalysisHandle {
    feed: OnsetFeed,
    cancel: CancelToken,
    handle: thread::JoinHandle<Result<OnsetAnalysis>>,
}

impl AnalysisHandle {
    /// Live view of finalized records, readable while the pass runs.
    pub fn feed(&self) -> &OnsetFeed {
        &self.feed
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<OnsetAnalysis> {
        self.handle.join().map_err(|_| Error::WorkerPanicked)?
    }
}

/// Starts the onset pass on its own thread so the caller's loop keeps running.
pub fn spawn(buffer: AudioBuffer, config: AnalysisConfig) -> Result<AnalysisHandle> {
    spawn_with(buffer, config, AnalysisContext::default())
}

pub fn spawn_with(
    buffer: AudioBuffer,
    config: AnalysisConfig,
    ctx: AnalysisContext,
) -> Result<AnalysisHandle> {
    let feed = ctx.feed.clone();
    let cancel = ctx.cancel.clone();

    log::info!("Starting spectrum analysis");
    let handle = thread::Builder::new()
        .name("onset-analysis".into())
        .spawn(move || analyze_with(&buffer, &config, &ctx))?;

    Ok(AnalysisHandle {
        feed,
        cancel,
        handle,
    })
}
