mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};

use cli::Cli;
use fluxbeat::audio::decode::decode_audio;
use fluxbeat::config::{self, AnalysisConfig, Config, OutputConfig};
use fluxbeat::{analyze_with, AnalysisContext, OnsetAnalysis};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect fluxbeat.toml / global config
    let config_path = cli.config.clone().or_else(find_config);
    let cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };
    let (analysis_config, output_config) = merge(&cli, cfg);
    analysis_config.validate().context("Invalid analysis settings")?;

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    log::info!("fluxbeat - spectral flux onset detection");
    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!(
        "Window: {} samples, threshold window: {}, multiplier: {}",
        analysis_config.window_size,
        analysis_config.threshold_window_size,
        analysis_config.threshold_multiplier
    );

    // 1. Decode audio
    log::info!("Decoding audio...");
    let buffer = decode_audio(&cli.input)
        .with_context(|| format!("Failed to decode {}", cli.input.display()))?;

    // 2. Analyze
    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} windows ({eta} remaining)")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );
    let bar = pb.clone();
    let ctx = AnalysisContext::new().with_progress(move |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    });

    let analysis = analyze_with(&buffer, &analysis_config, &ctx).context("Spectrum analysis failed")?;
    pb.finish_with_message("Analysis complete");

    log::info!(
        "{} windows, {} peaks over {:.1}s",
        analysis.windows,
        analysis.peak_count(),
        analysis.duration
    );

    // 3. Write results
    write_output(&cli.output, analysis, &output_config)?;
    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("fluxbeat.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("fluxbeat").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("fluxbeat").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Config values apply only where the CLI flag is still at its default.
fn merge(cli: &Cli, cfg: Config) -> (AnalysisConfig, OutputConfig) {
    let mut analysis = cfg.analysis;
    let mut output = cfg.output;

    if cli.window_size != config::DEFAULT_WINDOW_SIZE {
        analysis.window_size = cli.window_size;
    }
    if cli.threshold_window != config::DEFAULT_THRESHOLD_WINDOW_SIZE {
        analysis.threshold_window_size = cli.threshold_window;
    }
    if cli.multiplier != config::DEFAULT_THRESHOLD_MULTIPLIER {
        analysis.threshold_multiplier = cli.multiplier;
    }
    if cli.peaks_only {
        output.peaks_only = true;
    }
    if cli.compact {
        output.pretty = false;
    }

    (analysis, output)
}

fn write_output(path: &Path, mut analysis: OnsetAnalysis, output: &OutputConfig) -> Result<()> {
    if output.peaks_only {
        analysis.records.retain(|r| r.is_peak);
    }

    let json = if output.pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };

    if path == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
    } else {
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
