use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use wavelet_dr::commands::{denoise_file, evaluate_files};
use wavelet_dr::loader::LoaderKind;
use wavelet_dr::settings::{load_config, save_config, AppConfig};
use wavelet_dr::wavelet_clean::{FilterFamily, Method, ShrinkMode};

#[derive(Parser)]
#[command(name = "wavelet-dr", version, about = "Wavelet denoising for multichannel recordings")]
struct Cli {
    /// Settings file (camelCase JSON); missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Baseline,
    Adaptive,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Baseline => Method::Baseline,
            MethodArg::Adaptive => Method::Adaptive,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ShrinkArg {
    Hard,
    Soft,
}

impl From<ShrinkArg> for ShrinkMode {
    fn from(arg: ShrinkArg) -> Self {
        match arg {
            ShrinkArg::Hard => ShrinkMode::Hard,
            ShrinkArg::Soft => ShrinkMode::Soft,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LoaderArg {
    Auto,
    Wav,
    Edf,
    Decoded,
}

impl From<LoaderArg> for LoaderKind {
    fn from(arg: LoaderArg) -> Self {
        match arg {
            LoaderArg::Auto => LoaderKind::Auto,
            LoaderArg::Wav => LoaderKind::Wav,
            LoaderArg::Edf => LoaderKind::Edf,
            LoaderArg::Decoded => LoaderKind::Decoded,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Denoise a recording into a 32-bit float WAV
    Denoise {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum)]
        method: Option<MethodArg>,
        /// "haar", "db1".."db10", "sym4", "sym8", "coif1", "coif2" or "dmey"
        #[arg(long)]
        wavelet: Option<FilterFamily>,
        #[arg(long)]
        levels: Option<usize>,
        #[arg(long, value_enum)]
        shrink: Option<ShrinkArg>,
        #[arg(long, value_enum)]
        loader: Option<LoaderArg>,
        /// Multiply samples by this factor before denoising
        #[arg(long)]
        scale: Option<f64>,
        /// Process channels concurrently
        #[arg(long)]
        parallel: bool,
        /// Write the per-level threshold report here as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Corrupt recordings with synthetic noise and compare both methods
    Evaluate {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        segment: Option<f64>,
        #[arg(long)]
        snr_db: Option<f64>,
        /// Mains frequency in Hz; 0 detects 50 vs 60 Hz per recording
        #[arg(long)]
        line_freq: Option<f64>,
        #[arg(long)]
        drift_ratio: Option<f64>,
        /// Repeat to compare several wavelets
        #[arg(long)]
        wavelet: Vec<FilterFamily>,
        #[arg(long)]
        levels: Option<usize>,
        #[arg(long, value_enum)]
        loader: Option<LoaderArg>,
        #[arg(long)]
        scale: Option<f64>,
    },
    /// Write the default settings file
    Config {
        #[arg(long)]
        write: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config(path),
        None => AppConfig::default(),
    };

    match cli.cmd {
        Commands::Denoise {
            input,
            output,
            method,
            wavelet,
            levels,
            shrink,
            loader,
            scale,
            parallel,
            report,
        } => {
            if let Some(method) = method {
                config.denoise.method = method.into();
            }
            if let Some(wavelet) = wavelet {
                config.denoise.wavelet = wavelet;
            }
            if let Some(levels) = levels {
                config.denoise.levels = levels;
            }
            if let Some(shrink) = shrink {
                config.denoise.shrink = shrink.into();
            }
            if let Some(loader) = loader {
                config.loader = loader.into();
            }
            if let Some(scale) = scale {
                config.scale = scale;
            }
            config.denoise.parallel |= parallel;

            let result = denoise_file(&input, &output, &config, report.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Evaluate {
            inputs,
            segment,
            snr_db,
            line_freq,
            drift_ratio,
            wavelet,
            levels,
            loader,
            scale,
        } => {
            let eval = &mut config.evaluation;
            if let Some(segment) = segment {
                eval.segment_secs = segment;
            }
            if let Some(snr_db) = snr_db {
                eval.snr_db = snr_db;
            }
            if let Some(freq) = line_freq {
                eval.line_freq = (freq > 0.0).then_some(freq);
            }
            if let Some(ratio) = drift_ratio {
                eval.drift_ratio = ratio;
            }
            if !wavelet.is_empty() {
                eval.wavelets = wavelet;
            }
            if let Some(levels) = levels {
                eval.levels = levels;
            }
            if let Some(loader) = loader {
                config.loader = loader.into();
            }
            if let Some(scale) = scale {
                config.scale = scale;
            }

            let result = evaluate_files(&inputs, &config);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.recordings.is_empty() {
                return Err("no recording could be evaluated".into());
            }
        }
        Commands::Config { write } => {
            save_config(&write, &AppConfig::default())?;
            println!("Default settings written to {}", write.display());
        }
    }
    Ok(())
}
