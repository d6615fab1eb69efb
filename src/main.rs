// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use capsync::app_config::{self, Config, DurationPolicy};
use capsync::app_controller::Controller;
use capsync::file_utils::{FileManager, FileType};
use capsync::language_utils;
use capsync::server;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for DurationPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDurationPolicy {
    Reject,
    Clamp,
}

impl From<CliDurationPolicy> for DurationPolicy {
    fn from(policy: CliDurationPolicy) -> Self {
        match policy {
            CliDurationPolicy::Reject => DurationPolicy::Reject,
            CliDurationPolicy::Clamp => DurationPolicy::Clamp,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service (POST /transcribe)
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:5000
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Caption a local video file or every video in a directory
    Process {
        /// Input video file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Directory receiving the archives (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Spoken language (ISO code) or 'auto'
        #[arg(short = 'L', long)]
        language: Option<String>,

        /// Recognition model name
        #[arg(short, long)]
        model: Option<String>,

        /// Keep the request workspace (intermediate files, overlays) on disk
        #[arg(short, long)]
        keep: bool,
    },

    /// Draw an existing SRT file onto a video
    Burn {
        /// Video to caption
        #[arg(value_name = "VIDEO")]
        video: PathBuf,

        /// Subtitle file (SRT)
        #[arg(value_name = "SUBTITLES")]
        subtitles: PathBuf,

        /// Output video (defaults to captioned_<VIDEO> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to do with captions that end before they start
        #[arg(long, value_enum)]
        duration_policy: Option<CliDurationPolicy>,
    },

    /// Generate shell completions for capsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// capsync - burn speech captions onto videos
///
/// Transcribes a video with a speech recognition service, writes an SRT file
/// and a transcript, draws the captions onto the video and zips the results.
#[derive(Parser, Debug)]
#[command(name = "capsync")]
#[command(version)]
#[command(about = "Caption synchronization service")]
#[command(long_about = "capsync transcribes videos, burns the captions onto them and packages the results.

EXAMPLES:
    capsync serve                               # Run the HTTP service from conf.json
    capsync serve -b 0.0.0.0:8080               # Listen on another address
    capsync process talk.mp4                    # Caption a local file
    capsync process -o out/ /videos/            # Caption every video in a directory
    capsync burn talk.mp4 talk.srt              # Draw an existing SRT file onto a video
    capsync completions bash > capsync.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. SUPABASE_URL, SUPABASE_KEY and OPENAI_API_KEY
    override the corresponding settings.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The level is lowered at runtime through log::set_max_level
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "capsync", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            config.validate_for_server().context("Configuration validation failed")?;

            let bind_address = config.server.bind_address.clone();
            info!(
                "Storage backend: {}, recognition: {} ({})",
                config.storage.backend, config.recognition.endpoint, config.recognition.model
            );
            let controller = Arc::new(Controller::with_config(config));
            server::serve(controller, &bind_address).await
        }
        Commands::Process {
            input_path,
            output_dir,
            language,
            model,
            keep,
        } => {
            if let Some(language) = language {
                config.recognition.language = language;
            }
            if let Some(model) = model {
                config.recognition.model = model;
            }
            if keep {
                config.workspace.keep_artifacts = true;
                config.workspace.keep_intermediate = true;
            }
            config.validate_for_processing().context("Configuration validation failed")?;

            run_process(Controller::with_config(config), &input_path, output_dir).await
        }
        Commands::Burn {
            video,
            subtitles,
            output,
            duration_policy,
        } => {
            if let Some(policy) = duration_policy {
                config.captions.duration_policy = policy.into();
            }
            config.validate().context("Configuration validation failed")?;

            if FileManager::detect_file_type(&subtitles)? != FileType::Subtitle {
                warn!("{} does not look like an SRT file, trying anyway", subtitles.display());
            }
            let output = output.unwrap_or_else(|| default_captioned_path(&video));
            let report = Controller::with_config(config)
                .burn_subtitles(&video, &subtitles, &output)
                .await?;
            info!("Success: {} ({} captions drawn)", output.display(), report.rendered);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load conf.json (creating it when missing), then apply env and CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let (mut config, created) = Config::load_or_create(&cli.config_path)?;
    if created {
        warn!("Config file not found at '{}', created a default config.", cli.config_path);
    }

    config.apply_env_overrides();
    describe_language(&config.recognition.language);

    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        // Just update the max level without reinitializing the logger
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

async fn run_process(controller: Controller, input_path: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    if input_path.is_dir() {
        let output_dir = output_dir.unwrap_or_else(|| input_path.to_path_buf());
        let summary = controller.run_folder(input_path, &output_dir).await?;
        if !summary.failed.is_empty() {
            return Err(anyhow!("{} file(s) failed, see the log above", summary.failed.len()));
        }
        return Ok(());
    }

    if !input_path.is_file() {
        return Err(anyhow!("Input path does not exist: {}", input_path.display()));
    }

    let output_dir = output_dir.unwrap_or_else(|| {
        input_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf()
    });

    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(format!("Captioning {}", input_path.display()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = controller.run_local(input_path, &output_dir).await;
    spinner.finish_and_clear();

    let archive = result?;
    info!("Success: {}", archive.display());
    Ok(())
}

fn describe_language(code: &str) {
    match language_utils::get_language_name(code) {
        Ok(name) => debug!("Recognition language: {} ({})", name, code),
        Err(_) => debug!("Recognition language: {}", code),
    }
}

fn default_captioned_path(video: &Path) -> PathBuf {
    let name = video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video.mp4".to_string());
    video.with_file_name(format!("captioned_{}", name))
}
