mod applet;
mod battery;
mod canvas;
mod config;
mod display;
mod error;
mod poller;
mod tray;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(name = "batterytray", version, about = "System tray battery indicator driven by acpi")]
pub struct Cli {
    /// Show the extra acpi detail (time remaining, ...) in the tooltip
    #[arg(short, long)]
    verbose: bool,

    /// Use the freedesktop battery-* icon theme (try this if the default icons are missing)
    #[arg(short = 'c', long)]
    change_icon: bool,

    /// Polling interval in seconds
    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        default_value_t = config::DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval: u64,

    /// Render the percentage as text of the given font size instead of an icon
    #[arg(long, value_name = "FONT_SIZE", value_parser = parse_font_size)]
    text_mode: Option<f32>,

    /// Color the text red below 20% and green above 80% (requires --text-mode)
    #[arg(long)]
    colors: bool,

    /// Status command to run
    #[arg(long, value_name = "CMDLINE", default_value = config::DEFAULT_COMMAND)]
    command: String,

    /// Font name or path used by --text-mode
    #[arg(long)]
    font: Option<String>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn parse_font_size(s: &str) -> Result<f32, String> {
    let size: f32 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if size.is_finite() && size > 0.0 && size <= canvas::MAX_LABEL_SIZE {
        Ok(size)
    } else {
        Err(format!("font size must be above 0 and at most {}, got {}", canvas::MAX_LABEL_SIZE, s))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "batterytray", &mut std::io::stdout());
        return Ok(());
    }

    let config = config::DisplayConfig::from_cli(&cli);
    log::info!(
        "Starting batterytray: command={:?}, interval={}s, theme={:?}, render={:?}, verbose={}",
        config.command,
        config.interval.as_secs(),
        config.theme,
        config.render,
        config.verbose
    );

    applet::run(config)
}
