//! Headless entry point: replay a gesture script against a panel.

use clap::Parser;
use inkpanel_app::{AppConfig, AppResult, Session, ShortcutRegistry, load_panel, load_script, write_file};
use inkpanel_core::Panel;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "inkpanel")]
#[command(version, about = "Replay a drawing script against a comic panel")]
struct Cli {
    /// Gesture script (JSON array of commands)
    script: Option<PathBuf>,

    /// Panel to start from; an empty panel when omitted
    #[arg(long, value_name = "PANEL")]
    panel: Option<PathBuf>,

    /// Shell configuration (display size, fonts, undo depth)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Image to use as the panel background before replaying
    #[arg(long, value_name = "IMAGE")]
    import: Option<PathBuf>,

    /// Where to write the composited frame
    #[arg(long, value_name = "PNG")]
    frame: Option<PathBuf>,

    /// Where to write the updated panel
    #[arg(long, value_name = "PANEL")]
    out: Option<PathBuf>,

    /// Where to write the background snapshot (background and grid)
    #[arg(long, value_name = "PNG")]
    background: Option<PathBuf>,

    /// List keyboard shortcuts and exit
    #[arg(long)]
    shortcuts: bool,
}

fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let panel = match &cli.panel {
        Some(path) => load_panel(path)?,
        None => Panel::new("Untitled"),
    };

    let mut session = Session::new(panel, &config)?;
    if let Some(path) = &cli.import {
        let bytes = std::fs::read(path).map_err(|e| inkpanel_app::AppError::Io {
            path: path.clone(),
            source: e,
        })?;
        session.import_background(&bytes)?;
    }
    if let Some(path) = &cli.script {
        let commands = load_script(path)?;
        log::info!("Replaying {} commands from {}", commands.len(), path.display());
        session.run(&commands)?;
    }

    if let Some(path) = &cli.frame {
        write_file(path, &session.frame_png()?)?;
    }
    if let Some(path) = &cli.background {
        write_file(path, &session.background_png()?)?;
    }
    if let Some(path) = &cli.out {
        write_file(path, session.panel().to_json()?.as_bytes())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    if cli.shortcuts {
        ShortcutRegistry::print_all();
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("inkpanel: {e}");
            ExitCode::FAILURE
        }
    }
}
