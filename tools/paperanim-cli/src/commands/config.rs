//! Show or create the quick-command settings file.

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Subcommand;
use paperanim_common::config::AppConfig;
use paperanim_frame_model::quick_command::QuickCommandConfig;

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the current settings
    Show {
        /// Settings file (defaults to the one named in the app config)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Print the application config as JSON instead
        #[arg(long)]
        app: bool,
    },

    /// Write a settings file with default values
    Init {
        /// Settings file (defaults to the one named in the app config)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(action: ConfigAction, app: &AppConfig) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show { app: true, .. } => {
            println!("{}", serde_json::to_string_pretty(app)?);
        }
        ConfigAction::Show { path, app: false } => {
            let path = path.unwrap_or_else(|| app.quick_command_path.clone());
            let settings = QuickCommandConfig::load(&path)?;
            println!("Quick command settings ({}):", path.display());
            println!("{}", "-".repeat(40));
            print!("{}", describe(&settings));
        }
        ConfigAction::Init { path, force } => {
            let path = path.unwrap_or_else(|| app.quick_command_path.clone());
            init(&path, force)?;
            println!("Wrote default settings to {}", path.display());
        }
    }
    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    QuickCommandConfig::default().save(path)?;
    Ok(())
}

fn describe(settings: &QuickCommandConfig) -> String {
    let render = &settings.render;
    let search_text = if settings.search_text.is_empty() {
        "(not set)".to_string()
    } else {
        settings.search_text.clone()
    };
    let audio = settings
        .audio_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());

    let rows = [
        ("Search Text", search_text),
        ("Dark Theme", render.dark_theme().to_string()),
        ("Text Highlight", render.highlight().to_string()),
        ("Chromatic Ab", render.chromatic().to_string()),
        ("Paper Texture", render.paper().to_string()),
        ("Orientation", render.orientation().to_string()),
        ("Blur Type", render.blur_type().to_string()),
        ("Blur Intensity", render.blur_intensity().to_string()),
        ("Highlight Size", format!("{}x", render.size_multiplier())),
        ("Speed (WPS)", settings.wps.to_string()),
        ("Audio File", audio),
    ];
    rows.iter()
        .map(|(label, value)| format!("  {:<18}{value}\n", format!("{label}:")))
        .collect()
}
