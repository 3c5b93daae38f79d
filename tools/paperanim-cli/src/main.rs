//! Paperanim CLI: find text in PDFs and turn every match into a video frame.
//!
//! Usage:
//!   paperanim render <PDF>... [OPTIONS]   Render matches to a video
//!   paperanim scan <PDF>... --text <T>    List matches without rendering
//!   paperanim config show|init            Inspect or create the settings file
//!   paperanim check                       Check for ffmpeg/ffprobe

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use paperanim_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "paperanim",
    about = "Zoomed, highlighted videos of every occurrence of a phrase in your PDFs",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one frame per match and assemble them into a video
    Render(commands::render::RenderArgs),

    /// List every match without rendering
    Scan {
        /// PDF documents, searched in order
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,

        /// Text to search for
        #[arg(short, long)]
        text: String,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or create the quick-command settings file
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app = AppConfig::load();
    let mut logging = app.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    paperanim_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Render(args) => commands::render::run(args, &app).await,
        Commands::Scan { pdfs, text, json } => commands::scan::run(pdfs, text, json),
        Commands::Config { action } => commands::config::run(action, &app),
        Commands::Check => commands::check::run(&app),
    }
}
