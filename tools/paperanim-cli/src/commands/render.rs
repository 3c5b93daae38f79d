//! Scan PDFs and assemble the frames into a video.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use paperanim_common::cancel::CancellationToken;
use paperanim_common::config::AppConfig;
use paperanim_frame_model::quick_command::QuickCommandConfig;
use paperanim_frame_model::settings::{BlurIntensity, BlurType, Orientation};
use paperanim_render_engine::export::{
    assemble_video, estimate_file_size, probe_audio_duration, seconds_per_frame, AssemblyJob,
    AssemblyProgress, FfmpegAssembler, ProgressCallback,
};
use paperanim_scanner::Scanner;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// PDF documents, scanned in order
    #[arg(required = true)]
    pub pdfs: Vec<PathBuf>,

    /// Text to search for (defaults to search_text from the settings file)
    #[arg(short, long)]
    pub text: Option<String>,

    /// Output video path (defaults to the first PDF with an .mp4 extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Quick-command settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sound played at the start of every frame
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Frames per second of video ("words per second")
    #[arg(long)]
    pub wps: Option<f64>,

    /// Canvas orientation: 16:9 or 9:16
    #[arg(long)]
    pub orientation: Option<Orientation>,

    /// Invert colors
    #[arg(long)]
    pub dark: bool,

    /// Draw the highlight box
    #[arg(long, overrides_with = "no_highlight")]
    pub highlight: bool,

    /// Do not draw the highlight box
    #[arg(long)]
    pub no_highlight: bool,

    /// Chromatic aberration
    #[arg(long)]
    pub chromatic: bool,

    /// Paper grain texture
    #[arg(long)]
    pub paper: bool,

    /// Blur: none, gaussian, vertical or radial
    #[arg(long)]
    pub blur: Option<BlurType>,

    /// Blur strength: low, medium or high
    #[arg(long)]
    pub blur_intensity: Option<BlurIntensity>,

    /// Highlight size relative to the text box (>= 1.0)
    #[arg(long)]
    pub size_multiplier: Option<f64>,

    /// Output video frame rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_settings: bool,
}

pub async fn run(args: RenderArgs, app: &AppConfig) -> anyhow::Result<()> {
    let settings_path = args
        .config
        .clone()
        .unwrap_or_else(|| app.quick_command_path.clone());
    let stored = QuickCommandConfig::load(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    let settings = apply_overrides(stored, &args)?;

    if settings.search_text.is_empty() {
        bail!(
            "No search text specified (use --text or set search_text in {})",
            settings_path.display()
        );
    }
    let pdfs = pdf_inputs(&args.pdfs);
    if pdfs.is_empty() {
        bail!("No PDF files given");
    }

    if args.save_settings {
        settings.save(&settings_path)?;
        println!("Settings saved to {}", settings_path.display());
    }

    println!("Searching {} document(s) for {:?}", pdfs.len(), settings.search_text);
    println!("{}", "-".repeat(40));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted; finishing with the frames found so far");
            interrupt.cancel();
        }
    });

    let scanner = Scanner::new(settings.render.clone());
    let search_text = settings.search_text.clone();
    let scan_pdfs = pdfs.clone();
    let summary = tokio::task::spawn_blocking(move || {
        scanner.scan_with_summary(&scan_pdfs, &search_text, &cancel, |event| {
            println!("  {event}")
        })
    })
    .await??;

    if summary.frames.is_empty() {
        if summary.cancelled {
            println!("\nCancelled before any frame was rendered.");
        } else {
            println!("\nNo matches found.");
        }
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&pdfs[0]));
    let spf = seconds_per_frame(settings.wps);
    println!(
        "\nGenerated {} frames ({:.2}s each, estimated size {})",
        summary.frames.len(),
        spf,
        estimate_file_size(summary.frames.len(), spf)
    );

    if let Some(audio) = &settings.audio_path {
        let duration = probe_audio_duration(audio);
        if duration > spf {
            println!("  Audio clip ({duration:.2}s) will be cut to {spf:.2}s per frame");
        }
    }

    let job = AssemblyJob::new(&output, spf)
        .with_audio(settings.audio_path.clone())
        .with_fps(args.fps.unwrap_or(app.export.fps))
        .with_bitrates(app.export.video_bitrate_kbps, app.export.audio_bitrate_kbps);

    println!("Rendering video...");
    let progress_cb: ProgressCallback = Box::new(|p: AssemblyProgress| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_encoded,
            p.total_frames,
            p.eta_secs,
        );
        let _ = std::io::stdout().flush();
    });

    let assembler = FfmpegAssembler::with_binary(app.export.ffmpeg_binary.clone());
    if assemble_video(assembler, summary.frames, job, Some(progress_cb)).await {
        println!("\nVideo saved to: {}", output.display());
        Ok(())
    } else {
        bail!("Video rendering failed; see the log for details")
    }
}

/// Command-line flags win over the stored settings.
fn apply_overrides(
    mut settings: QuickCommandConfig,
    args: &RenderArgs,
) -> anyhow::Result<QuickCommandConfig> {
    if let Some(text) = &args.text {
        settings.search_text = text.trim().to_string();
    }
    if let Some(audio) = &args.audio {
        settings.audio_path = Some(audio.clone());
    }
    if let Some(wps) = args.wps {
        settings.wps = wps;
    }

    let mut render = settings.render.to_builder();
    if let Some(orientation) = args.orientation {
        render = render.orientation(orientation);
    }
    if args.dark {
        render = render.dark_theme(true);
    }
    if args.highlight {
        render = render.highlight(true);
    }
    if args.no_highlight {
        render = render.highlight(false);
    }
    if args.chromatic {
        render = render.chromatic(true);
    }
    if args.paper {
        render = render.paper(true);
    }
    if let Some(blur) = args.blur {
        render = render.blur_type(blur);
    }
    if let Some(intensity) = args.blur_intensity {
        render = render.blur_intensity(intensity);
    }
    if let Some(multiplier) = args.size_multiplier {
        render = render.size_multiplier(multiplier);
    }
    settings.render = render.build()?;
    Ok(settings)
}

/// Keep `.pdf` paths (any case); warn about the rest.
fn pdf_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                tracing::warn!(path = %path.display(), "Ignoring non-PDF input");
            }
            is_pdf
        })
        .cloned()
        .collect()
}

fn default_output(first_pdf: &Path) -> PathBuf {
    first_pdf.with_extension("mp4")
}
