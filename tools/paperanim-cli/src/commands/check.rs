//! Check system capabilities.

use paperanim_common::config::{config_file_path, AppConfig};
use paperanim_render_engine::export::command_exists;

pub fn run(app: &AppConfig) -> anyhow::Result<()> {
    println!("Paperanim System Check");
    println!("{}", "=".repeat(50));

    let ffmpeg = command_exists(&app.export.ffmpeg_binary);
    if ffmpeg {
        println!("[OK] ffmpeg: {}", app.export.ffmpeg_binary);
    } else {
        println!(
            "[MISSING] ffmpeg: {} (required to write videos)",
            app.export.ffmpeg_binary
        );
    }

    if command_exists("ffprobe") {
        println!("[OK] ffprobe");
    } else {
        println!("[WARN] ffprobe not found (audio clip length is not checked)");
    }

    println!();
    println!("App config:      {}", config_file_path().display());
    let settings = &app.quick_command_path;
    if settings.exists() {
        println!("Quick settings:  {}", settings.display());
    } else {
        println!("Quick settings:  {} (not created yet)", settings.display());
    }

    println!();
    if ffmpeg {
        println!("All required tools are available. Paperanim is ready.");
    } else {
        println!("ffmpeg is missing. Install it or set export.ffmpeg_binary in the app config.");
    }

    Ok(())
}
