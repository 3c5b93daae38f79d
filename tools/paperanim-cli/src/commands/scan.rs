//! List matches without rendering.

use std::path::PathBuf;

use paperanim_common::cancel::CancellationToken;
use paperanim_frame_model::settings::RenderConfiguration;
use paperanim_scanner::{MatchLocation, ScanProgress, Scanner};

pub fn run(pdfs: Vec<PathBuf>, text: String, json: bool) -> anyhow::Result<()> {
    let scanner = Scanner::new(RenderConfiguration::default());
    let cancel = CancellationToken::new();

    let locations = scanner.locate(&pdfs, text.trim(), &cancel, |event| {
        // Per-match lines are printed below; only surface skips and failures here.
        if !json && !matches!(event, ScanProgress::MatchFound { .. }) {
            eprintln!("  {event}");
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&locations)?);
        return Ok(());
    }

    for location in &locations {
        println!("{}", format_location(location));
    }
    println!("\n{} match(es)", locations.len());
    Ok(())
}

fn format_location(location: &MatchLocation) -> String {
    let rect = location.rect.rect();
    format!(
        "{}  page {:>4}  [{:.1}, {:.1}, {:.1}, {:.1}]",
        location.path.display(),
        location.page,
        rect.x0,
        rect.y0,
        rect.x1,
        rect.y1
    )
}
