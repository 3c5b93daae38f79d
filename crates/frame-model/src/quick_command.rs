//! Flat `key=value` settings file.
//!
//! ```text
//! # Paper Animator Quick Command Settings
//! # This file is auto-generated. Edit with caution.
//!
//! search_text=Target
//! dark_theme=false
//! blur_type=Radial (Center Clear)
//! size_multiplier=1.5
//! ```
//!
//! Parsing never fails on content: unknown keys are ignored and values
//! that do not parse keep their defaults.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::settings::{RenderConfiguration, RenderConfigurationBuilder};

/// Default playback speed in words (frames) per second.
pub const DEFAULT_WPS: f64 = 1.5;

const HEADER: &str = "# Paper Animator Quick Command Settings\n\
                      # This file is auto-generated. Edit with caution.\n";

/// Failures reading or writing a quick-command file.
#[derive(Debug, thiserror::Error)]
pub enum QuickCommandError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to run a render without interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickCommandConfig {
    pub search_text: String,
    pub render: RenderConfiguration,
    /// Frames shown per second of video.
    pub wps: f64,
    pub audio_path: Option<PathBuf>,
}

impl Default for QuickCommandConfig {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            render: RenderConfiguration::default(),
            wps: DEFAULT_WPS,
            audio_path: None,
        }
    }
}

impl QuickCommandConfig {
    /// Parse the flat format. Missing keys keep their defaults.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        let mut render = RenderConfigurationBuilder::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            render = match key.trim() {
                "search_text" => {
                    config.search_text = value.to_string();
                    render
                }
                "audio_path" => {
                    config.audio_path = (!value.is_empty()).then(|| PathBuf::from(value));
                    render
                }
                "wps" => {
                    if let Some(wps) = parse_float(value) {
                        config.wps = wps;
                    }
                    render
                }
                "dark_theme" => render.dark_theme(parse_bool(value)),
                "highlight" => render.highlight(parse_bool(value)),
                "chromatic" => render.chromatic(parse_bool(value)),
                "paper" => render.paper(parse_bool(value)),
                "orientation" => match value.parse() {
                    Ok(orientation) => render.orientation(orientation),
                    Err(_) => render,
                },
                "blur_type" => match value.parse() {
                    Ok(blur) => render.blur_type(blur),
                    Err(_) => render,
                },
                "blur_intensity" => match value.parse() {
                    Ok(intensity) => render.blur_intensity(intensity),
                    Err(_) => render,
                },
                "size_multiplier" => match parse_float(value) {
                    Some(multiplier) => render.size_multiplier(multiplier),
                    None => render,
                },
                _ => render,
            };
        }

        config.render = render.build().unwrap_or_default();
        config
    }

    /// Render the flat format, header included.
    pub fn to_flat_string(&self) -> String {
        let render = &self.render;
        let mut out = String::from(HEADER);
        out.push('\n');

        let entries: [(&str, String); 11] = [
            ("search_text", self.search_text.clone()),
            ("dark_theme", render.dark_theme().to_string()),
            ("highlight", render.highlight().to_string()),
            ("chromatic", render.chromatic().to_string()),
            ("paper", render.paper().to_string()),
            ("orientation", render.orientation().to_string()),
            ("blur_type", render.blur_type().to_string()),
            ("blur_intensity", render.blur_intensity().to_string()),
            ("size_multiplier", format!("{:?}", render.size_multiplier())),
            ("wps", format!("{:?}", self.wps)),
            (
                "audio_path",
                self.audio_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
        ];
        for (key, value) in entries {
            let _ = writeln!(out, "{key}={value}");
        }
        out
    }

    /// Load from disk; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, QuickCommandError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| QuickCommandError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    pub fn save(&self, path: &Path) -> Result<(), QuickCommandError> {
        let write_err = |source| QuickCommandError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, self.to_flat_string()).map_err(write_err)
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn parse_float(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
