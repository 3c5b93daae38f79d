//! Render configuration types.
//!
//! A [`RenderConfiguration`] is validated once at construction and is
//! read-only afterwards, so a single instance can be shared by any number
//! of concurrent frame compositions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("size multiplier must be a finite number, got {0}")]
    InvalidSizeMultiplier(f64),

    #[error("unknown {field} value: {value:?}")]
    UnknownValue { field: &'static str, value: String },
}

impl ConfigError {
    fn unknown(field: &'static str, value: &str) -> Self {
        Self::UnknownValue {
            field,
            value: value.to_string(),
        }
    }
}

/// Output canvas orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// 1920x1080.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 1080x1920.
    #[serde(rename = "9:16")]
    Portrait,
}

impl Orientation {
    /// Output canvas size in pixels `(width, height)`.
    pub fn canvas_size(self) -> (u32, u32) {
        match self {
            Self::Landscape => (1920, 1080),
            Self::Portrait => (1080, 1920),
        }
    }

    /// Canvas width divided by canvas height.
    pub fn aspect_ratio(self) -> f64 {
        let (w, h) = self.canvas_size();
        w as f64 / h as f64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

/// Blur applied after the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlurType {
    #[default]
    None,
    Gaussian,
    Vertical,
    /// Blur that leaves the center of the frame sharp.
    #[serde(rename = "Radial (Center Clear)")]
    Radial,
}

impl BlurType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Gaussian => "Gaussian",
            Self::Vertical => "Vertical",
            Self::Radial => "Radial (Center Clear)",
        }
    }
}

/// Blur strength; each blur type maps it through its own size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlurIntensity {
    #[default]
    Low,
    Medium,
    High,
}

impl BlurIntensity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

macro_rules! text_enum {
    ($ty:ident, $field:literal, [$($variant:ident => $($text:literal)|+),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($($text)|+ => Ok(Self::$variant),)+
                    _ => Err(ConfigError::unknown($field, s)),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(Orientation, "orientation", [
    Landscape => "16:9" | "landscape",
    Portrait => "9:16" | "portrait",
]);

text_enum!(BlurType, "blur_type", [
    None => "none",
    Gaussian => "gaussian",
    Vertical => "vertical",
    Radial => "radial (center clear)" | "radial",
]);

text_enum!(BlurIntensity, "blur_intensity", [
    Low => "low",
    Medium => "medium",
    High => "high",
]);

/// Validated, immutable settings for rendering one or more frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RenderConfigurationBuilder")]
pub struct RenderConfiguration {
    dark_theme: bool,
    highlight: bool,
    chromatic: bool,
    paper: bool,
    orientation: Orientation,
    blur_type: BlurType,
    blur_intensity: BlurIntensity,
    size_multiplier: f64,
}

impl RenderConfiguration {
    pub fn builder() -> RenderConfigurationBuilder {
        RenderConfigurationBuilder::default()
    }

    /// Start a builder from this configuration's values.
    pub fn to_builder(&self) -> RenderConfigurationBuilder {
        RenderConfigurationBuilder {
            dark_theme: self.dark_theme,
            highlight: self.highlight,
            chromatic: self.chromatic,
            paper: self.paper,
            orientation: self.orientation,
            blur_type: self.blur_type,
            blur_intensity: self.blur_intensity,
            size_multiplier: self.size_multiplier,
        }
    }

    /// Invert colors.
    pub fn dark_theme(&self) -> bool {
        self.dark_theme
    }

    /// Draw a translucent highlight box behind the match.
    pub fn highlight(&self) -> bool {
        self.highlight
    }

    /// Shift red and blue channels apart.
    pub fn chromatic(&self) -> bool {
        self.chromatic
    }

    /// Blend a paper-grain noise texture over the frame.
    pub fn paper(&self) -> bool {
        self.paper
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn blur_type(&self) -> BlurType {
        self.blur_type
    }

    pub fn blur_intensity(&self) -> BlurIntensity {
        self.blur_intensity
    }

    /// Highlight size relative to the text box, always `>= 1.0`.
    pub fn size_multiplier(&self) -> f64 {
        self.size_multiplier
    }

    /// True when no effect would alter the rasterized crop.
    pub fn is_identity(&self) -> bool {
        !self.dark_theme
            && !self.highlight
            && !self.chromatic
            && !self.paper
            && self.blur_type == BlurType::None
    }
}

impl Default for RenderConfiguration {
    fn default() -> Self {
        RenderConfigurationBuilder::default().into_config()
    }
}

/// Builder for [`RenderConfiguration`]; unset fields keep their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfigurationBuilder {
    dark_theme: bool,
    highlight: bool,
    chromatic: bool,
    paper: bool,
    orientation: Orientation,
    blur_type: BlurType,
    blur_intensity: BlurIntensity,
    size_multiplier: f64,
}

impl Default for RenderConfigurationBuilder {
    fn default() -> Self {
        Self {
            dark_theme: false,
            highlight: true,
            chromatic: false,
            paper: false,
            orientation: Orientation::default(),
            blur_type: BlurType::default(),
            blur_intensity: BlurIntensity::default(),
            size_multiplier: 1.0,
        }
    }
}

impl RenderConfigurationBuilder {
    pub fn dark_theme(mut self, enabled: bool) -> Self {
        self.dark_theme = enabled;
        self
    }

    pub fn highlight(mut self, enabled: bool) -> Self {
        self.highlight = enabled;
        self
    }

    pub fn chromatic(mut self, enabled: bool) -> Self {
        self.chromatic = enabled;
        self
    }

    pub fn paper(mut self, enabled: bool) -> Self {
        self.paper = enabled;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn blur_type(mut self, blur_type: BlurType) -> Self {
        self.blur_type = blur_type;
        self
    }

    pub fn blur_intensity(mut self, intensity: BlurIntensity) -> Self {
        self.blur_intensity = intensity;
        self
    }

    pub fn size_multiplier(mut self, multiplier: f64) -> Self {
        self.size_multiplier = multiplier;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// A size multiplier below `1.0` is clamped up to `1.0`; a non-finite
    /// one is rejected.
    pub fn build(self) -> Result<RenderConfiguration, ConfigError> {
        if !self.size_multiplier.is_finite() {
            return Err(ConfigError::InvalidSizeMultiplier(self.size_multiplier));
        }
        Ok(self.into_config())
    }

    fn into_config(self) -> RenderConfiguration {
        RenderConfiguration {
            dark_theme: self.dark_theme,
            highlight: self.highlight,
            chromatic: self.chromatic,
            paper: self.paper,
            orientation: self.orientation,
            blur_type: self.blur_type,
            blur_intensity: self.blur_intensity,
            size_multiplier: if self.size_multiplier.is_finite() {
                self.size_multiplier.max(1.0)
            } else {
                1.0
            },
        }
    }
}

impl TryFrom<RenderConfigurationBuilder> for RenderConfiguration {
    type Error = ConfigError;

    fn try_from(builder: RenderConfigurationBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfiguration::default();
        assert!(config.highlight());
        assert!(!config.dark_theme());
        assert_eq!(config.orientation(), Orientation::Landscape);
        assert_eq!(config.blur_type(), BlurType::None);
        assert_eq!(config.blur_intensity(), BlurIntensity::Low);
        assert_eq!(config.size_multiplier(), 1.0);
        assert!(!config.is_identity());
    }

    #[test]
    fn test_size_multiplier_clamped() {
        let config = RenderConfiguration::builder()
            .size_multiplier(0.4)
            .build()
            .unwrap();
        assert_eq!(config.size_multiplier(), 1.0);
    }

    #[test]
    fn test_size_multiplier_rejects_nan() {
        let err = RenderConfiguration::builder()
            .size_multiplier(f64::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSizeMultiplier(_)));
    }

    #[test]
    fn test_orientation_canvas() {
        assert_eq!(Orientation::Landscape.canvas_size(), (1920, 1080));
        assert_eq!(Orientation::Portrait.canvas_size(), (1080, 1920));
        assert!((Orientation::Portrait.aspect_ratio() - 0.5625).abs() < 1e-12);
    }

    #[test]
    fn test_text_forms_roundtrip() {
        for blur in [
            BlurType::None,
            BlurType::Gaussian,
            BlurType::Vertical,
            BlurType::Radial,
        ] {
            assert_eq!(blur.to_string().parse::<BlurType>().unwrap(), blur);
        }
        assert_eq!("9:16".parse::<Orientation>().unwrap(), Orientation::Portrait);
        assert_eq!(" medium ".parse::<BlurIntensity>().unwrap(), BlurIntensity::Medium);
        assert!("sideways".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let config = RenderConfiguration::builder()
            .blur_type(BlurType::Radial)
            .orientation(Orientation::Portrait)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""blur_type":"Radial (Center Clear)""#));
        assert!(json.contains(r#""orientation":"9:16""#));

        let back: RenderConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_deserialize_validates() {
        let config: RenderConfiguration =
            serde_json::from_str(r#"{"size_multiplier":0.5,"paper":true}"#).unwrap();
        assert_eq!(config.size_multiplier(), 1.0);
        assert!(config.paper());
        assert!(config.highlight());
    }

    #[test]
    fn test_identity() {
        let config = RenderConfiguration::builder()
            .highlight(false)
            .build()
            .unwrap();
        assert!(config.is_identity());
    }
}
