use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

use crate::color::{ColorControl, Rgb};
use crate::drawing::FontDescriptor;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "inkboard.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub window: WindowConfig,
    pub canvas: CanvasConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "inkboard".into(),
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub line_width: f32,
    #[serde(deserialize_with = "font_or_default")]
    pub font: FontDescriptor,
    /// TrueType/OpenType file used for text elements. When unset a few
    /// common system locations are tried.
    pub font_path: Option<PathBuf>,
    pub stroke_color: Rgb,
    pub background: Rgb,
    pub palette: Vec<Rgb>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            line_width: 3.0,
            font: FontDescriptor::default(),
            font_path: None,
            stroke_color: Rgb::WHITE,
            background: Rgb::new(18, 18, 18),
            palette: vec![
                Rgb::WHITE,
                Rgb::new(255, 99, 71),
                Rgb::new(255, 215, 0),
                Rgb::new(60, 179, 113),
                Rgb::new(65, 105, 225),
                Rgb::new(186, 85, 211),
            ],
        }
    }
}

impl Config {
    pub fn load<A: AsRef<Path>>(path: A) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        if config.canvas.line_width.is_nan() || config.canvas.line_width <= 0.0 {
            bail!("`canvas.line_width` must be positive (found {})", config.canvas.line_width);
        }
        if config.window.width == 0 || config.window.height == 0 {
            bail!(
                "window size must be non-zero (found {}x{})",
                config.window.width,
                config.window.height
            );
        }

        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Explicit path if given, else `./inkboard.toml` if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            Self::load(fallback)
        } else {
            log::info!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn color_control(&self) -> ColorControl {
        ColorControl::new(self.canvas.stroke_color)
    }
}

fn font_or_default<'de, D>(deserializer: D) -> Result<FontDescriptor, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|e| {
        log::warn!("{e}, falling back to \"{}\"", FontDescriptor::default());
        FontDescriptor::default()
    }))
}

/// Colours are written as `"R,G,B"`; channels go through the same clamping
/// as the colour control.
impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RgbVisitor;

        impl<'de> Visitor<'de> for RgbVisitor {
            type Value = Rgb;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a colour like \"255,128,0\" or [255, 128, 0]")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if v.split(',').count() != 3 {
                    return Err(E::custom(format_args!("invalid colour '{v}', expected R,G,B")));
                }
                let mut control = ColorControl::new(Rgb::BLACK);
                control.set_from_text(v);
                Ok(control.color())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut channel = |i| -> Result<i64, A::Error> {
                    seq.next_element()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))
                };
                let (r, g, b) = (channel(0)?, channel(1)?, channel(2)?);
                Ok(Rgb::clamped(r, g, b))
            }
        }

        deserializer.deserialize_any(RgbVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_example_config() {
        let config = Config::load("inkboard.example.toml").unwrap();
        assert_eq!(config.canvas.line_width, 3.0);
        assert_eq!(config.canvas.font.size_px, 50.0);
        assert!(!config.canvas.palette.is_empty());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.window.title, "inkboard");
        assert_eq!(config.canvas.line_width, 3.0);
        assert_eq!(config.canvas.stroke_color, Rgb::WHITE);
    }

    #[test]
    fn colours_are_clamped() {
        let config: Config = toml::from_str(
            r#"
            [canvas]
            stroke_color = "999,abc,10"
            background = [-5, 300, 7]
            "#,
        )
        .unwrap();
        assert_eq!(config.canvas.stroke_color, Rgb::new(255, 0, 10));
        assert_eq!(config.canvas.background, Rgb::new(0, 255, 7));
    }

    #[test]
    fn malformed_font_falls_back() {
        let config: Config = toml::from_str("[canvas]\nfont = \"huge comic\"").unwrap();
        assert_eq!(config.canvas.font, FontDescriptor::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[canvas]\nlinewidth = 2").is_err());
    }
}
