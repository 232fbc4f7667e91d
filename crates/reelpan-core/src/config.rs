use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::boundary::{Boundary, BoundaryPolicy, DEFAULT_PULLBACK};
use crate::controller::ControllerSettings;
use crate::keyboard::KeyboardConfig;
use crate::profile::{ProfileSet, DEFAULT_MOBILE_BREAKPOINT};
use crate::smooth_scroll::SmoothScrollConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub profiles: ProfileSet,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub smooth_scroll: SmoothScrollConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Elastic,
    Clamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Rectangle the plane can be panned within
    #[serde(default)]
    pub boundary: Boundary,
    /// "elastic" or "clamp"
    #[serde(default)]
    pub boundary_policy: PolicyKind,
    /// Elastic pullback fraction, in (0, 1]
    #[serde(default = "default_pullback")]
    pub pullback: f64,
    /// Start momentum on release
    #[serde(default = "default_true")]
    pub inertia_enabled: bool,
    /// Scale per-frame constants by the measured frame interval
    #[serde(default = "default_true")]
    pub frame_rate_compensation: bool,
    /// Viewport widths at or below this use the mobile profile
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: f64,
    /// Number of project tiles shown
    #[serde(default = "default_item_count")]
    pub item_count: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            boundary: Boundary::default(),
            boundary_policy: PolicyKind::default(),
            pullback: default_pullback(),
            inertia_enabled: default_true(),
            frame_rate_compensation: default_true(),
            mobile_breakpoint: default_mobile_breakpoint(),
            item_count: default_item_count(),
        }
    }
}

impl GalleryConfig {
    pub fn policy(&self) -> BoundaryPolicy {
        match self.boundary_policy {
            PolicyKind::Elastic => BoundaryPolicy::Elastic {
                pullback: self.pullback,
            },
            PolicyKind::Clamp => BoundaryPolicy::HardClamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while nothing is moving
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while the gallery is animating
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Scroll units per terminal column
    #[serde(default = "default_cell_width")]
    pub cell_width_px: f64,
    /// Scroll units per terminal row
    #[serde(default = "default_cell_height")]
    pub cell_height_px: f64,
    /// Tile width in columns
    #[serde(default = "default_tile_cols")]
    pub tile_cols: u16,
    /// Tile height in rows
    #[serde(default = "default_tile_rows")]
    pub tile_rows: u16,
    /// Theme configuration
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            cell_width_px: default_cell_width(),
            cell_height_px: default_cell_height(),
            tile_cols: default_tile_cols(),
            tile_rows: default_tile_rows(),
            theme: ThemeConfig::default(),
        }
    }
}

/// Theme configuration
/// Can be specified as a simple string (theme name) or as a full struct with overrides
#[derive(Debug, Clone, Serialize)]
pub struct ThemeConfig {
    /// Theme name ("dark" or "light")
    pub name: String,
    /// Optional color overrides for semantic colors
    pub colors: ThemeColorOverrides,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: default_theme_name(),
            colors: ThemeColorOverrides::default(),
        }
    }
}

// Accept either a string or a struct
impl<'de> Deserialize<'de> for ThemeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};
        use std::fmt;

        struct ThemeConfigVisitor;

        impl<'de> Visitor<'de> for ThemeConfigVisitor {
            type Value = ThemeConfig;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a theme name or a map with 'name' and optional 'colors'")
            }

            fn visit_str<E>(self, value: &str) -> Result<ThemeConfig, E>
            where
                E: de::Error,
            {
                Ok(ThemeConfig {
                    name: value.to_string(),
                    colors: ThemeColorOverrides::default(),
                })
            }

            fn visit_map<M>(self, mut map: M) -> Result<ThemeConfig, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut name: Option<String> = None;
                let mut colors: Option<ThemeColorOverrides> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "name" => name = Some(map.next_value()?),
                        "colors" => colors = Some(map.next_value()?),
                        _ => {
                            let _: de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                Ok(ThemeConfig {
                    name: name.unwrap_or_else(default_theme_name),
                    colors: colors.unwrap_or_default(),
                })
            }
        }

        deserializer.deserialize_any(ThemeConfigVisitor)
    }
}

fn default_theme_name() -> String {
    "dark".to_string()
}

/// Optional color overrides, each a hex string ("#ff0000" or "ff0000")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeColorOverrides {
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub muted: Option<String>,
    pub accent: Option<String>,
    pub tile: Option<String>,
    /// Tile under the pointer
    pub tile_hover: Option<String>,
    pub border: Option<String>,
    pub warning: Option<String>,
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "<C-j>" (Ctrl+j), "<S-g>" (Shift+g), "<CR>", "<Esc>", "<Space>", "<Up>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    #[serde(default = "default_key_quit")]
    pub quit: String,
    #[serde(default = "default_key_up")]
    pub up: String,
    #[serde(default = "default_key_down")]
    pub down: String,
    #[serde(default = "default_key_left")]
    pub left: String,
    #[serde(default = "default_key_right")]
    pub right: String,
    /// Jump the target to the origin
    #[serde(default = "default_key_reset")]
    pub reset: String,
    /// Animated return to the origin
    #[serde(default = "default_key_reset_position")]
    pub reset_position: String,
    /// Switch between desktop and mobile tuning
    #[serde(default = "default_key_toggle_profile")]
    pub toggle_profile: String,
    /// Scroll the info panel to its top
    #[serde(default = "default_key_info_top")]
    pub info_top: String,
    #[serde(default = "default_key_help")]
    pub help: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            up: default_key_up(),
            down: default_key_down(),
            left: default_key_left(),
            right: default_key_right(),
            reset: default_key_reset(),
            reset_position: default_key_reset_position(),
            toggle_profile: default_key_toggle_profile(),
            info_top: default_key_info_top(),
            help: default_key_help(),
        }
    }
}

fn default_key_quit() -> String { "q".to_string() }
fn default_key_up() -> String { "w".to_string() }
fn default_key_down() -> String { "s".to_string() }
fn default_key_left() -> String { "a".to_string() }
fn default_key_right() -> String { "d".to_string() }
fn default_key_reset() -> String { "<Space>".to_string() }
fn default_key_reset_position() -> String { "r".to_string() }
fn default_key_toggle_profile() -> String { "p".to_string() }
fn default_key_info_top() -> String { "g".to_string() }
fn default_key_help() -> String { "?".to_string() }

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_pullback() -> f64 {
    DEFAULT_PULLBACK
}

fn default_mobile_breakpoint() -> f64 {
    DEFAULT_MOBILE_BREAKPOINT
}

fn default_item_count() -> usize {
    24
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_cell_width() -> f64 {
    10.0
}

fn default_cell_height() -> f64 {
    20.0
}

fn default_tile_cols() -> u16 {
    22
}

fn default_tile_rows() -> u16 {
    7
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self =
                toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/reelpan/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("reelpan")
            .join("config.toml")
    }

    /// Check ranges serde cannot express
    pub fn validate(&self) -> crate::Result<()> {
        self.gallery.policy().validate()?;
        self.profiles.validate()?;
        if !(self.gallery.mobile_breakpoint.is_finite() && self.gallery.mobile_breakpoint >= 0.0) {
            return Err(crate::Error::Config(format!(
                "mobile_breakpoint must not be negative, got {}",
                self.gallery.mobile_breakpoint
            )));
        }
        if self.ui.animation_fps == 0 {
            return Err(crate::Error::Config("animation_fps must be positive".into()));
        }
        if self.ui.cell_width_px <= 0.0 || self.ui.cell_height_px <= 0.0 {
            return Err(crate::Error::Config("cell size must be positive".into()));
        }
        if self.ui.tile_cols < 4 || self.ui.tile_rows < 3 {
            return Err(crate::Error::Config("tiles must be at least 4x3 cells".into()));
        }
        Ok(())
    }

    /// Controller settings derived from the gallery, profile and keyboard sections
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            boundary: self.gallery.boundary,
            policy: self.gallery.policy(),
            profiles: self.profiles.clone(),
            mobile_breakpoint: self.gallery.mobile_breakpoint,
            inertia_enabled: self.gallery.inertia_enabled,
            frame_rate_compensation: self.gallery.frame_rate_compensation,
            keyboard: self.keyboard.clone(),
        }
    }
}
