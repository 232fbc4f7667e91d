use ratatui::style::Color;
use reelpan_core::config::{ThemeColorOverrides, ThemeConfig};
use tracing::warn;

/// Runtime theme with configurable colors
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    /// Tile body at rest
    pub tile: Color,
    /// Tile body while lifted by hover
    pub tile_hover: Color,
    pub border: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(0x11, 0x11, 0x14),
            foreground: Color::Rgb(0xe8, 0xe4, 0xdc),
            muted: Color::Rgb(0x6e, 0x6a, 0x64),
            accent: Color::Rgb(0xe0, 0x4f, 0x3a),
            tile: Color::Rgb(0x22, 0x22, 0x28),
            tile_hover: Color::Rgb(0x34, 0x30, 0x36),
            border: Color::Rgb(0x48, 0x45, 0x4c),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(0xf6, 0xf3, 0xee),
            foreground: Color::Rgb(0x1c, 0x1b, 0x1a),
            muted: Color::Rgb(0x8a, 0x85, 0x7e),
            accent: Color::Rgb(0xc2, 0x3b, 0x22),
            tile: Color::Rgb(0xe9, 0xe4, 0xdb),
            tile_hover: Color::Rgb(0xdd, 0xd4, 0xc6),
            border: Color::Rgb(0xb5, 0xae, 0xa4),
            warning: Color::Rgb(0xb4, 0x5f, 0x06),
        }
    }

    fn apply_overrides(mut self, colors: &ThemeColorOverrides) -> Self {
        let slots: [(&Option<String>, &mut Color, &str); 8] = [
            (&colors.background, &mut self.background, "background"),
            (&colors.foreground, &mut self.foreground, "foreground"),
            (&colors.muted, &mut self.muted, "muted"),
            (&colors.accent, &mut self.accent, "accent"),
            (&colors.tile, &mut self.tile, "tile"),
            (&colors.tile_hover, &mut self.tile_hover, "tile_hover"),
            (&colors.border, &mut self.border, "border"),
            (&colors.warning, &mut self.warning, "warning"),
        ];
        for (value, slot, name) in slots {
            if let Some(hex) = value {
                match parse_hex_color(hex) {
                    Some(color) => *slot = color,
                    None => warn!("Invalid color '{}' for theme.colors.{}, keeping preset", hex, name),
                }
            }
        }
        self
    }
}

/// Parse "#RRGGBB", "RRGGBB", "#RGB" or "RGB"
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }

    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

/// Resolve the configured preset and apply color overrides
pub fn load_theme(config: &ThemeConfig) -> Theme {
    let base = match config.name.to_lowercase().as_str() {
        "dark" => Theme::dark(),
        "light" => Theme::light(),
        other => {
            warn!("Unknown theme '{}', falling back to dark", other);
            Theme::dark()
        }
    };
    base.apply_overrides(&config.colors)
}
