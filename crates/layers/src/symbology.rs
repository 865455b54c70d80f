//! Colours shared by the painters and the surface generator.

use formats::Category;
use foundation::color::Color;

use crate::markers::MarkerStatus;

/// Fill used for regions without a palette entry.
pub const DEFAULT_REGION_COLOR: Color = Color::hex(0x4a5568);

/// Region fill keyed by alpha-2 code.
pub fn country_color(code: &str) -> Color {
    let hex = match code {
        "US" | "FR" | "PH" | "SE" | "MY" | "IS" | "IL" => 0x3b82f6,
        "CN" | "JP" | "PL" => 0xef4444,
        "IN" | "NL" => 0xf97316,
        "BR" | "IT" | "MX" | "SA" | "ZA" | "TH" | "PK" | "NG" | "BD" | "ET" | "IR" | "TZ" | "PT"
        | "IE" | "AE" => 0x22c55e,
        "RU" | "GB" | "AU" | "KR" | "AR" | "CD" | "FI" | "GR" | "NZ" => 0x60a5fa,
        "DE" | "EG" | "CO" | "UA" => 0xfbbf24,
        "CA" | "ES" | "ID" | "TR" | "VN" | "KE" | "NO" | "CH" | "AT" | "CZ" | "CL" | "PE" | "MA"
        | "GL" => 0xdc2626,
        "SG" => 0xf59e0b,
        _ => return DEFAULT_REGION_COLOR,
    };
    Color::hex(hex)
}

pub fn category_color(category: Category) -> Color {
    match category {
        Category::City => Color::hex(0x3b82f6),
        Category::Nature => Color::hex(0x22c55e),
        Category::Landmark => Color::hex(0xf59e0b),
        Category::Beach => Color::hex(0x06b6d4),
        Category::Adventure => Color::hex(0xef4444),
    }
}

/// Pin fill: travel status wins over category.
pub fn pin_color(category: Category, status: MarkerStatus) -> Color {
    match status {
        MarkerStatus::Visited => Color::hex(0x22c55e),
        MarkerStatus::Wishlist => Color::hex(0xf59e0b),
        MarkerStatus::None => category_color(category),
    }
}

/// Fixed colours of the globe views.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeTheme {
    pub background: Color,
    pub ocean_inner: Color,
    pub ocean_outer: Color,
    pub rim: Color,
    pub rim_width: f64,
    pub graticule: Color,
    pub graticule_width: f64,
    pub graticule_step_deg: f64,
    /// Fill of dots outside the hovered region.
    pub dimmed: Color,
    pub orbit_guide: Color,
}

impl Default for GlobeTheme {
    fn default() -> Self {
        Self {
            background: Color::hex(0x050810),
            ocean_inner: Color::hex(0x0f1729),
            ocean_outer: Color::hex(0x080c14),
            rim: Color::rgba(59, 130, 246, 0.25),
            rim_width: 1.5,
            graticule: Color::rgba(59, 130, 246, 0.07),
            graticule_width: 0.5,
            graticule_step_deg: 10.0,
            dimmed: Color::hex(0x1a2233),
            orbit_guide: Color::rgba(59, 130, 246, 0.15),
        }
    }
}
