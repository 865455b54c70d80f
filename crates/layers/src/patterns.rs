//! Procedural surface colouring for bodies without boundary data.
//!
//! Every pattern is a pure function of the coordinate, the palette and a seed,
//! built on a coordinate-seeded hash so repeated generation is identical.

use foundation::color::Color;
use foundation::math::GeoPoint;

/// Base, highlight and shadow tones of a body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BodyPalette {
    pub base: Color,
    pub light: Color,
    pub dark: Color,
}

impl BodyPalette {
    pub const fn new(base: Color, light: Color, dark: Color) -> Self {
        Self { base, light, dark }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProceduralPattern {
    /// Flare speckle over the base tone.
    Solar,
    /// Crater rims over dark regolith.
    Cratered,
    /// Two layers of thick cloud.
    Clouded,
    /// Desert with polar caps and valleys.
    Martian,
    /// Alternating 15 degree bands and a red storm.
    JovianBands,
    /// Alternating 12 degree pale bands.
    SaturnianBands,
    /// Smooth haze with faint variation.
    IceGiant,
    /// Deep haze with a dark storm.
    StormGiant,
    /// Mottled ice with a bright heart-shaped plain.
    Plutonian,
    /// Generic three-tone mottling.
    Mottled,
}

const CRATER_RIM: Color = Color::hex(0x5c4833);
const POLAR_ICE: Color = Color::hex(0xffffff);
const POLAR_FRINGE: Color = Color::hex(0xffd4b3);
const RED_SPOT: Color = Color::hex(0xdc4c3e);
const DARK_SPOT: Color = Color::hex(0x1e3aa8);
const JOVIAN_BANDS: [[Color; 2]; 2] = [
    [Color::hex(0xe5b870), Color::hex(0xc88b3a)],
    [Color::hex(0xa67438), Color::hex(0x8b5a2b)],
];
const SATURNIAN_BANDS: [[Color; 2]; 2] = [
    [Color::hex(0xffedc9), Color::hex(0xfad5a5)],
    [Color::hex(0xe8c794), Color::hex(0xd4a574)],
];

/// Hash noise in `[0, 1)`.
pub fn noise(lng: f64, lat: f64, seed: f64) -> f64 {
    let x = (lng * 12.9898 + lat * 78.233 + seed).sin() * 43758.5453;
    x - x.floor()
}

/// Colour of `pattern` at `p`. `seed` shifts every noise layer, so the same
/// pattern with another seed gives a different but still repeatable surface.
pub fn procedural_color(pattern: ProceduralPattern, palette: &BodyPalette, p: GeoPoint, seed: f64) -> Color {
    let (lng, lat) = (p.lon_deg, p.lat_deg);
    let n = |fx: f64, fy: f64, s: f64| noise(lng * fx, lat * fy, s + seed);

    match pattern {
        ProceduralPattern::Solar => {
            let flare = n(0.1, 0.1, 2.0);
            if flare > 0.7 {
                Color::WHITE
            } else if flare > 0.4 {
                palette.light
            } else {
                palette.base
            }
        }
        ProceduralPattern::Cratered => {
            if n(0.3, 0.3, 1.0) > 0.85 || n(0.5, 0.5, 2.0) > 0.9 {
                CRATER_RIM
            } else if n(1.0, 1.0, 3.0) > 0.6 {
                palette.base
            } else {
                palette.dark
            }
        }
        ProceduralPattern::Clouded => {
            if n(0.2, 0.15, 1.0) > 0.6 {
                palette.light
            } else if n(0.1, 0.08, 2.0) < 0.3 {
                palette.dark
            } else {
                palette.base
            }
        }
        ProceduralPattern::Martian => {
            let from_equator = lat.abs();
            if from_equator > 80.0 {
                POLAR_ICE
            } else if from_equator > 75.0 {
                POLAR_FRINGE
            } else if n(0.1, 0.15, 2.0) > 0.75 {
                palette.dark
            } else if n(0.2, 0.2, 1.0) > 0.6 {
                palette.light
            } else {
                palette.base
            }
        }
        ProceduralPattern::JovianBands => {
            let band = ((lat + 90.0) / 15.0).floor();
            let spot = ((lng - 90.0).powi(2) * 4.0 + (lat + 20.0).powi(2) * 9.0).sqrt();
            if spot < 15.0 {
                RED_SPOT
            } else {
                banded(&JOVIAN_BANDS, band, n(0.3, 0.2, band))
            }
        }
        ProceduralPattern::SaturnianBands => {
            let band = ((lat + 90.0) / 12.0).floor();
            banded(&SATURNIAN_BANDS, band, n(0.25, 0.15, band))
        }
        ProceduralPattern::IceGiant => {
            let v = n(0.1, 0.15, 1.0);
            if v > 0.7 {
                palette.light
            } else if v < 0.3 {
                palette.dark
            } else {
                palette.base
            }
        }
        ProceduralPattern::StormGiant => {
            let spot = ((lng + 30.0).powi(2) * 4.0 + (lat - 20.0).powi(2) * 9.0).sqrt();
            if spot < 12.0 {
                DARK_SPOT
            } else if n(0.2, 0.2, 1.0) > 0.8 {
                palette.light
            } else if n(0.15, 0.1, 2.0) > 0.6 {
                palette.base
            } else {
                palette.dark
            }
        }
        ProceduralPattern::Plutonian => {
            let heart_x = (lng + 180.0).rem_euclid(360.0) - 180.0;
            let heart = ((heart_x / 1.2).powi(2) + ((lat - 20.0) / 0.8).powi(2)).sqrt();
            let terrain = n(0.2, 0.2, 1.0);
            if heart < 25.0 && lat > 5.0 && lat < 35.0 {
                POLAR_ICE
            } else if terrain > 0.7 {
                palette.light
            } else if terrain > 0.4 {
                palette.base
            } else {
                palette.dark
            }
        }
        ProceduralPattern::Mottled => {
            let v = n(1.0, 1.0, 1.0);
            if v > 0.6 {
                palette.light
            } else if v < 0.4 {
                palette.dark
            } else {
                palette.base
            }
        }
    }
}

fn banded(bands: &[[Color; 2]; 2], band: f64, turbulence: f64) -> Color {
    let tones = &bands[(band as i64).rem_euclid(2) as usize];
    if turbulence > 0.5 { tones[0] } else { tones[1] }
}

/// One flat ring band, radii as multiples of the body radius.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RingBand {
    pub inner: f64,
    pub outer: f64,
    pub color: Color,
}

/// Eight narrow bands alternating in opacity and cycling three tones.
pub fn saturn_ring_bands() -> Vec<RingBand> {
    const TONES: [Color; 3] = [Color::hex(0xe8c794), Color::hex(0xd4a574), Color::hex(0xc9b89a)];
    (0..8)
        .map(|i| {
            let inner = 1.6 + i as f64 * 0.08;
            let opacity = 0.3 + (i % 2) as f32 * 0.2;
            RingBand {
                inner,
                outer: inner + 0.07,
                color: TONES[i % 3].with_alpha(opacity),
            }
        })
        .collect()
}

/// Five wide bands in one tone, for small on-screen bodies.
pub fn coarse_ring_bands() -> Vec<RingBand> {
    (0..5)
        .map(|i| {
            let step = i as f64 * 0.1;
            RingBand {
                inner: 1.5 + step,
                outer: 1.6 + step,
                color: Color::rgba(218, 185, 140, 0.3 + i as f32 * 0.1),
            }
        })
        .collect()
}
