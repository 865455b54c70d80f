//! Catalogue of the bodies the views can show.

use foundation::color::Color;
use foundation::ids::BodyId;
use layers::{
    BodyPalette, PLANET_SPACING_DEG, ProceduralPattern, RegionFeature, RegionIndex,
    SCENE_EARTH_SPACING_DEG, SCENE_SPACING_DEG, SUN_SPACING_DEG, SurfaceDot, SurfaceSource,
    country_color, generate_surface, generate_surface_within,
};
use render::BodyEffects;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Dots from the region index; unavailable until boundaries load.
    Regions,
    Procedural(ProceduralPattern),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub has_glow: bool,
    pub has_rings: bool,
    pub has_atmosphere: bool,
    pub surface: SurfaceKind,
}

impl Capabilities {
    pub fn effects(&self) -> BodyEffects {
        BodyEffects {
            glow: self.has_glow,
            rings: self.has_rings,
            atmosphere: self.has_atmosphere,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BodySpec {
    pub id: BodyId,
    pub name: &'static str,
    /// Relative size; the orbital scene draws `radius * 3` px at zoom 1.
    pub radius: f64,
    pub orbit_radius: f64,
    /// Degrees per tick.
    pub orbit_speed: f64,
    /// Spin in tenths of a degree per tick.
    pub rotation_speed: f64,
    pub palette: BodyPalette,
    pub capabilities: Capabilities,
}

const fn planet(
    id: &'static str,
    name: &'static str,
    radius: f64,
    orbit_radius: f64,
    orbit_speed: f64,
    rotation_speed: f64,
    colors: [u32; 3],
    capabilities: Capabilities,
) -> BodySpec {
    BodySpec {
        id: BodyId(id),
        name,
        radius,
        orbit_radius,
        orbit_speed,
        rotation_speed,
        palette: BodyPalette::new(Color::hex(colors[0]), Color::hex(colors[1]), Color::hex(colors[2])),
        capabilities,
    }
}

const fn plain(pattern: ProceduralPattern) -> Capabilities {
    Capabilities {
        has_glow: false,
        has_rings: false,
        has_atmosphere: true,
        surface: SurfaceKind::Procedural(pattern),
    }
}

/// The Sun, the eight planets and Pluto, innermost first.
pub static CATALOGUE: [BodySpec; 10] = [
    planet("sun", "Sun", 80.0, 0.0, 0.0, 0.1, [0xfdb813, 0xfff4e0, 0xff8c00], Capabilities {
        has_glow: true,
        has_rings: false,
        has_atmosphere: false,
        surface: SurfaceKind::Procedural(ProceduralPattern::Solar),
    }),
    planet("mercury", "Mercury", 5.0, 150.0, 0.04, 0.05, [0x8c7853, 0xbca888, 0x5c4833], plain(ProceduralPattern::Cratered)),
    planet("venus", "Venus", 12.0, 210.0, 0.03, -0.02, [0xffc649, 0xffe4a0, 0xe5a020], plain(ProceduralPattern::Clouded)),
    planet("earth", "Earth", 13.0, 280.0, 0.025, 0.5, [0x4a90e2, 0x87ceeb, 0x1e3a8a], Capabilities {
        has_glow: false,
        has_rings: false,
        has_atmosphere: true,
        surface: SurfaceKind::Regions,
    }),
    planet("mars", "Mars", 7.0, 350.0, 0.02, 0.45, [0xe27b58, 0xff9e80, 0xb23a2b], plain(ProceduralPattern::Martian)),
    planet("jupiter", "Jupiter", 60.0, 500.0, 0.008, 0.8, [0xc88b3a, 0xe5b870, 0x8b5a2b], plain(ProceduralPattern::JovianBands)),
    planet("saturn", "Saturn", 50.0, 680.0, 0.006, 0.7, [0xfad5a5, 0xffedc9, 0xd4a574], Capabilities {
        has_glow: false,
        has_rings: true,
        has_atmosphere: true,
        surface: SurfaceKind::Procedural(ProceduralPattern::SaturnianBands),
    }),
    planet("uranus", "Uranus", 26.0, 820.0, 0.004, -0.4, [0x4fd0e7, 0x87e8f7, 0x2ba6c2], plain(ProceduralPattern::IceGiant)),
    planet("neptune", "Neptune", 25.0, 950.0, 0.003, 0.5, [0x4166f5, 0x7b9bff, 0x1e3aa8], plain(ProceduralPattern::StormGiant)),
    planet("pluto", "Pluto", 4.0, 1100.0, 0.002, 0.15, [0xece6d9, 0xffffff, 0xb8afa0], plain(ProceduralPattern::Plutonian)),
];

pub fn body(id: &str) -> Option<&'static BodySpec> {
    CATALOGUE.iter().find(|b| b.id.as_str() == id)
}

fn region_color(feature: &RegionFeature) -> Color {
    country_color(&feature.code)
}

/// Region dots coloured by the country palette, widened past `spacing`
/// only when more than `max_points` would be kept. Returns the spacing used.
pub fn region_surface(index: &RegionIndex, spacing: f64, max_points: usize) -> (f64, Vec<SurfaceDot>) {
    generate_surface_within(
        &SurfaceSource::Regions {
            index,
            color: region_color,
        },
        spacing,
        max_points,
    )
}

impl BodySpec {
    /// Degrees of spin per tick.
    pub fn spin_step_deg(&self) -> f64 {
        self.rotation_speed * 10.0
    }

    pub fn is_region_backed(&self) -> bool {
        self.capabilities.surface == SurfaceKind::Regions
    }

    /// Spacing for the single-body globe.
    pub fn planet_spacing(&self) -> f64 {
        if self.capabilities.has_glow {
            SUN_SPACING_DEG
        } else {
            PLANET_SPACING_DEG
        }
    }

    /// Spacing inside the orbital scene.
    pub fn scene_spacing(&self) -> f64 {
        if self.is_region_backed() {
            SCENE_EARTH_SPACING_DEG
        } else {
            SCENE_SPACING_DEG
        }
    }

    /// Colour source for this body. Region-backed bodies have none until
    /// `regions` is available.
    pub fn surface_source<'a>(&self, regions: Option<&'a RegionIndex>, seed: f64) -> Option<SurfaceSource<'a>> {
        match self.capabilities.surface {
            SurfaceKind::Regions => regions.map(|index| SurfaceSource::Regions {
                index,
                color: region_color,
            }),
            SurfaceKind::Procedural(pattern) => Some(SurfaceSource::Procedural {
                pattern,
                palette: self.palette,
                seed,
            }),
        }
    }

    /// Dots for this body at `spacing`, or `None` while its data is missing.
    pub fn generate_surface(&self, regions: Option<&RegionIndex>, spacing: f64, seed: f64) -> Option<Vec<SurfaceDot>> {
        self.surface_source(regions, seed)
            .map(|source| generate_surface(&source, spacing))
    }

    /// Like [`BodySpec::generate_surface`], but kept within `max_points`.
    pub fn budgeted_surface(
        &self,
        regions: Option<&RegionIndex>,
        spacing: f64,
        seed: f64,
        max_points: usize,
    ) -> Option<Vec<SurfaceDot>> {
        self.surface_source(regions, seed)
            .map(|source| generate_surface_within(&source, spacing, max_points).1)
    }
}
