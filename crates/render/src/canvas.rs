//! Immediate-mode 2D drawing surface.
//!
//! The trait mirrors the subset of an HTML canvas context the painters use.
//! Coordinates are logical pixels with y growing downward.

use std::f64::consts::TAU;

use foundation::color::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub x0: f64,
    pub y0: f64,
    pub r0: f64,
    pub x1: f64,
    pub y1: f64,
    pub r1: f64,
    /// `(offset, color)` pairs, offsets in `[0, 1]`.
    pub stops: Vec<(f64, Color)>,
}

impl RadialGradient {
    pub fn new(inner: (f64, f64, f64), outer: (f64, f64, f64)) -> Self {
        Self {
            x0: inner.0,
            y0: inner.1,
            r0: inner.2,
            x1: outer.0,
            y1: outer.1,
            r1: outer.2,
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f64, color: Color) -> Self {
        self.stops.push((offset.clamp(0.0, 1.0), color));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Radial(RadialGradient),
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl From<RadialGradient> for Paint {
    fn from(gradient: RadialGradient) -> Self {
        Paint::Radial(gradient)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

pub trait Canvas {
    fn set_fill(&mut self, paint: Paint);
    fn set_stroke(&mut self, paint: Paint);
    fn set_line_width(&mut self, width: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    /// Blur radius 0 disables the shadow.
    fn set_shadow(&mut self, blur: f64, color: Color);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, r: f64, start: f64, end: f64, anticlockwise: bool);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn scale(&mut self, x: f64, y: f64);

    /// Appends a full circle as its own subpath.
    fn circle(&mut self, x: f64, y: f64, r: f64) {
        self.move_to(x + r, y);
        self.arc(x, y, r, 0.0, TAU, false);
    }
}
