//! Canvas that writes an SVG document.
//!
//! Supports the translate/scale transforms the painters use. Shadows are not
//! rendered.

use std::f64::consts::{PI, TAU};
use std::fmt::Write;

use foundation::color::Color;

use crate::canvas::{Canvas, Paint, TextAlign};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    sx: f64,
    sy: f64,
    tx: f64,
    ty: f64,
}

impl Transform {
    const IDENTITY: Transform = Transform {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.sx + self.tx, y * self.sy + self.ty)
    }
}

#[derive(Debug, Clone)]
struct State {
    fill: Paint,
    stroke: Paint,
    line_width: f64,
    alpha: f64,
    font: String,
    align: TextAlign,
    transform: Transform,
}

#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    defs: String,
    body: String,
    path: String,
    has_point: bool,
    gradients: usize,
    state: State,
    stack: Vec<State>,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
            path: String::new(),
            has_point: false,
            gradients: 0,
            state: State {
                fill: Paint::Solid(Color::BLACK),
                stroke: Paint::Solid(Color::BLACK),
                line_width: 1.0,
                alpha: 1.0,
                font: "10px sans-serif".to_string(),
                align: TextAlign::Start,
                transform: Transform::IDENTITY,
            },
            stack: Vec::new(),
        }
    }

    pub fn finish(self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        if !self.defs.is_empty() {
            let _ = write!(out, "<defs>{}</defs>", self.defs);
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }

    /// Paint as an attribute value plus an opacity.
    fn paint_attr(&mut self, paint: &Paint) -> (String, f64) {
        match paint {
            Paint::Solid(c) => (rgb(*c), c.alpha() as f64 * self.state.alpha),
            Paint::Radial(g) => {
                let id = format!("g{}", self.gradients);
                self.gradients += 1;
                let t = self.state.transform;
                let (cx, cy) = t.apply(g.x1, g.y1);
                let (fx, fy) = t.apply(g.x0, g.y0);
                let _ = write!(
                    self.defs,
                    r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fx="{fx:.2}" fy="{fy:.2}" fr="{fr:.2}">"#,
                    r = g.r1 * t.sx,
                    fr = g.r0 * t.sx,
                );
                for (offset, color) in &g.stops {
                    let _ = write!(
                        self.defs,
                        r#"<stop offset="{offset}" stop-color="{}" stop-opacity="{:.3}"/>"#,
                        rgb(*color),
                        color.alpha()
                    );
                }
                self.defs.push_str("</radialGradient>");
                (format!("url(#{id})"), self.state.alpha)
            }
        }
    }
}

fn rgb(c: Color) -> String {
    format!("rgb({},{},{})", c.r, c.g, c.b)
}

impl Canvas for SvgCanvas {
    fn set_fill(&mut self, paint: Paint) {
        self.state.fill = paint;
    }

    fn set_stroke(&mut self, paint: Paint) {
        self.state.stroke = paint;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_shadow(&mut self, _blur: f64, _color: Color) {}

    fn set_font(&mut self, font: &str) {
        self.state.font = font.to_string();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.align = align;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let fill = self.state.fill.clone();
        let (paint, opacity) = self.paint_attr(&fill);
        let t = self.state.transform;
        let (x, y) = t.apply(x, y);
        let _ = write!(
            self.body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{:.2}" height="{:.2}" fill="{paint}" fill-opacity="{opacity:.3}"/>"#,
            w * t.sx,
            h * t.sy
        );
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.has_point = false;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let (x, y) = self.state.transform.apply(x, y);
        let _ = write!(self.path, "M{x:.2} {y:.2}");
        self.has_point = true;
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let (x, y) = self.state.transform.apply(x, y);
        let cmd = if self.has_point { 'L' } else { 'M' };
        let _ = write!(self.path, "{cmd}{x:.2} {y:.2}");
        self.has_point = true;
    }

    fn arc(&mut self, x: f64, y: f64, r: f64, start: f64, end: f64, anticlockwise: bool) {
        let t = self.state.transform;
        let (rx, ry) = (r * t.sx.abs(), r * t.sy.abs());
        let at = |angle: f64| t.apply(x + r * angle.cos(), y + r * angle.sin());

        let (sx, sy) = at(start);
        let cmd = if self.has_point { 'L' } else { 'M' };
        let _ = write!(self.path, "{cmd}{sx:.2} {sy:.2}");
        self.has_point = true;

        let sweep_flag = if anticlockwise { 0 } else { 1 };
        let span = if anticlockwise { start - end } else { end - start };
        if span >= TAU - 1e-9 {
            let mid = if anticlockwise { start - PI } else { start + PI };
            let (mx, my) = at(mid);
            let (ex, ey) = at(start);
            let _ = write!(
                self.path,
                "A{rx:.2} {ry:.2} 0 0 {sweep_flag} {mx:.2} {my:.2}A{rx:.2} {ry:.2} 0 0 {sweep_flag} {ex:.2} {ey:.2}"
            );
        } else {
            let span = span.rem_euclid(TAU);
            let large = if span > PI { 1 } else { 0 };
            let (ex, ey) = at(end);
            let _ = write!(self.path, "A{rx:.2} {ry:.2} 0 {large} {sweep_flag} {ex:.2} {ey:.2}");
        }
    }

    fn close_path(&mut self) {
        self.path.push('Z');
    }

    fn fill(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let fill = self.state.fill.clone();
        let (paint, opacity) = self.paint_attr(&fill);
        let _ = write!(
            self.body,
            r#"<path d="{}" fill="{paint}" fill-opacity="{opacity:.3}"/>"#,
            self.path
        );
    }

    fn stroke(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let stroke = self.state.stroke.clone();
        let (paint, opacity) = self.paint_attr(&stroke);
        let _ = write!(
            self.body,
            r#"<path d="{}" fill="none" stroke="{paint}" stroke-opacity="{opacity:.3}" stroke-width="{:.2}"/>"#,
            self.path,
            self.state.line_width * self.state.transform.sx
        );
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let fill = self.state.fill.clone();
        let (paint, opacity) = self.paint_attr(&fill);
        let (x, y) = self.state.transform.apply(x, y);
        let anchor = match self.state.align {
            TextAlign::Start => "start",
            TextAlign::Center => "middle",
            TextAlign::End => "end",
        };
        let escaped = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        let _ = write!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" style="font: {}" text-anchor="{anchor}" fill="{paint}" fill-opacity="{opacity:.3}">{escaped}</text>"#,
            self.state.font
        );
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        let t = &mut self.state.transform;
        t.tx += x * t.sx;
        t.ty += y * t.sy;
    }

    fn scale(&mut self, x: f64, y: f64) {
        let t = &mut self.state.transform;
        t.sx *= x;
        t.sy *= y;
    }
}
