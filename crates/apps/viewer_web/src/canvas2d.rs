//! `Canvas` over a browser 2D context.

use render::{Canvas, Paint, TextAlign};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use foundation::color::Color;

pub struct WebCanvas {
    ctx: CanvasRenderingContext2d,
}

impl WebCanvas {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Resets the transform so painters work in logical (CSS) pixels.
    pub fn begin_frame(&mut self, dpr: f64) {
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    }

    fn style(&self, paint: &Paint) -> JsValue {
        match paint {
            Paint::Solid(color) => JsValue::from_str(&color.to_css()),
            Paint::Radial(g) => match self.ctx.create_radial_gradient(g.x0, g.y0, g.r0, g.x1, g.y1, g.r1) {
                Ok(gradient) => {
                    for (offset, color) in &g.stops {
                        let _ = gradient.add_color_stop(*offset as f32, &color.to_css());
                    }
                    gradient.into()
                }
                // Degenerate radii; fall back to the outer stop.
                Err(_) => {
                    let outer = g.stops.last().map_or(Color::TRANSPARENT, |&(_, c)| c);
                    JsValue::from_str(&outer.to_css())
                }
            },
        }
    }

    fn set_property(&self, key: &str, value: &JsValue) {
        let _ = js_sys::Reflect::set(self.ctx.as_ref(), &JsValue::from_str(key), value);
    }
}

impl Canvas for WebCanvas {
    fn set_fill(&mut self, paint: Paint) {
        let style = self.style(&paint);
        self.set_property("fillStyle", &style);
    }

    fn set_stroke(&mut self, paint: Paint) {
        let style = self.style(&paint);
        self.set_property("strokeStyle", &style);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.ctx.set_shadow_blur(blur);
        self.set_property("shadowColor", &JsValue::from_str(&color.to_css()));
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.ctx.set_text_align(match align {
            TextAlign::Start => "start",
            TextAlign::Center => "center",
            TextAlign::End => "end",
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, r: f64, start: f64, end: f64, anticlockwise: bool) {
        let _ = self
            .ctx
            .arc_with_anticlockwise(x, y, r.max(0.0), start, end, anticlockwise);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        let _ = self.ctx.translate(x, y);
    }

    fn scale(&mut self, x: f64, y: f64) {
        let _ = self.ctx.scale(x, y);
    }
}
