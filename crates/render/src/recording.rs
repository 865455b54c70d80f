use foundation::color::Color;

use crate::canvas::{Canvas, Paint, TextAlign};

/// One recorded canvas call. Fills and strokes carry the paint in effect and
/// the number of arcs in the current path.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { x: f64, y: f64, w: f64, h: f64, paint: Paint },
    Fill { paint: Paint, arcs: usize, alpha: f64 },
    Stroke { paint: Paint, arcs: usize, width: f64, alpha: f64, shadow_blur: f64 },
    Text { text: String, x: f64, y: f64, font: String, align: TextAlign, paint: Paint },
    Save,
    Restore,
    Translate { x: f64, y: f64 },
    Scale { x: f64, y: f64 },
}

#[derive(Debug, Clone)]
struct State {
    fill: Paint,
    stroke: Paint,
    line_width: f64,
    alpha: f64,
    shadow_blur: f64,
    font: String,
    align: TextAlign,
}

impl Default for State {
    fn default() -> Self {
        Self {
            fill: Paint::Solid(Color::BLACK),
            stroke: Paint::Solid(Color::BLACK),
            line_width: 1.0,
            alpha: 1.0,
            shadow_blur: 0.0,
            font: "10px sans-serif".to_string(),
            align: TextAlign::Start,
        }
    }
}

/// Canvas that keeps every drawing call for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
    state: State,
    stack: Vec<State>,
    path_arcs: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Fills with a solid paint, in issue order.
    pub fn solid_fills(&self) -> Vec<(Color, usize)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill {
                    paint: Paint::Solid(color),
                    arcs,
                    ..
                } => Some((*color, *arcs)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Canvas for RecordingCanvas {
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
        self.state.alpha = alpha;
    }

    fn set_shadow(&mut self, blur: f64, _color: Color) {
        self.state.shadow_blur = blur;
    }

    fn set_font(&mut self, font: &str) {
        self.state.font = font.to_string();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.align = align;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            w,
            h,
            paint: self.state.fill.clone(),
        });
    }

    fn begin_path(&mut self) {
        self.path_arcs = 0;
    }

    fn move_to(&mut self, _x: f64, _y: f64) {}

    fn line_to(&mut self, _x: f64, _y: f64) {}

    fn arc(&mut self, _x: f64, _y: f64, _r: f64, _start: f64, _end: f64, _anticlockwise: bool) {
        self.path_arcs += 1;
    }

    fn close_path(&mut self) {}

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill {
            paint: self.state.fill.clone(),
            arcs: self.path_arcs,
            alpha: self.state.alpha,
        });
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke {
            paint: self.state.stroke.clone(),
            arcs: self.path_arcs,
            width: self.state.line_width,
            alpha: self.state.alpha,
            shadow_blur: self.state.shadow_blur,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            font: self.state.font.clone(),
            align: self.state.align,
            paint: self.state.fill.clone(),
        });
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Scale { x, y });
    }
}
