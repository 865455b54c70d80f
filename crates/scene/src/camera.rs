//! Orthographic camera controller: auto-rotation, drag-to-rotate and
//! stepped wheel zoom.
//!
//! The controller has two modes. It auto-rotates by default; a pointer-down
//! on the disc hands control to the user. After pointer-up a [`Cooldown`]
//! hands control back, unless the configuration has no resume delay, in
//! which case auto-rotation stays off until [`CameraController::toggle_auto_rotate`].

use foundation::bounds::Aabb2;
use foundation::math::{Orthographic, Rotation, Vec2, wrap_degrees_360};
use foundation::time::Time;
use runtime::Cooldown;

use crate::config::CameraConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    pointer: Vec2,
    yaw_deg: f64,
    pitch_deg: f64,
}

#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    viewport: Aabb2,
    base_radius: f64,
    zoom: f64,
    yaw_deg: f64,
    pitch_deg: f64,
    auto_enabled: bool,
    /// Set by a drag; cleared when the resume cooldown fires.
    suspended: bool,
    paused: bool,
    drag: Option<DragAnchor>,
    resume: Option<Cooldown>,
}

impl CameraController {
    pub fn new(config: CameraConfig, viewport: Aabb2) -> Self {
        let resume = config.resume_delay_ms.map(Cooldown::from_millis);
        let mut camera = Self {
            viewport,
            base_radius: 0.0,
            zoom: 1.0_f64.clamp(config.min_zoom, config.max_zoom),
            yaw_deg: config.start_yaw_deg,
            pitch_deg: config.start_pitch_deg.clamp(-config.tilt_limit_deg, config.tilt_limit_deg),
            auto_enabled: config.auto_rotate,
            suspended: false,
            paused: false,
            drag: None,
            resume,
            config,
        };
        camera.set_viewport(viewport);
        camera
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Re-centres the disc and recomputes the base radius. The zoom ratio is kept.
    pub fn set_viewport(&mut self, viewport: Aabb2) {
        self.viewport = viewport;
        let min_side = viewport.width().min(viewport.height()).max(0.0);
        self.base_radius = min_side / self.config.radius_divisor;
    }

    pub fn viewport(&self) -> Aabb2 {
        self.viewport
    }

    pub fn base_radius(&self) -> f64 {
        self.base_radius
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Disc radius in pixels.
    pub fn scale(&self) -> f64 {
        self.base_radius * self.zoom
    }

    pub fn center(&self) -> Vec2 {
        self.viewport.center()
    }

    pub fn rotation(&self) -> Rotation {
        Rotation::yaw_pitch(self.yaw_deg, self.pitch_deg)
    }

    pub fn projection(&self) -> Orthographic {
        Orthographic::new(self.rotation(), self.scale(), self.center())
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_enabled && !self.suspended && !self.paused && self.drag.is_none()
    }

    pub fn is_resume_pending(&self) -> bool {
        self.resume.as_ref().is_some_and(Cooldown::is_armed)
    }

    /// True when `p` lies within `tolerance` times the disc radius.
    pub fn on_disc(&self, p: Vec2, tolerance: f64) -> bool {
        let r = self.scale() * tolerance;
        p.distance_squared(self.center()) <= r * r
    }

    /// Starts a drag. Returns `false` (and changes nothing) off the disc.
    pub fn on_pointer_down(&mut self, p: Vec2) -> bool {
        if !self.on_disc(p, 1.0) {
            return false;
        }
        if let Some(resume) = self.resume.as_mut() {
            resume.cancel();
            self.suspended = true;
        } else {
            self.auto_enabled = false;
        }
        self.drag = Some(DragAnchor {
            pointer: p,
            yaw_deg: self.yaw_deg,
            pitch_deg: self.pitch_deg,
        });
        true
    }

    /// Rotates relative to the drag anchor. Returns whether a drag is active.
    pub fn on_pointer_move(&mut self, p: Vec2) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };
        let s = self.config.drag_sensitivity;
        let limit = self.config.tilt_limit_deg;
        self.yaw_deg = wrap_degrees_360(anchor.yaw_deg + (p.x - anchor.pointer.x) * s);
        self.pitch_deg = (anchor.pitch_deg - (p.y - anchor.pointer.y) * s).clamp(-limit, limit);
        true
    }

    /// Ends a drag and schedules the auto-rotate resume.
    pub fn on_pointer_up(&mut self, now: Time) {
        if self.drag.take().is_none() {
            return;
        }
        if let Some(resume) = self.resume.as_mut() {
            resume.arm(now);
        }
    }

    pub fn on_pointer_leave(&mut self, now: Time) {
        self.on_pointer_up(now);
    }

    /// Steps the zoom by a fixed factor. Positive `delta_y` zooms out.
    /// Returns `false` when the wheel is off the disc.
    pub fn on_wheel(&mut self, p: Vec2, delta_y: f64) -> bool {
        if !self.on_disc(p, self.config.wheel_tolerance) {
            return false;
        }
        let factor = if delta_y > 0.0 {
            self.config.zoom_out_factor
        } else {
            self.config.zoom_in_factor
        };
        self.zoom = (self.zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        true
    }

    /// Advances one painted frame. Returns whether the rotation changed.
    pub fn tick(&mut self, now: Time) -> bool {
        if let Some(resume) = self.resume.as_mut() {
            if resume.poll(now) {
                self.suspended = false;
            }
        }
        if !self.is_auto_rotating() {
            return false;
        }
        self.yaw_deg = wrap_degrees_360(self.yaw_deg + self.config.auto_step_deg);
        true
    }

    /// Flips auto-rotation on or off. Returns the new state.
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_enabled = !self.auto_enabled;
        if self.auto_enabled {
            self.suspended = false;
            if let Some(resume) = self.resume.as_mut() {
                resume.cancel();
            }
        }
        self.auto_enabled
    }

    /// Holds auto-rotation while something on the globe is highlighted.
    pub fn set_highlight_pause(&mut self, paused: bool) {
        self.paused = paused;
    }
}
