//! View configuration. Every record deserializes from partial JSON; missing
//! fields keep their defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::bodies::BodySpec;

#[derive(Debug)]
pub enum ConfigError {
    InvalidJson(String),
    InvalidValue { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidJson(e) => write!(f, "invalid config JSON: {e}"),
            ConfigError::InvalidValue { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Base disc radius is `min(width, height) / radius_divisor`.
    pub radius_divisor: f64,
    /// Zoom limits as multiples of the base radius.
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Degrees of rotation per pixel of drag.
    pub drag_sensitivity: f64,
    /// Latitude tilt is clamped to `[-tilt_limit_deg, tilt_limit_deg]`.
    pub tilt_limit_deg: f64,
    pub auto_rotate: bool,
    /// Degrees of yaw per painted frame while auto-rotating.
    pub auto_step_deg: f64,
    pub start_yaw_deg: f64,
    pub start_pitch_deg: f64,
    /// Delay before auto-rotation resumes after a drag. `None` leaves it off
    /// until toggled back on.
    pub resume_delay_ms: Option<f64>,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    /// Wheel events within `scale * wheel_tolerance` of the center count.
    pub wheel_tolerance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::earth()
    }
}

impl CameraConfig {
    pub fn earth() -> Self {
        Self {
            radius_divisor: 2.3,
            min_zoom: 0.5,
            max_zoom: 2.5,
            drag_sensitivity: 0.25,
            tilt_limit_deg: 60.0,
            auto_rotate: true,
            auto_step_deg: 0.05,
            start_yaw_deg: 0.0,
            start_pitch_deg: -15.0,
            resume_delay_ms: Some(2000.0),
            zoom_in_factor: 1.06,
            zoom_out_factor: 0.94,
            wheel_tolerance: 1.1,
        }
    }

    pub fn planet(body: &BodySpec) -> Self {
        Self {
            radius_divisor: 2.5,
            min_zoom: 0.75,
            max_zoom: 2.0,
            drag_sensitivity: 0.5,
            tilt_limit_deg: 90.0,
            auto_step_deg: body.spin_step_deg(),
            start_pitch_deg: 0.0,
            resume_delay_ms: None,
            ..Self::earth()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("camera.radius_divisor", self.radius_divisor)?;
        positive("camera.min_zoom", self.min_zoom)?;
        positive("camera.max_zoom", self.max_zoom)?;
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::InvalidValue {
                field: "camera.min_zoom",
                reason: format!("{} exceeds max_zoom {}", self.min_zoom, self.max_zoom),
            });
        }
        positive("camera.zoom_in_factor", self.zoom_in_factor)?;
        positive("camera.zoom_out_factor", self.zoom_out_factor)?;
        positive("camera.wheel_tolerance", self.wheel_tolerance)?;
        if !(0.0..=90.0).contains(&self.tilt_limit_deg) {
            return Err(ConfigError::InvalidValue {
                field: "camera.tilt_limit_deg",
                reason: format!("{} is outside [0, 90]", self.tilt_limit_deg),
            });
        }
        finite("camera.drag_sensitivity", self.drag_sensitivity)?;
        finite("camera.auto_step_deg", self.auto_step_deg)?;
        if let Some(ms) = self.resume_delay_ms {
            if !ms.is_finite() || ms < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "camera.resume_delay_ms",
                    reason: format!("{ms} is not a non-negative duration"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickConfig {
    pub markers_enabled: bool,
    /// Screen-space marker hit radius in CSS pixels.
    pub marker_hit_radius_px: f64,
    /// Markers farther than this fraction of the scale are not pickable.
    pub marker_limb_factor: f64,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            markers_enabled: true,
            marker_hit_radius_px: 12.0,
            marker_limb_factor: 0.98,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub frame_rate_hz: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self { frame_rate_hz: 60.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Fixed lattice spacing in degrees. `None` derives it from the body.
    pub spacing_deg: Option<f64>,
    /// Upper bound on generated dots per body.
    pub max_points: usize,
    /// Seed for procedural colours, the starfield and initial orbit angles.
    pub seed: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            spacing_deg: None,
            max_points: layers::DEFAULT_MAX_POINTS,
            seed: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub camera: CameraConfig,
    pub pick: PickConfig,
    pub pacing: PacingConfig,
    pub surface: SurfaceConfig,
}

impl ViewConfig {
    pub fn earth() -> Self {
        Self::default()
    }

    pub fn planet(body: &BodySpec) -> Self {
        Self {
            camera: CameraConfig::planet(body),
            ..Self::default()
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        Self::from_json_over(payload, &Self::default())
    }

    /// Applies a partial JSON override on top of `base` and validates the result.
    pub fn from_json_over(payload: &str, base: &ViewConfig) -> Result<Self, ConfigError> {
        let patch: Value = serde_json::from_str(payload).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        let mut merged = serde_json::to_value(base).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        merge(&mut merged, patch, "config")?;
        let config: ViewConfig =
            serde_json::from_value(merged).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays `payload` on `base`, keeping `base` when the override is
    /// absent or invalid.
    pub fn from_json_or(payload: Option<&str>, base: ViewConfig) -> Self {
        match payload.map(|p| Self::from_json_over(p, &base)) {
            None => base,
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                warn!(error = %e, "ignoring view config");
                base
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        positive("pick.marker_hit_radius_px", self.pick.marker_hit_radius_px)?;
        positive("pick.marker_limb_factor", self.pick.marker_limb_factor)?;
        positive("pacing.frame_rate_hz", self.pacing.frame_rate_hz)?;
        if let Some(spacing) = self.surface.spacing_deg {
            positive("surface.spacing_deg", spacing)?;
        }
        if self.surface.max_points == 0 {
            return Err(ConfigError::InvalidValue {
                field: "surface.max_points",
                reason: "must be at least 1".to_string(),
            });
        }
        finite("surface.seed", self.surface.seed)
    }
}

/// Deep-merges `patch` into `into`. A record may only be patched by an
/// object; anything else would rebuild it from defaults.
fn merge(into: &mut Value, patch: Value, path: &str) -> Result<(), ConfigError> {
    match (into, patch) {
        (Value::Object(into), Value::Object(patch)) => {
            for (key, value) in patch {
                match into.get_mut(&key) {
                    Some(slot) => merge(slot, value, &format!("{path}.{key}"))?,
                    None => {
                        into.insert(key, value);
                    }
                }
            }
            Ok(())
        }
        (Value::Object(_), patch) => Err(ConfigError::InvalidJson(format!(
            "{path}: expected an object, found {patch}"
        ))),
        (slot, patch) => {
            *slot = patch;
            Ok(())
        }
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("{v} is not a positive number"),
        })
    }
}

fn finite(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("{v} is not finite"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraConfig, ConfigError, ViewConfig};
    use crate::bodies::body;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ViewConfig::from_json_str(r#"{"camera":{"max_zoom":4.0},"pacing":{}}"#).unwrap();
        assert_eq!(config.camera.max_zoom, 4.0);
        assert_eq!(config.camera.min_zoom, 0.5);
        assert_eq!(config.pacing.frame_rate_hz, 60.0);
        assert_eq!(config.pick.marker_hit_radius_px, 12.0);
    }

    #[test]
    fn rejects_inverted_zoom_limits_and_zero_rate() {
        let err = ViewConfig::from_json_str(r#"{"camera":{"min_zoom":3.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "camera.min_zoom", .. }));
        let err = ViewConfig::from_json_str(r#"{"pacing":{"frame_rate_hz":0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "pacing.frame_rate_hz", .. }));
        assert!(matches!(
            ViewConfig::from_json_str("{").unwrap_err(),
            ConfigError::InvalidJson(_)
        ));
    }

    #[test]
    fn invalid_override_falls_back() {
        let fallback = ViewConfig::default();
        let config = ViewConfig::from_json_or(Some(r#"{"camera":{"tilt_limit_deg":120}}"#), fallback.clone());
        assert_eq!(config, fallback);
        assert_eq!(ViewConfig::from_json_or(None, fallback.clone()), fallback);
    }

    #[test]
    fn override_applies_on_top_of_planet_preset() {
        let saturn = body("saturn").unwrap();
        let base = ViewConfig::planet(saturn);
        let config = ViewConfig::from_json_or(Some(r#"{"camera":{"max_zoom":3.0}}"#), base.clone());
        assert_eq!(config.camera.max_zoom, 3.0);
        assert_eq!(config.camera.drag_sensitivity, 0.5);
        assert!(config.camera.resume_delay_ms.is_none());
        assert_eq!(ViewConfig::from_json_or(Some("[]"), base.clone()), base);
    }

    #[test]
    fn records_only_merge_with_objects() {
        let saturn = body("saturn").unwrap();
        let base = ViewConfig::planet(saturn);
        for payload in ["[]", "[{}]", "7", r#"{"camera":[]}"#, r#"{"pacing":null}"#] {
            let err = ViewConfig::from_json_over(payload, &base).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidJson(_)), "{payload}: {err}");
            let config = ViewConfig::from_json_or(Some(payload), base.clone());
            assert_eq!(config.camera.radius_divisor, 2.5);
            assert!(config.camera.resume_delay_ms.is_none());
        }

        let config = ViewConfig::from_json_over(r#"{"surface":{"spacing_deg":null}}"#, &base).unwrap();
        assert_eq!(config.surface.spacing_deg, None);
    }

    #[test]
    fn planet_preset_follows_body() {
        let jupiter = body("jupiter").unwrap();
        let cam = CameraConfig::planet(jupiter);
        assert_eq!(cam.auto_step_deg, 8.0);
        assert_eq!(cam.tilt_limit_deg, 90.0);
        assert_eq!(cam.radius_divisor, 2.5);
        assert!(cam.resume_delay_ms.is_none());
    }
}
