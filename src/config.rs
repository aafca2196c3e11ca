// config.rs
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::camera::CameraConfig;
use crate::json_loader::{self, LoadError};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Pointer travel from press, in pixels, at which a press becomes a rotate-drag.
    pub click_threshold_px: f32,
    /// Minimum spacing between hover hit-tests.
    pub hover_throttle_secs: f64,
    /// Radians of figure rotation per horizontal pixel dragged.
    pub drag_sensitivity: f32,
    /// Radians per frame while idle with nothing hovered.
    pub auto_rotate_step: f32,
    pub camera: CameraConfig,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            click_threshold_px: 5.0,
            hover_throttle_secs: 0.05,
            drag_sensitivity: 0.01,
            auto_rotate_step: 0.002,
            camera: CameraConfig::default(),
        }
    }
}

pub fn get_app_dir() -> PathBuf {
    let base = if cfg!(target_os = "windows") { std::env::var("APPDATA").ok() }
        else if cfg!(target_os = "macos") { std::env::var("HOME").ok().map(|h| format!("{h}/Library/Application Support")) }
        else                              { std::env::var("HOME").ok().map(|h| format!("{h}/.config")) };
    let mut p = PathBuf::from(base.unwrap_or_else(|| ".".into()));
    p.push("InkZone");
    p
}

pub fn user_config_file() -> PathBuf { get_app_dir().join("selector.json") }

/// Objects merge key by key; anything else in `over` replaces `base`.
fn overlay(base: &mut Value, over: Value) {
    match (base, over) {
        (Value::Object(b), Value::Object(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => overlay(slot, v),
                    None => { b.insert(k, v); }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

impl SelectorConfig {
    /// Embedded `selector.json`, falling back to compiled defaults if it fails to parse.
    pub fn embedded() -> Self {
        json_loader::load("selector.json").unwrap_or_else(|e| {
            warn!("{e}; using built-in selector defaults");
            Self::default()
        })
    }

    /// Embedded `selector.json` overlaid field by field with `path` when it exists.
    /// A broken override is logged and skipped.
    pub fn layered(path: &Path) -> Self {
        if !path.exists() { return Self::embedded(); }
        let layers = json_loader::load::<Value>("selector.json")
            .and_then(|base| Ok((base, json_loader::load_file::<Value>(path)?)))
            .and_then(|(base, over)| Self::from_layers(base, over, &path.display().to_string()));
        match layers {
            Ok(cfg) => { info!(path = %path.display(), "loaded selector config"); cfg }
            Err(e)  => { warn!("{e}; ignoring user config"); Self::embedded() }
        }
    }

    /// `--config` when given, else the per-user file. A missing explicit path is worth a warning.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(p) => {
                if !p.exists() { warn!(path = %p.display(), "config file not found; using defaults"); }
                Self::layered(p)
            }
            None => Self::layered(&user_config_file()),
        }
    }

    fn from_layers(mut base: Value, over: Value, name: &str) -> Result<Self, LoadError> {
        overlay(&mut base, over);
        serde_json::from_value(base).map_err(|source| LoadError::Parse { name: name.to_string(), source })
    }

    /// Values outside a usable range are clamped rather than rejected.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !(self.click_threshold_px.is_finite() && self.click_threshold_px >= 0.0) { self.click_threshold_px = d.click_threshold_px; }
        if !(self.hover_throttle_secs.is_finite() && self.hover_throttle_secs >= 0.0) { self.hover_throttle_secs = d.hover_throttle_secs; }
        if !self.drag_sensitivity.is_finite() { self.drag_sensitivity = d.drag_sensitivity; }
        if !self.auto_rotate_step.is_finite() { self.auto_rotate_step = d.auto_rotate_step; }
        self.camera.fov_y_degrees = if self.camera.fov_y_degrees.is_finite() {
            self.camera.fov_y_degrees.clamp(10.0, 120.0)
        } else { d.camera.fov_y_degrees };
        self
    }
}
