//! # Editor Configuration
//!
//! Tunables for picking and gizmo interaction. Every field has a default, so a
//! JSON file only needs to mention the values it overrides.
//!
//! ## Usage
//!
//! ```no_run
//! use kelpie::config::EditorConfig;
//!
//! let config = EditorConfig::from_json_str(r#"{ "gizmo": { "rig_size": 1.5 } }"#).unwrap();
//! assert_eq!(config.gizmo.translate_sensitivity, 0.01);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Selection strategy used when the user clicks in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickMode {
    /// Off-screen id pass with single pixel readback. Background clears the selection.
    #[default]
    Color,
    /// CPU ray cast against mesh triangles. A miss leaves the selection untouched.
    Ray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    /// World units per pixel for translate drags.
    pub translate_sensitivity: f32,
    /// Radians per pixel for rotate drags.
    pub rotate_sensitivity: f32,
    /// Scale factor change per pixel for scale drags.
    pub scale_sensitivity: f32,
    /// Lower bound applied to every scale component while dragging.
    pub min_scale: f32,
    /// Multiplier applied to the rig's size after matching the target's average scale.
    pub rig_size: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            translate_sensitivity: 0.01,
            rotate_sensitivity: 0.005,
            scale_sensitivity: 0.01,
            min_scale: 0.01,
            rig_size: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    pub mode: PickMode,
    /// Determinant threshold below which a triangle is treated as parallel or back-facing.
    pub det_epsilon: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            mode: PickMode::default(),
            det_epsilon: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub gizmo: GizmoConfig,
    pub picking: PickingConfig,
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::info!(
            "Loaded editor config from {} (pick mode {:?})",
            path.as_ref().display(),
            config.picking.mode
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.picking.mode, PickMode::Color);
        assert_eq!(config.gizmo.translate_sensitivity, 0.01);
        assert_eq!(config.gizmo.scale_sensitivity, 0.01);
        assert!(config.gizmo.min_scale > 0.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            EditorConfig::from_json_str(r#"{ "picking": { "mode": "ray" }, "gizmo": { "rig_size": 2.0 } }"#)
                .unwrap();
        assert_eq!(config.picking.mode, PickMode::Ray);
        assert_eq!(config.picking.det_epsilon, 1e-6);
        assert_eq!(config.gizmo.rig_size, 2.0);
        assert_eq!(config.gizmo.rotate_sensitivity, 0.005);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = EditorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::EditorError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EditorConfig::load("/definitely/not/here/kelpie.json").unwrap_err();
        assert!(matches!(err, crate::error::EditorError::Io(_)));
    }
}
