//! Named curve presets and their persisted JSON form.
//!
//! The library is stored as one JSON object keyed by preset name:
//!
//! ```text
//! { "Bone": { "x": [0.0, 200.0, 255.0],
//!             "y": [0.0, 0.8, 1.0],
//!             "colors": [[1,1,1], [1,1,0.8], [1,1,0.8]] } }
//! ```
//!
//! Loading is tolerant per entry: a malformed entry is logged and skipped and
//! the rest still load.

use crate::curve::ControlPoint;
use crate::Rgb;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Name preferred by [`PresetLibrary::initial_points`].
pub const DEFAULT_PRESET: &str = "Default";

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("Malformed preset document: {0}")]
    Malformed(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No preset named '{0}'")]
    NotFound(String),
}

/// One persisted preset: parallel arrays of positions, opacities and colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRecord {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub colors: Vec<[f32; 3]>,
}

impl PresetRecord {
    pub fn from_points(points: &[ControlPoint]) -> Self {
        Self {
            x: points.iter().map(|p| p.position).collect(),
            y: points.iter().map(|p| p.opacity).collect(),
            colors: points.iter().map(|p| p.color.to_array()).collect(),
        }
    }

    /// Validate and convert into control points.
    pub fn to_points(&self) -> Result<Vec<ControlPoint>, String> {
        if self.x.len() != self.y.len() || self.x.len() != self.colors.len() {
            return Err(format!(
                "length mismatch (x: {}, y: {}, colors: {})",
                self.x.len(),
                self.y.len(),
                self.colors.len()
            ));
        }
        if self.x.is_empty() {
            return Err("no points".to_string());
        }
        let finite = self
            .x
            .iter()
            .chain(&self.y)
            .chain(self.colors.iter().flatten())
            .all(|v| v.is_finite());
        if !finite {
            return Err("non-finite value".to_string());
        }

        Ok(self
            .x
            .iter()
            .zip(&self.y)
            .zip(&self.colors)
            .map(|((&x, &y), &c)| ControlPoint::new(x, y, Rgb::from_array(c)))
            .collect())
    }
}

/// Named curve presets, ordered by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PresetLibrary {
    presets: BTreeMap<String, Vec<ControlPoint>>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a library document.
    ///
    /// # Errors
    /// Fails only when the text is not JSON or the top level is not an
    /// object. Individual bad entries are skipped with a warning.
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(entries) = value else {
            return Err(PresetError::Malformed(
                "top level is not an object".to_string(),
            ));
        };

        let mut library = Self::new();
        let total = entries.len();
        for (name, entry) in entries {
            let points = serde_json::from_value::<PresetRecord>(entry)
                .map_err(|e| e.to_string())
                .and_then(|record| record.to_points());
            match points {
                Ok(points) => {
                    library.presets.insert(name, points);
                }
                Err(reason) => log::warn!("skipping preset '{}': {}", name, reason),
            }
        }

        log::debug!("loaded {}/{} presets", library.len(), total);
        Ok(library)
    }

    /// Serialize the whole library as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PresetError> {
        let records: BTreeMap<&str, PresetRecord> = self
            .presets
            .iter()
            .map(|(name, points)| (name.as_str(), PresetRecord::from_points(points)))
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Add or replace a preset.
    pub fn insert(&mut self, name: impl Into<String>, points: Vec<ControlPoint>) {
        self.presets.insert(name.into(), points);
    }

    pub fn get(&self, name: &str) -> Option<&[ControlPoint]> {
        self.presets.get(name).map(Vec::as_slice)
    }

    pub fn remove(&mut self, name: &str) -> Result<Vec<ControlPoint>, PresetError> {
        self.presets
            .remove(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Merge another library in; entries with the same name are replaced.
    pub fn merge(&mut self, other: PresetLibrary) -> usize {
        let count = other.presets.len();
        self.presets.extend(other.presets);
        count
    }

    /// Points to start a session with: the `"Default"` preset if present,
    /// otherwise the first preset by name.
    pub fn initial_points(&self) -> Option<&[ControlPoint]> {
        self.get(DEFAULT_PRESET)
            .or_else(|| self.presets.values().next().map(Vec::as_slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "Bone": { "x": [0, 200, 255], "y": [0, 0.8, 1], "colors": [[1,1,1],[1,1,0.8],[1,1,0.8]] },
        "Broken": { "x": [0, 255], "y": [0], "colors": [[1,1,1],[1,1,1]] },
        "Words": { "x": ["a"], "y": [0], "colors": [[1,1,1]] },
        "ShortColor": { "x": [0], "y": [0], "colors": [[1,1]] },
        "Soft": { "x": [0, 255], "y": [0.1, 0.4], "colors": [[1,0,0],[0,0,1]] }
    }"#;

    #[test]
    fn test_malformed_entries_skipped() {
        let lib = PresetLibrary::from_json(DOC).unwrap();
        assert_eq!(lib.names(), vec!["Bone", "Soft"]);
        let bone = lib.get("Bone").unwrap();
        assert_eq!(bone.len(), 3);
        assert_eq!(bone[1].color.to_array(), [1.0, 1.0, 0.8]);
    }

    #[test]
    fn test_non_object_document() {
        assert!(matches!(
            PresetLibrary::from_json("[1, 2, 3]"),
            Err(PresetError::Malformed(_))
        ));
        assert!(matches!(
            PresetLibrary::from_json("{not json"),
            Err(PresetError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let lib = PresetLibrary::from_json(DOC).unwrap();
        let text = lib.to_json().unwrap();
        let back = PresetLibrary::from_json(&text).unwrap();
        assert_eq!(back, lib);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["Soft"]["colors"][1][2], 1.0);
    }

    #[test]
    fn test_initial_points_prefers_default() {
        let mut lib = PresetLibrary::from_json(DOC).unwrap();
        assert_eq!(lib.initial_points().map(|p| p.len()), Some(3));

        lib.insert(DEFAULT_PRESET, vec![ControlPoint::white(0.0, 0.5)]);
        assert_eq!(lib.initial_points().map(|p| p[0].opacity), Some(0.5));
        assert!(PresetLibrary::new().initial_points().is_none());
    }

    #[test]
    fn test_remove_and_merge() {
        let mut lib = PresetLibrary::from_json(DOC).unwrap();
        assert!(lib.remove("Bone").is_ok());
        assert!(matches!(lib.remove("Bone"), Err(PresetError::NotFound(_))));

        let mut other = PresetLibrary::new();
        other.insert("Soft", vec![ControlPoint::white(0.0, 1.0)]);
        other.insert("New", vec![ControlPoint::white(0.0, 1.0)]);
        assert_eq!(lib.merge(other), 2);
        assert_eq!(lib.names(), vec!["New", "Soft"]);
        assert_eq!(lib.get("Soft").map(|p| p.len()), Some(1));
    }

    #[test]
    fn test_record_validation() {
        let record = PresetRecord {
            x: vec![0.0, f32::NAN],
            y: vec![0.0, 1.0],
            colors: vec![[1.0; 3], [1.0; 3]],
        };
        assert!(record.to_points().is_err());

        let empty = PresetRecord {
            x: vec![],
            y: vec![],
            colors: vec![],
        };
        assert!(empty.to_points().is_err());
    }
}
