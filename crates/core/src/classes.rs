//! Detectable object classes exposed by the backend model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Response of `GET /api/detection_classes`.
///
/// `available_classes` maps the class id (a JSON object key, hence a
/// string) to its display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionClasses {
    #[serde(default)]
    pub available_classes: BTreeMap<String, String>,
    #[serde(default)]
    pub current_classes: Vec<u32>,
    #[serde(default)]
    pub current_class_names: Vec<String>,
}

impl DetectionClasses {
    /// Available classes as `(id, name)` pairs in ascending numeric id
    /// order. Keys that are not integers are skipped.
    pub fn options(&self) -> Vec<(u32, &str)> {
        let mut options: Vec<(u32, &str)> = self
            .available_classes
            .iter()
            .filter_map(|(id, name)| id.parse().ok().map(|id| (id, name.as_str())))
            .collect();
        options.sort_by_key(|(id, _)| *id);
        options
    }

    pub fn is_selected(&self, id: u32) -> bool {
        self.current_classes.contains(&id)
    }
}

/// Reject an empty class selection before it reaches the network.
pub fn validate_class_selection(ids: &[u32]) -> Result<(), CoreError> {
    if ids.is_empty() {
        return Err(CoreError::Validation(
            "at least one detection class must be selected".into(),
        ));
    }
    Ok(())
}
