//! Label decoder: maps class indices back to template documents.
//!
//! Loaded from a JSON export of scikit-learn's `LabelEncoder.classes_`.
//! Each class is a template JSON document stored as a string.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{ArtifactError, PredictError};
use crate::pipeline::DecodeLabel;
use crate::store::read_json;

#[derive(Debug, Clone, Deserialize)]
pub struct LabelExport {
    pub classes: Vec<String>,
}

/// Immutable bijection between class indices and labels.
#[derive(Debug)]
pub struct LabelDecoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelDecoder {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let export: LabelExport = read_json(path)?;
        let decoder =
            Self::from_classes(export.classes).map_err(|reason| ArtifactError::invalid(path, reason))?;
        info!(classes = decoder.classes.len(), path = %path.display(), "loaded label decoder");
        Ok(decoder)
    }

    /// Build a decoder, rejecting empty or duplicate class lists.
    pub fn from_classes(classes: Vec<String>) -> Result<Self, String> {
        if classes.is_empty() {
            return Err("no classes".into());
        }
        let mut index = HashMap::with_capacity(classes.len());
        for (i, label) in classes.iter().enumerate() {
            if let Some(prev) = index.insert(label.clone(), i) {
                return Err(format!("classes {prev} and {i} have the same label"));
            }
        }
        Ok(Self { classes, index })
    }

    /// Iterate over `(index, label)` pairs in class order.
    pub fn classes(&self) -> impl Iterator<Item = (usize, &str)> {
        self.classes.iter().map(String::as_str).enumerate()
    }
}

impl DecodeLabel for LabelDecoder {
    fn num_classes(&self) -> usize {
        self.classes.len()
    }

    fn inverse_transform(&self, index: usize) -> Result<&str, PredictError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(PredictError::Decode {
                index,
                classes: self.classes.len(),
            })
    }

    fn transform(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
}
