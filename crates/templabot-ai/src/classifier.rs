//! Classifier backends behind one [`Classify`] implementation.
//!
//! A `.onnx` path selects ONNX Runtime (feature `onnx`); anything else is read
//! as a JSON dense-network export.

use std::path::Path;

use tracing::info;

use crate::error::{ArtifactError, PredictError};
use crate::network::{DenseNetwork, NetworkExport};
use crate::pipeline::Classify;
use crate::store::read_json;

#[cfg(feature = "onnx")]
use crate::onnx::OnnxClassifier;

/// A loaded classifier.
pub enum ClassifierModel {
    Dense(DenseNetwork),
    #[cfg(feature = "onnx")]
    Onnx(OnnxClassifier),
}

impl ClassifierModel {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if is_onnx(path) {
            return load_onnx(path);
        }

        let export: NetworkExport = read_json(path)?;
        let network =
            DenseNetwork::from_export(export).map_err(|reason| ArtifactError::invalid(path, reason))?;
        info!(
            input_dim = network.input_dim(),
            classes = network.num_classes(),
            layers = network.depth(),
            path = %path.display(),
            "loaded dense classifier"
        );
        Ok(Self::Dense(network))
    }

    /// Short backend name for diagnostics.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Dense(_) => "dense",
            #[cfg(feature = "onnx")]
            Self::Onnx(_) => "onnx",
        }
    }
}

fn is_onnx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("onnx"))
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<ClassifierModel, ArtifactError> {
    OnnxClassifier::load(path).map(ClassifierModel::Onnx)
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<ClassifierModel, ArtifactError> {
    Err(ArtifactError::Unsupported {
        path: path.to_path_buf(),
        reason: "ONNX models need the `onnx` feature".into(),
    })
}

impl Classify for ClassifierModel {
    fn input_dim(&self) -> usize {
        match self {
            Self::Dense(n) => n.input_dim(),
            #[cfg(feature = "onnx")]
            Self::Onnx(m) => m.input_dim(),
        }
    }

    fn num_classes(&self) -> usize {
        match self {
            Self::Dense(n) => n.num_classes(),
            #[cfg(feature = "onnx")]
            Self::Onnx(m) => m.num_classes(),
        }
    }

    fn forward(&self, features: &[f32]) -> Result<Vec<f32>, PredictError> {
        match self {
            Self::Dense(n) => n.forward(features),
            #[cfg(feature = "onnx")]
            Self::Onnx(m) => m.forward(features),
        }
    }
}
