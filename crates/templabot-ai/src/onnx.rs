//! ONNX Runtime backend for classifiers exported with `tf2onnx`.
//!
//! The model must take one `[batch, features]` float input and produce one
//! `[batch, classes]` float output.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::error::{ArtifactError, PredictError};

pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    input_dim: usize,
    num_classes: usize,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let onnx_err = |e: ort::Error| ArtifactError::invalid(path, format!("onnx: {e}"));

        let session = Session::builder()
            .map_err(onnx_err)?
            .commit_from_file(path)
            .map_err(onnx_err)?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| ArtifactError::invalid(path, "model has no inputs"))?;
        let input_name = input.name().to_string();
        let input_dim = last_dim(input.dtype()).unwrap_or(0);
        let num_classes = session
            .outputs()
            .first()
            .and_then(|o| last_dim(o.dtype()))
            .unwrap_or(0);

        info!(input_dim, num_classes, model = %path.display(), "loaded onnx classifier");
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            input_dim,
            num_classes,
        })
    }

    /// Feature width declared by the model, or 0 when it is dynamic.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Class count declared by the model, or 0 when it is dynamic.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn forward(&self, features: &[f32]) -> Result<Vec<f32>, PredictError> {
        if self.input_dim != 0 && features.len() != self.input_dim {
            return Err(PredictError::Classification(format!(
                "model expects {} features, got {}",
                self.input_dim,
                features.len()
            )));
        }
        let ort_err = |e: ort::Error| PredictError::Classification(e.to_string());

        let shape = [1i64, features.len() as i64];
        let tensor =
            Tensor::from_array((shape, features.to_vec().into_boxed_slice())).map_err(ort_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictError::Classification("onnx session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(ort_err)?;
        let (_, scores) = outputs[0].try_extract_tensor::<f32>().map_err(ort_err)?;
        Ok(scores.to_vec())
    }
}

fn last_dim(value_type: &ort::value::ValueType) -> Option<usize> {
    match value_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
