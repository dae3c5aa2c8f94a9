//! Template classification: TF-IDF vectorizer, dense network and label
//! decoder, loaded once and composed into a prediction pipeline.

mod classifier;
mod error;
mod labels;
mod network;
#[cfg(feature = "onnx")]
mod onnx;
pub mod pipeline;
mod store;
mod vectorizer;

pub use classifier::ClassifierModel;
pub use error::{ArtifactError, PredictError};
pub use labels::{LabelDecoder, LabelExport};
pub use network::{Activation, DenseNetwork, LayerExport, NetworkExport};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
pub use pipeline::{
    Classify, DecodeLabel, Predict, Prediction, TemplatePredictor, Vectorize, argmax, predict,
    predict_detailed,
};
pub use store::{
    ArtifactPaths, ArtifactStore, Artifacts, CLASSIFIER_FILE, LABELS_FILE, VECTORIZER_FILE,
};
pub use vectorizer::{DEFAULT_TOKEN_PATTERN, Norm, TfidfExport, TfidfVectorizer};
