//! Load-once store for the three pretrained artifacts.
//!
//! Each artifact is read from disk on first access and shared as an `Arc`
//! afterwards. First access is serialized per artifact, so concurrent callers
//! never trigger a second load.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::classifier::ClassifierModel;
use crate::error::ArtifactError;
use crate::labels::LabelDecoder;
use crate::pipeline::{Classify, DecodeLabel, Vectorize};
use crate::vectorizer::TfidfVectorizer;

pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
pub const CLASSIFIER_FILE: &str = "neural_network_model.json";
pub const LABELS_FILE: &str = "label_encoder.json";

/// Where each artifact lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
    pub labels: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside one model directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            vectorizer: dir.join(VECTORIZER_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
            labels: dir.join(LABELS_FILE),
        }
    }
}

/// The loaded artifacts, shared read-only.
#[derive(Clone)]
pub struct Artifacts {
    pub vectorizer: Arc<TfidfVectorizer>,
    pub classifier: Arc<ClassifierModel>,
    pub decoder: Arc<LabelDecoder>,
}

impl Artifacts {
    /// Mismatches between artifacts that will fail some predictions.
    ///
    /// These are not load errors: a width mismatch fails every prediction with
    /// a classification error, a class-count mismatch fails only predictions
    /// that land on an unmapped index.
    pub fn consistency_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let features = self.vectorizer.dim();
        let inputs = self.classifier.input_dim();
        if inputs != 0 && features != inputs {
            warnings.push(format!(
                "vectorizer emits {features} features but the classifier expects {inputs}"
            ));
        }

        let outputs = self.classifier.num_classes();
        let labels = self.decoder.num_classes();
        if outputs != 0 && outputs != labels {
            warnings.push(format!(
                "classifier scores {outputs} classes but the decoder knows {labels}"
            ));
        }

        warnings
    }
}

/// One lazily loaded artifact.
struct Slot<T> {
    cell: OnceLock<Arc<T>>,
    init: Mutex<()>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    fn get_or_load(
        &self,
        load: impl FnOnce() -> Result<T, ArtifactError>,
    ) -> Result<Arc<T>, ArtifactError> {
        if let Some(v) = self.cell.get() {
            return Ok(Arc::clone(v));
        }
        // A failed load leaves the slot empty; the next caller retries it.
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(v) = self.cell.get() {
            return Ok(Arc::clone(v));
        }
        let value = Arc::new(load()?);
        Ok(Arc::clone(self.cell.get_or_init(|| value)))
    }
}

/// Memoizing accessor for the vectorizer, classifier and label decoder.
pub struct ArtifactStore {
    paths: ArtifactPaths,
    vectorizer: Slot<TfidfVectorizer>,
    classifier: Slot<ClassifierModel>,
    decoder: Slot<LabelDecoder>,
    loads: AtomicUsize,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            vectorizer: Slot::new(),
            classifier: Slot::new(),
            decoder: Slot::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn get_vectorizer(&self) -> Result<Arc<TfidfVectorizer>, ArtifactError> {
        self.vectorizer.get_or_load(|| {
            self.loads.fetch_add(1, Ordering::Relaxed);
            TfidfVectorizer::load(&self.paths.vectorizer)
        })
    }

    pub fn get_classifier(&self) -> Result<Arc<ClassifierModel>, ArtifactError> {
        self.classifier.get_or_load(|| {
            self.loads.fetch_add(1, Ordering::Relaxed);
            ClassifierModel::load(&self.paths.classifier)
        })
    }

    pub fn get_label_decoder(&self) -> Result<Arc<LabelDecoder>, ArtifactError> {
        self.decoder.get_or_load(|| {
            self.loads.fetch_add(1, Ordering::Relaxed);
            LabelDecoder::load(&self.paths.labels)
        })
    }

    /// Load (or fetch) all three artifacts and log any mismatch between them.
    pub fn load_all(&self) -> Result<Artifacts, ArtifactError> {
        let artifacts = Artifacts {
            vectorizer: self.get_vectorizer()?,
            classifier: self.get_classifier()?,
            decoder: self.get_label_decoder()?,
        };
        for warning in artifacts.consistency_warnings() {
            warn!("{warning}");
        }
        info!(loads = self.load_count(), "artifacts ready");
        Ok(artifacts)
    }

    /// Number of artifact reads from disk so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

/// Read and deserialize one JSON artifact.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
