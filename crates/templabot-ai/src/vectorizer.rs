//! TF-IDF text vectorizer, loaded from a JSON export of a fitted
//! scikit-learn `TfidfVectorizer`.
//!
//! Reproduces `transform` for the word analyzer: lowercase, regex
//! tokenization, stop-word removal, word n-grams, vocabulary counts, then
//! tf scaling, idf weighting and normalization.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::error::{ArtifactError, PredictError};
use crate::pipeline::Vectorize;
use crate::store::read_json;

/// scikit-learn's default `token_pattern`.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk form of a fitted vectorizer. Omitted fields take scikit-learn's
/// defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfExport {
    pub vocabulary: HashMap<String, usize>,
    #[serde(default)]
    pub idf: Option<Vec<f32>>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
    /// `null` disables normalization; a missing field means `l2`.
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default = "default_true")]
    pub use_idf: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub binary: bool,
    #[serde(default = "default_analyzer")]
    pub analyzer: String,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_analyzer() -> String {
    "word".to_string()
}

/// A fitted, immutable TF-IDF vectorizer.
#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f32>>,
    lowercase: bool,
    token_re: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    norm: Option<Norm>,
    sublinear_tf: bool,
    binary: bool,
}

impl TfidfVectorizer {
    /// Load a vectorizer export from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let export: TfidfExport = read_json(path)?;
        let vectorizer =
            Self::from_export(export).map_err(|reason| ArtifactError::invalid(path, reason))?;
        info!(
            dim = vectorizer.dim(),
            ngram_min = vectorizer.ngram_range.0,
            ngram_max = vectorizer.ngram_range.1,
            path = %path.display(),
            "loaded tf-idf vectorizer"
        );
        Ok(vectorizer)
    }

    /// Validate an export and build the vectorizer.
    pub fn from_export(export: TfidfExport) -> Result<Self, String> {
        if export.analyzer != "word" {
            return Err(format!(
                "analyzer '{}' is not supported, only 'word'",
                export.analyzer
            ));
        }
        if export.vocabulary.is_empty() {
            return Err("empty vocabulary".into());
        }

        // Indices must be a permutation of 0..len.
        let dim = export.vocabulary.len();
        let mut seen = vec![false; dim];
        for (term, &idx) in &export.vocabulary {
            if idx >= dim {
                return Err(format!("term '{term}' has index {idx} outside 0..{dim}"));
            }
            if std::mem::replace(&mut seen[idx], true) {
                return Err(format!("index {idx} is assigned to more than one term"));
            }
        }

        let idf = if export.use_idf {
            let idf = export
                .idf
                .ok_or_else(|| "use_idf is set but no idf weights are present".to_string())?;
            if idf.len() != dim {
                return Err(format!(
                    "idf has {} weights for a vocabulary of {dim}",
                    idf.len()
                ));
            }
            Some(idf)
        } else {
            None
        };

        let (min_n, max_n) = export.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }

        let token_re = Regex::new(&export.token_pattern)
            .map_err(|e| format!("bad token_pattern: {e}"))?;
        if token_re.captures_len() > 2 {
            return Err("token_pattern has more than one capturing group".into());
        }

        Ok(Self {
            vocabulary: export.vocabulary,
            idf,
            lowercase: export.lowercase,
            token_re,
            ngram_range: export.ngram_range,
            stop_words: export.stop_words.unwrap_or_default().into_iter().collect(),
            norm: export.norm,
            sublinear_tf: export.sublinear_tf,
            binary: export.binary,
        })
    }

    /// Split a document into analyzed terms (tokens and n-grams).
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let doc = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        // With one capturing group the group is the token, as in `re.findall`.
        let tokens: Vec<&str> = if self.token_re.captures_len() == 2 {
            self.token_re
                .captures_iter(&doc)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect()
        } else {
            self.token_re.find_iter(&doc).map(|m| m.as_str()).collect()
        };
        let tokens: Vec<&str> = tokens
            .into_iter()
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

impl Vectorize for TfidfVectorizer {
    fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    fn transform(&self, text: &str) -> Result<Vec<f32>, PredictError> {
        let mut features = vec![0.0f32; self.dim()];
        for term in self.analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                features[idx] += 1.0;
            }
        }

        for (i, x) in features.iter_mut().enumerate() {
            if *x == 0.0 {
                continue;
            }
            if self.binary {
                *x = 1.0;
            }
            if self.sublinear_tf {
                *x = 1.0 + x.ln();
            }
            if let Some(idf) = &self.idf {
                *x *= idf[i];
            }
        }

        match self.norm {
            Some(Norm::L2) => {
                let norm = features.iter().map(|x| x * x).sum::<f32>().sqrt();
                scale(&mut features, norm);
            }
            Some(Norm::L1) => {
                let norm = features.iter().map(|x| x.abs()).sum::<f32>();
                scale(&mut features, norm);
            }
            None => {}
        }

        if features.iter().any(|x| !x.is_finite()) {
            return Err(PredictError::Vectorization(
                "feature vector contains non-finite values".into(),
            ));
        }
        Ok(features)
    }
}

fn scale(v: &mut [f32], norm: f32) {
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
