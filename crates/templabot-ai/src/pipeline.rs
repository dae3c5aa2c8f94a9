//! Prediction pipeline: vectorize -> classify -> argmax -> decode.
//!
//! The three stages are traits so the pipeline can run against fakes as well
//! as the loaded artifacts. The decoded label is returned verbatim; JSON
//! validation belongs to whoever displays it.

use tracing::debug;

use crate::error::PredictError;
use crate::store::Artifacts;

/// Text -> fixed-width feature vector.
pub trait Vectorize {
    /// Width of every vector returned by [`Vectorize::transform`].
    fn dim(&self) -> usize;

    fn transform(&self, text: &str) -> Result<Vec<f32>, PredictError>;
}

/// Feature vector -> one score per class.
pub trait Classify {
    fn input_dim(&self) -> usize;

    fn num_classes(&self) -> usize;

    fn forward(&self, features: &[f32]) -> Result<Vec<f32>, PredictError>;
}

/// Class index <-> label string.
pub trait DecodeLabel {
    fn num_classes(&self) -> usize;

    fn inverse_transform(&self, index: usize) -> Result<&str, PredictError>;

    /// Encode path: the class index of a known label.
    fn transform(&self, label: &str) -> Option<usize>;
}

/// Anything that turns a prompt into a decoded label.
///
/// Implemented by [`TemplatePredictor`]; the presentation layer depends only
/// on this trait.
pub trait Predict: Send + Sync {
    fn predict(&self, text: &str) -> Result<String, PredictError>;
}

/// A prediction with the winning class and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_index: usize,
    pub score: f32,
    pub label: String,
}

/// Index of the highest score. Ties go to the lowest index; NaN never wins.
///
/// Returns `None` for an empty slice or one containing only NaN.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Run the full pipeline and keep the winning class index and score.
pub fn predict_detailed<V, C, D>(
    text: &str,
    vectorizer: &V,
    classifier: &C,
    decoder: &D,
) -> Result<Prediction, PredictError>
where
    V: Vectorize + ?Sized,
    C: Classify + ?Sized,
    D: DecodeLabel + ?Sized,
{
    let features = vectorizer.transform(text)?;
    let scores = classifier.forward(&features)?;
    let class_index = argmax(&scores).ok_or_else(|| {
        PredictError::Classification(format!(
            "classifier produced no usable score among {} outputs",
            scores.len()
        ))
    })?;
    let label = decoder.inverse_transform(class_index)?.to_string();
    debug!(class_index, score = scores[class_index], "prediction");
    Ok(Prediction {
        class_index,
        score: scores[class_index],
        label,
    })
}

/// Run the full pipeline and return the decoded label verbatim.
pub fn predict<V, C, D>(
    text: &str,
    vectorizer: &V,
    classifier: &C,
    decoder: &D,
) -> Result<String, PredictError>
where
    V: Vectorize + ?Sized,
    C: Classify + ?Sized,
    D: DecodeLabel + ?Sized,
{
    predict_detailed(text, vectorizer, classifier, decoder).map(|p| p.label)
}

/// Prediction service over one loaded artifact bundle.
#[derive(Clone)]
pub struct TemplatePredictor {
    artifacts: Artifacts,
}

impl TemplatePredictor {
    pub fn new(artifacts: Artifacts) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn predict_detailed(&self, text: &str) -> Result<Prediction, PredictError> {
        predict_detailed(
            text,
            self.artifacts.vectorizer.as_ref(),
            self.artifacts.classifier.as_ref(),
            self.artifacts.decoder.as_ref(),
        )
    }
}

impl Predict for TemplatePredictor {
    fn predict(&self, text: &str) -> Result<String, PredictError> {
        self.predict_detailed(text).map(|p| p.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Emits a fixed vector, or fails when `fail` is set.
    struct FakeVectorizer {
        out: Vec<f32>,
        fail: bool,
    }

    impl Vectorize for FakeVectorizer {
        fn dim(&self) -> usize {
            self.out.len()
        }

        fn transform(&self, _text: &str) -> Result<Vec<f32>, PredictError> {
            if self.fail {
                return Err(PredictError::Vectorization("bad input".into()));
            }
            Ok(self.out.clone())
        }
    }

    /// Returns canned scores after checking the input width.
    struct FakeClassifier {
        width: usize,
        scores: Vec<f32>,
    }

    impl Classify for FakeClassifier {
        fn input_dim(&self) -> usize {
            self.width
        }

        fn num_classes(&self) -> usize {
            self.scores.len()
        }

        fn forward(&self, features: &[f32]) -> Result<Vec<f32>, PredictError> {
            if features.len() != self.width {
                return Err(PredictError::Classification(format!(
                    "expected {} features, got {}",
                    self.width,
                    features.len()
                )));
            }
            Ok(self.scores.clone())
        }
    }

    struct FakeDecoder(Vec<String>);

    impl DecodeLabel for FakeDecoder {
        fn num_classes(&self) -> usize {
            self.0.len()
        }

        fn inverse_transform(&self, index: usize) -> Result<&str, PredictError> {
            self.0
                .get(index)
                .map(String::as_str)
                .ok_or(PredictError::Decode {
                    index,
                    classes: self.0.len(),
                })
        }

        fn transform(&self, label: &str) -> Option<usize> {
            self.0.iter().position(|l| l == label)
        }
    }

    fn labels(n: usize) -> FakeDecoder {
        FakeDecoder((0..n).map(|i| format!(r#"{{"name":"t{i}"}}"#)).collect())
    }

    fn vectorizer(width: usize) -> FakeVectorizer {
        FakeVectorizer {
            out: vec![0.5; width],
            fail: false,
        }
    }

    #[test]
    fn argmax_picks_highest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
    }

    #[test]
    fn argmax_tie_goes_to_lowest_index() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4, 0.1]), Some(1));
        assert_eq!(argmax(&[1.0, 1.0]), Some(0));
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.3, 0.1]), Some(1));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_handles_negative_logits() {
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), Some(1));
    }

    #[test]
    fn predict_returns_decoded_label() {
        let clf = FakeClassifier {
            width: 3,
            scores: vec![0.1, 0.2, 0.7],
        };
        let label = predict("order confirmation please", &vectorizer(3), &clf, &labels(3)).unwrap();
        assert_eq!(label, r#"{"name":"t2"}"#);
    }

    #[test]
    fn predict_is_deterministic() {
        let clf = FakeClassifier {
            width: 2,
            scores: vec![0.6, 0.4],
        };
        let v = vectorizer(2);
        let d = labels(2);
        let a = predict_detailed("same text", &v, &clf, &d).unwrap();
        let b = predict_detailed("same text", &v, &clf, &d).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn predict_does_not_validate_json() {
        let clf = FakeClassifier {
            width: 1,
            scores: vec![1.0],
        };
        let d = FakeDecoder(vec!["plain text label".into()]);
        let label = predict("anything at all", &vectorizer(1), &clf, &d).unwrap();
        assert_eq!(label, "plain text label");
    }

    #[test]
    fn empty_text_is_not_rejected_by_pipeline() {
        let clf = FakeClassifier {
            width: 1,
            scores: vec![1.0],
        };
        assert!(predict("", &vectorizer(1), &clf, &labels(1)).is_ok());
    }

    #[test]
    fn vectorization_error_propagates() {
        let v = FakeVectorizer {
            out: vec![],
            fail: true,
        };
        let clf = FakeClassifier {
            width: 0,
            scores: vec![1.0],
        };
        let err = predict("text", &v, &clf, &labels(1)).unwrap_err();
        assert!(matches!(err, PredictError::Vectorization(_)));
    }

    #[test]
    fn width_mismatch_is_classification_error() {
        let clf = FakeClassifier {
            width: 4,
            scores: vec![1.0],
        };
        let err = predict("text", &vectorizer(3), &clf, &labels(1)).unwrap_err();
        assert!(matches!(err, PredictError::Classification(_)));
    }

    #[test]
    fn empty_scores_are_classification_error() {
        let clf = FakeClassifier {
            width: 1,
            scores: vec![],
        };
        let err = predict("text", &vectorizer(1), &clf, &labels(1)).unwrap_err();
        assert!(matches!(err, PredictError::Classification(_)));
    }

    #[test]
    fn five_classes_four_labels_is_decode_error() {
        let clf = FakeClassifier {
            width: 2,
            scores: vec![0.0, 0.1, 0.1, 0.2, 0.9],
        };
        let err = predict("text", &vectorizer(2), &clf, &labels(4)).unwrap_err();
        match err {
            PredictError::Decode { index, classes } => {
                assert_eq!(index, 4);
                assert_eq!(classes, 4);
            }
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn mismatch_only_fails_on_unmapped_index() {
        // Same 5-vs-4 mismatch, but the winning index is mapped.
        let clf = FakeClassifier {
            width: 2,
            scores: vec![0.9, 0.1, 0.1, 0.2, 0.0],
        };
        assert!(predict("text", &vectorizer(2), &clf, &labels(4)).is_ok());
    }

    #[test]
    fn decoded_label_round_trips_through_encoder() {
        let d = labels(5);
        for i in 0..5 {
            let label = d.inverse_transform(i).unwrap().to_string();
            assert_eq!(d.transform(&label), Some(i));
        }
    }
}
