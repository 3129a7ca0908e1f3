//! The classifier contract (spec §9): "Expose a narrow contract:
//! `classify(tokens, target_class) -> probability ∈ [0,1]`. The CNN
//! implementation is external; the core only depends on this contract
//! and a fixed tokenizer."
//!
//! The trained CNN weights themselves are an external collaborator
//! (spec §1) — this crate ships the trait plus a deterministic
//! signature-scoring stand-in so the scheduler, and anything that tests
//! it, does not depend on a real model artifact being present.

use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("unknown classification: {0} (expected one of the configured signatures)")]
    UnknownClass(String),
}

/// Narrow contract a real CNN (or any other model) satisfies (spec §9).
pub trait Classifier: Send + Sync {
    /// Probability that `tokens` belong to `target_class`, in `[0,1]`.
    fn classify(&self, tokens: &[String], target_class: &str) -> Result<f64, ClassifyError>;
}

/// Deterministic stand-in for the external CNN (spec.md §1 excludes
/// "the CNN text classifier weights"; SPEC_FULL.md §7 calls for a
/// stub that satisfies the trait). Scores each configured signature by
/// how many tokens contain that signature's name as a substring, then
/// softmaxes the counts into a probability distribution — a crude but
/// deterministic proxy for the trained classifier's job, with the same
/// tokenizer and contract a real model would use.
pub struct SignatureClassifier {
    signatures: Vec<String>,
}

impl SignatureClassifier {
    pub fn new(signatures: Vec<String>) -> Self {
        Self { signatures }
    }

    fn score(&self, tokens: &[String], signature: &str) -> f64 {
        let needle = signature.to_lowercase();
        if needle.is_empty() {
            return 0.0;
        }
        tokens.iter().filter(|t| t.contains(&needle)).count() as f64
    }
}

impl Classifier for SignatureClassifier {
    fn classify(&self, tokens: &[String], target_class: &str) -> Result<f64, ClassifyError> {
        let target_index = self
            .signatures
            .iter()
            .position(|s| s == target_class)
            .ok_or_else(|| ClassifyError::UnknownClass(target_class.to_string()))?;

        let scores: Vec<f64> = self.signatures.iter().map(|s| self.score(tokens, s)).collect();
        let probs = softmax(&scores);
        Ok(probs[target_index])
    }
}

/// Numerically stable softmax over a small fixed-size score vector.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// A file-backed alternative that scores signatures by a fixed
/// `class -> keyword weights` table loaded from JSON, for operators who
/// have hand-tuned keyword weights without a trained model on hand.
/// Falls back to [`SignatureClassifier`]'s uniform scoring for any
/// signature absent from the table.
pub struct WeightedKeywordClassifier {
    signatures: Vec<String>,
    weights: HashMap<String, HashMap<String, f64>>,
}

impl WeightedKeywordClassifier {
    pub fn from_json(signatures: Vec<String>, json: &str) -> serde_json::Result<Self> {
        let weights = serde_json::from_str(json)?;
        Ok(Self { signatures, weights })
    }

    fn score(&self, tokens: &[String], signature: &str) -> f64 {
        let Some(table) = self.weights.get(signature) else {
            return 0.0;
        };
        tokens.iter().filter_map(|t| table.get(t)).sum()
    }
}

impl Classifier for WeightedKeywordClassifier {
    fn classify(&self, tokens: &[String], target_class: &str) -> Result<f64, ClassifyError> {
        let target_index = self
            .signatures
            .iter()
            .position(|s| s == target_class)
            .ok_or_else(|| ClassifyError::UnknownClass(target_class.to_string()))?;

        let scores: Vec<f64> = self.signatures.iter().map(|s| self.score(tokens, s)).collect();
        let probs = softmax(&scores);
        Ok(probs[target_index])
    }
}

/// Resolve the configured classifier, preferring a keyword-weights file
/// at `checkpoint_path` and falling back to the uniform signature stub
/// when no path is configured or the file does not parse (spec.md §9:
/// "a deterministic `SignatureClassifier` stub ... loaded when no real
/// model path resolves").
pub fn load_classifier(
    checkpoint_path: Option<&std::path::Path>,
    signatures: Vec<String>,
) -> Box<dyn Classifier> {
    if let Some(path) = checkpoint_path {
        match std::fs::read_to_string(path) {
            Ok(json) => match WeightedKeywordClassifier::from_json(signatures.clone(), &json) {
                Ok(clf) => {
                    tracing::info!(path = %path.display(), "loaded keyword-weights classifier");
                    return Box::new(clf);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "classifier checkpoint did not parse, falling back to signature stub");
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "classifier checkpoint not found, falling back to signature stub");
            }
        }
    }
    Box::new(SignatureClassifier::new(signatures))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_target_class_is_rejected() {
        let clf = SignatureClassifier::new(vec!["benign".into(), "wmi".into()]);
        let err = clf.classify(&[], "unknown").unwrap_err();
        assert!(matches!(err, ClassifyError::UnknownClass(_)));
    }

    #[test]
    fn uniform_distribution_when_no_tokens_match() {
        let clf = SignatureClassifier::new(vec!["benign".into(), "wmi".into(), "com".into()]);
        let p = clf.classify(&["syscall".into()], "benign").unwrap();
        assert!((p - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn probability_is_always_in_unit_interval() {
        let clf = SignatureClassifier::new(vec!["benign".into(), "wmi".into()]);
        let tokens: Vec<String> = vec!["wmi".into(); 50];
        let p = clf.classify(&tokens, "wmi").unwrap();
        assert!(p > 0.5 && p <= 1.0);
    }

    #[test]
    fn matching_tokens_raise_target_probability() {
        let clf = SignatureClassifier::new(vec!["benign".into(), "wmi".into()]);
        let no_match = clf.classify(&["syscall".into()], "wmi").unwrap();
        let with_match = clf.classify(&["wmiprvse".into(), "wmi".into()], "wmi").unwrap();
        assert!(with_match > no_match);
    }

    #[test]
    fn weighted_keyword_classifier_loads_from_json() {
        let json = r#"{"benign": {"exit": 0.1}, "wmi": {"wmiprvse": 2.0}}"#;
        let clf = WeightedKeywordClassifier::from_json(vec!["benign".into(), "wmi".into()], json).unwrap();
        let tokens = vec!["wmiprvse".to_string(), "success".to_string()];
        let p_wmi = clf.classify(&tokens, "wmi").unwrap();
        let p_benign = clf.classify(&tokens, "benign").unwrap();
        assert!(p_wmi > p_benign);
    }

    #[test]
    fn load_classifier_falls_back_when_path_missing() {
        let clf = load_classifier(
            Some(std::path::Path::new("/nonexistent/checkpoint.json")),
            vec!["benign".into(), "wmi".into()],
        );
        assert!(clf.classify(&[], "benign").is_ok());
    }

    #[test]
    fn load_classifier_uses_stub_when_no_path_given() {
        let clf = load_classifier(None, vec!["benign".into()]);
        assert!((clf.classify(&[], "benign").unwrap() - 1.0).abs() < 1e-9);
    }
}
