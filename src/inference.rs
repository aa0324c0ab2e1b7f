//! Anomaly classification over a meter's rolling window.
//!
//! No trained model ships with the service yet; the default classifier flips
//! a fair coin. Swapping in a real model means implementing
//! [`AnomalyClassifier`] and wiring it through [`build_classifier`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Produces an anomaly verdict for a window of power values (oldest first).
pub trait AnomalyClassifier: Send + Sync {
    fn classify(&self, values: &[f64]) -> bool;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}

/// Placeholder classifier: uniformly random verdict.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomClassifier;

impl AnomalyClassifier for RandomClassifier {
    fn classify(&self, _values: &[f64]) -> bool {
        rand::thread_rng().gen_bool(0.5)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Always returns the same verdict.
#[derive(Debug, Clone, Copy)]
pub struct ConstantClassifier(pub bool);

impl AnomalyClassifier for ConstantClassifier {
    fn classify(&self, _values: &[f64]) -> bool {
        self.0
    }

    fn name(&self) -> &'static str {
        if self.0 {
            "always"
        } else {
            "never"
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Random,
    Always,
    Never,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::Random => "random",
            ClassifierKind::Always => "always",
            ClassifierKind::Never => "never",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown classifier '{0}'")]
pub struct UnknownClassifier(pub String);

impl FromStr for ClassifierKind {
    type Err = UnknownClassifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(ClassifierKind::Random),
            "always" => Ok(ClassifierKind::Always),
            "never" => Ok(ClassifierKind::Never),
            other => Err(UnknownClassifier(other.to_string())),
        }
    }
}

pub fn build_classifier(kind: ClassifierKind) -> Arc<dyn AnomalyClassifier> {
    match kind {
        ClassifierKind::Random => Arc::new(RandomClassifier),
        ClassifierKind::Always => Arc::new(ConstantClassifier(true)),
        ClassifierKind::Never => Arc::new(ConstantClassifier(false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("random", ClassifierKind::Random)]
    #[case("ALWAYS", ClassifierKind::Always)]
    #[case(" never ", ClassifierKind::Never)]
    fn parses_classifier_kind(#[case] raw: &str, #[case] expected: ClassifierKind) {
        assert_eq!(raw.parse::<ClassifierKind>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "isolation-forest".parse::<ClassifierKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown classifier 'isolation-forest'");
    }

    #[test]
    fn constant_classifier_ignores_input() {
        let flagging = build_classifier(ClassifierKind::Always);
        let quiet = build_classifier(ClassifierKind::Never);
        for window in [&[][..], &[1.0][..], &[0.5, 900.0, 3.2][..]] {
            assert!(flagging.classify(window));
            assert!(!quiet.classify(window));
        }
        assert_eq!(flagging.name(), "always");
        assert_eq!(quiet.name(), "never");
    }

    #[test]
    fn random_classifier_produces_both_verdicts() {
        let classifier = RandomClassifier;
        let values = [1.0, 2.0, 3.0];
        let flagged = (0..400).filter(|_| classifier.classify(&values)).count();
        // probability of missing either side over 400 fair draws is ~2^-399
        assert!(flagged > 0 && flagged < 400);
    }
}
