use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ComparisonError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "match")]
    Match,
    #[serde(rename = "minor differences")]
    MinorDifferences,
    #[serde(rename = "significant differences")]
    SignificantDifferences,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Match => "match",
            Verdict::MinorDifferences => "minor differences",
            Verdict::SignificantDifferences => "significant differences",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Match => {
                "The candidate image matches the reference closely. It appears to be genuine."
            }
            Verdict::MinorDifferences => {
                "The candidate image is similar to the reference but has some differences. It may have minor changes."
            }
            Verdict::SignificantDifferences => {
                "The candidate image differs significantly from the reference. It is likely tampered."
            }
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an SSIM score to a [`Verdict`]. Both thresholds are exclusive lower bounds.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    match_threshold: f64,
    minor_threshold: f64,
}

impl Classifier {
    pub fn new(match_threshold: f64, minor_threshold: f64) -> Result<Self> {
        if !match_threshold.is_finite() || !minor_threshold.is_finite() {
            return Err(ComparisonError::InvalidParameter(
                "verdict thresholds must be finite".into(),
            ));
        }
        if minor_threshold > match_threshold {
            return Err(ComparisonError::InvalidParameter(format!(
                "minor threshold {} exceeds match threshold {}",
                minor_threshold, match_threshold
            )));
        }

        Ok(Self {
            match_threshold,
            minor_threshold,
        })
    }

    pub fn classify(&self, score: f64) -> Verdict {
        match score {
            s if s > self.match_threshold => Verdict::Match,
            s if s > self.minor_threshold => Verdict::MinorDifferences,
            _ => Verdict::SignificantDifferences,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            match_threshold: 0.95,
            minor_threshold: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(0.950001), Verdict::Match);
        assert_eq!(classifier.classify(0.95), Verdict::MinorDifferences);
        assert_eq!(classifier.classify(0.700001), Verdict::MinorDifferences);
        assert_eq!(classifier.classify(0.70), Verdict::SignificantDifferences);
        assert_eq!(classifier.classify(-1.0), Verdict::SignificantDifferences);
        assert_eq!(classifier.classify(1.0), Verdict::Match);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = Classifier::new(0.5, 0.2).unwrap();
        assert_eq!(classifier.classify(0.6), Verdict::Match);
        assert_eq!(classifier.classify(0.3), Verdict::MinorDifferences);
        assert!(Classifier::new(0.2, 0.5).is_err());
        assert!(Classifier::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_serialized_labels() {
        let json = serde_json::to_string(&Verdict::MinorDifferences).unwrap();
        assert_eq!(json, "\"minor differences\"");
        assert_eq!(Verdict::SignificantDifferences.to_string(), "significant differences");
    }
}
