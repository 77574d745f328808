//! Diagnosis derivation
//!
//! Converts a probability vector into the structured result returned to
//! clients: crop, condition, severity tier, advice and top-5 alternatives.

use serde::{Deserialize, Serialize};

use crate::dataset::{display_label, is_healthy, parse_label, ClassRegistry};
use crate::utils::error::{Error, Result};
use crate::utils::to_percentage;

/// Confidence above which a prediction is considered certain
pub const HIGH_CONFIDENCE: f32 = 0.8;

/// Confidence above which a prediction is considered likely
pub const MEDIUM_CONFIDENCE: f32 = 0.6;

/// Number of ranked alternatives in a diagnosis
pub const TOP_K: usize = 5;

const HEALTHY_CARE: &[&str] = &[
    "Your plant appears healthy! Continue with regular care.",
    "Maintain proper watering schedule",
    "Ensure adequate sunlight and ventilation",
    "Regular monitoring for early disease detection",
];

const URGENT_ACTIONS: &[&str] = &[
    "Immediate action required - consult agricultural expert",
    "Isolate affected plants to prevent spread",
];

/// Keyword-specific advice, checked in order; the first match wins.
const KEYWORD_ADVICE: &[(&str, &[&str])] = &[
    (
        "blight",
        &[
            "Remove affected leaves and dispose properly",
            "Improve air circulation around plants",
            "Apply copper-based fungicide",
            "Avoid overhead watering",
        ],
    ),
    (
        "rust",
        &[
            "Apply fungicide containing propiconazole",
            "Remove infected plant debris",
            "Ensure proper plant spacing for air circulation",
        ],
    ),
    (
        "spot",
        &[
            "Apply bactericide or fungicide as appropriate",
            "Remove affected leaves",
            "Improve drainage and reduce humidity",
        ],
    ),
    (
        "mildew",
        &[
            "Apply sulfur-based fungicide",
            "Improve air circulation",
            "Reduce humidity levels",
            "Remove affected plant parts",
        ],
    ),
    (
        "scab",
        &[
            "Apply preventive fungicide spray",
            "Prune for better air circulation",
            "Remove fallen leaves and debris",
        ],
    ),
];

const GENERIC_ADVICE: &[&str] = &[
    "Consult local agricultural extension office",
    "Remove affected plant parts",
    "Maintain proper plant hygiene",
    "Monitor regularly for disease progression",
];

/// Severity tier of a diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
    Healthy,
}

impl Severity {
    /// Classify from the top-1 confidence (fraction in [0, 1]) and condition.
    ///
    /// Thresholds are strict: exactly 0.8 is not high, exactly 0.6 is low.
    pub fn classify(confidence: f32, condition: &str) -> Self {
        if confidence > HIGH_CONFIDENCE {
            if is_healthy(condition) {
                Severity::Healthy
            } else {
                Severity::High
            }
        } else if confidence > MEDIUM_CONFIDENCE {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Healthy => "Healthy",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advice for a condition at a given severity
pub fn recommendations(condition: &str, severity: Severity) -> Vec<String> {
    if is_healthy(condition) {
        return to_owned(HEALTHY_CARE);
    }

    let mut advice = Vec::new();
    if severity == Severity::High {
        advice.extend(to_owned(URGENT_ACTIONS));
    }

    let condition = condition.to_lowercase();
    let block = KEYWORD_ADVICE
        .iter()
        .find(|(keyword, _)| condition.contains(keyword))
        .map(|(_, block)| *block)
        .unwrap_or(GENERIC_ADVICE);
    advice.extend(to_owned(block));

    advice
}

fn to_owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

/// One ranked alternative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPrediction {
    /// Display label, e.g. "Tomato - Late blight"
    pub class: String,
    /// Percentage rounded to 2 decimals
    pub confidence: f64,
}

/// Structured result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub crop: String,
    pub disease: String,
    pub severity: Severity,
    /// Percentage rounded to 2 decimals
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub all_predictions: Vec<TopPrediction>,
    #[serde(rename = "className")]
    pub class_name: String,
    pub predicted_index: usize,
}

impl Diagnosis {
    /// Derive a diagnosis from the classifier output
    pub fn from_probabilities(probabilities: &[f32], registry: &ClassRegistry) -> Result<Self> {
        if probabilities.len() != registry.len() {
            return Err(Error::InferenceFailed(format!(
                "model produced {} scores for {} classes",
                probabilities.len(),
                registry.len()
            )));
        }

        let predicted_index = argmax(probabilities)
            .ok_or_else(|| Error::InferenceFailed("empty probability vector".to_string()))?;
        let confidence = probabilities[predicted_index];

        let class_name = registry.name_at(predicted_index)?.to_string();
        let label = parse_label(&class_name);
        let severity = Severity::classify(confidence, &label.condition);

        let all_predictions = top_k(probabilities, TOP_K)
            .into_iter()
            .map(|(index, probability)| {
                Ok(TopPrediction {
                    class: display_label(registry.name_at(index)?),
                    confidence: to_percentage(probability),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            recommendations: recommendations(&label.condition, severity),
            crop: label.crop,
            disease: label.condition,
            severity,
            confidence: to_percentage(confidence),
            all_predictions,
            class_name,
            predicted_index,
        })
    }
}

/// Index of the largest value; ties go to the first occurrence
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if !(value > best_value) => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// The `k` most probable classes, highest first; ties keep index order
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.truncate(k);
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> ClassRegistry {
        ClassRegistry::new(names.iter().map(|n| n.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(Severity::classify(0.95, "Late blight"), Severity::High);
        assert_eq!(Severity::classify(0.95, "healthy"), Severity::Healthy);
        assert_eq!(Severity::classify(0.81, "Healthy"), Severity::Healthy);
        assert_eq!(Severity::classify(0.8, "Late blight"), Severity::Medium);
        assert_eq!(Severity::classify(0.8, "healthy"), Severity::Medium);
        assert_eq!(Severity::classify(0.7, "healthy"), Severity::Medium);
        assert_eq!(Severity::classify(0.6, "Late blight"), Severity::Low);
        assert_eq!(Severity::classify(0.1, "Late blight"), Severity::Low);
    }

    #[test]
    fn test_healthy_recommendations_only() {
        for severity in [Severity::High, Severity::Healthy, Severity::Low] {
            let advice = recommendations("healthy", severity);
            assert_eq!(advice, to_owned(HEALTHY_CARE));
        }
    }

    #[test]
    fn test_high_severity_prepends_urgent_actions() {
        let advice = recommendations("Late blight", Severity::High);
        assert_eq!(advice.len(), 6);
        assert_eq!(advice[0], URGENT_ACTIONS[0]);
        assert_eq!(advice[1], URGENT_ACTIONS[1]);
        assert_eq!(advice[2], "Remove affected leaves and dispose properly");

        let advice = recommendations("Late blight", Severity::Medium);
        assert_eq!(advice.len(), 4);
        assert_eq!(advice[0], "Remove affected leaves and dispose properly");
    }

    #[test]
    fn test_keyword_priority() {
        // "spot" only
        let advice = recommendations("Cercospora leaf spot Gray leaf spot", Severity::Low);
        assert_eq!(advice[0], "Apply bactericide or fungicide as appropriate");

        // both "blight" and "spot": blight comes first in the table
        let advice = recommendations("Leaf blight (Isariopsis Leaf Spot)", Severity::Low);
        assert_eq!(advice[0], "Remove affected leaves and dispose properly");
        assert_eq!(advice.len(), 4);

        let advice = recommendations("Common rust", Severity::Low);
        assert_eq!(advice[0], "Apply fungicide containing propiconazole");

        let advice = recommendations("Powdery mildew", Severity::Low);
        assert_eq!(advice[0], "Apply sulfur-based fungicide");

        let advice = recommendations("Apple scab", Severity::Low);
        assert_eq!(advice[0], "Apply preventive fungicide spray");
    }

    #[test]
    fn test_generic_fallback() {
        let advice = recommendations("Tomato mosaic virus", Severity::Medium);
        assert_eq!(advice, to_owned(GENERIC_ADVICE));
    }

    #[test]
    fn test_argmax_first_occurrence() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), Some(1));
        assert_eq!(argmax(&[0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_top_k_sorted_and_bounded() {
        let probs = [0.05, 0.3, 0.1, 0.2, 0.15, 0.2];
        let top = top_k(&probs, 5);
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(top[0].0, 1);
        // equal probabilities keep index order
        assert_eq!(top[1].0, 3);
        assert_eq!(top[2].0, 5);

        assert_eq!(top_k(&[0.6, 0.4], 5).len(), 2);
    }

    #[test]
    fn test_diagnosis_from_probabilities() {
        let registry = ClassRegistry::builtin();
        let mut probs = vec![0.0; registry.len()];
        probs[30] = 0.9; // Tomato___Late_blight
        probs[29] = 0.06;
        probs[37] = 0.04;

        let diagnosis = Diagnosis::from_probabilities(&probs, &registry).unwrap();
        assert_eq!(diagnosis.crop, "Tomato");
        assert_eq!(diagnosis.disease, "Late blight");
        assert_eq!(diagnosis.severity, Severity::High);
        assert!((diagnosis.confidence - 90.0).abs() < 1e-9);
        assert_eq!(diagnosis.class_name, "Tomato___Late_blight");
        assert_eq!(diagnosis.predicted_index, 30);
        assert_eq!(diagnosis.recommendations.len(), 6);

        assert_eq!(diagnosis.all_predictions.len(), 5);
        assert_eq!(diagnosis.all_predictions[0].class, "Tomato - Late blight");
        assert_eq!(diagnosis.all_predictions[1].class, "Tomato - Early blight");
        assert!((diagnosis.all_predictions[1].confidence - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_healthy_diagnosis() {
        let registry = registry(&["Apple___healthy", "Apple___Apple_scab"]);
        let diagnosis = Diagnosis::from_probabilities(&[0.97, 0.03], &registry).unwrap();
        assert_eq!(diagnosis.severity, Severity::Healthy);
        assert_eq!(diagnosis.recommendations, to_owned(HEALTHY_CARE));
        assert_eq!(diagnosis.all_predictions.len(), 2);
    }

    #[test]
    fn test_length_mismatch() {
        let registry = registry(&["A___x", "B___y"]);
        let err = Diagnosis::from_probabilities(&[1.0], &registry).unwrap_err();
        assert!(matches!(err, Error::InferenceFailed(_)));

        let err = Diagnosis::from_probabilities(&[], &ClassRegistry::empty()).unwrap_err();
        assert!(matches!(err, Error::InferenceFailed(_)));
    }

    #[test]
    fn test_serialized_field_names() {
        let registry = registry(&["Foo"]);
        let diagnosis = Diagnosis::from_probabilities(&[1.0], &registry).unwrap();
        let json = serde_json::to_value(&diagnosis).unwrap();

        assert_eq!(json["crop"], "Foo");
        assert_eq!(json["disease"], "Unknown");
        assert_eq!(json["severity"], "High");
        assert_eq!(json["className"], "Foo");
        assert_eq!(json["predicted_index"], 0);
        assert_eq!(json["all_predictions"][0]["class"], "Foo");
    }
}
