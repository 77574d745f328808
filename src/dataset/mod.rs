//! Dataset module: class labels and the class registry
//!
//! The classifier emits one probability per class. The registry maps each
//! output position back to its `"Crop___Condition"` label, so its order must
//! match the order the model was trained with.

pub mod registry;

pub use registry::{ClassRegistry, ClassSource};

/// Separator between the crop and condition segments of a label
pub const LABEL_SEPARATOR: &str = "___";

/// Condition reported for labels without a separator
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// PlantVillage class names in training order (38 classes).
/// Format: "Plant___Disease" or "Plant___healthy"
pub const CLASS_NAMES: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Cherry_(including_sour)___healthy",
    "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Corn_(maize)___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// A class label split into its human-readable parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLabel {
    /// Crop name, e.g. "Pepper bell"
    pub crop: String,
    /// Condition name, e.g. "Bacterial spot" or "healthy"
    pub condition: String,
}

/// Split a `"Crop___Condition"` label into crop and condition.
///
/// Only the first separator counts. Underscores become spaces and commas are
/// dropped from the crop. A label without a separator is all crop, with an
/// unknown condition.
pub fn parse_label(label: &str) -> ParsedLabel {
    match label.split_once(LABEL_SEPARATOR) {
        Some((crop, condition)) => ParsedLabel {
            crop: crop.replace('_', " ").replace(',', "").trim().to_string(),
            condition: condition.replace('_', " ").trim().to_string(),
        },
        None => ParsedLabel {
            crop: label.replace('_', " "),
            condition: UNKNOWN_CONDITION.to_string(),
        },
    }
}

/// Format a label for display: `"Tomato___Late_blight"` -> `"Tomato - Late blight"`
pub fn display_label(label: &str) -> String {
    label.replace(LABEL_SEPARATOR, " - ").replace('_', " ")
}

/// Whether a condition describes a healthy plant (case-insensitive substring)
pub fn is_healthy(condition: &str) -> bool {
    condition.to_lowercase().contains("healthy")
}
