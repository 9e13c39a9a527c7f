use serde::{Deserialize, Serialize};
use std::fmt;

/// Value carried by an annotation: measures are numeric, patient data is text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Number(f64),
    Text(String),
}

impl AnnotationValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnnotationValue::Number(v) => Some(*v),
            AnnotationValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Number(v) => write!(f, "{}", v),
            AnnotationValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for AnnotationValue {
    fn from(value: f64) -> Self {
        AnnotationValue::Number(value)
    }
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        AnnotationValue::Text(value.to_string())
    }
}

/// Where an annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationGroup {
    Record,
    Computed,
    Measure,
}

/// Output record pushed to the annotation sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub channel: String,
    pub value: AnnotationValue,
    pub unit: String,
    pub important: bool,
    pub group: AnnotationGroup,
}

impl Annotation {
    pub fn measure(name: &str, channel: &str, value: f64, unit: &str, important: bool) -> Self {
        Self {
            name: name.to_string(),
            channel: channel.to_string(),
            value: AnnotationValue::Number(value),
            unit: unit.to_string(),
            important,
            group: AnnotationGroup::Measure,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.name, self.value, self.unit)
    }
}

/// Annotation stored in the source object (patient data, device measurements).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnnotation {
    pub name: String,
    pub value: AnnotationValue,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub channel: String,
}
