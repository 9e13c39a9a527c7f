use crate::record::{Annotation, AnnotationGroup, AnnotationValue, StoredAnnotation};

/// Channel label used for readouts that are not tied to a lead.
pub const NO_CHANNEL: &str = "-";

/// Names shown when the annotation list is filtered.
const RELEVANT_NAMES: [&str; 16] = [
    "patient name",
    "patient sex",
    "birth date",
    "electrode placement",
    "rr interval",
    "pr interval",
    "qrs duration",
    "qt interval",
    "qtc interval",
    "qrs axis",
    "pp interval",
    "p axis",
    "p duration",
    "high-pass filter",
    "low-pass filter",
    "notch filter",
];

/// Receiver for measurement output. The engine only reads it back to
/// enumerate current measures.
pub trait AnnotationSink {
    fn set_measure(
        &mut self,
        name: &str,
        channel: &str,
        value: AnnotationValue,
        unit: &str,
        important: bool,
    );

    /// Removes measures of `channel`, all of them when `name` is `None`.
    /// Returns whether anything was removed.
    fn remove_measures(&mut self, name: Option<&str>, channel: &str) -> bool;

    fn set_manual_annotation(
        &mut self,
        name: &str,
        value: AnnotationValue,
        unit: &str,
        important: bool,
    );

    fn measures(&self) -> &[Annotation];
}

fn add_or_replace(list: &mut Vec<Annotation>, annotation: Annotation) {
    let existing = list.iter_mut().find(|a| {
        a.group == annotation.group
            && a.name == annotation.name
            && a.channel == annotation.channel
            && a.unit == annotation.unit
    });
    match existing {
        Some(slot) => *slot = annotation,
        None => list.push(annotation),
    }
}

/// In-memory side panel: record annotations plus live measures.
#[derive(Debug, Clone)]
pub struct AnnotationBoard {
    annotations: Vec<Annotation>,
    measures: Vec<Annotation>,
}

impl Default for AnnotationBoard {
    fn default() -> Self {
        let mut board = Self {
            annotations: Vec::new(),
            measures: Vec::new(),
        };
        for name in ["cursor time", "cursor value"] {
            board.set_measure(name, NO_CHANNEL, AnnotationValue::from(""), "", false);
        }
        board
    }
}

impl AnnotationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board seeded with the annotations stored in the record.
    pub fn from_stored(stored: &[StoredAnnotation]) -> Self {
        let mut board = Self::default();
        for annotation in stored {
            board.ingest(annotation);
        }
        board
    }

    /// Adds a stored annotation. An RR interval in ms also yields its rate.
    pub fn ingest(&mut self, stored: &StoredAnnotation) {
        let channel = if stored.channel.is_empty() {
            NO_CHANNEL
        } else {
            stored.channel.as_str()
        };
        self.annotations.push(Annotation {
            name: stored.name.clone(),
            channel: channel.to_string(),
            value: stored.value.clone(),
            unit: stored.unit.clone(),
            important: false,
            group: AnnotationGroup::Record,
        });

        if stored.name.eq_ignore_ascii_case("RR Interval") && stored.unit == "ms" {
            if let Some(rr) = stored.value.as_number().filter(|rr| *rr > 0.0) {
                self.annotations.push(Annotation {
                    name: stored.name.clone(),
                    channel: channel.to_string(),
                    value: AnnotationValue::Number((60000.0 / rr).trunc()),
                    unit: "bpm".into(),
                    important: false,
                    group: AnnotationGroup::Computed,
                });
            }
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Clinically relevant annotations plus everything set manually.
    pub fn filtered(&self) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| {
                a.group == AnnotationGroup::Measure
                    || RELEVANT_NAMES.contains(&a.name.to_lowercase().as_str())
            })
            .collect()
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn measure(&self, name: &str, channel: &str) -> Option<&Annotation> {
        self.measures
            .iter()
            .find(|a| a.name == name && a.channel == channel)
    }
}

impl AnnotationSink for AnnotationBoard {
    fn set_measure(
        &mut self,
        name: &str,
        channel: &str,
        value: AnnotationValue,
        unit: &str,
        important: bool,
    ) {
        let annotation = Annotation {
            name: name.to_string(),
            channel: channel.to_string(),
            value,
            unit: unit.to_string(),
            important,
            group: AnnotationGroup::Measure,
        };
        add_or_replace(&mut self.measures, annotation);
        self.measures
            .sort_by(|a, b| a.channel.cmp(&b.channel).then_with(|| a.name.cmp(&b.name)));
    }

    fn remove_measures(&mut self, name: Option<&str>, channel: &str) -> bool {
        let before = self.measures.len();
        self.measures
            .retain(|a| !(a.channel == channel && name.map_or(true, |n| a.name == n)));
        self.measures.len() != before
    }

    fn set_manual_annotation(
        &mut self,
        name: &str,
        value: AnnotationValue,
        unit: &str,
        important: bool,
    ) {
        let annotation = Annotation {
            name: name.to_string(),
            channel: NO_CHANNEL.to_string(),
            value,
            unit: unit.to_string(),
            important,
            group: AnnotationGroup::Measure,
        };
        add_or_replace(&mut self.annotations, annotation);
    }

    fn measures(&self) -> &[Annotation] {
        &self.measures
    }
}
