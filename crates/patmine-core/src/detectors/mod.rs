//! Domain pattern detectors and their registry.
//!
//! Each detector looks for one named business pattern in the cleaned
//! records. A detector that cannot establish its pattern, because fields are
//! absent or a compared group is too small, answers
//! [`Detection::InsufficientData`]; it never fails the run.
//!
//! # Example
//!
//! ```ignore
//! use patmine_core::detectors::{DetectionContext, DetectorRegistry};
//!
//! let registry = DetectorRegistry::standard();
//! let detections = registry.run(&records, &DetectionContext::new(&config.fields));
//! ```

mod certification;
mod channel;
mod complexity;
mod extension;
mod industry;
mod timing;

pub use certification::CertificationDensity;
pub use channel::CommunicationHierarchy;
pub use complexity::ComplexityMultiplier;
pub use extension::ExtensionPoint;
pub use industry::IndustryExperience;
pub use timing::QuarterEndTiming;

use std::collections::BTreeMap;

use tracing::debug;

use patmine_model::{Detection, FieldFallbacks, Record, Value};

/// Records a compared group needs before it is trusted.
pub const MIN_GROUP_SIZE: usize = 2;

/// Confidence ceiling for detector findings, in percent.
pub const MAX_DETECTOR_CONFIDENCE: f64 = 95.0;

/// Shared, read-only inputs of one detection pass.
#[derive(Debug, Clone, Copy)]
pub struct DetectionContext<'a> {
    pub fields: &'a FieldFallbacks,
}

impl<'a> DetectionContext<'a> {
    pub fn new(fields: &'a FieldFallbacks) -> Self {
        Self { fields }
    }
}

/// A named business pattern detector.
///
/// Implementations are stateless; a registry holds one instance per run.
pub trait PatternDetector: Send + Sync {
    /// Stable identifier, also used as the pattern id.
    fn id(&self) -> &'static str;

    fn title(&self) -> &'static str;

    /// One-line summary for catalog listings.
    fn summary(&self) -> &'static str {
        "Domain pattern detector"
    }

    /// Fields the detector reads, alternatives included.
    fn required_fields(&self) -> &'static [&'static str];

    fn detect(&self, records: &[Record], context: &DetectionContext<'_>) -> Detection;

    /// The insufficient-data answer for this detector.
    fn insufficient(&self) -> Detection {
        Detection::insufficient(self.id(), self.title(), self.required_fields())
    }
}

/// Ordered set of detectors, built fresh for every analysis run.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn PatternDetector>>,
}

impl DetectorRegistry {
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Every catalog detector, in catalog order.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(CertificationDensity));
        registry.register(Box::new(QuarterEndTiming));
        registry.register(Box::new(IndustryExperience));
        registry.register(Box::new(CommunicationHierarchy));
        registry.register(Box::new(ExtensionPoint::geographic_inefficiency()));
        registry.register(Box::new(ExtensionPoint::client_maturity()));
        registry.register(Box::new(ExtensionPoint::performance_prediction()));
        registry.register(Box::new(ComplexityMultiplier));
        registry
    }

    /// Adds a detector. A detector with the same id is replaced in place.
    pub fn register(&mut self, detector: Box<dyn PatternDetector>) {
        match self.detectors.iter().position(|d| d.id() == detector.id()) {
            Some(index) => self.detectors[index] = detector,
            None => self.detectors.push(detector),
        }
    }

    pub fn get(&self, id: &str) -> Option<&dyn PatternDetector> {
        self.detectors
            .iter()
            .find(|detector| detector.id() == id)
            .map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn PatternDetector> {
        self.detectors.iter().map(AsRef::as_ref)
    }

    /// Run every detector over the same records, in registration order.
    pub fn run(&self, records: &[Record], context: &DetectionContext<'_>) -> Vec<Detection> {
        self.detectors
            .iter()
            .map(|detector| {
                let detection = detector.detect(records, context);
                debug!(
                    detector = detector.id(),
                    detected = detection.is_detected(),
                    "detector finished"
                );
                detection
            })
            .collect()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Count and mean of one group's values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GroupMean {
    pub count: usize,
    pub mean: f64,
}

impl GroupMean {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            count: values.len(),
            mean: values.iter().sum::<f64>() / values.len() as f64,
        })
    }

    pub fn is_trusted(&self) -> bool {
        self.count >= MIN_GROUP_SIZE
    }
}

/// Group values by a categorical key, keeping groups that meet the size floor.
pub(crate) fn trusted_groups<K, V>(records: &[Record], key: K, value: V) -> BTreeMap<String, GroupMean>
where
    K: Fn(&Record) -> Option<String>,
    V: Fn(&Record) -> Option<f64>,
{
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let (Some(key), Some(value)) = (key(record), value(record)) {
            groups.entry(key).or_default().push(value);
        }
    }
    groups
        .into_iter()
        .filter_map(|(key, values)| GroupMean::of(&values).map(|group| (key, group)))
        .filter(|(_, group)| group.is_trusted())
        .collect()
}

/// Relative difference of `value` over `baseline`, in percent.
///
/// `None` for a zero baseline.
pub(crate) fn relative_percent(value: f64, baseline: f64) -> Option<f64> {
    (baseline != 0.0).then(|| (value - baseline) / baseline.abs() * 100.0)
}

/// First profit-like number of a record, with the field it came from.
pub(crate) fn profit<'a>(record: &Record, context: &DetectionContext<'a>) -> Option<(&'a str, f64)> {
    record.first_number(&context.fields.profit_fields())
}

/// Case-insensitive trimmed text of a present value.
pub(crate) fn label(record: &Record, field: &str) -> Option<String> {
    record
        .get_present(field)
        .map(|value| value.to_string().trim().to_lowercase())
        .filter(|text| !text.is_empty())
}

/// Boolean reading of flags such as `true`, `yes`, `1`.
pub(crate) fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) if *number == 1.0 => Some(true),
        Value::Number(number) if *number == 0.0 => Some(false),
        Value::Text(text) => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn capped_confidence(confidence: f64) -> f64 {
    confidence.min(MAX_DETECTOR_CONFIDENCE)
}
