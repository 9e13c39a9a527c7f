use serde::{Deserialize, Serialize};

use crate::math::StatsHelper;
use crate::prelude::{WaveformError, WaveformResult};
use crate::record::ChannelRecord;

/// Sensitivity unit of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityUnit {
    Microvolt,
    Millivolt,
}

impl SensitivityUnit {
    pub fn from_code(code: &str) -> WaveformResult<Self> {
        let code = code.trim();
        match code {
            "uV" | "µV" | "μV" => Ok(SensitivityUnit::Microvolt),
            "mV" => Ok(SensitivityUnit::Millivolt),
            other if other.eq_ignore_ascii_case("microvolt") => Ok(SensitivityUnit::Microvolt),
            other if other.eq_ignore_ascii_case("millivolt") => Ok(SensitivityUnit::Millivolt),
            other => Err(WaveformError::UnsupportedUnit {
                code: other.to_string(),
            }),
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            SensitivityUnit::Microvolt => 1.0,
            SensitivityUnit::Millivolt => 1000.0,
        }
    }
}

/// Physical extent of a channel in microvolts. Always spans zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_uv: f64,
    pub max_uv: f64,
}

impl Extent {
    pub fn magnitude_uv(&self) -> f64 {
        self.min_uv.abs().max(self.max_uv.abs())
    }
}

/// Calibration of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDefinition {
    name: String,
    baseline: f64,
    sensitivity: f64,
    correction: i32,
    unit: SensitivityUnit,
    scaling: f64,
    extent: Option<Extent>,
}

impl ChannelDefinition {
    pub fn calibrate(
        name: &str,
        baseline: f64,
        sensitivity: f64,
        correction: i32,
        unit: &str,
    ) -> WaveformResult<Self> {
        let unit = SensitivityUnit::from_code(unit)?;
        Ok(Self {
            name: name.to_string(),
            baseline,
            sensitivity,
            correction,
            unit,
            scaling: sensitivity * correction as f64 * unit.factor(),
            extent: None,
        })
    }

    /// Builds a definition from a channel record, naming the first absent
    /// attribute on failure.
    pub fn from_record(index: usize, record: &ChannelRecord) -> WaveformResult<Self> {
        let missing = |field| WaveformError::MissingChannelMetadata {
            channel: index,
            field,
        };
        let name = record.name.as_deref().ok_or_else(|| missing("name"))?;
        let sensitivity = record.sensitivity.ok_or_else(|| missing("sensitivity"))?;
        let correction = record
            .sensitivity_correction
            .ok_or_else(|| missing("sensitivity correction"))?;
        let unit = record.unit_code.as_deref().ok_or_else(|| missing("unit"))?;

        Self::calibrate(
            name,
            record.baseline.unwrap_or(0.0),
            sensitivity,
            correction as i32,
            unit,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn correction(&self) -> i32 {
        self.correction
    }

    pub fn unit(&self) -> SensitivityUnit {
        self.unit
    }

    /// Microvolts per raw unit.
    pub fn scaling(&self) -> f64 {
        self.scaling
    }

    pub fn to_physical(&self, raw: i32) -> f64 {
        raw as f64 * self.scaling
    }

    pub fn to_millivolts(&self, raw: i32) -> f64 {
        self.to_physical(raw) / 1000.0
    }

    pub fn extent(&self) -> Option<Extent> {
        self.extent
    }

    /// Scans the channel once for its physical extent. The first result is
    /// kept for the lifetime of the dataset.
    pub fn compute_extent(&mut self, samples: &[i32]) -> Extent {
        let scaling = self.scaling;
        *self.extent.get_or_insert_with(|| {
            let (lo, hi) = StatsHelper::min_max(samples).unwrap_or((0, 0));
            let (a, b) = (lo as f64 * scaling, hi as f64 * scaling);
            Extent {
                min_uv: a.min(b).min(0.0),
                max_uv: a.max(b).max(0.0),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scaling_combines_sensitivity_correction_and_unit() {
        let uv = ChannelDefinition::calibrate("Lead I", 0.0, 2.5, 2, "uV").unwrap();
        assert_relative_eq!(uv.scaling(), 5.0);
        let mv = ChannelDefinition::calibrate("Lead I", 0.0, 0.0025, 1, "mV").unwrap();
        assert_relative_eq!(mv.scaling(), 2.5);
    }

    #[test]
    fn to_physical_is_linear() {
        let def = ChannelDefinition::calibrate("V1", 0.0, 1.25, 3, "uV").unwrap();
        for raw in [-400, -1, 0, 7, 1234] {
            assert_relative_eq!(def.to_physical(2 * raw), 2.0 * def.to_physical(raw));
        }
        assert_relative_eq!(def.to_millivolts(800), 3.0);
    }

    #[test]
    fn unknown_unit_code_is_rejected() {
        let err = ChannelDefinition::calibrate("V1", 0.0, 1.0, 1, "mmHg").unwrap_err();
        assert_eq!(
            err,
            WaveformError::UnsupportedUnit {
                code: "mmHg".into()
            }
        );
    }

    #[test]
    fn extent_always_includes_zero() {
        let mut def = ChannelDefinition::calibrate("II", 0.0, 1.0, 1, "uV").unwrap();
        let extent = def.compute_extent(&[100, 250, 30]);
        assert_relative_eq!(extent.min_uv, 0.0);
        assert_relative_eq!(extent.max_uv, 250.0);
    }

    #[test]
    fn extent_is_computed_once() {
        let mut def = ChannelDefinition::calibrate("II", 0.0, 2.0, 1, "uV").unwrap();
        def.compute_extent(&[-10, 5]);
        let again = def.compute_extent(&[-1000, 1000]);
        assert_relative_eq!(again.min_uv, -20.0);
        assert_relative_eq!(again.max_uv, 10.0);
    }

    #[test]
    fn missing_record_field_is_reported() {
        let mut record = ChannelRecord::new("Lead I", 1.0, 1.0, 0.0, "uV");
        record.sensitivity_correction = None;
        let err = ChannelDefinition::from_record(4, &record).unwrap_err();
        assert_eq!(
            err,
            WaveformError::MissingChannelMetadata {
                channel: 4,
                field: "sensitivity correction"
            }
        );
    }
}
