use serde::{Deserialize, Serialize};
use std::fmt;

use crate::measure::engine::DURATION;
use crate::measure::sink::AnnotationSink;
use crate::prelude::{WaveformError, WaveformResult};
use crate::record::{Annotation, AnnotationValue};

pub const RR_INTERVAL: &str = "*RR Interval";
pub const QT_INTERVAL: &str = "*QT Interval";
pub const QTC_INTERVAL: &str = "*QTc Interval";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Rr,
    Qt,
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntervalKind::Rr => "RR",
            IntervalKind::Qt => "QT",
        })
    }
}

/// Outcome of one commit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommittedInterval {
    pub kind: IntervalKind,
    pub milliseconds: f64,
    pub bpm: Option<f64>,
    pub qtc_milliseconds: Option<f64>,
}

/// Heart rate for an RR interval, truncated.
pub fn heart_rate(rr_ms: f64) -> f64 {
    (60000.0 / rr_ms).trunc()
}

/// Bazett-corrected QT, truncated. Both inputs in milliseconds.
pub fn bazett_qtc(qt_ms: f64, rr_ms: f64) -> f64 {
    (1000.0 * (qt_ms / 1000.0) / (rr_ms / 1000.0).sqrt()).trunc()
}

/// The single active duration measure across all channels.
pub fn find_duration(measures: &[Annotation]) -> WaveformResult<&Annotation> {
    let mut durations = measures.iter().filter(|a| a.name == DURATION);
    let found = durations.next().ok_or(WaveformError::NoMeasurementFound)?;
    let others = durations.count();
    if others > 0 {
        return Err(WaveformError::AmbiguousMeasurement { count: others + 1 });
    }
    Ok(found)
}

/// Turns the measured duration into named RR/QT intervals and keeps the
/// derived rate and corrected QT up to date.
#[derive(Debug, Clone, Default)]
pub struct IntervalCommitter {
    rr_ms: Option<f64>,
    qt_ms: Option<f64>,
}

impl IntervalCommitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rr(&self) -> Option<f64> {
        self.rr_ms
    }

    pub fn qt(&self) -> Option<f64> {
        self.qt_ms
    }

    pub fn commit(
        &mut self,
        kind: IntervalKind,
        sink: &mut dyn AnnotationSink,
    ) -> WaveformResult<CommittedInterval> {
        let duration = find_duration(sink.measures())?;
        if duration.unit != "ms" {
            return Err(WaveformError::IntervalUnit {
                unit: duration.unit.clone(),
            });
        }
        let milliseconds = duration
            .value
            .as_number()
            .map(f64::abs)
            .filter(|ms| *ms > 0.0)
            .ok_or(WaveformError::NoMeasurementFound)?;

        let mut bpm = None;
        match kind {
            IntervalKind::Rr => {
                let rate = heart_rate(milliseconds);
                self.rr_ms = Some(milliseconds);
                bpm = Some(rate);
                sink.set_manual_annotation(RR_INTERVAL, milliseconds.into(), "ms", true);
                sink.set_manual_annotation(RR_INTERVAL, rate.into(), "bpm", true);
            }
            IntervalKind::Qt => {
                self.qt_ms = Some(milliseconds);
                sink.set_manual_annotation(QT_INTERVAL, milliseconds.into(), "ms", true);
            }
        }

        let qtc = self.rr_ms.zip(self.qt_ms).map(|(rr, qt)| bazett_qtc(qt, rr));
        if let Some(qtc) = qtc {
            sink.set_manual_annotation(QTC_INTERVAL, AnnotationValue::Number(qtc), "ms", true);
        }

        Ok(CommittedInterval {
            kind,
            milliseconds,
            bpm,
            qtc_milliseconds: qtc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::sink::AnnotationBoard;

    #[test]
    fn commit_requires_exactly_one_duration() {
        let mut board = AnnotationBoard::new();
        let mut committer = IntervalCommitter::new();
        assert_eq!(
            committer.commit(IntervalKind::Rr, &mut board),
            Err(WaveformError::NoMeasurementFound)
        );

        board.set_measure(DURATION, "Lead I", 800.0.into(), "ms", true);
        board.set_measure(DURATION, "Lead II", 810.0.into(), "ms", true);
        let err = committer.commit(IntervalKind::Rr, &mut board).unwrap_err();
        assert_eq!(err, WaveformError::AmbiguousMeasurement { count: 2 });
        assert!(err.is_recoverable());

        board.remove_measures(None, "Lead I");
        let committed = committer.commit(IntervalKind::Rr, &mut board).unwrap();
        assert_eq!(committed.milliseconds, 810.0);
        assert_eq!(committed.bpm, Some(74.0));
        assert_eq!(committed.qtc_milliseconds, None);
    }

    #[test]
    fn rr_and_qt_yield_corrected_interval() {
        let mut board = AnnotationBoard::new();
        let mut committer = IntervalCommitter::new();

        board.set_measure(DURATION, "Lead II", 1000.0.into(), "ms", true);
        committer.commit(IntervalKind::Rr, &mut board).unwrap();
        board.set_measure(DURATION, "Lead II", 400.0.into(), "ms", true);
        let committed = committer.commit(IntervalKind::Qt, &mut board).unwrap();
        assert_eq!(committed.qtc_milliseconds, Some(400.0));

        board.set_measure(DURATION, "Lead II", 640.0.into(), "ms", true);
        committer.commit(IntervalKind::Rr, &mut board).unwrap();
        let qtc = board.annotation(QTC_INTERVAL).unwrap();
        assert_eq!(qtc.value, AnnotationValue::Number(500.0));
        assert_eq!(qtc.unit, "ms");

        let rr_entries = board
            .annotations()
            .iter()
            .filter(|a| a.name == RR_INTERVAL)
            .count();
        assert_eq!(rr_entries, 2);
    }

    #[test]
    fn non_millisecond_duration_is_rejected() {
        let mut board = AnnotationBoard::new();
        board.set_measure(DURATION, "V2", 0.8.into(), "s", true);
        let err = IntervalCommitter::new()
            .commit(IntervalKind::Qt, &mut board)
            .unwrap_err();
        assert_eq!(err, WaveformError::IntervalUnit { unit: "s".into() });
    }

    #[test]
    fn bazett_truncates() {
        assert_eq!(bazett_qtc(380.0, 750.0), 438.0);
        assert_eq!(heart_rate(857.0), 70.0);
    }
}
