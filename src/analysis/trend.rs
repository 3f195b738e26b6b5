use super::reference::{ find_reference, find_significance_band };
use crate::models::context::BiomarkerTrendRecord;
use crate::models::health::{ BiomarkerSnapshot, BiomarkerStatus, Significance, Trend };

/// Relative change below which a reading counts as unchanged.
const STABLE_CHANGE_PERCENT: f64 = 2.0;

pub fn assess_status(biomarker: &BiomarkerSnapshot) -> BiomarkerStatus {
    let Some(reference) = find_reference(&biomarker.name) else {
        return BiomarkerStatus::WithinRange;
    };
    let value = biomarker.value;
    if reference.optimal.contains(value) {
        BiomarkerStatus::Optimal
    } else if reference.normal.contains(value) {
        BiomarkerStatus::Normal
    } else if value < reference.normal.low {
        BiomarkerStatus::Low
    } else {
        BiomarkerStatus::High
    }
}

pub fn assess_significance(biomarker: &BiomarkerSnapshot) -> Significance {
    let Some(band) = find_significance_band(&biomarker.name) else {
        return Significance::Normal;
    };
    if band.concerning.contains(biomarker.value) {
        Significance::Normal
    } else if band.critical.contains(biomarker.value) {
        Significance::Concerning
    } else {
        Significance::Critical
    }
}

/// Direction of travel against the previously stored reading. A reading is
/// improving when it moved closer to the middle of its optimal range.
pub fn assess_trend(previous: Option<&BiomarkerTrendRecord>, biomarker: &BiomarkerSnapshot) -> (Trend, f64) {
    let Some(previous) = previous else {
        return (Trend::Stable, 0.0);
    };
    let change_percent = if previous.last_value.abs() > f64::EPSILON {
        ((biomarker.value - previous.last_value) / previous.last_value.abs()) * 100.0
    } else {
        0.0
    };
    if change_percent.abs() < STABLE_CHANGE_PERCENT {
        return (Trend::Stable, change_percent);
    }
    let Some(reference) = find_reference(&biomarker.name) else {
        return (Trend::Stable, change_percent);
    };

    let target = reference.optimal.midpoint();
    let before = (previous.last_value - target).abs();
    let after = (biomarker.value - target).abs();
    let trend = if after < before {
        Trend::Improving
    } else if after > before {
        Trend::Declining
    } else {
        Trend::Stable
    };
    (trend, change_percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn glucose(value: f64) -> BiomarkerSnapshot {
        BiomarkerSnapshot::new("Fasting Glucose", value, "mg/dL")
    }

    fn record(last_value: f64) -> BiomarkerTrendRecord {
        BiomarkerTrendRecord {
            trend: Trend::Stable,
            significance: Significance::Normal,
            last_value,
            change_percent: 0.0,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn glucose_status_follows_reference_bounds() {
        assert_eq!(assess_status(&glucose(95.0)), BiomarkerStatus::Normal);
        assert_eq!(assess_status(&glucose(75.0)), BiomarkerStatus::Optimal);
        assert_eq!(assess_status(&glucose(40.0)), BiomarkerStatus::Low);
        assert_eq!(assess_status(&glucose(200.0)), BiomarkerStatus::High);
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(assess_status(&glucose(85.0)), BiomarkerStatus::Optimal);
        assert_eq!(assess_status(&glucose(99.0)), BiomarkerStatus::Normal);
        assert_eq!(assess_status(&glucose(99.5)), BiomarkerStatus::High);
    }

    #[test]
    fn unknown_marker_is_within_range() {
        let marker = BiomarkerSnapshot::new("Zonulin", 1234.0, "ng/mL");
        assert_eq!(assess_status(&marker), BiomarkerStatus::WithinRange);
        assert_eq!(assess_status(&marker).label(), "Within range");
        assert_eq!(assess_significance(&marker), Significance::Normal);
    }

    #[test]
    fn significance_is_looser_than_status() {
        assert_eq!(assess_significance(&glucose(110.0)), Significance::Normal);
        assert_eq!(assess_significance(&glucose(140.0)), Significance::Concerning);
        assert_eq!(assess_significance(&glucose(300.0)), Significance::Critical);
        assert_eq!(assess_significance(&glucose(40.0)), Significance::Critical);
    }

    #[test]
    fn first_reading_is_stable() {
        assert_eq!(assess_trend(None, &glucose(120.0)), (Trend::Stable, 0.0));
    }

    #[test]
    fn moving_toward_optimal_is_improving() {
        let (trend, change) = assess_trend(Some(&record(120.0)), &glucose(90.0));
        assert_eq!(trend, Trend::Improving);
        assert!((change + 25.0).abs() < 1e-9);

        let (trend, _) = assess_trend(Some(&record(90.0)), &glucose(120.0));
        assert_eq!(trend, Trend::Declining);
    }

    #[test]
    fn small_changes_are_stable() {
        let (trend, _) = assess_trend(Some(&record(100.0)), &glucose(101.0));
        assert_eq!(trend, Trend::Stable);
    }
}
