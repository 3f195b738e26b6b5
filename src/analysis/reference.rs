//! Static reference bounds per biomarker.
//!
//! Lookups are first-match against the lower-cased biomarker name, so entry
//! order matters: the specific cholesterol fractions sit ahead of the bare
//! `cholesterol` key. Short keys (abbreviations like `ast` or `alt`) only
//! match a whole word; longer keys match anywhere in the name.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReferenceRange {
    pub key: &'static str,
    pub optimal: Range,
    pub normal: Range,
}

/// Bands behind the persisted significance. Deliberately wider than the
/// status table.
#[derive(Debug, Clone, Copy)]
pub struct SignificanceBand {
    pub key: &'static str,
    pub concerning: Range,
    pub critical: Range,
}

const fn rr(key: &'static str, optimal: (f64, f64), normal: (f64, f64)) -> ReferenceRange {
    ReferenceRange {
        key,
        optimal: Range::new(optimal.0, optimal.1),
        normal: Range::new(normal.0, normal.1),
    }
}

const fn band(key: &'static str, concerning: (f64, f64), critical: (f64, f64)) -> SignificanceBand {
    SignificanceBand {
        key,
        concerning: Range::new(concerning.0, concerning.1),
        critical: Range::new(critical.0, critical.1),
    }
}

pub static REFERENCE_RANGES: &[ReferenceRange] = &[
    rr("glucose", (70.0, 85.0), (70.0, 99.0)),
    rr("hba1c", (4.0, 5.4), (4.0, 5.6)),
    rr("insulin", (2.0, 6.0), (2.0, 25.0)),
    rr("ldl", (0.0, 100.0), (0.0, 129.0)),
    rr("hdl", (60.0, 100.0), (40.0, 100.0)),
    rr("triglyceride", (0.0, 100.0), (0.0, 149.0)),
    rr("cholesterol", (125.0, 180.0), (125.0, 199.0)),
    rr("crp", (0.0, 1.0), (0.0, 3.0)),
    rr("homocysteine", (4.0, 8.0), (4.0, 15.0)),
    rr("creatinine", (0.7, 1.1), (0.6, 1.3)),
    rr("egfr", (90.0, 120.0), (60.0, 120.0)),
    rr("bun", (10.0, 16.0), (7.0, 20.0)),
    rr("vitamin d", (40.0, 60.0), (30.0, 100.0)),
    rr("b12", (500.0, 900.0), (200.0, 900.0)),
    rr("ferritin", (50.0, 150.0), (20.0, 300.0)),
    rr("tsh", (0.5, 2.5), (0.4, 4.5)),
    rr("alt", (7.0, 30.0), (7.0, 56.0)),
    rr("ast", (10.0, 30.0), (10.0, 40.0)),
];

pub static SIGNIFICANCE_BANDS: &[SignificanceBand] = &[
    band("glucose", (60.0, 125.0), (45.0, 250.0)),
    band("hba1c", (3.5, 6.4), (3.0, 9.0)),
    band("ldl", (0.0, 159.0), (0.0, 190.0)),
    band("hdl", (35.0, 200.0), (25.0, 250.0)),
    band("triglyceride", (0.0, 199.0), (0.0, 500.0)),
    band("cholesterol", (100.0, 239.0), (80.0, 300.0)),
    band("crp", (0.0, 5.0), (0.0, 10.0)),
    band("creatinine", (0.5, 1.5), (0.3, 2.5)),
    band("egfr", (45.0, 200.0), (30.0, 250.0)),
    band("alt", (0.0, 80.0), (0.0, 200.0)),
    band("ast", (0.0, 60.0), (0.0, 200.0)),
];

const WHOLE_WORD_MAX_LEN: usize = 3;

/// `normalized` must already be lower-cased.
pub fn name_matches(normalized: &str, key: &str) -> bool {
    if key.len() > WHOLE_WORD_MAX_LEN {
        return normalized.contains(key);
    }
    normalized
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == key)
}

pub fn find_reference(name: &str) -> Option<&'static ReferenceRange> {
    let normalized = name.to_lowercase();
    REFERENCE_RANGES.iter().find(|entry| name_matches(&normalized, entry.key))
}

pub fn find_significance_band(name: &str) -> Option<&'static SignificanceBand> {
    let normalized = name.to_lowercase();
    SIGNIFICANCE_BANDS.iter().find(|entry| name_matches(&normalized, entry.key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fasting_glucose_does_not_fall_into_ast() {
        assert_eq!(find_reference("Fasting Glucose").unwrap().key, "glucose");
        assert_eq!(find_reference("Fasting Insulin").unwrap().key, "insulin");
    }

    #[test]
    fn cholesterol_fractions_resolve_before_total() {
        assert_eq!(find_reference("LDL Cholesterol").unwrap().key, "ldl");
        assert_eq!(find_reference("HDL Cholesterol").unwrap().key, "hdl");
        assert_eq!(find_reference("Total Cholesterol").unwrap().key, "cholesterol");
    }

    #[test]
    fn abbreviations_match_whole_words_only() {
        assert!(find_reference("Fasting C-Peptide").is_none());
        assert!(find_reference("Gastrin").is_none());
        assert!(find_significance_band("Fasting C-Peptide").is_none());
        assert_eq!(find_reference("ALT (SGPT)").unwrap().key, "alt");
        assert_eq!(find_reference("AST").unwrap().key, "ast");
        assert_eq!(find_reference("hs-CRP").unwrap().key, "crp");
        assert_eq!(find_reference("Vitamin B12").unwrap().key, "b12");
        assert_eq!(find_reference("LDL-C").unwrap().key, "ldl");
        assert_eq!(find_significance_band("BUN/Creatinine").unwrap().key, "creatinine");
    }

    #[test]
    fn unknown_marker_has_no_reference() {
        assert!(find_reference("Zonulin").is_none());
        assert!(find_significance_band("Zonulin").is_none());
    }
}
