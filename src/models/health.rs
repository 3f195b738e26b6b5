use serde::{ Deserialize, Serialize };
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerSnapshot {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl BiomarkerSnapshot {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self { name: name.into(), value, unit: unit.into() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

impl ProfileSnapshot {
    pub fn bmi(&self) -> Option<f64> {
        match (self.height_cm, self.weight_kg) {
            (Some(height), Some(weight)) if height > 0.0 => {
                let meters = height / 100.0;
                Some(weight / (meters * meters))
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.gender.is_none() && self.height_cm.is_none() && self.weight_kg.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    #[serde(default)]
    pub overall: Option<f64>,
    #[serde(default)]
    pub cardiovascular: Option<f64>,
    #[serde(default)]
    pub metabolic: Option<f64>,
    #[serde(default)]
    pub nutrition: Option<f64>,
    #[serde(default)]
    pub fitness: Option<f64>,
    #[serde(default)]
    pub sleep: Option<f64>,
    #[serde(default)]
    pub stress: Option<f64>,
}

impl HealthScore {
    /// Present scores in display order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        [
            ("Overall", self.overall),
            ("Cardiovascular", self.cardiovascular),
            ("Metabolic", self.metabolic),
            ("Nutrition", self.nutrition),
            ("Fitness", self.fitness),
            ("Sleep", self.sleep),
            ("Stress", self.stress),
        ]
            .into_iter()
            .filter_map(|(label, value)| value.map(|v| (label, v)))
            .collect()
    }
}

/// Read-only view of the user's health record handed in by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    #[serde(default)]
    pub profile: Option<ProfileSnapshot>,
    #[serde(default)]
    pub biomarkers: Vec<BiomarkerSnapshot>,
    #[serde(default)]
    pub health_score: Option<HealthScore>,
}

impl HealthSnapshot {
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.biomarkers.is_empty() {
            parts.push(format!("{} biomarker(s)", self.biomarkers.len()));
        }
        if let Some(overall) = self.health_score.as_ref().and_then(|s| s.overall) {
            parts.push(format!("health score {:.0}", overall));
        }
        if self.profile.as_ref().map(|p| !p.is_empty()).unwrap_or(false) {
            parts.push("profile".to_string());
        }
        if parts.is_empty() { None } else { Some(parts.join(", ")) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiomarkerStatus {
    Optimal,
    Normal,
    Low,
    High,
    WithinRange,
}

impl BiomarkerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BiomarkerStatus::Optimal => "Optimal",
            BiomarkerStatus::Normal => "Normal",
            BiomarkerStatus::Low => "Low",
            BiomarkerStatus::High => "High",
            BiomarkerStatus::WithinRange => "Within range",
        }
    }
}

impl fmt::Display for BiomarkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Normal,
    Concerning,
    Critical,
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Significance::Normal => "normal",
            Significance::Concerning => "concerning",
            Significance::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        };
        write!(f, "{}", s)
    }
}
