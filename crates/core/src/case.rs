//! Case records as served by the signout service.
//!
//! Cases and their snapshots are owned by the service; this crate only reads them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entry in the case list (`GET /api/cases`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub case_id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub difficulty: String,
}

/// Full case (`GET /api/cases/{case_id}?mode=…`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetail {
    pub case_id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub snapshot: CaseSnapshot,
    /// Only present when the service chose to reveal it (practice mode).
    #[serde(default)]
    pub hidden_truth: Option<HiddenTruth>,
}

/// Point-in-time clinical state shown for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub one_liner: String,
    #[serde(default)]
    pub active_problems: Vec<String>,
    #[serde(default)]
    pub vitals: IndexMap<String, ClinicalValue>,
    #[serde(default)]
    pub labs: IndexMap<String, ClinicalValue>,
    #[serde(default)]
    pub meds: Vec<String>,
    #[serde(default)]
    pub pending: Vec<String>,
    pub code_status: String,
}

impl CaseSnapshot {
    /// Look up a vital sign.
    ///
    /// `None` means the parameter was not recorded at all, which is different from
    /// `Some(ClinicalValue::NotMeasured)`.
    pub fn vital(&self, name: &str) -> Option<&ClinicalValue> {
        self.vitals.get(name)
    }

    pub fn lab(&self, name: &str) -> Option<&ClinicalValue> {
        self.labs.get(name)
    }
}

/// Answer key the service may attach in practice mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenTruth {
    pub diagnosis: String,
    #[serde(default)]
    pub pitfalls: Vec<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

/// A single vitals or labs value.
///
/// JSON `null` is a recorded clinical fact ("unknown / not measured"), so it gets its own
/// variant instead of collapsing into `Option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClinicalValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
    NotMeasured,
}

impl fmt::Display for ClinicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::NotMeasured => f.write_str("not measured"),
        }
    }
}

/// Presentation mode forwarded verbatim to the service.
///
/// The client never interprets the mode; `exam` and `practice` are the two values the
/// service currently understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewMode(String);

impl ViewMode {
    pub fn new(mode: impl Into<String>) -> Self {
        Self(mode.into())
    }

    pub fn exam() -> Self {
        Self::new("exam")
    }

    pub fn practice() -> Self {
        Self::new("practice")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ViewMode {
    fn default() -> Self {
        Self::exam()
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_json() -> &'static str {
        r#"{
            "one_liner": "67M POD2 after hemicolectomy, new fever",
            "active_problems": ["Fever", "AKI"],
            "vitals": {"HR": 112, "Temp": 38.6, "BP": "94/58", "on_O2": true, "RR": null},
            "labs": {"K": 5.9, "lactate": null},
            "meds": ["pip-tazo"],
            "pending": ["blood cultures"],
            "code_status": "Full Code"
        }"#
    }

    #[test]
    fn null_and_absent_vitals_are_distinct() {
        let snapshot: CaseSnapshot = serde_json::from_str(snapshot_json()).unwrap();

        assert_eq!(snapshot.vital("RR"), Some(&ClinicalValue::NotMeasured));
        assert_eq!(snapshot.vital("SpO2"), None);
        assert_eq!(snapshot.lab("lactate"), Some(&ClinicalValue::NotMeasured));
        assert_eq!(snapshot.lab("Mg"), None);
    }

    #[test]
    fn clinical_values_keep_their_type_and_order() {
        let snapshot: CaseSnapshot = serde_json::from_str(snapshot_json()).unwrap();

        let keys: Vec<&str> = snapshot.vitals.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["HR", "Temp", "BP", "on_O2", "RR"]);

        assert_eq!(snapshot.vital("HR").unwrap().to_string(), "112");
        assert_eq!(snapshot.vital("Temp").unwrap().to_string(), "38.6");
        assert_eq!(
            snapshot.vital("BP"),
            Some(&ClinicalValue::Text("94/58".into()))
        );
        assert_eq!(snapshot.vital("on_O2"), Some(&ClinicalValue::Flag(true)));
        assert_eq!(snapshot.vital("RR").unwrap().to_string(), "not measured");
    }

    #[test]
    fn not_measured_serialises_back_to_null() {
        let value = serde_json::to_value(ClinicalValue::NotMeasured).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn exam_detail_has_no_hidden_truth() {
        let json = format!(
            r#"{{"case_id":"case-001","title":"Post-op fever","tags":["surgery"],"difficulty":"medium","snapshot":{}}}"#,
            snapshot_json()
        );
        let detail: CaseDetail = serde_json::from_str(&json).unwrap();
        assert!(detail.hidden_truth.is_none());
        assert_eq!(detail.difficulty.as_deref(), Some("medium"));
    }
}
