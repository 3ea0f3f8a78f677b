//! Rubric scores returned by `POST /api/signouts/{id}/score`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The service's graded evaluation of one signout.
///
/// Has no identity of its own: every scoring request yields a fresh value which replaces
/// whatever was shown before. `rubric_version` must always be displayed so that a score
/// produced by an older rubric can be told apart from a current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    pub total_score: f64,
    pub rubric_version: String,
    #[serde(default)]
    pub subscores: IndexMap<String, f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub missing_critical: Vec<String>,
}

impl RubricScore {
    /// True when the grader flagged at least one critical omission.
    pub fn has_critical_gaps(&self) -> bool {
        !self.missing_critical.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_score_keeping_domain_order() {
        let score: RubricScore = serde_json::from_str(
            r#"{
                "strengths": ["clear severity"],
                "improvements": ["name the contingency trigger"],
                "missing_critical": [],
                "subscores": {"illness_severity": 2, "patient_summary": 1.5, "action_list": 2},
                "total_score": 5.5,
                "rubric_version": "ipass-v2"
            }"#,
        )
        .unwrap();

        assert_eq!(score.total_score, 5.5);
        assert_eq!(score.rubric_version, "ipass-v2");
        let domains: Vec<&str> = score.subscores.keys().map(String::as_str).collect();
        assert_eq!(domains, vec!["illness_severity", "patient_summary", "action_list"]);
        assert!(!score.has_critical_gaps());
    }

    #[test]
    fn finding_lists_default_to_empty() {
        let score: RubricScore =
            serde_json::from_str(r#"{"total_score": 0, "rubric_version": "v1"}"#).unwrap();
        assert!(score.subscores.is_empty());
        assert!(score.strengths.is_empty());
        assert!(score.missing_critical.is_empty());
    }
}
