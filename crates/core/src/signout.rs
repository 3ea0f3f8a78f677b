//! Signout documents: the create payload, the persisted record and its identifier.
//!
//! A signout is created exactly once by the composer and is never mutated afterwards.
//! Scoring is keyed by [`SignoutId`] and does not touch the record.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use signout_types::NonEmptyText;
use std::fmt;
use std::str::FromStr;

/// Illness severity on the I-PASS scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IllnessSeverity {
    #[default]
    Stable,
    Watcher,
    Unstable,
}

impl IllnessSeverity {
    pub const ALL: [IllnessSeverity; 3] = [Self::Stable, Self::Watcher, Self::Unstable];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Watcher => "Watcher",
            Self::Unstable => "Unstable",
        }
    }
}

impl fmt::Display for IllnessSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown illness severity {0:?} (expected Stable, Watcher or Unstable)")]
pub struct UnknownSeverity(pub String);

impl FromStr for IllnessSeverity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}

/// Service-assigned signout identifier.
///
/// Opaque: the client never derives meaning from its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignoutId(NonEmptyText);

impl SignoutId {
    /// Parse an identifier supplied by a user or a link.
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        NonEmptyText::new(raw).ok().map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SignoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The narrative fields of a signout, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignoutField {
    PatientSummary,
    ActionList,
    SituationalAwareness,
    ContingencyPlans,
    ReceiverSynthesis,
}

impl SignoutField {
    pub const REQUIRED: [SignoutField; 5] = [
        Self::PatientSummary,
        Self::ActionList,
        Self::SituationalAwareness,
        Self::ContingencyPlans,
        Self::ReceiverSynthesis,
    ];

    /// Label shown to the trainee.
    pub fn label(self) -> &'static str {
        match self {
            Self::PatientSummary => "Patient summary",
            Self::ActionList => "Action list",
            Self::SituationalAwareness => "Situational awareness",
            Self::ContingencyPlans => "Contingency plans",
            Self::ReceiverSynthesis => "Receiver synthesis",
        }
    }
}

impl fmt::Display for SignoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Body of `POST /api/signouts`.
///
/// Only the composer builds one, after validation; every narrative field is already
/// guaranteed non-blank and `free_text` is `None` rather than `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSignout {
    pub case_id: String,
    pub illness_severity: IllnessSeverity,
    pub patient_summary: NonEmptyText,
    pub action_list: NonEmptyText,
    pub situational_awareness: NonEmptyText,
    pub contingency_plans: NonEmptyText,
    pub receiver_synthesis: NonEmptyText,
    pub free_text: Option<String>,
}

/// Response to a successful create.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignoutCreated {
    pub signout_id: SignoutId,
}

/// A persisted signout (`GET /api/signouts/{id}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Signout {
    pub id: SignoutId,
    pub case_id: String,
    /// Raw ISO-8601 string as sent by the service; see [`Signout::created_at_parsed`].
    pub created_at: String,
    pub illness_severity: IllnessSeverity,
    pub patient_summary: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub action_list: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub situational_awareness: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub contingency_plans: String,
    pub receiver_synthesis: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub free_text: Option<String>,
}

impl Signout {
    /// The action list decomposed into individual items.
    pub fn action_items(&self) -> Vec<&str> {
        signout_types::action_items(&self.action_list)
    }

    /// Creation time for display. `None` if the service sent something unparsable.
    pub fn created_at_parsed(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.created_at)
    }
}

/// Entry returned by `GET /api/signouts?case_id=…`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignoutMetadata {
    pub id: SignoutId,
    pub created_at: String,
}

impl SignoutMetadata {
    pub fn created_at_parsed(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.created_at)
    }
}

/// Parse an ISO-8601 timestamp. Offset-less values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Accepts either a single text or an array of lines (joined with `\n`).
fn text_or_lines<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrLines {
        Text(String),
        Lines(Vec<String>),
    }

    Ok(match TextOrLines::deserialize(deserializer)? {
        TextOrLines::Text(text) => text,
        TextOrLines::Lines(lines) => lines.join("\n"),
    })
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(signout_types::optional_text(value.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn record_json(free_text: &str) -> String {
        format!(
            r#"{{
                "id": "7f1c",
                "case_id": "case-001",
                "created_at": "2026-03-04T21:15:09.123456Z",
                "illness_severity": "Watcher",
                "patient_summary": "67M POD2, febrile",
                "action_list": ["recheck lactate", "f/u cultures"],
                "situational_awareness": "may need ICU",
                "contingency_plans": ["if MAP < 65 give 1L", "call surgery"],
                "receiver_synthesis": "will recheck at 2am"{free_text}
            }}"#
        )
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("unstable".parse::<IllnessSeverity>(), Ok(IllnessSeverity::Unstable));
        assert_eq!(" Watcher ".parse::<IllnessSeverity>(), Ok(IllnessSeverity::Watcher));
        assert!("critical".parse::<IllnessSeverity>().is_err());
        assert_eq!(IllnessSeverity::default(), IllnessSeverity::Stable);
    }

    #[test]
    fn severity_wire_format_is_capitalised() {
        assert_eq!(
            serde_json::to_string(&IllnessSeverity::Unstable).unwrap(),
            "\"Unstable\""
        );
    }

    #[test]
    fn signout_accepts_line_arrays_for_list_fields() {
        let signout: Signout = serde_json::from_str(&record_json("")).unwrap();
        assert_eq!(signout.action_list, "recheck lactate\nf/u cultures");
        assert_eq!(signout.action_items(), vec!["recheck lactate", "f/u cultures"]);
        assert_eq!(signout.situational_awareness, "may need ICU");
        assert_eq!(signout.illness_severity, IllnessSeverity::Watcher);
    }

    #[test]
    fn free_text_missing_null_or_blank_is_absent() {
        for extra in ["", r#", "free_text": null"#, r#", "free_text": "  ""#] {
            let signout: Signout = serde_json::from_str(&record_json(extra)).unwrap();
            assert_eq!(signout.free_text, None, "case: {extra:?}");
        }
        let signout: Signout =
            serde_json::from_str(&record_json(r#", "free_text": "family updated""#)).unwrap();
        assert_eq!(signout.free_text.as_deref(), Some("family updated"));
    }

    #[test]
    fn created_at_is_kept_raw_and_parsed_for_display() {
        let signout: Signout = serde_json::from_str(&record_json("")).unwrap();
        assert_eq!(signout.created_at, "2026-03-04T21:15:09.123456Z");
        let ts = signout.created_at_parsed().unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2026, 3, 4, 21));
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let ts = parse_timestamp("2026-03-04T21:15:09.5").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn new_signout_sends_null_free_text() {
        let payload = NewSignout {
            case_id: "case-001".into(),
            illness_severity: IllnessSeverity::Unstable,
            patient_summary: NonEmptyText::new("a").unwrap(),
            action_list: NonEmptyText::new("b").unwrap(),
            situational_awareness: NonEmptyText::new("c").unwrap(),
            contingency_plans: NonEmptyText::new("d").unwrap(),
            receiver_synthesis: NonEmptyText::new("e").unwrap(),
            free_text: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["free_text"].is_null());
        assert_eq!(value["illness_severity"], "Unstable");
        assert_eq!(value["action_list"], "b");
    }

    #[test]
    fn signout_id_rejects_blank() {
        assert!(SignoutId::parse("  ").is_none());
        assert_eq!(SignoutId::parse(" abc ").unwrap().as_str(), "abc");
    }
}
