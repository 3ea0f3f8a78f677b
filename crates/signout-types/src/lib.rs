//! # Signout Types
//!
//! Validated text primitives shared by the signout data model and the composer.
//!
//! - [`NonEmptyText`] guarantees a trimmed, non-blank string.
//! - [`action_items`] splits a free-text action list into its individual items.
//! - [`optional_text`] normalises blank optional text to `None`.

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so a
/// narrative field made only of spaces or newlines is rejected the same way as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Splits a free-text list into its items: one item per line, trimmed, blank lines dropped.
///
/// Common list markers (`-`, `*`, `•`) at the start of a line are stripped so that
/// `"- call cardiology"` and `"call cardiology"` produce the same item.
pub fn action_items(text: &str) -> Vec<&str> {
    text.lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix(['-', '*', '•'])
                .map(str::trim_start)
                .unwrap_or(line)
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Normalises optional free text: blank input becomes `None`, anything else is trimmed.
pub fn optional_text(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  febrile overnight \n").unwrap();
        assert_eq!(text.as_str(), "febrile overnight");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new(" \n\t "), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_blank() {
        let err = serde_json::from_str::<NonEmptyText>("\"   \"");
        assert!(err.is_err());
        let ok: NonEmptyText = serde_json::from_str("\"DNR\"").unwrap();
        assert_eq!(ok.as_str(), "DNR");
    }

    #[test]
    fn action_items_splits_lines_and_strips_markers() {
        let items = action_items("- recheck K at 22:00\n\n* f/u blood cultures\n  page ICU if MAP < 65  ");
        assert_eq!(
            items,
            vec![
                "recheck K at 22:00",
                "f/u blood cultures",
                "page ICU if MAP < 65"
            ]
        );
    }

    #[test]
    fn action_items_of_blank_text_is_empty() {
        assert!(action_items(" \n - \n").is_empty());
    }

    #[test]
    fn optional_text_normalises_blank_to_none() {
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(Some(" note ")), Some("note".to_string()));
    }
}
