//! Outcome of a single attempt, as seen by the retry policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unified classification of an attempt result.
///
/// The policy treats `NoResult` (soft failure) and `Failed` the same way;
/// the split only exists so logs can say which one happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptOutcome {
    /// A usable result, e.g. the URL of the generated video.
    Produced(String),

    /// Completed without error but without a usable result.
    NoResult,

    /// The operation returned an error.
    Failed(String),
}

impl AttemptOutcome {
    /// Classify an operation result. A blank URL counts as no result.
    pub fn from_result<E: fmt::Display>(result: Result<Option<String>, E>) -> Self {
        match result {
            Ok(Some(url)) if !url.trim().is_empty() => AttemptOutcome::Produced(url),
            Ok(_) => AttemptOutcome::NoResult,
            Err(e) => AttemptOutcome::Failed(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Produced(_))
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Produced(url) => write!(f, "produced {url}"),
            AttemptOutcome::NoResult => f.write_str("no result"),
            AttemptOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::url(Ok(Some("https://cdn/v.mp4".to_string())), AttemptOutcome::Produced("https://cdn/v.mp4".to_string()))]
    #[case::none(Ok(None), AttemptOutcome::NoResult)]
    #[case::empty(Ok(Some(String::new())), AttemptOutcome::NoResult)]
    #[case::blank(Ok(Some("  ".to_string())), AttemptOutcome::NoResult)]
    #[case::error(Err("timeout".to_string()), AttemptOutcome::Failed("timeout".to_string()))]
    fn classifies_results(
        #[case] result: Result<Option<String>, String>,
        #[case] expected: AttemptOutcome,
    ) {
        assert_eq!(AttemptOutcome::from_result(result), expected);
    }

    #[test]
    fn serializes_with_screaming_kind() {
        let v = serde_json::to_value(AttemptOutcome::NoResult).unwrap();
        assert_eq!(v["kind"], "NO_RESULT");
    }
}
