//! Per-parameter bind outcomes.

use std::fmt;

use blobbind_store::BlobObject;

/// The result of binding one input parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindOutcome {
    /// The parameter was bound to this blob.
    Bound(BlobObject),
    /// Binding failed with this message.
    Failed(String),
}

/// A bound (or failed) parameter together with a one-line status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindStatus {
    pub parameter: String,
    pub outcome: BindOutcome,
}

impl BindStatus {
    pub fn bound(parameter: impl Into<String>, blob: BlobObject) -> Self {
        Self {
            parameter: parameter.into(),
            outcome: BindOutcome::Bound(blob),
        }
    }

    pub fn failed(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            outcome: BindOutcome::Failed(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, BindOutcome::Failed(_))
    }

    /// The bound blob, if binding succeeded.
    pub fn blob(&self) -> Option<&BlobObject> {
        match &self.outcome {
            BindOutcome::Bound(blob) => Some(blob),
            BindOutcome::Failed(_) => None,
        }
    }

    /// Single-line status text. Line breaks in error messages become `"; "`
    /// so the status fits one log or dashboard line.
    pub fn status(&self) -> String {
        match &self.outcome {
            BindOutcome::Bound(blob) => format!("Bound to {}/{}", blob.container, blob.name),
            BindOutcome::Failed(message) => single_line(message),
        }
    }
}

impl fmt::Display for BindStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.parameter, self.status())
    }
}

fn single_line(message: &str) -> String {
    message
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_with_new_lines_is_flattened() {
        let status = BindStatus::failed("input", "Some\r\nmessage\r\nwith\r\nnew lines");
        assert!(status.is_error());
        assert_eq!(status.status(), "Some; message; with; new lines");
    }

    #[test]
    fn bare_line_feeds_are_flattened() {
        let status = BindStatus::failed("input", "a\nb\rc");
        assert_eq!(status.status(), "a; b; c");
    }

    #[test]
    fn single_line_message_is_unchanged() {
        let status = BindStatus::failed("input", "blob not found: c/x");
        assert_eq!(status.status(), "blob not found: c/x");
        assert_eq!(status.to_string(), "input: blob not found: c/x");
        assert!(status.blob().is_none());
    }
}
