//! Classification of destination API failures.
//!
//! Every decision about whether a failed mutating call can be skipped, retried
//! or must abort the run is made from the [`RULES`] table below, matched
//! against the lower-cased, whitespace-collapsed failure text.

use crate::github::ApiFailure;
use serde::Serialize;

/// How the caller must react to a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The desired end state already exists. Log and move on.
    Skippable,
    /// The resource may not be visible yet. Wait and check again.
    Retryable,
    /// Abort the run.
    Fatal,
}

/// Result of classifying a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The class the failure falls in.
    pub class: ErrorClass,
    /// Short label for logs.
    pub reason: &'static str,
}

struct Rule {
    /// All patterns must occur in the normalized text.
    patterns: &'static [&'static str],
    class: ErrorClass,
    reason: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        patterns: &["name already exists"],
        class: ErrorClass::Skippable,
        reason: "repository already exists",
    },
    Rule {
        patterns: &["a pull request already exists"],
        class: ErrorClass::Skippable,
        reason: "pull request already exists",
    },
    Rule {
        patterns: &[
            "validation failed",
            "resource:pullrequest",
            "field:head",
            "code:invalid",
        ],
        class: ErrorClass::Skippable,
        reason: "source branch no longer exists",
    },
    Rule {
        patterns: &["404", "not found"],
        class: ErrorClass::Retryable,
        reason: "not visible yet",
    },
];

/// Lower-cases and collapses runs of whitespace.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Classifies raw failure text. The first matching rule wins.
#[must_use]
pub fn classify_text(text: &str) -> Classification {
    let normalized = normalize(text);

    RULES
        .iter()
        .find(|rule| rule.patterns.iter().all(|p| normalized.contains(p)))
        .map_or(
            Classification {
                class: ErrorClass::Fatal,
                reason: "unrecognised failure",
            },
            |rule| Classification {
                class: rule.class,
                reason: rule.reason,
            },
        )
}

/// Classifies a failed destination API call.
#[must_use]
pub fn classify(failure: &ApiFailure) -> Classification {
    classify_text(&failure.to_string())
}
