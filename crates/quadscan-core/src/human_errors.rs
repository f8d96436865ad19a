// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the presentation layer.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the front end presents it.

use crate::error::QuadscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// User must do something (pick another photo, fix a setting).
    ActionRequired,
    /// Cannot be fixed by the user from inside the app.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.message, self.suggestion)
    }
}

/// Convert a `QuadscanError` into a `HumanError`.
pub fn humanize_error(err: &QuadscanError) -> HumanError {
    match err {
        QuadscanError::InvalidImage(detail) => HumanError {
            message: "This picture can't be analysed.".into(),
            suggestion: format!("Try a different photo. ({detail})"),
            severity: Severity::ActionRequired,
        },

        QuadscanError::ImageError(detail) => {
            if detail.starts_with("failed to decode") {
                HumanError {
                    message: "We couldn't read this picture.".into(),
                    suggestion: "Save it as a JPEG or PNG and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if detail.starts_with("failed to write") {
                HumanError {
                    message: "We couldn't save the result.".into(),
                    suggestion: format!(
                        "Check the output path and use a .png or .jpg extension. ({detail})"
                    ),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "Something went wrong while processing the picture.".into(),
                    suggestion: format!("Try again with another photo. ({detail})"),
                    severity: Severity::Permanent,
                }
            }
        }

        QuadscanError::InvalidConfig(detail) => HumanError {
            message: "One of the detection settings is not valid.".into(),
            suggestion: format!("Fix the setting or remove it to use the default. ({detail})"),
            severity: Severity::ActionRequired,
        },

        QuadscanError::Io(io) => match io.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file could not be found.".into(),
                suggestion: "Check the path and try again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We're not allowed to open that file.".into(),
                suggestion: "Check the file permissions, or copy it somewhere you own.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Something went wrong reading or writing a file.".into(),
                suggestion: format!("Try again. (Detail: {io})"),
                severity: Severity::Permanent,
            },
        },

        QuadscanError::Serialization(detail) => HumanError {
            message: "The settings file is not valid JSON.".into(),
            suggestion: format!("Fix the file or start from the defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}
