//! Check run operations for the GitHub Checks API.
//!
//! Payloads are typed and validated before they are sent. Optional fields
//! left unset are omitted from the JSON body, so GitHub keeps its own
//! defaults for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::{ApiRequest, GitHubAppClient, ANTIOPE_PREVIEW};
use crate::error::{ApiError, ValidationError};

/// GitHub accepts at most this many annotations per create/update request.
pub const MAX_ANNOTATIONS_PER_REQUEST: usize = 50;

/// Lifecycle status of a check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
}

/// Final result of a completed check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    TimedOut,
    ActionRequired,
}

/// Severity of a check run annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    Notice,
    Warning,
    Failure,
}

/// A note attached to a range of lines in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunAnnotation {
    /// Path of the file, relative to the repository root
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    /// Only valid when `start_line == end_line`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    pub annotation_level: AnnotationLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_details: Option<String>,
}

impl CheckRunAnnotation {
    /// Create an annotation over `start_line..=end_line` of `path`.
    pub fn new(
        path: impl Into<String>,
        start_line: u32,
        end_line: u32,
        annotation_level: AnnotationLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            start_line,
            end_line,
            start_column: None,
            end_column: None,
            annotation_level,
            message: message.into(),
            title: None,
            raw_details: None,
        }
    }

    /// Set the annotation title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the raw details shown when the annotation is expanded.
    pub fn with_raw_details(mut self, raw_details: impl Into<String>) -> Self {
        self.raw_details = Some(raw_details.into());
        self
    }

    /// Restrict a single-line annotation to a column range.
    pub fn with_columns(mut self, start_column: u32, end_column: u32) -> Self {
        self.start_column = Some(start_column);
        self.end_column = Some(end_column);
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.path.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "output.annotations.path".to_string(),
            });
        }

        if self.message.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "output.annotations.message".to_string(),
            });
        }

        if self.start_line == 0 || self.end_line < self.start_line {
            return Err(ValidationError::OutOfRange {
                field: "output.annotations.end_line".to_string(),
                message: format!(
                    "line range {}..{} must start at 1 and not run backwards",
                    self.start_line, self.end_line
                ),
            });
        }

        if self.start_column.is_some() || self.end_column.is_some() {
            if self.start_line != self.end_line {
                return Err(ValidationError::InvalidFormat {
                    field: "output.annotations.start_column".to_string(),
                    message: "columns are only allowed on single-line annotations".to_string(),
                });
            }

            if let (Some(start), Some(end)) = (self.start_column, self.end_column) {
                if end < start {
                    return Err(ValidationError::OutOfRange {
                        field: "output.annotations.end_column".to_string(),
                        message: format!("column range {}..{} runs backwards", start, end),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Output summary of a check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunOutput {
    pub title: String,
    /// Markdown summary
    pub summary: String,
    /// Markdown details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<CheckRunAnnotation>,
}

impl CheckRunOutput {
    /// Create an output with a title and summary.
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            text: None,
            annotations: Vec::new(),
        }
    }

    /// Set the Markdown details.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append an annotation.
    pub fn with_annotation(mut self, annotation: CheckRunAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "output.title".to_string(),
            });
        }

        if self.summary.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "output.summary".to_string(),
            });
        }

        if self.annotations.len() > MAX_ANNOTATIONS_PER_REQUEST {
            return Err(ValidationError::OutOfRange {
                field: "output.annotations".to_string(),
                message: format!(
                    "{} annotations given, at most {} allowed per request",
                    self.annotations.len(),
                    MAX_ANNOTATIONS_PER_REQUEST
                ),
            });
        }

        self.annotations
            .iter()
            .try_for_each(CheckRunAnnotation::validate)
    }
}

/// Request body for creating a check run.
///
/// # Examples
///
/// ```
/// use github_app_client::client::{CheckRunStatus, CreateCheckRun};
///
/// let check = CreateCheckRun::new("pytest", "ca3944e").with_status(CheckRunStatus::Queued);
/// assert!(check.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCheckRun {
    pub name: String,
    pub head_sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckRunStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<CheckRunConclusion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<CheckRunOutput>,
}

impl CreateCheckRun {
    /// Create a check run named `name` for commit `head_sha`.
    pub fn new(name: impl Into<String>, head_sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            head_sha: head_sha.into(),
            details_url: None,
            external_id: None,
            status: None,
            started_at: None,
            conclusion: None,
            completed_at: None,
            output: None,
        }
    }

    pub fn with_details_url(mut self, details_url: impl Into<String>) -> Self {
        self.details_url = Some(details_url.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_status(mut self, status: CheckRunStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn with_conclusion(mut self, conclusion: CheckRunConclusion) -> Self {
        self.conclusion = Some(conclusion);
        self
    }

    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    pub fn with_output(mut self, output: CheckRunOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Check the payload against the rules GitHub enforces.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `name` or `head_sha` is empty, a
    /// conclusion or completion time accompanies a status other than
    /// `completed`, or the output is malformed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            });
        }

        if self.head_sha.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "head_sha".to_string(),
            });
        }

        validate_lifecycle(self.status, self.conclusion, self.completed_at)?;

        match &self.output {
            Some(output) => output.validate(),
            None => Ok(()),
        }
    }
}

/// Request body for updating a check run. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCheckRun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckRunStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<CheckRunConclusion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<CheckRunOutput>,
}

impl UpdateCheckRun {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_details_url(mut self, details_url: impl Into<String>) -> Self {
        self.details_url = Some(details_url.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_status(mut self, status: CheckRunStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn with_conclusion(mut self, conclusion: CheckRunConclusion) -> Self {
        self.conclusion = Some(conclusion);
        self
    }

    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    pub fn with_output(mut self, output: CheckRunOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Check the payload against the rules GitHub enforces.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "name".to_string(),
                });
            }
        }

        validate_lifecycle(self.status, self.conclusion, self.completed_at)?;

        match &self.output {
            Some(output) => output.validate(),
            None => Ok(()),
        }
    }
}

/// A conclusion or completion time implies the run is completed, so it may
/// not be combined with an explicit earlier status.
fn validate_lifecycle(
    status: Option<CheckRunStatus>,
    conclusion: Option<CheckRunConclusion>,
    completed_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    let Some(status) = status else {
        return Ok(());
    };

    if status == CheckRunStatus::Completed {
        return Ok(());
    }

    if conclusion.is_some() {
        return Err(ValidationError::InvalidFormat {
            field: "conclusion".to_string(),
            message: "a conclusion requires status 'completed'".to_string(),
        });
    }

    if completed_at.is_some() {
        return Err(ValidationError::InvalidFormat {
            field: "completed_at".to_string(),
            message: "a completion time requires status 'completed'".to_string(),
        });
    }

    Ok(())
}

impl GitHubAppClient {
    /// Create a check run on a commit.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` without contacting GitHub if the
    /// payload fails validation.
    pub async fn create_check_run(
        &self,
        owner: &str,
        repo: &str,
        check: &CreateCheckRun,
    ) -> Result<Value, ApiError> {
        check.validate()?;
        debug!(
            owner,
            repo,
            name = %check.name,
            head_sha = %check.head_sha,
            "Creating check run"
        );

        let request = ApiRequest::post(
            format!("repos/{}/{}/check-runs", owner, repo),
            serde_json::to_value(check)?,
        )
        .as_installation()
        .with_accept(ANTIOPE_PREVIEW);

        self.execute(request).await
    }

    /// Update an existing check run.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` without contacting GitHub if the
    /// payload fails validation.
    pub async fn update_check_run(
        &self,
        owner: &str,
        repo: &str,
        check_run_id: u64,
        check: &UpdateCheckRun,
    ) -> Result<Value, ApiError> {
        check.validate()?;
        debug!(owner, repo, check_run_id, "Updating check run");

        let request = ApiRequest::patch(
            format!("repos/{}/{}/check-runs/{}", owner, repo, check_run_id),
            serde_json::to_value(check)?,
        )
        .as_installation()
        .with_accept(ANTIOPE_PREVIEW);

        self.execute(request).await
    }
}

#[cfg(test)]
#[path = "check_run_tests.rs"]
mod tests;
