//! Classified poll failures.

use std::borrow::Cow;
use std::fmt;

/// Why a poll cycle failed.
///
/// Every failure ends the cycle the same way (the previous unit table is kept
/// and the failure is recorded); the kind only tells consumers what went
/// wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureKind {
    /// The endpoint answered 404; the share no longer exists.
    NotFound,
    /// The endpoint answered 401 or 403; the share code is not accepted.
    InvalidCredential,
    /// The endpoint answered 429.
    RateLimited,
    /// No response before the configured timeout.
    Timeout,
    /// The connection could not be established or broke mid-request.
    ConnectionFailure,
    /// A 2xx response whose body is not a structured document.
    MalformedBody,
    /// A structured document without the expected shape.
    SchemaViolation,
    /// Any other non-2xx status.
    HttpError(u16),
}

impl FailureKind {
    /// Machine-readable code reported to the host.
    ///
    /// ```rust
    /// use sharewatch_types::FailureKind;
    ///
    /// assert_eq!(FailureKind::InvalidCredential.code(), "invalid_code");
    /// assert_eq!(FailureKind::HttpError(503).code(), "http_error:503");
    /// ```
    pub fn code(&self) -> Cow<'static, str> {
        match self {
            FailureKind::NotFound => Cow::Borrowed("not_found"),
            FailureKind::InvalidCredential => Cow::Borrowed("invalid_code"),
            FailureKind::RateLimited => Cow::Borrowed("rate_limited"),
            FailureKind::Timeout => Cow::Borrowed("timeout"),
            FailureKind::ConnectionFailure => Cow::Borrowed("connection_failure"),
            FailureKind::MalformedBody => Cow::Borrowed("malformed_body"),
            FailureKind::SchemaViolation => Cow::Borrowed("schema_violation"),
            FailureKind::HttpError(status) => Cow::Owned(format!("http_error:{}", status)),
        }
    }

    /// Whether the failure came from the HTTP status line rather than the
    /// transport or the body.
    pub fn is_status(&self) -> bool {
        matches!(
            self,
            FailureKind::NotFound
                | FailureKind::InvalidCredential
                | FailureKind::RateLimited
                | FailureKind::HttpError(_)
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// A classified failure plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Failure {
    /// What went wrong.
    pub kind: FailureKind,
    /// Detail for logs and diagnostics.
    pub message: String,
}

impl Failure {
    /// Create a new failure.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Machine-readable code of the failure kind.
    pub fn code(&self) -> Cow<'static, str> {
        self.kind.code()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for Failure {}
