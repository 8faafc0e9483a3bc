//! Targets and the tagged result of running one operation against one target

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Stable identifier for one unit of work (normally the article URL)
///
/// Cloning is cheap; equality is by string value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target(Arc<str>);

impl Target {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a failure is worth resubmitting in the next round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Transient: network trouble or server overload
    Retryable,
    /// Stable condition that another attempt cannot fix
    Permanent,
}

/// Why a single unit of work did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("response carried no data")]
    EmptyPayload,

    #[error("malformed response: {0}")]
    MalformedPayload(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("client error: {0}")]
    Client(String),
}

/// Coarse classification of an [`Outcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    Retryable,
    Permanent,
}

impl From<FailureClass> for OutcomeKind {
    fn from(class: FailureClass) -> Self {
        match class {
            FailureClass::Retryable => Self::Retryable,
            FailureClass::Permanent => Self::Permanent,
        }
    }
}

/// Result of executing one operation against one target
///
/// Every variant carries its originating target so retryable failures can
/// be resubmitted and permanent ones reported.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<P> {
    /// The server-side effect is confirmed; fetches carry the extracted record
    Success { target: Target, payload: Option<P> },

    /// Transient failure, the target goes into the next round
    RetryableFailure { target: Target, reason: FailureReason },

    /// Terminal failure, the target is never resubmitted
    PermanentFailure { target: Target, reason: FailureReason },
}

impl<P> Outcome<P> {
    /// Success carrying an extracted payload
    pub fn success(target: Target, payload: P) -> Self {
        Self::Success {
            target,
            payload: Some(payload),
        }
    }

    /// Success of an operation that produces no payload
    pub fn completed(target: Target) -> Self {
        Self::Success {
            target,
            payload: None,
        }
    }

    pub fn retryable(target: Target, reason: FailureReason) -> Self {
        Self::RetryableFailure { target, reason }
    }

    pub fn permanent(target: Target, reason: FailureReason) -> Self {
        Self::PermanentFailure { target, reason }
    }

    /// Builds the failure variant matching a classification
    pub fn failure(class: FailureClass, target: Target, reason: FailureReason) -> Self {
        match class {
            FailureClass::Retryable => Self::retryable(target, reason),
            FailureClass::Permanent => Self::permanent(target, reason),
        }
    }

    pub fn target(&self) -> &Target {
        match self {
            Self::Success { target, .. }
            | Self::RetryableFailure { target, .. }
            | Self::PermanentFailure { target, .. } => target,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Success,
            Self::RetryableFailure { .. } => OutcomeKind::Retryable,
            Self::PermanentFailure { .. } => OutcomeKind::Permanent,
        }
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::RetryableFailure { reason, .. } | Self::PermanentFailure { reason, .. } => {
                Some(reason)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Separates the payload from the classification
    pub fn settle(self) -> (Settled, Option<P>) {
        match self {
            Self::Success { target, payload } => (
                Outcome::Success {
                    target,
                    payload: None,
                },
                payload,
            ),
            Self::RetryableFailure { target, reason } => {
                (Outcome::RetryableFailure { target, reason }, None)
            }
            Self::PermanentFailure { target, reason } => {
                (Outcome::PermanentFailure { target, reason }, None)
            }
        }
    }
}

/// An outcome whose payload has been handed to the aggregator
///
/// Failure variants always carry their reason, so every settled target
/// lands in exactly one of succeeded, pending or failed.
pub type Settled = Outcome<()>;
