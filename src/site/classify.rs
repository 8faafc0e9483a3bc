//! Status and transport error classification
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | HTTP 200 | proceed (success, or payload checks for fetches) |
//! | HTTP 500, 502, 503, 504 | RetryableFailure |
//! | Any other HTTP status | PermanentFailure |
//! | Timeout | RetryableFailure |
//! | Connection / proxy failure | RetryableFailure |
//! | Any other client error | PermanentFailure |
//!
//! New transient conditions go into the two tables below and nowhere else.

use crate::engine::{FailureClass, FailureReason, Outcome, Target};
use reqwest::StatusCode;

/// The only status treated as success
pub const SUCCESS_STATUS: u16 = 200;

/// Non-success statuses with an explicit classification
pub const STATUS_POLICY: &[(u16, FailureClass)] = &[
    (500, FailureClass::Retryable),
    (502, FailureClass::Retryable),
    (503, FailureClass::Retryable),
    (504, FailureClass::Retryable),
];

/// Class for statuses missing from [`STATUS_POLICY`]
pub const DEFAULT_STATUS_CLASS: FailureClass = FailureClass::Permanent;

/// Kinds of transport-level failure reported by the HTTP client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    Timeout,
    /// Connection refused/reset, DNS and proxy failures
    Connect,
    Other,
}

pub const TRANSPORT_POLICY: &[(TransportFault, FailureClass)] = &[
    (TransportFault::Timeout, FailureClass::Retryable),
    (TransportFault::Connect, FailureClass::Retryable),
    (TransportFault::Other, FailureClass::Permanent),
];

impl TransportFault {
    pub fn of(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect
        } else {
            Self::Other
        }
    }

    fn reason(self, error: &reqwest::Error) -> FailureReason {
        match self {
            Self::Timeout => FailureReason::Timeout,
            Self::Connect => FailureReason::Connect(error.to_string()),
            Self::Other => FailureReason::Client(error.to_string()),
        }
    }
}

/// Classifies a response status; `None` means the request succeeded
pub fn classify_status(status: StatusCode) -> Option<FailureClass> {
    let code = status.as_u16();
    if code == SUCCESS_STATUS {
        return None;
    }

    Some(
        STATUS_POLICY
            .iter()
            .find(|(listed, _)| *listed == code)
            .map(|(_, class)| *class)
            .unwrap_or(DEFAULT_STATUS_CLASS),
    )
}

pub fn classify_transport(fault: TransportFault) -> FailureClass {
    TRANSPORT_POLICY
        .iter()
        .find(|(listed, _)| *listed == fault)
        .map(|(_, class)| *class)
        .unwrap_or(FailureClass::Permanent)
}

/// Outcome for a non-200 response
pub fn status_outcome<P>(target: &Target, status: StatusCode) -> Option<Outcome<P>> {
    classify_status(status).map(|class| {
        Outcome::failure(class, target.clone(), FailureReason::Status(status.as_u16()))
    })
}

/// Outcome for a request that never produced a usable response
pub fn transport_outcome<P>(target: &Target, error: &reqwest::Error) -> Outcome<P> {
    let fault = TransportFault::of(error);
    Outcome::failure(
        classify_transport(fault),
        target.clone(),
        fault.reason(error),
    )
}
