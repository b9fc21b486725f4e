use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Category of a payment notification, taken from its `eventCode` field.
///
/// Classification is a pure mapping; unknown codes are kept verbatim in
/// `Unrecognized` and are never an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum EventCode {
    Authorisation,
    Cancellation,
    Refund,
    CancelOrRefund,
    Capture,
    RefundedReversed,
    CaptureFailed,
    RequestForInformation,
    NotificationOfChargeback,
    Chargeback,
    ChargebackReversed,
    ReportAvailable,
    Unrecognized(String),
}

impl EventCode {
    pub fn classify(code: &str) -> Self {
        match code {
            "AUTHORISATION" => Self::Authorisation,
            "CANCELLATION" => Self::Cancellation,
            "REFUND" => Self::Refund,
            "CANCEL_OR_REFUND" => Self::CancelOrRefund,
            "CAPTURE" => Self::Capture,
            "REFUNDED_REVERSED" => Self::RefundedReversed,
            "CAPTURE_FAILED" => Self::CaptureFailed,
            "REQUEST_FOR_INFORMATION" => Self::RequestForInformation,
            "NOTIFICATION_OF_CHARGEBACK" => Self::NotificationOfChargeback,
            "CHARGEBACK" => Self::Chargeback,
            "CHARGEBACK_REVERSED" => Self::ChargebackReversed,
            "REPORT_AVAILABLE" => Self::ReportAvailable,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// The wire value of this code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authorisation => "AUTHORISATION",
            Self::Cancellation => "CANCELLATION",
            Self::Refund => "REFUND",
            Self::CancelOrRefund => "CANCEL_OR_REFUND",
            Self::Capture => "CAPTURE",
            Self::RefundedReversed => "REFUNDED_REVERSED",
            Self::CaptureFailed => "CAPTURE_FAILED",
            Self::RequestForInformation => "REQUEST_FOR_INFORMATION",
            Self::NotificationOfChargeback => "NOTIFICATION_OF_CHARGEBACK",
            Self::Chargeback => "CHARGEBACK",
            Self::ChargebackReversed => "CHARGEBACK_REVERSED",
            Self::ReportAvailable => "REPORT_AVAILABLE",
            Self::Unrecognized(code) => code,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Human readable meaning of the event.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Authorisation => "payment authorisation result; consult success and reason",
            Self::Cancellation => "payment cancelled",
            Self::Refund => "payment refunded",
            Self::CancelOrRefund => "payment cancelled or refunded",
            Self::Capture => "payment captured",
            Self::RefundedReversed => "refund reversed",
            Self::CaptureFailed => "capture failed",
            Self::RequestForInformation => "information requested",
            Self::NotificationOfChargeback => "chargeback pending, can still be defended",
            Self::Chargeback => "chargeback finalised",
            Self::ChargebackReversed => "chargeback reversed",
            Self::ReportAvailable => "report available; URL is in reason",
            Self::Unrecognized(_) => "unclassified event",
        }
    }

    /// Label used for metrics; unknown codes collapse to one series.
    pub fn metric_label(&self) -> &str {
        match self {
            Self::Unrecognized(_) => "UNRECOGNIZED",
            other => other.as_str(),
        }
    }
}

impl FromStr for EventCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::classify(s))
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EventCode> for String {
    fn from(code: EventCode) -> Self {
        match code {
            EventCode::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}
