//! Advisory HTTP statuses for rejection reasons.
//!
//! The HTTP layer is free to answer differently; the table only records the usual choice.

use crate::error::WebhookErrorKind;

/// Recommended status per rejection reason.
pub const STATUS_TABLE: &[(WebhookErrorKind, u16)] = &[
    (WebhookErrorKind::MissingCredential, 401),
    (WebhookErrorKind::MalformedCredential, 401),
    (WebhookErrorKind::SignatureMismatch, 401),
    (WebhookErrorKind::TimestampExpired, 401),
    (WebhookErrorKind::TimestampInFuture, 401),
    (WebhookErrorKind::ConfigurationError, 500),
    (WebhookErrorKind::BodyReadError, 400),
];

/// Look up the recommended status for `reason`.
pub fn recommended_status(reason: WebhookErrorKind) -> u16 {
    STATUS_TABLE
        .iter()
        .find(|(kind, _)| *kind == reason)
        .map(|(_, status)| *status)
        .unwrap_or(500)
}
