//! Status enums for orders, quote requests and custom domains.
//!
//! Each enum maps to a Postgres enum in the `commerce` schema and owns its
//! allowed transitions, so the admin API and the repositories agree on what
//! a legal status change is.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a status from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct StatusParseError {
    kind: &'static str,
    value: String,
}

macro_rules! status_strings {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// The lowercase wire/database name of this status.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $ty {
            type Err = StatusParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(StatusParseError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

status_strings!(OrderStatus, "order status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether an order may move from `self` to `next`.
    ///
    /// Orders can be cancelled until they ship.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the order's subtotal counts toward revenue.
    #[must_use]
    pub const fn counts_as_revenue(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Quote request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.quote_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Quoted,
    Accepted,
    Rejected,
    Converted,
    Expired,
}

status_strings!(QuoteStatus, "quote status", {
    Pending => "pending",
    Quoted => "quoted",
    Accepted => "accepted",
    Rejected => "rejected",
    Converted => "converted",
    Expired => "expired",
});

impl QuoteStatus {
    /// Whether a quote may move from `self` to `next` via a plain status update.
    ///
    /// `Converted` is only reachable through quote conversion, never directly.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Quoted | Self::Rejected | Self::Expired)
                | (Self::Quoted, Self::Accepted | Self::Rejected | Self::Expired)
        )
    }

    /// Whether the quote can be converted into an order.
    #[must_use]
    pub const fn can_convert(self) -> bool {
        matches!(self, Self::Pending | Self::Quoted | Self::Accepted)
    }
}

/// Custom domain verification status.
///
/// Verification itself (DNS lookups) happens outside this system; the admin
/// API records its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.domain_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    #[default]
    Pending,
    Verified,
    Failed,
}

status_strings!(DomainStatus, "domain status", {
    Pending => "pending",
    Verified => "verified",
    Failed => "failed",
});

impl DomainStatus {
    /// Only verified domains may identify a tenant.
    #[must_use]
    pub const fn resolves_tenant(self) -> bool {
        matches!(self, Self::Verified)
    }
}
