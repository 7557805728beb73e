//! Status enums for orders and delivery tasks.
//!
//! The stored values are human-readable strings (`"Pending"`,
//! `"Customer Canceled"`), so each enum carries its wire form in `as_str()`
//! and round-trips through `Display` / `FromStr`.

use serde::{Deserialize, Serialize};

/// Status of an order held in a customer's `currentOrders`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Closed,
}

impl OrderStatus {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Closed" => Ok(Self::Closed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Status of a delivery task assigned to a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Complete,
    Canceled,
    #[serde(rename = "Customer Canceled")]
    CustomerCanceled,
    Rescheduled,
}

impl DeliveryStatus {
    /// Statuses that end a partner's involvement with a task.
    pub const SETTLED: [Self; 4] = [
        Self::Complete,
        Self::Canceled,
        Self::CustomerCanceled,
        Self::Rescheduled,
    ];

    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Complete => "Complete",
            Self::Canceled => "Canceled",
            Self::CustomerCanceled => "Customer Canceled",
            Self::Rescheduled => "Rescheduled",
        }
    }

    /// Whether a task in this status should leave the partner's live list.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Stored string forms of every settled status.
    #[must_use]
    pub fn settled_strs() -> Vec<&'static str> {
        Self::SETTLED.iter().map(|s| s.as_str()).collect()
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Complete" => Ok(Self::Complete),
            "Canceled" => Ok(Self::Canceled),
            "Customer Canceled" => Ok(Self::CustomerCanceled),
            "Rescheduled" => Ok(Self::Rescheduled),
            _ => Err(format!("invalid delivery status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip() {
        for status in [OrderStatus::Pending, OrderStatus::Closed] {
            assert_eq!(status.to_string().parse::<OrderStatus>(), Ok(status));
        }
        assert!("closed".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_customer_canceled_wire_form() {
        let json = serde_json::to_string(&DeliveryStatus::CustomerCanceled).expect("serialize");
        assert_eq!(json, "\"Customer Canceled\"");
        assert_eq!(
            "Customer Canceled".parse::<DeliveryStatus>(),
            Ok(DeliveryStatus::CustomerCanceled)
        );
    }

    #[test]
    fn test_settled_statuses() {
        assert!(!DeliveryStatus::Pending.is_settled());
        for status in DeliveryStatus::SETTLED {
            assert!(status.is_settled());
        }
        assert_eq!(
            DeliveryStatus::settled_strs(),
            vec!["Complete", "Canceled", "Customer Canceled", "Rescheduled"]
        );
    }
}
