//! Escrow domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Settlement currencies accepted for a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
    /// Bitcoin.
    Btc,
}

impl Currency {
    /// Returns the wire spelling of the currency.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Btc => "BTC",
        }
    }

    /// Parses a currency from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "USD" => Some(Self::Usd),
            "EUR" => Some(Self::Eur),
            "GBP" => Some(Self::Gbp),
            "BTC" => Some(Self::Btc),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The creator's declared role in the deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealRole {
    /// Paying party.
    Buyer,
    /// Delivering party.
    Seller,
    /// Intermediary.
    Broker,
}

impl DealRole {
    /// Returns the wire spelling of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "Buyer",
            Self::Seller => "Seller",
            Self::Broker => "Broker",
        }
    }

    /// Parses a deal role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "buyer" => Some(Self::Buyer),
            "seller" => Some(Self::Seller),
            "broker" => Some(Self::Broker),
            _ => None,
        }
    }
}

impl fmt::Display for DealRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction status in the escrow lifecycle.
///
/// The valid transitions are:
/// - `Pending` → `Funded` → `In Progress` → `Completed` (one hop at a time)
/// - `Cancelled` from any non-terminal state
/// - `Disputed` from any non-terminal state
/// - `Disputed` resolves to `Completed` or `Cancelled`
///
/// `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Created, waiting for funds.
    Pending,
    /// Funds received into escrow.
    Funded,
    /// Goods or services being delivered.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Funds released; terminal.
    Completed,
    /// Deal called off; terminal.
    Cancelled,
    /// Under dispute, awaiting resolution.
    Disputed,
}

impl TransactionStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Funded,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::Disputed,
    ];

    /// Returns the wire spelling of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Funded => "Funded",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Disputed => "Disputed",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "funded" => Some(Self::Funded),
            "in progress" | "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "disputed" => Some(Self::Disputed),
            _ => None,
        }
    }

    /// Returns true if the status has no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns true if moving from `self` to `to` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(&self, to: Self) -> bool {
        match self {
            Self::Pending => matches!(to, Self::Funded | Self::Cancelled | Self::Disputed),
            Self::Funded => matches!(to, Self::InProgress | Self::Cancelled | Self::Disputed),
            Self::InProgress => matches!(to, Self::Completed | Self::Cancelled | Self::Disputed),
            Self::Disputed => matches!(to, Self::Completed | Self::Cancelled),
            Self::Completed | Self::Cancelled => false,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An escrow transaction record.
///
/// `created_by` is the single owner, set at creation and never reassigned.
/// Records are never deleted; cancellation is a terminal status, not removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,
    /// Deal title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Escrowed amount, non-negative.
    pub amount: Decimal,
    /// Settlement currency.
    pub currency: Currency,
    /// The creator's role in the deal.
    pub role: DealRole,
    /// Free-text identifier of the other party.
    pub counterparty: String,
    /// Current lifecycle status.
    pub status: TransactionStatus,
    /// Owning user id.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every status mutation. Always >= `created_at`.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Deal title, non-empty after trimming.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Escrowed amount, non-negative.
    pub amount: Decimal,
    /// Settlement currency.
    pub currency: Currency,
    /// The creator's role in the deal.
    pub role: DealRole,
    /// Free-text identifier of the other party.
    pub counterparty: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TransactionStatus::Pending.as_str(), "Pending");
        assert_eq!(TransactionStatus::InProgress.as_str(), "In Progress");
        assert_eq!(TransactionStatus::Disputed.as_str(), "Disputed");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            TransactionStatus::parse("pending"),
            Some(TransactionStatus::Pending)
        );
        assert_eq!(
            TransactionStatus::parse("In Progress"),
            Some(TransactionStatus::InProgress)
        );
        assert_eq!(
            TransactionStatus::parse("in_progress"),
            Some(TransactionStatus::InProgress)
        );
        assert_eq!(
            TransactionStatus::parse("CANCELLED"),
            Some(TransactionStatus::Cancelled)
        );
        assert_eq!(TransactionStatus::parse("shipped"), None);
    }

    #[test]
    fn test_happy_path_transitions() {
        use TransactionStatus::{Completed, Funded, InProgress, Pending};
        assert!(Pending.can_transition_to(Funded));
        assert!(Funded.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        // No skipping ahead.
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Funded.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in TransactionStatus::ALL {
            assert!(!TransactionStatus::Completed.can_transition_to(to));
            assert!(!TransactionStatus::Cancelled.can_transition_to(to));
        }
    }

    #[test]
    fn test_dispute_resolution() {
        use TransactionStatus::{Cancelled, Completed, Disputed, Funded};
        assert!(Disputed.can_transition_to(Completed));
        assert!(Disputed.can_transition_to(Cancelled));
        assert!(!Disputed.can_transition_to(Funded));
    }

    #[test]
    fn test_currency_round_trip() {
        assert_eq!(Currency::parse("usd"), Some(Currency::Usd));
        assert_eq!(Currency::parse("BTC"), Some(Currency::Btc));
        assert_eq!(Currency::parse("JPY"), None);
        assert_eq!(Currency::Eur.as_str(), "EUR");
    }

    #[test]
    fn test_deal_role_round_trip() {
        assert_eq!(DealRole::parse("Buyer"), Some(DealRole::Buyer));
        assert_eq!(DealRole::parse("seller"), Some(DealRole::Seller));
        assert_eq!(DealRole::parse("escrow"), None);
        assert_eq!(DealRole::Broker.as_str(), "Broker");
    }

    #[test]
    fn test_status_serde_wire_spelling() {
        let json = serde_json::to_string(&TransactionStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: TransactionStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(back, TransactionStatus::InProgress);
    }
}
