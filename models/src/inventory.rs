// models/src/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Consumable,
    NonConsumable,
}

/// Stock status of a material. Derived, never set independently: expired
/// takes precedence over low stock, which takes precedence over ok.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaterialStatus {
    Ok,
    Low,
    Expired,
}

impl MaterialStatus {
    /// The single source of truth for stock status. Pure and idempotent;
    /// every write path that touches quantity, minimum stock or expiry must
    /// re-derive through here, as does the daily consistency pass.
    pub fn derive(
        quantity: i64,
        min_stock: i64,
        expiry_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> MaterialStatus {
        if let Some(expiry) = expiry_date {
            if expiry < today {
                return MaterialStatus::Expired;
            }
        }
        if min_stock > 0 && quantity <= min_stock {
            return MaterialStatus::Low;
        }
        MaterialStatus::Ok
    }
}

/// A material stocked on one ambulance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub ambulance_id: Uuid,
    /// Material name, unique within the owning ambulance.
    pub name: String,
    pub kind: MaterialKind,
    pub quantity: i64,
    pub min_stock: i64,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: MaterialStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn from_new(new: NewInventoryItem, ambulance_id: Uuid, today: NaiveDate) -> Self {
        let now = Utc::now();
        let status =
            MaterialStatus::derive(new.quantity, new.min_stock, new.expiry_date, today);
        InventoryItem {
            id: Uuid::new_v4(),
            ambulance_id,
            name: new.name,
            kind: new.kind,
            quantity: new.quantity,
            min_stock: new.min_stock,
            expiry_date: new.expiry_date,
            location: new.location,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rederive_status(&mut self, today: NaiveDate) {
        self.status =
            MaterialStatus::derive(self.quantity, self.min_stock, self.expiry_date, today);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub kind: MaterialKind,
    pub quantity: i64,
    pub min_stock: i64,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateInventoryItem {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub min_stock: Option<i64>,
    pub expiry_date: Option<Option<NaiveDate>>,
    pub location: Option<String>,
}

/// Append-only record of a quantity change on an inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityChange {
    pub id: Uuid,
    pub item_id: Uuid,
    pub delta: i64,
    pub resulting_quantity: i64,
    pub reason: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn low_when_at_or_below_min_stock() {
        let today = d("2025-06-10");
        assert_eq!(MaterialStatus::derive(5, 10, None, today), MaterialStatus::Low);
        assert_eq!(MaterialStatus::derive(10, 10, None, today), MaterialStatus::Low);
        assert_eq!(MaterialStatus::derive(11, 10, None, today), MaterialStatus::Ok);
    }

    #[test]
    fn zero_min_stock_never_flags_low() {
        let today = d("2025-06-10");
        assert_eq!(MaterialStatus::derive(0, 0, None, today), MaterialStatus::Ok);
    }

    #[test]
    fn expiry_takes_precedence_over_low_stock() {
        let today = d("2025-06-10");
        let yesterday = d("2025-06-09");
        assert_eq!(
            MaterialStatus::derive(5, 10, Some(yesterday), today),
            MaterialStatus::Expired
        );
    }

    #[test]
    fn expiring_today_is_not_expired() {
        let today = d("2025-06-10");
        assert_eq!(MaterialStatus::derive(50, 10, Some(today), today), MaterialStatus::Ok);
    }

    #[test]
    fn derivation_is_idempotent() {
        let today = d("2025-06-10");
        let first = MaterialStatus::derive(3, 10, None, today);
        let second = MaterialStatus::derive(3, 10, None, today);
        assert_eq!(first, second);
    }
}
