// 🧾 Receipt Model - Submitted receipts and their stored form
// A submission is a plain value; identity (id) and score are assigned on storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ITEM
// ============================================================================

/// One line entry on a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Free text as printed on the receipt (may carry surrounding whitespace)
    pub short_description: String,

    /// Decimal string with exactly two fraction digits (e.g. "6.49")
    pub price: String,
}

impl Item {
    pub fn new(short_description: impl Into<String>, price: impl Into<String>) -> Self {
        Item {
            short_description: short_description.into(),
            price: price.into(),
        }
    }
}

// ============================================================================
// RECEIPT (untrusted submission)
// ============================================================================

/// Receipt as submitted by a client, before validation
///
/// All fields stay as strings: the wire format is textual and duplicate
/// detection compares the exact submitted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub retailer: String,

    /// Calendar date, `YYYY-MM-DD`
    pub purchase_date: String,

    /// 24-hour wall clock, `HH:MM`
    pub purchase_time: String,

    #[serde(default)]
    pub items: Vec<Item>,

    /// Decimal string with exactly two fraction digits
    pub total: String,
}

impl Receipt {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

// ============================================================================
// STORED RECEIPT (immutable history)
// ============================================================================

/// Receipt after it was accepted: identity, score and creation time are fixed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReceipt {
    /// Stable identity (UUID v4), assigned by the store
    pub id: String,

    #[serde(flatten)]
    pub receipt: Receipt,

    pub points: u64,

    /// When the store accepted this receipt
    pub created_at: DateTime<Utc>,
}

impl StoredReceipt {
    /// Assign a fresh identity and creation timestamp
    pub fn assign(receipt: Receipt, points: u64) -> Self {
        StoredReceipt {
            id: uuid::Uuid::new_v4().to_string(),
            receipt,
            points,
            created_at: Utc::now(),
        }
    }
}

/// Receipt used across tests: the classic "Target" submission worth 28 points
#[cfg(test)]
pub(crate) fn target_fixture() -> Receipt {
    Receipt {
        retailer: "Target".to_string(),
        purchase_date: "2022-01-01".to_string(),
        purchase_time: "13:01".to_string(),
        items: vec![
            Item::new("Mountain Dew 12PK", "6.49"),
            Item::new("Emils Cheese Pizza", "12.25"),
            Item::new("Knorr Creamy Chicken", "1.26"),
            Item::new("Doritos Nacho Cheese", "3.35"),
            Item::new("   Klarbrunn 12-PK 12 FL OZ  ", "12.00"),
        ],
        total: "35.35".to_string(),
    }
}
