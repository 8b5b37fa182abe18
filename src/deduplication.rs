// 🔍 Deduplication - Detect resubmitted receipts
// Two receipts are the same when retailer, date, time, total and the item
// multiset all match; item submission order does not matter.

use crate::error::Result;
use crate::receipt::Receipt;
use crate::store::ReceiptStore;
use sha2::{Digest, Sha256};

// ============================================================================
// DUPLICATE KEY
// ============================================================================

/// Logical identity of a receipt for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
    pub retailer: String,
    pub purchase_date: String,
    pub purchase_time: String,
    pub total: String,

    /// Canonical item set: `description:price` pairs sorted, comma-joined
    pub item_signature: String,
}

impl DuplicateKey {
    pub fn from_receipt(receipt: &Receipt) -> Self {
        DuplicateKey {
            retailer: receipt.retailer.clone(),
            purchase_date: receipt.purchase_date.clone(),
            purchase_time: receipt.purchase_time.clone(),
            total: receipt.total.clone(),
            item_signature: item_signature(receipt),
        }
    }

    /// SHA-256 over every key component; stored under a UNIQUE index
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            &self.retailer,
            &self.purchase_date,
            &self.purchase_time,
            &self.total,
            &self.item_signature,
        ] {
            hasher.update(part.as_bytes());
            // Separator keeps ("ab", "c") and ("a", "bc") apart
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Serialize items as `description:price`, sorted by description, joined by `,`
///
/// Items sharing a description are further ordered by price, so the
/// signature only depends on the multiset of pairs.
pub fn item_signature(receipt: &Receipt) -> String {
    let mut pairs: Vec<(&str, &str)> = receipt
        .items
        .iter()
        .map(|item| (item.short_description.as_str(), item.price.as_str()))
        .collect();
    pairs.sort_unstable();

    pairs
        .iter()
        .map(|(description, price)| format!("{description}:{price}"))
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// PREDICATE
// ============================================================================

/// Has a semantically identical receipt already been accepted by `store`?
pub fn is_duplicate<S: ReceiptStore + ?Sized>(candidate: &Receipt, store: &S) -> Result<bool> {
    store.find_duplicate(&DuplicateKey::from_receipt(candidate))
}
