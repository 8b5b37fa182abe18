// 🗃️ Receipt Store - Persistence contract + in-memory backend
// Stores are append-only: receipts are created, read and listed, never changed

use crate::deduplication::DuplicateKey;
use crate::error::{ReceiptError, Result};
use crate::receipt::{Receipt, StoredReceipt};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

// ============================================================================
// STORE CONTRACT
// ============================================================================

pub trait ReceiptStore: Send + Sync {
    /// Persist a scored receipt, assigning its id and creation time.
    ///
    /// The duplicate check and the insert are atomic: when two identical
    /// receipts race, exactly one is stored and the other gets
    /// [`ReceiptError::Duplicate`].
    fn create(&self, receipt: Receipt, points: u64) -> Result<StoredReceipt>;

    /// Fetch one receipt; [`ReceiptError::NotFound`] for unknown ids
    fn get(&self, id: &str) -> Result<StoredReceipt>;

    /// All receipts, most recently created first
    fn list(&self) -> Result<Vec<StoredReceipt>>;

    /// Is a receipt with this logical key already stored?
    fn find_duplicate(&self, key: &DuplicateKey) -> Result<bool>;
}

impl<S: ReceiptStore + ?Sized> ReceiptStore for Arc<S> {
    fn create(&self, receipt: Receipt, points: u64) -> Result<StoredReceipt> {
        (**self).create(receipt, points)
    }

    fn get(&self, id: &str) -> Result<StoredReceipt> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<StoredReceipt>> {
        (**self).list()
    }

    fn find_duplicate(&self, key: &DuplicateKey) -> Result<bool> {
        (**self).find_duplicate(key)
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Default)]
struct MemoryState {
    /// Insertion order
    receipts: Vec<StoredReceipt>,
    by_id: HashMap<String, usize>,
    keys: HashSet<DuplicateKey>,
}

/// Process-local store; contents are lost on restart
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

fn poisoned<T>(_: T) -> ReceiptError {
    ReceiptError::Storage("in-memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> Result<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.receipts.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl ReceiptStore for MemoryStore {
    fn create(&self, receipt: Receipt, points: u64) -> Result<StoredReceipt> {
        let key = DuplicateKey::from_receipt(&receipt);

        // Check and insert under one write lock
        let mut state = self.state.write().map_err(poisoned)?;
        if state.keys.contains(&key) {
            return Err(ReceiptError::Duplicate);
        }

        let stored = StoredReceipt::assign(receipt, points);
        let index = state.receipts.len();
        state.by_id.insert(stored.id.clone(), index);
        state.keys.insert(key);
        state.receipts.push(stored.clone());

        tracing::debug!(id = %stored.id, "receipt stored in memory");
        Ok(stored)
    }

    fn get(&self, id: &str) -> Result<StoredReceipt> {
        let state = self.state.read().map_err(poisoned)?;
        state
            .by_id
            .get(id)
            .and_then(|&index| state.receipts.get(index))
            .cloned()
            .ok_or_else(|| ReceiptError::NotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<StoredReceipt>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.receipts.iter().rev().cloned().collect())
    }

    fn find_duplicate(&self, key: &DuplicateKey) -> Result<bool> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.keys.contains(key))
    }
}
