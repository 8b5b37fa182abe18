// ⚙️ Receipt Processor - validate → reject duplicates → score → store

use crate::deduplication::is_duplicate;
use crate::error::{ReceiptError, Result};
use crate::receipt::{Receipt, StoredReceipt};
use crate::rules;
use crate::schema;
use crate::store::ReceiptStore;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedReceipt {
    pub id: String,
    pub points: u64,
}

#[derive(Clone)]
pub struct ReceiptProcessor {
    store: Arc<dyn ReceiptStore>,
}

impl ReceiptProcessor {
    pub fn new(store: Arc<dyn ReceiptStore>) -> Self {
        ReceiptProcessor { store }
    }

    pub fn store(&self) -> &dyn ReceiptStore {
        self.store.as_ref()
    }

    /// Accept one submission. Each rejection leaves the store unchanged.
    pub fn process(&self, receipt: Receipt) -> Result<ProcessedReceipt> {
        let outcome = self.try_process(receipt);

        match &outcome {
            Ok(processed) => {
                tracing::info!(id = %processed.id, points = processed.points, "receipt processed");
            }
            Err(err @ (ReceiptError::Validation(_) | ReceiptError::Duplicate)) => {
                tracing::warn!(kind = err.kind(), error = %err, "receipt rejected");
            }
            Err(err) => {
                tracing::error!(kind = err.kind(), error = %err, "receipt processing failed");
            }
        }

        outcome
    }

    fn try_process(&self, receipt: Receipt) -> Result<ProcessedReceipt> {
        schema::validate(&receipt)?;

        // Cheap early rejection; `create` repeats the check atomically
        if is_duplicate(&receipt, self.store.as_ref())? {
            return Err(ReceiptError::Duplicate);
        }

        let points = rules::score(&receipt)?;
        let stored = self.store.create(receipt, points)?;

        Ok(ProcessedReceipt {
            id: stored.id,
            points: stored.points,
        })
    }

    pub fn points(&self, id: &str) -> Result<u64> {
        Ok(self.store.get(id)?.points)
    }

    pub fn receipt(&self, id: &str) -> Result<StoredReceipt> {
        self.store.get(id)
    }

    pub fn list(&self) -> Result<Vec<StoredReceipt>> {
        self.store.list()
    }
}
