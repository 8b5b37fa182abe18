// 🗄️ SQLite Store - Relational receipt persistence
// Receipts and their items live in two tables; a UNIQUE fingerprint column
// makes duplicate-check-then-insert safe across connections.

use crate::deduplication::DuplicateKey;
use crate::error::{ReceiptError, Result};
use crate::receipt::{Item, Receipt, StoredReceipt};
use crate::store::ReceiptStore;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases stay in "memory" mode)
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Receipts Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            receipt_uuid TEXT UNIQUE NOT NULL,
            fingerprint TEXT UNIQUE NOT NULL,
            retailer TEXT NOT NULL,
            purchase_date TEXT NOT NULL,
            purchase_time TEXT NOT NULL,
            total TEXT NOT NULL,
            item_signature TEXT NOT NULL,
            points INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Items Table (submission order kept in `position`)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            receipt_uuid TEXT NOT NULL REFERENCES receipts(receipt_uuid),
            position INTEGER NOT NULL,
            short_description TEXT NOT NULL,
            price TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_receipt ON items(receipt_uuid, position)",
        [],
    )?;

    Ok(())
}

fn parse_timestamp(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn parse_points(row: &Row<'_>, index: usize) -> rusqlite::Result<u64> {
    let raw: i64 = row.get(index)?;
    u64::try_from(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(e)))
}

const RECEIPT_COLUMNS: &str =
    "receipt_uuid, retailer, purchase_date, purchase_time, total, points, created_at";

/// Map a receipts row (selected with [`RECEIPT_COLUMNS`]); items are loaded separately
fn receipt_from_row(row: &Row<'_>) -> rusqlite::Result<StoredReceipt> {
    Ok(StoredReceipt {
        id: row.get(0)?,
        receipt: Receipt {
            retailer: row.get(1)?,
            purchase_date: row.get(2)?,
            purchase_time: row.get(3)?,
            items: Vec::new(),
            total: row.get(4)?,
        },
        points: parse_points(row, 5)?,
        created_at: parse_timestamp(row, 6)?,
    })
}

fn load_items(conn: &Connection, receipt_uuid: &str) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare_cached(
        "SELECT short_description, price
         FROM items
         WHERE receipt_uuid = ?1
         ORDER BY position",
    )?;

    let items = stmt
        .query_map(params![receipt_uuid], |row| {
            Ok(Item {
                short_description: row.get(0)?,
                price: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(items)
}

fn duplicate_exists(conn: &Connection, key: &DuplicateKey) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (
            SELECT 1 FROM receipts
            WHERE fingerprint = ?1
              AND retailer = ?2
              AND purchase_date = ?3
              AND purchase_time = ?4
              AND total = ?5
              AND item_signature = ?6
        )",
        params![
            key.fingerprint(),
            key.retailer,
            key.purchase_date,
            key.purchase_time,
            key.total,
            key.item_signature,
        ],
        |row| row.get(0),
    )?;

    Ok(exists)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "opened receipt database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ReceiptError::Storage("database connection lock poisoned".to_string()))
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM receipts", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl ReceiptStore for SqliteStore {
    fn create(&self, receipt: Receipt, points: u64) -> Result<StoredReceipt> {
        let key = DuplicateKey::from_receipt(&receipt);
        let points_column = i64::try_from(points)
            .map_err(|_| ReceiptError::Storage(format!("points {points} out of range")))?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if duplicate_exists(&tx, &key)? {
            return Err(ReceiptError::Duplicate);
        }

        let stored = StoredReceipt::assign(receipt, points);

        let inserted = tx.execute(
            "INSERT INTO receipts (
                receipt_uuid, fingerprint, retailer, purchase_date, purchase_time,
                total, item_signature, points, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                stored.id,
                key.fingerprint(),
                stored.receipt.retailer,
                stored.receipt.purchase_date,
                stored.receipt.purchase_time,
                stored.receipt.total,
                key.item_signature,
                points_column,
                stored.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        );

        match inserted {
            Ok(_) => {}
            // Another writer on the same file won the race
            Err(e) if is_constraint_violation(&e) => return Err(ReceiptError::Duplicate),
            Err(e) => return Err(e.into()),
        }

        for (position, item) in stored.receipt.items.iter().enumerate() {
            tx.execute(
                "INSERT INTO items (receipt_uuid, position, short_description, price)
                 VALUES (?1, ?2, ?3, ?4)",
                params![stored.id, position as i64, item.short_description, item.price],
            )?;
        }

        tx.commit()?;

        tracing::debug!(id = %stored.id, "receipt stored in sqlite");
        Ok(stored)
    }

    fn get(&self, id: &str) -> Result<StoredReceipt> {
        let conn = self.lock()?;

        let found = conn
            .query_row(
                &format!("SELECT {RECEIPT_COLUMNS} FROM receipts WHERE receipt_uuid = ?1"),
                params![id],
                receipt_from_row,
            )
            .optional()?;

        let mut stored = found.ok_or_else(|| ReceiptError::NotFound(id.to_string()))?;
        stored.receipt.items = load_items(&conn, &stored.id)?;
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<StoredReceipt>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY id DESC"
        ))?;
        let mut receipts = stmt
            .query_map([], receipt_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for stored in &mut receipts {
            stored.receipt.items = load_items(&conn, &stored.id)?;
        }

        Ok(receipts)
    }

    fn find_duplicate(&self, key: &DuplicateKey) -> Result<bool> {
        let conn = self.lock()?;
        duplicate_exists(&conn, key)
    }
}
