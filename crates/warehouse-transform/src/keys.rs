//! Surrogate id assignment.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use polars::prelude::{DataFrame, NamedFrom, Series};
use sha2::{Digest, Sha256};
use tracing::debug;
use warehouse_model::KeyStrategy;

use crate::error::{Result, TransformError};
use crate::row_key::{encode_row, text_columns};

/// Appends a unique `Int64` id column to a relation.
///
/// One assigner is created per run and passed to every unit. With
/// [`KeyStrategy::Monotonic`] each relation reserves a fresh block from a
/// shared counter, so ids never repeat within a run. With
/// [`KeyStrategy::ContentHash`] the id is derived from the row's values and
/// repeats across runs for the same row.
#[derive(Debug)]
pub struct SurrogateKeyAssigner {
    strategy: KeyStrategy,
    next: AtomicI64,
}

impl SurrogateKeyAssigner {
    pub fn new(strategy: KeyStrategy) -> Self {
        Self {
            strategy,
            next: AtomicI64::new(0),
        }
    }

    /// Append `key_column` to `df`. `table` only labels errors and logs.
    pub fn assign(&self, table: &str, df: &mut DataFrame, key_column: &str) -> Result<()> {
        if df.column(key_column).is_ok() {
            return Err(TransformError::ColumnExists {
                table: table.to_string(),
                column: key_column.to_string(),
            });
        }
        let ids = match self.strategy {
            KeyStrategy::Monotonic => self.reserve_block(df.height()),
            KeyStrategy::ContentHash => content_hash_ids(table, df)?,
        };
        debug!(
            table,
            key_column,
            strategy = %self.strategy,
            rows = ids.len(),
            "assigned surrogate ids"
        );
        df.with_column(Series::new(key_column.into(), ids))?;
        Ok(())
    }

    fn reserve_block(&self, len: usize) -> Vec<i64> {
        let base = self.next.fetch_add(len as i64, Ordering::Relaxed);
        (base..base + len as i64).collect()
    }
}

fn content_hash_ids(table: &str, df: &DataFrame) -> Result<Vec<i64>> {
    let columns = text_columns(df)?;
    let mut first_row: HashMap<i64, usize> = HashMap::with_capacity(df.height());
    let mut ids = Vec::with_capacity(df.height());
    let mut buf = Vec::new();
    for idx in 0..df.height() {
        encode_row(&columns, idx, &mut buf);
        let id = hash_id(&buf);
        if let Some(&first) = first_row.get(&id) {
            return Err(TransformError::KeyCollision {
                table: table.to_string(),
                id,
                first,
                second: idx,
            });
        }
        first_row.insert(id, idx);
        ids.push(id);
    }
    Ok(ids)
}

/// First 8 bytes of SHA-256, masked to a non-negative `i64`.
fn hash_id(encoded: &[u8]) -> i64 {
    let digest: [u8; 32] = Sha256::digest(encoded).into();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) & i64::MAX as u64) as i64
}
