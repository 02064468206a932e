//! Multi-shard XPT loading.

use std::path::Path;

use polars::prelude::{Column, DataFrame};
use tracing::{debug, info};

use crate::discovery::list_source_files;
use crate::error::{IngestError, Result};

const SHARD_EXTENSION: &str = "xpt";

/// Load every `.xpt` shard of `dir` as one frame.
///
/// Column names are lower-cased. All shards must share the first shard's
/// column names, order and types; a mismatch is an error rather than a
/// skipped file.
pub fn load_xpt_shards(dir: &Path) -> Result<DataFrame> {
    let files = list_source_files(dir, SHARD_EXTENSION)?;
    let Some((first, rest)) = files.split_first() else {
        return Err(IngestError::NoSourceFiles {
            path: dir.to_path_buf(),
            extension: SHARD_EXTENSION.to_string(),
        });
    };

    let mut combined = read_shard(first)?;
    let expected = schema_signature(&combined);

    for path in rest {
        let shard = read_shard(path)?;
        let found = schema_signature(&shard);
        if found != expected {
            return Err(IngestError::SchemaMismatch {
                path: path.clone(),
                reference: first.clone(),
                expected: expected.join(", "),
                found: found.join(", "),
            });
        }
        combined.vstack_mut(&shard)?;
    }

    info!(
        dir = %dir.display(),
        shards = files.len(),
        rows = combined.height(),
        columns = combined.width(),
        "loaded XPT shards"
    );
    Ok(combined)
}

fn read_shard(path: &Path) -> Result<DataFrame> {
    let df = warehouse_xpt::read_xpt_to_dataframe(path).map_err(|source| IngestError::Xpt {
        path: path.to_path_buf(),
        source,
    })?;
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .map(|col| {
            let lowered = col.name().as_str().to_lowercase();
            col.clone().with_name(lowered.into())
        })
        .collect();
    let df = DataFrame::new(columns)?;
    debug!(path = %path.display(), rows = df.height(), "read shard");
    Ok(df)
}

fn schema_signature(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|col| format!("{}:{}", col.name(), col.dtype()))
        .collect()
}
