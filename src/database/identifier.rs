use super::store::{Store, StoreError};
use crate::types::IdFormat;

/// Allocate the next display identifier, e.g. `UMC-00042`.
///
/// Backed by a single atomic counter increment, so concurrent callers always
/// receive distinct values. Sequences wider than the pad width are not truncated.
pub async fn next_id(store: &dyn Store, format: IdFormat) -> Result<String, StoreError> {
    let seq = store.next_sequence(format.counter_key).await?;
    Ok(format_id(format, seq))
}

pub fn format_id(format: IdFormat, seq: i64) -> String {
    format!("{}-{:0>width$}", format.prefix, seq, width = format.width)
}
