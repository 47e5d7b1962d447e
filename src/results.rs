//! Client-side row and result-set types.

mod result_set;
mod row;

use std::sync::Arc;

pub use result_set::ResultSet;
pub use row::Row;

use crate::driver::Rows;
use crate::error::InterceptError;

/// Drain a cursor into a [`ResultSet`], closing it afterwards.
///
/// Column names are fetched once and shared across every produced
/// [`Row`].
///
/// # Errors
///
/// Returns the first error from advancing or closing the cursor; rows
/// read before the failure are dropped.
pub async fn build_result_set(rows: &mut dyn Rows) -> Result<ResultSet, InterceptError> {
    let column_names = Arc::new(rows.columns().to_vec());
    let mut set = ResultSet::with_capacity(8);
    while let Some(values) = rows.next().await? {
        set.add_row(Row::new(Arc::clone(&column_names), values));
    }
    rows.close().await?;
    Ok(set)
}
