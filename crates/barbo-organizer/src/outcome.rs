//! Turning per-item results into outcomes.

use barbo_core::{OperationOutcome, Result};
use tracing::error;

/// Fold the result of one item of a user-facing operation into an outcome.
///
/// Item errors (missing bookmark, wrong state) become a failed outcome.
/// Store failures are returned as `Err` so the caller stops.
pub(crate) fn settle(op: &str, id: &str, result: Result<Option<String>>) -> Result<OperationOutcome> {
    match result {
        Ok(Some(folder_id)) => Ok(OperationOutcome::ok(id).with_folder(folder_id)),
        Ok(None) => Ok(OperationOutcome::ok(id)),
        Err(e) if e.is_store_failure() => Err(e),
        Err(e) => {
            error!(op, bookmark_id = %id, error = %e, "Operation failed");
            Ok(OperationOutcome::failed(id, &e))
        }
    }
}
