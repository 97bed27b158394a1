//! Pipeline error types

use thiserror::Error;

use tally_connectors::ConnectorError;
use tally_store::StoreError;

/// Errors that abort a whole run
///
/// Everything else - transient source failures, pagination overruns,
/// missing entities - is fault-isolated per key and reported through the
/// run report instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source error that would fail identically for every remaining key
    #[error("fatal source error: {0}")]
    Fatal(#[source] ConnectorError),

    /// The cache could not be loaded or saved
    #[error(transparent)]
    Store(#[from] StoreError),
}
