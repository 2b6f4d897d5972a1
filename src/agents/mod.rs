//! The two pipeline agents
//!
//! - [`Archivist`] acquires and vets content: scraping, title cleanup, safety
//! - [`Curator`] turns what the archivist found into summary, tags, category
//!   and an embedding, degrading to URL-only inference when there is no text

mod archivist;
mod curator;
pub mod prompt;
pub mod signals;
pub mod title;

pub use archivist::{Archivist, ArchivistOutcome};
pub use curator::{Curator, CurationOutcome, URL_ONLY_MAX_CONFIDENCE};
pub use signals::UrlSignals;

use crate::services::ServiceError;
use crate::state::ErrorKind;
use crate::until_cancelled;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A failed collaborator call, already classified
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CallFailure {
    pub kind: ErrorKind,
    pub detail: String,
}

/// Runs a collaborator call bounded by `timeout` and `cancel`
///
/// Timeouts and service errors become `collaborator_error`; cancellation
/// becomes `cancelled`.
pub(crate) async fn call_collaborator<T, F>(
    what: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, CallFailure>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match until_cancelled(cancel, tokio::time::timeout(timeout, call)).await {
        None => Err(CallFailure {
            kind: ErrorKind::Cancelled,
            detail: "Cancelled by caller".to_string(),
        }),
        Some(Err(_)) => Err(CallFailure {
            kind: ErrorKind::CollaboratorError,
            detail: format!("{} timed out after {:?}", what, timeout),
        }),
        Some(Ok(Err(e))) => Err(CallFailure {
            kind: ErrorKind::CollaboratorError,
            detail: format!("{} failed: {}", what, e),
        }),
        Some(Ok(Ok(value))) => Ok(value),
    }
}
